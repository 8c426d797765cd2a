mod support;

use std::fs;

use cfg_compile::*;
use serde_json::Value;

fn negation_grammar() -> Grammar {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let be = grammar.new_symbol(&["be", "3", "sg"]).unwrap();
    let negation = grammar.new_symbol(&["negation"]).unwrap();
    grammar
        .rule(be)
        .terminal(TerminalRule::new("is"))
        .unwrap()
        .rule(negation)
        .terminal(TerminalRule::new("not"))
        .unwrap()
        .rule(start)
        .rhs([be, negation])
        .unwrap();
    grammar
}

#[test]
fn test_compile_binary_rule() {
    support::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grammar.json");
    let config = CompileConfig::new().output_path(&path);

    let report = negation_grammar().compile(&config).unwrap();

    assert_eq!(
        report,
        RuleCountReport {
            rule_count: 3,
            previous_rule_count: None,
        }
    );
    assert_eq!(report.to_string(), "Rules: 3");
    let artifact = Artifact::read_from_path(&path).unwrap();
    assert_eq!(artifact.start_symbol, "[start]");
    let names: Vec<&str> = artifact.grammar.keys().map(String::as_str).collect();
    assert_eq!(names, ["[be-3-sg]", "[negation]", "[start]"]);
    let rules: Vec<&ArtifactRule> = artifact.grammar.values().flatten().collect();
    assert_eq!(rules.iter().filter(|rule| rule.is_terminal).count(), 2);
    assert_eq!(rules.iter().filter(|rule| !rule.is_terminal).count(), 1);
    assert!(rules.iter().all(|rule| rule.origin == RuleOrigin::Authored));
    assert_eq!(artifact.grammar["[start]"][0].rhs, ["[be-3-sg]", "[negation]"]);
}

#[test]
fn test_rule_count_delta() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompileConfig::new()
        .output_path(dir.path().join("grammar.json"))
        .pretty(false);
    negation_grammar().compile(&config).unwrap();

    let mut grammar = negation_grammar();
    let start = grammar.start_symbol();
    let negation = grammar.symbol_by_name("[negation]").unwrap();
    grammar.add_rule(start, NonterminalRule::unary(negation)).unwrap();
    let report = grammar.compile(&config).unwrap();

    assert_eq!(report.previous_rule_count, Some(3));
    assert_eq!(report.delta(), Some(1));
    assert_eq!(report.to_string(), "Rules: 3 -> 4");
}

#[test]
fn test_failed_compile_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grammar.json");
    let config = CompileConfig::new().output_path(&path);

    let mut grammar = negation_grammar();
    grammar
        .new_invariable_term(InvariableTermOptions::new("orphan", ["orphan"]))
        .unwrap();
    let result = grammar.clone().compile(&config);
    assert!(matches!(result, Err(GrammarError::UnreachableComponents(_))));
    assert!(!path.exists());

    negation_grammar().compile(&config).unwrap();
    let before = fs::read_to_string(&path).unwrap();
    assert!(grammar.clone().compile(&config).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);

    // Without the check, the unused symbol is compiled in.
    let report = grammar.compile(&config.clone().check_unused(false)).unwrap();
    assert_eq!(report.delta(), Some(1));
}

#[test]
fn test_unreadable_previous_artifact_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grammar.json");
    fs::write(&path, "not json").unwrap();

    let report = negation_grammar()
        .compile(&CompileConfig::new().output_path(&path))
        .unwrap();

    assert_eq!(report.previous_rule_count, None);
    assert_eq!(Artifact::read_from_path(&path).unwrap().rule_count(), 3);
}

fn rich_grammar() -> Grammar {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let followers = grammar
        .new_semantic(SemanticOptions::new("followers", 0.5, 1, 1))
        .unwrap();
    let follow = grammar
        .new_verb(VerbOptions::new(
            "follow",
            VerbForms::new("follow", "follows", "follow", "followed"),
        ))
        .unwrap();
    let user = grammar
        .new_entity_category(EntityCategoryOptions::new(
            "user",
            [Entity::new("Danny", ["danny"])],
        ))
        .unwrap();
    let me = grammar
        .new_pronoun(PronounOptions::new("1-sg", PronounForms::new("I", "me")).insertion_cost(1.0))
        .unwrap();
    let obj = grammar.new_symbol(&["obj"]).unwrap();
    grammar
        .rule(obj)
        .nonterminal(NonterminalRule::unary(me).grammatical_case(GrammaticalCase::Obj))
        .unwrap()
        .rhs([user])
        .unwrap()
        .rule(start)
        .nonterminal(
            NonterminalRule::binary(follow, obj)
                .semantic(followers)
                .person_number(PersonNumber::ThreeSg)
                .transposition_cost(1.0),
        )
        .unwrap();
    grammar
}

#[test]
fn test_artifact_round_trip() {
    let mut grammar = rich_grammar();
    grammar.derive_edit_rules().unwrap();
    grammar.check_unused().unwrap();
    let artifact = grammar.to_artifact();
    assert_eq!(artifact.rule_count(), grammar.rule_count());

    let json = artifact.to_json(true).unwrap();
    assert_eq!(Artifact::from_json(&json).unwrap(), artifact);
    assert_eq!(artifact.to_json(false).unwrap(), grammar.to_artifact().to_json(false).unwrap());
}

#[test]
fn test_artifact_format() {
    let mut grammar = rich_grammar();
    grammar.derive_edit_rules().unwrap();
    let json: Value = serde_json::from_str(&grammar.to_artifact().to_json(false).unwrap()).unwrap();

    assert_eq!(json["startSymbol"], "[start]");
    let start = json["grammar"]["[start]"].as_array().unwrap();
    assert_eq!(start[0]["rhs"], serde_json::json!(["[follow]", "[obj]"]));
    assert_eq!(start[0]["personNumber"], "threeSg");
    assert_eq!(start[0]["transpositionCost"], 1.0);
    assert!(start[0].get("origin").is_none());

    let insertion = start
        .iter()
        .find(|rule| rule["origin"] == "insertion")
        .unwrap();
    assert_eq!(insertion["rhs"], serde_json::json!(["[follow]"]));
    assert_eq!(insertion["insertion"]["index"], 1);
    assert_eq!(insertion["insertion"]["symbol"], "[obj]");
    assert_eq!(insertion["insertion"]["text"], serde_json::json!([{ "nom": "I", "obj": "me" }]));
    assert!(start.iter().any(|rule| rule["origin"] == "transposition"));

    let follow = json["grammar"]["[follow]"].as_array().unwrap();
    assert_eq!(follow[0]["isTerminal"], true);
    assert_eq!(follow[0]["text"][0]["threeSg"], "follows");
    assert_eq!(follow[2]["tense"], "past");

    assert_eq!(json["semantics"]["followers"]["maxParams"], 1);
    assert_eq!(json["entities"]["user"]["entities"][0]["names"][0], "danny");
    assert_eq!(json["grammar"]["{user}"][0]["entity"], "user");
    assert!(json["grammar"].get("<empty>").is_none());
}
