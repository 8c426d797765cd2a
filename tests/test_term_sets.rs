mod support;

use cfg_compile::*;
use test_case::test_case;

fn literals(grammar: &Grammar, sym: Symbol) -> Vec<&str> {
    grammar
        .rules_of(sym)
        .iter()
        .filter_map(Rule::as_terminal)
        .map(|rule| rule.literal.as_str())
        .collect()
}

#[test_case(VerbForms::new("am", "is", "are", "was"), &["am", "is", "are", "was"] ; "distinct plural")]
#[test_case(VerbForms::new("eat", "eats", "eat", "ate"), &["eat", "eats", "ate"] ; "plural equal to first person")]
fn test_verb_forms(forms: VerbForms, expected: &[&str]) {
    support::init_logging();
    let mut grammar = Grammar::new();
    let verb = grammar.new_verb(VerbOptions::new("verb", forms)).unwrap();
    assert_eq!(literals(&grammar, verb), expected);
}

#[test]
fn test_verb_rules_share_text() {
    let mut grammar = Grammar::new();
    let forms = VerbForms::new("write", "writes", "write", "wrote")
        .present_participle("writing")
        .past_participle("written");
    let write = grammar
        .new_verb(VerbOptions::new("write", forms).insertion_cost(1.5))
        .unwrap();

    assert_eq!(grammar.symbol_by_name("[write]"), Some(write));
    assert_eq!(
        literals(&grammar, write),
        ["write", "writes", "wrote", "writing", "written"]
    );
    let expected_text = Text::Verb(VerbText {
        one_sg: "write".into(),
        three_sg: "writes".into(),
        pl: "write".into(),
        past: "wrote".into(),
    });
    let rules: Vec<&TerminalRule> = grammar
        .rules_of(write)
        .iter()
        .filter_map(Rule::as_terminal)
        .collect();
    for rule in &rules {
        assert_eq!(rule.text.as_ref(), Some(&expected_text));
    }
    let insertion_costs: Vec<_> = rules.iter().map(|rule| rule.insertion_cost).collect();
    assert_eq!(insertion_costs, [Some(1.5), None, None, None, None]);
    let tenses: Vec<_> = rules.iter().map(|rule| rule.tense).collect();
    assert_eq!(tenses, [None, None, Some(Tense::Past), None, Some(Tense::Past)]);
    assert_eq!(grammar.term_set(write).map(|set| set.kind), Some(TermSetKind::Verb));
}

#[test]
fn test_failed_builder_leaves_grammar_untouched() {
    let mut grammar = Grammar::new();
    let num_syms = grammar.num_syms();

    let result = grammar.new_verb(VerbOptions::new("put", VerbForms::new("put", "puts", "put", "put")));
    assert!(matches!(result, Err(GrammarError::DuplicateRule { .. })));
    assert_eq!(grammar.num_syms(), num_syms);
    assert_eq!(grammar.symbol_by_name("[put]"), None);
    assert_eq!(grammar.rule_count(), 0);

    // The name is still free.
    let put = grammar
        .new_verb(VerbOptions::new("put", VerbForms::new("put", "puts", "put", "placed")))
        .unwrap();
    assert_eq!(literals(&grammar, put), ["put", "puts", "placed"]);
}

#[test_case("" ; "empty")]
#[test_case("hello there" ; "inner space")]
#[test_case(" hi" ; "leading space")]
#[test_case("tab\tseparated" ; "tab")]
fn test_malformed_terminal(literal: &str) {
    let mut grammar = Grammar::new();
    let result = grammar.new_invariable_term(InvariableTermOptions::new("greeting", ["hi", literal]));
    assert!(
        matches!(result, Err(GrammarError::MalformedTerminal { .. })),
        "{:?}",
        result
    );
    assert_eq!(grammar.symbol_by_name("[greeting]"), None);
}

#[test]
fn test_invariable_term() {
    let mut grammar = Grammar::new();
    let repos = grammar
        .new_invariable_term(
            InvariableTermOptions::new("repos", ["repos", "repositories"])
                .insertion_cost(2.0)
                .substituted_terms([SubstitutedTerm::new("repo", 0.5), "projects".into()]),
        )
        .unwrap();

    let rules: Vec<&TerminalRule> = grammar
        .rules_of(repos)
        .iter()
        .filter_map(Rule::as_terminal)
        .collect();
    let summary: Vec<_> = rules
        .iter()
        .map(|rule| {
            (
                rule.literal.as_str(),
                rule.display_text(),
                rule.insertion_cost,
                rule.cost_penalty,
            )
        })
        .collect();
    let fixed = |text: &str| Text::Fixed(text.to_string());
    assert_eq!(
        summary,
        [
            ("repos", fixed("repos"), Some(2.0), 0.0),
            ("repositories", fixed("repositories"), None, 0.0),
            ("repo", fixed("repos"), None, 0.5),
            ("projects", fixed("repos"), None, 0.0),
        ]
    );
}

#[test]
fn test_invariable_term_without_accepted_terms() {
    let mut grammar = Grammar::new();
    let result = grammar.new_invariable_term(InvariableTermOptions::new("none", Vec::<String>::new()));
    assert!(matches!(result, Err(GrammarError::IllFormedOptions { .. })));
}

#[test]
fn test_negative_cost_is_rejected() {
    let mut grammar = Grammar::new();
    let result = grammar.new_invariable_term(InvariableTermOptions::new("up", ["up"]).insertion_cost(-1.0));
    assert!(matches!(result, Err(GrammarError::IllFormedOptions { .. })));
    let result = grammar.new_invariable_term(InvariableTermOptions::new("up", ["up"]).insertion_cost(f64::NAN));
    assert!(matches!(result, Err(GrammarError::IllFormedOptions { .. })));
}

#[test]
fn test_pronoun() {
    let mut grammar = Grammar::new();
    let i = grammar
        .new_pronoun(PronounOptions::new("1-sg", PronounForms::new("I", "me")).insertion_cost(0.5))
        .unwrap();
    let you = grammar
        .new_pronoun(PronounOptions::new("2", PronounForms::new("you", "you")))
        .unwrap();

    assert_eq!(literals(&grammar, i), ["I", "me"]);
    assert_eq!(literals(&grammar, you), ["you"]);
    let text = Text::Pronoun(PronounText {
        nom: "I".into(),
        obj: "me".into(),
    });
    for rule in grammar.rules_of(i).iter().filter_map(Rule::as_terminal) {
        assert_eq!(rule.text.as_ref(), Some(&text));
    }
    assert_eq!(grammar.rules_of(i)[0].as_terminal().unwrap().insertion_cost, Some(0.5));
    assert_eq!(grammar.rules_of(i)[1].as_terminal().unwrap().insertion_cost, None);
}

#[test]
fn test_duplicate_symbol() {
    let mut grammar = Grammar::new();
    grammar
        .new_invariable_term(InvariableTermOptions::new("up", ["up"]))
        .unwrap();
    let result = grammar.new_invariable_term(InvariableTermOptions::new("up", ["upward"]));
    assert!(matches!(result, Err(GrammarError::DuplicateSymbol { ref name }) if name == "[up]"));
    assert!(matches!(
        grammar.new_symbol(&["up"]),
        Err(GrammarError::DuplicateSymbol { .. })
    ));
}

struct Vocabulary {
    grammar: Grammar,
    follow: Symbol,
    look: Symbol,
    up: Symbol,
}

fn vocabulary() -> Vocabulary {
    let mut grammar = Grammar::new();
    let follow = grammar
        .new_verb(VerbOptions::new(
            "follow",
            VerbForms::new("follow", "follows", "follow", "followed"),
        ))
        .unwrap();
    let look = grammar
        .new_verb(VerbOptions::new("look", VerbForms::new("look", "looks", "look", "looked")))
        .unwrap();
    let up = grammar
        .new_invariable_term(InvariableTermOptions::new("up", ["up"]))
        .unwrap();
    Vocabulary {
        grammar,
        follow,
        look,
        up,
    }
}

#[test]
fn test_term_sequence() {
    let Vocabulary {
        mut grammar,
        follow,
        look,
        up,
    } = vocabulary();
    let seq = grammar
        .new_term_sequence(
            TermSequenceOptions::new("follow-seq", TermType::Verb, [follow])
                .insertion_cost(3.0)
                .substituted_terms([SequenceTerm::from([look, up]).cost_penalty(1.0)]),
        )
        .unwrap();

    support::assert_eq_rules(&grammar, seq, &["[follow] @0", "[look] ~ [up] @1"]);
    let follow_text = grammar.term_set(follow).unwrap().text.clone();
    let rules: Vec<&NonterminalRule> = grammar
        .rules_of(seq)
        .iter()
        .filter_map(Rule::as_nonterminal)
        .collect();
    assert_eq!(rules[0].insertion_cost, Some(3.0));
    assert_eq!(rules[0].text, None);
    assert_eq!(rules[1].insertion_cost, None);
    assert_eq!(rules[1].text.as_ref(), Some(&follow_text));

    let term_set = grammar.term_set(seq).unwrap();
    assert_eq!(term_set.kind, TermSetKind::Sequence(TermType::Verb));
    assert_eq!(term_set.text, follow_text);
}

#[test]
fn test_term_sequence_type_checking() {
    let Vocabulary {
        mut grammar,
        follow,
        look,
        up,
    } = vocabulary();
    let plain = grammar.new_symbol(&["plain"]).unwrap();
    let num_syms = grammar.num_syms();

    let wrong_type = TermSequenceOptions::new("a", TermType::Invariable, [follow]);
    let not_a_term_set = TermSequenceOptions::new("b", TermType::Verb, [SequenceTerm::from([look, plain])]);
    let no_verb = TermSequenceOptions::new("c", TermType::Verb, [SequenceTerm::from([up, up])]);
    let too_long = TermSequenceOptions::new(
        "d",
        TermType::Verb,
        [SequenceTerm {
            symbols: vec![look, up, up],
            no_insertion_indexes: vec![],
            cost_penalty: 0.0,
        }],
    );
    for options in [wrong_type, not_a_term_set, no_verb, too_long] {
        let result = grammar.new_term_sequence(options);
        assert!(
            matches!(result, Err(GrammarError::IllFormedOptions { .. })),
            "{:?}",
            result
        );
    }
    assert_eq!(grammar.num_syms(), num_syms);

    // A pair needs only one member of the sequence type.
    grammar
        .new_term_sequence(TermSequenceOptions::new("e", TermType::Verb, [[look, up]]))
        .unwrap();
}

#[test]
fn test_term_sequence_binary_symbol() {
    let Vocabulary {
        mut grammar,
        look,
        up,
        ..
    } = vocabulary();
    let look_up = grammar
        .new_term_sequence_binary_symbol(TermType::Verb, [look, up])
        .unwrap();
    assert_eq!(grammar.name_of(look_up), "[look-up]");
    support::assert_eq_rules(&grammar, look_up, &["[look] ~ [up] @0"]);
    assert_eq!(
        grammar.term_set(look_up).unwrap().text.len(),
        2,
        "display text of both members"
    );
}

#[test]
fn test_term_set_takes_no_more_rules() {
    let Vocabulary { mut grammar, up, .. } = vocabulary();
    let result = grammar.add_rule(up, TerminalRule::new("upward"));
    assert!(matches!(result, Err(GrammarError::IllFormedOptions { .. })));
}
