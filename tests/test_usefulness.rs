mod support;

use cfg_compile::*;

#[test]
fn test_new_grammar_has_no_unused_components() {
    let grammar = Grammar::new();
    assert!(grammar.unused_components().is_empty());
    assert!(grammar.check_unused().is_ok());
}

#[test]
fn test_all_useful() {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let not = grammar.new_semantic(SemanticOptions::new("not", 0.0, 1, 1)).unwrap();
    let be = grammar.new_symbol(&["be"]).unwrap();
    let negation = grammar.new_symbol(&["negation"]).unwrap();
    grammar
        .rule(be)
        .terminal(TerminalRule::new("is"))
        .unwrap()
        .rule(negation)
        .terminal(TerminalRule::new("not"))
        .unwrap()
        .rule(start)
        .nonterminal(NonterminalRule::binary(be, negation).semantic(not))
        .unwrap();

    assert_eq!(grammar.unused_components(), UnusedComponents::default());
    assert!(grammar.check_unused().is_ok());
}

#[test]
fn test_unused_components_are_aggregated() {
    support::init_logging();
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let used = grammar.new_semantic(SemanticOptions::new("used", 0.0, 1, 1)).unwrap();
    grammar
        .new_semantic(SemanticOptions::new("unused", 0.0, 1, 1))
        .unwrap();
    grammar.new_semantic_arg("nobody", 0.0).unwrap();
    let x = grammar
        .new_invariable_term(InvariableTermOptions::new("x", ["x"]))
        .unwrap();
    let loopy = grammar.new_symbol(&["loopy"]).unwrap();
    grammar
        .new_invariable_term(InvariableTermOptions::new("orphan", ["orphan"]))
        .unwrap();
    let user = grammar
        .new_entity_category(EntityCategoryOptions::new("user", [Entity::new("Aang", ["aang"])]))
        .unwrap();
    grammar
        .new_entity_category(EntityCategoryOptions::new("repo", [Entity::new("cfg", ["cfg"])]))
        .unwrap();
    grammar
        .rule(start)
        .nonterminal(NonterminalRule::binary(user, x).semantic(used))
        .unwrap()
        .rhs([loopy])
        .unwrap()
        .rule(loopy)
        .rhs([loopy, x])
        .unwrap();

    let expected = UnusedComponents {
        unreachable_symbols: vec!["[orphan]".into(), "{repo}".into()],
        unproductive_symbols: vec!["[loopy]".into()],
        semantics: vec!["nobody".into(), "unused".into()],
        entity_categories: vec!["repo".into()],
    };
    assert_eq!(grammar.unused_components(), expected);
    match grammar.check_unused() {
        Err(GrammarError::UnreachableComponents(unused)) => {
            assert_eq!(unused, expected);
            let message = unused.to_string();
            assert!(message.contains("unreachable symbol `[orphan]`"), "{}", message);
            assert!(message.contains("unused entity category `repo`"), "{}", message);
        }
        other => panic!("expected unused components, got {:?}", other),
    }
}

#[test]
fn test_inserted_semantics_count_as_used() {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let me = grammar.new_semantic_arg("me", 0.0).unwrap();
    let verb = grammar
        .new_invariable_term(InvariableTermOptions::new("follow", ["follow"]))
        .unwrap();
    let obj = grammar.new_symbol(&["obj"]).unwrap();
    grammar
        .rule(obj)
        .terminal(TerminalRule::new("me").insertion_cost(1.0).semantic(me))
        .unwrap()
        .rule(start)
        .rhs([verb, obj])
        .unwrap();

    grammar.derive_edit_rules().unwrap();

    assert!(grammar.unused_components().is_empty());
    assert_eq!(support::derived_count(&grammar), 1);
}

#[test]
fn test_zero_token_symbol_is_productive() {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let empty = grammar.empty_symbol();
    let x = grammar
        .new_invariable_term(InvariableTermOptions::new("x", ["x"]))
        .unwrap();
    let nothing = grammar.new_symbol(&["nothing"]).unwrap();
    grammar
        .rule(nothing)
        .rhs([empty])
        .unwrap()
        .rule(start)
        .rhs([x, nothing])
        .unwrap();

    assert!(grammar.unused_components().is_empty());
    grammar.derive_edit_rules().unwrap();
    assert!(grammar.unused_components().is_empty());
}

#[test]
fn test_collapsed_child_stays_reachable() {
    let mut grammar = Grammar::new();
    let start = grammar.start_symbol();
    let empty = grammar.empty_symbol();
    let polite = grammar.new_semantic_arg("polite", 0.0).unwrap();
    let x = grammar
        .new_invariable_term(InvariableTermOptions::new("x", ["x"]))
        .unwrap();
    let please = grammar.new_symbol(&["please"]).unwrap();
    let stray = grammar.new_symbol(&["stray"]).unwrap();
    grammar
        .rule(please)
        .nonterminal(NonterminalRule::unary(empty).semantic(polite))
        .unwrap()
        .rule(stray)
        .rhs([empty])
        .unwrap()
        .rule(start)
        .rhs([x, please])
        .unwrap();

    grammar.derive_edit_rules().unwrap();

    assert!(grammar.rules_of(please).is_empty());
    assert_eq!(
        grammar.unused_components(),
        UnusedComponents {
            unreachable_symbols: vec!["[stray]".into()],
            ..UnusedComponents::default()
        }
    );
}
