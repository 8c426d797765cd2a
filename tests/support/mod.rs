#![allow(dead_code)]

use cfg_compile::{Grammar, Rule, RuleOrigin, Symbol, Text};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn text_to_string(text: &[Text]) -> String {
    text.iter()
        .map(|text| match text {
            Text::Fixed(fixed) => fixed.clone(),
            Text::Verb(verb) => verb.one_sg.clone(),
            Text::Pronoun(pronoun) => pronoun.nom.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Describes a rule as `[a] ~ [b] @cost origin(index: text)`.
pub fn describe(grammar: &Grammar, rule: &Rule) -> String {
    let rhs = match rule {
        Rule::Terminal(terminal) => format!("{:?}", terminal.literal),
        Rule::Nonterminal(nonterminal) => nonterminal
            .rhs_symbols()
            .map(|sym| grammar.name_of(sym))
            .collect::<Vec<_>>()
            .join(" ~ "),
    };
    let mut result = format!("{} @{}", rhs, rule.cost());
    if let Some(nonterminal) = rule.as_nonterminal() {
        if nonterminal.origin != RuleOrigin::Authored {
            result.push_str(&format!(" {:?}", nonterminal.origin).to_lowercase());
        }
        if let Some(inserted) = &nonterminal.inserted {
            result.push_str(&format!(
                "({}: {})",
                inserted.index,
                text_to_string(&inserted.insertion.text)
            ));
        }
    }
    result
}

/// The rules of `lhs`, described and sorted.
pub fn rules(grammar: &Grammar, lhs: Symbol) -> Vec<String> {
    let mut rules: Vec<_> = grammar
        .rules_of(lhs)
        .iter()
        .map(|rule| describe(grammar, rule))
        .collect();
    rules.sort();
    rules
}

/// Every rule of the grammar, prefixed with its LHS name, sorted.
pub fn all_rules(grammar: &Grammar) -> Vec<String> {
    let mut rules: Vec<_> = grammar
        .symbols()
        .flat_map(|lhs| {
            grammar
                .rules_of(lhs)
                .iter()
                .map(move |rule| format!("{} ::= {}", grammar.name_of(lhs), describe(grammar, rule)))
        })
        .collect();
    rules.sort();
    rules
}

pub fn assert_eq_rules(grammar: &Grammar, lhs: Symbol, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    let actual = rules(grammar, lhs);
    if actual != expected {
        eprintln!("{}", grammar.stringify_to_bnf());
    }
    assert_eq!(actual, expected, "rules of {}", grammar.name_of(lhs));
}

pub fn derived_count(grammar: &Grammar) -> usize {
    grammar
        .symbols()
        .flat_map(|lhs| grammar.rules_of(lhs))
        .filter(|rule| rule.is_derived())
        .count()
}
