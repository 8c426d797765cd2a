//! Definitions of the grammar store: symbols, their rules, and the
//! registries built alongside them.

use std::collections::BTreeMap;
use std::fmt::Write;

use log::trace;

use crate::entity::EntityRegistry;
use crate::error::{check_cost, GrammarError, Result};
use crate::rule::{Insertion, NonterminalRule, Rule};
use crate::rule_builder::RuleBuilder;
use crate::semantic::{SemanticNode, SemanticOptions, SemanticRegistry};
use crate::symbol::{hyphenate, Symbol};
use crate::term_set::TermSet;

/// Name of the start symbol.
pub const START_SYMBOL: &str = "[start]";
/// Name of the empty-string symbol. Rules with it as a child make the
/// child optional.
pub const EMPTY_SYMBOL: &str = "<empty>";

/// Mutable intermediate representation of a grammar under construction.
///
/// One value holds the single namespace shared by every module that
/// authors rules; it is passed explicitly to each of them.
#[derive(Clone, Debug)]
pub struct Grammar {
    symbols: Vec<SymbolData>,
    names: BTreeMap<String, Symbol>,
    start: Symbol,
    empty: Symbol,
    pub(crate) semantics: SemanticRegistry,
    pub(crate) entities: EntityRegistry,
}

/// Everything the store knows about one symbol.
#[derive(Clone, Debug)]
pub(crate) struct SymbolData {
    pub(crate) name: String,
    pub(crate) rules: Vec<Rule>,
    pub(crate) term_set: Option<TermSet>,
    /// Set when an `<empty>` rule made this symbol match zero tokens.
    pub(crate) zero_token: Option<Insertion>,
    /// Children dropped from this symbol's rules because they match only
    /// the empty string.
    pub(crate) collapsed_children: Vec<Symbol>,
}

impl SymbolData {
    fn new(name: String) -> Self {
        SymbolData {
            name,
            rules: vec![],
            term_set: None,
            zero_token: None,
            collapsed_children: vec![],
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Creates a grammar holding only the start and empty-string symbols.
    pub fn new() -> Self {
        let mut grammar = Grammar {
            symbols: vec![],
            names: BTreeMap::new(),
            start: Symbol::default(),
            empty: Symbol::default(),
            semantics: SemanticRegistry::new(),
            entities: EntityRegistry::new(),
        };
        grammar.start = grammar.push_symbol(SymbolData::new(START_SYMBOL.to_string()));
        grammar.empty = grammar.push_symbol(SymbolData::new(EMPTY_SYMBOL.to_string()));
        grammar
    }

    pub fn start_symbol(&self) -> Symbol {
        self.start
    }

    pub fn empty_symbol(&self) -> Symbol {
        self.empty
    }

    /// Creates a symbol named by hyphenating `parts`, e.g. `[be-pl]`.
    ///
    /// Fails if the name is taken, which guards against collisions between
    /// independently authored modules.
    pub fn new_symbol<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<Symbol> {
        if parts.is_empty() || parts.iter().any(|part| part.as_ref().is_empty()) {
            return Err(GrammarError::ill_formed(
                "symbol",
                "name parts must be non-empty",
            ));
        }
        let name = hyphenate(parts);
        self.check_new_name(&name)?;
        Ok(self.push_symbol(SymbolData::new(name)))
    }

    pub(crate) fn check_new_name(&self, name: &str) -> Result<()> {
        if self.names.contains_key(name) {
            Err(GrammarError::DuplicateSymbol {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn push_symbol(&mut self, data: SymbolData) -> Symbol {
        let sym = Symbol::from(self.symbols.len());
        trace!("new symbol {}", data.name);
        self.names.insert(data.name.clone(), sym);
        self.symbols.push(data);
        sym
    }

    /// Validates every rule against the others, then registers a symbol
    /// owning them. Nothing is committed on failure.
    pub(crate) fn commit_symbol(
        &mut self,
        name: String,
        rules: Vec<Rule>,
        term_set: Option<TermSet>,
    ) -> Result<Symbol> {
        self.check_new_name(&name)?;
        let mut scratch: Vec<Rule> = Vec::with_capacity(rules.len());
        for rule in rules {
            self.validate_rule(&name, &rule, &scratch)?;
            scratch.push(rule);
        }
        let sym = self.push_symbol(SymbolData {
            name,
            rules: scratch,
            term_set,
            zero_token: None,
            collapsed_children: vec![],
        });
        Ok(sym)
    }

    /// Adds a rule to `lhs`.
    ///
    /// Rejects malformed rules, unresolved children, rules on reserved or
    /// term-set symbols, and a right-hand side already present on `lhs`.
    pub fn add_rule(&mut self, lhs: Symbol, rule: impl Into<Rule>) -> Result<()> {
        let rule = rule.into();
        let data = self.data(lhs)?;
        if lhs == self.empty {
            return Err(GrammarError::ill_formed(
                "rule",
                format!("`{}` cannot have rules", EMPTY_SYMBOL),
            ));
        }
        if data.term_set.is_some() {
            return Err(GrammarError::ill_formed(
                "rule",
                format!("`{}` is a term set and cannot take more rules", data.name),
            ));
        }
        self.validate_rule(&data.name, &rule, &data.rules)?;
        trace!("add rule {} -> {}", data.name, self.rhs_to_string(&rule));
        self.symbols[lhs.usize()].rules.push(rule);
        Ok(())
    }

    /// Creates a symbol for a binary rule, named after its children, and
    /// adds the rule to it.
    pub fn new_binary_rule(&mut self, rule: NonterminalRule) -> Result<Symbol> {
        if !rule.is_binary() {
            return Err(GrammarError::ill_formed(
                "binary rule",
                format!("expected 2 children, got {}", rule.rhs.len()),
            ));
        }
        let mut parts = Vec::with_capacity(2);
        for sym in rule.rhs_symbols() {
            parts.push(self.data(sym)?.name.clone());
        }
        self.commit_symbol(hyphenate(&parts), vec![rule.into()], None)
    }

    /// Starts building rules for `lhs`.
    pub fn rule(&mut self, lhs: Symbol) -> RuleBuilder<'_> {
        RuleBuilder::new(self, lhs)
    }

    pub(crate) fn validate_rule(&self, lhs_name: &str, rule: &Rule, existing: &[Rule]) -> Result<()> {
        const WHAT: &str = "rule";
        match rule {
            Rule::Terminal(terminal) => {
                if terminal.literal.is_empty() || terminal.literal.contains(char::is_whitespace) {
                    return Err(GrammarError::MalformedTerminal {
                        symbol: lhs_name.to_string(),
                        literal: terminal.literal.clone(),
                    });
                }
                check_cost(WHAT, "cost_penalty", terminal.cost_penalty)?;
                if let Some(cost) = terminal.insertion_cost {
                    check_cost(WHAT, "insertion_cost", cost)?;
                    if terminal.entity.is_some() || terminal.is_int() {
                        return Err(GrammarError::ill_formed(
                            WHAT,
                            format!("placeholder `{}` cannot be inserted", terminal.literal),
                        ));
                    }
                }
                if let Some(range) = terminal.int_range {
                    if range.min > range.max {
                        return Err(GrammarError::ill_formed(
                            WHAT,
                            format!("integer range {}..={} is empty", range.min, range.max),
                        ));
                    }
                }
            }
            Rule::Nonterminal(nonterminal) => {
                let len = nonterminal.rhs.len();
                if !(1..=2).contains(&len) {
                    return Err(GrammarError::ill_formed(
                        WHAT,
                        format!("`{}` has {} children, expected 1 or 2", lhs_name, len),
                    ));
                }
                for sym in nonterminal.rhs_symbols() {
                    self.data(sym)?;
                }
                check_cost(WHAT, "cost", nonterminal.cost)?;
                if let Some(cost) = nonterminal.transposition_cost {
                    check_cost(WHAT, "transposition_cost", cost)?;
                    if len != 2 {
                        return Err(GrammarError::ill_formed(
                            WHAT,
                            format!("transposition on unary rule of `{}`", lhs_name),
                        ));
                    }
                }
                if let Some(cost) = nonterminal.insertion_cost {
                    check_cost(WHAT, "insertion_cost", cost)?;
                }
                if let Some(&index) = nonterminal.no_insertion_indexes.iter().find(|&&i| i >= len) {
                    return Err(GrammarError::ill_formed(
                        WHAT,
                        format!("no-insertion index {} out of bounds on `{}`", index, lhs_name),
                    ));
                }
            }
        }
        let key = rule.rhs_key();
        if existing.iter().any(|other| other.rhs_key() == key) {
            return Err(GrammarError::DuplicateRule {
                symbol: lhs_name.to_string(),
                rhs: self.rhs_to_string(rule),
            });
        }
        Ok(())
    }

    pub(crate) fn data(&self, sym: Symbol) -> Result<&SymbolData> {
        self.symbols
            .get(sym.usize())
            .ok_or(GrammarError::UnknownSymbol { id: sym.usize() })
    }

    pub(crate) fn symbols_data(&self) -> &[SymbolData] {
        &self.symbols[..]
    }

    pub(crate) fn symbols_data_mut(&mut self) -> &mut [SymbolData] {
        &mut self.symbols[..]
    }

    /// Looks up a symbol by its full name, e.g. `[be-pl]`.
    pub fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).copied()
    }

    /// Returns the name of a symbol of this grammar.
    pub fn name_of(&self, sym: Symbol) -> &str {
        self.symbols
            .get(sym.usize())
            .map_or("<unknown>", |data| data.name.as_str())
    }

    /// Returns the rules of `sym` in authoring order, derived rules last.
    pub fn rules_of(&self, sym: Symbol) -> &[Rule] {
        self.symbols
            .get(sym.usize())
            .map_or(&[][..], |data| &data.rules[..])
    }

    /// Returns the term-set description of `sym`, if it is one.
    pub fn term_set(&self, sym: Symbol) -> Option<&TermSet> {
        self.symbols
            .get(sym.usize())
            .and_then(|data| data.term_set.as_ref())
    }

    /// Whether `sym` matches zero tokens as a result of empty-string collapsing.
    pub fn is_zero_token(&self, sym: Symbol) -> bool {
        sym == self.empty
            || self
                .symbols
                .get(sym.usize())
                .map_or(false, |data| data.zero_token.is_some())
    }

    /// Whether `sym` matches nothing but the empty string: `<empty>`, or a
    /// symbol whose rules all collapsed.
    pub fn matches_only_empty(&self, sym: Symbol) -> bool {
        sym == self.empty
            || self.symbols.get(sym.usize()).map_or(false, |data| {
                data.zero_token.is_some() && data.rules.is_empty()
            })
    }

    /// Returns the symbols dropped from the rules of `sym` during collapsing.
    pub fn collapsed_children(&self, sym: Symbol) -> &[Symbol] {
        self.symbols
            .get(sym.usize())
            .map_or(&[][..], |data| &data.collapsed_children[..])
    }

    /// Iterates over all symbols in creation order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> {
        (0..self.symbols.len()).map(Symbol::from)
    }

    /// Returns the number of symbols in use.
    pub fn num_syms(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the total number of rules.
    pub fn rule_count(&self) -> usize {
        self.symbols.iter().map(|data| data.rules.len()).sum()
    }

    pub fn semantics(&self) -> &SemanticRegistry {
        &self.semantics
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Registers a semantic function. See [`SemanticRegistry::new_semantic`].
    pub fn new_semantic(&mut self, options: SemanticOptions) -> Result<SemanticNode> {
        self.semantics.new_semantic(options)
    }

    /// Registers a semantic argument. See [`SemanticRegistry::new_semantic_arg`].
    pub fn new_semantic_arg(&mut self, name: impl Into<String>, cost: f64) -> Result<SemanticNode> {
        self.semantics.new_semantic_arg(name, cost)
    }

    /// Composes a semantic tree. See [`SemanticRegistry::compose`].
    pub fn compose(&self, function: &SemanticNode, args: Vec<SemanticNode>) -> Result<SemanticNode> {
        self.semantics.compose(function, args)
    }

    pub(crate) fn rhs_to_string(&self, rule: &Rule) -> String {
        match rule {
            Rule::Terminal(terminal) => format!("{:?}", terminal.literal),
            Rule::Nonterminal(nonterminal) => nonterminal
                .rhs_symbols()
                .map(|sym| self.name_of(sym))
                .collect::<Vec<_>>()
                .join(" ~ "),
        }
    }

    /// Formats the grammar to a `String`. The output looks like this:
    ///
    /// ```ignore
    /// [start] ::= [be-pl] ~ [negation];
    /// [be-pl] ::= "are";
    /// [start] ::= [negation]; // insertion
    /// ```
    pub fn stringify_to_bnf(&self) -> String {
        let mut result = String::new();
        for data in &self.symbols {
            for rule in &data.rules {
                let origin = match rule.origin() {
                    origin if origin.is_derived() => format!(" // {:?}", origin).to_lowercase(),
                    _ => String::new(),
                };
                writeln!(
                    &mut result,
                    "{} ::= {};{}",
                    data.name,
                    self.rhs_to_string(rule),
                    origin
                )
                .expect("writing to String failed");
            }
        }
        result
    }
}
