//! Analysis of component usefulness.
//!
//! Useful symbols are both reachable from the start symbol and productive.
//! Semantics and entity categories are useful when a reachable rule refers
//! to them.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::rhs_closure::RhsClosure;
use crate::rule::Rule;
use crate::symbol::Symbol;
use crate::symbol_bit_matrix::SymbolBitMatrix;
use crate::symbol_bit_set::SymbolBitSet;

/// Contains the information about usefulness of the grammar's symbols.
pub struct Usefulness<'a> {
    grammar: &'a Grammar,
    reachable_syms: SymbolBitSet,
    productivity: SymbolBitSet,
}

/// Everything the grammar defines but never uses, by name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnusedComponents {
    pub unreachable_symbols: Vec<String>,
    /// Reachable symbols that cannot derive any terminal string.
    pub unproductive_symbols: Vec<String>,
    pub semantics: Vec<String>,
    pub entity_categories: Vec<String>,
}

/// Returns the set of productive symbols.
fn productive_syms(grammar: &Grammar) -> SymbolBitSet {
    let mut productive_syms = SymbolBitSet::terminal(grammar);
    RhsClosure::new(grammar).rhs_closure(&mut productive_syms);
    productive_syms
}

impl<'a> Usefulness<'a> {
    /// Analyzes usefulness of the grammar's symbols. In particular, it checks
    /// for reachable and productive symbols.
    pub fn new(grammar: &'a Grammar) -> Self {
        let productivity = productive_syms(grammar);
        let reachability = SymbolBitMatrix::reachability_matrix(grammar);
        let mut reachable_syms = SymbolBitSet::from_elem(grammar, false);
        for sym in reachability.iter_row_syms(grammar.start_symbol()) {
            reachable_syms.set(sym, true);
        }

        debug_assert_eq!(reachability.size(), (productivity.len(), productivity.len()));

        Usefulness {
            grammar,
            reachable_syms,
            productivity,
        }
    }

    /// Checks whether a symbol is productive.
    pub fn productivity(&self, sym: Symbol) -> bool {
        self.productivity[sym]
    }

    /// Checks whether a symbol is reachable from the start symbol.
    pub fn reachability(&self, sym: Symbol) -> bool {
        self.reachable_syms[sym]
    }

    /// Iterates over the rules of reachable symbols.
    fn reachable_rules(&self) -> impl Iterator<Item = &'a Rule> + '_ {
        let grammar = self.grammar;
        self.reachable_syms
            .iter()
            .flat_map(move |sym| grammar.rules_of(sym).iter())
    }

    /// Collects every unused component. Reserved symbols are never reported.
    pub fn unused_components(&self) -> UnusedComponents {
        let grammar = self.grammar;
        let reserved = SymbolBitSet::reserved(grammar);

        let mut unreachable = self.reachable_syms.clone();
        unreachable.negate();
        unreachable.subtract(&reserved);

        let mut unproductive = self.productivity.clone();
        unproductive.negate();
        unproductive.subtract(&reserved);
        unproductive.intersect(&self.reachable_syms);

        let names = |set: &SymbolBitSet| -> Vec<String> {
            set.iter().map(|sym| grammar.name_of(sym).to_string()).collect()
        };

        let mut semantics = BTreeSet::new();
        let mut entities = BTreeSet::new();
        for sym in self.reachable_syms.iter() {
            let zero_token = grammar.symbols_data()[sym.usize()].zero_token.iter();
            for node in zero_token.flat_map(|insertion| &insertion.semantics) {
                node.collect_references(&mut semantics, &mut entities);
            }
        }
        for rule in self.reachable_rules() {
            if let Some(semantic) = rule.semantic() {
                semantic.collect_references(&mut semantics, &mut entities);
            }
            match rule {
                Rule::Terminal(terminal) => entities.extend(terminal.entity.iter().cloned()),
                Rule::Nonterminal(nonterminal) => {
                    for node in nonterminal.inserted.iter().flat_map(|i| &i.insertion.semantics) {
                        node.collect_references(&mut semantics, &mut entities);
                    }
                }
            }
        }

        UnusedComponents {
            unreachable_symbols: names(&unreachable),
            unproductive_symbols: names(&unproductive),
            semantics: grammar
                .semantics()
                .iter()
                .map(|(name, _)| name)
                .filter(|name| !semantics.contains(*name))
                .map(str::to_string)
                .collect(),
            entity_categories: grammar
                .entities()
                .iter()
                .map(|(name, _)| name)
                .filter(|name| !entities.contains(*name))
                .map(str::to_string)
                .collect(),
        }
    }
}

impl UnusedComponents {
    pub fn is_empty(&self) -> bool {
        self.unreachable_symbols.is_empty()
            && self.unproductive_symbols.is_empty()
            && self.semantics.is_empty()
            && self.entity_categories.is_empty()
    }

    fn sections(&self) -> [(&'static str, &[String]); 4] {
        [
            ("unreachable symbol", &self.unreachable_symbols[..]),
            ("unproductive symbol", &self.unproductive_symbols[..]),
            ("unused semantic", &self.semantics[..]),
            ("unused entity category", &self.entity_categories[..]),
        ]
    }
}

impl fmt::Display for UnusedComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, names) in self.sections() {
            for name in names {
                writeln!(f, "  {} `{}`", label, name)?;
            }
        }
        Ok(())
    }
}

impl Grammar {
    /// Reports unreachable and unproductive symbols, and semantics and
    /// entity categories no reachable rule refers to.
    pub fn unused_components(&self) -> UnusedComponents {
        Usefulness::new(self).unused_components()
    }

    /// Fails with every unused component at once. Each finding is also
    /// logged as a warning.
    pub fn check_unused(&self) -> Result<()> {
        let unused = self.unused_components();
        if unused.is_empty() {
            return Ok(());
        }
        for (label, names) in unused.sections() {
            for name in names {
                warn!("{} `{}`", label, name);
            }
        }
        Err(GrammarError::UnreachableComponents(unused))
    }
}
