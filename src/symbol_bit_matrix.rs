//! Relations between symbols in the form of bit matrices.

use std::ops::{self, Deref, DerefMut};

use bit_matrix::BitMatrix;
use log::trace;

use crate::grammar::Grammar;
use crate::symbol::Symbol;

/// A matrix that represents a relation `R(A, B)` between two symbols.
#[derive(Debug)]
pub struct SymbolBitMatrix {
    bit_matrix: BitMatrix,
}

impl SymbolBitMatrix {
    fn new(num_syms: usize) -> Self {
        SymbolBitMatrix {
            bit_matrix: BitMatrix::new(num_syms, num_syms),
        }
    }

    fn set(&mut self, row: Symbol, col: Symbol, included: bool) {
        self.bit_matrix.set(row.usize(), col.usize(), included);
    }

    /// Computes the direct derivation matrix: `A` derives `B` if `B` is a
    /// child of some rule of `A`, or was one before collapsing.
    pub fn direct_derivation_matrix(grammar: &Grammar) -> Self {
        let mut derivation = Self::new(grammar.num_syms());
        for lhs in grammar.symbols() {
            for &sym in grammar.collapsed_children(lhs) {
                derivation.set(lhs, sym, true);
            }
            for rule in grammar.rules_of(lhs) {
                if let Some(rule) = rule.as_nonterminal() {
                    for sym in rule.rhs_symbols() {
                        derivation.set(lhs, sym, true);
                    }
                }
            }
        }
        derivation
    }

    /// Computes the reachability matrix. A symbol is reachable from itself.
    pub fn reachability_matrix(grammar: &Grammar) -> Self {
        let mut reachability = Self::direct_derivation_matrix(grammar);
        reachability.transitive_closure();
        reachability.reflexive_closure();
        trace!("reachability matrix of {} symbols", grammar.num_syms());
        reachability
    }

    /// Creates an iterator over symbols which appear in the given row.
    pub fn iter_row_syms(&self, row: Symbol) -> impl Iterator<Item = Symbol> + '_ {
        self.bit_matrix
            .iter_row(row.usize())
            .enumerate()
            .filter_map(|(id, present)| if present { Some(Symbol::from(id)) } else { None })
    }
}

impl Deref for SymbolBitMatrix {
    type Target = BitMatrix;
    fn deref(&self) -> &Self::Target {
        &self.bit_matrix
    }
}

impl DerefMut for SymbolBitMatrix {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bit_matrix
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl ops::Index<(Symbol, Symbol)> for SymbolBitMatrix {
    type Output = bool;
    fn index(&self, index: (Symbol, Symbol)) -> &Self::Output {
        if self.bit_matrix[(index.0.usize(), index.1.usize())] {
            &TRUE
        } else {
            &FALSE
        }
    }
}
