//! Sets of symbols in the form of bit vectors.

use std::{iter, ops};

use bit_vec::BitVec;

use crate::grammar::Grammar;
use crate::rule::Rule;
use crate::symbol::Symbol;

/// A set of symbols in the form of a bit vector.
#[derive(Clone, Debug, Default)]
pub struct SymbolBitSet {
    bit_vec: BitVec,
}

/// An iterator over a symbol set.
pub struct Iter<'a> {
    iter: iter::Enumerate<bit_vec::Iter<'a>>,
}

impl SymbolBitSet {
    /// Constructs an empty `SymbolBitSet`.
    pub fn new() -> Self {
        SymbolBitSet {
            bit_vec: BitVec::new(),
        }
    }

    /// Constructs a `SymbolBitSet` with one bit per symbol of `grammar`.
    pub fn from_elem(grammar: &Grammar, elem: bool) -> Self {
        SymbolBitSet {
            bit_vec: BitVec::from_elem(grammar.num_syms(), elem),
        }
    }

    /// Constructs the set of symbols that derive a terminal string in one
    /// step: those with a terminal rule, zero-token symbols and `<empty>`.
    ///
    /// Constructs a data structure in O(n) time.
    pub fn terminal(grammar: &Grammar) -> Self {
        let mut set = Self::from_elem(grammar, false);
        for sym in grammar.symbols() {
            if grammar.is_zero_token(sym) || grammar.rules_of(sym).iter().any(Rule::is_terminal) {
                set.set(sym, true);
            }
        }
        set
    }

    /// The reserved start and empty-string symbols.
    pub fn reserved(grammar: &Grammar) -> Self {
        let mut set = Self::from_elem(grammar, false);
        set.set(grammar.start_symbol(), true);
        set.set(grammar.empty_symbol(), true);
        set
    }

    pub fn set(&mut self, index: Symbol, elem: bool) {
        self.bit_vec.set(index.usize(), elem);
    }

    pub fn negate(&mut self) {
        self.bit_vec.negate();
    }

    pub fn union(&mut self, other: &SymbolBitSet) {
        self.bit_vec.or(&other.bit_vec);
    }

    pub fn intersect(&mut self, other: &SymbolBitSet) {
        self.bit_vec.and(&other.bit_vec);
    }

    pub fn subtract(&mut self, other: &SymbolBitSet) {
        self.bit_vec.difference(&other.bit_vec);
    }

    pub fn bit_vec(&self) -> &BitVec {
        &self.bit_vec
    }

    /// Iterates over symbols in the set.
    pub fn iter(&self) -> Iter {
        Iter {
            iter: self.bit_vec.iter().enumerate(),
        }
    }

    pub fn len(&self) -> usize {
        self.bit_vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bit_vec.is_empty()
    }

    pub fn all(&self) -> bool {
        self.bit_vec.all()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        for (id, is_present) in &mut self.iter {
            if is_present {
                return Some(Symbol::from(id));
            }
        }
        None
    }
}

static TRUE: bool = true;
static FALSE: bool = false;

impl ops::Index<Symbol> for SymbolBitSet {
    type Output = bool;

    fn index(&self, index: Symbol) -> &Self::Output {
        if self.bit_vec[index.usize()] {
            &TRUE
        } else {
            &FALSE
        }
    }
}
