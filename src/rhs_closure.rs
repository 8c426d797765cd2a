//! Closure of a symbol property over rule right-hand sides.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::symbol_bit_set::SymbolBitSet;

/// A rule viewed as `lhs ::= rhs`, with optional children left out.
struct ClosureRule {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

pub struct RhsClosure {
    rules: Vec<ClosureRule>,
    /// Pairs of a symbol and a rule that has it on the RHS, sorted.
    derived_by: Vec<(Symbol, usize)>,
    work_stack: Vec<Symbol>,
}

impl RhsClosure {
    /// Records information which is needed to calculate the RHS transitive closure.
    pub fn new(grammar: &Grammar) -> Self {
        let mut rules = vec![];
        for lhs in grammar.symbols() {
            for rule in grammar.rules_of(lhs) {
                if let Some(rule) = rule.as_nonterminal() {
                    let rhs = rule
                        .rhs
                        .iter()
                        .filter(|child| !child.is_optional)
                        .map(|child| child.symbol)
                        .collect();
                    rules.push(ClosureRule { lhs, rhs });
                }
            }
        }
        let mut derived_by = Vec::with_capacity(2 * rules.len());
        for (index, rule) in rules.iter().enumerate() {
            derived_by.extend(rule.rhs.iter().map(|&sym| (sym, index)));
        }
        derived_by.sort_unstable();

        RhsClosure {
            rules,
            derived_by,
            work_stack: vec![],
        }
    }

    /// Calculates the RHS transitive closure: a rule's LHS gets the property
    /// once every symbol on its RHS has it.
    pub fn rhs_closure(&mut self, property: &mut SymbolBitSet) {
        self.work_stack.extend(property.iter());
        // Rules with only optional children hold the property unconditionally.
        for rule in &self.rules {
            if rule.rhs.is_empty() && !property[rule.lhs] {
                property.set(rule.lhs, true);
                self.work_stack.push(rule.lhs);
            }
        }

        while let Some(work_sym) = self.work_stack.pop() {
            let start = self.derived_by.partition_point(|&(sym, _)| sym < work_sym);
            for &(sym, index) in &self.derived_by[start..] {
                if sym != work_sym {
                    break;
                }
                let rule = &self.rules[index];
                if !property[rule.lhs] && rule.rhs.iter().all(|&sym| property[sym]) {
                    property.set(rule.lhs, true);
                    self.work_stack.push(rule.lhs);
                }
            }
        }
    }
}
