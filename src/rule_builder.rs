//! Grammar rules can be built with the builder pattern.
//!
//! ```
//! use cfg_compile::{Child, Grammar, NonterminalRule, TerminalRule};
//!
//! # fn main() -> cfg_compile::Result<()> {
//! let mut grammar = Grammar::new();
//! let start = grammar.start_symbol();
//! let [verb, object] = [grammar.new_symbol(&["verb"])?, grammar.new_symbol(&["object"])?];
//!
//! grammar
//!     .rule(verb)
//!     .terminal(TerminalRule::new("follow"))?
//!     .rule(object)
//!     .terminal(TerminalRule::new("me"))?
//!     .rule(start)
//!     .nonterminal(NonterminalRule::binary(verb, Child::new(object).no_insert()).transposition_cost(1.0))?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::grammar::Grammar;
use crate::rule::{Child, NonterminalRule, TerminalRule};
use crate::symbol::Symbol;

/// The rule builder.
pub struct RuleBuilder<'a> {
    lhs: Symbol,
    grammar: &'a mut Grammar,
}

impl<'a> RuleBuilder<'a> {
    /// Creates a rule builder.
    pub fn new(grammar: &'a mut Grammar, lhs: Symbol) -> Self {
        RuleBuilder { lhs, grammar }
    }

    /// Switches to building rules with the given LHS.
    pub fn rule(mut self, lhs: Symbol) -> Self {
        self.lhs = lhs;
        self
    }

    /// Adds a plain rule alternative with the given children.
    pub fn rhs<C, I>(self, children: I) -> Result<Self>
    where
        C: Into<Child>,
        I: IntoIterator<Item = C>,
    {
        self.nonterminal(NonterminalRule::new(children))
    }

    /// Adds an annotated rule alternative.
    pub fn nonterminal(self, rule: NonterminalRule) -> Result<Self> {
        self.grammar.add_rule(self.lhs, rule)?;
        Ok(self)
    }

    /// Adds a terminal rule alternative.
    pub fn terminal(self, rule: TerminalRule) -> Result<Self> {
        self.grammar.add_rule(self.lhs, rule)?;
        Ok(self)
    }
}
