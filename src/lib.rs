//! Compiler for cost-annotated natural-language grammars.
//!
//! Independently authored fragments (verbs, invariable terms, pronouns,
//! term sequences, binary productions, semantics and entity categories) are
//! consolidated into one grammar. Compilation derives insertion and
//! transposition rules from declared costs, checks for unused components,
//! and writes a JSON artifact for the parser.

#![deny(unsafe_code)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

pub mod artifact;
pub mod compile;
pub mod edit_rules;
pub mod entity;
pub mod error;
pub mod grammar;
mod rhs_closure;
pub mod rule;
pub mod rule_builder;
pub mod semantic;
pub mod symbol;
pub mod symbol_bit_matrix;
pub mod symbol_bit_set;
pub mod term_set;
pub mod usefulness;

pub use crate::artifact::{Artifact, ArtifactInsertion, ArtifactRule};
pub use crate::compile::{CompileConfig, RuleCountReport};
pub use crate::edit_rules::DeriveStats;
pub use crate::entity::{Entity, EntityCategory, EntityCategoryOptions};
pub use crate::error::{GrammarError, Result};
pub use crate::grammar::{Grammar, EMPTY_SYMBOL, START_SYMBOL};
pub use crate::rule::{
    Child, GrammaticalCase, GrammaticalForm, Insertion, NonterminalRule, PersonNumber, PronounText,
    Rule, RuleOrigin, Tense, TerminalRule, Text, VerbText, INT_LITERAL,
};
pub use crate::rule_builder::RuleBuilder;
pub use crate::semantic::{SemanticDef, SemanticNode, SemanticOptions};
pub use crate::symbol::Symbol;
pub use crate::term_set::{
    InvariableTermOptions, PronounForms, PronounOptions, SequenceTerm, SubstitutedTerm,
    TermSequenceOptions, TermSetKind, TermType, VerbForms, VerbOptions,
};
pub use crate::usefulness::UnusedComponents;
