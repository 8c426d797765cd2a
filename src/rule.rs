//! This module defines grammar rules. Each symbol owns an ordered list of
//! rules. A rule is either terminal, matching a single input token, or
//! nonterminal, matching one or two child symbols.

use serde::{Deserialize, Serialize};

use crate::semantic::SemanticNode;
use crate::symbol::Symbol;

/// The literal of the integer pseudo-terminal.
pub const INT_LITERAL: &str = "<int>";

/// Display text of a rule.
///
/// Verb and pronoun texts hold every form the downstream parser needs to
/// conjugate the display according to annotations on parent rules.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Fixed(String),
    Verb(VerbText),
    Pronoun(PronounText),
}

/// Conjugation forms shared by every rule of a verb set.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerbText {
    pub one_sg: String,
    pub three_sg: String,
    pub pl: String,
    pub past: String,
}

/// Case forms shared by every rule of a pronoun set.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PronounText {
    pub nom: String,
    pub obj: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tense {
    Present,
    Past,
}

/// Dictates the verb form of the child of a rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrammaticalForm {
    Infinitive,
    Participle,
    Past,
}

/// Dictates the person-number of subsequent verbs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonNumber {
    OneSg,
    ThreeSg,
    Pl,
}

/// Dictates the case of pronouns below the rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrammaticalCase {
    Nom,
    Obj,
}

/// Bounds of an integer accepted by the `<int>` pseudo-terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

/// How a rule came to be.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOrigin {
    #[default]
    Authored,
    /// One child of an authored binary rule was elided.
    Insertion,
    /// The children of an authored binary rule were swapped.
    Transposition,
    /// An `<empty>` child was dropped from an authored rule.
    Collapsed,
}

impl RuleOrigin {
    pub fn is_derived(&self) -> bool {
        *self != RuleOrigin::Authored
    }

    pub(crate) fn is_authored(&self) -> bool {
        !self.is_derived()
    }
}

/// The cheapest way to match a symbol with zero input tokens.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Insertion {
    pub cost: f64,
    /// Display text regenerated for the missing input.
    pub text: Vec<Text>,
    /// Semantics the missing input would have contributed.
    pub semantics: Vec<SemanticNode>,
}

/// Describes the child elided by an insertion rule.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertedChild {
    /// Position of the elided child in the source rule.
    pub index: usize,
    /// The elided child.
    pub symbol: Symbol,
    pub insertion: Insertion,
}

/// A terminal rule.
#[derive(Clone, Debug, PartialEq)]
pub struct TerminalRule {
    /// A single input token.
    pub literal: String,
    /// Display text. The literal itself is displayed if `None`.
    pub text: Option<Text>,
    pub tense: Option<Tense>,
    pub insertion_cost: Option<f64>,
    /// Makes a synonym costlier than the canonical term.
    pub cost_penalty: f64,
    pub semantic: Option<SemanticNode>,
    /// Set on entity placeholders.
    pub entity: Option<String>,
    /// Set on `<int>` rules.
    pub int_range: Option<IntRange>,
}

impl TerminalRule {
    /// Creates a rule that matches and displays `literal`.
    pub fn new(literal: impl Into<String>) -> Self {
        let literal = literal.into();
        TerminalRule {
            text: Some(Text::Fixed(literal.clone())),
            literal,
            tense: None,
            insertion_cost: None,
            cost_penalty: 0.0,
            semantic: None,
            entity: None,
            int_range: None,
        }
    }

    /// Creates a rule that matches an integer within the given bounds.
    pub fn int(min: i64, max: i64) -> Self {
        TerminalRule {
            text: None,
            int_range: Some(IntRange { min, max }),
            ..TerminalRule::new(INT_LITERAL)
        }
    }

    pub(crate) fn entity_placeholder(category: &str) -> Self {
        let literal = format!("{{{}}}", category);
        TerminalRule {
            text: None,
            entity: Some(category.to_string()),
            semantic: Some(SemanticNode::Entity(category.to_string())),
            ..TerminalRule::new(literal)
        }
    }

    pub fn text(mut self, text: Text) -> Self {
        self.text = Some(text);
        self
    }

    pub fn tense(mut self, tense: Tense) -> Self {
        self.tense = Some(tense);
        self
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }

    pub fn cost_penalty(mut self, cost: f64) -> Self {
        self.cost_penalty = cost;
        self
    }

    pub fn semantic(mut self, semantic: SemanticNode) -> Self {
        self.semantic = Some(semantic);
        self
    }

    /// The text displayed when this rule is matched.
    pub fn display_text(&self) -> Text {
        self.text
            .clone()
            .unwrap_or_else(|| Text::Fixed(self.literal.clone()))
    }

    pub(crate) fn is_int(&self) -> bool {
        self.int_range.is_some()
    }
}

/// A right-hand side slot of a nonterminal rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Child {
    pub symbol: Symbol,
    /// The rule also matches without this child, at no extra cost.
    pub is_optional: bool,
    /// Never elide this child when deriving insertion rules.
    pub no_insert: bool,
    /// Suppress display text of this child and its descendants.
    pub no_text: bool,
}

impl Child {
    pub fn new(symbol: Symbol) -> Self {
        Child {
            symbol,
            is_optional: false,
            no_insert: false,
            no_text: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn no_insert(mut self) -> Self {
        self.no_insert = true;
        self
    }

    pub fn no_text(mut self) -> Self {
        self.no_text = true;
        self
    }
}

impl From<Symbol> for Child {
    fn from(symbol: Symbol) -> Self {
        Child::new(symbol)
    }
}

/// A unary or binary production.
#[derive(Clone, Debug, PartialEq)]
pub struct NonterminalRule {
    pub rhs: Vec<Child>,
    pub cost: f64,
    pub semantic: Option<SemanticNode>,
    /// Display text substituted for the text of the children.
    pub text: Option<Vec<Text>>,
    pub grammatical_form: Option<GrammaticalForm>,
    pub person_number: Option<PersonNumber>,
    pub grammatical_case: Option<GrammaticalCase>,
    /// Keeps the input tense of a matched verb through substitution.
    pub accepted_tense: Option<Tense>,
    pub transposition_cost: Option<f64>,
    /// Only term sequences carry an insertion cost on a nonterminal rule.
    pub insertion_cost: Option<f64>,
    /// The rule never sources insertions.
    pub no_insert: bool,
    /// Positions never elided when deriving insertion rules.
    pub no_insertion_indexes: Vec<usize>,
    pub origin: RuleOrigin,
    /// Set on insertion rules.
    pub inserted: Option<InsertedChild>,
}

impl NonterminalRule {
    /// Creates an authored rule with the given children.
    pub fn new<C: Into<Child>>(rhs: impl IntoIterator<Item = C>) -> Self {
        NonterminalRule {
            rhs: rhs.into_iter().map(Into::into).collect(),
            cost: 0.0,
            semantic: None,
            text: None,
            grammatical_form: None,
            person_number: None,
            grammatical_case: None,
            accepted_tense: None,
            transposition_cost: None,
            insertion_cost: None,
            no_insert: false,
            no_insertion_indexes: vec![],
            origin: RuleOrigin::Authored,
            inserted: None,
        }
    }

    pub fn unary(child: impl Into<Child>) -> Self {
        Self::new([child.into()])
    }

    pub fn binary(first: impl Into<Child>, second: impl Into<Child>) -> Self {
        Self::new([first.into(), second.into()])
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn semantic(mut self, semantic: SemanticNode) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn text(mut self, text: Vec<Text>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn grammatical_form(mut self, form: GrammaticalForm) -> Self {
        self.grammatical_form = Some(form);
        self
    }

    pub fn person_number(mut self, person_number: PersonNumber) -> Self {
        self.person_number = Some(person_number);
        self
    }

    pub fn grammatical_case(mut self, case: GrammaticalCase) -> Self {
        self.grammatical_case = Some(case);
        self
    }

    pub fn accepted_tense(mut self, tense: Tense) -> Self {
        self.accepted_tense = Some(tense);
        self
    }

    pub fn transposition_cost(mut self, cost: f64) -> Self {
        self.transposition_cost = Some(cost);
        self
    }

    pub fn no_insert(mut self) -> Self {
        self.no_insert = true;
        self
    }

    pub fn no_insertion_indexes(mut self, indexes: impl IntoIterator<Item = usize>) -> Self {
        self.no_insertion_indexes = indexes.into_iter().collect();
        self
    }

    pub(crate) fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }

    pub fn rhs_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.rhs.iter().map(|child| child.symbol)
    }

    pub fn is_binary(&self) -> bool {
        self.rhs.len() == 2
    }

    /// Whether the child at `index` may be elided by an insertion rule.
    pub(crate) fn allows_insertion_at(&self, index: usize) -> bool {
        !self.no_insert && !self.rhs[index].no_insert && !self.no_insertion_indexes.contains(&index)
    }
}

/// A grammar rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Terminal(TerminalRule),
    Nonterminal(NonterminalRule),
}

/// Identifies a rule's right-hand side, for duplicate detection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum RhsKey {
    Terminal(String),
    Nonterminal(Vec<Symbol>),
}

impl Rule {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Rule::Terminal(_))
    }

    pub fn cost(&self) -> f64 {
        match self {
            Rule::Terminal(rule) => rule.cost_penalty,
            Rule::Nonterminal(rule) => rule.cost,
        }
    }

    pub fn origin(&self) -> RuleOrigin {
        match self {
            Rule::Terminal(_) => RuleOrigin::Authored,
            Rule::Nonterminal(rule) => rule.origin,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.origin().is_derived()
    }

    pub fn semantic(&self) -> Option<&SemanticNode> {
        match self {
            Rule::Terminal(rule) => rule.semantic.as_ref(),
            Rule::Nonterminal(rule) => rule.semantic.as_ref(),
        }
    }

    pub fn as_nonterminal(&self) -> Option<&NonterminalRule> {
        match self {
            Rule::Nonterminal(rule) => Some(rule),
            Rule::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<&TerminalRule> {
        match self {
            Rule::Terminal(rule) => Some(rule),
            Rule::Nonterminal(_) => None,
        }
    }

    pub(crate) fn rhs_key(&self) -> RhsKey {
        match self {
            Rule::Terminal(rule) => RhsKey::Terminal(rule.literal.clone()),
            Rule::Nonterminal(rule) => RhsKey::Nonterminal(rule.rhs_symbols().collect()),
        }
    }
}

impl From<TerminalRule> for Rule {
    fn from(rule: TerminalRule) -> Self {
        Rule::Terminal(rule)
    }
}

impl From<NonterminalRule> for Rule {
    fn from(rule: NonterminalRule) -> Self {
        Rule::Nonterminal(rule)
    }
}
