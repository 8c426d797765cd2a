//! Builders for term sets: symbols whose rules together form one vocabulary
//! item.
//!
//! Each builder validates its whole options value, then builds every rule
//! into a scratch list before registering the symbol. A failing builder
//! leaves the grammar untouched.
//!
//! Rules of a set share one display text. Verb and pronoun sets share a
//! conjugation record that the parser resolves using annotations of parent
//! rules, rather than one set per grammatical case.

use log::trace;

use crate::error::{check_cost, GrammarError, Result};
use crate::grammar::Grammar;
use crate::rule::{NonterminalRule, PronounText, Rule, Tense, TerminalRule, Text, VerbText};
use crate::symbol::{hyphenate, Symbol};

/// The vocabulary type of a term set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TermType {
    Verb,
    Invariable,
    Pronoun,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TermSetKind {
    Verb,
    Invariable,
    Pronoun,
    /// A set of other term sets, or pairs of them.
    Sequence(TermType),
}

impl TermSetKind {
    pub fn term_type(self) -> TermType {
        match self {
            TermSetKind::Verb => TermType::Verb,
            TermSetKind::Invariable => TermType::Invariable,
            TermSetKind::Pronoun => TermType::Pronoun,
            TermSetKind::Sequence(term_type) => term_type,
        }
    }
}

/// Marks a symbol as a term set.
#[derive(Clone, Debug, PartialEq)]
pub struct TermSet {
    pub kind: TermSetKind,
    /// Display text shared by the set; substitutions display this.
    pub text: Vec<Text>,
}

/// The inflections of a verb.
///
/// `one_sg`, `three_sg` and `pl` are chosen by `person_number` of preceding
/// rules, `past` by `grammatical_form` of the parent rule or kept when input
/// through `accepted_tense`. The remaining forms are accepted spellings only.
#[derive(Clone, Debug, Default)]
pub struct VerbForms {
    pub one_sg: String,
    pub three_sg: String,
    pub pl: String,
    pub past: String,
    pub present_subjunctive: Option<String>,
    pub present_participle: Option<String>,
    pub past_participle: Option<String>,
}

impl VerbForms {
    pub fn new(
        one_sg: impl Into<String>,
        three_sg: impl Into<String>,
        pl: impl Into<String>,
        past: impl Into<String>,
    ) -> Self {
        VerbForms {
            one_sg: one_sg.into(),
            three_sg: three_sg.into(),
            pl: pl.into(),
            past: past.into(),
            ..Default::default()
        }
    }

    pub fn present_subjunctive(mut self, form: impl Into<String>) -> Self {
        self.present_subjunctive = Some(form.into());
        self
    }

    pub fn present_participle(mut self, form: impl Into<String>) -> Self {
        self.present_participle = Some(form.into());
        self
    }

    pub fn past_participle(mut self, form: impl Into<String>) -> Self {
        self.past_participle = Some(form.into());
        self
    }

    fn text(&self) -> VerbText {
        VerbText {
            one_sg: self.one_sg.clone(),
            three_sg: self.three_sg.clone(),
            pl: self.pl.clone(),
            past: self.past.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VerbOptions {
    pub symbol_name: String,
    /// Assigned to the `one_sg` rule only.
    pub insertion_cost: Option<f64>,
    pub forms: VerbForms,
}

impl VerbOptions {
    pub fn new(symbol_name: impl Into<String>, forms: VerbForms) -> Self {
        VerbOptions {
            symbol_name: symbol_name.into(),
            insertion_cost: None,
            forms,
        }
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }
}

/// A term displayed as the first accepted term when input.
#[derive(Clone, Debug, PartialEq)]
pub struct SubstitutedTerm {
    pub term: String,
    pub cost_penalty: f64,
}

impl SubstitutedTerm {
    pub fn new(term: impl Into<String>, cost_penalty: f64) -> Self {
        SubstitutedTerm {
            term: term.into(),
            cost_penalty,
        }
    }
}

impl From<&str> for SubstitutedTerm {
    fn from(term: &str) -> Self {
        SubstitutedTerm::new(term, 0.0)
    }
}

#[derive(Clone, Debug)]
pub struct InvariableTermOptions {
    pub symbol_name: String,
    /// Assigned to the first accepted term only.
    pub insertion_cost: Option<f64>,
    pub accepted_terms: Vec<String>,
    pub substituted_terms: Vec<SubstitutedTerm>,
}

impl InvariableTermOptions {
    pub fn new<S: Into<String>>(symbol_name: impl Into<String>, accepted_terms: impl IntoIterator<Item = S>) -> Self {
        InvariableTermOptions {
            symbol_name: symbol_name.into(),
            insertion_cost: None,
            accepted_terms: accepted_terms.into_iter().map(Into::into).collect(),
            substituted_terms: vec![],
        }
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }

    pub fn substituted_terms<T: Into<SubstitutedTerm>>(mut self, terms: impl IntoIterator<Item = T>) -> Self {
        self.substituted_terms = terms.into_iter().map(Into::into).collect();
        self
    }
}

/// The case forms of a personal pronoun.
#[derive(Clone, Debug)]
pub struct PronounForms {
    pub nom: String,
    pub obj: String,
}

impl PronounForms {
    pub fn new(nom: impl Into<String>, obj: impl Into<String>) -> Self {
        PronounForms {
            nom: nom.into(),
            obj: obj.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PronounOptions {
    pub symbol_name: String,
    /// Assigned to the `nom` rule only.
    pub insertion_cost: Option<f64>,
    pub forms: PronounForms,
}

impl PronounOptions {
    pub fn new(symbol_name: impl Into<String>, forms: PronounForms) -> Self {
        PronounOptions {
            symbol_name: symbol_name.into(),
            insertion_cost: None,
            forms,
        }
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }
}

/// One or two term sets matched in sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceTerm {
    pub symbols: Vec<Symbol>,
    pub no_insertion_indexes: Vec<usize>,
    pub cost_penalty: f64,
}

impl SequenceTerm {
    pub fn no_insertion_indexes(mut self, indexes: impl IntoIterator<Item = usize>) -> Self {
        self.no_insertion_indexes = indexes.into_iter().collect();
        self
    }

    pub fn cost_penalty(mut self, cost: f64) -> Self {
        self.cost_penalty = cost;
        self
    }
}

impl From<Symbol> for SequenceTerm {
    fn from(sym: Symbol) -> Self {
        SequenceTerm {
            symbols: vec![sym],
            no_insertion_indexes: vec![],
            cost_penalty: 0.0,
        }
    }
}

impl From<[Symbol; 2]> for SequenceTerm {
    fn from(pair: [Symbol; 2]) -> Self {
        SequenceTerm {
            symbols: pair.to_vec(),
            no_insertion_indexes: vec![],
            cost_penalty: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TermSequenceOptions {
    pub symbol_name: String,
    pub term_type: TermType,
    /// Assigned to the first accepted term only.
    pub insertion_cost: Option<f64>,
    pub accepted_terms: Vec<SequenceTerm>,
    /// Displayed as the first accepted term when input.
    pub substituted_terms: Vec<SequenceTerm>,
}

impl TermSequenceOptions {
    pub fn new<T: Into<SequenceTerm>>(
        symbol_name: impl Into<String>,
        term_type: TermType,
        accepted_terms: impl IntoIterator<Item = T>,
    ) -> Self {
        TermSequenceOptions {
            symbol_name: symbol_name.into(),
            term_type,
            insertion_cost: None,
            accepted_terms: accepted_terms.into_iter().map(Into::into).collect(),
            substituted_terms: vec![],
        }
    }

    pub fn insertion_cost(mut self, cost: f64) -> Self {
        self.insertion_cost = Some(cost);
        self
    }

    pub fn substituted_terms<T: Into<SequenceTerm>>(mut self, terms: impl IntoIterator<Item = T>) -> Self {
        self.substituted_terms = terms.into_iter().map(Into::into).collect();
        self
    }
}

impl Grammar {
    /// Creates a symbol producing one terminal rule per verb form.
    ///
    /// Every rule shares a display text made of the four required forms.
    /// The `pl` rule is omitted when identical to `one_sg`; any other repeated
    /// form is a duplicate rule.
    pub fn new_verb(&mut self, options: VerbOptions) -> Result<Symbol> {
        const WHAT: &str = "verb";
        let name = set_name(WHAT, &options.symbol_name)?;
        if let Some(cost) = options.insertion_cost {
            check_cost(WHAT, "insertion_cost", cost)?;
        }
        let forms = &options.forms;
        let text = Text::Verb(forms.text());
        let verb_rule = |literal: &str, tense: Tense| {
            let rule = TerminalRule::new(literal).text(text.clone());
            match tense {
                // Lets `accepted_tense` on a parent keep the input tense.
                Tense::Past => rule.tense(tense),
                Tense::Present => rule,
            }
        };

        let mut one_sg = verb_rule(forms.one_sg.as_str(), Tense::Present);
        if let Some(cost) = options.insertion_cost {
            one_sg = one_sg.insertion_cost(cost);
        }
        let mut rules = vec![one_sg, verb_rule(forms.three_sg.as_str(), Tense::Present)];
        if forms.pl != forms.one_sg {
            rules.push(verb_rule(forms.pl.as_str(), Tense::Present));
        }
        rules.push(verb_rule(forms.past.as_str(), Tense::Past));
        if let Some(form) = &forms.present_subjunctive {
            rules.push(verb_rule(form.as_str(), Tense::Present));
        }
        if let Some(form) = &forms.present_participle {
            rules.push(verb_rule(form.as_str(), Tense::Present));
        }
        if let Some(form) = &forms.past_participle {
            rules.push(verb_rule(form.as_str(), Tense::Past));
        }

        self.commit_term_set(name, rules, TermSetKind::Verb, vec![text])
    }

    /// Creates a symbol producing one terminal rule per uninflected term.
    ///
    /// Substituted terms display the first accepted term.
    pub fn new_invariable_term(&mut self, options: InvariableTermOptions) -> Result<Symbol> {
        const WHAT: &str = "invariable term";
        let name = set_name(WHAT, &options.symbol_name)?;
        if let Some(cost) = options.insertion_cost {
            check_cost(WHAT, "insertion_cost", cost)?;
        }
        let default_text = match options.accepted_terms.first() {
            Some(term) => Text::Fixed(term.clone()),
            None => return Err(GrammarError::ill_formed(WHAT, "no accepted terms")),
        };
        let mut rules = Vec::with_capacity(options.accepted_terms.len() + options.substituted_terms.len());
        for (i, term) in options.accepted_terms.iter().enumerate() {
            let mut rule = TerminalRule::new(term.as_str());
            if i == 0 {
                if let Some(cost) = options.insertion_cost {
                    rule = rule.insertion_cost(cost);
                }
            }
            rules.push(rule);
        }
        for substituted in &options.substituted_terms {
            check_cost(WHAT, "cost_penalty", substituted.cost_penalty)?;
            rules.push(
                TerminalRule::new(substituted.term.as_str())
                    .text(default_text.clone())
                    .cost_penalty(substituted.cost_penalty),
            );
        }

        self.commit_term_set(name, rules, TermSetKind::Invariable, vec![default_text])
    }

    /// Creates a symbol producing the nominative and objective forms of a
    /// pronoun, sharing one display text.
    pub fn new_pronoun(&mut self, options: PronounOptions) -> Result<Symbol> {
        const WHAT: &str = "pronoun";
        let name = set_name(WHAT, &options.symbol_name)?;
        if let Some(cost) = options.insertion_cost {
            check_cost(WHAT, "insertion_cost", cost)?;
        }
        let forms = &options.forms;
        let text = Text::Pronoun(PronounText {
            nom: forms.nom.clone(),
            obj: forms.obj.clone(),
        });
        let mut nom = TerminalRule::new(forms.nom.as_str()).text(text.clone());
        if let Some(cost) = options.insertion_cost {
            nom = nom.insertion_cost(cost);
        }
        let mut rules = vec![nom];
        if forms.obj != forms.nom {
            rules.push(TerminalRule::new(forms.obj.as_str()).text(text.clone()));
        }

        self.commit_term_set(name, rules, TermSetKind::Pronoun, vec![text])
    }

    /// Creates a symbol producing other term sets of a compatible type, or
    /// pairs of them.
    ///
    /// A single term must have `term_type`; in a pair, at least one member
    /// must. Substituted terms display the first accepted term.
    pub fn new_term_sequence(&mut self, options: TermSequenceOptions) -> Result<Symbol> {
        const WHAT: &str = "term sequence";
        let name = set_name(WHAT, &options.symbol_name)?;
        if let Some(cost) = options.insertion_cost {
            check_cost(WHAT, "insertion_cost", cost)?;
        }
        let first = match options.accepted_terms.first() {
            Some(first) => first,
            None => return Err(GrammarError::ill_formed(WHAT, "no accepted terms")),
        };
        for term in options.accepted_terms.iter().chain(&options.substituted_terms) {
            self.check_sequence_term(&name, options.term_type, term)?;
        }
        let default_text = self.display_of(&first.symbols);

        let mut rules: Vec<Rule> = vec![];
        for (i, term) in options.accepted_terms.iter().enumerate() {
            if term.cost_penalty != 0.0 {
                return Err(GrammarError::ill_formed(
                    WHAT,
                    format!("accepted term of `{}` has a cost penalty", name),
                ));
            }
            let mut rule = NonterminalRule::new(term.symbols.iter().copied())
                .no_insertion_indexes(term.no_insertion_indexes.iter().copied());
            if i == 0 {
                if let Some(cost) = options.insertion_cost {
                    rule = rule.insertion_cost(cost);
                }
            }
            rules.push(rule.into());
        }
        for term in &options.substituted_terms {
            let rule = NonterminalRule::new(term.symbols.iter().copied())
                .no_insertion_indexes(term.no_insertion_indexes.iter().copied())
                .cost(term.cost_penalty)
                .text(default_text.clone());
            rules.push(rule.into());
        }

        let kind = TermSetKind::Sequence(options.term_type);
        let sym = self.commit_symbol(
            name,
            rules,
            Some(TermSet {
                kind,
                text: default_text,
            }),
        )?;
        trace!("new term sequence {}", self.name_of(sym));
        Ok(sym)
    }

    /// Creates a sequence of exactly one pair of term sets, named after them.
    pub fn new_term_sequence_binary_symbol(&mut self, term_type: TermType, pair: [Symbol; 2]) -> Result<Symbol> {
        let mut parts = Vec::with_capacity(2);
        for sym in pair {
            parts.push(self.data(sym)?.name.clone());
        }
        self.new_term_sequence(TermSequenceOptions::new(
            hyphenate(&parts),
            term_type,
            [SequenceTerm::from(pair)],
        ))
    }

    fn check_sequence_term(&self, name: &str, term_type: TermType, term: &SequenceTerm) -> Result<()> {
        const WHAT: &str = "term sequence";
        check_cost(WHAT, "cost_penalty", term.cost_penalty)?;
        if !(1..=2).contains(&term.symbols.len()) {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("term of `{}` has {} symbols, expected 1 or 2", name, term.symbols.len()),
            ));
        }
        let mut types = Vec::with_capacity(2);
        for &sym in &term.symbols {
            let data = self.data(sym)?;
            match &data.term_set {
                Some(term_set) => types.push(term_set.kind.term_type()),
                None => {
                    return Err(GrammarError::ill_formed(
                        WHAT,
                        format!("`{}` in `{}` is not a term set", data.name, name),
                    ))
                }
            }
        }
        if !types.contains(&term_type) {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("term of `{}` has no {:?} term set", name, term_type),
            ));
        }
        if term.symbols.len() == 1 && types[0] != term_type {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("term of `{}` is {:?}, expected {:?}", name, types[0], term_type),
            ));
        }
        Ok(())
    }

    /// The display text of term sets matched in sequence.
    fn display_of(&self, syms: &[Symbol]) -> Vec<Text> {
        syms.iter()
            .filter_map(|&sym| self.term_set(sym))
            .flat_map(|term_set| term_set.text.iter().cloned())
            .collect()
    }

    fn commit_term_set(
        &mut self,
        name: String,
        rules: Vec<TerminalRule>,
        kind: TermSetKind,
        text: Vec<Text>,
    ) -> Result<Symbol> {
        let rules = rules.into_iter().map(Rule::from).collect();
        let sym = self.commit_symbol(name, rules, Some(TermSet { kind, text }))?;
        trace!("new {:?} term set {}", kind, self.name_of(sym));
        Ok(sym)
    }
}

fn set_name(what: &'static str, symbol_name: &str) -> Result<String> {
    if symbol_name.is_empty() {
        Err(GrammarError::ill_formed(what, "empty symbol name"))
    } else {
        Ok(hyphenate(&[symbol_name]))
    }
}
