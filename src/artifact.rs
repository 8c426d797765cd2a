//! The compiled grammar artifact consumed by the parser.
//!
//! The artifact maps every symbol name to its rules, and carries the
//! semantic and entity-category registries. Maps are ordered by name, so
//! the same grammar always serializes to the same bytes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::entity::EntityCategory;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::rule::{
    Child, GrammaticalCase, GrammaticalForm, IntRange, PersonNumber, Rule, RuleOrigin, Tense, Text,
};
use crate::semantic::{SemanticDef, SemanticNode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub start_symbol: String,
    pub grammar: BTreeMap<String, Vec<ArtifactRule>>,
    #[serde(default)]
    pub semantics: BTreeMap<String, SemanticDef>,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityCategory>,
}

/// A rule as the parser reads it. Absent fields are omitted from the output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRule {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_terminal: bool,
    /// Child symbol names, or the single literal of a terminal rule.
    pub rhs: Vec<String>,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammatical_form: Option<GrammaticalForm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_number: Option<PersonNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammatical_case: Option<GrammaticalCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_tense: Option<Tense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transposition_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "RuleOrigin::is_authored")]
    pub origin: RuleOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion: Option<ArtifactInsertion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_indexes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_text_indexes: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_range: Option<IntRange>,
}

/// The child an insertion rule elides, kept as a completion suggestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInsertion {
    pub index: usize,
    /// Name of the elided child.
    pub symbol: String,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<Text>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub semantics: Vec<SemanticNode>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Artifact {
    /// Returns the total number of rules.
    pub fn rule_count(&self) -> usize {
        self.grammar.values().map(Vec::len).sum()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the artifact next to `path`, then renames it into place, so a
    /// reader never sees a partial file.
    pub fn write_to_path(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(pretty)?;
        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        fs::write(&temp_path, json)?;
        if let Err(err) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        trace!("wrote {} rules to {}", self.rule_count(), path.display());
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl ArtifactRule {
    fn new(grammar: &Grammar, rule: &Rule) -> Self {
        match rule {
            Rule::Terminal(terminal) => ArtifactRule {
                is_terminal: true,
                rhs: vec![terminal.literal.clone()],
                cost: terminal.cost_penalty,
                text: terminal.text.iter().cloned().collect(),
                tense: terminal.tense,
                insertion_cost: terminal.insertion_cost,
                semantic: terminal.semantic.clone(),
                entity: terminal.entity.clone(),
                int_range: terminal.int_range,
                ..ArtifactRule::default()
            },
            Rule::Nonterminal(nonterminal) => {
                let indexes = |pred: fn(&Child) -> bool| {
                    nonterminal
                        .rhs
                        .iter()
                        .enumerate()
                        .filter(|(_, child)| pred(child))
                        .map(|(i, _)| i)
                        .collect::<Vec<usize>>()
                };
                ArtifactRule {
                    rhs: nonterminal
                        .rhs_symbols()
                        .map(|sym| grammar.name_of(sym).to_string())
                        .collect(),
                    cost: nonterminal.cost,
                    text: nonterminal.text.clone().unwrap_or_default(),
                    insertion_cost: nonterminal.insertion_cost,
                    semantic: nonterminal.semantic.clone(),
                    grammatical_form: nonterminal.grammatical_form,
                    person_number: nonterminal.person_number,
                    grammatical_case: nonterminal.grammatical_case,
                    accepted_tense: nonterminal.accepted_tense,
                    transposition_cost: nonterminal.transposition_cost,
                    origin: nonterminal.origin,
                    insertion: nonterminal.inserted.as_ref().map(|inserted| ArtifactInsertion {
                        index: inserted.index,
                        symbol: grammar.name_of(inserted.symbol).to_string(),
                        cost: inserted.insertion.cost,
                        text: inserted.insertion.text.clone(),
                        semantics: inserted.insertion.semantics.clone(),
                    }),
                    optional_indexes: indexes(|child| child.is_optional),
                    no_text_indexes: indexes(|child| child.no_text),
                    ..ArtifactRule::default()
                }
            }
        }
    }
}

impl Grammar {
    /// Builds the artifact. Symbols without rules are omitted, save for the
    /// start symbol.
    pub fn to_artifact(&self) -> Artifact {
        let mut grammar = BTreeMap::new();
        for sym in self.symbols() {
            let rules = self.rules_of(sym);
            if rules.is_empty() && sym != self.start_symbol() {
                continue;
            }
            let rules = rules.iter().map(|rule| ArtifactRule::new(self, rule)).collect();
            grammar.insert(self.name_of(sym).to_string(), rules);
        }
        Artifact {
            start_symbol: self.name_of(self.start_symbol()).to_string(),
            grammar,
            semantics: self
                .semantics()
                .iter()
                .map(|(name, &def)| (name.to_string(), def))
                .collect(),
            entities: self
                .entities()
                .iter()
                .map(|(name, category)| (name.to_string(), category.clone()))
                .collect(),
        }
    }
}
