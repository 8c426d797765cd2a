//! Entity categories: placeholders recognized as literal semantic arguments.

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::rule::{Rule, TerminalRule};
use crate::symbol::Symbol;

/// An entity the parser can match by any of its names.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub display: String,
    pub names: Vec<String>,
}

impl Entity {
    pub fn new<S: Into<String>>(display: impl Into<String>, names: impl IntoIterator<Item = S>) -> Self {
        Entity {
            display: display.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// A registered category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntityCategory {
    /// The placeholder symbol, e.g. `{user}`.
    pub symbol: String,
    pub entities: Vec<Entity>,
}

impl EntityCategory {
    /// Every name that matches an entity of this category.
    pub fn accepted_forms(&self) -> impl Iterator<Item = &str> {
        self.entities
            .iter()
            .flat_map(|entity| entity.names.iter().map(String::as_str))
    }
}

#[derive(Clone, Debug)]
pub struct EntityCategoryOptions {
    pub name: String,
    pub entities: Vec<Entity>,
}

impl EntityCategoryOptions {
    pub fn new(name: impl Into<String>, entities: impl IntoIterator<Item = Entity>) -> Self {
        EntityCategoryOptions {
            name: name.into(),
            entities: entities.into_iter().collect(),
        }
    }
}

/// The entity categories of a grammar, by name.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    categories: BTreeMap<String, EntityCategory>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EntityCategory> {
        self.categories.get(name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterates over categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityCategory)> {
        self.categories.iter().map(|(name, category)| (name.as_str(), category))
    }
}

impl Grammar {
    /// Registers an entity category and returns its placeholder symbol,
    /// `{name}`. The symbol has one terminal rule that the parser matches
    /// against the names of the category's entities.
    pub fn new_entity_category(&mut self, options: EntityCategoryOptions) -> Result<Symbol> {
        const WHAT: &str = "entity category";
        let name = options.name;
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '{' || c == '}') {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("name `{}` must be a non-empty word", name),
            ));
        }
        if options.entities.is_empty() {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("`{}` has no entities", name),
            ));
        }
        for entity in &options.entities {
            if entity.display.trim().is_empty()
                || entity.names.is_empty()
                || entity.names.iter().any(|n| n.trim().is_empty())
            {
                return Err(GrammarError::ill_formed(
                    WHAT,
                    format!("entity `{}` of `{}` needs a display text and names", entity.display, name),
                ));
            }
        }

        let placeholder = TerminalRule::entity_placeholder(&name);
        let symbol_name = placeholder.literal.clone();
        let sym = self.commit_symbol(symbol_name.clone(), vec![Rule::from(placeholder)], None)?;
        trace!("new entity category {} with {} entities", name, options.entities.len());
        self.entities.categories.insert(
            name,
            EntityCategory {
                symbol: symbol_name,
                entities: options.entities,
            },
        );
        Ok(sym)
    }
}
