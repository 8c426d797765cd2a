//! Semantic functions and arguments, and the trees they compose into.
//!
//! A rule carries at most one semantic node. A function node without
//! arguments is unreduced: the parser applies it to the semantics of the
//! rule's children at parse time. Reduced nodes are built with
//! [`SemanticRegistry::compose`], which enforces arity bounds.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{check_cost, GrammarError, Result};

/// A node of a semantic tree.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticNode {
    /// A function applied to an ordered list of arguments.
    Apply {
        function: String,
        args: Vec<SemanticNode>,
    },
    /// A named argument, such as `me`.
    Arg(String),
    /// The entity matched for a category, filled in at parse time.
    Entity(String),
}

/// Registered definition of a semantic function or argument.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticDef {
    pub cost: f64,
    #[serde(default)]
    pub min_params: usize,
    #[serde(default)]
    pub max_params: usize,
    /// Argument order is irrelevant, e.g. set union.
    #[serde(default, skip_serializing_if = "is_false")]
    pub commutative: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_arg: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Options for [`SemanticRegistry::new_semantic`].
#[derive(Clone, Debug)]
pub struct SemanticOptions {
    pub name: String,
    pub cost: f64,
    pub min_params: usize,
    pub max_params: usize,
    pub commutative: bool,
}

impl SemanticOptions {
    pub fn new(name: impl Into<String>, cost: f64, min_params: usize, max_params: usize) -> Self {
        SemanticOptions {
            name: name.into(),
            cost,
            min_params,
            max_params,
            commutative: false,
        }
    }

    pub fn commutative(mut self) -> Self {
        self.commutative = true;
        self
    }
}

/// The set of semantic functions and arguments of a grammar.
#[derive(Clone, Debug, Default)]
pub struct SemanticRegistry {
    defs: BTreeMap<String, SemanticDef>,
}

impl SemanticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a semantic function. Returns its unreduced node.
    pub fn new_semantic(&mut self, options: SemanticOptions) -> Result<SemanticNode> {
        const WHAT: &str = "semantic function";
        check_name(WHAT, &options.name)?;
        check_cost(WHAT, "cost", options.cost)?;
        if options.max_params == 0 {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!("`{}` must accept at least one argument", options.name),
            ));
        }
        if options.min_params > options.max_params {
            return Err(GrammarError::ill_formed(
                WHAT,
                format!(
                    "`{}` has min_params {} above max_params {}",
                    options.name, options.min_params, options.max_params
                ),
            ));
        }
        self.insert(
            options.name.clone(),
            SemanticDef {
                cost: options.cost,
                min_params: options.min_params,
                max_params: options.max_params,
                commutative: options.commutative,
                is_arg: false,
            },
        )?;
        Ok(SemanticNode::Apply {
            function: options.name,
            args: vec![],
        })
    }

    /// Registers a semantic argument, which takes no parameters.
    pub fn new_semantic_arg(&mut self, name: impl Into<String>, cost: f64) -> Result<SemanticNode> {
        const WHAT: &str = "semantic argument";
        let name = name.into();
        check_name(WHAT, &name)?;
        check_cost(WHAT, "cost", cost)?;
        self.insert(
            name.clone(),
            SemanticDef {
                cost,
                min_params: 0,
                max_params: 0,
                commutative: false,
                is_arg: true,
            },
        )?;
        Ok(SemanticNode::Arg(name))
    }

    fn insert(&mut self, name: String, def: SemanticDef) -> Result<()> {
        if self.defs.contains_key(&name) {
            return Err(GrammarError::DuplicateSemantic { name });
        }
        trace!("new semantic {} {:?}", name, def);
        self.defs.insert(name, def);
        Ok(())
    }

    /// Applies an unreduced function node to `args`.
    ///
    /// Fails with `ArityViolation` outside the function's bounds. Arguments
    /// of commutative functions are sorted, so equal trees compare equal
    /// regardless of the order they were authored in.
    pub fn compose(&self, function: &SemanticNode, mut args: Vec<SemanticNode>) -> Result<SemanticNode> {
        let name = match function {
            SemanticNode::Apply { function, args } if args.is_empty() => function,
            SemanticNode::Apply { .. } => {
                return Err(GrammarError::ill_formed(
                    "semantic composition",
                    format!("`{}` is already reduced", function),
                ))
            }
            SemanticNode::Arg(name) | SemanticNode::Entity(name) => {
                return Err(GrammarError::UnknownSemantic { name: name.clone() })
            }
        };
        let def = match self.defs.get(name) {
            Some(def) if !def.is_arg => def,
            _ => return Err(GrammarError::UnknownSemantic { name: name.clone() }),
        };
        if args.len() < def.min_params || args.len() > def.max_params {
            return Err(GrammarError::ArityViolation {
                name: name.clone(),
                min_params: def.min_params,
                max_params: def.max_params,
                given: args.len(),
            });
        }
        if def.commutative {
            args.sort();
        }
        Ok(SemanticNode::Apply {
            function: name.clone(),
            args,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SemanticDef> {
        self.defs.get(name)
    }

    /// Sum of the costs of every function and argument in the tree.
    pub fn cost_of(&self, node: &SemanticNode) -> f64 {
        match node {
            SemanticNode::Apply { function, args } => {
                let own = self.defs.get(function).map_or(0.0, |def| def.cost);
                own + args.iter().map(|arg| self.cost_of(arg)).sum::<f64>()
            }
            SemanticNode::Arg(name) => self.defs.get(name).map_or(0.0, |def| def.cost),
            SemanticNode::Entity(_) => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterates over definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SemanticDef)> {
        self.defs.iter().map(|(name, def)| (name.as_str(), def))
    }
}

impl SemanticNode {
    /// Whether the node still waits for arguments from the parse.
    pub fn is_reduced(&self) -> bool {
        !matches!(self, SemanticNode::Apply { args, .. } if args.is_empty())
    }

    /// Collects the names of functions, arguments and entity categories
    /// referenced in this tree.
    pub(crate) fn collect_references(
        &self,
        semantics: &mut BTreeSet<String>,
        entities: &mut BTreeSet<String>,
    ) {
        match self {
            SemanticNode::Apply { function, args } => {
                semantics.insert(function.clone());
                for arg in args {
                    arg.collect_references(semantics, entities);
                }
            }
            SemanticNode::Arg(name) => {
                semantics.insert(name.clone());
            }
            SemanticNode::Entity(category) => {
                entities.insert(category.clone());
            }
        }
    }
}

impl fmt::Display for SemanticNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticNode::Apply { function, args } => {
                write!(f, "{}(", function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            SemanticNode::Arg(name) => write!(f, "{}", name),
            SemanticNode::Entity(category) => write!(f, "{{{}}}", category),
        }
    }
}

fn check_name(what: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains(char::is_whitespace) {
        Err(GrammarError::ill_formed(
            what,
            format!("name `{}` must be non-empty and without whitespace", name),
        ))
    } else {
        Ok(())
    }
}
