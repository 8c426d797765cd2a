//! The compile pipeline: derive edit rules, check for unused components,
//! serialize, and report how the rule count changed.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::artifact::Artifact;
use crate::error::Result;
use crate::grammar::Grammar;

/// Where and how the artifact is written.
#[derive(Clone, Debug)]
pub struct CompileConfig {
    pub output_path: PathBuf,
    pub pretty: bool,
    /// Fail on unused components.
    pub check_unused: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            output_path: PathBuf::from("grammar.json"),
            pretty: true,
            check_unused: true,
        }
    }
}

impl CompileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = path.as_ref().to_path_buf();
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn check_unused(mut self, check_unused: bool) -> Self {
        self.check_unused = check_unused;
        self
    }
}

/// Rule count of a build, and of the artifact it replaced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RuleCountReport {
    pub rule_count: usize,
    /// `None` when no readable artifact was at the output path.
    pub previous_rule_count: Option<usize>,
}

impl RuleCountReport {
    /// Rules gained since the previous artifact, if any.
    pub fn delta(&self) -> Option<isize> {
        self.previous_rule_count
            .map(|previous| self.rule_count as isize - previous as isize)
    }
}

impl fmt::Display for RuleCountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.previous_rule_count {
            Some(previous) if previous != self.rule_count => {
                write!(f, "Rules: {} -> {}", previous, self.rule_count)
            }
            _ => write!(f, "Rules: {}", self.rule_count),
        }
    }
}

impl Grammar {
    /// Derives edit rules, checks for unused components, and writes the
    /// artifact to the configured path.
    ///
    /// Nothing is written if any step fails.
    pub fn compile(mut self, config: &CompileConfig) -> Result<RuleCountReport> {
        let stats = self.derive_edit_rules()?;
        debug!("derivation: {:?}", stats);
        if config.check_unused {
            self.check_unused()?;
        }
        let artifact = self.to_artifact();
        let previous_rule_count = match Artifact::read_from_path(&config.output_path) {
            Ok(previous) => Some(previous.rule_count()),
            Err(err) => {
                debug!("no previous artifact at {}: {}", config.output_path.display(), err);
                None
            }
        };
        artifact.write_to_path(&config.output_path, config.pretty)?;
        let report = RuleCountReport {
            rule_count: artifact.rule_count(),
            previous_rule_count,
        };
        info!("{}", report);
        Ok(report)
    }
}
