//! Pluggable compliance check engines.
//!
//! An [`Engine`] scans an ordered list of repository-relative file paths and
//! produces violations for one rule category. Engines are infallible by
//! contract: a malformed or unreadable file degrades to a skip, never an
//! aborted run.

pub mod spec;

use async_trait::async_trait;
use std::path::Path;

use crate::config::Config;
use crate::model::Violation;

pub use spec::SpecEngine;
pub use test::TestEngine;

/// One unit of compliance evaluation.
#[async_trait]
pub trait Engine: Send + Sync {
    /// The rule category this engine covers (matches the config key).
    fn category(&self) -> &'static str;

    /// Whether configuration enables this engine.
    fn should_run(&self) -> bool;

    /// Evaluate `files` (ordered, repository-relative, forward-slash paths)
    /// and return zero or more violations, all in state `new`, in discovery
    /// order. Must tolerate an empty input and never mutate it.
    async fn check(&self, files: &[String]) -> Vec<Violation>;
}

/// Instantiate one engine per enabled rule category, in the fixed report
/// order: spec, then test. Order matters only for report readability.
pub fn build_engines(config: &Config, repo_root: &Path) -> Vec<Box<dyn Engine>> {
    let mut engines: Vec<Box<dyn Engine>> = Vec::new();
    if config.engines.spec.enabled {
        engines.push(Box::new(SpecEngine::new(
            config.engines.spec.clone(),
            repo_root,
        )));
    }
    if config.engines.test.enabled {
        engines.push(Box::new(TestEngine::new(
            config.engines.test.clone(),
            repo_root,
        )));
    }
    engines
}

/// Push a violation, dropping (with an error log) the impossible case of a
/// malformed construction instead of aborting the engine.
pub(crate) fn emit(out: &mut Vec<Violation>, axiom_id: &str, file_path: &str, message: String) {
    match Violation::new(axiom_id, file_path, message) {
        Ok(violation) => out.push(violation),
        Err(err) => tracing::error!(axiom_id, %err, "dropped malformed violation"),
    }
}
