//! Drives one compliance run: concurrent engine execution, aggregation,
//! and the surrounding audit events.
//!
//! `RUN_START` is durably written before any engine executes and
//! `RUN_COMPLETE` only after every engine has finished, so any reader of the
//! audit log observes a strict happens-before ordering around the run.

use anyhow::{Context as _, Result};
use futures_util::future::join_all;
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use crate::audit::AuditLog;
use crate::config::Config;
use crate::engines::{build_engines, Engine};
use crate::report::ComplianceReport;

pub struct Orchestrator {
    audit: AuditLog,
    engines: Vec<Box<dyn Engine>>,
    repo_root: String,
}

impl Orchestrator {
    /// Build an orchestrator from resolved settings. Engines are
    /// instantiated once, in fixed category order; the audit store is
    /// opened (and created if missing) up front so a broken store fails the
    /// construction, not the middle of a run.
    pub async fn new(config: &Config, repo_root: &Path) -> Result<Self> {
        let audit = AuditLog::open(&config.global_settings.audit_path)
            .await
            .context("failed to open audit store")?;
        Ok(Self::with_engines(
            audit,
            build_engines(config, repo_root),
            repo_root,
        ))
    }

    /// Assemble an orchestrator from an already-open audit log and an
    /// explicit engine set.
    pub fn with_engines(
        audit: AuditLog,
        engines: Vec<Box<dyn Engine>>,
        repo_root: &Path,
    ) -> Self {
        debug!(engines = engines.len(), "orchestrator constructed");
        Self {
            audit,
            engines,
            repo_root: repo_root.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Access the underlying audit log (inspection and verification).
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run every enabled engine over `files` and aggregate the results.
    ///
    /// Engine checks execute concurrently but the aggregated violation list
    /// is always engine-instantiation order outer, per-engine emission order
    /// inner — completion order is never observable. Fails only when an
    /// audit event cannot be written: a failed `RUN_START` aborts the run
    /// before any engine executes, and a failed `RUN_COMPLETE` surfaces as a
    /// run-level error even though engine results exist, because a complete
    /// audit trail is a correctness property of the run.
    pub async fn run(&self, files: &[String]) -> Result<ComplianceReport> {
        self.audit
            .log("RUN_START", &json!({ "files_count": files.len() }))
            .await
            .context("failed to record RUN_START audit event")?;

        let checks = self
            .engines
            .iter()
            .map(|engine| engine.check(files));
        // join_all preserves future order, which is engine order.
        let results = join_all(checks).await;

        let mut all_violations = Vec::new();
        for violations in results {
            all_violations.extend(violations);
        }

        self.audit
            .log(
                "RUN_COMPLETE",
                &json!({ "violations_count": all_violations.len() }),
            )
            .await
            .context("failed to record RUN_COMPLETE audit event")?;

        info!(
            files = files.len(),
            violations = all_violations.len(),
            "compliance run complete"
        );
        Ok(ComplianceReport::new(self.repo_root.clone(), all_violations))
    }
}
