//! Per-run aggregation of violations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Axiom, Violation, ViolationState};

/// Report schema version.
const REPORT_VERSION: &str = "1.0.0";

/// Derived violation counts, recomputed on demand by
/// [`ComplianceReport::generate_summary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub new: usize,
    pub resolved: usize,
}

/// The output of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub repo_root: String,
    /// Engine order outer, per-engine emission order inner.
    pub violations: Vec<Violation>,
    /// Stale until the next `generate_summary` call.
    pub summary: Summary,
}

impl ComplianceReport {
    pub fn new(repo_root: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            timestamp: Utc::now(),
            repo_root: repo_root.into(),
            violations,
            summary: Summary::default(),
        }
    }

    /// Recompute the summary from the current violation list and return the
    /// one-line human-readable rendering. Idempotent.
    pub fn generate_summary(&mut self) -> String {
        self.summary = Summary {
            total: self.violations.len(),
            new: self.count_state(ViolationState::New),
            resolved: self.count_state(ViolationState::Resolved),
        };
        format!(
            "Violations: {} (New: {}, Resolved: {})",
            self.summary.total, self.summary.new, self.summary.resolved
        )
    }

    /// One rendered line per violation, resolving axiom names from the
    /// `axioms` catalog. A dangling axiom reference is tolerated and
    /// renders as "unknown axiom".
    pub fn detail_lines(&self, axioms: &[Axiom]) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| {
                let name = axioms
                    .iter()
                    .find(|a| a.id == v.axiom_id)
                    .map(|a| a.name.as_str())
                    .unwrap_or("unknown axiom");
                format!("[{}] {} ({}): {}", v.state(), v.file_path, name, v.message)
            })
            .collect()
    }

    fn count_state(&self, state: ViolationState) -> usize {
        self.violations.iter().filter(|v| v.state() == state).count()
    }
}
