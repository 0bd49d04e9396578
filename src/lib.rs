//! axcheck — compliance axiom checker with a tamper-evident audit trail.
//!
//! Evaluates a codebase against a fixed set of compliance rules ("axioms")
//! and produces a report of violations, while maintaining an append-only,
//! hash-chained audit log of every evaluation run.

pub mod audit;
pub mod config;
pub mod discovery;
pub mod engines;
pub mod model;
pub mod orchestrator;
pub mod report;

pub use orchestrator::Orchestrator;
pub use report::ComplianceReport;
