//! Core compliance entities: axioms, violations, and the violation
//! lifecycle state machine.
//!
//! Everything here is plain data. An [`Axiom`] is immutable after
//! construction; a [`Violation`] is immutable except for its `state`, which
//! only moves through the explicit transition methods.

pub mod decision;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use decision::{Attestation, Criticality, Decision, Override};

/// Fixed axiom id for the "no specification found" rule.
pub const AXIOM_MISSING_SPEC: &str = "Π.1.1";
/// Fixed axiom id for the "missing test file" rule.
pub const AXIOM_MISSING_TEST: &str = "Π.2.1";
/// Fixed axiom id for the "non-deterministic test" rule.
pub const AXIOM_NON_DETERMINISTIC: &str = "Π.3.1";

/// Errors raised by model constructors and state transitions.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("axiom id must not be empty")]
    EmptyAxiomId,
    #[error("file path must not be empty")]
    EmptyFilePath,
    #[error("confidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),
}

/// An illegal violation-state transition.
///
/// `resolved` and `overridden` are terminal; transitions out of them (and
/// any other pair not in the transition table) are rejected, never silently
/// ignored.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal violation state transition: {from} → {to}")]
pub struct StateError {
    pub from: ViolationState,
    pub to: ViolationState,
}

// ─── Axiom ────────────────────────────────────────────────────────────────────

/// An immutable compliance rule definition, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axiom {
    /// Globally unique identifier, e.g. `Π.2.1`.
    pub id: String,
    pub name: String,
    pub category: String,
    pub severity: String,
    pub enabled: bool,
    pub description: Option<String>,
}

impl Axiom {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        severity: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyAxiomId);
        }
        Ok(Self {
            id,
            name: name.into(),
            category: category.into(),
            severity: severity.into(),
            enabled: true,
            description: None,
        })
    }
}

/// The built-in axiom catalog backing the reference engines.
///
/// Violations reference axioms by id only — a dangling reference is
/// tolerated and matters solely for report rendering.
pub fn builtin_axioms() -> Vec<Axiom> {
    vec![
        Axiom {
            id: AXIOM_MISSING_SPEC.to_string(),
            name: "Specification Primacy".to_string(),
            category: "spec".to_string(),
            severity: "critical".to_string(),
            enabled: true,
            description: Some("Every repository carries at least one specification document".to_string()),
        },
        Axiom {
            id: AXIOM_MISSING_TEST.to_string(),
            name: "Test Primacy".to_string(),
            category: "test".to_string(),
            severity: "high".to_string(),
            enabled: true,
            description: Some("Every implementation file has a corresponding test file".to_string()),
        },
        Axiom {
            id: AXIOM_NON_DETERMINISTIC.to_string(),
            name: "Test Determinism".to_string(),
            category: "test".to_string(),
            severity: "high".to_string(),
            enabled: true,
            description: Some("Tests must not sleep or reach the network".to_string()),
        },
    ]
}

// ─── Violation ────────────────────────────────────────────────────────────────

/// Lifecycle state of a [`Violation`].
///
/// All four states are terminal with respect to automatic processing —
/// transitions only happen via explicit operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationState {
    New,
    Acknowledged,
    Resolved,
    Overridden,
}

impl std::fmt::Display for ViolationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ViolationState::New => "new",
            ViolationState::Acknowledged => "acknowledged",
            ViolationState::Resolved => "resolved",
            ViolationState::Overridden => "overridden",
        };
        f.write_str(s)
    }
}

/// One finding produced by one engine for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// References an [`Axiom`] by id (not enforced as a foreign key).
    pub axiom_id: String,
    /// Repository-relative, forward-slash path.
    pub file_path: String,
    pub message: String,
    /// Always the evaluation-time value; engines never set this explicitly.
    pub timestamp: DateTime<Utc>,
    state: ViolationState,
}

impl Violation {
    /// Construct a new violation in state [`ViolationState::New`].
    pub fn new(
        axiom_id: impl Into<String>,
        file_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let axiom_id = axiom_id.into();
        if axiom_id.is_empty() {
            return Err(ModelError::EmptyAxiomId);
        }
        let file_path = file_path.into();
        if file_path.is_empty() {
            return Err(ModelError::EmptyFilePath);
        }
        Ok(Self {
            axiom_id,
            file_path,
            message: message.into(),
            timestamp: Utc::now(),
            state: ViolationState::New,
        })
    }

    pub fn state(&self) -> ViolationState {
        self.state
    }

    /// `new → acknowledged`.
    pub fn acknowledge(&mut self) -> Result<(), StateError> {
        self.transition(ViolationState::Acknowledged)
    }

    /// `new → resolved` or `acknowledged → resolved`.
    pub fn resolve(&mut self) -> Result<(), StateError> {
        self.transition(ViolationState::Resolved)
    }

    /// `new → overridden` or `acknowledged → overridden`.
    pub fn set_overridden(&mut self) -> Result<(), StateError> {
        self.transition(ViolationState::Overridden)
    }

    fn transition(&mut self, to: ViolationState) -> Result<(), StateError> {
        use ViolationState::*;
        let legal = matches!(
            (self.state, to),
            (New, Acknowledged) | (New, Resolved) | (New, Overridden)
                | (Acknowledged, Resolved)
                | (Acknowledged, Overridden)
        );
        if !legal {
            return Err(StateError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

// ─── TraceLink ────────────────────────────────────────────────────────────────

/// A traceability edge between two artifacts (e.g. impl file → test file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
