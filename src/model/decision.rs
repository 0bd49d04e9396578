//! Governance records: decisions, overrides, and attestations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Criticality of a governance decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    Medium,
    High,
    Critical,
}

/// A rationale record attached to a governance action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub axiom_id: String,
    pub rationale: String,
    pub criticality: Criticality,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    pub fn new(
        axiom_id: impl Into<String>,
        rationale: impl Into<String>,
        criticality: Criticality,
    ) -> Self {
        Self {
            axiom_id: axiom_id.into(),
            rationale: rationale.into(),
            criticality,
            timestamp: Utc::now(),
        }
    }

    /// High and critical decisions require a human in the loop.
    pub fn requires_human_review(&self) -> bool {
        matches!(self.criticality, Criticality::High | Criticality::Critical)
    }
}

/// A [`Decision`] that exempts an axiom for a bounded horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Override {
    #[serde(flatten)]
    pub decision: Decision,
    /// Expiry horizon in days. Carried as data only; `is_active` does not
    /// evaluate it against wall-clock time.
    pub expires_in_days: u32,
    pub scope: Option<String>,
}

impl Override {
    pub fn new(
        axiom_id: impl Into<String>,
        rationale: impl Into<String>,
        criticality: Criticality,
    ) -> Self {
        Self {
            decision: Decision::new(axiom_id, rationale, criticality),
            expires_in_days: 90,
            scope: None,
        }
    }

    pub fn is_active(&self) -> bool {
        true
    }
}

/// A record that an agent (autonomous or human) performed a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attestation {
    pub agent_id: String,
    pub task_id: String,
    /// Confidence score in `[0, 1]`.
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl Attestation {
    pub fn new(
        agent_id: impl Into<String>,
        task_id: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ModelError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            agent_id: agent_id.into(),
            task_id: task_id.into(),
            confidence,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_and_critical_require_review() {
        for c in [Criticality::High, Criticality::Critical] {
            let d = Decision::new("Σ.1", "requires arch review", c);
            assert!(d.requires_human_review());
        }
    }

    #[test]
    fn low_and_medium_auto_approve() {
        for c in [Criticality::Low, Criticality::Medium] {
            let d = Decision::new("Σ.1", "minor refactor", c);
            assert!(!d.requires_human_review());
        }
    }

    #[test]
    fn override_defaults() {
        let o = Override::new("Σ.2", "temporary exemption", Criticality::High);
        assert_eq!(o.expires_in_days, 90);
        assert!(o.scope.is_none());
        assert!(o.is_active());
        assert!(o.decision.requires_human_review());
    }

    #[test]
    fn attestation_validates_confidence() {
        let a = Attestation::new("agent-001", "task-001", 0.95).unwrap();
        assert_eq!(a.agent_id, "agent-001");
        assert!((a.confidence - 0.95).abs() < f64::EPSILON);

        assert_eq!(
            Attestation::new("a", "t", 1.5).unwrap_err(),
            ModelError::ConfidenceOutOfRange(1.5)
        );
        assert!(Attestation::new("a", "t", -0.1).is_err());
        // Boundaries are inclusive.
        assert!(Attestation::new("a", "t", 0.0).is_ok());
        assert!(Attestation::new("a", "t", 1.0).is_ok());
    }

    #[test]
    fn criticality_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Criticality::Critical).unwrap(),
            "\"critical\""
        );
    }
}
