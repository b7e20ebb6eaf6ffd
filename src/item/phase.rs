//! Per-phase test reports

use serde::{Deserialize, Serialize};

/// Stage of a single test's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Result of one phase of one test
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub node_id: String,
    pub phase: Phase,
    pub outcome: Outcome,
    pub duration_secs: f64,
}

impl PhaseReport {
    pub fn new(node_id: impl Into<String>, phase: Phase, outcome: Outcome) -> Self {
        Self {
            node_id: node_id.into(),
            phase,
            outcome,
            duration_secs: 0.0,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn call(node_id: impl Into<String>, outcome: Outcome) -> Self {
        Self::new(node_id, Phase::Call, outcome)
    }

    pub fn skipped(node_id: impl Into<String>) -> Self {
        Self::new(node_id, Phase::Setup, Outcome::Skipped)
    }
}
