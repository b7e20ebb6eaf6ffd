use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::{CaseId, Outcome};

/// TestRail result status ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed = 1,
    Blocked = 2,
    Failed = 5,
}

impl Status {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Passed => Status::Passed,
            Outcome::Failed => Status::Failed,
            Outcome::Skipped => Status::Blocked,
        }
    }
}

/// Body of `add_run/{project_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddRunRequest {
    pub suite_id: String,
    pub name: String,
    pub include_all: bool,
    pub case_ids: Vec<CaseId>,
}

/// Body of `add_results_for_cases/{run_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddResultsRequest {
    pub results: Vec<CaseResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub case_id: CaseId,
    pub status_id: u8,
}

impl CaseResult {
    pub fn new(case_id: CaseId, status: Status) -> Self {
        Self {
            case_id,
            status_id: status.id(),
        }
    }
}

/// What TestRail answered to a run creation request
#[derive(Debug, Clone, PartialEq)]
pub enum AddRunResponse {
    Created { id: u64 },
    Rejected { error: String },
    Unexpected(Value),
}

impl AddRunResponse {
    pub fn from_value(value: Value) -> Self {
        if let Some(error) = value.get("error") {
            let error = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return AddRunResponse::Rejected { error };
        }

        let id = match value.get("id") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };

        match id {
            Some(id) => AddRunResponse::Created { id },
            None => AddRunResponse::Unexpected(value),
        }
    }
}
