//! Result aggregation
//!
//! Collects outcomes for one session. Owned by the session and mutated
//! through `&mut self` only, so there is exactly one writer.

use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::item::{CaseId, ExtractionMode, MarkerError, Outcome, Phase, PhaseReport, TestItem, TESTRAIL_MARKER};

/// A skipped test, rendered as `node_id:case_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub node_id: String,
    pub case_id: CaseId,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.case_id)
    }
}

impl Serialize for SkippedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything recorded during a session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub passed: Vec<CaseId>,
    pub failed: Vec<CaseId>,
    pub skipped: Vec<SkippedEntry>,
    pub duration: f64,
}

impl SessionReport {
    /// True when no outcome at all was recorded
    pub fn is_empty(&self) -> bool {
        self.passed.is_empty() && self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len() + self.skipped.len()
    }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
    mode: ExtractionMode,
    report: SessionReport,
}

impl ResultAggregator {
    pub fn new(mode: ExtractionMode) -> Self {
        Self {
            mode,
            report: SessionReport::default(),
        }
    }

    /// Called before each test. Only logs the item's `testrail` markers.
    pub fn on_setup(&self, item: &TestItem) {
        for marker in item.markers_named(TESTRAIL_MARKER) {
            debug!(
                node_id = %item.node_id,
                args = ?marker.args,
                kwargs = ?marker.kwargs,
                "testrail marker"
            );
        }
    }

    /// Called after each phase of each test
    pub fn on_report(&mut self, item: &TestItem, report: &PhaseReport) -> Result<(), MarkerError> {
        self.report.duration += report.duration_secs;

        match (report.phase, report.outcome) {
            (Phase::Call, Outcome::Passed) => {
                let case_id = item.case_id(self.mode)?;
                self.report.passed.push(case_id);
            }
            (Phase::Call, Outcome::Failed) => {
                let case_id = item.case_id(self.mode)?;
                self.report.failed.push(case_id);
            }
            (_, Outcome::Skipped) => {
                let case_id = item.case_id(self.mode)?;
                self.report.skipped.push(SkippedEntry {
                    node_id: report.node_id.clone(),
                    case_id,
                });
            }
            _ => {}
        }

        Ok(())
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    pub fn into_report(self) -> SessionReport {
        self.report
    }
}
