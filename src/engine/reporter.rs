//! End-of-session reporting
//!
//! Turns a `SessionReport` into two sequential TestRail calls:
//! `add_run/{project_id}` and then `add_results_for_cases/{run_id}`.
//! Nothing is retried. A rejected run is logged and reported back as
//! `ReportOutcome::RunCreationFailed`; a failed submission is an error.

use tracing::{error, info, instrument};

use super::aggregator::SessionReport;
use super::clock::{run_name, Clock};
use super::error::ReportError;
use crate::client::{AddResultsRequest, AddRunRequest, AddRunResponse, CaseResult, Status, TestRailApi};
use crate::config::ReporterConfig;
use crate::item::{CaseId, Outcome};

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// No outcome was recorded; nothing was sent
    NothingToReport,
    /// TestRail refused the run; no results were sent
    RunCreationFailed { error: String },
    /// Run created and results submitted
    Reported {
        run_id: u64,
        results: Vec<CaseResult>,
    },
}

#[derive(Debug, Clone)]
pub struct SessionReporter {
    project_id: String,
    suite_id: String,
    report_skipped: bool,
}

impl SessionReporter {
    pub fn new(project_id: impl Into<String>, suite_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            suite_id: suite_id.into(),
            report_skipped: false,
        }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(config.project_id.clone(), config.suite_id.clone())
            .with_report_skipped(config.report_skipped)
    }

    /// Also submit skipped tests, as `Status::Blocked`
    pub fn with_report_skipped(mut self, enabled: bool) -> Self {
        self.report_skipped = enabled;
        self
    }

    /// Case ids included in the run: passed, then failed (then skipped)
    pub fn case_ids(&self, report: &SessionReport) -> Vec<CaseId> {
        let mut cases: Vec<CaseId> = report.passed.iter().chain(&report.failed).cloned().collect();
        if self.report_skipped {
            cases.extend(report.skipped.iter().map(|s| s.case_id.clone()));
        }
        cases
    }

    /// One result per passed and failed case, in that order
    pub fn compile_results(&self, report: &SessionReport) -> Vec<CaseResult> {
        let result = |case: &CaseId, outcome: Outcome| CaseResult::new(case.clone(), Status::from(outcome));

        let passed = report.passed.iter().map(|case| result(case, Outcome::Passed));
        let failed = report.failed.iter().map(|case| result(case, Outcome::Failed));
        let mut results: Vec<CaseResult> = passed.chain(failed).collect();

        if self.report_skipped {
            results.extend(
                report
                    .skipped
                    .iter()
                    .map(|s| result(&s.case_id, Outcome::Skipped)),
            );
        }
        results
    }

    #[instrument(skip_all, fields(project_id = %self.project_id, suite_id = %self.suite_id))]
    pub async fn finish(
        &self,
        api: &dyn TestRailApi,
        clock: &dyn Clock,
        report: &SessionReport,
    ) -> Result<ReportOutcome, ReportError> {
        if report.is_empty() {
            info!("No test outcomes recorded, skipping TestRail report");
            return Ok(ReportOutcome::NothingToReport);
        }

        let request = AddRunRequest {
            suite_id: self.suite_id.clone(),
            name: run_name(clock),
            include_all: false,
            case_ids: self.case_ids(report),
        };

        let run_id = match api.add_run(&self.project_id, &request).await? {
            AddRunResponse::Created { id } => id,
            AddRunResponse::Rejected { error: message } => {
                error!("Failed to create testrun: {}", message);
                return Ok(ReportOutcome::RunCreationFailed { error: message });
            }
            AddRunResponse::Unexpected(value) => {
                return Err(ReportError::UnexpectedResponse(value.to_string()));
            }
        };
        info!(run_id, name = %request.name, cases = request.case_ids.len(), "Created test run");

        let results = self.compile_results(report);
        api.add_results_for_cases(
            run_id,
            &AddResultsRequest {
                results: results.clone(),
            },
        )
        .await?;
        info!(run_id, results = results.len(), "Submitted results");

        Ok(ReportOutcome::Reported { run_id, results })
    }
}
