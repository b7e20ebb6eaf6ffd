//! Reporting session
//!
//! A `Session` lives from the first test event to `finish`. It owns the
//! aggregator, so the collected results are tied to the session instead of
//! the process, and `finish` consumes it, so reporting happens once.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use testrail_reporter::{ReporterConfig, Session, SystemClock, TestRailClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReporterConfig::load("testrail.yaml")?;
//! let client = Arc::new(TestRailClient::new(&config)?);
//! let mut session = Session::start(&config, client, Arc::new(SystemClock));
//! session.ingest(std::io::stdin().lock())?;
//! let outcome = session.finish().await?;
//! # Ok(())
//! # }
//! ```

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::aggregator::{ResultAggregator, SessionReport};
use super::clock::Clock;
use super::error::ReportError;
use super::reporter::{ReportOutcome, SessionReporter};
use crate::client::TestRailApi;
use crate::config::ReporterConfig;
use crate::item::{read_events, Hook, MarkerError, MarkerResolver, PhaseReport, TestItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Started, no test event seen yet
    Idle,
    /// At least one hook has run
    Aggregating,
}

/// Feeds runner events into a `ResultAggregator`
#[derive(Debug, Default)]
pub struct EventCollector {
    aggregator: ResultAggregator,
    resolver: MarkerResolver,
    unmarked: Vec<String>,
}

impl EventCollector {
    pub fn new(config: &ReporterConfig) -> Self {
        Self {
            aggregator: ResultAggregator::new(config.extraction),
            resolver: MarkerResolver::new(config.markers.clone()),
            unmarked: Vec::new(),
        }
    }

    pub fn on_setup(&mut self, item: &TestItem) {
        self.aggregator.on_setup(item);
    }

    pub fn on_report(&mut self, item: &TestItem, report: &PhaseReport) -> Result<(), ReportError> {
        self.aggregator.on_report(item, report)?;
        Ok(())
    }

    pub fn apply(&mut self, hook: &Hook) -> Result<(), ReportError> {
        match hook {
            Hook::Setup(item) => {
                self.on_setup(item);
                Ok(())
            }
            Hook::Report(item, report) => self.on_report(item, report),
        }
    }

    /// Read libtest JSON events until EOF. Returns the number of hooks applied.
    ///
    /// A stream mixes tracked tests with unrelated ones (doc-tests, helpers),
    /// so a test without a case id is logged and skipped here. Any other
    /// marker error still stops ingestion.
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<usize, ReportError> {
        let mut applied = 0;
        for event in read_events(reader) {
            let Some(hook) = self.resolver.hook_for(&event?) else {
                continue;
            };
            match self.apply(&hook) {
                Ok(()) => applied += 1,
                Err(ReportError::Marker(MarkerError::MissingCaseId { node_id })) => {
                    warn!(%node_id, "No TestRail case id, test not reported");
                    self.unmarked.push(node_id);
                }
                Err(e) => return Err(e),
            }
        }
        debug!(applied, unmarked = self.unmarked.len(), "Finished reading runner events");
        Ok(applied)
    }

    /// Tests skipped by `ingest` because they carry no case id
    pub fn unmarked(&self) -> &[String] {
        &self.unmarked
    }

    pub fn report(&self) -> &SessionReport {
        self.aggregator.report()
    }

    pub fn into_report(self) -> SessionReport {
        self.aggregator.into_report()
    }
}

pub struct Session {
    collector: EventCollector,
    reporter: SessionReporter,
    api: Arc<dyn TestRailApi>,
    clock: Arc<dyn Clock>,
    phase: SessionPhase,
}

impl Session {
    pub fn start(config: &ReporterConfig, api: Arc<dyn TestRailApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            collector: EventCollector::new(config),
            reporter: SessionReporter::from_config(config),
            api,
            clock,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn on_setup(&mut self, item: &TestItem) {
        self.phase = SessionPhase::Aggregating;
        self.collector.on_setup(item);
    }

    pub fn on_report(&mut self, item: &TestItem, report: &PhaseReport) -> Result<(), ReportError> {
        self.phase = SessionPhase::Aggregating;
        self.collector.on_report(item, report)
    }

    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<usize, ReportError> {
        let applied = self.collector.ingest(reader)?;
        if applied > 0 {
            self.phase = SessionPhase::Aggregating;
        }
        Ok(applied)
    }

    pub fn report(&self) -> &SessionReport {
        self.collector.report()
    }

    /// Write the collected report as JSON
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        write_report(self.report(), path)
    }

    /// Report to TestRail. Consumes the session.
    pub async fn finish(self) -> Result<ReportOutcome, ReportError> {
        let report = self.collector.into_report();
        info!(
            passed = report.passed.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            duration = report.duration,
            "Session finished"
        );
        self.reporter
            .finish(self.api.as_ref(), self.clock.as_ref(), &report)
            .await
    }
}

pub fn write_report(report: &SessionReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Wrote session report");
    Ok(())
}
