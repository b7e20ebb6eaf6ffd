//! # TestRail Reporter
//!
//! A test-runner extension that collects test outcomes during a session and
//! reports them to a TestRail run when the session ends.
//!
//! ## Flow
//!
//! - **Collect** - every test event goes through the session hooks; passed,
//!   failed and skipped tests are recorded against the case id found in the
//!   test's `testrail` marker
//! - **Create run** - at session end `add_run/{project_id}` creates a run
//!   named `Auto Test | <local time>` containing the passed and failed cases
//! - **Submit** - `add_results_for_cases/{run_id}` posts status 1 for passed
//!   and 5 for failed cases
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use testrail_reporter::{Marker, Outcome, PhaseReport, ReporterConfig, Session, SystemClock, TestItem, TestRailClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReporterConfig::load("testrail.yaml")?;
//!     let client = Arc::new(TestRailClient::new(&config)?);
//!     let mut session = Session::start(&config, client, Arc::new(SystemClock));
//!
//!     let item = TestItem::new("api::login").with_marker(Marker::testrail("C101"));
//!     session.on_setup(&item);
//!     session.on_report(&item, &PhaseReport::call("api::login", Outcome::Passed))?;
//!
//!     let outcome = session.finish().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod item;

// Re-export main types
pub use client::{
    AddResultsRequest, AddRunRequest, AddRunResponse, CaseResult, ClientError, Status,
    TestRailApi, TestRailClient,
};
pub use config::{ConfigError, ReporterConfig};
pub use engine::{
    write_report, Clock, EventCollector, MockClock, ReportError, ReportOutcome,
    ResultAggregator, Session, SessionPhase, SessionReport, SessionReporter, SkippedEntry,
    SystemClock,
};
pub use item::{
    CaseId, EventError, ExtractionMode, Hook, Marker, MarkerError, MarkerResolver, Outcome, Phase,
    PhaseReport, TestItem,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{TestRailApi, TestRailClient};
    pub use crate::config::ReporterConfig;
    pub use crate::engine::{
        parse_time, Clock, EventCollector, MockClock, ReportOutcome, Session, SessionReport,
        SystemClock,
    };
    pub use crate::item::{ExtractionMode, Marker, Outcome, PhaseReport, TestItem};
}
