//! Session engine module
//!
//! This module contains:
//! - `aggregator` - Per-session outcome collection
//! - `reporter` - End-of-session TestRail reporting
//! - `session` - Session lifecycle and libtest event ingestion
//! - `clock` - Wall clock used for run names
//! - `error` - Reporter error types

pub mod aggregator;
pub mod clock;
pub mod error;
pub mod reporter;
pub mod session;

pub use aggregator::{ResultAggregator, SessionReport, SkippedEntry};
pub use clock::{format_timestamp, parse_time, run_name, Clock, ClockError, MockClock, SystemClock};
pub use error::ReportError;
pub use reporter::{ReportOutcome, SessionReporter};
pub use session::{write_report, EventCollector, Session, SessionPhase};
