//! Test items as seen by the reporter
//!
//! This module contains:
//! - `marker` - Test markers and case id extraction
//! - `phase` - Per-phase test reports
//! - `libtest` - Adapter from libtest JSON events to reporter hooks

pub mod libtest;
pub mod marker;
pub mod phase;

pub use libtest::{read_events, EventError, Hook, LibtestEvent, MarkerResolver, TestEvent, TestEventKind};
pub use marker::{
    parse_case_ref, scrape_digits, CaseId, ExtractionMode, Marker, MarkerError, TestItem,
    TESTRAIL_MARKER,
};
pub use phase::{Outcome, Phase, PhaseReport};
