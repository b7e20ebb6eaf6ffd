//! libtest JSON event adapter
//!
//! Reads the line-delimited JSON emitted by `cargo test -- -Z unstable-options
//! --format json` (or `cargo nextest run --message-format libtest-json`) and
//! turns it into the hook calls the reporter understands:
//!
//! ```text
//! {"type":"test","event":"started","name":"api::login_c101"}   -> Hook::Setup
//! {"type":"test","event":"ok","name":"api::login_c101",...}    -> Hook::Report(call, passed)
//! {"type":"test","event":"failed","name":"api::login_c101"}    -> Hook::Report(call, failed)
//! {"type":"test","event":"ignored","name":"api::login_c101"}   -> Hook::Report(setup, skipped)
//! ```
//!
//! libtest has no marker syntax, so markers come from the `markers` table in
//! the config or from a `c<digits>` token in the test's function name.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::marker::{Marker, TestItem};
use super::phase::{Outcome, PhaseReport};

static CASE_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|_)([cC]\d+)(?:_|$)").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid libtest event on line {line}: {error}")]
    Parse {
        line: usize,
        error: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LibtestEvent {
    Suite(SuiteEvent),
    Test(TestEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteEvent {
    pub event: String,
    #[serde(default)]
    pub test_count: Option<usize>,
    #[serde(default)]
    pub exec_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestEvent {
    pub event: TestEventKind,
    pub name: String,
    #[serde(default)]
    pub exec_time: Option<f64>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestEventKind {
    Started,
    Ok,
    Failed,
    Ignored,
    Timeout,
    #[serde(other)]
    Other,
}

/// A reporter hook call derived from a runner event
#[derive(Debug, Clone, PartialEq)]
pub enum Hook {
    Setup(TestItem),
    Report(TestItem, PhaseReport),
}

/// Builds `TestItem`s (with their markers) for libtest test names
#[derive(Debug, Clone, Default)]
pub struct MarkerResolver {
    explicit: HashMap<String, String>,
}

impl MarkerResolver {
    pub fn new(explicit: HashMap<String, String>) -> Self {
        Self { explicit }
    }

    pub fn resolve(&self, test_name: &str) -> TestItem {
        let item = TestItem::new(test_name);

        if let Some(case) = self.explicit.get(test_name) {
            return item.with_marker(Marker::testrail(case.clone()));
        }

        match case_token(test_name) {
            Some(token) => item.with_marker(Marker::testrail(token)),
            None => item,
        }
    }

    /// Map one libtest event onto the hook it stands for
    pub fn hook_for(&self, event: &LibtestEvent) -> Option<Hook> {
        let LibtestEvent::Test(test) = event else {
            return None;
        };

        let outcome = match test.event {
            TestEventKind::Started => return Some(Hook::Setup(self.resolve(&test.name))),
            TestEventKind::Ok => Outcome::Passed,
            TestEventKind::Failed => Outcome::Failed,
            TestEventKind::Ignored => {
                let report = PhaseReport::skipped(&test.name);
                return Some(Hook::Report(self.resolve(&test.name), report));
            }
            TestEventKind::Timeout | TestEventKind::Other => return None,
        };

        let report = PhaseReport::call(&test.name, outcome)
            .with_duration(test.exec_time.unwrap_or_default());
        Some(Hook::Report(self.resolve(&test.name), report))
    }
}

/// `c<digits>` token in the last path segment of a test name
fn case_token(test_name: &str) -> Option<String> {
    let segment = test_name.rsplit("::").next().unwrap_or(test_name);
    CASE_TOKEN_REGEX
        .captures(segment)
        .map(|caps| caps[1].to_string())
}

/// Parse libtest JSON lines, skipping anything that is not a JSON object
pub fn read_events<R: BufRead>(reader: R) -> impl Iterator<Item = Result<LibtestEvent, EventError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(EventError::Io(e))),
            };
            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                if !trimmed.is_empty() {
                    debug!(line = index + 1, "Skipping non-JSON runner output");
                }
                return None;
            }
            Some(
                serde_json::from_str(trimmed).map_err(|error| EventError::Parse {
                    line: index + 1,
                    error,
                }),
            )
        })
}
