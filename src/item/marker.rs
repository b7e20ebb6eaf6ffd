//! Test markers and case id extraction
//!
//! A test is linked to a TestRail case through a `testrail` marker:
//!
//! ```text
//! Mark(name='testrail', args=('C101',), kwargs={})
//! ```
//!
//! Two extraction modes exist. `Structured` reads the first argument (or the
//! `case_id` keyword) as a typed case reference. `Legacy` stringifies the
//! whole marker and concatenates every digit it finds, which is how older
//! reporters behaved; it is kept for installations that depend on those ids.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker name carrying the TestRail case reference
pub const TESTRAIL_MARKER: &str = "testrail";

/// A TestRail case identifier (digits only, without the `C` prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarkerError {
    #[error("Missing case id for test: {node_id}")]
    MissingCaseId { node_id: String },

    #[error("Invalid case id '{value}' for test: {node_id}")]
    InvalidCaseId { node_id: String, value: String },
}

/// How case ids are pulled out of a `testrail` marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Structured,
    Legacy,
}

/// Metadata attached to a single test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
}

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Shorthand for `Marker::new("testrail").arg(case)`
    pub fn testrail(case: impl Into<String>) -> Self {
        Self::new(TESTRAIL_MARKER).arg(case)
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mark(name='{}', args=(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}'", arg)?;
        }
        if self.args.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str("), kwargs={")?;
        for (i, (key, value)) in self.kwargs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': '{}'", key, value)?;
        }
        f.write_str("})")
    }
}

/// A single test as seen by the reporting hooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestItem {
    pub node_id: String,
    pub markers: Vec<Marker>,
}

impl TestItem {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// First marker with the given name
    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == name)
    }

    /// All markers with the given name
    pub fn markers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Marker> {
        self.markers.iter().filter(move |m| m.name == name)
    }

    /// Extract the TestRail case id from this item's `testrail` marker
    pub fn case_id(&self, mode: ExtractionMode) -> Result<CaseId, MarkerError> {
        match mode {
            ExtractionMode::Structured => self.structured_case_id(),
            ExtractionMode::Legacy => self.legacy_case_id(),
        }
    }

    fn structured_case_id(&self) -> Result<CaseId, MarkerError> {
        let marker = self.marker(TESTRAIL_MARKER).ok_or_else(|| self.missing())?;
        let raw = marker
            .args
            .first()
            .or_else(|| marker.kwargs.get("case_id"))
            .ok_or_else(|| self.missing())?;
        parse_case_ref(raw).ok_or_else(|| MarkerError::InvalidCaseId {
            node_id: self.node_id.clone(),
            value: raw.clone(),
        })
    }

    fn legacy_case_id(&self) -> Result<CaseId, MarkerError> {
        let marker = self.marker(TESTRAIL_MARKER).ok_or_else(|| self.missing())?;
        let digits = scrape_digits(&marker.to_string());
        if digits.is_empty() {
            return Err(self.missing());
        }
        Ok(CaseId(digits))
    }

    fn missing(&self) -> MarkerError {
        MarkerError::MissingCaseId {
            node_id: self.node_id.clone(),
        }
    }
}

/// Parse `C123`, `c123` or `123` into a case id
pub fn parse_case_ref(raw: &str) -> Option<CaseId> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix('C')
        .or_else(|| raw.strip_prefix('c'))
        .unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(CaseId(digits.to_string()))
}

/// Concatenate every ASCII digit of `s` in order
pub fn scrape_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
