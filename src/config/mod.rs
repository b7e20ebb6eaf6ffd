//! Reporter configuration
//!
//! Loaded from a YAML file. YAML is a superset of JSON, so JSON files load
//! too:
//!
//! ```yaml
//! service_url: "https://example.testrail.io/"
//! user_name: "ci@example.com"
//! password: "api-key"
//! project_id: "1"
//! suite_id: "4"
//!
//! # optional
//! report_skipped: false
//! extraction: structured
//! markers:
//!   "api::tests::login": "C101"
//! ```
//!
//! The nested JSON layout used by older reporters is also accepted. Flat keys
//! win over nested ones:
//!
//! ```json
//! {
//!     "TestRailURL": "https://example.testrail.io/",
//!     "Credentials": { "TestRailsUserName": "ci@example.com", "TestRailsPassword": "api-key" },
//!     "TestRunInformation": { "ProjectId": "1", "SuiteId": "4" }
//! }
//! ```
//!
//! Values are not validated; empty strings are sent to TestRail as-is.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::item::ExtractionMode;

pub const ENV_URL: &str = "TESTRAIL_URL";
pub const ENV_USER: &str = "TESTRAIL_USER";
pub const ENV_PASSWORD: &str = "TESTRAIL_PASSWORD";
pub const ENV_PROJECT_ID: &str = "TESTRAIL_PROJECT_ID";
pub const ENV_SUITE_ID: &str = "TESTRAIL_SUITE_ID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Parse {
        file: String,
        error: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct ReporterConfig {
    pub service_url: String,
    pub user_name: String,
    pub password: String,
    pub project_id: String,
    pub suite_id: String,

    /// Path between `service_url` and the endpoint name
    pub api_path: String,

    /// HTTP request timeout in milliseconds
    pub timeout_ms: u64,

    /// Submit skipped tests as Blocked instead of dropping them
    pub report_skipped: bool,
    pub extraction: ExtractionMode,

    /// Test name -> case reference, for tests whose names carry no `c<id>` token
    pub markers: HashMap<String, String>,
}

/// On-disk shape: the flat keys plus the nested `Credentials` and
/// `TestRunInformation` sections
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default, alias = "ServiceURL", alias = "TestRailURL")]
    service_url: String,

    #[serde(default, alias = "UserName", alias = "TestRailsUserName")]
    user_name: String,

    #[serde(default, alias = "Password", alias = "TestRailsPassword")]
    password: String,

    #[serde(default, alias = "ProjectId", deserialize_with = "string_or_number")]
    project_id: String,

    #[serde(default, alias = "SuiteId", deserialize_with = "string_or_number")]
    suite_id: String,

    #[serde(default, rename = "Credentials")]
    credentials: Option<Credentials>,

    #[serde(default, rename = "TestRunInformation")]
    run_information: Option<RunInformation>,

    #[serde(default = "default_api_path")]
    api_path: String,

    #[serde(default = "default_timeout")]
    timeout_ms: u64,

    #[serde(default)]
    report_skipped: bool,

    #[serde(default)]
    extraction: ExtractionMode,

    #[serde(default)]
    markers: HashMap<String, String>,
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default, rename = "TestRailsUserName", alias = "user_name")]
    user_name: String,

    #[serde(default, rename = "TestRailsPassword", alias = "password")]
    password: String,
}

#[derive(Deserialize)]
struct RunInformation {
    #[serde(default, rename = "ProjectId", alias = "project_id", deserialize_with = "string_or_number")]
    project_id: String,

    #[serde(default, rename = "SuiteId", alias = "suite_id", deserialize_with = "string_or_number")]
    suite_id: String,
}

fn or_nested(flat: String, nested: Option<String>) -> String {
    match nested {
        Some(value) if flat.is_empty() => value,
        _ => flat,
    }
}

impl From<RawConfig> for ReporterConfig {
    fn from(raw: RawConfig) -> Self {
        let (user_name, password) = match raw.credentials {
            Some(c) => (Some(c.user_name), Some(c.password)),
            None => (None, None),
        };
        let (project_id, suite_id) = match raw.run_information {
            Some(r) => (Some(r.project_id), Some(r.suite_id)),
            None => (None, None),
        };

        Self {
            service_url: raw.service_url,
            user_name: or_nested(raw.user_name, user_name),
            password: or_nested(raw.password, password),
            project_id: or_nested(raw.project_id, project_id),
            suite_id: or_nested(raw.suite_id, suite_id),
            api_path: raw.api_path,
            timeout_ms: raw.timeout_ms,
            report_skipped: raw.report_skipped,
            extraction: raw.extraction,
            markers: raw.markers,
        }
    }
}

/// Accept `project_id: 1` as well as `project_id: "1"`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn default_api_path() -> String {
    "index.php?/api/v2/".to_string()
}

fn default_timeout() -> u64 {
    30_000
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            user_name: String::new(),
            password: String::new(),
            project_id: String::new(),
            suite_id: String::new(),
            api_path: default_api_path(),
            timeout_ms: default_timeout(),
            report_skipped: false,
            extraction: ExtractionMode::default(),
            markers: HashMap::new(),
        }
    }
}

impl ReporterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|error| ConfigError::Parse {
            file: path.display().to_string(),
            error,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Override fields from `TESTRAIL_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut String); 5] = [
            (ENV_URL, &mut self.service_url),
            (ENV_USER, &mut self.user_name),
            (ENV_PASSWORD, &mut self.password),
            (ENV_PROJECT_ID, &mut self.project_id),
            (ENV_SUITE_ID, &mut self.suite_id),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }
    }
}
