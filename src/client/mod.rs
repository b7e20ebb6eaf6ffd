//! TestRail API client
//!
//! This module contains:
//! - `testrail` - The `TestRailApi` capability and its reqwest implementation
//! - `types` - Request/response bodies and status ids

pub mod testrail;
pub mod types;

pub use testrail::{api_base_url, endpoints, TestRailApi, TestRailClient};
pub use types::{AddResultsRequest, AddRunRequest, AddRunResponse, CaseResult, Status};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("TestRail API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response is not valid JSON: {0}")]
    InvalidBody(String),
}
