use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::types::{AddResultsRequest, AddRunRequest, AddRunResponse};
use super::ClientError;
use crate::config::ReporterConfig;

pub mod endpoints {
    pub fn add_run(project_id: &str) -> String {
        format!("add_run/{}", project_id)
    }

    pub fn add_results_for_cases(run_id: u64) -> String {
        format!("add_results_for_cases/{}", run_id)
    }
}

/// The two TestRail calls a session needs
#[async_trait]
pub trait TestRailApi: Send + Sync {
    async fn add_run(
        &self,
        project_id: &str,
        request: &AddRunRequest,
    ) -> Result<AddRunResponse, ClientError>;

    async fn add_results_for_cases(
        &self,
        run_id: u64,
        request: &AddResultsRequest,
    ) -> Result<Value, ClientError>;
}

#[derive(Debug)]
pub struct TestRailClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
}

impl TestRailClient {
    pub fn new(config: &ReporterConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: api_base_url(&config.service_url, &config.api_path),
            user: config.user_name.clone(),
            password: config.password.clone(),
        })
    }

    pub fn endpoint_url(&self, uri: &str) -> String {
        format!("{}{}", self.base_url, uri)
    }

    /// POST `data` to `uri` and return the decoded JSON body.
    ///
    /// A body carrying an `error` key is turned into `ClientError::Api`,
    /// whatever the status code.
    pub async fn send_post<T: Serialize + ?Sized>(
        &self,
        uri: &str,
        data: &T,
    ) -> Result<Value, ClientError> {
        let url = self.endpoint_url(uri);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .json(data)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Option<Value> = if text.trim().is_empty() {
            Some(Value::Null)
        } else {
            serde_json::from_str(&text).ok()
        };

        if let Some(error) = body.as_ref().and_then(|b| b.get("error")) {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            });
        }

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: text,
            });
        }

        match body {
            Some(value) => Ok(value),
            None => Err(ClientError::InvalidBody(text)),
        }
    }
}

#[async_trait]
impl TestRailApi for TestRailClient {
    async fn add_run(
        &self,
        project_id: &str,
        request: &AddRunRequest,
    ) -> Result<AddRunResponse, ClientError> {
        match self.send_post(&endpoints::add_run(project_id), request).await {
            Ok(value) => Ok(AddRunResponse::from_value(value)),
            Err(ClientError::Api { message, .. }) => Ok(AddRunResponse::Rejected { error: message }),
            Err(e) => Err(e),
        }
    }

    async fn add_results_for_cases(
        &self,
        run_id: u64,
        request: &AddResultsRequest,
    ) -> Result<Value, ClientError> {
        self.send_post(&endpoints::add_results_for_cases(run_id), request)
            .await
    }
}

/// `https://host/` + `index.php?/api/v2/`, with exactly one slash between
pub fn api_base_url(service_url: &str, api_path: &str) -> String {
    let mut base = service_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    base.push_str(api_path.trim_start_matches('/'));
    base
}
