//! af-client: Backend runner client for agentflow
//!
//! The runner owns run records; this crate only submits workflows and reads
//! status. The `WorkflowRunner` trait is the seam the execution status
//! tracker polls through, so tests can substitute a mock runner.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use af_core::{Error, Result, RunnerConfig};
use af_graph::{WorkflowDefinition, WorkflowRun};

/// Handle returned when a workflow is submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    /// Id of the created run
    pub run_id: String,
}

/// Contract consumed from the backend runner.
///
/// The backend re-validates workflows independently; callers are expected to
/// validate before submission but the runner is the authority.
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    /// Submit a workflow for execution
    async fn create_run(&self, workflow: &WorkflowDefinition) -> Result<RunHandle>;

    /// Fetch the current run record
    async fn get_execution_status(&self, run_id: &str) -> Result<WorkflowRun>;

    /// Produce a ready-to-edit workflow from a template
    async fn instantiate_template(
        &self,
        template_id: &str,
        params: Value,
    ) -> Result<WorkflowDefinition>;
}

/// HTTP implementation of the runner contract
pub struct HttpRunnerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRunnerClient {
    /// Create a client from runner settings
    pub fn new(config: &RunnerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::runner(format!("runner returned {}: {}", status, body)))
    }
}

#[async_trait]
impl WorkflowRunner for HttpRunnerClient {
    #[instrument(skip(self, workflow))]
    async fn create_run(&self, workflow: &WorkflowDefinition) -> Result<RunHandle> {
        let response = self
            .client
            .post(self.url("/api/runs"))
            .json(workflow)
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        let handle: RunHandle = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        debug!(run_id = %handle.run_id, "Run created");
        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn get_execution_status(&self, run_id: &str) -> Result<WorkflowRun> {
        let response = self
            .client
            .get(self.url(&format!("/api/runs/{}", run_id)))
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::http(e.to_string()))
    }

    #[instrument(skip(self, params))]
    async fn instantiate_template(
        &self,
        template_id: &str,
        params: Value,
    ) -> Result<WorkflowDefinition> {
        let response = self
            .client
            .post(self.url(&format!("/api/templates/{}/instantiate", template_id)))
            .json(&params)
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| Error::http(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = RunnerConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..RunnerConfig::default()
        };
        let client = HttpRunnerClient::new(&config).unwrap();
        assert_eq!(client.url("/api/runs"), "http://localhost:8080/api/runs");
    }

    #[test]
    fn test_run_handle_wire_shape() {
        let handle: RunHandle = serde_json::from_str("{\"run_id\": \"r-1\"}").unwrap();
        assert_eq!(handle.run_id, "r-1");
    }
}
