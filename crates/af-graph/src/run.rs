//! Workflow Run - Execution record observed from the backend runner
//!
//! A run is created by submitting a validated workflow and is owned and
//! updated exclusively by the external runner; this model only observes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Status of a workflow run
///
/// State machine: `queued → running → {succeeded | failed | canceled}`,
/// with all three right-hand states terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run accepted, not yet started
    Queued,
    /// Run is currently executing
    Running,
    /// Run completed successfully
    Succeeded,
    /// Run failed
    Failed,
    /// Run was canceled
    Canceled,
}

impl RunStatus {
    /// Whether no further transition can occur from this status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::Canceled
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// Outcome status of a single node within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRunStatus {
    /// Node completed successfully
    Succeeded,
    /// Node failed
    Failed,
}

/// Result of one node's execution within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    /// Outcome status
    pub status: NodeRunStatus,
    /// Inputs the node was invoked with
    pub inputs: Value,
    /// Output produced by the node (null while still queued upstream)
    #[serde(default)]
    pub output: Option<Value>,
    /// Log lines emitted during execution
    #[serde(default)]
    pub logs: Vec<String>,
    /// Execution duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
    /// When execution of this node started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Error message if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeResult {
    /// Create a successful result
    pub fn succeeded(inputs: Value, output: Value) -> Self {
        Self {
            status: NodeRunStatus::Succeeded,
            inputs,
            output: Some(output),
            logs: Vec::new(),
            duration_ms: 0,
            started_at: None,
            error: None,
        }
    }

    /// Create a failed result
    pub fn failed(inputs: Value, error: impl Into<String>) -> Self {
        Self {
            status: NodeRunStatus::Failed,
            inputs,
            output: None,
            logs: Vec::new(),
            duration_ms: 0,
            started_at: None,
            error: Some(error.into()),
        }
    }

    /// Set duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Append a log line
    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }
}

/// Execution record for one submitted workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Unique run ID
    pub id: String,
    /// Workflow this run was created from
    pub workflow_id: String,
    /// Current status
    pub status: RunStatus,
    /// Per-node results, keyed by node id
    #[serde(default)]
    pub node_results: HashMap<String, NodeResult>,
    /// Run-level error message if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    /// Create a new queued run record
    pub fn new(workflow_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            workflow_id: workflow_id.to_string(),
            status: RunStatus::Queued,
            node_results: HashMap::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update status
    pub fn update_status(&mut self, new_status: RunStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    /// Record the result of one node
    pub fn record_node_result(&mut self, node_id: &str, result: NodeResult) {
        self.node_results.insert(node_id.to_string(), result);
        self.updated_at = Utc::now();
    }
}
