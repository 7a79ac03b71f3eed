//! af-graph: Workflow graph model for agentflow
//!
//! Features:
//! - Typed nodes (agents, branching, fanout, bounded loops, merges)
//! - Structural validation as a pure reducer over findings
//! - Loop-cluster-aware node deletion with edge splicing
//! - Run status records observed from the backend runner

pub mod builtin;
pub mod cluster;
pub mod flow;
pub mod mutate;
pub mod node;
pub mod run;
pub mod validate;

pub use cluster::{create_loop_cluster, find_loop_clusters, LoopCluster, LoopClusterNodes};
pub use flow::WorkflowDefinition;
pub use mutate::delete_node;
pub use node::{NodeType, WorkflowEdge, WorkflowNode};
pub use run::{NodeResult, NodeRunStatus, RunStatus, WorkflowRun};
pub use validate::{has_errors, validate, Severity, ValidationError};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::cluster::{create_loop_cluster, find_loop_clusters, LoopCluster};
    pub use super::flow::WorkflowDefinition;
    pub use super::mutate::delete_node;
    pub use super::node::{NodeType, WorkflowEdge, WorkflowNode};
    pub use super::run::{NodeResult, RunStatus, WorkflowRun};
    pub use super::validate::{validate, ValidationError};
}
