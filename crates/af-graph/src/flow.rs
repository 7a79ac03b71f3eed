//! Workflow Definition - Graph of connected nodes
//!
//! A workflow is a directed graph of typed nodes connected by edges.
//! Nodes live in a flat ordered sequence and are always looked up by id.

use serde::{Deserialize, Serialize};

use af_core::Result;

use crate::node::{WorkflowEdge, WorkflowNode};

/// Workflow definition (serializable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Node definitions, in declaration order
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    /// Edges between nodes
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
    /// Designated starting node, if explicitly set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_node_id: Option<String>,
}

impl WorkflowDefinition {
    /// Create an empty workflow definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node
    pub fn with_node(mut self, node: WorkflowNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge
    pub fn with_edge(mut self, from_node: &str, to_node: &str) -> Self {
        self.edges.push(WorkflowEdge::new(from_node, to_node));
        self
    }

    /// Set the entry node
    pub fn with_entry(mut self, entry_node_id: &str) -> Self {
        self.entry_node_id = Some(entry_node_id.to_string());
        self
    }

    /// Look up a node by id
    pub fn node(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Whether a node with the given id is declared
    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == node_id)
    }

    /// Distinct targets of edges leaving the given node, in edge order
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for edge in &self.edges {
            if edge.from_node == node_id && !targets.contains(&edge.to_node.as_str()) {
                targets.push(&edge.to_node);
            }
        }
        targets
    }

    /// Distinct sources of edges entering the given node, in edge order
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for edge in &self.edges {
            if edge.to_node == node_id && !sources.contains(&edge.from_node.as_str()) {
                sources.push(&edge.from_node);
            }
        }
        sources
    }

    /// Whether an edge from `from_node` to `to_node` exists
    pub fn has_edge(&self, from_node: &str, to_node: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.from_node == from_node && e.to_node == to_node)
    }

    /// Parse a workflow from its JSON wire shape.
    ///
    /// Malformed input is the one fatal path in the model: it is reported to
    /// the caller and never partially accepted.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the JSON wire shape
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
