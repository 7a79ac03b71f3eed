//! Workflow Node - Typed steps in a workflow graph
//!
//! Nodes are the fundamental building blocks of workflows. Each node carries
//! an id, a type from a closed set, and the fields that type requires.
//! Nodes reference each other by id only, never by pointer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a workflow node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Entry point of the workflow
    Start,
    /// Invokes an agent (requires `agent_id`)
    Agent,
    /// Branches on a condition expression (requires `condition`)
    Conditional,
    /// Forks into two or more parallel branches, defined by outgoing edges
    Fanout,
    /// Bounded-iteration construct (requires `max_iters`)
    Loop,
    /// UI helper for the body of a loop (requires `linkedLoopId`)
    LoopBody,
    /// UI helper for the exit of a loop (requires `linkedLoopId`)
    LoopExit,
    /// Joins parallel branches back together
    Merge,
    /// UI-only message step, no structural constraints
    SendMessage,
    /// UI-only agent invocation step, no structural constraints
    InvokeAgent,
    /// Unrecognized wire value, preserved for validation to report
    #[serde(untagged)]
    Unknown(String),
}

impl NodeType {
    /// Whether this type is part of the closed, recognized set
    pub fn is_recognized(&self) -> bool {
        !matches!(self, NodeType::Unknown(_))
    }

    /// Whether this node type belongs to a loop cluster
    pub fn is_loop_member(&self) -> bool {
        matches!(
            self,
            NodeType::Loop | NodeType::LoopBody | NodeType::LoopExit
        )
    }

    /// UI helper nodes are never independently created or deleted
    pub fn is_ui_helper(&self) -> bool {
        matches!(self, NodeType::LoopBody | NodeType::LoopExit)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Start => write!(f, "start"),
            NodeType::Agent => write!(f, "agent"),
            NodeType::Conditional => write!(f, "conditional"),
            NodeType::Fanout => write!(f, "fanout"),
            NodeType::Loop => write!(f, "loop"),
            NodeType::LoopBody => write!(f, "loop_body"),
            NodeType::LoopExit => write!(f, "loop_exit"),
            NodeType::Merge => write!(f, "merge"),
            NodeType::SendMessage => write!(f, "send_message"),
            NodeType::InvokeAgent => write!(f, "invoke_agent"),
            NodeType::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// A node within a workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Node ID (unique within workflow)
    pub id: String,
    /// Node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Agent to invoke (agent nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Condition expression (conditional nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Iteration bound (loop nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iters: Option<u64>,
    /// Owning loop node (loop_body / loop_exit helpers)
    #[serde(
        rename = "linkedLoopId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_loop_id: Option<String>,
    /// Advisory branch list (fanout nodes); edge-derived targets are authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
    /// Position for visual layout (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<(f32, f32)>,
}

impl WorkflowNode {
    /// Create a node of the given type with no type-specific fields
    pub fn new(id: &str, node_type: NodeType) -> Self {
        Self {
            id: id.to_string(),
            node_type,
            agent_id: None,
            condition: None,
            max_iters: None,
            linked_loop_id: None,
            branches: None,
            position: None,
        }
    }

    /// Create a start node
    pub fn start(id: &str) -> Self {
        Self::new(id, NodeType::Start)
    }

    /// Create an agent node
    pub fn agent(id: &str, agent_id: &str) -> Self {
        let mut node = Self::new(id, NodeType::Agent);
        node.agent_id = Some(agent_id.to_string());
        node
    }

    /// Create a conditional node
    pub fn conditional(id: &str, condition: &str) -> Self {
        let mut node = Self::new(id, NodeType::Conditional);
        node.condition = Some(condition.to_string());
        node
    }

    /// Create a fanout node
    pub fn fanout(id: &str) -> Self {
        Self::new(id, NodeType::Fanout)
    }

    /// Create a merge node
    pub fn merge(id: &str) -> Self {
        Self::new(id, NodeType::Merge)
    }

    /// Set layout position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some((x, y));
        self
    }

    /// Set the advisory branch list
    pub fn with_branches(mut self, branches: Vec<String>) -> Self {
        self.branches = Some(branches);
        self
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    /// Source node ID
    pub from_node: String,
    /// Target node ID
    pub to_node: String,
}

impl WorkflowEdge {
    /// Create a new edge
    pub fn new(from_node: &str, to_node: &str) -> Self {
        Self {
            from_node: from_node.to_string(),
            to_node: to_node.to_string(),
        }
    }

    /// Whether this edge starts and ends on the same node
    pub fn is_self_loop(&self) -> bool {
        self.from_node == self.to_node
    }
}
