//! Structural Validation - Decides whether a workflow is executable
//!
//! Validation failures are data, not exceptions: every rule appends to the
//! result list and a single `validate` call surfaces every violation at
//! once. An empty list means the workflow is valid.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::flow::WorkflowDefinition;
use crate::node::NodeType;

/// Class of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Advisory finding; does not make the workflow non-executable
    Warning,
    /// Structural violation; the workflow cannot be submitted
    Error,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `nodes[3].id`
    pub field: String,
    /// Human-readable description
    pub message: String,
    /// Finding class
    pub severity: Severity,
}

impl ValidationError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Whether this finding blocks submission
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Whether a finding list contains any submission-blocking errors
pub fn has_errors(findings: &[ValidationError]) -> bool {
    findings.iter().any(|f| f.is_error())
}

/// Validate a workflow definition.
///
/// Never fails; returns the ordered list of findings. Rules run in a fixed
/// order so test expectations are deterministic, and all rules are
/// cumulative: one call surfaces every violation.
pub fn validate(workflow: &WorkflowDefinition) -> Vec<ValidationError> {
    let mut findings = Vec::new();

    // Rule 1: at least one node. Keep checking edges even when empty.
    if workflow.nodes.is_empty() {
        findings.push(ValidationError::error(
            "workflow",
            "workflow must contain at least one node",
        ));
    }

    // Rule 2: duplicate ids (one finding per duplicate occurrence) and
    // unrecognized types, in declaration order.
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (i, node) in workflow.nodes.iter().enumerate() {
        if !seen_ids.insert(&node.id) {
            findings.push(ValidationError::error(
                format!("nodes[{}].id", i),
                format!("duplicate node id '{}'", node.id),
            ));
        }
        if let NodeType::Unknown(value) = &node.node_type {
            findings.push(ValidationError::error(
                format!("nodes[{}].type", i),
                format!("unrecognized node type '{}'", value),
            ));
        }
    }

    // Rule 3: type-specific required fields.
    for (i, node) in workflow.nodes.iter().enumerate() {
        match node.node_type {
            NodeType::Agent => {
                if node.agent_id.as_deref().map_or(true, str::is_empty) {
                    findings.push(ValidationError::error(
                        format!("nodes[{}].agent_id", i),
                        format!("agent node '{}' requires a non-empty agent_id", node.id),
                    ));
                }
            }
            NodeType::Conditional => {
                if node.condition.as_deref().map_or(true, str::is_empty) {
                    findings.push(ValidationError::error(
                        format!("nodes[{}].condition", i),
                        format!(
                            "conditional node '{}' requires a non-empty condition",
                            node.id
                        ),
                    ));
                }
            }
            NodeType::Loop => {
                if node.max_iters.map_or(true, |n| n == 0) {
                    findings.push(ValidationError::error(
                        format!("nodes[{}].max_iters", i),
                        format!("loop node '{}' requires a positive max_iters", node.id),
                    ));
                }
            }
            _ => {}
        }
    }

    // Rule 4: fanout branch membership is derived from edges.
    for (i, node) in workflow.nodes.iter().enumerate() {
        if node.node_type != NodeType::Fanout {
            continue;
        }

        let branch_targets: BTreeSet<&str> = workflow
            .edges
            .iter()
            .filter(|e| e.from_node == node.id)
            .map(|e| e.to_node.as_str())
            .collect();

        if branch_targets.len() < 2 {
            findings.push(ValidationError::error(
                format!("nodes[{}]", i),
                format!(
                    "fanout node '{}' requires at least 2 outgoing branches, found {}",
                    node.id,
                    branch_targets.len()
                ),
            ));
        }

        // Advisory list is checked against the authoritative edge-derived set.
        if let Some(declared) = &node.branches {
            let declared_set: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
            if declared_set != branch_targets {
                findings.push(ValidationError::warning(
                    format!("nodes[{}].branches", i),
                    format!(
                        "fanout node '{}' declares branches [{}] but edges target [{}]",
                        node.id,
                        declared_set.iter().copied().collect::<Vec<_>>().join(", "),
                        branch_targets.iter().copied().collect::<Vec<_>>().join(", "),
                    ),
                ));
            }
        }
    }

    // Rule 5: edge endpoints must exist; self-loops are flagged unless the
    // source is a loop or loop_body node.
    for (i, edge) in workflow.edges.iter().enumerate() {
        if !workflow.contains_node(&edge.from_node) {
            findings.push(ValidationError::error(
                format!("edges[{}].from_node", i),
                format!("edge references unknown source node '{}'", edge.from_node),
            ));
        }
        if !workflow.contains_node(&edge.to_node) {
            findings.push(ValidationError::error(
                format!("edges[{}].to_node", i),
                format!("edge references unknown target node '{}'", edge.to_node),
            ));
        }
        if edge.is_self_loop() {
            let source_type = workflow.node(&edge.from_node).map(|n| &n.node_type);
            let allowed = matches!(source_type, Some(NodeType::Loop) | Some(NodeType::LoopBody));
            if !allowed {
                findings.push(ValidationError::warning(
                    format!("edges[{}]", i),
                    format!("self-loop on node '{}'", edge.from_node),
                ));
            }
        }
    }

    // Rule 6: entry node must exist.
    if let Some(entry) = &workflow.entry_node_id {
        if !workflow.contains_node(entry) {
            findings.push(ValidationError::error(
                "entry_node_id",
                format!("entry node '{}' does not exist", entry),
            ));
        }
    }

    // Rule 7: connectivity. A single-node workflow is trivially connected.
    if workflow.nodes.len() > 1 {
        for (i, node) in workflow.nodes.iter().enumerate() {
            let connected = workflow
                .edges
                .iter()
                .any(|e| e.from_node == node.id || e.to_node == node.id);
            if !connected {
                findings.push(ValidationError::error(
                    format!("nodes[{}]", i),
                    format!("node '{}' is not connected to any edge", node.id),
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeType, WorkflowNode};

    fn valid_chain() -> WorkflowDefinition {
        WorkflowDefinition::new()
            .with_node(WorkflowNode::start("start"))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_edge("start", "a")
            .with_entry("start")
    }

    #[test]
    fn test_valid_workflow_has_no_findings() {
        assert!(validate(&valid_chain()).is_empty());
    }

    #[test]
    fn test_empty_workflow() {
        let findings = validate(&WorkflowDefinition::new());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "workflow");
        assert!(has_errors(&findings));
    }

    #[test]
    fn test_empty_workflow_still_checks_edges() {
        let wf = WorkflowDefinition {
            nodes: vec![],
            edges: vec![crate::node::WorkflowEdge::new("ghost", "ghost2")],
            entry_node_id: None,
        };
        let findings = validate(&wf);
        // top-level error plus both unknown endpoints
        assert_eq!(findings.iter().filter(|f| f.is_error()).count(), 3);
    }

    #[test]
    fn test_duplicate_ids_one_finding_per_occurrence() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::start("x"))
            .with_node(WorkflowNode::agent("x", "agent-1"))
            .with_node(WorkflowNode::merge("x"))
            .with_edge("x", "x");

        let duplicates: Vec<_> = validate(&wf)
            .into_iter()
            .filter(|f| f.message.contains("duplicate"))
            .collect();
        // three declarations of 'x' means two duplicate occurrences
        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].field, "nodes[1].id");
        assert_eq!(duplicates[1].field, "nodes[2].id");
    }

    #[test]
    fn test_unrecognized_type() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::new("n", NodeType::Unknown("teleport".into())));
        let findings = validate(&wf);
        assert!(findings
            .iter()
            .any(|f| f.field == "nodes[0].type" && f.message.contains("teleport")));
    }

    #[test]
    fn test_type_specific_requirements() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::agent("a", ""))
            .with_node(WorkflowNode::conditional("c", ""))
            .with_node(WorkflowNode::new("l", NodeType::Loop))
            .with_edge("a", "c")
            .with_edge("c", "l");

        let findings = validate(&wf);
        assert!(findings.iter().any(|f| f.field == "nodes[0].agent_id"));
        assert!(findings.iter().any(|f| f.field == "nodes[1].condition"));
        assert!(findings.iter().any(|f| f.field == "nodes[2].max_iters"));
    }

    #[test]
    fn test_zero_max_iters_rejected() {
        let mut loop_node = WorkflowNode::new("l", NodeType::Loop);
        loop_node.max_iters = Some(0);
        let wf = WorkflowDefinition::new().with_node(loop_node);
        assert!(validate(&wf)
            .iter()
            .any(|f| f.field == "nodes[0].max_iters"));
    }

    #[test]
    fn test_fanout_requires_two_branches() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::fanout("f"))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_edge("f", "a");

        assert!(validate(&wf)
            .iter()
            .any(|f| f.field == "nodes[0]" && f.message.contains("found 1")));
    }

    #[test]
    fn test_fanout_two_distinct_targets_passes() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::fanout("f"))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_node(WorkflowNode::agent("b", "agent-2"))
            .with_edge("f", "a")
            .with_edge("f", "b");

        assert!(validate(&wf).is_empty());
    }

    #[test]
    fn test_fanout_duplicate_targets_do_not_count_twice() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::fanout("f"))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_edge("f", "a")
            .with_edge("f", "a");

        assert!(validate(&wf)
            .iter()
            .any(|f| f.message.contains("found 1")));
    }

    #[test]
    fn test_fanout_advisory_branch_mismatch_is_warning() {
        let wf = WorkflowDefinition::new()
            .with_node(
                WorkflowNode::fanout("f").with_branches(vec!["a".into(), "stale".into()]),
            )
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_node(WorkflowNode::agent("b", "agent-2"))
            .with_edge("f", "a")
            .with_edge("f", "b");

        let findings = validate(&wf);
        let mismatch = findings
            .iter()
            .find(|f| f.field == "nodes[0].branches")
            .unwrap();
        assert_eq!(mismatch.severity, Severity::Warning);
        assert!(mismatch.message.contains("stale"));
        assert!(mismatch.message.contains("b"));
        // only the warning, regardless of the advisory list
        assert!(!has_errors(&findings));
    }

    #[test]
    fn test_edge_endpoints_checked_independently() {
        let wf = valid_chain().with_edge("ghost", "phantom");
        let findings = validate(&wf);
        assert!(findings.iter().any(|f| f.field == "edges[1].from_node"));
        assert!(findings.iter().any(|f| f.field == "edges[1].to_node"));
    }

    #[test]
    fn test_self_loop_flagged_unless_loop_source() {
        let mut loop_node = WorkflowNode::new("l", NodeType::Loop);
        loop_node.max_iters = Some(2);
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_node(loop_node)
            .with_edge("a", "a")
            .with_edge("a", "l")
            .with_edge("l", "l");

        let findings = validate(&wf);
        let self_loops: Vec<_> = findings
            .iter()
            .filter(|f| f.message.contains("self-loop"))
            .collect();
        assert_eq!(self_loops.len(), 1);
        assert_eq!(self_loops[0].field, "edges[0]");
        assert_eq!(self_loops[0].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_entry_node() {
        let wf = valid_chain().with_entry("gone");
        assert!(validate(&wf)
            .iter()
            .any(|f| f.field == "entry_node_id" && f.message.contains("gone")));
    }

    #[test]
    fn test_single_node_workflow_is_valid() {
        let wf = WorkflowDefinition::new().with_node(WorkflowNode::start("only"));
        assert!(validate(&wf).is_empty());
    }

    #[test]
    fn test_orphans_reported_individually() {
        let wf = valid_chain()
            .with_node(WorkflowNode::merge("lonely"))
            .with_node(WorkflowNode::merge("stranded"));

        let orphans: Vec<_> = validate(&wf)
            .into_iter()
            .filter(|f| f.message.contains("not connected"))
            .collect();
        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].field, "nodes[2]");
        assert_eq!(orphans[1].field, "nodes[3]");
    }

    #[test]
    fn test_all_violations_surfaced_at_once() {
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::agent("a", ""))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_node(WorkflowNode::merge("lonely"))
            .with_edge("a", "ghost")
            .with_entry("gone");

        let findings = validate(&wf);
        // duplicate id, empty agent_id, unknown edge target, missing entry, orphan
        assert!(findings.len() >= 5);
    }
}
