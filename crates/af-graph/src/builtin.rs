//! Built-in Workflow Definitions
//!
//! Ready-to-edit workflows for common orchestration shapes.

use crate::flow::WorkflowDefinition;
use crate::node::{NodeType, WorkflowNode};

/// Get all built-in workflow definitions
pub fn builtin_workflows() -> Vec<WorkflowDefinition> {
    vec![
        triage_chain_workflow(),
        parallel_review_workflow(),
        bounded_retry_workflow(),
    ]
}

/// Sequential triage chain: classify, then respond
fn triage_chain_workflow() -> WorkflowDefinition {
    WorkflowDefinition::new()
        .with_node(WorkflowNode::start("start").with_position(100.0, 100.0))
        .with_node(WorkflowNode::agent("classify", "classifier").with_position(300.0, 100.0))
        .with_node(WorkflowNode::agent("respond", "responder").with_position(500.0, 100.0))
        .with_edge("start", "classify")
        .with_edge("classify", "respond")
        .with_entry("start")
}

/// Multi-perspective review with a fanout and a merge
fn parallel_review_workflow() -> WorkflowDefinition {
    WorkflowDefinition::new()
        .with_node(WorkflowNode::start("start").with_position(100.0, 150.0))
        .with_node(WorkflowNode::fanout("split").with_position(250.0, 150.0))
        .with_node(WorkflowNode::agent("security", "security_reviewer").with_position(400.0, 50.0))
        .with_node(WorkflowNode::agent("architecture", "architect").with_position(400.0, 150.0))
        .with_node(
            WorkflowNode::agent("performance", "performance_analyst").with_position(400.0, 250.0),
        )
        .with_node(WorkflowNode::merge("consolidate").with_position(600.0, 150.0))
        .with_edge("start", "split")
        .with_edge("split", "security")
        .with_edge("split", "architecture")
        .with_edge("split", "performance")
        .with_edge("security", "consolidate")
        .with_edge("architecture", "consolidate")
        .with_edge("performance", "consolidate")
        .with_entry("start")
}

/// Bounded retry loop around a flaky agent call
fn bounded_retry_workflow() -> WorkflowDefinition {
    let mut retry_loop = WorkflowNode::new("retry", NodeType::Loop).with_position(300.0, 100.0);
    retry_loop.max_iters = Some(3);

    let mut body = WorkflowNode::new("retry_body", NodeType::LoopBody).with_position(300.0, 220.0);
    body.linked_loop_id = Some("retry".to_string());

    let mut exit = WorkflowNode::new("retry_exit", NodeType::LoopExit).with_position(500.0, 100.0);
    exit.linked_loop_id = Some("retry".to_string());

    WorkflowDefinition::new()
        .with_node(WorkflowNode::start("start").with_position(100.0, 100.0))
        .with_node(retry_loop)
        .with_node(body)
        .with_node(exit)
        .with_node(WorkflowNode::agent("report", "reporter").with_position(700.0, 100.0))
        .with_edge("start", "retry")
        .with_edge("retry", "retry_body")
        .with_edge("retry_body", "retry")
        .with_edge("retry", "retry_exit")
        .with_edge("retry_exit", "report")
        .with_entry("start")
}
