//! Graph Mutation - Node deletion with splice
//!
//! Removing an interior node must not sever the flow between its
//! predecessors and successors. Deletion is the only place nodes leave the
//! model, and it is total: the result is always structurally consistent,
//! never a dangling edge.

use std::collections::HashSet;

use tracing::debug;

use crate::flow::WorkflowDefinition;
use crate::node::WorkflowEdge;

/// Delete a node from a workflow, splicing predecessors to successors.
///
/// If the target belongs to a loop cluster, the whole {loop, loop_body,
/// loop_exit} triple is the deletion unit; clusters are atomic and cannot be
/// partially removed. Deleting an id that does not exist is a no-op that
/// returns the workflow unchanged.
pub fn delete_node(workflow: &WorkflowDefinition, node_id: &str) -> WorkflowDefinition {
    let Some(target) = workflow.node(node_id) else {
        return workflow.clone();
    };

    // Step 1: resolve the deletion unit.
    let unit: HashSet<String> = if target.node_type.is_loop_member() {
        let loop_id = target
            .linked_loop_id
            .as_deref()
            .unwrap_or(&target.id)
            .to_string();
        let mut unit: HashSet<String> = workflow
            .nodes
            .iter()
            .filter(|n| n.linked_loop_id.as_deref() == Some(loop_id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        unit.insert(loop_id);
        unit
    } else {
        HashSet::from([target.id.clone()])
    };

    debug!(node_id = %node_id, unit_size = unit.len(), "Deleting node");

    // Step 2: collect distinct predecessors and successors outside the unit,
    // preserving first-seen edge order.
    let mut predecessors: Vec<&str> = Vec::new();
    let mut successors: Vec<&str> = Vec::new();
    for edge in &workflow.edges {
        if unit.contains(&edge.to_node)
            && !unit.contains(&edge.from_node)
            && !predecessors.contains(&edge.from_node.as_str())
        {
            predecessors.push(&edge.from_node);
        }
        if unit.contains(&edge.from_node)
            && !unit.contains(&edge.to_node)
            && !successors.contains(&edge.to_node.as_str())
        {
            successors.push(&edge.to_node);
        }
    }

    // Step 3: remove every edge touching the unit.
    let mut edges: Vec<WorkflowEdge> = workflow
        .edges
        .iter()
        .filter(|e| !unit.contains(&e.from_node) && !unit.contains(&e.to_node))
        .cloned()
        .collect();

    // Step 4: splice predecessor -> successor, skipping duplicates and
    // never introducing a new self-loop.
    for pred in &predecessors {
        for succ in &successors {
            if pred == succ {
                continue;
            }
            let exists = edges
                .iter()
                .any(|e| e.from_node == *pred && e.to_node == *succ);
            if !exists {
                edges.push(WorkflowEdge::new(pred, succ));
            }
        }
    }

    // Step 5: remove the unit's nodes. The entry id is cleared if it pointed
    // into the unit so the definition stays internally consistent.
    let nodes = workflow
        .nodes
        .iter()
        .filter(|n| !unit.contains(&n.id))
        .cloned()
        .collect();
    let entry_node_id = workflow
        .entry_node_id
        .clone()
        .filter(|entry| !unit.contains(entry));

    WorkflowDefinition {
        nodes,
        edges,
        entry_node_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::create_loop_cluster;
    use crate::node::WorkflowNode;

    fn chain() -> WorkflowDefinition {
        WorkflowDefinition::new()
            .with_node(WorkflowNode::start("start"))
            .with_node(WorkflowNode::agent("a", "agent-1"))
            .with_node(WorkflowNode::agent("b", "agent-2"))
            .with_edge("start", "a")
            .with_edge("a", "b")
            .with_entry("start")
    }

    #[test]
    fn test_interior_deletion_splices() {
        let result = delete_node(&chain(), "a");

        let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "b"]);
        assert_eq!(result.edges, vec![WorkflowEdge::new("start", "b")]);
    }

    #[test]
    fn test_no_edges_reference_deleted_node() {
        let result = delete_node(&chain(), "a");
        assert!(result
            .edges
            .iter()
            .all(|e| e.from_node != "a" && e.to_node != "a"));
    }

    #[test]
    fn test_boundary_deletion_adds_nothing() {
        let result = delete_node(&chain(), "b");
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.edges, vec![WorkflowEdge::new("start", "a")]);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let wf = chain();
        let result = delete_node(&wf, "missing");
        assert_eq!(result.nodes.len(), wf.nodes.len());
        assert_eq!(result.edges, wf.edges);
        assert_eq!(result.entry_node_id, wf.entry_node_id);
    }

    #[test]
    fn test_no_duplicate_edge_from_splice() {
        // start -> a -> b plus a pre-existing start -> b
        let wf = chain().with_edge("start", "b");
        let result = delete_node(&wf, "a");
        let matching = result
            .edges
            .iter()
            .filter(|e| e.from_node == "start" && e.to_node == "b")
            .count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn test_no_self_loop_from_splice() {
        // c is both predecessor and successor of a: c -> a -> c
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::agent("c", "agent-1"))
            .with_node(WorkflowNode::agent("a", "agent-2"))
            .with_edge("c", "a")
            .with_edge("a", "c");

        let result = delete_node(&wf, "a");
        assert!(result.edges.iter().all(|e| !e.is_self_loop()));
        assert!(result.edges.is_empty());
    }

    fn workflow_with_cluster() -> (WorkflowDefinition, crate::cluster::LoopCluster) {
        let created = create_loop_cluster(None);
        let cluster = created.cluster.clone();
        let wf = WorkflowDefinition::new()
            .with_node(WorkflowNode::start("start"))
            .with_node(created.loop_node)
            .with_node(created.body_node)
            .with_node(created.exit_node)
            .with_node(WorkflowNode::agent("after", "agent-1"))
            .with_edge("start", &cluster.loop_node_id)
            .with_edge(&cluster.loop_node_id, &cluster.body_node_id)
            .with_edge(&cluster.body_node_id, &cluster.loop_node_id)
            .with_edge(&cluster.loop_node_id, &cluster.exit_node_id)
            .with_edge(&cluster.exit_node_id, "after");
        (wf, cluster)
    }

    #[test]
    fn test_cluster_deleted_atomically_from_loop() {
        let (wf, cluster) = workflow_with_cluster();
        let result = delete_node(&wf, &cluster.loop_node_id);

        for id in cluster.ids() {
            assert!(!result.contains_node(id));
            assert!(result
                .edges
                .iter()
                .all(|e| e.from_node != id && e.to_node != id));
        }
        // flow continuity across the removed cluster
        assert!(result.has_edge("start", "after"));
        assert_eq!(result.nodes.len(), 2);
    }

    #[test]
    fn test_cluster_deleted_atomically_from_helper() {
        let (wf, cluster) = workflow_with_cluster();
        for target in [&cluster.body_node_id, &cluster.exit_node_id] {
            let result = delete_node(&wf, target);
            for id in cluster.ids() {
                assert!(!result.contains_node(id), "deleting '{}' left '{}'", target, id);
            }
            assert!(result.has_edge("start", "after"));
        }
    }

    #[test]
    fn test_internal_cluster_edges_not_rewired() {
        let (wf, cluster) = workflow_with_cluster();
        let result = delete_node(&wf, &cluster.loop_node_id);
        // exactly the spliced edge remains
        assert_eq!(result.edges, vec![WorkflowEdge::new("start", "after")]);
    }

    #[test]
    fn test_entry_cleared_when_deleted() {
        let result = delete_node(&chain(), "start");
        assert_eq!(result.entry_node_id, None);

        let result = delete_node(&chain(), "a");
        assert_eq!(result.entry_node_id.as_deref(), Some("start"));
    }
}
