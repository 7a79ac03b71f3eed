//! Loop Cluster Manager - The atomic {loop, loop_body, loop_exit} triple
//!
//! One bounded-iteration construct is represented by three nodes that are
//! always created and deleted together. Companion ids are derived from the
//! loop id, so the three are co-locatable without a cross-reference table.

use uuid::Uuid;

use crate::node::{NodeType, WorkflowNode};

/// Default iteration bound for freshly created loops
pub const DEFAULT_MAX_ITERS: u64 = 3;

/// Derived view of one complete loop cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopCluster {
    /// Id of the `loop` node
    pub loop_node_id: String,
    /// Id of the `loop_body` helper
    pub body_node_id: String,
    /// Id of the `loop_exit` helper
    pub exit_node_id: String,
}

impl LoopCluster {
    /// Whether the given id names any of the three cluster nodes
    pub fn contains(&self, node_id: &str) -> bool {
        self.loop_node_id == node_id
            || self.body_node_id == node_id
            || self.exit_node_id == node_id
    }

    /// All three node ids
    pub fn ids(&self) -> [&str; 3] {
        [&self.loop_node_id, &self.body_node_id, &self.exit_node_id]
    }
}

/// The three freshly created nodes of a cluster, plus the derived view
#[derive(Debug, Clone)]
pub struct LoopClusterNodes {
    pub loop_node: WorkflowNode,
    pub body_node: WorkflowNode,
    pub exit_node: WorkflowNode,
    pub cluster: LoopCluster,
}

/// Create a fresh loop cluster.
///
/// Allocates a new loop id and derives the companion ids `<loop_id>_body`
/// and `<loop_id>_exit`; both helpers carry `linkedLoopId` back to the loop.
/// Helper positions are offset from `base_position` when one is given.
pub fn create_loop_cluster(base_position: Option<(f32, f32)>) -> LoopClusterNodes {
    let loop_id = format!("loop_{}", &Uuid::new_v4().simple().to_string()[..8]);
    let body_id = format!("{}_body", loop_id);
    let exit_id = format!("{}_exit", loop_id);

    let mut loop_node = WorkflowNode::new(&loop_id, NodeType::Loop);
    loop_node.max_iters = Some(DEFAULT_MAX_ITERS);

    let mut body_node = WorkflowNode::new(&body_id, NodeType::LoopBody);
    body_node.linked_loop_id = Some(loop_id.clone());

    let mut exit_node = WorkflowNode::new(&exit_id, NodeType::LoopExit);
    exit_node.linked_loop_id = Some(loop_id.clone());

    if let Some((x, y)) = base_position {
        loop_node.position = Some((x, y));
        body_node.position = Some((x, y + 120.0));
        exit_node.position = Some((x + 200.0, y));
    }

    let cluster = LoopCluster {
        loop_node_id: loop_id,
        body_node_id: body_id,
        exit_node_id: exit_id,
    };

    LoopClusterNodes {
        loop_node,
        body_node,
        exit_node,
        cluster,
    }
}

/// Scan nodes for every complete loop cluster.
///
/// Pairs each `loop` node with the `loop_body` and `loop_exit` helpers whose
/// `linkedLoopId` matches it. A loop lacking either helper is silently
/// excluded (not yet a cluster); strict reporting of such inconsistencies is
/// the validator's job, not this scan's.
pub fn find_loop_clusters(nodes: &[WorkflowNode]) -> Vec<LoopCluster> {
    let mut clusters = Vec::new();

    for node in nodes {
        if node.node_type != NodeType::Loop {
            continue;
        }

        let body = nodes.iter().find(|n| {
            n.node_type == NodeType::LoopBody && n.linked_loop_id.as_deref() == Some(&node.id)
        });
        let exit = nodes.iter().find(|n| {
            n.node_type == NodeType::LoopExit && n.linked_loop_id.as_deref() == Some(&node.id)
        });

        if let (Some(body), Some(exit)) = (body, exit) {
            clusters.push(LoopCluster {
                loop_node_id: node.id.clone(),
                body_node_id: body.id.clone(),
                exit_node_id: exit.id.clone(),
            });
        }
    }

    clusters
}
