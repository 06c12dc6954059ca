//! Graph Topology
//!
//! Traversals over the input relation: the cycle check that guards every
//! place where inputs are established, and a dependency-ordered listing of a
//! subgraph.
//!
//! # Cycle Check
//!
//! Inputs are fixed when a node is built, so every existing node already sits
//! in an acyclic graph. A new edge set can therefore only close a cycle that
//! runs through the candidate itself, and checking reachability of the
//! candidate from its own inputs is sufficient. A visited set keeps the walk
//! at O(V+E).

use std::collections::{HashMap, HashSet, VecDeque};

use super::node::{NodeId, NodeRef};
use crate::error::GraphError;
use crate::Result;

/// Reject `inputs` if `candidate` is reachable through them.
pub(crate) fn ensure_acyclic(
    candidate: NodeId,
    name: &'static str,
    inputs: &[NodeRef],
) -> Result<()> {
    let mut visited = HashSet::new();
    let mut stack: Vec<NodeRef> = inputs.to_vec();

    while let Some(node) = stack.pop() {
        if node.id() == candidate {
            tracing::debug!(node = %candidate, name, "rejected cyclic inputs");
            return Err(GraphError::Cycle {
                node: candidate,
                name,
            });
        }
        if !visited.insert(node.id()) {
            continue;
        }
        stack.extend(node.inputs().iter().cloned());
    }

    Ok(())
}

/// Every node reachable from `root`, including `root`, each exactly once.
pub fn subgraph(root: &NodeRef) -> Vec<NodeRef> {
    let mut visited = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id()) {
            continue;
        }
        // Reverse so inputs are visited in declaration order.
        stack.extend(node.inputs().iter().rev().cloned());
        result.push(node);
    }

    result
}

/// Every node reachable from `root` without passing through a node for
/// which `prune` holds, each exactly once. Pruned nodes are not included.
pub(crate) fn reachable(root: &NodeRef, prune: impl Fn(&NodeRef) -> bool) -> Vec<NodeRef> {
    let mut visited = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if prune(&node) || !visited.insert(node.id()) {
            continue;
        }
        stack.extend(node.inputs().iter().cloned());
        result.push(node);
    }

    result
}

/// The subgraph under `root`, sorted so inputs come before their dependents.
pub fn topological_order(root: &NodeRef) -> Vec<NodeRef> {
    let nodes = subgraph(root);
    let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
    let mut dependents: HashMap<NodeId, Vec<NodeRef>> = HashMap::new();
    let mut queue = VecDeque::new();

    // In-degree counts distinct inputs; a node may read the same input twice.
    for node in &nodes {
        let distinct: HashSet<NodeId> = node.inputs().iter().map(NodeRef::id).collect();
        let degree = distinct.len();
        for input in distinct {
            dependents.entry(input).or_default().push(node.clone());
        }
        in_degree.insert(node.id(), degree);
        if degree == 0 {
            queue.push_back(node.clone());
        }
    }

    // Kahn's algorithm
    let mut result = Vec::with_capacity(nodes.len());
    while let Some(node) = queue.pop_front() {
        if let Some(children) = dependents.get(&node.id()) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(&child.id()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(child.clone());
                    }
                }
            }
        }
        result.push(node);
    }

    result
}
