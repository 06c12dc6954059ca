//! Computation Graph
//!
//! This module implements the incremental computation graph that every
//! derived value in the pipeline is expressed in.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are computations that cache their last result
//! - Edges point from a node to the inputs it reads from
//!
//! Evaluation is pull-based. A driver calls `clean()` on a root once per
//! tick, which marks every reachable non-constant node stale, then calls
//! `value()`, which recomputes exactly the stale nodes in dependency order,
//! each at most once.
//!
//! # Design Decisions
//!
//! 1. Inputs are an explicit list handed over when a node is built, never
//!    discovered later. The list is immutable afterwards.
//!
//! 2. The cycle check runs once, at the moment a node's inputs are
//!    established. There is no way to attach inputs without it.
//!
//! 3. Nodes are classified as constant, dynamic or inherit. Constant
//!    subtrees are computed on first pull and never invalidated.
//!
//! 4. Compute timing is opt-in per subgraph and costs nothing when off.

mod benchmark;
mod deferred;
mod node;
mod topology;

pub use benchmark::{log_report, report, NodeTiming};
pub use deferred::Deferred;
pub use node::{Classification, Computation, Leaf, Node, NodeId, NodeRef, Pure, Stateful};
pub use topology::{subgraph, topological_order};
