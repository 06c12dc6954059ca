//! Graph Nodes
//!
//! This module defines the node handles that make up a computation graph and
//! the [`Computation`] trait that concrete nodes implement.
//!
//! # Handles
//!
//! - [`Node<T>`] is a typed, cheaply clonable handle to a node producing `T`.
//! - [`NodeRef`] is the type-erased view of the same node. Input lists are
//!   made of `NodeRef`s, so nodes of different value types can be wired
//!   together.
//!
//! Both compare by identity: two handles are equal iff they point at the
//! same node, whatever their cached values.
//!
//! # Evaluation
//!
//! Every node caches its last value behind a dirty flag. `clean()` marks the
//! reachable non-constant subgraph stale; `value()` recomputes lazily on the
//! first pull after a clean and returns the cache on every later pull.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::benchmark::Benchmark;
use super::topology;
use crate::error::GraphError;
use crate::Result;

/// Unique identifier for a node in a computation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node participates in invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// The value can never change. `clean()` is a no-op.
    Constant,

    /// The value changes on every tick. Always recomputed after a clean.
    Dynamic,

    /// Constant iff every input is constant.
    #[default]
    Inherit,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constant => "constant",
            Self::Dynamic => "dynamic",
            Self::Inherit => "inherit",
        };
        f.write_str(name)
    }
}

impl FromStr for Classification {
    type Err = GraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(Self::Constant),
            "dynamic" => Ok(Self::Dynamic),
            "inherit" => Ok(Self::Inherit),
            _ => Err(GraphError::UnknownClassification(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Classification {
    type Error = GraphError;

    fn try_from(tag: u8) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Constant),
            1 => Ok(Self::Dynamic),
            2 => Ok(Self::Inherit),
            other => Err(GraphError::UnknownClassification(format!("tag {other}"))),
        }
    }
}

/// A unit of derivation inside a node.
///
/// Implementors hold typed handles to their inputs and read them with
/// [`Node::value`] from inside [`compute`](Computation::compute). The input
/// list reported by [`inputs`](Computation::inputs) is read exactly once, when
/// the node is constructed, and validated for cycles.
pub trait Computation: Send + 'static {
    /// The value this computation produces.
    type Output: Clone + Send + 'static;

    /// Derive the output from the current values of the inputs.
    fn compute(&mut self) -> Self::Output;

    /// The nodes this computation reads from, in declaration order.
    fn inputs(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn classification(&self) -> Classification {
        Classification::Inherit
    }

    /// Short display name used in logs, errors and timing reports.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Marker for computations without inputs.
///
/// Leaves are built with [`Node::leaf`], which cannot fail. Their
/// [`Computation::inputs`] is never consulted.
pub trait Leaf: Computation {}

/// Marker for computations that are a function of their inputs alone.
///
/// Only pure computations can be built with [`Node::new`]; anything with
/// memory across ticks goes through [`Node::stateful`] instead.
///
/// ```compile_fail
/// use audioviz_core::graph::{Computation, Node, Stateful};
///
/// struct Accumulator(f64);
///
/// impl Computation for Accumulator {
///     type Output = f64;
///
///     fn compute(&mut self) -> f64 {
///         self.0 += 1.0;
///         self.0
///     }
/// }
///
/// impl Stateful for Accumulator {}
///
/// // Not `Pure`, so it cannot be built as an ordinary node.
/// let node = Node::new(Accumulator(0.0));
/// ```
pub trait Pure: Computation {}

/// Marker for computations whose `compute` mutates memory that survives
/// `clean()`.
///
/// Stateful nodes are not pure functions of their inputs: evaluating them twice
/// per tick, out of order, or in parallel changes the result. They must be
/// built with [`Node::stateful`] so the fact is recorded on the node.
pub trait Stateful: Computation {}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Type-erased node behaviour shared by every node implementation.
pub(crate) trait Vertex: Send + Sync {
    fn id(&self) -> NodeId;
    fn name(&self) -> &'static str;
    fn classification(&self) -> Classification;
    fn inputs(&self) -> &[NodeRef];
    fn is_stateful(&self) -> bool;

    /// Fixed when the node is built: inputs and classifications never change.
    fn is_constant(&self) -> bool;
    fn is_dirty(&self) -> bool;

    /// Mark this node alone as stale.
    fn invalidate(&self);

    /// Swap this node's timer, without touching inputs.
    fn enable_benchmark(&self, enabled: bool);

    /// Compute invocations and average seconds per invocation.
    fn timing(&self) -> (u64, f64);
}

/// Typed evaluation entry point.
pub(crate) trait Evaluate<T>: Send + Sync {
    fn value(&self) -> T;
}

struct CellState<C: Computation> {
    computation: C,
    cached: Option<C::Output>,
    dirty: bool,
    benchmark: Benchmark,
}

/// The standard node implementation: a computation plus its cache.
struct NodeCell<C: Computation> {
    id: NodeId,
    name: &'static str,
    classification: Classification,
    stateful: bool,
    constant: bool,
    inputs: SmallVec<[NodeRef; 4]>,
    state: Mutex<CellState<C>>,
}

impl<C: Computation> Vertex for NodeCell<C> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn classification(&self) -> Classification {
        self.classification
    }

    fn inputs(&self) -> &[NodeRef] {
        &self.inputs
    }

    fn is_stateful(&self) -> bool {
        self.stateful
    }

    fn is_constant(&self) -> bool {
        self.constant
    }

    fn is_dirty(&self) -> bool {
        let state = self.state.lock();
        state.dirty || state.cached.is_none()
    }

    fn invalidate(&self) {
        self.state.lock().dirty = true;
    }

    fn enable_benchmark(&self, enabled: bool) {
        self.state.lock().benchmark = if enabled {
            Benchmark::enabled()
        } else {
            Benchmark::Off
        };
    }

    fn timing(&self) -> (u64, f64) {
        let state = self.state.lock();
        (state.benchmark.invocations(), state.benchmark.average())
    }
}

impl<C: Computation> Evaluate<C::Output> for NodeCell<C> {
    fn value(&self) -> C::Output {
        let mut state = self.state.lock();
        if !state.dirty {
            if let Some(value) = &state.cached {
                return value.clone();
            }
        }

        tracing::trace!(node = %self.id, name = self.name, "compute");
        let started = state.benchmark.start();
        let value = state.computation.compute();
        state.benchmark.stop(started);

        state.cached = Some(value.clone());
        state.dirty = false;
        value
    }
}

/// Type-erased handle to a node.
#[derive(Clone)]
pub struct NodeRef {
    inner: Arc<dyn Vertex>,
}

impl NodeRef {
    pub fn id(&self) -> NodeId {
        self.inner.id()
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn classification(&self) -> Classification {
        self.inner.classification()
    }

    /// The fixed, declared dependency list.
    pub fn inputs(&self) -> &[NodeRef] {
        self.inner.inputs()
    }

    /// Whether the node keeps memory outside its cache.
    pub fn is_stateful(&self) -> bool {
        self.inner.is_stateful()
    }

    /// Whether the next `value()` on this node will recompute.
    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    /// Whether this node's value can ever change.
    pub fn is_constant(&self) -> bool {
        self.inner.is_constant()
    }

    /// Mark this node and its non-constant inputs as needing recomputation.
    ///
    /// Constant subtrees are left alone, so they are computed on first pull
    /// and cached for the lifetime of the graph. Each stale node is marked
    /// once, however many paths lead to it.
    pub fn clean(&self) {
        for node in topology::reachable(self, NodeRef::is_constant) {
            node.inner.invalidate();
        }
    }

    /// Enable or disable compute timing on this node and every input.
    ///
    /// Enabling resets any previous measurements.
    pub fn set_benchmark(&self, enabled: bool) {
        for node in topology::subgraph(self) {
            node.inner.enable_benchmark(enabled);
        }
    }

    /// Mean seconds per compute since timing was enabled.
    ///
    /// `+inf` when timing is off or the node has not computed yet.
    pub fn average_compute_time(&self) -> f64 {
        self.inner.timing().1
    }

    /// Number of computes since timing was enabled.
    pub fn compute_count(&self) -> u64 {
        self.inner.timing().0
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for NodeRef {}

impl std::hash::Hash for NodeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("classification", &self.classification())
            .field("input_count", &self.inputs().len())
            .finish()
    }
}

/// Typed handle to a node producing `T`.
///
/// # Example
///
/// ```rust
/// use audioviz_core::nodes::{add, Constant};
///
/// let two = Constant::node(2.0);
/// let three = Constant::node(3.0);
/// let sum = add(&two, &three).unwrap();
///
/// assert!(sum.is_constant());
/// assert_eq!(sum.value(), 5.0);
/// ```
pub struct Node<T> {
    eval: Arc<dyn Evaluate<T>>,
    vertex: NodeRef,
}

impl<T: Clone + Send + 'static> Node<T> {
    /// Build a node from a pure computation.
    ///
    /// Fails with [`GraphError::Cycle`] if the declared inputs would make the
    /// node depend on itself.
    pub fn new<C>(computation: C) -> Result<Self>
    where
        C: Pure<Output = T>,
    {
        Self::build(computation, false)
    }

    /// Build a node whose computation keeps memory across ticks.
    pub fn stateful<C>(computation: C) -> Result<Self>
    where
        C: Stateful<Output = T>,
    {
        Self::build(computation, true)
    }

    /// Build a node without inputs.
    pub fn leaf<C>(computation: C) -> Self
    where
        C: Leaf<Output = T>,
    {
        let id = NodeId::new();
        Self::from_cell(Self::cell(id, computation, SmallVec::new(), false))
    }

    fn build<C>(computation: C, stateful: bool) -> Result<Self>
    where
        C: Computation<Output = T>,
    {
        let id = NodeId::new();
        let inputs: SmallVec<[NodeRef; 4]> = computation.inputs().into_iter().collect();
        topology::ensure_acyclic(id, computation.name(), &inputs)?;
        Ok(Self::from_cell(Self::cell(id, computation, inputs, stateful)))
    }

    fn cell<C>(
        id: NodeId,
        computation: C,
        inputs: SmallVec<[NodeRef; 4]>,
        stateful: bool,
    ) -> NodeCell<C>
    where
        C: Computation<Output = T>,
    {
        let name = computation.name();
        let classification = computation.classification();
        let constant = match classification {
            Classification::Constant => true,
            Classification::Dynamic => false,
            Classification::Inherit => inputs.iter().all(NodeRef::is_constant),
        };
        tracing::debug!(
            node = %id,
            name,
            %classification,
            inputs = inputs.len(),
            stateful,
            "node created"
        );
        NodeCell {
            id,
            name,
            classification,
            stateful,
            constant,
            inputs,
            state: Mutex::new(CellState {
                computation,
                cached: None,
                dirty: true,
                benchmark: Benchmark::Off,
            }),
        }
    }

    fn from_cell<V>(cell: V) -> Self
    where
        V: Vertex + Evaluate<T> + 'static,
    {
        Self::from_shared(Arc::new(cell))
    }

    pub(crate) fn from_shared<V>(cell: Arc<V>) -> Self
    where
        V: Vertex + Evaluate<T> + 'static,
    {
        let vertex: Arc<dyn Vertex> = cell.clone();
        Self {
            eval: cell,
            vertex: NodeRef { inner: vertex },
        }
    }
}

impl<T> Node<T> {
    /// Get the current value, recomputing if the node is dirty.
    ///
    /// Pulling a dirty node may recursively pull its inputs. Repeated pulls
    /// within one clean cycle return the cache.
    pub fn value(&self) -> T {
        self.eval.value()
    }

    /// The type-erased view of this node.
    pub fn erased(&self) -> &NodeRef {
        &self.vertex
    }

    pub fn id(&self) -> NodeId {
        self.vertex.id()
    }

    pub fn name(&self) -> &'static str {
        self.vertex.name()
    }

    pub fn inputs(&self) -> &[NodeRef] {
        self.vertex.inputs()
    }

    pub fn is_constant(&self) -> bool {
        self.vertex.is_constant()
    }

    pub fn is_stateful(&self) -> bool {
        self.vertex.is_stateful()
    }

    pub fn is_dirty(&self) -> bool {
        self.vertex.is_dirty()
    }

    /// See [`NodeRef::clean`].
    pub fn clean(&self) {
        self.vertex.clean();
    }

    /// See [`NodeRef::set_benchmark`].
    pub fn set_benchmark(&self, enabled: bool) {
        self.vertex.set_benchmark(enabled);
    }

    pub fn average_compute_time(&self) -> f64 {
        self.vertex.average_compute_time()
    }

    pub fn compute_count(&self) -> u64 {
        self.vertex.compute_count()
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Arc::clone(&self.eval),
            vertex: self.vertex.clone(),
        }
    }
}

impl<T> From<Node<T>> for NodeRef {
    fn from(node: Node<T>) -> Self {
        node.vertex
    }
}

impl<T> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex
    }
}

impl<T> Eq for Node<T> {}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("classification", &self.vertex.classification())
            .field("dirty", &self.is_dirty())
            .field("stateful", &self.is_stateful())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter {
        calls: Arc<AtomicUsize>,
        class: Classification,
    }

    impl Computation for Counter {
        type Output = usize;

        fn compute(&mut self) -> usize {
            self.calls.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn classification(&self) -> Classification {
            self.class
        }
    }

    impl Leaf for Counter {}

    struct Pair {
        left: Node<usize>,
        right: Node<usize>,
    }

    impl Computation for Pair {
        type Output = usize;

        fn compute(&mut self) -> usize {
            self.left.value() + self.right.value()
        }

        fn inputs(&self) -> Vec<NodeRef> {
            vec![self.left.erased().clone(), self.right.erased().clone()]
        }
    }

    impl Pure for Pair {}

    struct Tally {
        input: Node<usize>,
        total: usize,
    }

    impl Computation for Tally {
        type Output = usize;

        fn compute(&mut self) -> usize {
            self.total += self.input.value();
            self.total
        }

        fn inputs(&self) -> Vec<NodeRef> {
            vec![self.input.erased().clone()]
        }
    }

    impl Stateful for Tally {}

    fn counter(class: Classification) -> (Node<usize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let node = Node::leaf(Counter {
            calls: calls.clone(),
            class,
        });
        (node, calls)
    }

    #[test]
    fn node_ids_are_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn new_node_starts_dirty() {
        let (node, calls) = counter(Classification::Dynamic);
        assert!(node.is_dirty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(node.value(), 1);
        assert!(!node.is_dirty());
    }

    #[test]
    fn value_is_cached_until_clean() {
        let (node, calls) = counter(Classification::Dynamic);

        assert_eq!(node.value(), 1);
        assert_eq!(node.value(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        node.clean();
        assert!(node.is_dirty());
        assert_eq!(node.value(), 2);
        assert_eq!(node.value(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn constant_nodes_ignore_clean() {
        let (node, calls) = counter(Classification::Constant);

        assert_eq!(node.value(), 1);
        node.clean();
        assert!(!node.is_dirty());
        assert_eq!(node.value(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn inherit_follows_inputs() {
        let (fixed, _) = counter(Classification::Constant);
        let (moving, _) = counter(Classification::Dynamic);

        let both_fixed = Node::new(Pair {
            left: fixed.clone(),
            right: fixed.clone(),
        })
        .unwrap();
        let mixed = Node::new(Pair {
            left: fixed,
            right: moving,
        })
        .unwrap();

        assert!(both_fixed.is_constant());
        assert!(!mixed.is_constant());
    }

    #[test]
    fn shared_input_computes_once_per_clean() {
        let (shared, calls) = counter(Classification::Dynamic);
        let pair = Node::new(Pair {
            left: shared.clone(),
            right: shared.clone(),
        })
        .unwrap();

        assert_eq!(pair.value(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        pair.clean();
        assert_eq!(pair.value(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn inputs_keep_declaration_order() {
        let (a, _) = counter(Classification::Dynamic);
        let (b, _) = counter(Classification::Dynamic);
        let pair = Node::new(Pair {
            left: a.clone(),
            right: b.clone(),
        })
        .unwrap();

        let ids: Vec<_> = pair.inputs().iter().map(NodeRef::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn handles_compare_by_identity() {
        let (a, _) = counter(Classification::Constant);
        let (b, _) = counter(Classification::Constant);
        assert_eq!(a.value(), b.value());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn classification_parses_known_tags() {
        assert_eq!("Dynamic".parse::<Classification>(), Ok(Classification::Dynamic));
        assert_eq!(Classification::try_from(0), Ok(Classification::Constant));
        assert!(matches!(
            "sometimes".parse::<Classification>(),
            Err(GraphError::UnknownClassification(_))
        ));
        assert!(matches!(
            Classification::try_from(9),
            Err(GraphError::UnknownClassification(_))
        ));
    }

    #[test]
    fn stateful_constructor_records_the_marker() {
        let (source, _) = counter(Classification::Dynamic);
        let pure = Node::new(Pair {
            left: source.clone(),
            right: source.clone(),
        })
        .unwrap();
        let tally = Node::stateful(Tally {
            input: source,
            total: 0,
        })
        .unwrap();

        assert!(!pure.is_stateful());
        assert!(tally.is_stateful());
        assert_eq!(tally.value(), 1);
        tally.clean();
        assert_eq!(tally.value(), 3);
    }

    #[test]
    fn deep_shared_chain_cleans_each_node_once() {
        use crate::nodes::{add, Source};
        use std::time::{Duration, Instant};

        let source = Source::node(|| 1.0);
        let mut top = source.clone();
        for _ in 0..64 {
            top = add(&top, &top).unwrap();
        }
        top.set_benchmark(true);

        let started = Instant::now();
        for _ in 0..3 {
            top.clean();
            assert_eq!(top.value(), 2f64.powi(64));
        }
        assert!(started.elapsed() < Duration::from_secs(1));

        let nodes = topology::subgraph(top.erased());
        assert_eq!(nodes.len(), 65);
        assert!(nodes.iter().all(|node| node.compute_count() == 3));
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name::<Counter>(), "Counter");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
