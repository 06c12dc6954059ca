//! Deferred Nodes
//!
//! A deferred node is a forward reference: it is created without a target so
//! downstream nodes can be wired to it, and bound exactly once afterwards.
//! Binding establishes the node's single input and runs the cycle check, so
//! it is the only way a would-be cycle can be expressed at all.

use std::sync::{Arc, OnceLock};

use super::node::{Classification, Evaluate, Node, NodeId, NodeRef, Vertex};
use super::topology;
use crate::error::GraphError;
use crate::Result;

struct Binding<T> {
    target: Node<T>,
    edge: [NodeRef; 1],
}

struct DeferredCell<T> {
    id: NodeId,
    binding: OnceLock<Binding<T>>,
}

impl<T: Send + 'static> Vertex for DeferredCell<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &'static str {
        "Deferred"
    }

    // Never constant: the target is unknown until bound.
    fn classification(&self) -> Classification {
        Classification::Dynamic
    }

    fn inputs(&self) -> &[NodeRef] {
        match self.binding.get() {
            Some(binding) => &binding.edge,
            None => &[],
        }
    }

    fn is_stateful(&self) -> bool {
        false
    }

    fn is_constant(&self) -> bool {
        false
    }

    fn is_dirty(&self) -> bool {
        self.binding
            .get()
            .map_or(true, |binding| binding.target.is_dirty())
    }

    // The target owns the cache; nothing to invalidate here.
    fn invalidate(&self) {}

    fn enable_benchmark(&self, _enabled: bool) {}

    fn timing(&self) -> (u64, f64) {
        (0, f64::INFINITY)
    }
}

impl<T: Clone + Default + Send + 'static> Evaluate<T> for DeferredCell<T> {
    fn value(&self) -> T {
        match self.binding.get() {
            Some(binding) => binding.target.value(),
            None => {
                tracing::warn!(node = %self.id, "evaluated unbound deferred node");
                T::default()
            }
        }
    }
}

/// A forward reference to a node that is wired up later.
///
/// ```rust
/// use audioviz_core::graph::Deferred;
/// use audioviz_core::nodes::{add, Constant};
///
/// let feedback = Deferred::<f64>::new();
/// let one = Constant::node(1.0);
/// let sum = add(&feedback.node(), &one).unwrap();
///
/// // `sum` already reads from `feedback`, so closing the loop is rejected.
/// assert!(feedback.bind(&sum).is_err());
/// ```
pub struct Deferred<T> {
    cell: Arc<DeferredCell<T>>,
    node: Node<T>,
}

impl<T: Clone + Default + Send + 'static> Deferred<T> {
    pub fn new() -> Self {
        let cell = Arc::new(DeferredCell {
            id: NodeId::new(),
            binding: OnceLock::new(),
        });
        let node = Node::from_shared(cell.clone());
        Self { cell, node }
    }

    /// The handle downstream nodes read from.
    pub fn node(&self) -> Node<T> {
        self.node.clone()
    }

    pub fn is_bound(&self) -> bool {
        self.cell.binding.get().is_some()
    }

    /// Point this node at `target`.
    ///
    /// Fails with [`GraphError::Cycle`] if `target` already reads from this
    /// node, and with [`GraphError::AlreadyBound`] on a second binding. A
    /// failed binding leaves the node unbound.
    pub fn bind(&self, target: &Node<T>) -> Result<()> {
        if self.is_bound() {
            return Err(GraphError::AlreadyBound(self.cell.id));
        }
        let edge = [target.erased().clone()];
        topology::ensure_acyclic(self.cell.id, "Deferred", &edge)?;
        self.cell
            .binding
            .set(Binding {
                target: target.clone(),
                edge,
            })
            .map_err(|_| GraphError::AlreadyBound(self.cell.id))?;
        tracing::debug!(node = %self.cell.id, target = %target.id(), "deferred node bound");
        Ok(())
    }
}

impl<T: Clone + Default + Send + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{add, multiply, Constant, Source};

    #[test]
    fn bound_deferred_forwards_target_value() {
        let deferred = Deferred::<f64>::new();
        let doubled = add(&deferred.node(), &deferred.node()).unwrap();

        deferred.bind(&Constant::node(4.0)).unwrap();

        assert!(deferred.is_bound());
        assert!(!doubled.is_constant());
        assert_eq!(doubled.value(), 8.0);
    }

    #[test]
    fn unbound_deferred_yields_default() {
        let deferred = Deferred::<f64>::new();
        assert_eq!(deferred.node().value(), 0.0);
    }

    #[test]
    fn value_read_before_binding_is_refreshed_by_clean() {
        let deferred = Deferred::<f64>::new();
        let sum = add(&deferred.node(), &Constant::node(1.0)).unwrap();
        assert_eq!(sum.value(), 1.0);

        deferred.bind(&Constant::node(4.0)).unwrap();
        sum.clean();
        assert_eq!(sum.value(), 5.0);
    }

    #[test]
    fn direct_self_binding_is_a_cycle() {
        let deferred = Deferred::<f64>::new();
        let err = deferred.bind(&deferred.node()).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
        assert!(!deferred.is_bound());
    }

    #[test]
    fn transitive_cycle_is_rejected() {
        let deferred = Deferred::<f64>::new();
        let two = Constant::node(2.0);
        let scaled = multiply(&deferred.node(), &two).unwrap();
        let shifted = add(&scaled, &two).unwrap();

        let err = deferred.bind(&shifted).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                node: deferred.node().id(),
                name: "Deferred"
            }
        );
    }

    #[test]
    fn second_binding_is_rejected() {
        let deferred = Deferred::<f64>::new();
        deferred.bind(&Constant::node(1.0)).unwrap();
        let err = deferred.bind(&Constant::node(2.0)).unwrap_err();
        assert!(matches!(err, GraphError::AlreadyBound(_)));
    }

    #[test]
    fn clean_reaches_through_binding() {
        let mut ticks = 0.0;
        let source = Source::node(move || {
            ticks += 1.0;
            ticks
        });
        let deferred = Deferred::<f64>::new();
        let sum = add(&deferred.node(), &Constant::node(10.0)).unwrap();
        deferred.bind(&source).unwrap();

        assert_eq!(sum.value(), 11.0);
        sum.clean();
        assert_eq!(sum.value(), 12.0);
    }
}
