//! Leaf nodes: constants, closures, the wall clock and captured audio.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::array::Array;
use crate::capture::SampleSource;
use crate::graph::{Classification, Computation, Leaf, Node, NodeRef, Pure};

/// A fixed value.
pub struct Constant<T> {
    value: T,
}

impl<T: Clone + Send + 'static> Constant<T> {
    pub fn node(value: T) -> Node<T> {
        Node::leaf(Self { value })
    }
}

impl<T: Clone + Send + 'static> Computation for Constant<T> {
    type Output = T;

    fn compute(&mut self) -> T {
        self.value.clone()
    }

    fn classification(&self) -> Classification {
        Classification::Constant
    }
}

impl<T: Clone + Send + 'static> Leaf for Constant<T> {}

/// A value produced by an external, mutable collaborator.
///
/// Dynamic unless built with an explicit classification.
pub struct Source<T> {
    produce: Box<dyn FnMut() -> T + Send>,
    classification: Classification,
}

impl<T: Clone + Send + 'static> Source<T> {
    pub fn node<F>(produce: F) -> Node<T>
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self::with_classification(produce, Classification::Dynamic)
    }

    pub fn with_classification<F>(produce: F, classification: Classification) -> Node<T>
    where
        F: FnMut() -> T + Send + 'static,
    {
        Node::leaf(Self {
            produce: Box::new(produce),
            classification,
        })
    }
}

impl<T: Clone + Send + 'static> Computation for Source<T> {
    type Output = T;

    fn compute(&mut self) -> T {
        (self.produce)()
    }

    fn classification(&self) -> Classification {
        self.classification
    }
}

impl<T: Clone + Send + 'static> Leaf for Source<T> {}

/// Seconds since the Unix epoch.
pub struct Time;

impl Time {
    pub fn node() -> Node<f64> {
        Node::leaf(Self)
    }
}

impl Computation for Time {
    type Output = f64;

    fn compute(&mut self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn classification(&self) -> Classification {
        Classification::Dynamic
    }
}

impl Leaf for Time {}

/// The most recent `samples` values from a capture source, newest first.
///
/// One snapshot is taken per compute, so a tick sees the audio available
/// when the node was pulled.
pub struct AudioSource {
    capture: Arc<dyn SampleSource>,
    samples: Node<usize>,
}

impl AudioSource {
    pub fn node(
        capture: Arc<dyn SampleSource>,
        samples: &Node<usize>,
    ) -> crate::Result<Node<Array>> {
        Node::new(Self {
            capture,
            samples: samples.clone(),
        })
    }
}

impl Computation for AudioSource {
    type Output = Array;

    fn compute(&mut self) -> Array {
        Array::from(self.capture.get_samples(self.samples.value()))
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.samples.erased().clone()]
    }

    fn classification(&self) -> Classification {
        Classification::Dynamic
    }
}

impl Pure for AudioSource {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureBuffer;

    #[test]
    fn constant_survives_any_number_of_ticks() {
        let five = Constant::node(5);
        for _ in 0..3 {
            five.clean();
            assert_eq!(five.value(), 5);
            assert_eq!(five.value(), 5);
        }
        assert!(five.is_constant());
    }

    #[test]
    fn source_recomputes_after_clean() {
        let mut calls = 0;
        let source = Source::node(move || {
            calls += 1;
            calls
        });

        assert!(!source.is_constant());
        assert_eq!(source.value(), 1);
        assert_eq!(source.value(), 1);
        source.clean();
        assert_eq!(source.value(), 2);
    }

    #[test]
    fn source_classification_can_be_overridden() {
        let fixed = Source::with_classification(|| 1.0, Classification::Constant);
        assert!(fixed.is_constant());
    }

    #[test]
    fn time_is_dynamic_and_positive() {
        let now = Time::node();
        assert!(!now.is_constant());
        assert!(now.value() > 0.0);
    }

    #[test]
    fn audio_source_snapshots_capture_buffer() {
        let buffer = Arc::new(CaptureBuffer::with_capacity(8000, 4));
        let audio = AudioSource::node(buffer.clone(), &Constant::node(2)).unwrap();

        buffer.extend(&[0.1, 0.2]);
        assert_eq!(audio.value(), Array::from([0.2, 0.1]));

        buffer.extend(&[0.3]);
        assert_eq!(audio.value(), Array::from([0.2, 0.1]));

        audio.clean();
        assert_eq!(audio.value(), Array::from([0.3, 0.2]));
    }
}
