//! Nodes with memory that survives `clean()`.
//!
//! Both nodes here read the shared clock to measure elapsed time between
//! computes, and decay their memory by `1 / falloff^dt`.

use crate::array::Array;
use crate::graph::{Computation, Node, NodeRef, Stateful};
use crate::Result;

/// Scales a signal by a slowly decaying loudness threshold.
///
/// The threshold jumps up to any louder peak immediately and otherwise
/// sinks towards the current peak. Below `min_threshold` the node outputs
/// silence.
pub struct VolumeNormalizer {
    signal: Node<Array>,
    time: Node<f64>,
    min_threshold: f64,
    falloff: f64,
    threshold: f64,
    last_call: Option<f64>,
}

impl VolumeNormalizer {
    pub fn node(
        signal: &Node<Array>,
        time: &Node<f64>,
        min_threshold: f64,
        falloff: f64,
    ) -> Result<Node<Array>> {
        Node::stateful(Self {
            signal: signal.clone(),
            time: time.clone(),
            min_threshold,
            falloff,
            threshold: min_threshold,
            last_call: None,
        })
    }
}

impl Computation for VolumeNormalizer {
    type Output = Array;

    fn compute(&mut self) -> Array {
        let signal = self.signal.value();
        let now = self.time.value();
        let elapsed = self.last_call.map_or(0.0, |last| now - last);
        self.last_call = Some(now);

        let peak = signal.peak();
        if peak >= self.threshold {
            self.threshold = peak;
        } else {
            let factor = 1.0 / self.falloff.powf(elapsed);
            self.threshold = self.threshold * factor + peak * (1.0 - factor);
        }
        tracing::debug!(threshold = self.threshold, peak, "volume threshold");

        if self.threshold >= self.min_threshold {
            let threshold = self.threshold;
            signal.map(|x| x / threshold)
        } else {
            Array::zeros(signal.len())
        }
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.signal.erased().clone(), self.time.erased().clone()]
    }
}

impl Stateful for VolumeNormalizer {}

/// Per-element maximum that fades by `1 / falloff^dt`.
///
/// Memory is dropped after a gap of two seconds or more, and whenever the
/// input length changes.
pub struct PeakHold {
    signal: Node<Array>,
    time: Node<f64>,
    falloff: f64,
    held: Vec<f64>,
    last_call: Option<f64>,
}

impl PeakHold {
    const MAX_GAP: f64 = 2.0;

    pub fn node(signal: &Node<Array>, time: &Node<f64>, falloff: f64) -> Result<Node<Array>> {
        Node::stateful(Self {
            signal: signal.clone(),
            time: time.clone(),
            falloff,
            held: Vec::new(),
            last_call: None,
        })
    }
}

impl Computation for PeakHold {
    type Output = Array;

    fn compute(&mut self) -> Array {
        let signal = self.signal.value();
        let now = self.time.value();
        let factor = match self.last_call {
            Some(last) if now - last < Self::MAX_GAP => 1.0 / self.falloff.powf(now - last),
            _ => 0.0,
        };
        self.last_call = Some(now);

        if self.held.len() != signal.len() {
            self.held = vec![0.0; signal.len()];
        }
        for (held, &new) in self.held.iter_mut().zip(signal.iter()) {
            *held = (*held * factor).max(new);
        }
        Array::from(self.held.as_slice())
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.signal.erased().clone(), self.time.erased().clone()]
    }
}

impl Stateful for PeakHold {}
