//! Color mapping, observation and display sinks.

use crate::array::{Array, Frame, Rgb};
use crate::graph::{Classification, Computation, Node, NodeRef, Pure};
use crate::kernels;
use crate::Result;

/// Maps intensities to colors on a hue that rotates with time.
pub struct HsvColors {
    values: Node<Array>,
    time: Node<f64>,
    period: f64,
}

impl HsvColors {
    /// `period` is the time in seconds for the hue to travel the full circle.
    pub fn node(values: &Node<Array>, time: &Node<f64>, period: f64) -> Result<Node<Frame>> {
        Node::new(Self {
            values: values.clone(),
            time: time.clone(),
            period,
        })
    }

    fn hue(&self, time: f64) -> f64 {
        if self.period > 0.0 && time.is_finite() {
            time.rem_euclid(self.period) / self.period
        } else {
            0.0
        }
    }
}

impl Computation for HsvColors {
    type Output = Frame;

    fn compute(&mut self) -> Frame {
        let hue = self.hue(self.time.value());
        kernels::mask_non_finite(&self.values.value())
            .into_iter()
            .map(|v| kernels::ring_color(v, hue))
            .collect()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.values.erased().clone(), self.time.erased().clone()]
    }
}

impl Pure for HsvColors {}

/// The display contract: receives one frame per tick.
pub trait FrameSink: Send {
    fn show_frame(&mut self, frame: &[Rgb]);
}

impl<F> FrameSink for F
where
    F: FnMut(&[Rgb]) + Send,
{
    fn show_frame(&mut self, frame: &[Rgb]) {
        self(frame)
    }
}

/// Sink node pushing each frame to a [`FrameSink`].
///
/// Channels are masked and clamped into `[0, 1]` on the way out.
pub struct Display {
    frame: Node<Frame>,
    sink: Box<dyn FrameSink>,
}

impl Display {
    pub fn node(frame: &Node<Frame>, sink: impl FrameSink + 'static) -> Result<Node<()>> {
        Node::new(Self {
            frame: frame.clone(),
            sink: Box::new(sink),
        })
    }
}

impl Computation for Display {
    type Output = ();

    fn compute(&mut self) {
        let frame: Vec<Rgb> = self.frame.value().iter().map(|c| c.sanitized()).collect();
        self.sink.show_frame(&frame);
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.frame.erased().clone()]
    }

    fn classification(&self) -> Classification {
        Classification::Dynamic
    }
}

impl Pure for Display {}

/// Pass-through that shows every computed value to an observer.
pub struct Monitor<T> {
    input: Node<T>,
    observer: Box<dyn FnMut(&T) + Send>,
}

impl<T: Clone + Send + 'static> Monitor<T> {
    pub fn node<F>(input: &Node<T>, observer: F) -> Result<Node<T>>
    where
        F: FnMut(&T) + Send + 'static,
    {
        Node::new(Self {
            input: input.clone(),
            observer: Box::new(observer),
        })
    }
}

impl<T: Clone + Send + 'static> Computation for Monitor<T> {
    type Output = T;

    fn compute(&mut self) -> T {
        let value = self.input.value();
        (self.observer)(&value);
        value
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone()]
    }
}

impl<T: Clone + Send + 'static> Pure for Monitor<T> {}
