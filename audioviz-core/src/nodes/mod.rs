//! Node Library
//!
//! Concrete computations built on the graph protocol. Every node type has a
//! `node(..)` constructor returning a [`Node`](crate::graph::Node) handle;
//! constructors with inputs run the cycle check and return a `Result`.
//!
//! All nodes inherit their classification from their inputs unless noted.
//! Sources and sinks are dynamic, constants are constant. The stateful
//! nodes ([`VolumeNormalizer`], [`PeakHold`]) keep memory across ticks and
//! are marked as such on the node.

mod arith;
mod output;
mod shape;
mod source;
mod spectral;
mod stateful;

pub use arith::{
    add, divide, exp2, log2, multiply, subtract, Binary, BinaryOp, Linspace, Unary, UnaryOp,
};
pub use output::{Display, FrameSink, HsvColors, Monitor};
pub use shape::{FoldMax, Interpolate, Mirror, Resample, Roll, Slice};
pub use source::{AudioSource, Constant, Source, Time};
pub use spectral::{AWeighting, FftFrequencies, FftMagnitude, GaussianBlur, HammingWindow};
pub use stateful::{PeakHold, VolumeNormalizer};
