//! Audioviz Core
//!
//! This crate provides the runtime behind an audio-reactive LED ring.
//! It implements:
//!
//! - An incremental computation graph with cached, classified nodes
//! - A library of numeric, spectral, stateful and sink nodes
//! - The capture side: a bounded sample buffer fed by a worker thread
//! - The ring effect pipeline and the driver that ticks it
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: nodes, classification, cycle checks and timing
//! - `array`: the shared numeric array type flowing between nodes
//! - `kernels`: pure numeric functions the nodes are built on
//! - `nodes`: the concrete node library
//! - `capture`: sample buffer, PCM decoding and the capture loop
//! - `worker`: a generic repeat-until-stopped thread
//! - `pipeline`: the assembled ring effect and its tick driver
//! - `config`: pipeline parameters with defaults
//!
//! # Example
//!
//! ```rust
//! use audioviz_core::nodes::{add, multiply, Constant, Source};
//!
//! let mut t = 0.0;
//! let clock = Source::node(move || {
//!     t += 1.0;
//!     t
//! });
//! let scaled = multiply(&clock, &Constant::node(2.0)).unwrap();
//! let shifted = add(&scaled, &Constant::node(1.0)).unwrap();
//!
//! assert_eq!(shifted.value(), 3.0);
//!
//! // One tick: invalidate, then pull.
//! shifted.clean();
//! assert_eq!(shifted.value(), 5.0);
//! ```

pub mod array;
pub mod capture;
pub mod config;
pub mod error;
pub mod graph;
pub mod kernels;
pub mod nodes;
pub mod pipeline;
pub mod worker;

pub use array::{Array, Frame, Rgb};
pub use config::PipelineConfig;
pub use error::{CaptureError, ConfigError, GraphError};
pub use graph::{Classification, Computation, Node, NodeId, NodeRef};
pub use pipeline::Pipeline;

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;
