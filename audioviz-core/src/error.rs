//! Error Types
//!
//! Each concern gets its own error enum. Graph errors are construction-time
//! failures; capture and configuration errors belong to the collaborators
//! around the graph and never surface from `value()`.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while building a computation graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Establishing the inputs of `node` would make it depend on itself.
    #[error("cycle detected: node {node} ({name}) is reachable from its own inputs")]
    Cycle {
        /// The node whose input set was rejected.
        node: NodeId,
        /// Type name of the rejected node.
        name: &'static str,
    },

    /// A classification tag outside `Constant`, `Dynamic` and `Inherit`.
    #[error("unknown node classification: {0:?}")]
    UnknownClassification(String),

    /// A deferred node was bound a second time.
    #[error("deferred node {0} is already bound")]
    AlreadyBound(NodeId),
}

/// Errors raised by the audio capture path.
///
/// These are absorbed by the capture loop and only logged.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The PCM payload length is not a whole number of frames.
    #[error("malformed PCM payload: {len} bytes is not a multiple of {frame}")]
    Malformed {
        /// Payload length in bytes.
        len: usize,
        /// Expected frame width in bytes.
        frame: usize,
    },

    /// The capture device failed to deliver a period.
    #[error("capture read failed: {0}")]
    Read(String),
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for environment variable {var}")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value found in the environment.
        value: String,
    },

    /// A field holds a value outside its valid range.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
