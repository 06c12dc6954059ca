//! Compute Timing
//!
//! Each node carries a timer that is off by default. When enabled, every
//! compute invocation is timed and folded into a running total, so the
//! average is available without keeping individual samples.

use std::time::{Duration, Instant};

use indexmap::IndexMap;

use super::node::{NodeId, NodeRef};
use super::topology;

/// Per-node compute timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Benchmark {
    #[default]
    Off,
    On {
        total: Duration,
        invocations: u64,
    },
}

impl Benchmark {
    pub(crate) fn enabled() -> Self {
        Self::On {
            total: Duration::ZERO,
            invocations: 0,
        }
    }

    pub(crate) fn start(&self) -> Option<Instant> {
        match self {
            Self::Off => None,
            Self::On { .. } => Some(Instant::now()),
        }
    }

    pub(crate) fn stop(&mut self, started: Option<Instant>) {
        if let (Self::On { total, invocations }, Some(started)) = (self, started) {
            *total += started.elapsed();
            *invocations += 1;
        }
    }

    pub(crate) fn invocations(&self) -> u64 {
        match self {
            Self::Off => 0,
            Self::On { invocations, .. } => *invocations,
        }
    }

    /// Mean seconds per invocation, `+inf` if nothing was measured.
    pub(crate) fn average(&self) -> f64 {
        match self {
            Self::On { total, invocations } if *invocations > 0 => {
                total.as_secs_f64() / *invocations as f64
            }
            _ => f64::INFINITY,
        }
    }
}

/// Timing summary for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTiming {
    pub name: &'static str,
    pub invocations: u64,
    /// Mean seconds per compute, `+inf` if never computed.
    pub average: f64,
}

/// Collect timings for every node reachable from `root`.
///
/// Entries are ordered dependencies first, each node appearing once even
/// when it is shared.
pub fn report(root: &NodeRef) -> IndexMap<NodeId, NodeTiming> {
    topology::topological_order(root)
        .into_iter()
        .map(|node| {
            let timing = NodeTiming {
                name: node.name(),
                invocations: node.compute_count(),
                average: node.average_compute_time(),
            };
            (node.id(), timing)
        })
        .collect()
}

/// Emit the timing report for `root` at info level.
pub fn log_report(root: &NodeRef) {
    for (id, timing) in report(root) {
        tracing::info!(
            node = %id,
            name = timing.name,
            invocations = timing.invocations,
            average_us = timing.average * 1e6,
            "compute timing"
        );
    }
}
