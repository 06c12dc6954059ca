//! Audio Capture
//!
//! The producer side of the pipeline. A capture worker reads PCM periods
//! from a device, decodes them and appends them to a bounded buffer; the
//! graph's audio source node snapshots the most recent samples once per
//! tick.
//!
//! # Contract
//!
//! A [`SampleSource`] returns the most recent samples first. Reads are short
//! lock-protected copies. There is no backpressure: when the producer runs
//! ahead, old samples are evicted; when the consumer runs ahead, it reads
//! the same samples again.
//!
//! Malformed or failed reads never reach the graph. The capture loop resets
//! the buffer to silence and carries on.

mod buffer;
mod reader;
mod synthetic;

pub use buffer::CaptureBuffer;
pub use reader::{decode_s32le, CaptureLoop, PcmReader};
pub use synthetic::SineSource;

/// A snapshot provider for recent audio samples.
pub trait SampleSource: Send + Sync {
    /// Up to `count` of the most recent samples, newest first.
    fn get_samples(&self, count: usize) -> Vec<f64>;
}
