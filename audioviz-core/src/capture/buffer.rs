//! Bounded sample history.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::SampleSource;

const MS_IN_SECOND: u64 = 1000;

/// A fixed-capacity ring of the most recently captured samples.
///
/// The buffer starts out, and resets to, full of silence, so snapshots are
/// always `min(count, capacity)` long.
pub struct CaptureBuffer {
    samples: Mutex<VecDeque<f64>>,
    capacity: usize,
    sample_rate: u32,
}

impl CaptureBuffer {
    /// A buffer holding `history_ms` milliseconds of audio.
    pub fn new(sample_rate: u32, history_ms: u64) -> Self {
        let capacity = (history_ms * u64::from(sample_rate) / MS_IN_SECOND) as usize;
        Self::with_capacity(sample_rate, capacity)
    }

    pub fn with_capacity(sample_rate: u32, capacity: usize) -> Self {
        Self {
            samples: Mutex::new(silence(capacity)),
            capacity,
            sample_rate,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds between consecutive samples.
    pub fn sample_delta(&self) -> f64 {
        1.0 / f64::from(self.sample_rate)
    }

    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        (seconds * f64::from(self.sample_rate)) as usize
    }

    /// Append samples, evicting the oldest ones beyond capacity.
    pub fn extend(&self, new: &[f64]) {
        if self.capacity == 0 {
            return;
        }
        let new = &new[new.len().saturating_sub(self.capacity)..];

        let mut samples = self.samples.lock();
        let len = samples.len();
        let overflow = (len + new.len()).saturating_sub(self.capacity);
        samples.drain(..overflow.min(len));
        samples.extend(new.iter().copied());
    }

    /// Drop all history and refill with silence.
    pub fn reset(&self) {
        *self.samples.lock() = silence(self.capacity);
    }
}

impl SampleSource for CaptureBuffer {
    fn get_samples(&self, count: usize) -> Vec<f64> {
        let samples = self.samples.lock();
        samples.iter().rev().take(count).copied().collect()
    }
}

fn silence(len: usize) -> VecDeque<f64> {
    std::iter::repeat(0.0).take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_silent() {
        let buffer = CaptureBuffer::with_capacity(8000, 4);
        assert_eq!(buffer.get_samples(3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn capacity_follows_history_length() {
        let buffer = CaptureBuffer::new(22050, 1000);
        assert_eq!(buffer.capacity(), 22050);
        assert_eq!(buffer.seconds_to_samples(0.1), 2205);
    }

    #[test]
    fn samples_come_back_newest_first() {
        let buffer = CaptureBuffer::with_capacity(8000, 4);
        buffer.extend(&[1.0, 2.0, 3.0]);
        assert_eq!(buffer.get_samples(4), vec![3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn oldest_samples_are_evicted() {
        let buffer = CaptureBuffer::with_capacity(8000, 3);
        buffer.extend(&[1.0, 2.0]);
        buffer.extend(&[3.0, 4.0]);
        assert_eq!(buffer.get_samples(10), vec![4.0, 3.0, 2.0]);

        buffer.extend(&[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(buffer.get_samples(10), vec![8.0, 7.0, 6.0]);
    }

    #[test]
    fn reset_restores_silence() {
        let buffer = CaptureBuffer::with_capacity(8000, 2);
        buffer.extend(&[0.5, 0.7]);
        buffer.reset();
        assert_eq!(buffer.get_samples(2), vec![0.0, 0.0]);
    }

    #[test]
    fn zero_capacity_buffer_stays_empty() {
        let buffer = CaptureBuffer::with_capacity(8000, 0);
        buffer.extend(&[1.0]);
        assert!(buffer.get_samples(1).is_empty());
    }
}
