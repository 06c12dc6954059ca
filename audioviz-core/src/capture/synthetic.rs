//! A synthetic tone for running the pipeline without a capture device.

use std::f64::consts::TAU;

use parking_lot::Mutex;

use super::SampleSource;

/// A sine wave whose phase advances by the number of samples read.
pub struct SineSource {
    frequency: f64,
    amplitude: f64,
    sample_rate: u32,
    position: Mutex<u64>,
}

impl SineSource {
    pub fn new(frequency: f64, amplitude: f64, sample_rate: u32) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            position: Mutex::new(0),
        }
    }
}

impl SampleSource for SineSource {
    fn get_samples(&self, count: usize) -> Vec<f64> {
        let mut position = self.position.lock();
        let start = *position;
        *position += count as u64;

        let step = TAU * self.frequency / f64::from(self.sample_rate);
        (start..start + count as u64)
            .rev()
            .map(|n| self.amplitude * (step * n as f64).sin())
            .collect()
    }
}
