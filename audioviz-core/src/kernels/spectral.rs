//! Spectral kernels: windows, real FFT magnitude and frequency weighting.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Hamming window of `len` samples.
pub fn hamming(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Real-input FFT magnitude with a cached plan.
///
/// The plan is rebuilt only when the signal length changes.
#[derive(Default)]
pub struct RealFft {
    plan: Option<Arc<dyn Fft<f64>>>,
}

impl RealFft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Magnitudes of the non-negative frequency bins, scaled.
    ///
    /// Returns `len / 2 + 1` bins for a signal of `len` samples.
    pub fn magnitude(&mut self, signal: &[f64], scale: f64) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }

        let fft = match &self.plan {
            Some(plan) if plan.len() == signal.len() => Arc::clone(plan),
            _ => {
                let plan = FftPlanner::<f64>::new().plan_fft_forward(signal.len());
                self.plan = Some(Arc::clone(&plan));
                plan
            }
        };

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        let bins = signal.len() / 2 + 1;
        buffer[..bins]
            .iter()
            .map(|c| c.norm() * scale.abs())
            .collect()
    }
}

/// Center frequencies of the bins produced by [`RealFft::magnitude`].
pub fn rfft_frequencies(len: usize, sample_delta: f64) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    let step = 1.0 / (len as f64 * sample_delta);
    (0..=len / 2).map(|k| k as f64 * step).collect()
}

/// A-weighting as a linear amplitude gain, 1.0 at 1 kHz.
pub fn a_weighting(frequency: f64) -> f64 {
    const F1: f64 = 20.598_997;
    const F2: f64 = 107.652_65;
    const F3: f64 = 737.862_23;
    const F4: f64 = 12_194.217;
    // +2.00 dB normalizes the curve at 1 kHz.
    const OFFSET: f64 = 1.258_925_4;

    let f2 = frequency * frequency;
    let numerator = F4 * F4 * f2 * f2;
    let denominator =
        (f2 + F1 * F1) * ((f2 + F2 * F2) * (f2 + F3 * F3)).sqrt() * (f2 + F4 * F4);
    numerator / denominator * OFFSET
}
