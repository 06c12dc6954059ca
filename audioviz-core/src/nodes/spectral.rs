//! Windowing, FFT and frequency-weighting nodes.

use crate::array::Array;
use crate::graph::{Computation, Node, NodeRef, Pure};
use crate::kernels::{self, RealFft};
use crate::Result;

/// Hamming window of `count` samples.
pub struct HammingWindow {
    count: Node<usize>,
}

impl HammingWindow {
    pub fn node(count: &Node<usize>) -> Result<Node<Array>> {
        Node::new(Self {
            count: count.clone(),
        })
    }
}

impl Computation for HammingWindow {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::hamming(self.count.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.count.erased().clone()]
    }
}

impl Pure for HammingWindow {}

/// `|rfft(signal) * sample_delta|` over the non-negative frequency bins.
pub struct FftMagnitude {
    signal: Node<Array>,
    sample_delta: Node<f64>,
    fft: RealFft,
}

impl FftMagnitude {
    pub fn node(signal: &Node<Array>, sample_delta: &Node<f64>) -> Result<Node<Array>> {
        Node::new(Self {
            signal: signal.clone(),
            sample_delta: sample_delta.clone(),
            fft: RealFft::new(),
        })
    }
}

impl Computation for FftMagnitude {
    type Output = Array;

    fn compute(&mut self) -> Array {
        let signal = self.signal.value();
        self.fft.magnitude(&signal, self.sample_delta.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.signal.erased().clone(), self.sample_delta.erased().clone()]
    }

    fn name(&self) -> &'static str {
        "FFT"
    }
}

impl Pure for FftMagnitude {}

/// Bin center frequencies matching [`FftMagnitude`] for `count` samples.
pub struct FftFrequencies {
    count: Node<usize>,
    sample_delta: Node<f64>,
}

impl FftFrequencies {
    pub fn node(count: &Node<usize>, sample_delta: &Node<f64>) -> Result<Node<Array>> {
        Node::new(Self {
            count: count.clone(),
            sample_delta: sample_delta.clone(),
        })
    }
}

impl Computation for FftFrequencies {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::rfft_frequencies(self.count.value(), self.sample_delta.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.count.erased().clone(), self.sample_delta.erased().clone()]
    }
}

impl Pure for FftFrequencies {}

/// A-weighting gain for each frequency on the axis.
pub struct AWeighting {
    frequencies: Node<Array>,
}

impl AWeighting {
    pub fn node(frequencies: &Node<Array>) -> Result<Node<Array>> {
        Node::new(Self {
            frequencies: frequencies.clone(),
        })
    }
}

impl Computation for AWeighting {
    type Output = Array;

    fn compute(&mut self) -> Array {
        self.frequencies.value().map(kernels::a_weighting)
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.frequencies.erased().clone()]
    }
}

impl Pure for AWeighting {}

pub struct GaussianBlur {
    input: Node<Array>,
    sigma: f64,
}

impl GaussianBlur {
    pub fn node(input: &Node<Array>, sigma: f64) -> Result<Node<Array>> {
        Node::new(Self {
            input: input.clone(),
            sigma,
        })
    }
}

impl Computation for GaussianBlur {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::gaussian_filter(&self.input.value(), self.sigma).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone()]
    }
}

impl Pure for GaussianBlur {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Constant, Source};

    #[test]
    fn window_and_frequencies_are_constant_for_constant_inputs() {
        let count = Constant::node(8);
        let delta = Constant::node(0.125);
        let window = HammingWindow::node(&count).unwrap();
        let freqs = FftFrequencies::node(&count, &delta).unwrap();

        assert!(window.is_constant());
        assert!(freqs.is_constant());
        assert_eq!(window.value().len(), 8);
        assert_eq!(freqs.value(), Array::from([0.0, 1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn fft_scales_by_sample_delta() {
        let signal = Source::node(|| Array::from([1.0; 4]));
        let spectrum = FftMagnitude::node(&signal, &Constant::node(0.5)).unwrap();

        let value = spectrum.value();
        assert_eq!(value.len(), 3);
        assert!((value[0] - 2.0).abs() < 1e-9);
        assert!(!spectrum.is_constant());
        assert_eq!(spectrum.name(), "FFT");
    }

    #[test]
    fn a_weighting_node_maps_each_frequency() {
        let freqs = Constant::node(Array::from([0.0, 1000.0]));
        let gains = AWeighting::node(&freqs).unwrap().value();
        assert_eq!(gains[0], 0.0);
        assert!((gains[1] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn gaussian_blur_keeps_length() {
        let input = Constant::node(Array::from([0.0, 0.0, 1.0, 0.0, 0.0]));
        let blurred = GaussianBlur::node(&input, 1.0).unwrap().value();
        assert_eq!(blurred.len(), 5);
        assert!(blurred[2] < 1.0 && blurred[1] > 0.0);
    }
}
