//! Pipeline Driver
//!
//! A [`Pipeline`] owns the sink nodes of one graph and turns it over once per
//! tick: every root is cleaned first, then every root is pulled. Because the
//! cleaning pass finishes before any value is computed, nodes shared between
//! roots recompute once per tick like any other fan-out.
//!
//! [`Pipeline::ring`] assembles the fading circular LED effect.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::capture::SampleSource;
use crate::config::PipelineConfig;
use crate::graph::{self, Node, NodeId, NodeTiming};
use crate::nodes::{
    exp2, multiply, AWeighting, AudioSource, Constant, Display, FftFrequencies, FftMagnitude,
    FoldMax, FrameSink, GaussianBlur, HammingWindow, HsvColors, Interpolate, Linspace, PeakHold,
    Time, VolumeNormalizer,
};
use crate::worker::Worker;
use crate::Result;

pub struct Pipeline {
    roots: Vec<Node<()>>,
    tick_rate: f64,
}

impl Pipeline {
    /// A pipeline over `roots`, ticking at the default rate when spawned.
    pub fn new(roots: Vec<Node<()>>) -> Self {
        Self {
            roots,
            tick_rate: PipelineConfig::default().tick_rate,
        }
    }

    /// Frames per second used by [`spawn`](Self::spawn).
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Build the ring effect reading from `source` and drawing to `sink`.
    ///
    /// The chain, per tick:
    ///
    /// 1. the newest `window_size` seconds of audio, Hamming windowed
    /// 2. FFT magnitude, interpolated at `2^(first_octave + k / num_leds)` Hz
    /// 3. squared and A-weighted, then volume normalized
    /// 4. blurred and folded down to one value per LED
    /// 5. held with a fading peak, colored, displayed
    pub fn ring(
        config: &PipelineConfig,
        source: Arc<dyn SampleSource>,
        sink: impl FrameSink + 'static,
    ) -> Result<Self> {
        let time = Time::node();
        let window = Constant::node(config.window_samples());
        let delta = Constant::node(config.sample_delta());

        let audio = AudioSource::node(source, &window)?;
        let windowed = multiply(&audio, &HammingWindow::node(&window)?)?;
        let spectrum = FftMagnitude::node(&windowed, &delta)?;
        let frequencies = FftFrequencies::node(&window, &delta)?;

        let leds = config.num_leds;
        let points = leds * config.number_octaves;
        let last_octave = config.first_octave + config.number_octaves as f64 - 1.0 / leds as f64;
        let octaves = Linspace::node(
            &Constant::node(config.first_octave),
            &Constant::node(last_octave),
            &Constant::node(points),
        )?;
        let pitches = exp2(&octaves)?;

        let amplitude = Interpolate::node(&pitches, &frequencies, &spectrum)?;
        let power = multiply(&amplitude, &amplitude)?;
        let weighted = multiply(&power, &AWeighting::node(&pitches)?)?;

        let normalized = VolumeNormalizer::node(
            &weighted,
            &time,
            config.volume_min_threshold,
            config.volume_falloff,
        )?;
        let blurred = GaussianBlur::node(&normalized, config.blur_sigma)?;
        let per_led = FoldMax::node(&blurred, &Constant::node(leds))?;
        let held = PeakHold::node(&per_led, &time, config.fade_falloff)?;

        let colors = HsvColors::node(&held, &time, config.color_rotation_period)?;
        let display = Display::node(&colors, sink)?;

        tracing::debug!(leds, points, window = config.window_samples(), "ring pipeline built");
        Ok(Self::new(vec![display]).with_tick_rate(config.tick_rate))
    }

    pub fn roots(&self) -> &[Node<()>] {
        &self.roots
    }

    /// Run one frame.
    pub fn tick(&self) {
        for root in &self.roots {
            root.clean();
        }
        for root in &self.roots {
            root.value();
        }
    }

    /// Turn compute timing on or off for every node in the graph.
    pub fn set_benchmark(&self, enabled: bool) {
        for root in &self.roots {
            root.set_benchmark(enabled);
        }
    }

    /// Timing for every node reachable from any root, each listed once.
    pub fn timings(&self) -> IndexMap<NodeId, NodeTiming> {
        let mut timings = IndexMap::new();
        for root in &self.roots {
            for (id, timing) in graph::report(root.erased()) {
                timings.entry(id).or_insert(timing);
            }
        }
        timings
    }

    pub fn log_timings(&self) {
        for (id, timing) in self.timings() {
            tracing::info!(
                node = %id,
                name = timing.name,
                invocations = timing.invocations,
                average_us = timing.average * 1e6,
                "compute timing"
            );
        }
    }

    /// Tick on a background thread at the pipeline's tick rate.
    ///
    /// A tick that overruns its slot starts the next one immediately.
    pub fn spawn(self) -> std::io::Result<Worker> {
        let tick_rate = self.tick_rate;
        let period = Duration::try_from_secs_f64(1.0 / tick_rate).unwrap_or(Duration::ZERO);
        tracing::info!(tick_rate, roots = self.roots.len(), "starting pipeline");

        Worker::spawn("pipeline", move || {
            let started = Instant::now();
            self.tick();
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
            ControlFlow::Continue(())
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("roots", &self.roots.len())
            .field("tick_rate", &self.tick_rate)
            .finish()
    }
}
