//! Benchmarks for one tick of the ring pipeline
//!
//! Run with: cargo bench --package audioviz-core

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use audioviz_core::capture::SineSource;
use audioviz_core::kernels::{gaussian_filter, RealFft};
use audioviz_core::{Pipeline, PipelineConfig, Rgb};

fn bench_ring_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ring Tick");

    for &leds in &[24, 60, 144] {
        let config = PipelineConfig {
            num_leds: leds,
            ..PipelineConfig::default()
        };
        let source = Arc::new(SineSource::new(440.0, 0.3, config.sample_rate));
        let pipeline = Pipeline::ring(&config, source, |frame: &[Rgb]| {
            black_box(frame);
        })
        .unwrap();

        group.bench_with_input(BenchmarkId::new("tick", leds), &pipeline, |b, pipeline| {
            b.iter(|| pipeline.tick());
        });
    }

    group.finish();
}

fn bench_kernels(c: &mut Criterion) {
    let signal: Vec<f64> = (0..2205).map(|i| (i as f64 * 0.05).sin()).collect();

    c.bench_function("rfft magnitude 2205", |b| {
        let mut fft = RealFft::new();
        b.iter(|| fft.magnitude(black_box(&signal), 1.0 / 22050.0));
    });

    c.bench_function("gaussian filter 480", |b| {
        b.iter(|| gaussian_filter(black_box(&signal[..480]), 2.0));
    });
}

criterion_group!(benches, bench_ring_tick, bench_kernels);
criterion_main!(benches);
