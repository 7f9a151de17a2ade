//! Benchmarks for the reverberator, the heaviest single effect.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fxrack::fx::reverberator::Reverberator;
use fxrack::fx::StereoEffect;

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        let mut short = Reverberator::new(48_000.0);
        short.set_time(0.3);
        group.bench_with_input(BenchmarkId::new("short_tail", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    let (l, r) = short.process_sample(black_box(sample), black_box(sample));
                    sum += l + r;
                }
                sum
            })
        });

        let mut long = Reverberator::new(48_000.0);
        long.set_time(0.95);
        long.set_diffusion(0.8);
        group.bench_with_input(BenchmarkId::new("long_tail", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    let (l, r) = long.process_sample(black_box(sample), black_box(sample));
                    sum += l + r;
                }
                sum
            })
        });
    }

    group.finish();
}
