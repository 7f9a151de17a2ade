//! Benchmarks for the delay arena's per-sample instruction path.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fxrack::dsp::engine::{reserve, FxEngine, Tap};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/engine");

    let lines = reserve([511, 511, 1023]);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();

        // A representative chain: write, two all-pass sections, one
        // interpolated tap.
        let mut engine = FxEngine::new(48_000.0, 4096);
        group.bench_with_input(BenchmarkId::new("allpass_chain", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    let mut ctx = engine.start();
                    ctx.load(black_box(sample));
                    ctx.read_line(lines[0], Tap::Tail, 0.625);
                    ctx.write_all_pass(lines[0], Tap::Head, -0.625);
                    ctx.read_line(lines[1], Tap::Tail, 0.625);
                    ctx.write_all_pass(lines[1], Tap::Head, -0.625);
                    ctx.write_line(lines[2], Tap::Head, 0.0);
                    ctx.interpolate(lines[2], 300.5, 1.0);
                    sum += ctx.take();
                }
                sum
            })
        });
    }

    group.finish();
}
