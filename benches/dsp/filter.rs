//! Benchmarks for the state-variable filter, per approximation mode.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fxrack::dsp::filter::{FilterMode, FrequencyApprox, SvFilter};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.11).sin()).collect();

        for (label, approx) in [
            ("accurate", FrequencyApprox::Accurate),
            ("fast", FrequencyApprox::Fast),
            ("dirty", FrequencyApprox::Dirty),
        ] {
            let mut filter = SvFilter::new(48_000.0, FilterMode::LowPass, 2_000.0);
            filter.set_approximation(approx);
            group.bench_with_input(
                BenchmarkId::new(format!("lowpass_{label}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for (i, &sample) in input.iter().enumerate() {
                            // Retune every sample, the way the tone controls do.
                            filter.set_cutoff(1_000.0 + (i % 64) as f32 * 10.0);
                            let (l, _) = filter.process_sample(black_box(sample), 0.0);
                            sum += l;
                        }
                        sum
                    })
                },
            );
        }
    }

    group.finish();
}
