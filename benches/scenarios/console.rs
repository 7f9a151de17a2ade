//! Whole-graph benchmark: the console with a realistic routing, processing
//! full blocks for 8 inputs.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fxrack::console::{BusId, MixingConsole};

use crate::BLOCK_SIZES;

fn routed_console(block_size: usize) -> MixingConsole {
    let mut console = MixingConsole::new(48_000.0, block_size, 8);
    for input in 0..8 {
        console.set_channel_level(input, 0.8);
        console.set_pan(input, input as f32 / 7.0);
        console.set_send_level(input, BusId::Main, 0.8);
        console.set_send_level(input, BusId::Reverb, 0.3);
        console.set_send_level(input, BusId::Delay, 0.2);
    }
    console.set_send_level(0, BusId::Chorus, 0.5);
    console.set_send_level(1, BusId::Phaser, 0.5);
    console.set_return_level(BusId::Chorus, BusId::Main, 0.6);
    console.set_return_level(BusId::Phaser, BusId::Main, 0.6);
    console.set_return_level(BusId::Delay, BusId::Main, 0.5);
    console.set_return_level(BusId::Delay, BusId::Reverb, 0.3);
    console.set_return_level(BusId::Reverb, BusId::Main, 0.7);
    console
}

pub fn bench_console(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/console");

    for &size in BLOCK_SIZES {
        let inputs: Vec<Vec<f32>> = (0..8)
            .map(|ch| {
                (0..size)
                    .map(|i| ((i * (ch + 2)) as f32 * 0.013).sin() * 0.5)
                    .collect()
            })
            .collect();

        let mut console = routed_console(size);
        let mut out_l = vec![0.0; size];
        let mut out_r = vec![0.0; size];

        group.bench_with_input(BenchmarkId::new("eight_inputs", size), &size, |b, _| {
            b.iter(|| {
                for (input, block) in inputs.iter().enumerate() {
                    console.set_input_buffer(input, black_box(block));
                }
                console.process(&mut out_l, &mut out_r);
                out_l[0] + out_r[0]
            })
        });
    }

    group.finish();
}
