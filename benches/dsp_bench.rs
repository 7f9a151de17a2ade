//! Benchmarks for the effect primitives and the full console graph.
//!
//! Run with: cargo bench
//!
//! Everything here has a hard realtime deadline in production: one block
//! must be finished in blockSize / sampleRate seconds, every time.
//!
//! Reference deadlines at 48kHz:
//!   - 64 samples  = 1.33ms
//!   - 128 samples = 2.67ms
//!   - 256 samples = 5.33ms
//!   - 512 samples = 10.67ms
//!
//! Benchmark groups:
//!   - dsp/*        Individual primitives (engine, filter, reverb)
//!   - scenarios/*  The routed console processing whole blocks

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_engine,
    dsp::bench_filter,
    dsp::bench_reverb,
    scenarios::bench_console,
);
criterion_main!(benches);
