//! Low-level DSP primitives used by the effect processors.
//!
//! These components are allocation-free and realtime-safe after
//! construction: every buffer is sized once, and the per-sample paths touch
//! no heap, locks, or I/O. They stay focused on the signal math so the
//! `fx` processors and the mixing console can layer routing and lifecycle
//! handling on top.

/// Plain circular delay storage for effects that own their memory.
pub mod delay;
/// Delay-line memory arena and the per-sample instruction context.
pub mod engine;
/// Topology-preserving state-variable filter.
pub mod filter;
/// Randomized-phase sine used for tape flutter.
pub mod jitter;
/// Modulation oscillators (phase accumulator and resonator families).
pub mod lfo;
/// Semitone-to-ratio conversion tables.
pub mod pitch;
