//! Stereo effect processors built on the `dsp` primitives.
//!
//! Every processor implements [`StereoEffect`]: a per-sample stereo
//! transform plus a `reset` that returns it to exact silence. Effects own
//! all of their state (filter memories, LFO phases, a private delay arena
//! where they need one) and allocate it at construction; processing a
//! sample is allocation-free.
//!
//! The [`unit`] wrappers add enable/wet and mute lifecycles uniformly over
//! any processor without it knowing.

/// Engine-based dual-tap chorus.
pub mod chorus;
/// All-pass decorrelator used ahead of reverberation.
pub mod diffuser;
/// Identity processor occupying the console's main bus.
pub mod dry;
/// Short modulated delay with in-loop feedback.
pub mod flanger;
/// Three-tap ensemble with layered slow/fast modulation.
pub mod orbitone;
/// Swept all-pass chain with feedback.
pub mod phaser;
/// Dual-tap granular pitch shifter.
pub mod pitch_shifter;
/// Griesinger-topology reverberator.
pub mod reverberator;
/// Pitch-shifted reverb chain.
pub mod shimmer;
/// Tape-style stereo delay with tone and flutter.
pub mod tape_delay;
/// Drive-normalized tanh saturator.
pub mod tube;
/// Enable/wet and mute lifecycle wrappers.
pub mod unit;

pub use unit::{BusUnit, FxUnit};

/// Capability shared by every effect processor.
pub trait StereoEffect: Send {
    /// Return the processor to exact silence: all persistent state zeroed,
    /// not merely flushed.
    fn reset(&mut self);

    /// Process one stereo sample pair.
    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32);
}

/// Substitute silence for a non-finite feedback value.
///
/// Effects with feedback loops run this over the value they carry to the
/// next sample so numeric degeneracy decays instead of propagating.
#[inline]
pub(crate) fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
