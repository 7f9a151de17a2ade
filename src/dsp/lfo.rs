use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Modulation Oscillators
======================

Two families, both bounded to [-1, 1] and both restartable to a known
state:

Lfo (phase accumulator)
    General-purpose shape generator. Sine, saw, square, plus two random
    shapes: SampleHold draws a new value only when the phase wraps,
    Noise draws every sample. Frequency can be set in Hz or normalized
    (0..1 mapped linearly between the oscillator's fixed min/max range),
    which is how effect "rate" knobs address it.

ResonatorSine (2-pole recurrence)
    y[n] = 2 cos(w) y[n-1] - y[n-2] costs one multiply and one add per
    sample and produces a pure sine. The recurrence state runs in f64:
    at LFO rates the coefficient is within 1e-9 of 2.0, which single
    precision cannot even represent. The recurrence still accumulates a
    small amplitude error over time, so the state is re-derived exactly
    from the tracked phase at a fixed interval. The delay engine uses a
    pair of these for its built-in modulators, where one is ticked per
    line per sample and cost matters.

Randomness comes from an inline 32-bit LCG seeded with a constant, so
`reset()` restarts the random shapes deterministically too.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    SampleHold,
    Noise,
}

const LFO_SEED: u32 = 0x02F6_E2B1;

#[inline]
fn lcg_next(state: &mut u32) -> f32 {
    *state = state.wrapping_mul(1103515245).wrapping_add(12345);
    ((*state >> 16) as f32 / 32768.0) - 1.0
}

/// Phase-accumulator modulation oscillator.
pub struct Lfo {
    sample_rate: f32,
    min_frequency: f32,
    max_frequency: f32,
    initial_phase: f32,
    waveform: Waveform,
    normalized_frequency: f32,
    frequency: f32,
    phase: f32,
    phase_increment: f32,
    current: f32,
    new_phase: bool,
    rng: u32,
}

impl Lfo {
    pub fn new(sample_rate: f32, waveform: Waveform, min_frequency: f32, max_frequency: f32) -> Self {
        Self::with_phase(sample_rate, waveform, min_frequency, max_frequency, 0.0)
    }

    /// Start the oscillator at a fixed phase offset (radians). Quadrature
    /// and three-phase LFO banks are built this way.
    pub fn with_phase(
        sample_rate: f32,
        waveform: Waveform,
        min_frequency: f32,
        max_frequency: f32,
        initial_phase: f32,
    ) -> Self {
        let mut lfo = Self {
            sample_rate,
            min_frequency,
            max_frequency,
            initial_phase,
            waveform,
            normalized_frequency: -1.0,
            frequency: -1.0,
            phase: initial_phase,
            phase_increment: 0.0,
            current: 0.0,
            new_phase: true,
            rng: LFO_SEED,
        };
        lfo.set_frequency(min_frequency);
        lfo
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Frequency as 0..1 over the oscillator's fixed [min, max] Hz range.
    pub fn set_normalized_frequency(&mut self, normalized: f32) {
        let normalized = normalized.clamp(0.0, 1.0);
        if self.normalized_frequency != normalized {
            self.normalized_frequency = normalized;
            self.frequency =
                self.min_frequency + (self.max_frequency - self.min_frequency) * normalized;
            self.phase_increment = TAU * self.frequency / self.sample_rate;
        }
    }

    pub fn normalized_frequency(&self) -> f32 {
        self.normalized_frequency
    }

    pub fn set_frequency(&mut self, hz: f32) {
        let hz = hz.clamp(self.min_frequency, self.max_frequency);
        if self.frequency != hz {
            self.frequency = hz;
            self.normalized_frequency = if self.max_frequency > self.min_frequency {
                (hz - self.min_frequency) / (self.max_frequency - self.min_frequency)
            } else {
                0.0
            };
            self.phase_increment = TAU * self.frequency / self.sample_rate;
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Deterministic restart from the configured initial phase.
    pub fn reset(&mut self) {
        self.phase = self.initial_phase;
        self.new_phase = true;
        self.current = 0.0;
        self.rng = LFO_SEED;
    }

    pub fn process(&mut self) -> f32 {
        let out = match self.waveform {
            Waveform::Sine => self.phase.sin(),
            Waveform::Saw => self.phase / PI - 1.0,
            Waveform::Square => {
                if self.phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::SampleHold => {
                if self.new_phase {
                    lcg_next(&mut self.rng)
                } else {
                    self.current
                }
            }
            Waveform::Noise => lcg_next(&mut self.rng),
        };
        self.current = out;

        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
            self.new_phase = true;
        } else {
            self.new_phase = false;
        }

        out
    }

    /// Last produced sample, without advancing.
    pub fn current(&self) -> f32 {
        self.current
    }
}

/// How many samples the resonator runs before its state is re-derived
/// from the tracked phase.
const RESYNC_INTERVAL: u32 = 8192;

/// Constant-amplitude sine from the two-pole resonator recurrence.
pub struct ResonatorSine {
    sample_rate: f32,
    min_frequency: f32,
    max_frequency: f32,
    initial_phase: f64,
    frequency: f32,
    coefficient: f64,
    y0: f64,
    y1: f64,
    phase: f64,
    phase_increment: f64,
    samples_until_resync: u32,
}

impl ResonatorSine {
    pub fn new(sample_rate: f32, min_frequency: f32, max_frequency: f32) -> Self {
        Self::with_phase(sample_rate, min_frequency, max_frequency, 0.0)
    }

    pub fn with_phase(
        sample_rate: f32,
        min_frequency: f32,
        max_frequency: f32,
        initial_phase: f32,
    ) -> Self {
        let mut osc = Self {
            sample_rate,
            min_frequency,
            max_frequency,
            initial_phase: initial_phase as f64,
            frequency: -1.0,
            coefficient: 2.0,
            y0: 0.0,
            y1: 0.0,
            phase: initial_phase as f64,
            phase_increment: 0.0,
            samples_until_resync: RESYNC_INTERVAL,
        };
        osc.set_frequency(min_frequency);
        osc
    }

    pub fn set_frequency(&mut self, hz: f32) {
        let hz = hz.clamp(self.min_frequency, self.max_frequency);
        if self.frequency != hz {
            self.frequency = hz;
            self.phase_increment = std::f64::consts::TAU * hz as f64 / self.sample_rate as f64;
            self.coefficient = 2.0 * self.phase_increment.cos();
            self.resync();
        }
    }

    /// Frequency as 0..1 over the oscillator's fixed [min, max] Hz range.
    pub fn set_normalized_frequency(&mut self, normalized: f32) {
        let normalized = normalized.clamp(0.0, 1.0);
        self.set_frequency(
            self.min_frequency + (self.max_frequency - self.min_frequency) * normalized,
        );
    }

    pub fn normalized_frequency(&self) -> f32 {
        if self.max_frequency > self.min_frequency {
            (self.frequency - self.min_frequency) / (self.max_frequency - self.min_frequency)
        } else {
            0.0
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn reset(&mut self) {
        self.phase = self.initial_phase;
        self.resync();
    }

    fn resync(&mut self) {
        self.y0 = (self.phase - self.phase_increment).sin();
        self.y1 = (self.phase - 2.0 * self.phase_increment).sin();
        self.samples_until_resync = RESYNC_INTERVAL;
    }

    pub fn process(&mut self) -> f32 {
        let y = self.coefficient * self.y0 - self.y1;
        self.y1 = self.y0;
        self.y0 = y;

        self.phase += self.phase_increment;
        if self.phase >= std::f64::consts::TAU {
            self.phase -= std::f64::consts::TAU;
        }
        self.samples_until_resync -= 1;
        if self.samples_until_resync == 0 {
            self.resync();
        }

        y as f32
    }

    /// Last produced sample, without advancing.
    pub fn current(&self) -> f32 {
        self.y0 as f32
    }
}
