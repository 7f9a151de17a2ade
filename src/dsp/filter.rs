use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
State-Variable Filter
=====================

Two-integrator-loop topology (topology-preserving transform). One
coefficient pair (g, r) yields low-pass, band-pass and high-pass responses
simultaneously from the same two state variables, so callers that need
several responses pay for the loop once.

  g   prewarped frequency coefficient, tan(pi * fc / sr)
  r   damping, 1 / Q

The tan() in the coefficient computation is the only expensive part, and
some hosts retune cutoff every sample (the tape delay's tone control, the
shimmer's cutoff knob). `FrequencyApprox` trades accuracy for speed there:

  Accurate   libm tan, exact up to Nyquist
  Fast       5th-order polynomial, within ~1% below fs/8
  Dirty      g = pi * fc / sr, usable well below fs/16

State is stereo; both channels share coefficients.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    BandPass,
    HighPass,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyApprox {
    Accurate,
    Fast,
    Dirty,
}

/// Simultaneous responses of one filter tick.
pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

pub struct SvFilter {
    sample_rate: f32,
    mode: FilterMode,
    approx: FrequencyApprox,
    cutoff_hz: f32,
    resonance: f32,
    g: f32,
    r: f32,
    h: f32,
    state1: [f32; 2],
    state2: [f32; 2],
}

impl SvFilter {
    pub fn new(sample_rate: f32, mode: FilterMode, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            sample_rate,
            mode,
            approx: FrequencyApprox::Accurate,
            cutoff_hz: 0.0,
            resonance: -1.0,
            g: 0.0,
            r: 0.0,
            h: 0.0,
            state1: [0.0; 2],
            state2: [0.0; 2],
        };
        filter.set_cutoff(cutoff_hz);
        filter.set_resonance(0.0);
        filter
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn set_approximation(&mut self, approx: FrequencyApprox) {
        self.approx = approx;
        self.update_coefficients();
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        let cutoff_hz = cutoff_hz.clamp(1.0, 0.49 * self.sample_rate);
        if self.cutoff_hz != cutoff_hz {
            self.cutoff_hz = cutoff_hz;
            self.update_coefficients();
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Resonance in 0..1; 0 is critically damped, 1 a strong peak.
    pub fn set_resonance(&mut self, resonance: f32) {
        let resonance = resonance.clamp(0.0, 1.0);
        if self.resonance != resonance {
            self.resonance = resonance;
            let q = 0.5 + 7.5 * resonance;
            self.r = 1.0 / q;
            self.update_coefficients();
        }
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    fn update_coefficients(&mut self) {
        let x = PI * self.cutoff_hz / self.sample_rate;
        self.g = match self.approx {
            FrequencyApprox::Accurate => x.tan(),
            FrequencyApprox::Fast => {
                let x2 = x * x;
                x * (1.0 + x2 * (1.0 / 3.0 + x2 * (2.0 / 15.0)))
            }
            FrequencyApprox::Dirty => x,
        };
        self.h = 1.0 / (1.0 + self.r * self.g + self.g * self.g);
    }

    /// Run one channel and return all three responses.
    #[inline]
    pub fn tick(&mut self, input: f32, channel: usize) -> FilterOutputs {
        let s1 = self.state1[channel];
        let s2 = self.state2[channel];

        let highpass = (input - self.r * s1 - self.g * s1 - s2) * self.h;
        let bandpass = self.g * highpass + s1;
        self.state1[channel] = self.g * highpass + bandpass;
        let lowpass = self.g * bandpass + s2;
        self.state2[channel] = self.g * bandpass + lowpass;

        FilterOutputs {
            lowpass,
            bandpass,
            highpass,
        }
    }

    pub fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let left = self.tick(in_l, 0);
        let right = self.tick(in_r, 1);
        let out = match self.mode {
            FilterMode::LowPass => (left.lowpass, right.lowpass),
            FilterMode::BandPass => (left.bandpass, right.bandpass),
            FilterMode::HighPass => (left.highpass, right.highpass),
        };
        // Pathological coefficient/input combinations must not poison the
        // block; substitute silence and restart from clean state.
        if !out.0.is_finite() || !out.1.is_finite() {
            self.reset();
            return (0.0, 0.0);
        }
        out
    }

    pub fn reset(&mut self) {
        self.state1 = [0.0; 2];
        self.state2 = [0.0; 2];
    }
}
