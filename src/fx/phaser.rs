use crate::dsp::lfo::{Lfo, Waveform};
use crate::fx::{sanitize, StereoEffect};
use std::f32::consts::FRAC_PI_2;

/*
Phaser
======

A chain of identical first-order all-pass sections inside a feedback loop.
Each section's coefficient is recomputed every sample from an LFO swept
between two corner frequencies, so the notches created where the phase
response crosses odd multiples of pi slide up and down the spectrum.

The left and right channels run the same sweep in quadrature, and the wet
sum is scaled by 1 / (1 + depth) so raising the depth deepens the notches
without pumping the overall level.
*/

pub const MAX_STAGES: usize = 12;
const MAX_FEEDBACK: f32 = 0.97;
const MIN_RATE_HZ: f32 = 0.0;
const MAX_RATE_HZ: f32 = 2.5;

/// One first-order all-pass with independent per-channel coefficients.
struct AllpassStage {
    coefficient: [f32; 2],
    state: [f32; 2],
}

impl AllpassStage {
    fn new() -> Self {
        Self {
            coefficient: [0.0; 2],
            state: [0.0; 2],
        }
    }

    #[inline]
    fn set_coefficients(&mut self, left: f32, right: f32) {
        self.coefficient = [left, right];
    }

    #[inline]
    fn tick(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let out_l = -self.coefficient[0] * in_l + self.state[0];
        self.state[0] = out_l * self.coefficient[0] + in_l;

        let out_r = -self.coefficient[1] * in_r + self.state[1];
        self.state[1] = out_r * self.coefficient[1] + in_r;

        (out_l, out_r)
    }

    fn reset(&mut self) {
        self.state = [0.0; 2];
    }
}

pub struct Phaser {
    sample_rate: f32,
    lfo: [Lfo; 2],
    stages: [AllpassStage; MAX_STAGES],
    nb_stages: usize,
    depth: f32,
    feedback: f32,
    d_min: f32,
    d_max: f32,
    loop_state: [f32; 2],
}

impl Phaser {
    pub fn new(sample_rate: f32) -> Self {
        let mut phaser = Self {
            sample_rate,
            lfo: [
                Lfo::new(sample_rate, Waveform::Sine, MIN_RATE_HZ, MAX_RATE_HZ),
                Lfo::with_phase(sample_rate, Waveform::Sine, MIN_RATE_HZ, MAX_RATE_HZ, FRAC_PI_2),
            ],
            stages: std::array::from_fn(|_| AllpassStage::new()),
            nb_stages: 6,
            depth: 1.0,
            feedback: 0.5,
            d_min: 0.0,
            d_max: 0.0,
            loop_state: [0.0; 2],
        };
        phaser.set_rate(0.4);
        phaser.set_frequency_range(440.0, 1600.0);
        phaser
    }

    pub fn set_rate(&mut self, rate: f32) {
        let rate = rate.clamp(0.0, 1.0);
        for lfo in &mut self.lfo {
            lfo.set_normalized_frequency(rate);
        }
    }

    pub fn rate(&self) -> f32 {
        self.lfo[0].normalized_frequency()
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Bounds of the coefficient sweep, in Hz.
    pub fn set_frequency_range(&mut self, min_hz: f32, max_hz: f32) {
        let low = min_hz.min(max_hz);
        let high = min_hz.max(max_hz);
        self.d_min = 2.0 * low / self.sample_rate;
        self.d_max = 2.0 * high / self.sample_rate;
    }

    pub fn set_stages(&mut self, stages: usize) {
        self.nb_stages = stages.clamp(2, MAX_STAGES);
    }

    pub fn stages(&self) -> usize {
        self.nb_stages
    }
}

impl StereoEffect for Phaser {
    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        for lfo in &mut self.lfo {
            lfo.reset();
        }
        self.loop_state = [0.0; 2];
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let sweep_l = (1.0 + self.lfo[0].process()) * 0.5;
        let sweep_r = (1.0 + self.lfo[1].process()) * 0.5;
        let d_l = self.d_min + (self.d_max - self.d_min) * sweep_l;
        let d_r = self.d_min + (self.d_max - self.d_min) * sweep_r;
        let a_l = (1.0 - d_l) / (1.0 + d_l);
        let a_r = (1.0 - d_r) / (1.0 + d_r);

        let mut l = in_l + self.feedback * self.loop_state[0];
        let mut r = in_r + self.feedback * self.loop_state[1];
        for stage in &mut self.stages[..self.nb_stages] {
            stage.set_coefficients(a_l, a_r);
            (l, r) = stage.tick(l, r);
        }
        self.loop_state = [sanitize(l), sanitize(r)];

        let compensation = 1.0 / (1.0 + self.depth);
        (
            (in_l + self.depth * l) * compensation,
            (in_r + self.depth * r) * compensation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    #[test]
    fn responds_in_the_same_sample() {
        let mut phaser = Phaser::new(48_000.0);
        let (l, r) = phaser.process_sample(1.0, 1.0);
        assert!(l.abs() > 0.01, "no instantaneous path: {l}");
        assert!(r.abs() > 0.01);
    }

    #[test]
    fn zero_depth_is_dry() {
        let mut phaser = Phaser::new(48_000.0);
        phaser.set_depth(0.0);
        for i in 0..1024 {
            let x = (i as f32 * 0.05).sin();
            let (l, r) = phaser.process_sample(x, x);
            assert!((l - x).abs() < 1e-6);
            assert!((r - x).abs() < 1e-6);
        }
    }

    #[test]
    fn output_level_stays_compensated() {
        let mut phaser = Phaser::new(48_000.0);
        phaser.set_depth(1.0);
        phaser.set_feedback(0.9);
        let mut peak: f32 = 0.0;
        for i in 0..96_000 {
            let x = (i as f32 * 0.06).sin() * 0.5;
            let (l, r) = phaser.process_sample(x, x);
            peak = peak.max(l.abs()).max(r.abs());
            assert!(l.is_finite() && r.is_finite());
        }
        assert!(peak < 4.0, "phaser pumped to {peak}");
    }

    #[test]
    fn stage_count_is_bounded() {
        let mut phaser = Phaser::new(48_000.0);
        phaser.set_stages(100);
        assert_eq!(phaser.stages(), MAX_STAGES);
        phaser.set_stages(0);
        assert_eq!(phaser.stages(), 2);
    }

    #[test]
    fn quadrature_sweep_decorrelates_channels() {
        let mut phaser = Phaser::new(48_000.0);
        phaser.set_rate(1.0);
        let mut diff: f32 = 0.0;
        for i in 0..48_000 {
            let x = (i as f32 * 0.2).sin() * 0.5;
            let (l, r) = phaser.process_sample(x, x);
            if i > 1024 {
                diff = diff.max((l - r).abs());
            }
        }
        assert!(diff > 0.01, "channels identical despite quadrature LFOs");
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut Phaser::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut Phaser::new(48_000.0));
    }
}
