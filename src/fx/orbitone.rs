use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, Tap};
use crate::dsp::lfo::{Lfo, Waveform};
use crate::fx::StereoEffect;

/*
Orbitone
========

Ensemble effect: three taps per output, spaced 120 degrees apart in
modulation phase, each driven by a slow LFO plus a much smaller fast LFO
layer (one tenth the swing). Taps cross between the channel lines, so each
output hears two taps of its own channel and one of the other, which keeps
the image wide without collapsing to dual mono.

  rate   0..1, applied to all six LFOs (slow bank max 1 Hz, fast max 8.8)
  depth  0..1, 256 samples of full-scale excursion
*/

const LINES: [DelayLine; 2] = reserve([2047, 2047]);
const LINE_L: DelayLine = LINES[0];
const LINE_R: DelayLine = LINES[1];
const ARENA: usize = 4096;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const TAP_CENTER: f32 = 1024.0;
const FULLSCALE_DEPTH: f32 = 256.0;
const SLOW_MAX_HZ: f32 = 1.0;
const FAST_MAX_HZ: f32 = 8.8;
const FAST_LAYER_RATIO: f32 = 0.1;
const TAP_WEIGHT: f32 = 1.0 / 3.0;

const SLOW: usize = 0;
const FAST: usize = 3;

pub struct Orbitone {
    engine: FxEngine,
    lfo: [Lfo; 6],
    rate: f32,
    depth: f32,
    fullscale_depth: f32,
}

impl Orbitone {
    pub fn new(sample_rate: f32) -> Self {
        let third = 2.0 * std::f32::consts::PI / 3.0;
        let mut orbitone = Self {
            engine: FxEngine::new(sample_rate, ARENA),
            lfo: [
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, SLOW_MAX_HZ, 0.0),
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, SLOW_MAX_HZ, third),
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, SLOW_MAX_HZ, 2.0 * third),
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, FAST_MAX_HZ, 0.0),
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, FAST_MAX_HZ, third),
                Lfo::with_phase(sample_rate, Waveform::Sine, 0.0, FAST_MAX_HZ, 2.0 * third),
            ],
            rate: -1.0,
            depth: -1.0,
            fullscale_depth: 0.0,
        };
        orbitone.set_rate(0.4);
        orbitone.set_depth(0.5);
        orbitone
    }

    pub fn set_rate(&mut self, rate: f32) {
        let rate = rate.clamp(0.0, 1.0);
        if self.rate != rate {
            self.rate = rate;
            for lfo in &mut self.lfo {
                lfo.set_normalized_frequency(rate);
            }
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_depth(&mut self, depth: f32) {
        let depth = depth.clamp(0.0, 1.0);
        if self.depth != depth {
            self.depth = depth;
            self.fullscale_depth = depth * FULLSCALE_DEPTH;
        }
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }
}

impl StereoEffect for Orbitone {
    fn reset(&mut self) {
        self.engine.clear();
        for lfo in &mut self.lfo {
            lfo.reset();
        }
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let slow_0 = self.lfo[SLOW].process();
        let slow_120 = self.lfo[SLOW + 1].process();
        let slow_240 = self.lfo[SLOW + 2].process();
        let fast_0 = self.lfo[FAST].process();
        let fast_120 = self.lfo[FAST + 1].process();
        let fast_240 = self.lfo[FAST + 2].process();

        let a = self.fullscale_depth;
        let b = self.fullscale_depth * FAST_LAYER_RATIO;
        let mod_1 = slow_0 * a + fast_0 * b;
        let mod_2 = slow_120 * a + fast_120 * b;
        let mod_3 = slow_240 * a + fast_240 * b;

        let mut c = self.engine.start();

        c.read(in_l, 1.0);
        c.write_line(LINE_L, Tap::Head, 0.0);
        c.read(in_r, 1.0);
        c.write_line(LINE_R, Tap::Head, 0.0);

        c.interpolate(LINE_L, TAP_CENTER + mod_1, TAP_WEIGHT);
        c.interpolate(LINE_L, TAP_CENTER + mod_2, TAP_WEIGHT);
        c.interpolate(LINE_R, TAP_CENTER + mod_3, TAP_WEIGHT);
        let out_l = c.take();

        c.interpolate(LINE_R, TAP_CENTER + mod_1, TAP_WEIGHT);
        c.interpolate(LINE_R, TAP_CENTER + mod_2, TAP_WEIGHT);
        c.interpolate(LINE_L, TAP_CENTER + mod_3, TAP_WEIGHT);
        let out_r = c.take();

        (out_l, out_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    #[test]
    fn excursion_plus_fast_layer_fits_the_line() {
        let max_swing = FULLSCALE_DEPTH * (1.0 + FAST_LAYER_RATIO);
        assert!(TAP_CENTER + max_swing + 1.0 <= LINE_L.length() as f32);
        assert!(TAP_CENTER - max_swing >= 0.0);
    }

    #[test]
    fn impulse_produces_three_weighted_taps() {
        let mut orbitone = Orbitone::new(48_000.0);
        orbitone.set_depth(0.0); // all taps collapse onto the center

        orbitone.process_sample(1.0, 1.0);
        let mut total = 0.0;
        for _ in 0..(TAP_CENTER as usize + 8) {
            let (l, _) = orbitone.process_sample(0.0, 0.0);
            total += l;
        }
        // Three taps at weight 1/3 each, reading lines that both carried
        // the impulse.
        assert!((total - 1.0).abs() < 0.01, "tap sum was {total}");
    }

    #[test]
    fn modulation_detunes_the_taps() {
        let mut modulated = Orbitone::new(48_000.0);
        modulated.set_rate(1.0);
        modulated.set_depth(1.0);
        let mut still = Orbitone::new(48_000.0);
        still.set_rate(1.0);
        still.set_depth(0.0);

        let mut divergence: f32 = 0.0;
        for i in 0..48_000 {
            let x = (i as f32 * 0.01).sin();
            let (a, _) = modulated.process_sample(x, x);
            let (b, _) = still.process_sample(x, x);
            if i > 8192 {
                divergence = divergence.max((a - b).abs());
            }
        }
        assert!(divergence > 0.05, "taps appear frozen: {divergence}");
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut Orbitone::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut Orbitone::new(48_000.0));
    }
}
