use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, LfoId, Tap};
use crate::fx::StereoEffect;

/*
Chorus
======

Each channel is written into its own arena line and read back through two
LFO-modulated fractional taps around a fixed center. The engine's built-in
LFOs run at the same rate but in quadrature, so the two taps of a channel
drift against each other and the left/right tap pairs are mirrored, which
is where the stereo width comes from.

  rate    0..1, normalized onto 0.01..1 Hz
  depth   0..1, up to 384 samples of tap excursion
*/

const LINES: [DelayLine; 2] = reserve([2047, 2047]);
const LINE_L: DelayLine = LINES[0];
const LINE_R: DelayLine = LINES[1];
const ARENA: usize = 4096;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const TAP_CENTER: f32 = 1024.0;
const FULLSCALE_DEPTH: f32 = 384.0;
const MIN_RATE_HZ: f32 = 0.01;
const MAX_RATE_HZ: f32 = 1.0;

pub struct Chorus {
    engine: FxEngine,
    rate: f32,
    depth: f32,
    fullscale_depth: f32,
}

impl Chorus {
    pub fn new(sample_rate: f32) -> Self {
        let mut chorus = Self {
            engine: FxEngine::new(sample_rate, ARENA),
            rate: -1.0,
            depth: -1.0,
            fullscale_depth: 0.0,
        };
        chorus.set_rate(0.5);
        chorus.set_depth(0.5);
        chorus
    }

    pub fn set_rate(&mut self, rate: f32) {
        let rate = rate.clamp(0.0, 1.0);
        if self.rate != rate {
            self.rate = rate;
            let hz = MIN_RATE_HZ + (MAX_RATE_HZ - MIN_RATE_HZ) * rate;
            self.engine.set_lfo_frequency(LfoId::One, hz);
            self.engine.set_lfo_frequency(LfoId::Two, hz);
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

impl StereoEffect for Chorus {
    fn reset(&mut self) {
        self.engine.clear();
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let mut c = self.engine.start();

        c.load(in_l);
        c.write_line(LINE_L, Tap::Head, 0.0);
        c.load(in_r);
        c.write_line(LINE_R, Tap::Head, 0.0);

        // Two quadrature taps per channel, mirrored between channels.
        c.interpolate_mod(LINE_L, TAP_CENTER, LfoId::One, self.fullscale_depth, 0.5);
        c.interpolate_mod(LINE_L, TAP_CENTER, LfoId::Two, self.fullscale_depth, 0.5);
        let out_l = c.take();

        c.interpolate_mod(LINE_R, TAP_CENTER, LfoId::Two, self.fullscale_depth, 0.5);
        c.interpolate_mod(LINE_R, TAP_CENTER, LfoId::One, self.fullscale_depth, 0.5);
        let out_r = c.take();

        (out_l, out_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    #[test]
    fn taps_stay_inside_their_lines() {
        // Worst-case excursion must leave the interpolation bracket inside
        // the reserved length.
        assert!(TAP_CENTER + FULLSCALE_DEPTH + 1.0 <= LINE_L.length() as f32);
        assert!(TAP_CENTER - FULLSCALE_DEPTH >= 0.0);
    }

    #[test]
    fn output_is_delayed_input() {
        let mut chorus = Chorus::new(48_000.0);
        chorus.set_depth(0.0); // pin the taps to the center

        let (l, r) = chorus.process_sample(1.0, -1.0);
        assert_eq!((l, r), (0.0, 0.0), "no output before the tap distance");

        let mut seen = (0.0, 0.0);
        for _ in 0..TAP_CENTER as usize + 2 {
            let out = chorus.process_sample(0.0, 0.0);
            if out.0.abs() > 0.5 {
                seen = out;
            }
        }
        assert!(seen.0 > 0.9, "left impulse never surfaced: {}", seen.0);
        assert!(seen.1 < -0.9, "right impulse never surfaced: {}", seen.1);
    }

    #[test]
    fn modulation_moves_the_tap() {
        let mut modulated = Chorus::new(48_000.0);
        modulated.set_rate(1.0);
        modulated.set_depth(1.0);
        let mut still = Chorus::new(48_000.0);
        still.set_rate(1.0);
        still.set_depth(0.0);

        // Feed both the same slow sine; moving taps must diverge from the
        // fixed one once the lines are charged.
        let mut divergence: f32 = 0.0;
        for i in 0..24_000 {
            let x = (i as f32 * 0.002).sin();
            let (a, _) = modulated.process_sample(x, x);
            let (b, _) = still.process_sample(x, x);
            if i > 4096 {
                divergence = divergence.max((a - b).abs());
            }
        }
        assert!(divergence > 0.05, "taps appear frozen: {divergence}");
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut Chorus::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut Chorus::new(48_000.0));
    }
}
