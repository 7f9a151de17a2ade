use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, Tap};
use crate::dsp::pitch::semitone_to_ratio;
use crate::fx::StereoEffect;

/*
Pitch Shifter
=============

Granular delay-line shifter. Each channel is written into a line and read
back by two taps that crawl along it at (1 - ratio) of realtime, half a
grain apart. Each tap is weighted by a triangular envelope that reaches
zero exactly where the other tap peaks, so the crossfade hides the jump
when a tap wraps back to the start of the grain.

The grain size target moves with the cube of the size control (small
values favor latency, large values favor smearing) and the actual size
trails it through a one-pole, because a hard jump in grain length is
audible as a click.
*/

const LINES: [DelayLine; 2] = reserve([2047, 2047]);
const LINE_L: DelayLine = LINES[0];
const LINE_R: DelayLine = LINES[1];
const ARENA: usize = 4096;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const TRANSPOSE_BOUND: f32 = 36.0;
const GRAIN_MIN: f32 = 128.0;
const GRAIN_MAX: f32 = 2047.0;
const GRAIN_SMOOTHING: f32 = 0.05;

pub struct PitchShifter {
    engine: FxEngine,
    phase: f32,
    transpose: f32,
    ratio: f32,
    size: f32,
    grain_target: f32,
    grain_size: f32,
}

impl PitchShifter {
    pub fn new(sample_rate: f32) -> Self {
        let mut shifter = Self {
            engine: FxEngine::new(sample_rate, ARENA),
            phase: 0.0,
            transpose: f32::NAN,
            ratio: 1.0,
            size: -1.0,
            grain_target: GRAIN_MIN,
            grain_size: GRAIN_MIN,
        };
        shifter.set_transpose(0.0);
        shifter.set_size(0.5);
        shifter.grain_size = shifter.grain_target;
        shifter
    }

    pub fn set_transpose(&mut self, semitones: f32) {
        let semitones = semitones.clamp(-TRANSPOSE_BOUND, TRANSPOSE_BOUND);
        if self.transpose != semitones {
            self.transpose = semitones;
            self.ratio = semitone_to_ratio(semitones);
        }
    }

    pub fn transpose(&self) -> f32 {
        self.transpose
    }

    pub fn set_size(&mut self, size: f32) {
        let size = size.clamp(0.0, 1.0);
        if self.size != size {
            self.size = size;
            self.grain_target = GRAIN_MIN + (GRAIN_MAX - GRAIN_MIN) * size * size * size;
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

impl StereoEffect for PitchShifter {
    fn reset(&mut self) {
        self.engine.clear();
        self.phase = 0.0;
        self.grain_size = self.grain_target;
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        self.grain_size += GRAIN_SMOOTHING * (self.grain_target - self.grain_size);

        self.phase += (1.0 - self.ratio) / self.grain_size;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        if self.phase <= 0.0 {
            self.phase += 1.0;
        }

        let tri = 2.0 * if self.phase >= 0.5 {
            1.0 - self.phase
        } else {
            self.phase
        };
        let tap = self.phase * self.grain_size;
        let mut half = tap + self.grain_size * 0.5;
        if half >= self.grain_size {
            half -= self.grain_size;
        }

        let mut c = self.engine.start();

        c.load(in_l);
        c.write_line(LINE_L, Tap::Head, 0.0);
        c.interpolate(LINE_L, tap, tri);
        c.interpolate(LINE_L, half, 1.0 - tri);
        let out_l = c.take();

        c.load(in_r);
        c.write_line(LINE_R, Tap::Head, 0.0);
        c.interpolate(LINE_R, tap, tri);
        c.interpolate(LINE_R, half, 1.0 - tri);
        let out_r = c.take();

        (out_l, out_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    /// Dominant frequency of a buffer by zero-crossing count.
    fn dominant_freq(buffer: &[f32], sample_rate: f32) -> f32 {
        let mut crossings = 0;
        for pair in buffer.windows(2) {
            if (pair[0] >= 0.0) != (pair[1] >= 0.0) {
                crossings += 1;
            }
        }
        crossings as f32 * sample_rate / (2.0 * buffer.len() as f32)
    }

    fn shifted_freq(semitones: f32, input_hz: f32) -> f32 {
        let sample_rate = 48_000.0;
        let mut shifter = PitchShifter::new(sample_rate);
        shifter.set_transpose(semitones);
        shifter.set_size(0.5);

        let mut out = Vec::new();
        for i in 0..48_000 {
            let x = (std::f32::consts::TAU * input_hz * i as f32 / sample_rate).sin();
            let (l, _) = shifter.process_sample(x, x);
            if i > 8_192 {
                out.push(l);
            }
        }
        dominant_freq(&out, sample_rate)
    }

    #[test]
    fn octave_up_doubles_the_frequency() {
        let f = shifted_freq(12.0, 440.0);
        assert!(
            (f - 880.0).abs() < 60.0,
            "octave up landed at {f} Hz instead of ~880"
        );
    }

    #[test]
    fn octave_down_halves_the_frequency() {
        let f = shifted_freq(-12.0, 440.0);
        assert!(
            (f - 220.0).abs() < 40.0,
            "octave down landed at {f} Hz instead of ~220"
        );
    }

    #[test]
    fn zero_transpose_leaves_pitch_alone() {
        let f = shifted_freq(0.0, 440.0);
        assert!((f - 440.0).abs() < 30.0, "unison drifted to {f} Hz");
    }

    #[test]
    fn grain_size_moves_gradually() {
        let mut shifter = PitchShifter::new(48_000.0);
        shifter.set_size(0.0);
        for _ in 0..4096 {
            shifter.process_sample(0.0, 0.0);
        }
        let small = shifter.grain_size;
        shifter.set_size(1.0);
        shifter.process_sample(0.0, 0.0);
        let just_after = shifter.grain_size;
        for _ in 0..4096 {
            shifter.process_sample(0.0, 0.0);
        }
        let settled = shifter.grain_size;

        assert!(just_after - small < 100.0, "grain size jumped");
        assert!(settled > GRAIN_MAX * 0.95, "grain size never converged");
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut PitchShifter::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut PitchShifter::new(48_000.0));
    }
}
