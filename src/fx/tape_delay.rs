use crate::dsp::delay::DelayBuffer;
use crate::dsp::filter::{FilterMode, SvFilter};
use crate::dsp::jitter::JitterGenerator;
use crate::fx::{sanitize, StereoEffect};

/*
Tape Delay
==========

Echo with the mechanical character of a tape loop. Each channel owns a
plain delay buffer (not the shared arena; the write point moves with the
delay time, which the arena's fixed reservations cannot express). The
repeats pass through a low-pass/high-pass pair inside the feedback loop,
so every generation gets darker and thinner like oxide losing an octave
per pass, and a jitter source wobbles the spacing between write and read
the way a worn capstan would.

  delay_time  0..1 per channel, of the 1 s maximum
  feedback    0..1, applied to the filtered repeat
  tone        -1..1, slides the LP down / HP up (negative) or apart
              (positive); one knob, two corners moving in opposition
  flutter     0..1, depth of the transport wobble (up to 10 ms)
*/

const MAX_DELAY_SECONDS: f32 = 1.0;
const FLUTTER_MARGIN_SECONDS: f32 = 0.010;
const LPF_CUTOFF_REF: f32 = 14_000.0;
const HPF_CUTOFF_REF: f32 = 60.0;

pub struct TapeDelay {
    sample_rate: f32,
    buffer: [DelayBuffer; 2],
    delay_time: [f32; 2],
    feedback: f32,
    tone: f32,
    flutter: f32,
    lpf: SvFilter,
    hpf: SvFilter,
    jitter: JitterGenerator,
}

impl TapeDelay {
    pub fn new(sample_rate: f32) -> Self {
        let capacity = ((MAX_DELAY_SECONDS + FLUTTER_MARGIN_SECONDS) * sample_rate) as usize + 2;
        let mut delay = Self {
            sample_rate,
            buffer: [DelayBuffer::new(capacity), DelayBuffer::new(capacity)],
            delay_time: [0.0; 2],
            feedback: 0.0,
            tone: f32::NAN,
            flutter: 0.0,
            lpf: SvFilter::new(sample_rate, FilterMode::LowPass, LPF_CUTOFF_REF),
            hpf: SvFilter::new(sample_rate, FilterMode::HighPass, HPF_CUTOFF_REF),
            jitter: JitterGenerator::new(sample_rate),
        };
        delay.set_delay_time_left(0.25);
        delay.set_delay_time_right(0.25);
        delay.set_feedback(0.35);
        delay.set_tone(0.0);
        delay.set_flutter(0.05);
        delay
    }

    pub fn set_delay_time_left(&mut self, time: f32) {
        self.delay_time[0] = time.clamp(0.0, 1.0);
    }

    pub fn delay_time_left(&self) -> f32 {
        self.delay_time[0]
    }

    pub fn set_delay_time_right(&mut self, time: f32) {
        self.delay_time[1] = time.clamp(0.0, 1.0);
    }

    pub fn delay_time_right(&self) -> f32 {
        self.delay_time[1]
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 1.0);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// One knob, two corners: `2^tone` scales the low-pass up and the
    /// high-pass down, so turning it opens one end while closing the other.
    pub fn set_tone(&mut self, tone: f32) {
        let tone = tone.clamp(-1.0, 1.0);
        if self.tone != tone {
            self.tone = tone;
            let spread = tone.exp2();
            self.lpf.set_cutoff(LPF_CUTOFF_REF * spread);
            self.hpf.set_cutoff(HPF_CUTOFF_REF / spread);
        }
    }

    pub fn tone(&self) -> f32 {
        self.tone
    }

    pub fn set_flutter(&mut self, flutter: f32) {
        self.flutter = flutter.clamp(0.0, 1.0);
    }

    pub fn flutter(&self) -> f32 {
        self.flutter
    }

    #[inline]
    fn delay_samples(&self, channel: usize, wobble: f32) -> usize {
        let base = self.delay_time[channel] * MAX_DELAY_SECONDS * self.sample_rate;
        let max = (self.buffer[channel].capacity() - 1) as f32;
        (base + wobble).clamp(1.0, max) as usize
    }
}

impl StereoEffect for TapeDelay {
    fn reset(&mut self) {
        for buffer in &mut self.buffer {
            buffer.reset();
        }
        self.lpf.reset();
        self.hpf.reset();
        self.jitter.reset();
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let wobble =
            self.jitter.process() * self.flutter * FLUTTER_MARGIN_SECONDS * self.sample_rate;
        let distance_l = self.delay_samples(0, wobble);
        let distance_r = self.delay_samples(1, wobble);

        self.buffer[0].write_ahead(distance_l, in_l);
        self.buffer[1].write_ahead(distance_r, in_r);

        let (wet_l, wet_r) = {
            let raw = (self.buffer[0].read(), self.buffer[1].read());
            let lp = self.lpf.process_sample(raw.0, raw.1);
            self.hpf.process_sample(lp.0, lp.1)
        };

        self.buffer[0].add_ahead(distance_l, sanitize(wet_l) * self.feedback);
        self.buffer[1].add_ahead(distance_r, sanitize(wet_r) * self.feedback);

        self.buffer[0].advance();
        self.buffer[1].advance();

        (wet_l, wet_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    fn quiet_delay(sample_rate: f32) -> TapeDelay {
        let mut delay = TapeDelay::new(sample_rate);
        delay.set_flutter(0.0);
        delay.set_feedback(0.0);
        delay
    }

    #[test]
    fn echo_lands_at_the_configured_time() {
        let sample_rate = 48_000.0;
        let mut delay = quiet_delay(sample_rate);
        delay.set_delay_time_left(0.01); // 480 samples
        delay.set_delay_time_right(0.02); // 960 samples

        delay.process_sample(1.0, 1.0);
        let mut first_l = None;
        let mut first_r = None;
        for n in 1..=1200 {
            let (l, r) = delay.process_sample(0.0, 0.0);
            if first_l.is_none() && l.abs() > 0.1 {
                first_l = Some(n);
            }
            if first_r.is_none() && r.abs() > 0.1 {
                first_r = Some(n);
            }
        }
        assert_eq!(first_l, Some(480));
        assert_eq!(first_r, Some(960));
    }

    #[test]
    fn feedback_repeats_decay() {
        let sample_rate = 48_000.0;
        let mut delay = quiet_delay(sample_rate);
        delay.set_delay_time_left(0.005); // 240 samples
        delay.set_delay_time_right(0.005);
        delay.set_feedback(0.5);

        delay.process_sample(1.0, 1.0);
        let mut peaks = Vec::new();
        let mut window_peak: f32 = 0.0;
        for n in 1..=1440 {
            let (l, _) = delay.process_sample(0.0, 0.0);
            window_peak = window_peak.max(l.abs());
            if n % 240 == 0 {
                peaks.push(window_peak);
                window_peak = 0.0;
            }
        }
        assert!(peaks[0] > 0.4, "first repeat missing: {:?}", peaks);
        for pair in peaks.windows(2) {
            if pair[1] > 1e-3 {
                assert!(pair[1] < pair[0], "repeats not decaying: {:?}", peaks);
            }
        }
    }

    #[test]
    fn tone_darkens_the_repeats() {
        let sample_rate = 48_000.0;
        let energy_at_tone = |tone: f32| -> f32 {
            let mut delay = quiet_delay(sample_rate);
            delay.set_delay_time_left(0.002);
            delay.set_delay_time_right(0.002);
            delay.set_tone(tone);
            let mut energy = 0.0;
            for i in 0..9600 {
                // 8 kHz probe: above the darkened corner, below the open one.
                let x = (std::f32::consts::TAU * 8_000.0 * i as f32 / sample_rate).sin();
                let (l, _) = delay.process_sample(x, x);
                if i > 960 {
                    energy += l * l;
                }
            }
            energy
        };

        let dark = energy_at_tone(-1.0); // LP corner at 7 kHz
        let open = energy_at_tone(1.0); // LP corner at 28 kHz
        assert!(
            dark < open * 0.5,
            "tone had no effect: dark {dark}, open {open}"
        );
    }

    #[test]
    fn flutter_modulates_the_echo_timing() {
        let sample_rate = 48_000.0;
        let mut wobbly = TapeDelay::new(sample_rate);
        wobbly.set_feedback(0.0);
        wobbly.set_flutter(1.0);
        wobbly.set_delay_time_left(0.01);
        wobbly.set_delay_time_right(0.01);
        let mut steady = quiet_delay(sample_rate);
        steady.set_delay_time_left(0.01);
        steady.set_delay_time_right(0.01);

        let mut divergence: f32 = 0.0;
        for i in 0..48_000 {
            let x = (i as f32 * 0.01).sin();
            let (a, _) = wobbly.process_sample(x, x);
            let (b, _) = steady.process_sample(x, x);
            if i > 2048 {
                divergence = divergence.max((a - b).abs());
            }
        }
        assert!(divergence > 0.05, "flutter inaudible: {divergence}");
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut TapeDelay::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut TapeDelay::new(48_000.0));
    }
}
