use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, LfoId, Tap};
use crate::fx::{sanitize, StereoEffect};

/*
Flanger
=======

Same modulated-tap machinery as the chorus, but with a much shorter center
delay and the tap fed back into the write, which is what turns gentle
detuning into the swept comb. Feedback is capped below unity; the loop
still rings at high settings but cannot run away.

  delay_time  0..1, center delay up to 10 ms
  rate        0..1, normalized onto 0.02..5 Hz
  depth       0..1, tap excursion toward the closer line edge
  feedback    0..0.97
*/

const LINES: [DelayLine; 2] = reserve([1023, 1023]);
const LINE_L: DelayLine = LINES[0];
const LINE_R: DelayLine = LINES[1];
const ARENA: usize = 2048;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const MAX_DELAY_SECONDS: f32 = 0.010;
const MIN_RATE_HZ: f32 = 0.02;
const MAX_RATE_HZ: f32 = 5.0;
const MAX_FEEDBACK: f32 = 0.97;

pub struct Flanger {
    engine: FxEngine,
    sample_rate: f32,
    delay_time: f32,
    rate: f32,
    depth: f32,
    feedback: f32,
    tap_center: f32,
    tap_excursion: f32,
    feedback_samples: [f32; 2],
}

impl Flanger {
    pub fn new(sample_rate: f32) -> Self {
        let mut flanger = Self {
            engine: FxEngine::new(sample_rate, ARENA),
            sample_rate,
            delay_time: -1.0,
            rate: -1.0,
            depth: -1.0,
            feedback: -1.0,
            tap_center: 0.0,
            tap_excursion: 0.0,
            feedback_samples: [0.0; 2],
        };
        flanger.set_delay_time(0.5);
        flanger.set_rate(0.5);
        flanger.set_depth(0.5);
        flanger.set_feedback(0.5);
        flanger
    }

    pub fn set_delay_time(&mut self, delay_time: f32) {
        let delay_time = delay_time.clamp(0.0, 1.0);
        if self.delay_time != delay_time {
            self.delay_time = delay_time;
            self.update_taps();
        }
    }

    pub fn delay_time(&self) -> f32 {
        self.delay_time
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
            self.update_taps();
        }
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        let feedback = feedback.clamp(0.0, MAX_FEEDBACK);
        if self.feedback != feedback {
            self.feedback = feedback;
        }
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    fn update_taps(&mut self) {
        let max_center = (LINE_L.length() - 1) as f32;
        let center = (self.delay_time * MAX_DELAY_SECONDS * self.sample_rate).clamp(1.0, max_center);
        // The swing may not cross the write head or the line's far end.
        let headroom = (center - 1.0).min(max_center - 1.0 - center).max(0.0);
        self.tap_center = center;
        self.tap_excursion = self.depth * headroom;
    }
}

impl StereoEffect for Flanger {
    fn reset(&mut self) {
        self.engine.clear();
        self.feedback_samples = [0.0; 2];
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let mut c = self.engine.start();

        c.load(in_l + self.feedback * self.feedback_samples[0]);
        c.write_line(LINE_L, Tap::Head, 0.0);
        c.load(in_r + self.feedback * self.feedback_samples[1]);
        c.write_line(LINE_R, Tap::Head, 0.0);

        c.interpolate_mod(LINE_L, self.tap_center, LfoId::One, self.tap_excursion, 1.0);
        let tap_l = c.take();
        c.interpolate_mod(LINE_R, self.tap_center, LfoId::Two, self.tap_excursion, 1.0);
        let tap_r = c.take();

        self.feedback_samples = [sanitize(tap_l), sanitize(tap_r)];

        (0.5 * (in_l + tap_l), 0.5 * (in_r + tap_r))
    }
}
