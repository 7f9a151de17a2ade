use crate::dsp::filter::{FilterMode, SvFilter};
use crate::fx::pitch_shifter::PitchShifter;
use crate::fx::reverberator::Reverberator;
use crate::fx::StereoEffect;

/*
Shimmer Reverb
==============

Pitch shifter, low-pass, high-pass and reverberator in series. With the
shifter an octave up, every pass through the chain climbs; the filters
keep the climb from turning into brittle hiss (low-pass) or rumble
accumulation (high-pass).

The knobs are deliberately macro controls, each fanned out to several
internal coefficients rather than patched one-to-one:

  texture   grain size of the shifter and diffusion of the reverb
  feedback  reverb time (how far the climb carries)
  cutoff    both filter corners in opposite directions, plus the reverb's
            internal damping
  transpose the shifted interval, default +12 semitones
*/

const LP_MIN_HZ: f32 = 500.0;
const LP_MAX_HZ: f32 = 14_000.0;
const HP_MIN_HZ: f32 = 40.0;
const HP_MAX_HZ: f32 = 400.0;

pub struct Shimmer {
    pitch: PitchShifter,
    lpf: SvFilter,
    hpf: SvFilter,
    reverb: Reverberator,
    texture: f32,
    feedback: f32,
    cutoff: f32,
}

impl Shimmer {
    pub fn new(sample_rate: f32) -> Self {
        let mut pitch = PitchShifter::new(sample_rate);
        pitch.set_transpose(12.0);

        let mut shimmer = Self {
            pitch,
            lpf: SvFilter::new(sample_rate, FilterMode::LowPass, LP_MAX_HZ),
            hpf: SvFilter::new(sample_rate, FilterMode::HighPass, HP_MIN_HZ),
            reverb: Reverberator::new(sample_rate),
            texture: -1.0,
            feedback: -1.0,
            cutoff: -1.0,
        };
        shimmer.set_texture(0.5);
        shimmer.set_feedback(0.5);
        shimmer.set_cutoff(0.5);
        shimmer
    }

    pub fn set_texture(&mut self, texture: f32) {
        let texture = texture.clamp(0.0, 1.0);
        if self.texture != texture {
            self.texture = texture;
            self.reverb.set_diffusion(0.3 + 0.5 * texture);
            self.pitch.set_size(0.25 + 0.5 * texture);
        }
    }

    pub fn texture(&self) -> f32 {
        self.texture
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        let feedback = feedback.clamp(0.0, 1.0);
        if self.feedback != feedback {
            self.feedback = feedback;
            self.reverb.set_time(0.35 + 0.63 * feedback);
        }
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        let cutoff = cutoff.clamp(0.0, 1.0);
        if self.cutoff != cutoff {
            self.cutoff = cutoff;
            self.lpf.set_cutoff(LP_MIN_HZ + (LP_MAX_HZ - LP_MIN_HZ) * cutoff);
            self.hpf.set_cutoff(HP_MAX_HZ - (HP_MAX_HZ - HP_MIN_HZ) * cutoff);
            self.reverb.set_lp(0.3 + 0.6 * cutoff);
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn set_transpose(&mut self, semitones: f32) {
        self.pitch.set_transpose(semitones);
    }

    pub fn transpose(&self) -> f32 {
        self.pitch.transpose()
    }
}

impl StereoEffect for Shimmer {
    fn reset(&mut self) {
        self.pitch.reset();
        self.lpf.reset();
        self.hpf.reset();
        self.reverb.reset();
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let (l, r) = self.pitch.process_sample(in_l, in_r);
        let (l, r) = self.lpf.process_sample(l, r);
        let (l, r) = self.hpf.process_sample(l, r);
        self.reverb.process_sample(l, r)
    }
}
