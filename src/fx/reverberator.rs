use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, LfoId, Tap};
use crate::fx::{sanitize, StereoEffect};

/*
Reverberator
============

Griesinger topology as described in the Dattorro paper: the summed input
is diffused through four series all-pass sections, then enters a
figure-of-eight loop of two branches, each holding two more all-pass
sections, a one-pole damping low-pass, and a long delay. Each branch
feeds the other's delay, so energy orbits the loop and decays by the loop
gain per lap.

Modulation keeps the tail from ringing at fixed comb frequencies: one LFO
smears the read point of the first diffuser, another swings the long
delay reads a few cents sharp and flat.

Wet outputs are the loop delay reads themselves (the Dattorro output-tap
placement), so the wet path carries no zero-delay component: an impulse
is heard only once it has crossed the loop.

  input_gain  0..1 applied to the summed input
  time        0..1 loop gain, the reverb time
  diffusion   0..1 all-pass coefficient shared by all eight sections
  lp          0..1 damping low-pass coefficient in both branches
*/

const LINES: [DelayLine; 10] =
    reserve([113, 162, 241, 399, 1653, 2038, 3411, 1913, 1663, 4782]);
const AP1: DelayLine = LINES[0];
const AP2: DelayLine = LINES[1];
const AP3: DelayLine = LINES[2];
const AP4: DelayLine = LINES[3];
const DAP1A: DelayLine = LINES[4];
const DAP1B: DelayLine = LINES[5];
const DEL1: DelayLine = LINES[6];
const DAP2A: DelayLine = LINES[7];
const DAP2B: DelayLine = LINES[8];
const DEL2: DelayLine = LINES[9];
const ARENA: usize = 16384;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const SMEAR_OFFSET: f32 = 10.0;
const SMEAR_AMPLITUDE: f32 = 60.0;
const LOOP_TAP_OFFSET: f32 = 4680.0;
const LOOP_TAP_AMPLITUDE: f32 = 100.0;
const OUTPUT_GAIN: f32 = 2.0;

pub struct Reverberator {
    engine: FxEngine,
    input_gain: f32,
    reverb_time: f32,
    diffusion: f32,
    lp: f32,
    lp_decay: [f32; 2],
}

impl Reverberator {
    pub fn new(sample_rate: f32) -> Self {
        let mut engine = FxEngine::new(sample_rate, ARENA);
        engine.set_lfo_frequency(LfoId::One, 0.5);
        engine.set_lfo_frequency(LfoId::Two, 0.3);

        let mut reverb = Self {
            engine,
            input_gain: -1.0,
            reverb_time: -1.0,
            diffusion: -1.0,
            lp: -1.0,
            lp_decay: [0.0; 2],
        };
        reverb.set_input_gain(1.0);
        reverb.set_time(0.7);
        reverb.set_diffusion(0.625);
        reverb.set_lp(0.7);
        reverb
    }

    pub fn set_input_gain(&mut self, gain: f32) {
        self.input_gain = gain.clamp(0.0, 1.0);
    }

    pub fn input_gain(&self) -> f32 {
        self.input_gain
    }

    pub fn set_time(&mut self, time: f32) {
        self.reverb_time = time.clamp(0.0, 1.0);
    }

    pub fn time(&self) -> f32 {
        self.reverb_time
    }

    pub fn set_diffusion(&mut self, diffusion: f32) {
        self.diffusion = diffusion.clamp(0.0, 1.0);
    }

    pub fn diffusion(&self) -> f32 {
        self.diffusion
    }

    pub fn set_lp(&mut self, lp: f32) {
        self.lp = lp.clamp(0.0, 1.0);
    }

    pub fn lp(&self) -> f32 {
        self.lp
    }
}

impl StereoEffect for Reverberator {
    fn reset(&mut self) {
        self.engine.clear();
        self.lp_decay = [0.0; 2];
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let kap = self.diffusion;
        let klp = self.lp;
        let krt = self.reverb_time;
        let gain = self.input_gain;

        let mut lp_1 = self.lp_decay[0];
        let mut lp_2 = self.lp_decay[1];

        let mut c = self.engine.start();

        // Smear the first diffuser: re-read it at a wobbling offset and
        // write the result back further in.
        c.interpolate_mod(AP1, SMEAR_OFFSET, LfoId::One, SMEAR_AMPLITUDE, 1.0);
        c.write_line(AP1, Tap::At(100), 0.0);

        c.read(in_l + in_r, gain);

        // Diffuse through four all-passes.
        c.read_line(AP1, Tap::Tail, kap);
        c.write_all_pass(AP1, Tap::Head, -kap);
        c.read_line(AP2, Tap::Tail, kap);
        c.write_all_pass(AP2, Tap::Head, -kap);
        c.read_line(AP3, Tap::Tail, kap);
        c.write_all_pass(AP3, Tap::Head, -kap);
        c.read_line(AP4, Tap::Tail, kap);
        c.write_all_pass(AP4, Tap::Head, -kap);
        let apout = c.take();

        // Left branch: the modulated del2 read is the wet output, then the
        // diffused input joins and the branch refills del1.
        c.interpolate_mod(DEL2, LOOP_TAP_OFFSET, LfoId::Two, LOOP_TAP_AMPLITUDE, krt);
        let out_l = c.value() * OUTPUT_GAIN;
        c.read(apout, 1.0);
        c.lp(&mut lp_1, klp);
        c.read_line(DAP1A, Tap::Tail, -kap);
        c.write_all_pass(DAP1A, Tap::Head, kap);
        c.read_line(DAP1B, Tap::Tail, kap);
        c.write_all_pass(DAP1B, Tap::Head, -kap);
        c.write_line(DEL1, Tap::Head, 0.0);

        // Right branch, mirrored off del1.
        c.read_line(DEL1, Tap::Tail, krt);
        let out_r = c.value() * OUTPUT_GAIN;
        c.read(apout, 1.0);
        c.lp(&mut lp_2, klp);
        c.read_line(DAP2A, Tap::Tail, kap);
        c.write_all_pass(DAP2A, Tap::Head, -kap);
        c.read_line(DAP2B, Tap::Tail, -kap);
        c.write_all_pass(DAP2B, Tap::Head, kap);
        c.write_line(DEL2, Tap::Head, 0.0);

        self.lp_decay = [sanitize(lp_1), sanitize(lp_2)];

        (out_l, out_r)
    }
}
