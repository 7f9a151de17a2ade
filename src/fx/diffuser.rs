use crate::dsp::engine::{footprint, reserve, DelayLine, FxEngine, Tap};
use crate::fx::StereoEffect;

/*
Diffuser
========

Four short all-pass sections in series per channel, fixed coefficient.
Flat in magnitude; all it does is scramble phase so a transient goes in as
a click and comes out as a fizz. Sits in front of reverberation to stop
the first reflections from sounding like discrete slapbacks. No knobs.
*/

const LINES: [DelayLine; 8] = reserve([126, 180, 269, 444, 151, 205, 245, 405]);
const APL1: DelayLine = LINES[0];
const APL2: DelayLine = LINES[1];
const APL3: DelayLine = LINES[2];
const APL4: DelayLine = LINES[3];
const APR1: DelayLine = LINES[4];
const APR2: DelayLine = LINES[5];
const APR3: DelayLine = LINES[6];
const APR4: DelayLine = LINES[7];
const ARENA: usize = 2048;
const _: () = assert!(footprint(&LINES) <= ARENA as u32);

const COEFFICIENT: f32 = 0.625;

pub struct Diffuser {
    engine: FxEngine,
}

impl Diffuser {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            engine: FxEngine::new(sample_rate, ARENA),
        }
    }
}

impl StereoEffect for Diffuser {
    fn reset(&mut self) {
        self.engine.clear();
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        let kap = COEFFICIENT;
        let mut c = self.engine.start();

        c.load(in_l);
        c.read_line(APL1, Tap::Tail, kap);
        c.write_all_pass(APL1, Tap::Head, -kap);
        c.read_line(APL2, Tap::Tail, kap);
        c.write_all_pass(APL2, Tap::Head, -kap);
        c.read_line(APL3, Tap::Tail, kap);
        c.write_all_pass(APL3, Tap::Head, -kap);
        c.read_line(APL4, Tap::Tail, kap);
        c.write_all_pass(APL4, Tap::Head, -kap);
        let out_l = c.take();

        c.load(in_r);
        c.read_line(APR1, Tap::Tail, kap);
        c.write_all_pass(APR1, Tap::Head, -kap);
        c.read_line(APR2, Tap::Tail, kap);
        c.write_all_pass(APR2, Tap::Head, -kap);
        c.read_line(APR3, Tap::Tail, kap);
        c.write_all_pass(APR3, Tap::Head, -kap);
        c.read_line(APR4, Tap::Tail, kap);
        c.write_all_pass(APR4, Tap::Head, -kap);
        let out_r = c.take();

        (out_l, out_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::testing;

    #[test]
    fn spreads_an_impulse_in_time() {
        let mut diffuser = Diffuser::new(48_000.0);

        let (first, _) = diffuser.process_sample(1.0, 1.0);
        let mut nonzero = usize::from(first.abs() > 1e-4);
        let mut energy = first * first;
        for _ in 0..4096 {
            let (l, _) = diffuser.process_sample(0.0, 0.0);
            energy += l * l;
            if l.abs() > 1e-4 {
                nonzero += 1;
            }
        }

        // A single click becomes many dispersed arrivals, with roughly the
        // input energy preserved (all-pass chains are lossless).
        assert!(nonzero > 20, "only {nonzero} non-zero output samples");
        assert!(
            (0.5..2.0).contains(&energy),
            "energy not preserved: {energy}"
        );
    }

    #[test]
    fn channels_use_disjoint_lines() {
        let mut diffuser = Diffuser::new(48_000.0);
        // Excite only the left channel; the right must stay silent.
        diffuser.process_sample(1.0, 0.0);
        for _ in 0..4096 {
            let (_, r) = diffuser.process_sample(0.0, 0.0);
            assert_eq!(r, 0.0, "left input leaked into the right channel");
        }
    }

    #[test]
    fn silent_after_reset() {
        testing::assert_silent_after_reset(&mut Diffuser::new(48_000.0));
    }

    #[test]
    fn reset_is_idempotent() {
        testing::assert_reset_idempotent(&mut Diffuser::new(48_000.0));
    }
}
