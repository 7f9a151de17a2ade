use crate::fx::StereoEffect;

/*
Tube Saturator
==============

A single memoryless tanh nonlinearity. Drive scales the input into the
curve and the output is renormalized by 1/tanh(gain), so a full-scale
input comes out at full scale for every drive setting; turning the knob
changes the shape of the clipping, not the peak level.

  drive 0.0   gain 1,  gentle rounding only near full scale
  drive 1.0   gain 10, hard tape-style squash
*/

const MAX_EXTRA_GAIN: f32 = 9.0;

pub struct Tube {
    drive: f32,
    gain: f32,
    makeup: f32,
}

impl Tube {
    pub fn new(_sample_rate: f32) -> Self {
        let mut tube = Tube {
            drive: -1.0,
            gain: 1.0,
            makeup: 1.0,
        };
        tube.set_drive(0.0);
        tube
    }

    pub fn set_drive(&mut self, drive: f32) {
        let drive = drive.clamp(0.0, 1.0);
        if self.drive != drive {
            self.drive = drive;
            self.gain = 1.0 + drive * MAX_EXTRA_GAIN;
            self.makeup = 1.0 / self.gain.tanh();
        }
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }
}

impl StereoEffect for Tube {
    fn reset(&mut self) {
        // Memoryless; nothing to clear.
    }

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        (
            (in_l * self.gain).tanh() * self.makeup,
            (in_r * self.gain).tanh() * self.makeup,
        )
    }
}
