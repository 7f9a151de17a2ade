/// Sine oscillator whose phase increment is randomized every sample.
///
/// At low magnitude the output is a slightly unstable sine, which is what
/// a worn tape transport does to a delay time. The tape delay scales this
/// into its read position to get wow/flutter.
pub struct JitterGenerator {
    sample_rate: f32,
    speed_hz: f32,
    magnitude: f32,
    phase: f32,
    phase_increment: f32,
    rng: u32,
}

const JITTER_SEED: u32 = 0x00C0_FFEE;

impl JitterGenerator {
    pub fn new(sample_rate: f32) -> Self {
        let mut jitter = Self {
            sample_rate,
            speed_hz: 0.0,
            magnitude: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            rng: JITTER_SEED,
        };
        jitter.set_speed(1.0);
        jitter.set_magnitude(0.1);
        jitter
    }

    pub fn set_speed(&mut self, hz: f32) {
        if self.speed_hz != hz {
            self.speed_hz = hz;
            self.phase_increment = std::f32::consts::TAU * hz / self.sample_rate;
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed_hz
    }

    /// How strongly the phase increment is randomized (0 = pure sine).
    pub fn set_magnitude(&mut self, magnitude: f32) {
        self.magnitude = magnitude;
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rng = JITTER_SEED;
    }

    pub fn process(&mut self) -> f32 {
        let out = self.phase.sin();

        self.rng = self.rng.wrapping_mul(1103515245).wrapping_add(12345);
        let noise = ((self.rng >> 16) as f32 / 32768.0) - 1.0;
        self.phase += self.phase_increment * (1.0 + self.magnitude * noise);
        if self.phase > std::f32::consts::TAU {
            self.phase -= std::f32::consts::TAU;
        }

        out
    }
}
