use crate::fx::StereoEffect;

/// Does nothing, on purpose.
///
/// The mixing console's main bus runs the same unit lifecycle as every
/// effect bus; this is the processor that sits there so the per-sample
/// loop stays uniform.
pub struct Dry;

impl Dry {
    pub fn new(_sample_rate: f32) -> Self {
        Dry
    }
}

impl StereoEffect for Dry {
    fn reset(&mut self) {}

    fn process_sample(&mut self, in_l: f32, in_r: f32) -> (f32, f32) {
        (in_l, in_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_samples_through_unchanged() {
        let mut dry = Dry::new(48_000.0);
        assert_eq!(dry.process_sample(0.123, -0.456), (0.123, -0.456));
        dry.reset();
        assert_eq!(dry.process_sample(1.0, 1.0), (1.0, 1.0));
    }
}
