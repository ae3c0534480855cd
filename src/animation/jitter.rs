use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Occasional single-frame twitch, like a loose connector.
///
/// Each tick rolls independently. A hit returns a fresh random offset, a
/// miss snaps straight back to zero. Nothing carries over between frames.
pub struct JitterGenerator {
    rng: StdRng,
    probability: f64,
    amplitude: f32,
}

impl JitterGenerator {
    pub fn new(probability: f64, amplitude: f32) -> Self {
        Self::with_rng(StdRng::from_entropy(), probability, amplitude)
    }

    pub fn seeded(seed: u64, probability: f64, amplitude: f32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), probability, amplitude)
    }

    fn with_rng(rng: StdRng, probability: f64, amplitude: f32) -> Self {
        let mut generator = Self {
            rng,
            probability: 0.0,
            amplitude: 0.0,
        };
        generator.set_probability(probability);
        generator.set_amplitude(amplitude);
        generator
    }

    pub fn tick(&mut self) -> Vec2 {
        if !self.rng.gen_bool(self.probability) {
            return Vec2::ZERO;
        }
        let half = self.bound();
        Vec2::new(
            self.rng.gen_range(-half..=half),
            self.rng.gen_range(-half..=half),
        )
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = if amplitude.is_finite() {
            amplitude.abs()
        } else {
            0.0
        };
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Largest per-axis offset a twitch can produce.
    pub fn bound(&self) -> f32 {
        self.amplitude * 0.5
    }
}
