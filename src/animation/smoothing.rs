//! Exponential lerp used for every noisy signal that drives animation.
//!
//! Factors are per frame. At a fixed display cadence they give a fixed time
//! constant; at a different cadence the motion speeds up or slows down.
//! [`factor_for`] rescales a factor by the real frame delta for hosts that
//! want wall-clock behaviour instead.

use std::time::Duration;

/// `previous + (target - previous) * factor`.
pub fn update(previous: f32, target: f32, factor: f32) -> f32 {
    previous + (target - previous) * factor
}

/// Per-frame `factor` converted to the factor that covers `dt` at
/// `reference_hz`, so `n` short frames and one long frame land together.
pub fn factor_for(factor: f32, dt: Duration, reference_hz: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    let frames = dt.as_secs_f32() * reference_hz;
    if frames <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - factor).powf(frames)
}

/// A scalar that eases toward each new target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SmoothedValue {
    value: f32,
}

impl SmoothedValue {
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn update(&mut self, target: f32, factor: f32) -> f32 {
        self.value = update(self.value, target, factor);
        self.value
    }

    pub fn reset(&mut self, value: f32) {
        self.value = value;
    }
}
