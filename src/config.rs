use std::time::Duration;

use anyhow::ensure;

use crate::consts;

pub const APP_VERSION: &str = "v0.1.0";

#[derive(Clone, PartialEq, Debug)]
pub struct FaceConfig {
    /// Lerp factor applied to raw loudness every frame.
    /// Higher = snappier mouth and glow, lower = lazier.
    pub volume_smoothing: f32,

    /// Lerp factor applied to head yaw and pitch every frame.
    /// Lower = longer, more cinematic head turns.
    pub orientation_smoothing: f32,

    /// Yaw reached at the horizontal edge of the pointer area.
    pub yaw_scale: f32,

    /// Pitch reached at the vertical edge of the pointer area.
    pub pitch_scale: f32,

    /// Probability (0.0 - 1.0) that an eye twitches on a given frame.
    pub jitter_probability: f64,

    /// Width of the twitch window. Offsets land in ±amplitude / 2 per axis.
    pub jitter_amplitude: f32,

    /// Shortest open-eye dwell between blinks, in milliseconds.
    pub blink_min_interval_ms: u64,

    /// Upper (exclusive) bound of the open-eye dwell, in milliseconds.
    pub blink_max_interval_ms: u64,

    /// How long the eyes stay closed, in milliseconds.
    pub blink_closed_ms: u64,

    /// Loudness divisor used for microphone capture.
    pub mic_normalization: f32,

    /// Loudness divisor used for system output loopback.
    pub system_normalization: f32,

    /// Mouth height gained per unit of smoothed volume.
    pub mouth_volume_gain: f32,

    /// Display cadence the smoothing factors were tuned for.
    pub reference_frame_rate: f32,

    /// Rescale smoothing factors by the real frame delta.
    /// Off keeps the classic per-frame behaviour.
    pub frame_rate_independent: bool,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            volume_smoothing: consts::VOLUME_SMOOTHING,
            orientation_smoothing: consts::ORIENTATION_SMOOTHING,
            yaw_scale: consts::YAW_SCALE,
            pitch_scale: consts::PITCH_SCALE,
            jitter_probability: consts::JITTER_PROBABILITY,
            jitter_amplitude: consts::JITTER_AMPLITUDE,
            blink_min_interval_ms: consts::BLINK_MIN_INTERVAL_MS,
            blink_max_interval_ms: consts::BLINK_MAX_INTERVAL_MS,
            blink_closed_ms: consts::BLINK_CLOSED_MS,
            mic_normalization: consts::MIC_NORMALIZATION,
            system_normalization: consts::SYSTEM_NORMALIZATION,
            mouth_volume_gain: 1.0,
            reference_frame_rate: consts::REFERENCE_FRAME_RATE,
            frame_rate_independent: false,
        }
    }
}

impl FaceConfig {
    /// Reject values the animation loop cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, factor) in [
            ("volume_smoothing", self.volume_smoothing),
            ("orientation_smoothing", self.orientation_smoothing),
        ] {
            ensure!(
                factor > 0.0 && factor <= 1.0,
                "{name} must be in (0, 1], got {factor}"
            );
        }
        ensure!(
            (0.0..=1.0).contains(&self.jitter_probability),
            "jitter_probability must be in [0, 1], got {}",
            self.jitter_probability
        );
        ensure!(self.blink_closed_ms > 0, "blink_closed_ms must be positive");
        for (name, norm) in [
            ("mic_normalization", self.mic_normalization),
            ("system_normalization", self.system_normalization),
        ] {
            ensure!(
                norm.is_finite() && norm > 0.0,
                "{name} must be positive, got {norm}"
            );
        }
        ensure!(
            self.reference_frame_rate.is_finite() && self.reference_frame_rate > 0.0,
            "reference_frame_rate must be positive, got {}",
            self.reference_frame_rate
        );
        Ok(())
    }

    pub fn blink_timing(&self) -> BlinkTiming {
        let min = self.blink_min_interval_ms;
        // An empty range would panic the sampler; widen it by a millisecond.
        let max = self.blink_max_interval_ms.max(min.saturating_add(1));
        BlinkTiming {
            open_min: Duration::from_millis(min),
            open_max: Duration::from_millis(max),
            closed: Duration::from_millis(self.blink_closed_ms),
        }
    }

    pub fn normalization_for(&self, kind: crate::audio::SourceKind) -> f32 {
        match kind {
            crate::audio::SourceKind::Microphone => self.mic_normalization,
            crate::audio::SourceKind::SystemOutput => self.system_normalization,
        }
    }
}

/// Blink timings resolved from [`FaceConfig`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlinkTiming {
    pub open_min: Duration,
    pub open_max: Duration,
    pub closed: Duration,
}

impl Default for BlinkTiming {
    fn default() -> Self {
        FaceConfig::default().blink_timing()
    }
}
