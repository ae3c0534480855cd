//! Combines every animation signal into the per-frame render parameters.

use glam::Vec2;
use rand::Rng;

use crate::animation::OrientationAngles;
use crate::config::FaceConfig;
use crate::consts::{self, EYE_COUNT, MOUTH_BAR_COUNT};
use crate::expression::{EyeShape, Mode, Rgb};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthParams {
    /// Whole-mouth vertical scale, `1 + volume * gain`.
    pub scale_y: f32,
    pub bar_heights: [f32; MOUTH_BAR_COUNT],
    pub bar_rotations: [f32; MOUTH_BAR_COUNT],
    pub bar_width: f32,
    pub bar_spacing: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParameterSnapshot {
    pub mode: Mode,
    pub color: Rgb,
    pub eye_shape: EyeShape,
    /// Eye scale per axis. `y` collapses while blinking.
    pub eye_scale: Vec2,
    pub blink_scale_y: f32,
    pub blinking: bool,
    pub glow_opacity: f32,
    pub mouth: MouthParams,
    /// Left eye, then right eye.
    pub jitter: [Vec2; EYE_COUNT],
    pub orientation: OrientationAngles,
}

impl Default for RenderParameterSnapshot {
    fn default() -> Self {
        let style = Mode::Normal.style();
        Self {
            mode: Mode::Normal,
            color: style.color,
            eye_shape: style.eye,
            eye_scale: Vec2::ONE,
            blink_scale_y: 1.0,
            blinking: false,
            glow_opacity: consts::GLOW_BASE_OPACITY,
            mouth: MouthParams {
                scale_y: 1.0,
                bar_heights: [style.mouth.base_height; MOUTH_BAR_COUNT],
                bar_rotations: [0.0; MOUTH_BAR_COUNT],
                bar_width: style.mouth.bar_width,
                bar_spacing: style.mouth.bar_spacing,
            },
            jitter: [Vec2::ZERO; EYE_COUNT],
            orientation: OrientationAngles::default(),
        }
    }
}

/// One frame's worth of controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInputs {
    pub mode: Mode,
    pub smoothed_volume: f32,
    pub blinking: bool,
    pub jitter: [Vec2; EYE_COUNT],
    pub orientation: OrientationAngles,
}

/// Stateless apart from its tuning. The mouth flicker draws from the
/// caller's RNG and is never smoothed.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryParameterMapper {
    eye_volume_gain: f32,
    eye_scale_max: f32,
    glow_volume_gain: f32,
    glow_max_opacity: f32,
    mouth_volume_gain: f32,
}

impl GeometryParameterMapper {
    pub fn new(config: &FaceConfig) -> Self {
        Self {
            eye_volume_gain: consts::EYE_VOLUME_GAIN,
            eye_scale_max: consts::EYE_SCALE_MAX,
            glow_volume_gain: consts::GLOW_VOLUME_GAIN,
            glow_max_opacity: consts::GLOW_MAX_OPACITY,
            mouth_volume_gain: config.mouth_volume_gain.max(0.0),
        }
    }

    pub fn compute<R: Rng>(
        &self,
        inputs: &FrameInputs,
        rng: &mut R,
    ) -> RenderParameterSnapshot {
        let mut snapshot = RenderParameterSnapshot::default();
        self.compute_into(&mut snapshot, inputs, rng);
        snapshot
    }

    /// Overwrite `out` in place with this frame's parameters.
    pub fn compute_into<R: Rng>(
        &self,
        out: &mut RenderParameterSnapshot,
        inputs: &FrameInputs,
        rng: &mut R,
    ) {
        let style = inputs.mode.style();
        let volume = clean_volume(inputs.smoothed_volume);

        let eye_scale = self.eye_scale(volume);
        let blink_scale_y = if inputs.blinking {
            consts::BLINK_SQUASH
        } else {
            1.0
        };

        out.mode = inputs.mode;
        out.color = style.color;
        out.eye_shape = style.eye;
        out.eye_scale = Vec2::new(
            eye_scale,
            if inputs.blinking {
                consts::BLINK_SQUASH
            } else {
                eye_scale
            },
        );
        out.blink_scale_y = blink_scale_y;
        out.blinking = inputs.blinking;
        out.glow_opacity = self.glow_opacity(volume);
        out.jitter = inputs.jitter;
        out.orientation = inputs.orientation;

        let mouth = &mut out.mouth;
        mouth.scale_y = 1.0 + volume * self.mouth_volume_gain;
        mouth.bar_width = style.mouth.bar_width;
        mouth.bar_spacing = style.mouth.bar_spacing;
        for (i, (height, rotation)) in mouth
            .bar_heights
            .iter_mut()
            .zip(mouth.bar_rotations.iter_mut())
            .enumerate()
        {
            let flicker: f32 = rng.gen_range(0.0..consts::MOUTH_FLICKER);
            *height = style.mouth.base_height * (1.0 + volume * self.mouth_volume_gain * flicker);
            *rotation = if i % 2 == 0 {
                style.mouth.tilt
            } else {
                -style.mouth.tilt
            };
        }
    }

    /// Audio-driven eye scale. Non-decreasing in `volume`, capped.
    pub fn eye_scale(&self, volume: f32) -> f32 {
        (1.0 + clean_volume(volume) * self.eye_volume_gain).min(self.eye_scale_max)
    }

    /// Glow plane opacity. Non-decreasing in `volume`, capped.
    pub fn glow_opacity(&self, volume: f32) -> f32 {
        (consts::GLOW_BASE_OPACITY + clean_volume(volume) * self.glow_volume_gain)
            .min(self.glow_max_opacity)
    }
}

impl Default for GeometryParameterMapper {
    fn default() -> Self {
        Self::new(&FaceConfig::default())
    }
}

fn clean_volume(volume: f32) -> f32 {
    if volume.is_finite() { volume.max(0.0) } else { 0.0 }
}
