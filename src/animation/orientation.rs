use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

use crate::animation::smoothing;

/// Smoothed head rotation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrientationAngles {
    pub yaw: f32,
    pub pitch: f32,
}

/// Last known pointer position in [-1, 1]², shared with input handlers.
///
/// Both coordinates are packed into one atomic word, so a reader never sees
/// x from one event and y from another. Writes simply overwrite.
#[derive(Clone, Debug, Default)]
pub struct PointerTarget(Arc<AtomicU64>);

impl PointerTarget {
    pub fn set(&self, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        let p = position.clamp(Vec2::NEG_ONE, Vec2::ONE);
        let packed = (u64::from(p.x.to_bits()) << 32) | u64::from(p.y.to_bits());
        self.0.store(packed, Ordering::Release);
    }

    /// Store a position given in device pixels, origin top-left.
    pub fn set_from_pixels(&self, x: f32, y: f32, width: f32, height: f32) {
        if let Some(position) = normalize_pointer(x, y, width, height) {
            self.set(position);
        }
    }

    pub fn get(&self) -> Vec2 {
        let packed = self.0.load(Ordering::Acquire);
        Vec2::new(
            f32::from_bits((packed >> 32) as u32),
            f32::from_bits(packed as u32),
        )
    }
}

/// Pixels to [-1, 1]² with screen-down mapped to negative Y.
pub fn normalize_pointer(x: f32, y: f32, width: f32, height: f32) -> Option<Vec2> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let nx = x / width * 2.0 - 1.0;
    let ny = -(y / height * 2.0 - 1.0);
    Some(Vec2::new(nx, ny).clamp(Vec2::NEG_ONE, Vec2::ONE))
}

/// Eases the head toward wherever the pointer is.
pub struct PointerOrientationTracker {
    angles: OrientationAngles,
    yaw_scale: f32,
    pitch_scale: f32,
    factor: f32,
}

impl PointerOrientationTracker {
    pub fn new(yaw_scale: f32, pitch_scale: f32, factor: f32) -> Self {
        Self {
            angles: OrientationAngles::default(),
            yaw_scale,
            pitch_scale,
            factor,
        }
    }

    pub fn target_for(&self, pointer: Vec2) -> OrientationAngles {
        OrientationAngles {
            yaw: pointer.x * self.yaw_scale,
            pitch: -pointer.y * self.pitch_scale,
        }
    }

    pub fn update(&mut self, pointer: Vec2) -> OrientationAngles {
        self.update_with_factor(pointer, self.factor)
    }

    pub fn update_with_factor(&mut self, pointer: Vec2, factor: f32) -> OrientationAngles {
        let target = self.target_for(pointer);
        self.angles.yaw = smoothing::update(self.angles.yaw, target.yaw, factor);
        self.angles.pitch = smoothing::update(self.angles.pitch, target.pitch, factor);
        self.angles
    }

    pub fn angles(&self) -> OrientationAngles {
        self.angles
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn configure(&mut self, yaw_scale: f32, pitch_scale: f32, factor: f32) {
        self.yaw_scale = yaw_scale;
        self.pitch_scale = pitch_scale;
        self.factor = factor;
    }
}
