//! Discrete expression modes and the static look of each one.

use std::f32::consts::FRAC_PI_4;
use std::fmt;

use log::{info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Angry,
    Shock,
    Suspicious,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Normal, Mode::Angry, Mode::Shock, Mode::Suspicious];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Angry => "angry",
            Self::Shock => "shock",
            Self::Suspicious => "suspicious",
        }
    }

    /// Parse a mode name. Anything unknown falls back to `Normal`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "normal" => Self::Normal,
            "angry" => Self::Angry,
            "shock" | "shocked" => Self::Shock,
            "sus" | "suspicious" => Self::Suspicious,
            other => {
                warn!("Unknown mode '{other}', falling back to normal");
                Self::Normal
            }
        }
    }

    /// Zero-based index into [`Mode::ALL`]. Out of range falls back to `Normal`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_else(|| {
            warn!("Mode index {index} out of range, falling back to normal");
            Self::Normal
        })
    }

    /// Keys `1`..`4` select a mode; other keys are not mode events.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::Normal),
            '2' => Some(Self::Angry),
            '3' => Some(Self::Shock),
            '4' => Some(Self::Suspicious),
            _ => None,
        }
    }

    pub fn style(&self) -> &'static ExpressionStyle {
        &EXPRESSIONS[*self as usize]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }
}

pub const NEON_GREEN: Rgb = Rgb::from_hex(0x39FF14);
pub const RED: Rgb = Rgb::from_hex(0xFF003C);
pub const CYAN: Rgb = Rgb::from_hex(0x00FFFF);
pub const YELLOW: Rgb = Rgb::from_hex(0xFFFF00);

/// Declarative eye geometry, in eye-local units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EyeShape {
    /// Two strokes leaning into a `^`, mirrored about the eye centre.
    Caret {
        stroke_width: f32,
        stroke_length: f32,
        spread: f32,
        drop: f32,
        tilt: f32,
    },
    /// Two bars crossing in an `X`.
    CrossedBars {
        bar_width: f32,
        bar_length: f32,
        tilt: f32,
    },
    /// Polygonal ring; four segments reads as a square outline.
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
        rotation: f32,
    },
    /// One flat, narrow bar.
    FlatBar { width: f32, height: f32 },
}

/// Mouth bar layout. `tilt` flips sign on every other bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthStyle {
    pub base_height: f32,
    pub bar_width: f32,
    pub bar_spacing: f32,
    pub tilt: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpressionStyle {
    pub mode: Mode,
    pub color: Rgb,
    pub eye: EyeShape,
    pub mouth: MouthStyle,
}

/// Indexed by `Mode as usize`.
pub static EXPRESSIONS: [ExpressionStyle; 4] = [
    ExpressionStyle {
        mode: Mode::Normal,
        color: NEON_GREEN,
        eye: EyeShape::Caret {
            stroke_width: 0.06,
            stroke_length: 0.25,
            spread: 0.08,
            drop: -0.05,
            tilt: FRAC_PI_4,
        },
        mouth: MouthStyle {
            base_height: 0.04,
            bar_width: 0.05,
            bar_spacing: 0.08,
            tilt: 0.0,
        },
    },
    ExpressionStyle {
        mode: Mode::Angry,
        color: RED,
        eye: EyeShape::CrossedBars {
            bar_width: 0.08,
            bar_length: 0.35,
            tilt: FRAC_PI_4,
        },
        mouth: MouthStyle {
            base_height: 0.06,
            bar_width: 0.05,
            bar_spacing: 0.08,
            tilt: 0.5,
        },
    },
    ExpressionStyle {
        mode: Mode::Shock,
        color: CYAN,
        eye: EyeShape::Ring {
            inner_radius: 0.12,
            outer_radius: 0.18,
            segments: 4,
            rotation: FRAC_PI_4,
        },
        mouth: MouthStyle {
            base_height: 0.12,
            bar_width: 0.05,
            bar_spacing: 0.07,
            tilt: 0.0,
        },
    },
    ExpressionStyle {
        mode: Mode::Suspicious,
        color: YELLOW,
        eye: EyeShape::FlatBar {
            width: 0.25,
            height: 0.08,
        },
        mouth: MouthStyle {
            base_height: 0.025,
            bar_width: 0.04,
            bar_spacing: 0.06,
            tilt: 0.0,
        },
    },
];

/// Holds the active mode. Changes only on explicit requests.
#[derive(Debug, Default)]
pub struct ExpressionStateMachine {
    mode: Mode,
}

impl ExpressionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns `false` if `mode` is already active.
    pub fn set(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!("Expression {} -> {}", self.mode, mode);
        self.mode = mode;
        true
    }

    pub fn set_by_name(&mut self, name: &str) -> bool {
        self.set(Mode::from_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_mode() {
        for mode in Mode::ALL {
            assert_eq!(mode.style().mode, mode);
        }
    }

    #[test]
    fn palette_matches_hex_codes() {
        assert_eq!(Mode::Normal.style().color, Rgb { r: 0x39, g: 0xFF, b: 0x14 });
        assert_eq!(Mode::Angry.style().color, Rgb { r: 0xFF, g: 0x00, b: 0x3C });
        assert_eq!(Mode::Shock.style().color, Rgb { r: 0x00, g: 0xFF, b: 0xFF });
        assert_eq!(Mode::Suspicious.style().color, Rgb { r: 0xFF, g: 0xFF, b: 0x00 });
    }

    #[test]
    fn unknown_names_fail_closed() {
        assert_eq!(Mode::from_name("ANGRY"), Mode::Angry);
        assert_eq!(Mode::from_name("sus"), Mode::Suspicious);
        assert_eq!(Mode::from_name("furious"), Mode::Normal);
        assert_eq!(Mode::from_name(""), Mode::Normal);
        assert_eq!(Mode::from_index(2), Mode::Shock);
        assert_eq!(Mode::from_index(17), Mode::Normal);
    }

    #[test]
    fn number_keys_select_modes() {
        assert_eq!(Mode::from_key('1'), Some(Mode::Normal));
        assert_eq!(Mode::from_key('4'), Some(Mode::Suspicious));
        assert_eq!(Mode::from_key('5'), None);
        assert_eq!(Mode::from_key('a'), None);
    }

    #[test]
    fn transitions_only_on_request() {
        let mut machine = ExpressionStateMachine::new();
        assert_eq!(machine.mode(), Mode::Normal);
        assert!(!machine.set(Mode::Normal));
        assert!(machine.set(Mode::Shock));
        assert!(!machine.set(Mode::Shock));
        assert_eq!(machine.mode(), Mode::Shock);
        assert!(machine.set_by_name("bogus"));
        assert_eq!(machine.mode(), Mode::Normal);
    }
}
