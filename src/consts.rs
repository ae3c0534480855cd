/// Display cadence the per-frame smoothing factors were tuned for.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Lerp factor for loudness. Fast-reacting.
pub const VOLUME_SMOOTHING: f32 = 0.5;

/// Lerp factor for head orientation. Slow and eased.
pub const ORIENTATION_SMOOTHING: f32 = 0.1;

/// Yaw (radians) reached when the pointer sits on the right edge.
pub const YAW_SCALE: f32 = 0.6;

/// Pitch (radians) reached when the pointer sits on the bottom edge.
pub const PITCH_SCALE: f32 = 0.4;

/// Chance per frame that an eye twitches.
pub const JITTER_PROBABILITY: f64 = 0.01;

/// Full width of the twitch window. Each axis lands in ±amplitude / 2.
pub const JITTER_AMPLITUDE: f32 = 0.03;

/// Open-eye dwell is drawn uniformly from [min, max).
pub const BLINK_MIN_INTERVAL_MS: u64 = 2000;
pub const BLINK_MAX_INTERVAL_MS: u64 = 5000;

/// How long the eyes stay shut.
pub const BLINK_CLOSED_MS: u64 = 150;

/// Vertical eye squash while blinking.
pub const BLINK_SQUASH: f32 = 0.05;

/// Samples per analysis window. Must be a power of 2 for FFT.
/// 128 samples yield 64 usable frequency bins.
pub const ANALYSIS_SIZE: usize = 128;

/// Magnitude window mapped onto the 0..=255 byte scale, in dB.
/// Matches the range browsers use for analyser byte data.
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

/// Divisors applied to the mean bin byte. System audio buses run hotter
/// than microphone capture, so they get the bigger divisor.
pub const MIC_NORMALIZATION: f32 = 128.0;
pub const SYSTEM_NORMALIZATION: f32 = 180.0;

/// Eye scale gained per unit of smoothed volume, and where it stops.
pub const EYE_VOLUME_GAIN: f32 = 0.35;
pub const EYE_SCALE_MAX: f32 = 1.8;

/// Glow backing plane opacity at silence, gain per unit volume, ceiling.
pub const GLOW_BASE_OPACITY: f32 = 0.15;
pub const GLOW_VOLUME_GAIN: f32 = 0.4;
pub const GLOW_MAX_OPACITY: f32 = 0.85;

/// Per-bar mouth flicker is drawn from [0, MOUTH_FLICKER).
pub const MOUTH_FLICKER: f32 = 1.0;

/// Number of bars making up the mouth visualizer.
pub const MOUTH_BAR_COUNT: usize = 7;

pub const EYE_COUNT: usize = 2;

/// Eye centres in head space (x, y), left then right.
pub const EYE_POSITIONS: [[f32; 2]; EYE_COUNT] = [[-0.5, 0.5], [0.5, 0.5]];

/// Outward yaw of each eye so they wrap around the mask.
pub const EYE_SPLAY: [f32; EYE_COUNT] = [-0.2, 0.2];

/// Side of the square glow plane behind each eye.
pub const GLOW_PLANE_SIZE: f32 = 0.4;

/// Mouth centre in head space (x, y).
pub const MOUTH_POSITION: [f32; 2] = [0.0, -0.45];
