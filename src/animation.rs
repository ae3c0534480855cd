pub mod blink;
pub mod jitter;
pub mod orientation;
pub mod smoothing;

pub use blink::{BlinkCycle, BlinkPhase, BlinkScheduler, BlinkState, BlinkStep};
pub use jitter::JitterGenerator;
pub use orientation::{OrientationAngles, PointerOrientationTracker, PointerTarget};
pub use smoothing::SmoothedValue;
