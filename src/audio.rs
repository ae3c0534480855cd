pub mod analyzer;
pub mod audio_stream;
pub mod volume;

pub use analyzer::SpectrumAnalyzer;
pub use audio_stream::{AudioError, AudioStream, CaptureLevel, SourceKind};
pub use volume::{AudioStatus, VolumeExtractor};
