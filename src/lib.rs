//! Reactive animation controller for a glitchy hacker-mask face.
//!
//! The controller ingests audio loudness, pointer position, discrete mode
//! switches and wall-clock timers, and emits one [`RenderParameterSnapshot`]
//! per displayed frame for whatever renderer sits on top of it.

pub mod animation;
pub mod audio;
pub mod config;
pub mod consts;
pub mod controller;
pub mod expression;
pub mod mapper;

pub use audio::{AudioError, AudioStatus, SourceKind, VolumeExtractor};
pub use config::FaceConfig;
pub use controller::Controller;
pub use expression::{ExpressionStateMachine, Mode};
pub use mapper::{GeometryParameterMapper, RenderParameterSnapshot};
