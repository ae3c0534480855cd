use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use log::{debug, error, info};
use thiserror::Error;

use crate::audio::analyzer::SpectrumAnalyzer;
use crate::consts;

/// Where loudness is captured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Microphone,
    SystemOutput,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Microphone, SourceKind::SystemOutput];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::SystemOutput => "system output",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no {0} device available")]
    NoDevice(SourceKind),
    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("no usable stream config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build capture stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start capture stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(SampleFormat),
}

const PENDING: u8 = 0;
const LIVE: u8 = 1;
const FAULTED: u8 = 2;

/// Latest mean bin level written by the capture thread, plus whether the
/// stream behind it is still opening, live, or dead.
///
/// The level travels as raw f32 bits in a single atomic so readers always
/// see a whole value.
#[derive(Clone, Debug, Default)]
pub struct CaptureLevel {
    bits: Arc<AtomicU32>,
    state: Arc<AtomicU8>,
}

impl CaptureLevel {
    pub fn store(&self, level: f32) {
        self.bits.store(level.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// The stream is open. A fault that already landed wins.
    pub fn mark_live(&self) {
        let _ = self
            .state
            .compare_exchange(PENDING, LIVE, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Flag the stream as dead and drop the level to silence.
    pub fn mark_faulted(&self) {
        self.state.store(FAULTED, Ordering::Release);
        self.store(0.0);
    }

    pub fn is_live(&self) -> bool {
        self.state.load(Ordering::Acquire) == LIVE
    }

    pub fn is_faulted(&self) -> bool {
        self.state.load(Ordering::Acquire) == FAULTED
    }
}

/// Substrings that identify loopback-capable capture devices.
const LOOPBACK_HINTS: [&str; 5] = ["monitor", "loopback", "stereo mix", "blackhole", "what u hear"];

pub struct AudioStream {
    _stream: cpal::Stream,
    kind: SourceKind,
    device_name: String,
}

impl AudioStream {
    /// Open the device for `kind` and start feeding `level`.
    pub fn open(kind: SourceKind, level: CaptureLevel) -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let (device, supported_config) = match kind {
            SourceKind::Microphone => {
                let device = host
                    .default_input_device()
                    .ok_or(AudioError::NoDevice(kind))?;
                let config = device.default_input_config()?;
                (device, config)
            }
            SourceKind::SystemOutput => find_loopback_device(&host)?,
        };

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.into();

        debug!(
            "Opening {kind} capture on '{device_name}': {} ch @ {} Hz, {sample_format:?}",
            stream_config.channels, stream_config.sample_rate.0
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, level)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, level)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, level)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };

        stream.play()?;
        info!("Listening to {kind} via '{device_name}'");

        Ok(Self {
            _stream: stream,
            kind,
            device_name,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Prefer a dedicated monitor/loopback input. Otherwise fall back to the
/// default output device, which hosts such as WASAPI capture in loopback.
fn find_loopback_device(
    host: &cpal::Host,
) -> Result<(cpal::Device, cpal::SupportedStreamConfig), AudioError> {
    let monitor = host.input_devices()?.find(|d| {
        d.name()
            .map(|name| is_loopback_name(&name))
            .unwrap_or(false)
    });

    if let Some(device) = monitor {
        let config = device.default_input_config()?;
        return Ok((device, config));
    }

    let device = host
        .default_output_device()
        .ok_or(AudioError::NoDevice(SourceKind::SystemOutput))?;
    let config = device.default_output_config()?;
    Ok((device, config))
}

pub fn is_loopback_name(name: &str) -> bool {
    let name = name.to_lowercase();
    LOOPBACK_HINTS.iter().any(|hint| name.contains(hint))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    level: CaptureLevel,
) -> Result<cpal::Stream, AudioError>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    let mut analyzer = SpectrumAnalyzer::new(consts::ANALYSIS_SIZE);
    let fault = level.clone();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Downmix interleaved frames to mono
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
                analyzer.push(sum / frame.len() as f32);
            }
            if let Some(mean) = analyzer.mean_bin_level() {
                level.store(mean);
            }
        },
        move |err| {
            error!("Capture stream error: {err}");
            fault.mark_faulted();
        },
        None,
    )?;

    Ok(stream)
}
