use std::time::Duration;

use glam::Vec2;
use log::{debug, error, info, trace, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::animation::smoothing;
use crate::animation::{
    BlinkScheduler, BlinkState, JitterGenerator, PointerOrientationTracker, PointerTarget,
    SmoothedValue,
};
use crate::audio::{AudioStatus, CaptureLevel, SourceKind, VolumeExtractor};
use crate::config::FaceConfig;
use crate::expression::{ExpressionStateMachine, Mode};
use crate::mapper::{FrameInputs, GeometryParameterMapper, RenderParameterSnapshot};

/// One animated face. Call [`Controller::update`] once per displayed frame.
pub struct Controller {
    config: FaceConfig,
    seed: Option<u64>,
    expression: ExpressionStateMachine,
    volume: VolumeExtractor,
    smoothed_volume: SmoothedValue,
    raw_volume: f32,
    pointer: PointerTarget,
    tracker: PointerOrientationTracker,
    jitter: JitterGenerator,
    blink: BlinkScheduler,
    mapper: GeometryParameterMapper,
    rng: StdRng,
    snapshot: RenderParameterSnapshot,
    frame_count: u64,
}

impl Controller {
    pub fn new(config: FaceConfig) -> anyhow::Result<Self> {
        Self::build(config, None)
    }

    /// Deterministic randomness for jitter, blinks and mouth flicker.
    pub fn with_seed(config: FaceConfig, seed: u64) -> anyhow::Result<Self> {
        Self::build(config, Some(seed))
    }

    fn build(config: FaceConfig, seed: Option<u64>) -> anyhow::Result<Self> {
        debug!("Initializing controller: {config:?}");
        config.validate()?;

        let blink = BlinkScheduler::start(config.blink_timing(), blink_seed(seed))?;
        let (jitter, rng) = match seed {
            Some(seed) => (
                JitterGenerator::seeded(seed, config.jitter_probability, config.jitter_amplitude),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (
                JitterGenerator::new(config.jitter_probability, config.jitter_amplitude),
                StdRng::from_entropy(),
            ),
        };

        Ok(Self {
            tracker: PointerOrientationTracker::new(
                config.yaw_scale,
                config.pitch_scale,
                config.orientation_smoothing,
            ),
            mapper: GeometryParameterMapper::new(&config),
            config,
            seed,
            expression: ExpressionStateMachine::new(),
            volume: VolumeExtractor::new(),
            smoothed_volume: SmoothedValue::default(),
            raw_volume: 0.0,
            pointer: PointerTarget::default(),
            jitter,
            blink,
            rng,
            snapshot: RenderParameterSnapshot::default(),
            frame_count: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        self.expression.mode()
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        self.expression.set(mode)
    }

    pub fn set_mode_by_name(&mut self, name: &str) -> bool {
        self.expression.set_by_name(name)
    }

    /// Handle for input handlers that may live on other threads.
    pub fn pointer(&self) -> PointerTarget {
        self.pointer.clone()
    }

    pub fn set_pointer(&self, position: Vec2) {
        self.pointer.set(position);
    }

    /// Switch the capture source, or turn capture off with `None`.
    /// Only the extractor restarts; everything else keeps running. The
    /// device opens in the background, so a new source reports `Starting`.
    pub fn set_audio_source(&mut self, source: Option<SourceKind>) -> AudioStatus {
        match source {
            Some(kind) => {
                let normalization = self.config.normalization_for(kind);
                self.volume.start(kind, normalization);
            }
            None => self.volume.stop(),
        }
        let status = self.volume.status();
        info!("Audio status: {status:?}");
        status
    }

    /// Read loudness from a level fed by the host's own capture path.
    pub fn attach_audio_level(&mut self, kind: SourceKind, level: CaptureLevel) {
        let normalization = self.config.normalization_for(kind);
        self.volume.attach(kind, level, normalization);
    }

    pub fn audio_status(&self) -> AudioStatus {
        self.volume.status()
    }

    pub fn blink_state(&self) -> BlinkState {
        self.blink.state()
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.is_blinking()
    }

    /// Sample the live inputs and produce this frame's parameters.
    pub fn update(&mut self, dt: Duration) -> &RenderParameterSnapshot {
        let raw = self.volume.sample();
        self.advance(raw, dt)
    }

    /// Same as [`Controller::update`] with the loudness supplied directly.
    pub fn advance(&mut self, raw_volume: f32, dt: Duration) -> &RenderParameterSnapshot {
        let raw_volume = if raw_volume.is_finite() { raw_volume } else { 0.0 };
        let (volume_factor, orientation_factor) = self.frame_factors(dt);

        self.raw_volume = raw_volume;
        let smoothed = self.smoothed_volume.update(raw_volume, volume_factor);
        let orientation = self
            .tracker
            .update_with_factor(self.pointer.get(), orientation_factor);
        let jitter = [self.jitter.tick(), self.jitter.tick()];

        let inputs = FrameInputs {
            mode: self.expression.mode(),
            smoothed_volume: smoothed,
            blinking: self.blink.is_blinking(),
            jitter,
            orientation,
        };
        self.mapper
            .compute_into(&mut self.snapshot, &inputs, &mut self.rng);
        self.frame_count += 1;

        trace!(
            "Frame {}: raw={raw_volume:.3} smoothed={smoothed:.3} blink={}",
            self.frame_count, inputs.blinking
        );
        &self.snapshot
    }

    fn frame_factors(&self, dt: Duration) -> (f32, f32) {
        let config = &self.config;
        if !config.frame_rate_independent {
            return (config.volume_smoothing, config.orientation_smoothing);
        }
        let hz = config.reference_frame_rate;
        (
            smoothing::factor_for(config.volume_smoothing, dt, hz),
            smoothing::factor_for(config.orientation_smoothing, dt, hz),
        )
    }

    pub fn snapshot(&self) -> &RenderParameterSnapshot {
        &self.snapshot
    }

    pub fn smoothed_volume(&self) -> f32 {
        self.smoothed_volume.value()
    }

    pub fn raw_volume(&self) -> f32 {
        self.raw_volume
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    /// Retune in place. Blink timing changes restart the blink chain;
    /// normalization changes apply to the live source without reopening it.
    /// On error nothing has changed.
    pub fn apply_config(&mut self, config: FaceConfig) -> anyhow::Result<()> {
        if config == self.config {
            return Ok(());
        }
        debug!("Applying config: {config:?}");
        config.validate()?;

        if config.blink_timing() != self.config.blink_timing() {
            debug!("Blink timing changed, restarting scheduler");
            self.restart_blink(&config)?;
        }

        self.tracker.configure(
            config.yaw_scale,
            config.pitch_scale,
            config.orientation_smoothing,
        );
        self.jitter.set_probability(config.jitter_probability);
        self.jitter.set_amplitude(config.jitter_amplitude);
        self.mapper = GeometryParameterMapper::new(&config);

        if let Some(kind) = self.volume.source() {
            self.volume.set_normalization(config.normalization_for(kind));
        }

        self.config = config;
        info!("Config applied");
        Ok(())
    }

    fn restart_blink(&mut self, config: &FaceConfig) -> anyhow::Result<()> {
        let state = self.blink.state();
        let seed = blink_seed(self.seed);
        self.blink.stop();

        match BlinkScheduler::start_with_state(config.blink_timing(), seed, state.clone()) {
            Ok(blink) => {
                self.blink = blink;
                Ok(())
            }
            Err(err) => {
                warn!("Blink restart failed, keeping previous timing: {err:#}");
                match BlinkScheduler::start_with_state(self.config.blink_timing(), seed, state) {
                    Ok(blink) => self.blink = blink,
                    Err(err) => error!("Previous blink timing could not resume: {err:#}"),
                }
                Err(err)
            }
        }
    }

    /// Cancel the blink chain and release audio capture.
    pub fn stop(&mut self) {
        if !self.blink.is_running() && self.volume.source().is_none() {
            return;
        }
        debug!("Stopping controller...");
        self.blink.stop();
        self.volume.shutdown();
        info!("Controller stopped after {} frames", self.frame_count);
    }

    pub fn is_running(&self) -> bool {
        self.blink.is_running()
    }
}

fn blink_seed(seed: Option<u64>) -> Option<u64> {
    seed.map(|s| s ^ 0xB11E)
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}
