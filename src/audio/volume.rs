use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender};
use log::{debug, error, info, warn};

use crate::audio::audio_stream::{AudioError, AudioStream, CaptureLevel, SourceKind};
use crate::consts;

/// Capture state reported to the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioStatus {
    #[default]
    Off,
    /// Device is being opened off the frame thread.
    Starting(SourceKind),
    Listening(SourceKind),
    Unavailable(SourceKind),
}

impl AudioStatus {
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listening(_))
    }
}

/// Capture thread that owns the device stream for as long as it runs.
struct CaptureWorker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

struct Capture {
    kind: SourceKind,
    level: CaptureLevel,
    worker: Option<CaptureWorker>,
}

/// Turns the capture thread's latest mean bin level into a normalized
/// loudness scalar. Reports constant 0 while no source is live.
pub struct VolumeExtractor {
    capture: Option<Capture>,
    retired: Vec<JoinHandle<()>>,
    normalization: f32,
}

impl VolumeExtractor {
    pub fn new() -> Self {
        Self {
            capture: None,
            retired: Vec::new(),
            normalization: consts::MIC_NORMALIZATION,
        }
    }

    /// Open `kind` on a capture thread and return immediately. The status
    /// reads `Starting` until the device answers; a failure leaves the
    /// extractor silent and `Unavailable` until the next start.
    pub fn start(&mut self, kind: SourceKind, normalization: f32) {
        self.start_with(kind, normalization, AudioStream::open);
    }

    /// [`VolumeExtractor::start`] with a custom opener. Whatever the opener
    /// returns is kept alive on the capture thread until the source stops.
    pub fn start_with<F, G>(&mut self, kind: SourceKind, normalization: f32, open: F)
    where
        F: FnOnce(SourceKind, CaptureLevel) -> Result<G, AudioError> + Send + 'static,
        G: 'static,
    {
        self.stop();
        self.normalization = normalization;

        let level = CaptureLevel::default();
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        debug!("Spawning {kind} capture thread");
        let spawned = {
            let level = level.clone();
            thread::Builder::new()
                .name("audio-capture".into())
                .spawn(move || {
                    let _stream = match open(kind, level.clone()) {
                        Ok(stream) => {
                            level.mark_live();
                            stream
                        }
                        Err(err) => {
                            warn!("Audio {kind} unavailable, continuing without it: {err}");
                            level.mark_faulted();
                            return;
                        }
                    };
                    // Hold the stream until the extractor lets go
                    let _ = stop_rx.recv();
                    debug!("Capture thread for {kind} shutting down");
                })
        };

        let worker = match spawned {
            Ok(handle) => Some(CaptureWorker { stop_tx, handle }),
            Err(err) => {
                error!("Failed to spawn capture thread: {err}");
                level.mark_faulted();
                None
            }
        };

        self.capture = Some(Capture {
            kind,
            level,
            worker,
        });
    }

    /// Read from a level fed by some other capture path.
    pub fn attach(&mut self, kind: SourceKind, level: CaptureLevel, normalization: f32) {
        self.stop();
        self.normalization = normalization;
        level.mark_live();
        self.capture = Some(Capture {
            kind,
            level,
            worker: None,
        });
    }

    /// Let go of the current source without waiting for its thread.
    pub fn stop(&mut self) {
        self.reap_retired();
        if let Some(capture) = self.capture.take() {
            info!("Releasing {} capture", capture.kind);
            if let Some(worker) = capture.worker {
                let _ = worker.stop_tx.try_send(());
                self.retired.push(worker.handle);
            }
        }
    }

    /// Release the source and wait for every capture thread to exit.
    pub fn shutdown(&mut self) {
        self.stop();
        for handle in self.retired.drain(..) {
            if handle.join().is_err() {
                error!("Capture thread panicked");
            }
        }
    }

    fn reap_retired(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.retired.drain(..).partition(|h| h.is_finished());
        for handle in finished {
            let _ = handle.join();
        }
        self.retired = running;
    }

    /// Latest normalized loudness. Atomic loads only, never blocks.
    pub fn sample(&self) -> f32 {
        match &self.capture {
            Some(capture) if capture.level.is_live() && self.normalization > 0.0 => {
                capture.level.load() / self.normalization
            }
            _ => 0.0,
        }
    }

    pub fn set_normalization(&mut self, normalization: f32) {
        self.normalization = normalization;
    }

    pub fn normalization(&self) -> f32 {
        self.normalization
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.capture.as_ref().map(|c| c.kind)
    }

    pub fn status(&self) -> AudioStatus {
        match &self.capture {
            None => AudioStatus::Off,
            Some(capture) if capture.level.is_faulted() => AudioStatus::Unavailable(capture.kind),
            Some(capture) if capture.level.is_live() => AudioStatus::Listening(capture.kind),
            Some(capture) => AudioStatus::Starting(capture.kind),
        }
    }
}

impl Default for VolumeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VolumeExtractor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_status(extractor: &VolumeExtractor, wanted: AudioStatus) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while extractor.status() != wanted && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(extractor.status(), wanted);
    }

    #[test]
    fn silent_before_any_source() {
        let extractor = VolumeExtractor::new();
        assert_eq!(extractor.sample(), 0.0);
        assert_eq!(extractor.status(), AudioStatus::Off);
        assert_eq!(extractor.source(), None);
    }

    #[test]
    fn divides_level_by_normalization() {
        let level = CaptureLevel::default();
        let mut extractor = VolumeExtractor::new();
        extractor.attach(SourceKind::Microphone, level.clone(), 128.0);

        level.store(64.0);
        assert_eq!(extractor.sample(), 0.5);
        assert_eq!(extractor.sample(), 0.5);
        assert_eq!(extractor.status(), AudioStatus::Listening(SourceKind::Microphone));
    }

    #[test]
    fn sample_is_unclamped() {
        let level = CaptureLevel::default();
        let mut extractor = VolumeExtractor::new();
        extractor.attach(SourceKind::Microphone, level.clone(), 128.0);
        level.store(255.0);
        assert!(extractor.sample() > 1.9);
    }

    #[test]
    fn fault_degrades_to_zero_and_reports_unavailable() {
        let level = CaptureLevel::default();
        let mut extractor = VolumeExtractor::new();
        extractor.attach(SourceKind::SystemOutput, level.clone(), 180.0);
        level.store(90.0);
        level.mark_faulted();

        assert_eq!(extractor.sample(), 0.0);
        assert_eq!(
            extractor.status(),
            AudioStatus::Unavailable(SourceKind::SystemOutput)
        );
    }

    #[test]
    fn stop_releases_and_silences() {
        let level = CaptureLevel::default();
        let mut extractor = VolumeExtractor::new();
        extractor.attach(SourceKind::Microphone, level.clone(), 128.0);
        level.store(100.0);
        extractor.stop();

        assert_eq!(extractor.sample(), 0.0);
        assert_eq!(extractor.status(), AudioStatus::Off);
    }

    #[test]
    fn failed_start_is_silent_and_reported() {
        let mut extractor = VolumeExtractor::new();
        extractor.start_with(SourceKind::Microphone, 128.0, |kind, _level| {
            Err::<(), _>(AudioError::NoDevice(kind))
        });

        wait_for_status(&extractor, AudioStatus::Unavailable(SourceKind::Microphone));
        assert_eq!(extractor.sample(), 0.0);
        assert_eq!(extractor.source(), Some(SourceKind::Microphone));
    }

    #[test]
    fn successful_restart_clears_failure() {
        let mut extractor = VolumeExtractor::new();
        extractor.start_with(SourceKind::Microphone, 128.0, |kind, _level| {
            Err::<(), _>(AudioError::NoDevice(kind))
        });
        wait_for_status(&extractor, AudioStatus::Unavailable(SourceKind::Microphone));

        extractor.start_with(SourceKind::SystemOutput, 180.0, |_kind, level| {
            level.store(90.0);
            Ok(())
        });
        wait_for_status(&extractor, AudioStatus::Listening(SourceKind::SystemOutput));
        assert_eq!(extractor.sample(), 0.5);
        assert_eq!(extractor.source(), Some(SourceKind::SystemOutput));
    }

    #[test]
    fn start_returns_before_slow_device_opens() {
        let (release_tx, release_rx) = channel::bounded::<()>(1);
        let mut extractor = VolumeExtractor::new();

        let started = Instant::now();
        extractor.start_with(SourceKind::Microphone, 128.0, move |_kind, level| {
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
            level.store(64.0);
            Ok(())
        });
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(extractor.status(), AudioStatus::Starting(SourceKind::Microphone));
        assert_eq!(extractor.sample(), 0.0);

        release_tx.send(()).unwrap();
        wait_for_status(&extractor, AudioStatus::Listening(SourceKind::Microphone));
        assert_eq!(extractor.sample(), 0.5);
    }

    #[test]
    fn shutdown_drops_the_opened_stream() {
        let (dropped_tx, dropped_rx) = channel::bounded::<()>(1);
        struct Guard(Sender<()>);
        impl Drop for Guard {
            fn drop(&mut self) {
                let _ = self.0.try_send(());
            }
        }

        let mut extractor = VolumeExtractor::new();
        extractor.start_with(SourceKind::Microphone, 128.0, move |_kind, _level| {
            Ok(Guard(dropped_tx))
        });
        wait_for_status(&extractor, AudioStatus::Listening(SourceKind::Microphone));

        extractor.shutdown();
        assert!(dropped_rx.try_recv().is_ok());
        assert_eq!(extractor.status(), AudioStatus::Off);
    }
}
