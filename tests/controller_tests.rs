use std::time::Duration;

use glam::Vec2;
use maskfx::audio::CaptureLevel;
use maskfx::expression::{CYAN, EyeShape, RED};
use maskfx::{AudioStatus, Controller, FaceConfig, Mode, SourceKind};

const FRAME: Duration = Duration::from_micros(16_667);

fn controller() -> Controller {
    Controller::with_seed(FaceConfig::default(), 2024).expect("controller should start")
}

#[test]
fn shock_at_half_volume_stretches_mouth() {
    let mut controller = controller();
    controller.set_mode(Mode::Shock);

    // One frame at raw 1.0 with factor 0.5 lands the smoothed volume on 0.5
    let snapshot = *controller.advance(1.0, FRAME);
    assert_eq!(controller.smoothed_volume(), 0.5);

    assert!(!snapshot.blinking);
    assert!((snapshot.mouth.scale_y - 1.5).abs() < 1e-6);
    assert!(matches!(snapshot.eye_shape, EyeShape::Ring { segments: 4, .. }));
    assert_eq!(snapshot.color, CYAN);
}

#[test]
fn angry_in_silence_shows_crossed_bars() {
    let mut controller = controller();
    controller.set_mode(Mode::Angry);
    let snapshot = *controller.advance(0.0, FRAME);

    assert!(matches!(snapshot.eye_shape, EyeShape::CrossedBars { .. }));
    assert_eq!(snapshot.color, RED);
    for (i, rotation) in snapshot.mouth.bar_rotations.iter().enumerate() {
        let expected = if i % 2 == 0 { 0.5 } else { -0.5 };
        assert_eq!(*rotation, expected);
    }
}

#[test]
fn source_switch_only_touches_normalization() {
    let mut controller = controller();
    let mic = CaptureLevel::default();
    controller.attach_audio_level(SourceKind::Microphone, mic.clone());
    mic.store(64.0);

    controller.set_mode(Mode::Suspicious);
    controller.set_pointer(Vec2::new(0.5, 0.5));
    for _ in 0..30 {
        controller.update(FRAME);
    }
    assert_eq!(controller.raw_volume(), 0.5);
    let orientation_before = controller.snapshot().orientation;
    let blink = controller.blink_state();

    let system = CaptureLevel::default();
    system.store(90.0);
    controller.attach_audio_level(SourceKind::SystemOutput, system);
    controller.update(FRAME);

    assert_eq!(controller.raw_volume(), 0.5);
    assert_eq!(
        controller.audio_status(),
        AudioStatus::Listening(SourceKind::SystemOutput)
    );
    assert_eq!(controller.mode(), Mode::Suspicious);
    assert!(controller.is_running());
    assert!(!blink.is_closed());

    // Orientation keeps easing from where it was instead of restarting
    let orientation_after = controller.snapshot().orientation;
    assert!(orientation_after.yaw >= orientation_before.yaw);
    assert!((orientation_after.yaw - orientation_before.yaw).abs() < 0.01);
}

#[test]
fn smoothed_volume_has_no_jumps_across_switch() {
    let mut controller = controller();
    let level = CaptureLevel::default();
    level.store(128.0);
    controller.attach_audio_level(SourceKind::Microphone, level);
    for _ in 0..20 {
        controller.update(FRAME);
    }
    let before = controller.smoothed_volume();
    assert!((before - 1.0).abs() < 1e-4);

    controller.set_audio_source(None);
    controller.update(FRAME);
    assert_eq!(controller.audio_status(), AudioStatus::Off);
    assert!((controller.smoothed_volume() - before * 0.5).abs() < 1e-6);
}

#[test]
fn pointer_storm_keeps_last_position() {
    let mut controller = controller();
    let pointer = controller.pointer();
    let writer = std::thread::spawn(move || {
        for i in 0..10_000 {
            pointer.set(Vec2::new((i % 200) as f32 / 100.0 - 1.0, 0.0));
        }
        pointer.set(Vec2::new(1.0, 0.0));
    });
    writer.join().unwrap();

    for _ in 0..300 {
        controller.update(FRAME);
    }
    assert!((controller.snapshot().orientation.yaw - 0.6).abs() < 1e-3);
}

#[test]
fn unknown_mode_name_falls_back_to_normal() {
    let mut controller = controller();
    controller.set_mode(Mode::Angry);
    assert!(controller.set_mode_by_name("rage"));
    assert_eq!(controller.mode(), Mode::Normal);
    assert_eq!(controller.advance(0.0, FRAME).mode, Mode::Normal);
}

#[test]
fn mode_never_decays_over_time() {
    let mut controller = controller();
    controller.set_mode(Mode::Shock);
    for _ in 0..600 {
        controller.advance(0.2, FRAME);
    }
    assert_eq!(controller.mode(), Mode::Shock);
}

#[test]
fn jitter_snaps_back_between_twitches() {
    let config = FaceConfig {
        jitter_probability: 0.5,
        ..FaceConfig::default()
    };
    let mut controller = Controller::with_seed(config, 77).unwrap();
    let mut zero_frames = 0;
    for _ in 0..200 {
        let snapshot = controller.advance(0.0, FRAME);
        for offset in snapshot.jitter {
            assert!(offset.x.abs() <= 0.015 && offset.y.abs() <= 0.015);
            if offset == Vec2::ZERO {
                zero_frames += 1;
            }
        }
    }
    assert!(zero_frames > 100 && zero_frames < 300, "{zero_frames}");
}

#[test]
fn stop_cancels_blinks_and_releases_audio() {
    let mut controller = controller();
    controller.attach_audio_level(SourceKind::Microphone, CaptureLevel::default());
    let blink = controller.blink_state();

    controller.stop();

    assert!(!controller.is_running());
    assert!(!blink.is_closed());
    assert_eq!(controller.audio_status(), AudioStatus::Off);
    assert_eq!(controller.update(FRAME).blink_scale_y, 1.0);
}

#[test]
fn independent_controllers_coexist() {
    let mut a = controller();
    let mut b = controller();
    a.set_mode(Mode::Angry);
    a.advance(1.0, FRAME);
    b.advance(0.0, FRAME);
    assert_eq!(b.mode(), Mode::Normal);
    assert_eq!(b.smoothed_volume(), 0.0);
    assert_eq!(a.smoothed_volume(), 0.5);
}
