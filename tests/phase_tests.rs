// Lifecycle state machine shared by every simulation.

use fx_core::phase::{Phase, PhaseMachine, Span};

#[test]
fn frame_spawn_reaches_active_after_exact_count() {
    let mut m = PhaseMachine::new(Span::Frames(30), Span::Frames(50));
    assert_eq!(m.phase(), Phase::Spawn);
    for _ in 0..29 {
        assert_eq!(m.step(1.0 / 60.0), None);
    }
    assert_eq!(m.step(1.0 / 60.0), Some(Phase::Active));
    assert_eq!(m.phase(), Phase::Active);
    assert_eq!(m.progress(), 1.0);
}

#[test]
fn zero_spawn_starts_active() {
    let m = PhaseMachine::new(Span::INSTANT, Span::Seconds(1.0));
    assert_eq!(m.phase(), Phase::Active);
    let m = PhaseMachine::new(Span::Seconds(0.0), Span::INSTANT);
    assert_eq!(m.phase(), Phase::Active);
}

#[test]
fn seconds_spawn_tracks_progress() {
    let mut m = PhaseMachine::new(Span::Seconds(1.5), Span::Seconds(2.5));
    m.step(0.75);
    assert!((m.progress() - 0.5).abs() < 1e-5);
    assert_eq!(m.step(0.75), Some(Phase::Active));
}

#[test]
fn stop_is_idempotent_and_bounded() {
    let mut m = PhaseMachine::new(Span::INSTANT, Span::Frames(3));
    assert!(m.request_stop());
    assert_eq!(m.phase(), Phase::Exiting);
    assert!(!m.request_stop());
    assert_eq!(m.frames_in_phase(), 0);
    m.step(0.016);
    m.step(0.016);
    assert_eq!(m.step(0.016), Some(Phase::Disposed));
    assert!(!m.request_stop());
    assert_eq!(m.step(0.016), None);
    assert_eq!(m.phase(), Phase::Disposed);
}

#[test]
fn stop_during_spawn_skips_active() {
    let mut m = PhaseMachine::new(Span::Frames(10), Span::INSTANT);
    m.step(0.016);
    assert!(m.request_stop());
    assert_eq!(m.step(0.016), Some(Phase::Disposed));
}

#[test]
fn finish_spawn_only_affects_spawn() {
    let mut m = PhaseMachine::new(Span::Frames(100), Span::Frames(5));
    m.finish_spawn();
    assert_eq!(m.phase(), Phase::Active);
    m.request_stop();
    m.finish_spawn();
    assert_eq!(m.phase(), Phase::Exiting);
}

#[test]
fn live_phases() {
    assert!(Phase::Spawn.is_live());
    assert!(Phase::Active.is_live());
    assert!(!Phase::Exiting.is_live());
    assert!(!Phase::Disposed.is_live());
    assert_eq!(Phase::Exiting.to_string(), "exiting");
}
