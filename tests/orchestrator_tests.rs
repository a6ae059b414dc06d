// Effect exclusivity, teardown and failure handling through the host.

use fx_core::effects::EffectKind;
use fx_core::error::EffectError;
use fx_core::phase::Phase;
use fx_core::scene::{Asset, AssetReadiness};
use fx_core::spectrum::{ConstantBackend, NoAudio};
use fx_core::{FxHost, FxParams};

const DT: f32 = 1.0 / 60.0;

fn host_with(backend: ConstantBackend) -> FxHost {
    let mut host = FxHost::new(FxParams::default(), Box::new(backend));
    *host.assets_mut() = AssetReadiness::all_ready();
    host
}

fn run(host: &mut FxHost, frames: usize) {
    for _ in 0..frames {
        host.frame(DT);
    }
}

fn run_until_idle(host: &mut FxHost) -> usize {
    let mut frames = 0;
    while !host.orchestrator().is_idle() {
        host.frame(DT);
        frames += 1;
        assert!(frames < 1000, "teardown never finished");
    }
    frames
}

#[test]
fn starting_replaces_previous_effect() {
    let backend = ConstantBackend::new(100, 32);
    let probe = backend.clone();
    let mut host = host_with(backend);

    host.start(EffectKind::Heart).unwrap();
    run(&mut host, 10);
    assert_eq!(host.orchestrator().active_kind(), Some(EffectKind::Heart));
    assert_eq!(host.buffers().live(), 1);

    host.start(EffectKind::Wave).unwrap();
    assert_eq!(host.orchestrator().active_kind(), Some(EffectKind::Wave));
    assert_eq!(host.orchestrator().phase(), Some(Phase::Spawn));
    // Heart's buffer is gone; only the wave grid and dust remain.
    assert_eq!(host.buffers().live(), 2);
    assert_eq!(probe.open_streams(), 1);

    host.start(EffectKind::Liberation).unwrap();
    assert_eq!(host.buffers().live(), 1);
    assert_eq!(probe.open_streams(), 0);
}

#[test]
fn at_most_one_live_effect_every_frame() {
    let mut host = host_with(ConstantBackend::silent(32));
    for kind in [
        EffectKind::Heart,
        EffectKind::Sheep,
        EffectKind::Wave,
        EffectKind::Heart,
    ] {
        host.start(kind).unwrap();
        for _ in 0..20 {
            let stats = host.frame(DT);
            assert_eq!(stats.active, Some(kind));
            assert!(host.layers().len() <= 2);
        }
    }
}

#[test]
fn stop_all_is_idempotent() {
    let mut host = host_with(ConstantBackend::silent(32));
    assert!(!host.stop_all());

    host.start(EffectKind::Heart).unwrap();
    run(&mut host, 40);
    assert!(host.stop_all());
    assert!(!host.stop_all());
    assert!(!host.orchestrator().is_active());
    assert_eq!(host.orchestrator().phase(), Some(Phase::Exiting));

    let frames = run_until_idle(&mut host);
    assert_eq!(frames, 50);
    assert!(!host.stop_all());
    assert_eq!(host.buffers().live(), 0);
}

#[test]
fn wave_round_trips_without_leaks() {
    let backend = ConstantBackend::new(200, 64);
    let probe = backend.clone();
    let mut host = host_with(backend);

    for _ in 0..3 {
        host.start(EffectKind::Wave).unwrap();
        run(&mut host, 120);
        assert_eq!(host.buffers().live(), 2);
        assert_eq!(probe.open_streams(), 1);

        host.stop_all();
        assert_eq!(probe.open_streams(), 0);
        run_until_idle(&mut host);
        assert_eq!(host.buffers().live(), 0);
        assert!(host.layers().is_empty());
    }
    assert_eq!(host.buffers().allocated(), 6);
}

#[test]
fn missing_asset_leaves_state_unchanged() {
    let mut host = FxHost::new(FxParams::default(), Box::new(ConstantBackend::silent(8)));
    host.start(EffectKind::Sheep).unwrap();
    let presentation = host.presentation().clone();

    let err = host.start(EffectKind::Wave).unwrap_err();
    assert_eq!(
        err,
        EffectError::AssetNotReady {
            kind: EffectKind::Wave,
            asset: Asset::WaveTrack,
        }
    );
    assert_eq!(host.orchestrator().active_kind(), Some(EffectKind::Sheep));
    assert_eq!(host.presentation(), &presentation);

    host.assets_mut().mark_ready(Asset::WaveTrack);
    host.start(EffectKind::Wave).unwrap();
    assert_eq!(host.orchestrator().active_kind(), Some(EffectKind::Wave));
}

#[test]
fn audio_failure_leaves_host_idle() {
    let mut host = FxHost::new(FxParams::default(), Box::new(NoAudio));
    *host.assets_mut() = AssetReadiness::all_ready();
    host.start(EffectKind::Heart).unwrap();
    run(&mut host, 5);

    let err = host.start(EffectKind::Wave).unwrap_err();
    assert!(matches!(err, EffectError::AudioUnavailable { .. }));
    assert!(host.orchestrator().is_idle());
    assert_eq!(host.buffers().live(), 0);
    assert!(host.presentation().is_default());

    let err = host.start(EffectKind::Daisy).unwrap_err();
    assert!(matches!(err, EffectError::AudioUnavailable { .. }));
    assert!(host.presentation().is_default());
}

#[test]
fn stopping_restores_presentation_defaults() {
    let mut host = host_with(ConstantBackend::silent(8));
    host.start(EffectKind::Sheep).unwrap();
    assert!(!host.presentation().is_default());
    assert_eq!(host.presentation().popup.as_deref(), Some("Go to couch."));
    host.stop_all();
    assert!(host.presentation().is_default());

    host.start(EffectKind::Ghost).unwrap();
    assert!(host.presentation().tint.is_some());
    host.start(EffectKind::Heart).unwrap();
    assert!(host.presentation().is_default());
}

#[test]
fn daisy_sky_animates_each_frame() {
    let mut host = host_with(ConstantBackend::silent(8));
    host.start(EffectKind::Daisy).unwrap();
    assert!(!host.presentation().ambient_playing);
    run(&mut host, 1);
    let first = host.presentation().background;
    run(&mut host, 600);
    assert_ne!(host.presentation().background, first);
    host.stop_all();
    assert!(host.presentation().is_default());
}

#[test]
fn external_effects_retire_on_next_frame() {
    let backend = ConstantBackend::silent(8);
    let probe = backend.clone();
    let mut host = host_with(backend);
    host.start(EffectKind::Daisy).unwrap();
    assert_eq!(probe.open_streams(), 1);
    host.stop_all();
    assert_eq!(probe.open_streams(), 0);
    assert_eq!(run_until_idle(&mut host), 1);
}

#[test]
fn restarting_during_teardown_drains_first() {
    let mut host = host_with(ConstantBackend::silent(8));
    host.start(EffectKind::Heart).unwrap();
    run(&mut host, 10);
    host.stop_all();
    run(&mut host, 5);
    assert_eq!(host.buffers().live(), 1);

    host.start(EffectKind::Heart).unwrap();
    assert_eq!(host.buffers().live(), 1);
    assert_eq!(host.buffers().allocated(), 2);
    assert_eq!(host.orchestrator().phase(), Some(Phase::Spawn));
}

#[test]
fn kinds_parse_by_name() {
    for kind in EffectKind::ALL {
        assert_eq!(EffectKind::from_name(kind.name()), Ok(kind));
    }
    assert_eq!(
        EffectKind::from_name("fireworks"),
        Err(EffectError::UnknownEffect("fireworks".to_string()))
    );
}

#[test]
fn stopping_during_spawn_still_releases_everything() {
    let backend = ConstantBackend::new(90, 32);
    let probe = backend.clone();
    let mut host = host_with(backend);
    for kind in [EffectKind::Heart, EffectKind::Wave, EffectKind::Liberation] {
        host.start(kind).unwrap();
        run(&mut host, 3);
        assert_eq!(host.orchestrator().phase(), Some(Phase::Spawn));
        host.stop_all();
        host.stop_all();
        run_until_idle(&mut host);
        assert_eq!(host.buffers().live(), 0, "{kind} leaked");
        assert_eq!(probe.open_streams(), 0);
    }
}
