// Audio-reactive wave: grid layout, audio lift, dust ring and spiral exit.

use fx_core::buffer::BufferTracker;
use fx_core::clock::FrameClock;
use fx_core::effects::wave::{wave_target, WaveEffect, WaveParams};
use fx_core::effects::{Effect, FrameContext};
use fx_core::phase::Phase;
use fx_core::presentation::PresentationState;
use fx_core::scene::Camera;
use fx_core::spectrum::{AudioBackend, ConstantBackend, SpectrumSampler};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

struct Rig {
    clock: FrameClock,
    camera: Camera,
    presentation: PresentationState,
}

impl Rig {
    fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            camera: Camera::default(),
            presentation: PresentationState::default(),
        }
    }

    fn run(&mut self, effect: &mut dyn Effect, frames: usize) {
        for _ in 0..frames {
            let time = self.clock.tick(DT);
            effect.frame(&mut FrameContext {
                time,
                camera: &self.camera,
                presentation: &mut self.presentation,
            });
        }
    }
}

fn wave(backend: &mut ConstantBackend, tracker: &BufferTracker, seed: u64) -> WaveEffect {
    let params = WaveParams::default();
    let source = backend.open(&params.track).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    WaveEffect::new(params, SpectrumSampler::new(source), &mut rng, tracker)
}

#[test]
fn grid_has_eight_thousand_particles() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::silent(64);
    let effect = wave(&mut backend, &tracker, 1);
    assert_eq!(effect.params().particle_count(), 8000);
    assert_eq!(effect.grid_positions().unwrap().len(), 8000);
    assert_eq!(effect.dust_positions().unwrap().len(), 0);
    assert_eq!(effect.layers().len(), 2);
    assert_eq!(tracker.live(), 2);
}

#[test]
fn fades_in_over_spawn_seconds() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::silent(64);
    let mut effect = wave(&mut backend, &tracker, 1);
    let mut rig = Rig::new();

    rig.run(&mut effect, 45);
    assert_eq!(effect.phase(), Phase::Spawn);
    assert!((effect.opacity() - 0.5).abs() < 0.02);

    rig.run(&mut effect, 46);
    assert_eq!(effect.phase(), Phase::Active);
    assert_eq!(effect.opacity(), 1.0);
    for layer in effect.layers() {
        assert_eq!(layer.material.opacity, 1.0);
    }
}

#[test]
fn heights_stay_within_bound_at_full_volume() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::new(255, 64);
    let mut effect = wave(&mut backend, &tracker, 3);
    let mut rig = Rig::new();
    let bound = effect.params().height_bound();
    for _ in 0..300 {
        rig.run(&mut effect, 1);
        for p in effect.grid_positions().unwrap() {
            assert!(p.y.abs() <= bound + 1e-4, "y = {}", p.y);
        }
    }
}

#[test]
fn silence_rides_the_bare_sine() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::silent(64);
    let mut effect = wave(&mut backend, &tracker, 4);
    let mut rig = Rig::new();
    let amplitude = effect.params().amplitude;
    rig.run(&mut effect, 240);
    assert!(effect.spectrum().unwrap().magnitudes().iter().all(|&m| m == 0));
    for p in effect.grid_positions().unwrap() {
        assert!(p.y.abs() <= amplitude + 1e-4);
    }
}

#[test]
fn audio_lift_is_additive() {
    let tracker = BufferTracker::new();
    let mut loud_backend = ConstantBackend::new(255, 64);
    let mut quiet_backend = ConstantBackend::silent(64);
    let mut loud = wave(&mut loud_backend, &tracker, 9);
    let mut quiet = wave(&mut quiet_backend, &tracker, 9);
    let mut loud_rig = Rig::new();
    let mut quiet_rig = Rig::new();
    loud_rig.run(&mut loud, 200);
    quiet_rig.run(&mut quiet, 200);

    let lift = loud.params().height_scale * loud.params().audio_gain;
    let a = loud.grid_positions().unwrap();
    let b = quiet.grid_positions().unwrap();
    for (p, q) in a.iter().zip(b) {
        assert_eq!(p.x, q.x);
        assert!((p.y - q.y - lift).abs() < 1e-3);
    }
}

#[test]
fn target_clamps_level_and_gain() {
    let params = WaveParams {
        audio_gain: 4.0,
        ..WaveParams::default()
    };
    let y = wave_target(std::f32::consts::FRAC_PI_2, 0.0, 2.0, &params);
    assert!((y - (params.amplitude + params.height_scale)).abs() < 1e-5);
}

#[test]
fn dust_grows_in_batches_up_to_cap() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::silent(16);
    let mut effect = wave(&mut backend, &tracker, 5);
    let mut rig = Rig::new();
    rig.run(&mut effect, 3);
    assert_eq!(effect.dust_positions().unwrap().len(), 120);
    rig.run(&mut effect, 200);
    let dust = effect.dust_positions().unwrap();
    assert_eq!(dust.len(), 4000);
    for p in dust {
        assert!(p.y.abs() <= 0.8 + 1e-5);
    }
}

#[test]
fn dismissal_spirals_out_and_releases_everything() {
    let tracker = BufferTracker::new();
    let mut backend = ConstantBackend::new(128, 64);
    let probe = backend.clone();
    let mut effect = wave(&mut backend, &tracker, 6);
    let mut rig = Rig::new();
    rig.run(&mut effect, 120);
    assert_eq!(probe.open_streams(), 1);

    effect.stop();
    assert_eq!(effect.phase(), Phase::Exiting);
    assert_eq!(probe.open_streams(), 0);
    effect.stop();

    rig.run(&mut effect, 75);
    assert_eq!(effect.phase(), Phase::Exiting);
    assert!(effect.opacity() < 1.0 && effect.opacity() > 0.0);
    let max_h = effect
        .grid_positions()
        .unwrap()
        .iter()
        .map(|p| p.y.abs())
        .fold(0.0, f32::max);
    assert!(max_h <= 0.5 * effect.params().height_bound() + 1e-3);

    rig.run(&mut effect, 80);
    assert_eq!(effect.phase(), Phase::Disposed);
    assert_eq!(effect.opacity(), 0.0);
    assert!(effect.layers().is_empty());
    assert_eq!(tracker.live(), 0);
}
