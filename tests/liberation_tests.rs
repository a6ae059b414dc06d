// Glyph liberation: anchoring, fade-in, launch and dismissal.

use fx_core::buffer::BufferTracker;
use fx_core::clock::FrameClock;
use fx_core::effects::liberation::{launch_direction, LiberationEffect, LiberationParams};
use fx_core::effects::{Effect, FrameContext};
use fx_core::phase::Phase;
use fx_core::presentation::PresentationState;
use fx_core::scene::Camera;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

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

    fn ctx(&mut self) -> FrameContext<'_> {
        FrameContext {
            time: self.clock.tick(1.0 / 60.0),
            camera: &self.camera,
            presentation: &mut self.presentation,
        }
    }

    fn run(&mut self, effect: &mut dyn Effect, frames: usize) {
        for _ in 0..frames {
            effect.frame(&mut self.ctx());
        }
    }
}

fn glyphs(tracker: &BufferTracker) -> LiberationEffect {
    let mut rng = StdRng::seed_from_u64(11);
    LiberationEffect::new(LiberationParams::default(), &mut rng, tracker)
}

#[test]
fn launch_direction_is_unit_or_up() {
    let eye = Vec3::new(0.0, 7.0, 13.0);
    let d = launch_direction(eye, Vec3::new(1.0, 2.0, 3.0));
    assert!((d.length() - 1.0).abs() < 1e-5);
    assert_eq!(launch_direction(eye, eye), Vec3::Y);
}

#[test]
fn one_sprite_per_visible_glyph_per_instance() {
    let tracker = BufferTracker::new();
    let effect = glyphs(&tracker);
    assert_eq!(effect.sprites().len(), 40);
    assert!(effect.sprites().iter().all(|s| !s.glyph.is_whitespace()));
    let layers = effect.layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].glyphs().unwrap().len(), 40);
}

#[test]
fn sprites_hover_in_front_of_camera_and_fade_in() {
    let tracker = BufferTracker::new();
    let mut effect = glyphs(&tracker);
    let mut rig = Rig::new();
    assert_eq!(effect.opacity(), 0.0);

    rig.run(&mut effect, 10);
    assert!((effect.opacity() - 0.2).abs() < 1e-4);
    assert_eq!(effect.phase(), Phase::Spawn);
    let forward = rig.camera.forward();
    for p in effect.positions().unwrap() {
        let along = (*p - rig.camera.eye).dot(forward);
        assert!(along > 2.0 && along < 3.0, "depth {along}");
    }

    rig.run(&mut effect, 50);
    assert_eq!(effect.phase(), Phase::Active);
    assert!((effect.opacity() - 1.0).abs() < 1e-5);
    assert!(!effect.is_launched());
}

#[test]
fn click_launches_sprites_away_from_camera() {
    let tracker = BufferTracker::new();
    let mut effect = glyphs(&tracker);
    let mut rig = Rig::new();
    rig.run(&mut effect, 60);

    let eye = rig.camera.eye;
    let before: Vec<f32> = effect
        .positions()
        .unwrap()
        .iter()
        .map(|p| p.distance(eye))
        .collect();
    effect.on_click(&mut rig.ctx());
    assert!(effect.is_launched());
    for s in effect.sprites() {
        let speed = s.velocity.length();
        assert!((0.06..=0.1 + 1e-5).contains(&speed));
    }

    rig.run(&mut effect, 30);
    for (p, d0) in effect.positions().unwrap().iter().zip(before) {
        assert!(p.distance(eye) > d0);
    }
    let expected = 0.985_f32.powi(30);
    assert!((effect.opacity() - expected).abs() < 1e-3);

    // A second click does not relaunch.
    let velocities: Vec<Vec3> = effect.sprites().iter().map(|s| s.velocity).collect();
    effect.on_click(&mut rig.ctx());
    let again: Vec<Vec3> = effect.sprites().iter().map(|s| s.velocity).collect();
    assert_eq!(velocities, again);
}

#[test]
fn dismissal_fades_and_releases_buffer() {
    let tracker = BufferTracker::new();
    let mut effect = glyphs(&tracker);
    let mut rig = Rig::new();
    rig.run(&mut effect, 20);
    effect.stop();
    assert_eq!(effect.phase(), Phase::Exiting);

    // Clicks during teardown are ignored.
    effect.on_click(&mut rig.ctx());
    assert!(!effect.is_launched());

    rig.run(&mut effect, 25);
    assert_eq!(effect.phase(), Phase::Disposed);
    assert_eq!(effect.opacity(), 0.0);
    assert!(effect.positions().is_none());
    assert_eq!(tracker.live(), 0);
}
