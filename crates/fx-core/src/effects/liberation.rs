//! Glyph liberation: the letters of a label hover in front of the camera until
//! the user clicks, then fly outward along their line of sight and fade.

use super::{Effect, EffectContext, EffectKind, FrameContext};
use crate::buffer::{BufferTracker, Material, ParticleBuffer};
use crate::color::hsl_to_rgb;
use crate::constants::*;
use crate::error::EffectError;
use crate::phase::{Phase, PhaseMachine, Span};
use crate::scene::Camera;
use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct LiberationParams {
    pub label: String,
    /// Copies of the label stacked in depth.
    pub instances: usize,
    pub spacing: f32,
    pub depth_step: f32,
    pub distance: f32,
    pub fade_in: f32,
    pub decay: f32,
    pub min_speed: f32,
    pub speed_spread: f32,
    pub exit_seconds: f32,
    pub sprite_size: f32,
}

impl Default for LiberationParams {
    fn default() -> Self {
        Self {
            label: LIBERATION_LABEL.to_string(),
            instances: LIBERATION_INSTANCES,
            spacing: LIBERATION_GLYPH_SPACING,
            depth_step: LIBERATION_DEPTH_STEP,
            distance: LIBERATION_DISTANCE,
            fade_in: LIBERATION_FADE_IN,
            decay: LIBERATION_DECAY,
            min_speed: LIBERATION_MIN_SPEED,
            speed_spread: LIBERATION_SPEED_SPREAD,
            exit_seconds: LIBERATION_EXIT_SECONDS,
            sprite_size: LIBERATION_SPRITE_SIZE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphSprite {
    pub glyph: char,
    /// Static offset in camera right/up units.
    pub offset: Vec2,
    pub depth: f32,
    pub float_seed: Vec2,
    pub velocity: Vec3,
    pub orientation: Quat,
}

/// Unit travel direction from the camera to a sprite; a sprite sitting on the
/// camera flies straight up.
#[inline]
pub fn launch_direction(camera_eye: Vec3, sprite: Vec3) -> Vec3 {
    (sprite - camera_eye).try_normalize().unwrap_or(Vec3::Y)
}

/// Rotation that turns a sprite's +Z face toward the camera.
#[inline]
pub fn face_camera(camera_eye: Vec3, sprite: Vec3) -> Quat {
    let to_camera = (camera_eye - sprite).try_normalize().unwrap_or(Vec3::Z);
    Quat::from_rotation_arc(Vec3::Z, to_camera)
}

pub struct LiberationEffect {
    params: LiberationParams,
    machine: PhaseMachine,
    rng: StdRng,
    sprites: Vec<GlyphSprite>,
    buffer: Option<ParticleBuffer>,
    launched: bool,
    time: f32,
    opacity: f32,
    exit_from: f32,
}

pub fn start(ctx: &mut EffectContext<'_>) -> Result<Box<dyn Effect>, EffectError> {
    let mut effect = LiberationEffect::new(
        ctx.params.liberation.clone(),
        &mut *ctx.rng,
        ctx.buffers,
    );
    effect.anchor(ctx.camera);
    Ok(Box::new(effect))
}

impl LiberationEffect {
    pub fn new(params: LiberationParams, rng: &mut impl Rng, buffers: &BufferTracker) -> Self {
        let chars: Vec<char> = params.label.chars().collect();
        let half = chars.len() as f32 / 2.0;
        let mut sprites = Vec::new();
        let mut colors = Vec::new();
        for j in 0..params.instances {
            for (i, &glyph) in chars.iter().enumerate() {
                if glyph.is_whitespace() {
                    continue;
                }
                let hue = (200.0 + i as f32 * 4.0 + j as f32 * 20.0) / 360.0;
                colors.push(hsl_to_rgb(hue, 0.8, 0.7));
                sprites.push(GlyphSprite {
                    glyph,
                    offset: Vec2::new(
                        (i as f32 - half) * params.spacing,
                        (rng.gen::<f32>() - 0.5) * 0.2,
                    ),
                    depth: j as f32 * params.depth_step,
                    float_seed: Vec2::new(rng.gen::<f32>() * TAU, rng.gen::<f32>() * TAU),
                    velocity: Vec3::ZERO,
                    orientation: Quat::IDENTITY,
                });
            }
        }
        let glyphs = sprites.iter().map(|s| s.glyph).collect();
        let buffer = ParticleBuffer::new(buffers, "glyphs", vec![Vec3::ZERO; sprites.len()])
            .with_colors(colors)
            .with_glyphs(glyphs)
            .with_material(Material {
                opacity: 0.0,
                size: params.sprite_size,
                additive: true,
            });
        let ramp_frames = if params.fade_in > 0.0 {
            (1.0 / params.fade_in).ceil() as u32
        } else {
            0
        };
        log::info!("[liberation] {} glyph sprites", sprites.len());
        Self {
            machine: PhaseMachine::new(
                Span::Frames(ramp_frames),
                Span::Seconds(params.exit_seconds),
            ),
            rng: StdRng::seed_from_u64(rng.gen()),
            sprites,
            buffer: Some(buffer),
            launched: false,
            time: 0.0,
            opacity: 0.0,
            exit_from: 0.0,
            params,
        }
    }

    pub fn sprites(&self) -> &[GlyphSprite] {
        &self.sprites
    }

    pub fn positions(&self) -> Option<&[Vec3]> {
        self.buffer.as_ref().map(|b| b.positions())
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Place every unlaunched sprite in front of the camera for the current time.
    fn anchor(&mut self, camera: &Camera) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        let forward = camera.forward();
        let right = forward.cross(camera.up).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        let t = self.time;
        for (sprite, p) in self.sprites.iter_mut().zip(buffer.positions_mut()) {
            let sway = Vec2::new(
                (t + sprite.float_seed.x).sin() * 0.04,
                (t * 0.7 + sprite.float_seed.y).sin() * 0.06,
            );
            let offset = sprite.offset + sway;
            *p = camera.eye
                + forward * (self.params.distance + sprite.depth)
                + right * offset.x
                + up * offset.y;
            sprite.orientation = face_camera(camera.eye, *p);
        }
    }

    fn fly(&mut self, camera: &Camera) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        for (sprite, p) in self.sprites.iter_mut().zip(buffer.positions_mut()) {
            *p += sprite.velocity;
            sprite.orientation = face_camera(camera.eye, *p);
        }
    }

    fn launch(&mut self, camera: &Camera) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        for (sprite, p) in self.sprites.iter_mut().zip(buffer.positions()) {
            let speed = self.params.min_speed + self.rng.gen::<f32>() * self.params.speed_spread;
            sprite.velocity = launch_direction(camera.eye, *p) * speed;
        }
        self.launched = true;
        log::info!("[liberation] launch");
    }
}

impl Effect for LiberationEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Liberation
    }

    fn phase(&self) -> Phase {
        self.machine.phase()
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.time.delta;
        match self.machine.phase() {
            Phase::Spawn | Phase::Active => {
                self.time += dt;
                if self.launched {
                    self.fly(ctx.camera);
                    self.opacity *= self.params.decay;
                } else {
                    self.anchor(ctx.camera);
                    self.opacity = (self.opacity + self.params.fade_in).min(1.0);
                }
                self.machine.step(dt);
                if self.opacity >= 1.0 {
                    self.machine.finish_spawn();
                }
            }
            Phase::Exiting => {
                self.time += dt;
                if self.launched {
                    self.fly(ctx.camera);
                } else {
                    self.anchor(ctx.camera);
                }
                let entered = self.machine.step(dt);
                self.opacity = self.exit_from * (1.0 - self.machine.progress());
                if entered == Some(Phase::Disposed) {
                    self.opacity = 0.0;
                    self.buffer = None;
                    log::info!("[liberation] disposed");
                }
            }
            Phase::Disposed => return,
        }
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.material.opacity = self.opacity;
        }
    }

    fn stop(&mut self) {
        if self.machine.request_stop() {
            self.exit_from = self.opacity;
        }
    }

    fn on_click(&mut self, ctx: &mut FrameContext<'_>) {
        if self.launched || !self.machine.phase().is_live() {
            return;
        }
        self.launch(ctx.camera);
        self.machine.finish_spawn();
    }

    fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        self.buffer.iter().collect()
    }
}
