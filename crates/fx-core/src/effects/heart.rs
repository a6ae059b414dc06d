//! Heart convergence: particles scattered through a box ease toward points on
//! a heart curve, then drift upward in a slow spiral when dismissed.

use super::{Effect, EffectContext, EffectKind, FrameContext};
use crate::buffer::{BufferTracker, BufferTransform, Material, ParticleBuffer};
use crate::constants::*;
use crate::error::EffectError;
use crate::phase::{Phase, PhaseMachine, Span};
use glam::{Vec2, Vec3};
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct HeartParams {
    pub count: usize,
    pub scale: f32,
    pub origin: Vec3,
    /// Fraction of the remaining distance covered per frame, per axis.
    pub damping: Vec3,
    pub opacity: f32,
    pub point_size: f32,
    pub spawn_frames: u32,
    pub outro_frames: u32,
    pub spin: f32,
    pub outro_spin: f32,
}

impl Default for HeartParams {
    fn default() -> Self {
        Self {
            count: HEART_COUNT,
            scale: HEART_SCALE,
            origin: HEART_ORIGIN,
            damping: HEART_DAMPING,
            opacity: HEART_OPACITY,
            point_size: HEART_POINT_SIZE,
            spawn_frames: HEART_SPAWN_FRAMES,
            outro_frames: HEART_OUTRO_FRAMES,
            spin: HEART_SPIN,
            outro_spin: HEART_OUTRO_SPIN,
        }
    }
}

/// Point on the classic heart curve for parameter `t`.
pub fn heart_point(t: f32, scale: f32) -> Vec2 {
    let x = 0.16 * t.sin().powi(3);
    let y = 0.13 * t.cos() - 0.05 * (2.0 * t).cos() - 0.02 * (3.0 * t).cos() - 0.01 * (4.0 * t).cos();
    Vec2::new(x, y) * scale
}

pub struct HeartEffect {
    params: HeartParams,
    machine: PhaseMachine,
    targets: Vec<Vec3>,
    points: Option<ParticleBuffer>,
    opacity: f32,
    exit_from: f32,
    outro_progress: f32,
    yaw: f32,
}

pub fn start(ctx: &mut EffectContext<'_>) -> Result<Box<dyn Effect>, EffectError> {
    Ok(Box::new(HeartEffect::new(
        ctx.params.heart.clone(),
        &mut *ctx.rng,
        ctx.buffers,
    )))
}

impl HeartEffect {
    pub fn new(params: HeartParams, rng: &mut impl Rng, buffers: &BufferTracker) -> Self {
        let mut targets = Vec::with_capacity(params.count);
        let mut positions = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            let t = rng.gen::<f32>() * TAU;
            let p = heart_point(t, params.scale);
            targets.push(Vec3::new(p.x, p.y, rng.gen::<f32>() - 0.5));
            positions.push(Vec3::new(
                (rng.gen::<f32>() - 0.5) * 50.0,
                rng.gen::<f32>() * 20.0,
                (rng.gen::<f32>() - 0.5) * 50.0,
            ));
        }
        let points = ParticleBuffer::new(buffers, "heart", positions)
            .with_material(Material {
                opacity: 0.0,
                size: params.point_size,
                additive: true,
            })
            .with_transform(BufferTransform {
                origin: params.origin,
                yaw: 0.0,
            });
        log::info!("[heart] start with {} particles", params.count);
        let machine = PhaseMachine::new(
            Span::Frames(params.spawn_frames),
            Span::Frames(params.outro_frames),
        );
        let opacity = if machine.phase() == Phase::Active {
            params.opacity
        } else {
            0.0
        };
        Self {
            params,
            machine,
            targets,
            points: Some(points),
            opacity,
            exit_from: 0.0,
            outro_progress: 0.0,
            yaw: 0.0,
        }
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn positions(&self) -> Option<&[Vec3]> {
        self.points.as_ref().map(|p| p.positions())
    }

    /// 0 until dismissed, then rises to 1 over the outro.
    pub fn outro_progress(&self) -> f32 {
        self.outro_progress
    }

    /// Largest particle-to-target distance, or `None` once disposed.
    pub fn max_distance_to_target(&self) -> Option<f32> {
        let positions = self.positions()?;
        Some(
            positions
                .iter()
                .zip(&self.targets)
                .map(|(p, t)| p.distance(*t))
                .fold(0.0, f32::max),
        )
    }

    /// Every particle sits within the convergence threshold of its target.
    pub fn is_converged(&self) -> bool {
        self.max_distance_to_target()
            .is_some_and(|d| d < HEART_CONVERGED_EPSILON)
    }

    fn converge(&mut self) {
        let Some(points) = self.points.as_mut() else {
            return;
        };
        let damping = self.params.damping;
        for (p, t) in points.positions_mut().iter_mut().zip(&self.targets) {
            *p += (*t - *p) * damping;
        }
    }

    fn drift(&mut self) {
        let Some(points) = self.points.as_mut() else {
            return;
        };
        let progress = self.outro_progress;
        for (i, p) in points.positions_mut().iter_mut().enumerate() {
            let angle = progress * 0.1 + i as f32 * 0.002;
            p.x += angle.cos() * 0.02;
            p.y += 0.05;
            p.z += angle.sin() * 0.02;
        }
    }
}

impl Effect for HeartEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Heart
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
                self.converge();
                self.machine.step(dt);
                self.opacity = self.params.opacity * self.machine.progress();
                self.yaw += self.params.spin;
            }
            Phase::Exiting => {
                self.drift();
                let entered = self.machine.step(dt);
                self.outro_progress = self.machine.progress();
                self.opacity = self.exit_from * (1.0 - self.outro_progress);
                self.yaw += self.params.outro_spin;
                if entered == Some(Phase::Disposed) {
                    self.opacity = 0.0;
                    self.points = None;
                    log::info!("[heart] disposed");
                }
            }
            Phase::Disposed => return,
        }
        if let Some(points) = self.points.as_mut() {
            points.material.opacity = self.opacity;
            points.transform.yaw = self.yaw;
        }
    }

    fn stop(&mut self) {
        if self.machine.request_stop() {
            self.exit_from = self.opacity;
            self.outro_progress = 0.0;
            log::info!("[heart] outro");
        }
    }

    fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        self.points.iter().collect()
    }
}
