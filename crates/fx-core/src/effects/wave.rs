//! Audio-reactive wave: a grid of particles riding a traveling sine whose
//! height is lifted by the live spectrum, wrapped in a slowly growing ring of
//! ambient dust. Dismissal winds everything into a shrinking spiral.

use super::{Effect, EffectContext, EffectKind, FrameContext};
use crate::buffer::{BufferTracker, BufferTransform, Material, ParticleBuffer};
use crate::color::hsl_to_rgb;
use crate::constants::*;
use crate::error::EffectError;
use crate::phase::{Phase, PhaseMachine, Span};
use crate::spectrum::{SpectrumSampler, SpectrumSnapshot};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq)]
pub struct WaveParams {
    pub layers: usize,
    pub points_per_layer: usize,
    pub width: f32,
    pub depth: f32,
    pub amplitude: f32,
    pub height_scale: f32,
    /// Scales the spectrum contribution; values above 1 break the height bound.
    pub audio_gain: f32,
    pub smoothing: f32,
    pub spawn_seconds: f32,
    pub exit_seconds: f32,
    pub point_size: f32,
    pub ambient_batch: usize,
    pub ambient_max: usize,
    pub ambient_base_radius: f32,
    pub ambient_radius_step: f32,
    pub ambient_jitter: f32,
    pub origin: Vec3,
    pub track: String,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            layers: WAVE_LAYERS,
            points_per_layer: WAVE_POINTS_PER_LAYER,
            width: WAVE_WIDTH,
            depth: WAVE_DEPTH,
            amplitude: WAVE_AMPLITUDE,
            height_scale: WAVE_HEIGHT_SCALE,
            audio_gain: WAVE_AUDIO_GAIN,
            smoothing: WAVE_SMOOTHING,
            spawn_seconds: WAVE_SPAWN_SECONDS,
            exit_seconds: WAVE_EXIT_SECONDS,
            point_size: WAVE_POINT_SIZE,
            ambient_batch: WAVE_AMBIENT_BATCH,
            ambient_max: WAVE_AMBIENT_MAX,
            ambient_base_radius: WAVE_AMBIENT_BASE_RADIUS,
            ambient_radius_step: WAVE_AMBIENT_RADIUS_STEP,
            ambient_jitter: WAVE_AMBIENT_JITTER,
            origin: Vec3::new(0.0, 2.0, 0.0),
            track: WAVE_TRACK.to_string(),
        }
    }
}

impl WaveParams {
    pub fn particle_count(&self) -> usize {
        self.layers * self.points_per_layer
    }

    /// No grid particle can rise or sink further than this.
    pub fn height_bound(&self) -> f32 {
        self.amplitude + self.height_scale
    }
}

/// Vertical target of one grid particle for this frame.
#[inline]
pub fn wave_target(phase: f32, time: f32, level: f32, params: &WaveParams) -> f32 {
    (phase + time).sin() * params.amplitude
        + level.clamp(0.0, 1.0) * params.height_scale * params.audio_gain.clamp(0.0, 1.0)
}

/// Spatial phase of a grid particle: varies with its column, layer and
/// current horizontal position.
#[inline]
pub fn wave_phase(column: usize, layer: usize, x: f32) -> f32 {
    column as f32 * 0.12 + layer as f32 * 0.35 + x * 0.25
}

/// Rainbow hue that travels along the columns over time.
#[inline]
pub fn wave_hue(column: usize, columns: usize, layer: usize, time: f32) -> f32 {
    let c = column as f32 / columns.max(1) as f32;
    (c * 0.6 + layer as f32 * 0.015 + time * 0.05).rem_euclid(1.0)
}

#[derive(Clone, Copy, Debug)]
struct DustSeed {
    anchor: Vec3,
    phase: Vec3,
    freq: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct SpiralStart {
    radius: f32,
    height: f32,
}

pub struct WaveEffect {
    params: WaveParams,
    machine: PhaseMachine,
    rng: StdRng,
    sampler: Option<SpectrumSampler>,
    grid: Option<ParticleBuffer>,
    dust: Option<ParticleBuffer>,
    dust_seeds: Vec<DustSeed>,
    spiral: Vec<SpiralStart>,
    buffers: BufferTracker,
    time: f32,
    opacity: f32,
    exit_from: f32,
}

pub fn start(ctx: &mut EffectContext<'_>) -> Result<Box<dyn Effect>, EffectError> {
    let params = ctx.params.wave.clone();
    let source = ctx.audio.open(&params.track)?;
    let sampler = SpectrumSampler::new(source);
    Ok(Box::new(WaveEffect::new(
        params,
        sampler,
        &mut *ctx.rng,
        ctx.buffers,
    )))
}

impl WaveEffect {
    pub fn new(
        params: WaveParams,
        sampler: SpectrumSampler,
        rng: &mut impl Rng,
        buffers: &BufferTracker,
    ) -> Self {
        let columns = params.points_per_layer.max(1);
        let layers = params.layers.max(1);
        let jitter_y = (params.amplitude * 0.2).min(0.2);
        let mut positions = Vec::with_capacity(params.particle_count());
        for layer in 0..params.layers {
            for column in 0..params.points_per_layer {
                let u = column as f32 / (columns.saturating_sub(1)).max(1) as f32;
                let v = layer as f32 / (layers.saturating_sub(1)).max(1) as f32;
                positions.push(Vec3::new(
                    (u - 0.5) * params.width + (rng.gen::<f32>() - 0.5) * 0.1,
                    (rng.gen::<f32>() * 2.0 - 1.0) * jitter_y,
                    (v - 0.5) * params.depth + (rng.gen::<f32>() - 0.5) * 0.1,
                ));
            }
        }
        let count = positions.len();
        let material = Material {
            opacity: 0.0,
            size: params.point_size,
            additive: true,
        };
        let transform = BufferTransform {
            origin: params.origin,
            yaw: 0.0,
        };
        let grid = ParticleBuffer::new(buffers, "wave", positions)
            .with_colors(vec![Vec3::ONE; count])
            .with_material(material)
            .with_transform(transform);
        let dust = ParticleBuffer::new(buffers, "wave-dust", Vec::new())
            .with_colors(Vec::new())
            .with_material(Material {
                size: params.point_size * 0.6,
                ..material
            })
            .with_transform(transform);
        log::info!(
            "[wave] start {}x{} grid, {} bins",
            params.layers,
            params.points_per_layer,
            sampler.snapshot().len()
        );
        Self {
            machine: PhaseMachine::new(
                Span::Seconds(params.spawn_seconds),
                Span::Seconds(params.exit_seconds),
            ),
            rng: StdRng::seed_from_u64(rng.gen()),
            sampler: Some(sampler),
            grid: Some(grid),
            dust: Some(dust),
            dust_seeds: Vec::new(),
            spiral: Vec::new(),
            buffers: buffers.clone(),
            time: 0.0,
            opacity: 0.0,
            exit_from: 0.0,
            params,
        }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn grid_positions(&self) -> Option<&[Vec3]> {
        self.grid.as_ref().map(|b| b.positions())
    }

    pub fn dust_positions(&self) -> Option<&[Vec3]> {
        self.dust.as_ref().map(|b| b.positions())
    }

    pub fn spectrum(&self) -> Option<&SpectrumSnapshot> {
        self.sampler.as_ref().map(|s| s.snapshot())
    }

    /// Seconds since the effect started.
    pub fn local_time(&self) -> f32 {
        self.time
    }

    fn animate_grid(&mut self) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        let silent = SpectrumSnapshot::default();
        let spectrum = match self.sampler.as_mut() {
            Some(s) => s.refresh(),
            None => &silent,
        };
        let bins = spectrum.len();
        let columns = self.params.points_per_layer.max(1);
        let t = self.time;
        let s = self.params.smoothing.clamp(0.0, 1.0);

        for (i, p) in grid.positions_mut().iter_mut().enumerate() {
            let column = i % columns;
            let layer = i / columns;
            let level = if bins > 0 {
                spectrum.normalized(column % bins)
            } else {
                0.0
            };
            let target = wave_target(wave_phase(column, layer, p.x), t, level, &self.params);
            p.y += (target - p.y) * s;
        }
        if let Some(colors) = grid.colors_mut() {
            for (i, c) in colors.iter_mut().enumerate() {
                let hue = wave_hue(i % columns, columns, i / columns, t);
                *c = hsl_to_rgb(hue, 0.8, 0.6);
            }
        }
    }

    fn grow_dust(&mut self) {
        let Some(dust) = self.dust.as_mut() else {
            return;
        };
        let have = self.dust_seeds.len();
        let room = self.params.ambient_max.saturating_sub(have);
        let batch = self.params.ambient_batch.min(room);
        for n in have..have + batch {
            let angle = self.rng.gen::<f32>() * TAU;
            let radius = self.params.ambient_base_radius + n as f32 * self.params.ambient_radius_step;
            let anchor = Vec3::new(
                angle.cos() * radius,
                self.rng.gen::<f32>() - 0.5,
                angle.sin() * radius,
            );
            self.dust_seeds.push(DustSeed {
                anchor,
                phase: Vec3::new(
                    self.rng.gen::<f32>() * TAU,
                    self.rng.gen::<f32>() * TAU,
                    self.rng.gen::<f32>() * TAU,
                ),
                freq: Vec3::new(
                    0.3 + self.rng.gen::<f32>() * 0.7,
                    0.3 + self.rng.gen::<f32>() * 0.7,
                    0.3 + self.rng.gen::<f32>() * 0.7,
                ),
            });
        }
        if batch > 0 {
            dust.extend(self.dust_seeds[have..].iter().map(|s| s.anchor));
        }

        let t = self.time;
        let jitter = self.params.ambient_jitter;
        for (p, seed) in dust.positions_mut().iter_mut().zip(&self.dust_seeds) {
            let wobble = Vec3::new(
                (t * seed.freq.x + seed.phase.x).sin(),
                (t * seed.freq.y + seed.phase.y).sin(),
                (t * seed.freq.z + seed.phase.z).sin(),
            );
            *p = seed.anchor + wobble * jitter;
        }
        if let Some(colors) = dust.colors_mut() {
            for (i, c) in colors.iter_mut().enumerate() {
                *c = hsl_to_rgb((i as f32 * 0.001 + t * 0.03).rem_euclid(1.0), 0.5, 0.75);
            }
        }
    }

    fn capture_spiral(&mut self) {
        self.spiral.clear();
        for buffer in [self.grid.as_ref(), self.dust.as_ref()].into_iter().flatten() {
            self.spiral.extend(buffer.positions().iter().map(|p| SpiralStart {
                radius: (p.x * p.x + p.z * p.z).sqrt(),
                height: p.y,
            }));
        }
    }

    fn wind_spiral(&mut self, progress: f32) {
        let shrink = 1.0 - progress.clamp(0.0, 1.0);
        let t = self.time;
        let mut starts = self.spiral.iter().enumerate();
        for buffer in [self.grid.as_mut(), self.dust.as_mut()].into_iter().flatten() {
            for p in buffer.positions_mut() {
                let Some((i, start)) = starts.next() else {
                    return;
                };
                let angle = i as f32 * 0.01 + t * 2.0;
                let r = start.radius * shrink;
                *p = Vec3::new(angle.cos() * r, start.height * shrink, angle.sin() * r);
            }
        }
    }

    fn sync_materials(&mut self) {
        for buffer in [self.grid.as_mut(), self.dust.as_mut()].into_iter().flatten() {
            buffer.material.opacity = self.opacity;
        }
    }
}

impl Effect for WaveEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Wave
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
                self.animate_grid();
                self.grow_dust();
                self.machine.step(dt);
                self.opacity = self.machine.progress();
            }
            Phase::Exiting => {
                self.time += dt;
                let entered = self.machine.step(dt);
                let progress = self.machine.progress();
                self.wind_spiral(progress);
                self.opacity = self.exit_from * (1.0 - progress);
                if entered == Some(Phase::Disposed) {
                    self.opacity = 0.0;
                    self.grid = None;
                    self.dust = None;
                    self.sampler = None;
                    self.spiral = Vec::new();
                    log::info!(
                        "[wave] disposed ({} buffers still live)",
                        self.buffers.live()
                    );
                }
            }
            Phase::Disposed => return,
        }
        self.sync_materials();
    }

    fn stop(&mut self) {
        if self.machine.request_stop() {
            self.exit_from = self.opacity;
            if let Some(sampler) = self.sampler.as_mut() {
                sampler.release();
            }
            self.capture_spiral();
            log::info!("[wave] spiral out over {:.1}s", self.params.exit_seconds);
        }
    }

    fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        [self.grid.as_ref(), self.dust.as_ref()]
            .into_iter()
            .flatten()
            .collect()
    }
}
