//! Camera, interactable registry and asset readiness.

use crate::constants::{
    CAMERA_EYE, CAMERA_FOVY_DEG, CAMERA_TARGET, CAMERA_ZFAR, CAMERA_ZNEAR, DEFAULT_PICK_RADIUS,
};
use crate::effects::EffectKind;
use fnv::{FnvHashMap, FnvHashSet};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: CAMERA_EYE,
            target: CAMERA_TARGET,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect.max(1e-3), self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Unit view direction; falls back to -Z when eye and target coincide.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// World-space ray through a point in normalized device coordinates
    /// (`x`, `y` in `[-1, 1]`, +Y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = if far.w.abs() > f32::EPSILON {
            far.truncate() / far.w
        } else {
            self.eye + self.forward()
        };
        let dir = (far - self.eye).try_normalize().unwrap_or_else(|| self.forward());
        Ray {
            origin: self.eye,
            dir,
        }
    }

    /// Normalized device coordinates of a world point, or `None` when it lies
    /// behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

/// Distance along the ray to the first intersection with a sphere. A ray that
/// starts inside the sphere reports the exit point.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub yaw: f32,
}

/// A clickable scene object. The base transform is fixed at load time; hover
/// animation only touches `animated`.
#[derive(Clone, Debug)]
pub struct Interactable {
    id: String,
    effect: EffectKind,
    base: Transform,
    radius: f32,
    pub(crate) animated: Transform,
}

impl Interactable {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn effect(&self) -> EffectKind {
        self.effect
    }

    pub fn base(&self) -> Transform {
        self.base
    }

    pub fn animated(&self) -> Transform {
        self.animated
    }

    pub fn pick_radius(&self) -> f32 {
        self.radius
    }

    /// Vertical lift currently applied on top of the base transform.
    pub fn hover_offset(&self) -> f32 {
        self.animated.position.y - self.base.position.y
    }
}

#[derive(Clone, Debug, Default)]
pub struct InteractableRegistry {
    items: Vec<Interactable>,
    by_id: FnvHashMap<String, usize>,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interactable, or replace the one already registered under `id`.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        base: Transform,
        radius: f32,
        effect: EffectKind,
    ) {
        let id = id.into();
        let item = Interactable {
            id: id.clone(),
            effect,
            base,
            radius: if radius > 0.0 { radius } else { DEFAULT_PICK_RADIUS },
            animated: base,
        };
        match self.by_id.get(&id) {
            Some(&i) => self.items[i] = item,
            None => {
                self.by_id.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Interactable> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn at(&self, index: usize) -> Option<&Interactable> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interactable> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Interactable> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Which effect a named scene object triggers in the reading room.
pub const DEFAULT_BINDINGS: &[(&str, EffectKind)] = &[
    ("book1", EffectKind::Liberation),
    ("book2", EffectKind::Heart),
    ("book3", EffectKind::Sheep),
    ("book4", EffectKind::Popup),
    ("book5", EffectKind::Wave),
    ("book6", EffectKind::Flappy),
    ("book53", EffectKind::Ghost),
    ("globe", EffectKind::Globe),
    ("daisy", EffectKind::Daisy),
    ("Chihuahua", EffectKind::EightBall),
    ("milk", EffectKind::Playlist),
];

pub fn default_binding(name: &str) -> Option<EffectKind> {
    DEFAULT_BINDINGS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, kind)| kind)
}

/// Externally loaded resources an effect may depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    Scene,
    WaveTrack,
    DaisyTrack,
    GlyphFont,
    FlappyModel,
}

/// Readiness flags set by the loaders outside the frame loop.
#[derive(Clone, Debug, Default)]
pub struct AssetReadiness {
    ready: FnvHashSet<Asset>,
}

impl AssetReadiness {
    pub fn all_ready() -> Self {
        let mut r = Self::default();
        for asset in [
            Asset::Scene,
            Asset::WaveTrack,
            Asset::DaisyTrack,
            Asset::GlyphFont,
            Asset::FlappyModel,
        ] {
            r.mark_ready(asset);
        }
        r
    }

    pub fn mark_ready(&mut self, asset: Asset) {
        if self.ready.insert(asset) {
            log::info!("[assets] {:?} ready", asset);
        }
    }

    pub fn is_ready(&self, asset: Asset) -> bool {
        self.ready.contains(&asset)
    }

    /// First asset in `required` that is not loaded yet.
    pub fn first_missing(&self, required: &[Asset]) -> Option<Asset> {
        required.iter().copied().find(|a| !self.is_ready(*a))
    }
}
