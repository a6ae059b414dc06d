//! Pointer picking and hover feedback.

use crate::constants::{HOVER_RAISE, HOVER_SMOOTHING, REFERENCE_FRAME_DT};
use crate::scene::{ray_sphere, Camera, InteractableRegistry, Ray};
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverParams {
    /// Vertical lift of a hovered interactable.
    pub raise: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub smoothing: f32,
}

impl Default for HoverParams {
    fn default() -> Self {
        Self {
            raise: HOVER_RAISE,
            smoothing: HOVER_SMOOTHING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
}

#[derive(Debug, Default)]
pub struct InteractionRouter {
    params: HoverParams,
    pointer: Option<Vec2>,
    hovered: Option<usize>,
}

/// Exponential smoothing factor for one frame of `dt` seconds, equal to
/// `per_frame` at the reference rate.
#[inline]
pub fn frame_smoothing(per_frame: f32, dt: f32) -> f32 {
    let frames = (dt / REFERENCE_FRAME_DT).max(0.0);
    1.0 - (1.0 - per_frame.clamp(0.0, 1.0)).powf(frames)
}

/// Pointer position in CSS pixels relative to the canvas, mapped to normalized
/// device coordinates (+Y up). `None` for an empty or degenerate canvas.
pub fn pixel_to_ndc(px: Vec2, size: Vec2) -> Option<Vec2> {
    if !(size.x > 0.0 && size.y > 0.0) || !px.is_finite() {
        return None;
    }
    Some(Vec2::new(
        px.x / size.x * 2.0 - 1.0,
        1.0 - px.y / size.y * 2.0,
    ))
}

/// Every interactable the ray passes through, nearest first.
pub fn intersect_all(ray: &Ray, registry: &InteractableRegistry) -> SmallVec<[Hit; 4]> {
    let mut hits: SmallVec<[Hit; 4]> = registry
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            ray_sphere(ray.origin, ray.dir, item.animated().position, item.pick_radius())
                .map(|distance| Hit { index, distance })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

impl InteractionRouter {
    pub fn new(params: HoverParams) -> Self {
        Self {
            params,
            pointer: None,
            hovered: None,
        }
    }

    /// Record the pointer in normalized device coordinates. Non-finite input
    /// is ignored.
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        if ndc.is_finite() {
            self.pointer = Some(ndc);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Resolve the hovered interactable for this frame and ease every
    /// interactable toward its hover target.
    pub fn update(
        &mut self,
        camera: &Camera,
        registry: &mut InteractableRegistry,
        dt: f32,
    ) -> Option<usize> {
        let hovered = self
            .pointer
            .map(|ndc| camera.ray_from_ndc(ndc))
            .and_then(|ray| intersect_all(&ray, registry).first().map(|h| h.index));

        if hovered != self.hovered {
            match hovered.and_then(|i| registry.at(i)) {
                Some(item) => log::info!("[router] hover {}", item.id()),
                None => log::debug!("[router] hover cleared"),
            }
            self.hovered = hovered;
        }

        let alpha = frame_smoothing(self.params.smoothing, dt);
        for (i, item) in registry.iter_mut().enumerate() {
            let base = item.base();
            let lift = if Some(i) == hovered { self.params.raise } else { 0.0 };
            let target_y = base.position.y + lift;
            let anim = &mut item.animated;
            anim.position.x = base.position.x;
            anim.position.z = base.position.z;
            anim.position.y += (target_y - anim.position.y) * alpha;
            anim.yaw += (base.yaw - anim.yaw) * alpha;
        }
        hovered
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn hovered_id<'a>(&self, registry: &'a InteractableRegistry) -> Option<&'a str> {
        self.hovered.and_then(|i| registry.at(i)).map(|item| item.id())
    }

    /// The interactable a click should activate, or `None` when nothing is
    /// hovered or an effect already owns the click.
    pub fn click_target(&self, effect_active: bool) -> Option<usize> {
        if effect_active {
            return None;
        }
        self.hovered
    }

    pub fn cursor(&self) -> Cursor {
        if self.hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }
}
