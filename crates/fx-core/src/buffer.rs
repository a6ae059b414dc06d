//! Flat per-particle storage handed to the renderer every frame.
//!
//! Buffers hold no lifecycle logic of their own. Each allocation takes a lease
//! from a shared [`BufferTracker`]; dropping the buffer returns the lease, so a
//! simulation disposes its buffers simply by letting go of them.

use glam::Vec3;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct TrackerCounts {
    live: Cell<usize>,
    allocated: Cell<usize>,
}

/// Counts live particle buffers. Cloning shares the same counters.
#[derive(Clone, Debug, Default)]
pub struct BufferTracker {
    counts: Rc<TrackerCounts>,
}

impl BufferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers allocated and not yet dropped.
    pub fn live(&self) -> usize {
        self.counts.live.get()
    }

    /// Buffers allocated over the tracker's lifetime.
    pub fn allocated(&self) -> usize {
        self.counts.allocated.get()
    }

    fn lease(&self) -> BufferLease {
        self.counts.live.set(self.counts.live.get() + 1);
        self.counts.allocated.set(self.counts.allocated.get() + 1);
        BufferLease {
            counts: self.counts.clone(),
        }
    }
}

#[derive(Debug)]
struct BufferLease {
    counts: Rc<TrackerCounts>,
}

impl Drop for BufferLease {
    fn drop(&mut self) {
        let live = self.counts.live.get();
        self.counts.live.set(live.saturating_sub(1));
    }
}

/// Material parameters the renderer applies to a whole buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub opacity: f32,
    pub size: f32,
    pub additive: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            size: 0.05,
            additive: true,
        }
    }
}

/// Object-level transform of a buffer: positions are local to `origin`,
/// rotated by `yaw` around +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BufferTransform {
    pub origin: Vec3,
    pub yaw: f32,
}

#[derive(Debug)]
pub struct ParticleBuffer {
    label: &'static str,
    positions: Vec<Vec3>,
    colors: Option<Vec<Vec3>>,
    glyphs: Option<Vec<char>>,
    pub material: Material,
    pub transform: BufferTransform,
    _lease: BufferLease,
}

impl ParticleBuffer {
    pub fn new(tracker: &BufferTracker, label: &'static str, positions: Vec<Vec3>) -> Self {
        Self {
            label,
            positions,
            colors: None,
            glyphs: None,
            material: Material::default(),
            transform: BufferTransform::default(),
            _lease: tracker.lease(),
        }
    }

    /// Attach per-particle colors. Lengths are padded or truncated to match
    /// the position count.
    pub fn with_colors(mut self, mut colors: Vec<Vec3>) -> Self {
        colors.resize(self.positions.len(), Vec3::ONE);
        self.colors = Some(colors);
        self
    }

    /// Mark the buffer as a set of glyph sprites, one glyph per position.
    pub fn with_glyphs(mut self, glyphs: Vec<char>) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_transform(mut self, transform: BufferTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Grow the buffer in place; new particles get white if colors are present.
    pub fn extend(&mut self, positions: impl IntoIterator<Item = Vec3>) {
        self.positions.extend(positions);
        if let Some(colors) = &mut self.colors {
            colors.resize(self.positions.len(), Vec3::ONE);
        }
    }

    pub fn colors(&self) -> Option<&[Vec3]> {
        self.colors.as_deref()
    }

    pub fn colors_mut(&mut self) -> Option<&mut [Vec3]> {
        self.colors.as_deref_mut()
    }

    pub fn glyphs(&self) -> Option<&[char]> {
        self.glyphs.as_deref()
    }

    /// Positions as `[x0, y0, z0, x1, ...]`, ready for a vertex upload.
    pub fn as_flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn as_flat_colors(&self) -> Option<&[f32]> {
        self.colors.as_deref().map(bytemuck::cast_slice)
    }
}
