//! Scene-level presentation shared by all effects: background, fog, material
//! tint, sky animation, ambient music and the popup. Only the running effect
//! writes it; only the orchestrator's stop path restores it.

use crate::color::{hsl_to_rgb, lerp_rgb};
use crate::constants::{DEFAULT_BACKGROUND, REFERENCE_FRAME_DT, SKY_TIME_STEP};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

/// Whole-scene material tint the renderer applies to every mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tint {
    /// Lerp each material color toward `color` by `amount`.
    Night { color: [f32; 3], amount: f32 },
    /// Grayscale each material, then multiply by `color`.
    NightVision { color: [f32; 3] },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sky {
    Normal,
    TieDye { time: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PresentationState {
    pub background: [f32; 3],
    pub fog: Option<Fog>,
    pub tint: Option<Tint>,
    pub sky: Sky,
    pub ambient_playing: bool,
    pub popup: Option<String>,
}

impl Default for PresentationState {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            fog: None,
            tint: None,
            sky: Sky::Normal,
            ambient_playing: true,
            popup: None,
        }
    }
}

impl PresentationState {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn restore_defaults(&mut self) {
        *self = Self::default();
    }

    /// Advance per-frame presentation animation (the tie-dye sky).
    pub fn advance(&mut self, dt: f32) {
        if let Sky::TieDye { time } = &mut self.sky {
            *time += SKY_TIME_STEP * (dt / REFERENCE_FRAME_DT);
            self.background = tie_dye(*time);
        }
    }
}

fn tie_dye(time: f32) -> [f32; 3] {
    let palette = [
        hsl_to_rgb(0.95, 0.8, 0.7).to_array(),
        hsl_to_rgb(0.08, 0.8, 0.65).to_array(),
        hsl_to_rgb(0.55, 0.85, 0.7).to_array(),
        hsl_to_rgb(0.75, 0.8, 0.65).to_array(),
    ];
    let t = (time.sin() + 1.0) * 0.5;
    let scaled = t * (palette.len() - 1) as f32;
    let index = (scaled.floor() as usize).min(palette.len() - 1);
    let next = (index + 1) % palette.len();
    lerp_rgb(palette[index], palette[next], scaled.fract())
}
