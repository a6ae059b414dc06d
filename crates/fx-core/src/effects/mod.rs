//! The effect contract and the closed registry of effect kinds.

pub mod external;
pub mod heart;
pub mod liberation;
pub mod wave;

use crate::buffer::{BufferTracker, ParticleBuffer};
use crate::clock::FrameTime;
use crate::config::FxParams;
use crate::error::EffectError;
use crate::phase::Phase;
use crate::presentation::PresentationState;
use crate::scene::{Asset, Camera, Interactable};
use crate::spectrum::AudioBackend;
use rand::rngs::StdRng;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Heart,
    Wave,
    Liberation,
    Sheep,
    Daisy,
    Ghost,
    Globe,
    EightBall,
    Flappy,
    Playlist,
    Popup,
}

/// Builds a running effect. Every kind shares this signature.
pub type EffectConstructor = fn(&mut EffectContext<'_>) -> Result<Box<dyn Effect>, EffectError>;

impl EffectKind {
    pub const ALL: [EffectKind; 11] = [
        EffectKind::Heart,
        EffectKind::Wave,
        EffectKind::Liberation,
        EffectKind::Sheep,
        EffectKind::Daisy,
        EffectKind::Ghost,
        EffectKind::Globe,
        EffectKind::EightBall,
        EffectKind::Flappy,
        EffectKind::Playlist,
        EffectKind::Popup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Heart => "heart",
            EffectKind::Wave => "wave",
            EffectKind::Liberation => "liberation",
            EffectKind::Sheep => "sheep",
            EffectKind::Daisy => "daisy",
            EffectKind::Ghost => "ghost",
            EffectKind::Globe => "globe",
            EffectKind::EightBall => "eight-ball",
            EffectKind::Flappy => "flappy",
            EffectKind::Playlist => "playlist",
            EffectKind::Popup => "popup",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, EffectError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| EffectError::UnknownEffect(name.to_string()))
    }

    /// Assets that must be loaded before this effect may start.
    pub fn required_assets(self) -> &'static [Asset] {
        match self {
            EffectKind::Wave => &[Asset::WaveTrack],
            EffectKind::Daisy => &[Asset::DaisyTrack],
            EffectKind::Liberation => &[Asset::GlyphFont],
            EffectKind::Flappy => &[Asset::Scene, Asset::FlappyModel],
            EffectKind::Ghost => &[Asset::Scene],
            EffectKind::Heart
            | EffectKind::Sheep
            | EffectKind::Globe
            | EffectKind::EightBall
            | EffectKind::Playlist
            | EffectKind::Popup => &[],
        }
    }

    pub fn constructor(self) -> EffectConstructor {
        match self {
            EffectKind::Heart => heart::start,
            EffectKind::Wave => wave::start,
            EffectKind::Liberation => liberation::start,
            EffectKind::Sheep
            | EffectKind::Daisy
            | EffectKind::Ghost
            | EffectKind::Globe
            | EffectKind::EightBall
            | EffectKind::Flappy
            | EffectKind::Playlist
            | EffectKind::Popup => external::start,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a constructor may touch while allocating an effect.
pub struct EffectContext<'a> {
    pub kind: EffectKind,
    pub time: FrameTime,
    pub camera: &'a Camera,
    pub presentation: &'a mut PresentationState,
    pub rng: &'a mut StdRng,
    pub audio: &'a mut dyn AudioBackend,
    pub buffers: &'a BufferTracker,
    pub params: &'a FxParams,
    /// The interactable that was clicked, if the start came from the scene.
    pub source: Option<&'a Interactable>,
}

/// Per-frame inputs for a running effect.
pub struct FrameContext<'a> {
    pub time: FrameTime,
    pub camera: &'a Camera,
    pub presentation: &'a mut PresentationState,
}

/// A running, self-contained presentation started by the orchestrator.
pub trait Effect {
    fn kind(&self) -> EffectKind;

    fn phase(&self) -> Phase;

    /// Current material opacity of the effect's primary layer.
    fn opacity(&self) -> f32;

    /// Advance one frame. Disposed effects ignore further frames.
    fn frame(&mut self, ctx: &mut FrameContext<'_>);

    /// Begin the bounded teardown. Never fails; repeated calls are no-ops.
    fn stop(&mut self);

    /// In-effect interaction while the effect owns the click.
    fn on_click(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Buffers currently attached to the scene, for the renderer.
    fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]>;

    fn is_disposed(&self) -> bool {
        self.phase() == Phase::Disposed
    }
}
