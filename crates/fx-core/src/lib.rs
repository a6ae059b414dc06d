pub mod buffer;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod phase;
pub mod presentation;
pub mod router;
pub mod scene;
pub mod spectrum;

pub use buffer::{BufferTracker, Material, ParticleBuffer};
pub use clock::{FrameClock, FrameTime};
pub use config::FxParams;
pub use effects::{Effect, EffectContext, EffectKind, FrameContext};
pub use error::EffectError;
pub use host::{FrameStats, FxHost};
pub use orchestrator::Orchestrator;
pub use phase::{Phase, PhaseMachine, Span};
pub use presentation::PresentationState;
pub use router::{Cursor, InteractionRouter};
pub use scene::{Asset, AssetReadiness, Camera, Interactable, InteractableRegistry, Transform};
pub use spectrum::{AudioBackend, SpectrumSampler, SpectrumSource};
