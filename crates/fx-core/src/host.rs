//! The per-page host: owns the clock, scene, router and orchestrator and ticks
//! them in a fixed order once per display frame.

use crate::buffer::{BufferTracker, ParticleBuffer};
use crate::clock::{FrameClock, FrameTime};
use crate::config::FxParams;
use crate::effects::{EffectContext, EffectKind, FrameContext};
use crate::error::EffectError;
use crate::orchestrator::Orchestrator;
use crate::phase::Phase;
use crate::presentation::PresentationState;
use crate::router::{Cursor, InteractionRouter};
use crate::scene::{
    default_binding, AssetReadiness, Camera, Interactable, InteractableRegistry, Transform,
};
use crate::spectrum::AudioBackend;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

/// What happened during one frame, for logging and front-end bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub time: FrameTime,
    pub hovered: Option<usize>,
    pub active: Option<EffectKind>,
    pub phase: Option<Phase>,
    pub live_buffers: usize,
}

pub struct FxHost {
    params: FxParams,
    clock: FrameClock,
    camera: Camera,
    registry: InteractableRegistry,
    router: InteractionRouter,
    orchestrator: Orchestrator,
    presentation: PresentationState,
    assets: AssetReadiness,
    audio: Box<dyn AudioBackend>,
    rng: StdRng,
    buffers: BufferTracker,
}

impl FxHost {
    pub fn new(params: FxParams, audio: Box<dyn AudioBackend>) -> Self {
        log::info!("[host] seed {}", params.seed);
        Self {
            clock: FrameClock::new(),
            camera: Camera::default(),
            registry: InteractableRegistry::new(),
            router: InteractionRouter::new(params.hover),
            orchestrator: Orchestrator::new(),
            presentation: PresentationState::default(),
            assets: AssetReadiness::default(),
            rng: StdRng::seed_from_u64(params.seed),
            buffers: BufferTracker::new(),
            audio,
            params,
        }
    }

    /// Register the named scene objects that have a known effect binding.
    /// Unbound names are skipped. Returns how many were registered.
    pub fn load_scene<'a>(
        &mut self,
        objects: impl IntoIterator<Item = (&'a str, Transform, f32)>,
    ) -> usize {
        let mut count = 0;
        for (name, transform, radius) in objects {
            if self.register_object(name, transform, radius) {
                count += 1;
            }
        }
        log::info!("[host] scene loaded with {} interactables", count);
        count
    }

    /// Register one scene object if it has an effect binding. Objects streamed
    /// in by a loader arrive this way, one call each.
    pub fn register_object(&mut self, name: &str, transform: Transform, radius: f32) -> bool {
        match default_binding(name) {
            Some(kind) => {
                self.registry.register(name, transform, radius, kind);
                log::debug!("[host] {} bound to {}", name, kind);
                true
            }
            None => {
                log::debug!("[host] {} has no effect binding", name);
                false
            }
        }
    }

    /// Advance everything by `dt` seconds: clock, hover, effect, presentation.
    pub fn frame(&mut self, dt: f32) -> FrameStats {
        let time = self.clock.tick(dt);
        self.step(time)
    }

    /// Like [`FxHost::frame`] but measures the step from the wall clock.
    pub fn frame_now(&mut self) -> FrameStats {
        let time = self.clock.tick_now();
        self.step(time)
    }

    fn step(&mut self, time: FrameTime) -> FrameStats {
        let hovered = self
            .router
            .update(&self.camera, &mut self.registry, time.delta);
        self.orchestrator.frame(&mut FrameContext {
            time,
            camera: &self.camera,
            presentation: &mut self.presentation,
        });
        self.presentation.advance(time.delta);
        FrameStats {
            time,
            hovered,
            active: self.orchestrator.active_kind(),
            phase: self.orchestrator.phase(),
            live_buffers: self.buffers.live(),
        }
    }

    pub fn pointer_moved(&mut self, ndc: Vec2) {
        self.router.pointer_moved(ndc);
    }

    pub fn pointer_left(&mut self) {
        self.router.pointer_left();
    }

    /// A primary click. The running effect gets it if there is one; otherwise
    /// the hovered interactable starts its bound effect.
    pub fn click(&mut self) -> Result<(), EffectError> {
        let time = self.clock.time();
        if self.orchestrator.on_click(&mut FrameContext {
            time,
            camera: &self.camera,
            presentation: &mut self.presentation,
        }) {
            return Ok(());
        }
        let Some(index) = self.router.click_target(self.orchestrator.is_active()) else {
            return Ok(());
        };
        let Some(item) = self.registry.at(index) else {
            return Ok(());
        };
        log::info!("[host] click {}", item.id());
        let kind = item.effect();
        self.start_with_source(kind, Some(index))
    }

    /// Start `kind` directly, as a keyboard shortcut or script would.
    pub fn start(&mut self, kind: EffectKind) -> Result<(), EffectError> {
        self.start_with_source(kind, None)
    }

    fn start_with_source(
        &mut self,
        kind: EffectKind,
        source: Option<usize>,
    ) -> Result<(), EffectError> {
        let mut ctx = EffectContext {
            kind,
            time: self.clock.time(),
            camera: &self.camera,
            presentation: &mut self.presentation,
            rng: &mut self.rng,
            audio: self.audio.as_mut(),
            buffers: &self.buffers,
            params: &self.params,
            source: source.and_then(|i| self.registry.at(i)),
        };
        self.orchestrator.start(&mut ctx, &self.assets)
    }

    /// Stop whatever is running; its teardown continues on later frames.
    pub fn stop_all(&mut self) -> bool {
        self.orchestrator.stop_all(&mut self.presentation)
    }

    pub fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        self.orchestrator.layers()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    pub fn hovered(&self) -> Option<&Interactable> {
        self.router.hovered().and_then(|i| self.registry.at(i))
    }

    pub fn cursor(&self) -> Cursor {
        self.router.cursor()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    pub fn registry(&self) -> &InteractableRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InteractableRegistry {
        &mut self.registry
    }

    pub fn assets_mut(&mut self) -> &mut AssetReadiness {
        &mut self.assets
    }

    pub fn buffers(&self) -> &BufferTracker {
        &self.buffers
    }

    pub fn params(&self) -> &FxParams {
        &self.params
    }

    pub fn time(&self) -> FrameTime {
        self.clock.time()
    }
}
