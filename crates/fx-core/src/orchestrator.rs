//! Holds the single effect slot and is the only way effects start or stop.
//!
//! The slot is either empty, running one effect, or retiring one effect that
//! is still playing its teardown. Starting anything new first drains the
//! retiring effect's remaining teardown in simulation time, so the previous
//! effect's buffers are gone before the next constructor allocates.

use crate::buffer::ParticleBuffer;
use crate::clock::FrameTime;
use crate::constants::{MAX_DRAIN_FRAMES, REFERENCE_FRAME_DT};
use crate::effects::{Effect, EffectContext, EffectKind, FrameContext};
use crate::error::EffectError;
use crate::phase::Phase;
use crate::presentation::PresentationState;
use crate::scene::{AssetReadiness, Camera};
use smallvec::SmallVec;

pub struct EffectHandle {
    kind: EffectKind,
    effect: Box<dyn Effect>,
    started_frame: u64,
}

impl EffectHandle {
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    pub fn started_frame(&self) -> u64 {
        self.started_frame
    }
}

#[derive(Default)]
enum Slot {
    #[default]
    Idle,
    Running(EffectHandle),
    Retiring(EffectHandle),
}

#[derive(Default)]
pub struct Orchestrator {
    slot: Slot,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `ctx.kind`, stopping and fully tearing down whatever ran before.
    ///
    /// Missing assets reject the start before anything changes. A constructor
    /// failure after the previous effect was stopped leaves the slot empty.
    pub fn start(
        &mut self,
        ctx: &mut EffectContext<'_>,
        assets: &AssetReadiness,
    ) -> Result<(), EffectError> {
        let kind = ctx.kind;
        if let Some(asset) = assets.first_missing(kind.required_assets()) {
            log::warn!("[orchestrator] {} rejected: {:?} not ready", kind, asset);
            return Err(EffectError::AssetNotReady { kind, asset });
        }

        self.stop_all(ctx.presentation);
        self.drain(ctx.time, ctx.camera, ctx.presentation);

        match (kind.constructor())(ctx) {
            Ok(effect) => {
                log::info!("[orchestrator] started {}", kind);
                self.slot = Slot::Running(EffectHandle {
                    kind,
                    effect,
                    started_frame: ctx.time.frame,
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("[orchestrator] {} failed to start: {}", kind, e);
                Err(e)
            }
        }
    }

    /// Stop the running effect, if any, and restore shared presentation.
    /// Its teardown keeps animating on later frames. Returns whether anything
    /// was stopped; calling it with nothing running is a no-op.
    pub fn stop_all(&mut self, presentation: &mut PresentationState) -> bool {
        match std::mem::take(&mut self.slot) {
            Slot::Running(mut handle) => {
                handle.effect.stop();
                presentation.restore_defaults();
                log::info!("[orchestrator] stopping {}", handle.kind);
                self.slot = Slot::Retiring(handle);
                true
            }
            other => {
                self.slot = other;
                false
            }
        }
    }

    /// Advance the running or retiring effect by one frame.
    pub fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        match &mut self.slot {
            Slot::Idle => {}
            Slot::Running(handle) | Slot::Retiring(handle) => {
                handle.effect.frame(ctx);
                if handle.effect.is_disposed() {
                    log::info!("[orchestrator] {} released", handle.kind);
                    self.slot = Slot::Idle;
                }
            }
        }
    }

    /// Forward a click to the running effect. Returns false when nothing is
    /// running, so the caller may treat the click as a scene pick instead.
    pub fn on_click(&mut self, ctx: &mut FrameContext<'_>) -> bool {
        match &mut self.slot {
            Slot::Running(handle) => {
                handle.effect.on_click(ctx);
                true
            }
            Slot::Idle | Slot::Retiring(_) => false,
        }
    }

    /// Finish a retiring effect's teardown right now, stepping it at the
    /// reference frame rate from `time`.
    fn drain(&mut self, time: FrameTime, camera: &Camera, presentation: &mut PresentationState) {
        let Slot::Retiring(handle) = &mut self.slot else {
            return;
        };
        let mut t = time;
        let mut steps = 0;
        while !handle.effect.is_disposed() {
            if steps >= MAX_DRAIN_FRAMES {
                log::warn!(
                    "[orchestrator] {} teardown exceeded {} frames; dropping",
                    handle.kind,
                    MAX_DRAIN_FRAMES
                );
                break;
            }
            t = t.advanced(REFERENCE_FRAME_DT);
            handle.effect.frame(&mut FrameContext {
                time: t,
                camera,
                presentation: &mut *presentation,
            });
            steps += 1;
        }
        log::debug!("[orchestrator] drained {} in {} frames", handle.kind, steps);
        self.slot = Slot::Idle;
    }

    /// An effect owns the click and the stage (Spawn or Active).
    pub fn is_active(&self) -> bool {
        matches!(self.slot, Slot::Running(_))
    }

    /// Nothing running and nothing tearing down.
    pub fn is_idle(&self) -> bool {
        matches!(self.slot, Slot::Idle)
    }

    pub fn active_kind(&self) -> Option<EffectKind> {
        match &self.slot {
            Slot::Running(h) => Some(h.kind),
            _ => None,
        }
    }

    pub fn handle(&self) -> Option<&EffectHandle> {
        match &self.slot {
            Slot::Idle => None,
            Slot::Running(h) | Slot::Retiring(h) => Some(h),
        }
    }

    /// Phase of whichever effect occupies the slot.
    pub fn phase(&self) -> Option<Phase> {
        self.handle().map(|h| h.effect.phase())
    }

    pub fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        self.handle()
            .map(|h| h.effect.layers())
            .unwrap_or_default()
    }
}
