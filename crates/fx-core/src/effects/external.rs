//! Effects whose visuals live outside this crate (the sheep gag, the globe
//! panel, the minigame, the playlist embed, plain popups). They still run the
//! common lifecycle so exclusivity and teardown stay uniform; here they only
//! set presentation state and hold whatever audio they opened.

use super::{Effect, EffectContext, EffectKind, FrameContext};
use crate::buffer::ParticleBuffer;
use crate::constants::{DAISY_TRACK, NIGHT_BACKGROUND, NIGHT_VISION_FOG};
use crate::error::EffectError;
use crate::phase::{Phase, PhaseMachine, Span};
use crate::presentation::{Fog, Sky, Tint};
use crate::spectrum::SpectrumSource;
use smallvec::SmallVec;

const NIGHT_TINT: [f32; 3] = [0.102, 0.169, 0.298]; // #1a2b4c
const NIGHT_VISION_TINT: [f32; 3] = [0.467, 0.467, 0.467]; // #777777

/// Popup copy for named interactables.
pub fn popup_text(id: &str) -> Option<&'static str> {
    let text = match id {
        "book1" => "This is book 1, full of adventures!",
        "book2" => "Book 2: mystery awaits.",
        "book3" => "Go to couch.",
        "book4" => "Happy birthday!",
        "book5" => "Book 5: secrets revealed.",
        "book6" => "Flappy",
        "book53" => "Book 53: the hidden gem.",
        "globe" => "A tiny globe of the world!",
        "daisy" => "\u{2764}\u{fe0f}",
        "Chihuahua" => "psychic",
        _ => return None,
    };
    Some(text)
}

pub struct ExternalEffect {
    kind: EffectKind,
    machine: PhaseMachine,
    stream: Option<Box<dyn SpectrumSource>>,
}

pub fn start(ctx: &mut EffectContext<'_>) -> Result<Box<dyn Effect>, EffectError> {
    let kind = ctx.kind;
    let source_id = ctx.source.map(|s| s.id().to_string());
    let mut stream = None;

    // Open audio before touching presentation so a failure leaves it untouched.
    if kind == EffectKind::Daisy {
        stream = Some(ctx.audio.open(DAISY_TRACK)?);
    }

    let p = &mut *ctx.presentation;
    match kind {
        EffectKind::Sheep => {
            p.background = NIGHT_BACKGROUND;
            p.fog = Some(Fog {
                color: NIGHT_BACKGROUND,
                near: 3.0,
                far: 30.0,
            });
            p.tint = Some(Tint::Night {
                color: NIGHT_TINT,
                amount: 0.95,
            });
            p.popup = popup_text("book3").map(str::to_string);
        }
        EffectKind::Daisy => {
            p.sky = Sky::TieDye { time: 0.0 };
            p.ambient_playing = false;
        }
        EffectKind::Ghost => {
            p.tint = Some(Tint::NightVision {
                color: NIGHT_VISION_TINT,
            });
            p.fog = Some(Fog {
                color: NIGHT_VISION_FOG,
                near: 2.0,
                far: 40.0,
            });
        }
        EffectKind::Globe => p.popup = popup_text("globe").map(str::to_string),
        EffectKind::EightBall => p.popup = popup_text("Chihuahua").map(str::to_string),
        EffectKind::Playlist => {
            p.ambient_playing = false;
            p.popup = Some("Our Playlist".to_string());
        }
        EffectKind::Popup => {
            let id = source_id.as_deref().unwrap_or("nothing");
            p.popup = Some(
                popup_text(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("You clicked: {id}")),
            );
        }
        EffectKind::Flappy => {}
        EffectKind::Heart | EffectKind::Wave | EffectKind::Liberation => {
            log::warn!("[external] {} has its own simulation", kind);
        }
    }
    log::info!("[external] start {}", kind);
    Ok(Box::new(ExternalEffect {
        kind,
        machine: PhaseMachine::new(Span::INSTANT, Span::INSTANT),
        stream,
    }))
}

impl ExternalEffect {
    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for ExternalEffect {
    fn drop(&mut self) {
        self.release_stream();
    }
}

impl Effect for ExternalEffect {
    fn kind(&self) -> EffectKind {
        self.kind
    }

    fn phase(&self) -> Phase {
        self.machine.phase()
    }

    fn opacity(&self) -> f32 {
        if self.machine.phase().is_live() {
            1.0
        } else {
            0.0
        }
    }

    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if self.machine.step(ctx.time.delta) == Some(Phase::Disposed) {
            self.release_stream();
            log::info!("[external] {} disposed", self.kind);
        }
    }

    fn stop(&mut self) {
        if self.machine.request_stop() {
            self.release_stream();
        }
    }

    fn layers(&self) -> SmallVec<[&ParticleBuffer; 2]> {
        SmallVec::new()
    }
}
