use crate::effects::heart::HeartParams;
use crate::effects::liberation::LiberationParams;
use crate::effects::wave::WaveParams;
use crate::router::HoverParams;

/// Every tunable of the host, with defaults matching the reading room.
#[derive(Clone, Debug, PartialEq)]
pub struct FxParams {
    /// Seed for all particle randomness; a fixed seed replays identically.
    pub seed: u64,
    pub hover: HoverParams,
    pub heart: HeartParams,
    pub wave: WaveParams,
    pub liberation: LiberationParams,
}

impl Default for FxParams {
    fn default() -> Self {
        Self {
            seed: 42,
            hover: HoverParams::default(),
            heart: HeartParams::default(),
            wave: WaveParams::default(),
            liberation: LiberationParams::default(),
        }
    }
}

impl FxParams {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
