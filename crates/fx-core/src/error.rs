use crate::effects::EffectKind;
use crate::scene::Asset;
use thiserror::Error;

/// Reasons an effect could not be started.
///
/// Stopping never fails: a second stop, or a stop with nothing running, is a
/// silent no-op and has no variant here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("effect `{kind}` needs {asset:?}, which has not finished loading")]
    AssetNotReady { kind: EffectKind, asset: Asset },

    #[error("audio track `{track}` unavailable: {reason}")]
    AudioUnavailable { track: String, reason: String },

    #[error("unknown effect `{0}`")]
    UnknownEffect(String),
}
