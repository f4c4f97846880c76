//! Configuration errors, reported once at startup.

use crate::dance::Dance;

/// A defect in the static configuration.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The dance table has more rows than the resolver can track.
    #[error("dance table has {found} channels, at most {max} are supported")]
    TooManyChannels { found: usize, max: usize },
    /// A layer refers to a dance channel with no table row.
    #[error("key ({row}, {col}) of layer {layer} uses dance channel {channel}, which has no table row")]
    MissingChannel {
        layer: usize,
        row: usize,
        col: usize,
        channel: usize,
    },
    /// A resolution holds an output without releasing it on supersession.
    #[error("channel {channel} holds an output on {dance:?} and never releases it")]
    UnreleasedHold { channel: usize, dance: Dance },
    /// A resolution releases output for a dance that never leaves output open.
    #[error("channel {channel} retracts output on {dance:?}, which is never superseded")]
    UnexpectedRetraction { channel: usize, dance: Dance },
}
