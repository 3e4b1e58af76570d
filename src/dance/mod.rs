// Dance module - Phase-locked, tempo-adjusted dance animations per player

pub mod cache;
pub mod channel;
pub mod config;
pub mod engine;
pub mod host;
pub mod speed;

pub use cache::AnimationLengthCache;
pub use channel::{ChannelPhase, DanceChannel, LoadWait, PlayerId};
pub use config::{DanceConfig, DanceId, DanceLibrary};
pub use engine::{DanceEngine, DanceSettings, LengthRequest};
pub use host::{AnimationTrack, Animator, ClipMetadata, ClipMetadataSource, ClipRef};

use thiserror::Error;

/// Dance-related errors
/// Never raised past the engine: operations log these and leave state unchanged
#[derive(Debug, Error)]
pub enum DanceError {
    #[error("Unknown dance: {0}")]
    UnknownDance(String),

    #[error("Failed to load clip {0}: {1}")]
    ClipLoadFailed(ClipRef, String),

    #[error("Failed to fetch metadata for clip {0}: {1}")]
    MetadataFailed(ClipRef, String),

    #[error("Clip {0} has no usable length")]
    InvalidClipLength(ClipRef),
}

pub type DanceResult<T> = Result<T, DanceError>;
