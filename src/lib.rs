// DanceSync - Library exports for the client binary, tests and benchmarks

pub mod api;
pub mod config;
pub mod dance;
pub mod effects;
pub mod headless;
pub mod messaging;
pub mod scheduler;
pub mod session;
pub mod sync;

// Re-export commonly used types for convenience
pub use api::{ApiError, SongData, SongDataClient};
pub use config::{ConfigError, SyncConfig};
pub use dance::{
    AnimationLengthCache, AnimationTrack, Animator, ChannelPhase, ClipMetadata, ClipMetadataSource,
    ClipRef, DanceEngine, DanceError, DanceId, DanceLibrary, LengthRequest, PlayerId,
};
pub use effects::{EffectCommand, VisualEffects};
pub use messaging::{DanceRelay, DanceSelection, create_selection_channel, parse_chat_command};
pub use session::{PlaybackSource, SessionId, SyncSession, TickReport};
pub use sync::{Beat, BeatGrid, BeatTracker, SongSection, Tempo};
