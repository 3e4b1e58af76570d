// Sync module - Beat grid, song sections, tempo and the polling tracker
// Converts a live playback position into beat/section transitions

pub mod beat_grid;
pub mod sections;
pub mod tempo;
pub mod tracker;

pub use beat_grid::{Beat, BeatGrid};
pub use sections::{SectionMap, SongSection};
pub use tempo::Tempo;
pub use tracker::{BeatTracker, PollThrottle, SectionChange, TrackerUpdate};
