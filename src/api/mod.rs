// External music analysis API - Beat grids, sections and BPM per song

pub mod client;
pub mod types;

pub use client::SongDataClient;
pub use types::{AssetId, RawBeatGrid, SongData};

use thiserror::Error;

/// Music API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected status {0}")]
    Status(u16),
}
