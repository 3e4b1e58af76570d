// Music analysis API client
// One request per song; failures are returned to the caller, never thrown into the tick loop

use super::ApiError;
use super::types::SongData;
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP client for the song analysis endpoint
#[derive(Debug, Clone)]
pub struct SongDataClient {
    http: reqwest::Client,
    base_url: String,
}

impl SongDataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for one song
    pub fn song_url(&self, song_id: &str) -> String {
        format!("{}/songs/{}", self.base_url, song_id)
    }

    /// Fetch analysis data for a song
    /// Ok(None) when the API has no data for it (404)
    pub async fn get_song_data(&self, song_id: &str) -> Result<Option<SongData>, ApiError> {
        let url = self.song_url(song_id);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::info!("No analysis data for song {}", song_id);
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.text().await?;
                Ok(Some(SongData::from_json(&body)?))
            }
            status => Err(ApiError::Status(status.as_u16())),
        }
    }
}
