// Music analysis API response types
// Every field except the asset id may be missing; consumers degrade per field

use crate::sync::{BeatGrid, SongSection, Tempo};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Audio asset identifier; the API sends either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Numeric(id) => write!(f, "{}", id),
            AssetId::Text(id) => f.write_str(id),
        }
    }
}

/// Beat grid as parallel arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBeatGrid {
    #[serde(default)]
    pub beat_nums: Vec<i64>,
    #[serde(default)]
    pub beat_times: Vec<f64>,
}

/// Analysis data for one song
/// A malformed optional field is dropped on its own; the rest of the response survives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongData {
    pub asset_id: AssetId,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub beat_grid: Option<RawBeatGrid>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub song_sections: Option<Vec<SongSection>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub num_bars: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub asset_first_beat_offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub asset_first_downbeat: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub asset_bpm: Option<f64>,
}

/// Optional field that degrades to None (with a warning) when it does not parse
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| parse_or_warn(value, "field")))
}

/// Optional list whose malformed entries are dropped individually
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(
            entries
                .into_iter()
                .filter_map(|entry| parse_or_warn(entry, "list entry"))
                .collect(),
        )),
        Some(other) => {
            tracing::warn!("Ignoring malformed song data list: {}", other);
            Ok(None)
        }
    }
}

fn parse_or_warn<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring malformed song data {}: {}", what, e);
            None
        }
    }
}

impl SongData {
    /// Parse a JSON response body
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Beat grid ready for tracking, if the response had one
    pub fn beat_grid(&self) -> Option<BeatGrid> {
        self.beat_grid
            .as_ref()
            .map(|raw| BeatGrid::from_parallel(&raw.beat_nums, &raw.beat_times))
    }

    pub fn sections(&self) -> Option<Vec<SongSection>> {
        self.song_sections.clone()
    }

    /// Tempo reported by the analysis, when positive
    pub fn reported_tempo(&self) -> Option<Tempo> {
        self.asset_bpm.and_then(Tempo::new)
    }

    /// Tempo for dancing: reported BPM, else estimated from the grid, else the fallback
    pub fn resolve_tempo(&self, fallback_bpm: f64) -> Tempo {
        self.reported_tempo()
            .or_else(|| self.beat_grid().and_then(|grid| grid.estimate_tempo()))
            .unwrap_or_else(|| Tempo::or_fallback(None, fallback_bpm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "asset_id": 1837465,
        "beat_grid": { "beat_nums": [1, 2, 3, 4], "beat_times": [0.0, 0.5, 1.0, 1.5] },
        "song_sections": [
            { "name": "Verse", "start_time": 8.0, "end_time": 16.0 },
            { "name": "Intro", "start_time": 0.0, "end_time": 8.0 }
        ],
        "num_bars": 64,
        "asset_first_beat_offset": 0.02,
        "asset_first_downbeat": 0.02,
        "asset_bpm": 128.0
    }"#;

    #[test]
    fn test_parse_full_response() {
        let data = SongData::from_json(FULL).unwrap();
        assert_eq!(data.asset_id, AssetId::Numeric(1837465));
        assert_eq!(data.beat_grid().unwrap().len(), 4);
        assert_eq!(data.sections().unwrap().len(), 2);
        assert_eq!(data.num_bars, Some(64));
        assert_eq!(data.resolve_tempo(120.0).bpm(), 128.0);
    }

    #[test]
    fn test_parse_minimal_response() {
        let data = SongData::from_json(r#"{ "asset_id": "rbx-42" }"#).unwrap();
        assert_eq!(data.asset_id.to_string(), "rbx-42");
        assert!(data.beat_grid().is_none());
        assert!(data.sections().is_none());
        assert_eq!(data.resolve_tempo(100.0).bpm(), 100.0);
    }

    #[test]
    fn test_tempo_estimated_from_grid() {
        let data = SongData::from_json(
            r#"{ "asset_id": 1, "asset_bpm": 0,
                 "beat_grid": { "beat_nums": [1, 2, 3], "beat_times": [0.0, 0.6, 1.2] } }"#,
        )
        .unwrap();
        assert!((data.resolve_tempo(120.0).bpm() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_sections_keep_beat_grid() {
        let data = SongData::from_json(
            r#"{ "asset_id": 9,
                 "beat_grid": { "beat_nums": [1, 2, 3, 4], "beat_times": [0.0, 0.5, 1.0, 1.5] },
                 "song_sections": [
                     { "name": "Intro", "start_time": 0.0, "end_time": null },
                     { "name": "Verse", "start_time": 8.0, "end_time": 16.0 }
                 ] }"#,
        )
        .unwrap();
        assert_eq!(data.beat_grid().unwrap().len(), 4);
        let sections = data.sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Verse");
    }

    #[test]
    fn test_malformed_fields_degrade_independently() {
        let data = SongData::from_json(
            r#"{ "asset_id": 9,
                 "beat_grid": { "beat_nums": "oops" },
                 "song_sections": { "name": "Intro" },
                 "asset_bpm": "fast",
                 "num_bars": 32 }"#,
        )
        .unwrap();
        assert!(data.beat_grid.is_none());
        assert!(data.song_sections.is_none());
        assert!(data.asset_bpm.is_none());
        assert_eq!(data.num_bars, Some(32));
        assert_eq!(data.resolve_tempo(110.0).bpm(), 110.0);
    }

    #[test]
    fn test_null_fields_are_absent() {
        let data = SongData::from_json(
            r#"{ "asset_id": 7, "beat_grid": null, "song_sections": null, "asset_bpm": null }"#,
        )
        .unwrap();
        assert!(data.beat_grid.is_none());
        assert!(data.reported_tempo().is_none());
    }
}
