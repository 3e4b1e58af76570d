// Host animation boundary
// One Animator per character rig; the engine never touches host objects directly

use super::DanceResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an animation clip asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipRef(String);

impl ClipRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded, playable animation track on one rig
pub trait AnimationTrack {
    /// Start playback, fading in over `fade` seconds, at playback rate `speed`
    fn play(&mut self, fade: f64, speed: f64);

    /// Stop playback, fading out over `fade` seconds (0 = hard cut)
    fn stop(&mut self, fade: f64);

    /// Change the playback rate without repositioning
    fn set_speed(&mut self, speed: f64);

    /// Jump to `seconds` within the clip
    fn set_time_position(&mut self, seconds: f64);
}

/// A character's animation rig
pub trait Animator {
    /// Load a clip onto this rig
    fn load_clip(&mut self, clip: &ClipRef) -> DanceResult<Box<dyn AnimationTrack>>;
}

/// Keyframe and marker timestamps of a clip, as fetched from the asset service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipMetadata {
    pub keyframe_times: Vec<f64>,
    pub marker_times: Vec<f64>,
}

impl ClipMetadata {
    /// Clip length: the latest keyframe or marker timestamp
    pub fn length(&self) -> f64 {
        self.keyframe_times
            .iter()
            .chain(&self.marker_times)
            .copied()
            .filter(|t| t.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Source of clip metadata for length measurement
pub trait ClipMetadataSource {
    fn fetch_metadata(&mut self, clip: &ClipRef) -> DanceResult<ClipMetadata>;
}
