// Headless host - In-process stand-ins for the game engine's animation and audio objects
// Drives the CLI simulation and the test suites; every call is recorded in a CallLog

use crate::dance::host::{AnimationTrack, Animator, ClipMetadata, ClipMetadataSource, ClipRef};
use crate::dance::{DanceError, DanceResult};
use crate::session::PlaybackSource;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A call made on a headless track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackCall {
    Play { fade: f64, speed: f64 },
    Stop { fade: f64 },
    SetSpeed(f64),
    SetTimePosition(f64),
}

/// One recorded call, tagged with the rig and clip it targeted
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEvent {
    pub rig: String,
    pub clip: ClipRef,
    pub call: TrackCall,
}

/// Shared log of every track call
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<TrackEvent>>>);

impl CallLog {
    fn record(&self, rig: &str, clip: &ClipRef, call: TrackCall) {
        tracing::trace!("[{}] {} {:?}", rig, clip, call);
        self.0.borrow_mut().push(TrackEvent {
            rig: rig.to_string(),
            clip: clip.clone(),
            call,
        });
    }

    /// Calls made on tracks of one rig, oldest first
    pub fn calls_for(&self, rig: &str) -> Vec<TrackCall> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.rig == rig)
            .map(|e| e.call.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<TrackEvent> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Track that only records what it is asked to do
pub struct HeadlessTrack {
    rig: String,
    clip: ClipRef,
    log: CallLog,
}

impl AnimationTrack for HeadlessTrack {
    fn play(&mut self, fade: f64, speed: f64) {
        self.log.record(&self.rig, &self.clip, TrackCall::Play { fade, speed });
    }

    fn stop(&mut self, fade: f64) {
        self.log.record(&self.rig, &self.clip, TrackCall::Stop { fade });
    }

    fn set_speed(&mut self, speed: f64) {
        self.log.record(&self.rig, &self.clip, TrackCall::SetSpeed(speed));
    }

    fn set_time_position(&mut self, seconds: f64) {
        self.log
            .record(&self.rig, &self.clip, TrackCall::SetTimePosition(seconds));
    }
}

/// Character rig whose clips are HeadlessTracks
pub struct HeadlessAnimator {
    rig: String,
    log: CallLog,
    failing: HashSet<ClipRef>,
}

impl HeadlessAnimator {
    pub fn new(rig: impl Into<String>, log: CallLog) -> Self {
        Self {
            rig: rig.into(),
            log,
            failing: HashSet::new(),
        }
    }

    /// Make loading `clip` fail on this rig
    pub fn with_failing_clip(mut self, clip: ClipRef) -> Self {
        self.failing.insert(clip);
        self
    }
}

impl Animator for HeadlessAnimator {
    fn load_clip(&mut self, clip: &ClipRef) -> DanceResult<Box<dyn AnimationTrack>> {
        if self.failing.contains(clip) {
            return Err(DanceError::ClipLoadFailed(
                clip.clone(),
                format!("rig {} rejected the clip", self.rig),
            ));
        }
        Ok(Box::new(HeadlessTrack {
            rig: self.rig.clone(),
            clip: clip.clone(),
            log: self.log.clone(),
        }))
    }
}

/// Clip metadata served from memory
#[derive(Debug, Clone, Default)]
pub struct HeadlessClipSource {
    lengths: HashMap<ClipRef, f64>,
    fallback: Option<f64>,
}

impl HeadlessClipSource {
    /// Every clip measures `length` seconds
    pub fn uniform(length: f64) -> Self {
        Self {
            lengths: HashMap::new(),
            fallback: Some(length),
        }
    }

    pub fn with_length(mut self, clip: ClipRef, length: f64) -> Self {
        self.lengths.insert(clip, length);
        self
    }

    /// Metadata whose keyframes end at `length`
    pub fn metadata(length: f64) -> ClipMetadata {
        ClipMetadata {
            keyframe_times: vec![0.0, length * 0.5, length],
            marker_times: Vec::new(),
        }
    }
}

impl ClipMetadataSource for HeadlessClipSource {
    fn fetch_metadata(&mut self, clip: &ClipRef) -> DanceResult<ClipMetadata> {
        self.lengths
            .get(clip)
            .copied()
            .or(self.fallback)
            .map(Self::metadata)
            .ok_or_else(|| DanceError::MetadataFailed(clip.clone(), "clip not found".to_string()))
    }
}

/// Audio source whose position advances only when told to
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayback {
    position: f64,
    playing: bool,
}

impl SimulatedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn seek(&mut self, seconds: f64) {
        self.position = seconds;
    }

    /// Move the playhead forward by `dt` seconds if playing
    pub fn advance(&mut self, dt: f64) {
        if self.playing {
            self.position += dt;
        }
    }
}

impl PlaybackSource for SimulatedPlayback {
    fn position_seconds(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
