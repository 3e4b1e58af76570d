// Dance channel - Per-player animation playback state
//
// Idle -> Loading -> Playing -> Idle
// Loading waits either for a character rig or for the clip length measurement.
// Every transition moves to a fresh generation so late callbacks can be recognised as stale.

use super::config::DanceConfig;
use super::host::{AnimationTrack, Animator};
use crate::scheduler::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant identifier (host user id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// What a loading channel is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWait {
    /// Character rig not present yet
    Rig,
    /// Clip length measurement in flight
    ClipLength,
}

/// Channel state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelPhase {
    #[default]
    Idle,
    Loading(LoadWait),
    Playing,
}

impl ChannelPhase {
    pub fn is_playing(&self) -> bool {
        matches!(self, ChannelPhase::Playing)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ChannelPhase::Loading(_))
    }
}

/// Playback state for one player
pub struct DanceChannel {
    player: PlayerId,
    animator: Option<Box<dyn Animator>>,
    track: Option<Box<dyn AnimationTrack>>,
    dance: Option<DanceConfig>,
    phase: ChannelPhase,
    generation: u64,
    rig_timeout: Option<TaskId>,
    clip_length: f64,
    speed: f64,
}

impl DanceChannel {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            animator: None,
            track: None,
            dance: None,
            phase: ChannelPhase::Idle,
            generation: 0,
            rig_timeout: None,
            clip_length: 0.0,
            speed: 1.0,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn phase(&self) -> ChannelPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dance(&self) -> Option<&DanceConfig> {
        self.dance.as_ref()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Natural length of the playing clip in seconds
    pub fn clip_length(&self) -> f64 {
        self.clip_length
    }

    pub fn has_rig(&self) -> bool {
        self.animator.is_some()
    }

    /// Enter a new generation; anything scheduled for an older one is stale
    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub(crate) fn set_phase(&mut self, phase: ChannelPhase) {
        if self.phase != phase {
            tracing::debug!("{}: {:?} -> {:?}", self.player, self.phase, phase);
            self.phase = phase;
        }
    }

    pub(crate) fn set_dance(&mut self, dance: Option<DanceConfig>) {
        self.dance = dance;
    }

    pub(crate) fn set_animator(&mut self, animator: Option<Box<dyn Animator>>) {
        self.animator = animator;
    }

    pub(crate) fn animator_mut(&mut self) -> Option<&mut (dyn Animator + 'static)> {
        self.animator.as_deref_mut()
    }

    pub(crate) fn track_mut(&mut self) -> Option<&mut (dyn AnimationTrack + 'static)> {
        self.track.as_deref_mut()
    }

    pub(crate) fn set_track(&mut self, track: Box<dyn AnimationTrack>, clip_length: f64, speed: f64) {
        self.track = Some(track);
        self.clip_length = clip_length;
        self.speed = speed;
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        if let Some(track) = self.track.as_deref_mut() {
            track.set_speed(speed);
        }
    }

    /// Stop and drop the current track
    pub(crate) fn stop_track(&mut self, fade: f64) {
        if let Some(mut track) = self.track.take() {
            track.stop(fade);
        }
    }

    pub(crate) fn take_rig_timeout(&mut self) -> Option<TaskId> {
        self.rig_timeout.take()
    }

    pub(crate) fn set_rig_timeout(&mut self, task: TaskId) {
        self.rig_timeout = Some(task);
    }
}

impl fmt::Debug for DanceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DanceChannel")
            .field("player", &self.player)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("dance", &self.dance.as_ref().map(|d| d.id.as_str()))
            .field("has_rig", &self.animator.is_some())
            .field("has_track", &self.track.is_some())
            .field("speed", &self.speed)
            .finish()
    }
}
