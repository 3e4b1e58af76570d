// Dance engine - Owns every player's dance channel
//
// Channels are phase-locked to the music: a dance starts at the clip position matching
// the current beat, plays at the rate that fits one loop to `beats_per_loop` beats,
// and is hard-restarted at position 0 on every beat 1.
//
// Clip lengths are measured asynchronously. The engine queues LengthRequests; the host
// answers them with complete_length_request, possibly long after the channel moved on.

use super::cache::AnimationLengthCache;
use super::channel::{ChannelPhase, DanceChannel, LoadWait, PlayerId};
use super::config::{DanceId, DanceLibrary};
use super::host::{Animator, ClipMetadata, ClipMetadataSource, ClipRef};
use super::speed::{DEFAULT_SPEED_DAMPING, damped_speed, phase_aligned_position};
use super::{DanceError, DanceResult};
use crate::scheduler::Scheduler;
use crate::sync::{Beat, Tempo};
use std::collections::HashMap;

/// Timing knobs for the dance engine
#[derive(Debug, Clone, PartialEq)]
pub struct DanceSettings {
    /// Fade used when starting and stopping dances
    pub crossfade_seconds: f64,
    /// Fraction subtracted from the computed speed multiplier
    pub speed_damping: f64,
    /// How long a dance request waits for a character rig
    pub rig_wait_timeout_seconds: f64,
}

impl Default for DanceSettings {
    fn default() -> Self {
        Self {
            crossfade_seconds: 0.3,
            speed_damping: DEFAULT_SPEED_DAMPING,
            rig_wait_timeout_seconds: 10.0,
        }
    }
}

/// Clip length measurement the host must perform
#[derive(Debug, Clone, PartialEq)]
pub struct LengthRequest {
    pub player: PlayerId,
    /// Channel generation at request time; a mismatch on completion means stale
    pub generation: u64,
    pub clip: ClipRef,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DanceTask {
    RigTimeout { player: PlayerId, generation: u64 },
}

/// Per-client dance engine
pub struct DanceEngine {
    channels: HashMap<PlayerId, DanceChannel>,
    library: DanceLibrary,
    cache: AnimationLengthCache,
    settings: DanceSettings,
    tempo: Tempo,
    current_beat: u32,
    // Engine-wide so a recreated channel never reuses a destroyed one's generations
    last_generation: u64,
    now: f64,
    requests: Vec<LengthRequest>,
    tasks: Scheduler<DanceTask>,
}

impl DanceEngine {
    pub fn new(library: DanceLibrary, cache: AnimationLengthCache, settings: DanceSettings) -> Self {
        Self {
            channels: HashMap::new(),
            library,
            cache,
            settings,
            tempo: Tempo::default(),
            current_beat: 1,
            last_generation: 0,
            now: 0.0,
            requests: Vec::new(),
            tasks: Scheduler::new(),
        }
    }

    // ---- Channel lifecycle -------------------------------------------------

    /// Register a player; returns false if it already had a channel
    pub fn add_player(&mut self, player: PlayerId) -> bool {
        if self.channels.contains_key(&player) {
            return false;
        }
        self.channels.insert(player, DanceChannel::new(player));
        true
    }

    /// Destroy a player's channel
    /// Pending measurements and timeouts for it become no-ops
    pub fn remove_player(&mut self, player: PlayerId) {
        if let Some(mut channel) = self.channels.remove(&player) {
            if let Some(task) = channel.take_rig_timeout() {
                self.tasks.cancel(task);
            }
            channel.stop_track(self.settings.crossfade_seconds);
            tracing::debug!("{}: channel destroyed", player);
        }
        self.requests.retain(|r| r.player != player);
    }

    /// Character rig became available (spawn or respawn)
    /// A dance that was active goes back through Loading on the new rig
    pub fn attach_rig(&mut self, player: PlayerId, animator: Box<dyn Animator>) {
        let channel = self
            .channels
            .entry(player)
            .or_insert_with(|| DanceChannel::new(player));

        // The old track belongs to the old rig
        channel.stop_track(0.0);
        channel.set_animator(Some(animator));

        if channel.dance().is_some() {
            tracing::debug!("{}: rig replaced, reloading dance", player);
            self.begin_load(player);
        }
    }

    /// Character rig removed; the requested dance resumes if a rig is attached in time
    pub fn detach_rig(&mut self, player: PlayerId) {
        let generation = self.next_generation();
        let Some(channel) = self.channels.get_mut(&player) else {
            return;
        };
        channel.stop_track(0.0);
        channel.set_animator(None);

        if channel.dance().is_some() {
            self.begin_load(player);
        } else {
            channel.set_generation(generation);
            channel.set_phase(ChannelPhase::Idle);
        }
    }

    // ---- Dance control -----------------------------------------------------

    /// Start (or switch to) a dance on a player's channel
    /// Unknown dance ids are rejected and leave the channel untouched
    pub fn start_dance(&mut self, player: PlayerId, dance: &DanceId) {
        let Some(config) = self.library.get(dance).cloned() else {
            tracing::warn!("{}: {}", player, DanceError::UnknownDance(dance.to_string()));
            return;
        };

        let fade = self.settings.crossfade_seconds;
        let channel = self
            .channels
            .entry(player)
            .or_insert_with(|| DanceChannel::new(player));

        channel.stop_track(fade);
        tracing::info!("{}: starting dance {}", player, config.id);
        channel.set_dance(Some(config));
        self.begin_load(player);
    }

    /// Stop the player's dance with the standard fade
    pub fn stop_dance(&mut self, player: PlayerId) {
        let fade = self.settings.crossfade_seconds;
        let generation = self.next_generation();
        let Some(channel) = self.channels.get_mut(&player) else {
            return;
        };
        if let Some(task) = channel.take_rig_timeout() {
            self.tasks.cancel(task);
        }
        channel.stop_track(fade);
        if channel.dance().is_some() {
            tracing::info!("{}: dance stopped", player);
        }
        channel.set_dance(None);
        channel.set_generation(generation);
        channel.set_phase(ChannelPhase::Idle);
    }

    /// Re-apply the speed multiplier to every playing channel
    /// Playback position is left alone; only the rate changes
    pub fn on_tempo_changed(&mut self, tempo: Tempo) {
        self.tempo = tempo;
        let damping = self.settings.speed_damping;

        for channel in self.channels.values_mut() {
            if !channel.phase().is_playing() {
                continue;
            }
            let Some(beats) = channel.dance().map(|d| d.beats_per_loop) else {
                continue;
            };
            if let Some(speed) = damped_speed(channel.clip_length(), beats, tempo, damping) {
                channel.set_speed(speed);
            }
        }
        tracing::debug!("Dance tempo now {}", tempo);
    }

    /// Record the current beat; beat 1 triggers a resync of every playing channel
    pub fn on_beat(&mut self, beat: Beat) {
        self.current_beat = beat.number;
        if beat.is_downbeat() {
            self.on_beat_one();
        }
    }

    /// Forget the previous song's beat; dances started before the next beat begin at position 0
    pub fn reset_beat(&mut self) {
        self.current_beat = 1;
    }

    /// Hard, zero-fade restart at position 0 of every playing clip
    pub fn on_beat_one(&mut self) {
        for channel in self.channels.values_mut() {
            if !channel.phase().is_playing() {
                continue;
            }
            let speed = channel.speed();
            if let Some(track) = channel.track_mut() {
                track.stop(0.0);
                track.play(0.0, speed);
                track.set_time_position(0.0);
            }
        }
    }

    // ---- Deferred work -----------------------------------------------------

    /// Advance the engine clock and run scheduled tasks that came due
    pub fn advance(&mut self, now: f64) {
        self.now = now;
        for task in self.tasks.drain_due(now) {
            match task {
                DanceTask::RigTimeout { player, generation } => {
                    self.expire_rig_wait(player, generation)
                }
            }
        }
    }

    /// Measurements the host should perform
    pub fn take_length_requests(&mut self) -> Vec<LengthRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn has_length_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Deliver the outcome of a clip metadata fetch
    /// Stale requests still feed the cache but never touch their channel
    pub fn complete_length_request(&mut self, request: &LengthRequest, result: DanceResult<ClipMetadata>) {
        let length = match result {
            Ok(metadata) => metadata.length(),
            Err(e) => {
                tracing::warn!("{}: {}", request.player, e);
                0.0
            }
        };
        if length > 0.0 {
            self.cache.insert(request.clip.clone(), length);
        }

        let live = self.channels.get(&request.player).is_some_and(|channel| {
            channel.generation() == request.generation
                && channel.phase() == ChannelPhase::Loading(LoadWait::ClipLength)
        });
        if !live {
            tracing::debug!(
                "{}: discarding stale length result for {}",
                request.player,
                request.clip
            );
            return;
        }

        if length > 0.0 {
            self.begin_playback(request.player, length);
        } else {
            tracing::error!("{}", DanceError::InvalidClipLength(request.clip.clone()));
            self.abort(request.player);
        }
    }

    /// Resolve every queued request against a synchronous metadata source
    pub fn resolve_length_requests(&mut self, source: &mut dyn ClipMetadataSource) {
        for request in self.take_length_requests() {
            let result = source.fetch_metadata(&request.clip);
            self.complete_length_request(&request, result);
        }
    }

    // ---- Queries -----------------------------------------------------------

    pub fn channel(&self, player: PlayerId) -> Option<&DanceChannel> {
        self.channels.get(&player)
    }

    pub fn phase(&self, player: PlayerId) -> Option<ChannelPhase> {
        self.channels.get(&player).map(DanceChannel::phase)
    }

    pub fn playing_count(&self) -> usize {
        self.channels
            .values()
            .filter(|c| c.phase().is_playing())
            .count()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.channels.keys().copied()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }

    pub fn library(&self) -> &DanceLibrary {
        &self.library
    }

    pub fn cache(&self) -> &AnimationLengthCache {
        &self.cache
    }

    // ---- Internals ---------------------------------------------------------

    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    /// Move a channel with a requested dance toward Playing
    fn begin_load(&mut self, player: PlayerId) {
        let timeout = self.settings.rig_wait_timeout_seconds;
        let generation = self.next_generation();
        let Some(channel) = self.channels.get_mut(&player) else {
            return;
        };
        if let Some(task) = channel.take_rig_timeout() {
            self.tasks.cancel(task);
        }
        channel.set_generation(generation);

        let Some(clip) = channel.dance().map(|d| d.clip.clone()) else {
            channel.set_phase(ChannelPhase::Idle);
            return;
        };

        if !channel.has_rig() {
            channel.set_phase(ChannelPhase::Loading(LoadWait::Rig));
            let task = self.tasks.schedule(
                self.now + timeout,
                DanceTask::RigTimeout { player, generation },
            );
            channel.set_rig_timeout(task);
            return;
        }

        channel.set_phase(ChannelPhase::Loading(LoadWait::ClipLength));
        match self.cache.get(&clip) {
            Some(length) => self.begin_playback(player, length),
            None => self.requests.push(LengthRequest {
                player,
                generation,
                clip,
            }),
        }
    }

    fn begin_playback(&mut self, player: PlayerId, clip_length: f64) {
        let tempo = self.tempo;
        let beat = self.current_beat;
        let fade = self.settings.crossfade_seconds;
        let damping = self.settings.speed_damping;

        let Some(channel) = self.channels.get_mut(&player) else {
            return;
        };
        let Some(dance) = channel.dance().cloned() else {
            return;
        };
        let Some(speed) = damped_speed(clip_length, dance.beats_per_loop, tempo, damping) else {
            tracing::error!("{}", DanceError::InvalidClipLength(dance.clip.clone()));
            self.abort(player);
            return;
        };
        let Some(animator) = channel.animator_mut() else {
            return;
        };

        match animator.load_clip(&dance.clip) {
            Ok(mut track) => {
                let position = phase_aligned_position(clip_length, beat, dance.beats_per_loop);
                track.play(fade, speed);
                track.set_time_position(position);
                channel.set_track(track, clip_length, speed);
                channel.set_phase(ChannelPhase::Playing);
                tracing::info!(
                    "{}: dancing {} at {:.3}x from {:.2}s (beat {})",
                    player,
                    dance.id,
                    speed,
                    position,
                    beat
                );
            }
            Err(e) => {
                tracing::warn!("{}: {}", player, e);
                self.abort(player);
            }
        }
    }

    fn expire_rig_wait(&mut self, player: PlayerId, generation: u64) {
        let live = self.channels.get(&player).is_some_and(|channel| {
            channel.generation() == generation
                && channel.phase() == ChannelPhase::Loading(LoadWait::Rig)
        });
        if live {
            tracing::warn!("{}: no character rig after waiting, dance dropped", player);
            if let Some(channel) = self.channels.get_mut(&player) {
                channel.take_rig_timeout();
            }
            self.abort(player);
        }
    }

    /// Return a channel to Idle after a failure
    fn abort(&mut self, player: PlayerId) {
        let generation = self.next_generation();
        if let Some(channel) = self.channels.get_mut(&player) {
            if let Some(task) = channel.take_rig_timeout() {
                self.tasks.cancel(task);
            }
            channel.stop_track(0.0);
            channel.set_dance(None);
            channel.set_generation(generation);
            channel.set_phase(ChannelPhase::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{CallLog, HeadlessAnimator, HeadlessClipSource, TrackCall};

    const LOCAL: PlayerId = PlayerId(1);
    const REMOTE: PlayerId = PlayerId(2);

    fn engine() -> DanceEngine {
        let settings = DanceSettings {
            speed_damping: 0.0,
            ..DanceSettings::default()
        };
        DanceEngine::new(DanceLibrary::builtin(), AnimationLengthCache::new(), settings)
    }

    fn rigged_engine(log: &CallLog) -> DanceEngine {
        let mut engine = engine();
        engine.attach_rig(LOCAL, Box::new(HeadlessAnimator::new("local", log.clone())));
        engine.attach_rig(REMOTE, Box::new(HeadlessAnimator::new("remote", log.clone())));
        engine
    }

    fn dance(id: &str) -> DanceId {
        DanceId::new(id)
    }

    #[test]
    fn test_start_dance_goes_through_loading() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);

        engine.start_dance(LOCAL, &dance("1"));
        assert_eq!(
            engine.phase(LOCAL),
            Some(ChannelPhase::Loading(LoadWait::ClipLength))
        );

        let mut source = HeadlessClipSource::uniform(8.0);
        engine.resolve_length_requests(&mut source);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));

        // L = 8, B = 8, default 120 BPM: speed 2
        let channel = engine.channel(LOCAL).unwrap();
        assert_eq!(channel.speed(), 2.0);
        assert_eq!(
            log.calls_for("local").first(),
            Some(&TrackCall::Play { fade: 0.3, speed: 2.0 })
        );
    }

    #[test]
    fn test_cached_length_plays_immediately() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);

        engine.start_dance(LOCAL, &dance("1"));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));
        assert!(!engine.has_length_requests());
    }

    #[test]
    fn test_unknown_dance_is_noop() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.start_dance(LOCAL, &dance("1"));

        engine.start_dance(LOCAL, &dance("nope"));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));
        assert_eq!(
            engine.channel(LOCAL).unwrap().dance().map(|d| d.id.as_str()),
            Some("1")
        );
    }

    #[test]
    fn test_start_mid_bar_is_phase_aligned() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);

        engine.on_beat(Beat::new(3, 1.0));
        engine.start_dance(LOCAL, &dance("1"));

        // Beat 3 of an 8-beat loop: (3 - 1) / 8 of 8 seconds
        assert!(log
            .calls_for("local")
            .contains(&TrackCall::SetTimePosition(2.0)));
    }

    #[test]
    fn test_switching_dance_crossfades_out_old_clip() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.cache().insert(ClipRef::new("anim/dance/shuffle"), 2.0);

        engine.start_dance(LOCAL, &dance("1"));
        log.clear();
        engine.start_dance(LOCAL, &dance("2"));

        let calls = log.calls_for("local");
        assert_eq!(calls.first(), Some(&TrackCall::Stop { fade: 0.3 }));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));
    }

    #[test]
    fn test_stop_dance() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.start_dance(LOCAL, &dance("1"));
        log.clear();

        engine.stop_dance(LOCAL);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));
        assert!(engine.channel(LOCAL).unwrap().dance().is_none());
        assert_eq!(log.calls_for("local"), vec![TrackCall::Stop { fade: 0.3 }]);
    }

    #[test]
    fn test_tempo_change_only_changes_rate() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.start_dance(LOCAL, &dance("1"));
        log.clear();

        engine.on_tempo_changed(Tempo::new(60.0).unwrap());
        assert_eq!(log.calls_for("local"), vec![TrackCall::SetSpeed(1.0)]);
        assert_eq!(engine.channel(LOCAL).unwrap().speed(), 1.0);
    }

    #[test]
    fn test_beat_one_restarts_playing_channels() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.start_dance(LOCAL, &dance("1"));
        engine.start_dance(REMOTE, &dance("1"));
        log.clear();

        engine.on_beat(Beat::new(2, 0.5));
        assert!(log.is_empty());

        engine.on_beat(Beat::new(1, 2.0));
        for rig in ["local", "remote"] {
            assert_eq!(
                log.calls_for(rig),
                vec![
                    TrackCall::Stop { fade: 0.0 },
                    TrackCall::Play { fade: 0.0, speed: 2.0 },
                    TrackCall::SetTimePosition(0.0),
                ]
            );
        }
    }

    #[test]
    fn test_destroyed_while_loading_never_plays() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);

        engine.start_dance(REMOTE, &dance("1"));
        let requests = engine.take_length_requests();
        assert_eq!(requests.len(), 1);

        engine.remove_player(REMOTE);
        engine.complete_length_request(&requests[0], Ok(HeadlessClipSource::metadata(8.0)));

        assert!(engine.phase(REMOTE).is_none());
        assert!(log.calls_for("remote").is_empty());
        // Measurement still cached for the next request
        assert_eq!(engine.cache().get(&ClipRef::new("anim/dance/groove")), Some(8.0));
    }

    #[test]
    fn test_restarted_while_loading_ignores_old_result() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);

        engine.start_dance(LOCAL, &dance("1"));
        let stale = engine.take_length_requests();
        engine.stop_dance(LOCAL);

        engine.complete_length_request(&stale[0], Ok(HeadlessClipSource::metadata(8.0)));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));
    }

    #[test]
    fn test_failed_measurement_aborts_to_idle() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);

        engine.start_dance(LOCAL, &dance("1"));
        let requests = engine.take_length_requests();
        engine.complete_length_request(
            &requests[0],
            Err(DanceError::MetadataFailed(requests[0].clip.clone(), "timeout".into())),
        );
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));

        // Zero-length clips are a configuration error
        engine.start_dance(LOCAL, &dance("1"));
        let requests = engine.take_length_requests();
        engine.complete_length_request(&requests[0], Ok(ClipMetadata::default()));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_clip_load_failure_aborts_to_idle() {
        let log = CallLog::default();
        let mut engine = engine();
        engine.attach_rig(
            LOCAL,
            Box::new(
                HeadlessAnimator::new("local", log.clone())
                    .with_failing_clip(ClipRef::new("anim/dance/groove")),
            ),
        );
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);

        engine.start_dance(LOCAL, &dance("1"));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));
    }

    #[test]
    fn test_waits_for_rig_then_plays() {
        let log = CallLog::default();
        let mut engine = engine();
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);

        engine.start_dance(LOCAL, &dance("1"));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Loading(LoadWait::Rig)));

        engine.advance(5.0);
        engine.attach_rig(LOCAL, Box::new(HeadlessAnimator::new("local", log.clone())));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));

        // The cancelled timeout never fires
        engine.advance(60.0);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));
    }

    #[test]
    fn test_rig_wait_times_out() {
        let mut engine = engine();
        engine.start_dance(LOCAL, &dance("1"));

        engine.advance(9.0);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Loading(LoadWait::Rig)));
        engine.advance(10.0);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Idle));
    }

    #[test]
    fn test_rig_replacement_reloads_dance() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);
        engine.start_dance(LOCAL, &dance("1"));
        let generation = engine.channel(LOCAL).unwrap().generation();

        engine.detach_rig(LOCAL);
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Loading(LoadWait::Rig)));

        engine.attach_rig(LOCAL, Box::new(HeadlessAnimator::new("respawned", log.clone())));
        assert_eq!(engine.phase(LOCAL), Some(ChannelPhase::Playing));
        assert!(engine.channel(LOCAL).unwrap().generation() > generation);
        assert!(!log.calls_for("respawned").is_empty());
    }

    #[test]
    fn test_recreated_channel_ignores_destroyed_channels_result() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);

        engine.start_dance(REMOTE, &dance("1"));
        let destroyed = engine.take_length_requests();
        engine.remove_player(REMOTE);

        // Same player comes back and picks another dance
        engine.attach_rig(REMOTE, Box::new(HeadlessAnimator::new("rejoined", log.clone())));
        engine.start_dance(REMOTE, &dance("2"));
        let fresh = engine.take_length_requests();
        assert_ne!(destroyed[0].generation, fresh[0].generation);

        engine.complete_length_request(&destroyed[0], Ok(HeadlessClipSource::metadata(8.0)));
        assert_eq!(
            engine.phase(REMOTE),
            Some(ChannelPhase::Loading(LoadWait::ClipLength))
        );
        assert!(log.calls_for("rejoined").is_empty());

        engine.complete_length_request(&fresh[0], Ok(HeadlessClipSource::metadata(2.0)));
        let channel = engine.channel(REMOTE).unwrap();
        assert_eq!(channel.phase(), ChannelPhase::Playing);
        assert_eq!(channel.clip_length(), 2.0);
    }

    #[test]
    fn test_reset_beat_restores_position_zero() {
        let log = CallLog::default();
        let mut engine = rigged_engine(&log);
        engine.cache().insert(ClipRef::new("anim/dance/groove"), 8.0);

        engine.on_beat(Beat::new(3, 1.0));
        engine.reset_beat();
        assert_eq!(engine.current_beat(), 1);

        engine.start_dance(LOCAL, &dance("1"));
        assert!(log
            .calls_for("local")
            .contains(&TrackCall::SetTimePosition(0.0)));
    }
}
