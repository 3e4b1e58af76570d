// Sync session - One client's view of the party
//
// Each host frame calls tick(): the playback position is sampled once, the tracker
// turns it into section/beat transitions, and those fan out to the dance engine and
// the visual effects. Tempo changes are applied before any beat-one restart in the
// same tick so a restart never runs at the stale rate.

use crate::api::SongData;
use crate::config::SyncConfig;
use crate::dance::{AnimationLengthCache, DanceEngine, DanceId, PlayerId};
use crate::effects::{
    CameraPulseDriver, EffectCommand, EffectRegistry, LightingDriver, SectionPalette, VisualEffects,
};
use crate::messaging::{ChatCommand, DanceSelection, SelectionConsumer, SelectionProducer, parse_chat_command};
use crate::sync::{Beat, BeatTracker, PollThrottle, SectionChange, Tempo};
use ringbuf::traits::{Consumer, Producer};
use std::fmt;
use uuid::Uuid;

/// Host audio source
pub trait PlaybackSource {
    /// Current playback position in seconds
    fn position_seconds(&self) -> f64;
    fn is_playing(&self) -> bool;
}

/// Identifies one client session in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tempo: Option<Tempo>,
    pub section: Option<SectionChange>,
    pub beat: Option<Beat>,
    pub effects: Vec<EffectCommand>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.tempo.is_none() && self.section.is_none() && self.beat.is_none() && self.effects.is_empty()
    }
}

pub struct SyncSession {
    id: SessionId,
    config: SyncConfig,
    local_player: PlayerId,
    tracker: BeatTracker,
    throttle: PollThrottle,
    dance: DanceEngine,
    effects: VisualEffects,
    tempo: Tempo,
    pending_tempo: Option<Tempo>,
    outbox: Option<SelectionProducer>,
}

impl SyncSession {
    /// Start a client session; `cache` is shared with anything else measuring clips
    pub fn new(config: SyncConfig, local_player: PlayerId, cache: AnimationLengthCache) -> Self {
        let tempo = Tempo::or_fallback(None, config.default_bpm);
        let mut dance = DanceEngine::new(config.dance_library(), cache, config.dance_settings());
        dance.on_tempo_changed(tempo);
        let effects = VisualEffects::new(
            EffectRegistry::standard(config.camera.downbeat_intensity, config.camera.beat_intensity),
            LightingDriver::new(
                SectionPalette::default(),
                config.lighting.base_color,
                config.lighting.transition_seconds,
            ),
            CameraPulseDriver::new(config.camera.pulse_settings()),
        );
        let id = SessionId::new();
        tracing::info!("Session {} started for {}", id, local_player);

        Self {
            id,
            throttle: PollThrottle::new(config.poll_interval_seconds),
            tempo,
            pending_tempo: None,
            tracker: BeatTracker::new(),
            local_player,
            dance,
            effects,
            outbox: None,
            config,
        }
    }

    /// Send local dance selections through `outbox`
    pub fn with_broadcast(mut self, outbox: SelectionProducer) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Switch to a new song; None when the analysis API had nothing for it
    /// All tracker state from the previous song is discarded
    pub fn load_song(&mut self, data: Option<&SongData>) {
        let _span = tracing::debug_span!("session", id = %self.id).entered();

        let tempo = match data {
            Some(song) => {
                tracing::info!("Loading song {}", song.asset_id);
                self.tracker.load_song(song.beat_grid(), song.sections());
                song.resolve_tempo(self.config.default_bpm)
            }
            None => {
                tracing::warn!("No analysis data for this song, effects limited");
                self.tracker.load_song(None, None);
                Tempo::or_fallback(None, self.config.default_bpm)
            }
        };

        self.effects.reset();
        self.throttle.reset();
        self.dance.reset_beat();
        if tempo.differs_from(&self.tempo) {
            self.pending_tempo = Some(tempo);
        }
        self.tempo = tempo;
    }

    /// Override the tempo (host-reported BPM); invalid values fall back to the default
    pub fn set_tempo(&mut self, bpm: Option<f64>) {
        let tempo = Tempo::or_fallback(bpm, self.config.default_bpm);
        if tempo.differs_from(&self.tempo) {
            self.pending_tempo = Some(tempo);
            self.tempo = tempo;
        }
    }

    /// Per-frame update; `now` is wall time in seconds
    pub fn tick(&mut self, now: f64, playback: &dyn PlaybackSource) -> TickReport {
        let _span = tracing::debug_span!("session", id = %self.id).entered();
        let mut report = TickReport::default();
        self.dance.advance(now);

        if let Some(tempo) = self.pending_tempo.take() {
            self.dance.on_tempo_changed(tempo);
            report.tempo = Some(tempo);
        }

        if !playback.is_playing() {
            return report;
        }
        if !self.throttle.ready(now, self.tracker.has_beat_grid()) {
            return report;
        }

        let position = playback.position_seconds();
        let update = self.tracker.poll(position);

        if let Some(change) = update.section {
            tracing::info!(
                "Section: {} -> {}",
                change.previous.as_deref().unwrap_or("none"),
                change.current.as_ref().map_or("none", |s| s.name.as_str())
            );
            report.effects.extend(self.effects.on_section_changed(&change, now));
            report.section = Some(change);
        }

        if let Some(beat) = update.beat {
            tracing::trace!("Beat {} at {:.3}s", beat.number, beat.time);
            self.dance.on_beat(beat);
            report.effects.extend(self.effects.on_beat(&beat, now));
            report.beat = Some(beat);
        }

        report
    }

    /// Handle a chat message from the local player
    /// Returns true if it was a recognised command
    pub fn handle_chat(&mut self, message: &str) -> bool {
        match parse_chat_command(message) {
            Some(ChatCommand::Dance(dance)) => {
                self.select_dance(Some(dance));
                true
            }
            None => false,
        }
    }

    /// Start (Some) or stop (None) the local player's dance and tell everyone else
    pub fn select_dance(&mut self, dance: Option<DanceId>) {
        match &dance {
            Some(id) => {
                if self.dance.library().get(id).is_none() {
                    tracing::warn!("Unknown dance '{}', ignoring selection", id);
                    return;
                }
                self.dance.start_dance(self.local_player, id);
            }
            None => self.dance.stop_dance(self.local_player),
        }
        self.broadcast(DanceSelection {
            player: self.local_player,
            dance,
        });
    }

    /// Apply another participant's selection to their channel
    pub fn apply_remote_selection(&mut self, selection: &DanceSelection) {
        if selection.player == self.local_player {
            return;
        }
        match &selection.dance {
            Some(dance) => self.dance.start_dance(selection.player, dance),
            None => self.dance.stop_dance(selection.player),
        }
    }

    /// Apply every queued remote selection; returns how many were applied
    pub fn drain_remote_selections(&mut self, inbox: &mut SelectionConsumer) -> usize {
        let mut applied = 0;
        while let Some(selection) = inbox.try_pop() {
            self.apply_remote_selection(&selection);
            applied += 1;
        }
        applied
    }

    fn broadcast(&mut self, selection: DanceSelection) {
        let Some(outbox) = self.outbox.as_mut() else {
            return;
        };
        if outbox.try_push(selection).is_err() {
            tracing::debug!("Broadcast queue full, selection dropped");
        }
    }

    /// End the session; the shared clip length cache is cleared
    pub fn end(self) {
        self.dance.cache().clear();
        tracing::info!("Session {} ended", self.id);
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn local_player(&self) -> PlayerId {
        self.local_player
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn tracker(&self) -> &BeatTracker {
        &self.tracker
    }

    pub fn dance(&self) -> &DanceEngine {
        &self.dance
    }

    /// Rig attach/detach and clip length delivery go through the engine directly
    pub fn dance_mut(&mut self) -> &mut DanceEngine {
        &mut self.dance
    }

    pub fn effects(&self) -> &VisualEffects {
        &self.effects
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
