// Beat/section tracker - Turns a polled playback position into transition events
// Each transition is reported exactly once; repeated polls at the same time are silent

use super::beat_grid::{Beat, BeatGrid};
use super::sections::{SectionMap, SongSection};

/// Section transition reported by a poll
#[derive(Debug, Clone, PartialEq)]
pub struct SectionChange {
    /// Name of the previously resolved section, if any
    pub previous: Option<String>,
    /// Newly resolved section (None once the song is past its last section)
    pub current: Option<SongSection>,
}

/// Result of one poll
/// Both fields come from the same sampled playback time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerUpdate {
    pub section: Option<SectionChange>,
    pub beat: Option<Beat>,
}

impl TrackerUpdate {
    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.beat.is_none()
    }
}

/// Per-song tracker state
/// Fully replaced by `load_song`, never merged with the previous song
#[derive(Debug, Default)]
pub struct BeatTracker {
    grid: Option<BeatGrid>,
    sections: Option<SectionMap>,
    current_beat: Option<Beat>,
    current_section: Option<SongSection>,
    last_poll_time: Option<f64>,
}

impl BeatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all tracker state with a new song
    /// A missing grid disables beat events; sections may still be tracked
    pub fn load_song(&mut self, grid: Option<BeatGrid>, sections: Option<Vec<SongSection>>) {
        match &grid {
            None => tracing::warn!("Song loaded without a beat grid, beat events disabled"),
            Some(g) if g.is_empty() => {
                tracing::warn!("Song loaded with an empty beat grid, beat events disabled")
            }
            Some(g) => tracing::debug!("Tracking {} beats", g.len()),
        }
        if sections.is_none() {
            tracing::info!("Song loaded without sections, section events disabled");
        }

        *self = Self {
            grid,
            sections: sections.map(SectionMap::new),
            ..Self::default()
        };
    }

    /// Sample the playback position and report transitions since the last poll
    pub fn poll(&mut self, time: f64) -> TrackerUpdate {
        if !time.is_finite() {
            tracing::warn!("Ignoring non-finite playback position {}", time);
            return TrackerUpdate::default();
        }
        self.last_poll_time = Some(time);

        TrackerUpdate {
            section: self.poll_section(time),
            beat: self.poll_beat(time),
        }
    }

    fn poll_section(&mut self, time: f64) -> Option<SectionChange> {
        let sections = self.sections.as_ref()?;
        let resolved = sections.section_at(time);

        let previous_name = self.current_section.as_ref().map(|s| s.name.as_str());
        let resolved_name = resolved.map(|s| s.name.as_str());
        if previous_name == resolved_name {
            return None;
        }

        let change = SectionChange {
            previous: previous_name.map(str::to_owned),
            current: resolved.cloned(),
        };
        self.current_section = resolved.cloned();
        Some(change)
    }

    fn poll_beat(&mut self, time: f64) -> Option<Beat> {
        let grid = self.grid.as_ref()?;

        let Some(beat) = grid.beat_at(time) else {
            // Seeked before the first beat: nothing to report
            self.current_beat = None;
            return None;
        };

        match self.current_beat {
            Some(previous) if previous.same_as(&beat) => None,
            _ => {
                self.current_beat = Some(beat);
                Some(beat)
            }
        }
    }

    pub fn has_beat_grid(&self) -> bool {
        self.grid.as_ref().is_some_and(|g| !g.is_empty())
    }

    pub fn beat_grid(&self) -> Option<&BeatGrid> {
        self.grid.as_ref()
    }

    pub fn current_beat(&self) -> Option<Beat> {
        self.current_beat
    }

    pub fn current_section(&self) -> Option<&SongSection> {
        self.current_section.as_ref()
    }

    pub fn last_poll_time(&self) -> Option<f64> {
        self.last_poll_time
    }
}

/// Bounds how often the tracker is polled
/// Beat tracking polls every tick; section-only tracking waits `interval` between polls
#[derive(Debug, Clone)]
pub struct PollThrottle {
    interval: f64,
    last: Option<f64>,
}

impl PollThrottle {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(0.0),
            last: None,
        }
    }

    /// Returns true (and records `now`) if a poll is due
    pub fn ready(&mut self, now: f64, every_tick: bool) -> bool {
        let due = every_tick
            || match self.last {
                Some(last) => now - last >= self.interval || now < last,
                None => true,
            };
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
