// Tempo - Beats per minute and derived durations
// Never panics on bad input: missing or non-positive BPM falls back to the default

use std::fmt;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Tempo used whenever a song provides no usable BPM
    pub const DEFAULT_BPM: f64 = 120.0;

    /// Creates a tempo from a BPM value
    /// Returns None for zero, negative, or non-finite values
    pub fn new(bpm: f64) -> Option<Self> {
        if bpm.is_finite() && bpm > 0.0 {
            Some(Self { bpm })
        } else {
            None
        }
    }

    /// Creates a tempo, falling back to `fallback_bpm` (then to 120 BPM)
    /// when the value is missing or invalid
    pub fn or_fallback(bpm: Option<f64>, fallback_bpm: f64) -> Self {
        bpm.and_then(Self::new)
            .or_else(|| Self::new(fallback_bpm))
            .unwrap_or_default()
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of `beats` beats in seconds
    pub fn loop_duration_seconds(&self, beats: u32) -> f64 {
        self.beat_duration_seconds() * beats as f64
    }

    /// True when two tempos differ by more than a hundredth of a BPM
    pub fn differs_from(&self, other: &Tempo) -> bool {
        (self.bpm - other.bpm).abs() > 0.01
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            bpm: Self::DEFAULT_BPM,
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}
