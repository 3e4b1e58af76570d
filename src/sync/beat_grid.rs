// Beat grid - Sparse (beat number, timestamp) pairs for one song
// Immutable once built; sorted and de-duplicated on construction

use super::tempo::Tempo;

/// One beat of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Beat within the bar (1-based, cycles 1..N)
    pub number: u32,
    /// Position in the song in seconds
    pub time: f64,
}

impl Beat {
    pub fn new(number: u32, time: f64) -> Self {
        Self { number, time }
    }

    /// First beat of a bar
    pub fn is_downbeat(&self) -> bool {
        self.number == 1
    }

    /// Two beats are the same if numbers match and timestamps are within 1ms
    pub fn same_as(&self, other: &Beat) -> bool {
        self.number == other.number && (self.time - other.time).abs() <= Self::TIME_TOLERANCE
    }

    /// Timestamp jitter below this is not a beat change
    pub const TIME_TOLERANCE: f64 = 0.001;
}

/// Ordered beat grid with strictly increasing timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatGrid {
    beats: Vec<Beat>,
}

impl BeatGrid {
    /// Builds a grid from beats in any order
    /// Non-finite timestamps are dropped, duplicate timestamps keep the first entry
    pub fn new(mut beats: Vec<Beat>) -> Self {
        let before = beats.len();
        beats.retain(|b| b.time.is_finite());
        beats.sort_by(|a, b| a.time.total_cmp(&b.time));
        beats.dedup_by(|later, earlier| later.time <= earlier.time);

        if beats.len() != before {
            tracing::debug!(
                "Beat grid: dropped {} invalid or duplicate beats",
                before - beats.len()
            );
        }

        Self { beats }
    }

    /// Builds a grid from the parallel arrays the music API returns
    /// Mismatched lengths are truncated to the shorter array, beats numbered < 1 are skipped
    pub fn from_parallel(beat_nums: &[i64], beat_times: &[f64]) -> Self {
        if beat_nums.len() != beat_times.len() {
            tracing::warn!(
                "Beat grid arrays differ in length ({} numbers, {} times), truncating",
                beat_nums.len(),
                beat_times.len()
            );
        }

        let beats = beat_nums
            .iter()
            .zip(beat_times)
            .filter_map(|(&num, &time)| match u32::try_from(num) {
                Ok(number) if number >= 1 => Some(Beat::new(number, time)),
                _ => {
                    tracing::debug!("Skipping beat with invalid number {} at {:.3}s", num, time);
                    None
                }
            })
            .collect();

        Self::new(beats)
    }

    /// Beat that most recently occurred at `time` (greatest timestamp <= time)
    /// Lower edge inclusive: a time exactly on a beat selects that beat
    pub fn beat_at(&self, time: f64) -> Option<Beat> {
        let upcoming = self.beats.partition_point(|b| b.time <= time);
        upcoming.checked_sub(1).map(|i| self.beats[i])
    }

    /// Tempo estimated from the median interval between consecutive beats
    pub fn estimate_tempo(&self) -> Option<Tempo> {
        let mut intervals: Vec<f64> = self
            .beats
            .windows(2)
            .map(|pair| pair[1].time - pair[0].time)
            .filter(|dt| *dt > 0.0)
            .collect();

        if intervals.is_empty() {
            return None;
        }

        intervals.sort_by(f64::total_cmp);
        let median = intervals[intervals.len() / 2];
        Tempo::new(60.0 / median)
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn first(&self) -> Option<&Beat> {
        self.beats.first()
    }

    pub fn last(&self) -> Option<&Beat> {
        self.beats.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Beat> {
        self.beats.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_beats() -> BeatGrid {
        BeatGrid::from_parallel(&[1, 2, 3, 4], &[0.0, 0.5, 1.0, 1.5])
    }

    #[test]
    fn test_beat_lookup() {
        let grid = four_beats();

        assert_eq!(grid.beat_at(0.0).map(|b| b.number), Some(1));
        assert_eq!(grid.beat_at(0.49).map(|b| b.number), Some(1));
        assert_eq!(grid.beat_at(0.5).map(|b| b.number), Some(2));
        assert_eq!(grid.beat_at(10.0).map(|b| b.number), Some(4));
    }

    #[test]
    fn test_before_first_beat() {
        let grid = BeatGrid::from_parallel(&[1, 2], &[1.0, 1.5]);
        assert_eq!(grid.beat_at(0.5), None);
        assert_eq!(grid.beat_at(-3.0), None);
    }

    #[test]
    fn test_empty_grid() {
        let grid = BeatGrid::default();
        assert!(grid.is_empty());
        assert_eq!(grid.beat_at(1.0), None);
        assert!(grid.estimate_tempo().is_none());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let grid = BeatGrid::from_parallel(&[3, 1, 4, 2], &[1.0, 0.0, 1.5, 0.5]);
        let numbers: Vec<u32> = grid.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicates_and_nan_dropped() {
        let grid = BeatGrid::new(vec![
            Beat::new(1, 0.0),
            Beat::new(2, 0.5),
            Beat::new(9, 0.5),
            Beat::new(3, f64::NAN),
        ]);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.beat_at(0.7).map(|b| b.number), Some(2));
    }

    #[test]
    fn test_mismatched_arrays_truncate() {
        let grid = BeatGrid::from_parallel(&[1, 2, 3], &[0.0, 0.5]);
        assert_eq!(grid.len(), 2);

        let grid = BeatGrid::from_parallel(&[0, -1, 1], &[0.0, 0.5, 1.0]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_estimate_tempo() {
        let grid = four_beats();
        let tempo = grid.estimate_tempo().unwrap();
        assert!((tempo.bpm() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_as_tolerance() {
        let a = Beat::new(2, 1.0);
        assert!(a.same_as(&Beat::new(2, 1.0005)));
        assert!(!a.same_as(&Beat::new(2, 1.01)));
        assert!(!a.same_as(&Beat::new(3, 1.0)));
    }
}
