// Song sections - Named time regions (verse, chorus, ...)
// Sorted by start time on receipt; the server does not guarantee ordering

use serde::{Deserialize, Serialize};

/// A named, time-bounded region of a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSection {
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl SongSection {
    pub fn new(name: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
        }
    }

    /// Lower bound inclusive, upper bound exclusive
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time
    }

    fn is_valid(&self) -> bool {
        self.start_time.is_finite() && self.end_time.is_finite() && self.end_time > self.start_time
    }
}

/// Sections of one song, sorted by start time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    sections: Vec<SongSection>,
}

impl SectionMap {
    pub fn new(mut sections: Vec<SongSection>) -> Self {
        sections.retain(|section| {
            let valid = section.is_valid();
            if !valid {
                tracing::warn!(
                    "Ignoring section '{}' with invalid bounds [{}, {})",
                    section.name,
                    section.start_time,
                    section.end_time
                );
            }
            valid
        });
        sections.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { sections }
    }

    /// Section playing at `time`
    ///
    /// - before the first section: the first section (pre-roll)
    /// - inside a section: the first section whose range contains `time`
    /// - in a gap, or at/after the last section's end: none
    pub fn section_at(&self, time: f64) -> Option<&SongSection> {
        let first = self.sections.first()?;
        if time < first.start_time {
            return Some(first);
        }
        self.sections.iter().find(|section| section.contains(time))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongSection> {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sections() -> SectionMap {
        SectionMap::new(vec![
            SongSection::new("A", 0.0, 10.0),
            SongSection::new("B", 10.0, 20.0),
        ])
    }

    fn name_at(map: &SectionMap, time: f64) -> Option<&str> {
        map.section_at(time).map(|s| s.name.as_str())
    }

    #[test]
    fn test_section_lookup() {
        let map = two_sections();

        assert_eq!(name_at(&map, -1.0), Some("A")); // pre-roll
        assert_eq!(name_at(&map, 0.0), Some("A"));
        assert_eq!(name_at(&map, 9.99), Some("A"));
        assert_eq!(name_at(&map, 10.0), Some("B")); // lower bound inclusive
        assert_eq!(name_at(&map, 20.0), None); // upper bound exclusive
        assert_eq!(name_at(&map, 25.0), None);
    }

    #[test]
    fn test_unsorted_sections() {
        let map = SectionMap::new(vec![
            SongSection::new("Chorus", 30.0, 60.0),
            SongSection::new("Intro", 0.0, 15.0),
            SongSection::new("Verse", 15.0, 30.0),
        ]);

        let names: Vec<&str> = map.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Intro", "Verse", "Chorus"]);
        assert_eq!(name_at(&map, 20.0), Some("Verse"));
    }

    #[test]
    fn test_gap_between_sections() {
        let map = SectionMap::new(vec![
            SongSection::new("A", 2.0, 4.0),
            SongSection::new("B", 6.0, 8.0),
        ]);
        assert_eq!(name_at(&map, 1.0), Some("A"));
        assert_eq!(name_at(&map, 5.0), None);
        assert_eq!(name_at(&map, 6.0), Some("B"));
    }

    #[test]
    fn test_invalid_sections_dropped() {
        let map = SectionMap::new(vec![
            SongSection::new("Backwards", 5.0, 1.0),
            SongSection::new("Empty", 3.0, 3.0),
            SongSection::new("Ok", 0.0, 1.0),
        ]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_empty_map() {
        let map = SectionMap::default();
        assert!(map.section_at(0.0).is_none());
    }
}
