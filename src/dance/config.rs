// Dance configurations - Static table of selectable dances
// Looked up by string key ("1", "2", ...), immutable after construction

use super::host::ClipRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Key of a selectable dance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DanceId(String);

impl DanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One selectable dance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DanceConfig {
    pub id: DanceId,
    pub clip: ClipRef,
    /// Beats one loop of the clip should span
    pub beats_per_loop: u32,
}

impl DanceConfig {
    pub fn new(id: &str, clip: &str, beats_per_loop: u32) -> Self {
        Self {
            id: DanceId::new(id),
            clip: ClipRef::new(clip),
            beats_per_loop,
        }
    }
}

/// Dances available to the client
#[derive(Debug, Clone)]
pub struct DanceLibrary {
    dances: HashMap<DanceId, DanceConfig>,
}

impl DanceLibrary {
    /// Build a library, skipping entries with no clip or a zero-beat loop
    pub fn from_configs(configs: impl IntoIterator<Item = DanceConfig>) -> Self {
        let mut dances = HashMap::new();
        for config in configs {
            if config.beats_per_loop == 0 || config.clip.as_str().trim().is_empty() {
                tracing::warn!("Skipping invalid dance config '{}'", config.id);
                continue;
            }
            if dances.insert(config.id.clone(), config).is_some() {
                tracing::warn!("Duplicate dance id, keeping the last definition");
            }
        }
        Self { dances }
    }

    /// Dances shipped with the client
    pub fn builtin() -> Self {
        Self::from_configs([
            DanceConfig::new("1", "anim/dance/groove", 8),
            DanceConfig::new("2", "anim/dance/shuffle", 4),
            DanceConfig::new("3", "anim/dance/robot", 8),
            DanceConfig::new("4", "anim/dance/floss", 4),
            DanceConfig::new("5", "anim/dance/wave", 16),
            DanceConfig::new("6", "anim/dance/twist", 8),
        ])
    }

    pub fn get(&self, id: &DanceId) -> Option<&DanceConfig> {
        self.dances.get(id)
    }

    pub fn len(&self) -> usize {
        self.dances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dances.is_empty()
    }

    /// Dance ids in sorted order
    pub fn ids(&self) -> Vec<&DanceId> {
        let mut ids: Vec<&DanceId> = self.dances.keys().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }
}

impl Default for DanceLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let library = DanceLibrary::builtin();
        let dance = library.get(&DanceId::new("1")).unwrap();
        assert_eq!(dance.beats_per_loop, 8);
        assert!(library.get(&DanceId::new("99")).is_none());
        assert_eq!(library.ids().first().map(|id| id.as_str()), Some("1"));
    }

    #[test]
    fn test_invalid_configs_skipped() {
        let library = DanceLibrary::from_configs([
            DanceConfig::new("a", "anim/a", 0),
            DanceConfig::new("b", "  ", 4),
            DanceConfig::new("c", "anim/c", 4),
        ]);
        assert_eq!(library.len(), 1);
        assert!(library.get(&DanceId::new("c")).is_some());
    }
}
