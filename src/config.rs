// Configuration - Client settings loaded from a RON file
// Every field has a default, so a partial (or missing) file is valid

use crate::dance::speed::DEFAULT_SPEED_DAMPING;
use crate::dance::{DanceConfig, DanceLibrary, DanceSettings};
use crate::effects::{CameraPulseSettings, Color};
use crate::sync::Tempo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub transition_seconds: f64,
    pub base_color: Color,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            transition_seconds: 1.0,
            base_color: Color::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub base_fov: f64,
    pub max_fov_delta: f64,
    pub pulse_seconds: f64,
    pub downbeat_intensity: f64,
    pub beat_intensity: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let pulse = CameraPulseSettings::default();
        Self {
            base_fov: pulse.base_fov,
            max_fov_delta: pulse.max_fov_delta,
            pulse_seconds: pulse.pulse_seconds,
            downbeat_intensity: 1.0,
            beat_intensity: 0.4,
        }
    }
}

impl CameraConfig {
    pub fn pulse_settings(&self) -> CameraPulseSettings {
        CameraPulseSettings {
            base_fov: self.base_fov,
            max_fov_delta: self.max_fov_delta,
            pulse_seconds: self.pulse_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minimum wall time between tracker polls when no beat grid is tracked
    pub poll_interval_seconds: f64,
    pub crossfade_seconds: f64,
    pub speed_damping: f64,
    pub default_bpm: f64,
    pub rig_wait_timeout_seconds: f64,
    pub broadcast_capacity: usize,
    pub lighting: LightingConfig,
    pub camera: CameraConfig,
    pub api: ApiConfig,
    /// Replaces the built-in dances when set
    pub dances: Option<Vec<DanceConfig>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 0.1,
            crossfade_seconds: 0.3,
            speed_damping: DEFAULT_SPEED_DAMPING,
            default_bpm: Tempo::DEFAULT_BPM,
            rig_wait_timeout_seconds: 10.0,
            broadcast_capacity: 64,
            lighting: LightingConfig::default(),
            camera: CameraConfig::default(),
            api: ApiConfig::default(),
            dances: None,
        }
    }
}

impl SyncConfig {
    /// Default config file location: <config dir>/dancesync/config.ron
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dancesync").join("config.ron"))
    }

    /// Parse and validate a RON document
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Explicit path if given, else the default location, else built-in defaults
    /// A missing default file is not an error; a broken one is
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("poll_interval_seconds", self.poll_interval_seconds),
            ("default_bpm", self.default_bpm),
            ("rig_wait_timeout_seconds", self.rig_wait_timeout_seconds),
            ("lighting.transition_seconds", self.lighting.transition_seconds),
            ("camera.pulse_seconds", self.camera.pulse_seconds),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be > 0", name)));
            }
        }
        if !(self.crossfade_seconds.is_finite() && self.crossfade_seconds >= 0.0) {
            return Err(ConfigError::Invalid(
                "crossfade_seconds must be >= 0".to_string(),
            ));
        }
        if !(0.0..0.1).contains(&self.speed_damping) {
            return Err(ConfigError::Invalid(
                "speed_damping must be in [0, 0.1)".to_string(),
            ));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dance_settings(&self) -> DanceSettings {
        DanceSettings {
            crossfade_seconds: self.crossfade_seconds,
            speed_damping: self.speed_damping,
            rig_wait_timeout_seconds: self.rig_wait_timeout_seconds,
        }
    }

    pub fn dance_library(&self) -> DanceLibrary {
        match &self.dances {
            Some(dances) => DanceLibrary::from_configs(dances.iter().cloned()),
            None => DanceLibrary::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval_seconds, 0.1);
        assert_eq!(config.crossfade_seconds, 0.3);
        assert_eq!(config.default_bpm, 120.0);
    }

    #[test]
    fn test_partial_ron() {
        let config = SyncConfig::from_ron("(default_bpm: 100.0, camera: (base_fov: 80.0))").unwrap();
        assert_eq!(config.default_bpm, 100.0);
        assert_eq!(config.camera.base_fov, 80.0);
        assert_eq!(config.camera.beat_intensity, 0.4);
        assert_eq!(config.crossfade_seconds, 0.3);
    }

    #[test]
    fn test_custom_dances() {
        let config = SyncConfig::from_ron(
            r#"(dances: Some([(id: "salsa", clip: "anim/salsa", beats_per_loop: 8)]))"#,
        )
        .unwrap();
        let library = config.dance_library();
        assert_eq!(library.len(), 1);
        assert!(library.get(&crate::dance::DanceId::new("salsa")).is_some());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SyncConfig::from_ron("(default_bpm: 0.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SyncConfig::from_ron("(speed_damping: 0.5)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SyncConfig::from_ron("(broadcast_capacity: 0)"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SyncConfig::from_ron("(default_bpm: \"fast\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
