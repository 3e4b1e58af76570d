// Integration test: Loading client configuration from disk

use dancesync::config::{ConfigError, SyncConfig};
use dancesync::dance::DanceId;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(
        &path,
        r#"(
            poll_interval_seconds: 0.05,
            crossfade_seconds: 0.5,
            default_bpm: 100.0,
            lighting: (
                transition_seconds: 2.0,
                base_color: (r: 0.1, g: 0.1, b: 0.2),
            ),
            api: (base_url: "https://music.example.com/api", timeout_seconds: 3),
            dances: Some([
                (id: "salsa", clip: "anim/salsa", beats_per_loop: 8),
                (id: "disco", clip: "anim/disco", beats_per_loop: 4),
            ]),
        )"#,
    )
    .unwrap();

    let config = SyncConfig::load(&path).unwrap();
    assert_eq!(config.poll_interval_seconds, 0.05);
    assert_eq!(config.dance_settings().crossfade_seconds, 0.5);
    assert_eq!(config.lighting.transition_seconds, 2.0);
    assert_eq!(config.api.timeout().as_secs(), 3);

    let library = config.dance_library();
    assert_eq!(library.len(), 2);
    assert!(library.get(&DanceId::new("disco")).is_some());
    assert!(library.get(&DanceId::new("1")).is_none());
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = SyncConfig::load_or_default(Some(&dir.path().join("nope.ron")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ron");
    fs::write(&path, "(crossfade_seconds: -1.0)").unwrap();
    assert!(matches!(SyncConfig::load(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_survives_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ron");

    let mut config = SyncConfig::default();
    config.camera.beat_intensity = 0.25;
    config.broadcast_capacity = 16;
    fs::write(&path, ron::ser::to_string_pretty(&config, Default::default()).unwrap()).unwrap();

    assert_eq!(SyncConfig::load(&path).unwrap(), config);
}
