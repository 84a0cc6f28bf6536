//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use std::error::Error;
use summarist_player::config::Settings;
use summarist_player::playback::{PlaybackController, PlaybackRate, PlaybackStatus};
use tempfile::tempdir;

use crate::test_utils::{constants::TEST_AUDIO_URL, RecordingMedia};

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("nested").join("config.json");

        // Nothing on disk yet: defaults
        assert_eq!(Settings::load(&config_path)?, Settings::default());

        let settings = Settings {
            catalog_url: "http://localhost:5000".to_string(),
            skip_seconds: 15.0,
            default_volume: 60.0,
            default_playback_rate: 1.25,
            ..Settings::default()
        };
        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded, settings);

        let mut updated = loaded;
        updated.catalog_url = "http://localhost:6000".to_string();
        updated.save(&config_path)?;
        assert_eq!(Settings::load(&config_path)?.catalog_url, "http://localhost:6000");

        Ok(())
    }

    /// Saved defaults reach a fresh playback session
    #[test]
    fn test_settings_drive_new_sessions() -> Result<(), Box<dyn Error>> {
        let settings = Settings {
            default_volume: 60.0,
            default_playback_rate: 1.25,
            ..Settings::default()
        };
        let mut controller = PlaybackController::new(settings.playback_defaults());
        controller.load_source(TEST_AUDIO_URL, RecordingMedia::default())?;

        let session = controller.session();
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.volume(), 0.6);
        assert_eq!(session.playback_rate(), PlaybackRate::new(1.25).ok_or("rate not allowed")?);
        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let invalid_settings = Settings {
            catalog_url: "".to_string(),
            ..Settings::default()
        };
        assert!(invalid_settings.validate().is_err());

        let invalid_settings = Settings {
            default_playback_rate: 3.0,
            ..Settings::default()
        };
        assert!(invalid_settings.validate().is_err());

        let invalid_settings = Settings {
            default_volume: 120.0,
            ..Settings::default()
        };
        assert!(invalid_settings.validate().is_err());
    }
}
