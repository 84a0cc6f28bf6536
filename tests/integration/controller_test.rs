//! Integration tests for the playback controller
//!
//! These drive the controller through the public API the way a transport view
//! does, with the test standing in for the media element.

use crate::test_utils::{constants::TEST_AUDIO_URL, MediaCall, RecordingMedia};
use summarist_player::playback::{
    MediaNotification, PlaybackController, PlaybackDefaults, PlaybackError, PlaybackRate, PlaybackStatus,
    SourceGeneration, TaggedNotification, TIME_PLACEHOLDER,
};

#[cfg(test)]
mod controller_integration_tests {
    use super::*;

    fn notify(
        controller: &mut PlaybackController<RecordingMedia>,
        generation: SourceGeneration,
        notification: MediaNotification,
    ) -> Result<(), PlaybackError> {
        controller.handle_notification(TaggedNotification::new(generation, notification))
    }

    /// A full listen: load, metadata, play, seek, progress, end, replay.
    #[test]
    fn test_listening_session() -> Result<(), PlaybackError> {
        let mut controller = PlaybackController::new(PlaybackDefaults::default());
        let media = RecordingMedia::default();
        let generation = controller.load_source(TEST_AUDIO_URL, media.clone())?;

        let display = controller.display();
        assert_eq!(display.elapsed_label, "0:00");
        assert_eq!(display.remaining_label, TIME_PLACEHOLDER);
        assert_eq!(display.progress_percentage, 0.0);

        notify(&mut controller, generation, MediaNotification::DurationResolved(600.0))?;
        assert_eq!(controller.display().remaining_label, "10:00");

        assert_eq!(controller.toggle_play_pause()?, PlaybackStatus::Playing);

        // Seek to the middle, then the clock confirms from there
        assert_eq!(controller.seek_to_fraction(50.0)?, 300.0);
        notify(&mut controller, generation, MediaNotification::TimeAdvanced(301.0))?;
        let display = controller.display();
        assert_eq!(display.elapsed_label, "5:01");
        assert!((display.progress_percentage - 50.1666).abs() < 0.01);

        notify(&mut controller, generation, MediaNotification::Ended)?;
        assert_eq!(controller.session().status(), PlaybackStatus::Ended);
        assert_eq!(controller.display().progress_percentage, 100.0);

        assert_eq!(controller.toggle_play_pause()?, PlaybackStatus::Playing);
        assert_eq!(controller.session().position_seconds(), 0.0);

        let calls = media.calls();
        assert_eq!(calls[0], MediaCall::Load(TEST_AUDIO_URL.to_string(), generation));
        assert_eq!(&calls[calls.len() - 2..], &[MediaCall::SetPosition(0.0), MediaCall::Play]);
        Ok(())
    }

    /// Skipping uses the current position and never leaves [0, duration].
    #[test]
    fn test_skip_buttons() -> Result<(), PlaybackError> {
        let mut controller = PlaybackController::new(PlaybackDefaults::default());
        let generation = controller.load_source(TEST_AUDIO_URL, RecordingMedia::default())?;
        notify(&mut controller, generation, MediaNotification::DurationResolved(125.0))?;
        notify(&mut controller, generation, MediaNotification::TimeAdvanced(5.0))?;

        assert_eq!(controller.skip(-10.0)?, 0.0);
        assert_eq!(controller.skip(10.0)?, 10.0);
        notify(&mut controller, generation, MediaNotification::TimeAdvanced(120.0))?;
        assert_eq!(controller.skip(10.0)?, 125.0);
        assert_eq!(controller.display().elapsed_label, "2:05");
        assert_eq!(controller.session().status(), PlaybackStatus::Paused);
        Ok(())
    }

    /// Volume and speed persist across pause and play but reset with a new source.
    #[test]
    fn test_defaults_apply_per_source() -> Result<(), PlaybackError> {
        let defaults = PlaybackDefaults {
            volume: 0.5,
            playback_rate: PlaybackRate::NORMAL,
        };
        let mut controller = PlaybackController::new(defaults);
        controller.load_source(TEST_AUDIO_URL, RecordingMedia::default())?;

        assert_eq!(controller.set_volume(80.0)?, 0.8);
        assert_eq!(controller.set_playback_rate(1.5)?.multiplier(), 1.5);
        controller.toggle_play_pause()?;
        controller.toggle_play_pause()?;
        assert_eq!(controller.session().volume(), 0.8);
        assert_eq!(controller.session().playback_rate().multiplier(), 1.5);

        let second = RecordingMedia::default();
        controller.load_source("https://cdn.example.com/audio/other.mp3", second.clone())?;
        assert_eq!(controller.session().volume(), 0.5);
        assert_eq!(controller.session().playback_rate(), PlaybackRate::NORMAL);
        assert!(second.calls().contains(&MediaCall::SetVolume(0.5)));
        assert!(second.calls().contains(&MediaCall::SetPlaybackRate(1.0)));
        Ok(())
    }

    /// Late notifications from a replaced source never reach the new session.
    #[test]
    fn test_navigation_discards_old_source() -> Result<(), PlaybackError> {
        let mut controller = PlaybackController::new(PlaybackDefaults::default());
        let first = RecordingMedia::default();
        let old = controller.load_source(TEST_AUDIO_URL, first.clone())?;
        notify(&mut controller, old, MediaNotification::DurationResolved(300.0))?;

        let new = controller.load_source("https://cdn.example.com/audio/next.mp3", RecordingMedia::default())?;
        assert_ne!(old, new);
        assert_eq!(first.calls().last(), Some(&MediaCall::Release));

        for late in [
            MediaNotification::TimeAdvanced(200.0),
            MediaNotification::DurationResolved(300.0),
            MediaNotification::Ended,
            MediaNotification::LoadError("gone".to_string()),
        ] {
            assert!(matches!(
                notify(&mut controller, old, late),
                Err(PlaybackError::StaleNotification { .. })
            ));
        }
        assert_eq!(controller.session().status(), PlaybackStatus::Paused);
        assert_eq!(controller.session().position_seconds(), 0.0);
        assert_eq!(controller.session().duration_seconds(), None);
        Ok(())
    }

    /// A broken resource surfaces a load failure and leaves the player idle.
    #[test]
    fn test_load_error_surfaces() -> Result<(), PlaybackError> {
        let mut controller = PlaybackController::new(PlaybackDefaults::default());
        let media = RecordingMedia::default();
        let generation = controller.load_source(TEST_AUDIO_URL, media.clone())?;

        let error = notify(&mut controller, generation, MediaNotification::LoadError("404".to_string()))
            .expect_err("load error should surface");
        assert!(error.is_user_visible());
        assert_eq!(controller.session().status(), PlaybackStatus::Idle);
        assert!(!controller.has_media());
        assert_eq!(media.calls().last(), Some(&MediaCall::Release));
        assert!(controller.toggle_play_pause().is_err());
        Ok(())
    }
}
