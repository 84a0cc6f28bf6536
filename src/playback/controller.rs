use tracing::{debug, info, instrument, trace, warn};
use url::Url;

use crate::playback::{
    error::PlaybackError,
    media::{MediaBackend, MediaNotification, SourceGeneration, TaggedNotification},
    progress::TransportDisplay,
    session::{PlaybackRate, PlaybackSession, PlaybackStatus},
};

const LOG_TARGET: &str = "summarist_player::playback::controller";

/// Session values applied every time a new source is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackDefaults {
    /// Fraction in [0, 1].
    pub volume: f64,
    pub playback_rate: PlaybackRate,
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            volume: 1.0,
            playback_rate: PlaybackRate::NORMAL,
        }
    }
}

/// Mediates between transport gestures and the media clock of one source at a time.
///
/// The controller exclusively owns the media backend for the current source. Every
/// transport operation is synchronous; the commands it issues to the backend are
/// fire-and-forget and their effects come back as [`TaggedNotification`]s.
pub struct PlaybackController<M: MediaBackend> {
    session: PlaybackSession,
    media: Option<M>,
    source_url: Option<String>,
    generation: SourceGeneration,
    defaults: PlaybackDefaults,
}

impl<M: MediaBackend> PlaybackController<M> {
    pub fn new(defaults: PlaybackDefaults) -> Self {
        Self {
            session: PlaybackSession::new(defaults.volume, defaults.playback_rate),
            media: None,
            source_url: None,
            generation: SourceGeneration::default(),
            defaults,
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn generation(&self) -> SourceGeneration {
        self.generation
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    pub fn display(&self) -> TransportDisplay {
        TransportDisplay::from_session(&self.session)
    }

    // --- Source lifecycle ---

    /// Replaces the current source with `url`, played through `media`.
    ///
    /// The previous backend is detached and released before the new one is attached.
    /// On success the session is reset to the defaults and sits in `Paused`.
    #[instrument(skip(self, media), fields(generation))]
    pub fn load_source(&mut self, url: &str, mut media: M) -> Result<SourceGeneration, PlaybackError> {
        self.detach_current();

        if let Err(e) = validate_media_url(url) {
            warn!(target: LOG_TARGET, "Rejecting media source {}: {}", url, e);
            media.release();
            return Err(e);
        }

        let generation = self.generation;
        tracing::Span::current().record("generation", generation.0);
        if let Err(e) = media.load(url, generation) {
            warn!(target: LOG_TARGET, "Media backend refused source {}: {}", url, e);
            media.release();
            return Err(e);
        }
        media.set_volume(self.defaults.volume);
        media.set_playback_rate(self.defaults.playback_rate.multiplier());

        self.media = Some(media);
        self.source_url = Some(url.to_string());
        self.session.set_status(PlaybackStatus::Paused);
        info!(target: LOG_TARGET, "Loaded media source {} (generation {}).", url, generation);
        Ok(generation)
    }

    /// Releases the current source, if any, and returns to `Idle`.
    pub fn clear_source(&mut self) {
        if self.media.is_some() {
            info!(target: LOG_TARGET, "Clearing media source (generation {}).", self.generation);
        }
        self.detach_current();
    }

    /// Detaches listeners by moving to a new generation, releases the backend and resets the session.
    fn detach_current(&mut self) {
        self.generation = self.generation.next();
        if let Some(mut media) = self.media.take() {
            debug!(target: LOG_TARGET, "Releasing previous media backend.");
            media.release();
        }
        self.source_url = None;
        self.session = PlaybackSession::new(self.defaults.volume, self.defaults.playback_rate);
    }

    fn media_mut(&mut self, operation: &str) -> Result<&mut M, PlaybackError> {
        match self.media.as_mut() {
            Some(media) => Ok(media),
            None => {
                debug!(target: LOG_TARGET, "{} ignored: no media loaded.", operation);
                Err(PlaybackError::InvalidOperation(format!("{} requires a loaded source", operation)))
            }
        }
    }

    // --- Transport operations ---

    /// Pauses when playing, plays otherwise. Returns the new status.
    pub fn toggle_play_pause(&mut self) -> Result<PlaybackStatus, PlaybackError> {
        let status = self.session.status();
        let media = self.media_mut("toggle_play_pause")?;
        let next = if status == PlaybackStatus::Playing {
            media.pause();
            PlaybackStatus::Paused
        } else {
            if status == PlaybackStatus::Ended {
                // Replaying an ended resource starts from the top.
                media.set_position(0.0);
            }
            media.play();
            PlaybackStatus::Playing
        };
        if status == PlaybackStatus::Ended {
            self.session.set_position(0.0);
        }
        self.session.set_status(next);
        debug!(target: LOG_TARGET, "Transport {} -> {}.", status, next);
        Ok(next)
    }

    /// Seeks to `percent` (0-100) of the known duration. Returns the new position.
    pub fn seek_to_fraction(&mut self, percent: f64) -> Result<f64, PlaybackError> {
        if !percent.is_finite() {
            return Err(PlaybackError::InvalidOperation(format!("seek fraction {} is not a number", percent)));
        }
        let duration = self.session.duration_seconds();
        let media = self.media_mut("seek_to_fraction")?;
        let Some(duration) = duration else {
            debug!(target: LOG_TARGET, "Seek ignored: duration not yet known.");
            return Err(PlaybackError::InvalidOperation("cannot seek before the duration is known".to_string()));
        };
        let target = ((percent / 100.0) * duration).clamp(0.0, duration);
        media.set_position(target);
        self.apply_optimistic_position(target);
        Ok(target)
    }

    /// Moves the position by `delta_seconds`, clamped to the known horizon. Returns the new position.
    pub fn skip(&mut self, delta_seconds: f64) -> Result<f64, PlaybackError> {
        if !delta_seconds.is_finite() {
            return Err(PlaybackError::InvalidOperation(format!("skip delta {} is not a number", delta_seconds)));
        }
        let position = self.session.position_seconds();
        let upper = self.session.duration_seconds().unwrap_or(position);
        let media = self.media_mut("skip")?;
        let target = (position + delta_seconds).clamp(0.0, upper);
        media.set_position(target);
        self.apply_optimistic_position(target);
        Ok(target)
    }

    fn apply_optimistic_position(&mut self, target: f64) {
        self.session.set_position(target);
        if self.session.status() == PlaybackStatus::Ended {
            self.session.set_status(PlaybackStatus::Paused);
        }
        trace!(target: LOG_TARGET, "Optimistic position update to {:.2}s.", target);
    }

    /// Sets the volume from a 0-100 slider value. Returns the stored fraction.
    pub fn set_volume(&mut self, percent: f64) -> Result<f64, PlaybackError> {
        if percent.is_nan() {
            return Err(PlaybackError::InvalidOperation("volume is not a number".to_string()));
        }
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        self.media_mut("set_volume")?.set_volume(fraction);
        self.session.set_volume(fraction);
        Ok(fraction)
    }

    /// Changes speed; anything outside the allowed set leaves the rate untouched.
    pub fn set_playback_rate(&mut self, multiplier: f64) -> Result<PlaybackRate, PlaybackError> {
        let rate = PlaybackRate::try_from(multiplier)?;
        self.media_mut("set_playback_rate")?.set_playback_rate(rate.multiplier());
        self.session.set_playback_rate(rate);
        Ok(rate)
    }

    // --- Notifications ---

    /// Routes a backend notification, discarding anything from a replaced source.
    pub fn handle_notification(&mut self, tagged: TaggedNotification) -> Result<(), PlaybackError> {
        if tagged.generation != self.generation || self.media.is_none() {
            trace!(
                target: LOG_TARGET,
                "Discarding {:?} from generation {} (current {}).",
                tagged.notification, tagged.generation, self.generation
            );
            return Err(PlaybackError::StaleNotification {
                received: tagged.generation,
                current: self.generation,
            });
        }
        match tagged.notification {
            MediaNotification::TimeAdvanced(seconds) => self.on_media_time_advanced(seconds),
            MediaNotification::DurationResolved(seconds) => self.on_media_duration_resolved(seconds),
            MediaNotification::Ended => self.on_media_ended(),
            MediaNotification::LoadError(reason) => return Err(self.on_media_load_error(reason)),
        }
        Ok(())
    }

    /// Last writer wins: the media clock supersedes any earlier optimistic update.
    pub fn on_media_time_advanced(&mut self, seconds: f64) {
        if self.media.is_none() {
            return;
        }
        self.session.set_position(seconds);
    }

    pub fn on_media_duration_resolved(&mut self, seconds: f64) {
        if self.media.is_none() {
            return;
        }
        if !seconds.is_finite() || seconds < 0.0 {
            warn!(target: LOG_TARGET, "Ignoring unusable duration {}.", seconds);
            return;
        }
        if let Some(previous) = self.session.duration_seconds() {
            if previous != seconds {
                warn!(target: LOG_TARGET, "Duration changed from {:.2}s to {:.2}s for the same source.", previous, seconds);
            }
        }
        self.session.set_duration(seconds);
        debug!(target: LOG_TARGET, "Duration resolved: {:.2}s.", seconds);
    }

    pub fn on_media_ended(&mut self) {
        if self.media.is_none() {
            return;
        }
        if let Some(duration) = self.session.duration_seconds() {
            self.session.set_position(duration);
        }
        self.session.set_status(PlaybackStatus::Ended);
        info!(target: LOG_TARGET, "Playback reached the end of the source.");
    }

    /// Drops the failed source and returns the error for the view to surface.
    pub fn on_media_load_error(&mut self, reason: String) -> PlaybackError {
        warn!(target: LOG_TARGET, "Media failed to load: {}", reason);
        self.detach_current();
        PlaybackError::SourceLoadFailure(reason)
    }
}

impl<M: MediaBackend> Drop for PlaybackController<M> {
    fn drop(&mut self) {
        if let Some(mut media) = self.media.take() {
            media.release();
        }
    }
}

fn validate_media_url(url: &str) -> Result<(), PlaybackError> {
    if url.trim().is_empty() {
        return Err(PlaybackError::SourceLoadFailure("media URL is empty".to_string()));
    }
    Url::parse(url)?;
    Ok(())
}
