use serde::Serialize;
use std::fmt;

use crate::playback::error::PlaybackError;

/// Playback speeds offered by the speed selector.
pub const ALLOWED_PLAYBACK_RATES: [f64; 5] = [0.75, 1.0, 1.25, 1.5, 2.0];

const RATE_TOLERANCE: f64 = 1e-9;

/// Transport state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No media loaded.
    #[default]
    Idle,
    Playing,
    Paused,
    /// Playback reached the end on its own.
    Ended,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// A speed multiplier guaranteed to be one of [`ALLOWED_PLAYBACK_RATES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    pub const NORMAL: PlaybackRate = PlaybackRate(1.0);

    /// Returns `None` when `multiplier` is not an allowed speed.
    pub fn new(multiplier: f64) -> Option<Self> {
        ALLOWED_PLAYBACK_RATES
            .iter()
            .copied()
            .find(|allowed| (allowed - multiplier).abs() < RATE_TOLERANCE)
            .map(PlaybackRate)
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = PlaybackError;

    fn try_from(multiplier: f64) -> Result<Self, Self::Error> {
        PlaybackRate::new(multiplier).ok_or_else(|| {
            PlaybackError::InvalidOperation(format!(
                "playback rate {} is not one of {:?}",
                multiplier, ALLOWED_PLAYBACK_RATES
            ))
        })
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Transport state for the currently loaded audio resource.
///
/// Fields are only written through the controller so the invariants hold:
/// `0 <= position <= duration` once the duration is known, and volume stays in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    status: PlaybackStatus,
    position_seconds: f64,
    duration_seconds: Option<f64>,
    volume: f64,
    playback_rate: PlaybackRate,
}

impl PlaybackSession {
    pub(crate) fn new(volume: f64, playback_rate: PlaybackRate) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: None,
            volume: clamp_volume(volume),
            playback_rate,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn position_seconds(&self) -> f64 {
        self.position_seconds
    }

    /// `None` until the media reports its metadata.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    pub(crate) fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
    }

    /// Stores `seconds` clamped to the valid range for the current duration.
    pub(crate) fn set_position(&mut self, seconds: f64) {
        let floored = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.position_seconds = match self.duration_seconds {
            Some(duration) => floored.min(duration),
            None => floored,
        };
    }

    pub(crate) fn set_duration(&mut self, seconds: f64) {
        self.duration_seconds = Some(seconds);
        if self.position_seconds > seconds {
            self.position_seconds = seconds;
        }
    }

    pub(crate) fn set_volume(&mut self, fraction: f64) {
        self.volume = clamp_volume(fraction);
    }

    pub(crate) fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.playback_rate = rate;
    }
}

fn clamp_volume(fraction: f64) -> f64 {
    if fraction.is_nan() {
        return 1.0;
    }
    fraction.clamp(0.0, 1.0)
}
