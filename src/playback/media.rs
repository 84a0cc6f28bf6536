//! Contract for the media playback primitive driven by the controller.

use std::fmt;
use tokio::sync::mpsc;

use crate::playback::error::PlaybackError;

/// Identifies which loaded source a notification belongs to.
///
/// The controller bumps the generation every time a source is detached, so any
/// notification still in flight from the old source compares unequal and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceGeneration(pub u64);

impl SourceGeneration {
    pub fn next(self) -> Self {
        SourceGeneration(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SourceGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notifications emitted asynchronously by a media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaNotification {
    /// The media clock moved; fired at a backend-defined cadence while playing.
    TimeAdvanced(f64),
    /// Metadata is available and the total length is known.
    DurationResolved(f64),
    /// Playback reached the end without user intervention.
    Ended,
    /// The resource could not be loaded.
    LoadError(String),
}

/// A notification stamped with the generation of the source that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedNotification {
    pub generation: SourceGeneration,
    pub notification: MediaNotification,
}

impl TaggedNotification {
    pub fn new(generation: SourceGeneration, notification: MediaNotification) -> Self {
        Self { generation, notification }
    }
}

/// Commands understood by a media backend.
///
/// All transport commands are fire-and-forget: completion is observed through
/// [`MediaNotification`]s, never through return values.
pub trait MediaBackend: Send {
    /// Begins loading `url`. Notifications for this resource must carry `generation`.
    /// An `Err` means the backend rejected the request outright; asynchronous
    /// failures arrive later as [`MediaNotification::LoadError`].
    fn load(&mut self, url: &str, generation: SourceGeneration) -> Result<(), PlaybackError>;

    fn play(&mut self);

    fn pause(&mut self);

    fn set_position(&mut self, seconds: f64);

    /// `fraction` is already clamped to [0, 1].
    fn set_volume(&mut self, fraction: f64);

    fn set_playback_rate(&mut self, multiplier: f64);

    /// Stops playback and detaches all notification emitters. Idempotent.
    fn release(&mut self);
}

/// Creates one backend per loaded source, wired to the player's notification channel.
pub trait MediaFactory: Send {
    type Media: MediaBackend;

    fn create(&self, notifications: mpsc::Sender<TaggedNotification>) -> Self::Media;
}
