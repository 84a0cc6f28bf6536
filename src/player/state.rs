use serde::Serialize;
use tokio::sync::oneshot;

use crate::playback::{PlaybackRate, PlaybackStatus, TransportDisplay};

/// Commands that can be sent to the Player task.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Fetch a book from the catalog and load its audio summary.
    LoadBook { book_id: String },
    /// Load a media URL directly, without a catalog record.
    LoadSource { url: String },
    /// Release the current source.
    Unload,
    TogglePlayPause,
    /// Seek to a percentage (0-100) of the duration.
    SeekToFraction(f64),
    /// Move by a signed number of seconds.
    Skip(f64),
    /// Volume slider value, 0-100.
    SetVolume(f64),
    SetPlaybackRate(f64),
    GetFullState(oneshot::Sender<PlayerSnapshot>),
    Shutdown,
}

/// Book details shown alongside the transport controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub sub_title: String,
    /// Text of the summary, read alongside the audio.
    pub summary: String,
}

/// Everything the view needs to render the transport UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub now_playing: Option<NowPlaying>,
    pub source_url: Option<String>,
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub volume: f64,
    pub playback_rate: PlaybackRate,
    pub display: TransportDisplay,
}

/// Updates broadcast by the Player task about its state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerStateUpdate {
    /// A catalog book was fetched and its audio handed to the media backend.
    BookLoaded(NowPlaying),
    /// A user action or metadata changed the transport state.
    Transport(PlayerSnapshot),
    /// The media clock advanced.
    Progress(PlayerSnapshot),
    /// Playback reached the end on its own.
    Ended(PlayerSnapshot),
    /// The source was released.
    Stopped,
    /// A user-visible failure, e.g. the book or its audio could not be loaded.
    Error(String),
}
