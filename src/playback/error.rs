use std::error::Error;
use symphonia::core::errors::Error as SymphoniaError;

use crate::playback::media::SourceGeneration;

/// Error types produced by the playback controller and media backends.
#[derive(Debug)]
pub enum PlaybackError {
    /// The media resource could not be loaded (network, format, bad URL).
    SourceLoadFailure(String),
    /// Operation attempted without a loaded source, or with a disallowed argument.
    InvalidOperation(String),
    /// A notification arrived from a source that has since been replaced.
    StaleNotification {
        received: SourceGeneration,
        current: SourceGeneration,
    },
}

impl PlaybackError {
    /// Whether the view should show this error to the user.
    /// Only load failures are surfaced; the rest are expected to be prevented by the UI.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, PlaybackError::SourceLoadFailure(_))
    }
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackError::SourceLoadFailure(e) => write!(f, "Source load failure: {}", e),
            PlaybackError::InvalidOperation(e) => write!(f, "Invalid operation: {}", e),
            PlaybackError::StaleNotification { received, current } => write!(
                f,
                "Stale notification from source generation {} (current is {})",
                received, current
            ),
        }
    }
}

impl Error for PlaybackError {}

// --- From Implementations for PlaybackError ---

impl From<SymphoniaError> for PlaybackError {
    fn from(e: SymphoniaError) -> Self {
        PlaybackError::SourceLoadFailure(format!("unable to read media: {}", e))
    }
}

impl From<reqwest::Error> for PlaybackError {
    fn from(e: reqwest::Error) -> Self {
        PlaybackError::SourceLoadFailure(format!("network error: {}", e))
    }
}

impl From<url::ParseError> for PlaybackError {
    fn from(e: url::ParseError) -> Self {
        PlaybackError::SourceLoadFailure(format!("invalid media URL: {}", e))
    }
}

impl From<tokio::task::JoinError> for PlaybackError {
    fn from(e: tokio::task::JoinError) -> Self {
        PlaybackError::SourceLoadFailure(format!("probe task failed: {}", e))
    }
}
