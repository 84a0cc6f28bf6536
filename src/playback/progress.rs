use serde::Serialize;

use crate::playback::session::PlaybackSession;

/// Rendered in place of a time label when the value is unknown or invalid.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Display values derived from a [`PlaybackSession`]. Never stored; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportDisplay {
    pub progress_percentage: f64,
    pub elapsed_label: String,
    pub remaining_label: String,
}

impl TransportDisplay {
    pub fn from_session(session: &PlaybackSession) -> Self {
        let position = session.position_seconds();
        let duration = session.duration_seconds();
        Self {
            progress_percentage: progress_percentage(position, duration),
            elapsed_label: format_time(position),
            remaining_label: duration.map_or_else(|| TIME_PLACEHOLDER.to_string(), format_time),
        }
    }
}

/// Position as a percentage of the duration; 0 while the duration is unknown or zero.
pub fn progress_percentage(position_seconds: f64, duration_seconds: Option<f64>) -> f64 {
    match duration_seconds {
        Some(duration) if duration > 0.0 => (position_seconds / duration) * 100.0,
        _ => 0.0,
    }
}

/// Formats seconds as `minutes:SS`, e.g. `125.0` -> `"2:05"`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return TIME_PLACEHOLDER.to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}
