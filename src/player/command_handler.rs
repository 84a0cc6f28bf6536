use super::{book_loader, Player, PlayerStateUpdate, PLAYER_LOG_TARGET};
use super::{BOOK_LOAD_FAILED_MESSAGE, BOOK_UNAVAILABLE_MESSAGE};
use crate::playback::{MediaFactory, MediaNotification, PlaybackError, TaggedNotification};
use tracing::{debug, info, instrument, trace, warn};

#[instrument(skip(player))]
pub async fn handle_load_book<F: MediaFactory>(player: &mut Player<F>, book_id: String) {
    info!(target: PLAYER_LOG_TARGET, "Handling LoadBook command for {}.", book_id);

    // Navigating away tears the previous session down before the fetch.
    unload(player);

    let book = match book_loader::fetch_book(player.catalog.clone(), &book_id).await {
        Ok(book) => book,
        Err(_) => {
            player.broadcast_update(PlayerStateUpdate::Error(BOOK_LOAD_FAILED_MESSAGE.to_string()));
            return;
        }
    };

    let Some(url) = book.audio_url().map(str::to_string) else {
        warn!(target: PLAYER_LOG_TARGET, "Book {} has no audio link.", book.id);
        player.broadcast_update(PlayerStateUpdate::Error(BOOK_UNAVAILABLE_MESSAGE.to_string()));
        return;
    };

    player.current_book = Some(book);
    if let Some(now_playing) = player.now_playing() {
        player.broadcast_update(PlayerStateUpdate::BookLoaded(now_playing));
    }
    load_source(player, &url);
}

#[instrument(skip(player))]
pub fn handle_load_source<F: MediaFactory>(player: &mut Player<F>, url: String) {
    info!(target: PLAYER_LOG_TARGET, "Handling LoadSource command.");
    unload(player);
    load_source(player, &url);
}

fn load_source<F: MediaFactory>(player: &mut Player<F>, url: &str) {
    let media = player.media_factory.create(player.notification_tx.clone());
    match player.controller.load_source(url, media) {
        Ok(_) => player.broadcast_update(PlayerStateUpdate::Transport(player.snapshot())),
        Err(e) => {
            player.current_book = None;
            report_error(player, e);
        }
    }
}

pub fn handle_unload<F: MediaFactory>(player: &mut Player<F>) {
    info!(target: PLAYER_LOG_TARGET, "Handling Unload command.");
    unload(player);
}

/// Releases the current source and forgets the book.
pub(super) fn unload<F: MediaFactory>(player: &mut Player<F>) {
    let had_source = player.controller.has_media();
    player.controller.clear_source();
    player.current_book = None;
    if had_source {
        player.broadcast_update(PlayerStateUpdate::Stopped);
    }
}

pub fn handle_toggle_play_pause<F: MediaFactory>(player: &mut Player<F>) {
    let result = player.controller.toggle_play_pause().map(|_| ());
    finish_transport(player, "TogglePlayPause", result);
}

pub fn handle_seek_to_fraction<F: MediaFactory>(player: &mut Player<F>, percent: f64) {
    let result = player.controller.seek_to_fraction(percent).map(|_| ());
    finish_transport(player, "SeekToFraction", result);
}

pub fn handle_skip<F: MediaFactory>(player: &mut Player<F>, delta_seconds: f64) {
    let result = player.controller.skip(delta_seconds).map(|_| ());
    finish_transport(player, "Skip", result);
}

pub fn handle_set_volume<F: MediaFactory>(player: &mut Player<F>, percent: f64) {
    let result = player.controller.set_volume(percent).map(|_| ());
    finish_transport(player, "SetVolume", result);
}

pub fn handle_set_playback_rate<F: MediaFactory>(player: &mut Player<F>, multiplier: f64) {
    let result = player.controller.set_playback_rate(multiplier).map(|_| ());
    finish_transport(player, "SetPlaybackRate", result);
}

/// Broadcasts the new transport state, or reports why the command did nothing.
fn finish_transport<F: MediaFactory>(player: &mut Player<F>, command: &str, result: Result<(), PlaybackError>) {
    match result {
        Ok(()) => {
            debug!(target: PLAYER_LOG_TARGET, "{} applied.", command);
            player.broadcast_update(PlayerStateUpdate::Transport(player.snapshot()));
        }
        Err(e) => report_error(player, e),
    }
}

/// Routes a media notification into the controller and broadcasts what changed.
pub fn handle_media_notification<F: MediaFactory>(player: &mut Player<F>, tagged: TaggedNotification) {
    let kind = match tagged.notification {
        MediaNotification::TimeAdvanced(_) => UpdateKind::Progress,
        MediaNotification::Ended => UpdateKind::Ended,
        _ => UpdateKind::Transport,
    };
    if let Err(e) = player.controller.handle_notification(tagged) {
        if e.is_user_visible() {
            player.current_book = None;
        }
        report_error(player, e);
        return;
    }

    let snapshot = player.snapshot();
    player.broadcast_update(match kind {
        UpdateKind::Progress => PlayerStateUpdate::Progress(snapshot),
        UpdateKind::Ended => PlayerStateUpdate::Ended(snapshot),
        UpdateKind::Transport => PlayerStateUpdate::Transport(snapshot),
    });
}

enum UpdateKind {
    Progress,
    Ended,
    Transport,
}

/// Surfaces load failures; invalid and stale operations are only logged.
fn report_error<F: MediaFactory>(player: &mut Player<F>, error: PlaybackError) {
    match error {
        PlaybackError::SourceLoadFailure(ref reason) => {
            warn!(target: PLAYER_LOG_TARGET, "Audio could not be loaded: {}", reason);
            player.broadcast_update(PlayerStateUpdate::Error(format!("Unable to play this audio: {}", reason)));
        }
        PlaybackError::InvalidOperation(ref reason) => {
            debug!(target: PLAYER_LOG_TARGET, "Ignored invalid operation: {}", reason);
        }
        PlaybackError::StaleNotification { .. } => {
            trace!(target: PLAYER_LOG_TARGET, "{}", error);
        }
    }
}
