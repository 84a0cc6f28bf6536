// src/player/run_loop.rs
use super::{command_handler, Player, PlayerCommand, PLAYER_LOG_TARGET};
use crate::playback::MediaFactory;
use tracing::{info, trace};

/// Runs the player's command processing loop.
///
/// User commands and media notifications are handled on this one task, so every
/// controller transition happens in arrival order.
pub async fn run_player_loop<F: MediaFactory>(player: &mut Player<F>) {
    info!(target: PLAYER_LOG_TARGET, "Player run loop started.");

    loop {
        tokio::select! {
            biased; // Check commands first

            // --- Command Processing ---
            command = player.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: PLAYER_LOG_TARGET, "Command channel closed. Exiting run loop.");
                    break;
                };
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    PlayerCommand::LoadBook { book_id } => command_handler::handle_load_book(player, book_id).await,
                    PlayerCommand::LoadSource { url } => command_handler::handle_load_source(player, url),
                    PlayerCommand::Unload => command_handler::handle_unload(player),
                    PlayerCommand::TogglePlayPause => command_handler::handle_toggle_play_pause(player),
                    PlayerCommand::SeekToFraction(percent) => command_handler::handle_seek_to_fraction(player, percent),
                    PlayerCommand::Skip(delta) => command_handler::handle_skip(player, delta),
                    PlayerCommand::SetVolume(percent) => command_handler::handle_set_volume(player, percent),
                    PlayerCommand::SetPlaybackRate(rate) => command_handler::handle_set_playback_rate(player, rate),
                    PlayerCommand::GetFullState(responder) => {
                        let _ = responder.send(player.snapshot()); // Ignore error if receiver dropped
                    }
                    PlayerCommand::Shutdown => {
                        info!(target: PLAYER_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }

            // --- Media Notifications ---
            Some(tagged) = player.notification_rx.recv() => {
                command_handler::handle_media_notification(player, tagged);
            }
        }
    }

    // Teardown: no media task may outlive the view.
    info!(target: PLAYER_LOG_TARGET, "Player run loop finished. Releasing media.");
    command_handler::unload(player);
    info!(target: PLAYER_LOG_TARGET, "Player task cleanup complete.");
}
