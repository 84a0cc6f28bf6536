//! Player view-model: owns the playback controller for the book on screen.

use crate::catalog::{Book, CatalogApiContract};
use crate::config::Settings;
use crate::playback::{MediaFactory, PlaybackController, TaggedNotification};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, instrument, trace};
use uuid::Uuid;

mod book_loader;
mod command_handler;
mod run_loop;
mod state;

pub use book_loader::{BOOK_LOAD_FAILED_MESSAGE, BOOK_UNAVAILABLE_MESSAGE};
pub use state::{NowPlaying, PlayerCommand, PlayerSnapshot, PlayerStateUpdate};

const PLAYER_LOG_TARGET: &str = "summarist_player::player";

/// Capacity of the media notification channel.
const NOTIFICATION_BUFFER_SIZE: usize = 64;

/// Routes transport gestures and media notifications through a single
/// [`PlaybackController`] and broadcasts the resulting state.
pub struct Player<F: MediaFactory> {
    // --- Configuration ---
    catalog: Arc<dyn CatalogApiContract>,
    media_factory: F,
    view_id: Uuid,

    // --- State ---
    controller: PlaybackController<F::Media>,
    current_book: Option<Book>,

    // --- Communication ---
    command_rx: mpsc::Receiver<PlayerCommand>,
    state_update_tx: broadcast::Sender<PlayerStateUpdate>,
    notification_tx: mpsc::Sender<TaggedNotification>,
    notification_rx: mpsc::Receiver<TaggedNotification>,
}

impl<F: MediaFactory> Player<F> {
    /// Creates a new Player instance and the command channel sender.
    /// The Player itself should be run in a separate task using `Player::run`.
    pub fn new(
        catalog: Arc<dyn CatalogApiContract>,
        media_factory: F,
        settings: &Settings,
        state_update_capacity: usize,
        command_buffer_size: usize,
    ) -> (Self, mpsc::Sender<PlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let (state_update_tx, _) = broadcast::channel(state_update_capacity);
        let (notification_tx, notification_rx) = mpsc::channel(NOTIFICATION_BUFFER_SIZE);

        let player = Player {
            catalog,
            media_factory,
            view_id: Uuid::new_v4(),
            controller: PlaybackController::new(settings.playback_defaults()),
            current_book: None,
            command_rx,
            state_update_tx,
            notification_tx,
            notification_rx,
        };

        (player, command_tx)
    }

    /// Subscribes to player state updates.
    pub fn subscribe_state_updates(&self) -> broadcast::Receiver<PlayerStateUpdate> {
        self.state_update_tx.subscribe()
    }

    // --- Private Helper Methods ---

    /// Sends a state update via the broadcast channel, logging errors.
    fn broadcast_update(&self, update: PlayerStateUpdate) {
        trace!(target: PLAYER_LOG_TARGET, "Broadcasting state update: {:?}", update);
        if self.state_update_tx.send(update).is_err() {
            // No subscribers; normal before the view attaches.
            debug!(target: PLAYER_LOG_TARGET, "No active listeners for state update.");
        }
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        self.current_book.as_ref().map(|book| NowPlaying {
            book_id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            sub_title: book.sub_title.clone(),
            summary: book.summary.clone(),
        })
    }

    /// Constructs the full current state object.
    fn snapshot(&self) -> PlayerSnapshot {
        let session = self.controller.session();
        PlayerSnapshot {
            now_playing: self.now_playing(),
            source_url: self.controller.source_url().map(str::to_string),
            status: session.status(),
            position_seconds: session.position_seconds(),
            duration_seconds: session.duration_seconds(),
            volume: session.volume(),
            playback_rate: session.playback_rate(),
            display: self.controller.display(),
        }
    }

    // --- Main Run Loop ---

    /// Runs the player's command processing loop. This should be spawned as a Tokio task.
    #[instrument(skip(self), fields(view_id = %self.view_id))]
    pub async fn run(&mut self) {
        run_loop::run_player_loop(self).await;
    }
}
