use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use summarist_player::catalog::{CatalogApiContract, CatalogClient};
use summarist_player::config::Settings;
use summarist_player::init_app_dirs;
use summarist_player::playback::{ClockedMediaFactory, DurationSource, FixedDuration, HttpDurationProbe};
use summarist_player::player::{Player, PlayerCommand, PlayerStateUpdate};
use summarist_player::ui::{parse_action, Cli, TransportAction, HELP_TEXT};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, oneshot};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STATE_UPDATE_CAPACITY: usize = 64;
const COMMAND_BUFFER_SIZE: usize = 32;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::new();
    let args = &cli.args;

    // Logs go to stderr so they do not fight with the transport line
    let (plain_layer, json_layer) = if args.log_json {
        (None, Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "summarist_player=info".into()),
        )
        .with(plain_layer)
        .with(json_layer)
        .init();

    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;
    if let Some(catalog_url) = &args.catalog_url {
        settings.catalog_url = catalog_url.clone();
    }
    if let Err(e) = settings.validate() {
        cli.display_error(&e);
        return Err(e.into());
    }
    info!("Using catalog at {}", settings.catalog_url);

    let catalog: Arc<dyn CatalogApiContract> =
        Arc::new(CatalogClient::with_timeout(&settings.catalog_url, settings.request_timeout()));

    if let Some(status) = args.list {
        let books = catalog.get_books_by_status(status).await?;
        cli.display_book_list(status, &books);
        cli.finish();
        return Ok(());
    }

    let initial_command = match (&args.book, &args.audio_url) {
        (Some(book_id), _) => PlayerCommand::LoadBook { book_id: book_id.clone() },
        (None, Some(url)) => PlayerCommand::LoadSource { url: url.clone() },
        (None, None) => {
            return Err("Nothing to play: pass --book <id>, --audio-url <url> or --list <status>.".into())
        }
    };
    let duration_source: Arc<dyn DurationSource> = match args.duration {
        Some(seconds) => Arc::new(FixedDuration(seconds)),
        None => Arc::new(HttpDurationProbe::new(settings.request_timeout())),
    };
    let media_factory = ClockedMediaFactory::new(duration_source, settings.clock_cadence());

    let (mut player, command_tx) =
        Player::new(catalog, media_factory, &settings, STATE_UPDATE_CAPACITY, COMMAND_BUFFER_SIZE);
    let mut updates = player.subscribe_state_updates();
    let player_task = tokio::spawn(async move { player.run().await });

    command_tx.send(initial_command).await?;
    cli.display_message(HELP_TEXT);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => render_update(&cli, update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Transport view fell behind by {} updates.", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_action(&line, settings.skip_seconds) {
                    Ok(TransportAction::Quit) => break,
                    Ok(TransportAction::Help) => cli.display_message(HELP_TEXT),
                    Ok(TransportAction::ShowState) => {
                        let (responder, state_rx) = oneshot::channel();
                        command_tx.send(PlayerCommand::GetFullState(responder)).await?;
                        let snapshot = state_rx.await?;
                        cli.display_message(&serde_json::to_string_pretty(&snapshot)?);
                    }
                    Ok(action) => {
                        if let Some(command) = action.into_command() {
                            command_tx.send(command).await?;
                        }
                    }
                    Err(message) => cli.display_message(&message),
                }
            }
        }
    }

    // Teardown releases the media clock before the process exits
    let _ = command_tx.send(PlayerCommand::Shutdown).await;
    player_task.await?;
    cli.finish();
    Ok(())
}

fn render_update(cli: &Cli, update: PlayerStateUpdate) {
    match update {
        PlayerStateUpdate::BookLoaded(now_playing) => cli.display_now_playing(&now_playing),
        PlayerStateUpdate::Transport(snapshot) | PlayerStateUpdate::Progress(snapshot) => {
            cli.render_transport(&snapshot)
        }
        PlayerStateUpdate::Ended(snapshot) => {
            cli.render_transport(&snapshot);
            cli.display_message("Finished. Press p to listen again.");
        }
        PlayerStateUpdate::Stopped => cli.display_message("Stopped."),
        PlayerStateUpdate::Error(message) => cli.display_message(&message),
    }
}
