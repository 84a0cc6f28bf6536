//! Command-line interface implementation

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

use crate::catalog::{Book, BookStatus};
use crate::player::{NowPlaying, PlayerCommand, PlayerSnapshot};

/// Command-line arguments for summarist-player
#[derive(Parser, Debug)]
#[command(author, version, about = "Listen to book summaries from the terminal", long_about = None)]
pub struct Args {
    /// Catalog id of the book to play
    #[arg(short, long, env = "SUMMARIST_BOOK_ID", conflicts_with = "audio_url")]
    pub book: Option<String>,

    /// Play this audio URL directly instead of looking up a book
    #[arg(short, long, env = "SUMMARIST_AUDIO_URL")]
    pub audio_url: Option<String>,

    /// Print a curated list (selected, recommended, suggested) and exit
    #[arg(short, long, conflicts_with_all = ["book", "audio_url"])]
    pub list: Option<BookStatus>,

    /// Catalog API base URL
    #[arg(long, env = "SUMMARIST_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Known length of the audio in seconds; skips downloading it to read the duration
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Config file path
    #[arg(short, long, env = "SUMMARIST_CONFIG")]
    pub config: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

/// A transport gesture typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportAction {
    TogglePlayPause,
    SeekToFraction(f64),
    Skip(f64),
    SetVolume(f64),
    SetPlaybackRate(f64),
    ShowState,
    Help,
    Quit,
}

impl TransportAction {
    /// The player command for this action, if it is one.
    pub fn into_command(self) -> Option<PlayerCommand> {
        match self {
            TransportAction::TogglePlayPause => Some(PlayerCommand::TogglePlayPause),
            TransportAction::SeekToFraction(percent) => Some(PlayerCommand::SeekToFraction(percent)),
            TransportAction::Skip(delta) => Some(PlayerCommand::Skip(delta)),
            TransportAction::SetVolume(percent) => Some(PlayerCommand::SetVolume(percent)),
            TransportAction::SetPlaybackRate(rate) => Some(PlayerCommand::SetPlaybackRate(rate)),
            TransportAction::ShowState | TransportAction::Help | TransportAction::Quit => None,
        }
    }
}

pub const HELP_TEXT: &str = "Commands: [p]lay/pause, seek <0-100>, ff, rw, vol <0-100>, speed <0.75|1|1.25|1.5|2>, state, help, [q]uit";

/// Parses one line of input. `skip_seconds` is the step used by `ff` and `rw`.
pub fn parse_action(line: &str, skip_seconds: f64) -> Result<TransportAction, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("Empty command".to_string());
    };
    let argument = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments for '{}'", verb));
    }

    let number = |name: &str| -> Result<f64, String> {
        let raw = argument.ok_or_else(|| format!("'{}' needs a value", name))?;
        raw.trim_end_matches(|c: char| c == 'x' || c == '%')
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", raw))
    };

    match verb.to_lowercase().as_str() {
        "p" | "play" | "pause" => Ok(TransportAction::TogglePlayPause),
        "seek" => Ok(TransportAction::SeekToFraction(number("seek")?)),
        "ff" | "+" => Ok(TransportAction::Skip(skip_seconds)),
        "rw" | "-" => Ok(TransportAction::Skip(-skip_seconds)),
        "vol" | "volume" => Ok(TransportAction::SetVolume(number("vol")?)),
        "speed" => Ok(TransportAction::SetPlaybackRate(number("speed")?)),
        "state" => Ok(TransportAction::ShowState),
        "h" | "help" | "?" => Ok(TransportAction::Help),
        "q" | "quit" | "exit" => Ok(TransportAction::Quit),
        other => Err(format!("Unknown command '{}'", other)),
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
    transport_bar: ProgressBar,
}

impl Cli {
    /// Create a new CLI instance from the process arguments
    pub fn new() -> Self {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Self {
        let transport_bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{prefix} {msg} [{bar:40.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        transport_bar.set_style(style);
        Cli { args, transport_bar }
    }

    /// Display book details and the summary text above the player
    pub fn display_now_playing(&self, now_playing: &NowPlaying) {
        self.transport_bar.println(format_now_playing(now_playing));
    }

    /// Print one line per book of a curated list
    pub fn display_book_list(&self, status: BookStatus, books: &[Book]) {
        self.transport_bar.println(format!("{} books ({}):", status, books.len()));
        for book in books {
            self.transport_bar.println(format_book_line(book));
        }
    }

    /// Redraw the transport line from a snapshot
    pub fn render_transport(&self, snapshot: &PlayerSnapshot) {
        self.transport_bar.set_prefix(format!("{:>7} {}", snapshot.status.to_string(), snapshot.playback_rate));
        self.transport_bar.set_message(format_transport_labels(snapshot));
        self.transport_bar
            .set_position(snapshot.display.progress_percentage.clamp(0.0, 100.0).round() as u64);
    }

    pub fn display_message(&self, message: &str) {
        self.transport_bar.println(message);
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        self.transport_bar.println(format!("Error: {}", error));
    }

    pub fn finish(&self) {
        self.transport_bar.finish_and_clear();
    }
}

/// `id  title by author`, flagged when there is nothing to listen to.
pub fn format_book_line(book: &Book) -> String {
    let audio = if book.audio_url().is_some() { "" } else { "  [text only]" };
    format!("{}  {} by {}{}", book.id, book.title, book.author, audio)
}

/// Title block followed by the summary text, as shown above the transport line.
pub fn format_now_playing(now_playing: &NowPlaying) -> String {
    let mut text = format!("\n{}\nBy {}", now_playing.title, now_playing.author);
    if !now_playing.sub_title.trim().is_empty() {
        text.push_str(&format!("\n{}", now_playing.sub_title.trim()));
    }
    if !now_playing.summary.trim().is_empty() {
        text.push_str(&format!("\n\n{}\n", now_playing.summary.trim()));
    }
    text
}

/// `elapsed / total` labels plus the volume, e.g. `2:05 / 10:00 vol 80%`.
pub fn format_transport_labels(snapshot: &PlayerSnapshot) -> String {
    format!(
        "{} / {} vol {:>3.0}%",
        snapshot.display.elapsed_label,
        snapshot.display.remaining_label,
        snapshot.volume * 100.0
    )
}
