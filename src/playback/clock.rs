//! Headless media backend: a tokio task per source that runs a media clock.

use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

use crate::playback::{
    error::PlaybackError,
    media::{MediaBackend, MediaFactory, MediaNotification, SourceGeneration, TaggedNotification},
    probe::DurationSource,
};

const LOG_TARGET: &str = "summarist_player::playback::clock";

/// Commands forwarded from the backend handle to its clock task.
#[derive(Debug, Clone, PartialEq)]
enum ClockCommand {
    Play,
    Pause,
    SetPosition(f64),
    SetVolume(f64),
    SetRate(f64),
}

/// Handle to a running clock task.
struct ClockTask {
    command_tx: mpsc::UnboundedSender<ClockCommand>,
    shutdown_tx: broadcast::Sender<()>,
    task_handle: JoinHandle<()>,
    generation: SourceGeneration,
}

impl ClockTask {
    fn send(&self, command: ClockCommand) {
        if self.command_tx.send(command).is_err() {
            // The task already exited (end of media or load error); nothing to drive.
            trace!(target: LOG_TARGET, generation = %self.generation, "Clock task gone, dropping command.");
        }
    }

    fn stop(self) {
        debug!(target: LOG_TARGET, generation = %self.generation, "Sending shutdown signal to clock task.");
        if self.shutdown_tx.send(()).is_err() {
            trace!(target: LOG_TARGET, generation = %self.generation, "Clock task already finished.");
        }
        // No await in a synchronous release; abort guarantees no further notifications.
        self.task_handle.abort();
    }
}

/// A [`MediaBackend`] that simulates playback of a resource whose duration comes
/// from a [`DurationSource`]. Requires a running tokio runtime.
pub struct ClockedMedia {
    notifications: mpsc::Sender<TaggedNotification>,
    duration_source: Arc<dyn DurationSource>,
    cadence: StdDuration,
    task: Option<ClockTask>,
}

impl ClockedMedia {
    pub fn new(
        notifications: mpsc::Sender<TaggedNotification>,
        duration_source: Arc<dyn DurationSource>,
        cadence: StdDuration,
    ) -> Self {
        Self {
            notifications,
            duration_source,
            cadence,
            task: None,
        }
    }

    fn send(&self, command: ClockCommand) {
        match &self.task {
            Some(task) => task.send(command),
            None => trace!(target: LOG_TARGET, "No source loaded, dropping {:?}.", command),
        }
    }
}

impl MediaBackend for ClockedMedia {
    fn load(&mut self, url: &str, generation: SourceGeneration) -> Result<(), PlaybackError> {
        self.release();
        if self.cadence.is_zero() {
            return Err(PlaybackError::InvalidOperation("clock cadence must be positive".to_string()));
        }
        self.task = Some(spawn_clock_task(
            url.to_string(),
            generation,
            self.duration_source.clone(),
            self.cadence,
            self.notifications.clone(),
        ));
        Ok(())
    }

    fn play(&mut self) {
        self.send(ClockCommand::Play);
    }

    fn pause(&mut self) {
        self.send(ClockCommand::Pause);
    }

    fn set_position(&mut self, seconds: f64) {
        self.send(ClockCommand::SetPosition(seconds));
    }

    fn set_volume(&mut self, fraction: f64) {
        self.send(ClockCommand::SetVolume(fraction));
    }

    fn set_playback_rate(&mut self, multiplier: f64) {
        self.send(ClockCommand::SetRate(multiplier));
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.stop();
        }
    }
}

impl Drop for ClockedMedia {
    fn drop(&mut self) {
        self.release();
    }
}

/// Builds [`ClockedMedia`] backends sharing one duration source and cadence.
#[derive(Clone)]
pub struct ClockedMediaFactory {
    duration_source: Arc<dyn DurationSource>,
    cadence: StdDuration,
}

impl ClockedMediaFactory {
    pub fn new(duration_source: Arc<dyn DurationSource>, cadence: StdDuration) -> Self {
        Self { duration_source, cadence }
    }
}

impl MediaFactory for ClockedMediaFactory {
    type Media = ClockedMedia;

    fn create(&self, notifications: mpsc::Sender<TaggedNotification>) -> ClockedMedia {
        ClockedMedia::new(notifications, self.duration_source.clone(), self.cadence)
    }
}

/// Media clock state owned by the task.
#[derive(Debug)]
struct ClockState {
    playing: bool,
    position: f64,
    duration: f64,
    rate: f64,
    volume: f64,
}

impl ClockState {
    fn apply(&mut self, command: ClockCommand) {
        match command {
            ClockCommand::Play => self.playing = true,
            ClockCommand::Pause => self.playing = false,
            ClockCommand::SetPosition(seconds) => self.position = seconds.clamp(0.0, self.duration),
            ClockCommand::SetVolume(fraction) => self.volume = fraction,
            ClockCommand::SetRate(rate) => self.rate = rate,
        }
    }
}

#[instrument(skip(duration_source, notifications), fields(generation = %generation))]
fn spawn_clock_task(
    url: String,
    generation: SourceGeneration,
    duration_source: Arc<dyn DurationSource>,
    cadence: StdDuration,
    notifications: mpsc::Sender<TaggedNotification>,
) -> ClockTask {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel::<ClockCommand>();
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    info!(target: LOG_TARGET, "Spawning media clock for {}", url);
    let task_handle = tokio::spawn(async move {
        let emit = |notification: MediaNotification| {
            let notifications = notifications.clone();
            async move {
                notifications
                    .send(TaggedNotification::new(generation, notification))
                    .await
                    .is_ok()
            }
        };

        // --- Metadata ---
        let resolved = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                debug!(target: LOG_TARGET, %generation, "Shutdown while resolving duration.");
                return;
            }
            resolved = duration_source.resolve(&url) => resolved,
        };
        let duration = match resolved {
            Ok(duration) if duration.is_finite() && duration >= 0.0 => duration,
            Ok(duration) => {
                warn!(target: LOG_TARGET, %generation, "Duration source returned unusable length {}.", duration);
                emit(MediaNotification::LoadError(format!("unusable media length {}", duration))).await;
                return;
            }
            Err(e) => {
                warn!(target: LOG_TARGET, %generation, "Failed to resolve duration: {}", e);
                emit(MediaNotification::LoadError(e.to_string())).await;
                return;
            }
        };
        if !emit(MediaNotification::DurationResolved(duration)).await {
            return;
        }

        // --- Clock loop ---
        let mut state = ClockState {
            playing: false,
            position: 0.0,
            duration,
            rate: 1.0,
            volume: 1.0,
        };
        let mut ticker = interval(cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    debug!(target: LOG_TARGET, %generation, "Clock task received shutdown.");
                    break;
                }

                Some(command) = command_rx.recv() => {
                    trace!(target: LOG_TARGET, %generation, "Clock command: {:?}", command);
                    let was_playing = state.playing;
                    let repositioned = matches!(command, ClockCommand::SetPosition(_));
                    state.apply(command);
                    // Time played before a seek belongs to the old position
                    if repositioned || (state.playing && !was_playing) {
                        last_tick = Instant::now();
                    }
                }

                now = ticker.tick() => {
                    let elapsed = now.saturating_duration_since(last_tick).as_secs_f64();
                    last_tick = now;
                    if !state.playing {
                        continue;
                    }
                    state.position = (state.position + elapsed * state.rate).min(state.duration);
                    if !emit(MediaNotification::TimeAdvanced(state.position)).await {
                        break;
                    }
                    if state.position >= state.duration {
                        state.playing = false;
                        info!(target: LOG_TARGET, %generation, "Media clock reached the end.");
                        emit(MediaNotification::Ended).await;
                    }
                }

                else => break,
            }
        }
        trace!(target: LOG_TARGET, %generation, volume = state.volume, "Clock task finished.");
    });

    ClockTask {
        command_tx,
        shutdown_tx,
        task_handle,
        generation,
    }
}
