//! Audio playback core: session state, the transport controller and the media primitive it drives.

pub mod clock;
pub mod controller;
pub mod error;
pub mod media;
pub mod probe;
pub mod progress;
pub mod session;

pub use clock::{ClockedMedia, ClockedMediaFactory};
pub use controller::{PlaybackController, PlaybackDefaults};
pub use error::PlaybackError;
pub use media::{MediaBackend, MediaFactory, MediaNotification, SourceGeneration, TaggedNotification};
pub use probe::{DurationSource, FixedDuration, HttpDurationProbe};
pub use progress::{format_time, progress_percentage, TransportDisplay, TIME_PLACEHOLDER};
pub use session::{PlaybackRate, PlaybackSession, PlaybackStatus, ALLOWED_PLAYBACK_RATES};
