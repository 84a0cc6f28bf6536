//! Duration resolution for media resources ("metadata ready").

use async_trait::async_trait;
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration as StdDuration;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::task;
use tracing::{debug, instrument};
use url::Url;

use crate::playback::error::PlaybackError;

const LOG_TARGET: &str = "summarist_player::playback::probe";

/// Resolves the total length of a media resource.
#[async_trait]
pub trait DurationSource: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<f64, PlaybackError>;
}

/// A source whose length is already known.
#[derive(Debug, Clone, Copy)]
pub struct FixedDuration(pub f64);

#[async_trait]
impl DurationSource for FixedDuration {
    async fn resolve(&self, _url: &str) -> Result<f64, PlaybackError> {
        Ok(self.0)
    }
}

/// Downloads the resource and reads its length from the container headers.
pub struct HttpDurationProbe {
    client: Client,
}

impl HttpDurationProbe {
    pub fn new(timeout: StdDuration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            tracing::warn!(target: LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
            Client::new()
        });
        Self { client }
    }
}

#[async_trait]
impl DurationSource for HttpDurationProbe {
    #[instrument(skip(self))]
    async fn resolve(&self, url: &str) -> Result<f64, PlaybackError> {
        let parsed = Url::parse(url)?;
        let extension = parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        debug!(target: LOG_TARGET, "Fetching {} to probe its duration...", url);
        let response = self.client.get(parsed).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!(target: LOG_TARGET, "Fetched {} bytes, probing container.", bytes.len());

        task::spawn_blocking(move || probe_duration(bytes.to_vec(), extension.as_deref())).await?
    }
}

/// Reads the duration in seconds of an in-memory media file.
pub fn probe_duration(bytes: Vec<u8>, extension: Option<&str>) -> Result<f64, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), MediaSourceStreamOptions::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::SourceLoadFailure("no playable audio track found".to_string()))?;

    let params = &track.codec_params;
    let frames = params
        .n_frames
        .ok_or_else(|| PlaybackError::SourceLoadFailure("media does not declare its length".to_string()))?;

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Ok(time.seconds as f64 + time.frac);
    }
    match params.sample_rate {
        Some(rate) if rate > 0 => Ok(frames as f64 / rate as f64),
        _ => Err(PlaybackError::SourceLoadFailure("missing sample rate".to_string())),
    }
}
