/// Native audio backend built on rodio
///
/// Each pool handle owns at most one `Sink`. Starting a new source stops the
/// old sink and creates a fresh one (rodio sinks cannot be emptied and
/// reused cleanly). A watcher thread per playback waits for the sink to run
/// dry and reports the end through the completion channel.
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::{AudioBackend, AudioHandle, BoundSource, CompletionSender, PlaybackToken, SILENT_CLIP};
use crate::blob::decode_payload;
use crate::error::PlaybackError;

const LOG_TARGET: &str = "darts_sound_fx::rodio";

/// Remote sounds larger than this are refused
const MAX_REMOTE_BYTES: u64 = 16 * 1024 * 1024;

/// Volume used for the unlock clip
const UNLOCK_VOLUME: f32 = 0.01;

/// Default output device plus an HTTP agent for remote sounds
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    http: ureq::Agent,
    primer: Option<Sink>,
    volume: f32,
}

impl RodioBackend {
    /// Open the default output device
    pub fn try_default() -> Result<Self, PlaybackError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::Device(Box::new(e)))?;

        let http = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .build();

        tracing::info!(target: LOG_TARGET, "✓ Audio output stream opened");

        Ok(Self {
            _stream: stream,
            stream_handle,
            http,
            primer: None,
            volume: 1.0,
        })
    }

    /// Set playback volume for handles created afterwards (0.0-1.0)
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

impl AudioBackend for RodioBackend {
    type Handle = RodioHandle;

    fn create_handle(&mut self) -> Result<RodioHandle, PlaybackError> {
        Ok(RodioHandle {
            stream_handle: self.stream_handle.clone(),
            http: self.http.clone(),
            sink: None,
            volume: self.volume,
        })
    }

    fn unlock(&mut self) -> Result<(), PlaybackError> {
        let decoded = decode_payload(SILENT_CLIP)?;
        let decoder =
            Decoder::new(Cursor::new(decoded.bytes)).map_err(|e| PlaybackError::Format(Box::new(e)))?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| PlaybackError::Device(Box::new(e)))?;
        sink.set_volume(UNLOCK_VOLUME);
        sink.append(decoder);
        sink.play();

        // Keep the sink alive until the next unlock; dropping it stops playback
        self.primer = Some(sink);
        Ok(())
    }
}

/// One pool slot
pub struct RodioHandle {
    stream_handle: OutputStreamHandle,
    http: ureq::Agent,
    sink: Option<Arc<Sink>>,
    volume: f32,
}

impl RodioHandle {
    fn load(&self, source: &BoundSource) -> Result<Vec<u8>, PlaybackError> {
        match source {
            // Note: We must clone here as rodio's Decoder requires owned data with 'static lifetime
            BoundSource::Blob { blob, .. } => Ok((*blob.bytes).clone()),
            BoundSource::Url(url) => load_url(&self.http, url),
        }
    }
}

impl AudioHandle for RodioHandle {
    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.stop();
        }
    }

    fn start(
        &mut self,
        source: &BoundSource,
        token: PlaybackToken,
        completion: CompletionSender,
    ) -> Result<(), PlaybackError> {
        let bytes = self.load(source)?;
        let decoder =
            Decoder::new(Cursor::new(bytes)).map_err(|e| PlaybackError::Format(Box::new(e)))?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| PlaybackError::Device(Box::new(e)))?;
        sink.set_volume(self.volume);
        sink.append(decoder);
        sink.play();

        let sink = Arc::new(sink);
        let watched = Arc::clone(&sink);
        thread::Builder::new()
            .name(format!("sfx-slot-{}", token.slot))
            .spawn(move || {
                watched.sleep_until_end();
                completion.ended(token);
            })
            .map_err(|e| PlaybackError::Device(Box::new(e)))?;

        tracing::debug!(
            target: LOG_TARGET,
            "Slot {} playing {}",
            token.slot,
            source.location()
        );

        self.sink = Some(sink);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// Fetch a sound over HTTP(S) or read it from disk
fn load_url(http: &ureq::Agent, url: &str) -> Result<Vec<u8>, PlaybackError> {
    let source_error = |e: Box<dyn std::error::Error + Send + Sync>| PlaybackError::Source {
        location: url.to_string(),
        source: e,
    };

    if url.starts_with("http://") || url.starts_with("https://") {
        let response = http.get(url).call().map_err(|e| source_error(Box::new(e)))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_REMOTE_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| source_error(Box::new(e)))?;

        tracing::debug!(target: LOG_TARGET, "Fetched {} ({} bytes)", url, bytes.len());
        return Ok(bytes);
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    std::fs::read(path).map_err(|e| source_error(Box::new(e)))
}
