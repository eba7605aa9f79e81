/// Playback module
///
/// Everything between a resolved sound and the audio device.
///
/// ## Architecture
///
/// ```text
/// PlaybackQueue (FIFO, one in flight)
///   └── AudioPool (3 handles, round-robin)
///       ├── AudioHandle #0 ─┐
///       ├── AudioHandle #1 ─┤ rebound on every request
///       └── AudioHandle #2 ─┘
///
/// AudioBackend
///   ├── create_handle()   pool slots
///   └── unlock()          silent clip after a user gesture
/// ```
///
/// Handles report completion asynchronously through a [`CompletionSender`];
/// every bind gets a fresh [`PlaybackToken`] so late events from a handle
/// that has since been rebound are recognized and dropped.
pub mod gesture;
pub mod pool;
pub mod queue;
pub mod rodio_backend;

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::blob::{Blob, BlobUrl};
use crate::error::PlaybackError;

pub use gesture::{GesturePolicy, Platform};
pub use pool::AudioPool;
pub use queue::{InFlight, PlaybackQueue};
pub use rodio_backend::{RodioBackend, RodioHandle};

/// Short silent MP3 played to unlock audio output after a user gesture
pub const SILENT_CLIP: &str = "data:audio/mpeg;base64,SUQzBAAAAAABEVRYWFgAAAAtAAADY29tbWVudABCaWdTb3VuZEJhbmsuY29tIC8gTGFTb25vdGhlcXVlLm9yZwBURU5DAAAAHQAAA1N3aXRjaCBQbHVzIMKpIE5DSCBTb2Z0d2FyZQBUSVQyAAAABgAAAzIyMzUAVFNTRQAAAA8AAANMYXZmNTcuODMuMTAwAAAAAAAAAAAAAAD/80DEAAAAA0gAAAAATEFNRTMuMTAwVVVVVVVVVVVVVUxBTUUzLjEwMFVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVf/zQsRbAAADSAAAAABVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVf/zQMSkAAADSAAAAABVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVVV";

/// Identifies one bind of one pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackToken {
    pub slot: usize,
    pub generation: u64,
}

/// Asynchronous outcome of a started playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback ran to the end
    Ended(PlaybackToken),
    /// Playback started but failed midway
    Failed { token: PlaybackToken, reason: String },
}

impl PlaybackEvent {
    pub fn token(&self) -> PlaybackToken {
        match self {
            PlaybackEvent::Ended(token) => *token,
            PlaybackEvent::Failed { token, .. } => *token,
        }
    }
}

/// Channel handles use to report completion
#[derive(Debug, Clone)]
pub struct CompletionSender {
    tx: Sender<PlaybackEvent>,
}

impl CompletionSender {
    pub fn new(tx: Sender<PlaybackEvent>) -> Self {
        Self { tx }
    }

    pub fn ended(&self, token: PlaybackToken) {
        // Receiver gone means the engine is torn down
        let _ = self.tx.send(PlaybackEvent::Ended(token));
    }

    pub fn failed(&self, token: PlaybackToken, reason: impl Into<String>) {
        let _ = self.tx.send(PlaybackEvent::Failed {
            token,
            reason: reason.into(),
        });
    }
}

/// What a handle is asked to play
#[derive(Debug, Clone)]
pub enum BoundSource {
    /// Remote or local location
    Url(String),
    /// Materialized embedded payload
    Blob { url: BlobUrl, blob: Arc<Blob> },
}

impl BoundSource {
    pub fn location(&self) -> &str {
        match self {
            BoundSource::Url(url) => url,
            BoundSource::Blob { url, .. } => url.as_str(),
        }
    }
}

/// One reusable playback handle
pub trait AudioHandle {
    /// Force-stop whatever the handle is playing
    fn pause(&mut self);

    /// Bind a new source and start playing it.
    ///
    /// `Ok` means playback started; the end (or a later failure) is reported
    /// through `completion` tagged with `token`.
    fn start(
        &mut self,
        source: &BoundSource,
        token: PlaybackToken,
        completion: CompletionSender,
    ) -> Result<(), PlaybackError>;

    /// Drop the bound source
    fn release(&mut self) {
        self.pause();
    }
}

/// Audio output platform
pub trait AudioBackend {
    type Handle: AudioHandle;

    /// Create one pool handle
    fn create_handle(&mut self) -> Result<Self::Handle, PlaybackError>;

    /// Play the silent clip; success means audio output is unlocked
    fn unlock(&mut self) -> Result<(), PlaybackError>;
}
