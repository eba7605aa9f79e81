use thiserror::Error;

/// Library errors using thiserror for structured error handling.
///
/// None of the playback-path errors are fatal: the engine logs them and
/// moves the queue forward. They exist so that backends and stores can say
/// precisely what went wrong.

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid data URL format: missing ',' separator")]
    InvalidDataUrl,

    #[error("Embedded payload is empty")]
    Empty,

    #[error("Base64 decoding failed")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The platform refused to start playback. The reason text is matched
    /// against the gesture policy to tell autoplay blocks from other failures.
    #[error("Playback rejected: {reason}")]
    Rejected { reason: String },

    #[error("Failed to load audio source {location}")]
    Source {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode embedded payload")]
    Decode(#[from] DecodeError),

    #[error("Failed to decode audio format")]
    Format(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio output device unavailable")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PlaybackError {
    /// Text used when classifying the rejection
    pub fn reason(&self) -> String {
        match self {
            PlaybackError::Rejected { reason } => reason.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize configuration")]
    Serialize(#[source] serde_json::Error),

    #[error("Could not determine the platform config directory")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Sound FX service already stopped")]
    AlreadyStopped,

    #[error("Failed to initialize audio backend")]
    BackendInit(#[source] PlaybackError),

    #[error("Failed to start sound FX thread")]
    ThreadSpawnFailed(#[source] std::io::Error),

    #[error("Sound FX thread exited unexpectedly")]
    WorkerExited,
}
