//! Sound effects for a dart-scoring companion.
//!
//! Game-state snapshots are classified into trigger names, triggers are
//! resolved against the configured sound catalog, and the resulting
//! requests are played one at a time through a small pool of reusable
//! audio handles.

pub mod blob;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod interaction;
pub mod notify;
pub mod playback;
pub mod service;
pub mod trigger;
pub mod utils;

pub use catalog::{PlaybackRequest, SoundAsset, SoundCatalog, SourceKind};
pub use config::{Config, ConfigStore, JsonConfigStore, MemoryConfigStore, SoundFxConfig};
pub use engine::{SoundFx, SoundFxOptions};
pub use error::{ConfigError, DecodeError, PlaybackError, ServiceError};
pub use game::{classify, GameData, GameDataStore, GameStateStore};
pub use interaction::InteractionKind;
pub use notify::{InteractionNotifier, LogNotifier};
pub use playback::{AudioBackend, AudioHandle, RodioBackend};
pub use service::{ServiceStatus, SoundFxService};
pub use trigger::{resolve, Resolution};
