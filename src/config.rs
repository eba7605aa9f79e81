use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::SoundAsset;
use crate::error::ConfigError;

/// Current settings schema version
pub const CONFIG_VERSION: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundFxConfig {
    /// Master switch for sound effects
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sound catalog, in priority order
    #[serde(default)]
    pub sounds: Vec<SoundAsset>,
}

impl Default for SoundFxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sounds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Settings schema version
    pub version: u32,

    /// Sound effect settings and catalog
    #[serde(default)]
    pub sound_fx: SoundFxConfig,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sound_fx: SoundFxConfig::default(),
        }
    }
}

/// Key-value store holding the settings object.
///
/// Callers read a fresh snapshot for every decision so that edits made
/// while the engine runs take effect immediately.
pub trait ConfigStore: Send + Sync {
    fn get_value(&self) -> Result<Config, ConfigError>;
    fn set_value(&self, config: &Config) -> Result<(), ConfigError>;
}

/// Settings persisted as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Get the config file path in the user config folder
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("DartsSoundFx").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    /// Creates a default config if the file doesn't exist
    fn get_value(&self) -> Result<Config, ConfigError> {
        let display = self.path.display().to_string();

        if !self.path.exists() {
            let config = Config::default();
            self.set_value(&config)?;
            tracing::info!("✓ Created default config at: {}", self.path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::LoadFailed {
            path: display.clone(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: display, source })?;

        if config.version != CONFIG_VERSION {
            tracing::warn!(
                "Config version {} differs from expected {}",
                config.version,
                CONFIG_VERSION
            );
        }
        Ok(config)
    }

    fn set_value(&self, config: &Config) -> Result<(), ConfigError> {
        let display = self.path.display().to_string();

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::SaveFailed {
                path: display.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        fs::write(&self.path, json).map_err(|source| ConfigError::SaveFailed {
            path: display,
            source,
        })
    }
}

/// Settings kept in memory
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: RwLock<Config>,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// Store holding just a catalog
    pub fn with_sounds(sounds: Vec<SoundAsset>) -> Self {
        Self::new(Config {
            sound_fx: SoundFxConfig {
                enabled: true,
                sounds,
            },
            ..Config::default()
        })
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_value(&self) -> Result<Config, ConfigError> {
        Ok(self.inner.read().clone())
    }

    fn set_value(&self, config: &Config) -> Result<(), ConfigError> {
        *self.inner.write() = config.clone();
        Ok(())
    }
}
