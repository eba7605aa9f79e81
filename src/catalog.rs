/// Sound catalog
///
/// Sound assets as they are stored in the configuration, plus the
/// playback request the resolver hands to the queue.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by all triggers the game-event classifier emits
pub const AMBIENT_PREFIX: &str = "ambient_";

/// A configured sound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundAsset {
    /// Display name
    pub name: String,

    /// Trigger names this sound responds to
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Disabled sounds never match
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Remote (or local) location of the audio file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Audio embedded directly in the configuration, optionally as a data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl SoundAsset {
    /// Create an enabled sound with a URL source
    pub fn with_url(name: impl Into<String>, triggers: &[&str], url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            enabled: true,
            url: Some(url.into()),
            base64: None,
        }
    }

    /// Create an enabled sound with an embedded payload
    pub fn with_payload(
        name: impl Into<String>,
        triggers: &[&str],
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            enabled: true,
            url: None,
            base64: Some(payload.into()),
        }
    }

    /// Whether this sound is enabled and lists the trigger
    pub fn responds_to(&self, trigger: &str) -> bool {
        self.enabled && self.triggers.iter().any(|t| t == trigger)
    }

    /// Whether the sound carries something playable
    pub fn is_playable(&self) -> bool {
        non_empty(&self.url).is_some() || non_empty(&self.base64).is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Ordered, read-only list of sounds
pub type SoundCatalog = [SoundAsset];

/// Which kind of source a request starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    EmbeddedPayload,
}

/// One queued sound, consumed exactly once by the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub source_kind: SourceKind,
    pub payload: String,
    pub display_name: String,
    /// Embedded payload to try once if a URL source fails to start
    pub embedded_fallback: Option<String>,
}

impl PlaybackRequest {
    /// Build a request from an asset; `None` when the asset has no source
    pub fn from_asset(asset: &SoundAsset) -> Option<Self> {
        let embedded = non_empty(&asset.base64).map(str::to_string);

        if let Some(url) = non_empty(&asset.url) {
            return Some(Self {
                source_kind: SourceKind::Url,
                payload: url.to_string(),
                display_name: asset.name.clone(),
                embedded_fallback: embedded,
            });
        }

        embedded.map(|payload| Self {
            source_kind: SourceKind::EmbeddedPayload,
            payload,
            display_name: asset.name.clone(),
            embedded_fallback: None,
        })
    }
}

impl fmt::Display for PlaybackRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_kind {
            SourceKind::Url => write!(f, "{} (url)", self.display_name),
            SourceKind::EmbeddedPayload => write!(f, "{} (embedded)", self.display_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responds_to_requires_enabled() {
        let mut asset = SoundAsset::with_url("bull", &["ambient_bull"], "https://x/bull.mp3");
        assert!(asset.responds_to("ambient_bull"));
        assert!(!asset.responds_to("bull"));

        asset.enabled = false;
        assert!(!asset.responds_to("ambient_bull"));
    }

    #[test]
    fn test_request_prefers_url_and_keeps_payload_fallback() {
        let mut asset = SoundAsset::with_url("both", &["x"], "https://x/a.mp3");
        asset.base64 = Some("AAAA".to_string());

        let request = PlaybackRequest::from_asset(&asset).unwrap();
        assert_eq!(request.source_kind, SourceKind::Url);
        assert_eq!(request.payload, "https://x/a.mp3");
        assert_eq!(request.embedded_fallback.as_deref(), Some("AAAA"));
    }

    #[test]
    fn test_request_from_payload_only() {
        let asset = SoundAsset::with_payload("blob", &["x"], "data:audio/wav;base64,AAAA");
        let request = PlaybackRequest::from_asset(&asset).unwrap();
        assert_eq!(request.source_kind, SourceKind::EmbeddedPayload);
        assert!(request.embedded_fallback.is_none());
        assert_eq!(request.to_string(), "blob (embedded)");
    }

    #[test]
    fn test_asset_without_source_is_invalid() {
        let asset = SoundAsset {
            name: "empty".to_string(),
            triggers: vec!["x".to_string()],
            enabled: true,
            url: Some(String::new()),
            base64: None,
        };
        assert!(!asset.is_playable());
        assert!(PlaybackRequest::from_asset(&asset).is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{ "name": "miss", "triggers": ["miss"], "url": "https://x/miss.mp3" }"#;
        let asset: SoundAsset = serde_json::from_str(json).unwrap();
        assert!(asset.enabled);
        assert!(asset.base64.is_none());
    }
}
