/// Blob materializer
///
/// Turns embedded base64 payloads into transient in-memory resources that a
/// backend can play by `blob:` URL, and keeps track of which ones still need
/// to be released.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::DecodeError;

const LOG_TARGET: &str = "darts_sound_fx::blob";

/// Content type used when the payload does not declare one
pub const DEFAULT_MIME: &str = "audio/mpeg";

/// Accepts payloads with or without padding
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Raw bytes of a decoded payload with their content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode an embedded payload, optionally wrapped in a `data:` URL
pub fn decode_payload(payload: &str) -> Result<DecodedPayload, DecodeError> {
    let (mime, body) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or(DecodeError::InvalidDataUrl)?;
            let mime = header
                .split_once(';')
                .map(|(mime, _)| mime)
                .filter(|mime| !mime.is_empty())
                .unwrap_or(DEFAULT_MIME);
            (mime, body)
        }
        None => (DEFAULT_MIME, payload),
    };

    let mut cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    while cleaned.ends_with('=') {
        cleaned.pop();
    }
    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }
    while cleaned.len() % 4 != 0 {
        cleaned.push('=');
    }

    let bytes = LENIENT.decode(cleaned.as_bytes()).map_err(|e| {
        let sample: String = cleaned.chars().take(50).collect();
        tracing::error!(target: LOG_TARGET, "Base64 decoding failed for \"{}...\": {}", sample, e);
        DecodeError::from(e)
    })?;

    Ok(DecodedPayload {
        mime: mime.to_string(),
        bytes,
    })
}

/// Handle to a materialized payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A materialized payload
#[derive(Debug)]
pub struct Blob {
    pub mime: String,
    pub bytes: Arc<Vec<u8>>,
}

/// Live blobs plus the release-pending list, oldest first
pub struct BlobRegistry {
    next_id: u64,
    blobs: HashMap<BlobUrl, Arc<Blob>>,
    pending: Vec<BlobUrl>,
    high_water: usize,
    keep: usize,
}

impl BlobRegistry {
    /// Sweep trims once more than `high_water` blobs are pending, keeping `keep`
    pub fn new(high_water: usize, keep: usize) -> Self {
        Self {
            next_id: 0,
            blobs: HashMap::new(),
            pending: Vec::new(),
            high_water,
            keep: keep.min(high_water),
        }
    }

    /// Decode a payload and register the result for deferred release
    pub fn materialize(&mut self, payload: &str) -> Result<(BlobUrl, Arc<Blob>), DecodeError> {
        let decoded = decode_payload(payload)?;

        self.next_id += 1;
        let url = BlobUrl(format!("blob:darts-sound-fx/{}", self.next_id));
        let blob = Arc::new(Blob {
            mime: decoded.mime,
            bytes: Arc::new(decoded.bytes),
        });

        tracing::debug!(
            target: LOG_TARGET,
            "Materialized {} ({}, {} bytes)",
            url,
            blob.mime,
            blob.bytes.len()
        );

        self.blobs.insert(url.clone(), Arc::clone(&blob));
        self.pending.push(url.clone());
        Ok((url, blob))
    }

    /// Look up a live blob
    pub fn get(&self, url: &BlobUrl) -> Option<Arc<Blob>> {
        self.blobs.get(url).cloned()
    }

    /// Release one blob right away
    pub fn revoke(&mut self, url: &BlobUrl) -> bool {
        self.pending.retain(|pending| pending != url);
        self.blobs.remove(url).is_some()
    }

    /// Release all but the most recent blobs once over the high-water mark.
    /// Returns how many were released.
    pub fn sweep(&mut self) -> usize {
        if self.pending.len() <= self.high_water {
            return 0;
        }

        tracing::info!(target: LOG_TARGET, "Cleaning up blob URLs: {}", self.pending.len());
        let split = self.pending.len() - self.keep;
        let released: Vec<BlobUrl> = self.pending.drain(..split).collect();
        for url in &released {
            self.blobs.remove(url);
        }
        released.len()
    }

    /// Release everything
    pub fn revoke_all(&mut self) -> usize {
        let count = self.blobs.len();
        self.pending.clear();
        self.blobs.clear();
        count
    }

    /// Blobs waiting for release, oldest first
    pub fn pending(&self) -> &[BlobUrl] {
        &self.pending
    }

    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}
