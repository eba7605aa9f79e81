/// Gesture-gated playback detection
///
/// Browsers refuse to start audio until the user has interacted with the
/// page, and each one words the rejection differently. The known wordings
/// live here as versioned data so backends only pass the raw reason along.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bump when the built-in rejection table changes
pub const GESTURE_POLICY_VERSION: u32 = 1;

/// Platform a rejection wording belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Chromium,
    Firefox,
    Safari,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Chromium => write!(f, "Chromium"),
            Platform::Firefox => write!(f, "Firefox"),
            Platform::Safari => write!(f, "Safari"),
        }
    }
}

/// Built-in rejection wordings
const BUILTIN_REJECTIONS: [(Platform, &str); 3] = [
    (
        Platform::Chromium,
        "failed because the user didn't interact with the document first",
    ),
    (
        Platform::Firefox,
        "The play method is not allowed by the user agent",
    ),
    (
        Platform::Safari,
        "The request is not allowed by the user agent",
    ),
];

/// One recognized rejection wording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureRejection {
    pub platform: Platform,
    /// Substring of the rejection reason
    pub reason: String,
}

/// Versioned table of rejection reasons that mean "needs a user gesture"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GesturePolicy {
    pub version: u32,
    pub rejections: Vec<GestureRejection>,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self {
            version: GESTURE_POLICY_VERSION,
            rejections: BUILTIN_REJECTIONS
                .iter()
                .map(|(platform, reason)| GestureRejection {
                    platform: *platform,
                    reason: reason.to_string(),
                })
                .collect(),
        }
    }
}

impl GesturePolicy {
    /// Platform whose gesture rejection matches `reason`, if any
    pub fn gesture_rejection(&self, reason: &str) -> Option<Platform> {
        self.rejections
            .iter()
            .find(|rejection| reason.contains(&rejection.reason))
            .map(|rejection| rejection.platform)
    }

    pub fn is_gesture_rejection(&self, reason: &str) -> bool {
        self.gesture_rejection(reason).is_some()
    }
}
