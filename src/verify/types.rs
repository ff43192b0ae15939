//! Verification request/response types.
//!
//! `ValidationOutcome` is what the bot reads back: pass with the clock
//! reading that matched, or fail with a `RejectReason` whose `Display`
//! is the sentence shown to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which kind of proof the screenshot must show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Channel page with a "Subscribed" state (YouTube-style).
    #[serde(alias = "youtube")]
    Subscription,
    /// Profile page with a "Following" state (Instagram-style).
    #[serde(alias = "instagram")]
    Follow,
}

impl Platform {
    /// The state the user must be in, as worded in reasons.
    pub fn expected_state(self) -> &'static str {
        match self {
            Platform::Subscription => "subscribed",
            Platform::Follow => "following",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Subscription => f.write_str("subscription"),
            Platform::Follow => f.write_str("follow"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform '{0}' (expected subscription or follow)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subscription" | "youtube" => Ok(Platform::Subscription),
            "follow" | "instagram" => Ok(Platform::Follow),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Where a timestamp candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateSource {
    /// A single word detection.
    Detection,
    /// Two or three adjacent fragments glued together.
    Merged,
    /// Regex scan of the full text.
    FullText,
}

/// A timestamp-shaped token and how much it is trusted.
///
/// Priority only orders the search; it is not a probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampCandidate {
    pub raw: String,
    pub priority: f32,
    pub source: CandidateSource,
}

impl fmt::Display for TimestampCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (P{:.1})", self.raw, self.priority)
    }
}

fn join_candidates(candidates: &[TimestampCandidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a screenshot was rejected.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum RejectReason {
    #[error("Do not upload gallery screenshot. Please upload the original screenshot.")]
    GalleryScreenshotRejected,

    #[error("\"{target}\" not found.")]
    IdentityNotFound { target: String },

    #[error("Found \"{marker}\". You must be {expected}.")]
    NegativeStateDetected { marker: String, expected: String },

    #[error("Could not confirm you are {expected}. Make sure the {expected} state is visible.")]
    PositiveStateNotConfirmed { expected: String },

    #[error("No timestamp detected. Please ensure the time is visible.")]
    NoTimestampDetected,

    #[error(
        "No valid timestamp found. Detected: [{}]. None are within ±{tolerance_minutes} minutes of current time.",
        join_candidates(.candidates)
    )]
    TimestampOutOfWindow {
        candidates: Vec<TimestampCandidate>,
        tolerance_minutes: i64,
    },
}

impl RejectReason {
    /// Stable machine-readable name of the reason.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::GalleryScreenshotRejected => "GalleryScreenshotRejected",
            RejectReason::IdentityNotFound { .. } => "IdentityNotFound",
            RejectReason::NegativeStateDetected { .. } => "NegativeStateDetected",
            RejectReason::PositiveStateNotConfirmed { .. } => "PositiveStateNotConfirmed",
            RejectReason::NoTimestampDetected => "NoTimestampDetected",
            RejectReason::TimestampOutOfWindow { .. } => "TimestampOutOfWindow",
        }
    }
}

/// Result of validating one screenshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_timestamp: Option<String>,
}

impl ValidationOutcome {
    pub fn pass(matched_timestamp: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: None,
            matched_timestamp: Some(matched_timestamp.into()),
        }
    }

    pub fn fail(reason: RejectReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            matched_timestamp: None,
        }
    }
}

impl From<Result<String, RejectReason>> for ValidationOutcome {
    fn from(result: Result<String, RejectReason>) -> Self {
        match result {
            Ok(matched) => ValidationOutcome::pass(matched),
            Err(reason) => ValidationOutcome::fail(reason),
        }
    }
}
