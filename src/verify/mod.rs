//! Screenshot verification — decide whether an OCR'd screenshot proves a
//! live subscribe/follow state.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! ```text
//! gallery view? -> identity -> negative state -> positive state -> timestamp
//! ```
//!
//! The timestamp stage extracts candidates, repairs each one, and accepts
//! the first reading inside the time window.
//!
//! A `Verifier` holds only compiled configuration. It has no per-call state
//! and can be shared across threads.

pub mod candidates;
pub mod confusion;
mod platform;
pub mod position;
pub mod repair;
pub mod types;
pub mod window;

pub use candidates::CandidateExtractor;
pub use repair::repair;
pub use types::{CandidateSource, Platform, RejectReason, TimestampCandidate, ValidationOutcome};
pub use window::{reference_instants, TimeWindow};

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::{ConfigError, VerifyConfig};
use crate::ocr::OcrResult;
use platform::{compile_pattern, PlatformCheck};

pub struct Verifier {
    config: VerifyConfig,
    gallery: Regex,
    extractor: CandidateExtractor,
    window: TimeWindow,
    subscription: PlatformCheck,
    follow: PlatformCheck,
}

impl Verifier {
    /// Validate `config` and compile every pattern in it.
    pub fn new(config: VerifyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let extractor = CandidateExtractor::new(config.scoring.clone()).map_err(|source| {
            ConfigError::Pattern {
                name: "fuzzyTimestamp".to_string(),
                source,
            }
        })?;
        Ok(Self {
            gallery: compile_pattern("galleryPattern", &config.gallery_pattern)?,
            extractor,
            window: TimeWindow::new(
                config.tolerance_minutes,
                config.day_offsets.clone(),
                config.meridiem_shift_hours,
            ),
            subscription: PlatformCheck::compile(Platform::Subscription, &config.subscription)?,
            follow: PlatformCheck::compile(Platform::Follow, &config.follow)?,
            config,
        })
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Reference wall-clock instants for `now` in every configured timezone.
    pub fn reference_instants(&self, now: DateTime<Utc>) -> Vec<NaiveDateTime> {
        reference_instants(now, &self.config.timezone_offsets_minutes)
    }

    /// Validate against the configured timezones at `now`.
    pub fn validate_at(&self, platform: Platform, ocr: &OcrResult, now: DateTime<Utc>) -> ValidationOutcome {
        self.validate(platform, ocr, &self.reference_instants(now))
    }

    /// Validate one screenshot against explicit reference instants.
    pub fn validate(
        &self,
        platform: Platform,
        ocr: &OcrResult,
        references: &[NaiveDateTime],
    ) -> ValidationOutcome {
        let outcome = ValidationOutcome::from(self.run_checks(platform, ocr, references));
        match (&outcome.reason, &outcome.matched_timestamp) {
            (Some(reason), _) => {
                log::info!("[VERIFY] {} screenshot rejected: {}", platform, reason.code())
            }
            (None, Some(matched)) => {
                log::info!("[VERIFY] {} screenshot accepted at {}", platform, matched)
            }
            (None, None) => {}
        }
        outcome
    }

    fn run_checks(
        &self,
        platform: Platform,
        ocr: &OcrResult,
        references: &[NaiveDateTime],
    ) -> Result<String, RejectReason> {
        let check = match platform {
            Platform::Subscription => &self.subscription,
            Platform::Follow => &self.follow,
        };
        let text = &ocr.full_text;

        self.reject_gallery(text)?;
        check.confirm_identity(text)?;
        check.reject_negative_state(ocr)?;
        check.confirm_positive_state(text)?;
        log::debug!("[VERIFY] {} text checks passed, checking timestamp", platform);
        self.validate_timestamp(ocr, references)
    }

    fn reject_gallery(&self, text: &str) -> Result<(), RejectReason> {
        if let Some(m) = self.gallery.find(text) {
            log::debug!("[VERIFY] Gallery marker {:?} found", m.as_str());
            return Err(RejectReason::GalleryScreenshotRejected);
        }
        Ok(())
    }

    /// Try every repaired reading of every candidate, best candidate first.
    fn validate_timestamp(&self, ocr: &OcrResult, references: &[NaiveDateTime]) -> Result<String, RejectReason> {
        let candidates = self.extractor.extract(ocr);
        if candidates.is_empty() {
            return Err(RejectReason::NoTimestampDetected);
        }

        for candidate in &candidates {
            for reading in repair(&candidate.raw) {
                if self.window.is_within_window(&reading, references) {
                    log::debug!("[VERIFY] {} matched as {}", candidate, reading);
                    return Ok(reading);
                }
            }
        }

        Err(RejectReason::TimestampOutOfWindow {
            candidates,
            tolerance_minutes: self.window.tolerance_minutes(),
        })
    }

    /// Timestamp candidates for `ocr`, highest priority first.
    pub fn extract_candidates(&self, ocr: &OcrResult) -> Vec<TimestampCandidate> {
        self.extractor.extract(ocr)
    }

    /// Whether a clock reading falls inside the configured window.
    pub fn is_within_window(&self, reading: &str, references: &[NaiveDateTime]) -> bool {
        self.window.is_within_window(reading, references)
    }
}
