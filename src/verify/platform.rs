//! Per-platform text checks: identity, negative state, positive state.
//!
//! Built once from `PlatformRules`; every check is a pure function of the
//! OCR result and returns the rejection it found, if any.

use regex::{Regex, RegexBuilder};

use super::types::{Platform, RejectReason};
use crate::config::{ButtonGate, ConfigError, PlatformRules};
use crate::ocr::heuristics::{relative_y, text_lines};
use crate::ocr::OcrResult;

/// Compile a configured pattern, naming it in the error.
pub(crate) fn compile_pattern(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::Pattern {
            name: name.to_string(),
            source,
        })
}

pub(crate) struct PlatformCheck {
    platform: Platform,
    display_name: String,
    identity: Regex,
    positive: Regex,
    negative: Option<Regex>,
    action_button: Regex,
    button_gate: ButtonGate,
}

impl PlatformCheck {
    pub(crate) fn compile(platform: Platform, rules: &PlatformRules) -> Result<Self, ConfigError> {
        let field = |name: &str| format!("{}.{}", platform, name);
        Ok(Self {
            platform,
            display_name: rules.display_name.clone(),
            identity: compile_pattern(&field("identity"), &rules.identity)?,
            positive: compile_pattern(&field("positive"), &rules.positive)?,
            negative: rules
                .negative
                .as_deref()
                .map(|p| compile_pattern(&field("negative"), p))
                .transpose()?,
            action_button: compile_pattern(&field("actionButton"), &rules.action_button)?,
            button_gate: rules.button_gate.clone(),
        })
    }

    pub(crate) fn confirm_identity(&self, text: &str) -> Result<(), RejectReason> {
        if self.identity.is_match(text) {
            Ok(())
        } else {
            Err(RejectReason::IdentityNotFound {
                target: self.display_name.clone(),
            })
        }
    }

    pub(crate) fn reject_negative_state(&self, ocr: &OcrResult) -> Result<(), RejectReason> {
        if let Some(m) = self.negative.as_ref().and_then(|n| n.find(&ocr.full_text)) {
            return Err(self.negative_state(m.as_str()));
        }

        let button = match self.button_gate {
            ButtonGate::Header { max_fraction } => self.button_in_header(ocr, max_fraction),
            ButtonGate::ShortLine { max_len } => self.button_on_short_line(&ocr.full_text, max_len),
        };
        match button {
            Some(marker) => Err(self.negative_state(&marker)),
            None => Ok(()),
        }
    }

    pub(crate) fn confirm_positive_state(&self, text: &str) -> Result<(), RejectReason> {
        if self.positive.is_match(text) {
            Ok(())
        } else {
            Err(RejectReason::PositiveStateNotConfirmed {
                expected: self.platform.expected_state().to_string(),
            })
        }
    }

    /// Button word in a detection whose top edge is above `max_fraction` of
    /// the image. Without usable geometry, any whole-word match in the full
    /// text counts.
    fn button_in_header(&self, ocr: &OcrResult, max_fraction: f32) -> Option<String> {
        let image_height = ocr.image_height();
        let words = ocr.word_detections();
        let has_geometry = relative_y(0.0, image_height).is_some();
        if words.is_empty() || !has_geometry {
            return self.button_in_text(&ocr.full_text);
        }

        words
            .iter()
            .filter(|d| self.action_button.is_match(&d.text))
            .find(|d| {
                relative_y(d.bounding_box.min_y(), image_height)
                    .map_or(false, |fraction| fraction < max_fraction)
            })
            .map(|d| d.text.trim().to_string())
    }

    fn button_in_text(&self, text: &str) -> Option<String> {
        self.action_button
            .find(text)
            .map(|m| m.as_str().trim().to_string())
    }

    /// Button word on a line shorter than `max_len` characters.
    fn button_on_short_line(&self, text: &str, max_len: usize) -> Option<String> {
        text_lines(text)
            .find(|line| line.chars().count() < max_len && self.action_button.is_match(line))
            .map(str::to_string)
    }

    fn negative_state(&self, marker: &str) -> RejectReason {
        RejectReason::NegativeStateDetected {
            marker: marker.to_string(),
            expected: self.platform.expected_state().to_string(),
        }
    }
}
