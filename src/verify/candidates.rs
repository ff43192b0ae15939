//! Timestamp candidate extraction.
//!
//! Three sources, most to least trusted:
//! 1. single word detections, scored by screen position and OCR confidence
//! 2. two or three adjacent fragments glued together (`"1" ":" "37"`),
//!    or one fragment that is clock-shaped only once bullets and Unicode
//!    spaces are cleaned (`"9•41"`)
//! 3. a regex scan of the full text, which has no geometry at all

use regex::Regex;

use super::position::position_score;
use super::types::{CandidateSource, TimestampCandidate};
use crate::config::ScoringPolicy;
use crate::ocr::heuristics::reading_order;
use crate::ocr::{OcrDetection, OcrResult};

/// Clock-shaped text, tolerating the letters OCR puts in place of digits.
/// Word boundaries are ASCII-only, so `é14:37` still yields `14:37`.
pub const FUZZY_TIMESTAMP: &str = r"(?-u:\b)[0-9IOSl]{1,2}[:;. ][0-9IOloS]{2}(?-u:\b)";

const BULLETS: [char; 4] = ['•', '·', '‧', '∙'];

/// A word detection's text as read and after separator cleaning.
struct Fragment<'a> {
    raw: &'a str,
    cleaned: String,
}

pub struct CandidateExtractor {
    fuzzy: Regex,
    policy: ScoringPolicy,
}

impl CandidateExtractor {
    pub fn new(policy: ScoringPolicy) -> Result<Self, regex::Error> {
        Ok(Self {
            fuzzy: Regex::new(FUZZY_TIMESTAMP)?,
            policy,
        })
    }

    /// All timestamp candidates in `result`, highest priority first.
    /// Equal priorities keep scan order.
    pub fn extract(&self, result: &OcrResult) -> Vec<TimestampCandidate> {
        let mut candidates = Vec::new();
        let words = result.word_detections();
        if !words.is_empty() {
            self.scan_detections(words, result.image_height(), &mut candidates);
            self.merge_fragments(words, &mut candidates);
        }
        self.scan_full_text(&result.full_text, &mut candidates);

        candidates.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        log::debug!("[CANDIDATES] {} candidate(s): {:?}", candidates.len(), candidates);
        candidates
    }

    fn scan_detections(&self, words: &[OcrDetection], image_height: f32, out: &mut Vec<TimestampCandidate>) {
        for detection in words {
            let Some(m) = self.fuzzy.find(&detection.text) else {
                continue;
            };
            let mut priority = position_score(detection, image_height, &self.policy);
            if let Some(confidence) = detection.confidence.filter(|c| c.is_finite()) {
                priority += confidence * self.policy.confidence_weight;
            }
            out.push(TimestampCandidate {
                raw: m.as_str().to_string(),
                priority,
                source: CandidateSource::Detection,
            });
        }
    }

    fn merge_fragments(&self, words: &[OcrDetection], out: &mut Vec<TimestampCandidate>) {
        let fragments: Vec<Fragment<'_>> = reading_order(words, self.policy.line_tolerance_px)
            .into_iter()
            .map(|d| Fragment {
                raw: &d.text,
                cleaned: clean_fragment(&d.text),
            })
            .collect();

        for start in 0..fragments.len() {
            for width in [3, 2, 1] {
                let Some(window) = fragments.get(start..start + width) else {
                    continue;
                };
                let Some(raw) = self.merged_match(window) else {
                    continue;
                };
                let seen = out
                    .iter()
                    .any(|c| c.source == CandidateSource::Merged && c.raw == raw);
                if !seen {
                    out.push(TimestampCandidate {
                        raw,
                        priority: self.policy.merged_priority,
                        source: CandidateSource::Merged,
                    });
                }
            }
        }
    }

    /// First match in the cleaned, concatenated window that the detection
    /// tier cannot have seen: either it spans a fragment boundary, or it
    /// sits in a fragment that only became clock-shaped after cleaning
    /// (`9•41`).
    fn merged_match(&self, window: &[Fragment<'_>]) -> Option<String> {
        let mut spans = Vec::with_capacity(window.len());
        let mut offset = 0;
        for fragment in window {
            spans.push((offset, offset + fragment.cleaned.len(), fragment.raw));
            offset += fragment.cleaned.len();
        }
        let joined: String = window.iter().map(|f| f.cleaned.as_str()).collect();

        self.fuzzy
            .find_iter(&joined)
            .find(|m| {
                match spans
                    .iter()
                    .find(|&&(start, end, _)| start <= m.start() && m.end() <= end)
                {
                    Some(&(_, _, raw)) => !self.fuzzy.is_match(raw),
                    None => true,
                }
            })
            .map(|m| m.as_str().to_string())
    }

    fn scan_full_text(&self, text: &str, out: &mut Vec<TimestampCandidate>) {
        let fallback = self.policy.fallback_priority;
        for m in self.fuzzy.find_iter(text) {
            let raw = m.as_str();
            let covered = out
                .iter()
                .any(|c| c.priority >= fallback && c.raw.contains(raw));
            if !covered {
                out.push(TimestampCandidate {
                    raw: raw.to_string(),
                    priority: fallback,
                    source: CandidateSource::FullText,
                });
            }
        }
    }
}

/// Bullets become `:`, the Unicode space family becomes a plain space.
fn clean_fragment(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if BULLETS.contains(&c) => ':',
            '\u{2000}'..='\u{200B}' | '\u{202F}' | '\u{00A0}' => ' ',
            c => c,
        })
        .collect()
}
