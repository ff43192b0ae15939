//! OCR domain — the text-detection result handed to the verifier.
//!
//! The OCR provider itself lives outside this crate. What it returns is
//! modelled here: the full recognized text plus positioned word detections.
//! JSON dumps in the Google Vision `textAnnotations` shape load directly.

pub mod heuristics;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load a recorded OCR result.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid OCR JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A corner of a bounding box, in image pixel space.
///
/// Vision omits zero coordinates, so both default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Bounding polygon of a detection (normally four corners, top-left first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub vertices: Vec<Point>,
}

impl BoundingBox {
    /// Axis-aligned box from a top-left corner and a size.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            vertices: vec![
                Point { x, y },
                Point { x: x + width, y },
                Point { x: x + width, y: y + height },
                Point { x, y: y + height },
            ],
        }
    }

    pub fn min_y(&self) -> f32 {
        self.vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min).min(self.max_y())
    }

    pub fn max_y(&self) -> f32 {
        self.vertices.iter().map(|v| v.y).fold(0.0, f32::max)
    }

    pub fn min_x(&self) -> f32 {
        let min = self.vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
        if min.is_finite() { min } else { 0.0 }
    }

    /// Vertical midpoint between the highest and lowest corner.
    pub fn center_y(&self) -> f32 {
        (self.min_y() + self.max_y()) / 2.0
    }
}

/// One recognized token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrDetection {
    #[serde(alias = "description", default)]
    pub text: String,
    #[serde(alias = "boundingPoly", default)]
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl OcrDetection {
    pub fn new(text: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Output of one OCR pass over a screenshot.
///
/// `detections[0]` conventionally repeats the whole text with a box spanning
/// the image; real word detections begin at index 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OcrResultRepr")]
pub struct OcrResult {
    pub full_text: String,
    pub detections: Vec<OcrDetection>,
}

/// Wire shape: the bot stored both `text` and `fullText`, Vision only
/// gives the detections list.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrResultRepr {
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "textAnnotations")]
    detections: Vec<OcrDetection>,
}

impl From<OcrResultRepr> for OcrResult {
    fn from(repr: OcrResultRepr) -> Self {
        let full_text = repr
            .full_text
            .filter(|t| !t.is_empty())
            .or(repr.text.filter(|t| !t.is_empty()))
            .or_else(|| repr.detections.first().map(|d| d.text.clone()))
            .unwrap_or_default();
        Self {
            full_text,
            detections: repr.detections,
        }
    }
}

impl OcrResult {
    pub fn new(full_text: impl Into<String>, detections: Vec<OcrDetection>) -> Self {
        Self {
            full_text: full_text.into(),
            detections,
        }
    }

    /// Parse a recorded OCR result.
    pub fn from_json(raw: &str) -> Result<Self, OcrError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a recorded OCR result from disk.
    pub fn load(path: &Path) -> Result<Self, OcrError> {
        let raw = std::fs::read_to_string(path).map_err(|source| OcrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Word detections, skipping the full-text pseudo-detection at index 0.
    pub fn word_detections(&self) -> &[OcrDetection] {
        self.detections.get(1..).unwrap_or(&[])
    }

    /// Image height as far as OCR geometry can tell: the lowest corner of
    /// any detection. Zero when there is no geometry at all.
    pub fn image_height(&self) -> f32 {
        self.detections
            .iter()
            .map(|d| d.bounding_box.max_y())
            .fold(0.0, f32::max)
    }

    /// SHA-256 of the case- and whitespace-normalized full text.
    ///
    /// Two uploads of the same saved screenshot produce the same
    /// fingerprint, which lets the caller spot stale re-submissions.
    pub fn fingerprint(&self) -> String {
        let normalized = self
            .full_text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        let hash = Sha256::digest(normalized.as_bytes());
        format!("sha256:{:x}", hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_vision_text_annotations() {
        let raw = r#"{
            "textAnnotations": [
                {"description": "14:37\nSubscribed", "boundingPoly": {"vertices": [{}, {"x": 1080}, {"x": 1080, "y": 2400}, {"y": 2400}]}},
                {"description": "14:37", "boundingPoly": {"vertices": [{"x": 40, "y": 10}, {"x": 120, "y": 10}, {"x": 120, "y": 50}, {"x": 40, "y": 50}]}, "confidence": 0.93}
            ]
        }"#;
        let result = OcrResult::from_json(raw).unwrap();
        assert_eq!(result.full_text, "14:37\nSubscribed");
        assert_eq!(result.word_detections().len(), 1);
        assert_eq!(result.word_detections()[0].confidence, Some(0.93));
        assert_eq!(result.image_height(), 2400.0);
        assert_eq!(result.detections[0].bounding_box.vertices[0], Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn bot_record_with_text_and_full_text_loads() {
        let raw = r#"{"text": "a", "fullText": "a", "detections": []}"#;
        let result = OcrResult::from_json(raw).unwrap();
        assert_eq!(result.full_text, "a");
        assert!(result.word_detections().is_empty());
        assert_eq!(result.image_height(), 0.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(OcrResult::from_json("{"), Err(OcrError::Json(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("sv-test-no-such-ocr.json");
        let err = OcrResult::load(&path).unwrap_err();
        assert!(err.to_string().contains("sv-test-no-such-ocr.json"));
    }

    #[test]
    fn fingerprint_ignores_case_and_spacing() {
        let a = OcrResult::new("Rashika's Art Work\n  Subscribed", vec![]);
        let b = OcrResult::new("rashika's art work subscribed", vec![]);
        let c = OcrResult::new("Rashika's Art Work Subscribe", vec![]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert!(a.fingerprint().starts_with("sha256:"));
    }

    #[test]
    fn box_geometry() {
        let b = BoundingBox::from_rect(10.0, 100.0, 50.0, 20.0);
        assert_eq!(b.min_y(), 100.0);
        assert_eq!(b.max_y(), 120.0);
        assert_eq!(b.center_y(), 110.0);
        assert_eq!(b.min_x(), 10.0);
        assert_eq!(BoundingBox::default().min_y(), 0.0);
    }
}
