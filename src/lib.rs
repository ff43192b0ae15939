//! Screenshot verification engine.
//!
//! Decides from OCR output alone whether a user-submitted screenshot proves
//! a subscribe/follow state and was taken within a few minutes of now.
//! Everything is a pure function of its inputs: no I/O during validation,
//! no state carried between calls.
//!
//! Domains:
//!   - ocr/      — OCR result model, JSON dump loading, spatial heuristics
//!   - verify/   — candidate extraction, repair, time window, platform checks
//!   - config.rs — tunables and per-platform rules, JSON on disk

pub mod config;
pub mod ocr;
pub mod verify;

pub use config::{load_config, ConfigError, VerifyConfig};
pub use ocr::{BoundingBox, OcrDetection, OcrResult, Point};
pub use verify::{Platform, RejectReason, TimestampCandidate, ValidationOutcome, Verifier};
