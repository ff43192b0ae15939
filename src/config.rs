//! Verifier configuration.
//!
//! Every tunable the verifier uses lives here: window tolerance, the
//! timezones the community is assumed to be in, priority tiers, and the
//! per-platform text rules. Stored as JSON at
//! `~/.config/screenshot-verify/config.json` (macOS:
//! `~/Library/Application Support/screenshot-verify/config.json`), or at
//! the path in `SCREENSHOT_VERIFY_CONFIG`. A missing file means defaults.
//!
//! The button heuristics (`Header.max_fraction`, `ShortLine.max_len`) were
//! tuned against one generation of the YouTube/Instagram apps. A UI
//! redesign breaks them silently; adjust here rather than in code.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SCREENSHOT_VERIFY_CONFIG";

const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid pattern for {name}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level verifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyConfig {
    /// Maximum drift, in whole minutes, between screenshot clock and reference.
    pub tolerance_minutes: i64,
    /// Offsets from UTC, in minutes, of the clocks users are expected to show.
    pub timezone_offsets_minutes: Vec<i32>,
    /// Calendar days around the reference date a clock reading may belong to.
    pub day_offsets: Vec<i64>,
    /// Shift tried in both directions when AM/PM is unreadable.
    pub meridiem_shift_hours: i64,
    /// Text that marks a photo-gallery view of a saved screenshot.
    pub gallery_pattern: String,
    pub scoring: ScoringPolicy,
    pub subscription: PlatformRules,
    pub follow: PlatformRules,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: 5,
            // System clock (UTC on the host) and IST.
            timezone_offsets_minutes: vec![0, 330],
            day_offsets: vec![-1, 0, 1],
            meridiem_shift_hours: 12,
            gallery_pattern: "(Gallery|Photos|Screenshot|Recent|Files)".to_string(),
            scoring: ScoringPolicy::default(),
            subscription: PlatformRules::subscription(),
            follow: PlatformRules::follow(),
        }
    }
}

/// Priority tiers for timestamp candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringPolicy {
    /// Top and bottom fraction of the screen treated as system chrome.
    pub status_bar_band: f32,
    /// Score for a detection inside the status-bar band.
    pub position_bonus: f32,
    /// Multiplier applied to OCR confidence.
    pub confidence_weight: f32,
    /// Priority of fragments merged from adjacent detections.
    pub merged_priority: f32,
    /// Priority of matches found only in the full text.
    pub fallback_priority: f32,
    /// Vertical distance within which detections share a line.
    pub line_tolerance_px: f32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            status_bar_band: 0.15,
            position_bonus: 2.0,
            confidence_weight: 2.0,
            merged_priority: 2.5,
            fallback_priority: 1.0,
            line_tolerance_px: 10.0,
        }
    }
}

/// How an action-button match is told apart from ordinary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ButtonGate {
    /// Button counts only when its detection starts above this fraction of
    /// the image height. Recommended-channel tiles further down carry their
    /// own "Subscribe" buttons.
    #[serde(rename_all = "camelCase")]
    Header { max_fraction: f32 },
    /// Button counts only on a text line shorter than `max_len` characters,
    /// so bios like "Follow my other page" pass.
    #[serde(rename_all = "camelCase")]
    ShortLine { max_len: usize },
}

/// Text rules for one platform. Patterns are case-insensitive regexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRules {
    /// Name shown to the user when the identity is missing.
    pub display_name: String,
    /// Channel name or account handle that must appear.
    pub identity: String,
    /// Text proving the wanted state ("Subscribed", "Following").
    pub positive: String,
    /// Text that fails the check wherever it appears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<String>,
    /// The call-to-action button shown when the user is not subscribed/following.
    pub action_button: String,
    pub button_gate: ButtonGate,
}

impl PlatformRules {
    pub fn subscription() -> Self {
        Self {
            display_name: "Rashika's Art Work".to_string(),
            identity: r"Rashika['’]?s\s+Art\s*Work".to_string(),
            positive: "Subscribed".to_string(),
            negative: Some("Unsubscribed".to_string()),
            action_button: r"(^|\s)Subscribe(\s|$)".to_string(),
            button_gate: ButtonGate::Header { max_fraction: 0.3 },
        }
    }

    pub fn follow() -> Self {
        Self {
            display_name: "rashika.agarwal.79".to_string(),
            identity: r"rashika\.agarwal\.79".to_string(),
            positive: "Following".to_string(),
            negative: None,
            action_button: r"(^|\s)(Follow|Follow Back)(\s|$)".to_string(),
            button_gate: ButtonGate::ShortLine { max_len: 20 },
        }
    }
}

impl VerifyConfig {
    /// Check ranges. Patterns are checked when the verifier compiles them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_minutes < 0 {
            return Err(ConfigError::Invalid(format!(
                "toleranceMinutes must not be negative (got {})",
                self.tolerance_minutes
            )));
        }
        if self.timezone_offsets_minutes.is_empty() {
            return Err(ConfigError::Invalid(
                "timezoneOffsetsMinutes must list at least one offset".to_string(),
            ));
        }
        if let Some(bad) = self
            .timezone_offsets_minutes
            .iter()
            .find(|o| o.unsigned_abs() > 24 * 60)
        {
            return Err(ConfigError::Invalid(format!(
                "timezone offset {} minutes is more than a day",
                bad
            )));
        }
        if self.day_offsets.is_empty() || self.day_offsets.iter().any(|d| d.abs() > 1) {
            return Err(ConfigError::Invalid(
                "dayOffsets must be a non-empty subset of -1, 0, 1".to_string(),
            ));
        }
        if !(0..=23).contains(&self.meridiem_shift_hours) {
            return Err(ConfigError::Invalid(format!(
                "meridiemShiftHours must be within 0..=23 (got {})",
                self.meridiem_shift_hours
            )));
        }

        let band = self.scoring.status_bar_band;
        if !(0.0..0.5).contains(&band) {
            return Err(ConfigError::Invalid(format!(
                "statusBarBand must be within [0, 0.5) (got {})",
                band
            )));
        }
        if self.scoring.line_tolerance_px < 0.0 {
            return Err(ConfigError::Invalid(
                "lineTolerancePx must not be negative".to_string(),
            ));
        }

        for (name, rules) in [("subscription", &self.subscription), ("follow", &self.follow)] {
            if rules.identity.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{}.identity must not be empty", name)));
            }
            match rules.button_gate {
                ButtonGate::Header { max_fraction } if !(0.0..=1.0).contains(&max_fraction) => {
                    return Err(ConfigError::Invalid(format!(
                        "{}.buttonGate.maxFraction must be within [0, 1] (got {})",
                        name, max_fraction
                    )));
                }
                ButtonGate::ShortLine { max_len: 0 } => {
                    return Err(ConfigError::Invalid(format!(
                        "{}.buttonGate.maxLen must be positive",
                        name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Default config location under the user's config directory.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("screenshot-verify").join(CONFIG_FILENAME))
}

/// Config path in effect: `SCREENSHOT_VERIFY_CONFIG` if set, else the default.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_ENV) {
        Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    }
}

/// Load the config in effect. A missing file yields the defaults.
pub fn load_config() -> Result<VerifyConfig, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        Some(path) => {
            log::info!("[CONFIG] No config at {}, using defaults", path.display());
            Ok(VerifyConfig::default())
        }
        None => {
            log::warn!("[CONFIG] Could not determine config directory, using defaults");
            Ok(VerifyConfig::default())
        }
    }
}

/// Read, parse and range-check a config file.
pub fn load_config_from(path: &Path) -> Result<VerifyConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: VerifyConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    log::info!("[CONFIG] Loaded {}", path.display());
    Ok(config)
}

/// Write a config file, creating its directory if needed.
pub fn save_config(path: &Path, config: &VerifyConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("[CONFIG] Saved {}", path.display());
    Ok(())
}
