//! Moderation Configuration
//!
//! The denylist, restricted label set, confidence threshold, and frame stride
//! are configuration, not code constants. Defaults reproduce the shipped
//! moderation policy; tests and deployments may override any of them without
//! touching pipeline logic.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Default confidence gate for restricted detections (strict greater-than).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.30;

/// Default sampling stride: every 30th decoded frame is analyzed.
pub const DEFAULT_FRAME_STRIDE: u32 = 30;

fn default_denylist() -> Vec<String> {
    [
        "damn", "hell", "shit", "fuck", "fucking", "bitch", "bastard", "asshole", "dick", "piss",
        "crap", "pussy", "cock", "slut", "whore", "violence", "kill", "murder", "rape",
        "terrorist",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_restricted_labels() -> Vec<String> {
    ["knife", "gun", "rifle", "pistol", "weapon", "scissors"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_frame_stride() -> u32 {
    DEFAULT_FRAME_STRIDE
}

/// Configuration for the moderation pipeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationConfig {
    /// Ordered denylist for lexical flagging; match order follows list order
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
    /// Object labels considered indicative of weapons/violence
    #[serde(default = "default_restricted_labels")]
    pub restricted_labels: Vec<String>,
    /// Confidence gate for restricted detections (strict greater-than)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Analyze every Nth decoded frame
    #[serde(default = "default_frame_stride")]
    pub frame_stride: u32,
    /// Path to the FFmpeg binary ("ffmpeg" on PATH when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<String>,
    /// Path to the FFprobe binary ("ffprobe" on PATH when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            denylist: default_denylist(),
            restricted_labels: default_restricted_labels(),
            confidence_threshold: default_confidence_threshold(),
            frame_stride: default_frame_stride(),
            ffmpeg_path: None,
            ffprobe_path: None,
        }
    }
}

impl ModerationConfig {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// Fields absent from the file fall back to the built-in defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(CoreError::ValidationError(format!(
                "Confidence threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.frame_stride == 0 {
            return Err(CoreError::ValidationError(
                "Frame stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModerationConfig::default();
        assert_eq!(config.confidence_threshold, 0.30);
        assert_eq!(config.frame_stride, 30);
        assert_eq!(config.denylist.len(), 20);
        assert!(config.denylist.contains(&"damn".to_string()));
        assert!(config.restricted_labels.contains(&"knife".to_string()));
        assert!(config.restricted_labels.contains(&"scissors".to_string()));
        assert!(config.ffmpeg_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = ModerationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"confidenceThreshold\":0.3"));
        assert!(json.contains("\"frameStride\":30"));

        let parsed: ModerationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_partial_file_falls_back_to_defaults() {
        let parsed: ModerationConfig =
            serde_json::from_str(r#"{"confidenceThreshold": 0.5}"#).unwrap();
        assert_eq!(parsed.confidence_threshold, 0.5);
        assert_eq!(parsed.frame_stride, 30);
        assert_eq!(parsed.denylist.len(), 20);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = ModerationConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_stride() {
        let config = ModerationConfig {
            frame_stride: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"frameStride": 10, "restrictedLabels": ["sword"]}"#).unwrap();

        let config = ModerationConfig::from_json_file(&path).unwrap();
        assert_eq!(config.frame_stride, 10);
        assert_eq!(config.restricted_labels, vec!["sword".to_string()]);
        // untouched fields keep defaults
        assert_eq!(config.confidence_threshold, 0.30);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = ModerationConfig::from_json_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(CoreError::IoError(_))));
    }
}
