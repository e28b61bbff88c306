//! Restricted Object Filtering
//!
//! Pure predicate over classifier output: a detection is kept when its label
//! belongs to the restricted set (case-insensitive) and its confidence is
//! strictly above the threshold. Both are configuration.

use std::collections::HashSet;

use super::classifier::Detection;

/// Confidence-gated restricted-label predicate. No state beyond its
/// configuration.
#[derive(Clone, Debug)]
pub struct RestrictedObjectFilter {
    labels: HashSet<String>,
    confidence_threshold: f64,
}

impl RestrictedObjectFilter {
    /// Builds a filter from a label set and confidence threshold. Labels are
    /// normalized to lower case.
    pub fn new(labels: &[String], confidence_threshold: f64) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_lowercase()).collect(),
            confidence_threshold,
        }
    }

    /// Inclusion requires label membership AND confidence strictly greater
    /// than the threshold; the boundary itself is excluded.
    pub fn is_restricted(&self, detection: &Detection) -> bool {
        self.labels.contains(&detection.label.to_lowercase())
            && detection.confidence > self.confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::classifier::RawDetection;
    use crate::ModerationConfig;

    fn default_filter() -> RestrictedObjectFilter {
        let config = ModerationConfig::default();
        RestrictedObjectFilter::new(&config.restricted_labels, config.confidence_threshold)
    }

    fn detection(label: &str, confidence: f64) -> Detection {
        Detection::from_raw(RawDetection::new(label, confidence), 30)
    }

    #[test]
    fn test_admits_above_threshold() {
        assert!(default_filter().is_restricted(&detection("knife", 0.31)));
    }

    #[test]
    fn test_rejects_at_threshold_boundary() {
        // strict greater-than: 0.30 exactly is excluded
        assert!(!default_filter().is_restricted(&detection("knife", 0.30)));
    }

    #[test]
    fn test_rejects_unrestricted_label() {
        assert!(!default_filter().is_restricted(&detection("car", 0.99)));
    }

    #[test]
    fn test_label_match_is_case_insensitive() {
        assert!(default_filter().is_restricted(&detection("Knife", 0.9)));
        assert!(default_filter().is_restricted(&detection("GUN", 0.9)));
    }

    #[test]
    fn test_scissors_is_restricted() {
        assert!(default_filter().is_restricted(&detection("scissors", 0.5)));
    }

    #[test]
    fn test_custom_configuration() {
        let filter = RestrictedObjectFilter::new(&["sword".to_string()], 0.8);
        assert!(filter.is_restricted(&detection("sword", 0.81)));
        assert!(!filter.is_restricted(&detection("sword", 0.8)));
        assert!(!filter.is_restricted(&detection("knife", 0.99)));
    }
}
