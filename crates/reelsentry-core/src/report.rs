//! Analysis Report and Aggregation
//!
//! Merges the audio and video modality outcomes into one ordered report.
//! Audio findings always precede video findings regardless of which modality
//! finished first; section order is a presentation contract, not a race.
//! A modality failure becomes a report line, never an exception out of the
//! pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel emitted when both modalities produced nothing at all.
pub const CLEAN_SENTINEL: &str = "No restricted content detected.";

/// Soft finding recorded when the oracle could not parse any confident text.
pub const AUDIO_UNCLEAR_FINDING: &str = "Audio was unclear; no transcript produced.";

// =============================================================================
// Finding Formatters
// =============================================================================

/// One line listing every matched denylist term, in denylist order.
pub fn profanity_finding(terms: &[String]) -> String {
    format!("Profanity detected in audio: {}", terms.join(", "))
}

/// One line per restricted detection: `label, confidence, frame N`.
pub fn detection_finding(label: &str, confidence: f64, frame_index: u64) -> String {
    format!("{}, {:.2}, frame {}", label, confidence, frame_index)
}

/// Soft warning for a transcription backend failure.
pub fn service_warning_finding(message: &str) -> String {
    format!("Transcription service error: {}", message)
}

/// Error record for an aborted audio modality.
pub fn audio_error_finding(message: &str) -> String {
    format!("Audio analysis failed: {}", message)
}

/// Error record for an aborted video modality.
pub fn video_error_finding(message: &str) -> String {
    format!("Video analysis failed: {}", message)
}

// =============================================================================
// Modality Report
// =============================================================================

/// Outcome of one analysis modality.
///
/// Exactly one shape per modality: clean (no findings), findings, or an error
/// record. Soft warnings appear as findings lines without flagging.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalityReport {
    /// Report lines, in generation order
    pub findings: Vec<String>,
    /// True when a genuine violation was found
    pub flagged: bool,
    /// True when the modality aborted before completing
    pub errored: bool,
}

impl ModalityReport {
    /// A modality that completed with nothing to report.
    pub fn clean() -> Self {
        Self::default()
    }

    /// A modality that found violations.
    pub fn flagged(findings: Vec<String>) -> Self {
        Self {
            findings,
            flagged: true,
            errored: false,
        }
    }

    /// A modality that aborted; the message becomes its single report line.
    pub fn failed(message: String) -> Self {
        Self {
            findings: vec![message],
            flagged: false,
            errored: true,
        }
    }

    /// Appends a finding line.
    pub fn push(&mut self, finding: String) {
        self.findings.push(finding);
    }
}

// =============================================================================
// Analysis Report
// =============================================================================

/// Overall verdict of one analysis run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportStatus {
    /// Neither modality found anything and neither failed
    Clean,
    /// At least one violation was found
    Flagged,
    /// No violations, but at least one modality could not complete
    Error,
}

/// Aggregated report for one analyzed video
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub status: ReportStatus,
    /// Audio findings, in generation order
    pub audio_findings: Vec<String>,
    /// Video findings, in frame order then detection order within a frame
    pub video_findings: Vec<String>,
}

impl AnalysisReport {
    /// Merges the two modality outcomes.
    ///
    /// Any finding flags the report; otherwise any modality failure marks it
    /// as an error. A failed modality never suppresses the other modality's
    /// legitimate findings.
    pub fn aggregate(audio: ModalityReport, video: ModalityReport) -> Self {
        let status = if audio.flagged || video.flagged {
            ReportStatus::Flagged
        } else if audio.errored || video.errored {
            ReportStatus::Error
        } else {
            ReportStatus::Clean
        };
        Self {
            status,
            audio_findings: audio.findings,
            video_findings: video.findings,
        }
    }

    /// True when there is nothing to report at all.
    pub fn is_clean(&self) -> bool {
        self.status == ReportStatus::Clean
            && self.audio_findings.is_empty()
            && self.video_findings.is_empty()
    }

    /// Ordered human-readable lines: audio section first, then video, or the
    /// clean sentinel when both are empty.
    pub fn lines(&self) -> Vec<String> {
        if self.audio_findings.is_empty() && self.video_findings.is_empty() {
            return vec![CLEAN_SENTINEL.to_string()];
        }
        self.audio_findings
            .iter()
            .chain(self.video_findings.iter())
            .cloned()
            .collect()
    }

    /// Renders the full report as plain text.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

// =============================================================================
// Tests
// =============================================================================
