//! Moderation Pipeline
//!
//! Orchestrates one analysis run per video: the audio modality (extract,
//! transcribe, lexical scan) and the video modality (sample, classify,
//! filter) run concurrently and their outcomes are merged into one report.
//! A failure in either modality becomes a report line; it never aborts the
//! other modality and never escapes as an error.
//!
//! The video decoder runs on a blocking thread and hands sampled frames to
//! the async classification loop through a bounded channel, so a slow
//! classifier applies backpressure to the decoder instead of buffering the
//! whole video in memory.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::audio::{
    extract_waveform_async, validate_waveform, LexicalFlagger, TempWav, TranscribeError,
    Transcriber,
};
use crate::report::{
    audio_error_finding, detection_finding, profanity_finding, service_warning_finding,
    video_error_finding, AnalysisReport, ModalityReport, AUDIO_UNCLEAR_FINDING,
};
use crate::video::{
    Detection, FrameSampler, ObjectClassifier, RestrictedObjectFilter, SamplerResult,
};
use crate::ModerationConfig;

/// Sampled frames in flight between the decoder thread and the classifier.
const FRAME_CHANNEL_CAPACITY: usize = 4;

// =============================================================================
// Pipeline
// =============================================================================

/// One-shot analyzer binding a configuration to its oracle backends.
pub struct ModerationPipeline {
    config: ModerationConfig,
    transcriber: Arc<dyn Transcriber>,
    classifier: Arc<dyn ObjectClassifier>,
}

impl ModerationPipeline {
    /// Creates a pipeline over the given oracles.
    pub fn new(
        config: ModerationConfig,
        transcriber: Arc<dyn Transcriber>,
        classifier: Arc<dyn ObjectClassifier>,
    ) -> Self {
        Self {
            config,
            transcriber,
            classifier,
        }
    }

    /// Analyzes one video and returns the merged report.
    ///
    /// Never fails: modality errors surface as report lines. Repeated calls
    /// on unchanged inputs produce identical reports.
    pub async fn analyze(&self, video: &Path) -> AnalysisReport {
        info!(video = %video.display(), "Starting moderation analysis");

        let (audio, visual) = tokio::join!(self.audio_modality(video), self.video_modality(video));
        let report = AnalysisReport::aggregate(audio, visual);

        info!(status = ?report.status, "Moderation analysis complete");
        report
    }

    // -------------------------------------------------------------------------
    // Audio modality
    // -------------------------------------------------------------------------

    async fn audio_modality(&self, video: &Path) -> ModalityReport {
        let wav = match TempWav::create() {
            Ok(wav) => wav,
            Err(e) => return ModalityReport::failed(audio_error_finding(&e.to_string())),
        };

        if let Err(e) =
            extract_waveform_async(video, &wav.path(), self.config.ffmpeg_path.as_deref()).await
        {
            return ModalityReport::failed(audio_error_finding(&e.to_string()));
        }

        if let Err(e) = validate_waveform(&wav.path()) {
            return ModalityReport::failed(audio_error_finding(&e.to_string()));
        }

        match self.transcriber.transcribe(&wav.path()).await {
            Ok(transcript) => {
                debug!(transcript = %transcript, "Transcription complete");
                let matches = LexicalFlagger::new(&self.config.denylist).scan(&transcript);
                if matches.is_empty() {
                    ModalityReport::clean()
                } else {
                    ModalityReport::flagged(vec![profanity_finding(&matches)])
                }
            }
            // no confident text is a soft outcome, not a failure
            Err(TranscribeError::AmbiguousAudio) => {
                let mut report = ModalityReport::clean();
                report.push(AUDIO_UNCLEAR_FINDING.to_string());
                report
            }
            Err(TranscribeError::Service(message)) => {
                warn!(error = %message, "Transcription backend failed");
                let mut report = ModalityReport::clean();
                report.push(service_warning_finding(&message));
                report
            }
        }
    }

    // -------------------------------------------------------------------------
    // Video modality
    // -------------------------------------------------------------------------

    async fn video_modality(&self, video: &Path) -> ModalityReport {
        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

        let input = video.to_path_buf();
        let stride = self.config.frame_stride;
        let ffmpeg = self.config.ffmpeg_path.clone();
        let ffprobe = self.config.ffprobe_path.clone();

        let decoder = tokio::task::spawn_blocking(move || -> SamplerResult<()> {
            let sampler =
                FrameSampler::open(&input, stride, ffmpeg.as_deref(), ffprobe.as_deref())?;
            for frame in sampler {
                // receiver gone means the scan ended early; stop decoding
                if tx.blocking_send(frame).is_err() {
                    break;
                }
            }
            Ok(())
        });

        let filter = RestrictedObjectFilter::new(
            &self.config.restricted_labels,
            self.config.confidence_threshold,
        );
        let report = scan_frames(rx, self.classifier.as_ref(), &filter).await;

        match decoder.await {
            Ok(Ok(())) => report,
            Ok(Err(e)) => ModalityReport::failed(video_error_finding(&e.to_string())),
            Err(e) => ModalityReport::failed(video_error_finding(&e.to_string())),
        }
    }
}

/// Classifies each sampled frame and collects restricted detections in frame
/// order. A classifier failure on one frame is logged and skipped; the scan
/// continues with the next frame.
async fn scan_frames(
    mut rx: mpsc::Receiver<(u64, RgbImage)>,
    classifier: &dyn ObjectClassifier,
    filter: &RestrictedObjectFilter,
) -> ModalityReport {
    let mut findings = Vec::new();

    while let Some((frame_index, frame)) = rx.recv().await {
        match classifier.classify(&frame).await {
            Ok(raw) => {
                for detection in raw
                    .into_iter()
                    .map(|r| Detection::from_raw(r, frame_index))
                {
                    if filter.is_restricted(&detection) {
                        debug!(
                            label = %detection.label,
                            confidence = detection.confidence,
                            frame_index,
                            "Restricted object detected"
                        );
                        findings.push(detection_finding(
                            &detection.label,
                            detection.confidence,
                            detection.frame_index,
                        ));
                    }
                }
            }
            Err(e) => {
                warn!(frame_index, error = %e, "Classification failed for frame");
            }
        }
    }

    if findings.is_empty() {
        ModalityReport::clean()
    } else {
        ModalityReport::flagged(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================
