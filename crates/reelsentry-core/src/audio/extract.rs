//! Audio Extraction Module
//!
//! Demuxes a video's audio track into a normalized mono 16kHz 16-bit PCM WAV
//! using FFmpeg, then validates the result before transcription. The waveform
//! lives in a scoped temporary directory that is removed when the handle
//! drops, whether the audio stage succeeded or not.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during audio extraction
#[derive(Error, Debug)]
pub enum AudioExtractionError {
    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    /// FFmpeg command failed to execute
    #[error("FFmpeg execution failed: {0}")]
    FFmpegFailed(String),

    /// FFmpeg command returned non-zero exit code (no audio track, unreadable
    /// container, or transcode failure)
    #[error("FFmpeg process exited with error: {0}")]
    ProcessError(String),

    /// Extracted waveform is missing, empty, or in the wrong format
    #[error("Extracted waveform is not usable: {0}")]
    BadWaveform(String),

    /// IO error during file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for audio extraction operations
pub type AudioResult<T> = Result<T, AudioExtractionError>;

// =============================================================================
// Scoped Waveform Resource
// =============================================================================

/// Scoped temporary waveform file.
///
/// Exactly one of these exists per analyzed video. Dropping it removes the
/// backing directory and the WAV inside it, which upholds the guaranteed
/// cleanup contract regardless of how the audio stage concludes.
pub struct TempWav {
    dir: tempfile::TempDir,
}

impl TempWav {
    /// Allocates a fresh temporary directory for the waveform.
    pub fn create() -> AudioResult<Self> {
        let dir = tempfile::TempDir::new()?;
        Ok(Self { dir })
    }

    /// Path where the extracted WAV is (or will be) written.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("audio.wav")
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Extracts the audio track of a video as 16kHz mono s16le WAV.
///
/// Fails if the input does not exist or FFmpeg cannot demux/transcode it
/// (which includes containers without an audio track).
pub fn extract_waveform(
    input: &Path,
    output: &Path,
    ffmpeg_path: Option<&str>,
) -> AudioResult<()> {
    if !input.exists() {
        return Err(AudioExtractionError::InputNotFound(
            input.to_string_lossy().to_string(),
        ));
    }

    let ffmpeg = ffmpeg_path.unwrap_or("ffmpeg");
    let output_result = Command::new(ffmpeg)
        .args([
            "-i",
            &input.to_string_lossy(),
            "-vn", // Audio only
            "-ar",
            "16000", // 16kHz sample rate
            "-ac",
            "1", // Mono
            "-c:a",
            "pcm_s16le", // 16-bit PCM
            "-y",        // Overwrite output
            &output.to_string_lossy(),
        ])
        .output()?;

    if !output_result.status.success() {
        let stderr = String::from_utf8_lossy(&output_result.stderr);
        return Err(AudioExtractionError::ProcessError(stderr.to_string()));
    }

    Ok(())
}

/// Extracts audio on a blocking thread without stalling the async runtime.
pub async fn extract_waveform_async(
    input: &Path,
    output: &Path,
    ffmpeg_path: Option<&str>,
) -> AudioResult<()> {
    let input = input.to_path_buf();
    let output = output.to_path_buf();
    let ffmpeg = ffmpeg_path.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_waveform(&input, &output, ffmpeg.as_deref()))
        .await
        .map_err(|e| AudioExtractionError::FFmpegFailed(e.to_string()))?
}

// =============================================================================
// Validation
// =============================================================================

/// Verifies the extracted waveform is 16kHz mono PCM with at least one sample.
///
/// Returns the sample count per channel. This mirrors the separate
/// conversion/validation step the pipeline performs before handing the
/// waveform to the transcription oracle.
pub fn validate_waveform(wav_path: &Path) -> AudioResult<u64> {
    let reader = hound::WavReader::open(wav_path)
        .map_err(|e| AudioExtractionError::BadWaveform(format!("Failed to open WAV: {}", e)))?;

    let spec = reader.spec();

    if spec.sample_rate != 16000 {
        return Err(AudioExtractionError::BadWaveform(format!(
            "Expected 16kHz sample rate, got {} Hz",
            spec.sample_rate
        )));
    }

    if spec.channels != 1 {
        return Err(AudioExtractionError::BadWaveform(format!(
            "Expected mono audio, got {} channels",
            spec.channels
        )));
    }

    let samples = u64::from(reader.duration());
    if samples == 0 {
        return Err(AudioExtractionError::BadWaveform(
            "Waveform contains no samples".to_string(),
        ));
    }

    Ok(samples)
}

// =============================================================================
// Tests
// =============================================================================
