//! Transcription Capability
//!
//! The speech-to-text backend is an opaque oracle behind the [`Transcriber`]
//! trait: a mono 16kHz waveform goes in, lower-cased text comes out. Exactly
//! one attempt is made per video; no retry. Three outcomes are distinguished:
//! usable text, ambiguous audio (no confident result), and a service failure.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during transcription
#[derive(Error, Debug, Clone)]
pub enum TranscribeError {
    /// The oracle could not reconstruct any confident text
    #[error("Could not understand audio")]
    AmbiguousAudio,

    /// The oracle was unreachable or rejected the request
    #[error("Transcription service error: {0}")]
    Service(String),
}

/// Result type for transcription operations
pub type TranscribeResult<T> = Result<T, TranscribeError>;

// =============================================================================
// Transcriber Trait
// =============================================================================

/// Speech-to-text capability.
///
/// Implementations:
/// - [`HttpTranscriber`]: network-backed recognition service
/// - [`StubTranscriber`]: deterministic stub for tests and offline runs
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes a mono 16kHz WAV file into lower-cased text.
    async fn transcribe(&self, wav_path: &Path) -> TranscribeResult<String>;
}

// =============================================================================
// HTTP Transcriber
// =============================================================================

/// Bounded timeout for one recognition request. Expiry maps to a service
/// error rather than hanging the pipeline.
pub const DEFAULT_TRANSCRIBE_TIMEOUT_SECS: u64 = 120;

#[derive(Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: String,
}

/// Transcriber backed by an HTTP speech-recognition service.
///
/// Posts the raw WAV bytes and expects `{"text": "..."}` back. An empty
/// transcript from the service is reported as ambiguous audio.
pub struct HttpTranscriber {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTranscriber {
    /// Creates a transcriber for the given service endpoint.
    pub fn new(endpoint: &str) -> TranscribeResult<Self> {
        if endpoint.is_empty() {
            return Err(TranscribeError::Service(
                "Transcription endpoint is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TRANSCRIBE_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                TranscribeError::Service(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, wav_path: &Path) -> TranscribeResult<String> {
        let bytes = tokio::fs::read(wav_path)
            .await
            .map_err(|e| TranscribeError::Service(format!("Failed to read waveform: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "audio/wav")
            .body(bytes)
            .send()
            .await
            .map_err(|e| TranscribeError::Service(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranscribeError::Service(format!(
                "Service returned {}",
                response.status()
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::Service(format!("Malformed response: {}", e)))?;

        let text = parsed.text.trim().to_lowercase();
        if text.is_empty() {
            return Err(TranscribeError::AmbiguousAudio);
        }

        Ok(text)
    }
}

// =============================================================================
// Stub Transcriber
// =============================================================================

/// Deterministic transcriber for tests and offline smoke runs.
pub struct StubTranscriber {
    outcome: TranscribeResult<String>,
}

impl StubTranscriber {
    /// Always returns the given transcript, lower-cased.
    pub fn text(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_lowercase()),
        }
    }

    /// Always reports ambiguous audio.
    pub fn ambiguous() -> Self {
        Self {
            outcome: Err(TranscribeError::AmbiguousAudio),
        }
    }

    /// Always reports a service failure with the given message.
    pub fn unreachable(message: &str) -> Self {
        Self {
            outcome: Err(TranscribeError::Service(message.to_string())),
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _wav_path: &Path) -> TranscribeResult<String> {
        self.outcome.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
