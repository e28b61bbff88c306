//! ReelSentry Error Definitions
//!
//! Defines the error hub used throughout the project. Module-local error
//! enums (extraction, transcription, sampling, classification) convert into
//! `CoreError` for callers that need a single error type.

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Audio extraction failed: {0}")]
    Extraction(#[from] crate::audio::AudioExtractionError),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] crate::audio::TranscribeError),

    #[error("Frame sampling failed: {0}")]
    Sampling(#[from] crate::video::SamplerError),

    #[error("Classification failed: {0}")]
    Classification(#[from] crate::video::ClassifierError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;
