//! ReelSentry Core Engine
//!
//! Multi-modal moderation pre-filter for uploaded video. A video is inspected
//! along two independent tracks: spoken profanity (audio demux → transcription
//! → lexical matching) and visually depicted weapons (frame sampling → object
//! detection → confidence-gated filtering). Both tracks feed a single ordered
//! report; the pipeline flags content for human review, it never definitively
//! classifies it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Moderation Pipeline                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  audio/     extract.rs    - FFmpeg demux → scoped 16kHz mono WAV │
//! │             transcribe.rs - Transcriber oracle (HTTP or stub)    │
//! │             lexicon.rs    - denylist substring matching          │
//! │  video/     sampler.rs    - lazy stride-N frame iterator         │
//! │             classifier.rs - ObjectClassifier oracle (HTTP/stub)  │
//! │             filter.rs     - restricted-label confidence gate     │
//! │  report.rs  - per-modality outcomes, aggregation, rendering      │
//! │  pipeline.rs - runs both modalities concurrently, joins results  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A modality failure never escapes the pipeline as an error; it is converted
//! to report content at the modality boundary so the other modality's partial
//! results survive.

pub mod audio;
pub mod video;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod report;
pub use report::*;

mod pipeline;
pub use pipeline::*;

// Re-export the oracle capabilities at the crate root
pub use audio::{HttpTranscriber, LexicalFlagger, StubTranscriber, TranscribeError, Transcriber};
pub use video::{
    BoundingBox, ClassifierError, Detection, HttpClassifier, ObjectClassifier, RawDetection,
    RestrictedObjectFilter, StubClassifier,
};
