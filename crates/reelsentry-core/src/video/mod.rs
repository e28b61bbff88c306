//! Video Modality
//!
//! Everything the visual track contributes to a moderation verdict:
//! - `sampler.rs`    - lazy every-Nth-frame iterator over an FFmpeg raw pipe
//! - `classifier.rs` - object-detection oracle behind [`ObjectClassifier`]
//! - `filter.rs`     - restricted-label confidence gate
//!
//! The video source handle is exclusively owned by the sampler and released
//! when the sequence is exhausted or abandoned.

pub mod classifier;
pub mod filter;
pub mod sampler;

pub use classifier::{
    BoundingBox, ClassifierError, ClassifierResult, Detection, HttpClassifier, ObjectClassifier,
    RawDetection, StubClassifier,
};
pub use filter::RestrictedObjectFilter;
pub use sampler::{
    probe_dimensions, FrameDimensions, FrameSampler, FrameStream, SamplerError, SamplerResult,
};
