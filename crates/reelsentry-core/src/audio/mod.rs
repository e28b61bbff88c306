//! Audio Modality
//!
//! Everything the audio track contributes to a moderation verdict:
//! - `extract.rs`  - FFmpeg demux into a scoped temporary 16kHz mono WAV
//! - `transcribe.rs` - speech-to-text oracle behind the [`Transcriber`] trait
//! - `lexicon.rs`  - denylist substring matching over the transcript
//!
//! The extracted waveform is a transient file-backed resource; it is deleted
//! when its [`TempWav`] scope ends, on every exit path.

pub mod extract;
pub mod lexicon;
pub mod transcribe;

pub use extract::{
    extract_waveform, extract_waveform_async, validate_waveform, AudioExtractionError,
    AudioResult, TempWav,
};
pub use lexicon::LexicalFlagger;
pub use transcribe::{
    HttpTranscriber, StubTranscriber, TranscribeError, TranscribeResult, Transcriber,
};
