//! Whisper model management and transcription.

pub mod engine;
pub mod model;
pub mod types;

pub use engine::WhisperEngine;
pub use model::ModelVariant;
pub use types::{TranscriptionResult, Utterance};
