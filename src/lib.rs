//! NoteScribe core: audio normalization and local Whisper transcription
//! for meeting recordings.
//!
//! The pipeline is deliberately small and linear:
//!
//! ```text
//! [recording] → [AudioNormalizer] → mono 16 kHz WAV → [WhisperEngine]
//!                                                          ↓
//!                                                 [TranscriptionResult]
//! ```
//!
//! [`whisper::WhisperEngine`] owns a single lazily-loaded model handle that
//! is reused for every call; [`audio::AudioNormalizer`] converts whatever
//! the caller uploads into the canonical format the model was trained on.
//! The intermediate WAV is removed after inference, whether inference
//! succeeded or not. Persistence, diarization and summarization are future
//! collaborators behind this surface, not part of the core.

pub mod audio;
pub mod config;
pub mod whisper;

pub use audio::AudioNormalizer;
pub use config::Config;
pub use whisper::engine::WhisperEngine;
pub use whisper::types::{TranscriptionResult, Utterance};
