//! Audio decoding and normalization.

pub mod normalizer;

pub use normalizer::AudioNormalizer;

/// Sample rate the Whisper family of models was trained on.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;
