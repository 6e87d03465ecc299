//! Transcript data model.

use serde::Serialize;

/// Speaker label applied to every utterance until diarization lands.
pub const PLACEHOLDER_SPEAKER: &str = "Speaker 1";

/// A segment exactly as reported by the inference library: raw text with
/// whatever padding whisper emits, times in seconds, ids pre-numbered and
/// pre-ordered by the model.
#[derive(Debug, Clone)]
pub struct ModelSegment {
    pub id: i64,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A time-bounded span of transcribed speech.
#[derive(Debug, Clone, Serialize)]
pub struct Utterance {
    /// Segment id as numbered by the model.
    pub id: i64,
    /// Trimmed segment text.
    pub text: String,
    /// Start offset in seconds, rounded to 2 decimals.
    pub start_time: f64,
    /// End offset in seconds, rounded to 2 decimals.
    pub end_time: f64,
    /// Always [`PLACEHOLDER_SPEAKER`]; diarization is a future collaborator.
    pub speaker: String,
}

/// Result of one transcription call, immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResult {
    /// Complete transcript as a single trimmed string.
    pub full_text: String,
    /// Ordered time-aligned segments.
    pub utterances: Vec<Utterance>,
    /// Language code reported by the model, `"en"` when absent.
    pub language: String,
    /// End time of the last utterance, `0.0` when there are none.
    pub duration_seconds: f64,
    /// Whitespace-token count of `full_text`.
    pub word_count: usize,
    /// Wall-clock seconds spent in the transcription call, 2 decimals.
    pub processing_time_s: f64,
    /// Model variant active at call time.
    pub model_used: String,
}

impl TranscriptionResult {
    /// Reshape raw model output into the structured transcript.
    pub fn from_model_output(
        segments: Vec<ModelSegment>,
        language: Option<String>,
        processing_time_s: f64,
        model_used: &str,
    ) -> Self {
        // Whisper segment texts carry leading padding; the full text is
        // their concatenation, trimmed once at the ends.
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<String>()
            .trim()
            .to_string();

        let utterances: Vec<Utterance> = segments
            .into_iter()
            .map(|s| Utterance {
                id: s.id,
                text: s.text.trim().to_string(),
                start_time: round2(s.start),
                end_time: round2(s.end),
                speaker: PLACEHOLDER_SPEAKER.to_string(),
            })
            .collect();

        let duration_seconds = utterances.last().map_or(0.0, |u| u.end_time);
        let word_count = full_text.split_whitespace().count();

        Self {
            full_text,
            utterances,
            language: language.unwrap_or_else(|| "en".to_string()),
            duration_seconds,
            word_count,
            processing_time_s: round2(processing_time_s),
            model_used: model_used.to_string(),
        }
    }
}

/// Round to 2 decimal places.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
