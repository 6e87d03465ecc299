//! Transcription engine: one lazily-loaded Whisper model, reused for every
//! call.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::AudioNormalizer;
use crate::config::WhisperConfig;
use crate::whisper::types::{ModelSegment, TranscriptionResult};

/// Owns the Whisper model handle and the transcription pipeline.
///
/// Constructed cold by the host application and injected where needed; the
/// model is loaded on first use and never replaced for the process
/// lifetime. Loading is mutex-guarded so concurrent cold calls load exactly
/// once. whisper.cpp states are created per call, so concurrent
/// transcriptions do not share mutable model state.
pub struct WhisperEngine {
    config: WhisperConfig,
    normalizer: AudioNormalizer,
    context: Mutex<Option<Arc<WhisperContext>>>,
}

impl WhisperEngine {
    /// Create an engine without loading the model.
    pub fn new(config: WhisperConfig, normalizer: AudioNormalizer) -> Self {
        Self {
            config,
            normalizer,
            context: Mutex::new(None),
        }
    }

    /// Check whether the model is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.context
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Load the configured model variant if it is not loaded yet.
    ///
    /// Idempotent: the first call loads the weights and logs the elapsed
    /// time, later calls return the existing handle. Call this once at
    /// process start so the first request does not pay the load latency.
    pub fn ensure_loaded(&self) -> Result<Arc<WhisperContext>> {
        let mut guard = self
            .context
            .lock()
            .map_err(|_| anyhow!("model lock poisoned"))?;

        if let Some(ctx) = guard.as_ref() {
            return Ok(Arc::clone(ctx));
        }

        let model_path = self.config.model.resolve(&self.config.models_dir);
        if !model_path.exists() {
            bail!(
                "model weights for '{}' not found at {}",
                self.config.model,
                model_path.display()
            );
        }

        info!(
            model = %self.config.model,
            path = %model_path.display(),
            "loading whisper model"
        );
        let start = Instant::now();

        let path_str = model_path
            .to_str()
            .context("model path is not valid UTF-8")?;
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .with_context(|| format!("failed to load whisper model {}", model_path.display()))?;
        let ctx = Arc::new(ctx);
        *guard = Some(Arc::clone(&ctx));

        info!(
            elapsed_s = format!("{:.2}", start.elapsed().as_secs_f64()),
            "whisper model loaded"
        );
        Ok(ctx)
    }

    /// Transcribe an audio file into a structured transcript.
    ///
    /// Normalizes the input to mono 16 kHz, runs inference in transcription
    /// (not translation) mode, and removes the normalized intermediate on
    /// both the success and failure paths. The input file itself is left in
    /// place; its lifetime belongs to the caller. No partial results are
    /// returned.
    pub fn transcribe(&self, path: &Path) -> Result<TranscriptionResult> {
        info!(input = %path.display(), "starting transcription");
        let start = Instant::now();

        let ctx = self.ensure_loaded()?;
        let wav = self.normalizer.normalize(path)?;

        // Capture the outcome before cleanup so the intermediate WAV is
        // removed even when inference fails.
        let inference = self.run_inference(&ctx, &wav);
        self.cleanup(&wav);
        let (segments, language) = inference?;

        let elapsed = start.elapsed().as_secs_f64();
        info!(
            elapsed_s = format!("{elapsed:.2}"),
            segments = segments.len(),
            "transcription complete"
        );

        Ok(TranscriptionResult::from_model_output(
            segments,
            language,
            elapsed,
            self.config.model.as_str(),
        ))
    }

    /// Best-effort removal of a temp file.
    ///
    /// A nonexistent path is a no-op; failures are logged and never
    /// propagated, so deletion problems cannot fail the caller's request.
    pub fn cleanup(&self, path: &Path) {
        if !path.exists() {
            return;
        }
        match std::fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "removed temp file"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove temp file"),
        }
    }

    /// Run whisper inference on a normalized WAV and collect raw segments
    /// plus the detected language.
    fn run_inference(
        &self,
        ctx: &WhisperContext,
        wav: &Path,
    ) -> Result<(Vec<ModelSegment>, Option<String>)> {
        let samples = read_wav_samples(wav)?;

        let mut state = ctx
            .create_state()
            .context("failed to create whisper state")?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_translate(false);
        params.set_language(self.config.language.as_deref());
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(n) = self.config.n_threads {
            params.set_n_threads(n);
        }

        state
            .full(params, &samples)
            .context("whisper inference failed")?;

        let n_segments = state
            .full_n_segments()
            .context("failed to read segment count")?;

        let mut segments = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .with_context(|| format!("failed to read segment {i}"))?;
            // Segment timestamps are reported in centiseconds.
            let start = state.full_get_segment_t0(i)? as f64 / 100.0;
            let end = state.full_get_segment_t1(i)? as f64 / 100.0;
            segments.push(ModelSegment {
                id: i as i64,
                text,
                start,
                end,
            });
        }

        let language = state
            .full_lang_id_from_state()
            .ok()
            .and_then(whisper_rs::get_lang_str)
            .map(str::to_string);

        Ok((segments, language))
    }
}

/// Read a 16-bit PCM WAV back as f32 samples in [-1, 1].
fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / 32768.0))
        .collect::<Result<Vec<f32>, _>>()
        .context("failed to read WAV samples")
}
