//! Conversion of arbitrary uploads into the canonical model input format.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::info;

use super::TARGET_SAMPLE_RATE;

/// Converts audio/video files into mono 16 kHz 16-bit PCM WAV.
///
/// Whisper was trained on 16 kHz mono audio, so every upload is brought to
/// that format before inference. Supports whatever containers and codecs
/// symphonia is built with (WAV, MP3, M4A/AAC, MP4, OGG/Vorbis, FLAC).
/// No format whitelist is enforced here; undecodable input simply fails.
pub struct AudioNormalizer {
    output_dir: PathBuf,
}

impl AudioNormalizer {
    /// Create a normalizer writing converted files under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Normalize `input` into a new WAV at `<output_dir>/<stem>_16k.wav`.
    ///
    /// Creates the output directory if absent. The input file is left in
    /// place; the caller owns its lifetime. Decode and I/O errors propagate
    /// unmodified, there is no retry.
    pub fn normalize(&self, input: &Path) -> Result<PathBuf> {
        let samples = decode_to_mono(input)?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let output = self.output_dir.join(format!("{stem}_16k.wav"));

        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("failed to create output dir {}", self.output_dir.display())
        })?;

        write_wav(&output, &samples)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            samples = samples.len(),
            "audio normalized to mono 16kHz"
        );

        Ok(output)
    }
}

/// Decode `input` into mono f32 samples at [`TARGET_SAMPLE_RATE`].
///
/// Multi-channel audio is downmixed by averaging; any other sample rate is
/// resampled.
fn decode_to_mono(input: &Path) -> Result<Vec<f32>> {
    let file =
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("unsupported or corrupt media: {}", input.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("no audio track found")?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(TARGET_SAMPLE_RATE);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .context("failed to initialize decoder")?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e).context("failed to read packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).context("failed to decode packet")?;

        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        let interleaved = buf.samples();

        if channels > 1 {
            for frame in interleaved.chunks(channels) {
                samples.push(frame.iter().sum::<f32>() / channels as f32);
            }
        } else {
            samples.extend_from_slice(interleaved);
        }
    }

    if samples.is_empty() {
        bail!("no audio samples decoded from {}", input.display());
    }

    if source_rate != TARGET_SAMPLE_RATE {
        samples = resample(&samples, source_rate, TARGET_SAMPLE_RATE)?;
    }

    Ok(samples)
}

/// Resample mono audio from `from_rate` to `to_rate`.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .context("failed to initialize resampler")?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            // SincFixedIn requires full chunks; zero-pad the tail.
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            vec![padded]
        } else {
            vec![chunk.to_vec()]
        };

        let resampled = resampler.process(&input, None).context("resampling failed")?;

        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    Ok(output)
}

/// Write mono f32 samples as 16-bit PCM WAV at [`TARGET_SAMPLE_RATE`].
fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v).context("failed to write sample")?;
    }

    writer.finalize().context("failed to finalize WAV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write a sine-wave WAV fixture with the given shape.
    fn write_test_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let v = ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 12000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(v).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn normalize_stereo_44khz_produces_mono_16khz() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("meeting.wav");
        write_test_wav(&input, 44_100, 2, 22_050); // 0.5s stereo

        let normalizer = AudioNormalizer::new(dir.path().join("out"));
        let output = normalizer.normalize(&input).unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, TARGET_SAMPLE_RATE);

        // ~0.5s at 16kHz, allowing for resampler edge effects
        let n = reader.len() as f64;
        assert!((n / 8000.0 - 1.0).abs() < 0.2, "got {n} samples");
    }

    #[test]
    fn normalize_keeps_input_and_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        write_test_wav(&input, 16_000, 1, 1_600);

        let out_dir = dir.path().join("nested").join("processed");
        let normalizer = AudioNormalizer::new(&out_dir);
        let output = normalizer.normalize(&input).unwrap();

        assert!(input.exists());
        assert!(output.exists());
        assert_eq!(output, out_dir.join("clip_16k.wav"));
    }

    #[test]
    fn normalize_already_canonical_input_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mono16k.wav");
        write_test_wav(&input, 16_000, 1, 16_000); // 1s

        let normalizer = AudioNormalizer::new(dir.path().join("out"));
        let output = normalizer.normalize(&input).unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(reader.len(), 16_000);
    }

    #[test]
    fn normalize_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = AudioNormalizer::new(dir.path());
        let err = normalizer.normalize(&dir.path().join("absent.wav"));
        assert!(err.is_err());
    }

    #[test]
    fn normalize_garbage_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("junk.wav");
        std::fs::write(&input, b"definitely not audio").unwrap();

        let normalizer = AudioNormalizer::new(dir.path());
        assert!(normalizer.normalize(&input).is_err());
    }

    #[test]
    fn resample_48khz_to_16khz_yields_third_of_samples() {
        let samples: Vec<f32> = (0..48_000).map(|i| (i as f32 / 48_000.0).sin()).collect();
        let out = resample(&samples, 48_000, 16_000).unwrap();
        let ratio = out.len() as f64 / samples.len() as f64;
        assert!((ratio - 1.0 / 3.0).abs() < 0.05, "ratio: {ratio}");
    }
}
