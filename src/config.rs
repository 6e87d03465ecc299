//! TOML-backed application configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::whisper::ModelVariant;

/// Application configuration, read from a TOML file.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub whisper: WhisperConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Whisper model settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WhisperConfig {
    /// Model variant to load.
    #[serde(default)]
    pub model: ModelVariant,
    /// Directory holding the GGML weight files.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Language hint (e.g. "en", "pt"). `None` lets the model auto-detect.
    #[serde(default)]
    pub language: Option<String>,
    /// Inference thread count. `None` uses whisper.cpp's default.
    #[serde(default)]
    pub n_threads: Option<i32>,
}

/// Audio normalization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Directory for normalized intermediate WAV files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./temp/processed")
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model: ModelVariant::default(),
            models_dir: default_models_dir(),
            language: None,
            n_threads: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Read and parse a config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.as_ref().display()))
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    ///
    /// A present-but-invalid file is an error; a missing file is not.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!(
                path = %path.as_ref().display(),
                "config file not found, using defaults"
            );
            Ok(Config::default())
        }
    }

    /// Write the default configuration to `path`.
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .context("failed to serialize default config")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("failed to write config {}", path.as_ref().display()))?;
        Ok(())
    }
}
