use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use notescribe_core::whisper::ModelVariant;
use notescribe_core::{AudioNormalizer, Config, WhisperEngine};

#[derive(Parser)]
#[command(name = "notescribe-cli")]
#[command(about = "NoteScribe CLI — transcribe a meeting recording to structured JSON")]
struct Cli {
    /// Audio file to transcribe (WAV, MP3, M4A, MP4, OGG, FLAC).
    #[arg(required_unless_present = "write_default_config")]
    audio_file: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured model variant (tiny|base|small|medium|large-v3).
    #[arg(short, long)]
    model: Option<ModelVariant>,

    /// Write a default config file to the --config path and exit.
    #[arg(long)]
    write_default_config: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.write_default_config {
        Config::write_default(&cli.config)
            .with_context(|| format!("failed to write {}", cli.config.display()))?;
        info!(path = %cli.config.display(), "default config written");
        return Ok(());
    }

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(model) = cli.model {
        config.whisper.model = model;
    }

    let audio_file = cli
        .audio_file
        .context("an audio file argument is required")?;

    let normalizer = AudioNormalizer::new(config.audio.output_dir.clone());
    let engine = WhisperEngine::new(config.whisper, normalizer);

    // Pre-load so the load latency is visible up front, not inside the call.
    engine.ensure_loaded().context("failed to load model")?;

    let result = engine
        .transcribe(&audio_file)
        .with_context(|| format!("failed to transcribe {}", audio_file.display()))?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}
