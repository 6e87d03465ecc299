//! Whisper model variants and on-disk path resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whisper model variant, by accuracy/resource tradeoff.
///
/// `tiny` and `base` fit comfortably in development machines; `large-v3`
/// is the production choice when accuracy matters more than latency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelVariant {
    Tiny,
    Base,
    Small,
    Medium,
    LargeV3,
}

impl ModelVariant {
    /// Canonical variant name, as used in config files and result metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Tiny => "tiny",
            ModelVariant::Base => "base",
            ModelVariant::Small => "small",
            ModelVariant::Medium => "medium",
            ModelVariant::LargeV3 => "large-v3",
        }
    }

    /// GGML weights filename for this variant.
    pub fn ggml_filename(&self) -> String {
        format!("ggml-{}.bin", self.as_str())
    }

    /// Full path of the weights file under `models_dir`.
    pub fn resolve(&self, models_dir: impl AsRef<Path>) -> PathBuf {
        models_dir.as_ref().join(self.ggml_filename())
    }

    /// Check whether the weights file is present under `models_dir`.
    pub fn is_cached(&self, models_dir: impl AsRef<Path>) -> bool {
        self.resolve(models_dir).exists()
    }
}

impl Default for ModelVariant {
    fn default() -> Self {
        ModelVariant::Base
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(ModelVariant::Tiny),
            "base" => Ok(ModelVariant::Base),
            "small" => Ok(ModelVariant::Small),
            "medium" => Ok(ModelVariant::Medium),
            "large-v3" => Ok(ModelVariant::LargeV3),
            other => anyhow::bail!(
                "unknown model variant '{other}' (expected tiny|base|small|medium|large-v3)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_round_trips_through_str() {
        for v in [
            ModelVariant::Tiny,
            ModelVariant::Base,
            ModelVariant::Small,
            ModelVariant::Medium,
            ModelVariant::LargeV3,
        ] {
            assert_eq!(v.as_str().parse::<ModelVariant>().unwrap(), v);
        }
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!("huge".parse::<ModelVariant>().is_err());
        assert!("".parse::<ModelVariant>().is_err());
    }

    #[test]
    fn ggml_filename_matches_convention() {
        assert_eq!(ModelVariant::Base.ggml_filename(), "ggml-base.bin");
        assert_eq!(ModelVariant::LargeV3.ggml_filename(), "ggml-large-v3.bin");
    }

    #[test]
    fn resolve_joins_models_dir() {
        let path = ModelVariant::Small.resolve("/opt/models");
        assert_eq!(path, PathBuf::from("/opt/models/ggml-small.bin"));
    }

    #[test]
    fn is_cached_reflects_file_presence() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ModelVariant::Tiny.is_cached(dir.path()));
        std::fs::write(dir.path().join("ggml-tiny.bin"), b"").unwrap();
        assert!(ModelVariant::Tiny.is_cached(dir.path()));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ModelVariant::LargeV3).unwrap();
        assert_eq!(json, r#""large-v3""#);
        let v: ModelVariant = serde_json::from_str(r#""base""#).unwrap();
        assert_eq!(v, ModelVariant::Base);
    }
}
