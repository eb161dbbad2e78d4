//! User configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "format": { "sample_rate": 44100, "bit_depth": 16, "float": false } }
//! ```
//!
//! Command-line flags override whatever the file says.

use anyhow::{Context, Result};
use pcmscope_core::{Endianness, PcmFormat, SpectrumConfig, ValidationOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up under `<config_dir>/pcmscope/`.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Format assumed when the command line does not name one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatDefaults {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub float: bool,
    pub endianness: Endianness,
}

impl Default for FormatDefaults {
    fn default() -> Self {
        let format = PcmFormat::default();
        Self {
            sample_rate: format.sample_rate,
            bit_depth: format.sample_format.bits(),
            float: format.sample_format.is_float(),
            endianness: format.endianness,
        }
    }
}

/// Image sizes for `render` and `spectrum --png`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Waveform image width in pixels
    pub width: u32,
    /// Waveform image height in pixels
    pub height: u32,
    /// Spectrum image width in pixels
    pub spectrum_width: u32,
    /// Spectrum image height in pixels
    pub spectrum_height: u32,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 400,
            spectrum_width: 800,
            spectrum_height: 300,
        }
    }
}

/// Format flags given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOverrides {
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u16>,
    pub float: bool,
    pub endianness: Option<String>,
}

/// Complete pcmscope configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcmscopeConfig {
    pub format: FormatDefaults,
    pub validation: ValidationOptions,
    pub spectrum: SpectrumConfig,
    pub render: RenderDefaults,
}

impl PcmscopeConfig {
    /// Parse a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .spectrum
            .validate()
            .with_context(|| format!("Invalid spectrum settings in {}", path.display()))?;
        Ok(config)
    }

    /// `<config_dir>/pcmscope/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pcmscope").join(CONFIG_FILE_NAME))
    }

    /// Loads `explicit` if given, else the default file if it exists, else defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(Path::new(path));
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading user config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Combines the configured format with command-line overrides.
    ///
    /// An explicit bit depth means integer samples unless `--float` is also
    /// given; `--float` alone means 32-bit float.
    pub fn resolve_format(&self, overrides: &FormatOverrides) -> Result<PcmFormat> {
        let sample_rate = overrides.sample_rate.unwrap_or(self.format.sample_rate);
        let (bit_depth, float) = match (overrides.bit_depth, overrides.float) {
            (Some(bits), float) => (bits, float),
            (None, true) => (32, true),
            (None, false) => (self.format.bit_depth, self.format.float),
        };
        let endianness = match overrides.endianness.as_deref() {
            Some(s) => s.parse::<Endianness>()?,
            None => self.format.endianness,
        };
        let format = PcmFormat::from_parts(sample_rate, bit_depth, float, endianness)
            .context("Invalid PCM format")?;
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcmscope_core::SampleFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_loader_defaults() {
        let config = PcmscopeConfig::default();
        let format = config.resolve_format(&FormatOverrides::default()).unwrap();
        assert_eq!(format, PcmFormat::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "format": { "sample_rate": 44100, "bit_depth": 16, "float": false },
                 "render": { "width": 640 } }"#,
        )
        .unwrap();

        let config = PcmscopeConfig::from_file(&path).unwrap();
        assert_eq!(config.format.sample_rate, 44100);
        assert_eq!(config.format.endianness, Endianness::Little);
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 400);
        assert_eq!(config.validation, ValidationOptions::default());

        let format = config.resolve_format(&FormatOverrides::default()).unwrap();
        assert_eq!(format.sample_format, SampleFormat::I16);
    }

    #[test]
    fn test_bad_spectrum_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "spectrum": { "fft_size": 1000 } }"#).unwrap();
        assert!(PcmscopeConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = PcmscopeConfig::load(Some("/nonexistent/pcmscope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let config = PcmscopeConfig::default();

        let format = config
            .resolve_format(&FormatOverrides {
                sample_rate: Some(8000),
                bit_depth: Some(24),
                float: false,
                endianness: Some("big".to_string()),
            })
            .unwrap();
        assert_eq!(format.sample_rate, 8000);
        assert_eq!(format.sample_format, SampleFormat::I24);
        assert_eq!(format.endianness, Endianness::Big);

        let mut int_config = PcmscopeConfig::default();
        int_config.format.bit_depth = 16;
        int_config.format.float = false;
        let format = int_config
            .resolve_format(&FormatOverrides {
                float: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(format.sample_format, SampleFormat::F32);
    }

    #[test]
    fn test_invalid_overrides() {
        let config = PcmscopeConfig::default();
        assert!(config
            .resolve_format(&FormatOverrides {
                bit_depth: Some(12),
                ..Default::default()
            })
            .is_err());
        assert!(config
            .resolve_format(&FormatOverrides {
                sample_rate: Some(0),
                ..Default::default()
            })
            .is_err());
        assert!(config
            .resolve_format(&FormatOverrides {
                endianness: Some("middle".to_string()),
                ..Default::default()
            })
            .is_err());
    }
}
