//! JSON output types for machine-readable CLI output.
//!
//! Every command accepts `--json` and prints one [`CommandOutput`] envelope
//! to stdout. Maps are `BTreeMap`s so key order is stable between runs.

use std::collections::BTreeMap;

use pcmscope_core::{AudioStats, PcmError, ValidationReport};
use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
/// Library failures pass through their own `PCM_xxx` codes instead.
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Declared format is not a valid PCM format
    pub const INVALID_FORMAT: &str = "CLI_002";
    /// Configuration file could not be loaded
    pub const CONFIG: &str = "CLI_003";
    /// Validation reported errors (or warnings under --strict)
    pub const VALIDATION_FAILED: &str = "CLI_004";
    /// Input directory not found or empty
    pub const NO_INPUT: &str = "CLI_005";
    /// File could not be written
    pub const FILE_WRITE: &str = "CLI_006";
    /// Invalid command-line argument value
    pub const INVALID_ARGUMENT: &str = "CLI_007";
    /// Audio device could not be opened
    pub const PLAYBACK: &str = "CLI_008";
}

/// Warning codes for CLI operations.
pub mod warning_codes {
    /// A file in a batch could not be loaded
    pub const SKIPPED_FILE: &str = "CLI_W001";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "PCM_004")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Suggestion for fixing the error (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            suggestion: None,
        }
    }

    /// Wraps a library error, keeping its code.
    pub fn from_pcm(err: &PcmError) -> Self {
        Self::new(err.code(), err.to_string())
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "CLI_W001", "pcm/size-mismatch")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonWarning {
    /// Creates a new warning with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this warning.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Envelope shared by every command's `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Non-fatal findings
    pub warnings: Vec<JsonWarning>,
    /// Command result (on success, and for failed checks that still ran)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Creates a successful output.
    pub fn success(result: T, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
        }
    }

    /// Creates a failed output with no result.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            warnings: Vec::new(),
            result: None,
        }
    }

    /// Creates a failed output that still carries a result.
    pub fn failed_with(result: T, errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            result: Some(result),
        }
    }

    /// Prints the envelope as pretty JSON.
    pub fn print(&self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Result of `inspect` for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectResult {
    /// Path to the input file
    pub input: String,
    /// Declared format, human readable
    pub format: String,
    /// File size in bytes
    pub byte_len: usize,
    /// Duration in seconds
    pub duration_secs: f64,
    /// BLAKE3 hash of the input file
    pub input_hash: String,
    /// Validation findings
    pub validation: ValidationReport,
    /// Signal statistics, keys sorted
    pub stats: BTreeMap<String, serde_json::Value>,
}

/// One entry of a batch `inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInspectItem {
    /// Path to the input file
    pub input: String,
    /// Whether the file loaded
    pub success: bool,
    /// Inspection result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<InspectResult>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// Summary of a batch `inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInspectSummary {
    /// Files found
    pub total: usize,
    /// Files that loaded
    pub succeeded: usize,
    /// Files that failed to load
    pub failed: usize,
    /// Loaded files with at least one warning
    pub with_warnings: usize,
}

/// Result of a batch `inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInspectResult {
    /// Directory that was scanned
    pub input_dir: String,
    /// Per-file results, sorted by path
    pub items: Vec<BatchInspectItem>,
    /// Totals
    pub summary: BatchInspectSummary,
}

/// Result of `validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResult {
    /// Path to the input file
    pub input: String,
    /// Declared format, human readable
    pub format: String,
    /// Whether warnings fail the check
    pub strict: bool,
    /// Validation findings
    pub report: ValidationReport,
}

/// A spectral peak.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumPeak {
    /// Centre frequency of the bin in Hz
    pub frequency_hz: f64,
    /// Magnitude in dB
    pub magnitude_db: f64,
}

/// Result of `spectrum`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumResult {
    /// Path to the input file
    pub input: String,
    /// Sample index the analysis frame is centred on
    pub sample_index: usize,
    /// Time of that sample in seconds
    pub time_secs: f64,
    /// FFT size used
    pub fft_size: usize,
    /// Width of one bin in Hz
    pub bin_hz: f64,
    /// Strongest non-DC frequency, 0 for silence
    pub dominant_frequency_hz: f64,
    /// Strongest peaks, loudest first
    pub peaks: Vec<SpectrumPeak>,
    /// Rendered image (if requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
}

/// Result of `render`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// Path to the input file
    pub input: String,
    /// Waveform image path
    pub output: String,
    /// Spectrum image path (if requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum_output: Option<String>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Zoom level applied
    pub zoom: f64,
    /// First visible time in seconds
    pub view_start_secs: f64,
    /// Last visible time in seconds
    pub view_end_secs: f64,
    /// BLAKE3 hash of the waveform PNG
    pub output_hash: String,
}

/// Result of `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Path to the input file
    pub input: String,
    /// Written file
    pub output: String,
    /// Encoding of the written file
    pub encoding: String,
    /// Range start in seconds
    pub start_secs: f64,
    /// Range end in seconds
    pub end_secs: f64,
    /// Bytes written
    pub byte_len: usize,
    /// BLAKE3 hash of the written bytes
    pub output_hash: String,
}

/// Result of `play`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayResult {
    /// Path to the input file
    pub input: String,
    /// Output device name
    pub device: String,
    /// Where playback started, in seconds
    pub start_secs: f64,
    /// Seconds of audio played
    pub played_secs: f64,
}

/// Rounds to a fixed number of decimals for stable output.
pub(crate) fn round_f64(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// Flattens statistics into a sorted map with rounded values.
pub fn stats_to_btree(stats: &AudioStats) -> BTreeMap<String, serde_json::Value> {
    let rounded = |value: f64, decimals: i32| serde_json::json!(round_f64(value, decimals));
    let mut map = BTreeMap::new();
    map.insert("clipped_samples".to_string(), serde_json::json!(stats.clipped_samples));
    map.insert("crest_factor".to_string(), rounded(stats.crest_factor, 4));
    map.insert("dc_offset".to_string(), rounded(stats.dc_offset, 6));
    map.insert("peak_db".to_string(), rounded(stats.peak_db, 2));
    map.insert("peak_level".to_string(), rounded(stats.peak_level, 6));
    map.insert("rms_db".to_string(), rounded(stats.rms_db, 2));
    map.insert("rms_level".to_string(), rounded(stats.rms_level, 6));
    map.insert("sample_count".to_string(), serde_json::json!(stats.sample_count));
    map.insert("silence_ratio".to_string(), rounded(stats.silence_ratio, 4));
    map.insert("zero_crossing_rate".to_string(), rounded(stats.zero_crossing_rate, 2));
    map.insert("zero_crossings".to_string(), serde_json::json!(stats.zero_crossings));
    map
}

/// Warnings of a validation report in envelope form.
pub fn validation_warnings(report: &ValidationReport, file: &str) -> Vec<JsonWarning> {
    report
        .warnings
        .iter()
        .map(|issue| JsonWarning::new(issue.code.clone(), issue.message.clone()).with_file(file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcmscope_core::analyze;

    #[test]
    fn test_error_builder() {
        let err = JsonError::new(error_codes::FILE_READ, "nope")
            .with_file("a.pcm")
            .with_suggestion("check the path");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CLI_001");
        assert_eq!(json["file"], "a.pcm");
        assert_eq!(json["suggestion"], "check the path");
    }

    #[test]
    fn test_from_pcm_keeps_code() {
        let err = JsonError::from_pcm(&PcmError::EmptyData);
        assert_eq!(err.code, "PCM_004");
        assert!(err.file.is_none());
    }

    #[test]
    fn test_failure_omits_result() {
        let output: CommandOutput<ExportResult> =
            CommandOutput::failure(vec![JsonError::new(error_codes::NO_INPUT, "empty")]);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("result").is_none());
        assert_eq!(json["errors"][0]["code"], "CLI_005");
    }

    #[test]
    fn test_stats_keys_sorted() {
        let stats = analyze(&[0.5, -0.5, 0.25], 48000);
        let map = stats_to_btree(&stats);
        let keys: Vec<&String> = map.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(map["peak_level"], serde_json::json!(0.5));
        assert_eq!(map["peak_db"], serde_json::json!(-6.02));
    }

    #[test]
    fn test_round_f64() {
        assert_eq!(round_f64(1.23456, 2), 1.23);
        assert_eq!(round_f64(-0.0049, 2), -0.0);
    }
}
