//! Heuristic validation of raw PCM against its declared format.
//!
//! Raw PCM has no header, so a wrong sample rate, bit depth or byte order is
//! never detectable with certainty. The checks below look for the symptoms a
//! mis-declaration usually produces and collect them as issues; validation
//! itself never fails.

use serde::{Deserialize, Serialize};

use crate::decode::{raw_samples, RawSample};
use crate::format::{PcmFormat, SampleFormat, STANDARD_SAMPLE_RATES};

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth knowing, probably fine.
    Info,
    /// Likely a mis-declared parameter.
    Warning,
    /// The data cannot be interpreted at all.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Stable identifiers for every check.
pub mod codes {
    /// Zero-length buffer.
    pub const EMPTY: &str = "pcm/empty";
    /// Buffer shorter than one sample.
    pub const TOO_SHORT: &str = "pcm/too-short";
    /// Byte length is not a whole number of frames.
    pub const SIZE_MISMATCH: &str = "pcm/size-mismatch";
    /// Sample codes outside the representable range.
    pub const OUT_OF_RANGE: &str = "pcm/out-of-range";
    /// Data is much smoother with the opposite byte order.
    pub const ENDIANNESS_SUSPECT: &str = "pcm/endianness-suspect";
    /// 32-bit integer data that looks like float bit patterns.
    pub const FLOAT_AS_INT: &str = "pcm/float-as-int";
    /// Float data that looks like integer PCM.
    pub const INT_AS_FLOAT: &str = "pcm/int-as-float";
    /// Sample rate outside the usual set.
    pub const NONSTANDARD_SAMPLE_RATE: &str = "pcm/nonstandard-sample-rate";
}

/// A sample flagged by the range check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSample {
    /// Sample index.
    pub index: usize,
    /// Raw value as stored.
    pub value: RawSample,
    /// Byte offset of the sample.
    pub byte_offset: usize,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Check identifier (see [`codes`]).
    pub code: String,

    /// Severity level.
    pub severity: Severity,

    /// Human-readable description, possibly multi-line.
    pub message: String,

    /// Measured value that triggered the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,

    /// Expected or acceptable range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<String>,

    /// Byte offset the issue refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<usize>,

    /// Offending samples, for range checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<FlaggedSample>,

    /// How to fix the declaration.
    pub suggestion: String,
}

impl ValidationIssue {
    /// Creates a new issue with required fields.
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            actual_value: None,
            expected_range: None,
            byte_offset: None,
            samples: Vec::new(),
            suggestion: suggestion.into(),
        }
    }

    /// Builder method to set actual value.
    pub fn with_actual_value(mut self, value: impl Into<String>) -> Self {
        self.actual_value = Some(value.into());
        self
    }

    /// Builder method to set expected range.
    pub fn with_expected_range(mut self, range: impl Into<String>) -> Self {
        self.expected_range = Some(range.into());
        self
    }

    /// Builder method to set byte offset.
    pub fn with_byte_offset(mut self, offset: usize) -> Self {
        self.byte_offset = Some(offset);
        self
    }

    /// Builder method to attach flagged samples.
    pub fn with_samples(mut self, samples: Vec<FlaggedSample>) -> Self {
        self.samples = samples;
        self
    }
}

/// Summary counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Number of error-level issues.
    pub error_count: usize,
    /// Number of warning-level issues.
    pub warning_count: usize,
    /// Number of info-level issues.
    pub info_count: usize,
}

/// All issues found for one buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True if no errors were found.
    pub ok: bool,
    /// Error-level issues.
    pub errors: Vec<ValidationIssue>,
    /// Warning-level issues.
    pub warnings: Vec<ValidationIssue>,
    /// Info-level issues.
    pub info: Vec<ValidationIssue>,
    /// Summary statistics.
    pub summary: ValidationSummary,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            summary: ValidationSummary::default(),
        }
    }

    /// Adds an issue to the report and updates the summary.
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Info => {
                self.summary.info_count += 1;
                self.info.push(issue);
            }
            Severity::Warning => {
                self.summary.warning_count += 1;
                self.warnings.push(issue);
            }
            Severity::Error => {
                self.summary.error_count += 1;
                self.ok = false;
                self.errors.push(issue);
            }
        }
    }

    /// Total number of issues.
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// Whether any warning or error was found.
    pub fn has_warnings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    /// Iterates over all issues, most severe first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Whether an issue with the given code was reported.
    pub fn has_code(&self, code: &str) -> bool {
        self.issues().any(|i| i.code == code)
    }

    /// Error and warning messages, the way a user-facing alert lists them.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(|i| i.message.clone())
            .collect()
    }
}

/// Tuning knobs for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// How many samples from the start of the buffer are inspected.
    pub samples_to_check: usize,
    /// How many flagged samples are listed in a range issue.
    pub max_reported_samples: usize,
    /// Float magnitude above which a value is considered garbage.
    pub float_magnitude_limit: f32,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            samples_to_check: 1000,
            max_reported_samples: 5,
            float_magnitude_limit: 16.0,
        }
    }
}

/// Ratio by which the declared byte order must be rougher than the swapped one.
const ENDIANNESS_ROUGHNESS_RATIO: f64 = 4.0;

/// Mean absolute first difference below which a window counts as silent.
const ROUGHNESS_FLOOR: f64 = 1e-6;

/// Share of non-zero samples needed to call 32-bit int data "float-like".
const FLOAT_PATTERN_SHARE: f64 = 0.8;

/// Share of non-zero samples needed to call float data "int-like".
const INT_PATTERN_SHARE: f64 = 0.5;

/// Smallest magnitude (2^-24) expected from float audio; anything quieter
/// is below the resolution of a 24-bit converter.
const MIN_AUDIO_FLOAT: f32 = 5.960_464_5e-8;

/// Validates a buffer against its declared format.
pub fn validate(bytes: &[u8], format: &PcmFormat, options: &ValidationOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let bytes_per_sample = format.bytes_per_sample();

    if bytes.is_empty() {
        report.add_issue(ValidationIssue::new(
            codes::EMPTY,
            Severity::Error,
            "PCM data is empty",
            "Select a non-empty raw PCM file",
        ));
        return report;
    }

    if bytes.len() < bytes_per_sample {
        report.add_issue(
            ValidationIssue::new(
                codes::TOO_SHORT,
                Severity::Error,
                format!(
                    "Cannot read {}-bit data at byte 0: only {} bytes available",
                    format.sample_format.bits(),
                    bytes.len()
                ),
                "Check the bit depth setting or the file contents",
            )
            .with_byte_offset(0)
            .with_actual_value(bytes.len().to_string())
            .with_expected_range(format!(">= {} bytes", bytes_per_sample)),
        );
        return report;
    }

    check_size(bytes, format, &mut report);

    let window: Vec<RawSample> = raw_samples(bytes, format)
        .take(options.samples_to_check)
        .collect();

    check_range(&window, format, options, &mut report);

    match format.sample_format {
        SampleFormat::I8 => {}
        SampleFormat::F32 => check_int_as_float(&window, options, &mut report),
        SampleFormat::I32 => {
            check_endianness(bytes, format, window.len(), &mut report);
            check_float_as_int(&window, &mut report);
        }
        SampleFormat::I16 | SampleFormat::I24 => {
            check_endianness(bytes, format, window.len(), &mut report)
        }
    }

    check_sample_rate(format, &mut report);

    report
}

fn check_size(bytes: &[u8], format: &PcmFormat, report: &mut ValidationReport) {
    let block_align = format.block_align();
    if bytes.len() % block_align == 0 {
        return;
    }

    let remainder = bytes.len() % block_align;
    report.add_issue(
        ValidationIssue::new(
            codes::SIZE_MISMATCH,
            Severity::Warning,
            format!(
                "File size does not match the declared format:\n\
                 - file size: {} bytes\n\
                 - sample rate: {} Hz\n\
                 - channels: {}\n\
                 - bit depth: {} bit\n\
                 - expected bytes per second: {}\n\
                 - estimated duration: {:.3} s",
                bytes.len(),
                format.sample_rate,
                format.channels,
                format.sample_format.bits(),
                format.bytes_per_second(),
                format.duration_secs(bytes.len()),
            ),
            "File size does not match the audio parameters; check the sample rate and bit depth settings",
        )
        .with_actual_value(format!("{} trailing bytes", remainder))
        .with_expected_range(format!("multiple of {} bytes", block_align))
        .with_byte_offset(bytes.len() - remainder),
    );
}

fn is_out_of_range(raw: RawSample, max: i64, float_limit: f32) -> bool {
    match raw {
        RawSample::Int(v) => v.abs() > max,
        RawSample::Float(v) => !v.is_finite() || v.abs() > float_limit,
    }
}

fn check_range(
    window: &[RawSample],
    format: &PcmFormat,
    options: &ValidationOptions,
    report: &mut ValidationReport,
) {
    let max = format.sample_format.max_int_value();
    let bytes_per_sample = format.bytes_per_sample();

    let flagged: Vec<FlaggedSample> = window
        .iter()
        .enumerate()
        .filter(|(_, &raw)| is_out_of_range(raw, max, options.float_magnitude_limit))
        .map(|(index, &value)| FlaggedSample {
            index,
            value,
            byte_offset: index * bytes_per_sample,
        })
        .collect();

    if flagged.is_empty() {
        return;
    }

    let valid_range = if format.sample_format.is_float() {
        format!(
            "finite, -{} to {}",
            options.float_magnitude_limit, options.float_magnitude_limit
        )
    } else {
        format!("{} to {}", -max, max)
    };

    let details = flagged
        .iter()
        .take(options.max_reported_samples)
        .map(|s| {
            format!(
                "  sample #{}: value={}, offset={} bytes",
                s.index, s.value, s.byte_offset
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let count = flagged.len();
    let first_offset = flagged[0].byte_offset;
    let mut reported = flagged;
    reported.truncate(options.max_reported_samples);

    report.add_issue(
        ValidationIssue::new(
            codes::OUT_OF_RANGE,
            Severity::Warning,
            format!(
                "Abnormal sample values detected:\n\
                 - bit depth: {} bit\n\
                 - valid range: {}\n\
                 - {} out-of-range samples in the first {}\n\
                 - first {} abnormal samples:\n{}",
                format.sample_format.bits(),
                valid_range,
                count,
                window.len(),
                reported.len(),
                details
            ),
            "Possible causes: the file is not raw PCM, the bit depth is wrong, or the byte order does not match",
        )
        .with_actual_value(count.to_string())
        .with_expected_range(valid_range)
        .with_byte_offset(first_offset)
        .with_samples(reported),
    );
}

/// Mean absolute difference between consecutive normalized samples.
fn roughness(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let total: f64 = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    total / (samples.len() - 1) as f64
}

fn normalized_window(bytes: &[u8], format: &PcmFormat, count: usize) -> Vec<f64> {
    let scale = format.sample_format.full_scale();
    raw_samples(bytes, format)
        .take(count)
        .map(|raw| match raw {
            RawSample::Int(v) => v as f64 / scale,
            RawSample::Float(v) => v as f64,
        })
        .collect()
}

fn check_endianness(bytes: &[u8], format: &PcmFormat, count: usize, report: &mut ValidationReport) {
    if count < 16 {
        return;
    }

    let declared = roughness(&normalized_window(bytes, format, count));
    let swapped_format = PcmFormat {
        endianness: format.endianness.swapped(),
        ..*format
    };
    let swapped = roughness(&normalized_window(bytes, &swapped_format, count));

    if declared < ROUGHNESS_FLOOR || swapped < ROUGHNESS_FLOOR {
        return;
    }

    if declared >= swapped * ENDIANNESS_ROUGHNESS_RATIO {
        report.add_issue(
            ValidationIssue::new(
                codes::ENDIANNESS_SUSPECT,
                Severity::Warning,
                format!(
                    "Signal is {:.1}x smoother when read as {}-endian; the declared {}-endian byte order is probably wrong",
                    declared / swapped,
                    swapped_format.endianness,
                    format.endianness
                ),
                format!("Try endianness '{}'", swapped_format.endianness),
            )
            .with_actual_value(format!("{:.6}", declared))
            .with_expected_range(format!("< {:.6}", swapped * ENDIANNESS_ROUGHNESS_RATIO)),
        );
    }
}

/// Whether a 32-bit pattern is a normal float in the range audio usually occupies.
fn looks_like_audio_float(bits: u32) -> bool {
    let value = f32::from_bits(bits);
    value.is_normal() && {
        let magnitude = value.abs();
        (MIN_AUDIO_FLOAT..=16.0).contains(&magnitude)
    }
}

fn check_float_as_int(window: &[RawSample], report: &mut ValidationReport) {
    let nonzero: Vec<u32> = window
        .iter()
        .filter_map(|raw| match raw {
            RawSample::Int(v) if *v != 0 => Some(*v as i32 as u32),
            _ => None,
        })
        .collect();

    if nonzero.len() < 8 {
        return;
    }

    let matching = nonzero.iter().filter(|&&b| looks_like_audio_float(b)).count();
    let share = matching as f64 / nonzero.len() as f64;

    if share >= FLOAT_PATTERN_SHARE {
        report.add_issue(
            ValidationIssue::new(
                codes::FLOAT_AS_INT,
                Severity::Warning,
                format!(
                    "{:.0}% of the checked 32-bit integer samples have the bit pattern of audio-range floats",
                    share * 100.0
                ),
                "The data is probably 32-bit float; enable float samples",
            )
            .with_actual_value(format!("{:.3}", share))
            .with_expected_range(format!("< {}", FLOAT_PATTERN_SHARE)),
        );
    }
}

fn check_int_as_float(
    window: &[RawSample],
    options: &ValidationOptions,
    report: &mut ValidationReport,
) {
    let nonzero: Vec<f32> = window
        .iter()
        .filter_map(|raw| match raw {
            RawSample::Float(v) if *v != 0.0 => Some(*v),
            _ => None,
        })
        .collect();

    if nonzero.len() < 8 {
        return;
    }

    let suspicious = nonzero
        .iter()
        .filter(|v| {
            !v.is_finite()
                || v.abs() < MIN_AUDIO_FLOAT
                || v.abs() > options.float_magnitude_limit
        })
        .count();
    let share = suspicious as f64 / nonzero.len() as f64;

    if share >= INT_PATTERN_SHARE {
        report.add_issue(
            ValidationIssue::new(
                codes::INT_AS_FLOAT,
                Severity::Warning,
                format!(
                    "{:.0}% of the checked float samples are non-finite, implausibly small or large",
                    share * 100.0
                ),
                "The data is probably integer PCM; disable float samples and pick the bit depth",
            )
            .with_actual_value(format!("{:.3}", share))
            .with_expected_range(format!("< {}", INT_PATTERN_SHARE)),
        );
    }
}

fn check_sample_rate(format: &PcmFormat, report: &mut ValidationReport) {
    if format.has_standard_rate() {
        return;
    }

    let nearest = STANDARD_SAMPLE_RATES
        .iter()
        .copied()
        .min_by_key(|&r| (r as i64 - format.sample_rate as i64).abs())
        .unwrap_or(48000);

    report.add_issue(
        ValidationIssue::new(
            codes::NONSTANDARD_SAMPLE_RATE,
            Severity::Info,
            format!("Sample rate {} Hz is not a common capture rate", format.sample_rate),
            format!("Did you mean {} Hz?", nearest),
        )
        .with_actual_value(format.sample_rate.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode;
    use crate::format::Endianness;

    fn sine(n: usize, freq: f32, sample_rate: f32, amp: f32) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * amp)
            .collect()
    }

    fn format(bits: u16, float: bool, endianness: Endianness) -> PcmFormat {
        PcmFormat::from_parts(48000, bits, float, endianness).unwrap()
    }

    #[test]
    fn test_clean_i16_passes() {
        let fmt = format(16, false, Endianness::Little);
        let bytes = encode(&sine(4800, 440.0, 48000.0, 0.5), &fmt);
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert!(report.ok);
        assert_eq!(report.total_issues(), 0, "{:?}", report.messages());
    }

    #[test]
    fn test_empty_is_error() {
        let fmt = format(16, false, Endianness::Little);
        let report = validate(&[], &fmt, &ValidationOptions::default());
        assert!(!report.ok);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, codes::EMPTY);
        assert_eq!(report.total_issues(), 1);
    }

    #[test]
    fn test_too_short_is_error() {
        let fmt = format(32, true, Endianness::Little);
        let report = validate(&[1, 2, 3], &fmt, &ValidationOptions::default());
        assert!(!report.ok);
        assert!(report.has_code(codes::TOO_SHORT));
        assert_eq!(report.errors[0].byte_offset, Some(0));
    }

    #[test]
    fn test_size_mismatch_warns() {
        let fmt = format(16, false, Endianness::Little);
        let mut bytes = encode(&sine(480, 440.0, 48000.0, 0.5), &fmt);
        bytes.push(0);
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert!(report.ok);
        let issue = &report.warnings[0];
        assert_eq!(issue.code, codes::SIZE_MISMATCH);
        assert!(issue.message.contains("961 bytes"));
        assert!(issue.message.contains("96000"));
        assert!(issue.message.contains("0.010 s"));
        assert_eq!(issue.byte_offset, Some(960));
    }

    #[test]
    fn test_most_negative_code_flagged() {
        let fmt = format(16, false, Endianness::Little);
        let mut bytes = Vec::new();
        for i in 0..20 {
            let v: i16 = if i % 4 == 0 { i16::MIN } else { 100 };
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        let issue = report
            .warnings
            .iter()
            .find(|i| i.code == codes::OUT_OF_RANGE)
            .expect("range issue");
        assert_eq!(issue.actual_value.as_deref(), Some("5"));
        assert_eq!(issue.samples.len(), 5);
        assert_eq!(issue.samples[1].index, 4);
        assert_eq!(issue.samples[1].byte_offset, 8);
        assert_eq!(issue.samples[1].value, RawSample::Int(-32768));
        assert!(issue.message.contains("-32767 to 32767"));
    }

    #[test]
    fn test_range_check_limited_to_window() {
        let fmt = format(16, false, Endianness::Little);
        let mut bytes = encode(&vec![0.1; 1000], &fmt);
        bytes.extend_from_slice(&i16::MIN.to_le_bytes());
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert!(!report.has_code(codes::OUT_OF_RANGE));
    }

    #[test]
    fn test_max_reported_samples_respected() {
        let fmt = format(8, false, Endianness::Little);
        let bytes = vec![0x80u8; 50];
        let options = ValidationOptions {
            max_reported_samples: 2,
            ..Default::default()
        };
        let report = validate(&bytes, &fmt, &options);
        let issue = &report.warnings[0];
        assert_eq!(issue.samples.len(), 2);
        assert_eq!(issue.actual_value.as_deref(), Some("50"));
    }

    #[test]
    fn test_wrong_endianness_detected() {
        let big = format(16, false, Endianness::Big);
        let bytes = encode(&sine(2000, 220.0, 48000.0, 0.6), &big);
        let declared = format(16, false, Endianness::Little);
        let report = validate(&bytes, &declared, &ValidationOptions::default());
        assert!(report.has_code(codes::ENDIANNESS_SUSPECT));

        let report = validate(&bytes, &big, &ValidationOptions::default());
        assert!(!report.has_code(codes::ENDIANNESS_SUSPECT));
    }

    #[test]
    fn test_silence_skips_endianness() {
        let fmt = format(16, false, Endianness::Little);
        let bytes = vec![0u8; 2000];
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert_eq!(report.total_issues(), 0);
    }

    #[test]
    fn test_float_data_declared_as_int() {
        let float_fmt = format(32, true, Endianness::Little);
        let bytes = encode(&sine(1000, 440.0, 48000.0, 0.5), &float_fmt);
        let int_fmt = format(32, false, Endianness::Little);
        let report = validate(&bytes, &int_fmt, &ValidationOptions::default());
        assert!(report.has_code(codes::FLOAT_AS_INT));
    }

    #[test]
    fn test_int_data_declared_as_float() {
        let int_fmt = format(16, false, Endianness::Little);
        let bytes = encode(&sine(2000, 440.0, 48000.0, 0.003), &int_fmt);
        let float_fmt = format(32, true, Endianness::Little);
        let report = validate(&bytes, &float_fmt, &ValidationOptions::default());
        assert!(report.has_code(codes::INT_AS_FLOAT));
    }

    #[test]
    fn test_loud_int16_declared_as_float() {
        let int_fmt = format(16, false, Endianness::Little);
        let bytes = encode(&sine(48000, 440.0, 48000.0, 0.7), &int_fmt);
        let report = validate(&bytes, &PcmFormat::default(), &ValidationOptions::default());
        let issue = report
            .warnings
            .iter()
            .find(|i| i.code == codes::INT_AS_FLOAT)
            .expect("int-as-float issue");
        assert!(issue.suggestion.contains("integer PCM"));
    }

    #[test]
    fn test_quiet_float_audio_not_int_like() {
        let fmt = format(32, true, Endianness::Little);
        let bytes = encode(&sine(2000, 440.0, 48000.0, 0.01), &fmt);
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert!(!report.has_code(codes::INT_AS_FLOAT));
    }

    #[test]
    fn test_float_non_finite_out_of_range() {
        let fmt = format(32, true, Endianness::Little);
        let mut samples = sine(100, 440.0, 48000.0, 0.5);
        samples[10] = f32::INFINITY;
        samples[20] = 1.0e9;
        let bytes = encode(&samples, &fmt);
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        let issue = report
            .warnings
            .iter()
            .find(|i| i.code == codes::OUT_OF_RANGE)
            .expect("range issue");
        assert_eq!(issue.samples.len(), 2);
        assert_eq!(issue.samples[0].index, 10);
        assert_eq!(issue.samples[0].byte_offset, 40);
    }

    #[test]
    fn test_nonstandard_rate_is_info() {
        let fmt = PcmFormat::from_parts(44000, 16, false, Endianness::Little).unwrap();
        let bytes = encode(&sine(100, 440.0, 44000.0, 0.5), &fmt);
        let report = validate(&bytes, &fmt, &ValidationOptions::default());
        assert!(report.ok);
        assert_eq!(report.info.len(), 1);
        assert_eq!(report.info[0].code, codes::NONSTANDARD_SAMPLE_RATE);
        assert!(report.info[0].suggestion.contains("44100"));
        assert!(!report.has_warnings());
    }
}
