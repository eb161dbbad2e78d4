//! Validation of realistic mis-declared captures.
//!
//! Each test encodes a known signal in one format and declares it as another,
//! the way users mis-set the loader, and checks which issues come back.

use pcmscope_core::validate::codes;
use pcmscope_core::{
    encode, validate, Endianness, PcmFormat, Severity, ValidationOptions, ValidationReport,
};
use pretty_assertions::assert_eq;

fn sine(n: usize, freq: f32, sample_rate: f32, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * amp)
        .collect()
}

fn format(rate: u32, bits: u16, float: bool, endianness: Endianness) -> PcmFormat {
    PcmFormat::from_parts(rate, bits, float, endianness).unwrap()
}

fn codes_of(report: &ValidationReport) -> Vec<String> {
    let mut codes: Vec<String> = report.issues().map(|i| i.code.clone()).collect();
    codes.sort();
    codes
}

// ============================================================================
// Correct declarations
// ============================================================================

#[test]
fn test_every_format_validates_clean() {
    let samples = sine(4800, 440.0, 48000.0, 0.7);
    for (bits, float) in [(8, false), (16, false), (24, false), (32, false), (32, true)] {
        for endianness in [Endianness::Little, Endianness::Big] {
            let fmt = format(48000, bits, float, endianness);
            let bytes = encode(&samples, &fmt);
            let report = validate(&bytes, &fmt, &ValidationOptions::default());
            assert!(
                report.total_issues() == 0,
                "{} should validate clean, got {:?}",
                fmt,
                codes_of(&report)
            );
        }
    }
}

// ============================================================================
// Mis-declarations
// ============================================================================

#[test]
fn test_16bit_declared_as_24bit() {
    let real = format(48000, 16, false, Endianness::Little);
    let bytes = encode(&sine(4801, 440.0, 48000.0, 0.7), &real);
    let declared = format(48000, 24, false, Endianness::Little);
    let report = validate(&bytes, &declared, &ValidationOptions::default());
    assert!(report.ok);
    assert!(report.has_code(codes::SIZE_MISMATCH));
}

#[test]
fn test_big_endian_24bit_declared_little() {
    let real = format(44100, 24, false, Endianness::Big);
    let bytes = encode(&sine(3000, 300.0, 44100.0, 0.5), &real);
    let declared = format(44100, 24, false, Endianness::Little);
    let report = validate(&bytes, &declared, &ValidationOptions::default());
    assert_eq!(codes_of(&report), vec![codes::ENDIANNESS_SUSPECT.to_string()]);
    let issue = &report.warnings[0];
    assert_eq!(issue.severity, Severity::Warning);
    assert!(issue.suggestion.contains("big"));
}

#[test]
fn test_float_declared_as_32bit_int() {
    let real = format(48000, 32, true, Endianness::Little);
    let bytes = encode(&sine(2000, 1000.0, 48000.0, 0.5), &real);
    let declared = format(48000, 32, false, Endianness::Little);
    let report = validate(&bytes, &declared, &ValidationOptions::default());
    assert!(report.has_code(codes::FLOAT_AS_INT));
}

#[test]
fn test_custom_window_size() {
    let fmt = format(48000, 16, false, Endianness::Little);
    let mut bytes = encode(&vec![0.25; 20], &fmt);
    bytes.extend_from_slice(&i16::MIN.to_le_bytes());

    let narrow = ValidationOptions {
        samples_to_check: 10,
        ..Default::default()
    };
    assert!(!validate(&bytes, &fmt, &narrow).has_code(codes::OUT_OF_RANGE));
    assert!(validate(&bytes, &fmt, &ValidationOptions::default()).has_code(codes::OUT_OF_RANGE));
}

// ============================================================================
// Report shape
// ============================================================================

#[test]
fn test_report_serializes_in_lint_shape() {
    let fmt = format(22000, 16, false, Endianness::Little);
    let bytes = vec![0u8; 3];
    let report = validate(&bytes, &fmt, &ValidationOptions::default());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["ok"], serde_json::json!(true));
    assert_eq!(json["summary"]["warning_count"], serde_json::json!(1));
    assert_eq!(json["summary"]["info_count"], serde_json::json!(1));
    assert_eq!(json["warnings"][0]["code"], serde_json::json!("pcm/size-mismatch"));
    assert_eq!(json["warnings"][0]["severity"], serde_json::json!("warning"));
    assert_eq!(json["info"][0]["code"], serde_json::json!("pcm/nonstandard-sample-rate"));
    assert!(json["warnings"][0].get("samples").is_none());
}

#[test]
fn test_messages_list_errors_then_warnings() {
    let fmt = format(48000, 16, false, Endianness::Little);
    let report = validate(&[], &fmt, &ValidationOptions::default());
    assert_eq!(report.messages(), vec!["PCM data is empty".to_string()]);
}
