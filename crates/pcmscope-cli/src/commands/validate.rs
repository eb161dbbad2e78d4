//! Validate command implementation
//!
//! Checks a raw PCM file against its declared format without decoding the
//! whole file.

use anyhow::{Context, Result};
use colored::Colorize;
use pcmscope_core::{validate, PcmFormat, ValidationOptions, ValidationReport};
use std::fs;
use std::process::ExitCode;

use super::json_output::{
    error_codes, validation_warnings, CommandOutput, JsonError, ValidateResult,
};
use super::reporting::print_validation;

/// Run the validate command
///
/// # Arguments
/// * `input` - Path to the raw PCM file
/// * `format` - Declared format
/// * `options` - Validation settings
/// * `strict` - Whether warnings fail the check
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if passed, 1 if errors (or warnings in strict mode)
pub fn run(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    strict: bool,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        run_json(input, format, options, strict)
    } else {
        run_human(input, format, options, strict)
    }
}

/// Whether a report passes, honouring strict mode.
pub fn passes(report: &ValidationReport, strict: bool) -> bool {
    report.ok && (!strict || !report.has_warnings())
}

fn run_human(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    strict: bool,
) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), input);
    println!("{} {}", "Format:".dimmed(), format);

    let data = fs::read(input).with_context(|| format!("Failed to read file: {}", input))?;
    let report = validate(&data, format, options);

    print_validation(&report);

    let summary = format!(
        "{} error(s), {} warning(s), {} info",
        report.summary.error_count, report.summary.warning_count, report.summary.info_count
    );
    if passes(&report, strict) {
        println!("\n{} {}", "PASSED".green().bold(), summary.dimmed());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n{} {}", "FAILED".red().bold(), summary.dimmed());
        Ok(ExitCode::from(1))
    }
}

fn run_json(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    strict: bool,
) -> Result<ExitCode> {
    let data = match fs::read(input) {
        Ok(d) => d,
        Err(e) => {
            return super::print_json_failure(
                JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
                    .with_file(input),
            );
        }
    };

    let report = validate(&data, format, options);
    let warnings = validation_warnings(&report, input);
    let passed = passes(&report, strict);

    let mut errors: Vec<JsonError> = report
        .errors
        .iter()
        .map(|issue| {
            JsonError::new(issue.code.clone(), issue.message.clone())
                .with_file(input)
                .with_suggestion(issue.suggestion.clone())
        })
        .collect();
    if !passed && errors.is_empty() {
        errors.push(
            JsonError::new(
                error_codes::VALIDATION_FAILED,
                "Warnings are treated as errors in strict mode",
            )
            .with_file(input),
        );
    }

    let result = ValidateResult {
        input: input.to_string(),
        format: format.to_string(),
        strict,
        report,
    };
    let output = if passed {
        CommandOutput::success(result, warnings)
    } else {
        CommandOutput::failed_with(result, errors, warnings)
    };
    output.print()?;

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcmscope_core::{encode, Endianness};

    fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> String {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_clean_file_passes_strict() {
        let dir = tempfile::tempdir().unwrap();
        let format = PcmFormat::from_parts(44100, 16, false, Endianness::Little).unwrap();
        let samples: Vec<f32> = (0..441).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let input = write(&dir, "clean.pcm", &encode(&samples, &format));

        let code = run(&input, &format, &ValidationOptions::default(), true, false).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_warnings_fail_only_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let format = PcmFormat::from_parts(44100, 16, false, Endianness::Little).unwrap();
        // Odd byte count: size mismatch warning
        let input = write(&dir, "odd.pcm", &[0, 0, 0]);

        let lenient = run(&input, &format, &ValidationOptions::default(), false, true).unwrap();
        assert_eq!(lenient, ExitCode::SUCCESS);
        let strict = run(&input, &format, &ValidationOptions::default(), true, true).unwrap();
        assert_eq!(strict, ExitCode::from(1));
    }

    #[test]
    fn test_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = write(&dir, "empty.pcm", &[]);
        let code = run(
            &input,
            &PcmFormat::default(),
            &ValidationOptions::default(),
            false,
            false,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_missing_file() {
        let format = PcmFormat::default();
        let options = ValidationOptions::default();
        assert!(run("/nonexistent.pcm", &format, &options, false, false).is_err());
        let code = run("/nonexistent.pcm", &format, &options, false, true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }

    #[test]
    fn test_passes() {
        let format = PcmFormat::default();
        let report = validate(&[0, 0, 0, 0, 0], &format, &ValidationOptions::default());
        assert!(passes(&report, false));
        assert!(!passes(&report, true));
    }
}
