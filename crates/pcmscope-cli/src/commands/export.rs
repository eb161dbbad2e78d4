//! Export command implementation
//!
//! Writes a time range of a clip as raw float, in the source encoding, or
//! as a WAV file.

use anyhow::Result;
use colored::Colorize;
use pcmscope_core::{
    export_range, write_export, ExportEncoding, PcmFormat, SelectionRange, ValidationOptions,
};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, round_f64, CommandOutput, ExportResult, JsonError};
use super::{load_clip, load_clip_json};

/// Run the export command
///
/// # Arguments
/// * `input` - Path to the raw PCM file
/// * `format` - Declared format
/// * `options` - Validation settings
/// * `range` - Time range to write, in seconds
/// * `encoding` - Output encoding
/// * `output` - Output path (default depends on the encoding)
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    range: &SelectionRange,
    encoding: ExportEncoding,
    output: Option<&str>,
    json_output: bool,
) -> Result<ExitCode> {
    let output = output.unwrap_or_else(|| encoding.default_file_name());

    if json_output {
        let clip = match load_clip_json(input, format, options) {
            Ok(clip) => clip,
            Err(error) => return super::print_json_failure(error),
        };
        let bytes = match export_range(&clip, range, encoding) {
            Ok(b) => b,
            Err(e) => {
                return super::print_json_failure(
                    JsonError::from_pcm(&e)
                        .with_file(input)
                        .with_suggestion(format!(
                            "Use a range inside 0..{:.3} longer than 1 ms",
                            clip.duration()
                        )),
                );
            }
        };
        if let Err(e) = write_export(Path::new(output), &bytes) {
            return super::print_json_failure(
                JsonError::new(error_codes::FILE_WRITE, e.to_string()).with_file(output),
            );
        }
        let result = ExportResult {
            input: input.to_string(),
            output: output.to_string(),
            encoding: encoding.as_str().to_string(),
            start_secs: round_f64(range.start, 6),
            end_secs: round_f64(range.end, 6),
            byte_len: bytes.len(),
            output_hash: blake3::hash(&bytes).to_hex().to_string(),
        };
        CommandOutput::success(result, Vec::new()).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    let clip = load_clip(input, format, options)?;
    println!("{} {}", "Exporting:".cyan().bold(), input);
    println!("{} {}", "Range:".dimmed(), range);
    println!("{} {}", "Encoding:".dimmed(), encoding);

    let bytes = export_range(&clip, range, encoding)?;
    write_export(Path::new(output), &bytes)?;

    println!(
        "{} {} ({} bytes)",
        "Output written to:".green().bold(),
        output,
        bytes.len()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcmscope_core::{decode, encode, Endianness, PcmError};

    fn setup(dir: &tempfile::TempDir) -> (String, PcmFormat, Vec<f32>) {
        let format = PcmFormat::from_parts(8000, 16, false, Endianness::Big).unwrap();
        let samples: Vec<f32> = (0..8000).map(|i| ((i % 100) as f32 / 100.0) - 0.5).collect();
        let path = dir.path().join("ramp.pcm");
        std::fs::write(&path, encode(&samples, &format)).unwrap();
        let decoded = decode(&encode(&samples, &format), &format);
        (path.to_string_lossy().to_string(), format, decoded)
    }

    #[test]
    fn test_export_float_range() {
        let dir = tempfile::tempdir().unwrap();
        let (input, format, decoded) = setup(&dir);
        let output = dir.path().join("out.pcm").to_string_lossy().to_string();

        let range: SelectionRange = "0.25..0.5".parse().unwrap();
        let code = run(
            &input,
            &format,
            &ValidationOptions::default(),
            &range,
            ExportEncoding::Float32Le,
            Some(&output),
            false,
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let bytes = std::fs::read(&output).unwrap();
        let float = PcmFormat::default();
        assert_eq!(decode(&bytes, &float), decoded[2000..4000].to_vec());
    }

    #[test]
    fn test_export_source_encoding_is_byte_exact() {
        let dir = tempfile::tempdir().unwrap();
        let (input, format, _) = setup(&dir);
        let output = dir.path().join("out.raw").to_string_lossy().to_string();

        let range = SelectionRange::new(0.0, 0.125);
        run(
            &input,
            &format,
            &ValidationOptions::default(),
            &range,
            ExportEncoding::Source,
            Some(&output),
            true,
        )
        .unwrap();

        let source = std::fs::read(&input).unwrap();
        let exported = std::fs::read(&output).unwrap();
        assert_eq!(exported, source[..2000].to_vec());
    }

    #[test]
    fn test_export_wav() {
        let dir = tempfile::tempdir().unwrap();
        let (input, format, _) = setup(&dir);
        let output = dir.path().join("out.wav").to_string_lossy().to_string();

        let range = SelectionRange::new(0.5, 1.0);
        run(
            &input,
            &format,
            &ValidationOptions::default(),
            &range,
            ExportEncoding::Wav,
            Some(&output),
            false,
        )
        .unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn test_out_of_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (input, format, _) = setup(&dir);
        let output = dir.path().join("never.pcm").to_string_lossy().to_string();
        let range = SelectionRange::new(0.5, 3.0);

        let err = run(
            &input,
            &format,
            &ValidationOptions::default(),
            &range,
            ExportEncoding::Float32Le,
            Some(&output),
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PcmError>(),
            Some(PcmError::RangeOutOfBounds { .. })
        ));
        assert!(!Path::new(&output).exists());

        let code = run(
            &input,
            &format,
            &ValidationOptions::default(),
            &range,
            ExportEncoding::Float32Le,
            Some(&output),
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
