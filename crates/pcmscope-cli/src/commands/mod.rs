//! CLI command implementations

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use pcmscope_core::{PcmClip, PcmFormat, ValidationOptions};

use json_output::{error_codes, CommandOutput, JsonError};

pub mod export;
pub mod inspect;
pub mod json_output;
#[cfg(feature = "playback")]
pub mod play;
pub mod render;
pub mod spectrum;
pub mod validate;

mod reporting;

/// Print a failed JSON envelope and return exit code 1.
pub fn print_json_failure(error: JsonError) -> Result<ExitCode> {
    CommandOutput::<()>::failure(vec![error]).print()?;
    Ok(ExitCode::from(1))
}

/// Read and load a clip, with anyhow context for human output.
pub(crate) fn load_clip(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
) -> Result<PcmClip> {
    let data =
        fs::read(Path::new(input)).with_context(|| format!("Failed to read file: {}", input))?;
    let clip = PcmClip::load(&data, *format, options)
        .with_context(|| format!("Failed to load {} as {}", input, format))?;
    Ok(clip)
}

/// Read and load a clip, mapping failures to JSON errors.
pub(crate) fn load_clip_json(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
) -> std::result::Result<PcmClip, JsonError> {
    let data = fs::read(Path::new(input)).map_err(|e| {
        JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
            .with_file(input)
    })?;
    PcmClip::load(&data, *format, options)
        .map_err(|e| JsonError::from_pcm(&e).with_file(input))
}
