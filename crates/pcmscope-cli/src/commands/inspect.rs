//! Inspect command implementation
//!
//! Loads raw PCM files against a declared format and reports validation
//! findings and signal statistics.

use anyhow::Result;
use colored::Colorize;
use pcmscope_core::{format_duration, is_raw_pcm_path, PcmClip, PcmFormat, ValidationOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use super::json_output::{
    error_codes, stats_to_btree, validation_warnings, warning_codes, BatchInspectItem,
    BatchInspectResult, BatchInspectSummary, CommandOutput, InspectResult, JsonError, JsonWarning,
};
use super::reporting::{print_stats, print_validation};
use super::{load_clip, load_clip_json};

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to a single raw PCM file
/// * `input_dir` - Directory to scan recursively for `.pcm` / `.raw` files
/// * `format` - Declared format of the input
/// * `options` - Validation settings
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if any file could not be loaded
pub fn run(
    input: Option<&str>,
    input_dir: Option<&str>,
    format: &PcmFormat,
    options: &ValidationOptions,
    json_output: bool,
) -> Result<ExitCode> {
    match (input, input_dir) {
        (Some(input), None) => {
            if json_output {
                run_json(input, format, options)
            } else {
                run_human(input, format, options)
            }
        }
        (None, Some(dir)) => run_batch(dir, format, options, json_output),
        _ => anyhow::bail!("Exactly one of --input or --input-dir is required"),
    }
}

/// Builds the JSON result for a loaded clip.
pub fn inspect_result(input: &str, clip: &PcmClip) -> InspectResult {
    InspectResult {
        input: input.to_string(),
        format: clip.format().to_string(),
        byte_len: clip.byte_len(),
        duration_secs: clip.duration(),
        input_hash: clip.hash().to_string(),
        validation: clip.validation().clone(),
        stats: stats_to_btree(clip.stats()),
    }
}

/// Run inspect with human-readable (colored) output
fn run_human(input: &str, format: &PcmFormat, options: &ValidationOptions) -> Result<ExitCode> {
    println!("{} {}", "Inspecting:".cyan().bold(), input);
    println!("{} {}", "Format:".dimmed(), format);

    let clip = load_clip(input, format, options)?;

    println!("{} {} bytes", "Size:".dimmed(), clip.byte_len());
    println!(
        "{} {}",
        "Duration:".dimmed(),
        format_duration(clip.samples().len(), format.sample_rate)
    );
    println!("{} {}", "Hash:".dimmed(), &clip.hash()[..16]);

    print_validation(clip.validation());
    print_stats(clip.stats(), clip.samples());

    Ok(ExitCode::SUCCESS)
}

/// Run inspect with machine-readable JSON output
fn run_json(input: &str, format: &PcmFormat, options: &ValidationOptions) -> Result<ExitCode> {
    let clip = match load_clip_json(input, format, options) {
        Ok(clip) => clip,
        Err(error) => return super::print_json_failure(error),
    };

    let warnings = validation_warnings(clip.validation(), input);
    CommandOutput::success(inspect_result(input, &clip), warnings).print()?;
    Ok(ExitCode::SUCCESS)
}

/// Raw PCM files under `dir`, sorted for deterministic output.
pub fn find_pcm_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_raw_pcm_path(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Inspect every raw PCM file under a directory
fn run_batch(
    input_dir: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    json_output: bool,
) -> Result<ExitCode> {
    let dir = Path::new(input_dir);
    if !dir.is_dir() {
        if json_output {
            return super::print_json_failure(
                JsonError::new(
                    error_codes::NO_INPUT,
                    format!("Input directory not found: {}", input_dir),
                )
                .with_file(input_dir),
            );
        }
        anyhow::bail!("Input directory not found: {}", input_dir);
    }

    let files = find_pcm_files(dir);
    tracing::debug!(dir = %dir.display(), count = files.len(), "Found raw PCM files");

    if files.is_empty() {
        if json_output {
            return super::print_json_failure(
                JsonError::new(
                    error_codes::NO_INPUT,
                    format!("No .pcm or .raw files found in {}", input_dir),
                )
                .with_file(input_dir),
            );
        }
        anyhow::bail!("No .pcm or .raw files found in {}", input_dir);
    }

    let mut items = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();
    for path in &files {
        let display = path.to_string_lossy().to_string();
        match load_clip_json(&display, format, options) {
            Ok(clip) => {
                warnings.extend(validation_warnings(clip.validation(), &display));
                items.push(BatchInspectItem {
                    input: display.clone(),
                    success: true,
                    result: Some(inspect_result(&display, &clip)),
                    error: None,
                });
            }
            Err(error) => {
                warnings.push(
                    JsonWarning::new(warning_codes::SKIPPED_FILE, error.message.clone())
                        .with_file(&display),
                );
                items.push(BatchInspectItem {
                    input: display.clone(),
                    success: false,
                    result: None,
                    error: Some(error),
                });
            }
        }
    }

    let summary = summarize(&items);
    let all_loaded = summary.failed == 0;

    if json_output {
        let result = BatchInspectResult {
            input_dir: input_dir.to_string(),
            items,
            summary,
        };
        let output = if all_loaded {
            CommandOutput::success(result, warnings)
        } else {
            let error = JsonError::new(
                error_codes::VALIDATION_FAILED,
                format!("{} file(s) could not be loaded", result.summary.failed),
            );
            CommandOutput::failed_with(result, vec![error], warnings)
        };
        output.print()?;
    } else {
        print_batch(input_dir, &items, &summary);
    }

    Ok(if all_loaded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn summarize(items: &[BatchInspectItem]) -> BatchInspectSummary {
    let succeeded = items.iter().filter(|i| i.success).count();
    let with_warnings = items
        .iter()
        .filter_map(|i| i.result.as_ref())
        .filter(|r| r.validation.has_warnings())
        .count();
    BatchInspectSummary {
        total: items.len(),
        succeeded,
        failed: items.len() - succeeded,
        with_warnings,
    }
}

fn print_batch(input_dir: &str, items: &[BatchInspectItem], summary: &BatchInspectSummary) {
    println!("{} {}", "Inspecting:".cyan().bold(), input_dir);
    println!("{}", "===========".dimmed());

    for item in items {
        match (&item.result, &item.error) {
            (Some(result), _) => {
                let peak = result
                    .stats
                    .get("peak_db")
                    .and_then(|v| v.as_f64())
                    .unwrap_or_default();
                let status = if result.validation.has_warnings() {
                    "WARN".yellow().bold()
                } else {
                    "OK".green().bold()
                };
                println!(
                    "{} {} {}",
                    status,
                    item.input,
                    format!("({:.3} s, peak {:.2} dBFS)", result.duration_secs, peak).dimmed()
                );
                for issue in &result.validation.warnings {
                    let first = issue.message.lines().next().unwrap_or_default();
                    println!("  {} [{}] {}", "!".yellow(), issue.code.cyan(), first);
                }
            }
            (None, Some(error)) => {
                println!("{} {}", "FAIL".red().bold(), item.input);
                println!("  {} {}", "-".red(), error.message);
            }
            (None, None) => {}
        }
    }

    println!("\n{}", "Summary".cyan().bold());
    println!("{}", "-------".dimmed());
    println!("Total:    {}", summary.total);
    println!("Loaded:   {}", format!("{}", summary.succeeded).green());
    println!("Warnings: {}", summary.with_warnings);
    if summary.failed > 0 {
        println!("Failed:   {}", format!("{}", summary.failed).red());
    } else {
        println!("Failed:   0");
    }
}
