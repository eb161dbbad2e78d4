//! Spectrum command implementation
//!
//! Analyzes the frame around a position in the clip and optionally renders
//! the spectrum as a PNG.

use anyhow::{Context, Result};
use colored::Colorize;
use pcmscope_core::spectrum::SILENT_BIN_DB;
use pcmscope_core::{
    analyze_at, format_clock, render_spectrum, ManualClock, PcmClip, PcmFormat, PngConfig,
    Spectrum, SpectrumConfig, Transport, ValidationOptions,
};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{
    error_codes, round_f64, CommandOutput, JsonError, SpectrumPeak, SpectrumResult,
};
use super::{load_clip, load_clip_json};

/// Where in the clip to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// First frame
    #[default]
    Start,
    /// Time in seconds
    At(f64),
    /// Frame-step number (one step is 1/50 s)
    Frame(usize),
}

impl Position {
    /// Builds a position from the mutually exclusive `--at` / `--frame` flags.
    pub fn from_flags(at: Option<f64>, frame: Option<usize>) -> Result<Self> {
        match (at, frame) {
            (None, None) => Ok(Position::Start),
            (Some(secs), None) => {
                if !secs.is_finite() || secs < 0.0 {
                    anyhow::bail!("--at must be a non-negative number of seconds, got {}", secs);
                }
                Ok(Position::At(secs))
            }
            (None, Some(n)) => Ok(Position::Frame(n)),
            (Some(_), Some(_)) => anyhow::bail!("--at and --frame cannot be combined"),
        }
    }

    /// Sample index under the playhead after seeking to this position.
    pub fn sample_index(&self, clip: &PcmClip) -> usize {
        let rate = clip.format().sample_rate;
        let mut transport = Transport::new(clip.samples().len(), rate);
        let clock = ManualClock::new();
        match *self {
            Position::Start => {}
            Position::At(secs) => transport.seek_to_time(secs, &clock),
            Position::Frame(n) => {
                let secs = n.saturating_mul(transport.frame_size()) as f64 / rate as f64;
                transport.seek_to_time(secs, &clock);
            }
        }
        transport.current_sample(&clock)
    }
}

/// Options for the spectrum command.
#[derive(Debug, Clone)]
pub struct SpectrumArgs<'a> {
    pub position: Position,
    pub config: &'a SpectrumConfig,
    pub png: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub top: usize,
}

/// Run the spectrum command
///
/// # Arguments
/// * `input` - Path to the raw PCM file
/// * `format` - Declared format
/// * `options` - Validation settings
/// * `args` - Position, analyzer settings and image options
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    args: &SpectrumArgs<'_>,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        run_json(input, format, options, args)
    } else {
        run_human(input, format, options, args)
    }
}

/// Local maxima of the spectrum, loudest first, DC excluded.
pub fn top_peaks(spectrum: &Spectrum, count: usize) -> Vec<SpectrumPeak> {
    let db = &spectrum.magnitudes_db;
    let mut peaks: Vec<(usize, f32)> = (1..db.len())
        .filter(|&i| db[i] > SILENT_BIN_DB)
        .filter(|&i| db[i] >= db[i - 1] && db.get(i + 1).map_or(true, |&next| db[i] > next))
        .map(|i| (i, db[i]))
        .collect();
    peaks.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    peaks
        .into_iter()
        .take(count)
        .map(|(i, magnitude)| SpectrumPeak {
            frequency_hz: round_f64(spectrum.frequency_of(i), 2),
            magnitude_db: round_f64(magnitude as f64, 2),
        })
        .collect()
}

fn analyze(clip: &PcmClip, args: &SpectrumArgs<'_>) -> Result<(usize, Spectrum)> {
    let index = args.position.sample_index(clip);
    let spectrum = analyze_at(
        clip.samples(),
        clip.format().sample_rate,
        index,
        args.config,
    )?;
    tracing::debug!(index, bins = spectrum.len(), "Analyzed spectrum");
    Ok((index, spectrum))
}

fn write_png(
    spectrum: &Spectrum,
    sample_rate: u32,
    args: &SpectrumArgs<'_>,
    path: &str,
) -> Result<()> {
    let canvas = render_spectrum(spectrum, sample_rate, args.width, args.height);
    canvas
        .write_png(Path::new(path), &PngConfig::default())
        .with_context(|| format!("Failed to write spectrum image: {}", path))?;
    Ok(())
}

fn run_human(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    args: &SpectrumArgs<'_>,
) -> Result<ExitCode> {
    let clip = load_clip(input, format, options)?;
    let (index, spectrum) = analyze(&clip, args)?;
    let rate = clip.format().sample_rate;

    println!("{} {}", "Spectrum:".cyan().bold(), input);
    println!(
        "{} {} (sample {})",
        "Position:".dimmed(),
        format_clock(index as f64 / rate as f64),
        index
    );
    println!(
        "{} {} ({:.2} Hz per bin)",
        "FFT size:".dimmed(),
        args.config.fft_size,
        spectrum.bin_hz
    );

    let dominant = spectrum.dominant_frequency();
    if dominant > 0.0 {
        println!("{} {:.1} Hz", "Dominant:".dimmed(), dominant);
    } else {
        println!("{} {}", "Dominant:".dimmed(), "none (silent frame)".yellow());
    }

    let peaks = top_peaks(&spectrum, args.top);
    if !peaks.is_empty() {
        println!("\n{}", "Peaks:".cyan().bold());
        for (n, peak) in peaks.iter().enumerate() {
            println!(
                "  {:>2}. {:>10.1} Hz  {:>7.1} dB",
                n + 1,
                peak.frequency_hz,
                peak.magnitude_db
            );
        }
    }

    if let Some(path) = args.png {
        write_png(&spectrum, rate, args, path)?;
        println!("\n{} {}", "Image written to:".green().bold(), path);
    }

    Ok(ExitCode::SUCCESS)
}

fn run_json(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    args: &SpectrumArgs<'_>,
) -> Result<ExitCode> {
    let clip = match load_clip_json(input, format, options) {
        Ok(clip) => clip,
        Err(error) => return super::print_json_failure(error),
    };

    let (index, spectrum) = match analyze(&clip, args) {
        Ok(r) => r,
        Err(e) => {
            return super::print_json_failure(JsonError::new(
                error_codes::INVALID_ARGUMENT,
                format!("{:#}", e),
            ));
        }
    };

    let rate = clip.format().sample_rate;
    if let Some(path) = args.png {
        if let Err(e) = write_png(&spectrum, rate, args, path) {
            return super::print_json_failure(
                JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e)).with_file(path),
            );
        }
    }

    let result = SpectrumResult {
        input: input.to_string(),
        sample_index: index,
        time_secs: round_f64(index as f64 / rate as f64, 6),
        fft_size: args.config.fft_size,
        bin_hz: round_f64(spectrum.bin_hz, 4),
        dominant_frequency_hz: round_f64(spectrum.dominant_frequency(), 2),
        peaks: top_peaks(&spectrum, args.top),
        png: args.png.map(str::to_string),
    };
    CommandOutput::success(result, Vec::new()).print()?;
    Ok(ExitCode::SUCCESS)
}
