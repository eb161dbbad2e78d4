//! Render command implementation
//!
//! Draws the waveform view of a clip to a PNG, with the same zoom,
//! selection, playhead and marker overlays as the interactive view.

use anyhow::{Context, Result};
use colored::Colorize;
use pcmscope_core::{
    analyze_at, render_markers, render_spectrum, render_waveform, MarkerList, PcmClip, PcmFormat,
    PngConfig, SelectionRange, SpectrumConfig, ValidationOptions, Viewport,
};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, round_f64, CommandOutput, JsonError, RenderResult};
use super::{load_clip, load_clip_json};

/// Default waveform image path.
pub const DEFAULT_OUTPUT: &str = "waveform.png";

/// Options for the render command.
#[derive(Debug, Clone)]
pub struct RenderArgs<'a> {
    pub output: &'a str,
    pub width: u32,
    pub height: u32,
    pub zoom: Option<f64>,
    pub center: Option<f64>,
    pub selection: Option<SelectionRange>,
    /// Zoom so the selection fills the view
    pub fit_selection: bool,
    pub playhead: Option<f64>,
    pub markers: &'a [f64],
    /// Also render the spectrum at the playhead here
    pub spectrum_output: Option<&'a str>,
    pub spectrum_width: u32,
    pub spectrum_height: u32,
    pub spectrum_config: &'a SpectrumConfig,
}

/// Run the render command
///
/// # Arguments
/// * `input` - Path to the raw PCM file
/// * `format` - Declared format
/// * `options` - Validation settings
/// * `args` - View and output options
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    args: &RenderArgs<'_>,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        let clip = match load_clip_json(input, format, options) {
            Ok(clip) => clip,
            Err(error) => return super::print_json_failure(error),
        };
        match render(input, &clip, args) {
            Ok(result) => {
                CommandOutput::success(result, Vec::new()).print()?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => super::print_json_failure(
                JsonError::new(error_codes::FILE_WRITE, format!("{:#}", e)).with_file(args.output),
            ),
        }
    } else {
        let clip = load_clip(input, format, options)?;
        println!("{} {}", "Rendering:".cyan().bold(), input);
        let result = render(input, &clip, args)?;
        println!(
            "{} {:.3}s..{:.3}s at {:.0}%",
            "View:".dimmed(),
            result.view_start_secs,
            result.view_end_secs,
            result.zoom * 100.0
        );
        println!("{} {}", "Waveform written to:".green().bold(), result.output);
        if let Some(path) = &result.spectrum_output {
            println!("{} {}", "Spectrum written to:".green().bold(), path);
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// Viewport for the requested zoom, centre and selection.
pub fn build_viewport(clip: &PcmClip, args: &RenderArgs<'_>) -> Viewport {
    let mut viewport = Viewport::new(args.width as f64, args.height as f64, clip.duration());
    if let Some(zoom) = args.zoom {
        viewport.set_zoom(zoom);
    }
    match (args.fit_selection, &args.selection) {
        (true, Some(range)) => viewport.zoom_to_selection(&range.clamp(clip.duration())),
        _ => {
            if let Some(center) = args.center {
                viewport.center_on(center);
            }
        }
    }
    viewport
}

fn render(input: &str, clip: &PcmClip, args: &RenderArgs<'_>) -> Result<RenderResult> {
    let viewport = build_viewport(clip, args);
    let selection = args.selection.map(|r| r.clamp(clip.duration()));
    let rate = clip.format().sample_rate;

    let mut canvas = render_waveform(
        clip.samples(),
        rate,
        &viewport,
        selection.as_ref(),
        args.playhead,
    );

    let mut markers = MarkerList::new();
    for (n, &position) in args.markers.iter().enumerate() {
        markers.add(position, format!("M{}", n + 1));
    }
    render_markers(&mut canvas, &viewport, &markers);

    let png = canvas.to_png(&PngConfig::default())?;
    fs::write(args.output, &png)
        .with_context(|| format!("Failed to write image: {}", args.output))?;
    tracing::info!(path = args.output, bytes = png.len(), "Wrote waveform image");

    if let Some(path) = args.spectrum_output {
        let playhead = args.playhead.unwrap_or(0.0).clamp(0.0, clip.duration());
        let index = ((playhead * rate as f64).floor() as usize)
            .min(clip.samples().len().saturating_sub(1));
        let spectrum = analyze_at(clip.samples(), rate, index, args.spectrum_config)?;
        render_spectrum(&spectrum, rate, args.spectrum_width, args.spectrum_height)
            .write_png(Path::new(path), &PngConfig::default())
            .with_context(|| format!("Failed to write image: {}", path))?;
    }

    Ok(RenderResult {
        input: input.to_string(),
        output: args.output.to_string(),
        spectrum_output: args.spectrum_output.map(str::to_string),
        width: canvas.width(),
        height: canvas.height(),
        zoom: round_f64(viewport.zoom, 4),
        view_start_secs: round_f64(viewport.view_start_time(), 6),
        view_end_secs: round_f64(viewport.view_end_time(), 6),
        output_hash: blake3::hash(&png).to_hex().to_string(),
    })
}
