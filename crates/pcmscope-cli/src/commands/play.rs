//! Play command implementation
//!
//! Plays a clip through the default output device and shows the position
//! and volume meter while it runs.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig, StreamError};
use pcmscope_core::transport::FRAMES_PER_SECOND;
use pcmscope_core::{
    format_clock, volume_percent, Clock, PcmClip, PcmFormat, Transport, TransportEvent,
    ValidationOptions,
};
use std::process::ExitCode;

use super::json_output::{error_codes, round_f64, CommandOutput, JsonError, PlayResult};
use super::reporting::volume_label;
use super::{load_clip, load_clip_json};

/// Width of the text volume meter in characters.
const METER_WIDTH: usize = 20;

/// Clock driven by the number of frames the device has consumed.
struct StreamClock {
    played: Arc<AtomicUsize>,
    sample_rate: u32,
}

impl Clock for StreamClock {
    fn now(&self) -> f64 {
        self.played.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }
}

/// An open output stream fed from a clip.
struct ClipOutput {
    stream: Stream,
    device: String,
    clock: StreamClock,
    failed: Arc<AtomicBool>,
}

/// Error callback for the output stream; raises `failed` once the stream
/// has stopped delivering frames.
fn stream_error_handler(failed: Arc<AtomicBool>) -> impl FnMut(StreamError) + Send + 'static {
    move |err| {
        tracing::error!(error = %err, "Audio output stream error");
        failed.store(true, Ordering::Relaxed);
    }
}

impl ClipOutput {
    /// Opens the default device at the clip's rate, starting at `start_index`.
    fn open(clip: &PcmClip, start_index: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No audio output device found")?;
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        let channels = device
            .default_output_config()
            .context("Failed to query output device configuration")?
            .channels();

        let sample_rate = clip.format().sample_rate;
        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let samples: Arc<[f32]> = Arc::from(clip.samples());
        let played = Arc::new(AtomicUsize::new(0));
        let played_cb = Arc::clone(&played);
        let failed = Arc::new(AtomicBool::new(false));
        let channels = channels as usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let offset = played_cb.load(Ordering::Relaxed);
                    let mut frames = 0;
                    for frame in data.chunks_mut(channels) {
                        let sample = samples
                            .get(start_index + offset + frames)
                            .copied()
                            .unwrap_or(0.0);
                        frame.fill(sample);
                        frames += 1;
                    }
                    played_cb.fetch_add(frames, Ordering::Relaxed);
                },
                stream_error_handler(Arc::clone(&failed)),
                None,
            )
            .with_context(|| format!("Output device cannot play {} Hz mono audio", sample_rate))?;

        tracing::info!(device = name.as_str(), sample_rate, channels, "Audio output opened");

        Ok(Self {
            stream,
            device: name,
            clock: StreamClock {
                played,
                sample_rate,
            },
            failed,
        })
    }

    /// Whether the stream reported an error.
    fn failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// Starts pulling samples; the clock runs from here.
    fn start(&self) -> Result<()> {
        self.stream.play().context("Failed to start audio output")?;
        Ok(())
    }
}

/// Text meter such as `[#######.............]`.
pub fn meter_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Run the play command
///
/// # Arguments
/// * `input` - Path to the raw PCM file
/// * `format` - Declared format
/// * `options` - Validation settings
/// * `start` - Start position in seconds
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 when playback reached the end, 1 on error
pub fn run(
    input: &str,
    format: &PcmFormat,
    options: &ValidationOptions,
    start: Option<f64>,
    json_output: bool,
) -> Result<ExitCode> {
    let clip = if json_output {
        match load_clip_json(input, format, options) {
            Ok(clip) => clip,
            Err(error) => return super::print_json_failure(error),
        }
    } else {
        load_clip(input, format, options)?
    };

    let rate = clip.format().sample_rate;
    let start = start.unwrap_or(0.0).clamp(0.0, clip.duration());
    let mut transport = Transport::new(clip.samples().len(), rate);
    let start_index = ((start * rate as f64).floor() as usize).min(clip.samples().len());

    let output = match ClipOutput::open(&clip, start_index) {
        Ok(output) => output,
        Err(e) if json_output => {
            return super::print_json_failure(
                JsonError::new(error_codes::PLAYBACK, format!("{:#}", e)).with_file(input),
            );
        }
        Err(e) => return Err(e),
    };

    transport.seek_to_time(start, &output.clock);
    transport.play(&output.clock);
    output.start()?;

    if !json_output {
        println!("{} {}", "Playing:".cyan().bold(), input);
        println!("{} {}", "Device:".dimmed(), output.device);
    }

    let total = format_clock(clip.duration());
    let frame = transport.frame_size();
    let tick = Duration::from_millis(1000 / FRAMES_PER_SECOND as u64);
    loop {
        if output.failed() {
            let message = "Audio output stopped before the end of the clip";
            if json_output {
                return super::print_json_failure(
                    JsonError::new(error_codes::PLAYBACK, message).with_file(input),
                );
            }
            println!();
            anyhow::bail!(message);
        }
        if transport.tick(&output.clock) == Some(TransportEvent::Ended) {
            break;
        }
        if !json_output {
            let index = transport.current_sample(&output.clock);
            let end = (index + frame).min(clip.samples().len());
            let percent = volume_percent(&clip.samples()[index..end]);
            print!(
                "\r{} / {}  {} {}   ",
                format_clock(transport.position(&output.clock)),
                total,
                meter_bar(percent, METER_WIDTH),
                volume_label(percent)
            );
            std::io::stdout().flush().ok();
        }
        std::thread::sleep(tick);
    }

    let played_secs = output.clock.now();
    if json_output {
        let result = PlayResult {
            input: input.to_string(),
            device: output.device.clone(),
            start_secs: round_f64(start, 6),
            played_secs: round_f64(played_secs, 3),
        };
        CommandOutput::success(result, Vec::new()).print()?;
    } else {
        println!("\n{}", "Playback finished".green().bold());
    }
    Ok(ExitCode::SUCCESS)
}
