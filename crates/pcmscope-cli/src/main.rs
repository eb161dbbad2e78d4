//! pcmscope CLI - Inspect, validate and visualize headerless PCM audio
//!
//! This binary provides commands for checking a raw sample file against its
//! declared format, summarizing its signal, drawing waveform and spectrum
//! images, exporting ranges and (with the `playback` feature) listening to it.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use pcmscope_cli::commands;
use pcmscope_cli::commands::json_output::{error_codes, JsonError};
use pcmscope_cli::config::PcmscopeConfig;
use pcmscope_core::{ExportEncoding, SelectionRange};

mod cli_args;

use cli_args::{Cli, Commands};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "PCMSCOPE_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reports a bad argument as a JSON envelope or as an error.
fn invalid_argument(message: String, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        commands::print_json_failure(JsonError::new(error_codes::INVALID_ARGUMENT, message))
    } else {
        Err(anyhow::anyhow!(message))
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let json = cli.command.json();

    let config = match PcmscopeConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if json => {
            let mut error = JsonError::new(error_codes::CONFIG, format!("{:#}", e));
            if let Some(path) = &cli.config {
                error = error.with_file(path.as_str());
            }
            return commands::print_json_failure(error);
        }
        Err(e) => return Err(e),
    };

    let format = match config.resolve_format(&cli.command.format_args().overrides()) {
        Ok(format) => format,
        Err(e) if json => {
            return commands::print_json_failure(
                JsonError::new(error_codes::INVALID_FORMAT, format!("{:#}", e))
                    .with_suggestion(
                        "Use --bit-depth 8, 16, 24 or 32 with a non-zero --sample-rate",
                    ),
            );
        }
        Err(e) => return Err(e),
    };
    tracing::debug!(%format, "Resolved input format");

    let validation = &config.validation;

    match cli.command {
        Commands::Inspect {
            input, input_dir, ..
        } => commands::inspect::run(
            input.as_deref(),
            input_dir.as_deref(),
            &format,
            validation,
            json,
        ),
        Commands::Validate { input, strict, .. } => {
            commands::validate::run(&input, &format, validation, strict, json)
        }
        Commands::Spectrum {
            input,
            at,
            frame,
            png,
            width,
            height,
            top,
            ..
        } => {
            let position = match commands::spectrum::Position::from_flags(at, frame) {
                Ok(position) => position,
                Err(e) => return invalid_argument(e.to_string(), json),
            };
            let args = commands::spectrum::SpectrumArgs {
                position,
                config: &config.spectrum,
                png: png.as_deref(),
                width: width.unwrap_or(config.render.spectrum_width),
                height: height.unwrap_or(config.render.spectrum_height),
                top,
            };
            commands::spectrum::run(&input, &format, validation, &args, json)
        }
        Commands::Render {
            input,
            output,
            width,
            height,
            zoom,
            center,
            selection,
            fit_selection,
            playhead,
            markers,
            spectrum,
            ..
        } => {
            let selection = match selection.as_deref().map(str::parse::<SelectionRange>) {
                None => None,
                Some(Ok(range)) => Some(range),
                Some(Err(e)) => return invalid_argument(format!("--selection: {}", e), json),
            };
            let args = commands::render::RenderArgs {
                output: output.as_deref().unwrap_or(commands::render::DEFAULT_OUTPUT),
                width: width.unwrap_or(config.render.width),
                height: height.unwrap_or(config.render.height),
                zoom,
                center,
                selection,
                fit_selection,
                playhead,
                markers: &markers,
                spectrum_output: spectrum.as_deref(),
                spectrum_width: config.render.spectrum_width,
                spectrum_height: config.render.spectrum_height,
                spectrum_config: &config.spectrum,
            };
            commands::render::run(&input, &format, validation, &args, json)
        }
        Commands::Export {
            input,
            range,
            encoding,
            output,
            ..
        } => {
            let range = match range.parse::<SelectionRange>() {
                Ok(range) => range,
                Err(e) => return invalid_argument(format!("--range: {}", e), json),
            };
            let encoding = match encoding.parse::<ExportEncoding>() {
                Ok(encoding) => encoding,
                Err(e) => return invalid_argument(format!("--encoding: {}", e), json),
            };
            commands::export::run(
                &input,
                &format,
                validation,
                &range,
                encoding,
                output.as_deref(),
                json,
            )
        }
        #[cfg(feature = "playback")]
        Commands::Play { input, start, .. } => {
            commands::play::run(&input, &format, validation, start, json)
        }
    }
}
