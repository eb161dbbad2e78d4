//! CLI argument definitions for the pcmscope command-line interface.
//!
//! All `#[derive(Parser)]`, `#[derive(Args)]` and `#[derive(Subcommand)]`
//! types are defined here, keeping `main.rs` focused on dispatch logic.

use clap::{ArgAction, Args, Parser, Subcommand};
use pcmscope_cli::config::FormatOverrides;

/// pcmscope - Raw PCM inspector
#[derive(Parser)]
#[command(name = "pcmscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); PCMSCOPE_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a JSON config file (default: <config dir>/pcmscope/config.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Declared format of the input. Unset flags fall back to the config file.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct FormatArgs {
    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Bits per sample (8, 16, 24 or 32)
    #[arg(long)]
    pub bit_depth: Option<u16>,

    /// Samples are 32-bit IEEE floats
    #[arg(long)]
    pub float: bool,

    /// Byte order
    #[arg(long, value_parser = ["little", "big"])]
    pub endian: Option<String>,
}

impl FormatArgs {
    pub fn overrides(&self) -> FormatOverrides {
        FormatOverrides {
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
            float: self.float,
            endianness: self.endian.clone(),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Validate a raw PCM file and print its signal statistics
    Inspect {
        /// Path to the raw PCM file
        #[arg(short, long, required_unless_present = "input_dir")]
        input: Option<String>,

        /// Directory to recursively scan for .pcm and .raw files (batch mode)
        #[arg(long, conflicts_with = "input")]
        input_dir: Option<String>,

        #[command(flatten)]
        format: FormatArgs,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check a raw PCM file against its declared format
    Validate {
        /// Path to the raw PCM file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        format: FormatArgs,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Analyze the frequency spectrum at a position in the clip
    Spectrum {
        /// Path to the raw PCM file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        format: FormatArgs,

        /// Position in seconds
        #[arg(long)]
        at: Option<f64>,

        /// Position as a frame step (1/50 s per step)
        #[arg(long, conflicts_with = "at")]
        frame: Option<usize>,

        /// Also render the spectrum to this PNG file
        #[arg(long)]
        png: Option<String>,

        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Number of peaks to list
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render the waveform view to a PNG file
    Render {
        /// Path to the raw PCM file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        format: FormatArgs,

        /// Output image path (default: waveform.png)
        #[arg(short, long)]
        output: Option<String>,

        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Zoom level (1 to 50)
        #[arg(long)]
        zoom: Option<f64>,

        /// Time in seconds to centre the view on
        #[arg(long)]
        center: Option<f64>,

        /// Highlighted range in seconds, e.g. 1.5..2.25
        #[arg(long)]
        selection: Option<String>,

        /// Zoom so the selection fills the view
        #[arg(long, requires = "selection")]
        fit_selection: bool,

        /// Playhead position in seconds
        #[arg(long)]
        playhead: Option<f64>,

        /// Marker position in seconds (repeatable)
        #[arg(long = "marker")]
        markers: Vec<f64>,

        /// Also render the spectrum at the playhead to this PNG file
        #[arg(long)]
        spectrum: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Write a time range of the clip to a file
    Export {
        /// Path to the raw PCM file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        format: FormatArgs,

        /// Range in seconds, e.g. 1.5..2.25 or 1.5:2.25
        #[arg(long)]
        range: String,

        /// Output encoding
        #[arg(long, default_value = "float32le", value_parser = ["float32le", "source", "wav"])]
        encoding: String,

        /// Output file path (default: selection.pcm or selection.wav)
        #[arg(short, long)]
        output: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Play the clip through the default audio output
    #[cfg(feature = "playback")]
    Play {
        /// Path to the raw PCM file
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        format: FormatArgs,

        /// Start position in seconds
        #[arg(long)]
        start: Option<f64>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the command was asked for JSON output.
    pub fn json(&self) -> bool {
        match self {
            Commands::Inspect { json, .. }
            | Commands::Validate { json, .. }
            | Commands::Spectrum { json, .. }
            | Commands::Render { json, .. }
            | Commands::Export { json, .. } => *json,
            #[cfg(feature = "playback")]
            Commands::Play { json, .. } => *json,
        }
    }

    /// Format flags of the command.
    pub fn format_args(&self) -> &FormatArgs {
        match self {
            Commands::Inspect { format, .. }
            | Commands::Validate { format, .. }
            | Commands::Spectrum { format, .. }
            | Commands::Render { format, .. }
            | Commands::Export { format, .. } => format,
            #[cfg(feature = "playback")]
            Commands::Play { format, .. } => format,
        }
    }
}
