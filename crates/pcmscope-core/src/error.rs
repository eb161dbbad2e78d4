//! Error types for the PCM core.

use thiserror::Error;

/// Result type for PCM operations.
pub type PcmResult<T> = Result<T, PcmError>;

/// Errors that can occur while loading, analyzing or exporting PCM data.
///
/// Validation problems are *not* errors: they are collected as issues in a
/// [`ValidationReport`](crate::validate::ValidationReport). Errors are reserved
/// for input that cannot be used at all.
#[derive(Debug, Error)]
pub enum PcmError {
    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },

    /// Unsupported channel count.
    #[error("unsupported channel count: {channels} (only mono is supported)")]
    UnsupportedChannels {
        /// The requested channel count.
        channels: u16,
    },

    /// Unsupported bit depth / float combination.
    #[error("unsupported sample format: {bits}-bit (float: {float})")]
    UnsupportedBitDepth {
        /// Requested bit depth.
        bits: u16,
        /// Whether float samples were requested.
        float: bool,
    },

    /// The input buffer is empty.
    #[error("PCM data is empty")]
    EmptyData,

    /// The input buffer does not hold a single complete sample.
    #[error("PCM data too short: {len} bytes, need at least {bytes_per_sample} per sample")]
    TooShort {
        /// Buffer length in bytes.
        len: usize,
        /// Bytes required for one sample.
        bytes_per_sample: usize,
    },

    /// Export requested without a usable selection.
    #[error("no region selected")]
    NoSelection,

    /// A time range falls outside the clip.
    #[error("range {start:.3}s..{end:.3}s is outside the clip (duration {duration:.3}s)")]
    RangeOutOfBounds {
        /// Range start in seconds.
        start: f64,
        /// Range end in seconds.
        end: f64,
        /// Clip duration in seconds.
        duration: f64,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV encoding error.
    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
}

impl PcmError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            PcmError::InvalidSampleRate { .. } => "PCM_001",
            PcmError::UnsupportedChannels { .. } => "PCM_002",
            PcmError::UnsupportedBitDepth { .. } => "PCM_003",
            PcmError::EmptyData => "PCM_004",
            PcmError::TooShort { .. } => "PCM_005",
            PcmError::NoSelection => "PCM_006",
            PcmError::RangeOutOfBounds { .. } => "PCM_007",
            PcmError::InvalidParameter { .. } => "PCM_008",
            PcmError::Io(_) => "PCM_009",
            PcmError::Wav(_) => "PCM_010",
            PcmError::Png(_) => "PCM_011",
        }
    }
}
