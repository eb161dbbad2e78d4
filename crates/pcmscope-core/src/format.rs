//! Declared sample format for headerless PCM data.
//!
//! Raw PCM carries no header, so every parameter here comes from the user.
//! Nothing in this module inspects the data; see [`crate::validate`] for the
//! heuristics that second-guess a declaration.

use serde::{Deserialize, Serialize};

use crate::error::{PcmError, PcmResult};

/// Sample rates that real-world raw captures are almost always recorded at.
pub const STANDARD_SAMPLE_RATES: &[u32] = &[
    8000, 11025, 16000, 22050, 24000, 32000, 44100, 48000, 88200, 96000, 176400, 192000,
];

/// Encoding of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 24-bit integer, packed in 3 bytes.
    I24,
    /// Signed 32-bit integer.
    I32,
    /// IEEE-754 32-bit float.
    F32,
}

impl SampleFormat {
    /// Resolves a bit depth and float flag into a sample format.
    pub fn from_bit_depth(bits: u16, float: bool) -> PcmResult<Self> {
        match (bits, float) {
            (8, false) => Ok(SampleFormat::I8),
            (16, false) => Ok(SampleFormat::I16),
            (24, false) => Ok(SampleFormat::I24),
            (32, false) => Ok(SampleFormat::I32),
            (32, true) => Ok(SampleFormat::F32),
            _ => Err(PcmError::UnsupportedBitDepth { bits, float }),
        }
    }

    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            SampleFormat::I8 => 8,
            SampleFormat::I16 => 16,
            SampleFormat::I24 => 24,
            SampleFormat::I32 | SampleFormat::F32 => 32,
        }
    }

    /// Bytes per sample.
    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    /// Whether samples are IEEE floats.
    pub fn is_float(&self) -> bool {
        matches!(self, SampleFormat::F32)
    }

    /// Largest positive integer code, `2^(bits-1) - 1`.
    ///
    /// For float data this is the nominal full-scale value of 1.
    pub fn max_int_value(&self) -> i64 {
        match self {
            SampleFormat::F32 => 1,
            _ => (1i64 << (self.bits() - 1)) - 1,
        }
    }

    /// Divisor that maps integer codes onto [-1.0, 1.0).
    pub(crate) fn full_scale(&self) -> f64 {
        match self {
            SampleFormat::F32 => 1.0,
            _ => (1i64 << (self.bits() - 1)) as f64,
        }
    }

    /// Short label such as `16-bit int` or `32-bit float`.
    pub fn label(&self) -> String {
        if self.is_float() {
            format!("{}-bit float", self.bits())
        } else {
            format!("{}-bit int", self.bits())
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SampleFormat::I8 => "i8",
            SampleFormat::I16 => "i16",
            SampleFormat::I24 => "i24",
            SampleFormat::I32 => "i32",
            SampleFormat::F32 => "f32",
        };
        write!(f, "{}", s)
    }
}

/// Byte order of multi-byte samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// The opposite byte order.
    pub fn swapped(&self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Endianness {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" => Ok(Endianness::Big),
            other => Err(PcmError::invalid_param(
                "endian",
                format!("expected 'little' or 'big', got '{}'", other),
            )),
        }
    }
}

/// Complete declared format of a raw PCM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Per-sample encoding.
    pub sample_format: SampleFormat,
    /// Byte order.
    pub endianness: Endianness,
    /// Channel count (always 1).
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            sample_format: SampleFormat::F32,
            endianness: Endianness::Little,
            channels: 1,
        }
    }
}

impl PcmFormat {
    /// Creates a mono format, rejecting parameters that cannot describe PCM.
    pub fn new(
        sample_rate: u32,
        sample_format: SampleFormat,
        endianness: Endianness,
    ) -> PcmResult<Self> {
        Self::with_channels(sample_rate, sample_format, endianness, 1)
    }

    /// Creates a format with an explicit channel count.
    ///
    /// Only mono is supported; any other count is rejected.
    pub fn with_channels(
        sample_rate: u32,
        sample_format: SampleFormat,
        endianness: Endianness,
        channels: u16,
    ) -> PcmResult<Self> {
        if sample_rate == 0 {
            return Err(PcmError::InvalidSampleRate { rate: sample_rate });
        }
        if channels != 1 {
            return Err(PcmError::UnsupportedChannels { channels });
        }
        Ok(Self {
            sample_rate,
            sample_format,
            endianness,
            channels,
        })
    }

    /// Builds a format from the usual user-facing parameters.
    pub fn from_parts(
        sample_rate: u32,
        bit_depth: u16,
        float: bool,
        endianness: Endianness,
    ) -> PcmResult<Self> {
        let sample_format = SampleFormat::from_bit_depth(bit_depth, float)?;
        Self::new(sample_rate, sample_format, endianness)
    }

    /// Bytes per sample (per channel).
    pub fn bytes_per_sample(&self) -> usize {
        self.sample_format.bytes()
    }

    /// Bytes per sample frame.
    pub fn block_align(&self) -> usize {
        self.channels as usize * self.bytes_per_sample()
    }

    /// Bytes per second of audio.
    pub fn bytes_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }

    /// Number of whole sample frames in a buffer of `byte_len` bytes.
    pub fn frame_count(&self, byte_len: usize) -> usize {
        byte_len / self.block_align()
    }

    /// Duration in seconds of a buffer of `byte_len` bytes, partial frames included.
    pub fn duration_secs(&self, byte_len: usize) -> f64 {
        byte_len as f64 / self.bytes_per_second() as f64
    }

    /// Whether the declared rate is one of [`STANDARD_SAMPLE_RATES`].
    pub fn has_standard_rate(&self) -> bool {
        STANDARD_SAMPLE_RATES.contains(&self.sample_rate)
    }
}

impl std::fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {}, {}-endian, mono",
            self.sample_rate,
            self.sample_format.label(),
            self.endianness
        )
    }
}
