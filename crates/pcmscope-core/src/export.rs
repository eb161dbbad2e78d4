//! Export of a time range back to a file.

use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decode::{encode, quantize};
use crate::error::{PcmError, PcmResult};
use crate::format::{Endianness, PcmFormat, SampleFormat};
use crate::selection::SelectionRange;
use crate::session::PcmClip;

/// Default file name for raw exports.
pub const DEFAULT_EXPORT_NAME: &str = "selection.pcm";

/// Default file name for WAV exports.
pub const DEFAULT_WAV_EXPORT_NAME: &str = "selection.wav";

/// Output encoding of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportEncoding {
    /// Raw 32-bit little-endian float.
    #[default]
    Float32Le,
    /// Raw PCM in the format the clip was loaded with.
    Source,
    /// Mono WAV, 32-bit float for float clips, otherwise the source integer width.
    Wav,
}

impl ExportEncoding {
    /// File name used when the user does not pick one.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportEncoding::Wav => DEFAULT_WAV_EXPORT_NAME,
            _ => DEFAULT_EXPORT_NAME,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportEncoding::Float32Le => "float32le",
            ExportEncoding::Source => "source",
            ExportEncoding::Wav => "wav",
        }
    }
}

impl std::fmt::Display for ExportEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExportEncoding {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32le" | "f32le" | "float" => Ok(ExportEncoding::Float32Le),
            "source" | "raw" => Ok(ExportEncoding::Source),
            "wav" => Ok(ExportEncoding::Wav),
            other => Err(PcmError::invalid_param(
                "encoding",
                format!("expected 'float32le', 'source' or 'wav', got '{}'", other),
            )),
        }
    }
}

/// Encodes the samples of `range` from a clip.
pub fn export_range(
    clip: &PcmClip,
    range: &SelectionRange,
    encoding: ExportEncoding,
) -> PcmResult<Vec<u8>> {
    let duration = clip.duration();
    // Allow for the rounding of a range typed in milliseconds.
    let tolerance = 0.5 / clip.format().sample_rate as f64;
    if range.start < 0.0 || range.end > duration + tolerance {
        return Err(PcmError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            duration,
        });
    }

    let indices = range.to_sample_range(clip.format().sample_rate, clip.samples().len());
    if !range.is_valid() || indices.is_empty() {
        return Err(PcmError::NoSelection);
    }

    tracing::debug!(
        start = indices.start,
        end = indices.end,
        encoding = %encoding,
        "Exporting range"
    );

    if encoding == ExportEncoding::Source {
        let width = clip.format().bytes_per_sample();
        return Ok(clip.bytes()[indices.start * width..indices.end * width].to_vec());
    }
    encode_samples(&clip.samples()[indices], clip.format(), encoding)
}

/// Encodes samples for export.
pub fn encode_samples(
    samples: &[f32],
    source: &PcmFormat,
    encoding: ExportEncoding,
) -> PcmResult<Vec<u8>> {
    match encoding {
        ExportEncoding::Float32Le => {
            let target = PcmFormat::new(source.sample_rate, SampleFormat::F32, Endianness::Little)?;
            Ok(encode(samples, &target))
        }
        ExportEncoding::Source => Ok(encode(samples, source)),
        ExportEncoding::Wav => encode_wav(samples, source),
    }
}

fn encode_wav(samples: &[f32], source: &PcmFormat) -> PcmResult<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: source.sample_rate,
        bits_per_sample: source.sample_format.bits(),
        sample_format: if source.sample_format.is_float() {
            hound::SampleFormat::Float
        } else {
            hound::SampleFormat::Int
        },
    };

    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec)?;
        for &sample in samples {
            match source.sample_format {
                SampleFormat::F32 => writer.write_sample(sample)?,
                SampleFormat::I8 => writer.write_sample(quantize(sample, SampleFormat::I8) as i8)?,
                SampleFormat::I16 => {
                    writer.write_sample(quantize(sample, SampleFormat::I16) as i16)?
                }
                format => writer.write_sample(quantize(sample, format) as i32)?,
            }
        }
        writer.finalize()?;
    }
    Ok(buffer)
}

/// Writes exported bytes to `path`.
pub fn write_export(path: &Path, bytes: &[u8]) -> PcmResult<()> {
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Export written");
    Ok(())
}
