//! Conversion between raw PCM bytes and normalized samples.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::format::{Endianness, PcmFormat, SampleFormat};

/// A sample as stored in the buffer, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSample {
    /// Integer code.
    Int(i64),
    /// IEEE float value.
    Float(f32),
}

impl std::fmt::Display for RawSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawSample::Int(v) => write!(f, "{}", v),
            RawSample::Float(v) => write!(f, "{}", v),
        }
    }
}

fn read_with<B: ByteOrder>(chunk: &[u8], sample_format: SampleFormat) -> RawSample {
    match sample_format {
        SampleFormat::I8 => RawSample::Int(chunk[0] as i8 as i64),
        SampleFormat::I16 => RawSample::Int(B::read_i16(chunk) as i64),
        SampleFormat::I24 => RawSample::Int(B::read_i24(chunk) as i64),
        SampleFormat::I32 => RawSample::Int(B::read_i32(chunk) as i64),
        SampleFormat::F32 => RawSample::Float(B::read_f32(chunk)),
    }
}

/// Reads one sample from a chunk of exactly `sample_format.bytes()` bytes.
fn read_chunk(chunk: &[u8], sample_format: SampleFormat, endianness: Endianness) -> RawSample {
    match endianness {
        Endianness::Little => read_with::<LittleEndian>(chunk, sample_format),
        Endianness::Big => read_with::<BigEndian>(chunk, sample_format),
    }
}

fn normalize(raw: RawSample, sample_format: SampleFormat) -> f32 {
    match raw {
        RawSample::Int(v) => (v as f64 / sample_format.full_scale()) as f32,
        RawSample::Float(v) => v,
    }
}

/// Reads sample `index` without normalization.
///
/// Returns `None` when the buffer ends before the sample is complete.
pub fn read_raw(bytes: &[u8], format: &PcmFormat, index: usize) -> Option<RawSample> {
    let width = format.bytes_per_sample();
    let start = index.checked_mul(width)?;
    let chunk = bytes.get(start..start.checked_add(width)?)?;
    Some(read_chunk(chunk, format.sample_format, format.endianness))
}

/// Iterates over the raw samples of a buffer, ignoring a trailing partial sample.
pub fn raw_samples<'a>(
    bytes: &'a [u8],
    format: &PcmFormat,
) -> impl Iterator<Item = RawSample> + 'a {
    let sample_format = format.sample_format;
    let endianness = format.endianness;
    bytes
        .chunks_exact(format.bytes_per_sample())
        .map(move |chunk| read_chunk(chunk, sample_format, endianness))
}

/// Decodes a buffer into samples.
///
/// Integer data is normalized to [-1.0, 1.0) by dividing by `2^(bits-1)`.
/// Float data is passed through untouched so out-of-range values stay
/// visible to statistics. Trailing bytes that do not form a whole sample are
/// ignored.
pub fn decode(bytes: &[u8], format: &PcmFormat) -> Vec<f32> {
    raw_samples(bytes, format)
        .map(|raw| normalize(raw, format.sample_format))
        .collect()
}

/// Decodes at most `limit` samples from the start of the buffer.
pub fn decode_prefix(bytes: &[u8], format: &PcmFormat, limit: usize) -> Vec<f32> {
    raw_samples(bytes, format)
        .take(limit)
        .map(|raw| normalize(raw, format.sample_format))
        .collect()
}

/// Integer code for a sample: clipped to [-1.0, 1.0] and rounded.
///
/// Float formats have no integer code and always yield 0.
pub(crate) fn quantize(sample: f32, sample_format: SampleFormat) -> i64 {
    if sample_format.is_float() {
        return 0;
    }
    let scale = sample_format.full_scale();
    let clipped = if sample.is_nan() {
        0.0
    } else {
        (sample as f64).clamp(-1.0, 1.0)
    };
    (clipped * scale).round().clamp(-scale, scale - 1.0) as i64
}

fn write_with<B: ByteOrder>(buf: &mut [u8], sample: f32, sample_format: SampleFormat) {
    match sample_format {
        SampleFormat::I8 => buf[0] = quantize(sample, sample_format) as i8 as u8,
        SampleFormat::I16 => B::write_i16(buf, quantize(sample, sample_format) as i16),
        SampleFormat::I24 => B::write_i24(buf, quantize(sample, sample_format) as i32),
        SampleFormat::I32 => B::write_i32(buf, quantize(sample, sample_format) as i32),
        SampleFormat::F32 => B::write_f32(buf, sample),
    }
}

/// Encodes samples into raw bytes of the given format.
///
/// Integer targets are clipped to [-1.0, 1.0] and rounded to the nearest
/// code. Float targets are written as-is.
pub fn encode(samples: &[f32], format: &PcmFormat) -> Vec<u8> {
    let width = format.bytes_per_sample();
    let mut bytes = vec![0u8; samples.len() * width];
    for (chunk, &sample) in bytes.chunks_exact_mut(width).zip(samples) {
        match format.endianness {
            Endianness::Little => write_with::<LittleEndian>(chunk, sample, format.sample_format),
            Endianness::Big => write_with::<BigEndian>(chunk, sample, format.sample_format),
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(bits: u16, float: bool, endianness: Endianness) -> PcmFormat {
        PcmFormat::from_parts(44100, bits, float, endianness).unwrap()
    }

    #[test]
    fn test_decode_i16_little() {
        let mut bytes = Vec::new();
        for v in [0i16, 16384, -32768, 32767] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let samples = decode(&bytes, &format(16, false, Endianness::Little));
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -1.0);
        assert!((samples[3] - 0.99997).abs() < 1e-4);
    }

    #[test]
    fn test_decode_i16_big() {
        let bytes = 16384i16.to_be_bytes();
        let samples = decode(&bytes, &format(16, false, Endianness::Big));
        assert_eq!(samples, vec![0.5]);
    }

    #[test]
    fn test_decode_i8_is_signed() {
        let bytes = [0x80u8, 0x00, 0x40];
        let samples = decode(&bytes, &format(8, false, Endianness::Little));
        assert_eq!(samples, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_decode_i24() {
        // -2 in 24-bit little-endian two's complement
        let bytes = [0xFEu8, 0xFF, 0xFF, 0x00, 0x00, 0x40];
        let fmt = format(24, false, Endianness::Little);
        assert_eq!(read_raw(&bytes, &fmt, 0), Some(RawSample::Int(-2)));
        assert_eq!(read_raw(&bytes, &fmt, 1), Some(RawSample::Int(0x400000)));
        let samples = decode(&bytes, &fmt);
        assert_eq!(samples[1], 0.5);
    }

    #[test]
    fn test_decode_f32_passthrough() {
        let mut bytes = Vec::new();
        for v in [0.25f32, -1.5, f32::NAN] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let samples = decode(&bytes, &format(32, true, Endianness::Big));
        assert_eq!(samples[0], 0.25);
        assert_eq!(samples[1], -1.5);
        assert!(samples[2].is_nan());
    }

    #[test]
    fn test_trailing_partial_sample_ignored() {
        let bytes = [0u8, 0, 0, 0, 0x12];
        let fmt = format(16, false, Endianness::Little);
        assert_eq!(decode(&bytes, &fmt).len(), 2);
        assert_eq!(read_raw(&bytes, &fmt, 2), None);
    }

    #[test]
    fn test_read_raw_huge_index_is_none() {
        let fmt = format(16, false, Endianness::Little);
        let bytes = [0u8; 4];
        assert_eq!(read_raw(&bytes, &fmt, usize::MAX), None);
        assert_eq!(read_raw(&bytes, &fmt, usize::MAX / 2), None);
    }

    #[test]
    fn test_decode_prefix_limits_count() {
        let bytes = vec![0u8; 4000];
        let fmt = format(16, false, Endianness::Little);
        assert_eq!(decode_prefix(&bytes, &fmt, 1000).len(), 1000);
        assert_eq!(decode_prefix(&bytes, &fmt, 5000).len(), 2000);
    }

    #[test]
    fn test_encode_clips_integer_targets() {
        let fmt = format(16, false, Endianness::Little);
        let bytes = encode(&[2.0, -2.0, 0.5], &fmt);
        let codes: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(codes, vec![32767, -32768, 16384]);
    }

    #[test]
    fn test_encode_decode_preserves_i24_big() {
        let fmt = format(24, false, Endianness::Big);
        let samples = vec![0.0f32, 0.5, -0.25];
        let decoded = decode(&encode(&samples, &fmt), &fmt);
        assert_eq!(decoded, samples);
    }
}
