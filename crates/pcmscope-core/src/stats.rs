//! Signal statistics computed in a single streaming pass.

use serde::{Deserialize, Serialize};

/// Floor used for dB values of silent signals.
pub const DB_FLOOR: f64 = -100.0;

/// Samples at or above this magnitude count as clipped.
pub const CLIPPING_THRESHOLD: f32 = 0.999;

/// Samples below this magnitude count as silent.
pub const SILENCE_THRESHOLD: f32 = 0.001;

/// Summary statistics of a decoded clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStats {
    /// Number of samples analyzed.
    pub sample_count: usize,
    /// Largest absolute sample value.
    pub peak_level: f64,
    /// Root mean square level.
    pub rms_level: f64,
    /// Mean sample value.
    pub dc_offset: f64,
    /// Peak divided by RMS, 0 for silence.
    pub crest_factor: f64,
    /// Number of sign changes between adjacent samples.
    pub zero_crossings: usize,
    /// Zero crossings per second.
    pub zero_crossing_rate: f64,
    /// Peak level in dBFS.
    pub peak_db: f64,
    /// RMS level in dBFS.
    pub rms_db: f64,
    /// Samples at or near full scale.
    pub clipped_samples: usize,
    /// Proportion of samples below the silence threshold.
    pub silence_ratio: f64,
}

impl AudioStats {
    /// Whether any sample reached full scale.
    pub fn is_clipped(&self) -> bool {
        self.clipped_samples > 0
    }
}

/// Converts a linear amplitude to dBFS, floored at [`DB_FLOOR`].
pub fn to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        (20.0 * linear.log10()).max(DB_FLOOR)
    } else {
        DB_FLOOR
    }
}

/// Running totals for [`AudioStats`].
///
/// Samples are consumed one at a time so arbitrarily long input can be
/// analyzed without holding it in memory. Sums are kept in `f64`.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    count: usize,
    peak: f64,
    sum: f64,
    sum_squares: f64,
    crossings: usize,
    clipped: usize,
    silent: usize,
    prev: Option<f32>,
}

impl StatsAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample.
    pub fn push(&mut self, sample: f32) {
        let value = sample as f64;
        let magnitude = value.abs();

        self.count += 1;
        if magnitude > self.peak {
            self.peak = magnitude;
        }
        self.sum += value;
        self.sum_squares += value * value;

        if sample.abs() >= CLIPPING_THRESHOLD {
            self.clipped += 1;
        }
        if sample.abs() < SILENCE_THRESHOLD {
            self.silent += 1;
        }

        if let Some(prev) = self.prev {
            if prev * sample < 0.0 {
                self.crossings += 1;
            }
        }
        self.prev = Some(sample);
    }

    /// Adds every sample of a slice.
    pub fn extend(&mut self, samples: &[f32]) {
        for &s in samples {
            self.push(s);
        }
    }

    /// Number of samples seen so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no sample has been pushed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Produces the statistics. `sample_rate` scales the zero-crossing rate.
    pub fn finish(&self, sample_rate: u32) -> AudioStats {
        if self.count == 0 {
            return AudioStats {
                sample_count: 0,
                peak_level: 0.0,
                rms_level: 0.0,
                dc_offset: 0.0,
                crest_factor: 0.0,
                zero_crossings: 0,
                zero_crossing_rate: 0.0,
                peak_db: DB_FLOOR,
                rms_db: DB_FLOOR,
                clipped_samples: 0,
                silence_ratio: 1.0,
            };
        }

        let n = self.count as f64;
        let rms = (self.sum_squares / n).sqrt();
        let crest_factor = if rms > 0.0 { self.peak / rms } else { 0.0 };

        AudioStats {
            sample_count: self.count,
            peak_level: self.peak,
            rms_level: rms,
            dc_offset: self.sum / n,
            crest_factor,
            zero_crossings: self.crossings,
            zero_crossing_rate: self.crossings as f64 * sample_rate as f64 / n,
            peak_db: to_db(self.peak),
            rms_db: to_db(rms),
            clipped_samples: self.clipped,
            silence_ratio: self.silent as f64 / n,
        }
    }
}

/// Computes statistics for a slice of samples.
pub fn analyze(samples: &[f32], sample_rate: u32) -> AudioStats {
    let mut acc = StatsAccumulator::new();
    acc.extend(samples);
    acc.finish(sample_rate)
}

/// Level of a volume meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeLevel {
    /// Below 30%.
    Low,
    /// Below 70%.
    Medium,
    /// 70% and above.
    High,
}

impl VolumeLevel {
    /// Classifies a meter percentage.
    pub fn from_percent(percent: f64) -> Self {
        if percent < 30.0 {
            VolumeLevel::Low
        } else if percent < 70.0 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::High
        }
    }

    /// Meter colour as a hex string.
    pub fn color_hex(&self) -> &'static str {
        match self {
            VolumeLevel::Low => "#2196F3",
            VolumeLevel::Medium => "#FFA500",
            VolumeLevel::High => "#FF4444",
        }
    }

    /// Meter colour as RGB.
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            VolumeLevel::Low => [0x21, 0x96, 0xF3],
            VolumeLevel::Medium => [0xFF, 0xA5, 0x00],
            VolumeLevel::High => [0xFF, 0x44, 0x44],
        }
    }
}

/// Volume meter reading for a block of samples, in percent.
///
/// The RMS level is mapped as `20*log10(rms) + 90` so that -90 dBFS reads
/// as empty and anything at or above +10 dBFS reads as full.
pub fn volume_percent(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (sum_squares / frame.len() as f64).sqrt();
    let db = 20.0 * rms.max(1e-10).log10();
    (db + 90.0).clamp(0.0, 100.0)
}
