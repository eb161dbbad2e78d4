//! Frequency analysis of a playback frame.
//!
//! The analyzer follows the usual real-time analyser model: a Blackman
//! window, an FFT, magnitudes normalized by the frame length, exponential
//! smoothing over time and a byte-scaled view for drawing bars.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::{PcmError, PcmResult};

/// Frequencies labelled on the spectrum axis.
pub const FREQUENCY_TICKS_HZ: &[f64] = &[0.0, 5000.0, 10000.0, 15000.0, 20000.0];

/// dB values labelled on the spectrum axis.
pub const DB_TICKS: &[f64] = &[-60.0, -48.0, -36.0, -24.0, -12.0, 0.0];

/// dB value reported for bins with no energy.
pub const SILENT_BIN_DB: f32 = -200.0;

/// Smallest supported FFT size.
pub const MIN_FFT_SIZE: usize = 32;

/// Largest supported FFT size.
pub const MAX_FFT_SIZE: usize = 32768;

/// Analyzer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Frame length in samples; a power of two.
    pub fft_size: usize,
    /// Weight given to the previous frame, in [0, 1).
    pub smoothing: f32,
    /// dB value mapped to byte 0.
    pub min_db: f32,
    /// dB value mapped to byte 255.
    pub max_db: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.3,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl SpectrumConfig {
    /// Checks the parameters.
    pub fn validate(&self) -> PcmResult<()> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(PcmError::invalid_param(
                "fft_size",
                format!(
                    "must be a power of two between {} and {}, got {}",
                    MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
                ),
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(PcmError::invalid_param(
                "smoothing",
                format!("must be in [0, 1), got {}", self.smoothing),
            ));
        }
        if !(self.min_db < self.max_db) {
            return Err(PcmError::invalid_param(
                "min_db",
                format!("must be below max_db ({} >= {})", self.min_db, self.max_db),
            ));
        }
        Ok(())
    }

    /// Number of frequency bins produced per frame.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Extracts the analysis frame centred on `sample_index`.
///
/// The frame starts half a frame before the index (never before 0) and is
/// zero-padded when the clip ends early.
pub fn frame_at(samples: &[f32], sample_index: usize, fft_size: usize) -> Vec<f32> {
    let start = sample_index.saturating_sub(fft_size / 2).min(samples.len());
    let end = (start + fft_size).min(samples.len());
    let mut frame = samples[start..end].to_vec();
    frame.resize(fft_size, 0.0);
    frame
}

/// One analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Byte-scaled magnitudes, one per bin.
    pub bins: Vec<u8>,
    /// Smoothed magnitudes in dB, one per bin.
    pub magnitudes_db: Vec<f32>,
    /// Width of a bin in Hz.
    pub bin_hz: f64,
}

impl Spectrum {
    /// Centre frequency of a bin.
    pub fn frequency_of(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz
    }

    /// Frequency of the loudest bin above DC, or 0 for an empty spectrum.
    pub fn dominant_frequency(&self) -> f64 {
        self.magnitudes_db
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, &db)| db > SILENT_BIN_DB)
            .fold(None::<(usize, f32)>, |best, (i, &db)| match best {
                Some((_, best_db)) if best_db >= db => best,
                _ => Some((i, db)),
            })
            .map(|(i, _)| self.frequency_of(i))
            .unwrap_or(0.0)
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Whether the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Stateful frame analyzer with time smoothing.
pub struct SpectrumAnalyzer {
    config: SpectrumConfig,
    sample_rate: u32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer")
            .field("config", &self.config)
            .field("sample_rate", &self.sample_rate)
            .finish_non_exhaustive()
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    const ALPHA: f64 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..size)
        .map(|i| {
            let x = i as f64 / size as f64;
            (a0 - a1 * (2.0 * std::f64::consts::PI * x).cos()
                + a2 * (4.0 * std::f64::consts::PI * x).cos()) as f32
        })
        .collect()
}

impl SpectrumAnalyzer {
    /// Creates an analyzer for the given sample rate.
    pub fn new(config: SpectrumConfig, sample_rate: u32) -> PcmResult<Self> {
        config.validate()?;
        if sample_rate == 0 {
            return Err(PcmError::InvalidSampleRate { rate: sample_rate });
        }
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = blackman_window(config.fft_size);
        let smoothed = vec![0.0; config.bin_count()];
        Ok(Self {
            config,
            sample_rate,
            fft,
            window,
            smoothed,
        })
    }

    /// Analyzer parameters.
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Clears the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Analyzes one frame. Frames shorter than the FFT size are zero-padded.
    pub fn process(&mut self, frame: &[f32]) -> Spectrum {
        let n = self.config.fft_size;
        let mut buffer: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let s = frame.get(i).copied().unwrap_or(0.0);
                let s = if s.is_finite() { s } else { 0.0 };
                Complex::new(s * self.window[i], 0.0)
            })
            .collect();

        self.fft.process(&mut buffer);

        let tau = self.config.smoothing;
        let range = self.config.max_db - self.config.min_db;
        let mut bins = Vec::with_capacity(self.smoothed.len());
        let mut magnitudes_db = Vec::with_capacity(self.smoothed.len());

        for (prev, c) in self.smoothed.iter_mut().zip(buffer.iter()) {
            let magnitude = c.norm() / n as f32;
            *prev = tau * *prev + (1.0 - tau) * magnitude;

            let db = if *prev > 0.0 {
                20.0 * prev.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = (255.0 * (db - self.config.min_db) / range).floor();
            bins.push(scaled.clamp(0.0, 255.0) as u8);
            magnitudes_db.push(db.max(SILENT_BIN_DB));
        }

        Spectrum {
            bins,
            magnitudes_db,
            bin_hz: self.sample_rate as f64 / n as f64,
        }
    }

    /// Analyzes the frame centred on `sample_index`.
    pub fn process_at(&mut self, samples: &[f32], sample_index: usize) -> Spectrum {
        let frame = frame_at(samples, sample_index, self.config.fft_size);
        self.process(&frame)
    }
}

/// Analyzes the frame at `sample_index` with a fresh analyzer.
pub fn analyze_at(
    samples: &[f32],
    sample_rate: u32,
    sample_index: usize,
    config: &SpectrumConfig,
) -> PcmResult<Spectrum> {
    let mut analyzer = SpectrumAnalyzer::new(config.clone(), sample_rate)?;
    Ok(analyzer.process_at(samples, sample_index))
}

/// Bar height in pixels for a byte magnitude.
///
/// The curve lifts quiet bins so low-level content stays visible.
pub fn bar_height(value: u8, plot_height: f64) -> f64 {
    (value as f64 / 255.0).powf(0.8) * plot_height
}

/// Frequency ticks that fall at or below the Nyquist frequency.
pub fn frequency_ticks(sample_rate: u32) -> Vec<f64> {
    let nyquist = sample_rate as f64 / 2.0;
    FREQUENCY_TICKS_HZ
        .iter()
        .copied()
        .filter(|&f| f <= nyquist)
        .collect()
}

/// Axis label for a frequency tick, e.g. `0` or `15k`.
pub fn frequency_label(hz: f64) -> String {
    if hz == 0.0 {
        "0".to_string()
    } else {
        format!("{}k", hz / 1000.0)
    }
}
