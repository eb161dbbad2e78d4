//! Loading a clip and the interactive state around it.

use std::path::Path;

use crate::decode::decode;
use crate::error::{PcmError, PcmResult};
use crate::export::{export_range, ExportEncoding};
use crate::format::PcmFormat;
use crate::selection::{MarkerList, Selection, SelectionRange};
use crate::spectrum::{analyze_at, Spectrum, SpectrumConfig};
use crate::stats::{analyze, AudioStats};
use crate::transport::{Clock, Transport, TransportEvent};
use crate::validate::{validate, ValidationOptions, ValidationReport};
use crate::view::{Viewport, ZoomAnimation, MIN_ZOOM};

/// File extensions accepted as raw PCM.
pub const RAW_PCM_EXTENSIONS: &[&str] = &["pcm", "raw"];

/// Whether a path looks like a raw PCM file.
pub fn is_raw_pcm_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            RAW_PCM_EXTENSIONS
                .iter()
                .any(|ext| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// A decoded clip with its validation report and statistics.
#[derive(Debug, Clone)]
pub struct PcmClip {
    bytes: Vec<u8>,
    samples: Vec<f32>,
    format: PcmFormat,
    validation: ValidationReport,
    stats: AudioStats,
    hash: String,
}

impl PcmClip {
    /// Validates, decodes and analyzes a buffer.
    ///
    /// Validation findings never fail the load; only data with no complete
    /// sample is rejected.
    pub fn load(bytes: &[u8], format: PcmFormat, options: &ValidationOptions) -> PcmResult<Self> {
        let validation = validate(bytes, &format, options);

        if bytes.is_empty() {
            return Err(PcmError::EmptyData);
        }
        if bytes.len() < format.bytes_per_sample() {
            return Err(PcmError::TooShort {
                len: bytes.len(),
                bytes_per_sample: format.bytes_per_sample(),
            });
        }

        for issue in validation.warnings.iter() {
            tracing::warn!(code = %issue.code, "{}", issue.message);
        }

        let samples = decode(bytes, &format);
        let stats = analyze(&samples, format.sample_rate);
        let hash = blake3::hash(bytes).to_hex().to_string();

        tracing::info!(
            bytes = bytes.len(),
            samples = samples.len(),
            format = %format,
            warnings = validation.warnings.len(),
            "Loaded PCM clip"
        );

        Ok(Self {
            bytes: bytes.to_vec(),
            samples,
            format,
            validation,
            stats,
            hash,
        })
    }

    /// Reads and loads a file.
    pub fn load_file(
        path: &Path,
        format: PcmFormat,
        options: &ValidationOptions,
    ) -> PcmResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes, format, options)
    }

    /// Decoded samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Declared format.
    pub fn format(&self) -> &PcmFormat {
        &self.format
    }

    /// Validation findings.
    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    /// Signal statistics.
    pub fn stats(&self) -> &AudioStats {
        &self.stats
    }

    /// Length in seconds of the whole samples.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.format.sample_rate as f64
    }

    /// Size of the loaded buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// The buffer as loaded, including any trailing partial sample.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// BLAKE3 hash of the loaded bytes, hex encoded.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Which pointer button started a drag on the waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Drags pan the zoomed view.
    Primary,
    /// Drags select a range.
    Secondary,
}

/// A clip plus everything a waveform view needs to interact with it.
#[derive(Debug)]
pub struct Session {
    clip: PcmClip,
    /// Visible window.
    pub viewport: Viewport,
    /// Current selection.
    pub selection: Selection,
    /// Timeline markers.
    pub markers: MarkerList,
    /// Playback position.
    pub transport: Transport,
    /// Analyzer settings for the spectrum view.
    pub spectrum_config: SpectrumConfig,
}

impl Session {
    /// Opens a session on a clip with a canvas of the given size.
    pub fn new(clip: PcmClip, width: f64, height: f64) -> Self {
        let viewport = Viewport::new(width, height, clip.duration());
        let transport = Transport::new(clip.samples().len(), clip.format().sample_rate);
        Self {
            clip,
            viewport,
            selection: Selection::new(),
            markers: MarkerList::new(),
            transport,
            spectrum_config: SpectrumConfig::default(),
        }
    }

    /// The loaded clip.
    pub fn clip(&self) -> &PcmClip {
        &self.clip
    }

    /// Handles a pointer press at plot x.
    pub fn pointer_down(&mut self, x: f64, button: PointerButton) {
        match button {
            PointerButton::Primary => {
                self.viewport.begin_pan(x);
            }
            PointerButton::Secondary => {
                let time = self.viewport.time_at(x);
                self.selection.begin(time);
            }
        }
    }

    /// Handles pointer movement at plot x.
    pub fn pointer_move(&mut self, x: f64) {
        if self.selection.is_dragging() {
            let x = x.clamp(0.0, self.viewport.plot_width());
            self.selection.update(self.viewport.time_at(x));
        } else if self.viewport.is_panning() {
            self.viewport.pan_to(x);
        }
    }

    /// Handles a pointer release. A committed selection is zoomed to.
    pub fn pointer_up(&mut self) -> Option<SelectionRange> {
        if self.selection.is_dragging() {
            let range = self.selection.finish();
            if let Some(range) = range {
                self.viewport.zoom_to_selection(&range);
            }
            return range;
        }
        self.viewport.end_pan();
        None
    }

    /// Animation for a wheel event at plot x, if the zoom would change.
    pub fn wheel(&self, delta_y: f64, x: f64) -> Option<ZoomAnimation> {
        let target = self.viewport.wheel_target(delta_y);
        if target == self.viewport.zoom {
            return None;
        }
        Some(self.viewport.animate_zoom(target, self.viewport.time_at(x)))
    }

    /// Animation back to the full view, anchored at the double-clicked time.
    pub fn double_click(&self, x: f64) -> ZoomAnimation {
        self.viewport.animate_zoom(MIN_ZOOM, self.viewport.time_at(x))
    }

    /// Shows the whole clip and drops the selection.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.selection.clear();
    }

    /// Starts or pauses playback.
    pub fn toggle_playback(&mut self, clock: &dyn Clock) {
        self.transport.toggle(clock);
    }

    /// Advances playback; see [`Transport::tick`].
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<TransportEvent> {
        self.transport.tick(clock)
    }

    /// Seeks to a fraction of the clip.
    pub fn seek(&mut self, progress: f64, clock: &dyn Clock) {
        self.transport.seek(progress, clock);
    }

    /// Steps one frame and returns the new sample index.
    pub fn step_frame(&mut self, direction: i32, clock: &dyn Clock) -> usize {
        self.transport.step_frame(direction, clock)
    }

    /// Spectrum of the frame under the playhead.
    pub fn spectrum_at_playhead(&self, clock: &dyn Clock) -> PcmResult<Spectrum> {
        analyze_at(
            self.clip.samples(),
            self.clip.format().sample_rate,
            self.transport.current_sample(clock),
            &self.spectrum_config,
        )
    }

    /// Adds a marker at the playhead.
    pub fn mark_playhead(&mut self, label: impl Into<String>, clock: &dyn Clock) -> usize {
        let position = self.transport.position(clock);
        self.markers.add(position, label)
    }

    /// Encodes the current selection.
    pub fn export_selection(&self, encoding: ExportEncoding) -> PcmResult<Vec<u8>> {
        let range = self.selection.range().ok_or(PcmError::NoSelection)?;
        export_range(&self.clip, &range, encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode;
    use crate::format::Endianness;
    use crate::transport::ManualClock;

    fn clip() -> PcmClip {
        let format = PcmFormat::from_parts(8000, 16, false, Endianness::Little).unwrap();
        let samples: Vec<f32> = (0..80_000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin() * 0.5)
            .collect();
        PcmClip::load(&encode(&samples, &format), format, &ValidationOptions::default()).unwrap()
    }

    #[test]
    fn test_load_clip() {
        let clip = clip();
        assert_eq!(clip.samples().len(), 80_000);
        assert_eq!(clip.duration(), 10.0);
        assert_eq!(clip.byte_len(), 160_000);
        assert!(clip.validation().ok);
        assert!((clip.stats().peak_level - 0.5).abs() < 1e-3);
        assert_eq!(clip.hash().len(), 64);
    }

    #[test]
    fn test_load_rejects_unusable_input() {
        let format = PcmFormat::default();
        let options = ValidationOptions::default();
        assert!(matches!(
            PcmClip::load(&[], format, &options),
            Err(PcmError::EmptyData)
        ));
        assert!(matches!(
            PcmClip::load(&[0, 0], format, &options),
            Err(PcmError::TooShort { len: 2, .. })
        ));
    }

    #[test]
    fn test_load_keeps_warnings() {
        let format = PcmFormat::from_parts(8000, 16, false, Endianness::Little).unwrap();
        let clip = PcmClip::load(&[0, 0, 0], format, &ValidationOptions::default()).unwrap();
        assert_eq!(clip.samples().len(), 1);
        assert_eq!(clip.validation().warnings.len(), 1);
    }

    #[test]
    fn test_raw_pcm_extensions() {
        assert!(is_raw_pcm_path(Path::new("a.pcm")));
        assert!(is_raw_pcm_path(Path::new("b.RAW")));
        assert!(!is_raw_pcm_path(Path::new("c.wav")));
        assert!(!is_raw_pcm_path(Path::new("pcm")));
    }

    #[test]
    fn test_select_then_export() {
        let mut session = Session::new(clip(), 1080.0, 300.0);
        session.pointer_down(200.0, PointerButton::Secondary);
        session.pointer_move(300.0);
        let range = session.pointer_up().unwrap();
        assert!((range.start - 2.0).abs() < 1e-9);
        assert!((range.end - 3.0).abs() < 1e-9);
        assert!(session.viewport.zoom > 1.0);

        let bytes = session.export_selection(ExportEncoding::Float32Le).unwrap();
        assert_eq!(bytes.len(), 8000 * 4);
    }

    #[test]
    fn test_export_without_selection() {
        let session = Session::new(clip(), 1080.0, 300.0);
        assert!(matches!(
            session.export_selection(ExportEncoding::Source),
            Err(PcmError::NoSelection)
        ));
    }

    #[test]
    fn test_pan_with_primary_button() {
        let mut session = Session::new(clip(), 1080.0, 300.0);
        session.viewport.set_zoom(2.0);
        let before = session.viewport.offset;
        session.pointer_down(500.0, PointerButton::Primary);
        session.pointer_move(400.0);
        assert_eq!(session.pointer_up(), None);
        assert_eq!(session.viewport.offset, before + 100.0);
        assert!(!session.viewport.is_panning());
    }

    #[test]
    fn test_wheel_and_double_click() {
        let mut session = Session::new(clip(), 1080.0, 300.0);
        assert!(session.wheel(10.0, 500.0).is_none());
        let anim = session.wheel(-10.0, 500.0).unwrap();
        assert!((anim.to - 1.1).abs() < 1e-12);
        assert_eq!(anim.anchor_time, 5.0);
        anim.apply(&mut session.viewport, 1.0);

        let back = session.double_click(500.0);
        assert_eq!(back.to, 1.0);
        back.apply(&mut session.viewport, 1.0);
        assert_eq!(session.viewport.zoom, 1.0);
        assert_eq!(session.viewport.offset, 0.0);
    }

    #[test]
    fn test_playhead_spectrum_and_markers() {
        let mut session = Session::new(clip(), 1080.0, 300.0);
        let clock = ManualClock::new();
        session.seek(0.5, &clock);
        let spectrum = session.spectrum_at_playhead(&clock).unwrap();
        assert!((spectrum.dominant_frequency() - 440.0).abs() <= spectrum.bin_hz);

        assert_eq!(session.mark_playhead("middle", &clock), 0);
        assert_eq!(session.markers.iter().next().map(|m| m.position), Some(5.0));
        assert_eq!(session.step_frame(1, &clock), 40_160);

        session.reset_view();
        assert_eq!(session.selection.range(), None);
    }
}
