//! Waveform viewport: zoom, pan and axis layout.
//!
//! All positions are in display pixels. The plot area is inset by
//! [`PADDING`] on every side; `offset` scrolls the zoomed content
//! horizontally and is measured in plot pixels, so at zoom `z` the content is
//! `plot_width * z` pixels wide and `offset` ranges over
//! `[0, plot_width * (z - 1)]`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::selection::SelectionRange;

/// Margin around the plot area in pixels.
pub const PADDING: f64 = 40.0;

/// Smallest zoom level.
pub const MIN_ZOOM: f64 = 1.0;

/// Largest zoom level.
pub const MAX_ZOOM: f64 = 50.0;

/// Factor applied by the zoom buttons.
pub const ZOOM_STEP: f64 = 1.5;

/// Base of the per-notch wheel zoom factor.
pub const WHEEL_ZOOM_BASE: f64 = 1.1;

/// Length of an animated zoom in seconds.
pub const ZOOM_ANIMATION_SECS: f64 = 0.3;

/// Share of the view a zoomed-to selection occupies.
pub const SELECTION_ZOOM_FILL: f64 = 0.9;

/// Candidate tick spacings in seconds.
pub const TIME_INTERVALS: &[f64] = &[
    0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0,
];

/// Desired number of time ticks across the view.
pub const TARGET_TIME_STEPS: f64 = 10.0;

/// Amplitude axis ticks.
pub const AMPLITUDE_TICKS: &[f64] = &[-1.0, -0.5, 0.0, 0.5, 1.0];

fn clamp_zoom(level: f64) -> f64 {
    if level.is_nan() {
        MIN_ZOOM
    } else {
        level.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanGesture {
    start_x: f64,
    start_offset: f64,
}

/// Visible window onto a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Zoom level in [1, 50].
    pub zoom: f64,
    /// Horizontal scroll in plot pixels.
    pub offset: f64,
    /// Clip duration in seconds.
    pub duration: f64,
    #[serde(skip)]
    pan: Option<PanGesture>,
}

impl Viewport {
    /// Creates a viewport showing the whole clip.
    pub fn new(width: f64, height: f64, duration: f64) -> Self {
        Self {
            width,
            height,
            zoom: MIN_ZOOM,
            offset: 0.0,
            duration: duration.max(0.0),
            pan: None,
        }
    }

    /// Width of the plot area, never below one pixel.
    pub fn plot_width(&self) -> f64 {
        (self.width - 2.0 * PADDING).max(1.0)
    }

    /// Height of the plot area, never below one pixel.
    pub fn plot_height(&self) -> f64 {
        (self.height - 2.0 * PADDING).max(1.0)
    }

    /// Horizontal scale at the current zoom.
    pub fn pixels_per_second(&self) -> f64 {
        if self.duration > 0.0 {
            self.plot_width() * self.zoom / self.duration
        } else {
            0.0
        }
    }

    /// Time at the left edge of the plot.
    pub fn view_start_time(&self) -> f64 {
        let pps = self.pixels_per_second();
        if pps > 0.0 {
            self.offset / pps
        } else {
            0.0
        }
    }

    /// Time span covered by the plot.
    pub fn view_duration(&self) -> f64 {
        self.duration / self.zoom
    }

    /// Time at the right edge of the plot.
    pub fn view_end_time(&self) -> f64 {
        self.view_start_time() + self.view_duration()
    }

    /// Time under a plot-relative x position, clamped to the clip.
    pub fn time_at(&self, x: f64) -> f64 {
        let pps = self.pixels_per_second();
        if pps > 0.0 {
            ((x + self.offset) / pps).clamp(0.0, self.duration)
        } else {
            0.0
        }
    }

    /// Plot-relative x position of a time. May fall outside the plot.
    pub fn x_at(&self, time: f64) -> f64 {
        time * self.pixels_per_second() - self.offset
    }

    /// Sample indices inside the view.
    pub fn visible_sample_range(&self, sample_rate: u32, len: usize) -> Range<usize> {
        let rate = sample_rate as f64;
        let start = ((self.view_start_time() * rate).floor().max(0.0) as usize).min(len);
        let end = ((self.view_end_time() * rate).ceil().max(0.0) as usize).min(len);
        start..end.max(start)
    }

    /// Largest valid offset at the current zoom.
    pub fn max_offset(&self) -> f64 {
        self.plot_width() * (self.zoom - 1.0)
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.clamp(0.0, self.max_offset().max(0.0));
    }

    /// Scrolls so `time` sits in the middle of the plot, as far as the clip allows.
    pub fn center_on(&mut self, time: f64) {
        self.offset = time * self.pixels_per_second() - self.plot_width() / 2.0;
        self.clamp_offset();
    }

    /// Sets the zoom level, keeping the view centre fixed.
    pub fn set_zoom(&mut self, level: f64) {
        if self.duration <= 0.0 {
            return;
        }
        let center = self.view_start_time() + self.view_duration() / 2.0;
        self.zoom = clamp_zoom(level);
        self.center_on(center);
        tracing::debug!(zoom = self.zoom, offset = self.offset, "Zoom changed");
    }

    /// Zooms in one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    /// Zooms out one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Zoom level a wheel event should animate towards.
    ///
    /// Only the sign of `delta_y` matters: scrolling up zooms in.
    pub fn wheel_target(&self, delta_y: f64) -> f64 {
        if delta_y == 0.0 || delta_y.is_nan() {
            return self.zoom;
        }
        let factor = WHEEL_ZOOM_BASE.powf(-delta_y.signum());
        clamp_zoom(self.zoom * factor)
    }

    /// Starts an animated zoom that keeps `anchor_time` centred.
    pub fn animate_zoom(&self, target: f64, anchor_time: f64) -> ZoomAnimation {
        ZoomAnimation::new(self.zoom, clamp_zoom(target), anchor_time)
    }

    /// Starts a drag-pan at plot x. Returns false when not zoomed in.
    pub fn begin_pan(&mut self, x: f64) -> bool {
        if self.zoom <= MIN_ZOOM {
            return false;
        }
        self.pan = Some(PanGesture {
            start_x: x,
            start_offset: self.offset,
        });
        true
    }

    /// Moves an active pan. Returns true when the offset changed.
    pub fn pan_to(&mut self, x: f64) -> bool {
        let Some(pan) = self.pan else {
            return false;
        };
        let previous = self.offset;
        self.offset = pan.start_offset - (x - pan.start_x);
        self.clamp_offset();
        self.offset != previous
    }

    /// Ends an active pan.
    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    /// Whether a pan is in progress.
    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Zooms so the selection fills most of the plot and centres it.
    pub fn zoom_to_selection(&mut self, range: &SelectionRange) {
        let len = range.duration();
        if self.duration <= 0.0 || len <= 0.0 {
            return;
        }
        self.zoom = clamp_zoom(self.duration / len * SELECTION_ZOOM_FILL);
        self.center_on(range.center());
        tracing::debug!(
            zoom = self.zoom,
            start = range.start,
            end = range.end,
            "Zoomed to selection"
        );
    }

    /// Shows the whole clip again.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.offset = 0.0;
        self.pan = None;
    }

    /// Changes the canvas size, keeping the view start time.
    pub fn resize(&mut self, width: f64, height: f64) {
        let start = self.view_start_time();
        self.width = width;
        self.height = height;
        self.offset = start * self.pixels_per_second();
        self.clamp_offset();
    }

    /// Time ticks inside the view as `(time, plot x)` pairs.
    pub fn time_ticks(&self) -> Vec<(f64, f64)> {
        let view_duration = self.view_duration();
        if view_duration <= 0.0 {
            return Vec::new();
        }
        let interval = time_interval(view_duration);
        let start = self.view_start_time();
        let end = start + view_duration;
        let first = (start / interval).ceil();
        let plot_width = self.plot_width();

        let mut ticks = Vec::new();
        let mut k = first;
        loop {
            let time = k * interval;
            if time > end + 1e-9 {
                break;
            }
            let x = self.x_at(time);
            if (-1e-6..=plot_width + 1e-6).contains(&x) {
                ticks.push((time, x.clamp(0.0, plot_width)));
            }
            k += 1.0;
        }
        ticks
    }

    /// Zoom as a percentage above 1x, as shown next to the zoom buttons.
    pub fn zoom_percent(&self) -> i64 {
        ((self.zoom - 1.0) * 100.0).round() as i64
    }

    /// Vertical pixel of an amplitude in [-1, 1]; positive values go up.
    pub fn y_at(&self, amplitude: f64) -> f64 {
        self.height / 2.0 - amplitude * self.plot_height() / 2.0
    }
}

/// Picks the tick spacing giving at most ten steps across `view_duration`.
pub fn time_interval(view_duration: f64) -> f64 {
    let raw = view_duration / TARGET_TIME_STEPS;
    TIME_INTERVALS
        .iter()
        .copied()
        .find(|&interval| interval >= raw)
        .unwrap_or(TIME_INTERVALS[TIME_INTERVALS.len() - 1])
}

/// An in-flight zoom animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomAnimation {
    /// Zoom at the start.
    pub from: f64,
    /// Zoom at the end.
    pub to: f64,
    /// Time kept centred while zooming.
    pub anchor_time: f64,
    /// Animation length in seconds.
    pub duration: f64,
}

impl ZoomAnimation {
    /// Creates an animation of the default length.
    pub fn new(from: f64, to: f64, anchor_time: f64) -> Self {
        Self {
            from,
            to,
            anchor_time,
            duration: ZOOM_ANIMATION_SECS,
        }
    }

    /// Zoom level `elapsed` seconds in, eased out cubically.
    pub fn zoom_at(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (elapsed / self.duration).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.from + (self.to - self.from) * eased
    }

    /// Whether the animation has reached its target.
    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }

    /// Applies the animation frame at `elapsed` to a viewport.
    pub fn apply(&self, viewport: &mut Viewport, elapsed: f64) {
        viewport.zoom = clamp_zoom(self.zoom_at(elapsed));
        viewport.center_on(self.anchor_time);
    }
}

/// Per-column `(min, max)` peaks of a sample range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformColumns {
    /// One `(min, max)` pair per column.
    pub peaks: Vec<(f32, f32)>,
}

impl WaveformColumns {
    /// Reduces `samples[range]` to `columns` min/max pairs.
    ///
    /// When there are fewer samples than columns, each column takes the
    /// sample under it. Non-finite samples are skipped.
    pub fn compute(samples: &[f32], range: Range<usize>, columns: usize) -> Self {
        let start = range.start.min(samples.len());
        let end = range.end.min(samples.len()).max(start);
        let slice = &samples[start..end];

        if columns == 0 || slice.is_empty() {
            return Self {
                peaks: vec![(0.0, 0.0); columns],
            };
        }

        let len = slice.len();
        let peaks = (0..columns)
            .map(|c| {
                let lo = c * len / columns;
                let hi = ((c + 1) * len / columns).max(lo + 1).min(len);
                let mut min = f32::INFINITY;
                let mut max = f32::NEG_INFINITY;
                for &s in slice[lo.min(len - 1)..hi].iter().filter(|s| s.is_finite()) {
                    min = min.min(s);
                    max = max.max(s);
                }
                if min > max {
                    (0.0, 0.0)
                } else {
                    (min, max)
                }
            })
            .collect();

        Self { peaks }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Whether there are no columns.
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        // 1000 px of plot for a 10 s clip
        Viewport::new(1080.0, 280.0, 10.0)
    }

    #[test]
    fn test_unzoomed_mapping() {
        let vp = viewport();
        assert_eq!(vp.plot_width(), 1000.0);
        assert_eq!(vp.pixels_per_second(), 100.0);
        assert_eq!(vp.view_start_time(), 0.0);
        assert_eq!(vp.view_duration(), 10.0);
        assert_eq!(vp.time_at(250.0), 2.5);
        assert_eq!(vp.x_at(2.5), 250.0);
        assert_eq!(vp.time_at(5000.0), 10.0);
    }

    #[test]
    fn test_set_zoom_keeps_centre() {
        let mut vp = viewport();
        vp.set_zoom(4.0);
        assert_eq!(vp.zoom, 4.0);
        let centre = vp.view_start_time() + vp.view_duration() / 2.0;
        assert!((centre - 5.0).abs() < 1e-9);
        assert!((vp.view_start_time() - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.set_zoom(500.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.set_zoom(0.1);
        assert_eq!(vp.zoom, MIN_ZOOM);
        assert_eq!(vp.offset, 0.0);
    }

    #[test]
    fn test_zoom_buttons() {
        let mut vp = viewport();
        vp.zoom_in();
        assert!((vp.zoom - 1.5).abs() < 1e-12);
        assert_eq!(vp.zoom_percent(), 50);
        vp.zoom_out();
        assert!((vp.zoom - 1.0).abs() < 1e-12);
        assert_eq!(vp.zoom_percent(), 0);
    }

    #[test]
    fn test_wheel_target() {
        let mut vp = viewport();
        assert!((vp.wheel_target(-120.0) - 1.1).abs() < 1e-12);
        assert_eq!(vp.wheel_target(120.0), 1.0);
        assert_eq!(vp.wheel_target(0.0), 1.0);
        vp.set_zoom(2.0);
        assert!((vp.wheel_target(3.0) - 2.0 / 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_animation_eases_out() {
        let anim = ZoomAnimation::new(1.0, 2.0, 5.0);
        assert_eq!(anim.zoom_at(0.0), 1.0);
        assert_eq!(anim.zoom_at(0.3), 2.0);
        assert_eq!(anim.zoom_at(1.0), 2.0);
        // ease-out: past the halfway zoom at half time
        assert!(anim.zoom_at(0.15) > 1.5);
        assert!(!anim.is_finished(0.2));
        assert!(anim.is_finished(0.3));
    }

    #[test]
    fn test_zoom_animation_centres_anchor() {
        let mut vp = viewport();
        let anim = vp.animate_zoom(5.0, 7.0);
        anim.apply(&mut vp, 0.3);
        assert_eq!(vp.zoom, 5.0);
        let centre = vp.view_start_time() + vp.view_duration() / 2.0;
        assert!((centre - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_requires_zoom() {
        let mut vp = viewport();
        assert!(!vp.begin_pan(100.0));
        assert!(!vp.pan_to(50.0));

        vp.set_zoom(2.0);
        let start = vp.offset;
        assert!(vp.begin_pan(100.0));
        assert!(vp.pan_to(50.0));
        assert_eq!(vp.offset, start + 50.0);
        vp.pan_to(-5000.0);
        assert_eq!(vp.offset, vp.max_offset());
        vp.pan_to(5000.0);
        assert_eq!(vp.offset, 0.0);
        vp.end_pan();
        assert!(!vp.is_panning());
    }

    #[test]
    fn test_zoom_to_selection() {
        let mut vp = viewport();
        vp.zoom_to_selection(&SelectionRange::new(4.0, 5.0));
        assert!((vp.zoom - 9.0).abs() < 1e-9);
        let centre = vp.view_start_time() + vp.view_duration() / 2.0;
        assert!((centre - 4.5).abs() < 1e-9);

        vp.zoom_to_selection(&SelectionRange::new(0.0, 0.01));
        assert_eq!(vp.zoom, MAX_ZOOM);
        assert_eq!(vp.offset, 0.0);

        vp.reset();
        assert_eq!(vp.zoom, 1.0);
        assert_eq!(vp.offset, 0.0);
    }

    #[test]
    fn test_resize_keeps_start_time() {
        let mut vp = viewport();
        vp.set_zoom(4.0);
        let start = vp.view_start_time();
        vp.resize(580.0, 200.0);
        assert_eq!(vp.plot_width(), 500.0);
        assert!((vp.view_start_time() - start).abs() < 1e-9);
    }

    #[test]
    fn test_time_interval() {
        assert_eq!(time_interval(10.0), 1.0);
        assert_eq!(time_interval(0.005), 0.001);
        assert_eq!(time_interval(3.0), 0.5);
        assert_eq!(time_interval(500.0), 5.0);
    }

    #[test]
    fn test_time_ticks() {
        let vp = viewport();
        let ticks = vp.time_ticks();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0], (0.0, 0.0));
        assert!((ticks[10].1 - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_visible_sample_range() {
        let mut vp = viewport();
        assert_eq!(vp.visible_sample_range(100, 1000), 0..1000);
        vp.set_zoom(2.0);
        assert_eq!(vp.visible_sample_range(100, 1000), 250..750);
    }

    #[test]
    fn test_empty_clip_is_inert() {
        let mut vp = Viewport::new(800.0, 300.0, 0.0);
        vp.set_zoom(10.0);
        assert_eq!(vp.zoom, 1.0);
        assert_eq!(vp.time_at(100.0), 0.0);
        assert!(vp.time_ticks().is_empty());
    }

    #[test]
    fn test_columns_min_max() {
        let samples = [0.1, -0.5, 0.3, 0.9, -0.2, 0.0];
        let cols = WaveformColumns::compute(&samples, 0..6, 3);
        assert_eq!(cols.peaks, vec![(-0.5, 0.1), (0.3, 0.9), (-0.2, 0.0)]);
    }

    #[test]
    fn test_columns_sparse_samples() {
        let samples = [0.5, -0.5];
        let cols = WaveformColumns::compute(&samples, 0..2, 4);
        assert_eq!(cols.len(), 4);
        assert_eq!(cols.peaks[0], (0.5, 0.5));
        assert_eq!(cols.peaks[3], (-0.5, -0.5));
    }

    #[test]
    fn test_columns_empty_range() {
        let cols = WaveformColumns::compute(&[0.5; 4], 10..20, 3);
        assert_eq!(cols.peaks, vec![(0.0, 0.0); 3]);
    }

    #[test]
    fn test_y_axis_points_up() {
        let vp = viewport();
        assert_eq!(vp.y_at(0.0), 140.0);
        assert_eq!(vp.y_at(1.0), 40.0);
        assert_eq!(vp.y_at(-1.0), 240.0);
    }
}
