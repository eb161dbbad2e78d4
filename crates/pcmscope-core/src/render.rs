//! Raster rendering of the waveform and spectrum views.
//!
//! Images are plain RGBA buffers encoded with fixed PNG settings so the same
//! input always produces byte-identical files.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

use crate::error::PcmResult;
use crate::selection::{MarkerList, SelectionRange};
use crate::spectrum::{bar_height, frequency_ticks, Spectrum, DB_TICKS};
use crate::view::{Viewport, WaveformColumns, AMPLITUDE_TICKS, PADDING};

/// RGBA colour.
pub type Color = [u8; 4];

/// Canvas background.
pub const BACKGROUND: Color = [0xFF, 0xFF, 0xFF, 0xFF];
/// Centre line, axes and tick marks.
pub const GRID: Color = [0xDD, 0xDD, 0xDD, 0xFF];
/// Waveform stroke.
pub const WAVEFORM: Color = [0x21, 0x96, 0xF3, 0xFF];
/// Selection fill.
pub const SELECTION_FILL: Color = [0x21, 0x96, 0xF3, 51];
/// Selection edges.
pub const SELECTION_EDGE: Color = [0x21, 0x96, 0xF3, 204];
/// Playhead line.
pub const PLAYHEAD: Color = [0xFF, 0x44, 0x44, 0xFF];
/// Marker lines.
pub const MARKER: Color = [0xFF, 0x00, 0x00, 0xFF];
/// Highlight on top of each spectrum bar.
pub const BAR_CAP: Color = [0xFF, 0xFF, 0xFF, 204];

/// Spectrum bar gradient, top to bottom.
pub const SPECTRUM_GRADIENT: &[(f64, [u8; 3])] = &[
    (0.0, [0xFF, 0x00, 0x33]),
    (0.3, [0xFF, 0x66, 0x00]),
    (0.6, [0x00, 0xCC, 0x00]),
    (1.0, [0x00, 0x33, 0xCC]),
];

const TICK_LENGTH: f64 = 3.0;
const BAR_CAP_HEIGHT: f64 = 3.0;
const DASH: usize = 5;

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

/// An RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Creates a canvas filled with `background`. Zero sizes become 1.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = background
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at a pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Composites `color` over one pixel. Out-of-bounds writes are ignored.
    pub fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let alpha = color[3] as u32;
        if alpha == 255 {
            self.pixels[i..i + 4].copy_from_slice(&color);
            return;
        }
        for c in 0..3 {
            let dst = self.pixels[i + c] as u32;
            let src = color[c] as u32;
            self.pixels[i + c] = ((src * alpha + dst * (255 - alpha) + 127) / 255) as u8;
        }
        let dst_alpha = self.pixels[i + 3] as u32;
        self.pixels[i + 3] = (alpha + dst_alpha * (255 - alpha) / 255).min(255) as u8;
    }

    /// Fills a rectangle given in pixel coordinates.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = x.round() as i64;
        let x1 = (x + w).round() as i64;
        let y0 = y.round() as i64;
        let y1 = (y + h).round() as i64;
        for py in y0.max(0)..y1.min(self.height as i64) {
            for px in x0.max(0)..x1.min(self.width as i64) {
                self.blend(px, py, color);
            }
        }
    }

    /// Draws a one-pixel horizontal line between `x0` and `x1` inclusive.
    pub fn hline(&mut self, x0: f64, x1: f64, y: f64, color: Color) {
        let (a, b) = ordered(x0.round() as i64, x1.round() as i64);
        let y = y.round() as i64;
        for x in a..=b {
            self.blend(x, y, color);
        }
    }

    /// Draws a one-pixel vertical line between `y0` and `y1` inclusive.
    pub fn vline(&mut self, x: f64, y0: f64, y1: f64, color: Color) {
        let (a, b) = ordered(y0.round() as i64, y1.round() as i64);
        let x = x.round() as i64;
        for y in a..=b {
            self.blend(x, y, color);
        }
    }

    /// Draws a dashed vertical line.
    pub fn dashed_vline(&mut self, x: f64, y0: f64, y1: f64, color: Color) {
        let (a, b) = ordered(y0.round() as i64, y1.round() as i64);
        let x = x.round() as i64;
        for (i, y) in (a..=b).enumerate() {
            if (i / DASH) % 2 == 0 {
                self.blend(x, y, color);
            }
        }
    }

    /// Draws a one-pixel line with Bresenham's algorithm.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
        let (x1, y1) = (x1.round() as i64, y1.round() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.blend(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Encodes the canvas as PNG into a writer.
    pub fn write_png_to<W: Write>(&self, writer: W, config: &PngConfig) -> PcmResult<()> {
        let mut encoder = Encoder::new(writer, self.width, self.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(config.compression);
        encoder.set_filter(config.filter);

        let mut png_writer = encoder.write_header()?;
        png_writer.write_image_data(&self.pixels)?;
        Ok(())
    }

    /// Encodes the canvas as PNG bytes.
    pub fn to_png(&self, config: &PngConfig) -> PcmResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_png_to(&mut buffer, config)?;
        Ok(buffer)
    }

    /// Writes the canvas to a PNG file.
    pub fn write_png(&self, path: &Path, config: &PngConfig) -> PcmResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_png_to(std::io::BufWriter::new(file), config)
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn canvas_size(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Colour of the spectrum gradient at `t` in [0, 1] from the top of the plot.
pub fn gradient_at(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    for pair in SPECTRUM_GRADIENT.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2]), 0xFF];
        }
    }
    let [r, g, b] = SPECTRUM_GRADIENT[SPECTRUM_GRADIENT.len() - 1].1;
    [r, g, b, 0xFF]
}

fn draw_waveform_axes(canvas: &mut Canvas, viewport: &Viewport) {
    let width = viewport.width;
    let height = viewport.height;

    canvas.hline(PADDING, width - PADDING, viewport.y_at(0.0), GRID);

    for &amplitude in AMPLITUDE_TICKS {
        let y = viewport.y_at(amplitude);
        canvas.hline(PADDING - TICK_LENGTH, PADDING, y, GRID);
    }

    for (_, x) in viewport.time_ticks() {
        let x = PADDING + x;
        canvas.vline(x, height - PADDING, height - PADDING + TICK_LENGTH, GRID);
    }
}

/// Renders the visible part of a waveform.
///
/// `selection` is drawn as a translucent band with dashed edges and
/// `playhead` (seconds) as a vertical line.
pub fn render_waveform(
    samples: &[f32],
    sample_rate: u32,
    viewport: &Viewport,
    selection: Option<&SelectionRange>,
    playhead: Option<f64>,
) -> Canvas {
    let mut canvas = Canvas::new(
        canvas_size(viewport.width),
        canvas_size(viewport.height),
        BACKGROUND,
    );
    draw_waveform_axes(&mut canvas, viewport);

    let plot_left = PADDING;
    let plot_right = PADDING + viewport.plot_width();
    let plot_top = PADDING;
    let plot_bottom = PADDING + viewport.plot_height();

    let range = viewport.visible_sample_range(sample_rate, samples.len());
    let columns = viewport.plot_width().floor() as usize;
    let peaks = WaveformColumns::compute(samples, range.clone(), columns);

    if !range.is_empty() {
        let mut previous: Option<(f64, f64)> = None;
        for (c, &(min, max)) in peaks.peaks.iter().enumerate() {
            let mut top = viewport.y_at(max.clamp(-1.0, 1.0) as f64);
            let mut bottom = viewport.y_at(min.clamp(-1.0, 1.0) as f64);
            if let Some((prev_top, prev_bottom)) = previous {
                top = top.min(prev_bottom);
                bottom = bottom.max(prev_top);
            }
            canvas.vline(plot_left + c as f64, top, bottom, WAVEFORM);
            previous = Some((
                viewport.y_at(max.clamp(-1.0, 1.0) as f64),
                viewport.y_at(min.clamp(-1.0, 1.0) as f64),
            ));
        }
    }

    if let Some(range) = selection {
        let x0 = (PADDING + viewport.x_at(range.start)).clamp(plot_left, plot_right);
        let x1 = (PADDING + viewport.x_at(range.end)).clamp(plot_left, plot_right);
        if x1 > x0 {
            canvas.fill_rect(
                x0,
                plot_top,
                x1 - x0,
                plot_bottom - plot_top,
                SELECTION_FILL,
            );
            for edge in [x0, x1] {
                canvas.dashed_vline(edge, plot_top, plot_bottom, SELECTION_EDGE);
            }
        }
    }

    if let Some(time) = playhead {
        let x = PADDING + viewport.x_at(time);
        if (plot_left..=plot_right).contains(&x) {
            canvas.vline(x, plot_top, plot_bottom, PLAYHEAD);
        }
    }

    canvas
}

/// Draws marker lines onto a rendered waveform.
pub fn render_markers(canvas: &mut Canvas, viewport: &Viewport, markers: &MarkerList) {
    let plot_top = PADDING;
    let plot_bottom = PADDING + viewport.plot_height();
    for marker in markers.within(viewport.view_start_time(), viewport.view_end_time()) {
        let x = PADDING + viewport.x_at(marker.position);
        canvas.vline(x, plot_top, plot_bottom, MARKER);
    }
}

/// Renders a spectrum as gradient bars with white caps.
///
/// When there are more bins than plot columns, neighbouring bins are merged
/// by taking their maximum.
pub fn render_spectrum(spectrum: &Spectrum, sample_rate: u32, width: u32, height: u32) -> Canvas {
    let mut canvas = Canvas::new(width, height, BACKGROUND);
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;
    let plot_width = (width - 2.0 * PADDING).max(1.0);
    let plot_height = (height - 2.0 * PADDING).max(1.0);
    let baseline = height - PADDING;

    canvas.hline(PADDING, width - PADDING, baseline, GRID);
    canvas.vline(PADDING, PADDING, baseline, GRID);

    let nyquist = sample_rate as f64 / 2.0;
    if nyquist > 0.0 {
        for freq in frequency_ticks(sample_rate) {
            let x = PADDING + plot_width * freq / nyquist;
            canvas.vline(x, baseline, baseline + TICK_LENGTH, GRID);
        }
    }
    for &db in DB_TICKS {
        let y = PADDING + plot_height * (1.0 - (db + 60.0) / 60.0);
        canvas.hline(PADDING - TICK_LENGTH, PADDING, y, GRID);
    }

    let bins = &spectrum.bins;
    if bins.is_empty() {
        return canvas;
    }

    let columns = bins.len().min(plot_width.floor().max(1.0) as usize);
    let bar_width = plot_width / columns as f64;
    let spacing = if bar_width >= 3.0 {
        (bar_width * 0.2).max(1.0)
    } else {
        0.0
    };
    let actual_width = (bar_width - spacing).max(1.0);

    for c in 0..columns {
        let lo = c * bins.len() / columns;
        let hi = ((c + 1) * bins.len() / columns).max(lo + 1);
        let value = bins[lo..hi].iter().copied().max().unwrap_or(0);
        let bar = bar_height(value, plot_height);
        if bar <= 0.0 {
            continue;
        }

        let x = PADDING + c as f64 * bar_width + spacing / 2.0;
        let top = baseline - bar;
        let first_row = top.round() as i64;
        let last_row = baseline.round() as i64;
        for row in first_row..last_row {
            let t = (row as f64 - PADDING) / plot_height;
            canvas.fill_rect(x, row as f64, actual_width, 1.0, gradient_at(t));
        }
        canvas.fill_rect(x, top, actual_width, BAR_CAP_HEIGHT.min(bar), BAR_CAP);
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{analyze_at, SpectrumConfig};

    fn sine(n: usize, freq: f32, sample_rate: f32, amp: f32) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin() * amp)
            .collect()
    }

    fn count_color(canvas: &Canvas, color: Color) -> usize {
        canvas
            .as_bytes()
            .chunks_exact(4)
            .filter(|p| *p == color)
            .count()
    }

    #[test]
    fn test_canvas_basics() {
        let mut canvas = Canvas::new(10, 5, BACKGROUND);
        assert_eq!(canvas.as_bytes().len(), 10 * 5 * 4);
        canvas.fill_rect(2.0, 1.0, 3.0, 2.0, WAVEFORM);
        assert_eq!(canvas.pixel(2, 1), Some(WAVEFORM));
        assert_eq!(canvas.pixel(4, 2), Some(WAVEFORM));
        assert_eq!(canvas.pixel(5, 2), Some(BACKGROUND));
        assert_eq!(canvas.pixel(10, 0), None);
        canvas.blend(-1, 0, WAVEFORM);
        canvas.hline(-5.0, 50.0, 4.0, GRID);
        assert_eq!(count_color(&canvas, GRID), 10);
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut canvas = Canvas::new(1, 1, [0, 0, 0, 255]);
        canvas.blend(0, 0, [255, 255, 255, 128]);
        let p = canvas.pixel(0, 0).unwrap();
        assert!(p[0] >= 127 && p[0] <= 129);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_line_endpoints() {
        let mut canvas = Canvas::new(10, 10, BACKGROUND);
        canvas.line(1.0, 1.0, 8.0, 5.0, MARKER);
        assert_eq!(canvas.pixel(1, 1), Some(MARKER));
        assert_eq!(canvas.pixel(8, 5), Some(MARKER));
    }

    #[test]
    fn test_gradient_stops() {
        assert_eq!(gradient_at(0.0), [0xFF, 0x00, 0x33, 0xFF]);
        assert_eq!(gradient_at(0.3), [0xFF, 0x66, 0x00, 0xFF]);
        assert_eq!(gradient_at(1.0), [0x00, 0x33, 0xCC, 0xFF]);
        assert_eq!(gradient_at(7.0), [0x00, 0x33, 0xCC, 0xFF]);
    }

    #[test]
    fn test_render_waveform_layers() {
        let samples = sine(1000, 5.0, 1000.0, 0.8);
        let viewport = Viewport::new(280.0, 180.0, 1.0);
        let selection = SelectionRange::new(0.25, 0.5);
        let canvas = render_waveform(&samples, 1000, &viewport, Some(&selection), Some(0.75));

        assert_eq!(canvas.width(), 280);
        assert_eq!(canvas.height(), 180);
        assert!(count_color(&canvas, WAVEFORM) > 200);

        // playhead at 0.75 s of a 200 px plot
        let x = (PADDING + 150.0) as u32;
        assert_eq!(canvas.pixel(x, (PADDING + 1.0) as u32), Some(PLAYHEAD));

        // selection tints the background inside the band
        let inside = canvas.pixel((PADDING + 75.0) as u32, (PADDING + 2.0) as u32).unwrap();
        assert_ne!(inside, BACKGROUND);
        let outside = canvas.pixel((PADDING + 120.0) as u32, (PADDING + 2.0) as u32).unwrap();
        assert_eq!(outside, BACKGROUND);
    }

    #[test]
    fn test_render_markers() {
        let viewport = Viewport::new(280.0, 180.0, 1.0);
        let mut canvas = render_waveform(&[], 1000, &viewport, None, None);
        let mut markers = MarkerList::new();
        markers.add(0.5, "half");
        render_markers(&mut canvas, &viewport, &markers);
        assert_eq!(canvas.pixel((PADDING + 100.0) as u32, 60), Some(MARKER));
    }

    #[test]
    fn test_render_spectrum() {
        let samples = sine(4096, 1000.0, 48000.0, 1.0);
        let spectrum = analyze_at(&samples, 48000, 2048, &SpectrumConfig::default()).unwrap();
        let canvas = render_spectrum(&spectrum, 48000, 600, 300);
        assert_eq!(canvas.width(), 600);
        assert!(count_color(&canvas, BACKGROUND) < 600 * 300);
        // the bar over the tone reaches near the top of the plot
        let column = ((1000.0 / spectrum.bin_hz) * 520.0 / 1024.0) as u32 + PADDING as u32;
        let near_top = (PADDING + 20.0) as u32;
        let hit = (column.saturating_sub(1)..=column + 1)
            .any(|x| canvas.pixel(x, near_top) != Some(BACKGROUND));
        assert!(hit);
    }

    #[test]
    fn test_png_is_deterministic() {
        let samples = sine(2000, 3.0, 1000.0, 0.5);
        let viewport = Viewport::new(200.0, 120.0, 2.0);
        let a = render_waveform(&samples, 1000, &viewport, None, None)
            .to_png(&PngConfig::default())
            .unwrap();
        let b = render_waveform(&samples, 1000, &viewport, None, None)
            .to_png(&PngConfig::default())
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");

        let decoder = png::Decoder::new(std::io::Cursor::new(a));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 200);
        assert_eq!(reader.info().height, 120);
    }

    #[test]
    fn test_write_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.png");
        Canvas::new(4, 4, BACKGROUND)
            .write_png(&path, &PngConfig::default())
            .unwrap();
        assert!(path.exists());
    }
}
