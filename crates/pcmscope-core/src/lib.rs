//! Raw PCM inspection for pcmscope.
//!
//! Loads headerless PCM against a declared format, flags declarations that
//! look wrong, and computes the statistics, spectrum and view state a
//! waveform inspector needs.
//!
//! # Example
//!
//! ```no_run
//! use pcmscope_core::{PcmClip, PcmFormat, ValidationOptions};
//! use std::path::Path;
//!
//! let format = PcmFormat::default();
//! let clip = PcmClip::load_file(Path::new("capture.pcm"), format, &ValidationOptions::default())
//!     .unwrap();
//!
//! for issue in &clip.validation().warnings {
//!     eprintln!("WARNING: {} - {}", issue.code, issue.message);
//! }
//! println!("peak {:.1} dBFS", clip.stats().peak_db);
//! ```

pub mod decode;
pub mod error;
pub mod export;
pub mod format;
pub mod render;
pub mod selection;
pub mod session;
pub mod spectrum;
pub mod stats;
pub mod transport;
pub mod validate;
pub mod view;

pub use decode::{decode, encode, read_raw, RawSample};
pub use error::{PcmError, PcmResult};
pub use export::{export_range, write_export, ExportEncoding};
pub use format::{Endianness, PcmFormat, SampleFormat, STANDARD_SAMPLE_RATES};
pub use render::{render_markers, render_spectrum, render_waveform, Canvas, PngConfig};
pub use selection::{Marker, MarkerList, Selection, SelectionRange};
pub use session::{is_raw_pcm_path, PcmClip, PointerButton, Session};
pub use spectrum::{analyze_at, Spectrum, SpectrumAnalyzer, SpectrumConfig};
pub use stats::{analyze, volume_percent, AudioStats, StatsAccumulator, VolumeLevel};
pub use transport::{
    format_clock, format_duration, Clock, ManualClock, SystemClock, Transport, TransportEvent,
    TransportState,
};
pub use validate::{
    validate, Severity, ValidationIssue, ValidationOptions, ValidationReport, ValidationSummary,
};
pub use view::{Viewport, WaveformColumns, ZoomAnimation};
