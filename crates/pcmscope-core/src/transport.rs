//! Playback transport: play/pause/stop, seeking and frame stepping.
//!
//! The transport never touches an audio device. Time comes from a [`Clock`],
//! which is the host's audio clock when playing for real and a
//! [`ManualClock`] in tests or offline stepping.

use std::cell::Cell;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Frame steps per second of audio.
pub const FRAMES_PER_SECOND: u32 = 50;

/// Source of the current time in seconds.
pub trait Clock {
    /// Monotonic time in seconds.
    fn now(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock starting at 0.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    /// Creates a clock at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    /// Sets the clock.
    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Transport state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Not playing; position at the start.
    #[default]
    Stopped,
    /// Playing.
    Playing,
    /// Not playing; position kept.
    Paused,
}

/// Events raised by [`Transport::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Playback reached the end of the clip.
    Ended,
}

/// Playback position bookkeeping for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    state: TransportState,
    duration: f64,
    sample_rate: u32,
    sample_count: usize,
    started_at: f64,
    paused_at: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Transport {
    /// Creates a stopped transport for a clip.
    pub fn new(sample_count: usize, sample_rate: u32) -> Self {
        let duration = if sample_rate > 0 {
            sample_count as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            state: TransportState::Stopped,
            duration,
            sample_rate,
            sample_count,
            started_at: 0.0,
            paused_at: 0.0,
        }
    }

    /// Current state.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Starts or resumes playback. Returns false when there is nothing to play.
    pub fn play(&mut self, clock: &dyn Clock) -> bool {
        if self.sample_count == 0 {
            return false;
        }
        if self.state != TransportState::Playing {
            self.started_at = clock.now();
            self.state = TransportState::Playing;
            tracing::debug!(position = self.paused_at, "Playback started");
        }
        true
    }

    /// Pauses, keeping the position.
    pub fn pause(&mut self, clock: &dyn Clock) {
        if self.state == TransportState::Playing {
            self.paused_at = self.position(clock);
            self.state = TransportState::Paused;
            tracing::debug!(position = self.paused_at, "Playback paused");
        }
    }

    /// Stops and rewinds to the start.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.paused_at = 0.0;
        self.started_at = 0.0;
        tracing::debug!("Playback stopped");
    }

    /// Play when paused or stopped, pause when playing.
    pub fn toggle(&mut self, clock: &dyn Clock) {
        match self.state {
            TransportState::Playing => self.pause(clock),
            TransportState::Paused | TransportState::Stopped => {
                self.play(clock);
            }
        }
    }

    /// Current position in seconds, clamped to the clip.
    pub fn position(&self, clock: &dyn Clock) -> f64 {
        let raw = match self.state {
            TransportState::Playing => clock.now() - self.started_at + self.paused_at,
            _ => self.paused_at,
        };
        raw.clamp(0.0, self.duration)
    }

    /// Position as a fraction of the duration.
    pub fn progress(&self, clock: &dyn Clock) -> f64 {
        if self.duration > 0.0 {
            self.position(clock) / self.duration
        } else {
            0.0
        }
    }

    /// Sample index under the playhead.
    pub fn current_sample(&self, clock: &dyn Clock) -> usize {
        let index = (self.position(clock) * self.sample_rate as f64 + 1e-9).floor() as usize;
        index.min(self.sample_count.saturating_sub(1))
    }

    /// Advances the transport; stops and rewinds at the end of the clip.
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<TransportEvent> {
        if self.state != TransportState::Playing {
            return None;
        }
        let raw = clock.now() - self.started_at + self.paused_at;
        if raw >= self.duration {
            self.stop();
            tracing::debug!(duration = self.duration, "Playback ended");
            return Some(TransportEvent::Ended);
        }
        None
    }

    /// Jumps to a fraction of the clip. Playback continues if it was running.
    pub fn seek(&mut self, progress: f64, clock: &dyn Clock) {
        if self.sample_count == 0 {
            return;
        }
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.paused_at = progress * self.duration;
        match self.state {
            TransportState::Playing => self.started_at = clock.now(),
            TransportState::Stopped => self.state = TransportState::Paused,
            TransportState::Paused => {}
        }
        tracing::debug!(position = self.paused_at, "Seeked");
    }

    /// Jumps to a time in seconds.
    pub fn seek_to_time(&mut self, secs: f64, clock: &dyn Clock) {
        if self.duration > 0.0 {
            self.seek(secs / self.duration, clock);
        }
    }

    /// Number of samples in one frame step.
    pub fn frame_size(&self) -> usize {
        (self.sample_rate / FRAMES_PER_SECOND).max(1) as usize
    }

    /// Moves one frame forward (`direction > 0`) or back (`direction < 0`).
    ///
    /// Returns the new sample index, clamped to the clip.
    pub fn step_frame(&mut self, direction: i32, clock: &dyn Clock) -> usize {
        if self.sample_count == 0 {
            return 0;
        }
        let current = self.current_sample(clock) as i64;
        let target = current + direction.signum() as i64 * self.frame_size() as i64;
        let clamped = target.clamp(0, self.sample_count as i64 - 1) as usize;
        self.seek_to_time(clamped as f64 / self.sample_rate as f64, clock);
        clamped
    }
}

/// Formats a position as `MM:SS.mmm`.
pub fn format_clock(secs: f64) -> String {
    let total_ms = whole_millis(secs);
    format!(
        "{:02}:{:02}.{:03}",
        total_ms / 60_000,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

/// Formats a clip length as `M:SS.mmm`.
pub fn format_duration(sample_count: usize, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return "0:00.000".to_string();
    }
    let total_ms = whole_millis(sample_count as f64 / sample_rate as f64);
    format!(
        "{}:{:02}.{:03}",
        total_ms / 60_000,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

fn whole_millis(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0 + 1e-9).floor() as u64
    } else {
        0
    }
}
