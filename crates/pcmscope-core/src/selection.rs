//! Time-range selection and markers.

use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PcmError;

/// Selections this short or shorter are discarded.
pub const MIN_SELECTION_SECS: f64 = 0.001;

/// An ordered time range in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Start time, always <= `end`.
    pub start: f64,
    /// End time.
    pub end: f64,
}

impl SelectionRange {
    /// Creates a range from two times in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Midpoint in seconds.
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Whether the range is long enough to act on.
    pub fn is_valid(&self) -> bool {
        self.duration() > MIN_SELECTION_SECS
    }

    /// Whether `time` lies inside the range.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Restricts the range to `[0, duration]`.
    pub fn clamp(&self, duration: f64) -> Self {
        let max = duration.max(0.0);
        Self {
            start: self.start.clamp(0.0, max),
            end: self.end.clamp(0.0, max),
        }
    }

    /// Sample indices covered by the range, floored and clamped to `len`.
    pub fn to_sample_range(&self, sample_rate: u32, len: usize) -> Range<usize> {
        let to_index = |t: f64| ((t.max(0.0) * sample_rate as f64).floor() as usize).min(len);
        to_index(self.start)..to_index(self.end)
    }

    /// Status line text, e.g. `Selection: 0.123s`.
    pub fn label(&self) -> String {
        format!("Selection: {:.3}s", self.duration())
    }
}

impl std::fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s..{:.3}s", self.start, self.end)
    }
}

impl FromStr for SelectionRange {
    type Err = PcmError;

    /// Parses `start..end` or `start:end`, both in seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once("..")
            .or_else(|| s.split_once(':'))
            .ok_or_else(|| {
                PcmError::invalid_param("range", format!("expected 'start..end', got '{}'", s))
            })?;

        let parse = |v: &str| -> Result<f64, PcmError> {
            let value: f64 = v.trim().parse().map_err(|_| {
                PcmError::invalid_param("range", format!("'{}' is not a number of seconds", v))
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(PcmError::invalid_param(
                    "range",
                    format!("'{}' must be a non-negative number of seconds", v),
                ));
            }
            Ok(value)
        };

        Ok(SelectionRange::new(parse(a)?, parse(b)?))
    }
}

/// Drag-to-select gesture state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    anchor: Option<f64>,
    cursor: f64,
    committed: Option<SelectionRange>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag at `time`, discarding the current selection.
    pub fn begin(&mut self, time: f64) {
        self.anchor = Some(time);
        self.cursor = time;
        self.committed = None;
    }

    /// Moves the drag cursor.
    pub fn update(&mut self, time: f64) {
        if self.anchor.is_some() {
            self.cursor = time;
        }
    }

    /// Ends the drag. Returns the selection if it is longer than 1 ms.
    pub fn finish(&mut self) -> Option<SelectionRange> {
        let anchor = self.anchor.take()?;
        let range = SelectionRange::new(anchor, self.cursor);
        if range.is_valid() {
            self.committed = Some(range);
            tracing::debug!(start = range.start, end = range.end, "Selection committed");
        } else {
            self.committed = None;
        }
        self.committed
    }

    /// Sets the selection directly.
    pub fn set(&mut self, range: SelectionRange) -> Option<SelectionRange> {
        self.anchor = None;
        self.committed = range.is_valid().then_some(range);
        self.committed
    }

    /// Drops any selection and in-progress drag.
    pub fn clear(&mut self) {
        self.anchor = None;
        self.committed = None;
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    /// The range to draw: the live drag, or the committed selection.
    pub fn visible(&self) -> Option<SelectionRange> {
        match self.anchor {
            Some(anchor) => Some(SelectionRange::new(anchor, self.cursor)),
            None => self.committed,
        }
    }

    /// The committed selection.
    pub fn range(&self) -> Option<SelectionRange> {
        self.committed
    }
}

/// A labelled point on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Position in seconds.
    pub position: f64,
    /// Display label.
    pub label: String,
}

/// Markers kept in position order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerList {
    markers: Vec<Marker>,
}

impl MarkerList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a marker, keeping the list sorted. Returns its index.
    pub fn add(&mut self, position: f64, label: impl Into<String>) -> usize {
        let index = self.markers.partition_point(|m| m.position <= position);
        self.markers.insert(
            index,
            Marker {
                position,
                label: label.into(),
            },
        );
        index
    }

    /// Removes the marker at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Marker> {
        (index < self.markers.len()).then(|| self.markers.remove(index))
    }

    /// Markers inside a time range.
    pub fn within(&self, start: f64, end: f64) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(move |m| m.position >= start && m.position <= end)
    }

    /// All markers in position order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Removes every marker.
    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_ordered() {
        let range = SelectionRange::new(2.0, 0.5);
        assert_eq!(range.start, 0.5);
        assert_eq!(range.end, 2.0);
        assert_eq!(range.duration(), 1.5);
        assert_eq!(range.center(), 1.25);
    }

    #[test]
    fn test_gesture_commits_valid_selection() {
        let mut selection = Selection::new();
        selection.begin(1.0);
        selection.update(0.25);
        assert!(selection.is_dragging());
        assert_eq!(selection.visible(), Some(SelectionRange::new(0.25, 1.0)));
        let range = selection.finish().unwrap();
        assert_eq!(range, SelectionRange::new(0.25, 1.0));
        assert_eq!(selection.range(), Some(range));
        assert!(!selection.is_dragging());
    }

    #[test]
    fn test_click_without_drag_clears() {
        let mut selection = Selection::new();
        selection.set(SelectionRange::new(0.0, 1.0));
        selection.begin(0.5);
        selection.update(0.5005);
        assert_eq!(selection.finish(), None);
        assert_eq!(selection.range(), None);
    }

    #[test]
    fn test_finish_without_begin() {
        let mut selection = Selection::new();
        assert_eq!(selection.finish(), None);
    }

    #[test]
    fn test_sample_range() {
        let range = SelectionRange::new(0.5, 1.25);
        assert_eq!(range.to_sample_range(1000, 10_000), 500..1250);
        assert_eq!(range.to_sample_range(1000, 800), 500..800);
        assert_eq!(SelectionRange::new(5.0, 6.0).to_sample_range(1000, 800), 800..800);
    }

    #[test]
    fn test_clamp_and_label() {
        let range = SelectionRange::new(-1.0, 12.0).clamp(10.0);
        assert_eq!(range, SelectionRange::new(0.0, 10.0));
        assert_eq!(SelectionRange::new(0.0, 0.1234).label(), "Selection: 0.123s");
    }

    #[test]
    fn test_parse_range() {
        let range: SelectionRange = "1.5..2.25".parse().unwrap();
        assert_eq!(range, SelectionRange::new(1.5, 2.25));
        let range: SelectionRange = "3:1".parse().unwrap();
        assert_eq!(range, SelectionRange::new(1.0, 3.0));
        assert!("1.5".parse::<SelectionRange>().is_err());
        assert!("a..b".parse::<SelectionRange>().is_err());
        assert!("-1..2".parse::<SelectionRange>().is_err());
    }

    #[test]
    fn test_markers_stay_sorted() {
        let mut markers = MarkerList::new();
        markers.add(2.0, "b");
        markers.add(0.5, "a");
        assert_eq!(markers.add(3.0, "c"), 2);
        let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert_eq!(markers.within(1.0, 2.5).count(), 1);
        assert_eq!(markers.remove(0).map(|m| m.label), Some("a".to_string()));
        assert_eq!(markers.remove(9), None);
        assert_eq!(markers.len(), 2);
    }
}
