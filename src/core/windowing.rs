//! Window selection around a marked event time.
//!
//! Given a chronologically ordered recording and a mark time, the selector
//! finds the first sample at or after the mark and returns a fixed number of
//! samples straddling it: `points_before` samples strictly before the mark
//! index, and up to `total_points - points_before` samples from the mark
//! index onwards. Windows are clipped at both ends of the recording, never
//! padded.

use crate::core::sample::{DataPoint, Sample};
use thiserror::Error;

/// Default number of samples taken before the mark.
pub const DEFAULT_POINTS_BEFORE: usize = 10;

/// Default total window size.
pub const DEFAULT_TOTAL_POINTS: usize = 50;

/// Invalid window parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },
    #[error("points_before ({points_before}) exceeds total_points ({total_points})")]
    BeforeExceedsTotal {
        points_before: usize,
        total_points: usize,
    },
}

/// Validated split of a selection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    points_before: usize,
    total_points: usize,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            points_before: DEFAULT_POINTS_BEFORE,
            total_points: DEFAULT_TOTAL_POINTS,
        }
    }
}

impl WindowSpec {
    /// Create a window spec, rejecting `points_before > total_points`.
    pub fn new(points_before: usize, total_points: usize) -> Result<Self, WindowError> {
        if points_before > total_points {
            return Err(WindowError::BeforeExceedsTotal {
                points_before,
                total_points,
            });
        }
        Ok(Self {
            points_before,
            total_points,
        })
    }

    /// Create a window spec from untrusted signed counts (query strings, CLI).
    pub fn from_signed(points_before: i64, total_points: i64) -> Result<Self, WindowError> {
        let before = usize::try_from(points_before).map_err(|_| WindowError::Negative {
            field: "points_before",
            value: points_before,
        })?;
        let total = usize::try_from(total_points).map_err(|_| WindowError::Negative {
            field: "total_points",
            value: total_points,
        })?;
        Self::new(before, total)
    }

    /// Samples taken strictly before the mark index.
    pub fn points_before(&self) -> usize {
        self.points_before
    }

    /// Upper bound on the window length.
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    /// Number of samples taken from the mark index onwards.
    pub fn points_after(&self) -> usize {
        self.total_points - self.points_before
    }
}

/// Outcome of a window selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    /// Selected points in chronological order
    pub points: Vec<DataPoint>,
    /// The mark time the window was built around, unchanged
    pub mark_time: f64,
}

impl SelectionResult {
    /// Number of selected points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Index of the first sample whose relative time is at or after `mark_time`.
///
/// Returns `samples.len()` when every sample precedes the mark.
pub fn locate_mark_index(samples: &[Sample], mark_time: f64) -> usize {
    samples
        .iter()
        .position(|s| s.time_relative >= mark_time)
        .unwrap_or(samples.len())
}

/// Select the window of samples around `mark_time`.
///
/// The sample at the mark index belongs to the after-window only, so it is
/// never duplicated.
pub fn select(samples: &[Sample], mark_time: f64, spec: WindowSpec) -> SelectionResult {
    let mark_index = locate_mark_index(samples, mark_time);
    let start = mark_index.saturating_sub(spec.points_before());

    let before = samples.iter().take(mark_index).skip(start);
    let after = samples.iter().skip(mark_index).take(spec.points_after());

    SelectionResult {
        points: before.chain(after).map(Sample::to_point).collect(),
        mark_time,
    }
}
