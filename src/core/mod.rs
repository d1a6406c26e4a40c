//! Core functionality for QuakeSphere.
//!
//! This module contains:
//! - Sample types for velocity recordings
//! - Window selection around a marked event time

pub mod sample;
pub mod windowing;

// Re-export commonly used types
pub use sample::{DataPoint, Sample, ABSOLUTE_TIME_FORMAT};
pub use windowing::{
    locate_mark_index, select, SelectionResult, WindowError, WindowSpec, DEFAULT_POINTS_BEFORE,
    DEFAULT_TOTAL_POINTS,
};
