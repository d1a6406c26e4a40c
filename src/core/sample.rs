//! Sample types for seismic velocity recordings.
//!
//! A recording is an ordered sequence of samples. Only the relative time and
//! the velocity take part in window selection; the absolute timestamp is
//! carried through untouched.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the absolute-time column in lunar/martian catalogue exports.
pub const ABSOLUTE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single velocity reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock timestamp as it appeared in the source
    pub time_absolute: Option<String>,
    /// Seconds since the start of the recording
    pub time_relative: f64,
    /// Ground velocity in m/s
    pub velocity: f64,
}

impl Sample {
    /// Create a sample without an absolute timestamp.
    pub fn new(time_relative: f64, velocity: f64) -> Self {
        Self {
            time_absolute: None,
            time_relative,
            velocity,
        }
    }

    /// Attach the absolute timestamp text.
    pub fn with_absolute(mut self, time_absolute: impl Into<String>) -> Self {
        self.time_absolute = Some(time_absolute.into());
        self
    }

    /// Parse the absolute timestamp, if present and well-formed.
    pub fn absolute_time(&self) -> Option<NaiveDateTime> {
        self.time_absolute
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, ABSOLUTE_TIME_FORMAT).ok())
    }

    /// Project onto the (time, velocity) pair returned to callers.
    pub fn to_point(&self) -> DataPoint {
        DataPoint {
            time_in_seconds: self.time_relative,
            velocity: self.velocity,
        }
    }
}

/// A selected point as exposed in responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Relative time (x-axis)
    pub time_in_seconds: f64,
    /// Velocity (y-axis)
    pub velocity: f64,
}
