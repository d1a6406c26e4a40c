//! Header-driven mapping from CSV columns to sample fields.

use crate::core::Sample;
use crate::source::SourceError;
use csv::StringRecord;

/// Header of the absolute-time column.
pub const TIME_ABSOLUTE_HEADER: &str = "time_abs(%Y-%m-%dT%H:%M:%S.%f)";

/// Header of the relative-time column.
pub const TIME_RELATIVE_HEADER: &str = "time_rel(sec)";

/// Header of the velocity column.
pub const VELOCITY_HEADER: &str = "velocity(m/s)";

/// Positions of the recognised columns within a header row.
///
/// Absolute time is optional. Relative time and velocity are required since
/// a missing value cannot be defaulted without corrupting the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    time_absolute: Option<usize>,
    time_relative: usize,
    velocity: usize,
}

impl ColumnMap {
    /// Build the mapping from a header row. Unknown columns are ignored.
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SourceError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let time_relative = position(TIME_RELATIVE_HEADER).ok_or(SourceError::MissingColumn {
            column: TIME_RELATIVE_HEADER,
        })?;
        let velocity = position(VELOCITY_HEADER).ok_or(SourceError::MissingColumn {
            column: VELOCITY_HEADER,
        })?;

        Ok(Self {
            time_absolute: position(TIME_ABSOLUTE_HEADER),
            time_relative,
            velocity,
        })
    }

    pub fn has_absolute_time(&self) -> bool {
        self.time_absolute.is_some()
    }

    /// Convert one data row. `row` is the 1-based data row number.
    pub fn sample(&self, record: &StringRecord, row: usize) -> Result<Sample, SourceError> {
        let time_absolute = self
            .time_absolute
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Sample {
            time_absolute,
            time_relative: parse_number(record, self.time_relative, row, TIME_RELATIVE_HEADER)?,
            velocity: parse_number(record, self.velocity, row, VELOCITY_HEADER)?,
        })
    }
}

fn parse_number(
    record: &StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, SourceError> {
    let raw = record.get(index).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SourceError::Malformed {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}
