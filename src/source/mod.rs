//! Record sources for velocity recordings.
//!
//! A record source supplies the ordered samples of one recording. The
//! selector only borrows what a source returns, so parsing and storage
//! concerns live entirely here.

pub mod columns;
pub mod csv_file;

use crate::core::Sample;
use std::path::PathBuf;
use thiserror::Error;

pub use columns::{ColumnMap, TIME_ABSOLUTE_HEADER, TIME_RELATIVE_HEADER, VELOCITY_HEADER};
pub use csv_file::{parse_records, CsvFileSource};

/// Errors raised while reading a recording.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying storage could not be opened.
    #[error("recording unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A column the selector depends on is absent from the header.
    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },
    /// A data row could not be turned into a sample.
    #[error("row {row}: invalid {column} value '{value}'")]
    Malformed {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SourceError {
    /// Whether the data could not be reached at all, as opposed to being
    /// present but unparsable.
    pub fn is_unavailable(&self) -> bool {
        match self {
            SourceError::Unavailable { .. } => true,
            SourceError::Csv(e) => matches!(e.kind(), csv::ErrorKind::Io(_)),
            SourceError::MissingColumn { .. } | SourceError::Malformed { .. } => false,
        }
    }
}

/// Supplies the samples of a single recording, in chronological order.
pub trait RecordSource: Send + Sync {
    /// Identifier used to key the mark-time provider (e.g. a file path).
    fn id(&self) -> String;

    /// Read every sample of the recording.
    fn read_samples(&self) -> Result<Vec<Sample>, SourceError>;
}

/// In-memory recording, mostly for tests and embedding.
#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    samples: Vec<Sample>,
}

impl MemorySource {
    /// Wrap already-parsed samples under the given identifier.
    pub fn new(id: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            samples,
        }
    }
}

impl RecordSource for MemorySource {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn read_samples(&self) -> Result<Vec<Sample>, SourceError> {
        Ok(self.samples.clone())
    }
}
