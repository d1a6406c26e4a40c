//! CSV-backed record source.

use crate::core::Sample;
use crate::source::{ColumnMap, RecordSource, SourceError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Parse a recording from any CSV reader.
///
/// The first row is the header. Blank lines are skipped, fields are trimmed
/// and ragged rows are tolerated as long as the required fields are present.
/// The first bad row aborts the whole read.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Sample>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        samples.push(columns.sample(&record, i + 1)?);
    }

    Ok(samples)
}

/// A recording stored as a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    /// Create a source for the CSV file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the recording.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvFileSource {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    fn read_samples(&self) -> Result<Vec<Sample>, SourceError> {
        let file = File::open(&self.path).map_err(|e| SourceError::Unavailable {
            path: self.path.clone(),
            source: e,
        })?;

        let samples = parse_records(BufReader::new(file))?;
        tracing::debug!(
            "Read {} samples from {}",
            samples.len(),
            self.path.display()
        );
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LUNAR_CSV: &str = "\
time_abs(%Y-%m-%dT%H:%M:%S.%f),time_rel(sec),velocity(m/s)
1970-01-19T00:00:00.665000,0.0,-6.153278962788711e-14
1970-01-19T00:00:00.815943,0.1509433962264151,-7.70128843364098e-14

1970-01-19T00:00:00.966887,0.3018867924528302,-8.39866300395878e-14
";

    #[test]
    fn test_parse_records() {
        let samples = parse_records(LUNAR_CSV.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].time_relative, 0.1509433962264151);
        assert_eq!(samples[2].velocity, -8.39866300395878e-14);
        assert!(samples[0].absolute_time().is_some());
    }

    #[test]
    fn test_parse_header_only() {
        let samples = parse_records("time_rel(sec),velocity(m/s)\n".as_bytes()).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_parse_trims_and_tolerates_extra_fields() {
        let csv = "time_rel(sec), velocity(m/s)\n 1.0 , 2.0 , extra\n";
        let samples = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(samples, vec![Sample::new(1.0, 2.0)]);
    }

    #[test]
    fn test_parse_reports_bad_row() {
        let csv = "time_rel(sec),velocity(m/s)\n0.0,1.0\n0.5,oops\n";
        let err = parse_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { row: 2, .. }));
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path().join("nope.csv"));
        let err = source.read_samples().unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_file_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LUNAR_CSV.as_bytes()).unwrap();

        let source = CsvFileSource::new(file.path());
        assert_eq!(source.id(), file.path().display().to_string());
        assert_eq!(source.read_samples().unwrap().len(), 3);
    }
}
