//! End-to-end import: resolve the mark, read the recording, select the window.

use crate::config::{Config, ConfigError};
use crate::core::{select, DataPoint, SelectionResult, WindowSpec};
use crate::mark::{resolve_mark_time, MarkError, MarkTimeProvider};
use crate::source::{CsvFileSource, RecordSource, SourceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure of one import, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Mark(#[from] MarkError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Selected window plus the mark it was built around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Time and velocity points around the event
    pub data_points: Vec<DataPoint>,
    /// Event mark time in seconds
    pub earthquake_time: f64,
}

impl From<SelectionResult> for ImportResponse {
    fn from(result: SelectionResult) -> Self {
        Self {
            data_points: result.points,
            earthquake_time: result.mark_time,
        }
    }
}

/// Run a single import against borrowed collaborators.
pub fn run_import(
    provider: &dyn MarkTimeProvider,
    source: &dyn RecordSource,
    spec: WindowSpec,
) -> Result<ImportResponse, ImportError> {
    let source_id = source.id();

    let mark_time = resolve_mark_time(provider, &source_id).map_err(|e| {
        tracing::warn!("Mark time unavailable for {}: {}", source_id, e);
        e
    })?;

    let samples = source.read_samples().map_err(|e| {
        tracing::warn!("Failed to read {}: {}", source_id, e);
        e
    })?;

    let result = select(&samples, mark_time, spec);
    tracing::debug!(
        "Selected {} of {} samples around t={} from {}",
        result.len(),
        samples.len(),
        mark_time,
        source_id
    );

    Ok(result.into())
}

/// Shared bundle of a provider, a record source and a default window.
///
/// Cloning is cheap; the server hands a clone to each blocking import task.
#[derive(Clone)]
pub struct ImportPipeline {
    provider: Arc<dyn MarkTimeProvider>,
    source: Arc<dyn RecordSource>,
    spec: WindowSpec,
}

impl ImportPipeline {
    /// Bundle already-built collaborators.
    pub fn new(
        provider: Arc<dyn MarkTimeProvider>,
        source: Arc<dyn RecordSource>,
        spec: WindowSpec,
    ) -> Self {
        Self {
            provider,
            source,
            spec,
        }
    }

    /// Build the pipeline for the CSV recording and mark source in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::from(config.mark_provider()?),
            Arc::new(CsvFileSource::new(config.source_path.clone())),
            config.window_spec()?,
        ))
    }

    /// Default window used by [`ImportPipeline::run`].
    pub fn spec(&self) -> WindowSpec {
        self.spec
    }

    /// Identifier of the underlying recording.
    pub fn source_id(&self) -> String {
        self.source.id()
    }

    /// Import with the configured window.
    pub fn run(&self) -> Result<ImportResponse, ImportError> {
        self.run_with(self.spec)
    }

    /// Import with a per-call window.
    pub fn run_with(&self, spec: WindowSpec) -> Result<ImportResponse, ImportError> {
        run_import(self.provider.as_ref(), self.source.as_ref(), spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sample;
    use crate::mark::{FixedMarkProvider, DEFAULT_MARK_TIME};
    use crate::source::MemorySource;

    fn lunar_like() -> Arc<MemorySource> {
        // 0.1509...s spacing, as in the Apollo S12 exports
        let samples = (0..200)
            .map(|i| Sample::new(i as f64 * 0.1509433962264151, (i % 7) as f64 * 1e-14))
            .collect();
        Arc::new(MemorySource::new("xa.s12.00.mhz.csv", samples))
    }

    #[test]
    fn test_pipeline_default_window() {
        let pipeline = ImportPipeline::new(
            Arc::new(FixedMarkProvider::default()),
            lunar_like(),
            WindowSpec::default(),
        );
        let response = pipeline.run().unwrap();

        // First sample at or after 1.962... is index 13
        assert_eq!(response.earthquake_time, DEFAULT_MARK_TIME);
        assert_eq!(response.data_points.len(), 50);
        assert_eq!(
            response.data_points[10].time_in_seconds,
            13.0 * 0.1509433962264151
        );
    }

    #[test]
    fn test_pipeline_per_call_window() {
        let pipeline = ImportPipeline::new(
            Arc::new(FixedMarkProvider(3.0)),
            lunar_like(),
            WindowSpec::default(),
        );
        let response = pipeline.run_with(WindowSpec::new(2, 4).unwrap()).unwrap();
        assert_eq!(response.data_points.len(), 4);
        assert_eq!(response.earthquake_time, 3.0);
    }

    #[test]
    fn test_pipeline_source_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ImportPipeline::new(
            Arc::new(FixedMarkProvider::default()),
            Arc::new(CsvFileSource::new(dir.path().join("missing.csv"))),
            WindowSpec::default(),
        );
        match pipeline.run() {
            Err(ImportError::Source(e)) => assert!(e.is_unavailable()),
            other => panic!("expected source error, got {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_mark_error_propagates() {
        let provider = |id: &str| -> Result<f64, MarkError> {
            Err(MarkError::Provider(format!("down for {id}")))
        };
        let pipeline =
            ImportPipeline::new(Arc::new(provider), lunar_like(), WindowSpec::default());
        assert!(matches!(pipeline.run(), Err(ImportError::Mark(_))));
    }

    #[test]
    fn test_pipeline_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evid00007.csv");
        std::fs::write(
            &path,
            "time_rel(sec),velocity(m/s)\n0.0,1.0\n1.0,2.0\n2.0,3.0\n",
        )
        .unwrap();

        let config = Config {
            source_path: path.clone(),
            points_before: 1,
            total_points: 2,
            mark_time: 1.0,
            ..Config::default()
        };
        let pipeline = ImportPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.spec(), WindowSpec::new(1, 2).unwrap());
        assert_eq!(pipeline.source_id(), path.display().to_string());

        let response = pipeline.run().unwrap();
        let times: Vec<f64> = response.data_points.iter().map(|p| p.time_in_seconds).collect();
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(response.earthquake_time, 1.0);

        let invalid = Config {
            points_before: 3,
            ..config
        };
        assert!(matches!(
            ImportPipeline::from_config(&invalid),
            Err(ConfigError::Window(_))
        ));
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = ImportResponse {
            data_points: vec![Sample::new(0.5, -1.0).to_point()],
            earthquake_time: 1.96226415094339,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["earthquakeTime"], 1.96226415094339);
        assert_eq!(json["dataPoints"][0]["timeInSeconds"], 0.5);
        assert_eq!(json["dataPoints"][0]["velocity"], -1.0);
    }
}
