//! Event-time providers.
//!
//! A provider answers one question: at what relative time (in seconds) does
//! the notable event in a given recording start? How it decides (a detector
//! model, a catalogue, a fixed value) is none of the selector's business.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mark time returned when nothing better is configured.
pub const DEFAULT_MARK_TIME: f64 = 1.96226415094339;

/// Errors raised while resolving a mark time.
#[derive(Debug, Error)]
pub enum MarkError {
    #[error("no mark time known for source '{0}'")]
    UnknownSource(String),
    #[error("mark time for '{source_id}' is not finite: {value}")]
    NotFinite { source_id: String, value: f64 },
    #[error("failed to read mark catalog {}: {source}", .path.display())]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mark catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),
    #[error("mark provider failed: {0}")]
    Provider(String),
}

/// Resolves the mark time for a recording, keyed by its source identifier.
pub trait MarkTimeProvider: Send + Sync {
    fn mark_time(&self, source_id: &str) -> Result<f64, MarkError>;
}

impl<F> MarkTimeProvider for F
where
    F: Fn(&str) -> Result<f64, MarkError> + Send + Sync,
{
    fn mark_time(&self, source_id: &str) -> Result<f64, MarkError> {
        self(source_id)
    }
}

/// Ask `provider` for a mark time and reject non-finite answers.
pub fn resolve_mark_time(
    provider: &dyn MarkTimeProvider,
    source_id: &str,
) -> Result<f64, MarkError> {
    let value = provider.mark_time(source_id)?;
    if !value.is_finite() {
        return Err(MarkError::NotFinite {
            source_id: source_id.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Always returns the same mark time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMarkProvider(pub f64);

impl Default for FixedMarkProvider {
    fn default() -> Self {
        Self(DEFAULT_MARK_TIME)
    }
}

impl MarkTimeProvider for FixedMarkProvider {
    fn mark_time(&self, _source_id: &str) -> Result<f64, MarkError> {
        Ok(self.0)
    }
}

/// Mark times looked up from a JSON catalogue of `{ "<source>": seconds }`.
///
/// Keys may be full source identifiers or bare file names.
#[derive(Debug, Clone, Default)]
pub struct CatalogMarkProvider {
    marks: HashMap<String, f64>,
    fallback: Option<f64>,
}

impl CatalogMarkProvider {
    /// Create a catalogue from an in-memory map, with no fallback.
    pub fn new(marks: HashMap<String, f64>) -> Self {
        Self {
            marks,
            fallback: None,
        }
    }

    /// Parse a catalogue from JSON text.
    pub fn from_json(json: &str) -> Result<Self, MarkError> {
        let marks: HashMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self::new(marks))
    }

    /// Load a catalogue from a JSON file.
    pub fn load(path: &Path) -> Result<Self, MarkError> {
        let content = std::fs::read_to_string(path).map_err(|e| MarkError::CatalogIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::debug!(
            "Loaded {} mark times from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Value returned for sources missing from the catalogue.
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Number of catalogue entries.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the catalogue has no entries.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl MarkTimeProvider for CatalogMarkProvider {
    fn mark_time(&self, source_id: &str) -> Result<f64, MarkError> {
        let file_name = Path::new(source_id)
            .file_name()
            .and_then(|n| n.to_str());

        self.marks
            .get(source_id)
            .or_else(|| file_name.and_then(|n| self.marks.get(n)))
            .copied()
            .or(self.fallback)
            .ok_or_else(|| MarkError::UnknownSource(source_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_provider() {
        let provider = FixedMarkProvider::default();
        assert_eq!(provider.mark_time("anything").unwrap(), DEFAULT_MARK_TIME);
        assert_eq!(FixedMarkProvider(3.5).mark_time("x").unwrap(), 3.5);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |source: &str| -> Result<f64, MarkError> {
            if source == "known" {
                Ok(7.0)
            } else {
                Err(MarkError::UnknownSource(source.to_string()))
            }
        };
        assert_eq!(resolve_mark_time(&provider, "known").unwrap(), 7.0);
        assert!(matches!(
            resolve_mark_time(&provider, "other"),
            Err(MarkError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let provider = FixedMarkProvider(f64::NAN);
        assert!(matches!(
            resolve_mark_time(&provider, "x"),
            Err(MarkError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = CatalogMarkProvider::from_json(
            r#"{"xa.s12.00.mhz.1970-01-19HR00_evid00002.csv": 73500.0, "/data/a.csv": 12.5}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);

        assert_eq!(catalog.mark_time("/data/a.csv").unwrap(), 12.5);
        assert_eq!(
            catalog
                .mark_time("/lunar/test/xa.s12.00.mhz.1970-01-19HR00_evid00002.csv")
                .unwrap(),
            73500.0
        );
        assert!(matches!(
            catalog.mark_time("/data/b.csv"),
            Err(MarkError::UnknownSource(_))
        ));

        let catalog = catalog.with_fallback(1.0);
        assert_eq!(catalog.mark_time("/data/b.csv").unwrap(), 1.0);
    }

    #[test]
    fn test_catalog_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("marks.json");
        assert!(matches!(
            CatalogMarkProvider::load(&missing),
            Err(MarkError::CatalogIo { .. })
        ));

        std::fs::write(&missing, "not json").unwrap();
        assert!(matches!(
            CatalogMarkProvider::load(&missing),
            Err(MarkError::CatalogParse(_))
        ));
    }
}
