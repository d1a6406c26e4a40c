//! QuakeSphere - seismic event window extraction.
//!
//! Given a recording of (time, velocity) samples and the time of a marked
//! event, QuakeSphere returns a fixed-size window of samples straddling the
//! mark. It performs no filtering or detection; the mark comes from an
//! external provider and the samples from a record source.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ MarkTime     │   │ RecordSource │
//! │ Provider     │   │ (CSV file)   │
//! └──────┬───────┘   └──────┬───────┘
//!        │ mark time        │ samples
//!        ▼                  ▼
//!      ┌──────────────────────┐     ┌──────────────┐
//!      │   Window selection   │────▶│ HTTP / CLI   │
//!      │ (points before/after)│     │  response    │
//!      └──────────────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use quakesphere::core::{select, Sample, WindowSpec};
//!
//! let samples: Vec<Sample> = (0..100).map(|i| Sample::new(i as f64 * 0.1, 0.0)).collect();
//! let result = select(&samples, 5.0, WindowSpec::default());
//!
//! assert_eq!(result.points.len(), 50);
//! assert_eq!(result.mark_time, 5.0);
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod mark;
pub mod pipeline;
pub mod source;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{select, DataPoint, Sample, SelectionResult, WindowError, WindowSpec};
pub use mark::{CatalogMarkProvider, FixedMarkProvider, MarkError, MarkTimeProvider};
pub use pipeline::{run_import, ImportError, ImportPipeline, ImportResponse};
pub use source::{CsvFileSource, MemorySource, RecordSource, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
