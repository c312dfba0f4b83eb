//! Error handling for the dashboard core.
//!
//! Only loading and configuration can fail. Filtering, caching, the map
//! selection state machine and the aggregations are total over their inputs,
//! so none of them return these errors.

use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the dashboard core
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// None of the candidate dataset paths exist
    #[error("No dataset source found (searched: {})", display_paths(.searched))]
    DataSourceNotFound {
        /// Every path that was probed, in order
        searched: Vec<PathBuf>,
    },

    /// Error opening or reading a located file
    #[error("IO error for {}: {source}", .path.display())]
    Io {
        /// The file being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting between records and record batches
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error with the dataset schema (missing column, unsupported format)
    #[error("Schema error: {0}")]
    Schema(String),

    /// A source row that cannot be turned into a record
    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord {
        /// Zero-based row index across all batches
        row: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Malformed configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking loader task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl DashboardError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create an invalid record error
    pub fn invalid_record(row: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            row,
            reason: reason.into(),
        }
    }

    /// Whether the process must refuse to start on this error
    #[must_use]
    pub const fn is_startup_fatal(&self) -> bool {
        matches!(self, Self::DataSourceNotFound { .. })
    }
}

impl From<serde_arrow::Error> for DashboardError {
    fn from(error: serde_arrow::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<tokio::task::JoinError> for DashboardError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
