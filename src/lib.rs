//! Filtering, aggregation and caching core for a neonatal admissions
//! analytics dashboard.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod map;
pub mod models;
pub mod selection;
pub mod store;
pub mod utils;
pub mod view;

// Re-export the most common types for easier use
// Core types
pub use config::{CacheConfig, DashboardConfig};
pub use error::{DashboardError, Result};
pub use models::{Admission, DatasetVariant};
pub use store::{DatasetStore, FilterOptions};

// Pipeline
pub use cache::{CacheKey, NoopCache, ResultCache, TtlCache};
pub use dashboard::{Dashboard, DashboardSession, DashboardSnapshot, NO_DATA_NOTICE, UiUpdate};
pub use filter::{FilterEngine, filter};
pub use map::{MapClick, MapEvent, MapSelection};
pub use selection::{Dimension, FilterSelection, SelectionInput, UiValue};
pub use view::{FilteredView, ViewRow};

// Aggregations
pub use aggregate::{ChartTables, KpiSummary, TrendGrouping};

// Loading
pub use loader::{load_configured, load_dataset, load_dataset_async, locate_dataset};
