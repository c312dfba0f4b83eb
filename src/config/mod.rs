//! Configuration for the dashboard core.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Outcome labels recognised as a death when no label is configured,
/// in order of preference.
pub const KNOWN_DEATH_LABELS: &[&str] = &["Died", "Succumbed/Died"];

/// Default number of rows per Arrow record batch
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Configuration for the result cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether filtered views are memoized at all
    pub enabled: bool,
    /// How long a cached view stays valid
    pub ttl: Duration,
    /// Upper bound on stored views before eviction kicks in
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(300),
            max_entries: 256,
        }
    }
}

/// Configuration for the dashboard
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Outcome label counted as a death; resolved from the data when unset
    pub death_label: Option<String>,
    /// Result cache settings
    pub cache: CacheConfig,
    /// Record count above which predicates are evaluated in parallel
    pub parallel_threshold: usize,
    /// Date formats tried, in order, when parsing date cells
    pub date_formats: Vec<String>,
    /// Dataset locations probed at startup, in order
    pub data_candidates: Vec<PathBuf>,
    /// Rows per record batch when reading source files
    pub batch_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            death_label: None,
            cache: CacheConfig::default(),
            parallel_threshold: 50_000,
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%d/%m/%Y".to_string(),
            ],
            data_candidates: vec![
                PathBuf::from("data/synthetic_mnd_data_enhanced.parquet"),
                PathBuf::from("data/synthetic_mnd_data_enhanced.csv"),
                PathBuf::from("data/synthetic_mnd_data.parquet"),
                PathBuf::from("data/synthetic_mnd_data.csv"),
            ],
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Build a configuration from defaults plus `NEONATAL_*` environment overrides
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`
    ///
    /// Split out from [`DashboardConfig::from_env`] so overrides can be
    /// exercised without touching the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(label) = lookup("NEONATAL_DEATH_LABEL") {
            let label = label.trim();
            if !label.is_empty() {
                self.death_label = Some(label.to_string());
            }
        }

        if let Some(ttl) = lookup("NEONATAL_CACHE_TTL_SECS") {
            let secs = parse_number::<u64>("NEONATAL_CACHE_TTL_SECS", &ttl)?;
            self.cache.ttl = Duration::from_secs(secs);
        }

        if let Some(flag) = lookup("NEONATAL_CACHE_DISABLED") {
            self.cache.enabled = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        if let Some(size) = lookup("NEONATAL_BATCH_SIZE") {
            let size = parse_number::<usize>("NEONATAL_BATCH_SIZE", &size)?;
            if size == 0 {
                return Err(DashboardError::Config(
                    "NEONATAL_BATCH_SIZE must be positive".to_string(),
                ));
            }
            self.batch_size = size;
        }

        if let Some(path) = lookup("NEONATAL_DATA") {
            self.data_candidates.insert(0, PathBuf::from(path));
        }

        Ok(self)
    }

    /// Set the death label explicitly
    #[must_use]
    pub fn with_death_label(mut self, label: impl Into<String>) -> Self {
        self.death_label = Some(label.into());
        self
    }

    /// Turn the result cache off
    #[must_use]
    pub const fn without_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| DashboardError::Config(format!("{key} is not a valid number: {raw:?}")))
}
