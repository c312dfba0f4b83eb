//! Dashboard pipeline
//!
//! Wires the pieces together for one filter-change event:
//! selection → cache key → cached filtered view → KPIs and chart tables.
//! The chart path and the delimited export both go through
//! [`Dashboard::view`], so they always see the same records.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregate::{ChartTables, KpiSummary, TrendGrouping};
use crate::cache::{self, CacheKey, ResultCache};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::FilterEngine;
use crate::map::{MapEvent, MapSelection};
use crate::selection::{FilterSelection, SelectionInput};
use crate::store::{DatasetStore, FilterOptions};
use crate::view::FilteredView;

/// Notice shown instead of charts when nothing matches
pub const NO_DATA_NOTICE: &str = "No records match the selected filters.";

/// Everything the UI renders for one selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// The effective selection, map constraint included
    pub selection: FilterSelection,
    /// Chart title suffix
    pub description: String,
    pub death_label: String,
    pub kpis: KpiSummary,
    pub charts: ChartTables,
    /// Set exactly when the filtered view is empty
    pub notice: Option<String>,
}

/// Shared dashboard state: the dataset, the result cache and the engine
///
/// `Dashboard` is `Send + Sync`; share it behind an [`Arc`] between
/// sessions.
pub struct Dashboard {
    store: Arc<DatasetStore>,
    cache: Arc<dyn ResultCache<FilteredView>>,
    engine: FilterEngine,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("records", &self.store.len())
            .field("variant", &self.store.variant())
            .field("cached_views", &self.cache.len())
            .field("engine", &self.engine)
            .finish()
    }
}

impl Dashboard {
    /// Dashboard with the cache and engine described by `config`
    #[must_use]
    pub fn new(store: DatasetStore, config: &DashboardConfig) -> Self {
        Self::with_cache(
            Arc::new(store),
            cache::from_config(&config.cache),
            FilterEngine::from_config(config),
        )
    }

    /// Dashboard with an injected cache
    #[must_use]
    pub fn with_cache(
        store: Arc<DatasetStore>,
        cache: Arc<dyn ResultCache<FilteredView>>,
        engine: FilterEngine,
    ) -> Self {
        Self {
            store,
            cache,
            engine,
        }
    }

    #[must_use]
    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Dropdown options derived from the dataset
    #[must_use]
    pub fn filter_options(&self) -> &FilterOptions {
        self.store.filter_options()
    }

    /// Filtered view for `selection`, computed at most once per TTL window
    pub fn view(&self, selection: &FilterSelection) -> Arc<FilteredView> {
        let key = CacheKey::for_selection(selection);
        self.cache.get_or_compute(&key, &|| {
            let matched = self.engine.filter(self.store.records(), selection);
            FilteredView::from_records(&matched, self.store.variant())
        })
    }

    /// KPI scalars for `selection`
    pub fn kpis(&self, selection: &FilterSelection) -> KpiSummary {
        KpiSummary::compute(self.view(selection).rows(), self.store.death_label())
    }

    /// KPIs and every chart table for `selection`
    pub fn snapshot(&self, selection: &FilterSelection) -> DashboardSnapshot {
        self.snapshot_grouped(
            selection,
            TrendGrouping::for_variant(self.store.variant()),
        )
    }

    /// [`Dashboard::snapshot`] with an explicit monthly trend grouping
    pub fn snapshot_grouped(
        &self,
        selection: &FilterSelection,
        grouping: TrendGrouping,
    ) -> DashboardSnapshot {
        let start = Instant::now();
        let view = self.view(selection);
        let death_label = self.store.death_label();

        let kpis = KpiSummary::compute(view.rows(), death_label);
        let charts = ChartTables::compute(
            &view,
            death_label,
            selection.facet_by_hospital(),
            grouping,
        );
        let notice = if view.is_empty() {
            log::debug!("Selection matched no records: {selection:?}");
            Some(NO_DATA_NOTICE.to_string())
        } else {
            None
        };

        log::debug!(
            "Snapshot over {} records built in {:?}",
            view.len(),
            start.elapsed()
        );

        DashboardSnapshot {
            selection: selection.clone(),
            description: selection.describe(),
            death_label: death_label.to_string(),
            kpis,
            charts,
            notice,
        }
    }

    /// Write the filtered view for `selection` as CSV; returns the row count
    pub fn export_csv<W: Write>(&self, selection: &FilterSelection, writer: W) -> Result<usize> {
        let view = self.view(selection);
        view.write_csv(writer)?;
        log::info!("Exported {} rows for key {}", view.len(), CacheKey::for_selection(selection));
        Ok(view.len())
    }
}

/// Inputs that fired within one UI update cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiUpdate {
    /// Reset button pressed
    pub reset: bool,
    /// New dropdown state, when any dropdown changed
    pub dropdowns: Option<SelectionInput>,
    pub map: MapEvent,
}

impl UiUpdate {
    #[must_use]
    pub fn dropdowns(input: SelectionInput) -> Self {
        Self {
            dropdowns: Some(input),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn map(event: MapEvent) -> Self {
        Self {
            map: event,
            ..Self::default()
        }
    }
}

/// One user's filter state
///
/// Sessions are plain values; each is updated one event at a time by its
/// owner while many sessions share one [`Dashboard`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSession {
    dropdowns: FilterSelection,
    map: MapSelection,
}

impl DashboardSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update cycle and return the effective selection
    ///
    /// Order within the cycle: reset (dropdowns only), dropdown replacement,
    /// then the map event, where clear wins over a click.
    pub fn apply(&mut self, update: UiUpdate) -> FilterSelection {
        if update.reset {
            self.dropdowns.reset_dropdowns();
        }
        if let Some(input) = update.dropdowns {
            self.dropdowns = input.into_selection();
        }
        self.map.apply(&update.map);
        self.selection()
    }

    /// Dropdown selection narrowed by the map selection
    #[must_use]
    pub fn selection(&self) -> FilterSelection {
        let mut selection = self.dropdowns.clone();
        self.map.constrain(&mut selection);
        selection
    }

    #[must_use]
    pub const fn map_selection(&self) -> &MapSelection {
        &self.map
    }
}
