//! Filter engine
//!
//! Maps a [`FilterSelection`] onto the records that satisfy it. Every active
//! dimension contributes one membership predicate and the map-selected city
//! contributes an equality predicate on `City`; all of them are combined
//! with AND. Inactive dimensions add nothing. A selection matching nothing
//! yields an empty result, never an error.

pub mod expr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use expr::Expr;

use crate::config::DashboardConfig;
use crate::selection::FilterSelection;

/// Categorical record columns a predicate can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Country,
    City,
    Hospital,
    Diagnosis,
    Outcome,
    Year,
}

/// Records whose categorical columns can be tested by an [`Expr`]
pub trait Filterable {
    /// The value of `column`, or `None` when the record has none
    fn value(&self, column: Column) -> Option<&str>;
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn value(&self, column: Column) -> Option<&str> {
        (**self).value(column)
    }
}

/// Compile a selection into a single conjunctive expression
///
/// The map-selected city is applied in addition to any dropdown City values,
/// so disjoint values produce an expression nothing satisfies.
#[must_use]
pub fn compile(selection: &FilterSelection) -> Expr {
    let dropdowns = selection
        .active_dimensions()
        .map(|dimension| Expr::In(dimension.column(), selection.values(dimension).clone()));
    let map = selection
        .map_city
        .iter()
        .map(|city| Expr::Eq(Column::City, city.clone()));

    Expr::and(dropdowns.chain(map))
}

/// Filter engine with a configurable switch-over to parallel evaluation
#[derive(Debug, Clone, Copy)]
pub struct FilterEngine {
    parallel_threshold: usize,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl FilterEngine {
    #[must_use]
    pub const fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    #[must_use]
    pub const fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.parallel_threshold)
    }

    /// Records matching `selection`, in their original order
    pub fn filter<'a, R>(&self, records: &'a [R], selection: &FilterSelection) -> Vec<&'a R>
    where
        R: Filterable + Sync,
    {
        let expr = compile(selection);
        let matched = self.filter_expr(records, &expr);
        log::debug!(
            "Filter matched {} of {} records ({} active dimensions, map city: {:?})",
            matched.len(),
            records.len(),
            selection.active_dimensions().count(),
            selection.map_city
        );
        matched
    }

    /// Records matching an already compiled expression, in their original order
    pub fn filter_expr<'a, R>(&self, records: &'a [R], expr: &Expr) -> Vec<&'a R>
    where
        R: Filterable + Sync,
    {
        match expr {
            Expr::AlwaysTrue => records.iter().collect(),
            Expr::AlwaysFalse => Vec::new(),
            _ if self.use_parallel(records.len()) => records
                .par_iter()
                .filter(|record| expr.evaluate(*record))
                .collect(),
            _ => records
                .iter()
                .filter(|record| expr.evaluate(*record))
                .collect(),
        }
    }

    fn use_parallel(&self, len: usize) -> bool {
        len > self.parallel_threshold && num_cpus::get() > 1
    }
}

/// Records matching `selection` using the default engine
pub fn filter<'a, R>(records: &'a [R], selection: &FilterSelection) -> Vec<&'a R>
where
    R: Filterable + Sync,
{
    FilterEngine::default().filter(records, selection)
}
