//! Dataset store
//!
//! The full, ordered set of admissions, loaded once and shared read-only by
//! every request. Nothing mutates a store after construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{DashboardConfig, KNOWN_DEATH_LABELS};
use crate::models::{Admission, DatasetVariant};
use crate::selection::Dimension;

/// Distinct values of every dropdown dimension, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub country: Vec<String>,
    pub city: Vec<String>,
    pub hospital: Vec<String>,
    pub diagnosis: Vec<String>,
    pub outcome: Vec<String>,
    pub year: Vec<String>,
}

impl FilterOptions {
    /// Options offered for one dimension
    #[must_use]
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Country => &self.country,
            Dimension::City => &self.city,
            Dimension::Hospital => &self.hospital,
            Dimension::Diagnosis => &self.diagnosis,
            Dimension::Outcome => &self.outcome,
            Dimension::Year => &self.year,
        }
    }
}

/// Immutable in-memory admissions table
#[derive(Debug, Clone)]
pub struct DatasetStore {
    records: Arc<[Admission]>,
    variant: DatasetVariant,
    death_label: String,
    options: FilterOptions,
}

impl DatasetStore {
    /// Build a store from fully derived records
    #[must_use]
    pub fn from_admissions(
        records: Vec<Admission>,
        variant: DatasetVariant,
        config: &DashboardConfig,
    ) -> Self {
        let options = collect_options(&records);
        let death_label = resolve_death_label(config.death_label.as_deref(), &options.outcome);
        log::info!(
            "Dataset store ready: {} records, {:?} variant, death label {:?}",
            records.len(),
            variant,
            death_label
        );

        Self {
            records: records.into(),
            variant,
            death_label,
            options,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Admission] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn variant(&self) -> DatasetVariant {
        self.variant
    }

    /// Outcome label counted as a death
    #[must_use]
    pub fn death_label(&self) -> &str {
        &self.death_label
    }

    /// Dropdown options derived from the data
    #[must_use]
    pub const fn filter_options(&self) -> &FilterOptions {
        &self.options
    }
}

fn collect_options(records: &[Admission]) -> FilterOptions {
    let mut country = BTreeSet::new();
    let mut city = BTreeSet::new();
    let mut hospital = BTreeSet::new();
    let mut diagnosis = BTreeSet::new();
    let mut outcome = BTreeSet::new();
    let mut year = BTreeSet::new();

    for record in records {
        if let Some(c) = &record.country {
            country.insert(c.as_str());
        }
        if let Some(c) = &record.city {
            city.insert(c.as_str());
        }
        hospital.insert(record.hospital.as_str());
        diagnosis.insert(record.diagnosis.as_str());
        outcome.insert(record.outcome.as_str());
        year.insert(record.year.as_str());
    }

    let owned = |set: BTreeSet<&str>| -> Vec<String> { set.into_iter().map(str::to_string).collect() };
    FilterOptions {
        country: owned(country),
        city: owned(city),
        hospital: owned(hospital),
        diagnosis: owned(diagnosis),
        outcome: owned(outcome),
        year: owned(year),
    }
}

/// Pick the configured label, else the first known label the data uses
fn resolve_death_label(configured: Option<&str>, outcomes: &[String]) -> String {
    if let Some(label) = configured {
        return label.to_string();
    }
    KNOWN_DEATH_LABELS
        .iter()
        .find(|known| outcomes.iter().any(|o| o.as_str() == **known))
        .unwrap_or(&KNOWN_DEATH_LABELS[0])
        .to_string()
}
