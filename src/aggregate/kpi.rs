//! KPI scalars shown on the summary cards

use serde::{Deserialize, Serialize};

use super::stats::{mean, median, percentage, round1};
use crate::view::ViewRow;

/// Text shown in place of a KPI that has no data behind it
pub const NOT_AVAILABLE: &str = "N/A";

/// Summary card values for one filtered view
///
/// Every `Option` is `None` exactly when there is nothing to average or
/// divide by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_admissions: usize,
    pub deaths: usize,
    /// Deaths over admissions, in percent
    pub mortality_rate_pct: Option<f64>,
    pub avg_length_of_stay_days: Option<f64>,
    pub avg_birth_weight_grams: Option<f64>,
    /// Enhanced datasets only
    pub median_household_income_usd: Option<f64>,
}

impl KpiSummary {
    /// Compute every KPI over `rows`
    #[must_use]
    pub fn compute(rows: &[ViewRow], death_label: &str) -> Self {
        Self {
            total_admissions: total_admissions(rows),
            deaths: death_count(rows, death_label),
            mortality_rate_pct: mortality_rate(rows, death_label),
            avg_length_of_stay_days: mean_length_of_stay(rows),
            avg_birth_weight_grams: mean_birth_weight(rows),
            median_household_income_usd: median_household_income(rows),
        }
    }

    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.total_admissions > 0
    }

    #[must_use]
    pub fn mortality_rate_display(&self) -> String {
        self.mortality_rate_pct
            .map_or_else(|| NOT_AVAILABLE.to_string(), |rate| format!("{rate:.1}%"))
    }

    #[must_use]
    pub fn avg_length_of_stay_display(&self) -> String {
        self.avg_length_of_stay_days
            .map_or_else(|| NOT_AVAILABLE.to_string(), |days| format!("{days:.1} days"))
    }

    #[must_use]
    pub fn avg_birth_weight_display(&self) -> String {
        self.avg_birth_weight_grams
            .map_or_else(|| NOT_AVAILABLE.to_string(), |grams| format!("{grams:.1} g"))
    }
}

#[must_use]
pub fn total_admissions(rows: &[ViewRow]) -> usize {
    rows.len()
}

#[must_use]
pub fn death_count(rows: &[ViewRow], death_label: &str) -> usize {
    rows.iter().filter(|r| r.outcome == death_label).count()
}

/// Percentage of rows whose outcome is the death label; `None` without rows
#[must_use]
pub fn mortality_rate(rows: &[ViewRow], death_label: &str) -> Option<f64> {
    percentage(death_count(rows, death_label), rows.len())
}

#[must_use]
pub fn mean_length_of_stay(rows: &[ViewRow]) -> Option<f64> {
    mean(rows.iter().filter_map(|r| r.length_of_stay_days.map(f64::from))).map(round1)
}

#[must_use]
pub fn mean_birth_weight(rows: &[ViewRow]) -> Option<f64> {
    mean(rows.iter().filter_map(|r| r.birth_weight_grams)).map(round1)
}

#[must_use]
pub fn median_household_income(rows: &[ViewRow]) -> Option<f64> {
    median(rows.iter().filter_map(|r| r.household_income_usd)).map(round1)
}
