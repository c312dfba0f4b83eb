//! Grouped aggregations feeding the charts
//!
//! Each function returns a small table whose rows are sorted by their group
//! key, so the same view always produces the same table. Rows whose group
//! key is missing (no country, no facility level, no coordinates) are left
//! out of that table only.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::stats::{mean, percentage, quantile_sorted, round1, rounded_percentages, sorted_values};
use crate::models::DatasetVariant;
use crate::view::ViewRow;

/// Column the monthly admission trend is split by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendGrouping {
    Hospital,
    Country,
}

impl TrendGrouping {
    /// Hospital for basic datasets, Country for enhanced ones
    #[must_use]
    pub const fn for_variant(variant: DatasetVariant) -> Self {
        match variant {
            DatasetVariant::Basic => Self::Hospital,
            DatasetVariant::Enhanced => Self::Country,
        }
    }

    fn key(self, row: &ViewRow) -> Option<&str> {
        match self {
            Self::Hospital => Some(row.hospital.as_str()),
            Self::Country => row.country.as_deref(),
        }
    }
}

/// Outcome counts per diagnosis ("Outcomes by Diagnosis")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCountRow {
    /// Set only when faceting by hospital
    pub hospital: Option<String>,
    pub diagnosis: String,
    pub outcome: String,
    pub count: usize,
}

/// Mean length of stay per outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StayByOutcomeRow {
    pub hospital: Option<String>,
    pub outcome: String,
    pub admissions: usize,
    /// `None` when no admission in the group has a length of stay
    pub mean_length_of_stay_days: Option<f64>,
}

/// Admissions per month and group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCountRow {
    pub month: String,
    pub group: String,
    pub count: usize,
}

/// Birth-weight distribution for one outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDistributionRow {
    pub hospital: Option<String>,
    pub outcome: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    /// Every weight in the group, ascending
    pub values: Vec<f64>,
}

/// Share of admissions with one outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeShareRow {
    pub outcome: String,
    pub count: usize,
    /// Fraction of all admissions, unrounded; shares sum to 1
    pub share: f64,
    /// Percentage with one decimal; percentages sum to 100
    ///
    /// Largest-remainder rounding can move this up to 0.1 away from
    /// `share * 100`, so a three-way tie reports 33.4 beside 0.3333.
    pub percentage: f64,
}

/// Outcome count inside a diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCount {
    pub outcome: String,
    pub count: usize,
}

/// One diagnosis with its outcome breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisBreakdown {
    pub diagnosis: String,
    pub total: usize,
    pub outcomes: Vec<OutcomeCount>,
}

/// Outcome composition within a facility level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityOutcomeRow {
    pub facility_level: String,
    pub outcome: String,
    pub count: usize,
    /// Percentage within the facility level; each level sums to 100
    pub percentage: f64,
}

/// Admissions plotted at one city's coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub city: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub admissions: usize,
    pub deaths: usize,
    pub mortality_rate_pct: f64,
}

fn facet<'a>(row: &'a ViewRow, by_hospital: bool) -> Option<&'a str> {
    by_hospital.then_some(row.hospital.as_str())
}

/// Outcome counts per diagnosis, per hospital when `by_hospital`
#[must_use]
pub fn outcome_by_diagnosis(rows: &[ViewRow], by_hospital: bool) -> Vec<OutcomeCountRow> {
    rows.iter()
        .map(|r| (facet(r, by_hospital), r.diagnosis.as_str(), r.outcome.as_str()))
        .fold(BTreeMap::new(), |mut counts, key| {
            *counts.entry(key).or_insert(0_usize) += 1;
            counts
        })
        .into_iter()
        .map(|((hospital, diagnosis, outcome), count)| OutcomeCountRow {
            hospital: hospital.map(str::to_string),
            diagnosis: diagnosis.to_string(),
            outcome: outcome.to_string(),
            count,
        })
        .collect()
}

/// Mean length of stay per outcome, per hospital when `by_hospital`
#[must_use]
pub fn length_of_stay_by_outcome(rows: &[ViewRow], by_hospital: bool) -> Vec<StayByOutcomeRow> {
    let mut groups: BTreeMap<(Option<&str>, &str), Vec<&ViewRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((facet(row, by_hospital), row.outcome.as_str()))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((hospital, outcome), members)| StayByOutcomeRow {
            hospital: hospital.map(str::to_string),
            outcome: outcome.to_string(),
            admissions: members.len(),
            mean_length_of_stay_days: mean(
                members
                    .iter()
                    .filter_map(|r| r.length_of_stay_days.map(f64::from)),
            )
            .map(round1),
        })
        .collect()
}

/// Admission counts per (month, group); months without admissions are absent
#[must_use]
pub fn monthly_admissions(rows: &[ViewRow], grouping: TrendGrouping) -> Vec<MonthlyCountRow> {
    rows.iter()
        .filter_map(|r| grouping.key(r).map(|group| (r.month.as_str(), group)))
        .counts()
        .into_iter()
        .sorted()
        .map(|((month, group), count)| MonthlyCountRow {
            month: month.to_string(),
            group: group.to_string(),
            count,
        })
        .collect()
}

/// Birth-weight distribution per outcome, per hospital when `by_hospital`
///
/// Groups without a single recorded weight are omitted.
#[must_use]
pub fn birth_weight_by_outcome(rows: &[ViewRow], by_hospital: bool) -> Vec<WeightDistributionRow> {
    let mut groups: BTreeMap<(Option<&str>, &str), Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(weight) = row.birth_weight_grams {
            groups
                .entry((facet(row, by_hospital), row.outcome.as_str()))
                .or_default()
                .push(weight);
        }
    }

    groups
        .into_iter()
        .filter_map(|((hospital, outcome), weights)| {
            let values = sorted_values(weights);
            let stat = |q| quantile_sorted(&values, q);
            Some(WeightDistributionRow {
                hospital: hospital.map(str::to_string),
                outcome: outcome.to_string(),
                count: values.len(),
                min: stat(0.0)?,
                q1: stat(0.25)?,
                median: stat(0.5)?,
                q3: stat(0.75)?,
                max: stat(1.0)?,
                mean: round1(mean(values.iter().copied())?),
                values,
            })
        })
        .collect()
}

/// Count and share of each outcome
#[must_use]
pub fn outcome_proportions(rows: &[ViewRow]) -> Vec<OutcomeShareRow> {
    let counts: Vec<(&str, usize)> = rows
        .iter()
        .map(|r| r.outcome.as_str())
        .counts()
        .into_iter()
        .sorted()
        .collect();
    let total = rows.len();
    let percentages = rounded_percentages(&counts.iter().map(|(_, c)| *c).collect::<Vec<_>>());

    counts
        .into_iter()
        .zip(percentages)
        .map(|((outcome, count), percentage)| OutcomeShareRow {
            outcome: outcome.to_string(),
            count,
            share: count as f64 / total as f64,
            percentage,
        })
        .collect()
}

/// Two-level diagnosis → outcome count hierarchy
#[must_use]
pub fn diagnosis_outcome_breakdown(rows: &[ViewRow]) -> Vec<DiagnosisBreakdown> {
    let mut tree: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for row in rows {
        *tree
            .entry(row.diagnosis.as_str())
            .or_default()
            .entry(row.outcome.as_str())
            .or_default() += 1;
    }

    tree.into_iter()
        .map(|(diagnosis, outcomes)| DiagnosisBreakdown {
            diagnosis: diagnosis.to_string(),
            total: outcomes.values().sum(),
            outcomes: outcomes
                .into_iter()
                .map(|(outcome, count)| OutcomeCount {
                    outcome: outcome.to_string(),
                    count,
                })
                .collect(),
        })
        .collect()
}

/// Outcome percentages within each facility level
#[must_use]
pub fn facility_level_outcomes(rows: &[ViewRow]) -> Vec<FacilityOutcomeRow> {
    let mut levels: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for row in rows {
        if let Some(level) = row.facility_level.as_deref() {
            *levels
                .entry(level)
                .or_default()
                .entry(row.outcome.as_str())
                .or_default() += 1;
        }
    }

    levels
        .into_iter()
        .flat_map(|(level, outcomes)| {
            let counts: Vec<usize> = outcomes.values().copied().collect();
            let percentages = rounded_percentages(&counts);
            outcomes
                .into_iter()
                .zip(percentages)
                .map(move |((outcome, count), percentage)| FacilityOutcomeRow {
                    facility_level: level.to_string(),
                    outcome: outcome.to_string(),
                    count,
                    percentage,
                })
        })
        .collect()
}

/// Per-city admissions and mortality for records with known coordinates
#[must_use]
pub fn map_points(rows: &[ViewRow], death_label: &str) -> Vec<MapPoint> {
    let mut cities: BTreeMap<&str, MapPoint> = BTreeMap::new();
    for row in rows {
        let (Some(city), Some(latitude), Some(longitude)) =
            (row.city.as_deref(), row.latitude, row.longitude)
        else {
            continue;
        };
        let point = cities.entry(city).or_insert_with(|| MapPoint {
            city: city.to_string(),
            country: row.country.clone(),
            latitude,
            longitude,
            admissions: 0,
            deaths: 0,
            mortality_rate_pct: 0.0,
        });
        point.admissions += 1;
        if row.outcome == death_label {
            point.deaths += 1;
        }
    }

    cities
        .into_values()
        .map(|mut point| {
            point.mortality_rate_pct = percentage(point.deaths, point.admissions).unwrap_or(0.0);
            point
        })
        .collect()
}
