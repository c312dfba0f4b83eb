//! Aggregation engine
//!
//! Turns a [`FilteredView`] into KPI scalars and chart tables. Every
//! function here is pure and total: an empty view yields zero counts,
//! `None` averages and empty tables.

pub mod grouped;
pub mod kpi;
pub mod stats;

use serde::{Deserialize, Serialize};

pub use grouped::{
    DiagnosisBreakdown, FacilityOutcomeRow, MapPoint, MonthlyCountRow, OutcomeCount,
    OutcomeCountRow, OutcomeShareRow, StayByOutcomeRow, TrendGrouping, WeightDistributionRow,
    birth_weight_by_outcome, diagnosis_outcome_breakdown, facility_level_outcomes,
    length_of_stay_by_outcome, map_points, monthly_admissions, outcome_by_diagnosis,
    outcome_proportions,
};
pub use kpi::{KpiSummary, NOT_AVAILABLE};

use crate::models::DatasetVariant;
use crate::view::FilteredView;

/// Every chart table for one filtered view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartTables {
    pub outcomes_by_diagnosis: Vec<OutcomeCountRow>,
    pub length_of_stay_by_outcome: Vec<StayByOutcomeRow>,
    pub monthly_admissions: Vec<MonthlyCountRow>,
    pub birth_weight_by_outcome: Vec<WeightDistributionRow>,
    pub outcome_proportions: Vec<OutcomeShareRow>,
    pub diagnosis_breakdown: Vec<DiagnosisBreakdown>,
    /// Enhanced datasets only
    pub facility_level_outcomes: Vec<FacilityOutcomeRow>,
    /// Enhanced datasets only
    pub map_points: Vec<MapPoint>,
}

impl ChartTables {
    /// Build every table over `view`
    ///
    /// `by_hospital` facets the diagnosis, stay and weight tables per
    /// hospital; `grouping` splits the monthly trend.
    #[must_use]
    pub fn compute(
        view: &FilteredView,
        death_label: &str,
        by_hospital: bool,
        grouping: TrendGrouping,
    ) -> Self {
        let rows = view.rows();
        let enhanced = view.variant() == DatasetVariant::Enhanced;

        Self {
            outcomes_by_diagnosis: outcome_by_diagnosis(rows, by_hospital),
            length_of_stay_by_outcome: length_of_stay_by_outcome(rows, by_hospital),
            monthly_admissions: monthly_admissions(rows, grouping),
            birth_weight_by_outcome: birth_weight_by_outcome(rows, by_hospital),
            outcome_proportions: outcome_proportions(rows),
            diagnosis_breakdown: diagnosis_outcome_breakdown(rows),
            facility_level_outcomes: if enhanced {
                facility_level_outcomes(rows)
            } else {
                Vec::new()
            },
            map_points: if enhanced {
                map_points(rows, death_label)
            } else {
                Vec::new()
            },
        }
    }

    /// True when every table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes_by_diagnosis.is_empty()
            && self.length_of_stay_by_outcome.is_empty()
            && self.monthly_admissions.is_empty()
            && self.birth_weight_by_outcome.is_empty()
            && self.outcome_proportions.is_empty()
            && self.diagnosis_breakdown.is_empty()
            && self.facility_level_outcomes.is_empty()
            && self.map_points.is_empty()
    }
}
