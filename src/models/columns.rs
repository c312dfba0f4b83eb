//! Source column catalogue and dataset variant detection
//!
//! Both dashboard datasets share the basic hospital columns; the enhanced
//! dataset adds geography, household income and facility level.

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

pub const PATIENT_ID: &str = "Patient_ID";
pub const ADMISSION_DATE: &str = "Admission_Date";
pub const DISCHARGE_DATE: &str = "Discharge_Date";
pub const LENGTH_OF_STAY: &str = "Length_of_Stay_days";
pub const BIRTH_WEIGHT: &str = "Birth_Weight_g";
pub const GESTATIONAL_AGE: &str = "Gestational_Age_weeks";
pub const DIAGNOSIS: &str = "Diagnosis";
pub const TREATMENT: &str = "Treatment";
pub const OUTCOME: &str = "Outcome";
pub const SEX: &str = "Sex";
pub const HOSPITAL: &str = "Hospital";
pub const COUNTRY: &str = "Country";
pub const CITY: &str = "City";
pub const HOUSEHOLD_INCOME: &str = "Household_Income_USD";
pub const FACILITY_LEVEL: &str = "Facility_Level";

/// Columns every source must carry
pub const REQUIRED: &[&str] = &[ADMISSION_DATE, DIAGNOSIS, OUTCOME, HOSPITAL];

/// Which of the two dataset schemas a source follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetVariant {
    /// Hospital-level columns only
    Basic,
    /// Adds Country, City, household income and facility level
    Enhanced,
}

impl DatasetVariant {
    /// Detect the variant from the column names present in a schema
    #[must_use]
    pub fn detect(schema: &Schema) -> Self {
        let has = |name: &str| schema.column_with_name(name).is_some();
        if has(COUNTRY) && has(CITY) {
            Self::Enhanced
        } else {
            Self::Basic
        }
    }

    /// Names of the required columns missing from `schema`
    #[must_use]
    pub fn missing_required(schema: &Schema) -> Vec<&'static str> {
        REQUIRED
            .iter()
            .copied()
            .filter(|name| schema.column_with_name(name).is_none())
            .collect()
    }
}
