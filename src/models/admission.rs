//! Admission record model
//!
//! One `Admission` is one neonatal hospitalization episode. Derived columns
//! (length of stay, month bucket, year, coordinates) are computed once when
//! the record is built, so every record in a store carries all of them.

use chrono::{Days, NaiveDate};

use crate::filter::{Column, Filterable};
use crate::models::geo::{self, Coordinates};

/// Reasons a record cannot be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAdmission {
    /// Discharge happens before admission
    #[error("discharge date {discharge} is before admission date {admission}")]
    DischargeBeforeAdmission {
        admission: NaiveDate,
        discharge: NaiveDate,
    },

    /// A required categorical value is blank
    #[error("required value '{0}' is empty")]
    EmptyRequired(&'static str),

    /// Length of stay pushes the discharge date out of range
    #[error("length of stay {0} days is out of range")]
    LengthOfStayOutOfRange(u32),
}

/// A single neonatal admission with its derived columns
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub patient_id: String,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
    /// Whole days between admission and discharge
    pub length_of_stay_days: Option<u32>,
    /// Not validated for physical plausibility
    pub birth_weight_grams: Option<f64>,
    pub gestational_age_weeks: Option<f64>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub outcome: String,
    pub sex: Option<String>,
    pub hospital: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub household_income_usd: Option<f64>,
    pub facility_level: Option<String>,
    /// `YYYY-MM` bucket of the admission date
    pub month: String,
    /// `YYYY` of the admission date
    pub year: String,
    pub coordinates: Option<Coordinates>,
}

impl Admission {
    /// Start building a record from its required fields
    #[must_use]
    pub fn builder(
        patient_id: impl Into<String>,
        admission_date: NaiveDate,
        diagnosis: impl Into<String>,
        outcome: impl Into<String>,
        hospital: impl Into<String>,
    ) -> AdmissionBuilder {
        AdmissionBuilder {
            patient_id: patient_id.into(),
            admission_date,
            diagnosis: diagnosis.into(),
            outcome: outcome.into(),
            hospital: hospital.into(),
            discharge_date: None,
            length_of_stay_days: None,
            birth_weight_grams: None,
            gestational_age_weeks: None,
            treatment: None,
            sex: None,
            country: None,
            city: None,
            household_income_usd: None,
            facility_level: None,
        }
    }
}

impl Filterable for Admission {
    fn value(&self, column: Column) -> Option<&str> {
        match column {
            Column::Country => self.country.as_deref(),
            Column::City => self.city.as_deref(),
            Column::Hospital => Some(&self.hospital),
            Column::Diagnosis => Some(&self.diagnosis),
            Column::Outcome => Some(&self.outcome),
            Column::Year => Some(&self.year),
        }
    }
}

/// Builder for [`Admission`]
#[derive(Debug, Clone)]
pub struct AdmissionBuilder {
    patient_id: String,
    admission_date: NaiveDate,
    diagnosis: String,
    outcome: String,
    hospital: String,
    discharge_date: Option<NaiveDate>,
    length_of_stay_days: Option<u32>,
    birth_weight_grams: Option<f64>,
    gestational_age_weeks: Option<f64>,
    treatment: Option<String>,
    sex: Option<String>,
    country: Option<String>,
    city: Option<String>,
    household_income_usd: Option<f64>,
    facility_level: Option<String>,
}

impl AdmissionBuilder {
    #[must_use]
    pub const fn discharge_date(mut self, date: NaiveDate) -> Self {
        self.discharge_date = Some(date);
        self
    }

    /// Stated length of stay; ignored when a discharge date is also given
    #[must_use]
    pub const fn length_of_stay_days(mut self, days: u32) -> Self {
        self.length_of_stay_days = Some(days);
        self
    }

    #[must_use]
    pub const fn birth_weight_grams(mut self, grams: f64) -> Self {
        self.birth_weight_grams = Some(grams);
        self
    }

    #[must_use]
    pub const fn gestational_age_weeks(mut self, weeks: f64) -> Self {
        self.gestational_age_weeks = Some(weeks);
        self
    }

    #[must_use]
    pub fn treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = Some(treatment.into());
        self
    }

    #[must_use]
    pub fn sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub const fn household_income_usd(mut self, income: f64) -> Self {
        self.household_income_usd = Some(income);
        self
    }

    #[must_use]
    pub fn facility_level(mut self, level: impl Into<String>) -> Self {
        self.facility_level = Some(level.into());
        self
    }

    /// Validate and compute the derived columns
    pub fn build(self) -> Result<Admission, InvalidAdmission> {
        for (name, value) in [
            ("Diagnosis", &self.diagnosis),
            ("Outcome", &self.outcome),
            ("Hospital", &self.hospital),
        ] {
            if value.trim().is_empty() {
                return Err(InvalidAdmission::EmptyRequired(name));
            }
        }

        let (discharge_date, length_of_stay_days) =
            match (self.discharge_date, self.length_of_stay_days) {
                (Some(discharge), stated) => {
                    let days = (discharge - self.admission_date).num_days();
                    if days < 0 {
                        return Err(InvalidAdmission::DischargeBeforeAdmission {
                            admission: self.admission_date,
                            discharge,
                        });
                    }
                    let days = u32::try_from(days)
                        .map_err(|_| InvalidAdmission::LengthOfStayOutOfRange(u32::MAX))?;
                    if stated.is_some_and(|s| s != days) {
                        log::debug!(
                            "Patient {}: stated length of stay {:?} replaced by derived {days}",
                            self.patient_id,
                            stated
                        );
                    }
                    (Some(discharge), Some(days))
                }
                (None, Some(days)) => {
                    let discharge = self
                        .admission_date
                        .checked_add_days(Days::new(u64::from(days)))
                        .ok_or(InvalidAdmission::LengthOfStayOutOfRange(days))?;
                    (Some(discharge), Some(days))
                }
                (None, None) => (None, None),
            };

        let coordinates = self.city.as_deref().and_then(geo::lookup);

        Ok(Admission {
            month: self.admission_date.format("%Y-%m").to_string(),
            year: self.admission_date.format("%Y").to_string(),
            patient_id: self.patient_id,
            admission_date: self.admission_date,
            discharge_date,
            length_of_stay_days,
            birth_weight_grams: self.birth_weight_grams,
            gestational_age_weeks: self.gestational_age_weeks,
            diagnosis: self.diagnosis,
            treatment: self.treatment,
            outcome: self.outcome,
            sex: self.sex,
            hospital: self.hospital,
            country: self.country,
            city: self.city,
            household_income_usd: self.household_income_usd,
            facility_level: self.facility_level,
            coordinates,
        })
    }
}
