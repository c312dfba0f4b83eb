//! Filtered view: the projected result of one filter computation
//!
//! A [`FilteredView`] is what the result cache stores and what every
//! aggregation and the delimited export read from. It is built once per
//! filter computation and never mutated afterwards.

use std::io::Write;
use std::sync::Arc;

use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Admission, DatasetVariant};

/// Fixed column subset of an admission carried by a filtered view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(rename = "Patient_ID")]
    pub patient_id: String,
    #[serde(rename = "Admission_Date")]
    pub admission_date: NaiveDate,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Hospital")]
    pub hospital: String,
    #[serde(rename = "Diagnosis")]
    pub diagnosis: String,
    #[serde(rename = "Outcome")]
    pub outcome: String,
    #[serde(rename = "Length_of_Stay_days")]
    pub length_of_stay_days: Option<u32>,
    #[serde(rename = "Birth_Weight_g")]
    pub birth_weight_grams: Option<f64>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "Facility_Level")]
    pub facility_level: Option<String>,
    #[serde(rename = "Household_Income_USD")]
    pub household_income_usd: Option<f64>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
}

/// Number of leading schema fields shared by both dataset variants
const BASIC_FIELD_COUNT: usize = 9;

impl ViewRow {
    /// Arrow schema of the projection, in export column order
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new("Patient_ID", DataType::Utf8, false),
            Field::new("Admission_Date", DataType::Date32, false),
            Field::new("Month", DataType::Utf8, false),
            Field::new("Year", DataType::Utf8, false),
            Field::new("Hospital", DataType::Utf8, false),
            Field::new("Diagnosis", DataType::Utf8, false),
            Field::new("Outcome", DataType::Utf8, false),
            Field::new("Length_of_Stay_days", DataType::UInt32, true),
            Field::new("Birth_Weight_g", DataType::Float64, true),
            // Enhanced-only columns
            Field::new("Country", DataType::Utf8, true),
            Field::new("City", DataType::Utf8, true),
            Field::new("Facility_Level", DataType::Utf8, true),
            Field::new("Household_Income_USD", DataType::Float64, true),
            Field::new("Latitude", DataType::Float64, true),
            Field::new("Longitude", DataType::Float64, true),
        ])
    }
}

impl From<&Admission> for ViewRow {
    fn from(admission: &Admission) -> Self {
        Self {
            patient_id: admission.patient_id.clone(),
            admission_date: admission.admission_date,
            month: admission.month.clone(),
            year: admission.year.clone(),
            hospital: admission.hospital.clone(),
            diagnosis: admission.diagnosis.clone(),
            outcome: admission.outcome.clone(),
            length_of_stay_days: admission.length_of_stay_days,
            birth_weight_grams: admission.birth_weight_grams,
            country: admission.country.clone(),
            city: admission.city.clone(),
            facility_level: admission.facility_level.clone(),
            household_income_usd: admission.household_income_usd,
            latitude: admission.coordinates.map(|c| c.latitude),
            longitude: admission.coordinates.map(|c| c.longitude),
        }
    }
}

/// Read-only projection of the records matching one selection
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    rows: Arc<[ViewRow]>,
    variant: DatasetVariant,
}

impl FilteredView {
    /// Project matched records
    #[must_use]
    pub fn from_records(records: &[&Admission], variant: DatasetVariant) -> Self {
        Self {
            rows: records.iter().map(|r| ViewRow::from(*r)).collect(),
            variant,
        }
    }

    /// An empty view
    #[must_use]
    pub fn empty(variant: DatasetVariant) -> Self {
        Self {
            rows: Arc::from(Vec::new()),
            variant,
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub const fn variant(&self) -> DatasetVariant {
        self.variant
    }

    /// Convert the view to a record batch
    ///
    /// Basic datasets drop the enhanced-only columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = ViewRow::schema();
        let fields: Vec<FieldRef> = schema.fields().iter().map(Arc::clone).collect();
        let batch = serde_arrow::to_record_batch(&fields, &self.rows())?;

        match self.variant {
            DatasetVariant::Enhanced => Ok(batch),
            DatasetVariant::Basic => {
                let indices: Vec<usize> = (0..BASIC_FIELD_COUNT).collect();
                Ok(batch.project(&indices)?)
            }
        }
    }

    /// Write the view as comma-separated text with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let batch = self.to_record_batch()?;
        let mut csv = WriterBuilder::new().with_header(true).build(writer);
        csv.write(&batch)?;
        Ok(())
    }
}
