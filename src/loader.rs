//! Dataset loading
//!
//! Reads a delimited-text or Parquet source into Arrow record batches, then
//! converts the batches into [`Admission`]s and builds the [`DatasetStore`].
//! Every source column is cast to text before parsing, so a column stored as
//! Date32 in Parquet and the same column written as text in a CSV file go
//! through the same cell rules.

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, AsArray, StringArray};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use futures::TryStreamExt;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::columns;
use crate::models::{Admission, DatasetVariant};
use crate::store::DatasetStore;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Source file layouts the loader understands, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Delimited(u8),
    Parquet,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Delimited(b',')),
            Some("tsv") => Ok(Self::Delimited(b'\t')),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(DashboardError::schema(format!(
                "Unsupported dataset file type: {}",
                path.display()
            ))),
        }
    }
}

/// First candidate path that exists as a file
pub fn locate_dataset(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| DashboardError::DataSourceNotFound {
            searched: candidates.to_vec(),
        })
}

/// Read a dataset file into record batches
///
/// The schema is returned alongside the batches because a source without
/// data rows yields no batches at all.
pub fn read_batches(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let start = Instant::now();
    log_operation_start("Reading dataset", path);

    let (schema, batches) = match SourceFormat::from_path(path)? {
        SourceFormat::Delimited(delimiter) => read_delimited(path, delimiter, batch_size)?,
        SourceFormat::Parquet => read_parquet(path, batch_size)?,
    };

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));
    Ok((schema, batches))
}

fn io_error(path: &Path, source: std::io::Error) -> DashboardError {
    DashboardError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_delimited(
    path: &Path,
    delimiter: u8,
    batch_size: usize,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;

    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    file.rewind().map_err(|e| io_error(path, e))?;

    // Column names come from the header; every value is read as text
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, true))
        .collect();
    let schema: SchemaRef = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(batch_size)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    Ok((schema, batches))
}

fn read_parquet(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size);
    let schema = Arc::clone(builder.schema());
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    Ok((schema, batches))
}

async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size);
    let schema = Arc::clone(builder.schema());
    let batches = builder.build()?.try_collect::<Vec<_>>().await?;
    Ok((schema, batches))
}

/// Parse a date cell with the configured formats
///
/// Each format is tried as a date and as a date-time; a value that matches
/// none of them falls back to its leading `YYYY-MM-DD`.
#[must_use]
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(value, format).ok().or_else(|| {
                NaiveDateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
        .or_else(|| {
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Whole number of days; accepts "5" and "5.0"
fn parse_days(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|days| days.is_finite() && days.fract() == 0.0)
            .map(|days| days as i64)
    })
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    batch
        .column_by_name(name)
        .map(|array| -> Result<StringArray> {
            let text = cast(array, &DataType::Utf8)?;
            Ok(text.as_string::<i32>().clone())
        })
        .transpose()
}

/// Trimmed cell text; null and blank cells are missing
fn cell(column: Option<&StringArray>, row: usize) -> Option<&str> {
    let column = column?;
    if column.is_null(row) {
        return None;
    }
    let value = column.value(row).trim();
    (!value.is_empty()).then_some(value)
}

/// One batch with every catalogued column cast to text
struct TextColumns {
    patient_id: Option<StringArray>,
    admission_date: Option<StringArray>,
    discharge_date: Option<StringArray>,
    length_of_stay: Option<StringArray>,
    birth_weight: Option<StringArray>,
    gestational_age: Option<StringArray>,
    diagnosis: Option<StringArray>,
    treatment: Option<StringArray>,
    outcome: Option<StringArray>,
    sex: Option<StringArray>,
    hospital: Option<StringArray>,
    country: Option<StringArray>,
    city: Option<StringArray>,
    household_income: Option<StringArray>,
    facility_level: Option<StringArray>,
}

impl TextColumns {
    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        Ok(Self {
            patient_id: text_column(batch, columns::PATIENT_ID)?,
            admission_date: text_column(batch, columns::ADMISSION_DATE)?,
            discharge_date: text_column(batch, columns::DISCHARGE_DATE)?,
            length_of_stay: text_column(batch, columns::LENGTH_OF_STAY)?,
            birth_weight: text_column(batch, columns::BIRTH_WEIGHT)?,
            gestational_age: text_column(batch, columns::GESTATIONAL_AGE)?,
            diagnosis: text_column(batch, columns::DIAGNOSIS)?,
            treatment: text_column(batch, columns::TREATMENT)?,
            outcome: text_column(batch, columns::OUTCOME)?,
            sex: text_column(batch, columns::SEX)?,
            hospital: text_column(batch, columns::HOSPITAL)?,
            country: text_column(batch, columns::COUNTRY)?,
            city: text_column(batch, columns::CITY)?,
            household_income: text_column(batch, columns::HOUSEHOLD_INCOME)?,
            facility_level: text_column(batch, columns::FACILITY_LEVEL)?,
        })
    }

    /// Convert one row; `index` is the row's position across all batches
    fn admission(&self, row: usize, index: usize, formats: &[String]) -> Result<Admission> {
        let date = |column: Option<&StringArray>, name: &str| -> Result<Option<NaiveDate>> {
            cell(column, row)
                .map(|raw| {
                    parse_date(raw, formats).ok_or_else(|| {
                        DashboardError::invalid_record(index, format!("unparseable {name}: {raw:?}"))
                    })
                })
                .transpose()
        };
        let number = |column: Option<&StringArray>, name: &str| -> Result<Option<f64>> {
            cell(column, row)
                .map(|raw| {
                    raw.parse::<f64>().map_err(|_| {
                        DashboardError::invalid_record(index, format!("{name} is not a number: {raw:?}"))
                    })
                })
                .transpose()
        };

        let admission_date = date(self.admission_date.as_ref(), columns::ADMISSION_DATE)?
            .ok_or_else(|| {
                DashboardError::invalid_record(index, format!("missing {}", columns::ADMISSION_DATE))
            })?;

        let mut builder = Admission::builder(
            cell(self.patient_id.as_ref(), row).unwrap_or_default(),
            admission_date,
            cell(self.diagnosis.as_ref(), row).unwrap_or_default(),
            cell(self.outcome.as_ref(), row).unwrap_or_default(),
            cell(self.hospital.as_ref(), row).unwrap_or_default(),
        );

        if let Some(discharge) = date(self.discharge_date.as_ref(), columns::DISCHARGE_DATE)? {
            builder = builder.discharge_date(discharge);
        }
        if let Some(raw) = cell(self.length_of_stay.as_ref(), row) {
            let days = parse_days(raw).ok_or_else(|| {
                DashboardError::invalid_record(
                    index,
                    format!("{} is not a whole number: {raw:?}", columns::LENGTH_OF_STAY),
                )
            })?;
            let days = u32::try_from(days).map_err(|_| {
                DashboardError::invalid_record(index, format!("length of stay out of range: {days}"))
            })?;
            builder = builder.length_of_stay_days(days);
        }
        if let Some(grams) = number(self.birth_weight.as_ref(), columns::BIRTH_WEIGHT)? {
            builder = builder.birth_weight_grams(grams);
        }
        if let Some(weeks) = number(self.gestational_age.as_ref(), columns::GESTATIONAL_AGE)? {
            builder = builder.gestational_age_weeks(weeks);
        }
        if let Some(income) = number(self.household_income.as_ref(), columns::HOUSEHOLD_INCOME)? {
            builder = builder.household_income_usd(income);
        }
        if let Some(treatment) = cell(self.treatment.as_ref(), row) {
            builder = builder.treatment(treatment);
        }
        if let Some(sex) = cell(self.sex.as_ref(), row) {
            builder = builder.sex(sex);
        }
        if let Some(country) = cell(self.country.as_ref(), row) {
            builder = builder.country(country);
        }
        if let Some(city) = cell(self.city.as_ref(), row) {
            builder = builder.city(city);
        }
        if let Some(level) = cell(self.facility_level.as_ref(), row) {
            builder = builder.facility_level(level);
        }

        builder
            .build()
            .map_err(|e| DashboardError::invalid_record(index, e.to_string()))
    }
}

/// Convert record batches into admissions
///
/// Fails on the first row that cannot be converted; the error carries the
/// row index counted across all batches.
pub fn admissions_from_batches(
    schema: &Schema,
    batches: &[RecordBatch],
    config: &DashboardConfig,
) -> Result<(Vec<Admission>, DatasetVariant)> {
    let missing = DatasetVariant::missing_required(schema);
    if !missing.is_empty() {
        return Err(DashboardError::schema(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let variant = DatasetVariant::detect(schema);

    let total = batches.iter().map(RecordBatch::num_rows).sum();
    let mut admissions = Vec::with_capacity(total);
    let mut offset = 0;
    for batch in batches {
        let text = TextColumns::from_batch(batch)?;
        for row in 0..batch.num_rows() {
            admissions.push(text.admission(row, offset + row, &config.date_formats)?);
        }
        offset += batch.num_rows();
    }

    Ok((admissions, variant))
}

fn build_store(
    path: &Path,
    schema: &Schema,
    batches: &[RecordBatch],
    config: &DashboardConfig,
) -> Result<DatasetStore> {
    let start = Instant::now();
    let (admissions, variant) = admissions_from_batches(schema, batches, config)?;
    log_operation_complete("converted", path, admissions.len(), Some(start.elapsed()));

    let unmapped = admissions
        .iter()
        .filter(|a| a.city.is_some() && a.coordinates.is_none())
        .count();
    if unmapped > 0 {
        log_warning(
            &format!("{unmapped} admissions name a city without known coordinates"),
            Some(path),
        );
    }

    Ok(DatasetStore::from_admissions(admissions, variant, config))
}

/// Load the dataset at `path` into a store
pub fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<DatasetStore> {
    let (schema, batches) = read_batches(path, config.batch_size)?;
    build_store(path, &schema, &batches, config)
}

/// Locate the first configured candidate and load it
pub fn load_configured(config: &DashboardConfig) -> Result<DatasetStore> {
    let path = locate_dataset(&config.data_candidates)?;
    load_dataset(&path, config)
}

/// Async variant of [`load_dataset`]
///
/// Parquet is streamed with the async reader; delimited text and the record
/// conversion run on the blocking pool.
pub async fn load_dataset_async(path: PathBuf, config: DashboardConfig) -> Result<DatasetStore> {
    match SourceFormat::from_path(&path)? {
        SourceFormat::Parquet => {
            let start = Instant::now();
            log_operation_start("Reading dataset asynchronously", &path);
            let (schema, batches) = read_parquet_async(&path, config.batch_size).await?;
            let rows = batches.iter().map(RecordBatch::num_rows).sum();
            log_operation_complete("read", &path, rows, Some(start.elapsed()));

            tokio::task::spawn_blocking(move || build_store(&path, &schema, &batches, &config))
                .await?
        }
        SourceFormat::Delimited(_) => {
            tokio::task::spawn_blocking(move || load_dataset(&path, &config)).await?
        }
    }
}
