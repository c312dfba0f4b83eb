use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use neonatal_dash::loader::read_batches;
use neonatal_dash::{DashboardConfig, DatasetVariant, load_dataset, load_dataset_async};
use parquet::arrow::ArrowWriter;

use crate::utils::date;

/// Days since the Unix epoch, as stored in Date32 columns
fn epoch_days(year: i32, month: u32, day: u32) -> i32 {
    (date(year, month, day) - date(1970, 1, 1)).num_days() as i32
}

fn write_enhanced_parquet(dir: &Path) -> PathBuf {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Patient_ID", DataType::Utf8, false),
        Field::new("Admission_Date", DataType::Date32, false),
        Field::new("Birth_Weight_g", DataType::Float64, true),
        Field::new("Diagnosis", DataType::Utf8, false),
        Field::new("Outcome", DataType::Utf8, false),
        Field::new("Hospital", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, true),
        Field::new("City", DataType::Utf8, true),
        Field::new("Length_of_Stay_days", DataType::Int64, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Q1", "Q2", "Q3"])),
        Arc::new(Date32Array::from(vec![
            epoch_days(2024, 4, 1),
            epoch_days(2024, 4, 2),
            epoch_days(2024, 5, 9),
        ])),
        Arc::new(Float64Array::from(vec![Some(2100.0), None, Some(3300.0)])),
        Arc::new(StringArray::from(vec!["Sepsis", "Jaundice", "Sepsis"])),
        Arc::new(StringArray::from(vec!["Died", "Recovered", "Recovered"])),
        Arc::new(StringArray::from(vec!["Facility A", "Facility B", "Facility A"])),
        Arc::new(StringArray::from(vec![Some("Malawi"), Some("Malawi"), None])),
        Arc::new(StringArray::from(vec![Some("Zomba"), Some("Blantyre"), None])),
        Arc::new(Int64Array::from(vec![Some(6), Some(2), None])),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns).unwrap();

    let path = dir.join("synthetic_mnd_data_enhanced.parquet");
    let file = File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

#[test]
fn test_load_parquet() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_enhanced_parquet(dir.path());

    let (schema, batches) = read_batches(&path, 1024).unwrap();
    assert_eq!(schema.field_with_name("Admission_Date").unwrap().data_type(), &DataType::Date32);
    assert_eq!(batches.iter().map(RecordBatch::num_rows).sum::<usize>(), 3);

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert_eq!(store.variant(), DatasetVariant::Enhanced);

    let first = &store.records()[0];
    assert_eq!(first.admission_date, date(2024, 4, 1));
    assert_eq!(first.length_of_stay_days, Some(6));
    assert_eq!(first.discharge_date, Some(date(2024, 4, 7)));
    assert_eq!(first.birth_weight_grams, Some(2100.0));
    assert!(first.coordinates.is_some());

    let third = &store.records()[2];
    assert_eq!(third.month, "2024-05");
    assert!(third.country.is_none());
    assert!(third.coordinates.is_none());

    assert_eq!(store.filter_options().city, vec!["Blantyre", "Zomba"]);
}

#[tokio::test]
async fn test_async_parquet_load_matches_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_enhanced_parquet(dir.path());
    let config = DashboardConfig::default();

    let sync = load_dataset(&path, &config).unwrap();
    let loaded = load_dataset_async(path, config).await.unwrap();

    assert_eq!(loaded.records(), sync.records());
    assert_eq!(loaded.variant(), sync.variant());
    assert_eq!(loaded.death_label(), "Died");
}
