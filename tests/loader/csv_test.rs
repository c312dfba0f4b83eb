use neonatal_dash::loader::{admissions_from_batches, read_batches};
use neonatal_dash::{
    Dashboard, DashboardConfig, DashboardError, DatasetVariant, Dimension, FilterSelection,
    load_configured, load_dataset, load_dataset_async,
};

use crate::utils::{date, write_file};

const BASIC_CSV: &str = "\
Patient_ID,Admission_Date,Birth_Weight_g,Gestational_Age_weeks,Diagnosis,Treatment,Outcome,Sex,Hospital,Discharge_Date,Length_of_Stay_days
MND0001,2024-01-03,2450.5,36,Sepsis,Antibiotics,Died,Male,Facility A,2024-01-08,5
MND0002,2024-01-15,3100,39,Jaundice,Phototherapy,Recovered,Female,Facility B,2024-01-18,3
MND0003,2024-02-01,,34,Prematurity,Incubator,Referred,Female,Facility A,,
";

const ENHANCED_CSV: &str = "\
Patient_ID,Admission_Date,Diagnosis,Outcome,Hospital,Country,City,Household_Income_USD,Facility_Level,Length_of_Stay_days
E1,2023-12-30,Sepsis,Succumbed/Died,Kenyatta,Kenya,Nairobi,850,Level 3,4
E2,2024-01-02,Asphyxia,Recovered,Korle Bu,Ghana,Accra,1200,Level 3,2
E3,2024-01-05,Sepsis,Recovered,Lagoon,Nigeria,Atlantis,,Level 1,1
";

#[test]
fn test_load_basic_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "synthetic_mnd_data.csv", BASIC_CSV);

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.variant(), DatasetVariant::Basic);
    assert_eq!(store.death_label(), "Died");

    let first = &store.records()[0];
    assert_eq!(first.patient_id, "MND0001");
    assert_eq!(first.length_of_stay_days, Some(5));
    assert_eq!(first.birth_weight_grams, Some(2450.5));
    assert_eq!(first.month, "2024-01");
    assert_eq!(first.year, "2024");
    assert!(first.country.is_none());

    let third = &store.records()[2];
    assert_eq!(third.birth_weight_grams, None);
    assert_eq!(third.discharge_date, None);
    assert_eq!(third.length_of_stay_days, None);
}

#[test]
fn test_load_enhanced_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "synthetic_mnd_data_enhanced.csv", ENHANCED_CSV);

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert_eq!(store.variant(), DatasetVariant::Enhanced);
    assert_eq!(store.death_label(), "Succumbed/Died");

    let nairobi = &store.records()[0];
    assert!(nairobi.coordinates.is_some());
    assert_eq!(nairobi.discharge_date, Some(date(2024, 1, 3)));
    assert!(store.records()[2].coordinates.is_none());

    let config = DashboardConfig::default();
    let dashboard = Dashboard::new(store, &config);
    let snapshot = dashboard.snapshot(&FilterSelection::new().with(Dimension::Country, ["Kenya"]));
    assert_eq!(snapshot.kpis.mortality_rate_pct, Some(100.0));
    assert_eq!(snapshot.kpis.avg_length_of_stay_days, Some(4.0));
}

#[test]
fn test_length_of_stay_derived_from_dates() {
    let dir = tempfile::tempdir().unwrap();
    let csv = "\
Admission_Date,Discharge_Date,Length_of_Stay_days,Diagnosis,Outcome,Hospital
2024-03-01,2024-03-11,2,Sepsis,Recovered,Facility A
";
    let path = write_file(dir.path(), "stay.csv", csv);

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert_eq!(store.records()[0].length_of_stay_days, Some(10));
}

#[test]
fn test_header_only_csv_is_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "empty.csv",
        "Patient_ID,Admission_Date,Diagnosis,Outcome,Hospital\n",
    );

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert!(store.is_empty());
    let dashboard = Dashboard::new(store, &DashboardConfig::default());
    assert!(dashboard.snapshot(&FilterSelection::new()).notice.is_some());
}

#[test]
fn test_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "no_outcome.csv",
        "Admission_Date,Diagnosis,Hospital\n2024-01-01,Sepsis,Facility A\n",
    );

    let err = load_dataset(&path, &DashboardConfig::default()).unwrap_err();
    match err {
        DashboardError::Schema(message) => assert!(message.contains("Outcome")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_rows_report_their_index() {
    let dir = tempfile::tempdir().unwrap();
    let csv = "\
Admission_Date,Discharge_Date,Diagnosis,Outcome,Hospital
2024-01-05,2024-01-06,Sepsis,Recovered,Facility A
2024-01-05,2024-01-01,Sepsis,Recovered,Facility A
";
    let path = write_file(dir.path(), "backwards.csv", csv);

    let err = load_dataset(&path, &DashboardConfig::default()).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidRecord { row: 1, .. }), "{err}");

    let bad_date = write_file(
        dir.path(),
        "bad_date.csv",
        "Admission_Date,Diagnosis,Outcome,Hospital\nsoon,Sepsis,Died,Facility A\n",
    );
    let err = load_dataset(&bad_date, &DashboardConfig::default()).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidRecord { row: 0, .. }), "{err}");
}

#[test]
fn test_row_index_spans_batches() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("Admission_Date,Diagnosis,Outcome,Hospital,Length_of_Stay_days\n");
    for _ in 0..5 {
        csv.push_str("2024-01-01,Sepsis,Recovered,Facility A,3\n");
    }
    csv.push_str("2024-01-01,Sepsis,Recovered,Facility A,-1\n");
    let path = write_file(dir.path(), "batches.csv", &csv);

    let (schema, batches) = read_batches(&path, 2).unwrap();
    assert_eq!(batches.len(), 3);

    let err = admissions_from_batches(&schema, &batches, &DashboardConfig::default()).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidRecord { row: 5, .. }), "{err}");
}

#[test]
fn test_tsv_source() {
    let dir = tempfile::tempdir().unwrap();
    let tsv = "Admission_Date\tDiagnosis\tOutcome\tHospital\n07/03/2024\tSepsis\tDied\tFacility A\n";
    let path = write_file(dir.path(), "admissions.tsv", tsv);

    let store = load_dataset(&path, &DashboardConfig::default()).unwrap();
    assert_eq!(store.records()[0].admission_date, date(2024, 3, 7));
}

#[test]
fn test_load_configured_uses_first_existing_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "present.csv", BASIC_CSV);

    let mut config = DashboardConfig::default();
    config.data_candidates = vec![dir.path().join("missing.parquet"), path];
    assert_eq!(load_configured(&config).unwrap().len(), 3);

    config.data_candidates = vec![dir.path().join("missing.parquet")];
    let err = load_configured(&config).unwrap_err();
    assert!(err.is_startup_fatal());
}

#[tokio::test]
async fn test_async_csv_load_matches_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "async.csv", ENHANCED_CSV);
    let config = DashboardConfig::default();

    let sync = load_dataset(&path, &config).unwrap();
    let loaded = load_dataset_async(path, config).await.unwrap();
    assert_eq!(loaded.records(), sync.records());
    assert_eq!(loaded.filter_options(), sync.filter_options());
}
