use neonatal_dash::aggregate::kpi::{self, NOT_AVAILABLE};
use neonatal_dash::{Admission, DatasetVariant, FilteredView, KpiSummary};

use crate::utils::{date, enhanced, sample_admissions};

fn view_of(records: &[Admission]) -> FilteredView {
    let refs: Vec<&Admission> = records.iter().collect();
    FilteredView::from_records(&refs, DatasetVariant::Enhanced)
}

#[test]
fn test_single_death_in_nairobi() {
    let records = vec![enhanced(
        "P1",
        date(2024, 5, 1),
        ("Kenya", "Nairobi"),
        "Sepsis",
        "Died",
        5,
    )];
    let kpis = KpiSummary::compute(view_of(&records).rows(), "Died");

    assert_eq!(kpis.total_admissions, 1);
    assert_eq!(kpis.deaths, 1);
    assert_eq!(kpis.mortality_rate_pct, Some(100.0));
    assert_eq!(kpis.avg_length_of_stay_days, Some(5.0));
    assert_eq!(kpis.mortality_rate_display(), "100.0%");
    assert_eq!(kpis.avg_length_of_stay_display(), "5.0 days");
}

#[test]
fn test_average_stay_rounds_ties_to_even() {
    let records: Vec<Admission> = [2, 2, 2, 3]
        .into_iter()
        .enumerate()
        .map(|(i, los)| {
            enhanced(
                &format!("T{i}"),
                date(2024, 5, 1),
                ("Kenya", "Nairobi"),
                "Sepsis",
                "Recovered",
                los,
            )
        })
        .collect();
    let kpis = KpiSummary::compute(view_of(&records).rows(), "Died");

    // 9 / 4 = 2.25
    assert_eq!(kpis.avg_length_of_stay_days, Some(2.2));
    assert_eq!(kpis.avg_length_of_stay_display(), "2.2 days");
}

#[test]
fn test_empty_view_has_sentinels() {
    let kpis = KpiSummary::compute(FilteredView::empty(DatasetVariant::Basic).rows(), "Died");

    assert!(!kpis.has_data());
    assert_eq!(kpis.total_admissions, 0);
    assert_eq!(kpis.deaths, 0);
    assert_eq!(kpis.mortality_rate_pct, None);
    assert_eq!(kpis.avg_length_of_stay_days, None);
    assert_eq!(kpis.avg_birth_weight_grams, None);
    assert_eq!(kpis.median_household_income_usd, None);
    assert_eq!(kpis.mortality_rate_display(), NOT_AVAILABLE);
    assert_eq!(kpis.avg_birth_weight_display(), NOT_AVAILABLE);
}

#[test]
fn test_sample_kpis() {
    let view = view_of(&sample_admissions());
    let rows = view.rows();

    assert_eq!(kpi::total_admissions(rows), 6);
    assert_eq!(kpi::death_count(rows, "Died"), 2);
    // 2 / 6
    assert_eq!(kpi::mortality_rate(rows, "Died"), Some(33.3));
    // (5 + 3 + 7 + 2 + 12 + 4) / 6 = 5.5
    assert_eq!(kpi::mean_length_of_stay(rows), Some(5.5));
    assert_eq!(kpi::mean_birth_weight(rows), Some(2500.0));
    assert_eq!(kpi::median_household_income(rows), Some(1200.0));
}

#[test]
fn test_death_label_is_configurable() {
    let records = vec![
        enhanced("P1", date(2024, 1, 1), ("Kenya", "Nairobi"), "Sepsis", "Succumbed/Died", 1),
        enhanced("P2", date(2024, 1, 2), ("Kenya", "Nairobi"), "Sepsis", "Recovered", 1),
    ];
    let view = view_of(&records);

    assert_eq!(kpi::mortality_rate(view.rows(), "Succumbed/Died"), Some(50.0));
    assert_eq!(kpi::mortality_rate(view.rows(), "Died"), Some(0.0));
}

#[test]
fn test_means_skip_missing_values() {
    let with_weight = Admission::builder("P1", date(2024, 1, 1), "Sepsis", "Recovered", "Facility A")
        .birth_weight_grams(3000.0)
        .build()
        .unwrap();
    let without = Admission::builder("P2", date(2024, 1, 1), "Sepsis", "Recovered", "Facility A")
        .build()
        .unwrap();
    let view = FilteredView::from_records(&[&with_weight, &without], DatasetVariant::Basic);

    assert_eq!(kpi::mean_birth_weight(view.rows()), Some(3000.0));
    assert_eq!(kpi::mean_length_of_stay(view.rows()), None);
}
