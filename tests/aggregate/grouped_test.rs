use std::collections::BTreeMap;

use neonatal_dash::aggregate::{
    ChartTables, TrendGrouping, birth_weight_by_outcome, diagnosis_outcome_breakdown,
    facility_level_outcomes, length_of_stay_by_outcome, map_points, monthly_admissions,
    outcome_by_diagnosis, outcome_proportions,
};
use neonatal_dash::{Admission, DatasetVariant, FilteredView};

use crate::utils::{date, enhanced, random_admissions, sample_admissions};

fn view_of(records: &[Admission]) -> FilteredView {
    let refs: Vec<&Admission> = records.iter().collect();
    FilteredView::from_records(&refs, DatasetVariant::Enhanced)
}

fn tenths(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

#[test]
fn test_facility_level_percentages_sum_to_hundred() {
    for seed in 0..20 {
        let view = view_of(&random_admissions(seed, 97));
        let rows = facility_level_outcomes(view.rows());
        assert!(!rows.is_empty());

        let mut sums: BTreeMap<&str, i64> = BTreeMap::new();
        for row in &rows {
            *sums.entry(row.facility_level.as_str()).or_default() += tenths(row.percentage);
        }
        for (level, sum) in sums {
            assert_eq!(sum, 1000, "seed {seed}, level {level}");
        }
    }
}

#[test]
fn test_outcome_proportions() {
    let view = view_of(&sample_admissions());
    let rows = outcome_proportions(view.rows());

    let outcomes: Vec<&str> = rows.iter().map(|r| r.outcome.as_str()).collect();
    assert_eq!(outcomes, vec!["Died", "Recovered", "Referred"]);
    assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 6);
    assert_eq!(rows.iter().map(|r| tenths(r.percentage)).sum::<i64>(), 1000);
    assert!((rows.iter().map(|r| r.share).sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn test_three_way_tie_keeps_unrounded_share() {
    let records: Vec<Admission> = ["Died", "Recovered", "Referred"]
        .into_iter()
        .map(|outcome| {
            enhanced(
                outcome,
                date(2024, 1, 1),
                ("Kenya", "Nairobi"),
                "Sepsis",
                outcome,
                3,
            )
        })
        .collect();
    let view = view_of(&records);
    let rows = outcome_proportions(view.rows());

    let percentages: Vec<f64> = rows.iter().map(|r| r.percentage).collect();
    assert_eq!(percentages, vec![33.4, 33.3, 33.3]);
    for row in &rows {
        assert!((row.share - 1.0 / 3.0).abs() < 1e-12);
        assert!((row.share * 100.0 - row.percentage).abs() <= 0.1 + 1e-9);
    }
}

#[test]
fn test_outcome_by_diagnosis_facets_only_when_asked() {
    let view = view_of(&sample_admissions());

    let flat = outcome_by_diagnosis(view.rows(), false);
    assert!(flat.iter().all(|r| r.hospital.is_none()));
    let sepsis_recovered = flat
        .iter()
        .find(|r| r.diagnosis == "Sepsis" && r.outcome == "Recovered")
        .unwrap();
    assert_eq!(sepsis_recovered.count, 2);

    let faceted = outcome_by_diagnosis(view.rows(), true);
    assert!(faceted.iter().all(|r| r.hospital.as_deref() == Some("Facility A")));
    assert_eq!(faceted.len(), flat.len());
}

#[test]
fn test_monthly_admissions_has_no_zero_fill() {
    let view = view_of(&sample_admissions());
    let rows = monthly_admissions(view.rows(), TrendGrouping::Country);

    let months: Vec<(&str, &str, usize)> = rows
        .iter()
        .map(|r| (r.month.as_str(), r.group.as_str(), r.count))
        .collect();
    assert_eq!(
        months,
        vec![
            ("2023-11", "Kenya", 2),
            ("2024-01", "Nigeria", 2),
            ("2024-02", "Ghana", 2),
        ]
    );

    let by_hospital = monthly_admissions(view.rows(), TrendGrouping::Hospital);
    assert_eq!(by_hospital.len(), 3);
    assert!(by_hospital.iter().all(|r| r.group == "Facility A"));
}

#[test]
fn test_length_of_stay_by_outcome() {
    let view = view_of(&sample_admissions());
    let rows = length_of_stay_by_outcome(view.rows(), false);

    let died = rows.iter().find(|r| r.outcome == "Died").unwrap();
    assert_eq!(died.admissions, 2);
    // (5 + 12) / 2
    assert_eq!(died.mean_length_of_stay_days, Some(8.5));
}

#[test]
fn test_birth_weight_distribution() {
    let view = view_of(&random_admissions(3, 400));
    let rows = birth_weight_by_outcome(view.rows(), true);
    assert!(!rows.is_empty());

    for row in rows {
        assert_eq!(row.count, row.values.len());
        assert!(row.values.windows(2).all(|w| w[0] <= w[1]));
        assert!(row.min <= row.q1 && row.q1 <= row.median);
        assert!(row.median <= row.q3 && row.q3 <= row.max);
        assert_eq!(row.min, row.values[0]);
        assert_eq!(row.max, row.values[row.values.len() - 1]);
    }
}

#[test]
fn test_diagnosis_breakdown_totals() {
    let view = view_of(&random_admissions(4, 250));
    let breakdown = diagnosis_outcome_breakdown(view.rows());

    assert_eq!(breakdown.iter().map(|d| d.total).sum::<usize>(), 250);
    for diagnosis in breakdown {
        assert_eq!(
            diagnosis.outcomes.iter().map(|o| o.count).sum::<usize>(),
            diagnosis.total
        );
    }
}

#[test]
fn test_map_points_skip_unknown_cities() {
    let view = view_of(&sample_admissions());
    let points = map_points(view.rows(), "Died");

    let cities: Vec<&str> = points.iter().map(|p| p.city.as_str()).collect();
    assert_eq!(cities, vec!["Accra", "Kisumu", "Lagos", "Nairobi"]);

    let lagos = points.iter().find(|p| p.city == "Lagos").unwrap();
    assert_eq!(lagos.admissions, 2);
    assert_eq!(lagos.deaths, 0);
    assert_eq!(lagos.mortality_rate_pct, 0.0);

    let nairobi = points.iter().find(|p| p.city == "Nairobi").unwrap();
    assert_eq!(nairobi.mortality_rate_pct, 100.0);
    assert_eq!(nairobi.country.as_deref(), Some("Kenya"));

    // Atlantis has no coordinates but still counts everywhere else
    assert_eq!(points.iter().map(|p| p.admissions).sum::<usize>(), 5);
    assert_eq!(outcome_proportions(view.rows()).iter().map(|r| r.count).sum::<usize>(), 6);
}

#[test]
fn test_empty_view_gives_empty_tables() {
    let view = FilteredView::empty(DatasetVariant::Enhanced);
    let tables = ChartTables::compute(&view, "Died", true, TrendGrouping::Country);
    assert!(tables.is_empty());
    assert_eq!(tables, ChartTables::default());
}

#[test]
fn test_basic_view_has_no_enhanced_tables() {
    let records = sample_admissions();
    let refs: Vec<&Admission> = records.iter().collect();
    let view = FilteredView::from_records(&refs, DatasetVariant::Basic);

    let tables = ChartTables::compute(&view, "Died", false, TrendGrouping::Hospital);
    assert!(tables.facility_level_outcomes.is_empty());
    assert!(tables.map_points.is_empty());
    assert!(!tables.outcome_proportions.is_empty());
}
