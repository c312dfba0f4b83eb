//! Numeric helpers shared by the aggregations
//!
//! Every helper ignores NaN inputs and returns `None` instead of dividing by
//! zero, so an empty group can never fault.

/// Round to one decimal place, ties to even
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Arithmetic mean of the non-NaN values
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sort the non-NaN values ascending
#[must_use]
pub fn sorted_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of already sorted values with linear interpolation between ranks
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Median of the non-NaN values
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    quantile_sorted(&sorted_values(values), 0.5)
}

/// `part / whole` as a percentage rounded to one decimal, `None` for an empty whole
#[must_use]
pub fn percentage(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| round1(part as f64 * 100.0 / whole as f64))
}

/// Percentages with one decimal that sum to exactly 100.0
///
/// Uses largest-remainder rounding in tenths of a percent; ties go to the
/// earlier count. All zeros when the counts sum to zero.
#[must_use]
pub fn rounded_percentages(counts: &[usize]) -> Vec<f64> {
    const SCALE: usize = 1000;

    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let mut tenths: Vec<usize> = counts.iter().map(|c| c * SCALE / total).collect();
    let mut by_remainder: Vec<(usize, usize)> = counts
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, c * SCALE % total))
        .collect();
    by_remainder.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let assigned: usize = tenths.iter().sum();
    for (idx, _) in by_remainder.into_iter().take(SCALE - assigned) {
        tenths[idx] += 1;
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}
