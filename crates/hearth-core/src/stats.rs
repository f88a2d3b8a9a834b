//! Small numeric helpers shared by the pipeline stages
//!
//! Every helper returns `None` instead of a sentinel when the result is
//! undefined (empty input, zero denominator).

/// Median of the values, averaging the middle pair for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `numerator / denominator`, undefined for a zero denominator
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Relative change from `base` to `current`
pub fn relative_change(current: f64, base: f64) -> Option<f64> {
    ratio(current - base, base)
}

/// Round to the nearest whole unit for display
pub fn round_display(value: Option<f64>) -> Option<f64> {
    value.map(f64::round)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_ratio_zero_denominator_is_undefined() {
        assert_eq!(ratio(5.0, 0.0), None);
        assert_eq!(ratio(5.0, 2.0), Some(2.5));
    }

    #[test]
    fn test_relative_change() {
        let growth = relative_change(840_000.0, 700_000.0).unwrap();
        assert!((growth - 0.2).abs() < 1e-12);
        assert_eq!(relative_change(1.0, 0.0), None);
    }

    #[test]
    fn test_round_display() {
        assert_eq!(round_display(Some(1234.5)), Some(1235.0));
        assert_eq!(round_display(Some(1234.49)), Some(1234.0));
        assert_eq!(round_display(None), None);
    }
}
