//! Small order statistics shared by the estimators
//!
//! NaN values are ordered as equal; callers only pass finite data.

use std::cmp::Ordering;

/// Median of `values`; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile (0-100) with linear interpolation between closest ranks.
///
/// The rank of percentile `q` is `q / 100 * (n - 1)`.
pub fn percentile(values: &[f32], q: f32) -> Option<f32> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let rank = q as f64 / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    let value = sorted[lower] as f64 + (sorted[upper] as f64 - sorted[lower] as f64) * fraction;
    Some(value as f32)
}

/// Root-mean-square amplitude, accumulated in f64
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| x as f64 * x as f64).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

/// Convert a linear amplitude to dB, `None` unless the result is finite
pub fn amplitude_to_db(amplitude: f32) -> Option<f32> {
    if !(amplitude > 0.0) {
        return None;
    }
    let db = 20.0 * amplitude.log10();
    db.is_finite().then_some(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median_robust_to_outlier() {
        let values = [150.0, 151.0, 149.0, 152.0, 390.0];
        assert_eq!(median(&values), Some(151.0));
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        // rank 0.95 * 4 = 3.8 -> 4.8
        assert!((percentile(&values, 95.0).unwrap() - 4.8).abs() < 1e-6);
        // rank 0.1 * 4 = 0.4 -> 1.4
        assert!((percentile(&values, 10.0).unwrap() - 1.4).abs() < 1e-6);
        assert_eq!(percentile(&values, 101.0), None);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_rms_constant() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_amplitude_to_db() {
        assert!((amplitude_to_db(1.0).unwrap()).abs() < 1e-6);
        assert!((amplitude_to_db(0.1).unwrap() + 20.0).abs() < 1e-4);
        assert_eq!(amplitude_to_db(0.0), None);
        assert_eq!(amplitude_to_db(-1.0), None);
    }
}
