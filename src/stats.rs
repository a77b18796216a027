//! Return and correlation statistics over daily closing prices.
//!
//! Pure functions, no I/O. Correlation coefficients and betas are rounded
//! to four decimal places. A series with zero variance correlates at `0.0`
//! with everything; that is a documented policy of this module, not an
//! error (a flat price history carries no directional information).

use thiserror::Error as ThisError;

use crate::models::{ReturnSeries, RollingCorrelationPoint};

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Calculate daily percentage returns from a closing-price series
///
/// # Arguments
/// * `prices` - Daily closes, oldest first
///
/// # Returns
/// * Vector of length `prices.len() - 1` where element `i` is
///   `(prices[i+1] - prices[i]) / prices[i] * 100`
pub fn compute_returns(prices: &[f64]) -> Result<ReturnSeries, StatsError> {
    if prices.len() < 2 {
        return Err(StatsError::InvalidInput(format!(
            "need at least 2 prices to compute returns, got {}",
            prices.len()
        )));
    }

    Ok(prices
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
        .collect())
}

/// Calculate the Pearson correlation coefficient of two return series
///
/// Zero variance on either side yields `0.0`. The result is rounded to
/// four decimal places, so a self-correlation is exactly `1.0`.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Result<f64, StatsError> {
    check_lengths(a, b)?;
    if a.is_empty() {
        return Err(StatsError::InvalidInput(
            "cannot correlate empty series".to_string(),
        ));
    }

    Ok(round4(pearson_unchecked(a, b)))
}

/// Calculate the trailing-window correlation at every day of the series
///
/// For each right edge `i` in `window..a.len()` the correlation of
/// `a[i-window..i]` against `b[i-window..i]` is produced, tagged with `i`.
/// A window of at least the series length yields an empty sequence.
pub fn rolling_correlation<'a>(
    a: &'a [f64],
    b: &'a [f64],
    window: usize,
) -> Result<impl Iterator<Item = RollingCorrelationPoint> + 'a, StatsError> {
    check_lengths(a, b)?;
    if window == 0 {
        return Err(StatsError::InvalidInput(
            "window must be at least 1".to_string(),
        ));
    }

    Ok((window..a.len()).map(move |day| RollingCorrelationPoint {
        day,
        correlation: round4(pearson_unchecked(&a[day - window..day], &b[day - window..day])),
    }))
}

/// Calculate beta of a coin's returns against a benchmark's returns
///
/// Population covariance over population variance (both divide by N), so
/// `beta(x, x) == 1.0` exactly. A zero-variance benchmark yields `0.0`.
/// The result is rounded to four decimal places.
pub fn compute_beta(coin: &[f64], benchmark: &[f64]) -> Result<f64, StatsError> {
    check_lengths(coin, benchmark)?;
    if coin.is_empty() {
        return Err(StatsError::InvalidInput(
            "cannot compute beta of empty series".to_string(),
        ));
    }

    let variance = covariance(benchmark, benchmark);
    if variance == 0.0 {
        return Ok(0.0);
    }

    Ok(round4(covariance(coin, benchmark) / variance))
}

fn check_lengths(a: &[f64], b: &[f64]) -> Result<(), StatsError> {
    if a.len() != b.len() {
        return Err(StatsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Callers guarantee equal non-zero lengths.
fn pearson_unchecked(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        numerator += dx * dy;
        sum_sq_a += dx * dx;
        sum_sq_b += dy * dy;
    }

    if sum_sq_a == 0.0 || sum_sq_b == 0.0 {
        return 0.0;
    }

    numerator / (sum_sq_a * sum_sq_b).sqrt()
}

/// Population covariance (divide by N). Callers guarantee equal non-zero
/// lengths. Variance is `covariance(x, x)`.
fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / n
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Closing prices used across several tests below.
    const CLOSES_A: [f64; 5] = [100.0, 102.0, 101.0, 105.0, 110.0];
    const CLOSES_B: [f64; 5] = [10.0, 10.5, 10.2, 10.6, 11.0];

    #[test]
    fn test_compute_returns_values() {
        let returns = compute_returns(&CLOSES_A).unwrap();
        assert_eq!(returns.len(), 4);
        assert_eq!(returns[0], 2.0); // (102-100)/100 * 100
        assert!((returns[1] - (-0.9803921568627451)).abs() < 1e-9); // (101-102)/102 * 100
        assert!((returns[2] - 3.9603960396039604).abs() < 1e-9); // (105-101)/101 * 100
        assert!((returns[3] - 4.761904761904762).abs() < 1e-9); // (110-105)/105 * 100
    }

    #[test]
    fn test_compute_returns_rejects_short_series() {
        assert!(compute_returns(&[]).is_err());
        assert!(compute_returns(&[100.0]).is_err());
    }

    #[test]
    fn test_pearson_known_value() {
        let returns_a = compute_returns(&CLOSES_A).unwrap();
        let returns_b = compute_returns(&CLOSES_B).unwrap();
        let correlation = pearson_correlation(&returns_a, &returns_b).unwrap();
        assert_eq!(correlation, 0.8125);
    }

    #[test]
    fn test_pearson_perfect_positive() {
        // b = 2a, integer fixtures keep the arithmetic exact
        let correlation = pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert_eq!(correlation, 1.0);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let correlation = pearson_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert_eq!(correlation, -1.0);
    }

    #[test]
    fn test_pearson_self_correlation_is_one() {
        let returns = compute_returns(&CLOSES_A).unwrap();
        assert_eq!(pearson_correlation(&returns, &returns).unwrap(), 1.0);
    }

    #[test]
    fn test_pearson_is_symmetric() {
        let returns_a = compute_returns(&CLOSES_A).unwrap();
        let returns_b = compute_returns(&CLOSES_B).unwrap();
        assert_eq!(
            pearson_correlation(&returns_a, &returns_b).unwrap(),
            pearson_correlation(&returns_b, &returns_a).unwrap()
        );
    }

    #[test]
    fn test_pearson_constant_series_is_zero() {
        let flat = [5.0, 5.0, 5.0, 5.0];
        let moving = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(pearson_correlation(&flat, &moving).unwrap(), 0.0);
        assert_eq!(pearson_correlation(&moving, &flat).unwrap(), 0.0);
    }

    #[test]
    fn test_pearson_length_mismatch() {
        let result = pearson_correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert_eq!(
            result,
            Err(StatsError::LengthMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_rolling_point_count_and_days() {
        let a = [1.0, 2.0, 0.5, -1.0, 3.0, 2.5, -0.5, 1.5, 0.0, 2.0];
        let b = [0.5, 1.5, 1.0, -0.5, 2.0, 3.0, 0.0, 1.0, -1.0, 1.5];
        let points: Vec<_> = rolling_correlation(&a, &b, 3).unwrap().collect();

        assert_eq!(points.len(), 7); // 10 returns - window 3
        assert_eq!(points[0].day, 3);
        assert_eq!(points[6].day, 9);

        // First window covers elements 0..3
        let expected = pearson_correlation(&a[0..3], &b[0..3]).unwrap();
        assert_eq!(points[0].correlation, expected);
    }

    #[test]
    fn test_rolling_window_at_least_series_length_is_empty() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        assert_eq!(rolling_correlation(&a, &b, 3).unwrap().count(), 0);
        assert_eq!(rolling_correlation(&a, &b, 10).unwrap().count(), 0);
    }

    #[test]
    fn test_rolling_rejects_zero_window() {
        assert!(rolling_correlation(&[1.0, 2.0], &[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_rolling_length_mismatch() {
        assert!(rolling_correlation(&[1.0], &[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn test_beta_of_self_is_one() {
        let returns = compute_returns(&CLOSES_A).unwrap();
        assert_eq!(compute_beta(&returns, &returns).unwrap(), 1.0);
    }

    #[test]
    fn test_beta_of_scaled_series() {
        let benchmark = [1.0, -2.0, 3.0, 0.5];
        let doubled: Vec<f64> = benchmark.iter().map(|r| r * 2.0).collect();
        assert_eq!(compute_beta(&doubled, &benchmark).unwrap(), 2.0);
    }

    #[test]
    fn test_beta_flat_benchmark_is_zero() {
        let coin = [1.0, 2.0, 3.0];
        let flat = [4.0, 4.0, 4.0];
        assert_eq!(compute_beta(&coin, &flat).unwrap(), 0.0);
    }

    #[test]
    fn test_beta_length_mismatch() {
        assert!(compute_beta(&[1.0, 2.0], &[1.0]).is_err());
    }
}
