//! Accuracy and summary statistics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Root mean squared error between actual and predicted values.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let mse = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;

    Ok(mse.sqrt())
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Most frequent value.
///
/// Ties go to the value whose first occurrence comes earliest in `values`.
/// Returns `None` for an empty slice.
pub fn mode<T: PartialEq + Clone>(values: &[T]) -> Option<T> {
    // (first index, count) per distinct value, in first-occurrence order
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match counts.iter_mut().find(|(first, _)| values[*first] == *value) {
            Some((_, count)) => *count += 1,
            None => counts.push((i, 1)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for &(first, count) in &counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((first, count));
        }
    }
    best.map(|(first, _)| values[first].clone())
}
