//! Differencing and its inversion for forecasts made on differenced panels.

use crate::core::Panel;
use crate::error::{ForecastError, Result};

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` values shorter than the input.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Integrate (reverse differencing) a forecast of a `d` times differenced series.
///
/// For each level `ℓ = d-1, …, 0` the running values are cumulatively summed
/// onto the last observed value of the `ℓ`-th difference of `original`.
///
/// # Arguments
/// * `differenced` - Forecast on the differenced scale
/// * `original` - The undifferenced history the forecast continues
/// * `d` - Differencing order used
///
/// # Returns
/// The forecast on the original scale.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Result<Vec<f64>> {
    if d == 0 || differenced.is_empty() {
        return Ok(differenced.to_vec());
    }
    if original.len() < d {
        return Err(ForecastError::InsufficientData {
            needed: d,
            got: original.len(),
        });
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let init_value = difference(original, level)
            .last()
            .copied()
            .ok_or(ForecastError::EmptyData)?;

        let mut cumsum = init_value;
        for value in result.iter_mut() {
            cumsum += *value;
            *value = cumsum;
        }
    }

    Ok(result)
}

/// Undo `passes` rounds of panel differencing on a forecast panel.
///
/// `history` is the undifferenced panel the forecast continues; columns are
/// matched by position and must agree in number.
pub fn invert_differencing(forecast: &Panel, history: &Panel, passes: usize) -> Result<Panel> {
    if forecast.dimensions() != history.dimensions() {
        return Err(ForecastError::DimensionMismatch {
            expected: history.dimensions(),
            got: forecast.dimensions(),
        });
    }

    let values = forecast
        .values_by_dimension()
        .iter()
        .zip(history.values_by_dimension())
        .map(|(diffed, original)| integrate(diffed, original, passes))
        .collect::<Result<Vec<_>>>()?;

    Panel::new(forecast.periods().to_vec(), forecast.labels().to_vec(), values)
}
