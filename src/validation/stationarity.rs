//! Augmented Dickey-Fuller unit-root test.
//!
//! The test regresses `Δy_t = α + β y_{t-1} + Σ γ_i Δy_{t-i} + ε_t`, picks the
//! number of augmentation lags by AIC and reports the t-statistic of `β`.
//! P-values follow the MacKinnon (1994) response surface for a regression
//! with constant; critical values follow MacKinnon (2010).

use crate::utils::ols::ols_fit;
use statrs::distribution::{ContinuousCDF, Normal};

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value (MacKinnon approximation)
    pub p_value: f64,
    /// Number of augmentation lags used
    pub lags: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Whether the unit root is rejected at 5%
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undefined(lags: usize) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            nobs: 0,
            is_stationary: false,
            critical_values: CriticalValues::default(),
        }
    }

    /// Whether the unit-root null is rejected at significance `alpha`.
    ///
    /// An undefined p-value never rejects.
    pub fn rejects_unit_root(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

// MacKinnon (1994) tau_c surface for a single series.
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) finite-sample critical value coefficients, constant only.
const CV_1PCT_C: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CV_5PCT_C: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CV_10PCT_C: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Schwert's rule for the maximum ADF lag: `round(12 * (n / 100)^(1/4))`.
pub fn schwert_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).round() as usize
}

/// Augmented Dickey-Fuller test for unit root (non-stationarity).
///
/// Tests null hypothesis that series has a unit root (non-stationary).
/// Rejection implies stationarity.
///
/// # Arguments
/// * `series` - Time series data
/// * `max_lags` - Maximum augmentation lags searched by AIC (default: Schwert's rule).
///   Clamped to `n / 2 - 2` so the regression keeps enough degrees of freedom.
///
/// # Returns
/// `StationarityResult` with test statistic and p-value
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> StationarityResult {
    let n = series.len();

    if n < 4 {
        return StationarityResult::undefined(0);
    }

    let max_lags = max_lags
        .unwrap_or_else(|| schwert_max_lag(n))
        .min((n / 2).saturating_sub(2));

    // First difference; diff[j] = y[j + 1] - y[j], with level y[j]
    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Select lag by AIC on the common sample that allows max_lags lags
    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lags {
        let (y, design) = adf_regression(series, &diff, lag, max_lags);
        if let Ok(fit) = ols_fit(&y, &design) {
            let aic = fit.aic();
            if aic.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, best_aic)| aic < best_aic) {
                best = Some((lag, aic));
            }
        }
    }

    let Some((best_lag, _)) = best else {
        return StationarityResult::undefined(max_lags);
    };

    // Refit on the longest sample for the chosen lag
    let (y, design) = adf_regression(series, &diff, best_lag, best_lag);
    let fit = match ols_fit(&y, &design) {
        Ok(fit) => fit,
        Err(_) => return StationarityResult::undefined(best_lag),
    };

    let t_stat = fit.t_value(1);
    if !t_stat.is_finite() {
        return StationarityResult::undefined(best_lag);
    }

    let nobs = fit.nobs;
    let p_value = adf_p_value(t_stat);
    let critical_values = CriticalValues {
        cv_1pct: critical_value(&CV_1PCT_C, nobs),
        cv_5pct: critical_value(&CV_5PCT_C, nobs),
        cv_10pct: critical_value(&CV_10PCT_C, nobs),
    };

    StationarityResult {
        statistic: t_stat,
        p_value,
        lags: best_lag,
        nobs,
        is_stationary: p_value <= 0.05,
        critical_values,
    }
}

/// Build `(Δy_t, [1, y_{t-1}, Δy_{t-1}, …, Δy_{t-lag}])` for rows starting at `start`.
fn adf_regression(
    level: &[f64],
    diff: &[f64],
    lag: usize,
    start: usize,
) -> (Vec<f64>, Vec<Vec<f64>>) {
    let mut y = Vec::with_capacity(diff.len().saturating_sub(start));
    let mut design = Vec::with_capacity(y.capacity());

    for j in start..diff.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(level[j]);
        for i in 1..=lag {
            row.push(diff[j - i]);
        }
        y.push(diff[j]);
        design.push(row);
    }

    (y, design)
}

/// Approximate p-value for the ADF statistic (constant, one series).
pub fn adf_p_value(t_stat: f64) -> f64 {
    if t_stat.is_nan() {
        return f64::NAN;
    }
    if t_stat > TAU_MAX_C {
        return 1.0;
    }
    if t_stat < TAU_MIN_C {
        return 0.0;
    }

    let coefs: &[f64] = if t_stat <= TAU_STAR_C {
        &TAU_C_SMALLP
    } else {
        &TAU_C_LARGEP
    };
    let z = coefs
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * t_stat + c);

    Normal::new(0.0, 1.0).map_or(f64::NAN, |normal| normal.cdf(z))
}

fn critical_value(coefs: &[f64; 4], nobs: usize) -> f64 {
    let inv = 1.0 / nobs as f64;
    coefs[0] + coefs[1] * inv + coefs[2] * inv * inv + coefs[3] * inv * inv * inv
}
