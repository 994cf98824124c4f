//! Ordinary Least Squares (OLS) regression on an explicit design matrix.
//!
//! Used by the augmented Dickey-Fuller test (single response with standard
//! errors) and by the vector autoregression (one response per equation sharing
//! the same regressors).

use crate::error::{ForecastError, Result};

/// Pivot tolerance on the column-equilibrated normal equations.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Single-response OLS fit.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Coefficients in design-column order.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations used.
    pub nobs: usize,
}

impl OLSResult {
    /// Number of estimated parameters.
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of coefficient `index`.
    pub fn t_value(&self, index: usize) -> f64 {
        self.coefficients[index] / self.std_errors[index]
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }
}

/// Fit `y = X β + ε` where `design` holds one row of regressors per observation.
pub fn ols_fit(y: &[f64], design: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = validate_design(n, design)?;

    let (xtx, scales) = scaled_cross_product(design, k)?;
    let mut xty = vec![0.0; k];
    for (row, &y_obs) in design.iter().zip(y) {
        for j in 0..k {
            xty[j] += row[j] / scales[j] * y_obs;
        }
    }

    let chol = Cholesky::factor(&xtx).ok_or_else(singular)?;
    let coefficients: Vec<f64> = chol
        .solve(&xty)
        .iter()
        .zip(&scales)
        .map(|(b, s)| b / s)
        .collect();

    let ssr: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &y_obs)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (y_obs - fitted).powi(2)
        })
        .sum();

    let sigma_sq = if n > k {
        ssr / (n - k) as f64
    } else {
        f64::NAN
    };

    let std_errors = chol
        .inverse_diagonal()
        .iter()
        .zip(&scales)
        .map(|(d, s)| (sigma_sq * d).sqrt() / s)
        .collect();

    Ok(OLSResult {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Fit one OLS equation per response column, all sharing `design`.
///
/// `targets` holds one row of responses per observation. Returns
/// `coefficients[equation][regressor]`.
pub fn ols_fit_multi(targets: &[Vec<f64>], design: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = targets.len();
    let k = validate_design(n, design)?;
    let m = targets.first().map(|row| row.len()).unwrap_or(0);

    for row in targets {
        if row.len() != m {
            return Err(ForecastError::DimensionMismatch {
                expected: m,
                got: row.len(),
            });
        }
    }

    let (xtx, scales) = scaled_cross_product(design, k)?;
    let chol = Cholesky::factor(&xtx).ok_or_else(singular)?;

    let mut coefficients = Vec::with_capacity(m);
    for eq in 0..m {
        let mut xty = vec![0.0; k];
        for (row, target) in design.iter().zip(targets) {
            for j in 0..k {
                xty[j] += row[j] / scales[j] * target[eq];
            }
        }
        let beta = chol
            .solve(&xty)
            .iter()
            .zip(&scales)
            .map(|(b, s)| b / s)
            .collect();
        coefficients.push(beta);
    }

    Ok(coefficients)
}

fn singular() -> ForecastError {
    ForecastError::ComputationError("OLS normal equations are singular".into())
}

/// Check the design shape and return the number of regressors.
fn validate_design(n: usize, design: &[Vec<f64>]) -> Result<usize> {
    if n == 0 {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if design.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: design.len(),
        });
    }

    let k = design[0].len();
    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "design matrix has no regressors".into(),
        ));
    }
    for row in design {
        if row.len() != k {
            return Err(ForecastError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }
    }
    if n < k {
        return Err(ForecastError::InsufficientData { needed: k, got: n });
    }
    Ok(k)
}

/// X'X of the column-equilibrated design, with the column norms used.
fn scaled_cross_product(design: &[Vec<f64>], k: usize) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let mut scales = vec![0.0; k];
    for row in design {
        for j in 0..k {
            scales[j] += row[j] * row[j];
        }
    }
    for s in scales.iter_mut() {
        *s = s.sqrt();
        if *s == 0.0 || !s.is_finite() {
            return Err(singular());
        }
    }

    let mut xtx = vec![vec![0.0; k]; k];
    for row in design {
        for i in 0..k {
            let xi = row[i] / scales[i];
            for j in 0..=i {
                xtx[i][j] += xi * row[j] / scales[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    Ok((xtx, scales))
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
struct Cholesky {
    l: Vec<Vec<f64>>,
}

impl Cholesky {
    /// Factor `A = L L'`, or `None` if `A` is not numerically positive definite.
    fn factor(a: &[Vec<f64>]) -> Option<Self> {
        let n = a.len();
        let mut l = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..=i {
                let mut sum = a[i][j];
                for k in 0..j {
                    sum -= l[i][k] * l[j][k];
                }

                if i == j {
                    if sum <= PIVOT_TOLERANCE || !sum.is_finite() {
                        return None;
                    }
                    l[i][j] = sum.sqrt();
                } else {
                    l[i][j] = sum / l[j][j];
                }
            }
        }

        Some(Self { l })
    }

    /// Solve `A x = b`.
    fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = b.len();
        let l = &self.l;

        // Forward substitution: L @ y = b
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for j in 0..i {
                sum -= l[i][j] * y[j];
            }
            y[i] = sum / l[i][i];
        }

        // Backward substitution: L' @ x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in (i + 1)..n {
                sum -= l[j][i] * x[j];
            }
            x[i] = sum / l[i][i];
        }

        x
    }

    /// Diagonal of `A^{-1}`.
    fn inverse_diagonal(&self) -> Vec<f64> {
        let n = self.l.len();
        (0..n)
            .map(|j| {
                let mut e = vec![0.0; n];
                e[j] = 1.0;
                self.solve(&e)[j]
            })
            .collect()
    }
}
