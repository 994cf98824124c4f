//! Vector autoregression estimated by ordinary least squares.

use crate::core::Panel;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::ols::ols_fit_multi;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deterministic terms added to every VAR equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    /// No deterministic terms.
    #[serde(rename = "n")]
    None,
    /// Constant.
    #[serde(rename = "c")]
    Constant,
    /// Constant and linear trend.
    #[serde(rename = "ct")]
    ConstantLinear,
    /// Constant, linear and quadratic trend.
    #[serde(rename = "ctt")]
    ConstantQuadratic,
}

impl Trend {
    /// Every trend specification, in search order.
    pub const ALL: [Trend; 4] = [
        Trend::None,
        Trend::Constant,
        Trend::ConstantLinear,
        Trend::ConstantQuadratic,
    ];

    /// Short code (`n`, `c`, `ct`, `ctt`).
    pub fn code(self) -> &'static str {
        match self {
            Trend::None => "n",
            Trend::Constant => "c",
            Trend::ConstantLinear => "ct",
            Trend::ConstantQuadratic => "ctt",
        }
    }

    /// Number of deterministic regressors.
    pub fn num_terms(self) -> usize {
        match self {
            Trend::None => 0,
            Trend::Constant => 1,
            Trend::ConstantLinear => 2,
            Trend::ConstantQuadratic => 3,
        }
    }

    /// Append the deterministic regressors for 1-based time `t`.
    fn push_terms(self, t: f64, row: &mut Vec<f64>) {
        if self.num_terms() >= 1 {
            row.push(1.0);
        }
        if self.num_terms() >= 2 {
            row.push(t);
        }
        if self.num_terms() >= 3 {
            row.push(t * t);
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Trend {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Trend::ALL
            .into_iter()
            .find(|trend| trend.code() == s)
            .ok_or_else(|| ForecastError::InvalidParameter(format!("unknown trend '{}'", s)))
    }
}

/// VAR hyperparameters: lag order and trend specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarOrder {
    /// Number of lagged rows in each equation.
    pub lag: usize,
    /// Deterministic terms.
    pub trend: Trend,
}

impl VarOrder {
    /// Create an order.
    pub fn new(lag: usize, trend: Trend) -> Self {
        Self { lag, trend }
    }

    /// Regressors per equation for a panel with `dimensions` columns.
    pub fn num_params(&self, dimensions: usize) -> usize {
        self.trend.num_terms() + self.lag * dimensions
    }
}

/// Vector autoregression `y_t = D(t) + A_1 y_{t-1} + … + A_p y_{t-p} + ε_t`.
///
/// Each equation is estimated by OLS on the same regressors. The trend
/// variable `t` is the 1-based row position in the fitted panel and keeps
/// counting past its end when forecasting.
#[derive(Debug, Clone)]
pub struct VAR {
    order: VarOrder,
    labels: Vec<String>,
    /// coefficients[equation][regressor], regressors ordered trend terms then lags
    coefficients: Option<Vec<Vec<f64>>>,
    n_obs: usize,
}

impl VAR {
    /// Create an unfitted VAR of the given order.
    pub fn new(order: VarOrder) -> Self {
        Self {
            order,
            labels: Vec::new(),
            coefficients: None,
            n_obs: 0,
        }
    }

    /// The model order.
    pub fn order(&self) -> VarOrder {
        self.order
    }

    /// Fitted coefficients, `[equation][regressor]`.
    pub fn coefficients(&self) -> Option<&[Vec<f64>]> {
        self.coefficients.as_deref()
    }

    /// Column names the model was fitted on.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Regressor row for the observation following `window` (oldest first).
    fn regressors(&self, window: &[Vec<f64>], t: f64) -> Vec<f64> {
        let dims = self.labels.len();
        let mut row = Vec::with_capacity(self.order.num_params(dims));
        self.order.trend.push_terms(t, &mut row);
        for previous in window.iter().rev() {
            row.extend_from_slice(previous);
        }
        row
    }
}

impl Forecaster for VAR {
    fn fit(&mut self, panel: &Panel) -> Result<()> {
        let lag = self.order.lag;
        if lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "VAR lag order must be at least 1".into(),
            ));
        }

        let dims = panel.dimensions();
        if dims == 0 || panel.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let k = self.order.num_params(dims);
        let n = panel.len();
        if n < lag + k {
            return Err(ForecastError::InsufficientData {
                needed: lag + k,
                got: n,
            });
        }

        self.labels = panel.labels().to_vec();
        let rows = panel.rows();

        let mut design = Vec::with_capacity(n - lag);
        let mut targets = Vec::with_capacity(n - lag);
        for t in lag..n {
            design.push(self.regressors(&rows[t - lag..t], (t + 1) as f64));
            targets.push(rows[t].clone());
        }

        let coefficients = ols_fit_multi(&targets, &design)?;
        if coefficients.iter().flatten().any(|c| !c.is_finite()) {
            return Err(ForecastError::ComputationError(
                "non-finite VAR coefficients".into(),
            ));
        }

        self.coefficients = Some(coefficients);
        self.n_obs = n;
        Ok(())
    }

    fn forecast(&self, seed: &Panel, steps: usize) -> Result<Vec<Vec<f64>>> {
        let coefficients = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        let lag = self.order.lag;

        if seed.dimensions() != self.labels.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.labels.len(),
                got: seed.dimensions(),
            });
        }
        if seed.len() < lag {
            return Err(ForecastError::InsufficientData {
                needed: lag,
                got: seed.len(),
            });
        }

        let mut history = seed.tail(lag)?.rows();
        for h in 0..steps {
            let t = (self.n_obs + h + 1) as f64;
            let x = self.regressors(&history[history.len() - lag..], t);
            let next = coefficients
                .iter()
                .map(|beta| beta.iter().zip(&x).map(|(b, v)| b * v).sum())
                .collect();
            history.push(next);
        }

        Ok(history.split_off(lag))
    }

    fn seed_length(&self) -> usize {
        self.order.lag
    }

    fn name(&self) -> &str {
        "VAR"
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// VAR(1): x_t = 0.5 x_{t-1} + 0.2 z_{t-1} + 1, z_t = -0.3 x_{t-1} + 0.4 z_{t-1} + 2,
    /// plus uniform shocks of half-width `noise`.
    fn var1_panel(n: usize, noise: f64) -> Panel {
        let mut rng = StdRng::seed_from_u64(17);
        let mut rows = vec![vec![3.0, -1.0]];
        for t in 1..n {
            let (x, z) = (rows[t - 1][0], rows[t - 1][1]);
            let e = noise * rng.gen_range(-1.0..1.0);
            let u = noise * rng.gen_range(-1.0..1.0);
            rows.push(vec![0.5 * x + 0.2 * z + 1.0 + e, -0.3 * x + 0.4 * z + 2.0 + u]);
        }
        Panel::from_rows((0..n as i32).collect(), labels(&["x", "z"]), rows).unwrap()
    }

    #[test]
    fn trend_codes_round_trip() {
        for trend in Trend::ALL {
            assert_eq!(trend.code().parse::<Trend>().unwrap(), trend);
        }
        assert!("quadratic".parse::<Trend>().is_err());
        assert_eq!(Trend::ConstantQuadratic.to_string(), "ctt");
    }

    #[test]
    fn trend_serializes_as_code() {
        let json = serde_json::to_string(&VarOrder::new(2, Trend::ConstantLinear)).unwrap();
        assert_eq!(json, r#"{"lag":2,"trend":"ct"}"#);
    }

    #[test]
    fn num_params_counts_trend_and_lags() {
        assert_eq!(VarOrder::new(3, Trend::None).num_params(5), 15);
        assert_eq!(VarOrder::new(2, Trend::ConstantQuadratic).num_params(4), 11);
    }

    #[test]
    fn fit_recovers_var1_coefficients() {
        // Noise-free transient: the fit is exact
        let panel = var1_panel(30, 0.0);
        let mut model = VAR::new(VarOrder::new(1, Trend::Constant));
        model.fit(&panel).unwrap();

        let coefs = model.coefficients().unwrap();
        // [const, x_{t-1}, z_{t-1}]
        assert_relative_eq!(coefs[0][0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(coefs[0][1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(coefs[0][2], 0.2, epsilon = 1e-6);
        assert_relative_eq!(coefs[1][0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(coefs[1][1], -0.3, epsilon = 1e-6);
        assert_relative_eq!(coefs[1][2], 0.4, epsilon = 1e-6);
    }

    #[test]
    fn forecast_follows_fitted_dynamics() {
        let panel = var1_panel(200, 0.5);
        let mut model = VAR::new(VarOrder::new(1, Trend::Constant));
        model.fit(&panel).unwrap();

        let forecast = model.forecast(&panel, 3).unwrap();
        assert_eq!(forecast.len(), 3);

        let coefs = model.coefficients().unwrap();
        let last = panel.row(panel.len() - 1).unwrap();
        let expected_x = coefs[0][0] + coefs[0][1] * last[0] + coefs[0][2] * last[1];
        assert_relative_eq!(forecast[0][0], expected_x, epsilon = 1e-10);
    }

    #[test]
    fn forecast_uses_only_last_lag_rows() {
        let panel = var1_panel(120, 0.5);
        let mut model = VAR::new(VarOrder::new(2, Trend::None));
        model.fit(&panel).unwrap();

        let full = model.forecast(&panel, 4).unwrap();
        let tail = model.forecast(&panel.tail(2).unwrap(), 4).unwrap();
        assert_eq!(full, tail);
    }

    #[test]
    fn linear_trend_continues_past_sample() {
        // y_t = 2t exactly; with trend "ct" and lag 1 the fit is exact
        let n = 30;
        let values: Vec<f64> = (1..=n).map(|t| 2.0 * t as f64 + ((t % 3) as f64) * 0.01).collect();
        let panel = Panel::new((0..n as i32).collect(), labels(&["y"]), vec![values]).unwrap();

        let mut model = VAR::new(VarOrder::new(1, Trend::ConstantLinear));
        model.fit(&panel).unwrap();
        let forecast = model.forecast(&panel, 2).unwrap();

        assert_relative_eq!(forecast[0][0], 62.0, epsilon = 0.1);
        assert_relative_eq!(forecast[1][0], 64.0, epsilon = 0.1);
    }

    #[test]
    fn fit_rejects_too_few_rows() {
        let panel = var1_panel(10, 0.5);
        let mut model = VAR::new(VarOrder::new(4, Trend::ConstantQuadratic));
        assert!(matches!(
            model.fit(&panel),
            Err(ForecastError::InsufficientData { .. })
        ));
        assert!(!model.is_fitted());
    }

    #[test]
    fn fit_rejects_zero_lag() {
        let mut model = VAR::new(VarOrder::new(0, Trend::Constant));
        assert!(model.fit(&var1_panel(50, 0.5)).is_err());
    }

    #[test]
    fn forecast_requires_fit() {
        let model = VAR::new(VarOrder::new(1, Trend::Constant));
        assert_eq!(
            model.forecast(&var1_panel(5, 0.5), 2).unwrap_err(),
            ForecastError::FitRequired
        );
    }

    #[test]
    fn forecast_checks_seed_shape() {
        let panel = var1_panel(60, 0.5);
        let mut model = VAR::new(VarOrder::new(3, Trend::Constant));
        model.fit(&panel).unwrap();
        assert!(model.forecast(&panel.tail(2).unwrap(), 1).is_err());

        let one_col = panel.select(&["x"]).unwrap();
        assert!(matches!(
            model.forecast(&one_col, 1),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }
}
