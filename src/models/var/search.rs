//! Grid search over VAR lag order and trend specification.

use crate::core::Panel;
use crate::error::{ForecastError, Result};
use crate::models::var::engine::{fit, forecast};
use crate::models::var::model::{Trend, VarOrder};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Configuration for [`search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Largest lag order tried; lags run from 1 to this inclusive.
    pub max_lag: usize,
    /// Maximum number of improving candidates retained.
    pub top_k: usize,
    /// Trend specifications tried for every lag, in order.
    pub trends: Vec<Trend>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_lag: 8,
            top_k: 10,
            trends: Trend::ALL.to_vec(),
        }
    }
}

impl SearchConfig {
    /// Set the largest lag order.
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Set the number of retained candidates.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Restrict the trend specifications.
    pub fn with_trends(mut self, trends: Vec<Trend>) -> Self {
        self.trends = trends;
        self
    }

    /// Grid points in evaluation order: lag-major, trend-minor.
    pub fn grid(&self) -> Vec<VarOrder> {
        (1..=self.max_lag)
            .flat_map(|lag| self.trends.iter().map(move |&trend| VarOrder::new(lag, trend)))
            .collect()
    }
}

/// Forecast error of one VAR configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// RMSE of the dependent column on the original scale.
    pub rmse: f64,
    /// Configuration that produced it.
    pub hyper_params: VarOrder,
}

/// A retained search candidate with its reconstructed forecast.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Error and configuration.
    pub prediction: PredictionResult,
    /// Forecast on the original scale over the test periods.
    pub forecast: Panel,
}

/// Evaluate every (lag, trend) pair and keep the improving ones, best first.
///
/// A configuration is retained only when its error is strictly below the best
/// seen so far in grid order, so ties keep the earlier configuration. Retained
/// candidates sit in a queue of at most `top_k` entries that evicts its oldest
/// (worst) member on overflow; the result is that queue reversed, which
/// orders it by ascending error.
///
/// Configurations that cannot be fitted or forecast (too few rows for the
/// parameter count, singular regressors, non-finite forecasts) are skipped.
/// If nothing improves on an infinite error the result is empty.
pub fn search(
    config: &SearchConfig,
    dependent: &str,
    train: &Panel,
    differenced_train: &Panel,
    test: &Panel,
    passes: usize,
) -> Result<Vec<Candidate>> {
    if config.max_lag == 0 {
        return Err(ForecastError::InvalidParameter(
            "max_lag must be at least 1".into(),
        ));
    }
    if config.top_k == 0 {
        return Err(ForecastError::InvalidParameter(
            "top_k must be at least 1".into(),
        ));
    }
    train.column_index(dependent)?;
    test.column_index(dependent)?;
    differenced_train.column_index(dependent)?;

    let mut best_rmse = f64::INFINITY;
    let mut retained: VecDeque<Candidate> = VecDeque::with_capacity(config.top_k + 1);

    for order in config.grid() {
        let outcome = fit(differenced_train, order).and_then(|model| {
            forecast(
                &model,
                train,
                test,
                differenced_train,
                order.lag,
                passes,
                dependent,
            )
        });

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(lag = order.lag, trend = %order.trend, error = %err, "skipping VAR configuration");
                continue;
            }
        };

        if outcome.rmse < best_rmse {
            debug!(
                lag = order.lag,
                trend = %order.trend,
                rmse = outcome.rmse,
                "better parameters found"
            );
            best_rmse = outcome.rmse;
            retained.push_back(Candidate {
                prediction: PredictionResult {
                    rmse: outcome.rmse,
                    hyper_params: order,
                },
                forecast: outcome.forecast,
            });
            while retained.len() > config.top_k {
                retained.pop_front();
            }
        }
    }

    Ok(retained.into_iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noisy_panel(n: usize, seed: u64) -> Panel {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = vec![vec![0.0, 0.0, 0.0]];
        for t in 1..n {
            let p = &rows[t - 1];
            rows.push(vec![
                0.4 * p[0] + 0.1 * p[1] + rng.gen_range(-1.0..1.0),
                0.2 * p[0] - 0.3 * p[2] + rng.gen_range(-1.0..1.0),
                0.5 * p[2] + rng.gen_range(-1.0..1.0),
            ]);
        }
        Panel::from_rows(
            (0..n as i32).map(|t| 1960 + t).collect(),
            vec!["gdp_growth".into(), "emp".into(), "hc".into()],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn grid_is_lag_major() {
        let grid = SearchConfig::default().with_max_lag(2).grid();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid[0], VarOrder::new(1, Trend::None));
        assert_eq!(grid[3], VarOrder::new(1, Trend::ConstantQuadratic));
        assert_eq!(grid[4], VarOrder::new(2, Trend::None));
    }

    #[test]
    fn results_are_strictly_improving_best_first() {
        let panel = noisy_panel(60, 3);
        let train = panel.slice(0, 45).unwrap();
        let test = panel.slice(45, 60).unwrap();

        let results = search(&SearchConfig::default(), "gdp_growth", &train, &train, &test, 0).unwrap();

        assert!(!results.is_empty());
        assert!(results.len() <= 10);
        for pair in results.windows(2) {
            assert!(pair[0].prediction.rmse < pair[1].prediction.rmse);
        }
        // best candidate's forecast covers the test horizon
        assert_eq!(results[0].forecast.len(), test.len());
    }

    #[test]
    fn best_matches_exhaustive_minimum() {
        let panel = noisy_panel(50, 8);
        let train = panel.slice(0, 40).unwrap();
        let test = panel.slice(40, 50).unwrap();
        let config = SearchConfig::default().with_max_lag(3);

        let results = search(&config, "gdp_growth", &train, &train, &test, 0).unwrap();

        let mut minimum = f64::INFINITY;
        for order in config.grid() {
            if let Ok(model) = fit(&train, order) {
                if let Ok(outcome) = forecast(&model, &train, &test, &train, order.lag, 0, "gdp_growth") {
                    if outcome.rmse < minimum {
                        minimum = outcome.rmse;
                    }
                }
            }
        }
        assert_eq!(results[0].prediction.rmse, minimum);
    }

    #[test]
    fn queue_keeps_most_recent_improvements() {
        let panel = noisy_panel(60, 3);
        let train = panel.slice(0, 45).unwrap();
        let test = panel.slice(45, 60).unwrap();

        let all = search(&SearchConfig::default(), "gdp_growth", &train, &train, &test, 0).unwrap();
        let one = search(
            &SearchConfig::default().with_top_k(1),
            "gdp_growth",
            &train,
            &train,
            &test,
            0,
        )
        .unwrap();

        assert_eq!(one.len(), 1);
        assert_eq!(one[0].prediction, all[0].prediction);
    }

    #[test]
    fn unfittable_grid_returns_empty() {
        // 8 rows cannot support any lag with three variables and a trend
        let panel = noisy_panel(12, 1);
        let train = panel.slice(0, 4).unwrap();
        let test = panel.slice(4, 12).unwrap();
        let config = SearchConfig::default().with_trends(vec![Trend::ConstantQuadratic]);

        let results = search(&config, "gdp_growth", &train, &train, &test, 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn missing_dependent_is_an_error() {
        let panel = noisy_panel(30, 1);
        assert!(matches!(
            search(&SearchConfig::default(), "rgdpna", &panel, &panel, &panel, 0),
            Err(ForecastError::MissingColumn(_))
        ));
    }

    #[test]
    fn zero_budgets_are_rejected() {
        let panel = noisy_panel(30, 1);
        let config = SearchConfig::default().with_top_k(0);
        assert!(search(&config, "gdp_growth", &panel, &panel, &panel, 0).is_err());
        let config = SearchConfig::default().with_max_lag(0);
        assert!(search(&config, "gdp_growth", &panel, &panel, &panel, 0).is_err());
    }
}
