//! Repeated differencing of a panel until every column passes the ADF test.

use crate::core::Panel;
use crate::validation::{adf_test, schwert_max_lag};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Settings for [`make_stationary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityConfig {
    /// Panels shorter than this are neither tested nor differenced.
    pub min_observations: usize,
    /// A column is stationary when its ADF p-value is at most this.
    pub significance: f64,
    /// Maximum number of first-difference passes.
    pub max_differencing_passes: usize,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            min_observations: 20,
            significance: 0.05,
            max_differencing_passes: 2,
        }
    }
}

impl StationarityConfig {
    /// Set the differencing budget.
    pub fn with_max_differencing_passes(mut self, passes: usize) -> Self {
        self.max_differencing_passes = passes;
        self
    }

    /// Set the ADF significance level.
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    /// Set the minimum panel length for testing.
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }
}

/// Outcome of [`make_stationary`].
#[derive(Debug, Clone)]
pub struct StationaryPanel {
    /// The panel after `passes` first differences.
    pub panel: Panel,
    /// Every column rejected the unit root on the final panel.
    pub fully_stationary: bool,
    /// First differences applied; `panel.len() == original.len() - passes`.
    pub passes: usize,
    /// Testing rounds entered, counting from 1 (0 when the panel was too short to test).
    pub iterations: usize,
}

/// ADF verdict for one column.
#[derive(Debug, Clone)]
pub struct ColumnStationarity {
    /// Column name.
    pub column: String,
    /// ADF p-value.
    pub p_value: f64,
    /// Augmentation lags chosen by AIC.
    pub lags: usize,
    /// Whether the column passed.
    pub stationary: bool,
}

/// Test every column of `panel` for a unit root.
///
/// Uses Schwert's maximum lag for the panel length.
pub fn column_stationarity(panel: &Panel, significance: f64) -> Vec<ColumnStationarity> {
    let max_lag = schwert_max_lag(panel.len());
    panel
        .labels()
        .iter()
        .zip(panel.values_by_dimension())
        .map(|(label, values)| {
            let adf = adf_test(values, Some(max_lag));
            ColumnStationarity {
                column: label.clone(),
                p_value: adf.p_value,
                lags: adf.lags,
                stationary: adf.rejects_unit_root(significance),
            }
        })
        .collect()
}

fn all_columns_stationary(panel: &Panel, significance: f64) -> bool {
    let verdicts = column_stationarity(panel, significance);
    for v in &verdicts {
        debug!(
            column = %v.column,
            p_value = v.p_value,
            lags = v.lags,
            stationary = v.stationary,
            "ADF"
        );
    }
    verdicts.iter().all(|v| v.stationary)
}

/// Difference `panel` until every column is stationary or the budget runs out.
///
/// The input is left untouched; differencing happens on a copy. Panels
/// shorter than `config.min_observations` are returned as-is without
/// running any test. Differencing also stops once the panel would drop
/// below that length, since the test is unreliable there.
pub fn make_stationary(panel: &Panel, config: &StationarityConfig) -> StationaryPanel {
    if panel.len() < config.min_observations {
        return StationaryPanel {
            panel: panel.clone(),
            fully_stationary: false,
            passes: 0,
            iterations: 0,
        };
    }

    let mut current = panel.clone();
    let mut passes = 0;
    let mut fully_stationary = false;

    loop {
        if all_columns_stationary(&current, config.significance) {
            fully_stationary = true;
            break;
        }
        if passes >= config.max_differencing_passes {
            warn!(passes, "unable to make all series stationary");
            break;
        }

        passes += 1;
        debug!(pass = passes, "one or more series are non-stationary, differencing");
        current = current.difference();

        if current.len() < config.min_observations {
            warn!(
                rows = current.len(),
                "panel too short to retest after differencing"
            );
            break;
        }
    }

    StationaryPanel {
        panel: current,
        fully_stationary,
        passes,
        iterations: passes + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise_panel(n: usize, seed: u64) -> Panel {
        let mut rng = StdRng::seed_from_u64(seed);
        let a: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Panel::new(
            (0..n as i32).map(|i| 1950 + i).collect(),
            vec!["gdp_growth".to_string(), "emp".to_string()],
            vec![a, b],
        )
        .unwrap()
    }

    fn drifting_panel(n: usize, seed: u64) -> Panel {
        let base = noise_panel(n, seed);
        let values = base
            .values_by_dimension()
            .iter()
            .map(|column| {
                let mut level = 10.0;
                column
                    .iter()
                    .map(|e| {
                        level += 1.0 + e;
                        level
                    })
                    .collect()
            })
            .collect();
        Panel::new(base.periods().to_vec(), base.labels().to_vec(), values).unwrap()
    }

    /// Running sum of every column; raises the integration order by one.
    fn integrated(panel: &Panel) -> Panel {
        let values = panel
            .values_by_dimension()
            .iter()
            .map(|column| {
                let mut level = 0.0;
                column
                    .iter()
                    .map(|x| {
                        level += x;
                        level
                    })
                    .collect()
            })
            .collect();
        Panel::new(panel.periods().to_vec(), panel.labels().to_vec(), values).unwrap()
    }

    #[test]
    fn short_panels_are_not_tested() {
        for n in [0, 1, 10, 19] {
            let panel = noise_panel(n, 1);
            let result = make_stationary(&panel, &StationarityConfig::default());
            assert!(!result.fully_stationary);
            assert_eq!(result.passes, 0);
            assert_eq!(result.iterations, 0);
            assert_eq!(result.panel, panel);
        }
    }

    #[test]
    fn stationary_panel_needs_no_differencing() {
        let panel = noise_panel(80, 21);
        let result = make_stationary(&panel, &StationarityConfig::default());

        assert!(result.fully_stationary);
        assert_eq!(result.passes, 0);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.panel.len(), 80);
    }

    #[test]
    fn random_walks_are_differenced_once() {
        let panel = drifting_panel(80, 5);
        let result = make_stationary(&panel, &StationarityConfig::default());

        assert!(result.fully_stationary);
        assert_eq!(result.passes, 1);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.panel.len(), panel.len() - result.passes);
        assert_eq!(result.panel, panel.difference());
    }

    #[test]
    fn second_order_panels_use_the_full_default_budget() {
        let panel = integrated(&drifting_panel(80, 5));
        let result = make_stationary(&panel, &StationarityConfig::default());

        assert!(result.fully_stationary);
        assert_eq!(result.passes, 2);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.panel.len(), panel.len() - 2);
        assert_eq!(result.panel, panel.difference().difference());
    }

    #[test]
    fn budget_is_never_exceeded() {
        // third-order integration still has a unit root after two passes
        let panel = integrated(&integrated(&drifting_panel(80, 5)));
        let result = make_stationary(&panel, &StationarityConfig::default());

        assert!(!result.fully_stationary);
        assert_eq!(result.passes, 2);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.panel.len(), 78);
        assert_eq!(result.panel, panel.difference().difference());
    }

    #[test]
    fn zero_budget_reports_failure() {
        let panel = drifting_panel(80, 5);
        let config = StationarityConfig::default().with_max_differencing_passes(0);
        let result = make_stationary(&panel, &config);

        assert!(!result.fully_stationary);
        assert_eq!(result.passes, 0);
        assert_eq!(result.panel, panel);
    }

    #[test]
    fn stops_when_differencing_drops_below_floor() {
        let panel = drifting_panel(20, 9);
        let result = make_stationary(&panel, &StationarityConfig::default());

        assert!(!result.fully_stationary);
        assert_eq!(result.passes, 1);
        assert_eq!(result.panel.len(), 19);
    }

    #[test]
    fn input_panel_is_untouched() {
        let panel = drifting_panel(40, 2);
        let copy = panel.clone();
        let _ = make_stationary(&panel, &StationarityConfig::default());
        assert_eq!(panel, copy);
    }

    #[test]
    fn column_report_names_every_column() {
        let report = column_stationarity(&noise_panel(60, 4), 0.05);
        let names: Vec<&str> = report.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["gdp_growth", "emp"]);
    }
}
