//! Cross-validated VAR evaluation of a single country.

use crate::core::Panel;
use crate::error::Result;
use crate::models::var::search;
use crate::transform::make_stationary;
use crate::tuning::pipeline::PipelineConfig;
use crate::tuning::results::{CountryResult, FoldResult};
use crate::utils::cross_validation::split;
use tracing::{debug, info, warn};

/// Evaluate every fold of one country's panel.
///
/// `panel` holds the country's rows; only the configured dependent and
/// independent columns are modelled. Each fold's training split is made
/// stationary first. Folds that fail to become stationary are not searched
/// and carry no prediction; the others keep the best configuration found.
/// A country with fewer rows than folds yields `folds` such empty folds.
pub fn evaluate_country(
    country_code: &str,
    panel: &Panel,
    config: &PipelineConfig,
) -> Result<CountryResult> {
    let panel = panel.select(&config.columns())?;
    info!(country = country_code, rows = panel.len(), "evaluating country");

    if panel.len() < config.folds {
        warn!(
            country = country_code,
            rows = panel.len(),
            folds = config.folds,
            "too few rows to split into folds"
        );
        let folds = (0..config.folds)
            .map(|fold| FoldResult {
                fold,
                fully_stationary: false,
                passes: 0,
                iterations: 0,
                train_length: panel.len(),
                test_length: 0,
                prediction: None,
            })
            .collect();
        return Ok(CountryResult::new(country_code, folds));
    }

    let mut folds = Vec::with_capacity(config.folds);
    for fold in split(&panel, config.folds)? {
        let stationary = make_stationary(&fold.train, &config.stationarity);

        let prediction = if stationary.fully_stationary {
            let candidates = search(
                &config.search,
                &config.dependent,
                &fold.train,
                &stationary.panel,
                &fold.test,
                stationary.passes,
            )?;
            let best = candidates.into_iter().next().map(|c| c.prediction);
            if best.is_none() {
                debug!(
                    country = country_code,
                    fold = fold.fold,
                    "no VAR configuration could be fitted"
                );
            }
            best
        } else {
            None
        };

        folds.push(FoldResult {
            fold: fold.fold,
            fully_stationary: stationary.fully_stationary,
            passes: stationary.passes,
            iterations: stationary.iterations,
            train_length: fold.train.len(),
            test_length: fold.test.len(),
            prediction,
        });
    }

    let result = CountryResult::new(country_code, folds);
    info!(
        country = country_code,
        stationary_rate = ?result.summary.stationary_rate.value(),
        mean_rmse = ?result.summary.mean_rmse.value(),
        "country evaluated"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;
    use crate::models::var::SearchConfig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn country_panel(n: usize, seed: u64) -> Panel {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = vec![vec![0.0, 0.0, 7.0]];
        for t in 1..n {
            let p = &rows[t - 1];
            rows.push(vec![
                0.3 * p[0] + 0.1 * p[1] + rng.gen_range(-1.0..1.0),
                0.2 * p[0] + 0.2 * p[1] + rng.gen_range(-1.0..1.0),
                p[2] + rng.gen_range(-1.0..1.0),
            ]);
        }
        Panel::from_rows(
            (0..n as i32).map(|t| 1970 + t).collect(),
            vec!["gdp_growth".into(), "emp".into(), "unused".into()],
            rows,
        )
        .unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new("gdp_growth", vec!["emp".to_string()])
            .with_search(SearchConfig::default().with_max_lag(2))
    }

    #[test]
    fn one_result_per_fold() {
        let result = evaluate_country("AAA", &country_panel(60, 4), &config()).unwrap();

        assert_eq!(result.country_code, "AAA");
        assert_eq!(result.folds.len(), 4);
        let folds: Vec<usize> = result.folds.iter().map(|f| f.fold).collect();
        assert_eq!(folds, vec![0, 1, 2, 3]);
        assert_eq!(result.folds.iter().map(|f| f.test_length).sum::<usize>(), 60);
        for fold in &result.folds {
            assert_eq!(fold.train_length + fold.test_length, 60);
            if !fold.fully_stationary {
                assert!(fold.prediction.is_none());
            }
        }
    }

    #[test]
    fn short_country_gets_degenerate_folds() {
        let result = evaluate_country("TUV", &country_panel(3, 1), &config()).unwrap();
        assert_eq!(result.folds.len(), 4);
        assert!(result.folds.iter().all(|f| !f.fully_stationary && f.test_length == 0));
        assert!(result.summary.mean_rmse.is_no_data());
    }

    #[test]
    fn folds_below_test_floor_are_not_searched() {
        // 24 rows leave 18 training rows per fold
        let result = evaluate_country("LUX", &country_panel(24, 2), &config()).unwrap();
        assert!(result.folds.iter().all(|f| f.iterations == 0 && f.prediction.is_none()));
    }

    #[test]
    fn missing_columns_propagate() {
        let config = PipelineConfig::new("rgdpna", vec!["emp".to_string()]);
        assert!(matches!(
            evaluate_country("AAA", &country_panel(40, 1), &config),
            Err(ForecastError::MissingColumn(_))
        ));
    }
}
