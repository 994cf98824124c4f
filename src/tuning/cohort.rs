//! Aggregation of country results into per-fold cohort statistics.

use crate::tuning::results::{CohortResult, CountryResult, FoldSummary, MeanSummary};
use crate::utils::metrics::{mean, mode};

/// Per-fold statistics across countries.
///
/// For each fold index in `0..folds`, only countries whose fold at that
/// index produced a prediction contribute. Trend and lag modes break ties
/// by first occurrence in country order. Folds without any usable country
/// report [`Statistic::NoData`](crate::tuning::Statistic::NoData).
pub fn aggregate(country_results: &[CountryResult], folds: usize) -> Vec<FoldSummary> {
    (0..folds)
        .map(|fold| {
            let predictions: Vec<_> = country_results
                .iter()
                .filter_map(|country| country.folds.get(fold))
                .filter(|result| result.is_usable())
                .filter_map(|result| result.prediction)
                .collect();

            let rmses: Vec<f64> = predictions.iter().map(|p| p.rmse).collect();
            let trends: Vec<_> = predictions.iter().map(|p| p.hyper_params.trend).collect();
            let lags: Vec<usize> = predictions.iter().map(|p| p.hyper_params.lag).collect();

            FoldSummary {
                fold,
                country_amount: predictions.len(),
                mean_rmse: mean(&rmses).into(),
                trend: mode(&trends).into(),
                lag: mode(&lags).into(),
            }
        })
        .collect()
}

/// Assemble a cohort from its evaluated countries.
pub fn build_cohort(
    development_status: impl Into<String>,
    countries: Vec<CountryResult>,
    folds: usize,
) -> CohortResult {
    CohortResult {
        development_status: development_status.into(),
        country_amount: countries.len(),
        summary: MeanSummary::from_summaries(countries.iter().map(|c| &c.summary)),
        fold_results: aggregate(&countries, folds),
        countries,
    }
}
