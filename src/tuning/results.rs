//! Result records produced by the evaluation harness and their export shapes.

use crate::error::Result;
use crate::models::var::{PredictionResult, Trend};
use crate::utils::metrics::mean;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

const NO_DATA: &str = "No data";

/// A summary statistic that may be undefined because nothing contributed to it.
///
/// Serializes as the bare value, or as the string `"No data"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic<T> {
    /// A computed value.
    Value(T),
    /// No usable observation contributed.
    NoData,
}

impl<T> Statistic<T> {
    /// The value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Statistic::Value(v) => Some(v),
            Statistic::NoData => None,
        }
    }

    /// True for [`Statistic::NoData`].
    pub fn is_no_data(&self) -> bool {
        matches!(self, Statistic::NoData)
    }
}

impl Statistic<f64> {
    /// Arithmetic mean, `NoData` for an empty slice.
    pub fn mean_of(values: &[f64]) -> Self {
        mean(values).into()
    }
}

impl<T> From<Option<T>> for Statistic<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Statistic::Value(v),
            None => Statistic::NoData,
        }
    }
}

impl<T: Serialize> Serialize for Statistic<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Statistic::Value(v) => v.serialize(serializer),
            Statistic::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Statistic<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Value(T),
            Marker(String),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Value(v) => Ok(Statistic::Value(v)),
            Repr::Marker(marker) if marker == NO_DATA => Ok(Statistic::NoData),
            Repr::Marker(marker) => Err(de::Error::custom(format!(
                "expected a value or \"{}\", got \"{}\"",
                NO_DATA, marker
            ))),
        }
    }
}

/// Missing predictions travel as `{"rmse": 0.0, "hyper_params": {"trend": "NA", "lag": -1}}`.
mod sentinel {
    use super::*;
    use crate::models::var::VarOrder;
    use serde::ser;
    use std::str::FromStr;

    const NA: &str = "NA";

    #[derive(Serialize, Deserialize)]
    struct HyperParamsRepr {
        trend: String,
        lag: i64,
    }

    #[derive(Serialize, Deserialize)]
    struct PredictionRepr {
        rmse: f64,
        hyper_params: HyperParamsRepr,
    }

    pub fn serialize<S: Serializer>(
        prediction: &Option<PredictionResult>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let repr = match prediction {
            Some(p) => PredictionRepr {
                rmse: p.rmse,
                hyper_params: HyperParamsRepr {
                    trend: p.hyper_params.trend.code().to_string(),
                    lag: i64::try_from(p.hyper_params.lag).map_err(ser::Error::custom)?,
                },
            },
            None => PredictionRepr {
                rmse: 0.0,
                hyper_params: HyperParamsRepr {
                    trend: NA.to_string(),
                    lag: -1,
                },
            },
        };
        repr.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<PredictionResult>, D::Error> {
        let repr = PredictionRepr::deserialize(deserializer)?;
        if repr.hyper_params.trend == NA {
            return Ok(None);
        }
        let trend = Trend::from_str(&repr.hyper_params.trend).map_err(de::Error::custom)?;
        let lag = usize::try_from(repr.hyper_params.lag).map_err(de::Error::custom)?;
        Ok(Some(PredictionResult {
            rmse: repr.rmse,
            hyper_params: VarOrder::new(lag, trend),
        }))
    }
}

/// Outcome of one cross-validation fold for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    /// Zero-based fold index.
    pub fold: usize,
    /// Every training column passed the unit-root test.
    pub fully_stationary: bool,
    /// Differencing passes applied to the training panel.
    pub passes: usize,
    /// Stationarity test rounds entered.
    pub iterations: usize,
    /// Rows in the training split.
    pub train_length: usize,
    /// Rows in the test split.
    pub test_length: usize,
    /// Best configuration found; `None` when the fold was not searched or nothing fitted.
    #[serde(with = "sentinel")]
    pub prediction: Option<PredictionResult>,
}

impl FoldResult {
    /// Whether the fold contributes to error statistics.
    pub fn is_usable(&self) -> bool {
        self.fully_stationary && self.prediction.is_some()
    }
}

/// Means over a set of folds or countries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanSummary {
    /// Mean RMSE over usable entries.
    pub mean_rmse: Statistic<f64>,
    /// Mean number of first differences applied, over every fold including
    /// non-stationary ones. Counts actual passes, so a panel that was
    /// stationary as given contributes 0.
    pub mean_passes: Statistic<f64>,
    /// Share of entries whose training panel was fully stationary.
    pub stationary_rate: Statistic<f64>,
    /// Mean training length over usable entries.
    pub mean_train_length: Statistic<f64>,
    /// Mean test length over usable entries.
    pub mean_test_length: Statistic<f64>,
}

impl MeanSummary {
    /// Summarize a country's folds.
    ///
    /// Error and length means only use folds with a prediction; pass
    /// count and stationary rate use every fold.
    pub fn from_folds(folds: &[FoldResult]) -> Self {
        let usable = || folds.iter().filter(|f| f.is_usable());

        Self {
            mean_rmse: mean_by(usable(), |f| f.prediction.map_or(0.0, |p| p.rmse)),
            mean_passes: mean_by(folds.iter(), |f| f.passes as f64),
            stationary_rate: mean_by(folds.iter(), |f| {
                if f.fully_stationary {
                    1.0
                } else {
                    0.0
                }
            }),
            mean_train_length: mean_by(usable(), |f| f.train_length as f64),
            mean_test_length: mean_by(usable(), |f| f.test_length as f64),
        }
    }

    /// Mean of several summaries, statistic by statistic, skipping `NoData`.
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a MeanSummary>) -> Self {
        let summaries: Vec<&MeanSummary> = summaries.into_iter().collect();
        let average = |pick: fn(&MeanSummary) -> Statistic<f64>| {
            let values: Vec<f64> = summaries
                .iter()
                .filter_map(|s| pick(s).value().copied())
                .collect();
            Statistic::mean_of(&values)
        };

        Self {
            mean_rmse: average(|s| s.mean_rmse),
            mean_passes: average(|s| s.mean_passes),
            stationary_rate: average(|s| s.stationary_rate),
            mean_train_length: average(|s| s.mean_train_length),
            mean_test_length: average(|s| s.mean_test_length),
        }
    }
}

fn mean_by<'a>(
    folds: impl Iterator<Item = &'a FoldResult>,
    f: impl Fn(&FoldResult) -> f64,
) -> Statistic<f64> {
    let values: Vec<f64> = folds.map(f).collect();
    Statistic::mean_of(&values)
}

/// All folds of one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryResult {
    /// Country code.
    pub country_code: String,
    /// Per-fold outcomes ordered by fold index.
    pub folds: Vec<FoldResult>,
    /// Means across the folds.
    pub summary: MeanSummary,
}

impl CountryResult {
    /// Build a result and its fold summary.
    pub fn new(country_code: impl Into<String>, folds: Vec<FoldResult>) -> Self {
        let summary = MeanSummary::from_folds(&folds);
        Self {
            country_code: country_code.into(),
            folds,
            summary,
        }
    }
}

/// Cross-country statistics for one fold index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldSummary {
    /// Zero-based fold index.
    pub fold: usize,
    /// Countries with a usable result in this fold.
    pub country_amount: usize,
    /// Mean RMSE over those countries.
    pub mean_rmse: Statistic<f64>,
    /// Most frequent trend.
    pub trend: Statistic<Trend>,
    /// Most frequent lag.
    pub lag: Statistic<usize>,
}

/// Aggregated results of one development-status cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortResult {
    /// Cohort label, e.g. "Developed region".
    pub development_status: String,
    /// Countries evaluated.
    pub country_amount: usize,
    /// Mean of the country summaries.
    pub summary: MeanSummary,
    /// One entry per fold index.
    pub fold_results: Vec<FoldSummary>,
    /// Per-country detail in evaluation order.
    pub countries: Vec<CountryResult>,
}

/// Full pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Forecast target column.
    pub dependent_name: String,
    /// Other modelled columns.
    pub indep_names: Vec<String>,
    /// One entry per cohort, in input order.
    pub dev_status_results: Vec<CohortResult>,
}

/// Flat per-cohort row of the tabular summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub development_status: String,
    pub country_amount: usize,
    pub mean_rmse: Statistic<f64>,
    pub mean_passes: Statistic<f64>,
    pub stationary_rate: Statistic<f64>,
    pub mean_train_length: Statistic<f64>,
    pub mean_test_length: Statistic<f64>,
}

impl ExportDocument {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document produced by [`ExportDocument::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// One row per cohort.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.dev_status_results
            .iter()
            .map(|cohort| SummaryRow {
                development_status: cohort.development_status.clone(),
                country_amount: cohort.country_amount,
                mean_rmse: cohort.summary.mean_rmse,
                mean_passes: cohort.summary.mean_passes,
                stationary_rate: cohort.summary.stationary_rate,
                mean_train_length: cohort.summary.mean_train_length,
                mean_test_length: cohort.summary.mean_test_length,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::var::VarOrder;
    use approx::assert_relative_eq;

    fn usable(fold: usize, rmse: f64, passes: usize, train: usize, test: usize) -> FoldResult {
        FoldResult {
            fold,
            fully_stationary: true,
            passes,
            iterations: passes + 1,
            train_length: train,
            test_length: test,
            prediction: Some(PredictionResult {
                rmse,
                hyper_params: VarOrder::new(2, Trend::Constant),
            }),
        }
    }

    fn degenerate(fold: usize, passes: usize, train: usize, test: usize) -> FoldResult {
        FoldResult {
            fold,
            fully_stationary: false,
            passes,
            iterations: passes + 1,
            train_length: train,
            test_length: test,
            prediction: None,
        }
    }

    #[test]
    fn degenerate_prediction_uses_legacy_sentinel() {
        let json = serde_json::to_value(degenerate(1, 2, 30, 10)).unwrap();
        assert_eq!(
            json["prediction"],
            serde_json::json!({"rmse": 0.0, "hyper_params": {"trend": "NA", "lag": -1}})
        );
    }

    #[test]
    fn prediction_serializes_trend_code() {
        let json = serde_json::to_value(usable(0, 0.25, 1, 30, 10)).unwrap();
        assert_eq!(json["prediction"]["hyper_params"]["trend"], "c");
        assert_eq!(json["prediction"]["hyper_params"]["lag"], 2);
    }

    #[test]
    fn fold_results_survive_json() {
        for fold in [usable(0, 0.25, 1, 30, 10), degenerate(3, 2, 30, 10)] {
            let json = serde_json::to_string(&fold).unwrap();
            let back: FoldResult = serde_json::from_str(&json).unwrap();
            assert_eq!(back, fold);
        }
    }

    #[test]
    fn no_data_serializes_as_string() {
        let stat: Statistic<f64> = Statistic::NoData;
        assert_eq!(serde_json::to_string(&stat).unwrap(), "\"No data\"");
        let stat = Statistic::Value(Trend::ConstantLinear);
        assert_eq!(serde_json::to_string(&stat).unwrap(), "\"ct\"");

        let back: Statistic<Trend> = serde_json::from_str("\"No data\"").unwrap();
        assert!(back.is_no_data());
        assert!(serde_json::from_str::<Statistic<f64>>("\"nothing\"").is_err());
    }

    #[test]
    fn country_summary_excludes_unusable_folds_from_error() {
        let folds = vec![
            usable(0, 1.0, 1, 30, 10),
            degenerate(1, 2, 30, 10),
            usable(2, 3.0, 0, 29, 11),
            degenerate(3, 2, 31, 9),
        ];
        let summary = MeanSummary::from_folds(&folds);

        assert_eq!(summary.mean_rmse, Statistic::Value(2.0));
        assert_eq!(summary.mean_train_length, Statistic::Value(29.5));
        assert_eq!(summary.mean_test_length, Statistic::Value(10.5));
        // counts use every fold
        assert_eq!(summary.stationary_rate, Statistic::Value(0.5));
        assert_eq!(summary.mean_passes, Statistic::Value(1.25));
    }

    #[test]
    fn all_degenerate_folds_report_no_data() {
        let summary = MeanSummary::from_folds(&[degenerate(0, 0, 3, 0), degenerate(1, 0, 3, 0)]);
        assert!(summary.mean_rmse.is_no_data());
        assert!(summary.mean_train_length.is_no_data());
        assert_eq!(summary.stationary_rate, Statistic::Value(0.0));
    }

    #[test]
    fn cohort_summary_averages_country_means() {
        let a = MeanSummary::from_folds(&[usable(0, 1.0, 0, 30, 10), usable(1, 2.0, 0, 30, 10)]);
        let b = MeanSummary::from_folds(&[usable(0, 4.0, 2, 20, 5)]);
        let c = MeanSummary::from_folds(&[degenerate(0, 2, 30, 10)]);

        let cohort = MeanSummary::from_summaries([&a, &b, &c]);
        assert_relative_eq!(*cohort.mean_rmse.value().unwrap(), 2.75);
        assert_relative_eq!(*cohort.stationary_rate.value().unwrap(), 2.0 / 3.0);
        assert_relative_eq!(*cohort.mean_passes.value().unwrap(), 4.0 / 3.0);
    }

    #[test]
    fn export_document_rows_and_json() {
        let country = CountryResult::new("NOR", vec![usable(0, 1.0, 1, 30, 10)]);
        let doc = ExportDocument {
            dependent_name: "gdp_growth".into(),
            indep_names: vec!["emp".into()],
            dev_status_results: vec![CohortResult {
                development_status: "Developed region".into(),
                country_amount: 1,
                summary: MeanSummary::from_summaries([&country.summary]),
                fold_results: vec![FoldSummary {
                    fold: 0,
                    country_amount: 0,
                    mean_rmse: Statistic::NoData,
                    trend: Statistic::NoData,
                    lag: Statistic::NoData,
                }],
                countries: vec![country],
            }],
        };

        let rows = doc.summary_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].development_status, "Developed region");
        assert_eq!(rows[0].mean_rmse, Statistic::Value(1.0));

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"No data\""));
        assert_eq!(ExportDocument::from_json(&json).unwrap(), doc);
    }
}
