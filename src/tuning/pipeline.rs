//! End-to-end run over development-status cohorts.

use crate::core::Panel;
use crate::error::{ForecastError, Result};
use crate::models::var::SearchConfig;
use crate::transform::StationarityConfig;
use crate::tuning::cohort::build_cohort;
use crate::tuning::country::evaluate_country;
use crate::tuning::results::{CohortResult, ExportDocument};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Settings for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column whose forecast error is scored.
    pub dependent: String,
    /// Other columns entering the VAR.
    pub independents: Vec<String>,
    /// Number of cross-validation folds.
    pub folds: usize,
    /// Hyperparameter grid.
    pub search: SearchConfig,
    /// Differencing rules for training splits.
    pub stationarity: StationarityConfig,
    /// Evaluate the countries of a cohort on the rayon thread pool.
    pub parallel: bool,
}

impl PipelineConfig {
    /// Defaults: 4 folds, default search and stationarity, sequential.
    pub fn new(dependent: impl Into<String>, independents: Vec<String>) -> Self {
        Self {
            dependent: dependent.into(),
            independents,
            folds: 4,
            search: SearchConfig::default(),
            stationarity: StationarityConfig::default(),
            parallel: false,
        }
    }

    /// Set the fold count.
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Set the search grid.
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Set the stationarity rules.
    pub fn with_stationarity(mut self, stationarity: StationarityConfig) -> Self {
        self.stationarity = stationarity;
        self
    }

    /// Toggle parallel country evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Modelled columns, dependent first.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(self.dependent.as_str())
            .chain(self.independents.iter().map(String::as_str))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "at least 2 folds are required, got {}",
                self.folds
            )));
        }
        if self.independents.iter().any(|name| *name == self.dependent) {
            return Err(ForecastError::InvalidParameter(format!(
                "'{}' is both dependent and independent",
                self.dependent
            )));
        }
        Ok(())
    }
}

/// One country's rows, country column already removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPanel {
    /// Country code.
    pub code: String,
    /// Yearly observations.
    pub panel: Panel,
}

/// Countries sharing a development-status label.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    /// Label such as "Developed region".
    pub development_status: String,
    /// Member countries in evaluation order.
    pub countries: Vec<CountryPanel>,
}

/// Evaluate one cohort.
pub fn evaluate_cohort(cohort: &Cohort, config: &PipelineConfig) -> Result<CohortResult> {
    config.validate()?;
    if cohort.countries.is_empty() || cohort.countries.iter().any(|c| c.panel.is_empty()) {
        return Err(ForecastError::EmptyData);
    }

    info!(
        status = %cohort.development_status,
        countries = cohort.countries.len(),
        "evaluating cohort"
    );

    let countries = if config.parallel {
        cohort
            .countries
            .par_iter()
            .map(|c| evaluate_country(&c.code, &c.panel, config))
            .collect::<Result<Vec<_>>>()?
    } else {
        cohort
            .countries
            .iter()
            .map(|c| evaluate_country(&c.code, &c.panel, config))
            .collect::<Result<Vec<_>>>()?
    };

    let result = build_cohort(cohort.development_status.clone(), countries, config.folds);
    info!(
        status = %result.development_status,
        mean_rmse = ?result.summary.mean_rmse.value(),
        "cohort evaluated"
    );
    Ok(result)
}

/// Evaluate every cohort in order and collect the export document.
///
/// Fails with [`ForecastError::EmptyData`] when there are no cohorts, or
/// when a cohort has no countries or a country has no rows.
pub fn run(cohorts: &[Cohort], config: &PipelineConfig) -> Result<ExportDocument> {
    config.validate()?;
    if cohorts.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    let dev_status_results = cohorts
        .iter()
        .map(|cohort| evaluate_cohort(cohort, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportDocument {
        dependent_name: config.dependent.clone(),
        indep_names: config.independents.clone(),
        dev_status_results,
    })
}
