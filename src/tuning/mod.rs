//! Cross-validated evaluation harness.
//!
//! Countries are split into k folds, each training split is made
//! stationary, the VAR grid is searched, and the best configuration per
//! fold is kept. Country results are then aggregated per fold across a
//! development-status cohort.

mod cohort;
mod country;
mod pipeline;
mod results;

pub use cohort::{aggregate, build_cohort};
pub use country::evaluate_country;
pub use pipeline::{evaluate_cohort, run, Cohort, CountryPanel, PipelineConfig};
pub use results::{
    CohortResult, CountryResult, ExportDocument, FoldResult, FoldSummary, MeanSummary, Statistic,
    SummaryRow,
};
