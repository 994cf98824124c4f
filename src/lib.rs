//! # pwt-var
//!
//! Cross-validated vector autoregression (VAR) forecasting of GDP growth
//! on Penn World Table style country panels.
//!
//! The pipeline splits each country's yearly panel into k folds, differences
//! the training data until every column passes an augmented Dickey-Fuller
//! test, grid-searches the VAR lag order and trend specification, and
//! reconstructs forecasts on the original scale to score them. Fold results
//! are aggregated per country and per development-status cohort.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod transform;
pub mod tuning;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::Panel;
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::var::{SearchConfig, Trend, VarOrder, VAR};
    pub use crate::models::Forecaster;
    pub use crate::transform::StationarityConfig;
    pub use crate::tuning::{run, Cohort, CountryPanel, ExportDocument, PipelineConfig};
}
