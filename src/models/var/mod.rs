//! Vector autoregression (VAR) models.
//!
//! This module provides:
//! - VAR estimation by OLS with a choice of deterministic trend terms
//! - Differencing and its multi-pass inversion
//! - Forecast scoring on the original scale
//! - Lag order × trend grid search

mod diff;
mod engine;
mod model;
mod search;

pub use diff::{difference, integrate, invert_differencing};
pub use engine::{fit, forecast, ForecastOutcome};
pub use model::{Trend, VarOrder, VAR};
pub use search::{search, Candidate, PredictionResult, SearchConfig};
