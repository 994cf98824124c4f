//! Forecasting models.

mod traits;
pub mod var;

pub use traits::Forecaster;
