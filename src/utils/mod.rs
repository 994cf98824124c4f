//! Numerical utilities shared by the models and the tuning harness.

pub mod cross_validation;
pub mod metrics;
pub mod ols;

pub use cross_validation::{kfold_indices, split, TrainTestSplit};
pub use metrics::{mean, mode, rmse};
pub use ols::{ols_fit, ols_fit_multi, OLSResult};
