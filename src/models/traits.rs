//! Forecaster trait defining the common interface for panel models.

use crate::core::Panel;
use crate::error::Result;

/// Common interface for multivariate models fitted on a [`Panel`].
///
/// Forecasts are produced from an explicit seed panel rather than from the
/// fitted sample, so a model fitted on differenced data can be rolled forward
/// from any window of the same columns.
pub trait Forecaster {
    /// Fit the model to the panel.
    fn fit(&mut self, panel: &Panel) -> Result<()>;

    /// Forecast `steps` rows following `seed`, one value per column.
    fn forecast(&self, seed: &Panel, steps: usize) -> Result<Vec<Vec<f64>>>;

    /// Number of trailing seed rows the forecast depends on.
    fn seed_length(&self) -> usize;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}
