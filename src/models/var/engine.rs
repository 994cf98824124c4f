//! Fitting a VAR on a differenced training panel and scoring its forecast on the
//! original scale.

use crate::core::Panel;
use crate::error::{ForecastError, Result};
use crate::models::var::diff::invert_differencing;
use crate::models::var::model::{VarOrder, VAR};
use crate::models::Forecaster;
use crate::utils::metrics::rmse;

/// A forecast reconstructed on the original scale and its error.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    /// RMSE of the dependent column over the test horizon.
    pub rmse: f64,
    /// Forecast for every column, indexed by the test periods.
    pub forecast: Panel,
}

/// Fit a VAR of the given order by OLS, without information-criterion selection.
pub fn fit(differenced_train: &Panel, order: VarOrder) -> Result<VAR> {
    let mut model = VAR::new(order);
    model.fit(differenced_train)?;
    Ok(model)
}

/// Forecast the test horizon and undo `passes` differencing rounds.
///
/// The forecast is seeded with the trailing rows of `differenced_train`
/// (the last `lag` rows are the ones that matter) and rolled forward
/// `test.len()` steps. Reconstruction continues from the end of the
/// undifferenced `train` panel. The error is measured on
/// `dependent` only.
pub fn forecast<M: Forecaster>(
    model: &M,
    train: &Panel,
    test: &Panel,
    differenced_train: &Panel,
    lag: usize,
    passes: usize,
    dependent: &str,
) -> Result<ForecastOutcome> {
    if test.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if test.dimensions() != train.dimensions() {
        return Err(ForecastError::DimensionMismatch {
            expected: train.dimensions(),
            got: test.dimensions(),
        });
    }

    let seed = differenced_train.tail(lag.min(differenced_train.len()))?;
    let rows = model.forecast(&seed, test.len())?;
    let differenced_forecast =
        Panel::from_rows(test.periods().to_vec(), train.labels().to_vec(), rows)?;

    let forecast = invert_differencing(&differenced_forecast, train, passes)?;
    let error = rmse(test.column(dependent)?, forecast.column(dependent)?)?;

    Ok(ForecastOutcome {
        rmse: error,
        forecast,
    })
}
