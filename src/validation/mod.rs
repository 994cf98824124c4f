//! Statistical tests used to decide how much differencing a panel needs.
//!
//! # Example
//!
//! ```
//! use pwt_var::validation::adf_test;
//!
//! let series: Vec<f64> = (0..60).map(|i| ((i * 17 + 13) % 23) as f64).collect();
//! let adf = adf_test(&series, None);
//! println!("ADF statistic {} (p = {})", adf.statistic, adf.p_value);
//! ```

pub mod stationarity;

pub use stationarity::{adf_p_value, adf_test, schwert_max_lag, CriticalValues, StationarityResult};
