//! Panel transformations applied before model fitting.
//!
//! # Example
//!
//! ```
//! use pwt_var::core::Panel;
//! use pwt_var::transform::{make_stationary, StationarityConfig};
//!
//! let panel = Panel::new(
//!     (1990..2000).collect(),
//!     vec!["gdp".to_string()],
//!     vec![(0..10).map(|i| i as f64).collect()],
//! )
//! .unwrap();
//!
//! // Too short for a unit-root test: returned untouched
//! let result = make_stationary(&panel, &StationarityConfig::default());
//! assert!(!result.fully_stationary);
//! assert_eq!(result.passes, 0);
//! ```

pub mod stationary;

pub use stationary::{
    column_stationarity, make_stationary, ColumnStationarity, StationarityConfig, StationaryPanel,
};
