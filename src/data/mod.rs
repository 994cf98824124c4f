//! In-memory input tables: yearly country records and their development-status labels.
//!
//! Reading spreadsheets or CSV files is left to the caller; these types are
//! what the loaded data is handed over as.

pub mod dataset;
pub mod dev_status;

pub use dataset::{Dataset, Record};
pub use dev_status::{cohorts, strip_region_suffix, DevStatusLevel, DevStatusTable};
