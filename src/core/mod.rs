//! Core data structures for panel forecasting.

mod panel;

pub use panel::Panel;
