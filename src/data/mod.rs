//! Data domain: how the converter sees the host's dataset.

pub mod domain;
pub mod memory;

pub use domain::{ObservationRange, TabularSource};
pub use memory::ColumnTable;
