//! Data module - CSV loading and cleaning

pub mod aliases;
mod cache;
mod financial;
mod geo;
mod loader;
pub mod normalize;

pub use financial::{FinancialLoader, FinancialRecord, FinancialTable};
pub use geo::{GeoLoader, GeoTable};
pub use loader::{EmptyResultWarning, LoadOptions};
