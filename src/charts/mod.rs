//! Charts module - Chart rendering

mod plotter;

pub use plotter::{format_liters, format_rupiah, ChartData, ChartPlotter};
pub use plotter::{EXPENSE_COLOR, FLEET_COLOR, INCOME_COLOR, WATER_COLOR};
