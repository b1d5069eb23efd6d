//! Statistics module - Aggregations over the cleaned tables

mod aggregate;

pub use aggregate::{
    Aggregator, DriverStats, FleetStats, MonthFilter, MonthlyTotals, Summary,
};
