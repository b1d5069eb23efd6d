//! Aggregation Module
//! Read-only reductions over the cleaned tables for the dashboard views.

use crate::data::normalize::UNKNOWN;
use crate::data::{FinancialRecord, FinancialTable};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Month selection applied to the transactions table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MonthFilter {
    #[default]
    All,
    Month(String),
}

impl MonthFilter {
    pub fn label(&self) -> &str {
        match self {
            MonthFilter::All => "All months",
            MonthFilter::Month(bucket) => bucket,
        }
    }

    pub fn matches(&self, record: &FinancialRecord) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(bucket) => record.month_bucket() == bucket,
        }
    }
}

/// Headline metrics for a set of transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub transactions: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub total_water_liters: f64,
    pub active_fleet: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub water_liters: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetStats {
    pub plate: String,
    pub water_liters: f64,
    pub expense: f64,
    pub trips: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverStats {
    pub driver: String,
    pub trips: usize,
    pub water_liters: f64,
}

/// Handles grouping and summing over cleaned financial records.
pub struct Aggregator;

impl Aggregator {
    /// Sorted unique month buckets. Buckets sort chronologically.
    pub fn available_months(table: &FinancialTable) -> Vec<String> {
        table
            .records()
            .iter()
            .map(|r| r.month_bucket().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn filter_by_month<'a>(
        table: &'a FinancialTable,
        filter: &MonthFilter,
    ) -> Vec<&'a FinancialRecord> {
        table.records().iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn summarize<'a>(records: impl IntoIterator<Item = &'a FinancialRecord>) -> Summary {
        let mut summary = Summary::default();
        let mut plates = HashSet::new();

        for record in records {
            summary.transactions += 1;
            summary.total_income += record.income;
            summary.total_expense += record.expense;
            summary.total_water_liters += record.water_volume_liters;
            if record.vehicle_plate != UNKNOWN {
                plates.insert(record.vehicle_plate.as_str());
            }
        }

        summary.active_fleet = plates.len();
        summary
    }

    /// Income, expense and volume per month, in month order.
    pub fn monthly_totals<'a>(
        records: impl IntoIterator<Item = &'a FinancialRecord>,
    ) -> Vec<MonthlyTotals> {
        let mut by_month: BTreeMap<&str, MonthlyTotals> = BTreeMap::new();

        for record in records {
            let totals = by_month
                .entry(record.month_bucket())
                .or_insert_with(|| MonthlyTotals {
                    month: record.month_bucket().to_string(),
                    income: 0.0,
                    expense: 0.0,
                    water_liters: 0.0,
                });
            totals.income += record.income;
            totals.expense += record.expense;
            totals.water_liters += record.water_volume_liters;
        }

        by_month.into_values().collect()
    }

    /// Volume, expense and trip count per known plate, sorted by plate.
    pub fn fleet_performance<'a>(
        records: impl IntoIterator<Item = &'a FinancialRecord>,
    ) -> Vec<FleetStats> {
        let mut by_plate: BTreeMap<&str, FleetStats> = BTreeMap::new();

        for record in records.into_iter().filter(|r| r.vehicle_plate != UNKNOWN) {
            let stats = by_plate
                .entry(record.vehicle_plate.as_str())
                .or_insert_with(|| FleetStats {
                    plate: record.vehicle_plate.clone(),
                    water_liters: 0.0,
                    expense: 0.0,
                    trips: 0,
                });
            stats.water_liters += record.water_volume_liters;
            stats.expense += record.expense;
            stats.trips += 1;
        }

        by_plate.into_values().collect()
    }

    /// Trip count and volume per known driver, busiest first.
    pub fn driver_performance<'a>(
        records: impl IntoIterator<Item = &'a FinancialRecord>,
    ) -> Vec<DriverStats> {
        let mut by_driver: HashMap<&str, DriverStats> = HashMap::new();

        for record in records.into_iter().filter(|r| r.driver_name != UNKNOWN) {
            let stats = by_driver
                .entry(record.driver_name.as_str())
                .or_insert_with(|| DriverStats {
                    driver: record.driver_name.clone(),
                    trips: 0,
                    water_liters: 0.0,
                });
            stats.trips += 1;
            stats.water_liters += record.water_volume_liters;
        }

        let mut drivers: Vec<DriverStats> = by_driver.into_values().collect();
        drivers.sort_by(|a, b| b.trips.cmp(&a.trips).then_with(|| a.driver.cmp(&b.driver)));
        drivers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FinancialLoader, LoadOptions};
    use chrono::NaiveDate;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn record(d: (i32, u32, u32), plate: &str, driver: &str, income: f64, expense: f64, water: f64) -> FinancialRecord {
        let date = NaiveDate::from_ymd_opt(d.0, d.1, d.2).unwrap();
        FinancialRecord::new(date, plate, driver, "Pengiriman", income, expense, water)
    }

    fn sample() -> Vec<FinancialRecord> {
        vec![
            record((2024, 3, 1), "B1", "Budi", 100.0, 10.0, 1000.0),
            record((2024, 3, 9), "B2", "Sari", 200.0, 20.0, 2000.0),
            record((2024, 4, 2), "B1", "Budi", 300.0, 30.0, 3000.0),
            record((2024, 4, 5), UNKNOWN, UNKNOWN, 50.0, 5.0, 500.0),
            record((2023, 12, 30), "B3", "Andi", 10.0, 1.0, 100.0),
        ]
    }

    fn table() -> Arc<FinancialTable> {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "tanggal,nopol,sopir,pemasukan\n01/03/2024,B1,Budi,100\n01/04/2024,B2,Sari,200\n\
             15/04/2024,B1,Budi,300\n31/12/2023,,,5\n"
        )
        .unwrap();
        FinancialLoader::new(LoadOptions::default())
            .unwrap()
            .load(file.path())
            .unwrap()
            .table
    }

    #[test]
    fn months_are_unique_and_chronological() {
        let months = Aggregator::available_months(&table());
        assert_eq!(
            months,
            vec!["2023-12 (December)", "2024-03 (March)", "2024-04 (April)"]
        );
    }

    #[test]
    fn month_filter_selects_one_bucket() {
        let table = table();
        let april = MonthFilter::Month("2024-04 (April)".to_string());

        assert_eq!(Aggregator::filter_by_month(&table, &april).len(), 2);
        assert_eq!(Aggregator::filter_by_month(&table, &MonthFilter::All).len(), 4);
        assert_eq!(MonthFilter::All.label(), "All months");
        assert_eq!(april.label(), "2024-04 (April)");
    }

    #[test]
    fn summary_excludes_unknown_plates_from_fleet() {
        let records = sample();
        let summary = Aggregator::summarize(&records);

        assert_eq!(summary.transactions, 5);
        assert_eq!(summary.total_income, 660.0);
        assert_eq!(summary.total_expense, 66.0);
        assert_eq!(summary.total_water_liters, 6600.0);
        assert_eq!(summary.active_fleet, 3);
    }

    #[test]
    fn monthly_totals_are_grouped_in_order() {
        let records = sample();
        let monthly = Aggregator::monthly_totals(&records);

        let months: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2023-12 (December)", "2024-03 (March)", "2024-04 (April)"]);
        assert_eq!(monthly[1].income, 300.0);
        assert_eq!(monthly[2].expense, 35.0);
        assert_eq!(monthly[2].water_liters, 3500.0);
    }

    #[test]
    fn fleet_performance_skips_sentinel() {
        let records = sample();
        let fleet = Aggregator::fleet_performance(&records);

        let plates: Vec<&str> = fleet.iter().map(|f| f.plate.as_str()).collect();
        assert_eq!(plates, vec!["B1", "B2", "B3"]);
        assert_eq!(fleet[0].trips, 2);
        assert_eq!(fleet[0].water_liters, 4000.0);
        assert_eq!(fleet[0].expense, 40.0);
    }

    #[test]
    fn driver_performance_busiest_first() {
        let records = sample();
        let drivers = Aggregator::driver_performance(&records);

        let names: Vec<&str> = drivers.iter().map(|d| d.driver.as_str()).collect();
        assert_eq!(names, vec!["Budi", "Andi", "Sari"]);
        assert_eq!(drivers[0].trips, 2);
        assert_eq!(drivers[0].water_liters, 4000.0);
    }

    #[test]
    fn empty_input_gives_empty_results() {
        let none: Vec<FinancialRecord> = Vec::new();

        assert_eq!(Aggregator::summarize(&none), Summary::default());
        assert!(Aggregator::monthly_totals(&none).is_empty());
        assert!(Aggregator::fleet_performance(&none).is_empty());
        assert!(Aggregator::driver_performance(&none).is_empty());
    }
}
