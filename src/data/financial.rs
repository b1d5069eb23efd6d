//! Financial Transactions Loader
//! Cleans the transactions file into an immutable table of typed records.

use crate::data::aliases::{field, AliasError, HeaderAliases};
use crate::data::cache::TableCache;
use crate::data::loader::{CoercionReport, LoadError, LoadOptions, Loaded, RawTable};
use crate::data::normalize::{self, UNKNOWN};
use chrono::NaiveDate;
use polars::prelude::StringChunked;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One delivery trip with its money and water figures.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub date: NaiveDate,
    pub vehicle_plate: String,
    pub driver_name: String,
    pub transaction_type: String,
    pub income: f64,
    pub expense: f64,
    pub water_volume_liters: f64,
    month_bucket: String,
}

impl FinancialRecord {
    pub fn new(
        date: NaiveDate,
        vehicle_plate: impl Into<String>,
        driver_name: impl Into<String>,
        transaction_type: impl Into<String>,
        income: f64,
        expense: f64,
        water_volume_liters: f64,
    ) -> Self {
        Self {
            date,
            vehicle_plate: vehicle_plate.into(),
            driver_name: driver_name.into(),
            transaction_type: transaction_type.into(),
            income,
            expense,
            water_volume_liters,
            month_bucket: normalize::month_bucket(date),
        }
    }

    /// Grouping key derived from `date`.
    pub fn month_bucket(&self) -> &str {
        &self.month_bucket
    }
}

/// Cleaned transactions table.
#[derive(Debug, Clone)]
pub struct FinancialTable {
    records: Vec<FinancialRecord>,
    report: CoercionReport,
}

impl FinancialTable {
    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn report(&self) -> CoercionReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stateless parsing half of the loader.
pub struct FinancialParser {
    aliases: HeaderAliases,
    options: LoadOptions,
}

impl FinancialParser {
    pub fn new(options: LoadOptions) -> Result<Self, AliasError> {
        Ok(Self {
            aliases: HeaderAliases::financial()?,
            options,
        })
    }

    /// Read and clean a transactions file without touching any cache.
    pub fn parse(&self, path: &Path) -> Result<Loaded<FinancialTable>, LoadError> {
        let raw = RawTable::read(path, self.options.delimiter, &self.aliases)?;

        let dates = raw.require(field::DATE)?;
        let plates = raw.text(field::VEHICLE_PLATE)?;
        let drivers = raw.text(field::DRIVER_NAME)?;
        let kinds = raw.text(field::TRANSACTION_TYPE)?;
        let incomes = raw.text(field::INCOME)?;
        let expenses = raw.text(field::EXPENSE)?;
        let volumes = raw.text(field::WATER_VOLUME)?;

        let mut report = CoercionReport {
            raw_rows: raw.height(),
            ..CoercionReport::default()
        };
        let mut records = Vec::with_capacity(raw.height());

        for row in 0..raw.height() {
            let Some(date) = normalize::parse_date(dates.get(row), &self.options.date_format)
            else {
                report.dropped_rows += 1;
                continue;
            };

            records.push(FinancialRecord::new(
                date,
                category(plates, row, &mut report),
                category(drivers, row, &mut report),
                category(kinds, row, &mut report),
                amount(incomes, row, &mut report),
                amount(expenses, row, &mut report),
                amount(volumes, row, &mut report),
            ));
        }

        info!(
            file = %raw.path().display(),
            rows = records.len(),
            dropped = report.dropped_rows,
            zero_filled = report.zero_filled,
            sentinel_filled = report.sentinel_filled,
            "loaded financial table"
        );

        Ok(Loaded {
            table: Arc::new(FinancialTable {
                records,
                report,
            }),
            warning: None,
        })
    }
}

fn category(column: Option<&StringChunked>, row: usize, report: &mut CoercionReport) -> String {
    let Some(column) = column else {
        return UNKNOWN.to_string();
    };

    match normalize::non_blank(column.get(row)) {
        Some(value) => value.to_string(),
        None => {
            report.sentinel_filled += 1;
            UNKNOWN.to_string()
        }
    }
}

fn amount(column: Option<&StringChunked>, row: usize, report: &mut CoercionReport) -> f64 {
    let Some(column) = column else {
        return 0.0;
    };

    normalize::parse_amount(column.get(row)).unwrap_or_else(|| {
        report.zero_filled += 1;
        0.0
    })
}

/// Transactions loader owning its memoized results.
pub struct FinancialLoader {
    parser: FinancialParser,
    cache: TableCache<FinancialTable>,
}

impl FinancialLoader {
    pub fn new(options: LoadOptions) -> Result<Self, AliasError> {
        Ok(Self {
            parser: FinancialParser::new(options)?,
            cache: TableCache::new(),
        })
    }

    /// Load `path`, reusing the cached table while the file is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Loaded<FinancialTable>, LoadError> {
        let parser = &self.parser;
        self.cache.get_or_load(path, |p| parser.parse(p))
    }

    /// Discard any cached table for `path` and read it again.
    pub fn reload(&mut self, path: &Path) -> Result<Loaded<FinancialTable>, LoadError> {
        self.cache.invalidate(path);
        self.load(path)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.cache.invalidate(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::LoadFailure;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
Tanggal,Plat Nomor,Sopir,Jenis Transaksi,Pemasukan,Pengeluaran,Volume (L)
15/03/2024,B1234XY,Budi,Pengiriman,Rp1.500.000,Rp200.000,5.000
not-a-date,B1234XY,Budi,Pengiriman,Rp100.000,Rp0,1.000
02/04/2024,,,,Rp abc,,
20/04/2024,B9999ZZ,Sari,Servis,Rp0,Rp350.000,0
";

    fn csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn parse(contents: &str) -> Arc<FinancialTable> {
        let file = csv(contents);
        let parser = FinancialParser::new(LoadOptions::default()).unwrap();
        parser.parse(file.path()).unwrap().table
    }

    #[test]
    fn parses_the_reference_row() {
        let table = parse(SAMPLE);
        let first = &table.records()[0];

        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(first.vehicle_plate, "B1234XY");
        assert_eq!(first.income, 1_500_000.0);
        assert_eq!(first.expense, 200_000.0);
        assert_eq!(first.water_volume_liters, 5_000.0);
        assert_eq!(first.month_bucket(), "2024-03 (March)");
    }

    #[test]
    fn unparsable_dates_are_dropped() {
        let table = parse(SAMPLE);

        assert_eq!(table.len(), 3);
        assert!(table.records().iter().all(|r| r.income != 100_000.0));
        assert_eq!(table.report().raw_rows, 4);
        assert_eq!(table.report().dropped_rows, 1);
        assert_eq!(table.report().kept_rows(), 3);
    }

    #[test]
    fn blanks_get_sentinels_and_zeroes() {
        let table = parse(SAMPLE);
        let blank = &table.records()[1];

        assert_eq!(blank.vehicle_plate, UNKNOWN);
        assert_eq!(blank.driver_name, UNKNOWN);
        assert_eq!(blank.transaction_type, UNKNOWN);
        assert_eq!(blank.income, 0.0);
        assert_eq!(blank.expense, 0.0);
        assert_eq!(blank.water_volume_liters, 0.0);
        assert_eq!(table.report().sentinel_filled, 3);
        assert_eq!(table.report().zero_filled, 3);
    }

    #[test]
    fn cleaned_rows_hold_invariants() {
        let table = parse(SAMPLE);

        for record in table.records() {
            assert_eq!(record.month_bucket(), normalize::month_bucket(record.date));
            assert!(record.income >= 0.0);
            assert!(record.expense >= 0.0);
            assert!(record.water_volume_liters >= 0.0);
            assert!(!record.vehicle_plate.is_empty());
            assert!(!record.driver_name.is_empty());
            assert!(!record.transaction_type.is_empty());
        }
    }

    #[test]
    fn absent_optional_columns_are_backfilled() {
        let table = parse("tanggal,pemasukan\n01/01/2024,Rp10.000\n");
        let record = &table.records()[0];

        assert_eq!(record.income, 10_000.0);
        assert_eq!(record.expense, 0.0);
        assert_eq!(record.vehicle_plate, UNKNOWN);
        assert_eq!(table.report().zero_filled, 0);
        assert_eq!(table.report().sentinel_filled, 0);
    }

    #[test]
    fn header_variants_are_equivalent() {
        let a = parse("tanggal,plat nomor,jumlah air\n01/01/2024,B1,100\n");
        let b = parse("TANGGAL,License Plate,volume (l)\n01/01/2024,B1,100\n");

        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn missing_date_column_fails() {
        let file = csv("nopol,pemasukan\nB1,100\n");
        let parser = FinancialParser::new(LoadOptions::default()).unwrap();
        let err = parser.parse(file.path()).err().unwrap();

        assert_eq!(err.kind(), LoadFailure::MissingColumn);
    }

    #[test]
    fn loading_twice_is_identical() {
        let file = csv(SAMPLE);
        let parser = FinancialParser::new(LoadOptions::default()).unwrap();
        let first = parser.parse(file.path()).unwrap();
        let second = parser.parse(file.path()).unwrap();

        assert_eq!(first.table.records(), second.table.records());
    }

    #[test]
    fn loader_memoizes_and_reloads() {
        let file = csv(SAMPLE);
        let mut loader = FinancialLoader::new(LoadOptions::default()).unwrap();

        let first = loader.load(file.path()).unwrap();
        let cached = loader.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first.table, &cached.table));

        let reloaded = loader.reload(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first.table, &reloaded.table));
        assert_eq!(first.table.records(), reloaded.table.records());
        assert!(reloaded.warning.is_none());
    }

    #[test]
    fn custom_delimiter_and_date_format() {
        let file = csv("date;income\n2024-03-15;Rp1.000\n");
        let parser = FinancialParser::new(LoadOptions {
            delimiter: b';',
            date_format: "%Y-%m-%d".to_string(),
        })
        .unwrap();

        let table = parser.parse(file.path()).unwrap().table;
        assert_eq!(table.records()[0].month_bucket(), "2024-03 (March)");
        assert_eq!(table.records()[0].income, 1_000.0);
    }
}
