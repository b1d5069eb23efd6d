//! GPS Delivery Point Loader
//! Cleans the GPS file into a table of in-range coordinates.

use crate::data::aliases::{field, AliasError, HeaderAliases};
use crate::data::cache::TableCache;
use crate::data::loader::{
    CoercionReport, EmptyResultWarning, LoadError, LoadOptions, Loaded, RawTable,
};
use crate::data::normalize::{self, UNKNOWN};
use statrs::statistics::Statistics;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// A named delivery point.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Cleaned GPS table. May be empty.
#[derive(Debug, Clone)]
pub struct GeoTable {
    records: Vec<GeoRecord>,
    report: CoercionReport,
}

impl GeoTable {
    pub fn records(&self) -> &[GeoRecord] {
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

    /// Mean (latitude, longitude) of all points.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.records.is_empty() {
            return None;
        }

        let latitude = self.records.iter().map(|r| r.latitude).mean();
        let longitude = self.records.iter().map(|r| r.longitude).mean();
        Some((latitude, longitude))
    }
}

pub struct GeoParser {
    aliases: HeaderAliases,
    options: LoadOptions,
}

impl GeoParser {
    pub fn new(options: LoadOptions) -> Result<Self, AliasError> {
        Ok(Self {
            aliases: HeaderAliases::geo()?,
            options,
        })
    }

    /// Read and clean a GPS file. An empty result carries an [`EmptyResultWarning`].
    pub fn parse(&self, path: &Path) -> Result<Loaded<GeoTable>, LoadError> {
        let raw = RawTable::read(path, self.options.delimiter, &self.aliases)?;

        let names = raw.text(field::LOCATION_NAME)?;
        let latitudes = raw.require(field::LATITUDE)?;
        let longitudes = raw.require(field::LONGITUDE)?;

        let mut report = CoercionReport {
            raw_rows: raw.height(),
            ..CoercionReport::default()
        };
        let mut records = Vec::with_capacity(raw.height());

        for row in 0..raw.height() {
            let latitude = normalize::parse_coordinate(latitudes.get(row));
            let longitude = normalize::parse_coordinate(longitudes.get(row));

            let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
                report.dropped_rows += 1;
                continue;
            };
            if !LATITUDE_RANGE.contains(&latitude) || !LONGITUDE_RANGE.contains(&longitude) {
                report.dropped_rows += 1;
                continue;
            }

            let location_name = match names.map(|c| normalize::non_blank(c.get(row))) {
                Some(Some(name)) => name.to_string(),
                Some(None) => {
                    report.sentinel_filled += 1;
                    UNKNOWN.to_string()
                }
                None => UNKNOWN.to_string(),
            };

            records.push(GeoRecord {
                location_name,
                latitude,
                longitude,
            });
        }

        let warning = if records.is_empty() {
            let warning = EmptyResultWarning {
                path: path.to_path_buf(),
                discarded_rows: report.dropped_rows,
            };
            warn!(file = %path.display(), discarded = report.dropped_rows, "no valid GPS points");
            Some(warning)
        } else {
            info!(
                file = %path.display(),
                points = records.len(),
                dropped = report.dropped_rows,
                "loaded GPS table"
            );
            None
        };

        Ok(Loaded {
            table: Arc::new(GeoTable {
                records,
                report,
            }),
            warning,
        })
    }
}

/// GPS loader owning its memoized results.
pub struct GeoLoader {
    parser: GeoParser,
    cache: TableCache<GeoTable>,
}

impl GeoLoader {
    pub fn new(options: LoadOptions) -> Result<Self, AliasError> {
        Ok(Self {
            parser: GeoParser::new(options)?,
            cache: TableCache::new(),
        })
    }

    pub fn load(&mut self, path: &Path) -> Result<Loaded<GeoTable>, LoadError> {
        let parser = &self.parser;
        self.cache.get_or_load(path, |p| parser.parse(p))
    }

    pub fn reload(&mut self, path: &Path) -> Result<Loaded<GeoTable>, LoadError> {
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

    fn csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn parse(contents: &str) -> Loaded<GeoTable> {
        let file = csv(contents);
        GeoParser::new(LoadOptions::default())
            .unwrap()
            .parse(file.path())
            .unwrap()
    }

    #[test]
    fn decimal_commas_are_accepted() {
        let loaded = parse("Nama Lokasi,Latitude,Longitude\nDepot,\"1,234\",\"103,456\"\n");
        let record = &loaded.table.records()[0];

        assert_eq!(record.location_name, "Depot");
        assert_eq!(record.latitude, 1.234);
        assert_eq!(record.longitude, 103.456);
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn out_of_range_rows_are_dropped() {
        let loaded = parse("lokasi,latitude,longitude\nA,95,110\nB,-6.2,106.8\nC,10,-181\n");
        let table = &loaded.table;

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].location_name, "B");
        assert_eq!(table.report().dropped_rows, 2);
    }

    #[test]
    fn unparsable_coordinates_are_dropped() {
        let loaded = parse("lokasi,lat,lng\nA,abc,106.8\nB,-6.2,\nC,-6.3,106.9\n");

        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table.records()[0].location_name, "C");
    }

    #[test]
    fn every_kept_point_is_in_range() {
        let loaded = parse("lokasi,latitude,longitude\nA,90,180\nB,-90,-180\nC,90.0001,0\nD,0,0\n");

        assert_eq!(loaded.table.len(), 3);
        for record in loaded.table.records() {
            assert!(LATITUDE_RANGE.contains(&record.latitude));
            assert!(LONGITUDE_RANGE.contains(&record.longitude));
        }
    }

    #[test]
    fn all_invalid_rows_give_empty_warning_not_error() {
        let loaded = parse("lokasi,latitude,longitude\nA,95,110\nB,x,y\n");

        assert!(loaded.table.is_empty());
        assert_eq!(loaded.table.center(), None);
        let warning = loaded.warning.unwrap();
        assert_eq!(warning.discarded_rows, 2);
    }

    #[test]
    fn blank_location_gets_sentinel() {
        let loaded = parse("lokasi,latitude,longitude\n,1,2\n");

        assert_eq!(loaded.table.records()[0].location_name, UNKNOWN);
        assert_eq!(loaded.table.report().sentinel_filled, 1);
    }

    #[test]
    fn missing_coordinate_column_is_load_error() {
        let file = csv("lokasi,latitude\nA,1\n");
        let err = GeoParser::new(LoadOptions::default())
            .unwrap()
            .parse(file.path())
            .err()
            .unwrap();

        assert_eq!(err.kind(), LoadFailure::MissingColumn);
    }

    #[test]
    fn center_is_mean_point() {
        let loaded = parse("lokasi,latitude,longitude\nA,-6,106\nB,-8,108\n");
        let (lat, lon) = loaded.table.center().unwrap();

        assert!((lat + 7.0).abs() < 1e-9);
        assert!((lon - 107.0).abs() < 1e-9);
    }

    #[test]
    fn loader_reload_rereads_file() {
        let mut file = csv("lokasi,latitude,longitude\nA,1,2\n");
        let mut loader = GeoLoader::new(LoadOptions::default()).unwrap();
        assert_eq!(loader.load(file.path()).unwrap().table.len(), 1);

        writeln!(file, "B,3,4").unwrap();
        file.flush().unwrap();
        let reloaded = loader.reload(file.path()).unwrap();

        assert_eq!(reloaded.table.len(), 2);
        assert!(loader.invalidate(file.path()));
    }
}
