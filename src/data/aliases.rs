//! Header Alias Tables
//! Declarative mapping of raw header variants onto canonical field names.

use std::collections::HashMap;
use thiserror::Error;

/// Canonical field names shared by the loaders.
pub mod field {
    pub const DATE: &str = "date";
    pub const VEHICLE_PLATE: &str = "vehicle_plate";
    pub const DRIVER_NAME: &str = "driver_name";
    pub const TRANSACTION_TYPE: &str = "transaction_type";
    pub const INCOME: &str = "income";
    pub const EXPENSE: &str = "expense";
    pub const WATER_VOLUME: &str = "water_volume_liters";

    pub const LOCATION_NAME: &str = "location_name";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
}

/// Header variants of the transactions file, already in normalized form.
pub const FINANCIAL_ALIASES: &[(&str, &str)] = &[
    ("date", field::DATE),
    ("tanggal", field::DATE),
    ("vehicle_plate", field::VEHICLE_PLATE),
    ("nopol", field::VEHICLE_PLATE),
    ("plat nomor", field::VEHICLE_PLATE),
    ("plate number", field::VEHICLE_PLATE),
    ("license plate", field::VEHICLE_PLATE),
    ("driver_name", field::DRIVER_NAME),
    ("sopir", field::DRIVER_NAME),
    ("driver", field::DRIVER_NAME),
    ("driver name", field::DRIVER_NAME),
    ("transaction_type", field::TRANSACTION_TYPE),
    ("jenis transaksi", field::TRANSACTION_TYPE),
    ("transaction type", field::TRANSACTION_TYPE),
    ("income", field::INCOME),
    ("pemasukan", field::INCOME),
    ("expense", field::EXPENSE),
    ("pengeluaran", field::EXPENSE),
    ("water_volume_liters", field::WATER_VOLUME),
    ("jumlahair", field::WATER_VOLUME),
    ("jumlah air", field::WATER_VOLUME),
    ("volume (l)", field::WATER_VOLUME),
    ("water volume", field::WATER_VOLUME),
];

/// Header variants of the GPS file, already in normalized form.
pub const GEO_ALIASES: &[(&str, &str)] = &[
    ("location_name", field::LOCATION_NAME),
    ("lokasi", field::LOCATION_NAME),
    ("nama lokasi", field::LOCATION_NAME),
    ("location", field::LOCATION_NAME),
    ("location name", field::LOCATION_NAME),
    ("latitude", field::LATITUDE),
    ("lat", field::LATITUDE),
    ("longitude", field::LONGITUDE),
    ("lon", field::LONGITUDE),
    ("lng", field::LONGITUDE),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    #[error("Header variant '{variant}' maps to both '{first}' and '{second}'")]
    Conflict {
        variant: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("Header variant '{0}' is registered twice")]
    Duplicate(String),
    #[error("Header variant '{0}' is not normalized (expected trimmed lowercase)")]
    NotNormalized(String),
}

/// Trim whitespace (and a leading BOM) and lowercase a raw header.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Validated variant → canonical lookup.
#[derive(Debug, Clone)]
pub struct HeaderAliases {
    map: HashMap<String, &'static str>,
}

impl HeaderAliases {
    /// Build a lookup, rejecting any variant registered more than once.
    pub fn from_pairs(pairs: &[(&str, &'static str)]) -> Result<Self, AliasError> {
        let mut map = HashMap::with_capacity(pairs.len());

        for &(variant, canonical) in pairs {
            if normalize_header(variant) != variant {
                return Err(AliasError::NotNormalized(variant.to_string()));
            }

            match map.insert(variant.to_string(), canonical) {
                None => {}
                Some(previous) if previous == canonical => {
                    return Err(AliasError::Duplicate(variant.to_string()));
                }
                Some(previous) => {
                    return Err(AliasError::Conflict {
                        variant: variant.to_string(),
                        first: previous,
                        second: canonical,
                    });
                }
            }
        }

        Ok(Self { map })
    }

    pub fn financial() -> Result<Self, AliasError> {
        Self::from_pairs(FINANCIAL_ALIASES)
    }

    pub fn geo() -> Result<Self, AliasError> {
        Self::from_pairs(GEO_ALIASES)
    }

    /// Resolve a raw header to its canonical field, if registered.
    pub fn resolve(&self, raw_header: &str) -> Option<&'static str> {
        self.map.get(&normalize_header(raw_header)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        assert!(HeaderAliases::financial().is_ok());
        assert!(HeaderAliases::geo().is_ok());
    }

    #[test]
    fn plate_variants_share_one_field() {
        let aliases = HeaderAliases::financial().unwrap();
        for header in ["Plat Nomor", "  NOPOL ", "plate number", "License Plate"] {
            assert_eq!(aliases.resolve(header), Some(field::VEHICLE_PLATE), "{header}");
        }
    }

    #[test]
    fn volume_variants_share_one_field() {
        let aliases = HeaderAliases::financial().unwrap();
        assert_eq!(aliases.resolve("Volume (L)"), Some(field::WATER_VOLUME));
        assert_eq!(aliases.resolve("Jumlah Air"), Some(field::WATER_VOLUME));
        assert_eq!(aliases.resolve("jumlahair"), Some(field::WATER_VOLUME));
    }

    #[test]
    fn unmapped_header_resolves_to_none() {
        let aliases = HeaderAliases::geo().unwrap();
        assert_eq!(aliases.resolve("keterangan"), None);
        assert_eq!(aliases.resolve("\u{feff}Nama Lokasi"), Some(field::LOCATION_NAME));
    }

    #[test]
    fn conflicting_registration_is_rejected() {
        let err = HeaderAliases::from_pairs(&[("plat", field::VEHICLE_PLATE), ("plat", field::DRIVER_NAME)])
            .unwrap_err();
        assert!(matches!(err, AliasError::Conflict { .. }));
    }

    #[test]
    fn duplicate_and_unnormalized_registrations_are_rejected() {
        assert_eq!(
            HeaderAliases::from_pairs(&[("lat", field::LATITUDE), ("lat", field::LATITUDE)]).unwrap_err(),
            AliasError::Duplicate("lat".to_string())
        );
        assert_eq!(
            HeaderAliases::from_pairs(&[("Lat ", field::LATITUDE)]).unwrap_err(),
            AliasError::NotNormalized("Lat ".to_string())
        );
    }
}
