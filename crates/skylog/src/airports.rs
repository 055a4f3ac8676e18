//! Airport database import.
//!
//! Loads the ourairports.com `airports.csv` dataset into the airports table.
//! The import replaces the whole table: route waypoints always resolve
//! against one consistent dataset rather than a mix of versions.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::Airport;
use crate::storage::Storage;

/// Longest airport code accepted (ICAO identifiers are four characters).
const MAX_CODE_LEN: usize = 4;

/// Outcome of an airport import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows imported.
    pub imported: usize,
    /// Rows skipped for missing or invalid fields.
    pub skipped: usize,
    /// Previously stored airports that were replaced.
    pub replaced: usize,
}

/// One row of the ourairports.com CSV, named columns only.
#[derive(Debug, Deserialize)]
struct AirportRow {
    ident: String,
    name: String,
    latitude_deg: Option<f64>,
    longitude_deg: Option<f64>,
    iso_country: String,
    #[serde(default)]
    municipality: String,
    #[serde(default)]
    icao_code: String,
}

impl AirportRow {
    /// The code flights reference: the ICAO code when present, the local
    /// identifier otherwise.
    fn code(&self) -> &str {
        if self.icao_code.is_empty() {
            &self.ident
        } else {
            &self.icao_code
        }
    }

    fn into_airport(self) -> Option<Airport> {
        let code = self.code().to_string();
        if code.is_empty() || code.len() > MAX_CODE_LEN {
            return None;
        }
        let (latitude, longitude) = match (self.latitude_deg, self.longitude_deg) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return None,
        };
        if self.name.is_empty() {
            return None;
        }
        Some(Airport {
            id: None,
            code,
            name: self.name,
            latitude,
            longitude,
            country: self.iso_country,
            municipality: self.municipality,
        })
    }
}

/// Import airports from a CSV file, replacing the stored dataset.
///
/// Rows without a usable code, name, or coordinates are skipped and counted
/// in the report rather than failing the import.
///
/// # Errors
///
/// Returns [`Error::AirportFileMissing`] when the file does not exist, a
/// CSV error on malformed input, or a database error.
pub fn import_airports(storage: &mut Storage, path: &Path) -> Result<ImportReport> {
    if !path.exists() {
        return Err(Error::AirportFileMissing {
            path: path.to_path_buf(),
        });
    }
    info!("Importing airports from {}", path.display());

    let mut reader = csv::Reader::from_path(path)?;
    let mut airports = Vec::new();
    let mut skipped = 0;

    for row in reader.deserialize::<AirportRow>() {
        match row {
            Ok(row) => match row.into_airport() {
                Some(airport) => airports.push(airport),
                None => skipped += 1,
            },
            Err(e) => {
                warn!("Skipping malformed row: {e}");
                skipped += 1;
            }
        }
    }

    let replaced = storage.replace_airports(&airports)?;
    info!(
        "Imported {} airports ({} skipped, {} replaced)",
        airports.len(),
        skipped,
        replaced
    );

    Ok(ImportReport {
        imported: airports.len(),
        skipped,
        replaced,
    })
}
