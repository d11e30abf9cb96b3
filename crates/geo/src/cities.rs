//! City name resolution against a reference table.
//!
//! The table maps coordinates rounded to four decimal places (about 11 m at the equator) to a
//! city record. Lookups are exact on the rounded key; anything else resolves to
//! [`Resolution::Unknown`].

use crate::{parse_coordinate, Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Text shown for coordinates with no table entry.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

const KEY_SCALE: f64 = 10_000.0;

/// A named place from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    /// City name, e.g. "New York"
    pub name: String,
    /// Country the city belongs to
    pub country: String,
}

impl CityRecord {
    /// Creates a record from a city name and its country.
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }
}

/// Coordinate rounded to four decimal places, stored as scaled integers so it can be hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CityKey {
    lat: i64,
    lon: i64,
}

impl CityKey {
    fn from_coordinate(coord: &Coordinate) -> Self {
        Self {
            lat: scale(coord.latitude),
            lon: scale(coord.longitude),
        }
    }
}

#[inline]
fn scale(degrees: f64) -> i64 {
    (degrees * KEY_SCALE).round() as i64
}

/// Outcome of a city lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The rounded coordinate has an entry in the table
    Known(&'a CityRecord),
    /// No entry; displays as [`UNKNOWN_LOCATION`]
    Unknown,
}

impl<'a> Resolution<'a> {
    /// The record, if the lookup hit.
    pub fn record(&self) -> Option<&'a CityRecord> {
        match *self {
            Self::Known(record) => Some(record),
            Self::Unknown => None,
        }
    }

    /// Returns true if the lookup found a city.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(record) => write!(f, "{}, {}", record.name, record.country),
            Self::Unknown => f.write_str(UNKNOWN_LOCATION),
        }
    }
}

/// Rows accepted and rejected while loading a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Rows stored in the table, including ones that replaced an earlier duplicate
    pub loaded: usize,
    /// Malformed rows that were logged and ignored
    pub skipped: usize,
}

/// Read-only lookup from rounded coordinates to city records.
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    entries: HashMap<CityKey, CityRecord>,
}

impl CityTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record; a later record with the same rounded key replaces the earlier one.
    pub fn insert(&mut self, coord: Coordinate, record: CityRecord) -> Option<CityRecord> {
        self.entries.insert(CityKey::from_coordinate(&coord), record)
    }

    /// Looks up the record stored under the coordinate's rounded key.
    pub fn get(&self, coord: &Coordinate) -> Option<&CityRecord> {
        self.entries.get(&CityKey::from_coordinate(coord))
    }

    /// Number of distinct rounded keys in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads `country, city, latitude, longitude` rows from CSV with a header row.
    ///
    /// Coordinates go through the same parser as user input, so `40.7128 N` is accepted.
    /// Malformed rows are logged and skipped; only reader-level IO failures abort the load.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<(Self, LoadReport)> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        let mut report = LoadReport::default();

        for (row, record) in csv_reader.records().enumerate() {
            // Row 1 is the header
            let line = row + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(GeoError::Csv(e)),
                Err(e) => {
                    tracing::warn!(line, error = %e, "Skipping unreadable city row");
                    report.skipped += 1;
                    continue;
                }
            };

            match parse_row(&record) {
                Ok((coord, city)) => {
                    if let Some(previous) = table.insert(coord, city) {
                        tracing::debug!(line, replaced = %previous.name, "Duplicate city coordinate");
                    }
                    report.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(line, error = %e, "Skipping malformed city row");
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped,
            distinct = table.len(),
            "City table loaded"
        );
        Ok((table, report))
    }

    /// Loads a CSV table from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<(Self, LoadReport)> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<(Coordinate, CityRecord)> {
    if record.len() != 4 {
        return Err(GeoError::InvalidFormat(format!(
            "expected 4 fields, found {}",
            record.len()
        )));
    }

    let coord = Coordinate::validated(parse_coordinate(&record[2])?, parse_coordinate(&record[3])?)?;
    Ok((coord, CityRecord::new(&record[1], &record[0])))
}

/// Resolves a coordinate to a city name using the given table.
///
/// # Example
/// ```
/// use geomatch_geo::{resolve, CityRecord, CityTable, Coordinate};
///
/// let mut table = CityTable::new();
/// table.insert(Coordinate::new(40.7128, -74.0060), CityRecord::new("New York", "USA"));
///
/// assert_eq!(resolve(&Coordinate::new(40.7128, -74.0060), &table).to_string(), "New York, USA");
/// assert_eq!(resolve(&Coordinate::new(0.0, 0.0), &table).to_string(), "Unknown location");
/// ```
pub fn resolve<'a>(coord: &Coordinate, table: &'a CityTable) -> Resolution<'a> {
    table
        .get(coord)
        .map_or(Resolution::Unknown, Resolution::Known)
}
