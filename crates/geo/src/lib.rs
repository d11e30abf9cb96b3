//! Geographic coordinate matching for geomatch.
//!
//! This crate provides:
//! - Parsing of free-form coordinate text ("40.7128° N", "-0.1278") into decimal degrees
//! - Latitude/longitude range validation
//! - Haversine distance calculations
//! - Nearest-neighbor matching between two point sets with optional parallelism
//! - City name resolution against an explicitly passed reference table
//!
//! # Example
//!
//! ```
//! use geomatch_geo::{match_closest_points, parse_pair};
//!
//! let nyc = parse_pair("40.7128 N, 74.0060 W").unwrap();
//! let la = parse_pair("34.0522, -118.2437").unwrap();
//! let london = parse_pair("51.5074, -0.1278").unwrap();
//!
//! let matches = match_closest_points(&[nyc], &[la, london]).unwrap();
//! assert_eq!(matches[0].matched, la);
//! ```

#![warn(missing_docs)]

mod haversine;
mod parser;
pub mod cities;
pub mod matcher;
mod error;

pub use haversine::{
    distance_km, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M,
};
pub use parser::{parse_coordinate, parse_pair, Hemisphere};
pub use matcher::{
    match_closest_points, match_closest_points_sequential, ExhaustiveSearch, MatchResult,
    NearestNeighbor, Neighbor,
};
pub use cities::{resolve, CityRecord, CityTable, LoadReport, Resolution, UNKNOWN_LOCATION};
pub use error::{GeoError, GeoErrorCode, Result};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without range checks.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate after checking both axes are in range.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        validate_lat_lon(latitude, longitude)?;
        Ok(Self::new(latitude, longitude))
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        validate_lat_lon(self.latitude, self.longitude).is_ok()
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// Checks that a latitude/longitude pair lies within valid ranges.
///
/// Latitude is checked first; NaN fails either check.
pub fn validate_lat_lon(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoError::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

/// An ordered set of validated coordinates.
///
/// Insertion order is preserved and determines the order of match results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Coordinate>,
}

impl PointSet {
    /// Creates an empty point set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a coordinate.
    pub fn push(&mut self, latitude: f64, longitude: f64) -> Result<()> {
        self.points.push(Coordinate::validated(latitude, longitude)?);
        Ok(())
    }

    /// Parses a `"<lat>, <lon>"` line and appends it.
    pub fn push_line(&mut self, line: &str) -> Result<Coordinate> {
        let coord = parse_pair(line)?;
        self.points.push(coord);
        Ok(coord)
    }

    /// Builds a point set, rejecting the first out-of-range coordinate.
    pub fn from_coordinates<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut set = Self::new();
        for coord in coords {
            set.push(coord.latitude, coord.longitude)?;
        }
        Ok(set)
    }

    /// Returns the points as a slice.
    pub fn as_slice(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl std::ops::Deref for PointSet {
    type Target = [Coordinate];

    fn deref(&self) -> &[Coordinate] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_creation() {
        let coord = Coordinate::new(52.5200, 13.4050);
        assert_eq!(coord.latitude, 52.5200);
        assert_eq!(coord.longitude, 13.4050);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_validate_lat_lon() {
        assert!(validate_lat_lon(40.7128, -74.0060).is_ok());
        assert!(matches!(
            validate_lat_lon(100.0, -74.0060),
            Err(GeoError::LatitudeOutOfRange(v)) if v == 100.0
        ));
        assert!(matches!(
            validate_lat_lon(40.7128, -200.0),
            Err(GeoError::LongitudeOutOfRange(v)) if v == -200.0
        ));
    }

    #[test]
    fn test_latitude_checked_before_longitude() {
        assert!(matches!(
            validate_lat_lon(95.0, 200.0),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_coordinate_from_tuple() {
        let coord: Coordinate = (52.5200, 13.4050).into();
        assert_eq!(coord.latitude, 52.5200);
    }

    #[test]
    fn test_point_set_preserves_order() {
        let mut set = PointSet::new();
        set.push_line("51.5074, -0.1278").unwrap();
        set.push(48.8566, 2.3522).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0], Coordinate::new(51.5074, -0.1278));
        assert_eq!(set[1], Coordinate::new(48.8566, 2.3522));
    }

    #[test]
    fn test_point_set_rejects_invalid() {
        let mut set = PointSet::new();
        assert!(set.push(120.0, 0.0).is_err());
        assert!(set.push_line("not, a point").is_err());
        assert!(set.is_empty());

        let result = PointSet::from_coordinates([Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 190.0)]);
        assert!(matches!(result, Err(GeoError::LongitudeOutOfRange(_))));
    }
}
