//! Cell key derivation for the coarse spatial bucketing.
//!
//! Devices are bucketed into 1-degree-square cells identified by the
//! truncated integer parts of their coordinates. The same derivation is
//! used on the insert path and the query path, so a key computed here is
//! always reachable by search.

use crate::error::FogmeshError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of one 1-degree-square cell.
///
/// Derived by truncating each coordinate toward zero (not flooring), so
/// `(-0.5, -0.5)` lands in the same cell as `(0.5, 0.5)`. The cell unit
/// is a degree square, not a fixed ground distance.
///
/// The persisted wire form is `"{lat}x{lon}"`:
///
/// ```rust
/// use fogmesh::BucketKey;
///
/// let key = BucketKey::for_coords(50.45, 30.52);
/// assert_eq!(key, BucketKey::new(50, 30));
/// assert_eq!(key.to_string(), "50x30");
/// assert_eq!("50x30".parse::<BucketKey>().unwrap(), key);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub lat: i32,
    pub lon: i32,
}

impl BucketKey {
    /// Build a key from already-truncated bucket coordinates.
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Derive the cell key for a coordinate pair.
    ///
    /// Pure and total over finite inputs; each coordinate is truncated
    /// toward zero independently.
    pub fn for_coords(latitude: f64, longitude: f64) -> Self {
        Self {
            lat: latitude.trunc() as i32,
            lon: longitude.trunc() as i32,
        }
    }

    /// Squared Euclidean distance between integer bucket coordinates.
    ///
    /// Exact in integer arithmetic; ascending order of the squared value
    /// is the ascending order of [`grid_distance`](Self::grid_distance),
    /// which makes it the grouping key for cell ranking.
    pub fn grid_distance_sq(&self, other: &BucketKey) -> i64 {
        let dlat = i64::from(self.lat) - i64::from(other.lat);
        let dlon = i64::from(self.lon) - i64::from(other.lon);
        dlat * dlat + dlon * dlon
    }

    /// Euclidean distance between integer bucket coordinates.
    ///
    /// This ranks cells by how far their bucket is from the query's
    /// bucket, not from the true query point. A deliberate, coarse
    /// approximation: in pathological layouts a cell holding a closer
    /// device can be visited after a nominally-farther cell.
    pub fn grid_distance(&self, other: &BucketKey) -> f64 {
        (self.grid_distance_sq(other) as f64).sqrt()
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.lat, self.lon)
    }
}

impl FromStr for BucketKey {
    type Err = FogmeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once('x')
            .ok_or_else(|| FogmeshError::InvalidCellKey(s.to_string()))?;
        let lat = lat
            .parse::<i32>()
            .map_err(|_| FogmeshError::InvalidCellKey(s.to_string()))?;
        let lon = lon
            .parse::<i32>()
            .map_err(|_| FogmeshError::InvalidCellKey(s.to_string()))?;
        Ok(Self { lat, lon })
    }
}

// Persisted cell documents key on the delimited string form, so serde
// goes through Display/FromStr rather than a two-field struct.
impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BucketKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
