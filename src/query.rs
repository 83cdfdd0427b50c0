//! Ranked expanding nearest-device search over the cell structure.

use crate::bucket::BucketKey;
use crate::error::{FogmeshError, Result};
use crate::index::SpatialIndex;
use crate::types::DeviceId;
use geo::{Distance, Euclidean, Point};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Find the ids of the `k` devices closest to a query point.
///
/// Cells are ranked by the Euclidean distance between *integer bucket
/// coordinates* and walked in ascending distance groups; within a group,
/// that group's devices are ranked by true planar distance from the
/// actual query point, ties resolved in insertion order. The search
/// stops as soon as `k` ids are accumulated, so per-cell work is bounded
/// once enough candidates are found; the cell-ranking step always covers
/// the full registry.
///
/// Distances are planar Euclidean on raw degree coordinates throughout,
/// adequate only where degree-distance distortion is acceptable. The
/// bucket-level ranking is a further approximation: a cell holding a
/// closer device can, in pathological layouts, be visited after a
/// nominally-farther cell.
///
/// Returns fewer than `k` ids when the registry is exhausted first;
/// callers that need the underflow distinction check the device
/// population up front (see [`crate::Registry::nearest`]).
///
/// # Errors
///
/// `k == 0` is a [`FogmeshError::Validation`] error.
///
/// # Examples
///
/// ```rust
/// use fogmesh::index::{MemoryIndex, SpatialIndex};
/// use fogmesh::query::nearest;
///
/// let index = MemoryIndex::new();
/// index.insert("a".into(), 50.1, 30.2).unwrap();
/// index.insert("b".into(), 50.4, 30.9).unwrap();
///
/// let ids = nearest(&index, 50.0, 30.0, 1).unwrap();
/// assert_eq!(ids[0].as_str(), "a");
/// ```
pub fn nearest<I>(index: &I, latitude: f64, longitude: f64, k: usize) -> Result<Vec<DeviceId>>
where
    I: SpatialIndex + ?Sized,
{
    if k == 0 {
        return Err(FogmeshError::Validation(
            "result count k must be at least 1".to_string(),
        ));
    }

    let query_key = BucketKey::for_coords(latitude, longitude);
    let query_point = Point::new(longitude, latitude);

    // Rank every registered cell. Grouping by the exact squared integer
    // distance yields the same ascending group order as the Euclidean
    // value; within a group, order is unspecified.
    let mut ranked: BTreeMap<i64, Vec<BucketKey>> = BTreeMap::new();
    for cell in index.cells()? {
        ranked
            .entry(query_key.grid_distance_sq(&cell))
            .or_default()
            .push(cell);
    }

    let mut result: Vec<DeviceId> = Vec::with_capacity(k);
    for cells in ranked.into_values() {
        let mut candidates: Vec<(f64, DeviceId)> = Vec::new();
        for cell in cells {
            for device in index.devices_in_cell(&cell)? {
                let position = Point::new(device.longitude, device.latitude);
                candidates.push((Euclidean.distance(query_point, position), device.id));
            }
        }
        if candidates.is_empty() {
            continue;
        }

        // Stable sort: equal distances keep their collection order,
        // which is insertion order within a cell.
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        for (_, id) in candidates {
            result.push(id);
            if result.len() == k {
                return Ok(result);
            }
        }
    }

    // Registry exhausted before k ids were found; the caller's
    // population check does not see index skew, so return what we have.
    Ok(result)
}
