//! The persistent cell structure over registered device positions.
//!
//! The index is a denormalized projection of the device store: per cell,
//! an append-only sequence of `(id, latitude, longitude)` tuples, plus a
//! registry of every cell key ever populated. It is not the source of
//! truth for a device's existence; it only makes proximity queries
//! answerable without a full device scan.

use crate::bucket::BucketKey;
use crate::error::Result;
use crate::types::DeviceId;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Compact device projection held by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePosition {
    pub id: DeviceId,
    pub latitude: f64,
    pub longitude: f64,
}

/// Repository of cells keyed by [`BucketKey`].
///
/// Implementations must tolerate concurrent calls on `&self`: appends
/// are atomic with respect to interleaved appends, and reads may observe
/// a partially-updated index relative to concurrent inserts (no snapshot
/// isolation is promised).
pub trait SpatialIndex: Send + Sync {
    /// Append a device position to its cell, creating the cell and
    /// registering its key on first use.
    ///
    /// NOT idempotent: inserting the same id twice stores a duplicate
    /// tuple. The registration flow guarantees at-most-once insertion by
    /// only calling this after the device record is durably created.
    fn insert(&self, id: DeviceId, latitude: f64, longitude: f64) -> Result<()>;

    /// Snapshot of every cell key that has ever been populated.
    fn cells(&self) -> Result<FxHashSet<BucketKey>>;

    /// Cell contents in insertion order; empty if the key was never
    /// populated.
    fn devices_in_cell(&self, key: &BucketKey) -> Result<Vec<DevicePosition>>;

    /// Total number of position tuples held (duplicates included).
    fn device_count(&self) -> Result<usize>;
}

/// One persisted cell document: the serialized key plus its device
/// tuples in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub cell: BucketKey,
    pub devices: Vec<DevicePosition>,
}

/// The singleton registry document listing every cell key ever used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub cells: Vec<BucketKey>,
}

/// In-memory [`SpatialIndex`] implementation.
pub struct MemoryIndex {
    inner: RwLock<IndexInner>,
}

struct IndexInner {
    cells: FxHashMap<BucketKey, Vec<DevicePosition>>,
    registry: FxHashSet<BucketKey>,
    device_count: usize,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(IndexInner {
                cells: FxHashMap::default(),
                registry: FxHashSet::default(),
                device_count: 0,
            }),
        }
    }

    /// Export the index in its persisted document layout: one
    /// [`CellRecord`] per cell (sorted by key for stable output) and the
    /// singleton [`RegistryRecord`].
    pub fn export(&self) -> (Vec<CellRecord>, RegistryRecord) {
        let inner = self.inner.read();

        let mut records: Vec<CellRecord> = inner
            .cells
            .iter()
            .map(|(cell, devices)| CellRecord {
                cell: *cell,
                devices: devices.clone(),
            })
            .collect();
        records.sort_by_key(|record| record.cell);

        let mut cells: Vec<BucketKey> = inner.registry.iter().copied().collect();
        cells.sort();

        (records, RegistryRecord { cells })
    }

    /// Rebuild an index from persisted documents.
    ///
    /// The registry is the union of the singleton record and the cell
    /// record keys, so a cell document whose key never made it into the
    /// singleton is still reachable by search.
    pub fn load(records: Vec<CellRecord>, registry: RegistryRecord) -> Self {
        let mut cells = FxHashMap::default();
        let mut keys = FxHashSet::default();
        let mut device_count = 0;

        for key in registry.cells {
            keys.insert(key);
        }
        for record in records {
            keys.insert(record.cell);
            device_count += record.devices.len();
            cells.insert(record.cell, record.devices);
        }

        Self {
            inner: RwLock::new(IndexInner {
                cells,
                registry: keys,
                device_count,
            }),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for MemoryIndex {
    fn insert(&self, id: DeviceId, latitude: f64, longitude: f64) -> Result<()> {
        let key = BucketKey::for_coords(latitude, longitude);

        let mut inner = self.inner.write();
        if inner.registry.insert(key) {
            log::debug!("opened cell {key}");
        }
        inner.cells.entry(key).or_default().push(DevicePosition {
            id,
            latitude,
            longitude,
        });
        inner.device_count += 1;
        Ok(())
    }

    fn cells(&self) -> Result<FxHashSet<BucketKey>> {
        Ok(self.inner.read().registry.clone())
    }

    fn devices_in_cell(&self, key: &BucketKey) -> Result<Vec<DevicePosition>> {
        Ok(self.inner.read().cells.get(key).cloned().unwrap_or_default())
    }

    fn device_count(&self) -> Result<usize> {
        Ok(self.inner.read().device_count)
    }
}
