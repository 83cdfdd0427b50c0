//! Device store collaborator contract and the in-memory implementation.
//!
//! The store owns the full device records and is the source of truth for
//! a device's existence; the spatial index holds only a projection of it.
//! Backed by a document database in a deployed service, and by
//! [`MemoryStore`] for embedding and tests.

use crate::error::Result;
use crate::types::{Device, DeviceFilter, DeviceId, DeviceRecord};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result of a conditional create.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// The device was created and assigned a fresh id.
    Created(DeviceRecord),
    /// A device with the same network address already exists; the
    /// existing record is returned untouched.
    Conflict(DeviceRecord),
}

/// Abstract document store over device records.
pub trait DeviceStore: Send + Sync {
    /// Create the device unless one with its network address exists.
    fn create_if_absent(&self, device: Device) -> Result<CreateOutcome>;

    /// Fetch a record by id.
    fn get(&self, id: &DeviceId) -> Result<Option<DeviceRecord>>;

    /// Exact-match filtering; a direct passthrough scan.
    fn filter(&self, filter: &DeviceFilter) -> Result<Vec<DeviceRecord>>;

    /// Total registered device population.
    fn device_count(&self) -> Result<usize>;

    /// Connectivity probe. An `Err` means the store must not be mutated
    /// or queried; flows map it to [`crate::FogmeshError::StoreUnavailable`].
    fn ping(&self) -> Result<()>;
}

/// In-memory [`DeviceStore`] implementation.
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    devices: BTreeMap<DeviceId, Device>,
    by_ip: FxHashMap<String, DeviceId>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                devices: BTreeMap::new(),
                by_ip: FxHashMap::default(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore for MemoryStore {
    fn create_if_absent(&self, device: Device) -> Result<CreateOutcome> {
        let mut inner = self.inner.write();

        if let Some(existing_id) = inner.by_ip.get(&device.ip) {
            let existing = DeviceRecord {
                id: existing_id.clone(),
                device: inner.devices[existing_id].clone(),
            };
            return Ok(CreateOutcome::Conflict(existing));
        }

        let id = DeviceId::new(Uuid::new_v4().to_string());
        inner.by_ip.insert(device.ip.clone(), id.clone());
        inner.devices.insert(id.clone(), device.clone());

        Ok(CreateOutcome::Created(DeviceRecord { id, device }))
    }

    fn get(&self, id: &DeviceId) -> Result<Option<DeviceRecord>> {
        let inner = self.inner.read();
        Ok(inner.devices.get(id).map(|device| DeviceRecord {
            id: id.clone(),
            device: device.clone(),
        }))
    }

    fn filter(&self, filter: &DeviceFilter) -> Result<Vec<DeviceRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .devices
            .iter()
            .map(|(id, device)| DeviceRecord {
                id: id.clone(),
                device: device.clone(),
            })
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn device_count(&self) -> Result<usize> {
        Ok(self.inner.read().devices.len())
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}
