//! Registry facade wiring the store, the spatial index, and admission.
//!
//! This is the embedding surface of the crate: registration, exact-match
//! filtering, and proximity queries, with every collaborator injected
//! behind a trait so tests and alternative backends can substitute their
//! own.
//!
//! # Examples
//!
//! ```rust
//! use fogmesh::{Device, RegisterOutcome, Registry};
//!
//! # fn main() -> Result<(), fogmesh::FogmeshError> {
//! let registry = Registry::in_memory()?;
//!
//! let base = Device {
//!     name: "edge-node-1".to_string(),
//!     cpu_cores: 4,
//!     cpu_frequency: 2.4,
//!     ram_size: 8_192,
//!     rom_size: 256_000,
//!     os: "Ubuntu 22.04".to_string(),
//!     os_kernel: "5.15.0".to_string(),
//!     ip: "10.0.0.1".to_string(),
//!     latitude: 50.45,
//!     longitude: 30.52,
//!     country: "Ukraine".to_string(),
//!     region: "Kyiv Oblast".to_string(),
//!     city: "Kyiv".to_string(),
//! };
//!
//! registry.register(base.clone())?;
//! registry.register(Device {
//!     ip: "10.0.0.2".to_string(),
//!     latitude: 50.40,
//!     longitude: 30.61,
//!     ..base
//! })?;
//!
//! // Two devices registered, default K = 2.
//! let nearest = registry.find_nearest(50.44, 30.54)?;
//! assert_eq!(nearest.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::admission::{ClusterAdmission, JoinGrant, StaticAdmission};
use crate::bucket::BucketKey;
use crate::error::{FogmeshError, Result};
use crate::index::{MemoryIndex, SpatialIndex};
use crate::query;
use crate::store::{CreateOutcome, DeviceStore, MemoryStore};
use crate::types::{Config, Device, DeviceFilter, DeviceId, DeviceRecord};
use std::sync::Arc;

/// Manager address served by the default [`StaticAdmission`].
pub const DEFAULT_MANAGER_ADDRESS: &str = "127.0.0.1:2377";

/// A successfully processed registration: the stored record plus the
/// cluster join credentials.
#[derive(Debug, Clone)]
pub struct Registration {
    pub record: DeviceRecord,
    pub grant: JoinGrant,
}

/// Outcome of [`Registry::register`].
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// The device was created and indexed.
    Created(Registration),
    /// A device with the same network address already exists; carries
    /// the existing record and a grant so the caller can still join.
    Conflict(Registration),
}

impl RegisterOutcome {
    /// The record this outcome refers to, created or pre-existing.
    pub fn record(&self) -> &DeviceRecord {
        match self {
            RegisterOutcome::Created(registration)
            | RegisterOutcome::Conflict(registration) => &registration.record,
        }
    }
}

/// Device registry with proximity search.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn DeviceStore>,
    index: Arc<dyn SpatialIndex>,
    admission: Arc<dyn ClusterAdmission>,
    config: Config,
}

impl Registry {
    /// Registry over in-memory collaborators with default configuration.
    pub fn in_memory() -> Result<Self> {
        RegistryBuilder::new().build()
    }

    /// Create a registry builder for custom collaborators.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a device.
    ///
    /// The flow is: field validation, cluster admission, store
    /// connectivity probe, conditional create, spatial index insert.
    /// Admission failure short-circuits before the store is touched; a
    /// conflict on the device's network address yields
    /// [`RegisterOutcome::Conflict`] with the existing record.
    ///
    /// The record write and the index insert are two separate steps with
    /// no cross-store transaction. A failure between them leaves the
    /// device findable by exact match but invisible to proximity
    /// queries until [`reconcile`](Self::reconcile) runs.
    pub fn register(&self, device: Device) -> Result<RegisterOutcome> {
        let missing = device.missing_fields();
        if !missing.is_empty() {
            return Err(FogmeshError::Validation(format!(
                "required device parameters: {}",
                missing.join(", ")
            )));
        }
        if !device.latitude.is_finite() || !device.longitude.is_finite() {
            return Err(FogmeshError::Validation(
                "latitude and longitude must be finite".to_string(),
            ));
        }

        let grant = self.admission.admit(&device)?;

        self.store.ping()?;
        match self.store.create_if_absent(device)? {
            CreateOutcome::Created(record) => {
                self.index.insert(
                    record.id.clone(),
                    record.device.latitude,
                    record.device.longitude,
                )?;
                log::debug!("registered device {} at {}", record.id, record.device.ip);
                Ok(RegisterOutcome::Created(Registration { record, grant }))
            }
            CreateOutcome::Conflict(existing) => {
                log::warn!(
                    "device with address {} already registered as {}",
                    existing.device.ip,
                    existing.id
                );
                Ok(RegisterOutcome::Conflict(Registration {
                    record: existing,
                    grant,
                }))
            }
        }
    }

    /// Fetch a device record by id.
    pub fn get(&self, id: &DeviceId) -> Result<DeviceRecord> {
        self.store.ping()?;
        self.store.get(id)?.ok_or(FogmeshError::NotFound)
    }

    /// Exact-match filtering over device attributes.
    ///
    /// A direct passthrough to the store; an empty result is a valid
    /// answer, not an error.
    pub fn find(&self, filter: &DeviceFilter) -> Result<Vec<DeviceRecord>> {
        self.store.ping()?;
        self.store.filter(filter)
    }

    /// Ids of the `k` devices closest to a point, nearest first.
    ///
    /// Reports [`FogmeshError::Underflow`] when the registered
    /// population is smaller than `k`. The population is counted from
    /// the store, so an index lagging the store (the two-phase write
    /// gap) produces a short result rather than an underflow.
    pub fn nearest(&self, latitude: f64, longitude: f64, k: usize) -> Result<Vec<DeviceId>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(FogmeshError::Validation(
                "latitude and longitude are required and must be finite".to_string(),
            ));
        }
        if k == 0 {
            return Err(FogmeshError::Validation(
                "result count k must be at least 1".to_string(),
            ));
        }

        self.store.ping()?;
        let available = self.store.device_count()?;
        if available < k {
            return Err(FogmeshError::Underflow {
                requested: k,
                available,
            });
        }

        query::nearest(self.index.as_ref(), latitude, longitude, k)
    }

    /// [`nearest`](Self::nearest) with the configured result count.
    pub fn find_nearest(&self, latitude: f64, longitude: f64) -> Result<Vec<DeviceId>> {
        self.nearest(latitude, longitude, self.config.nearest_k)
    }

    /// Re-insert store records missing from their expected cell.
    ///
    /// The compensating operation for the two-phase registration write:
    /// any device present in the store but absent from the cell its
    /// coordinates map to is inserted. Idempotent; returns the number of
    /// repairs.
    pub fn reconcile(&self) -> Result<usize> {
        self.store.ping()?;

        let mut repaired = 0;
        for record in self.store.filter(&DeviceFilter::default())? {
            let key = BucketKey::for_coords(record.device.latitude, record.device.longitude);
            let indexed = self
                .index
                .devices_in_cell(&key)?
                .iter()
                .any(|position| position.id == record.id);
            if !indexed {
                self.index.insert(
                    record.id.clone(),
                    record.device.latitude,
                    record.device.longitude,
                )?;
                repaired += 1;
            }
        }

        if repaired > 0 {
            log::warn!("reconciled {repaired} device(s) missing from the spatial index");
        }
        Ok(repaired)
    }
}

/// Builder for registries with custom collaborators.
///
/// Defaults to [`MemoryStore`], [`MemoryIndex`], and a
/// [`StaticAdmission`] serving [`DEFAULT_MANAGER_ADDRESS`] with an empty
/// join token; production embeddings supply their own collaborators.
pub struct RegistryBuilder {
    store: Option<Arc<dyn DeviceStore>>,
    index: Option<Arc<dyn SpatialIndex>>,
    admission: Option<Arc<dyn ClusterAdmission>>,
    config: Config,
}

impl RegistryBuilder {
    /// Create a builder with in-memory defaults.
    pub fn new() -> Self {
        Self {
            store: None,
            index: None,
            admission: None,
            config: Config::default(),
        }
    }

    /// Use a custom device store.
    pub fn store(mut self, store: Arc<dyn DeviceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom spatial index.
    pub fn index(mut self, index: Arc<dyn SpatialIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Use a custom admission collaborator.
    pub fn admission(mut self, admission: Arc<dyn ClusterAdmission>) -> Self {
        self.admission = Some(admission);
        self
    }

    /// Set the registry configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the registry, validating the configuration.
    pub fn build(self) -> Result<Registry> {
        self.config.validate().map_err(FogmeshError::Validation)?;

        Ok(Registry {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            index: self
                .index
                .unwrap_or_else(|| Arc::new(MemoryIndex::new())),
            admission: self.admission.unwrap_or_else(|| {
                Arc::new(StaticAdmission::new(DEFAULT_MANAGER_ADDRESS, ""))
            }),
            config: self.config,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
