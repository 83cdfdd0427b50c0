//! Embedded registry and proximity index for geo-tagged edge compute devices.
//!
//! Devices register with raw degree coordinates and are bucketed into
//! 1-degree cells; proximity queries walk the cells in ranked distance
//! order and stop as soon as K devices are found.
//!
//! ```rust
//! use fogmesh::{Device, Registry};
//!
//! # fn main() -> Result<(), fogmesh::FogmeshError> {
//! let registry = Registry::in_memory()?;
//!
//! let device = Device {
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
//! let outcome = registry.register(device)?;
//! let nearest = registry.nearest(50.45, 30.52, 1)?;
//! assert_eq!(nearest, vec![outcome.record().id.clone()]);
//! # Ok(())
//! # }
//! ```

pub mod admission;
pub mod bucket;
pub mod error;
pub mod index;
pub mod query;
pub mod registry;
pub mod store;
pub mod types;

pub use error::{FogmeshError, Result};

pub use registry::{
    DEFAULT_MANAGER_ADDRESS, RegisterOutcome, Registration, Registry, RegistryBuilder,
};

pub use types::{
    Config, DEFAULT_NEAREST_K, Device, DeviceFilter, DeviceId, DeviceRecord,
};

pub use bucket::BucketKey;

pub use index::{CellRecord, DevicePosition, MemoryIndex, RegistryRecord, SpatialIndex};

pub use query::nearest;

pub use store::{CreateOutcome, DeviceStore, MemoryStore};

pub use admission::{ClusterAdmission, JoinGrant, StaticAdmission};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{FogmeshError, Result};

    pub use crate::{RegisterOutcome, Registration, Registry, RegistryBuilder};

    pub use crate::{Config, Device, DeviceFilter, DeviceId, DeviceRecord};

    pub use crate::{BucketKey, DevicePosition, MemoryIndex, SpatialIndex};

    pub use crate::{CreateOutcome, DeviceStore, MemoryStore};

    pub use crate::{ClusterAdmission, JoinGrant, StaticAdmission};

    pub use geo::Point;
}
