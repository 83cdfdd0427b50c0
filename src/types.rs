//! Device records, filters, and configuration for fogmesh
//!
//! This module provides the serializable types shared by the store, the
//! spatial index, and the registry flows.

use geo::Point;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of devices returned by a proximity query.
///
/// The value the service historically pinned; overridable through
/// [`Config::with_nearest_k`].
pub const DEFAULT_NEAREST_K: usize = 2;

/// Opaque device identifier assigned by the store on creation.
///
/// Immutable and unique for the lifetime of the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A compute node described at registration time.
///
/// Coordinates are raw degrees; everything else is carried opaquely by
/// the core and only consulted by exact-match filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub cpu_cores: u32,
    /// Clock speed in GHz.
    pub cpu_frequency: f64,
    /// Memory size in megabytes.
    pub ram_size: u64,
    /// Storage size in megabytes.
    pub rom_size: u64,
    pub os: String,
    pub os_kernel: String,
    /// Network address; unique across the registry.
    pub ip: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub region: String,
    pub city: String,
}

impl Device {
    /// The device position as a `geo` point (`x` = longitude, `y` = latitude).
    pub fn position(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Names of required fields that are empty or zero.
    ///
    /// Coordinates are not listed here; they are range-checked separately
    /// so that devices on the equator or prime meridian stay valid.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.cpu_cores == 0 {
            missing.push("cpu_cores");
        }
        if !(self.cpu_frequency.is_finite() && self.cpu_frequency > 0.0) {
            missing.push("cpu_frequency");
        }
        if self.ram_size == 0 {
            missing.push("ram_size");
        }
        if self.rom_size == 0 {
            missing.push("rom_size");
        }
        if self.os.is_empty() {
            missing.push("os");
        }
        if self.os_kernel.is_empty() {
            missing.push("os_kernel");
        }
        if self.ip.is_empty() {
            missing.push("ip");
        }
        if self.country.is_empty() {
            missing.push("country");
        }
        if self.region.is_empty() {
            missing.push("region");
        }
        if self.city.is_empty() {
            missing.push("city");
        }
        missing
    }
}

/// A device together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub device: Device,
}

/// Exact-match filter over device attributes.
///
/// Every populated field must match for a record to be selected; an
/// empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceFilter {
    #[serde(default)]
    pub id: Option<DeviceId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    #[serde(default)]
    pub cpu_frequency: Option<f64>,
    #[serde(default)]
    pub ram_size: Option<u64>,
    #[serde(default)]
    pub rom_size: Option<u64>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub os_kernel: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl DeviceFilter {
    /// Check whether a record satisfies every populated field.
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        fn want<T: PartialEq>(filter: &Option<T>, value: &T) -> bool {
            filter.as_ref().is_none_or(|expected| expected == value)
        }

        let device = &record.device;
        want(&self.id, &record.id)
            && want(&self.name, &device.name)
            && want(&self.cpu_cores, &device.cpu_cores)
            && want(&self.cpu_frequency, &device.cpu_frequency)
            && want(&self.ram_size, &device.ram_size)
            && want(&self.rom_size, &device.rom_size)
            && want(&self.os, &device.os)
            && want(&self.os_kernel, &device.os_kernel)
            && want(&self.ip, &device.ip)
            && want(&self.country, &device.country)
            && want(&self.region, &device.region)
            && want(&self.city, &device.city)
    }
}

/// Registry configuration
///
/// Designed to be easily serializable and loadable from JSON or TOML
/// while keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use fogmesh::Config;
///
/// // Create default config
/// let config = Config::default();
/// assert_eq!(config.nearest_k, 2);
///
/// // Load from JSON
/// let config: Config = Config::from_json(r#"{ "nearest_k": 5 }"#).unwrap();
/// assert_eq!(config.nearest_k, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of devices returned by [`crate::Registry::find_nearest`].
    #[serde(default = "Config::default_nearest_k")]
    pub nearest_k: usize,
}

impl Config {
    const fn default_nearest_k() -> usize {
        DEFAULT_NEAREST_K
    }

    /// Set the proximity-query result count.
    pub fn with_nearest_k(mut self, k: usize) -> Self {
        self.nearest_k = k;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.nearest_k == 0 {
            return Err("nearest_k must be at least 1".to_string());
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nearest_k: Self::default_nearest_k(),
        }
    }
}
