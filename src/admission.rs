//! Cluster admission collaborator consulted before a device write.
//!
//! Registration must obtain join credentials from the cluster manager
//! before the store is touched; an admission failure short-circuits the
//! whole flow. A deployed service implements this against the scheduler,
//! while [`StaticAdmission`] serves fixed credentials for embedding and
//! tests.

use crate::error::Result;
use crate::types::Device;
use serde::{Deserialize, Serialize};

/// Credentials a newly admitted device uses to join the compute cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGrant {
    /// Address of the cluster manager the device connects to.
    pub manager_address: String,
    /// Worker join token handed out by the manager.
    pub join_token: String,
}

/// Collaborator deciding whether a device may join the cluster.
pub trait ClusterAdmission: Send + Sync {
    /// Request admission for `device`.
    ///
    /// Implementations return [`crate::FogmeshError::AdmissionDenied`]
    /// on refusal or manager unreachability.
    fn admit(&self, device: &Device) -> Result<JoinGrant>;
}

/// Admission backed by fixed credentials.
pub struct StaticAdmission {
    grant: JoinGrant,
}

impl StaticAdmission {
    /// Serve the given manager address and join token to every device.
    pub fn new(manager_address: impl Into<String>, join_token: impl Into<String>) -> Self {
        Self {
            grant: JoinGrant {
                manager_address: manager_address.into(),
                join_token: join_token.into(),
            },
        }
    }
}

impl ClusterAdmission for StaticAdmission {
    fn admit(&self, _device: &Device) -> Result<JoinGrant> {
        Ok(self.grant.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_admission_serves_fixed_grant() {
        let admission = StaticAdmission::new("10.1.0.1:2377", "SWMTKN-1-abc");
        let device = Device {
            name: "node".to_string(),
            cpu_cores: 2,
            cpu_frequency: 1.8,
            ram_size: 4_096,
            rom_size: 64_000,
            os: "Ubuntu 22.04".to_string(),
            os_kernel: "5.15.0".to_string(),
            ip: "10.0.0.1".to_string(),
            latitude: 50.45,
            longitude: 30.52,
            country: "Ukraine".to_string(),
            region: "Kyiv Oblast".to_string(),
            city: "Kyiv".to_string(),
        };

        let grant = admission.admit(&device).unwrap();
        assert_eq!(grant.manager_address, "10.1.0.1:2377");
        assert_eq!(grant.join_token, "SWMTKN-1-abc");
    }
}
