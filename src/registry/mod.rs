//! Governance registry and tenant directory boundaries.
//!
//! The keystore generator never talks to a concrete store or identity
//! service directly; it consumes the capabilities defined here. Two
//! registry implementations ship with the crate: [`LocalRegistry`]
//! (filesystem-backed) and [`InMemoryRegistry`] (testing and embedding).

pub mod local;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

use crate::Result;

pub use local::LocalRegistry;
pub use memory::InMemoryRegistry;

/// Collection root under which keystore and trust store resources live.
pub const KEY_STORES_ROOT: &str = "/repository/security/key-stores";

/// Well-known path of the tenant public certificate resource.
pub const TENANT_PUBKEY_RESOURCE: &str = "/repository/security/pub-key";

/// Association kind linking a tenant keystore to its public certificate.
pub const ASSOC_TENANT_KS_PUB_KEY: &str = "assoc.tenant.keystore.pub.key";

/// Property key carrying the public certificate file name appender.
pub const PROP_PUBKEY_FILE_NAME_APPENDER: &str = "tenant.pub.key.file.name.appender";

/// Maps a tenant identifier to its registered domain name.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Domain name of the tenant, or an error when the tenant is unknown
    /// or the directory is unavailable.
    async fn domain(&self, tenant_id: u32) -> Result<String>;
}

/// Governance-style resource registry.
///
/// Paths are registry-absolute (e.g. `/repository/security/key-stores/x.p12`).
/// The registry provides its own concurrency control; distinct paths follow
/// last-writer-wins semantics.
#[async_trait]
pub trait GovernanceRegistry: Send + Sync {
    async fn resource_exists(&self, path: &str) -> Result<bool>;

    async fn put(
        &self,
        path: &str,
        content: Bytes,
        properties: HashMap<String, String>,
    ) -> Result<()>;

    /// Records a named, directed relation between two stored resources.
    async fn add_association(&self, source: &str, target: &str, kind: &str) -> Result<()>;
}

/// Map-backed tenant directory for tests and single-process embeddings.
#[derive(Debug, Default)]
pub struct StaticTenantDirectory {
    domains: HashMap<u32, String>,
}

impl StaticTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant_id: u32, domain: &str) -> Self {
        self.domains.insert(tenant_id, domain.to_string());
        self
    }
}

#[async_trait]
impl TenantDirectory for StaticTenantDirectory {
    async fn domain(&self, tenant_id: u32) -> Result<String> {
        self.domains
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| crate::KeyforgeError::TenantResolution {
                tenant_id,
                reason: "tenant is not registered in the directory".to_string(),
            })
    }
}
