use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;

use super::GovernanceRegistry;
use crate::error::KeyforgeError;
use crate::Result;

#[derive(Debug, Clone)]
struct StoredResource {
    content: Bytes,
    properties: HashMap<String, String>,
}

/// In-memory governance registry for tests and single-process embeddings.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    resources: RwLock<HashMap<String, StoredResource>>,
    associations: RwLock<Vec<(String, String, String)>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored content of a resource, if present.
    pub fn resource(&self, path: &str) -> Option<Bytes> {
        self.resources
            .read()
            .ok()?
            .get(path)
            .map(|r| r.content.clone())
    }

    /// Stored properties of a resource, if present.
    pub fn properties(&self, path: &str) -> Option<HashMap<String, String>> {
        self.resources
            .read()
            .ok()?
            .get(path)
            .map(|r| r.properties.clone())
    }

    /// All recorded associations as (source, target, kind) triples.
    pub fn associations(&self) -> Vec<(String, String, String)> {
        self.associations
            .read()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GovernanceRegistry for InMemoryRegistry {
    async fn resource_exists(&self, path: &str) -> Result<bool> {
        let resources = self
            .resources
            .read()
            .map_err(|_| KeyforgeError::Storage("registry lock poisoned".to_string()))?;
        Ok(resources.contains_key(path))
    }

    async fn put(
        &self,
        path: &str,
        content: Bytes,
        properties: HashMap<String, String>,
    ) -> Result<()> {
        let mut resources = self
            .resources
            .write()
            .map_err(|_| KeyforgeError::Storage("registry lock poisoned".to_string()))?;
        resources.insert(
            path.to_string(),
            StoredResource {
                content,
                properties,
            },
        );
        Ok(())
    }

    async fn add_association(&self, source: &str, target: &str, kind: &str) -> Result<()> {
        let mut associations = self
            .associations
            .write()
            .map_err(|_| KeyforgeError::Storage("registry lock poisoned".to_string()))?;
        associations.push((source.to_string(), target.to_string(), kind.to_string()));
        Ok(())
    }
}
