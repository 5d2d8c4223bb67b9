use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::GovernanceRegistry;
use crate::error::KeyforgeError;
use crate::Result;

const PROPERTIES_SUFFIX: &str = ".properties.json";
const ASSOCIATIONS_FILE: &str = "associations.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Association {
    source: String,
    target: String,
    kind: String,
}

/// Filesystem-backed governance registry.
///
/// Resource content lives at `<base>/<path>`, resource properties in a
/// JSON sidecar next to it, and associations in a single JSON file at the
/// registry root guarded by a mutex.
pub struct LocalRegistry {
    base_path: PathBuf,
    assoc_lock: Mutex<()>,
}

impl LocalRegistry {
    pub fn new(base_path: PathBuf) -> Result<Self> {
        Ok(Self {
            base_path,
            assoc_lock: Mutex::new(()),
        })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = path.trim_start_matches('/');
        let sanitized = relative
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
            .collect::<String>();

        if sanitized.is_empty() || sanitized.contains("..") {
            return Err(KeyforgeError::InvalidPath(path.to_string()));
        }

        Ok(self.base_path.join(sanitized))
    }

    async fn write_file(&self, path: &PathBuf, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn load_associations(&self) -> Result<Vec<Association>> {
        let path = self.base_path.join(ASSOCIATIONS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(&path).await?;
        serde_json::from_slice(&data)
            .map_err(|e| KeyforgeError::Storage(format!("corrupt association index: {}", e)))
    }

    /// Associations recorded for the given source path.
    pub async fn associations_of(&self, source: &str) -> Result<Vec<(String, String)>> {
        let _guard = self.assoc_lock.lock().await;
        Ok(self
            .load_associations()
            .await?
            .into_iter()
            .filter(|a| a.source == source)
            .map(|a| (a.target, a.kind))
            .collect())
    }
}

#[async_trait]
impl GovernanceRegistry for LocalRegistry {
    async fn resource_exists(&self, path: &str) -> Result<bool> {
        let path = self.resolve(path)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn put(
        &self,
        path: &str,
        content: Bytes,
        properties: HashMap<String, String>,
    ) -> Result<()> {
        let resolved = self.resolve(path)?;
        self.write_file(&resolved, &content).await?;

        if !properties.is_empty() {
            let sidecar = resolved.with_file_name(format!(
                "{}{}",
                resolved
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| KeyforgeError::InvalidPath(path.to_string()))?,
                PROPERTIES_SUFFIX
            ));
            let data = serde_json::to_vec_pretty(&properties)
                .map_err(|e| KeyforgeError::Storage(format!("property encoding: {}", e)))?;
            self.write_file(&sidecar, &data).await?;
        }

        Ok(())
    }

    async fn add_association(&self, source: &str, target: &str, kind: &str) -> Result<()> {
        let _guard = self.assoc_lock.lock().await;

        let mut associations = self.load_associations().await?;
        let entry = Association {
            source: source.to_string(),
            target: target.to_string(),
            kind: kind.to_string(),
        };
        if !associations.contains(&entry) {
            associations.push(entry);
        }

        let data = serde_json::to_vec_pretty(&associations)
            .map_err(|e| KeyforgeError::Storage(format!("association encoding: {}", e)))?;
        let path = self.base_path.join(ASSOCIATIONS_FILE);
        self.write_file(&path, &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry() -> (LocalRegistry, TempDir) {
        let dir = TempDir::new().unwrap();
        let registry = LocalRegistry::new(dir.path().to_path_buf()).unwrap();
        (registry, dir)
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let (registry, _dir) = registry();
        let path = "/repository/security/key-stores/acme-com.p12";

        assert!(!registry.resource_exists(path).await.unwrap());
        registry
            .put(path, Bytes::from_static(b"sealed"), HashMap::new())
            .await
            .unwrap();
        assert!(registry.resource_exists(path).await.unwrap());
    }

    #[tokio::test]
    async fn test_properties_sidecar_written() {
        let (registry, dir) = registry();
        let mut properties = HashMap::new();
        properties.insert("tenant.pub.key.file.name.appender".to_string(), "a1b2c".to_string());

        registry
            .put(
                "/repository/security/pub-key",
                Bytes::from_static(b"der"),
                properties,
            )
            .await
            .unwrap();

        let sidecar = dir
            .path()
            .join("repository/security/pub-key.properties.json");
        let stored: HashMap<String, String> =
            serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(stored["tenant.pub.key.file.name.appender"], "a1b2c");
    }

    #[tokio::test]
    async fn test_associations_survive_reload() {
        let (registry, _dir) = registry();
        registry
            .add_association("/a", "/b", "assoc.tenant.keystore.pub.key")
            .await
            .unwrap();
        registry
            .add_association("/a", "/b", "assoc.tenant.keystore.pub.key")
            .await
            .unwrap();

        let associations = registry.associations_of("/a").await.unwrap();
        assert_eq!(
            associations,
            vec![("/b".to_string(), "assoc.tenant.keystore.pub.key".to_string())]
        );
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (registry, _dir) = registry();
        let result = registry.resource_exists("/repository/../../etc/passwd").await;
        assert!(matches!(result, Err(KeyforgeError::InvalidPath(_))));
    }
}
