use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keystore container file formats known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreFileType {
    Pkcs12,
    Jks,
}

impl StoreFileType {
    /// Format used for newly provisioned tenant stores.
    pub fn default_file_type() -> Self {
        StoreFileType::Pkcs12
    }

    /// Format used for newly provisioned trust stores.
    pub fn trust_store_file_type() -> Self {
        StoreFileType::Pkcs12
    }

    /// File name extension registered for the format, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFileType::Pkcs12 => ".p12",
            StoreFileType::Jks => ".jks",
        }
    }

    /// Format name as recorded in resource properties.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreFileType::Pkcs12 => "PKCS12",
            StoreFileType::Jks => "JKS",
        }
    }
}

/// Private key entry of a keystore container.
///
/// The key is held as PKCS#8 DER together with its certificate chain in
/// DER. Entries never leave the container except through a sealing codec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivateKeyEntry {
    pub private_key_der: Vec<u8>,
    pub certificate_chain_der: Vec<Vec<u8>>,
}

/// In-memory password-protected key/certificate container.
///
/// A tenant keystore holds exactly one private key entry aliased by the
/// tenant domain; a trust store holds no key material at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreContainer {
    file_type: StoreFileType,
    entries: BTreeMap<String, PrivateKeyEntry>,
}

impl KeystoreContainer {
    pub fn new(file_type: StoreFileType) -> Self {
        Self {
            file_type,
            entries: BTreeMap::new(),
        }
    }

    pub fn file_type(&self) -> StoreFileType {
        self.file_type
    }

    /// Adds a private key entry under the given alias, replacing any
    /// previous entry with the same alias.
    pub fn set_key_entry(
        &mut self,
        alias: &str,
        private_key_der: Vec<u8>,
        certificate_chain_der: Vec<Vec<u8>>,
    ) {
        self.entries.insert(
            alias.to_string(),
            PrivateKeyEntry {
                private_key_der,
                certificate_chain_der,
            },
        );
    }

    pub fn key_entry(&self, alias: &str) -> Option<&PrivateKeyEntry> {
        self.entries.get(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_container() {
        let container = KeystoreContainer::new(StoreFileType::default_file_type());
        assert!(container.is_empty());
        assert_eq!(container.file_type(), StoreFileType::Pkcs12);
        assert_eq!(container.file_type().extension(), ".p12");
    }

    #[test]
    fn test_set_key_entry_replaces_alias() {
        let mut container = KeystoreContainer::new(StoreFileType::Pkcs12);
        container.set_key_entry("acme.com", vec![1, 2], vec![vec![3]]);
        container.set_key_entry("acme.com", vec![4, 5], vec![vec![6]]);

        assert_eq!(container.entry_count(), 1);
        let entry = container.key_entry("acme.com").unwrap();
        assert_eq!(entry.private_key_der, vec![4, 5]);
        assert_eq!(entry.certificate_chain_der, vec![vec![6]]);
    }

    #[test]
    fn test_extension_per_file_type() {
        assert_eq!(StoreFileType::Pkcs12.extension(), ".p12");
        assert_eq!(StoreFileType::Jks.extension(), ".jks");
    }
}
