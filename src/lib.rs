pub mod config;
pub mod error;
pub mod keystore;
pub mod registry;

pub use config::CryptoConfig;
pub use error::{KeyforgeError, Result};
pub use keystore::{
    KeyStoreGenerator, KeystoreCodec, KeystoreContainer, SealedCodec, SignatureAlgorithm,
    StoreFileType,
};
pub use registry::{
    GovernanceRegistry, InMemoryRegistry, LocalRegistry, StaticTenantDirectory, TenantDirectory,
};
