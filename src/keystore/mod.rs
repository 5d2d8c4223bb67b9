//! Tenant keystore provisioning.
//!
//! This module family covers the whole provisioning pipeline: signature
//! algorithm negotiation, key pair and self-signed certificate generation,
//! container packaging and sealing, artifact naming, and the registry
//! hand-off.

pub mod algorithm;
pub mod codec;
pub mod container;
pub mod generator;
pub mod naming;

pub use algorithm::{resolve_key_size, SignatureAlgorithm};
pub use codec::{KeystoreCodec, SealedCodec};
pub use container::{KeystoreContainer, PrivateKeyEntry, StoreFileType};
pub use generator::KeyStoreGenerator;
