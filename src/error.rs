use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyforgeError>;

#[derive(Error, Debug)]
pub enum KeyforgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] Box<bincode::ErrorKind>),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Certificate error: {0}")]
    Certificate(#[from] rcgen::RcgenError),

    #[error("Failed to resolve tenant {tenant_id}: {reason}")]
    TenantResolution { tenant_id: u32, reason: String },

    #[error("Failed to generate key material for tenant {tenant_domain}: {reason}")]
    Generation {
        tenant_domain: String,
        reason: String,
    },

    #[error("Failed to persist keystore for tenant {tenant_domain}: {reason}")]
    Persistence {
        tenant_domain: String,
        reason: String,
    },

    #[error("Keystore codec error: {reason}")]
    Codec { reason: String },

    #[error("Invalid resource path: {0}")]
    InvalidPath(String),
}
