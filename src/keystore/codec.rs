use crate::error::{KeyforgeError, Result};
/// Keystore container sealing.
///
/// A sealed store is the container body (bincode) encrypted with
/// AES-256-GCM under a key derived from the store password with
/// PBKDF2-HMAC-SHA256. Each seal uses a fresh random salt and nonce, and
/// the GCM tag authenticates the whole body, so a wrong password and a
/// tampered store are indistinguishable on open.
///
/// Sealed layout:
///
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │ Header: "KEYFORGE-SEALED-STORE-V1\0"        │  26 bytes
/// ├─────────────────────────────────────────────┤
/// │ Salt (random, unique per seal)              │  32 bytes
/// ├─────────────────────────────────────────────┤
/// │ Nonce (random, unique per seal)             │  12 bytes
/// ├─────────────────────────────────────────────┤
/// │ Ciphertext + GCM authentication tag         │  variable
/// └─────────────────────────────────────────────┘
/// ```
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use super::container::KeystoreContainer;

const HEADER: &[u8] = b"KEYFORGE-SEALED-STORE-V1\0";
const SALT_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// PBKDF2 iteration count (OWASP 2023 recommendation for SHA256)
const PBKDF2_ITERATIONS: u32 = 600_000;

const MIN_SEALED_SIZE: usize = HEADER.len() + SALT_SIZE + NONCE_SIZE + TAG_SIZE;

/// Serializes keystore containers to and from their password-protected
/// binary form.
pub trait KeystoreCodec: Send + Sync {
    fn seal(&self, container: &KeystoreContainer, password: &str) -> Result<Vec<u8>>;

    fn open(&self, sealed: &[u8], password: &str) -> Result<KeystoreContainer>;
}

/// Default codec: bincode body under AES-256-GCM with a PBKDF2-derived key.
#[derive(Debug, Default, Clone, Copy)]
pub struct SealedCodec;

impl SealedCodec {
    pub fn new() -> Self {
        Self
    }

    fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_SIZE] {
        let mut derived = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived);
        derived
    }
}

impl KeystoreCodec for SealedCodec {
    fn seal(&self, container: &KeystoreContainer, password: &str) -> Result<Vec<u8>> {
        if password.is_empty() {
            return Err(KeyforgeError::Codec {
                reason: "store password cannot be empty".to_string(),
            });
        }

        let body = bincode::serialize(container)?;

        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        let derived_key = Self::derive_key(password, &salt);

        // Nonce reuse with the same key is catastrophic for GCM.
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived_key));
        let ciphertext = cipher
            .encrypt(nonce, body.as_slice())
            .map_err(|e| KeyforgeError::Codec {
                reason: format!("AES-GCM encryption failed: {}", e),
            })?;

        let mut sealed =
            Vec::with_capacity(HEADER.len() + SALT_SIZE + NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(HEADER);
        sealed.extend_from_slice(&salt);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(sealed)
    }

    fn open(&self, sealed: &[u8], password: &str) -> Result<KeystoreContainer> {
        if sealed.len() < MIN_SEALED_SIZE {
            return Err(KeyforgeError::Codec {
                reason: format!(
                    "sealed store too short: {} bytes (minimum {} bytes)",
                    sealed.len(),
                    MIN_SEALED_SIZE
                ),
            });
        }

        let (header, rest) = sealed.split_at(HEADER.len());
        if header != HEADER {
            return Err(KeyforgeError::Codec {
                reason: "invalid sealed store header".to_string(),
            });
        }

        let (salt, rest) = rest.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let derived_key = Self::derive_key(password, salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&derived_key));
        let body = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| KeyforgeError::Codec {
                reason: "failed to open sealed store: wrong password or corrupted data"
                    .to_string(),
            })?;

        Ok(bincode::deserialize(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::container::StoreFileType;

    const TEST_PASSWORD: &str = "8a1b29476b";

    fn test_container() -> KeystoreContainer {
        let mut container = KeystoreContainer::new(StoreFileType::Pkcs12);
        container.set_key_entry("acme.com", vec![1u8; 64], vec![vec![2u8; 128]]);
        container
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let codec = SealedCodec::new();
        let container = test_container();

        let sealed = codec.seal(&container, TEST_PASSWORD).unwrap();
        assert!(sealed.len() > MIN_SEALED_SIZE);

        let opened = codec.open(&sealed, TEST_PASSWORD).unwrap();
        assert_eq!(opened.entry_count(), 1);
        assert_eq!(
            opened.key_entry("acme.com").unwrap(),
            container.key_entry("acme.com").unwrap()
        );
    }

    #[test]
    fn test_wrong_password_fails() {
        let codec = SealedCodec::new();
        let sealed = codec.seal(&test_container(), TEST_PASSWORD).unwrap();

        let result = codec.open(&sealed, "0000000000");
        assert!(matches!(result, Err(KeyforgeError::Codec { .. })));
    }

    #[test]
    fn test_tampered_store_fails() {
        let codec = SealedCodec::new();
        let mut sealed = codec.seal(&test_container(), TEST_PASSWORD).unwrap();

        let tamper_pos = HEADER.len() + SALT_SIZE + NONCE_SIZE + 4;
        sealed[tamper_pos] ^= 0xFF;

        assert!(codec.open(&sealed, TEST_PASSWORD).is_err());
    }

    #[test]
    fn test_invalid_header_fails() {
        let codec = SealedCodec::new();
        let mut sealed = codec.seal(&test_container(), TEST_PASSWORD).unwrap();
        sealed[0] = b'X';

        let result = codec.open(&sealed, TEST_PASSWORD);
        assert!(matches!(result, Err(KeyforgeError::Codec { reason }) if reason.contains("header")));
    }

    #[test]
    fn test_truncated_store_fails() {
        let codec = SealedCodec::new();
        let sealed = codec.seal(&test_container(), TEST_PASSWORD).unwrap();

        let result = codec.open(&sealed[..MIN_SEALED_SIZE - 1], TEST_PASSWORD);
        assert!(matches!(result, Err(KeyforgeError::Codec { reason }) if reason.contains("short")));
    }

    #[test]
    fn test_empty_password_rejected() {
        let codec = SealedCodec::new();
        let result = codec.seal(&test_container(), "");
        assert!(result.is_err());
    }

    #[test]
    fn test_seal_is_probabilistic() {
        let codec = SealedCodec::new();
        let container = test_container();

        let sealed1 = codec.seal(&container, TEST_PASSWORD).unwrap();
        let sealed2 = codec.seal(&container, TEST_PASSWORD).unwrap();

        assert_ne!(sealed1, sealed2);
    }

    #[test]
    fn test_empty_trust_store_roundtrip() {
        let codec = SealedCodec::new();
        let container = KeystoreContainer::new(StoreFileType::trust_store_file_type());

        let sealed = codec.seal(&container, TEST_PASSWORD).unwrap();
        let opened = codec.open(&sealed, TEST_PASSWORD).unwrap();
        assert!(opened.is_empty());
    }
}
