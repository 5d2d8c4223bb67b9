//! Per-tenant keystore and trust store provisioning.
//!
//! A [`KeyStoreGenerator`] is bound to one tenant at construction and
//! drives a single sequential pipeline per call: algorithm negotiation,
//! key pair and self-signed certificate generation, container sealing, and
//! the governance registry hand-off. Callers must serialize provisioning
//! calls per tenant; a failed call leaves nothing to reuse and the whole
//! operation is re-invoked from scratch.

use bytes::Bytes;
use rand::Rng;
use rcgen::{
    Certificate as RcgenCertificate, CertificateParams, DistinguishedName, DnType, KeyPair,
    SerialNumber,
};
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use x509_parser::prelude::*;

use crate::config::{CryptoConfig, DEFAULT_PROVIDER};
use crate::error::{KeyforgeError, Result};
use crate::keystore::algorithm::{resolve_key_size, SignatureAlgorithm};
use crate::keystore::codec::KeystoreCodec;
use crate::keystore::container::{KeystoreContainer, StoreFileType};
use crate::keystore::naming;
use crate::registry::{
    GovernanceRegistry, TenantDirectory, ASSOC_TENANT_KS_PUB_KEY, KEY_STORES_ROOT,
    PROP_PUBKEY_FILE_NAME_APPENDER, TENANT_PUBKEY_RESOURCE,
};

/// Registry property recording the container format of a stored keystore.
const PROP_STORE_FILE_TYPE: &str = "store.file.type";

/// Grace window backdating `notBefore`, tolerating clock skew across
/// distributed components.
const VALIDITY_GRACE_DAYS: i64 = 30;

/// Certificate lifetime counted forward from generation time.
const VALIDITY_DAYS: i64 = 3650;

/// Key material produced for one tenant identity. The private key exists
/// only on its way into a sealed container and is never logged.
struct GeneratedIdentity {
    private_key_der: Vec<u8>,
    certificate_der: Vec<u8>,
}

/// Generates tenant keystores and trust stores and persists them in the
/// governance registry.
pub struct KeyStoreGenerator {
    tenant_id: u32,
    tenant_domain: String,
    registry: Arc<dyn GovernanceRegistry>,
    config: CryptoConfig,
    codec: Arc<dyn KeystoreCodec>,
}

impl KeyStoreGenerator {
    /// Binds a generator to a tenant.
    ///
    /// The tenant domain is looked up once from the directory and cached
    /// for the generator's lifetime; a failed lookup aborts construction.
    pub async fn new(
        tenant_id: u32,
        directory: &dyn TenantDirectory,
        registry: Arc<dyn GovernanceRegistry>,
        config: CryptoConfig,
        codec: Arc<dyn KeystoreCodec>,
    ) -> Result<Self> {
        let tenant_domain = directory.domain(tenant_id).await.map_err(|e| match e {
            resolution @ KeyforgeError::TenantResolution { .. } => resolution,
            other => KeyforgeError::TenantResolution {
                tenant_id,
                reason: other.to_string(),
            },
        })?;

        debug!(tenant_id, %tenant_domain, "bound keystore generator to tenant");

        Ok(Self {
            tenant_id,
            tenant_domain,
            registry,
            config,
            codec,
        })
    }

    pub fn tenant_domain(&self) -> &str {
        &self.tenant_domain
    }

    /// Generates a keystore holding a fresh key pair and self-signed
    /// certificate for the tenant, then persists it in the registry.
    pub async fn generate_key_store(&self) -> Result<()> {
        let password = naming::generate_password();
        let identity = self.generate_identity()?;

        let mut container = KeystoreContainer::new(StoreFileType::default_file_type());
        container.set_key_entry(
            &self.tenant_domain,
            identity.private_key_der,
            vec![identity.certificate_der.clone()],
        );

        self.persist_key_store(&container, &password, &identity.certificate_der)
            .await?;

        info!(
            tenant_id = self.tenant_id,
            tenant_domain = %self.tenant_domain,
            "provisioned tenant keystore"
        );
        Ok(())
    }

    /// Generates an empty trust store protected by a fresh password and
    /// persists it under the caller-supplied name.
    pub async fn generate_trust_store(&self, trust_store_name: &str) -> Result<()> {
        let password = naming::generate_password();
        let container = KeystoreContainer::new(StoreFileType::trust_store_file_type());

        self.persist_trust_store(&container, trust_store_name, &password)
            .await?;

        info!(
            tenant_id = self.tenant_id,
            tenant_domain = %self.tenant_domain,
            trust_store = trust_store_name,
            "provisioned tenant trust store"
        );
        Ok(())
    }

    /// Whether a keystore already exists for the tenant.
    ///
    /// Lookup errors are logged and treated as "does not exist"; the
    /// existence check never aborts provisioning.
    pub async fn key_store_exists(&self) -> bool {
        let keystore_name =
            naming::keystore_file_name(&self.tenant_domain, StoreFileType::default_file_type());
        let path = format!("{}/{}", KEY_STORES_ROOT, keystore_name);

        match self.registry.resource_exists(&path).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(
                    tenant_domain = %self.tenant_domain,
                    path = %path,
                    error = %e,
                    "keystore existence check failed, treating keystore as absent"
                );
                false
            }
        }
    }

    /// Generates a key pair and self-signed certificate for the tenant.
    fn generate_identity(&self) -> Result<GeneratedIdentity> {
        let signature_algorithm = SignatureAlgorithm::resolve(self.config.signing_algorithm());
        if signature_algorithm == SignatureAlgorithm::Md5WithRsa {
            warn!(
                tenant_domain = %self.tenant_domain,
                "using legacy MD5withRSA signing taxonomy, a compatibility \
                 default kept for existing deployments"
            );
        }

        let key_gen_algorithm = signature_algorithm.key_generation_algorithm();
        let key_size = resolve_key_size(key_gen_algorithm);
        debug!(
            tenant_domain = %self.tenant_domain,
            algorithm = %signature_algorithm,
            key_gen_algorithm,
            key_size,
            "resolved signature algorithm"
        );

        let provider = self.config.provider();
        if provider != DEFAULT_PROVIDER {
            return Err(self.generation_error(format!(
                "crypto provider '{}' is not available in this build",
                provider
            )));
        }

        let (sign_alg, key_pair) =
            self.instantiate_key_pair(signature_algorithm, key_gen_algorithm, key_size)?;

        let mut distinguished_name = DistinguishedName::new();
        distinguished_name.push(DnType::CommonName, self.tenant_domain.clone());
        distinguished_name.push(DnType::OrganizationalUnitName, "None".to_string());
        distinguished_name.push(DnType::OrganizationName, "None".to_string());
        distinguished_name.push(DnType::LocalityName, "None".to_string());
        distinguished_name.push(DnType::CountryName, "None".to_string());

        let mut cert_params = CertificateParams::new(vec![]);
        cert_params.alg = sign_alg;
        cert_params.distinguished_name = distinguished_name;
        cert_params.is_ca = rcgen::IsCa::NoCa;

        let now = ::time::OffsetDateTime::now_utc();
        cert_params.not_before = now - ::time::Duration::days(VALIDITY_GRACE_DAYS);
        cert_params.not_after = now + ::time::Duration::days(VALIDITY_DAYS);

        // 64-bit random serial; the historical 32-bit value is a known
        // collision risk across a platform's lifetime.
        let serial: u64 = loop {
            let candidate = rand::thread_rng().gen();
            if candidate != 0 {
                break candidate;
            }
        };
        cert_params.serial_number = Some(SerialNumber::from(serial));
        cert_params.key_pair = Some(key_pair);

        let certificate = RcgenCertificate::from_params(cert_params)
            .map_err(|e| self.generation_error(format!("certificate construction failed: {}", e)))?;
        let certificate_der = certificate
            .serialize_der()
            .map_err(|e| self.generation_error(format!("certificate signing failed: {}", e)))?;
        let private_key_der = certificate.serialize_private_key_der();

        if let Ok((_, parsed)) = X509Certificate::from_der(&certificate_der) {
            debug!(
                subject = %parsed.subject(),
                serial = %hex::encode(parsed.raw_serial()),
                "generated self-signed tenant certificate"
            );
        }

        Ok(GeneratedIdentity {
            private_key_der,
            certificate_der,
        })
    }

    /// Instantiates a key pair for the resolved key generation algorithm,
    /// paired with the rcgen signature scheme used to self-sign.
    fn instantiate_key_pair(
        &self,
        signature_algorithm: SignatureAlgorithm,
        key_gen_algorithm: &str,
        key_size: u32,
    ) -> Result<(&'static rcgen::SignatureAlgorithm, KeyPair)> {
        match key_gen_algorithm {
            "ECDSA" => {
                // ring fixes the digest to the curve, so the resolved
                // 384-bit key size selects P-384/SHA-384.
                let alg = match key_size {
                    256 => &rcgen::PKCS_ECDSA_P256_SHA256,
                    _ => &rcgen::PKCS_ECDSA_P384_SHA384,
                };
                let key_pair = KeyPair::generate(alg).map_err(|e| {
                    self.generation_error(format!("ECDSA key generation failed: {}", e))
                })?;
                Ok((alg, key_pair))
            }
            "RSA" => {
                // ring cannot generate RSA keys and has no MD5/SHA-1
                // signers; keys come from the rsa crate and legacy digest
                // requests sign with SHA-256.
                let alg = match signature_algorithm {
                    SignatureAlgorithm::Sha384WithRsa => &rcgen::PKCS_RSA_SHA384,
                    SignatureAlgorithm::Sha512WithRsa => &rcgen::PKCS_RSA_SHA512,
                    _ => &rcgen::PKCS_RSA_SHA256,
                };
                let bits = if key_size == 0 { 2048 } else { key_size as usize };
                let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
                    .map_err(|e| {
                        self.generation_error(format!("RSA key generation failed: {}", e))
                    })?;
                let pkcs8 = private_key.to_pkcs8_der().map_err(|e| {
                    self.generation_error(format!("RSA key encoding failed: {}", e))
                })?;
                let key_pair =
                    KeyPair::from_der_and_sign_algo(pkcs8.as_bytes(), alg).map_err(|e| {
                        self.generation_error(format!("RSA key import failed: {}", e))
                    })?;
                Ok((alg, key_pair))
            }
            other => Err(self.generation_error(format!(
                "crypto provider cannot instantiate {} key pairs",
                other
            ))),
        }
    }

    /// Seals the keystore and hands it to the registry together with the
    /// public certificate resource and their association.
    async fn persist_key_store(
        &self,
        container: &KeystoreContainer,
        password: &str,
        certificate_der: &[u8],
    ) -> Result<()> {
        let sealed = self
            .codec
            .seal(container, password)
            .map_err(|e| self.persistence_error(e))?;

        let keystore_name =
            naming::keystore_file_name(&self.tenant_domain, container.file_type());
        let keystore_path = format!("{}/{}", KEY_STORES_ROOT, keystore_name);
        debug!(tenant_domain = %self.tenant_domain, %keystore_path, "persisting tenant keystore");

        let mut keystore_properties = HashMap::new();
        keystore_properties.insert(
            PROP_STORE_FILE_TYPE.to_string(),
            container.file_type().type_name().to_string(),
        );
        self.registry
            .put(&keystore_path, Bytes::from(sealed), keystore_properties)
            .await
            .map_err(|e| self.persistence_error(e))?;

        let mut pub_key_properties = HashMap::new();
        pub_key_properties.insert(
            PROP_PUBKEY_FILE_NAME_APPENDER.to_string(),
            naming::pub_key_file_name_appender(),
        );
        self.registry
            .put(
                TENANT_PUBKEY_RESOURCE,
                Bytes::copy_from_slice(certificate_der),
                pub_key_properties,
            )
            .await
            .map_err(|e| self.persistence_error(e))?;

        self.registry
            .add_association(&keystore_path, TENANT_PUBKEY_RESOURCE, ASSOC_TENANT_KS_PUB_KEY)
            .await
            .map_err(|e| self.persistence_error(e))
    }

    /// Seals the trust store and hands it to the registry under the
    /// caller-supplied name. Trust stores get no certificate resource and
    /// no association.
    async fn persist_trust_store(
        &self,
        container: &KeystoreContainer,
        trust_store_name: &str,
        password: &str,
    ) -> Result<()> {
        let sealed = self
            .codec
            .seal(container, password)
            .map_err(|e| self.persistence_error(e))?;

        let trust_store_path = format!("{}/{}", KEY_STORES_ROOT, trust_store_name.trim());
        debug!(tenant_domain = %self.tenant_domain, %trust_store_path, "persisting trust store");

        let mut properties = HashMap::new();
        properties.insert(
            PROP_STORE_FILE_TYPE.to_string(),
            container.file_type().type_name().to_string(),
        );
        self.registry
            .put(&trust_store_path, Bytes::from(sealed), properties)
            .await
            .map_err(|e| self.persistence_error(e))
    }

    fn generation_error(&self, reason: String) -> KeyforgeError {
        KeyforgeError::Generation {
            tenant_domain: self.tenant_domain.clone(),
            reason,
        }
    }

    fn persistence_error(&self, cause: KeyforgeError) -> KeyforgeError {
        KeyforgeError::Persistence {
            tenant_domain: self.tenant_domain.clone(),
            reason: cause.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod generator_tests;
