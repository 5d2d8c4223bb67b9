use serde::{Deserialize, Serialize};

/// Default crypto provider identifier, used when no provider is configured.
pub const DEFAULT_PROVIDER: &str = "ring";

/// Crypto provisioning configuration.
///
/// Both settings are free-text strings supplied by the platform
/// configuration source. `signing_algorithm` is matched case-insensitively
/// against the supported signature algorithms; `provider` selects the
/// crypto provider used for key generation and signing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Preferred signature algorithm, e.g. "SHA256withRSA".
    pub signing_algorithm: Option<String>,

    /// Preferred crypto provider name.
    pub provider: Option<String>,
}

impl CryptoConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CryptoConfig = toml::from_str(&content)
            .map_err(|e| crate::error::KeyforgeError::Config(e.to_string()))?;
        Ok(config)
    }

    /// The configured signing algorithm, with blank values treated as unset.
    pub fn signing_algorithm(&self) -> Option<&str> {
        self.signing_algorithm
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The configured provider name, falling back to [`DEFAULT_PROVIDER`]
    /// when blank or unset.
    pub fn provider(&self) -> &str {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PROVIDER)
    }
}
