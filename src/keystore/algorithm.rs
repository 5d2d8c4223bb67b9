use serde::{Deserialize, Serialize};

/// Signature algorithms supported for tenant certificate generation.
///
/// The canonical names follow the `<digest>with<encryption>` convention.
/// Unknown or missing configuration resolves to [`Md5WithRsa`], which is a
/// backward-compatibility artifact carried over from earlier platform
/// releases, not a security recommendation.
///
/// [`Md5WithRsa`]: SignatureAlgorithm::Md5WithRsa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    Sha1WithDsa,
    Sha1WithEcdsa,
    Sha256WithEcdsa,
    Sha384WithEcdsa,
    Sha512WithEcdsa,
    Md5WithRsa,
    Sha1WithRsa,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 10] = [
        SignatureAlgorithm::Sha1WithDsa,
        SignatureAlgorithm::Sha1WithEcdsa,
        SignatureAlgorithm::Sha256WithEcdsa,
        SignatureAlgorithm::Sha384WithEcdsa,
        SignatureAlgorithm::Sha512WithEcdsa,
        SignatureAlgorithm::Md5WithRsa,
        SignatureAlgorithm::Sha1WithRsa,
        SignatureAlgorithm::Sha256WithRsa,
        SignatureAlgorithm::Sha384WithRsa,
        SignatureAlgorithm::Sha512WithRsa,
    ];

    /// Canonical algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1WithDsa => "SHA1withDSA",
            SignatureAlgorithm::Sha1WithEcdsa => "SHA1withECDSA",
            SignatureAlgorithm::Sha256WithEcdsa => "SHA256withECDSA",
            SignatureAlgorithm::Sha384WithEcdsa => "SHA384withECDSA",
            SignatureAlgorithm::Sha512WithEcdsa => "SHA512withECDSA",
            SignatureAlgorithm::Md5WithRsa => "MD5withRSA",
            SignatureAlgorithm::Sha1WithRsa => "SHA1withRSA",
            SignatureAlgorithm::Sha256WithRsa => "SHA256withRSA",
            SignatureAlgorithm::Sha384WithRsa => "SHA384withRSA",
            SignatureAlgorithm::Sha512WithRsa => "SHA512withRSA",
        }
    }

    /// Resolves the configured algorithm name against the supported set.
    ///
    /// Matching is case-insensitive. A missing, blank, or unrecognized
    /// value resolves to the legacy [`Md5WithRsa`] fallback.
    ///
    /// [`Md5WithRsa`]: SignatureAlgorithm::Md5WithRsa
    pub fn resolve(configured: Option<&str>) -> Self {
        if let Some(configured) = configured {
            for algorithm in Self::ALL {
                if algorithm.name().eq_ignore_ascii_case(configured.trim()) {
                    return algorithm;
                }
            }
        }
        SignatureAlgorithm::Md5WithRsa
    }

    /// The key generation algorithm derived from the signature algorithm.
    ///
    /// For `<digest>with<encryption>` names this is the part after the
    /// `with` token; a name without the token is its own key generation
    /// algorithm.
    pub fn key_generation_algorithm(&self) -> &'static str {
        let name = self.name();
        match name.find("with") {
            Some(index) if index + 4 < name.len() => &name[index + 4..],
            _ => name,
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Key size for a key generation algorithm, per the FIPS-aligned table.
///
/// Returns 0 for algorithms without an entry, meaning the primitive's own
/// default size is accepted.
pub fn resolve_key_size(key_gen_algorithm: &str) -> u32 {
    if key_gen_algorithm.eq_ignore_ascii_case("ECDSA") {
        384
    } else if key_gen_algorithm.eq_ignore_ascii_case("RSA")
        || key_gen_algorithm.eq_ignore_ascii_case("DSA")
    {
        2048
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_names() {
        for algorithm in SignatureAlgorithm::ALL {
            assert_eq!(SignatureAlgorithm::resolve(Some(algorithm.name())), algorithm);
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(
            SignatureAlgorithm::resolve(Some("sha256withrsa")),
            SignatureAlgorithm::Sha256WithRsa
        );
        assert_eq!(
            SignatureAlgorithm::resolve(Some("SHA384WITHECDSA")),
            SignatureAlgorithm::Sha384WithEcdsa
        );
    }

    #[test]
    fn test_resolve_falls_back_to_legacy_default() {
        assert_eq!(SignatureAlgorithm::resolve(None), SignatureAlgorithm::Md5WithRsa);
        assert_eq!(
            SignatureAlgorithm::resolve(Some("")),
            SignatureAlgorithm::Md5WithRsa
        );
        assert_eq!(
            SignatureAlgorithm::resolve(Some("Ed25519")),
            SignatureAlgorithm::Md5WithRsa
        );
    }

    #[test]
    fn test_key_generation_algorithm_is_suffix_after_with() {
        assert_eq!(
            SignatureAlgorithm::Sha256WithRsa.key_generation_algorithm(),
            "RSA"
        );
        assert_eq!(
            SignatureAlgorithm::Sha1WithDsa.key_generation_algorithm(),
            "DSA"
        );
        assert_eq!(
            SignatureAlgorithm::Sha512WithEcdsa.key_generation_algorithm(),
            "ECDSA"
        );
        assert_eq!(
            SignatureAlgorithm::Md5WithRsa.key_generation_algorithm(),
            "RSA"
        );
    }

    #[test]
    fn test_key_size_table() {
        assert_eq!(resolve_key_size("ECDSA"), 384);
        assert_eq!(resolve_key_size("ecdsa"), 384);
        assert_eq!(resolve_key_size("RSA"), 2048);
        assert_eq!(resolve_key_size("dsa"), 2048);
        assert_eq!(resolve_key_size("Ed25519"), 0);
        assert_eq!(resolve_key_size(""), 0);
    }
}
