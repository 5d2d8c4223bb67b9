//! Derived artifact names and store credentials.

use rand::Rng;
use uuid::Uuid;

use super::container::StoreFileType;

/// Base-12 digit set used for generated store passwords.
const PASSWORD_ALPHABET: &[u8; 12] = b"0123456789ab";

/// Number of base-12 digits in a generated password.
const PASSWORD_LEN: u32 = 10;

/// Keystore file name derived from the tenant domain.
///
/// Dots are replaced with dashes and the extension registered for the
/// container format is appended, e.g. `example.com` → `example-com.p12`.
pub fn keystore_file_name(tenant_domain: &str, file_type: StoreFileType) -> String {
    let name = tenant_domain.trim().replace('.', "-");
    format!("{}{}", name, file_type.extension())
}

/// Random appender disambiguating the public certificate resource name,
/// e.g. `example-com-343743.cert`.
///
/// Five characters near the tail of a fresh UUID; human-scannable
/// disambiguation only, carries no security value.
pub fn pub_key_file_name_appender() -> String {
    let uuid = Uuid::new_v4().to_string();
    uuid[uuid.len() - 6..uuid.len() - 1].to_string()
}

/// Random password protecting a generated store.
///
/// The low ten base-12 digits of a 130-bit integer drawn from a
/// cryptographically secure source. Regenerated for every store, never
/// cached or reused across tenants.
pub fn generate_password() -> String {
    let random: u128 = rand::thread_rng().gen();
    // Tail-truncating the base-12 rendering keeps exactly the value
    // modulo 12^10.
    let mut remainder = random % 12u128.pow(PASSWORD_LEN);
    let mut digits = [0u8; PASSWORD_LEN as usize];
    for slot in digits.iter_mut().rev() {
        *slot = PASSWORD_ALPHABET[(remainder % 12) as usize];
        remainder /= 12;
    }
    String::from_utf8(digits.to_vec()).expect("base-12 alphabet is ASCII")
}
