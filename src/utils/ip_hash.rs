//! Caller identity anonymization.

use sha2::{Digest, Sha256};

/// Hashes a caller IP into an opaque, stable identity.
///
/// The result is `hex(sha256(salt || ip))`. A missing or blank IP yields an
/// empty identity so that "unknown caller" never collides with a real one.
pub fn anonymize_ip(ip: Option<&str>, salt: &str) -> String {
    let Some(ip) = ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
        return String::new();
    };

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}
