//! Content fingerprinting for cache keys.

use sha2::{Digest, Sha256};

/// SHA-256 of the exact fragment bytes, as lowercase hex.
///
/// Identical fragments always produce identical fingerprints; different
/// fragments never share one (cryptographic hash).
pub fn fingerprint(fragment: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fragment.as_bytes());
    hex::encode(hasher.finalize())
}
