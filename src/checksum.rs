//! Archive verifier (design spec §4.H): SHA-256 over a byte string.

use sha2::{Digest, Sha256};

/// Compute the lower-case hexadecimal SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
