//! SHA-256 checksum utility for script auditing.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of raw script bytes
pub fn compute_checksum(bytes: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().to_vec()
}

/// Render a checksum as lowercase hex
pub fn checksum_hex(checksum: &[u8]) -> String {
    hex::encode(checksum)
}
