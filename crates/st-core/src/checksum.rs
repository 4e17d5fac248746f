//! SHA-256 checksum utility for script drift detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of raw script bytes as lowercase hex
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}
