use sha2::{Digest, Sha256};

/// Hex SHA-256 of raw image bytes, stored in `clip_image.value_hash`.
pub fn image_value_hash(value: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value);
    format!("{:x}", hasher.finalize())
}
