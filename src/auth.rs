use sha2::{Digest, Sha256};

/// SHA-256 of the plaintext, lowercase hex. Unsalted on purpose: persisted
/// credential files predate this implementation and equal passwords must
/// keep hashing identically.
pub fn hash_password(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    hash_password(plaintext) == digest
}
