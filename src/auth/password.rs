use sha2::{Digest, Sha256};
use uuid::Uuid;

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hex-encoded SHA-256 of `salt || password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    hash_password(salt, password) == expected_hash
}
