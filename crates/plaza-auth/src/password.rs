//! Salted password hashing.
//!
//! Stored form is `base64(salt)$base64(sha256(salt || password))`. The salt
//! is 16 random bytes per account, so identical passwords never share a
//! stored hash.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    format!(
        "{}${}",
        B64.encode(salt),
        B64.encode(digest(&salt, password))
    )
}

/// Check a password against a stored hash.
///
/// Returns `false` for malformed stored values rather than erroring; a
/// corrupt hash means the login fails, same as a wrong password.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = B64.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = B64.decode(hash_b64) else {
        return false;
    };
    let actual = digest(&salt, password);
    // Fixed-time comparison over the full digest.
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(&expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
