//! Credential hashing
//!
//! A stored credential is the hex SHA-256 of `login:password:secret`, so a
//! hash is bound to the login it was created for.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a password for storage.
pub fn hash_password(login: &str, password: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(login.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored hash in constant time.
pub fn verify_password(login: &str, password: &str, secret: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(login, password, secret);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_password("ada", "pw", "secret");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        let mut hasher = Sha256::new();
        hasher.update(b"ada:pw:secret");
        assert_eq!(hash, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_verify() {
        let stored = hash_password("ada", "pw", "secret");
        assert!(verify_password("ada", "pw", "secret", &stored));
        assert!(!verify_password("ada", "wrong", "secret", &stored));
        assert!(!verify_password("bob", "pw", "secret", &stored));
        assert!(!verify_password("ada", "pw", "other", &stored));
        assert!(!verify_password("ada", "pw", "secret", ""));
    }
}
