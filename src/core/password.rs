//! Password hashing

use bcrypt::BcryptError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;

// Minimum bcrypt cost, unit tests only
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Hash a plaintext password with a fresh salt
pub fn hash_password(plain: &str) -> Result<String, BcryptError> {
    bcrypt::hash(plain, HASH_COST)
}

/// Check a plaintext password against a stored hash
///
/// A malformed stored hash is treated as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("S3cret", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("password", "not-a-hash"));
    }
}
