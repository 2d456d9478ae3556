// Password hashing and verification

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Bcrypt ignores input past 72 bytes, so longer passwords are refused up front.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("hashing task failed: {0}")]
    TaskJoin(String),
}

/// Salted bcrypt hashing. Work runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Verified against when a login names an unknown account, so both branches do the
    // same amount of work.
    decoy: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    /// Hash `plaintext` with a fresh random salt embedded in the output.
    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let plaintext = plaintext.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            bcrypt::hash(plaintext, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| PasswordError::TaskJoin(e.to_string()))?
    }

    /// Check `plaintext` against a stored hash. Fails closed: a malformed hash or a
    /// hashing fault is reported as a mismatch.
    pub async fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let plaintext = plaintext.to_string();
        let stored_hash = stored_hash.to_string();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &stored_hash)).await;

        match outcome {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                tracing::warn!("Stored password hash could not be checked: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// Burn one verification's worth of work against a throwaway hash. Always `false`.
    pub async fn verify_decoy(&self, plaintext: &str) -> bool {
        let decoy = self
            .decoy
            .get_or_try_init(|| async { self.hash("decoy-password-never-matches").await })
            .await;

        match decoy {
            Ok(hash) => {
                let _ = self.verify(plaintext, hash).await;
            }
            Err(e) => tracing::error!("Could not prepare decoy hash: {}", e),
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[tokio::test]
    async fn hash_then_verify_matches() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").await.unwrap();
        assert!(hash.starts_with("$2"), "expected a bcrypt hash, got {}", hash);
        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1", &hash).await);
    }

    #[tokio::test]
    async fn other_passwords_do_not_verify() {
        let hasher = hasher();
        let hash = hasher.hash("secret1").await.unwrap();
        assert!(!hasher.verify("secret2", &hash).await);
        assert!(!hasher.verify("", &hash).await);
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = hasher();
        let a = hasher.hash("secret1").await.unwrap();
        let b = hasher.hash("secret1").await.unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("secret1", &a).await);
        assert!(hasher.verify("secret1", &b).await);
    }

    #[tokio::test]
    async fn malformed_stored_hash_fails_closed() {
        let hasher = hasher();
        assert!(!hasher.verify("secret1", "not-a-bcrypt-hash").await);
        assert!(!hasher.verify("secret1", "").await);
    }

    #[tokio::test]
    async fn decoy_never_matches() {
        let hasher = hasher();
        assert!(!hasher.verify_decoy("anything").await);
        assert!(hasher.decoy.get().is_some());
    }
}
