//! Password hashing.
//!
//! Argon2 is CPU-bound, so async callers go through [`hash_blocking`] and
//! [`verify_blocking`], which run the hasher on tokio's blocking pool.

use crate::error::{AuthError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use std::sync::Arc;

/// Hashes and checks passwords.
pub trait PasswordHasher: Send + Sync {
    /// PHC-format hash of `password` with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] if the hasher fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Create a hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hashing(e.to_string()))?;
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// [`PasswordHasher::hash`] off the async executor.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] if the hasher or its task fails.
pub async fn hash_blocking(hasher: &Arc<dyn PasswordHasher>, password: &str) -> Result<String> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AuthError::Hashing(format!("Hashing task failed: {e}")))?
}

/// [`PasswordHasher::verify`] off the async executor.
///
/// # Errors
///
/// Returns [`AuthError::Hashing`] if the task fails.
pub async fn verify_blocking(
    hasher: &Arc<dyn PasswordHasher>,
    password: &str,
    hash: &str,
) -> Result<bool> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(format!("Verification task failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    /// Records the threads it runs on.
    #[derive(Default)]
    struct ThreadRecorder {
        inner: Argon2Hasher,
        threads: Mutex<Vec<ThreadId>>,
    }

    impl PasswordHasher for ThreadRecorder {
        fn hash(&self, password: &str) -> Result<String> {
            self.threads.lock().unwrap().push(thread::current().id());
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            self.threads.lock().unwrap().push(thread::current().id());
            self.inner.verify(password, hash)
        }
    }

    #[tokio::test]
    async fn async_helpers_run_off_the_calling_thread() {
        let recorder = Arc::new(ThreadRecorder::default());
        let hasher: Arc<dyn PasswordHasher> = recorder.clone();

        let hash = hash_blocking(&hasher, "correct horse").await.unwrap();
        assert!(verify_blocking(&hasher, "correct horse", &hash).await.unwrap());
        assert!(!verify_blocking(&hasher, "battery staple", &hash).await.unwrap());

        let caller = thread::current().id();
        let threads = recorder.threads.lock().unwrap();
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|id| *id != caller));
    }

    #[test]
    fn hash_verifies_and_is_salted() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("correct horse", &first));
        assert!(!hasher.verify("battery staple", &first));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!Argon2Hasher::new().verify("anything", "not-a-hash"));
    }
}
