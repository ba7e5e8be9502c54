//! Bounded worker pool for Argon2 password hashing.
//!
//! Hashing is CPU-bound, so every computation runs on tokio's blocking
//! threads. A semaphore caps how many run at once so a burst of logins
//! cannot starve the rest of the process.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

use crate::error::AppError;

#[derive(Clone)]
pub struct HashPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl HashPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of hash computations that could start right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Returns `Ok(false)` on a mismatch. Malformed hashes and worker
    /// failures are errors.
    pub async fn verify(&self, hash: &str, password: &str) -> Result<bool, AppError> {
        let hash = hash.to_owned();
        let password = password.to_owned();
        self.run(move || verify_blocking(&hash, &password)).await
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        self.run(move || hash_blocking(&password)).await
    }

    async fn run<T, F>(&self, job: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        // The permit travels with the job so a cancelled caller cannot free
        // a slot while its hash is still running.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::InternalError(format!("hash pool closed: {}", e)))?;

        tokio::task::spawn_blocking(move || {
            let result = job();
            drop(permit);
            result
        })
        .await
        .map_err(|e| {
            error!("Hash worker failed: {}", e);
            AppError::InternalError(format!("hash worker failed: {}", e))
        })?
    }
}

fn verify_blocking(hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::CryptoError(format!("malformed password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::CryptoError(e.to_string())),
    }
}

fn hash_blocking(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AppError::CryptoError(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::CryptoError(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::CryptoError(e.to_string()))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let pool = HashPool::new(2);
        let hash = tokio_test::assert_ok!(pool.hash("hunter2").await);

        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("hunter2"));
        assert!(pool.verify(&hash, "hunter2").await.unwrap());
        assert!(!pool.verify(&hash, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_error() {
        let pool = HashPool::new(1);
        let err = tokio_test::assert_err!(pool.verify("not-a-phc-string", "hunter2").await);
        assert!(matches!(err, AppError::CryptoError(_)));
    }

    #[tokio::test]
    async fn test_cancelled_callers_keep_bound() {
        let pool = HashPool::new(1);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let callers: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                let running = running.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let job = move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(StdDuration::from_millis(200));
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    };
                    let _ = tokio::time::timeout(StdDuration::from_millis(20), pool.run(job)).await;
                })
            })
            .collect();

        for caller in callers {
            caller.await.unwrap();
        }

        // Wait for the job that did start to hand its permit back.
        for _ in 0..100 {
            if pool.available() == 1 {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }

        assert_eq!(pool.available(), 1);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permits_released() {
        let pool = HashPool::new(0);
        assert_eq!(pool.size(), 1);

        let _ = pool.verify("garbage", "x").await;
        assert_eq!(pool.available(), 1);
    }
}
