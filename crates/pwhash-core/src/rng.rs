//! Random source collaborator for salt generation.
//!
//! The engine never reaches for a global generator: every
//! [`generate`](crate::generate) call receives a [`RandomSource`] reference.

use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::HashError;

/// A source of cryptographically unpredictable bytes.
///
/// Implementations must be shareable across threads: concurrent `generate`
/// calls may draw from the same instance.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with fresh random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::RandomSourceFailure`] if entropy cannot be
    /// produced. A partially filled `dest` must not be used.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), HashError>;

    /// Return `n` fresh random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::RandomSourceFailure`] if entropy cannot be
    /// produced.
    fn next_bytes(&self, n: usize) -> Result<Vec<u8>, HashError> {
        let mut out = vec![0u8; n];
        self.fill_bytes(&mut out)?;
        Ok(out)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &T {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), HashError> {
        (**self).fill_bytes(dest)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for std::sync::Arc<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), HashError> {
        (**self).fill_bytes(dest)
    }
}

/// The operating system CSPRNG (`getrandom` on Unix, `BCryptGenRandom` on
/// Windows). Stateless, so trivially thread-safe.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), HashError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| HashError::RandomSourceFailure(format!("OS CSPRNG fill failed: {e}")))
    }
}

/// Adapter exposing any cryptographic generator as a [`RandomSource`].
///
/// The generator sits behind a `Mutex`, which gives the external
/// synchronization non-thread-safe generators need. Seeded generators make
/// salts reproducible in tests; production callers should use [`OsRandom`].
#[derive(Debug)]
pub struct SharedRng<R> {
    inner: Mutex<R>,
}

impl<R: RngCore + CryptoRng + Send> SharedRng<R> {
    /// Wrap `rng`.
    pub const fn new(rng: R) -> Self {
        Self {
            inner: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> RandomSource for SharedRng<R> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), HashError> {
        let mut rng = self.inner.lock().map_err(|_| {
            HashError::RandomSourceFailure("random generator lock poisoned".into())
        })?;
        rng.try_fill_bytes(dest)
            .map_err(|e| HashError::RandomSourceFailure(format!("generator fill failed: {e}")))
    }
}
