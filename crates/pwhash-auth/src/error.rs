//! Authentication error types for `pwhash-auth`.

use pwhash_core::HashError;
use thiserror::Error;

/// Errors produced by the authentication layer.
///
/// A wrong password is never an error: it is [`Verdict::Rejected`].
///
/// [`Verdict::Rejected`]: crate::Verdict::Rejected
#[derive(Debug, Error)]
pub enum AuthError {
    /// Hashing engine failure (delegated from pwhash-core). Operational:
    /// bad parameters, entropy failure, or a faulting primitive.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The hash policy file or values are invalid.
    #[error("invalid hash policy: {0}")]
    Config(String),

    /// I/O error reading or writing the policy file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
