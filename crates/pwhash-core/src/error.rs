//! Error types for `pwhash-core`.

use thiserror::Error;

/// Errors produced by password hashing operations.
///
/// Messages never contain password bytes, salts, digests or the raw
/// artifact text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// Work factor or work factor limits outside the supported range.
    /// Always a caller bug; never retried automatically.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The random source could not produce salt material. Callers may retry
    /// the whole call but must not fall back to a weaker salt.
    #[error("random source failure: {0}")]
    RandomSourceFailure(String),

    /// The stored artifact does not parse as a recognized bcrypt artifact.
    #[error("malformed artifact: {0}")]
    MalformedArtifact(&'static str),

    /// The underlying bcrypt computation faulted or produced output that
    /// does not match the canonical format.
    #[error("internal failure: {0}")]
    InternalFailure(String),
}
