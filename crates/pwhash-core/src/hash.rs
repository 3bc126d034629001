//! bcrypt generate / verify.
//!
//! This module provides:
//! - [`generate`] / [`generate_with`] — salted artifact from a password
//! - [`verify`] — boolean authentication decision
//! - [`try_verify`] / [`try_verify_with`] — same decision with a separate
//!   error channel for malformed artifacts and primitive faults
//! - [`needs_rehash`] — detect artifacts weaker than the current parameters
//! - [`calibrate`] — pick a work factor for a target latency
//!
//! The EksBlowfish cost function itself comes from the `bcrypt` crate; this
//! module owns parameter policy, salt sourcing, the canonical encoding and
//! the constant-time digest comparison.
//!
//! Passwords longer than 72 bytes are truncated by bcrypt: only the first
//! 72 bytes influence the digest.

use std::time::{Duration, Instant};

use crate::artifact::{ArtifactParts, HashArtifact, HashVersion, SALT_LEN};
use crate::error::HashError;
use crate::params::{HashParams, WorkFactorLimits};
use crate::rng::RandomSource;

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

/// Hash `password` with a fresh salt under the `2b` tag and the default
/// `4..=18` work factor limits.
///
/// # Errors
///
/// - [`HashError::InvalidParameter`] if `work_factor` is outside `4..=18`
///   (checked before any randomness is drawn)
/// - [`HashError::RandomSourceFailure`] if the salt cannot be drawn
/// - [`HashError::InternalFailure`] if the bcrypt computation faults
pub fn generate<R>(password: &[u8], rng: &R, work_factor: u32) -> Result<HashArtifact, HashError>
where
    R: RandomSource + ?Sized,
{
    let params = HashParams {
        work_factor,
        ..HashParams::default()
    };
    generate_with(password, rng, &params)
}

/// Hash `password` with a fresh salt under explicit parameters.
///
/// # Errors
///
/// Same as [`generate`], with the range taken from `params.limits`.
pub fn generate_with<R>(
    password: &[u8],
    rng: &R,
    params: &HashParams,
) -> Result<HashArtifact, HashError>
where
    R: RandomSource + ?Sized,
{
    params.validate()?;

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt)?;

    let parts = compute(password, params.version, params.work_factor, salt)?;
    let artifact = parts.encode()?;

    tracing::debug!(
        work_factor = params.work_factor,
        version = %params.version,
        "generated bcrypt artifact"
    );
    Ok(artifact)
}

/// Run bcrypt and decode its output back into parts.
///
/// The crate's formatted output is re-parsed rather than trusted: anything
/// other than an exact canonical artifact carrying the requested cost and
/// salt is an internal failure.
fn compute(
    password: &[u8],
    version: HashVersion,
    cost: u32,
    salt: [u8; SALT_LEN],
) -> Result<ArtifactParts, HashError> {
    let raw = bcrypt::hash_with_salt(password, cost, salt)
        .map_err(|e| HashError::InternalFailure(format!("bcrypt computation failed: {e}")))?;
    let formatted = raw.format_for_version(version.to_bcrypt());

    let parts = ArtifactParts::parse(formatted.as_bytes()).map_err(|e| {
        HashError::InternalFailure(format!("bcrypt output is not canonical: {e}"))
    })?;
    if parts.cost() != cost || parts.salt() != &salt || parts.version() != version {
        return Err(HashError::InternalFailure(
            "bcrypt output does not carry the requested parameters".into(),
        ));
    }
    Ok(parts)
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

/// Check `password` against a stored artifact.
///
/// Returns `true` only when the recomputed digest matches. Malformed,
/// truncated or unrecognized artifacts, and artifacts whose cost exceeds the
/// default ceiling, yield `false`. Never panics on untrusted input.
///
/// Use [`try_verify`] when a primitive fault must be told apart from a
/// wrong password.
#[must_use]
pub fn verify(password: &[u8], artifact: impl AsRef<[u8]>) -> bool {
    match try_verify(password, artifact.as_ref()) {
        Ok(matched) => matched,
        Err(HashError::MalformedArtifact(reason)) => {
            tracing::debug!(reason, "rejecting malformed artifact");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification faulted");
            false
        }
    }
}

/// Check `password` against a stored artifact under the default limits.
///
/// # Errors
///
/// - [`HashError::MalformedArtifact`] if the artifact does not parse or its
///   cost lies outside `4..=18`
/// - [`HashError::InternalFailure`] if the bcrypt computation faults
pub fn try_verify(password: &[u8], artifact: &[u8]) -> Result<bool, HashError> {
    try_verify_with(password, artifact, &WorkFactorLimits::DEFAULT)
}

/// Check `password` against a stored artifact, accepting only costs inside
/// `limits`.
///
/// Artifacts above the ceiling are refused without computing them, so a
/// planted `$2b$31$...` cannot pin a thread for days.
///
/// # Errors
///
/// - [`HashError::InvalidParameter`] if `limits` are invalid
/// - [`HashError::MalformedArtifact`] if the artifact does not parse or its
///   cost lies outside `limits`
/// - [`HashError::InternalFailure`] if the bcrypt computation faults
pub fn try_verify_with(
    password: &[u8],
    artifact: &[u8],
    limits: &WorkFactorLimits,
) -> Result<bool, HashError> {
    limits.validate()?;
    let stored = ArtifactParts::parse(artifact)?;
    if !limits.contains(stored.cost()) {
        return Err(HashError::MalformedArtifact(
            "work factor outside accepted limits",
        ));
    }

    let recomputed = compute(password, stored.version(), stored.cost(), *stored.salt())?;
    Ok(stored.digest_eq(&recomputed))
}

/// Returns `true` when a stored artifact should be replaced by one hashed
/// under `params`: its cost is lower, its version tag differs, or it does
/// not parse at all.
#[must_use]
pub fn needs_rehash(artifact: impl AsRef<[u8]>, params: &HashParams) -> bool {
    ArtifactParts::parse(artifact.as_ref()).map_or(true, |parts| {
        parts.cost() < params.work_factor || parts.version() != params.version
    })
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

const CALIBRATION_PASSWORD: &[u8] = b"calibration_probe";
const CALIBRATION_SALT: [u8; SALT_LEN] = *b"calibration_salt";

/// Benchmark the current hardware and return the smallest work factor whose
/// measured hashing time reaches `target`, capped at `limits.max`.
///
/// Starts at `limits.min` and steps up one work factor at a time, so total
/// running time is roughly twice the returned level's cost.
///
/// # Errors
///
/// - [`HashError::InvalidParameter`] if `limits` are invalid
/// - [`HashError::InternalFailure`] if a trial computation faults
pub fn calibrate(target: Duration, limits: &WorkFactorLimits) -> Result<u32, HashError> {
    limits.validate()?;

    let mut work_factor = limits.min;
    loop {
        let start = Instant::now();
        compute(
            CALIBRATION_PASSWORD,
            HashVersion::default(),
            work_factor,
            CALIBRATION_SALT,
        )?;
        let elapsed = start.elapsed();

        if elapsed >= target || work_factor >= limits.max {
            tracing::debug!(
                work_factor,
                elapsed_ms = elapsed.as_millis(),
                target_ms = target.as_millis(),
                "calibrated bcrypt work factor"
            );
            return Ok(work_factor);
        }
        work_factor = work_factor.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
