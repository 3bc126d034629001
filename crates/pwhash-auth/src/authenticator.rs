//! Policy-driven password authentication.
//!
//! [`Authenticator`] turns the engine's boolean decision into a [`Verdict`]
//! that also says whether the stored artifact should be replaced, and keeps
//! operational faults on a separate `Err` channel.

use pwhash_core::params::ALGORITHM_MIN_WORK_FACTOR;
use pwhash_core::{
    generate_with, needs_rehash, try_verify_with, HashArtifact, HashError, HashParams, Password,
    RandomSource, WorkFactorLimits,
};

use crate::error::AuthError;
use crate::policy::HashPolicy;

/// Outcome of checking a password against a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Password correct; the artifact matches the current policy.
    Accepted,
    /// Password correct; the artifact uses a lower work factor or another
    /// version tag and should be regenerated while the password is at hand.
    AcceptedNeedsRehash,
    /// Wrong password, or a stored artifact that does not parse.
    Rejected,
}

impl Verdict {
    /// Returns `true` for both accepted variants.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted | Self::AcceptedNeedsRehash)
    }
}

/// Hashes and checks passwords under one [`HashPolicy`].
///
/// Holds no mutable state; share it across threads behind an `Arc`. Every
/// call blocks for `2^work_factor` rounds, so async callers should run it on
/// a blocking pool.
#[derive(Debug)]
pub struct Authenticator<R> {
    params: HashParams,
    // Stored artifacts below the policy floor still verify (and are then
    // rehashed); only the ceiling applies.
    verify_limits: WorkFactorLimits,
    rng: R,
}

impl<R: RandomSource> Authenticator<R> {
    /// Build an authenticator from a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the policy is invalid.
    pub fn new(policy: &HashPolicy, rng: R) -> Result<Self, AuthError> {
        let params = policy.to_params()?;
        Ok(Self {
            verify_limits: WorkFactorLimits {
                min: ALGORITHM_MIN_WORK_FACTOR,
                max: params.limits.max,
            },
            params,
            rng,
        })
    }

    /// Engine parameters derived from the policy.
    #[must_use]
    pub const fn params(&self) -> &HashParams {
        &self.params
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] on entropy or primitive failure.
    pub fn hash(&self, password: &Password) -> Result<HashArtifact, AuthError> {
        Ok(generate_with(password.expose(), &self.rng, &self.params)?)
    }

    /// Check `password` against a stored artifact.
    ///
    /// Malformed artifacts, including ones whose cost lies above the policy
    /// ceiling, are [`Verdict::Rejected`] rather than errors. A correct
    /// password against an artifact below the policy floor is
    /// [`Verdict::AcceptedNeedsRehash`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hash`] only for operational faults
    /// (`InternalFailure`), never for a wrong password.
    pub fn authenticate(&self, password: &Password, stored: &str) -> Result<Verdict, AuthError> {
        match try_verify_with(password.expose(), stored.as_bytes(), &self.verify_limits) {
            Ok(true) if needs_rehash(stored, &self.params) => {
                tracing::debug!("password accepted, stored artifact is stale");
                Ok(Verdict::AcceptedNeedsRehash)
            }
            Ok(true) => Ok(Verdict::Accepted),
            Ok(false) => {
                tracing::debug!("password rejected");
                Ok(Verdict::Rejected)
            }
            Err(HashError::MalformedArtifact(reason)) => {
                tracing::warn!(reason, "stored artifact is malformed, rejecting");
                Ok(Verdict::Rejected)
            }
            Err(e) => {
                tracing::error!(error = %e, "password verification faulted");
                Err(e.into())
            }
        }
    }

    /// Check `password` and, when it is correct but the stored artifact is
    /// stale, return a replacement hashed under the current policy.
    ///
    /// Returns `Ok(None)` for a wrong password or an up-to-date artifact.
    ///
    /// # Errors
    ///
    /// Same as [`Authenticator::authenticate`] and [`Authenticator::hash`].
    pub fn upgrade(
        &self,
        password: &Password,
        stored: &str,
    ) -> Result<Option<HashArtifact>, AuthError> {
        match self.authenticate(password, stored)? {
            Verdict::AcceptedNeedsRehash => {
                let fresh = self.hash(password)?;
                tracing::info!(
                    work_factor = self.params.work_factor,
                    version = %self.params.version,
                    "rehashed stale artifact"
                );
                Ok(Some(fresh))
            }
            Verdict::Accepted | Verdict::Rejected => Ok(None),
        }
    }
}
