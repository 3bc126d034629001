//! Work factor limits and hashing parameters.
//!
//! The work factor is log2 of the bcrypt round count: every increment
//! doubles the cost of both hashing and verification.

use serde::{Deserialize, Serialize};

use crate::artifact::HashVersion;
use crate::error::HashError;

/// Smallest cost bcrypt accepts.
pub const ALGORITHM_MIN_WORK_FACTOR: u32 = 4;

/// Largest cost the bcrypt format can express.
pub const ALGORITHM_MAX_WORK_FACTOR: u32 = 31;

/// Policy floor. Weak, but accepted.
pub const MIN_WORK_FACTOR: u32 = 4;

/// Default policy ceiling. Above this a single call takes several seconds
/// on current hardware.
pub const DEFAULT_MAX_WORK_FACTOR: u32 = 18;

/// Work factor used when none is configured.
pub const DEFAULT_WORK_FACTOR: u32 = 12;

/// Inclusive range of accepted work factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFactorLimits {
    /// Lowest accepted work factor.
    pub min: u32,
    /// Highest accepted work factor (the configurable ceiling).
    pub max: u32,
}

impl WorkFactorLimits {
    /// `4..=18`.
    pub const DEFAULT: Self = Self {
        min: MIN_WORK_FACTOR,
        max: DEFAULT_MAX_WORK_FACTOR,
    };

    /// Build validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] unless
    /// `4 <= min <= max <= 31`.
    pub fn new(min: u32, max: u32) -> Result<Self, HashError> {
        let limits = Self { min, max };
        limits.validate()?;
        Ok(limits)
    }

    /// Check that the limits themselves are expressible in bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] unless
    /// `4 <= min <= max <= 31`.
    pub fn validate(&self) -> Result<(), HashError> {
        if self.min < ALGORITHM_MIN_WORK_FACTOR
            || self.max > ALGORITHM_MAX_WORK_FACTOR
            || self.min > self.max
        {
            return Err(HashError::InvalidParameter(format!(
                "work factor limits {}..={} must lie within \
                 {ALGORITHM_MIN_WORK_FACTOR}..={ALGORITHM_MAX_WORK_FACTOR}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Returns `true` if `work_factor` lies within the limits.
    #[must_use]
    pub const fn contains(&self, work_factor: u32) -> bool {
        work_factor >= self.min && work_factor <= self.max
    }

    /// Reject `work_factor` unless it lies within the limits.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] for an out-of-range value.
    pub fn check(&self, work_factor: u32) -> Result<u32, HashError> {
        if !self.contains(work_factor) {
            return Err(HashError::InvalidParameter(format!(
                "work factor {work_factor} outside {}..={}",
                self.min, self.max
            )));
        }
        Ok(work_factor)
    }
}

impl Default for WorkFactorLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything `generate_with` needs besides the password and the random
/// source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// log2 of the round count.
    pub work_factor: u32,
    /// Version tag written into new artifacts.
    pub version: HashVersion,
    /// Accepted work factor range.
    pub limits: WorkFactorLimits,
}

impl HashParams {
    /// Parameters with the given work factor, the `2b` tag and default
    /// limits.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] if `work_factor` is outside
    /// `4..=18`.
    pub fn new(work_factor: u32) -> Result<Self, HashError> {
        let params = Self {
            work_factor,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate limits, then the work factor against them.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] on either failure.
    pub fn validate(&self) -> Result<(), HashError> {
        self.limits.validate()?;
        self.limits.check(self.work_factor)?;
        Ok(())
    }
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            version: HashVersion::default(),
            limits: WorkFactorLimits::DEFAULT,
        }
    }
}
