//! Hash policy — stored as plain JSON next to the credential store.
//!
//! Holds the work factor new artifacts are generated with, the accepted
//! work factor range, and the version tag. Not secret.

use std::fs;
use std::io;
use std::path::Path;

use pwhash_core::{
    HashParams, HashVersion, WorkFactorLimits, DEFAULT_MAX_WORK_FACTOR, DEFAULT_WORK_FACTOR,
    MIN_WORK_FACTOR,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

// ── Policy ─────────────────────────────────────────────────────────

/// Password hashing policy.
///
/// Persisted to `{data_dir}/hash_policy.json`. All fields have defaults,
/// so a partial file only overrides what it names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HashPolicy {
    /// Work factor for newly generated artifacts.
    #[serde(default = "default_work_factor")]
    pub work_factor: u32,

    /// Lowest work factor accepted.
    #[serde(default = "default_min_work_factor")]
    pub min_work_factor: u32,

    /// Highest work factor accepted, for new artifacts and for stored ones
    /// being verified.
    #[serde(default = "default_max_work_factor")]
    pub max_work_factor: u32,

    /// Version tag for new artifacts: `"2a"`, `"2b"` or `"2y"`.
    #[serde(default)]
    pub version: HashVersion,
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self {
            work_factor: default_work_factor(),
            min_work_factor: default_min_work_factor(),
            max_work_factor: default_max_work_factor(),
            version: HashVersion::default(),
        }
    }
}

const fn default_work_factor() -> u32 {
    DEFAULT_WORK_FACTOR
}
const fn default_min_work_factor() -> u32 {
    MIN_WORK_FACTOR
}
const fn default_max_work_factor() -> u32 {
    DEFAULT_MAX_WORK_FACTOR
}

impl HashPolicy {
    /// Convert into engine parameters, validating every field.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the limits are not within `4..=31`,
    /// are inverted, or do not contain `work_factor`.
    pub fn to_params(&self) -> Result<HashParams, AuthError> {
        let limits = WorkFactorLimits::new(self.min_work_factor, self.max_work_factor)
            .map_err(|e| AuthError::Config(e.to_string()))?;
        let params = HashParams {
            work_factor: self.work_factor,
            version: self.version,
            limits,
        };
        params
            .validate()
            .map_err(|e| AuthError::Config(e.to_string()))?;
        Ok(params)
    }

    /// Validate without converting.
    ///
    /// # Errors
    ///
    /// Same as [`HashPolicy::to_params`].
    pub fn validate(&self) -> Result<(), AuthError> {
        self.to_params().map(|_| ())
    }
}

// ── File I/O ───────────────────────────────────────────────────────

const POLICY_FILE: &str = "hash_policy.json";

impl HashPolicy {
    /// Load the policy from `{data_dir}/hash_policy.json`.
    ///
    /// A missing file yields [`Default::default()`]. Unlike cosmetic
    /// preferences, a corrupt or out-of-range policy is an error: silently
    /// falling back could lower the work factor.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Io`] if the file exists but cannot be read
    /// - [`AuthError::Config`] if the JSON is invalid or fails validation
    pub fn load(data_dir: &Path) -> Result<Self, AuthError> {
        let path = data_dir.join(POLICY_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no hash policy file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let policy: Self = serde_json::from_str(&contents)
            .map_err(|e| AuthError::Config(format!("{POLICY_FILE}: {e}")))?;
        policy.validate()?;
        tracing::debug!(
            work_factor = policy.work_factor,
            max_work_factor = policy.max_work_factor,
            version = %policy.version,
            "loaded hash policy"
        );
        Ok(policy)
    }

    /// Persist the policy to `{data_dir}/hash_policy.json`.
    ///
    /// Uses an atomic write pattern (write to `.tmp`, then rename) to
    /// prevent corruption from partial writes or crashes.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Config`] if the policy fails validation
    /// - [`AuthError::Io`] if the directory does not exist or the file
    ///   system rejects the write/rename
    pub fn save(&self, data_dir: &Path) -> Result<(), AuthError> {
        self.validate()?;

        let path = data_dir.join(POLICY_FILE);
        let tmp = data_dir.join(".hash_policy.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;

        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
