//! `pwhash-core` — bcrypt password hashing engine.
//!
//! Generates salted, self-describing bcrypt artifacts and verifies candidate
//! passwords against them with a constant-time digest comparison. No
//! internal state: every call owns its buffers and the random source is
//! passed in by the caller.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod rng;

pub mod artifact;
pub mod params;

pub mod hash;

pub use artifact::{ArtifactParts, HashArtifact, HashVersion, ARTIFACT_LEN, SALT_LEN};
pub use error::HashError;
pub use hash::{
    calibrate, generate, generate_with, needs_rehash, try_verify, try_verify_with, verify,
};
pub use memory::{Password, SecretBuffer};
pub use params::{
    HashParams, WorkFactorLimits, DEFAULT_MAX_WORK_FACTOR, DEFAULT_WORK_FACTOR, MIN_WORK_FACTOR,
};
pub use rng::{OsRandom, RandomSource, SharedRng};
