//! `pwhash-auth` — policy layer over `pwhash-core`.
//!
//! Loads a persisted [`HashPolicy`], hashes new passwords under it and
//! reports when a stored artifact should be upgraded.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod authenticator;
pub mod error;
pub mod policy;

pub use authenticator::{Authenticator, Verdict};
pub use error::AuthError;
pub use policy::HashPolicy;
