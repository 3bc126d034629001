//! Fuzz target for the bcrypt artifact parser.
//!
//! Feeds arbitrary bytes to `ArtifactParts::parse` and `verify`. Neither may
//! panic.
//!
//! # Usage
//!
//! ```sh
//! # Install cargo-fuzz (requires nightly Rust):
//! cargo +nightly install cargo-fuzz
//!
//! # Run from the pwhash-core crate directory:
//! cd crates/pwhash-core
//! cargo +nightly fuzz run artifact_parse -- -max_len=128
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, regardless of input.
    if let Ok(parts) = pwhash_core::ArtifactParts::parse(data) {
        // Anything that parses must re-encode to a canonical artifact.
        let encoded = parts.encode().expect("parsed parts must re-encode");
        assert_eq!(encoded.len(), pwhash_core::ARTIFACT_LEN);

        // Only hash cheap inputs; higher costs are valid but slow.
        if parts.cost() <= 6 {
            let _ = pwhash_core::verify(b"fuzz", data);
        }
    }
});
