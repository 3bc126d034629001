//! Salt quality across many artifacts.
//!
//! Salts are decoded from generated artifacts and pooled; Shannon entropy of
//! the pool must look like uniform random bytes, and no salt may repeat.

use std::collections::HashSet;

use pwhash_core::{generate, OsRandom};

/// Number of artifacts to generate (4 KiB of pooled salt).
const ARTIFACTS: usize = 256;

/// Shannon entropy of a byte slice (bits per byte).
///
/// H = -Σ p(x) * log2(p(x)) for each byte value x in [0, 255]
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn pooled_salts() -> Vec<[u8; 16]> {
    (0..ARTIFACTS)
        .map(|_| {
            let artifact = generate(b"same password", &OsRandom, 4).expect("generate should succeed");
            *artifact.parts().expect("artifact should parse").salt()
        })
        .collect()
}

/// 4 KiB of uniform bytes has expected entropy ~7.95 bits/byte; 7.8 catches
/// degenerate sources without false positives.
#[test]
fn pooled_salt_entropy() {
    let pool: Vec<u8> = pooled_salts().into_iter().flatten().collect();
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.8, "salt entropy too low: {entropy:.4} (expected > 7.8)");
}

#[test]
fn salts_never_repeat() {
    let salts = pooled_salts();
    let unique: HashSet<_> = salts.iter().collect();
    assert_eq!(unique.len(), salts.len(), "a salt was reused");
}

#[test]
fn entropy_helper_detects_degenerate_input() {
    assert!(shannon_entropy(&[0u8; 4096]) < 0.001);
    let ramp: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    assert!((shannon_entropy(&ramp) - 8.0).abs() < 0.001);
}
