//! Timing side-channel validation for the digest comparison.
//!
//! Uses Welch's t-test to verify that comparing a stored digest against a
//! recomputed one takes the same time whether the first byte differs or the
//! digests are identical. An early-exit comparison would finish measurably
//! sooner on a first-byte mismatch.
//!
//! **Methodology:** simplified dudect-style analysis:
//! 1. Class A: identical digests. Class B: digests differing in byte 0.
//! 2. Time N interleaved iterations of `ArtifactParts::digest_eq` per class.
//! 3. Assert |t| < 4.5 (no detectable timing difference).
//!
//! **Caveat:** This is a statistical test. Scheduler noise can in rare cases
//! push |t| over the threshold.

use std::time::Instant;

use pwhash_core::artifact::DIGEST_LEN;
use pwhash_core::{ArtifactParts, HashVersion, SALT_LEN};

/// Number of timing samples per class.
const SAMPLES: usize = 10_000;

/// Welch's t-test threshold. |t| < 4.5 means no detectable timing difference.
const T_THRESHOLD: f64 = 4.5;

/// Comparisons per sample, so each sample is well above timer resolution.
const BATCH: usize = 64;

#[inline(never)]
fn timed_batch(stored: &ArtifactParts, candidate: &ArtifactParts) -> u128 {
    let start = Instant::now();
    for _ in 0..BATCH {
        std::hint::black_box(std::hint::black_box(stored).digest_eq(std::hint::black_box(candidate)));
    }
    start.elapsed().as_nanos()
}

/// Compute Welch's t-statistic for two independent samples.
///
/// `t = (mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b)`
#[allow(clippy::cast_precision_loss)]
fn welch_t_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;

    let mean_a: f64 = a.iter().sum::<f64>() / n_a;
    let mean_b: f64 = b.iter().sum::<f64>() / n_b;

    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum::<f64>() / (n_a - 1.0);
    let var_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum::<f64>() / (n_b - 1.0);

    let denominator = (var_a / n_a + var_b / n_b).sqrt();
    if denominator == 0.0 {
        return 0.0; // Both distributions are constant.
    }

    (mean_a - mean_b) / denominator
}

/// Trim the slowest 5% of samples (preemptions, page faults).
#[allow(clippy::cast_precision_loss)]
fn trimmed(mut samples: Vec<u128>) -> Vec<f64> {
    samples.sort_unstable();
    let keep = samples.len() * 95 / 100;
    samples.truncate(keep);
    samples.into_iter().map(|s| s as f64).collect()
}

#[test]
fn digest_eq_constant_time_no_timing_leak() {
    let salt = [0x24u8; SALT_LEN];
    let digest = [0x5Au8; DIGEST_LEN];
    let mut first_byte_off = digest;
    first_byte_off[0] ^= 0xFF;

    let stored = ArtifactParts::new(HashVersion::TwoB, 10, salt, digest).expect("valid parts");
    let matching = ArtifactParts::new(HashVersion::TwoB, 10, salt, digest).expect("valid parts");
    let mismatching =
        ArtifactParts::new(HashVersion::TwoB, 10, salt, first_byte_off).expect("valid parts");

    // Warm up caches and branch predictors.
    for _ in 0..1_000 {
        timed_batch(&stored, &matching);
        timed_batch(&stored, &mismatching);
    }

    // Interleave A and B to cancel out drift.
    let mut times_a = Vec::with_capacity(SAMPLES);
    let mut times_b = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        times_a.push(timed_batch(&stored, &matching));
        times_b.push(timed_batch(&stored, &mismatching));
    }

    let t = welch_t_statistic(&trimmed(times_a), &trimmed(times_b));
    let abs_t = t.abs();

    eprintln!(
        "Timing side-channel test: |t| = {abs_t:.2} (threshold: {T_THRESHOLD}), \
         samples = {SAMPLES} per class"
    );

    assert!(
        abs_t < T_THRESHOLD,
        "Timing side-channel detected: |t| = {abs_t:.2} exceeds threshold {T_THRESHOLD}. \
         digest_eq may exit early on the first differing byte."
    );
}

/// Two identical constant distributions should yield t = 0.
#[test]
fn welch_t_test_identical_distributions() {
    let a = vec![1.0; 100];
    let b = vec![1.0; 100];
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() < 0.001, "identical distributions should yield t ≈ 0, got {t}");
}

/// Mean 100 vs mean 200 with low variance should produce |t| >> 4.5.
#[test]
fn welch_t_test_different_distributions() {
    let a: Vec<f64> = (0..1000).map(|i| 100.0 + f64::from(i % 3)).collect();
    let b: Vec<f64> = (0..1000).map(|i| 200.0 + f64::from(i % 3)).collect();
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() > 100.0, "clearly different distributions should yield |t| >> 4.5, got {t:.2}");
}
