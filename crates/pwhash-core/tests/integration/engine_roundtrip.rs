//! Round-trip, boundary and malformed-input scenarios.

use pwhash_core::{
    generate, try_verify, verify, HashArtifact, HashError, OsRandom, Password, RandomSource,
    ARTIFACT_LEN,
};

/// Checks `^\$2[aby]\$\d{2}\$[./A-Za-z0-9]{53}$`.
fn is_canonical(artifact: &str) -> bool {
    let bytes = artifact.as_bytes();
    bytes.len() == ARTIFACT_LEN
        && bytes[0] == b'$'
        && bytes[1] == b'2'
        && matches!(bytes[2], b'a' | b'b' | b'y')
        && bytes[3] == b'$'
        && bytes[4].is_ascii_digit()
        && bytes[5].is_ascii_digit()
        && bytes[6] == b'$'
        && bytes[7..]
            .iter()
            .all(|&c| c == b'.' || c == b'/' || c.is_ascii_alphanumeric())
}

#[test]
fn correct_horse_scenario() {
    let password = Password::from("correcthorsebatterystaple");
    let artifact = generate(password.expose(), &OsRandom, 10).expect("generate should succeed");

    assert!(is_canonical(artifact.as_str()), "{artifact} is not canonical");
    assert!(artifact.as_str().starts_with("$2b$10$"));
    assert!(verify(password.expose(), &artifact));
    assert!(!verify(b"wrongpassword", &artifact));
}

#[test]
fn boundary_work_factors() {
    for rejected in [3, 19] {
        let err = generate(b"pw", &OsRandom, rejected).unwrap_err();
        assert!(
            matches!(err, HashError::InvalidParameter(_)),
            "work factor {rejected} should be rejected, got {err:?}"
        );
    }
    let artifact = generate(b"pw", &OsRandom, 4).expect("work factor 4 should be accepted");
    assert!(verify(b"pw", &artifact));
}

/// Validation passes at the ceiling: the first failure is the salt draw.
#[test]
fn ceiling_work_factor_passes_validation() {
    struct Exhausted;
    impl RandomSource for Exhausted {
        fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), HashError> {
            Err(HashError::RandomSourceFailure("exhausted".into()))
        }
    }
    let err = generate(b"pw", &Exhausted, 18).unwrap_err();
    assert!(
        matches!(err, HashError::RandomSourceFailure(_)),
        "work factor 18 should pass validation, got {err:?}"
    );
}

/// Work factor 18 takes tens of seconds unoptimized; runs under
/// `cargo test --release`.
#[test]
#[cfg_attr(debug_assertions, ignore = "work factor 18 is slow in debug builds")]
fn ceiling_work_factor_generates_in_release() {
    let artifact = generate(b"pw", &OsRandom, 18).expect("work factor 18 should be accepted");
    assert!(artifact.as_str().starts_with("$2b$18$"));
    assert!(verify(b"pw", &artifact));
}

#[test]
fn nul_bytes_are_part_of_the_key() {
    let artifact = generate(b"\0a", &OsRandom, 4).expect("generate should succeed");
    assert!(verify(b"\0a", &artifact));
    assert!(!verify(b"\0b", &artifact));
    assert!(!verify(b"", &artifact));
}

/// The key is the password plus a terminating NUL, cycled to 72 bytes, so
/// all-NUL keys of different lengths coincide.
#[test]
fn empty_and_single_nul_collide() {
    let artifact = generate(b"", &OsRandom, 4).expect("generate should succeed");
    assert!(verify(b"\0", &artifact));
}

#[test]
fn malformed_artifacts_verify_false() {
    let valid = generate(b"pw", &OsRandom, 4).expect("generate should succeed");
    let text = valid.as_str();

    let truncated = &text[..text.len() - 1];
    let extended = format!("{text}A");
    let no_prefix = &text[1..];
    let lowercase_tag = text.replacen("$2b$", "$2B$", 1);
    let empty_cost = text.replacen("$04$", "$  $", 1);
    let samples: [&[u8]; 12] = [
        b"",
        b"not-a-valid-artifact",
        b"$",
        b"$$$",
        b"$2b$04$",
        truncated.as_bytes(),
        extended.as_bytes(),
        no_prefix.as_bytes(),
        lowercase_tag.as_bytes(),
        empty_cost.as_bytes(),
        &[0xFF; 60],
        &[0u8; 60],
    ];

    for sample in samples {
        assert!(!verify(b"pw", sample));
        assert!(matches!(
            try_verify(b"pw", sample),
            Err(HashError::MalformedArtifact(_))
        ));
    }
}

#[test]
fn stored_artifact_reloads_from_string() {
    let artifact = generate(b"pw", &OsRandom, 4).expect("generate should succeed");
    let stored: String = artifact.clone().into_string();

    let reloaded = HashArtifact::try_from(stored).expect("stored artifact should reload");
    assert_eq!(reloaded, artifact);
    assert!(verify(b"pw", &reloaded));
}

#[test]
fn binary_passwords_roundtrip() {
    let password: Vec<u8> = (1u8..=70).collect();
    let artifact = generate(&password, &OsRandom, 4).expect("generate should succeed");
    assert!(verify(&password, &artifact));
}
