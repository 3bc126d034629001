//! Canonical bcrypt artifact encoding.
//!
//! Layout (60 ASCII bytes):
//!
//! ```text
//! $2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW
//! |  |  |                     |
//! |  |  salt (22 chars)       digest (31 chars)
//! |  cost (2 digits)
//! version tag
//! ```
//!
//! Salt and digest use the bcrypt radix-64 alphabet `./A-Za-z0-9` with
//! standard (most-significant first) bit order and no padding.

use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use data_encoding::{Encoding, Specification, SpecificationError};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::HashError;
use crate::params::{ALGORITHM_MAX_WORK_FACTOR, ALGORITHM_MIN_WORK_FACTOR};

/// Raw salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Stored digest length in bytes. bcrypt produces 24 bytes; the canonical
/// format keeps the first 23.
pub const DIGEST_LEN: usize = 23;

/// Encoded salt length in characters.
pub const ENCODED_SALT_LEN: usize = 22;

/// Encoded digest length in characters.
pub const ENCODED_DIGEST_LEN: usize = 31;

/// Total artifact length in bytes.
pub const ARTIFACT_LEN: usize = 7 + ENCODED_SALT_LEN + ENCODED_DIGEST_LEN;

const RADIX64_SYMBOLS: &str = "./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const SALT_START: usize = 7;
const DIGEST_START: usize = SALT_START + ENCODED_SALT_LEN;

fn radix64_encoding(check_trailing_bits: bool) -> Result<Encoding, SpecificationError> {
    let mut spec = Specification::new();
    spec.symbols.push_str(RADIX64_SYMBOLS);
    spec.check_trailing_bits = check_trailing_bits;
    spec.encoding()
}

// Digests must be canonical: non-zero trailing bits in the last character
// would let several strings verify for one password.
static RADIX64: LazyLock<Result<Encoding, SpecificationError>> =
    LazyLock::new(|| radix64_encoding(true));

// Stored artifacts from other implementations may carry non-zero trailing
// bits in the final salt character; those bits are ignored on decode.
static RADIX64_SALT: LazyLock<Result<Encoding, SpecificationError>> =
    LazyLock::new(|| radix64_encoding(false));

fn radix64() -> Result<&'static Encoding, HashError> {
    resolve(&RADIX64)
}

fn radix64_salt() -> Result<&'static Encoding, HashError> {
    resolve(&RADIX64_SALT)
}

fn resolve(
    encoding: &'static LazyLock<Result<Encoding, SpecificationError>>,
) -> Result<&'static Encoding, HashError> {
    encoding
        .as_ref()
        .map_err(|e| HashError::InternalFailure(format!("radix-64 alphabet rejected: {e}")))
}

/// Constant-time byte comparison.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// Uses bitwise OR accumulation so the loop never exits early on the first
/// differing byte. The length check may short-circuit: digest length is
/// fixed by the format and carries no secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}

// ---------------------------------------------------------------------------
// Version tag
// ---------------------------------------------------------------------------

/// bcrypt format revision written into the artifact prefix.
///
/// All three compute identical digests for passwords under 255 bytes; the
/// tag exists for interoperability with systems that expect a particular
/// prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashVersion {
    /// `$2a$` — original OpenBSD revision with UTF-8 and NUL terminator.
    #[serde(rename = "2a")]
    TwoA,
    /// `$2b$` — current OpenBSD revision (length wraparound fix).
    #[default]
    #[serde(rename = "2b")]
    TwoB,
    /// `$2y$` — crypt_blowfish revision, computationally equal to `2b`.
    #[serde(rename = "2y")]
    TwoY,
}

impl HashVersion {
    /// Two-character tag as written between the first two `$`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::TwoA => "2a",
            Self::TwoB => "2b",
            Self::TwoY => "2y",
        }
    }

    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"2a" => Some(Self::TwoA),
            b"2b" => Some(Self::TwoB),
            b"2y" => Some(Self::TwoY),
            _ => None,
        }
    }

    pub(crate) const fn to_bcrypt(self) -> bcrypt::Version {
        match self {
            Self::TwoA => bcrypt::Version::TwoA,
            Self::TwoB => bcrypt::Version::TwoB,
            Self::TwoY => bcrypt::Version::TwoY,
        }
    }
}

impl fmt::Display for HashVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Parsed artifact
// ---------------------------------------------------------------------------

/// The decoded fields of an artifact.
///
/// The digest is wiped when the value is dropped. `Debug` never prints the
/// salt or digest.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ArtifactParts {
    #[zeroize(skip)]
    version: HashVersion,
    #[zeroize(skip)]
    cost: u32,
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl ArtifactParts {
    /// Assemble parts from raw fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InvalidParameter`] if `cost` cannot be written
    /// as a bcrypt cost (outside `4..=31`).
    pub fn new(
        version: HashVersion,
        cost: u32,
        salt: [u8; SALT_LEN],
        digest: [u8; DIGEST_LEN],
    ) -> Result<Self, HashError> {
        if !(ALGORITHM_MIN_WORK_FACTOR..=ALGORITHM_MAX_WORK_FACTOR).contains(&cost) {
            return Err(HashError::InvalidParameter(format!(
                "bcrypt cost {cost} outside {}..={}",
                ALGORITHM_MIN_WORK_FACTOR,
                ALGORITHM_MAX_WORK_FACTOR
            )));
        }
        Ok(Self {
            version,
            cost,
            salt,
            digest,
        })
    }

    /// Parse an artifact. Accepts exactly the canonical 60-byte layout.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::MalformedArtifact`] with a static reason. The
    /// reason never includes input bytes.
    pub fn parse(input: &[u8]) -> Result<Self, HashError> {
        if input.len() != ARTIFACT_LEN {
            return Err(HashError::MalformedArtifact("unexpected length"));
        }
        if input[0] != b'$' || input[3] != b'$' || input[6] != b'$' {
            return Err(HashError::MalformedArtifact("missing field delimiter"));
        }
        let version = HashVersion::from_tag(&input[1..3])
            .ok_or(HashError::MalformedArtifact("unrecognized version tag"))?;

        let cost_field = &input[4..6];
        if !cost_field.iter().all(u8::is_ascii_digit) {
            return Err(HashError::MalformedArtifact("cost is not two decimal digits"));
        }
        let cost = std::str::from_utf8(cost_field)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or(HashError::MalformedArtifact("cost is not two decimal digits"))?;
        if !(ALGORITHM_MIN_WORK_FACTOR..=ALGORITHM_MAX_WORK_FACTOR).contains(&cost) {
            return Err(HashError::MalformedArtifact("cost outside bcrypt range"));
        }

        let mut salt = [0u8; SALT_LEN];
        decode_into(radix64_salt()?, &input[SALT_START..DIGEST_START], &mut salt)
            .map_err(|()| HashError::MalformedArtifact("invalid radix-64 salt"))?;
        let mut digest = [0u8; DIGEST_LEN];
        decode_into(radix64()?, &input[DIGEST_START..], &mut digest)
            .map_err(|()| HashError::MalformedArtifact("invalid radix-64 digest"))?;

        Ok(Self {
            version,
            cost,
            salt,
            digest,
        })
    }

    /// Encode into the canonical textual form.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::InternalFailure`] if the encoded length differs
    /// from [`ARTIFACT_LEN`].
    pub fn encode(&self) -> Result<HashArtifact, HashError> {
        let encoding = radix64()?;
        let mut out = String::with_capacity(ARTIFACT_LEN);
        out.push('$');
        out.push_str(self.version.tag());
        out.push('$');
        write!(out, "{:02}$", self.cost)
            .map_err(|e| HashError::InternalFailure(format!("cost formatting failed: {e}")))?;
        encoding.encode_append(&self.salt, &mut out);
        encoding.encode_append(&self.digest, &mut out);

        if out.len() != ARTIFACT_LEN {
            return Err(HashError::InternalFailure(format!(
                "encoded artifact is {} bytes (expected {ARTIFACT_LEN})",
                out.len()
            )));
        }
        Ok(HashArtifact(out))
    }

    /// Version tag.
    #[must_use]
    pub const fn version(&self) -> HashVersion {
        self.version
    }

    /// Work factor (log2 of the round count).
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Raw 16-byte salt.
    #[must_use]
    pub const fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Compare digests in constant time. Version, cost and salt are not
    /// compared.
    #[must_use]
    pub fn digest_eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.digest, &other.digest)
    }
}

impl fmt::Debug for ArtifactParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactParts")
            .field("version", &self.version)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

fn decode_into(encoding: &Encoding, input: &[u8], out: &mut [u8]) -> Result<(), ()> {
    match encoding.decode_len(input.len()) {
        Ok(len) if len == out.len() => {}
        _ => return Err(()),
    }
    match encoding.decode_mut(input, out) {
        Ok(written) if written == out.len() => Ok(()),
        _ => Err(()),
    }
}

// ---------------------------------------------------------------------------
// Opaque artifact
// ---------------------------------------------------------------------------

/// A self-describing password hash, ready to persist.
///
/// Always holds a canonical 60-byte artifact: values come from
/// [`generate`](crate::generate) or from a validated `TryFrom<String>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashArtifact(String);

impl HashArtifact {
    /// Textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte form, as stored.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the embedded fields.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::MalformedArtifact`] if the value no longer parses.
    pub fn parts(&self) -> Result<ArtifactParts, HashError> {
        ArtifactParts::parse(self.as_bytes())
    }

    /// Consume into the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for HashArtifact {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ArtifactParts::parse(value.as_bytes())?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for HashArtifact {
    type Error = HashError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<HashArtifact> for String {
    fn from(value: HashArtifact) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for HashArtifact {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for HashArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
