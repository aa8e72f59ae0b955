use std::{fmt, str::FromStr};

use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

const SEED_LEN: usize = 32;

/// A 256-bit seed that makes level generation reproducible.
///
/// Displayed and parsed as 64 hexadecimal digits.
///
/// # Examples
///
/// ```
/// use gauntlet_generator::LevelSeed;
///
/// let seed: LevelSeed = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff".parse()?;
/// assert_eq!(seed.as_bytes()[1], 0x11);
/// assert_eq!(seed.to_string().parse::<LevelSeed>()?, seed);
/// # Ok::<(), gauntlet_generator::ParseSeedError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LevelSeed([u8; SEED_LEN]);

impl LevelSeed {
    /// Wraps raw seed bytes.
    #[must_use]
    pub const fn new(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Draws a seed from the thread RNG.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    /// Returns the RNG of one generation iteration.
    ///
    /// The stream is seeded with `SHA-256(seed || iteration)`, so every
    /// iteration is independent of how much randomness earlier ones used.
    pub(crate) fn iteration_rng(&self, iteration: usize) -> Pcg64 {
        let digest = Sha256::new()
            .chain_update(self.0)
            .chain_update((iteration as u64).to_le_bytes())
            .finalize();
        let mut seed = [0; SEED_LEN];
        seed.copy_from_slice(&digest);
        Pcg64::from_seed(seed)
    }
}

impl From<[u8; SEED_LEN]> for LevelSeed {
    fn from(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for LevelSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Errors produced when parsing a [`LevelSeed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    /// The text is not exactly 64 characters long.
    #[display("seed must be 64 hex digits, got {len} characters")]
    InvalidLength {
        /// Character count of the input.
        len: usize,
    },
    /// A character is not a hexadecimal digit.
    #[display("invalid hex digit at index {index}")]
    InvalidDigit {
        /// Character index of the offending digit.
        index: usize,
    },
}

impl FromStr for LevelSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let len = s.chars().count();
        if len != SEED_LEN * 2 {
            return Err(ParseSeedError::InvalidLength { len });
        }

        let digit = |index: usize, c: char| {
            c.to_digit(16)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(ParseSeedError::InvalidDigit { index })
        };
        let mut bytes = [0; SEED_LEN];
        let mut chars = s.chars().enumerate();
        for byte in &mut bytes {
            // Length was checked above, so both digits exist.
            let (Some((i, hi)), Some((j, lo))) = (chars.next(), chars.next()) else {
                return Err(ParseSeedError::InvalidLength { len });
            };
            *byte = (digit(i, hi)? << 4) | digit(j, lo)?;
        }
        Ok(Self(bytes))
    }
}

impl From<LevelSeed> for String {
    fn from(seed: LevelSeed) -> Self {
        seed.to_string()
    }
}

impl TryFrom<String> for LevelSeed {
    type Error = ParseSeedError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
