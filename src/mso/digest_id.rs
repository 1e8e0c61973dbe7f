//! Digest ID sequencing.

use crate::mso::DigestId;
use crate::provider::RandomSource;

/// Upper bound (exclusive) of the random starting point.
const START_BOUND: u32 = 1 << 30;

/// Largest step between consecutive IDs.
const MAX_INCREMENT: u32 = 99;

/// Generates digest IDs for the items of one credential.
///
/// IDs start at a random point below 2^30 and advance by a random step of
/// 1 to 99, so they are unique within the credential but carry no
/// information about element position. Use a fresh generator for every
/// credential.
#[derive(Clone, Debug)]
pub struct DigestIdGenerator {
    current: DigestId,
    increment: DigestId,
}

impl DigestIdGenerator {
    /// Seed a generator from `rng`.
    pub fn new(rng: &(impl RandomSource + ?Sized)) -> Self {
        let start = u32_from(&rng.bytes(4)) & (START_BOUND - 1);
        let increment = 1 + u32_from(&rng.bytes(4)) % MAX_INCREMENT;
        Self::with_seed(start, increment)
    }

    /// A generator with a known starting point and step.
    #[must_use]
    pub const fn with_seed(start: DigestId, increment: DigestId) -> Self {
        Self {
            current: start,
            increment,
        }
    }

    /// Advance by the increment and return the new ID.
    pub fn generate(&mut self) -> DigestId {
        self.current += self.increment;
        self.current
    }

    /// The step between consecutive IDs.
    #[must_use]
    pub const fn increment(&self) -> DigestId {
        self.increment
    }
}

fn u32_from(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).fold(0, |acc, b| (acc << 8) | u32::from(*b))
}
