//! Content-hash seeds for call-scoped random generators.
//!
//! Every random draw in the pipeline comes from a [`ChaCha8Rng`] built fresh
//! from the hash of some content. No generator outlives the call that made it.
//! The algorithm is fixed, so a seed yields the same stream on every platform
//! and `rand` release.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// First eight bytes of the SHA-256 of `text`, big-endian.
#[must_use]
pub fn content_seed(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// A generator seeded from `text`. Same text, same stream.
#[must_use]
pub fn seeded_rng(text: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(content_seed(text))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, RngCore};

    use super::*;

    #[test]
    fn seed_is_stable() {
        assert_eq!(content_seed("Mini Projector"), content_seed("Mini Projector"));
        assert_ne!(content_seed("Mini Projector"), content_seed("mini projector"));
    }

    #[test]
    fn seeded_streams_repeat() {
        let mut a = seeded_rng("electronics:3");
        let mut b = seeded_rng("electronics:3");
        let xs: Vec<u32> = (0..8).map(|_| a.random()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn stream_matches_recorded_values() {
        assert_eq!(content_seed("Mini Projector"), 8_904_816_398_346_438_999);

        let mut rng = seeded_rng("Mini Projector");
        let words: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert_eq!(words, [478_719_115, 3_379_018_144, 670_434_746, 3_166_789_579]);
    }
}
