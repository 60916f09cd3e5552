//! Deterministic random streams for round instances.
//!
//! Every round instance draws from one logical stream for its whole lifetime.
//! Streams are derived from a user-visible seed with HMAC domain separation so
//! that sibling instances sharing a seed never share draws.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

use crate::constants::RNG_DOMAIN_ROUND;

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

/// Random stream owned by a single round instance.
pub type RoundRng = CountingRng<SmallRng>;

impl CountingRng<SmallRng> {
    /// Stream for the round instance `index` under a user-visible seed.
    #[must_use]
    pub fn for_round(user_seed: u64, index: u32) -> Self {
        let mut tag = Vec::with_capacity(RNG_DOMAIN_ROUND.len() + 4);
        tag.extend_from_slice(RNG_DOMAIN_ROUND);
        tag.extend_from_slice(&index.to_le_bytes());
        Self::new(derive_stream_seed(user_seed, &tag))
    }

    /// Stream for the first round instance under a user-visible seed.
    #[must_use]
    pub fn from_user_seed(user_seed: u64) -> Self {
        Self::for_round(user_seed, 0)
    }

    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
