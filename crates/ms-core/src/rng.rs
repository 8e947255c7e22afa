//! Deterministic RNG for consensus batch sampling.
//!
//! The consensus stage samples which unresolved (and which already-resolved)
//! edges go into each oracle batch.  Seeding from the pipeline configuration
//! makes the set of oracle requests (and therefore the cache hits on a
//! repeat run) reproducible.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded sampler used by the consensus resolver.
///
/// Used only from the pipeline driver thread; worker threads never sample.
pub struct BatchRng(SmallRng);

impl BatchRng {
    pub fn new(seed: u64) -> Self {
        BatchRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample `amount` distinct elements (fewer if `items` is shorter),
    /// without replacement.
    pub fn sample<T: Copy>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        items.choose_multiple(&mut self.0, amount).copied().collect()
    }
}
