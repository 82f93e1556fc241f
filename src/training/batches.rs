//! Per-epoch shuffled mini-batches.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Splits example indices into shuffled batches, reproducibly per seed.
#[derive(Debug, Clone)]
pub struct BatchSampler {
    batch_size: usize,
    rng: ChaCha8Rng,
}

impl BatchSampler {
    pub fn new(batch_size: usize, seed: u64) -> Self {
        Self {
            batch_size: batch_size.max(1),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One epoch's batches over `0..count`. Every index appears once; the
    /// last batch may be short.
    pub fn epoch(&mut self, count: usize) -> Vec<Vec<u32>> {
        let mut indices: Vec<u32> = (0..count as u32).collect();
        indices.shuffle(&mut self.rng);
        indices
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}
