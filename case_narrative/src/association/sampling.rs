//! Random source for candidate sampling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Uniform index source. Injected so tests can script exact picks.
pub trait RandomSource: Send {
    /// A uniform value in `0..upper`. `upper` is never zero.
    fn below(&mut self, upper: usize) -> usize;
}

/// Default source backed by ChaCha20.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha20Rng,
}

impl SeededRandom {
    /// Seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: ChaCha20Rng::from_os_rng(),
        }
    }

    /// Reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, upper: usize) -> usize {
        self.rng.random_range(0..upper)
    }
}

/// Draw up to `count` items from `pool` without replacement.
///
/// Partial Fisher-Yates: every item is equally likely, and a pool no larger
/// than `count` is returned whole.
pub fn sample_without_replacement<T: Copy>(
    pool: &[T],
    count: usize,
    source: &mut dyn RandomSource,
) -> Vec<T> {
    let mut items = pool.to_vec();
    let take = count.min(items.len());
    for i in 0..take {
        let j = i + source.below(items.len() - i);
        items.swap(i, j);
    }
    items.truncate(take);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Always(usize);

    impl RandomSource for Always {
        fn below(&mut self, upper: usize) -> usize {
            self.0.min(upper - 1)
        }
    }

    #[test]
    fn test_small_pool_returned_whole() {
        let mut source = SeededRandom::seeded(7);
        let picked = sample_without_replacement(&[4, 9], 3, &mut source);
        let picked: HashSet<_> = picked.into_iter().collect();
        assert_eq!(picked, HashSet::from([4, 9]));
    }

    #[test]
    fn test_no_repeats() {
        let pool: Vec<usize> = (1..20).collect();
        for seed in 0..50 {
            let mut source = SeededRandom::seeded(seed);
            let picked = sample_without_replacement(&pool, 3, &mut source);
            assert_eq!(picked.len(), 3);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 3);
            assert!(picked.iter().all(|p| pool.contains(p)));
        }
    }

    #[test]
    fn test_scripted_source() {
        // Always picking the first remaining slot keeps pool order.
        let picked = sample_without_replacement(&[1, 2, 3, 4, 5], 3, &mut Always(0));
        assert_eq!(picked, vec![1, 2, 3]);

        // Always picking the last remaining slot.
        let picked = sample_without_replacement(&[1, 2, 3, 4, 5], 3, &mut Always(usize::MAX));
        assert_eq!(picked, vec![5, 1, 2]);
    }

    #[test]
    fn test_empty_pool() {
        let picked: Vec<usize> = sample_without_replacement(&[], 3, &mut SeededRandom::seeded(1));
        assert!(picked.is_empty());
    }
}
