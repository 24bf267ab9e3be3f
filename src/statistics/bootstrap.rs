//! Seeded bootstrap resampling of paired observations.
//!
//! Every replicate draws its own generator from the base seed and the
//! replicate index, so the set of replicates is the same whether the loop
//! runs serially or on the rayon pool, and regardless of thread count.

use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::constants::MAX_BOOTSTRAP_ITERATIONS;
use rand_xoshiro::Xoshiro256PlusPlus;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Counter-based RNG seed generation using SplitMix64.
///
/// This is a stateless PRF that generates deterministic, well-distributed
/// seeds from a base seed and counter. Using this instead of simple addition
/// avoids sequential correlation between neighbouring replicates.
///
/// # Arguments
///
/// * `base_seed` - Base random seed
/// * `counter` - Replicate index (0, 1, 2, ...)
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generator for one bootstrap replicate.
#[inline]
pub fn replicate_rng(base_seed: u64, replicate: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, replicate as u64))
}

/// Fill `out` with indices drawn uniformly with replacement from `0..n`.
///
/// Does nothing when `n` is zero.
pub fn resample_indices_into<R: Rng>(n: usize, rng: &mut R, out: &mut [usize]) {
    if n == 0 {
        return;
    }
    for idx in out.iter_mut() {
        *idx = rng.random_range(0..n);
    }
}

/// Clamp a requested resample count to [`MAX_BOOTSTRAP_ITERATIONS`].
pub fn bounded_iterations(requested: usize) -> usize {
    if requested > MAX_BOOTSTRAP_ITERATIONS {
        warn!(
            requested,
            limit = MAX_BOOTSTRAP_ITERATIONS,
            "clamping bootstrap resample count"
        );
        MAX_BOOTSTRAP_ITERATIONS
    } else {
        requested
    }
}

/// Evaluate a statistic on `n_bootstrap` case resamples of `n` observations.
///
/// Each replicate resamples `n` indices with replacement and hands them to
/// `statistic`. Replicates for which the statistic is undefined (`None`) are
/// dropped. The surviving values come back in replicate order.
pub fn bootstrap_replicates<F>(n: usize, n_bootstrap: usize, seed: u64, statistic: F) -> Vec<f64>
where
    F: Fn(&[usize]) -> Option<f64> + Sync + Send,
{
    if n == 0 || n_bootstrap == 0 {
        return Vec::new();
    }

    #[cfg(feature = "parallel")]
    let replicates: Vec<Option<f64>> = crate::thread_pool::install(|| {
        (0..n_bootstrap)
            .into_par_iter()
            .map_init(
                // Per-thread scratch buffer for resampled indices
                || vec![0usize; n],
                |indices, i| {
                    let mut rng = replicate_rng(seed, i);
                    resample_indices_into(n, &mut rng, &mut indices[..]);
                    statistic(&indices[..])
                },
            )
            .collect()
    });

    #[cfg(not(feature = "parallel"))]
    let replicates: Vec<Option<f64>> = {
        let mut indices = vec![0usize; n];
        (0..n_bootstrap)
            .map(|i| {
                let mut rng = replicate_rng(seed, i);
                resample_indices_into(n, &mut rng, &mut indices[..]);
                statistic(&indices[..])
            })
            .collect()
    };

    replicates.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_seed_distinct() {
        let a = counter_rng_seed(42, 0);
        let b = counter_rng_seed(42, 1);
        let c = counter_rng_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, counter_rng_seed(42, 0));
    }

    #[test]
    fn test_resample_indices_in_range() {
        let mut rng = replicate_rng(7, 0);
        let mut out = vec![usize::MAX; 100];
        resample_indices_into(10, &mut rng, &mut out);
        assert!(out.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_replicates_deterministic() {
        let data: Vec<f64> = (0..50).map(|x| x as f64).collect();
        let mean_of = |idx: &[usize]| {
            Some(idx.iter().map(|&i| data[i]).sum::<f64>() / idx.len() as f64)
        };

        let r1 = bootstrap_replicates(data.len(), 200, 42, mean_of);
        let r2 = bootstrap_replicates(data.len(), 200, 42, mean_of);
        assert_eq!(r1.len(), 200);
        assert_eq!(r1, r2);

        let r3 = bootstrap_replicates(data.len(), 200, 43, mean_of);
        assert_ne!(r1, r3);
    }

    #[test]
    fn test_replicates_prefix_stable() {
        // Replicate i depends only on (seed, i), so a longer run extends a shorter one.
        let data: Vec<f64> = (0..30).map(|x| (x * x) as f64).collect();
        let stat = |idx: &[usize]| Some(idx.iter().map(|&i| data[i]).sum::<f64>());

        let short = bootstrap_replicates(data.len(), 50, 9, stat);
        let long = bootstrap_replicates(data.len(), 120, 9, stat);
        assert_eq!(short[..], long[..50]);
    }

    #[test]
    fn test_undefined_replicates_dropped() {
        let stat = |idx: &[usize]| if idx[0] % 2 == 0 { Some(1.0) } else { None };
        let out = bootstrap_replicates(10, 500, 1, stat);
        assert!(out.len() < 500);
        assert!(out.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_bounded_iterations() {
        assert_eq!(bounded_iterations(2_000), 2_000);
        assert_eq!(
            bounded_iterations(MAX_BOOTSTRAP_ITERATIONS + 1),
            MAX_BOOTSTRAP_ITERATIONS
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(bootstrap_replicates(0, 100, 1, |_| Some(1.0)).is_empty());
        assert!(bootstrap_replicates(10, 0, 1, |_| Some(1.0)).is_empty());
    }
}
