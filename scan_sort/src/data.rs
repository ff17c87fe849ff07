//! Benchmark input generation.

use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;

/// Largest value a scan input of `n` elements may contain, chosen so that the
/// total of the whole array stays below `i32::MAX`.
pub fn scan_values_range(n: usize) -> u32 {
    let n = n.max(1).min(u32::MAX as usize) as u32;
    1023.min(i32::MAX as u32 / n)
}

/// `n` values uniformly drawn from `0..=max`. The same `seed` always gives the
/// same values.
pub fn random_values(n: usize, max: u32, seed: u64) -> Vec<u32> {
    let mut rng = Hc128Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..=max)).collect()
}

/// Scan input of `n` elements, seeded by `n`.
pub fn scan_input(n: usize) -> Vec<u32> {
    random_values(n, scan_values_range(n), n as u64)
}

/// Sort input of `n` keys in `0..=i32::MAX`, seeded by `n`.
pub fn sort_input(n: usize) -> Vec<u32> {
    random_values(n, i32::MAX as u32, n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_range_test() {
        assert_eq!(scan_values_range(0), 1023);
        assert_eq!(scan_values_range(4096), 1023);
        assert_eq!(scan_values_range(1 << 24), 127);
    }

    #[test]
    fn scan_totals_fit() {
        let n = 1 << 16;
        let total: u64 = scan_input(n).iter().map(|&v| v as u64).sum();
        assert!(total <= i32::MAX as u64);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(random_values(100, 10, 3), random_values(100, 10, 3));
        assert_ne!(random_values(100, 1 << 30, 3), random_values(100, 1 << 30, 4));
        assert!(random_values(1000, 10, 1).iter().all(|&v| v <= 10));
    }
}
