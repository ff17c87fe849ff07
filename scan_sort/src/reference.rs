//! CPU baselines the device results are checked against.

use rayon::prelude::*;

/// Smallest chunk the parallel scan hands to one task.
const MIN_CHUNK: usize = 1 << 14;

/// Inclusive scan of `xs` into `ys`, which must be at least as long.
pub fn sequential_scan(xs: &[u32], ys: &mut [u32]) {
    let mut accumulator = 0u32;
    for (x, y) in xs.iter().zip(ys.iter_mut()) {
        accumulator = accumulator.wrapping_add(*x);
        *y = accumulator;
    }
}

pub fn inclusive_scan(xs: &[u32]) -> Vec<u32> {
    let mut ys = vec![0u32; xs.len()];
    sequential_scan(xs, &mut ys);
    ys
}

pub fn exclusive_scan(xs: &[u32]) -> Vec<u32> {
    let mut sum = 0u32;
    xs.iter()
        .map(|&x| {
            let prefix = sum;
            sum = sum.wrapping_add(x);
            prefix
        })
        .collect()
}

/// Multi-threaded inclusive scan: every chunk is scanned on its own, then each
/// chunk is offset by the total of the chunks before it.
pub fn parallel_scan(xs: &[u32], ys: &mut [u32]) {
    let ys = &mut ys[..xs.len()];
    let chunk = (xs.len() / rayon::current_num_threads().max(1)).max(MIN_CHUNK);

    ys.par_chunks_mut(chunk)
        .zip(xs.par_chunks(chunk))
        .for_each(|(ys, xs)| sequential_scan(xs, ys));

    let totals = ys
        .chunks(chunk)
        .map(|c| c.last().copied().unwrap_or(0))
        .collect::<Vec<_>>();
    let offsets = exclusive_scan(&totals);

    ys.par_chunks_mut(chunk)
        .zip(offsets.par_iter())
        .skip(1)
        .for_each(|(ys, &offset)| {
            for y in ys {
                *y = y.wrapping_add(offset);
            }
        });
}

pub fn sequential_sort(xs: &mut [u32]) {
    xs.sort_unstable();
}

pub fn parallel_sort(xs: &mut [u32]) {
    xs.par_sort_unstable();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::random_values;

    #[test]
    fn scans_test() {
        let xs = [3, 1, 4, 1, 5, 9, 2, 6];
        assert_eq!(inclusive_scan(&xs), vec![3, 4, 8, 9, 14, 23, 25, 31]);
        assert_eq!(exclusive_scan(&xs), vec![0, 3, 4, 8, 9, 14, 23, 25]);
        assert!(inclusive_scan(&[]).is_empty());
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        for n in [0, 1, MIN_CHUNK - 1, MIN_CHUNK * 5 + 3] {
            let xs = random_values(n, 1023, n as u64);
            let mut ys = vec![0u32; n];
            parallel_scan(&xs, &mut ys);
            assert_eq!(ys, inclusive_scan(&xs), "n={}", n);
        }
    }

    #[test]
    fn sorts_test() {
        let xs = random_values(100_000, u32::MAX, 1);
        let mut a = xs.clone();
        let mut b = xs;
        sequential_sort(&mut a);
        parallel_sort(&mut b);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] <= w[1]));
    }
}
