//! Work-item bodies of the prefix sum kernels.
//!
//! Each function computes the output of global work item `gid` for one pass.
//! Work items past the end of the data return without touching memory, so
//! launches may be padded up to a multiple of the work-group size.

use crate::memory::GlobalMemory;

/// One Kogge-Stone style pass of the naive inclusive scan:
/// `ys[i] = xs[i] + xs[i - offset]`.
pub fn prefix_sum_naive<M>(gid: usize, xs: &M, ys: &M, offset: usize, n: usize)
where
    M: GlobalMemory + ?Sized,
{
    if gid >= n {
        return;
    }

    let mut sum = xs.load(gid);
    if gid >= offset {
        sum = sum.wrapping_add(xs.load(gid - offset));
    }
    ys.store(gid, sum);
}

/// One level of the Brent-Kung up-sweep. Every element closing a run of
/// `2 * offset` elements accumulates the partial sum of the left half.
///
/// `n` must be a power of two.
pub fn prefix_sum_up_sweep<M>(gid: usize, xs: &M, offset: usize, n: usize)
where
    M: GlobalMemory + ?Sized,
{
    if gid >= n || (gid + 1) % (2 * offset) != 0 {
        return;
    }

    let sum = xs.load(gid).wrapping_add(xs.load(gid - offset));
    xs.store(gid, sum);
}

/// One level of the down-sweep. Expects the root (`xs[n - 1]`) to have been
/// cleared before the first level, and leaves the exclusive scan in `xs` after
/// the level with `offset == 1`.
///
/// `n` must be a power of two.
pub fn prefix_sum_down_sweep<M>(gid: usize, xs: &M, offset: usize, n: usize)
where
    M: GlobalMemory + ?Sized,
{
    if gid >= n || (gid + 1) % (2 * offset) != 0 {
        return;
    }

    let left = xs.load(gid - offset);
    let parent = xs.load(gid);
    xs.store(gid - offset, parent);
    xs.store(gid, parent.wrapping_add(left));
}

/// Turns the exclusive scan in `xs` into an inclusive scan in `ys` by shifting
/// it one element to the left and appending `total`.
///
/// Only the first `len` elements are data; the rest of the `n` elements are
/// padding and are cleared.
pub fn prefix_sum_shift<M>(gid: usize, xs: &M, ys: &M, total: u32, len: usize, n: usize)
where
    M: GlobalMemory + ?Sized,
{
    if gid >= n {
        return;
    }

    let value = if gid + 1 < len {
        xs.load(gid + 1)
    } else if gid + 1 == len {
        total
    } else {
        0
    };
    ys.store(gid, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{atomics, plain};

    #[test]
    fn naive_pass_test() {
        let xs = atomics(&[3, 1, 4, 1, 5]);
        let ys = atomics(&[0; 5]);
        for gid in 0..8 {
            prefix_sum_naive(gid, &xs[..], &ys[..], 2, 5);
        }
        assert_eq!(plain(&ys), vec![3, 1, 7, 2, 9]);
    }

    #[test]
    fn up_sweep_then_down_sweep_is_exclusive_scan() {
        let xs = atomics(&[3, 1, 4, 1, 5, 9, 2, 6]);
        for offset in [1, 2, 4] {
            for gid in 0..8 {
                prefix_sum_up_sweep(gid, &xs[..], offset, 8);
            }
        }
        assert_eq!(plain(&xs), vec![3, 4, 4, 9, 5, 14, 2, 31]);

        xs.store(7, 0);
        for offset in [4, 2, 1] {
            for gid in 0..8 {
                prefix_sum_down_sweep(gid, &xs[..], offset, 8);
            }
        }
        assert_eq!(plain(&xs), vec![0, 3, 4, 8, 9, 14, 23, 25]);
    }

    #[test]
    fn shift_clears_padding() {
        let xs = atomics(&[0, 3, 4, 8, 9, 9, 9, 9]);
        let ys = atomics(&[7; 8]);
        for gid in 0..8 {
            prefix_sum_shift(gid, &xs[..], &ys[..], 9, 5, 8);
        }
        assert_eq!(plain(&ys), vec![3, 4, 8, 9, 9, 0, 0, 0]);
    }

    #[test]
    fn padded_work_items_are_ignored() {
        let xs = atomics(&[1, 1]);
        for gid in 2..128 {
            prefix_sum_up_sweep(gid, &xs[..], 1, 2);
        }
        assert_eq!(plain(&xs), vec![1, 1]);
    }
}
