//! Work-item bodies of the one-bit LSB radix sort pass.

use crate::memory::GlobalMemory;

#[inline(always)]
fn is_zero_bit(key: u32, bit: u32) -> bool {
    (key >> bit) & 1 == 0
}

/// Counts the keys of block `gid` whose `bit` is zero.
///
/// Launched over the whole (padded) counters buffer of `counters_len` entries:
/// every entry is overwritten, blocks past the end of the keys get zero.
pub fn radix_counters<M>(
    gid: usize,
    keys: &M,
    counters: &M,
    bit: u32,
    n: usize,
    block_size: usize,
    counters_len: usize,
) where
    M: GlobalMemory + ?Sized,
{
    if gid >= counters_len {
        return;
    }

    let start = gid * block_size;
    let end = n.min(start + block_size);
    let mut zeros = 0u32;
    for i in start..end {
        if is_zero_bit(keys.load(i), bit) {
            zeros += 1;
        }
    }
    counters.store(gid, zeros);
}

/// Moves key `gid` to its stable position for this pass: every key with a zero
/// `bit` first, then every key with a one, both in their original order.
///
/// `counters` holds the inclusive scan of the per-block zero counts for the
/// `blocks` data blocks.
pub fn radix_scatter<M>(
    gid: usize,
    counters: &M,
    src: &M,
    dst: &M,
    bit: u32,
    n: usize,
    block_size: usize,
    blocks: usize,
) where
    M: GlobalMemory + ?Sized,
{
    if gid >= n {
        return;
    }

    let block = gid / block_size;
    let start = block * block_size;
    let zeros_before_block = if block == 0 {
        0
    } else {
        counters.load(block - 1) as usize
    };
    let zeros_total = counters.load(blocks - 1) as usize;

    let mut zeros_before = 0usize;
    for i in start..gid {
        if is_zero_bit(src.load(i), bit) {
            zeros_before += 1;
        }
    }

    let key = src.load(gid);
    let position = if is_zero_bit(key, bit) {
        zeros_before_block + zeros_before
    } else {
        let ones_before_block = start - zeros_before_block;
        let ones_before = (gid - start) - zeros_before;
        zeros_total + ones_before_block + ones_before
    };
    dst.store(position, key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{atomics, plain};

    #[test]
    fn counters_test() {
        let keys = atomics(&[0b10, 0b01, 0b11, 0b00, 0b01]);
        let counters = atomics(&[9; 4]);
        for gid in 0..4 {
            radix_counters(gid, &keys[..], &counters[..], 0, 5, 2, 4);
        }
        assert_eq!(plain(&counters), vec![1, 1, 0, 0]);
    }

    #[test]
    fn scatter_is_stable_partition() {
        let keys = atomics(&[0b10, 0b01, 0b11, 0b00, 0b01]);
        let dst = atomics(&[0; 5]);
        // Zero counts per block of two are [1, 1, 0]; inclusive scan [1, 2, 2].
        let counters = atomics(&[1, 2, 2, 0]);
        for gid in 0..5 {
            radix_scatter(gid, &counters[..], &keys[..], &dst[..], 0, 5, 2, 3);
        }
        assert_eq!(plain(&dst), vec![0b10, 0b00, 0b01, 0b11, 0b01]);
    }
}
