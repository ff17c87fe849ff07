//! `#[kernel]` entry points. The entry names are the keys the host compiles.

use crate::memory::DevicePtr;
use crate::{radix, scan};
use cuda_std::{kernel, thread};

#[inline(always)]
fn gid() -> usize {
    thread::index_1d() as usize
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn prefix_sum_naive(xs: *mut u32, ys: *mut u32, offset: u32, n: u32) {
    let xs = DevicePtr::new(xs);
    let ys = DevicePtr::new(ys);
    scan::prefix_sum_naive(gid(), &xs, &ys, offset as usize, n as usize);
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn prefix_sum_up_sweep(xs: *mut u32, offset: u32, n: u32) {
    let xs = DevicePtr::new(xs);
    scan::prefix_sum_up_sweep(gid(), &xs, offset as usize, n as usize);
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn prefix_sum_down_sweep(xs: *mut u32, offset: u32, n: u32) {
    let xs = DevicePtr::new(xs);
    scan::prefix_sum_down_sweep(gid(), &xs, offset as usize, n as usize);
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn prefix_sum_shift(xs: *mut u32, ys: *mut u32, total: u32, len: u32, n: u32) {
    let xs = DevicePtr::new(xs);
    let ys = DevicePtr::new(ys);
    scan::prefix_sum_shift(gid(), &xs, &ys, total, len as usize, n as usize);
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn radix_counters(
    keys: *mut u32,
    counters: *mut u32,
    bit: u32,
    n: u32,
    block_size: u32,
    counters_len: u32,
) {
    let keys = DevicePtr::new(keys);
    let counters = DevicePtr::new(counters);
    radix::radix_counters(
        gid(),
        &keys,
        &counters,
        bit,
        n as usize,
        block_size as usize,
        counters_len as usize,
    );
}

#[kernel]
#[allow(improper_ctypes_definitions, clippy::missing_safety_doc)]
pub unsafe fn radix_scatter(
    counters: *mut u32,
    src: *mut u32,
    dst: *mut u32,
    bit: u32,
    n: u32,
    block_size: u32,
    blocks: u32,
) {
    let counters = DevicePtr::new(counters);
    let src = DevicePtr::new(src);
    let dst = DevicePtr::new(dst);
    radix::radix_scatter(
        gid(),
        &counters,
        &src,
        &dst,
        bit,
        n as usize,
        block_size as usize,
        blocks as usize,
    );
}
