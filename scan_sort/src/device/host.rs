//! A host-emulated SIMT device.
//!
//! Global memory is a `Vec<AtomicU32>` and every work group of a launch runs
//! as one `rayon` task, so work items of a launch execute concurrently and in
//! no particular order, exactly as the kernels must tolerate on a GPU.

use super::{check_bounds, entry, Device, DeviceBuffer, KernelArg, WorkSize};
use crate::error::{Error, Result};
use log::trace;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use scan_sort_gpu::memory::GlobalMemory;
use scan_sort_gpu::{radix, scan};
use std::sync::atomic::AtomicU32;

const ENTRIES: &[&str] = &[
    entry::PREFIX_SUM_NAIVE,
    entry::PREFIX_SUM_UP_SWEEP,
    entry::PREFIX_SUM_DOWN_SWEEP,
    entry::PREFIX_SUM_SHIFT,
    entry::RADIX_COUNTERS,
    entry::RADIX_SCATTER,
];

#[derive(Debug, Default)]
pub struct HostBuffer {
    data: Vec<AtomicU32>,
}

impl HostBuffer {
    fn words(&self) -> &[AtomicU32] {
        &self.data
    }
}

impl DeviceBuffer for HostBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, len: usize) -> Result<()> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| Error::Allocation {
            len,
            reason: e.to_string(),
        })?;
        data.resize_with(len, || AtomicU32::new(0));
        self.data = data;
        Ok(())
    }

    fn write(&mut self, src: &[u32], offset: usize) -> Result<()> {
        check_bounds(offset, src.len(), self.len())?;
        let words = &self.data[offset..offset + src.len()];
        for (i, &value) in src.iter().enumerate() {
            words.store(i, value);
        }
        Ok(())
    }

    fn read(&self, dst: &mut [u32], offset: usize) -> Result<()> {
        check_bounds(offset, dst.len(), self.len())?;
        let words = &self.data[offset..offset + dst.len()];
        for (i, value) in dst.iter_mut().enumerate() {
            *value = words.load(i);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostKernel {
    entry: &'static str,
}

pub struct HostDevice {
    pool: ThreadPool,
}

impl HostDevice {
    /// Creates a device backed by `threads` worker threads, or by one per
    /// logical CPU when `threads` is zero.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("host-device-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Runs `body` once per work item, one parallel task per work group.
    fn run<F>(&self, work: WorkSize, body: F)
    where
        F: Fn(usize) + Sync,
    {
        let group_size = work.group_size;
        self.pool.install(|| {
            (0..work.groups()).into_par_iter().for_each(|group| {
                let start = group * group_size;
                (start..start + group_size).for_each(&body);
            })
        });
    }
}

/// Typed access to a positional argument list.
struct Args<'s, 'a> {
    entry: &'static str,
    args: &'s [KernelArg<'a, HostBuffer>],
}

impl<'s, 'a> Args<'s, 'a> {
    fn buffer(&self, index: usize) -> Result<&'a [AtomicU32]> {
        match self.args.get(index) {
            Some(&KernelArg::Buffer(buffer)) => Ok(buffer.words()),
            _ => Err(self.mismatch(index, "buffer")),
        }
    }

    fn scalar(&self, index: usize) -> Result<u32> {
        match self.args.get(index) {
            Some(&KernelArg::Scalar(value)) => Ok(value),
            _ => Err(self.mismatch(index, "scalar")),
        }
    }

    fn len(&self, index: usize) -> Result<usize> {
        self.scalar(index).map(|value| value as usize)
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> Error {
        Error::KernelArgument {
            entry: self.entry,
            index,
            expected,
        }
    }
}

impl Device for HostDevice {
    type Buffer = HostBuffer;
    type Kernel = HostKernel;

    fn name(&self) -> String {
        format!("host ({} threads)", self.pool.current_num_threads())
    }

    fn alloc(&self, len: usize) -> Result<HostBuffer> {
        let mut buffer = HostBuffer::default();
        buffer.resize(len)?;
        Ok(buffer)
    }

    fn compile(&self, entry: &'static str) -> Result<HostKernel> {
        match ENTRIES.iter().find(|&&known| known == entry) {
            Some(&entry) => Ok(HostKernel { entry }),
            None => Err(Error::Compilation {
                entry,
                reason: "no such entry point".to_string(),
            }),
        }
    }

    fn execute(
        &self,
        kernel: &HostKernel,
        work: WorkSize,
        args: &[KernelArg<'_, HostBuffer>],
    ) -> Result<()> {
        trace!(
            "{}: {} groups of {}",
            kernel.entry,
            work.groups(),
            work.group_size
        );
        let args = Args {
            entry: kernel.entry,
            args,
        };

        match kernel.entry {
            entry::PREFIX_SUM_NAIVE => {
                let (xs, ys) = (args.buffer(0)?, args.buffer(1)?);
                let (offset, n) = (args.len(2)?, args.len(3)?);
                self.run(work, |gid| scan::prefix_sum_naive(gid, xs, ys, offset, n));
            }
            entry::PREFIX_SUM_UP_SWEEP => {
                let xs = args.buffer(0)?;
                let (offset, n) = (args.len(1)?, args.len(2)?);
                self.run(work, |gid| scan::prefix_sum_up_sweep(gid, xs, offset, n));
            }
            entry::PREFIX_SUM_DOWN_SWEEP => {
                let xs = args.buffer(0)?;
                let (offset, n) = (args.len(1)?, args.len(2)?);
                self.run(work, |gid| scan::prefix_sum_down_sweep(gid, xs, offset, n));
            }
            entry::PREFIX_SUM_SHIFT => {
                let (xs, ys) = (args.buffer(0)?, args.buffer(1)?);
                let total = args.scalar(2)?;
                let (len, n) = (args.len(3)?, args.len(4)?);
                self.run(work, |gid| {
                    scan::prefix_sum_shift(gid, xs, ys, total, len, n)
                });
            }
            entry::RADIX_COUNTERS => {
                let (keys, counters) = (args.buffer(0)?, args.buffer(1)?);
                let bit = args.scalar(2)?;
                let (n, block_size, counters_len) = (args.len(3)?, args.len(4)?, args.len(5)?);
                self.run(work, |gid| {
                    radix::radix_counters(gid, keys, counters, bit, n, block_size, counters_len)
                });
            }
            entry::RADIX_SCATTER => {
                let (counters, src, dst) = (args.buffer(0)?, args.buffer(1)?, args.buffer(2)?);
                let bit = args.scalar(3)?;
                let (n, block_size, blocks) = (args.len(4)?, args.len(5)?, args.len(6)?);
                self.run(work, |gid| {
                    radix::radix_scatter(gid, counters, src, dst, bit, n, block_size, blocks)
                });
            }
            other => {
                return Err(Error::Compilation {
                    entry: other,
                    reason: "no such entry point".to_string(),
                })
            }
        }
        Ok(())
    }
}
