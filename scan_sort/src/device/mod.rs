//! The boundary between the orchestration code and whatever executes kernels.
//!
//! Every call here is blocking: when `execute`, `read` or `write` returns, the
//! device has finished the operation and later passes may depend on it.

#[cfg(feature = "cuda")]
pub mod cuda;
pub mod host;

use crate::error::Result;

/// Names of the kernel entry points in `scan_sort_gpu`.
pub mod entry {
    pub const PREFIX_SUM_NAIVE: &str = "prefix_sum_naive";
    pub const PREFIX_SUM_UP_SWEEP: &str = "prefix_sum_up_sweep";
    pub const PREFIX_SUM_DOWN_SWEEP: &str = "prefix_sum_down_sweep";
    pub const PREFIX_SUM_SHIFT: &str = "prefix_sum_shift";
    pub const RADIX_COUNTERS: &str = "radix_counters";
    pub const RADIX_SCATTER: &str = "radix_scatter";
}

/// Device-resident array of `u32`.
pub trait DeviceBuffer: Sized {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reallocates the buffer to hold exactly `len` elements. The contents are
    /// unspecified afterwards.
    fn resize(&mut self, len: usize) -> Result<()>;

    /// Copies `src` into the buffer starting at element `offset`.
    fn write(&mut self, src: &[u32], offset: usize) -> Result<()>;

    /// Copies `dst.len()` elements starting at element `offset` into `dst`.
    fn read(&self, dst: &mut [u32], offset: usize) -> Result<()>;

    /// Exchanges the two handles. No data is copied.
    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

/// Fails unless `offset..offset + count` lies inside a buffer of `len`.
pub(crate) fn check_bounds(offset: usize, count: usize, len: usize) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(crate::Error::OutOfBounds { offset, count, len }),
    }
}

/// Launch shape of one kernel invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSize {
    pub group_size: usize,
    pub global_size: usize,
}

impl WorkSize {
    /// Covers `work_items` with whole groups, padding the global size up to a
    /// multiple of `group_size`.
    pub fn new(group_size: usize, work_items: usize) -> Self {
        let groups = (work_items + group_size - 1) / group_size;
        Self {
            group_size,
            global_size: groups * group_size,
        }
    }

    pub fn groups(&self) -> usize {
        self.global_size / self.group_size
    }
}

/// A positional kernel argument.
pub enum KernelArg<'a, B> {
    Buffer(&'a B),
    Scalar(u32),
}

// Manual impls: `B` itself does not need to be `Clone`.
impl<B> Clone for KernelArg<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for KernelArg<'_, B> {}

/// Something that compiles and runs the `scan_sort_gpu` kernels.
pub trait Device {
    type Buffer: DeviceBuffer;
    type Kernel;

    /// Human readable device description.
    fn name(&self) -> String;

    /// Allocates a zero-filled buffer of `len` elements.
    fn alloc(&self, len: usize) -> Result<Self::Buffer>;

    /// Looks up and prepares the entry point `entry`. Calling it twice for the
    /// same entry yields equivalent kernels.
    fn compile(&self, entry: &'static str) -> Result<Self::Kernel>;

    /// Runs `kernel` over `work` and waits for it to finish.
    fn execute(
        &self,
        kernel: &Self::Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, Self::Buffer>],
    ) -> Result<()>;
}

/// Converts a length or offset into a 32-bit kernel scalar.
pub(crate) fn scalar(entry: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| crate::Error::TooLarge { entry, len: value })
}
