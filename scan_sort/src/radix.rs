//! LSB radix sort of `u32` keys, one bit per pass.
//!
//! Every pass is a stable partition on one bit:
//! 1. `radix_counters` counts the zero-bit keys of every block of
//!    `block_size` keys,
//! 2. the counts are scanned in place with the work-efficient scan, turning
//!    them into the global base offset of every block's zero bucket,
//! 3. `radix_scatter` writes every key to its bucket position in the scratch
//!    buffer, and the key buffers swap roles.
//!
//! After all 32 passes the active key buffer is sorted.

use crate::buffers::{padded_len, BufferPair};
use crate::device::{entry, scalar, Device, DeviceBuffer, KernelArg, WorkSize};
use crate::error::{Error, Result};
use crate::scan::{ScanConfig, ScanEngine};
use log::debug;

/// Number of passes of a full sort.
pub const KEY_BITS: u32 = u32::BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadixConfig {
    /// Number of keys sharing one counter.
    pub block_size: usize,
    /// Work-group size of every launch, including the nested counter scans.
    pub group_size: usize,
}

impl Default for RadixConfig {
    fn default() -> Self {
        Self {
            block_size: 128,
            group_size: 128,
        }
    }
}

/// Device buffers for sorting up to `capacity` keys, owned by the caller and
/// lent to one sort at a time.
pub struct SortWorkspace<B> {
    keys: BufferPair<B>,
    counters: BufferPair<B>,
    len: usize,
    blocks: usize,
    block_size: usize,
}

impl<B: DeviceBuffer> SortWorkspace<B> {
    pub fn new<D>(device: &D, capacity: usize, block_size: usize) -> Result<Self>
    where
        D: Device<Buffer = B>,
    {
        if block_size == 0 {
            return Err(Error::InvalidConfig("block size must be positive".into()));
        }
        let counters_len = padded_len(blocks(capacity, block_size));
        Ok(Self {
            keys: BufferPair::new(device.alloc(capacity)?, device.alloc(capacity)?),
            counters: BufferPair::new(device.alloc(counters_len)?, device.alloc(counters_len)?),
            len: 0,
            blocks: 0,
            block_size,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Uploads `input`, growing the buffers if needed. The counters are not
    /// cleared here: every pass overwrites all of them.
    pub fn load(&mut self, input: &[u32]) -> Result<()> {
        let n = input.len();
        let blocks = blocks(n, self.block_size);
        self.keys.reserve(n)?;
        self.counters.reserve(padded_len(blocks))?;
        self.keys.active_mut().write(input, 0)?;
        self.len = n;
        self.blocks = blocks;
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<u32>> {
        let mut result = vec![0u32; self.len];
        self.keys.active().read(&mut result, 0)?;
        Ok(result)
    }
}

fn blocks(n: usize, block_size: usize) -> usize {
    (n + block_size - 1) / block_size
}

pub struct RadixSort<'d, D: Device> {
    device: &'d D,
    config: RadixConfig,
    scan: ScanEngine<'d, D>,
    counters: D::Kernel,
    scatter: D::Kernel,
}

impl<'d, D: Device> RadixSort<'d, D> {
    /// Compiles the sort kernels, and the scan kernels it depends on.
    pub fn new(device: &'d D, config: RadixConfig) -> Result<Self> {
        if config.block_size == 0 {
            return Err(Error::InvalidConfig("block size must be positive".into()));
        }
        let scan = ScanEngine::new(
            device,
            ScanConfig {
                group_size: config.group_size,
            },
        )?;

        Ok(Self {
            device,
            config,
            scan,
            counters: device.compile(entry::RADIX_COUNTERS)?,
            scatter: device.compile(entry::RADIX_SCATTER)?,
        })
    }

    pub fn workspace(&self, capacity: usize) -> Result<SortWorkspace<D::Buffer>> {
        SortWorkspace::new(self.device, capacity, self.config.block_size)
    }

    /// Sorts `input` ascending using a temporary workspace.
    pub fn sort(&self, input: &[u32]) -> Result<Vec<u32>> {
        let mut workspace = self.workspace(input.len())?;
        self.sort_with(&mut workspace, input)
    }

    /// Sorts `input` ascending using the caller's workspace.
    pub fn sort_with(
        &self,
        workspace: &mut SortWorkspace<D::Buffer>,
        input: &[u32],
    ) -> Result<Vec<u32>> {
        workspace.load(input)?;
        self.run(workspace)?;
        workspace.read()
    }

    /// Sorts the keys loaded into `workspace` in place.
    pub fn run(&self, workspace: &mut SortWorkspace<D::Buffer>) -> Result<()> {
        self.check_workspace(workspace)?;
        if workspace.len <= 1 {
            return Ok(());
        }
        debug!(
            "radix sort of {} keys: {} passes over {} blocks of {}",
            workspace.len, KEY_BITS, workspace.blocks, self.config.block_size
        );

        for bit in 0..KEY_BITS {
            self.sort_pass(workspace, bit)?;
        }
        Ok(())
    }

    /// Stable partition of the loaded keys on `bit`: keys with a zero `bit`
    /// first, then keys with a one, both in their previous relative order.
    pub fn sort_pass(&self, workspace: &mut SortWorkspace<D::Buffer>, bit: u32) -> Result<()> {
        self.check_workspace(workspace)?;
        let n = workspace.len;
        if n <= 1 {
            return Ok(());
        }
        let blocks = workspace.blocks;
        let counters_len = padded_len(blocks);
        let group_size = self.config.group_size;

        let n32 = scalar(entry::RADIX_SCATTER, n)?;
        let block_size = scalar(entry::RADIX_COUNTERS, self.config.block_size)?;
        let counters_len32 = scalar(entry::RADIX_COUNTERS, counters_len)?;
        let blocks32 = scalar(entry::RADIX_SCATTER, blocks)?;

        self.device.execute(
            &self.counters,
            WorkSize::new(group_size, counters_len),
            &[
                KernelArg::Buffer(workspace.keys.active()),
                KernelArg::Buffer(workspace.counters.active()),
                KernelArg::Scalar(bit),
                KernelArg::Scalar(n32),
                KernelArg::Scalar(block_size),
                KernelArg::Scalar(counters_len32),
            ],
        )?;

        self.scan.tree_in_place(&mut workspace.counters, blocks)?;

        self.device.execute(
            &self.scatter,
            WorkSize::new(group_size, n),
            &[
                KernelArg::Buffer(workspace.counters.active()),
                KernelArg::Buffer(workspace.keys.active()),
                KernelArg::Buffer(workspace.keys.scratch()),
                KernelArg::Scalar(bit),
                KernelArg::Scalar(n32),
                KernelArg::Scalar(block_size),
                KernelArg::Scalar(blocks32),
            ],
        )?;
        workspace.keys.swap();
        Ok(())
    }

    fn check_workspace(&self, workspace: &SortWorkspace<D::Buffer>) -> Result<()> {
        if workspace.block_size != self.config.block_size {
            return Err(Error::InvalidConfig(format!(
                "workspace built for blocks of {}, sorter uses {}",
                workspace.block_size, self.config.block_size
            )));
        }
        Ok(())
    }
}
