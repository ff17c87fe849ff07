//! Inclusive prefix sums on the device.
//!
//! Two variants are provided. The naive one does `O(n log n)` additions in
//! `ceil(log2 n)` passes and only exists as a throughput baseline. The tree
//! variant is the work-efficient up-sweep/down-sweep scan: it pads the input
//! to a power of two `m` with zeros and runs `2 * log2(m) + 1` passes.
//!
//! In both cases the passes are a pure function of the input length.

use crate::buffers::{fill_zero, padded_len, BufferPair};
use crate::device::{check_bounds, entry, scalar, Device, DeviceBuffer, KernelArg, WorkSize};
use crate::error::{Error, Result};
use log::debug;
use scan_sort_gpu::step::{div_step, mult_step, pass_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Work-group size of every scan launch.
    pub group_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { group_size: 128 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVariant {
    Naive,
    Tree,
}

impl ScanVariant {
    pub fn label(&self) -> &'static str {
        match self {
            ScanVariant::Naive => "naive",
            ScanVariant::Tree => "tree",
        }
    }
}

/// Device buffers for scanning up to `capacity` elements, owned by the caller
/// and lent to one scan at a time.
pub struct ScanWorkspace<B> {
    pair: BufferPair<B>,
    len: usize,
}

impl<B: DeviceBuffer> ScanWorkspace<B> {
    pub fn new<D>(device: &D, capacity: usize) -> Result<Self>
    where
        D: Device<Buffer = B>,
    {
        let len = padded_len(capacity);
        let pair = BufferPair::new(device.alloc(len)?, device.alloc(len)?);
        Ok(Self { pair, len: 0 })
    }

    /// Number of elements loaded by the last `load`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Uploads `input` and resets everything else to zero: the padding after
    /// the input and the whole scratch buffer.
    pub fn load(&mut self, input: &[u32]) -> Result<()> {
        let n = input.len();
        let padded = padded_len(n);
        self.pair.reserve(padded)?;

        let active = self.pair.active_mut();
        active.write(input, 0)?;
        fill_zero(active, n, padded - n)?;
        fill_zero(self.pair.scratch_mut(), 0, padded)?;

        self.len = n;
        Ok(())
    }

    /// Downloads the current contents, i.e. the scan result after a run.
    pub fn read(&self) -> Result<Vec<u32>> {
        let mut result = vec![0u32; self.len];
        self.pair.active().read(&mut result, 0)?;
        Ok(result)
    }
}

pub struct ScanEngine<'d, D: Device> {
    device: &'d D,
    config: ScanConfig,
    naive: D::Kernel,
    up_sweep: D::Kernel,
    down_sweep: D::Kernel,
    shift: D::Kernel,
}

impl<'d, D: Device> ScanEngine<'d, D> {
    /// Compiles the scan kernels on `device`.
    pub fn new(device: &'d D, config: ScanConfig) -> Result<Self> {
        if config.group_size == 0 {
            return Err(Error::InvalidConfig("group size must be positive".into()));
        }

        Ok(Self {
            device,
            config,
            naive: device.compile(entry::PREFIX_SUM_NAIVE)?,
            up_sweep: device.compile(entry::PREFIX_SUM_UP_SWEEP)?,
            down_sweep: device.compile(entry::PREFIX_SUM_DOWN_SWEEP)?,
            shift: device.compile(entry::PREFIX_SUM_SHIFT)?,
        })
    }

    pub fn device(&self) -> &'d D {
        self.device
    }

    pub fn workspace(&self, capacity: usize) -> Result<ScanWorkspace<D::Buffer>> {
        ScanWorkspace::new(self.device, capacity)
    }

    /// Inclusive scan of `input` using a temporary workspace.
    pub fn scan(&self, variant: ScanVariant, input: &[u32]) -> Result<Vec<u32>> {
        let mut workspace = self.workspace(input.len())?;
        self.scan_with(variant, &mut workspace, input)
    }

    /// Inclusive scan of `input` using the caller's workspace.
    pub fn scan_with(
        &self,
        variant: ScanVariant,
        workspace: &mut ScanWorkspace<D::Buffer>,
        input: &[u32],
    ) -> Result<Vec<u32>> {
        workspace.load(input)?;
        self.run(variant, workspace)?;
        workspace.read()
    }

    /// Scans the data loaded into `workspace` in place.
    pub fn run(&self, variant: ScanVariant, workspace: &mut ScanWorkspace<D::Buffer>) -> Result<()> {
        match variant {
            ScanVariant::Naive => self.naive_in_place(&mut workspace.pair, workspace.len),
            ScanVariant::Tree => self.tree_in_place(&mut workspace.pair, workspace.len),
        }
    }

    /// Naive scan of the first `n` elements of `pair.active()`, leaving the
    /// result in `pair.active()`.
    pub fn naive_in_place(&self, pair: &mut BufferPair<D::Buffer>, n: usize) -> Result<()> {
        check_bounds(0, n, pair.len())?;
        debug!("naive scan of {} elements in {} passes", n, pass_count(n));

        let work = WorkSize::new(self.config.group_size, n);
        let n32 = scalar(entry::PREFIX_SUM_NAIVE, n)?;
        for offset in mult_step(1, 2).take_while(|&offset| offset < n) {
            self.device.execute(
                &self.naive,
                work,
                &[
                    KernelArg::Buffer(pair.active()),
                    KernelArg::Buffer(pair.scratch()),
                    KernelArg::Scalar(offset as u32),
                    KernelArg::Scalar(n32),
                ],
            )?;
            pair.swap();
        }
        Ok(())
    }

    /// Work-efficient scan of the first `n` elements of `pair.active()`,
    /// leaving the result in `pair.active()`.
    ///
    /// The elements between `n` and `n.next_power_of_two()` must be zero.
    pub fn tree_in_place(&self, pair: &mut BufferPair<D::Buffer>, n: usize) -> Result<()> {
        if n <= 1 {
            return Ok(());
        }
        let m = padded_len(n);
        check_bounds(0, m, pair.len())?;
        debug!(
            "tree scan of {} elements padded to {} in {} passes",
            n,
            m,
            2 * pass_count(m) + 1
        );

        let work = WorkSize::new(self.config.group_size, m);
        let m32 = scalar(entry::PREFIX_SUM_SHIFT, m)?;

        for offset in mult_step(1, 2).take_while(|&offset| offset < m) {
            self.device.execute(
                &self.up_sweep,
                work,
                &[
                    KernelArg::Buffer(pair.active()),
                    KernelArg::Scalar(offset as u32),
                    KernelArg::Scalar(m32),
                ],
            )?;
        }

        // The root holds the reduction of everything; the down-sweep needs it
        // cleared and produces an exclusive scan that no longer contains it.
        let mut total = [0u32];
        pair.active().read(&mut total, m - 1)?;
        pair.active_mut().write(&[0], m - 1)?;

        for offset in div_step(m / 2, 2) {
            self.device.execute(
                &self.down_sweep,
                work,
                &[
                    KernelArg::Buffer(pair.active()),
                    KernelArg::Scalar(offset as u32),
                    KernelArg::Scalar(m32),
                ],
            )?;
        }

        self.device.execute(
            &self.shift,
            work,
            &[
                KernelArg::Buffer(pair.active()),
                KernelArg::Buffer(pair.scratch()),
                KernelArg::Scalar(total[0]),
                KernelArg::Scalar(n as u32),
                KernelArg::Scalar(m32),
            ],
        )?;
        pair.swap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::host::HostDevice;
    use crate::reference;
    use crate::testing::{host, random_values, CountingDevice};

    const VARIANTS: [ScanVariant; 2] = [ScanVariant::Naive, ScanVariant::Tree];

    fn engine(device: &HostDevice) -> ScanEngine<'_, HostDevice> {
        ScanEngine::new(device, ScanConfig::default()).unwrap()
    }

    #[test]
    fn concrete_scan() {
        let device = host();
        let engine = engine(&device);
        let input = [3, 1, 4, 1, 5, 9, 2, 6];
        for variant in VARIANTS {
            let actual = engine.scan(variant, &input).unwrap();
            assert_eq!(actual, vec![3, 4, 8, 9, 14, 23, 25, 31], "{:?}", variant);
        }
    }

    #[test]
    fn empty_and_single_element_inputs_are_unchanged() {
        let device = CountingDevice::new(host());
        let engine = ScanEngine::new(&device, ScanConfig::default()).unwrap();
        for variant in VARIANTS {
            assert_eq!(engine.scan(variant, &[]).unwrap(), Vec::<u32>::new());
            assert_eq!(engine.scan(variant, &[42]).unwrap(), vec![42]);
            assert!(device.take().is_empty(), "{:?} dispatched", variant);
        }
    }

    #[test]
    fn matches_sequential_scan() {
        let device = host();
        let engine = engine(&device);
        for n in [2, 3, 4095, 4096, 4097, 1 << 20] {
            let input = random_values(n, 1023, n as u64);
            let expected = reference::inclusive_scan(&input);
            for variant in VARIANTS {
                let actual = engine.scan(variant, &input).unwrap();
                assert_eq!(actual, expected, "{:?} n={}", variant, n);
            }
        }
    }

    #[test]
    fn variants_agree() {
        let device = host();
        let engine = engine(&device);
        let input = random_values(10_000, 1023, 7);
        let naive = engine.scan(ScanVariant::Naive, &input).unwrap();
        let tree = engine.scan(ScanVariant::Tree, &input).unwrap();
        assert_eq!(naive, tree);
    }

    #[test]
    fn additions_wrap_around() {
        let device = host();
        let engine = engine(&device);
        let input = [u32::MAX, 2, 3];
        for variant in VARIANTS {
            assert_eq!(engine.scan(variant, &input).unwrap(), vec![u32::MAX, 1, 4]);
        }
    }

    #[test]
    fn pass_counts_depend_only_on_length() {
        let device = CountingDevice::new(host());
        let engine = ScanEngine::new(&device, ScanConfig::default()).unwrap();

        for n in [2, 5, 8, 1000] {
            let mut counts = vec![];
            for seed in 0..2 {
                let input = random_values(n, 1023, seed);
                engine.scan(ScanVariant::Naive, &input).unwrap();
                let naive = device.take();
                assert_eq!(naive.len(), pass_count(n));

                engine.scan(ScanVariant::Tree, &input).unwrap();
                let tree = device.take();
                let levels = pass_count(padded_len(n));
                assert_eq!(tree.len(), 2 * levels + 1);
                assert_eq!(tree[..levels], vec![entry::PREFIX_SUM_UP_SWEEP; levels][..]);
                assert_eq!(tree.last(), Some(&entry::PREFIX_SUM_SHIFT));
                counts.push((naive, tree));
            }
            assert_eq!(counts[0], counts[1]);
        }
    }

    #[test]
    fn workspace_is_reused_across_sizes() {
        let device = host();
        let engine = engine(&device);
        let mut workspace = engine.workspace(16).unwrap();

        let large = random_values(100, 1023, 1);
        let small = random_values(10, 1023, 2);
        for input in [&large, &small, &large] {
            for variant in VARIANTS {
                let actual = engine.scan_with(variant, &mut workspace, input).unwrap();
                assert_eq!(actual, reference::inclusive_scan(input));
            }
        }
    }

    #[test]
    fn zero_group_size_is_rejected() {
        let device = host();
        let result = ScanEngine::new(&device, ScanConfig { group_size: 0 });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
