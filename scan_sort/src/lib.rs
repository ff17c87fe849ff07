//! Multi-pass parallel scan and radix sort, orchestrated from the host over a
//! pluggable device, together with the CPU baselines and the checks used to
//! benchmark them.

pub mod bench;
pub mod buffers;
pub mod data;
pub mod device;
mod error;
pub mod oracle;
pub mod radix;
pub mod reference;
pub mod scan;
#[cfg(test)]
mod testing;
pub mod timer;

pub use device::host::HostDevice;
pub use device::{Device, DeviceBuffer};
pub use error::{Error, Result};
pub use radix::{RadixConfig, RadixSort};
pub use scan::{ScanConfig, ScanEngine, ScanVariant};

/// Inclusive prefix sum of `input` with the work-efficient scan.
pub fn scan<D: Device>(device: &D, input: &[u32]) -> Result<Vec<u32>> {
    ScanEngine::new(device, ScanConfig::default())?.scan(ScanVariant::Tree, input)
}

/// `input` sorted ascending.
pub fn radix_sort<D: Device>(device: &D, input: &[u32]) -> Result<Vec<u32>> {
    RadixSort::new(device, RadixConfig::default())?.sort(input)
}
