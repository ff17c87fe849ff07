//! Test helpers shared by the engine tests.

use crate::device::{host::HostDevice, Device, KernelArg, WorkSize};
use crate::error::Result;
use std::sync::Mutex;

pub(crate) use crate::data::random_values;

pub(crate) fn host() -> HostDevice {
    HostDevice::new(4).unwrap()
}

/// Wraps a device and records the entry point of every dispatch.
pub(crate) struct CountingDevice<D> {
    inner: D,
    dispatches: Mutex<Vec<&'static str>>,
}

impl<D: Device> CountingDevice<D> {
    pub(crate) fn new(inner: D) -> Self {
        Self {
            inner,
            dispatches: Mutex::new(Vec::new()),
        }
    }

    /// Returns and clears the recorded dispatches.
    pub(crate) fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.dispatches.lock().unwrap())
    }
}

impl<D: Device> Device for CountingDevice<D> {
    type Buffer = D::Buffer;
    type Kernel = (&'static str, D::Kernel);

    fn name(&self) -> String {
        format!("counting {}", self.inner.name())
    }

    fn alloc(&self, len: usize) -> Result<D::Buffer> {
        self.inner.alloc(len)
    }

    fn compile(&self, entry: &'static str) -> Result<Self::Kernel> {
        Ok((entry, self.inner.compile(entry)?))
    }

    fn execute(
        &self,
        kernel: &Self::Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, D::Buffer>],
    ) -> Result<()> {
        self.dispatches.lock().unwrap().push(kernel.0);
        self.inner.execute(&kernel.1, work, args)
    }
}
