use core::sync::atomic::{AtomicU32, Ordering};

/// Word-addressed global memory as seen by a single work item.
///
/// Work items of one launch run without any ordering between them, so kernels
/// must only read locations that no other work item of the same launch writes.
pub trait GlobalMemory {
    fn load(&self, i: usize) -> u32;
    fn store(&self, i: usize, value: u32);
}

/// Host-emulated global memory. Relaxed ordering is enough because launches
/// are separated by a full join on the host.
impl GlobalMemory for [AtomicU32] {
    #[inline(always)]
    fn load(&self, i: usize) -> u32 {
        self[i].load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn store(&self, i: usize, value: u32) {
        self[i].store(value, Ordering::Relaxed)
    }
}

/// Raw device pointer into global memory.
#[derive(Clone, Copy)]
pub struct DevicePtr(*mut u32);

impl DevicePtr {
    /// # Safety
    ///
    /// `ptr` must point to an allocation covering every index the kernel
    /// touches, and must stay valid for the duration of the launch.
    pub unsafe fn new(ptr: *mut u32) -> Self {
        Self(ptr)
    }
}

impl GlobalMemory for DevicePtr {
    #[inline(always)]
    fn load(&self, i: usize) -> u32 {
        unsafe { *self.0.add(i) }
    }

    #[inline(always)]
    fn store(&self, i: usize, value: u32) {
        unsafe { *(&mut *self.0.add(i)) = value }
    }
}

#[cfg(test)]
pub(crate) fn atomics(values: &[u32]) -> Vec<AtomicU32> {
    values.iter().map(|&v| AtomicU32::new(v)).collect()
}

#[cfg(test)]
pub(crate) fn plain(values: &[AtomicU32]) -> Vec<u32> {
    values.iter().map(|v| v.load(Ordering::Relaxed)).collect()
}
