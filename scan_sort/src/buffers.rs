use crate::device::DeviceBuffer;
use crate::error::Result;

const ZEROS: [u32; 4096] = [0; 4096];

/// Two same-length buffers used as ping-pong storage.
///
/// Passes read from `active` and write to `scratch`, then call `swap`, which
/// exchanges the roles of the two handles without moving any data.
pub struct BufferPair<B> {
    active: B,
    scratch: B,
}

impl<B: DeviceBuffer> BufferPair<B> {
    pub fn new(active: B, scratch: B) -> Self {
        Self { active, scratch }
    }

    pub fn active(&self) -> &B {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut B {
        &mut self.active
    }

    pub fn scratch(&self) -> &B {
        &self.scratch
    }

    pub fn scratch_mut(&mut self) -> &mut B {
        &mut self.scratch
    }

    pub fn swap(&mut self) {
        self.active.swap(&mut self.scratch);
    }

    /// Capacity in elements, the smaller of the two buffers.
    pub fn len(&self) -> usize {
        self.active.len().min(self.scratch.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grows both buffers to at least `len` elements. Never shrinks.
    pub fn reserve(&mut self, len: usize) -> Result<()> {
        for buffer in [&mut self.active, &mut self.scratch] {
            if buffer.len() < len {
                buffer.resize(len)?;
            }
        }
        Ok(())
    }
}

/// Writes `count` zeros into `buffer` starting at `offset`.
pub fn fill_zero<B: DeviceBuffer>(buffer: &mut B, offset: usize, count: usize) -> Result<()> {
    let mut written = 0;
    while written < count {
        let chunk = (count - written).min(ZEROS.len());
        buffer.write(&ZEROS[..chunk], offset + written)?;
        written += chunk;
    }
    Ok(())
}

/// Length of the zero-padded power-of-two array a tree scan of `n` elements
/// runs over.
pub fn padded_len(n: usize) -> usize {
    n.next_power_of_two()
}
