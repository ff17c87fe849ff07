//! NVIDIA GPU backend over `cust`, running the PTX built from `scan_sort_gpu`.

use super::{check_bounds, Device, DeviceBuffer, KernelArg, WorkSize};
use crate::error::{Error, Result};
use cust::context::Context;
use cust::memory::{CopyDestination, DeviceBuffer as CuBuffer};
use cust::module::Module;
use cust::prelude::*;
use cust::stream::{Stream, StreamFlags};
use log::trace;
use std::ffi::c_void;

static PTX: &str = include_str!("../../../resources/scan_sort_gpu.ptx");

pub struct CudaBuffer {
    buf: CuBuffer<u32>,
}

impl DeviceBuffer for CudaBuffer {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn resize(&mut self, len: usize) -> Result<()> {
        self.buf = CuBuffer::zeroed(len).map_err(|e| Error::Allocation {
            len,
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn write(&mut self, src: &[u32], offset: usize) -> Result<()> {
        check_bounds(offset, src.len(), self.len())?;
        if src.is_empty() {
            return Ok(());
        }
        let mut slice = self.buf.index(offset..offset + src.len());
        slice.copy_from(src)?;
        Ok(())
    }

    fn read(&self, dst: &mut [u32], offset: usize) -> Result<()> {
        check_bounds(offset, dst.len(), self.len())?;
        if dst.is_empty() {
            return Ok(());
        }
        let slice = self.buf.index(offset..offset + dst.len());
        slice.copy_to(dst)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CudaKernel {
    entry: &'static str,
}

pub struct CudaDevice {
    module: Module,
    stream: Stream,
    name: String,
    // Declared last so it is dropped after the module and stream.
    _context: Context,
}

impl CudaDevice {
    /// Creates a context on the GPU with the given ordinal and loads the
    /// kernel module.
    pub fn new(ordinal: usize) -> Result<Self> {
        cust::init(CudaFlags::empty())?;
        let device = cust::device::Device::get_device(ordinal as u32)?;
        let context = Context::new(device)?;
        let module = Module::from_ptx(PTX, &[]).map_err(|e| Error::Compilation {
            entry: "module",
            reason: e.to_string(),
        })?;
        let stream = Stream::new(StreamFlags::NON_BLOCKING, None)?;
        let name = device.name()?;

        Ok(Self {
            module,
            stream,
            name,
            _context: context,
        })
    }
}

/// Storage for one launch argument; the launch takes pointers into it.
enum RawArg {
    Ptr(u64),
    Scalar(u32),
}

impl Device for CudaDevice {
    type Buffer = CudaBuffer;
    type Kernel = CudaKernel;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn alloc(&self, len: usize) -> Result<CudaBuffer> {
        let buf = CuBuffer::zeroed(len).map_err(|e| Error::Allocation {
            len,
            reason: e.to_string(),
        })?;
        Ok(CudaBuffer { buf })
    }

    fn compile(&self, entry: &'static str) -> Result<CudaKernel> {
        self.module
            .get_function(entry)
            .map_err(|e| Error::Compilation {
                entry,
                reason: e.to_string(),
            })?;
        Ok(CudaKernel { entry })
    }

    fn execute(
        &self,
        kernel: &CudaKernel,
        work: WorkSize,
        args: &[KernelArg<'_, CudaBuffer>],
    ) -> Result<()> {
        if work.groups() == 0 {
            return Ok(());
        }
        trace!(
            "{}: {} groups of {}",
            kernel.entry,
            work.groups(),
            work.group_size
        );
        let func = self.module.get_function(kernel.entry)?;

        let mut raw = args
            .iter()
            .map(|arg| match arg {
                KernelArg::Buffer(buffer) => RawArg::Ptr(buffer.buf.as_device_ptr().as_raw()),
                KernelArg::Scalar(value) => RawArg::Scalar(*value),
            })
            .collect::<Vec<_>>();
        let params = raw
            .iter_mut()
            .map(|arg| match arg {
                RawArg::Ptr(ptr) => ptr as *mut u64 as *mut c_void,
                RawArg::Scalar(value) => value as *mut u32 as *mut c_void,
            })
            .collect::<Vec<_>>();

        unsafe {
            self.stream.launch(
                &func,
                work.groups() as u32,
                work.group_size as u32,
                0,
                &params,
            )?;
        }
        self.stream.synchronize()?;
        Ok(())
    }
}
