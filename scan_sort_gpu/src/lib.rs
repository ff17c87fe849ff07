#![cfg_attr(
    target_os = "cuda",
    no_std,
    feature(register_attr),
    register_attr(nvvm_internal)
)]

#[cfg(target_os = "cuda")]
pub mod kernels;
pub mod memory;
pub mod radix;
pub mod scan;
pub mod step;
