use std::panic::Location;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is fatal to the run: each one signals either a broken
/// environment or a logic error, never a transient condition.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to compile kernel `{entry}`: {reason}")]
    Compilation { entry: &'static str, reason: String },

    #[error("failed to allocate a device buffer of {len} elements: {reason}")]
    Allocation { len: usize, reason: String },

    #[error("access of {count} elements at offset {offset} is out of bounds for a buffer of {len}")]
    OutOfBounds {
        offset: usize,
        count: usize,
        len: usize,
    },

    #[error("kernel `{entry}` expects a {expected} at argument {index}")]
    KernelArgument {
        entry: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("kernel `{entry}` cannot address {len} elements with 32-bit indices")]
    TooLarge { entry: &'static str, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{message} But {expected} != {actual} at index {index}, {location}")]
    Mismatch {
        message: String,
        index: usize,
        expected: u32,
        actual: u32,
        location: &'static Location<'static>,
    },

    #[error("{message} But lengths differ: {expected} != {actual}, {location}")]
    LengthMismatch {
        message: String,
        expected: usize,
        actual: usize,
        location: &'static Location<'static>,
    },

    #[error("too big difference: average relative error {average:.4}% exceeds {threshold}%")]
    Tolerance { average: f64, threshold: f64 },

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[cfg(feature = "cuda")]
    #[error(transparent)]
    Cuda(#[from] cust::error::CudaError),
}
