use clap::{Parser, ValueEnum};
use scan_sort::bench::{self, BenchConfig};
use scan_sort::{HostDevice, RadixConfig, ScanConfig};
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Kernels emulated on a CPU thread pool.
    Host,
    /// Kernels on an NVIDIA GPU. Needs the `cuda` feature.
    Cuda,
}

/// Benchmarks device prefix sums and radix sort against CPU baselines.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum, default_value_t = Backend::Host)]
    backend: Backend,

    /// GPU ordinal for the cuda backend.
    #[arg(long, default_value_t = 0)]
    device: usize,

    /// Worker threads for the host backend, 0 for one per CPU.
    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value_t = 10)]
    iters: usize,

    #[arg(long, default_value_t = 4096)]
    min_n: usize,

    #[arg(long, default_value_t = 1 << 24)]
    max_n: usize,

    /// Number of keys to sort, 0 to skip the sort.
    #[arg(long, default_value_t = 1 << 22)]
    sort_n: usize,

    #[arg(long, default_value_t = 128)]
    group_size: usize,

    /// Keys per radix sort counter.
    #[arg(long, default_value_t = 128)]
    block_size: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = BenchConfig {
        iters: args.iters,
        min_n: args.min_n,
        max_n: args.max_n,
        sort_n: args.sort_n,
        scan: ScanConfig {
            group_size: args.group_size,
        },
        radix: RadixConfig {
            block_size: args.block_size,
            group_size: args.group_size,
        },
    };

    match args.backend {
        Backend::Host => {
            let device = HostDevice::new(args.threads)?;
            bench::run(&device, &config)?;
        }
        Backend::Cuda => run_cuda(args.device, &config)?,
    }
    Ok(())
}

#[cfg(feature = "cuda")]
fn run_cuda(ordinal: usize, config: &BenchConfig) -> Result<(), Box<dyn Error>> {
    let device = scan_sort::device::cuda::CudaDevice::new(ordinal)?;
    bench::run(&device, config)?;
    Ok(())
}

#[cfg(not(feature = "cuda"))]
fn run_cuda(_ordinal: usize, _config: &BenchConfig) -> Result<(), Box<dyn Error>> {
    Err("this binary was built without the `cuda` feature".into())
}
