//! The benchmark driver: times every variant on the same data and checks each
//! device result against the CPU reference before reporting it.

use crate::data::{scan_input, scan_values_range, sort_input};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::oracle::expect_same;
use crate::radix::{RadixConfig, RadixSort};
use crate::reference::{inclusive_scan, parallel_scan, parallel_sort, sequential_scan, sequential_sort};
use crate::scan::{ScanConfig, ScanEngine, ScanVariant};
use crate::timer::LapTimer;
use log::info;
use scan_sort_gpu::step::mult_step;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Timed runs per variant.
    pub iters: usize,
    /// Smallest scan size; sizes grow by a factor of four.
    pub min_n: usize,
    /// Largest scan size.
    pub max_n: usize,
    /// Sort size. Zero skips the sort benchmark.
    pub sort_n: usize,
    pub scan: ScanConfig,
    pub radix: RadixConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iters: 10,
            min_n: 4096,
            max_n: 1 << 24,
            sort_n: 1 << 22,
            scan: ScanConfig::default(),
            radix: RadixConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub label: String,
    pub n: usize,
    /// Mean seconds per run.
    pub avg: f64,
    pub std: f64,
}

impl Measurement {
    fn new(label: impl Into<String>, n: usize, timer: &LapTimer) -> Self {
        Self {
            label: label.into(),
            n,
            avg: timer.lap_avg(),
            std: timer.lap_std(),
        }
    }

    pub fn millions_per_second(&self) -> f64 {
        if self.avg == 0.0 {
            return f64::INFINITY;
        }
        (self.n as f64 / 1000.0 / 1000.0) / self.avg
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {:.6}+-{:.6} s", self.label, self.avg, self.std)?;
        write!(f, "{}: {:.2} millions/s", self.label, self.millions_per_second())
    }
}

/// Scan sizes from `min_n` to `max_n`, growing by a factor of four.
pub fn scan_sizes(min_n: usize, max_n: usize) -> Vec<usize> {
    mult_step(min_n.max(1), 4)
        .take_while(|&n| n <= max_n)
        .collect()
}

/// Times the CPU and device scans of `input`.
pub fn bench_scan<D: Device>(
    engine: &ScanEngine<'_, D>,
    input: &[u32],
    iters: usize,
) -> Result<Vec<Measurement>> {
    let n = input.len();
    let reference = inclusive_scan(input);
    let mut measurements = vec![];

    let mut result = vec![0u32; n];
    let mut timer = LapTimer::new();
    for _ in 0..iters {
        timer.restart();
        sequential_scan(input, &mut result);
        timer.next_lap();
    }
    expect_same(&reference, &result, "CPU result should be consistent!")?;
    measurements.push(Measurement::new("CPU", n, &timer));

    let mut timer = LapTimer::new();
    for _ in 0..iters {
        timer.restart();
        parallel_scan(input, &mut result);
        timer.next_lap();
    }
    expect_same(&reference, &result, "CPU (rayon) result should be consistent!")?;
    measurements.push(Measurement::new("CPU (rayon)", n, &timer));

    let mut workspace = engine.workspace(n)?;
    for variant in [ScanVariant::Naive, ScanVariant::Tree] {
        let mut timer = LapTimer::new();
        for _ in 0..iters {
            workspace.load(input)?;
            timer.restart();
            engine.run(variant, &mut workspace)?;
            timer.next_lap();
        }
        let result = workspace.read()?;
        expect_same(&reference, &result, "GPU result should be consistent!")?;
        measurements.push(Measurement::new(
            format!("GPU ({})", variant.label()),
            n,
            &timer,
        ));
    }

    Ok(measurements)
}

/// Times the CPU sorts and the device radix sort of `input`.
pub fn bench_sort<D: Device>(
    sorter: &RadixSort<'_, D>,
    input: &[u32],
    iters: usize,
) -> Result<Vec<Measurement>> {
    let n = input.len();
    let mut measurements = vec![];

    let mut reference = vec![];
    let mut timer = LapTimer::new();
    for _ in 0..iters {
        timer.restart();
        reference = input.to_vec();
        sequential_sort(&mut reference);
        timer.next_lap();
    }
    measurements.push(Measurement::new("CPU", n, &timer));

    let mut result = vec![];
    let mut timer = LapTimer::new();
    for _ in 0..iters {
        timer.restart();
        result = input.to_vec();
        parallel_sort(&mut result);
        timer.next_lap();
    }
    expect_same(&reference, &result, "CPU (rayon) results should be equal to CPU results!")?;
    measurements.push(Measurement::new("CPU (rayon)", n, &timer));

    let mut workspace = sorter.workspace(n)?;
    let mut timer = LapTimer::new();
    for _ in 0..iters {
        workspace.load(input)?;
        timer.restart();
        sorter.run(&mut workspace)?;
        timer.next_lap();
    }
    let result = workspace.read()?;
    expect_same(&reference, &result, "GPU results should be equal to CPU results!")?;
    measurements.push(Measurement::new("GPU (radix)", n, &timer));

    Ok(measurements)
}

/// Runs every benchmark in `config` on `device`, printing results to stdout.
/// Stops at the first failed check.
pub fn run<D: Device>(device: &D, config: &BenchConfig) -> Result<()> {
    if config.iters == 0 {
        return Err(Error::InvalidConfig("at least one iteration is needed".into()));
    }
    info!("benchmarking on {}", device.name());

    let engine = ScanEngine::new(device, config.scan)?;
    for n in scan_sizes(config.min_n, config.max_n) {
        println!("______________________________________________");
        println!("n={} values in range: [0; {}]", n, scan_values_range(n));
        let input = scan_input(n);
        for measurement in bench_scan(&engine, &input, config.iters)? {
            println!("{}", measurement);
        }
    }

    if config.sort_n > 0 {
        let sorter = RadixSort::new(device, config.radix)?;
        println!("______________________________________________");
        let input = sort_input(config.sort_n);
        println!("Data generated for n={}!", config.sort_n);
        for measurement in bench_sort(&sorter, &input, config.iters)? {
            println!("{}", measurement);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::host;

    #[test]
    fn scan_sizes_test() {
        assert_eq!(scan_sizes(4096, 1 << 16), vec![4096, 16384, 65536]);
        assert_eq!(scan_sizes(4096, 4095), Vec::<usize>::new());
    }

    #[test]
    fn scan_benchmark_reports_every_variant() {
        let device = host();
        let engine = ScanEngine::new(&device, ScanConfig::default()).unwrap();
        let measurements = bench_scan(&engine, &scan_input(4096), 2).unwrap();
        let labels = measurements.iter().map(|m| m.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["CPU", "CPU (rayon)", "GPU (naive)", "GPU (tree)"]);
        assert!(measurements.iter().all(|m| m.n == 4096 && m.avg >= 0.0));
    }

    #[test]
    fn sort_benchmark_reports_every_variant() {
        let device = host();
        let sorter = RadixSort::new(&device, RadixConfig::default()).unwrap();
        let measurements = bench_sort(&sorter, &sort_input(3000), 1).unwrap();
        let labels = measurements.iter().map(|m| m.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["CPU", "CPU (rayon)", "GPU (radix)"]);
    }

    #[test]
    fn run_small_config() {
        let device = host();
        let config = BenchConfig {
            iters: 1,
            max_n: 16384,
            sort_n: 1000,
            ..BenchConfig::default()
        };
        run(&device, &config).unwrap();
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let device = host();
        let config = BenchConfig {
            iters: 0,
            ..BenchConfig::default()
        };
        assert!(matches!(run(&device, &config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn measurement_display() {
        let m = Measurement {
            label: "GPU (tree)".to_string(),
            n: 2_000_000,
            avg: 0.5,
            std: 0.25,
        };
        assert_eq!(m.millions_per_second(), 4.0);
        assert_eq!(
            m.to_string(),
            "GPU (tree): 0.500000+-0.250000 s\nGPU (tree): 4.00 millions/s"
        );
    }
}
