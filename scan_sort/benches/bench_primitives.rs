use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;
use rayon::prelude::*;
use scan_sort::reference::{parallel_scan, sequential_scan};
use scan_sort::{HostDevice, RadixConfig, RadixSort, ScanConfig, ScanEngine, ScanVariant};

const SEED: &[u8; 32] = b"LVXn6sWNasjDReRS2OZ9a0eY1aprVNYX";

/// Creates `count` random values no larger than `max`.
fn create_random_values(count: usize, max: u32, rng: &mut impl Rng) -> Vec<u32> {
    (0..count).map(|_| rng.gen_range(0..=max)).collect()
}

pub fn scan_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scan comparison");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);

    let device = HostDevice::new(0).unwrap();
    let engine = ScanEngine::new(&device, ScanConfig::default()).unwrap();

    for n in [1usize << 16, 1 << 18, 1 << 20] {
        let mut rng = Hc128Rng::from_seed(*SEED);
        let input = create_random_values(n, 1023, &mut rng);
        let mut output = vec![0u32; n];
        let mut workspace = engine.workspace(n).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("CPU", n), &n, |b, _| {
            b.iter(|| sequential_scan(&input, &mut output))
        });

        group.bench_with_input(BenchmarkId::new("CPU (rayon)", n), &n, |b, _| {
            b.iter(|| parallel_scan(&input, &mut output))
        });

        for variant in [ScanVariant::Naive, ScanVariant::Tree] {
            group.bench_with_input(BenchmarkId::new(variant.label(), n), &n, |b, _| {
                b.iter(|| {
                    workspace.load(&input).unwrap();
                    engine.run(variant, &mut workspace).unwrap();
                })
            });
        }
    }

    group.finish();
}

pub fn sort_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sort comparison");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);

    let device = HostDevice::new(0).unwrap();
    let sorter = RadixSort::new(&device, RadixConfig::default()).unwrap();

    for n in [1usize << 14, 1 << 16, 1 << 18] {
        let mut rng = Hc128Rng::from_seed(*SEED);
        let input = create_random_values(n, i32::MAX as u32, &mut rng);
        let mut workspace = sorter.workspace(n).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("sort_unstable", n), &n, |b, _| {
            b.iter(|| {
                let mut keys = input.clone();
                keys.sort_unstable();
            })
        });

        group.bench_with_input(BenchmarkId::new("par_sort_unstable", n), &n, |b, _| {
            b.iter(|| {
                let mut keys = input.clone();
                keys.par_sort_unstable();
            })
        });

        group.bench_with_input(BenchmarkId::new("radix", n), &n, |b, _| {
            b.iter(|| {
                workspace.load(&input).unwrap();
                sorter.run(&mut workspace).unwrap();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, scan_comparison, sort_comparison);
criterion_main!(benches);
