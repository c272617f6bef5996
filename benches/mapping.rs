//! Benchmarks for Sonify value mapping and signal resolution

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sonify::{map_continuous, resolve, Registry, SampleResult};

fn generate_values(count: usize) -> Vec<f64> {
    (0..count).map(|i| (i as f64 * 0.37) % 120.0 - 10.0).collect()
}

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");
    let values = generate_values(1000);

    group.throughput(Throughput::Elements(1000));

    group.bench_function("map_continuous_1000", |b| {
        b.iter(|| {
            for v in &values {
                black_box(map_continuous(*v, 8, 0.0, 100.0));
            }
        })
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let registry = Registry::cluster_defaults().unwrap();
    let cpu = registry.lookup("cpu_usage").unwrap();
    let samples: Vec<SampleResult> = generate_values(1000)
        .into_iter()
        .map(SampleResult::new)
        .collect();

    group.throughput(Throughput::Elements(1000));

    group.bench_function("resolve_1000_signals", |b| {
        b.iter(|| {
            for sample in &samples {
                let index = cpu.index_for(sample.value);
                black_box(resolve(cpu, index, sample));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_mapping, bench_resolve);
criterion_main!(benches);
