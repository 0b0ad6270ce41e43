//! Scenario benchmarks: whole frames through the scheduler.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use easel_bench::scenarios::{ParticleConfig, ParticleScenario, Scenario};

fn bench_particles(c: &mut Criterion) {
    let mut group = c.benchmark_group("particles");
    group.sample_size(20);

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("frame", count), &count, |b, &n| {
            let mut scenario = ParticleScenario::new(ParticleConfig {
                particle_count: n,
                ..ParticleConfig::default()
            })
            .unwrap();
            scenario.setup();

            b.iter(|| scenario.update());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_particles);
criterion_main!(benches);
