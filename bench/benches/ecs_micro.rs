//! ECS microbenchmarks using Criterion.
//!
//! Individual operations in isolation:
//! - Entity create/destroy
//! - Component attach/detach churn
//! - Query preparation (quiet and churning ticks)
//! - Field reads and writes

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use easel_bench::components::{Health, Position, Velocity};
use easel_ecs::{Query, World, WorldConfig};

fn world_with(capacity: usize) -> World {
    WorldConfig::new()
        .initial_capacity(capacity)
        .build()
        .unwrap()
}

// =============================================================================
// Spawn Benchmarks
// =============================================================================

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        // Bare entity creation
        group.bench_with_input(BenchmarkId::new("bare", count), &count, |b, &n| {
            b.iter(|| {
                let mut world = world_with(n);
                for _ in 0..n {
                    black_box(world.create().unwrap());
                }
            });
        });

        // Create plus two initialized components
        group.bench_with_input(BenchmarkId::new("two_components", count), &count, |b, &n| {
            b.iter(|| {
                let mut world = world_with(n);
                let position = Position::register(&mut world).unwrap();
                let velocity = Velocity::register(&mut world).unwrap();
                for i in 0..n {
                    let e = world.create().unwrap();
                    world
                        .attach_with(e, position.component, |entry| {
                            entry.set(position.x, i as f32);
                        })
                        .unwrap();
                    world.attach(e, velocity.component).unwrap();
                    black_box(e);
                }
            });
        });

        // Creation under doubling growth from a small initial capacity
        group.bench_with_input(BenchmarkId::new("growing", count), &count, |b, &n| {
            b.iter(|| {
                let mut world = world_with(64);
                for _ in 0..n {
                    black_box(world.create().unwrap());
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Attach/Detach Churn
// =============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("attach_detach", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let health = Health::register(&mut world).unwrap();
            let entities: Vec<_> = (0..n)
                .map(|_| {
                    let e = world.create().unwrap();
                    world.attach(e, position.component).unwrap();
                    e
                })
                .collect();

            b.iter(|| {
                for &e in &entities {
                    world.attach(e, health.component).unwrap();
                }
                for &e in &entities {
                    world.detach(e, health.component).unwrap();
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Query Preparation
// =============================================================================

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));

        // A tick with no accumulated mutations
        group.bench_with_input(BenchmarkId::new("quiet", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let velocity = Velocity::register(&mut world).unwrap();
            let _moving = world
                .register_query(Query::new().with(position.component).with(velocity.component))
                .unwrap();
            for _ in 0..n {
                let e = world.create().unwrap();
                world.attach(e, position.component).unwrap();
                world.attach(e, velocity.component).unwrap();
            }
            world.tick();

            b.iter(|| black_box(world.tick()));
        });

        // A tick folding in structural churn on 10% of the population
        group.bench_with_input(BenchmarkId::new("churning", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let velocity = Velocity::register(&mut world).unwrap();
            let _moving = world
                .register_query(Query::new().with(position.component).with(velocity.component))
                .unwrap();
            let entities: Vec<_> = (0..n)
                .map(|_| {
                    let e = world.create().unwrap();
                    world.attach(e, position.component).unwrap();
                    world.attach(e, velocity.component).unwrap();
                    e
                })
                .collect();
            world.tick();

            let mut flip = false;
            b.iter(|| {
                for e in entities.iter().step_by(10) {
                    if flip {
                        world.attach(*e, velocity.component).unwrap();
                    } else {
                        world.detach(*e, velocity.component).unwrap();
                    }
                }
                flip = !flip;
                black_box(world.tick())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Field Access
// =============================================================================

fn bench_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("access");

    for count in [1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("read_sum", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let entities: Vec<_> = (0..n)
                .map(|i| {
                    let e = world.create().unwrap();
                    world
                        .attach_with(e, position.component, |entry| {
                            entry.set(position.x, i as f32);
                        })
                        .unwrap();
                    e
                })
                .collect();

            b.iter(|| {
                let mut sum = 0.0f32;
                for &e in &entities {
                    sum += world.get(e, position.x).unwrap();
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("write", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let entities: Vec<_> = (0..n)
                .map(|_| {
                    let e = world.create().unwrap();
                    world.attach(e, position.component).unwrap();
                    e
                })
                .collect();

            b.iter(|| {
                for (i, &e) in entities.iter().enumerate() {
                    world.set(e, position.x, i as f32).unwrap();
                }
            });
        });

        // Batched writes through one entry per entity
        group.bench_with_input(BenchmarkId::new("entry_write", count), &count, |b, &n| {
            let mut world = world_with(n);
            let position = Position::register(&mut world).unwrap();
            let entities: Vec<_> = (0..n)
                .map(|_| {
                    let e = world.create().unwrap();
                    world.attach(e, position.component).unwrap();
                    e
                })
                .collect();

            b.iter(|| {
                for (i, &e) in entities.iter().enumerate() {
                    let mut entry = world.entry_mut(e, position.component).unwrap();
                    entry.set(position.x, i as f32);
                    entry.set(position.y, i as f32);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spawn, bench_churn, bench_tick, bench_access);
criterion_main!(benches);
