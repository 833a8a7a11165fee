//! Benchmarks for generation stepping and neighbour counting.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use torus_life::{
    compute::{Dispatcher, Grid, IndexMapper, LifeLikeRule, NeighborCounter},
    schema::{Pattern, Seed},
};

fn random_seed() -> Seed {
    Seed {
        pattern: Pattern::Random {
            density: 0.3,
            seed: 42,
        },
    }
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for size in [64, 256, 1024, 2048] {
        for (name, dispatcher) in [
            ("sequential", Dispatcher::sequential()),
            ("parallel", Dispatcher::parallel()),
        ] {
            let mut grid =
                Grid::with_rule(size, size, &random_seed(), LifeLikeRule::conway(), dispatcher)
                    .unwrap();

            group.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", size, size)),
                &size,
                |b, _| {
                    b.iter(|| {
                        black_box(&mut grid).step();
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_tile_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_size");
    let size = 1024;

    for tile in [4, 8, 16, 64] {
        let dispatcher = Dispatcher::parallel().with_tile_size(tile, tile);
        let mut grid =
            Grid::with_rule(size, size, &random_seed(), LifeLikeRule::conway(), dispatcher)
                .unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", tile, tile)),
            &tile,
            |b, _| {
                b.iter(|| {
                    black_box(&mut grid).step();
                });
            },
        );
    }

    group.finish();
}

fn bench_neighbor_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_count");
    let size = 512;

    let grid = Grid::new(size, size, &random_seed()).unwrap();
    let mapper = IndexMapper::try_new(size, size).unwrap();
    let counter = NeighborCounter::new(mapper);
    let cells = grid.current_view();

    group.bench_function("branch", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for y in 0..size {
                for x in 0..size {
                    total += counter.count(black_box(cells), x, y) as u32;
                }
            }
            total
        });
    });

    group.bench_function("modular", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for y in 0..size {
                for x in 0..size {
                    total += counter.count_modular(black_box(cells), x, y) as u32;
                }
            }
            total
        });
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_tile_size, bench_neighbor_count);
criterion_main!(benches);
