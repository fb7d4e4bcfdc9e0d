/*
 * Swarm Simulation Benchmark
 *
 * Measures the hot paths of one tick: rebuilding and querying the spatial
 * grid, computing flocking forces, and full simulation steps for each
 * variant at several population sizes.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nannou::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use swarmsim::spatial_grid::{neighbors_brute_force, SpatialGrid};
use swarmsim::steering::{self, Limits, Neighbor};
use swarmsim::{AgentKind, Simulation, SimulationConfig, Variant};

const WORLD: f32 = 2000.0;
const SIZES: [usize; 4] = [100, 300, 1000, 2000];

fn random_positions(n: usize, rng: &mut SmallRng) -> Vec<Vec2> {
    (0..n)
        .map(|_| Vec2::new(rng.gen_range(-WORLD / 2.0..WORLD / 2.0), rng.gen_range(-WORLD / 2.0..WORLD / 2.0)))
        .collect()
}

fn bench_spatial_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_query");
    let mut rng = SmallRng::seed_from_u64(1);

    for &n in SIZES.iter() {
        let positions = random_positions(n, &mut rng);

        group.bench_with_input(BenchmarkId::new("grid", n), &positions, |b, positions| {
            let mut grid = SpatialGrid::new(50.0, WORLD, WORLD);
            b.iter(|| {
                grid.rebuild(positions);
                let mut total = 0;
                for i in 0..positions.len() {
                    grid.for_each_neighbor(positions, i, 50.0, |_, _| total += 1);
                }
                black_box(total)
            });
        });

        group.bench_with_input(BenchmarkId::new("brute_force", n), &positions, |b, positions| {
            b.iter(|| {
                let total: usize = (0..positions.len())
                    .map(|i| neighbors_brute_force(positions, i, 50.0).len())
                    .sum();
                black_box(total)
            });
        });
    }

    group.finish();
}

fn bench_flocking_forces(c: &mut Criterion) {
    let mut group = c.benchmark_group("flocking_forces");
    let mut rng = SmallRng::seed_from_u64(2);
    let limits = Limits {
        max_speed: 4.0,
        max_force: 0.2,
    };

    for &k in [8usize, 32, 128].iter() {
        let neighbors: Vec<Neighbor> = (0..k)
            .map(|i| {
                let position = Vec2::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
                Neighbor {
                    index: i,
                    position,
                    velocity: Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)),
                    kind: AgentKind::Boid,
                    distance: position.length(),
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(k), &neighbors, |b, neighbors| {
            let velocity = Vec2::new(1.0, 0.5);
            b.iter(|| {
                let force = steering::separation(Vec2::ZERO, velocity, neighbors, 25.0, limits)
                    + steering::alignment(velocity, neighbors, limits)
                    + steering::cohesion(Vec2::ZERO, velocity, neighbors, limits);
                black_box(force)
            });
        });
    }

    group.finish();
}

fn bench_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for variant in Variant::ALL {
        for &n in [100usize, 300, 1000].iter() {
            let mut config = SimulationConfig::for_variant(variant);
            config.boid_count = n;
            config.ant_count = n;
            config.small_fish_count = n / 2;
            config.medium_fish_count = n / 4;
            config.large_fish_count = n / 8;

            let id = BenchmarkId::new(variant.label(), n);
            group.bench_function(id, |b| {
                let mut simulation = Simulation::new(config.clone(), 7);
                b.iter(|| {
                    simulation.step();
                    black_box(simulation.statistics().total)
                });
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_spatial_grid, bench_flocking_forces, bench_simulation_step
}

criterion_main!(benches);
