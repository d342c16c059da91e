/*
 * Simulation Benchmark
 *
 * Measures the spatial index under move churn and the cost of simulation
 * steps for a few population sizes and worker counts.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use pals::vec2::vec2;
use pals::{AgentState, Settings, Simulation, SimulationParams, SpatialIndex};

fn settings(start_agents: usize, max_agents: usize, threads: usize) -> Settings {
    Settings {
        start_agents,
        max_agents,
        threads,
        iterations: 0,
        headless: true,
        ..Settings::default()
    }
}

// Random moves of every indexed agent, most of them crossing buckets
fn bench_spatial_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_index");

    for count in [1_000usize, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &n| {
            let mut rng = StdRng::seed_from_u64(7);
            let index = SpatialIndex::new(1024.0, 16);
            let mut positions: Vec<_> = (0..n)
                .map(|_| vec2(rng.gen_range(-1024.0..1024.0), rng.gen_range(-1024.0..1024.0)))
                .collect();
            for (id, &position) in positions.iter().enumerate() {
                index.set(id, position);
            }

            b.iter(|| {
                for (id, position) in positions.iter_mut().enumerate() {
                    let next = vec2(rng.gen_range(-1024.0..1024.0), rng.gen_range(-1024.0..1024.0));
                    index.moved(id, *position, next);
                    *position = next;
                }
                black_box(index.len())
            });
        });
    }

    group.finish();
}

// One step over a seeded, mostly incubating population
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    group.measurement_time(Duration::from_secs(10));

    for &(agents, threads) in [(10_000usize, 1usize), (10_000, 4), (100_000, 1), (100_000, 4)].iter() {
        let id = format!("{agents}_agents_{threads}_threads");
        group.bench_function(BenchmarkId::from_parameter(id), |b| {
            let simulation =
                Simulation::new(&settings(agents, agents * 2, threads), SimulationParams::default()).expect("valid settings");
            b.iter(|| simulation.step(black_box(0.1)));
        });
    }

    group.finish();
}

// Hunters spread over the map, each with prey in its bucket
fn bench_hunting_step(c: &mut Criterion) {
    c.bench_function("hunting_step", |b| {
        let mut rng = StdRng::seed_from_u64(11);
        let simulation = Simulation::new(&settings(0, 20_000, 4), SimulationParams::default()).expect("valid settings");
        for _ in 0..5_000 {
            let position = vec2(rng.gen_range(-1000.0..1000.0), rng.gen_range(-1000.0..1000.0));
            simulation.place_agent(position, 4.0, AgentState::Hunting);
            simulation.place_agent(position + vec2(20.0, 0.0), 0.5, AgentState::Incubating);
        }

        b.iter(|| simulation.step(black_box(0.1)));
    });
}

criterion_group!(benches, bench_spatial_index, bench_step, bench_hunting_step);
criterion_main!(benches);
