//! Simulation benchmarks for skyship_core.
//!
//! Run with: `cargo bench -p skyship_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skyship_core::allocation::{allocate, AllocationRequest};
use skyship_core::components::PriorityMode;
use skyship_core::simulation::VehicleCommand;
use skyship_test_utils::fixtures::{anti_grav_frigate, frigate, jet_frigate, simulation_with};

/// Allocation under contention for every priority mode.
pub fn allocation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");
    for mode in [
        PriorityMode::Balanced,
        PriorityMode::LiftPriority,
        PriorityMode::ThrustPriority,
    ] {
        let request = AllocationRequest {
            requested_thrust: 180.0,
            requested_lift: 60.0,
            output: 200.0,
            minimum_hover_power: 30.0,
            mode,
        };
        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &request, |b, r| {
            b.iter(|| allocate(black_box(r)));
        });
    }
    group.finish();
}

/// Full ticks of a mixed fleet.
pub fn simulation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for fleet_size in [1usize, 16, 128] {
        let fleet: Vec<_> = (0..fleet_size)
            .map(|i| match i % 3 {
                0 => frigate(),
                1 => jet_frigate(),
                _ => anti_grav_frigate(0.5),
            })
            .collect();
        let (mut sim, ids) = simulation_with(42, &fleet);
        for id in ids {
            let _ = sim.apply_command(id, VehicleCommand::SetKnotsAhead { plant: 0, knots: 15.0 });
        }

        group.bench_with_input(BenchmarkId::from_parameter(fleet_size), &fleet_size, |b, _| {
            b.iter(|| black_box(sim.tick()));
        });
    }
    group.finish();
}

criterion_group!(benches, allocation_benchmark, simulation_benchmark);
criterion_main!(benches);
