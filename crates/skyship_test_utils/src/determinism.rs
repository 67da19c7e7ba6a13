//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Flight runs must replay bit-for-bit from a seed and a command script.
//! Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Vehicles are always ticked in sorted id order.
//!
//! - **System randomness**: Field jitter draws only from per-vehicle
//!   seeded `ChaCha8Rng` instances.
//!
//! - **Floating-point evaluation order**: Subsystems run in a fixed order
//!   and sum forces in plant index order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual subsystem behavior
//! 2. **Property tests**: Random command scripts still replay identically
//! 3. **Parallel tests**: Running N simulations on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skyship_core::simulation::Simulation;

/// Result of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether every run produced the same final hash.
    pub is_deterministic: bool,
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// Ticks per run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Distinct hashes, sorted.
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Panic with a diagnostic if the runs diverged.
    ///
    /// # Panics
    ///
    /// Panics if the result is not deterministic.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `setup`/`step` `runs` times and compare the final hashes.
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Two runs of a simulation built by `setup_fn` end in the same state.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run `num_sims` simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// First tick at which two runs diverge, if any. Tick 0 is the initial
/// state.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Hash any hashable value with the default hasher.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for flight inputs.
pub mod strategies {
    use glam::DVec3;
    use proptest::prelude::*;
    use skyship_core::components::PriorityMode;
    use skyship_core::simulation::VehicleCommand;

    /// Burn rates including out-of-range values.
    pub fn arb_burn_rate() -> impl Strategy<Value = f64> {
        -50.0f64..400.0
    }

    /// Commanded speeds (kt).
    pub fn arb_knots() -> impl Strategy<Value = f64> {
        0.0f64..60.0
    }

    /// Commanded vertical velocities (m/s).
    pub fn arb_vertical_velocity() -> impl Strategy<Value = f64> {
        -15.0f64..15.0
    }

    /// Any priority mode.
    pub fn arb_priority_mode() -> impl Strategy<Value = PriorityMode> {
        prop_oneof![
            Just(PriorityMode::Balanced),
            Just(PriorityMode::LiftPriority),
            Just(PriorityMode::ThrustPriority),
        ]
    }

    /// Commands valid for any single-plant vehicle with a lift unit.
    pub fn arb_command() -> impl Strategy<Value = VehicleCommand> {
        prop_oneof![
            arb_burn_rate().prop_map(|percent| VehicleCommand::SetBurnRate { plant: 0, percent }),
            arb_knots().prop_map(|knots| VehicleCommand::SetKnotsAhead { plant: 0, knots }),
            arb_knots().prop_map(|knots| VehicleCommand::SetKnotsAstern { plant: 0, knots }),
            Just(VehicleCommand::AllStop),
            arb_priority_mode().prop_map(|mode| VehicleCommand::SetPriorityMode { plant: 0, mode }),
            (0.0f64..100.0)
                .prop_map(|percent| VehicleCommand::SetPowerReservation { plant: 0, percent }),
            arb_vertical_velocity()
                .prop_map(|velocity| VehicleCommand::SetTargetVerticalVelocity { velocity }),
            (-1.0f64..1.0, -1.0f64..1.0, 0.0f64..5000.0).prop_map(|(x, z, newtons)| {
                VehicleCommand::ManeuveringThrust {
                    direction: DVec3::new(x, 0.0, z),
                    newtons,
                }
            }),
            Just(VehicleCommand::EmergencyStop),
        ]
    }

    /// Command scripts: (tick offset, command) pairs.
    pub fn arb_command_script(max_len: usize) -> impl Strategy<Value = Vec<(u64, VehicleCommand)>> {
        proptest::collection::vec((0u64..50, arb_command()), 0..max_len)
    }
}
