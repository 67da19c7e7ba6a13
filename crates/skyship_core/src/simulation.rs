//! Core simulation loop.
//!
//! The simulation runs at a fixed tick rate and owns every vehicle together
//! with its physics body and random number generator.
//!
//! # Determinism
//!
//! Given the same [`SimulationConfig`], vehicle data and command sequence,
//! two simulations produce bit-identical state:
//! - Vehicles are ticked in id order (`BTreeMap`)
//! - Subsystems run in a fixed order inside each hull
//! - Field jitter draws from a per-vehicle `ChaCha8Rng` derived from the
//!   configured seed and the vehicle id
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use skyship_core::data::{LiftUnitData, PowerPlantData, VehicleData};
//! use skyship_core::simulation::{Simulation, SimulationConfig, VehicleCommand};
//!
//! let mut data = VehicleData::new("scout");
//! data.hull.mass_tons = 30.0;
//! data.power_plants.push(PowerPlantData::new("main"));
//! data.lift = Some(LiftUnitData::new("lift"));
//!
//! let mut sim = Simulation::new(SimulationConfig::default());
//! let id = sim.spawn_vehicle(&data, DVec3::new(0.0, 50.0, 0.0)).unwrap();
//! sim.apply_command(id, VehicleCommand::SetKnotsAhead { plant: 0, knots: 10.0 }).unwrap();
//!
//! sim.tick();
//! assert_eq!(sim.get_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::body::{PointMassBody, RigidBody};
use crate::components::{PriorityMode, Subsystem, VehicleId};
use crate::data::VehicleData;
use crate::error::{Result, SimError};
use crate::events::{TickEvents, VehicleTelemetry};
use crate::hull::VehicleHull;
use crate::lift::LiftUnit;
use crate::math::STANDARD_GRAVITY;
use crate::power_plant::PowerPlant;

/// Default ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 50;

/// Odd constant used to spread vehicle ids across RNG seeds.
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

// ============================================================================
// Configuration
// ============================================================================

/// Explicit simulation configuration. There is no global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,

    /// Gravitational acceleration for bodies and field strength (m/s²).
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Base seed for every vehicle's RNG.
    #[serde(default)]
    pub seed: u64,

    /// Stop falling bodies at y = 0.
    #[serde(default)]
    pub ground_plane: bool,
}

const fn default_tick_rate() -> u32 {
    DEFAULT_TICK_RATE
}

const fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            gravity: STANDARD_GRAVITY,
            seed: 0,
            ground_plane: false,
        }
    }
}

impl SimulationConfig {
    /// Same configuration with another seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Duration of one tick in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.tick_rate.max(1))
    }

    /// Number of ticks covering `seconds`, rounded to the nearest tick.
    #[must_use]
    pub fn ticks_for(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * f64::from(self.tick_rate.max(1))).round() as u64
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Every mutator a controller can apply to a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VehicleCommand {
    /// Throttle a plant (0-300%).
    SetBurnRate {
        /// Plant index.
        plant: usize,
        /// Burn rate percent.
        percent: f64,
    },
    /// Command a forward speed.
    SetKnotsAhead {
        /// Plant index.
        plant: usize,
        /// Speed (kt).
        knots: f64,
    },
    /// Command a reverse speed.
    SetKnotsAstern {
        /// Plant index.
        plant: usize,
        /// Speed (kt).
        knots: f64,
    },
    /// Zero both speed commands of every plant.
    AllStop,
    /// Change a plant's arbitration policy.
    SetPriorityMode {
        /// Plant index.
        plant: usize,
        /// New policy.
        mode: PriorityMode,
    },
    /// Hold back part of a plant's output (0-100%).
    SetPowerReservation {
        /// Plant index.
        plant: usize,
        /// Reserved percent.
        percent: f64,
    },
    /// Ask for a fixed amount of lift power.
    SetPowerRequest {
        /// Power per second.
        power: f64,
    },
    /// Ask for the lift power that yields a vertical velocity.
    SetTargetVerticalVelocity {
        /// Vertical velocity (m/s, positive up).
        velocity: f64,
    },
    /// Set the lift allocation now and keep asking for it.
    SetPowerAllocation {
        /// Power per second.
        power: f64,
    },
    /// Engage or disengage the lift unit.
    SetLiftActive {
        /// New state.
        active: bool,
    },
    /// Cut a thermal plant's burn rate to shed heat.
    EmergencyHeatDump {
        /// Plant index.
        plant: usize,
    },
    /// Trade field stability for efficiency.
    EmergencyFieldBoost,
    /// Trade field efficiency for stability.
    StabilizeField,
    /// Include or exclude a plant from the thrust sum.
    SetPlantEnabled {
        /// Plant index.
        plant: usize,
        /// New state.
        enabled: bool,
    },
    /// One-off force along a direction, applied at the next tick.
    ManeuveringThrust {
        /// Direction, normalized internally.
        direction: DVec3,
        /// Force (N).
        newtons: f64,
    },
    /// One-off braking force proportional to velocity and mass.
    EmergencyStop,
}

impl VehicleCommand {
    /// Short snake_case name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetBurnRate { .. } => "set_burn_rate",
            Self::SetKnotsAhead { .. } => "set_knots_ahead",
            Self::SetKnotsAstern { .. } => "set_knots_astern",
            Self::AllStop => "all_stop",
            Self::SetPriorityMode { .. } => "set_priority_mode",
            Self::SetPowerReservation { .. } => "set_power_reservation",
            Self::SetPowerRequest { .. } => "set_power_request",
            Self::SetTargetVerticalVelocity { .. } => "set_target_vertical_velocity",
            Self::SetPowerAllocation { .. } => "set_power_allocation",
            Self::SetLiftActive { .. } => "set_lift_active",
            Self::EmergencyHeatDump { .. } => "emergency_heat_dump",
            Self::EmergencyFieldBoost => "emergency_field_boost",
            Self::StabilizeField => "stabilize_field",
            Self::SetPlantEnabled { .. } => "set_plant_enabled",
            Self::ManeuveringThrust { .. } => "maneuvering_thrust",
            Self::EmergencyStop => "emergency_stop",
        }
    }
}

// ============================================================================
// Vehicles
// ============================================================================

/// A spawned vehicle: hull, body and RNG.
#[derive(Debug, Clone)]
pub struct Vehicle {
    hull: VehicleHull,
    body: PointMassBody,
    rng: ChaCha8Rng,
}

impl Vehicle {
    /// The vehicle's hull.
    #[must_use]
    pub const fn hull(&self) -> &VehicleHull {
        &self.hull
    }

    /// The vehicle's physics body.
    #[must_use]
    pub const fn body(&self) -> &PointMassBody {
        &self.body
    }

    fn plant_mut(&mut self, id: VehicleId, index: usize) -> Result<&mut PowerPlant> {
        self.hull
            .power_plant_mut(index)
            .ok_or(SimError::PowerPlantNotFound { vehicle: id, index })
    }

    fn lift_mut(&mut self, id: VehicleId) -> Result<&mut LiftUnit> {
        self.hull.lift_mut().ok_or(SimError::LiftUnitNotFound(id))
    }
}

/// The flight simulation.
///
/// # System Execution Order
///
/// Each tick, for every vehicle in id order:
/// 1. **Hull** - plants, lift, forces and damage (see [`VehicleHull::tick`])
/// 2. **Body** - semi-implicit integration under gravity
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    tick: u64,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    next_id: VehicleId,
}

impl Simulation {
    /// Create an empty simulation.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            tick: 0,
            vehicles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// The configuration this simulation was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Get the current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time since start (s).
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 * self.config.tick_seconds()
    }

    /// Number of vehicles.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Vehicle ids in ascending order.
    #[must_use]
    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    /// Get a vehicle by id.
    #[must_use]
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    /// Spawn a vehicle at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidVehicle`] if the definition fails
    /// validation.
    pub fn spawn_vehicle(&mut self, data: &VehicleData, position: DVec3) -> Result<VehicleId> {
        data.ensure_valid()?;

        let id = self.next_id;
        self.next_id += 1;

        let hull = VehicleHull::new(data);
        let body = PointMassBody::new(hull.mass_kg(), position).with_ground_plane(self.config.ground_plane);
        let rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ id.wrapping_mul(SEED_SPREAD));

        info!(vehicle = id, kind = %data.id, plants = data.power_plants.len(), "Vehicle spawned");
        self.vehicles.insert(id, Vehicle { hull, body, rng });
        Ok(id)
    }

    /// Remove a vehicle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::VehicleNotFound`] for an unknown id.
    pub fn despawn(&mut self, id: VehicleId) -> Result<()> {
        if self.vehicles.remove(&id).is_none() {
            return Err(SimError::VehicleNotFound(id));
        }
        info!(vehicle = id, "Vehicle despawned");
        Ok(())
    }

    /// Apply a command to a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle or the addressed subsystem does not
    /// exist, or if the subsystem variant lacks the capability.
    pub fn apply_command(&mut self, id: VehicleId, command: VehicleCommand) -> Result<()> {
        let vehicle = self.vehicles.get_mut(&id).ok_or(SimError::VehicleNotFound(id))?;
        debug!(vehicle = id, command = command.name(), "Applying command");

        match command {
            VehicleCommand::SetBurnRate { plant, percent } => {
                vehicle.plant_mut(id, plant)?.set_burn_rate(percent);
            }
            VehicleCommand::SetKnotsAhead { plant, knots } => {
                vehicle.plant_mut(id, plant)?.set_knots_ahead(knots);
            }
            VehicleCommand::SetKnotsAstern { plant, knots } => {
                vehicle.plant_mut(id, plant)?.set_knots_astern(knots);
            }
            VehicleCommand::AllStop => {
                let count = vehicle.hull.power_plants().len();
                for index in 0..count {
                    vehicle.plant_mut(id, index)?.all_stop();
                }
            }
            VehicleCommand::SetPriorityMode { plant, mode } => {
                vehicle.plant_mut(id, plant)?.set_priority_mode(mode);
            }
            VehicleCommand::SetPowerReservation { plant, percent } => {
                vehicle.plant_mut(id, plant)?.set_power_reservation(percent);
            }
            VehicleCommand::SetPowerRequest { power } => {
                vehicle.lift_mut(id)?.set_power_request(power);
            }
            VehicleCommand::SetTargetVerticalVelocity { velocity } => {
                if !vehicle.hull.set_lift_target_velocity(velocity) {
                    return Err(SimError::LiftUnitNotFound(id));
                }
            }
            VehicleCommand::SetPowerAllocation { power } => {
                let lift = vehicle.lift_mut(id)?;
                lift.set_power_allocation(power);
                lift.set_power_request(power);
            }
            VehicleCommand::SetLiftActive { active } => {
                vehicle.lift_mut(id)?.set_active(active);
            }
            VehicleCommand::EmergencyHeatDump { plant } => {
                if !vehicle.plant_mut(id, plant)?.emergency_heat_dump() {
                    return Err(unsupported(Subsystem::PowerPlant(plant), &command));
                }
            }
            VehicleCommand::EmergencyFieldBoost => {
                if !vehicle.lift_mut(id)?.emergency_field_boost() {
                    return Err(unsupported(Subsystem::Lift, &command));
                }
            }
            VehicleCommand::StabilizeField => {
                if !vehicle.lift_mut(id)?.stabilize_field() {
                    return Err(unsupported(Subsystem::Lift, &command));
                }
            }
            VehicleCommand::SetPlantEnabled { plant, enabled } => {
                if !vehicle.hull.set_enabled(plant, enabled) {
                    return Err(SimError::PowerPlantNotFound { vehicle: id, index: plant });
                }
            }
            VehicleCommand::ManeuveringThrust { direction, newtons } => {
                vehicle.hull.apply_maneuvering_thrust(direction, newtons);
            }
            VehicleCommand::EmergencyStop => {
                vehicle.hull.emergency_stop();
            }
        }

        Ok(())
    }

    /// Advance the simulation by one tick.
    ///
    /// Never fails; a vehicle missing a collaborator degrades that
    /// subsystem to zero output.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        let dt = self.config.tick_seconds();
        let gravity = self.config.gravity;

        for (&id, vehicle) in &mut self.vehicles {
            let vehicle_events = vehicle
                .hull
                .tick(&mut vehicle.body, &mut vehicle.rng, gravity, dt);

            #[cfg(feature = "debug-validation")]
            for plant in vehicle.hull.power_plants() {
                debug_assert!(
                    plant.allocated_thrust_power() + plant.allocated_lift_power()
                        <= plant.current_power_output() + 1e-9,
                    "allocation exceeded output"
                );
            }

            vehicle.body.integrate(dt, gravity);
            events.extend_for(id, vehicle_events);
        }

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// Telemetry snapshot of one vehicle.
    #[must_use]
    pub fn telemetry(&self, id: VehicleId) -> Option<VehicleTelemetry> {
        self.vehicles
            .get(&id)
            .map(|v| v.hull.telemetry(id, &v.body))
    }

    /// Telemetry of every vehicle in id order.
    #[must_use]
    pub fn all_telemetry(&self) -> Vec<VehicleTelemetry> {
        self.vehicles
            .iter()
            .map(|(&id, v)| v.hull.telemetry(id, &v.body))
            .collect()
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Floats are hashed bitwise; two simulations with identical state
    /// produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.vehicles.len().hash(&mut hasher);

        for (id, vehicle) in &self.vehicles {
            id.hash(&mut hasher);
            hash_vec(vehicle.body.position(), &mut hasher);
            hash_vec(vehicle.body.linear_velocity(), &mut hasher);
            vehicle.body.use_gravity().hash(&mut hasher);

            for plant in vehicle.hull.power_plants() {
                plant.current_power_output().to_bits().hash(&mut hasher);
                plant.actual_force_newtons().to_bits().hash(&mut hasher);
                plant.allocated_lift_power().to_bits().hash(&mut hasher);
                plant.burn_rate_percent().to_bits().hash(&mut hasher);
                plant.is_active().hash(&mut hasher);
                plant.health().map(|h| h.current()).hash(&mut hasher);
                if let Some(heat) = plant.heat() {
                    heat.current_temperature.to_bits().hash(&mut hasher);
                }
            }

            if let Some(lift) = vehicle.hull.lift() {
                let state = lift.state();
                state.allocated_power_per_second.to_bits().hash(&mut hasher);
                state.vertical_velocity_mps.to_bits().hash(&mut hasher);
                lift.current_lift_force().to_bits().hash(&mut hasher);
                lift.is_active().hash(&mut hasher);
                lift.health().map(|h| h.current()).hash(&mut hasher);
                if let Some(field) = lift.field() {
                    field.field_strength_percent.to_bits().hash(&mut hasher);
                }
            }
        }

        hasher.finish()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

fn hash_vec(v: DVec3, hasher: &mut impl Hasher) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
    v.z.to_bits().hash(hasher);
}

fn unsupported(subsystem: Subsystem, command: &VehicleCommand) -> SimError {
    SimError::UnsupportedCommand {
        subsystem: subsystem.to_string(),
        command: command.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FieldData, LiftUnitData, PowerPlantData, ThermalData};
    use crate::events::VehicleEvent;

    fn scout() -> VehicleData {
        let mut data = VehicleData::new("scout");
        data.hull.mass_tons = 30.0;
        let mut plant = PowerPlantData::new("main");
        plant.max_power_per_second = 200.0;
        data.power_plants.push(plant);
        let mut lift = LiftUnitData::new("lift");
        lift.minimum_power_per_second = 30.0;
        data.lift = Some(lift);
        data
    }

    fn spawn(sim: &mut Simulation) -> VehicleId {
        sim.spawn_vehicle(&scout(), DVec3::new(0.0, 100.0, 0.0)).unwrap()
    }

    #[test]
    fn test_simulation_new() {
        let sim = Simulation::default();
        assert_eq!(sim.get_tick(), 0);
        assert_eq!(sim.vehicle_count(), 0);
        assert_eq!(sim.config().tick_rate, 50);
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut sim = Simulation::default();
        let a = spawn(&mut sim);
        let b = spawn(&mut sim);
        assert_ne!(a, b);
        assert_eq!(sim.vehicle_ids(), vec![a, b]);

        sim.despawn(a).unwrap();
        assert!(matches!(sim.despawn(a), Err(SimError::VehicleNotFound(_))));
        assert_eq!(sim.vehicle_count(), 1);
    }

    #[test]
    fn test_spawn_rejects_invalid_vehicle() {
        let mut sim = Simulation::default();
        let mut data = scout();
        data.hull.mass_tons = -1.0;
        let result = sim.spawn_vehicle(&data, DVec3::ZERO);
        assert!(matches!(result, Err(SimError::InvalidVehicle { .. })));
    }

    #[test]
    fn test_elapsed_seconds() {
        let mut sim = Simulation::default();
        for _ in 0..50 {
            sim.tick();
        }
        assert!((sim.elapsed_seconds() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_command_errors() {
        let mut sim = Simulation::default();
        let id = spawn(&mut sim);

        assert!(matches!(
            sim.apply_command(99, VehicleCommand::AllStop),
            Err(SimError::VehicleNotFound(99))
        ));
        assert!(matches!(
            sim.apply_command(id, VehicleCommand::SetBurnRate { plant: 4, percent: 50.0 }),
            Err(SimError::PowerPlantNotFound { index: 4, .. })
        ));
        assert!(matches!(
            sim.apply_command(id, VehicleCommand::EmergencyHeatDump { plant: 0 }),
            Err(SimError::UnsupportedCommand { .. })
        ));
        assert!(matches!(
            sim.apply_command(id, VehicleCommand::EmergencyFieldBoost),
            Err(SimError::UnsupportedCommand { .. })
        ));
    }

    #[test]
    fn test_lift_commands_need_lift() {
        let mut sim = Simulation::default();
        let mut data = scout();
        data.lift = None;
        let id = sim.spawn_vehicle(&data, DVec3::ZERO).unwrap();
        assert!(matches!(
            sim.apply_command(id, VehicleCommand::SetTargetVerticalVelocity { velocity: 1.0 }),
            Err(SimError::LiftUnitNotFound(_))
        ));
    }

    #[test]
    fn test_climb_command() {
        let mut sim = Simulation::default();
        let id = spawn(&mut sim);
        sim.apply_command(id, VehicleCommand::SetTargetVerticalVelocity { velocity: 1.0 })
            .unwrap();
        for _ in 0..50 {
            sim.tick();
        }
        let telemetry = sim.telemetry(id).unwrap();
        let lift = telemetry.lift.unwrap();
        assert!((lift.state.vertical_velocity_mps - 1.0).abs() < 1e-9);
        assert!((telemetry.position.y - 101.0).abs() < 1e-6);
    }

    #[test]
    fn test_power_allocation_command_pins_request() {
        let mut sim = Simulation::default();
        let id = spawn(&mut sim);
        sim.apply_command(id, VehicleCommand::SetPowerAllocation { power: 45.0 })
            .unwrap();
        sim.tick();
        let lift = sim.telemetry(id).unwrap().lift.unwrap();
        assert!((lift.state.allocated_power_per_second - 45.0).abs() < 1e-9);
        assert!((lift.state.vertical_velocity_mps - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_field_commands() {
        let mut sim = Simulation::default();
        let mut data = scout();
        if let Some(lift) = data.lift.as_mut() {
            lift.field = Some(FieldData::default());
        }
        data.power_plants[0].thermal = Some(ThermalData::default());
        let id = sim.spawn_vehicle(&data, DVec3::ZERO).unwrap();

        sim.apply_command(id, VehicleCommand::EmergencyFieldBoost).unwrap();
        sim.apply_command(id, VehicleCommand::StabilizeField).unwrap();
        sim.apply_command(id, VehicleCommand::EmergencyHeatDump { plant: 0 })
            .unwrap();

        let telemetry = sim.telemetry(id).unwrap();
        assert!((telemetry.power_plants[0].burn_rate_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = |seed: u64| {
            let mut sim = Simulation::new(SimulationConfig::default().with_seed(seed));
            let mut data = scout();
            if let Some(lift) = data.lift.as_mut() {
                lift.field = Some(FieldData {
                    field_stability: 0.3,
                    ..FieldData::default()
                });
            }
            let id = sim.spawn_vehicle(&data, DVec3::new(0.0, 100.0, 0.0)).unwrap();
            sim.apply_command(id, VehicleCommand::SetKnotsAhead { plant: 0, knots: 8.0 })
                .unwrap();
            for _ in 0..200 {
                sim.tick();
            }
            sim.state_hash()
        };

        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
    }

    #[test]
    fn test_tick_events_are_tagged() {
        let mut sim = Simulation::default();
        let id = spawn(&mut sim);
        sim.apply_command(id, VehicleCommand::SetKnotsAhead { plant: 0, knots: 10.0 })
            .unwrap();
        let events = sim.tick();
        assert!(events
            .for_vehicle(id)
            .any(|e| matches!(e, VehicleEvent::ThrustOutputChanged { plant: 0, .. })));
    }

    #[test]
    fn test_ticks_for_duration() {
        let config = SimulationConfig::default();
        assert_eq!(config.ticks_for(2.0), 100);
        assert_eq!(config.ticks_for(-1.0), 0);
        assert!((config.tick_seconds() - 0.02).abs() < 1e-15);
    }
}
