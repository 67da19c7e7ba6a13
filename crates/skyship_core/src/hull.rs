//! Vehicle hull: mass, drag and the per-tick ordering of its subsystems.
//!
//! # Tick Order
//!
//! 1. Every operational plant, in index order: heat, output, thrust
//!    request, allocation (the lift source plant reads the lift unit's
//!    current request and writes its allocation back), force
//! 2. Lift unit: vertical motion from its allocation
//! 3. Hull: summed thrust along the forward axis, quadratic drag, pending
//!    manoeuvring and emergency-stop forces
//! 4. Damage: plants, then lift
//!
//! The body is integrated by the caller after [`VehicleHull::tick`].

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::body::RigidBody;
use crate::components::{ForceMode, VehicleId};
use crate::data::{PowerPlantData, VehicleData};
use crate::events::{VehicleEvent, VehicleTelemetry};
use crate::lift::LiftUnit;
use crate::math::{mps_to_knots, project_onto_axis, tons_to_kg};
use crate::power_plant::{PowerPlant, VehicleFrame};

/// Braking force per ton per m/s applied by an emergency stop.
pub const EMERGENCY_STOP_FACTOR: f64 = 10.0;

/// Hull of one vehicle, owning its power plants and lift unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleHull {
    kind: String,
    mass_tons: f64,
    drag_coefficient: f64,
    forward: DVec3,

    power_plants: Vec<PowerPlant>,
    lift: Option<LiftUnit>,
    /// Plant that arbitrates with the lift unit.
    lift_power_source: Option<usize>,
    /// Enabled and active plants, rebuilt by `refresh_engines`.
    engines: Vec<usize>,

    pending_maneuver: DVec3,
    pending_emergency_stop: bool,

    total_thrust: f64,
    drag_force: DVec3,
}

impl VehicleHull {
    /// Build a hull from a vehicle definition.
    ///
    /// The definition is expected to have passed
    /// [`VehicleData::validate`].
    #[must_use]
    pub fn new(data: &VehicleData) -> Self {
        let mut hull = Self {
            kind: data.id.clone(),
            mass_tons: data.hull.mass_tons,
            drag_coefficient: data.hull.drag_coefficient,
            forward: data.hull.forward.normalize_or_zero(),
            power_plants: data.power_plants.iter().map(PowerPlant::new).collect(),
            lift: data.lift.as_ref().map(LiftUnit::new),
            lift_power_source: Some(data.lift_power_source),
            engines: Vec::new(),
            pending_maneuver: DVec3::ZERO,
            pending_emergency_stop: false,
            total_thrust: 0.0,
            drag_force: DVec3::ZERO,
        };
        hull.refresh_engines();
        hull
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Vehicle type from the data file.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Vehicle mass (t).
    #[must_use]
    pub const fn mass_tons(&self) -> f64 {
        self.mass_tons
    }

    /// Vehicle mass (kg).
    #[must_use]
    pub fn mass_kg(&self) -> f64 {
        tons_to_kg(self.mass_tons)
    }

    /// Quadratic drag coefficient.
    #[must_use]
    pub const fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    /// Normalized forward axis.
    #[must_use]
    pub const fn forward(&self) -> DVec3 {
        self.forward
    }

    /// All power plants in index order.
    #[must_use]
    pub fn power_plants(&self) -> &[PowerPlant] {
        &self.power_plants
    }

    /// One power plant.
    #[must_use]
    pub fn power_plant(&self, index: usize) -> Option<&PowerPlant> {
        self.power_plants.get(index)
    }

    /// One power plant, mutably.
    pub fn power_plant_mut(&mut self, index: usize) -> Option<&mut PowerPlant> {
        self.power_plants.get_mut(index)
    }

    /// The lift unit.
    #[must_use]
    pub const fn lift(&self) -> Option<&LiftUnit> {
        self.lift.as_ref()
    }

    /// The lift unit, mutably.
    pub fn lift_mut(&mut self) -> Option<&mut LiftUnit> {
        self.lift.as_mut()
    }

    /// Index of the plant feeding the lift unit.
    #[must_use]
    pub const fn lift_power_source(&self) -> Option<usize> {
        self.lift_power_source
    }

    /// Indices of plants that run this tick.
    #[must_use]
    pub fn engines(&self) -> &[usize] {
        &self.engines
    }

    /// Add a plant and return its index.
    pub fn add_power_plant(&mut self, data: &PowerPlantData) -> usize {
        self.power_plants.push(PowerPlant::new(data));
        self.refresh_engines();
        info!(vehicle = %self.kind, plant = %data.name, "Power plant added");
        self.power_plants.len() - 1
    }

    /// Remove a plant. Later plants shift down by one.
    ///
    /// Removing the lift source leaves the lift unit unpowered.
    pub fn remove_power_plant(&mut self, index: usize) -> Option<PowerPlant> {
        if index >= self.power_plants.len() {
            return None;
        }
        let removed = self.power_plants.remove(index);
        self.lift_power_source = match self.lift_power_source {
            Some(source) if source == index => None,
            Some(source) if source > index => Some(source - 1),
            other => other,
        };
        self.refresh_engines();
        info!(vehicle = %self.kind, plant = %removed.name(), "Power plant removed");
        Some(removed)
    }

    /// Choose which plant feeds the lift unit.
    pub fn set_lift_power_source(&mut self, index: Option<usize>) {
        self.lift_power_source = index.filter(|&i| i < self.power_plants.len());
    }

    /// Include or exclude a plant. Returns `false` for an unknown index.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        let Some(plant) = self.power_plants.get_mut(index) else {
            return false;
        };
        plant.set_enabled(enabled);
        self.refresh_engines();
        true
    }

    /// Rebuild the list of plants that run each tick.
    ///
    /// Called after structural changes and at the end of a tick, never in
    /// the middle of one.
    pub fn refresh_engines(&mut self) {
        self.engines = self
            .power_plants
            .iter()
            .enumerate()
            .filter(|(_, plant)| plant.is_operational())
            .map(|(index, _)| index)
            .collect();
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Queue a one-off force along `direction` for the next tick.
    pub fn apply_maneuvering_thrust(&mut self, direction: DVec3, newtons: f64) {
        if newtons.is_finite() {
            self.pending_maneuver += direction.normalize_or_zero() * newtons;
        }
    }

    /// Queue a braking force proportional to velocity and mass.
    pub fn emergency_stop(&mut self) {
        self.pending_emergency_stop = true;
        info!(vehicle = %self.kind, "Emergency stop");
    }

    /// Set the lift request for a vertical velocity. Returns `false`
    /// without a lift unit.
    pub fn set_lift_target_velocity(&mut self, velocity_mps: f64) -> bool {
        let mass_tons = self.mass_tons;
        match self.lift.as_mut() {
            Some(lift) => {
                lift.set_target_vertical_velocity(velocity_mps, mass_tons);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------------

    /// Speed magnitude, signed by the forward axis (m/s).
    #[must_use]
    pub fn current_speed_mps<B: RigidBody + ?Sized>(&self, body: &B) -> f64 {
        let velocity = body.linear_velocity();
        let speed = velocity.length();
        if velocity.dot(self.forward) < 0.0 {
            -speed
        } else {
            speed
        }
    }

    /// Speed magnitude, signed by the forward axis (kt).
    #[must_use]
    pub fn current_speed_knots<B: RigidBody + ?Sized>(&self, body: &B) -> f64 {
        mps_to_knots(self.current_speed_mps(body))
    }

    /// Summed output of operational plants.
    #[must_use]
    pub fn total_power_output(&self) -> f64 {
        self.engines
            .iter()
            .map(|&i| self.power_plants[i].current_power_output())
            .sum()
    }

    /// Summed signed thrust of the last tick (N).
    #[must_use]
    pub const fn total_thrust(&self) -> f64 {
        self.total_thrust
    }

    /// Drag force applied in the last tick (N).
    #[must_use]
    pub const fn drag_force(&self) -> DVec3 {
        self.drag_force
    }

    /// Thrust acceleration of the last tick (m/s²).
    #[must_use]
    pub fn acceleration_mps2(&self) -> f64 {
        let mass = self.mass_kg();
        if mass > 0.0 {
            self.total_thrust / mass
        } else {
            0.0
        }
    }

    /// Whether every subsystem has been destroyed.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.power_plants.iter().all(|p| !p.is_active())
            && self.lift.as_ref().map_or(true, LiftUnit::is_destroyed)
    }

    /// Snapshot for telemetry consumers.
    #[must_use]
    pub fn telemetry<B: RigidBody + ?Sized>(&self, id: VehicleId, body: &B) -> VehicleTelemetry {
        let speed = self.current_speed_mps(body);
        VehicleTelemetry {
            id,
            kind: self.kind.clone(),
            position: body.position(),
            velocity: body.linear_velocity(),
            current_speed_knots: mps_to_knots(speed),
            current_speed_mps: speed,
            acceleration_mps2: self.acceleration_mps2(),
            total_power_output: self.total_power_output(),
            total_thrust_newtons: self.total_thrust,
            use_gravity: body.use_gravity(),
            power_plants: self.power_plants.iter().map(PowerPlant::telemetry).collect(),
            lift: self.lift.as_ref().map(LiftUnit::telemetry),
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Run one tick of every subsystem against `body`.
    pub fn tick<B, R>(&mut self, body: &mut B, rng: &mut R, gravity: f64, dt: f64) -> Vec<VehicleEvent>
    where
        B: RigidBody + ?Sized,
        R: Rng,
    {
        let mut events = Vec::new();
        let velocity = body.linear_velocity();
        let frame = VehicleFrame {
            mass_tons: self.mass_tons,
            drag_coefficient: self.drag_coefficient,
            forward_speed_mps: project_onto_axis(velocity, self.forward),
        };

        // 1. Plants. The lift gets nothing unless its source runs.
        if let Some(lift) = self.lift.as_mut() {
            lift.set_power_allocation(0.0);
        }
        for &index in &self.engines {
            let lift = if self.lift_power_source == Some(index) {
                self.lift.as_mut()
            } else {
                None
            };
            self.power_plants[index].update(index, Some(&frame), lift, dt, &mut events);
        }

        // 2. Lift
        if let Some(lift) = self.lift.as_mut() {
            lift.update(Some(&frame), gravity, body, rng, dt, &mut events);
        }

        // 3. Forces
        self.total_thrust = self
            .engines
            .iter()
            .map(|&i| self.power_plants[i].actual_force_newtons())
            .sum();
        body.add_force(self.forward * self.total_thrust, ForceMode::Force);

        self.drag_force = -velocity * velocity.length() * self.drag_coefficient;
        body.add_force(self.drag_force, ForceMode::Force);

        if self.pending_maneuver != DVec3::ZERO {
            body.add_force(std::mem::take(&mut self.pending_maneuver), ForceMode::Force);
        }
        if std::mem::take(&mut self.pending_emergency_stop) {
            body.add_force(-velocity * self.mass_tons * EMERGENCY_STOP_FACTOR, ForceMode::Force);
        }

        // 4. Damage
        for &index in &self.engines {
            self.power_plants[index].apply_damage(index, dt, &mut events);
        }
        if let Some(lift) = self.lift.as_mut() {
            lift.apply_damage(dt, &mut events);
        }

        // Drop plants that failed this tick
        let running = self.engines.len();
        self.refresh_engines();
        if self.engines.len() != running {
            debug!(vehicle = %self.kind, engines = self.engines.len(), "Engine list refreshed");
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::PointMassBody;
    use crate::data::{LiftUnitData, ThermalData};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 0.02;

    fn vehicle() -> VehicleData {
        let mut data = VehicleData::new("frigate");
        data.hull.mass_tons = 30.0;
        let mut plant = PowerPlantData::new("main");
        plant.max_power_per_second = 200.0;
        data.power_plants.push(plant);
        let mut lift = LiftUnitData::new("lift");
        lift.minimum_power_per_second = 30.0;
        data.lift = Some(lift);
        data
    }

    fn body() -> PointMassBody {
        PointMassBody::new(30_000.0, DVec3::new(0.0, 100.0, 0.0))
    }

    fn run(hull: &mut VehicleHull, body: &mut PointMassBody, ticks: usize) -> Vec<VehicleEvent> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(hull.tick(body, &mut rng, 9.81, DT));
            body.integrate(DT, 9.81);
        }
        events
    }

    #[test]
    fn test_default_request_hovers() {
        let mut hull = VehicleHull::new(&vehicle());
        let mut body = body();
        run(&mut hull, &mut body, 100);

        let lift = hull.lift().unwrap();
        assert!((lift.state().allocated_power_per_second - 30.0).abs() < 1e-9);
        assert!(lift.is_hovering());
        assert!((body.position().y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_thrust_moves_vehicle_forward() {
        let mut hull = VehicleHull::new(&vehicle());
        hull.power_plant_mut(0).unwrap().set_knots_ahead(10.0);
        let mut body = body();
        run(&mut hull, &mut body, 200);

        assert!(body.linear_velocity().z > 0.0);
        assert!(hull.current_speed_knots(&body) > 0.0);
        assert!(hull.total_thrust() >= 0.0);
    }

    #[test]
    fn test_drag_opposes_motion() {
        let mut hull = VehicleHull::new(&vehicle());
        hull.power_plant_mut(0).unwrap().set_burn_rate(0.0);
        let mut body = body();
        body.set_linear_velocity(DVec3::new(0.0, 0.0, 10.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        hull.tick(&mut body, &mut rng, 9.81, DT);
        // 10 × 10 × 0.5
        assert!((hull.drag_force().z + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_source_starves_lift() {
        let mut hull = VehicleHull::new(&vehicle());
        assert!(hull.set_enabled(0, false));
        assert!(hull.engines().is_empty());

        let mut body = body();
        run(&mut hull, &mut body, 10);
        assert_eq!(hull.lift().unwrap().state().allocated_power_per_second, 0.0);
        assert!(body.use_gravity());
        assert!(body.position().y < 100.0);
    }

    #[test]
    fn test_only_source_plant_feeds_lift() {
        let mut data = vehicle();
        data.power_plants.push(PowerPlantData::new("aux"));
        data.lift_power_source = 1;
        let mut hull = VehicleHull::new(&data);
        let mut body = body();
        run(&mut hull, &mut body, 1);

        assert_eq!(hull.power_plant(0).unwrap().allocated_lift_power(), 0.0);
        assert!((hull.power_plant(1).unwrap().allocated_lift_power() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_source_plant_unpowers_lift() {
        let mut hull = VehicleHull::new(&vehicle());
        hull.add_power_plant(&PowerPlantData::new("aux"));
        assert!(hull.remove_power_plant(0).is_some());
        assert_eq!(hull.lift_power_source(), None);
        assert_eq!(hull.engines(), &[0]);
        assert!(hull.remove_power_plant(5).is_none());
    }

    #[test]
    fn test_total_power_output_sums_enabled() {
        let mut data = vehicle();
        data.power_plants.push(PowerPlantData::new("aux"));
        let mut hull = VehicleHull::new(&data);
        assert!((hull.total_power_output() - 300.0).abs() < 1e-9);
        hull.set_enabled(1, false);
        assert!((hull.total_power_output() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_emergency_stop_brakes() {
        let mut hull = VehicleHull::new(&vehicle());
        hull.power_plant_mut(0).unwrap().set_burn_rate(0.0);
        let mut body = body();
        body.set_linear_velocity(DVec3::new(0.0, 0.0, 20.0));
        hull.emergency_stop();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        hull.tick(&mut body, &mut rng, 9.81, DT);
        // drag 200 + stop 6000
        assert!((body.pending_force().z + 6200.0).abs() < 1e-6);
    }

    #[test]
    fn test_maneuvering_thrust_is_one_off() {
        let mut hull = VehicleHull::new(&vehicle());
        hull.power_plant_mut(0).unwrap().set_burn_rate(0.0);
        let mut body = body();
        body.set_use_gravity(false);
        hull.apply_maneuvering_thrust(DVec3::new(3.0, 0.0, 0.0), 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        hull.tick(&mut body, &mut rng, 9.81, DT);
        assert!((body.pending_force().x - 500.0).abs() < 1e-9);
        body.integrate(DT, 9.81);
        hull.tick(&mut body, &mut rng, 9.81, DT);
        assert!(body.pending_force().x <= 0.0);
    }

    #[test]
    fn test_thermal_plant_emits_overheat() {
        let mut data = vehicle();
        data.power_plants[0].thermal = Some(ThermalData {
            initial_temperature: 99.99,
            heat_generation_rate: 100.0,
            ..ThermalData::default()
        });
        let mut hull = VehicleHull::new(&data);
        let mut body = body();
        let events = run(&mut hull, &mut body, 5);
        assert!(events
            .iter()
            .any(|e| matches!(e, VehicleEvent::OverheatStarted { plant: 0 })));
    }
}
