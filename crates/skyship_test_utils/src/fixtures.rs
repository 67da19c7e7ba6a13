//! Test fixtures and helpers.
//!
//! Pre-built vehicle definitions and simulations for consistent testing.
//! All fixtures use a 30 t hull with a 30 power/s hover requirement so
//! expected velocities are easy to compute by hand.

use glam::DVec3;
use skyship_core::data::{FieldData, LiftUnitData, PowerPlantData, ThermalData, VehicleData};
use skyship_core::events::TickEvents;
use skyship_core::simulation::{Simulation, SimulationConfig};
use skyship_core::components::VehicleId;

/// Hull mass of every fixture (t).
pub const FIXTURE_MASS_TONS: f64 = 30.0;

/// Hover power of every fixture lift unit.
pub const FIXTURE_HOVER_POWER: f64 = 30.0;

/// Default spawn altitude (m).
pub const FIXTURE_ALTITUDE: f64 = 100.0;

/// A standard power plant with 200 power/s at full burn.
#[must_use]
pub fn main_plant() -> PowerPlantData {
    let mut plant = PowerPlantData::new("main");
    plant.max_power_per_second = 200.0;
    plant
}

/// A standard lift unit hovering at 30 power/s.
#[must_use]
pub fn standard_lift() -> LiftUnitData {
    let mut lift = LiftUnitData::new("lift");
    lift.minimum_power_per_second = FIXTURE_HOVER_POWER;
    lift
}

/// Single plant, standard lift.
#[must_use]
pub fn frigate() -> VehicleData {
    let mut data = VehicleData::new("frigate");
    data.hull.mass_tons = FIXTURE_MASS_TONS;
    data.power_plants.push(main_plant());
    data.lift = Some(standard_lift());
    data
}

/// Frigate whose plant is a jet engine that overheats at full burn.
///
/// Starts one degree below its limit and generates far more heat than it
/// sheds, so it overheats within the first tick.
#[must_use]
pub fn jet_frigate() -> VehicleData {
    let mut data = frigate();
    data.id = "jet_frigate".to_string();
    data.power_plants[0].name = "jet".to_string();
    data.power_plants[0].thermal = Some(ThermalData {
        max_safe_temperature: 100.0,
        heat_generation_rate: 200.0,
        heat_dissipation_rate: 1.0,
        heat_efficiency_penalty_per_degree: 0.01,
        overheat_damage_rate: 20.0,
        initial_temperature: 99.0,
    });
    data
}

/// Frigate with an anti-gravity lift of the given stability.
#[must_use]
pub fn anti_grav_frigate(stability: f64) -> VehicleData {
    let mut data = frigate();
    data.id = "anti_grav_frigate".to_string();
    if let Some(lift) = data.lift.as_mut() {
        lift.name = "field".to_string();
        lift.field = Some(FieldData {
            field_stability: stability,
            ..FieldData::default()
        });
    }
    data
}

/// Frigate with a second, smaller plant. Plant 0 feeds the lift.
#[must_use]
pub fn twin_engine_frigate() -> VehicleData {
    let mut data = frigate();
    data.id = "twin_engine_frigate".to_string();
    let mut aux = PowerPlantData::new("aux");
    aux.max_power_per_second = 100.0;
    data.power_plants.push(aux);
    data
}

/// A hull with plants but no lift unit.
#[must_use]
pub fn ground_crawler() -> VehicleData {
    let mut data = frigate();
    data.id = "ground_crawler".to_string();
    data.lift = None;
    data
}

/// Parse RON vehicle data, panicking with the parse error.
///
/// # Panics
///
/// Panics if the text is not a valid vehicle definition.
#[must_use]
pub fn vehicle_from_ron(source: &str) -> VehicleData {
    match VehicleData::from_ron_str(source, "<fixture>") {
        Ok(data) => data,
        Err(e) => panic!("fixture RON failed to parse: {e}"),
    }
}

/// Spawn `data` at the fixture altitude.
///
/// # Panics
///
/// Panics if the vehicle fails validation.
pub fn spawn_at_altitude(sim: &mut Simulation, data: &VehicleData) -> VehicleId {
    match sim.spawn_vehicle(data, DVec3::new(0.0, FIXTURE_ALTITUDE, 0.0)) {
        Ok(id) => id,
        Err(e) => panic!("fixture vehicle rejected: {e}"),
    }
}

/// A simulation with one vehicle per definition, in order.
#[must_use]
pub fn simulation_with(seed: u64, vehicles: &[VehicleData]) -> (Simulation, Vec<VehicleId>) {
    let mut sim = Simulation::new(SimulationConfig::default().with_seed(seed));
    let ids = vehicles
        .iter()
        .map(|data| spawn_at_altitude(&mut sim, data))
        .collect();
    (sim, ids)
}

/// Tick `ticks` times and gather every event.
pub fn run_ticks(sim: &mut Simulation, ticks: u64) -> TickEvents {
    let mut all = TickEvents::default();
    for _ in 0..ticks {
        all.events.extend(sim.tick().events);
    }
    all
}

/// Tick for `seconds` of simulated time and gather every event.
pub fn run_seconds(sim: &mut Simulation, seconds: f64) -> TickEvents {
    let ticks = sim.config().ticks_for(seconds);
    run_ticks(sim, ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid() {
        for data in [
            frigate(),
            jet_frigate(),
            anti_grav_frigate(0.5),
            twin_engine_frigate(),
            ground_crawler(),
        ] {
            assert!(data.validate().is_empty(), "{}: {:?}", data.id, data.validate());
        }
    }

    #[test]
    fn test_simulation_with_spawns_in_order() {
        let (sim, ids) = simulation_with(1, &[frigate(), jet_frigate()]);
        assert_eq!(sim.vehicle_ids(), ids);
    }

    #[test]
    fn test_run_seconds_advances_ticks() {
        let (mut sim, _) = simulation_with(1, &[frigate()]);
        run_seconds(&mut sim, 2.0);
        assert_eq!(sim.get_tick(), 100);
    }

    #[test]
    fn test_vehicle_from_ron() {
        let data = vehicle_from_ron(
            r#"(
                id: "ron_frigate",
                name: "RON Frigate",
                hull: (mass_tons: 30.0),
                power_plants: [(name: "main", max_power_per_second: 200.0)],
                lift: Some((name: "lift", minimum_power_per_second: 30.0)),
            )"#,
        );
        assert_eq!(data.power_plants.len(), 1);
        assert_eq!(data.hull.mass_tons, 30.0);
        assert!(data.validate().is_empty());
    }
}
