//! Scripted flight execution.
//!
//! Flies a [`Scenario`] to completion without a controller and returns
//! [`FlightMetrics`].

use glam::DVec3;
use skyship_core::data::VehicleData;
use skyship_core::simulation::{Simulation, VehicleCommand};
use tracing::{debug, info, warn};

use crate::metrics::{FlightMetrics, MetricsCollector};
use crate::scenario::{Scenario, ScenarioError};

/// Runs one scenario with any number of seeds.
#[derive(Debug, Clone)]
pub struct FlightRunner {
    scenario: Scenario,
    vehicle: VehicleData,
    script: Vec<(u64, VehicleCommand)>,
}

impl FlightRunner {
    /// Prepare a scenario, resolving its vehicle and checking it.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.ensure_valid()?;
        let vehicle = scenario.vehicle_data()?;
        vehicle.ensure_valid()?;
        Ok(Self {
            scenario: scenario.clone(),
            vehicle,
            script: scenario.script_ticks(),
        })
    }

    /// Scenario being flown.
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Fly once.
    ///
    /// The flight ends at the scenario duration, or earlier once every
    /// subsystem has failed.
    pub fn run(&self, seed: u64) -> Result<FlightMetrics, ScenarioError> {
        let config = self.scenario.config.clone().with_seed(seed);
        let dt = config.tick_seconds();
        let sample_every = if self.scenario.sample_interval_seconds > 0.0 {
            config.ticks_for(self.scenario.sample_interval_seconds).max(1)
        } else {
            0
        };
        let total_ticks = self.scenario.total_ticks();

        let mut sim = Simulation::new(config);
        let id = sim.spawn_vehicle(
            &self.vehicle,
            DVec3::new(0.0, self.scenario.spawn_altitude, 0.0),
        )?;

        let mut collector = MetricsCollector::new(
            FlightMetrics::new(&self.scenario.name, &self.vehicle.id, seed),
            id,
            sample_every,
        );
        let mut script = self.script.iter().peekable();

        info!(scenario = %self.scenario.name, seed, total_ticks, "Starting flight");

        while sim.get_tick() < total_ticks {
            while let Some((_, command)) = script.next_if(|(tick, _)| *tick <= sim.get_tick()) {
                debug!(tick = sim.get_tick(), cmd = command.name(), "Scripted command");
                if let Err(e) = sim.apply_command(id, command.clone()) {
                    warn!(tick = sim.get_tick(), cmd = command.name(), error = %e, "Scripted command rejected");
                    collector.record_command_error(sim.get_tick(), command.name(), e.to_string());
                }
            }

            let events = sim.tick();
            let Some(telemetry) = sim.telemetry(id) else {
                break;
            };
            collector.observe(sim.get_tick(), dt, &events, &telemetry);

            if telemetry.is_disabled() {
                info!(tick = sim.get_tick(), "Vehicle disabled, ending flight");
                break;
            }
        }

        let metrics = collector.finish(
            sim.get_tick(),
            sim.elapsed_seconds(),
            sim.state_hash(),
            sim.telemetry(id),
        );
        info!(
            scenario = %metrics.scenario,
            seed,
            ticks = metrics.ticks,
            damage = metrics.total_damage(),
            "Flight complete"
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScriptedCommand;
    use skyship_test_utils::fixtures::{frigate, jet_frigate};

    fn short(mut scenario: Scenario, seconds: f64) -> Scenario {
        scenario.duration_seconds = seconds;
        scenario.script.retain(|entry| entry.at_seconds <= seconds);
        scenario
    }

    #[test]
    fn test_hover_flight_holds_altitude() {
        let scenario = short(Scenario::new("hover", frigate()), 10.0);
        let metrics = FlightRunner::new(&scenario).unwrap().run(0).unwrap();

        assert_eq!(metrics.ticks, 500);
        assert!((metrics.max_altitude - 100.0).abs() < 1e-9);
        assert!((metrics.min_altitude - 100.0).abs() < 1e-9);
        assert!(!metrics.ended_disabled);
        assert_eq!(metrics.samples.len(), 10);
        assert!(metrics.final_telemetry.is_some());
    }

    #[test]
    fn test_script_commands_fire_on_time() {
        let mut scenario = Scenario::new("climb", frigate());
        scenario.duration_seconds = 4.0;
        scenario.script.push(ScriptedCommand::new(
            2.0,
            VehicleCommand::SetTargetVerticalVelocity { velocity: 1.0 },
        ));
        let metrics = FlightRunner::new(&scenario).unwrap().run(0).unwrap();

        let at_two = metrics.samples.iter().find(|s| s.tick == 100).unwrap();
        assert!((at_two.altitude - 100.0).abs() < 1e-9);
        assert!(metrics.max_altitude > 101.0);
        assert!(metrics.command_errors.is_empty());
    }

    #[test]
    fn test_rejected_command_is_recorded() {
        let mut scenario = Scenario::new("bad", frigate());
        scenario.duration_seconds = 1.0;
        scenario.script.push(ScriptedCommand::new(
            0.5,
            VehicleCommand::SetBurnRate { plant: 3, percent: 10.0 },
        ));
        let metrics = FlightRunner::new(&scenario).unwrap().run(0).unwrap();

        assert_eq!(metrics.command_errors.len(), 1);
        assert_eq!(metrics.command_errors[0].tick, 25);
        assert_eq!(metrics.command_errors[0].command, "set_burn_rate");
    }

    #[test]
    fn test_jet_flight_tracks_heat() {
        let scenario = short(Scenario::new("jet", jet_frigate()), 2.0);
        let metrics = FlightRunner::new(&scenario).unwrap().run(0).unwrap();

        assert!(metrics.peak_temperature.is_some());
        assert!(metrics.overheat_seconds > 0.0);
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let mut scenario = Scenario::new("broken", frigate());
        scenario.duration_seconds = 0.0;
        assert!(matches!(
            FlightRunner::new(&scenario),
            Err(ScenarioError::Invalid { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_flight() {
        let runner = FlightRunner::new(&short(Scenario::field_overload(), 5.0)).unwrap();
        let a = runner.run(9).unwrap();
        let b = runner.run(9).unwrap();
        assert_eq!(a.final_state_hash, b.final_state_hash);
        assert_eq!(a, b);
    }
}
