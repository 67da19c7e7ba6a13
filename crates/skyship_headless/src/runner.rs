//! Interactive headless session over JSON lines.

use std::io::{self, BufRead, Write};
use std::path::Path;

use glam::DVec3;
use skyship_core::components::VehicleId;
use skyship_core::events::SimEvent;
use skyship_core::simulation::{Simulation, SimulationConfig};
use tracing::{debug, info, warn};

use crate::protocol::{Command, Response};
use crate::scenario::{load_vehicle, Scenario, ScenarioError};

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Output state after every `tick` (vs only on `query`).
    pub auto_state_output: bool,
    /// Scenario (built-in name or RON path) to load on startup.
    pub scenario: Option<String>,
    /// Simulation settings for an empty session.
    pub simulation: SimulationConfig,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            auto_state_output: true,
            scenario: None,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Headless runner for controller-driven flights.
///
/// Owns one [`Simulation`] and answers [`Command`]s with [`Response`]s.
/// Events accumulate between `state` responses.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    sim: Simulation,
    pending_events: Vec<SimEvent>,
}

impl HeadlessRunner {
    /// Create a runner, loading the configured scenario if any.
    pub fn new(config: HeadlessConfig) -> Result<Self, ScenarioError> {
        let mut runner = Self {
            sim: Simulation::new(config.simulation.clone()),
            config,
            pending_events: Vec::new(),
        };
        if let Some(name) = runner.config.scenario.clone() {
            runner.load_scenario(&name)?;
        }
        Ok(runner)
    }

    /// The simulation being driven.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Vehicle that receives commands without an explicit id.
    #[must_use]
    pub fn default_vehicle(&self) -> Option<VehicleId> {
        self.sim.vehicle_ids().first().copied()
    }

    /// Handle one command.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        let name = command.name();
        debug!(cmd = name, "Handling command");

        if let Some((target, vehicle_command)) = command.to_vehicle_command() {
            let Some(id) = target.or_else(|| self.default_vehicle()) else {
                return vec![Response::error("No vehicle to command", Some(name))];
            };
            return match self.sim.apply_command(id, vehicle_command) {
                Ok(()) => vec![Response::ack(name)],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            };
        }

        match command {
            Command::Tick { count } => {
                for _ in 0..count {
                    let events = self.sim.tick();
                    self.pending_events.extend(events.events);
                }
                if self.config.auto_state_output {
                    vec![self.state()]
                } else {
                    vec![Response::ack(name)]
                }
            }
            Command::Query => vec![self.state()],
            Command::Hash => vec![Response::StateHash {
                tick: self.sim.get_tick(),
                hash: self.sim.state_hash(),
            }],
            Command::Quit => vec![Response::Bye],
            Command::LoadScenario { path } => match self.load_scenario(&path) {
                Ok(response) => vec![response],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },
            Command::Spawn { path, altitude } => match self.spawn(Path::new(&path), altitude) {
                Ok(response) => vec![response],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },
            Command::Despawn { vehicle } => match self.sim.despawn(vehicle) {
                Ok(()) => vec![Response::ack(name)],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },
            _ => vec![Response::error("Unhandled command", Some(name))],
        }
    }

    /// Run the session until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(&mut output, &Response::ready(self.sim.get_tick()))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(command) => command,
                Err(e) => {
                    warn!(error = %e, "Unparseable command");
                    write_response(&mut output, &Response::error(format!("Parse error: {e}"), None))?;
                    continue;
                }
            };

            let quit = matches!(command, Command::Quit);
            for response in self.handle(command) {
                write_response(&mut output, &response)?;
            }
            if quit {
                break;
            }
        }
        Ok(())
    }

    fn state(&mut self) -> Response {
        Response::State {
            tick: self.sim.get_tick(),
            elapsed_seconds: self.sim.elapsed_seconds(),
            hash: self.sim.state_hash(),
            vehicles: self.sim.all_telemetry(),
            events: std::mem::take(&mut self.pending_events),
        }
    }

    fn load_scenario(&mut self, name: &str) -> Result<Response, ScenarioError> {
        let scenario = Scenario::resolve(name)?;
        scenario.ensure_valid()?;
        let data = scenario.vehicle_data()?;

        let mut sim = Simulation::new(scenario.config.clone());
        let id = sim.spawn_vehicle(&data, DVec3::new(0.0, scenario.spawn_altitude, 0.0))?;
        self.sim = sim;
        self.pending_events.clear();

        info!(scenario = %scenario.name, vehicle = id, "Scenario loaded");
        Ok(Response::Spawned {
            vehicle_id: id,
            kind: data.id,
        })
    }

    fn spawn(&mut self, path: &Path, altitude: f64) -> Result<Response, ScenarioError> {
        let data = load_vehicle(path)?;
        let id = self
            .sim
            .spawn_vehicle(&data, DVec3::new(0.0, altitude, 0.0))?;
        Ok(Response::Spawned {
            vehicle_id: id,
            kind: data.id,
        })
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}
