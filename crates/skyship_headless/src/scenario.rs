//! Scenario loading and configuration.
//!
//! A scenario names one vehicle, where it starts, how long it flies and a
//! script of timed commands. Scenarios are RON files; a few are built in.
//!
//! ```ron
//! Scenario(
//!     name: "climb_and_cruise",
//!     description: "Climb, level off, cruise",
//!     vehicle: File("../data/vehicles/frigate.ron"),
//!     spawn_altitude: 100.0,
//!     duration_seconds: 30.0,
//!     script: [
//!         (at_seconds: 1.0, command: SetTargetVerticalVelocity(velocity: 2.0)),
//!         (at_seconds: 6.0, command: SetTargetVerticalVelocity(velocity: 0.0)),
//!         (at_seconds: 8.0, command: SetKnotsAhead(plant: 0, knots: 12.0)),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skyship_core::components::PriorityMode;
use skyship_core::data::{FieldData, LiftUnitData, PowerPlantData, ThermalData, VehicleData};
use skyship_core::error::SimError;
use skyship_core::simulation::{SimulationConfig, VehicleCommand};
use thiserror::Error;

/// Names accepted by [`Scenario::builtin`].
pub const BUILTIN_SCENARIOS: [&str; 3] = ["hover_test", "overheat_run", "field_overload"];

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Neither a built-in name nor an existing file.
    #[error("Unknown scenario '{0}' (built-ins: hover_test, overheat_run, field_overload)")]
    UnknownScenario(String),
    /// Scenario values are inconsistent.
    #[error("Invalid scenario '{name}': {}", problems.join("; "))]
    Invalid {
        /// Scenario name.
        name: String,
        /// Every problem found.
        problems: Vec<String>,
    },
    /// The simulation rejected the vehicle.
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Where a scenario's vehicle definition comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VehicleSource {
    /// Definition embedded in the scenario.
    Inline(VehicleData),
    /// Path to a vehicle RON file, relative to the scenario file.
    File(PathBuf),
}

/// A command fired at a point in simulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    /// Time since start (s). Rounded to the nearest tick.
    pub at_seconds: f64,
    /// Command applied to the scenario vehicle.
    pub command: VehicleCommand,
}

impl ScriptedCommand {
    /// Create a scripted command.
    #[must_use]
    pub fn new(at_seconds: f64, command: VehicleCommand) -> Self {
        Self {
            at_seconds,
            command,
        }
    }
}

/// A complete flight scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Simulation settings. The seed is replaced per run.
    #[serde(default)]
    pub config: SimulationConfig,
    /// Vehicle to fly.
    pub vehicle: VehicleSource,
    /// Starting height (m).
    #[serde(default = "default_spawn_altitude")]
    pub spawn_altitude: f64,
    /// Flight length (s).
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,
    /// Interval between telemetry samples (s). Zero disables sampling.
    #[serde(default = "default_sample_interval")]
    pub sample_interval_seconds: f64,
    /// Timed commands.
    #[serde(default)]
    pub script: Vec<ScriptedCommand>,
}

const fn default_spawn_altitude() -> f64 {
    100.0
}

const fn default_duration_seconds() -> f64 {
    60.0
}

const fn default_sample_interval() -> f64 {
    1.0
}

impl Scenario {
    /// Create a scenario with an inline vehicle and default timing.
    #[must_use]
    pub fn new(name: impl Into<String>, vehicle: VehicleData) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            config: SimulationConfig::default(),
            vehicle: VehicleSource::Inline(vehicle),
            spawn_altitude: default_spawn_altitude(),
            duration_seconds: default_duration_seconds(),
            sample_interval_seconds: default_sample_interval(),
            script: Vec::new(),
        }
    }

    /// Load a scenario from a RON file.
    ///
    /// A `File` vehicle is read relative to the scenario's directory and
    /// embedded, so the result no longer depends on the working directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;

        if let VehicleSource::File(vehicle_path) = &scenario.vehicle {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            let data = load_vehicle(&base.join(vehicle_path))?;
            scenario.vehicle = VehicleSource::Inline(data);
        }
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// A built-in scenario by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "hover_test" => Some(Self::hover_test()),
            "overheat_run" => Some(Self::overheat_run()),
            "field_overload" => Some(Self::field_overload()),
            _ => None,
        }
    }

    /// A built-in name, or else a path to a RON file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        if let Some(scenario) = Self::builtin(name_or_path) {
            return Ok(scenario);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            Self::load(path)
        } else {
            Err(ScenarioError::UnknownScenario(name_or_path.to_string()))
        }
    }

    /// Climb, hover, cruise and stop with a standard frigate.
    #[must_use]
    pub fn hover_test() -> Self {
        let mut scenario = Self::new("hover_test", frigate("frigate"));
        scenario.description = "Climb, hold altitude, cruise and stop".to_string();
        scenario.duration_seconds = 60.0;
        scenario.script = vec![
            ScriptedCommand::new(5.0, VehicleCommand::SetTargetVerticalVelocity { velocity: 1.0 }),
            ScriptedCommand::new(10.0, VehicleCommand::SetTargetVerticalVelocity { velocity: 0.0 }),
            ScriptedCommand::new(15.0, VehicleCommand::SetKnotsAhead { plant: 0, knots: 10.0 }),
            ScriptedCommand::new(45.0, VehicleCommand::AllStop),
        ];
        scenario
    }

    /// Push a jet engine past its limit, then dump heat.
    #[must_use]
    pub fn overheat_run() -> Self {
        let mut vehicle = frigate("jet_frigate");
        vehicle.power_plants[0].name = "jet".to_string();
        vehicle.power_plants[0].thermal = Some(ThermalData {
            heat_generation_rate: 20.0,
            heat_dissipation_rate: 30.0,
            overheat_damage_rate: 2.0,
            initial_temperature: 60.0,
            ..ThermalData::default()
        });

        let mut scenario = Self::new("overheat_run", vehicle);
        scenario.description = "Full burn until overheating, then an emergency heat dump".to_string();
        scenario.duration_seconds = 40.0;
        scenario.script = vec![
            ScriptedCommand::new(1.0, VehicleCommand::SetBurnRate { plant: 0, percent: 250.0 }),
            ScriptedCommand::new(2.0, VehicleCommand::SetKnotsAhead { plant: 0, knots: 20.0 }),
            ScriptedCommand::new(20.0, VehicleCommand::EmergencyHeatDump { plant: 0 }),
        ];
        scenario
    }

    /// Overdrive an unstable anti-gravity field, then stabilize it.
    #[must_use]
    pub fn field_overload() -> Self {
        let mut vehicle = frigate("anti_grav_frigate");
        if let Some(lift) = vehicle.lift.as_mut() {
            lift.name = "field".to_string();
            lift.field = Some(FieldData {
                field_stability: 0.6,
                ..FieldData::default()
            });
        }
        vehicle.power_plants[0].priority_mode = PriorityMode::LiftPriority;

        let mut scenario = Self::new("field_overload", vehicle);
        scenario.description = "Climb hard enough to overload the field, then settle".to_string();
        scenario.duration_seconds = 30.0;
        scenario.script = vec![
            ScriptedCommand::new(2.0, VehicleCommand::SetTargetVerticalVelocity { velocity: 3.0 }),
            ScriptedCommand::new(10.0, VehicleCommand::StabilizeField),
            ScriptedCommand::new(15.0, VehicleCommand::SetTargetVerticalVelocity { velocity: 0.0 }),
        ];
        scenario
    }

    /// The vehicle definition, reading it from disk if needed.
    ///
    /// Relative paths are taken from the working directory; [`Self::load`]
    /// embeds file vehicles up front.
    pub fn vehicle_data(&self) -> Result<VehicleData, ScenarioError> {
        match &self.vehicle {
            VehicleSource::Inline(data) => Ok(data.clone()),
            VehicleSource::File(path) => load_vehicle(path),
        }
    }

    /// Check for inconsistent values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Scenario name must not be empty".to_string());
        }
        if self.duration_seconds.is_nan() || self.duration_seconds <= 0.0 {
            errors.push(format!("duration_seconds must be positive, got {}", self.duration_seconds));
        }
        if self.sample_interval_seconds < 0.0 {
            errors.push("sample_interval_seconds must not be negative".to_string());
        }
        if self.config.tick_rate == 0 {
            errors.push("tick_rate must be positive".to_string());
        }
        for (i, entry) in self.script.iter().enumerate() {
            if entry.at_seconds < 0.0 || entry.at_seconds > self.duration_seconds {
                errors.push(format!(
                    "Script entry {i} at {}s is outside the flight (0-{}s)",
                    entry.at_seconds, self.duration_seconds
                ));
            }
        }
        if let VehicleSource::Inline(data) = &self.vehicle {
            errors.extend(data.validate());
        }

        errors
    }

    /// Validate, turning problems into an error.
    pub fn ensure_valid(&self) -> Result<(), ScenarioError> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Invalid {
                name: self.name.clone(),
                problems,
            })
        }
    }

    /// Total ticks of the flight.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.config.ticks_for(self.duration_seconds)
    }

    /// Script converted to (tick, command), ordered by tick. Entries at the
    /// same tick keep their script order.
    #[must_use]
    pub fn script_ticks(&self) -> Vec<(u64, VehicleCommand)> {
        let mut ticks: Vec<_> = self
            .script
            .iter()
            .map(|entry| (self.config.ticks_for(entry.at_seconds), entry.command.clone()))
            .collect();
        ticks.sort_by_key(|(tick, _)| *tick);
        ticks
    }
}

/// Read a vehicle definition from a RON file.
pub fn load_vehicle(path: &Path) -> Result<VehicleData, ScenarioError> {
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(VehicleData::from_ron_str(&contents, &path.display().to_string())?)
}

/// 30 t hull, 200 power/s plant, lift hovering at 30 power/s.
fn frigate(id: &str) -> VehicleData {
    let mut data = VehicleData::new(id);
    data.hull.mass_tons = 30.0;

    let mut plant = PowerPlantData::new("main");
    plant.max_power_per_second = 200.0;
    data.power_plants.push(plant);

    let mut lift = LiftUnitData::new("lift");
    lift.minimum_power_per_second = 30.0;
    data.lift = Some(lift);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        for name in BUILTIN_SCENARIOS {
            let scenario = Scenario::builtin(name).unwrap();
            assert_eq!(scenario.name, name);
            assert!(scenario.validate().is_empty(), "{name}: {:?}", scenario.validate());
        }
        assert!(Scenario::builtin("nope").is_none());
    }

    #[test]
    fn test_parse_inline_scenario() {
        let ron = r#"
            Scenario(
                name: "inline",
                vehicle: Inline((
                    id: "skiff",
                    hull: (mass_tons: 10.0),
                    power_plants: [(name: "main")],
                    lift: Some((name: "lift")),
                )),
                duration_seconds: 5.0,
                script: [
                    (at_seconds: 1.0, command: SetBurnRate(plant: 0, percent: 150.0)),
                    (at_seconds: 0.5, command: AllStop),
                ],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.spawn_altitude, 100.0);
        assert_eq!(scenario.config.tick_rate, 50);
        assert!(scenario.validate().is_empty());
        assert_eq!(scenario.total_ticks(), 250);

        let ticks = scenario.script_ticks();
        assert_eq!(ticks[0], (25, VehicleCommand::AllStop));
        assert_eq!(ticks[1].0, 50);
    }

    #[test]
    fn test_load_resolves_vehicle_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vehicles")).unwrap();
        std::fs::write(
            dir.path().join("vehicles/skiff.ron"),
            r#"(id: "skiff", power_plants: [(name: "main")], lift: Some((name: "lift")))"#,
        )
        .unwrap();
        let path = dir.path().join("flight.ron");
        std::fs::write(
            &path,
            r#"Scenario(name: "file", vehicle: File("vehicles/skiff.ron"))"#,
        )
        .unwrap();

        let scenario = Scenario::load(&path).unwrap();
        let VehicleSource::Inline(data) = &scenario.vehicle else {
            panic!("vehicle should be embedded");
        };
        assert_eq!(data.id, "skiff");
    }

    #[test]
    fn test_missing_file() {
        let result = Scenario::load("/definitely/not/here.ron");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
        assert!(matches!(
            Scenario::resolve("not_a_builtin"),
            Err(ScenarioError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_script_outside_flight_is_invalid() {
        let mut scenario = Scenario::hover_test();
        scenario.script.push(ScriptedCommand::new(500.0, VehicleCommand::AllStop));
        assert!(matches!(scenario.ensure_valid(), Err(ScenarioError::Invalid { .. })));
    }
}
