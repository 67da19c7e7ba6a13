//! JSON protocol for headless flight sessions.
//!
//! The interactive runner communicates via JSON lines (one JSON object per
//! line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** State updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner outputs state after each `tick` (or on `query`)
//! 4. On `quit`, outputs `{"type":"bye"}` and exits
//!
//! Vehicle commands take an optional `vehicle` id; without one they go to
//! the first vehicle spawned.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"load_scenario","path":"hover_test"}
//! <- {"type":"spawned","vehicle_id":1,"kind":"frigate"}
//! -> {"cmd":"set_burn_rate","plant":0,"percent":150}
//! <- {"type":"ack","cmd":"set_burn_rate"}
//! -> {"cmd":"tick","count":50}
//! <- {"type":"state","tick":50,...}
//! -> {"cmd":"hash"}
//! <- {"type":"state_hash","tick":50,"hash":1234567890}
//! ```

use serde::{Deserialize, Serialize};
use skyship_core::components::{PriorityMode, VehicleId};
use skyship_core::events::{SimEvent, VehicleTelemetry};
use skyship_core::simulation::VehicleCommand;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance simulation by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Query current state without advancing time.
    Query,

    /// Report the current state hash.
    Hash,

    /// Quit the session.
    Quit,

    /// Replace the simulation with a scenario (built-in name or RON path).
    LoadScenario { path: String },

    /// Spawn a vehicle from a RON file.
    Spawn {
        path: String,
        #[serde(default = "default_altitude")]
        altitude: f64,
    },

    /// Remove a vehicle.
    Despawn { vehicle: VehicleId },

    // Vehicle commands. `vehicle` defaults to the first vehicle spawned.
    /// See [`VehicleCommand::SetBurnRate`].
    SetBurnRate {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        percent: f64,
    },
    /// See [`VehicleCommand::SetKnotsAhead`].
    SetKnotsAhead {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        knots: f64,
    },
    /// See [`VehicleCommand::SetKnotsAstern`].
    SetKnotsAstern {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        knots: f64,
    },
    /// See [`VehicleCommand::AllStop`].
    AllStop {
        #[serde(default)]
        vehicle: Option<VehicleId>,
    },
    /// See [`VehicleCommand::SetPriorityMode`].
    SetPriorityMode {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        mode: PriorityMode,
    },
    /// See [`VehicleCommand::SetPowerReservation`].
    SetPowerReservation {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        percent: f64,
    },
    /// See [`VehicleCommand::SetPowerRequest`].
    SetPowerRequest {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        power: f64,
    },
    /// See [`VehicleCommand::SetTargetVerticalVelocity`].
    SetTargetVerticalVelocity {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        velocity: f64,
    },
    /// See [`VehicleCommand::SetPowerAllocation`].
    SetPowerAllocation {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        power: f64,
    },
    /// See [`VehicleCommand::SetLiftActive`].
    SetLiftActive {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        active: bool,
    },
    /// See [`VehicleCommand::EmergencyHeatDump`].
    EmergencyHeatDump {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
    },
    /// See [`VehicleCommand::EmergencyFieldBoost`].
    EmergencyFieldBoost {
        #[serde(default)]
        vehicle: Option<VehicleId>,
    },
    /// See [`VehicleCommand::StabilizeField`].
    StabilizeField {
        #[serde(default)]
        vehicle: Option<VehicleId>,
    },
    /// See [`VehicleCommand::SetPlantEnabled`].
    SetPlantEnabled {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        plant: usize,
        enabled: bool,
    },
    /// See [`VehicleCommand::ManeuveringThrust`].
    ManeuveringThrust {
        #[serde(default)]
        vehicle: Option<VehicleId>,
        direction: [f64; 3],
        newtons: f64,
    },
    /// See [`VehicleCommand::EmergencyStop`].
    EmergencyStop {
        #[serde(default)]
        vehicle: Option<VehicleId>,
    },
}

fn default_tick_count() -> u32 {
    1
}

fn default_altitude() -> f64 {
    100.0
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, tick: u64 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current simulation state and the events since the last state.
    State {
        tick: u64,
        elapsed_seconds: f64,
        hash: u64,
        vehicles: Vec<VehicleTelemetry>,
        events: Vec<SimEvent>,
    },

    /// Vehicle was spawned.
    Spawned { vehicle_id: VehicleId, kind: String },

    /// State hash for determinism verification.
    StateHash { tick: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
            Self::LoadScenario { .. } => "load_scenario",
            Self::Spawn { .. } => "spawn",
            Self::Despawn { .. } => "despawn",
            _ => self
                .to_vehicle_command()
                .map_or("unknown", |(_, command)| command.name()),
        }
    }

    /// Split a vehicle command into its target and the simulation command.
    ///
    /// Returns `None` for session commands.
    pub fn to_vehicle_command(&self) -> Option<(Option<VehicleId>, VehicleCommand)> {
        let pair = match *self {
            Self::SetBurnRate { vehicle, plant, percent } => {
                (vehicle, VehicleCommand::SetBurnRate { plant, percent })
            }
            Self::SetKnotsAhead { vehicle, plant, knots } => {
                (vehicle, VehicleCommand::SetKnotsAhead { plant, knots })
            }
            Self::SetKnotsAstern { vehicle, plant, knots } => {
                (vehicle, VehicleCommand::SetKnotsAstern { plant, knots })
            }
            Self::AllStop { vehicle } => (vehicle, VehicleCommand::AllStop),
            Self::SetPriorityMode { vehicle, plant, mode } => {
                (vehicle, VehicleCommand::SetPriorityMode { plant, mode })
            }
            Self::SetPowerReservation { vehicle, plant, percent } => {
                (vehicle, VehicleCommand::SetPowerReservation { plant, percent })
            }
            Self::SetPowerRequest { vehicle, power } => {
                (vehicle, VehicleCommand::SetPowerRequest { power })
            }
            Self::SetTargetVerticalVelocity { vehicle, velocity } => {
                (vehicle, VehicleCommand::SetTargetVerticalVelocity { velocity })
            }
            Self::SetPowerAllocation { vehicle, power } => {
                (vehicle, VehicleCommand::SetPowerAllocation { power })
            }
            Self::SetLiftActive { vehicle, active } => {
                (vehicle, VehicleCommand::SetLiftActive { active })
            }
            Self::EmergencyHeatDump { vehicle, plant } => {
                (vehicle, VehicleCommand::EmergencyHeatDump { plant })
            }
            Self::EmergencyFieldBoost { vehicle } => (vehicle, VehicleCommand::EmergencyFieldBoost),
            Self::StabilizeField { vehicle } => (vehicle, VehicleCommand::StabilizeField),
            Self::SetPlantEnabled { vehicle, plant, enabled } => {
                (vehicle, VehicleCommand::SetPlantEnabled { plant, enabled })
            }
            Self::ManeuveringThrust { vehicle, direction, newtons } => (
                vehicle,
                VehicleCommand::ManeuveringThrust {
                    direction: glam::DVec3::from_array(direction),
                    newtons,
                },
            ),
            Self::EmergencyStop { vehicle } => (vehicle, VehicleCommand::EmergencyStop),
            Self::Tick { .. }
            | Self::Query
            | Self::Hash
            | Self::Quit
            | Self::LoadScenario { .. }
            | Self::Spawn { .. }
            | Self::Despawn { .. } => return None,
        };
        Some(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(cmd, Command::Tick { count: 60 }));
    }

    #[test]
    fn test_default_tick_count() {
        let json = r#"{"cmd":"tick"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(cmd, Command::Tick { count: 1 }));
    }

    #[test]
    fn test_parse_vehicle_command_without_target() {
        let json = r#"{"cmd":"set_burn_rate","plant":0,"percent":150}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd.name(), "set_burn_rate");
        assert_eq!(
            cmd.to_vehicle_command(),
            Some((None, VehicleCommand::SetBurnRate { plant: 0, percent: 150.0 }))
        );
    }

    #[test]
    fn test_parse_targeted_priority_mode() {
        let json = r#"{"cmd":"set_priority_mode","vehicle":3,"plant":1,"mode":"LiftPriority"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd.to_vehicle_command(),
            Some((
                Some(3),
                VehicleCommand::SetPriorityMode { plant: 1, mode: PriorityMode::LiftPriority }
            ))
        );
    }

    #[test]
    fn test_parse_all_stop_defaults() {
        let cmd = Command::from_json(r#"{"cmd":"all_stop"}"#).unwrap();
        assert_eq!(cmd, Command::AllStop { vehicle: None });
        assert_eq!(cmd.name(), "all_stop");
    }

    #[test]
    fn test_session_commands_are_not_vehicle_commands() {
        assert!(Command::Query.to_vehicle_command().is_none());
        assert_eq!(Command::Hash.name(), "hash");
    }

    #[test]
    fn test_serialize_state_hash_response() {
        let json = Response::StateHash { tick: 100, hash: 12345 }.to_json_line();
        assert!(json.contains(r#""type":"state_hash""#));
        assert!(json.contains(r#""tick":100"#));
        assert!(json.ends_with('\n'));
    }
}
