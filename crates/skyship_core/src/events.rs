//! Notifications and telemetry snapshots.
//!
//! Events are collected during a tick and returned from
//! [`Simulation::tick`](crate::simulation::Simulation::tick). Telemetry is a
//! polling snapshot that can be taken at any time.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::{FieldState, HeatState, LiftState, Subsystem, ThrustState, VehicleId};

/// Something that happened to one vehicle during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleEvent {
    /// A power plant's output changed.
    PowerOutputChanged {
        /// Plant index.
        plant: usize,
        /// New output.
        value: f64,
    },
    /// A power plant's signed thrust force changed (N).
    ThrustOutputChanged {
        /// Plant index.
        plant: usize,
        /// New force.
        value: f64,
    },
    /// The lift force changed (N).
    LiftForceChanged {
        /// New lift force.
        value: f64,
    },
    /// The lift unit was destroyed and went offline.
    LiftFailure,
    /// A power plant was destroyed and went offline.
    PowerPlantFailure {
        /// Plant index.
        plant: usize,
    },
    /// A thermal plant crossed above its safe temperature.
    OverheatStarted {
        /// Plant index.
        plant: usize,
    },
    /// A thermal plant cooled back to its safe temperature.
    OverheatEnded {
        /// Plant index.
        plant: usize,
    },
    /// The lift field went above its safe strength.
    FieldOverloadStarted,
    /// The lift field returned to a safe strength.
    FieldOverloadEnded,
    /// Whole damage points were applied to a subsystem.
    Damaged {
        /// Damaged subsystem.
        subsystem: Subsystem,
        /// Points applied.
        amount: u32,
    },
}

/// A [`VehicleEvent`] tagged with its vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Vehicle the event belongs to.
    pub vehicle: VehicleId,
    /// What happened.
    pub event: VehicleEvent,
}

/// Events generated during a simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Events in vehicle id order, then in the order they occurred.
    pub events: Vec<SimEvent>,
}

impl TickEvents {
    /// Append every event of one vehicle.
    pub fn extend_for(&mut self, vehicle: VehicleId, events: impl IntoIterator<Item = VehicleEvent>) {
        self.events
            .extend(events.into_iter().map(|event| SimEvent { vehicle, event }));
    }

    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of a single vehicle.
    pub fn for_vehicle(&self, vehicle: VehicleId) -> impl Iterator<Item = &VehicleEvent> {
        self.events
            .iter()
            .filter(move |e| e.vehicle == vehicle)
            .map(|e| &e.event)
    }

    /// Whole damage points applied this tick, across all vehicles.
    #[must_use]
    pub fn total_damage(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e.event {
                VehicleEvent::Damaged { amount, .. } => u64::from(amount),
                _ => 0,
            })
            .sum()
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Read-only snapshot of one power plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlantTelemetry {
    /// Plant name.
    pub name: String,
    /// Still operational.
    pub active: bool,
    /// Participates in the hull's thrust sum.
    pub enabled: bool,
    /// Current throttle (0-300).
    pub burn_rate_percent: f64,
    /// Output available for allocation.
    pub current_power_output: f64,
    /// Output held back for non-propulsion systems.
    pub reserved_power: f64,
    /// Thrust side of the last tick.
    pub thrust: ThrustState,
    /// Power granted to the lift unit by this plant.
    pub allocated_lift_power: f64,
    /// Wear damage per second at the current burn.
    pub damage_per_second: f64,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Heat state of thermal plants.
    pub heat: Option<HeatState>,
}

impl PowerPlantTelemetry {
    /// Whether the plant is above its safe temperature.
    #[must_use]
    pub fn is_overheating(&self) -> bool {
        self.heat.is_some_and(|h| h.is_overheating())
    }
}

/// Read-only snapshot of the lift unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftTelemetry {
    /// Unit name.
    pub name: String,
    /// Engaged and operational.
    pub active: bool,
    /// Allocation and vertical motion of the last tick.
    pub state: LiftState,
    /// Power the unit asks for.
    pub power_request: f64,
    /// Lift force of the last tick (N).
    pub current_lift_force: f64,
    /// Wear damage per second at the current power ratio.
    pub damage_per_second: f64,
    /// Field overload damage per second, applied on top of wear.
    #[serde(default)]
    pub overload_damage_per_second: f64,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Field state of anti-gravity devices.
    pub field: Option<FieldState>,
    /// Calibrated altitude of anti-gravity devices (m).
    pub current_altitude: Option<f64>,
}

impl LiftTelemetry {
    /// Whether the field is above its safe strength.
    #[must_use]
    pub fn is_field_overloaded(&self) -> bool {
        self.field.is_some_and(|f| f.is_overloaded())
    }
}

/// Read-only snapshot of a whole vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTelemetry {
    /// Vehicle identifier.
    pub id: VehicleId,
    /// Vehicle type from the data file.
    pub kind: String,
    /// World position (m).
    pub position: DVec3,
    /// Linear velocity (m/s).
    pub velocity: DVec3,
    /// Speed along the forward axis (kt, signed).
    pub current_speed_knots: f64,
    /// Speed along the forward axis (m/s, signed).
    pub current_speed_mps: f64,
    /// Summed thrust over mass (m/s²).
    pub acceleration_mps2: f64,
    /// Summed output of enabled plants.
    pub total_power_output: f64,
    /// Summed signed thrust of enabled plants (N).
    pub total_thrust_newtons: f64,
    /// Whether gravity currently acts on the body.
    pub use_gravity: bool,
    /// Per-plant state in hull order.
    pub power_plants: Vec<PowerPlantTelemetry>,
    /// Lift unit state.
    pub lift: Option<LiftTelemetry>,
}

impl VehicleTelemetry {
    /// Whether every subsystem has failed.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.power_plants.iter().all(|p| !p.active)
            && self.lift.as_ref().map_or(true, |l| l.health == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_events_filter_by_vehicle() {
        let mut events = TickEvents::default();
        events.extend_for(1, [VehicleEvent::LiftFailure]);
        events.extend_for(
            2,
            [
                VehicleEvent::Damaged {
                    subsystem: Subsystem::Lift,
                    amount: 3,
                },
                VehicleEvent::Damaged {
                    subsystem: Subsystem::PowerPlant(0),
                    amount: 2,
                },
            ],
        );

        assert_eq!(events.for_vehicle(1).count(), 1);
        assert_eq!(events.for_vehicle(2).count(), 2);
        assert_eq!(events.total_damage(), 5);
    }
}
