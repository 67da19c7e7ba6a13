//! Plain data shared between subsystems.
//!
//! These types carry no behaviour beyond small accessors. The subsystems
//! that own and mutate them live in their own modules.

use serde::{Deserialize, Serialize};

/// Unique identifier for vehicles in a [`Simulation`](crate::simulation::Simulation).
pub type VehicleId = u64;

// ============================================================================
// Allocation Policy
// ============================================================================

/// Policy deciding who gives way when thrust and lift together ask for more
/// power than the plant produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PriorityMode {
    /// Lift is served first; thrust gets what is left.
    LiftPriority,
    /// Thrust is served first; lift gets what is left.
    ThrustPriority,
    /// Lift keeps hover power, the rest is split in proportion to demand.
    #[default]
    Balanced,
}

/// How a force is applied to a rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ForceMode {
    /// Continuous force integrated over the tick (Newtons).
    #[default]
    Force,
    /// Instant change in momentum (Newton-seconds).
    Impulse,
}

/// Identifies which subsystem of a vehicle an event or damage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subsystem {
    /// Power plant at the given index in the hull.
    PowerPlant(usize),
    /// The vehicle's lift unit.
    Lift,
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerPlant(index) => write!(f, "power_plant[{index}]"),
            Self::Lift => write!(f, "lift"),
        }
    }
}

// ============================================================================
// Per-Tick State
// ============================================================================

/// Thrust side of a power plant, signed along the longitudinal axis.
///
/// Positive values point ahead, negative values astern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThrustState {
    /// Power the plant would like to spend on thrust this tick.
    pub requested_thrust_power: f64,
    /// Power actually granted to thrust by the allocator.
    pub allocated_thrust_power: f64,
    /// Resulting signed force along the forward axis (N).
    pub actual_force_newtons: f64,
    /// Vehicle speed along the forward axis when the request was made (kt).
    pub current_speed_knots: f64,
}

/// Lift side of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiftState {
    /// Power granted to the lift unit for this tick.
    pub allocated_power_per_second: f64,
    /// Power at which vertical velocity is exactly zero.
    pub minimum_power_per_second: f64,
    /// Commanded vertical velocity (m/s, positive up).
    pub vertical_velocity_mps: f64,
    /// Whether the unit is holding altitude.
    pub is_hovering: bool,
}

/// Heat accumulator of a thermal power plant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatState {
    /// Current temperature, never below zero.
    pub current_temperature: f64,
    /// Temperature above which the plant overheats.
    pub max_safe_temperature: f64,
}

impl HeatState {
    /// Whether the plant is above its safe operating temperature.
    #[must_use]
    pub fn is_overheating(&self) -> bool {
        self.current_temperature > self.max_safe_temperature
    }

    /// Degrees above the safe limit, zero when not overheating.
    #[must_use]
    pub fn excess(&self) -> f64 {
        (self.current_temperature - self.max_safe_temperature).max(0.0)
    }
}

/// Field strength of a field lift unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldState {
    /// Lift force as a percentage of vehicle weight.
    pub field_strength_percent: f64,
    /// Field strength above which the device takes overload damage.
    pub max_safe_field_strength: f64,
}

impl FieldState {
    /// Whether the field is above its safe strength.
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.field_strength_percent > self.max_safe_field_strength
    }

    /// Percentage points above the safe limit, zero when not overloaded.
    #[must_use]
    pub fn excess_percent(&self) -> f64 {
        (self.field_strength_percent - self.max_safe_field_strength).max(0.0)
    }
}
