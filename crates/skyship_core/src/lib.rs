//! # Skyship Core
//!
//! Deterministic power, lift and flight simulation for airborne vehicles.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO beyond parsing RON strings handed to it
//! - No system randomness (field jitter uses seeded `ChaCha8Rng`)
//!
//! This separation enables:
//! - Headless flight runs and batch testing
//! - Determinism checks via [`simulation::Simulation::state_hash`]
//! - Data validation tooling
//!
//! ## Crate Structure
//!
//! - [`allocation`] - Thrust/lift power arbitration
//! - [`body`] - Rigid body seam and point-mass integrator
//! - [`components`] - Shared state records and identifiers
//! - [`damage`] - Fractional damage carry
//! - [`data`] - Data-driven vehicle definitions (RON)
//! - [`error`] - Error types
//! - [`events`] - Tick events and telemetry
//! - [`field`] - Anti-gravity field lift variant
//! - [`health`] - Health sink
//! - [`hull`] - Vehicle hull aggregation and forces
//! - [`lift`] - Lift units
//! - [`math`] - Unit conversions and helpers
//! - [`power_plant`] - Power plants and thrust control
//! - [`simulation`] - Core simulation loop
//! - [`thermal`] - Jet engine heat variant

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod allocation;
pub mod body;
pub mod components;
pub mod damage;
pub mod data;
pub mod error;
pub mod events;
pub mod field;
pub mod health;
pub mod hull;
pub mod lift;
pub mod math;
pub mod power_plant;
pub mod simulation;
pub mod thermal;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::allocation::{allocate, Allocation, AllocationRequest};
    pub use crate::body::{PointMassBody, RigidBody};
    pub use crate::components::*;
    pub use crate::data::{
        FieldData, HullData, LiftUnitData, PowerPlantData, ThermalData, VehicleData,
    };
    pub use crate::error::{Result, SimError};
    pub use crate::events::{
        LiftTelemetry, PowerPlantTelemetry, SimEvent, TickEvents, VehicleEvent, VehicleTelemetry,
    };
    pub use crate::health::Health;
    pub use crate::hull::VehicleHull;
    pub use crate::lift::LiftUnit;
    pub use crate::power_plant::PowerPlant;
    pub use crate::simulation::{Simulation, SimulationConfig, VehicleCommand};
}
