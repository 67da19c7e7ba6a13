//! Error types for the flight simulation.
//!
//! Ticking never fails. Errors only come from loading vehicle data and from
//! commands addressed to something that does not exist.

use thiserror::Error;

use crate::components::VehicleId;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Vehicle definition failed validation.
    #[error("Invalid vehicle '{vehicle}': {}", problems.join("; "))]
    InvalidVehicle {
        /// Vehicle identifier from the data file.
        vehicle: String,
        /// Every validation problem found.
        problems: Vec<String>,
    },

    /// Vehicle identifier not present in the simulation.
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(VehicleId),

    /// Power plant index out of range for a vehicle.
    #[error("Vehicle {vehicle} has no power plant at index {index}")]
    PowerPlantNotFound {
        /// Vehicle the command was addressed to.
        vehicle: VehicleId,
        /// Requested plant index.
        index: usize,
    },

    /// The vehicle has no lift unit.
    #[error("Vehicle {0} has no lift unit")]
    LiftUnitNotFound(VehicleId),

    /// Command targets a capability the subsystem variant does not have.
    #[error("Unsupported command for {subsystem}: {command}")]
    UnsupportedCommand {
        /// Subsystem description.
        subsystem: String,
        /// Command name.
        command: String,
    },

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}
