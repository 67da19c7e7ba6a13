//! Data structures for vehicle configuration.
//!
//! This module contains pure data structures that define hulls, power
//! plants and lift units. All structs are designed to be deserialized
//! from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. Reading files is left to the headless runner and tools.

mod hull_data;
mod lift_data;
mod power_plant_data;
mod vehicle_data;

pub use hull_data::HullData;
pub use lift_data::{FieldData, LiftUnitData};
pub use power_plant_data::{PowerPlantData, ThermalData};
pub use vehicle_data::VehicleData;
