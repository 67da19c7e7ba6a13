//! Complete vehicle definition.

use serde::{Deserialize, Serialize};

use super::{HullData, LiftUnitData, PowerPlantData};
use crate::error::{Result, SimError};

/// Data-driven vehicle definition: one hull, its power plants and an
/// optional lift unit.
///
/// # Example RON
///
/// ```ron
/// VehicleData(
///     id: "frigate",
///     hull: HullData(mass_tons: 30.0),
///     power_plants: [
///         PowerPlantData(name: "main"),
///     ],
///     lift: Some(LiftUnitData(name: "lift", minimum_power_per_second: 30.0)),
///     lift_power_source: 0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    /// Unique string identifier for this vehicle type.
    pub id: String,

    /// Human readable name.
    #[serde(default)]
    pub name: String,

    /// Hull characteristics.
    #[serde(default)]
    pub hull: HullData,

    /// Power plants in hull order.
    #[serde(default)]
    pub power_plants: Vec<PowerPlantData>,

    /// Lift unit, if the vehicle flies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift: Option<LiftUnitData>,

    /// Index of the power plant that feeds the lift unit.
    #[serde(default)]
    pub lift_power_source: usize,
}

impl VehicleData {
    /// Create an empty vehicle with a default hull.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            hull: HullData::default(),
            power_plants: Vec::new(),
            lift: None,
            lift_power_source: 0,
        }
    }

    /// Parse a vehicle definition from RON.
    ///
    /// `origin` names the source in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataParseError`] if the text is not a valid
    /// vehicle definition.
    pub fn from_ron_str(source: &str, origin: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| SimError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// The plant feeding the lift unit, if any.
    #[must_use]
    pub fn lift_source(&self) -> Option<&PowerPlantData> {
        self.power_plants.get(self.lift_power_source)
    }

    /// Check the whole vehicle for inconsistent values.
    ///
    /// Returns every problem found; an empty list means the vehicle can be
    /// spawned.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push("Vehicle id must not be empty".to_string());
        }

        errors.extend(self.hull.validate());

        for plant in &self.power_plants {
            errors.extend(plant.validate());
        }

        if let Some(lift) = &self.lift {
            errors.extend(lift.validate());
            if self.lift_source().is_none() {
                errors.push(format!(
                    "Lift power source index {} out of range ({} power plants)",
                    self.lift_power_source,
                    self.power_plants.len()
                ));
            }
        }

        errors
    }

    /// Validate, turning problems into an error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidVehicle`] listing every problem.
    pub fn ensure_valid(&self) -> Result<()> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SimError::InvalidVehicle {
                vehicle: self.id.clone(),
                problems,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_vehicle() -> VehicleData {
        let mut vehicle = VehicleData::new("frigate");
        vehicle.hull.mass_tons = 30.0;
        vehicle.power_plants.push(PowerPlantData::new("main"));
        vehicle.lift = Some(LiftUnitData::new("lift"));
        vehicle
    }

    #[test]
    fn test_validate_valid_vehicle() {
        let vehicle = create_test_vehicle();
        let errors = vehicle.validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
        assert!(vehicle.ensure_valid().is_ok());
    }

    #[test]
    fn test_validate_lift_source_out_of_range() {
        let mut vehicle = create_test_vehicle();
        vehicle.lift_power_source = 3;

        let errors = vehicle.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Lift power source"));
        assert!(matches!(
            vehicle.ensure_valid(),
            Err(SimError::InvalidVehicle { .. })
        ));
    }

    #[test]
    fn test_lift_without_plants_is_invalid() {
        let mut vehicle = VehicleData::new("glider");
        vehicle.lift = Some(LiftUnitData::new("lift"));
        assert!(!vehicle.validate().is_empty());
    }

    #[test]
    fn test_from_ron_str() {
        let source = r#"
            VehicleData(
                id: "frigate",
                hull: HullData(mass_tons: 30.0, forward: (1.0, 0.0, 0.0)),
                power_plants: [PowerPlantData(name: "main")],
                lift: Some(LiftUnitData(name: "lift", minimum_power_per_second: 30.0)),
            )
        "#;
        let vehicle = VehicleData::from_ron_str(source, "inline").unwrap();
        assert_eq!(vehicle.id, "frigate");
        assert_eq!(vehicle.hull.forward, glam::DVec3::X);
        assert_eq!(vehicle.power_plants.len(), 1);
        assert_eq!(vehicle.lift_power_source, 0);
    }

    #[test]
    fn test_from_ron_str_reports_origin() {
        let err = VehicleData::from_ron_str("VehicleData(", "broken.ron").unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }
}
