//! Power plant data structures.

use serde::{Deserialize, Serialize};

use crate::components::PriorityMode;

/// Heat model of a thermal power plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalData {
    /// Temperature above which the plant overheats.
    #[serde(default = "default_max_safe_temperature")]
    pub max_safe_temperature: f64,

    /// Heat gained per second at 100% burn.
    #[serde(default = "default_heat_generation_rate")]
    pub heat_generation_rate: f64,

    /// Base heat lost per second.
    #[serde(default = "default_heat_dissipation_rate")]
    pub heat_dissipation_rate: f64,

    /// Output lost per degree above the safe limit (fraction).
    #[serde(default = "default_heat_efficiency_penalty")]
    pub heat_efficiency_penalty_per_degree: f64,

    /// Damage per second at twice the safe temperature.
    #[serde(default = "default_overheat_damage_rate")]
    pub overheat_damage_rate: f64,

    /// Temperature at spawn.
    #[serde(default)]
    pub initial_temperature: f64,
}

const fn default_max_safe_temperature() -> f64 {
    100.0
}

const fn default_heat_generation_rate() -> f64 {
    10.0
}

const fn default_heat_dissipation_rate() -> f64 {
    5.0
}

const fn default_heat_efficiency_penalty() -> f64 {
    0.01
}

const fn default_overheat_damage_rate() -> f64 {
    5.0
}

impl Default for ThermalData {
    fn default() -> Self {
        Self {
            max_safe_temperature: default_max_safe_temperature(),
            heat_generation_rate: default_heat_generation_rate(),
            heat_dissipation_rate: default_heat_dissipation_rate(),
            heat_efficiency_penalty_per_degree: default_heat_efficiency_penalty(),
            overheat_damage_rate: default_overheat_damage_rate(),
            initial_temperature: 0.0,
        }
    }
}

/// Data-driven power plant definition.
///
/// A plant with `thermal: Some(..)` is a jet engine with a heat model.
///
/// # Example RON
///
/// ```ron
/// PowerPlantData(
///     name: "main_jet",
///     max_power_per_second: 120.0,
///     force_per_unit_power: 500.0,
///     burn_rate_percent: 100.0,
///     thermal: Some(ThermalData(
///         max_safe_temperature: 100.0,
///         heat_generation_rate: 20.0,
///     )),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlantData {
    /// Display name, used in logs.
    pub name: String,

    /// Output per second at 100% burn.
    #[serde(default = "default_max_power")]
    pub max_power_per_second: f64,

    /// Newtons of thrust per unit of allocated power.
    #[serde(default = "default_force_per_unit_power")]
    pub force_per_unit_power: f64,

    /// Acceleration authority: power per ton per m/s.
    #[serde(default = "default_power_per_ton")]
    pub power_per_ton_per_meter_per_second: f64,

    /// Wear damage per second at 100% burn.
    #[serde(default = "default_usage_damage")]
    pub usage_damage_per_second: f64,

    /// Health of the plant.
    #[serde(default = "default_max_health")]
    pub max_health: u32,

    /// Initial burn rate (0-300).
    #[serde(default = "default_burn_rate")]
    pub burn_rate_percent: f64,

    /// Share of output held back for non-propulsion systems (0-100).
    #[serde(default)]
    pub power_reserved_percent: f64,

    /// Initial arbitration policy.
    #[serde(default)]
    pub priority_mode: PriorityMode,

    /// Heat model, present for thermal plants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalData>,
}

const fn default_max_power() -> f64 {
    100.0
}

const fn default_force_per_unit_power() -> f64 {
    100.0
}

const fn default_power_per_ton() -> f64 {
    1.0
}

const fn default_usage_damage() -> f64 {
    1.0
}

const fn default_max_health() -> u32 {
    100
}

const fn default_burn_rate() -> f64 {
    100.0
}

impl PowerPlantData {
    /// Create a plant definition with default tuning.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_power_per_second: default_max_power(),
            force_per_unit_power: default_force_per_unit_power(),
            power_per_ton_per_meter_per_second: default_power_per_ton(),
            usage_damage_per_second: default_usage_damage(),
            max_health: default_max_health(),
            burn_rate_percent: default_burn_rate(),
            power_reserved_percent: 0.0,
            priority_mode: PriorityMode::default(),
            thermal: None,
        }
    }

    /// Whether this plant has a heat model.
    #[must_use]
    pub const fn is_thermal(&self) -> bool {
        self.thermal.is_some()
    }

    /// Check the plant for inconsistent values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let name = &self.name;

        for (field, value) in [
            ("max_power_per_second", self.max_power_per_second),
            ("usage_damage_per_second", self.usage_damage_per_second),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("Power plant '{name}': {field} must be non-negative, got {value}"));
            }
        }
        for (field, value) in [
            ("force_per_unit_power", self.force_per_unit_power),
            (
                "power_per_ton_per_meter_per_second",
                self.power_per_ton_per_meter_per_second,
            ),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("Power plant '{name}': {field} must be positive, got {value}"));
            }
        }
        if !(0.0..=300.0).contains(&self.burn_rate_percent) {
            errors.push(format!(
                "Power plant '{name}': burn_rate_percent must be in [0, 300], got {}",
                self.burn_rate_percent
            ));
        }
        if !(0.0..=100.0).contains(&self.power_reserved_percent) {
            errors.push(format!(
                "Power plant '{name}': power_reserved_percent must be in [0, 100], got {}",
                self.power_reserved_percent
            ));
        }
        if self.max_health == 0 {
            errors.push(format!("Power plant '{name}': max_health must be positive"));
        }

        if let Some(thermal) = &self.thermal {
            if !(thermal.max_safe_temperature.is_finite() && thermal.max_safe_temperature > 0.0) {
                errors.push(format!(
                    "Power plant '{name}': max_safe_temperature must be positive, got {}",
                    thermal.max_safe_temperature
                ));
            }
            for (field, value) in [
                ("heat_generation_rate", thermal.heat_generation_rate),
                ("heat_dissipation_rate", thermal.heat_dissipation_rate),
                (
                    "heat_efficiency_penalty_per_degree",
                    thermal.heat_efficiency_penalty_per_degree,
                ),
                ("overheat_damage_rate", thermal.overheat_damage_rate),
                ("initial_temperature", thermal.initial_temperature),
            ] {
                if !(value.is_finite() && value >= 0.0) {
                    errors.push(format!(
                        "Power plant '{name}': {field} must be non-negative, got {value}"
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thermal_plant() {
        let source = r#"
            PowerPlantData(
                name: "jet",
                max_power_per_second: 120.0,
                thermal: Some(ThermalData(heat_generation_rate: 20.0)),
            )
        "#;
        let plant: PowerPlantData = ron::from_str(source).unwrap();
        assert_eq!(plant.name, "jet");
        assert_eq!(plant.max_power_per_second, 120.0);
        assert_eq!(plant.burn_rate_percent, 100.0);
        assert!(plant.is_thermal());

        let thermal = plant.thermal.unwrap();
        assert_eq!(thermal.heat_generation_rate, 20.0);
        assert_eq!(thermal.max_safe_temperature, 100.0);
    }

    #[test]
    fn test_validate_valid_plant() {
        let plant = PowerPlantData::new("main");
        let errors = plant.validate();
        assert!(errors.is_empty(), "Errors: {errors:?}");
    }

    #[test]
    fn test_validate_out_of_range() {
        let mut plant = PowerPlantData::new("main");
        plant.burn_rate_percent = 400.0;
        plant.power_reserved_percent = -1.0;
        plant.thermal = Some(ThermalData {
            max_safe_temperature: 0.0,
            ..ThermalData::default()
        });

        let errors = plant.validate();
        assert_eq!(errors.len(), 3, "Errors: {errors:?}");
        assert!(errors[0].contains("burn_rate_percent"));
    }
}
