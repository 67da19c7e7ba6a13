//! Lift unit data structures.

use serde::{Deserialize, Serialize};

/// Field multipliers of an anti-gravity lift unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    /// Power multiplier; above 1 the device needs less power for the same lift.
    #[serde(default = "default_one")]
    pub field_efficiency: f64,

    /// 1 is perfectly stable; lower values jitter the lift force.
    #[serde(default = "default_one")]
    pub field_stability: f64,

    /// Field strength (percent of vehicle weight) above which the device
    /// takes overload damage.
    #[serde(default = "default_max_safe_field_strength")]
    pub max_safe_field_strength: f64,

    /// Offset added to the body height for altitude telemetry.
    #[serde(default)]
    pub altitude_calibration: f64,
}

const fn default_one() -> f64 {
    1.0
}

const fn default_max_safe_field_strength() -> f64 {
    150.0
}

impl Default for FieldData {
    fn default() -> Self {
        Self {
            field_efficiency: 1.0,
            field_stability: 1.0,
            max_safe_field_strength: default_max_safe_field_strength(),
            altitude_calibration: 0.0,
        }
    }
}

/// Data-driven lift unit definition.
///
/// A unit with `field: Some(..)` is an anti-gravity device.
///
/// # Example RON
///
/// ```ron
/// LiftUnitData(
///     name: "ag_core",
///     minimum_power_per_second: 30.0,
///     field: Some(FieldData(field_stability: 0.8)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftUnitData {
    /// Display name, used in logs.
    pub name: String,

    /// Power at which the vehicle hovers.
    #[serde(default = "default_minimum_power")]
    pub minimum_power_per_second: f64,

    /// Power per ton for each m/s of climb.
    #[serde(default = "default_one")]
    pub power_per_ton_per_meter_per_second: f64,

    /// Wear damage per second at hover power.
    #[serde(default = "default_usage_damage")]
    pub usage_damage_per_second: f64,

    /// Health of the unit.
    #[serde(default = "default_max_health")]
    pub max_health: u32,

    /// Whether the unit starts engaged.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Field model, present for anti-gravity devices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldData>,
}

const fn default_minimum_power() -> f64 {
    10.0
}

const fn default_usage_damage() -> f64 {
    0.5
}

const fn default_max_health() -> u32 {
    100
}

const fn default_active() -> bool {
    true
}

impl LiftUnitData {
    /// Create a lift definition with default tuning.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            minimum_power_per_second: default_minimum_power(),
            power_per_ton_per_meter_per_second: 1.0,
            usage_damage_per_second: default_usage_damage(),
            max_health: default_max_health(),
            active: true,
            field: None,
        }
    }

    /// Whether this unit has a field model.
    #[must_use]
    pub const fn is_field_device(&self) -> bool {
        self.field.is_some()
    }

    /// Check the lift unit for inconsistent values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let name = &self.name;

        if !(self.minimum_power_per_second.is_finite() && self.minimum_power_per_second > 0.0) {
            errors.push(format!(
                "Lift unit '{name}': minimum_power_per_second must be positive, got {}",
                self.minimum_power_per_second
            ));
        }
        if !(self.power_per_ton_per_meter_per_second.is_finite()
            && self.power_per_ton_per_meter_per_second > 0.0)
        {
            errors.push(format!(
                "Lift unit '{name}': power_per_ton_per_meter_per_second must be positive, got {}",
                self.power_per_ton_per_meter_per_second
            ));
        }
        if !(self.usage_damage_per_second.is_finite() && self.usage_damage_per_second >= 0.0) {
            errors.push(format!(
                "Lift unit '{name}': usage_damage_per_second must be non-negative, got {}",
                self.usage_damage_per_second
            ));
        }
        if self.max_health == 0 {
            errors.push(format!("Lift unit '{name}': max_health must be positive"));
        }

        if let Some(field) = &self.field {
            if !(field.field_efficiency > 0.0 && field.field_efficiency <= 2.0) {
                errors.push(format!(
                    "Lift unit '{name}': field_efficiency must be in (0, 2], got {}",
                    field.field_efficiency
                ));
            }
            if !(0.0..=1.0).contains(&field.field_stability) {
                errors.push(format!(
                    "Lift unit '{name}': field_stability must be in [0, 1], got {}",
                    field.field_stability
                ));
            }
            if !(field.max_safe_field_strength.is_finite() && field.max_safe_field_strength > 0.0)
            {
                errors.push(format!(
                    "Lift unit '{name}': max_safe_field_strength must be positive, got {}",
                    field.max_safe_field_strength
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_device() {
        let source = r#"LiftUnitData(name: "ag", minimum_power_per_second: 30.0, field: Some(FieldData(field_stability: 0.8)))"#;
        let lift: LiftUnitData = ron::from_str(source).unwrap();
        assert!(lift.is_field_device());
        assert!(lift.active);
        let field = lift.field.unwrap();
        assert_eq!(field.field_stability, 0.8);
        assert_eq!(field.field_efficiency, 1.0);
        assert_eq!(field.max_safe_field_strength, 150.0);
    }

    #[test]
    fn test_validate_field_ranges() {
        let mut lift = LiftUnitData::new("ag");
        lift.field = Some(FieldData {
            field_efficiency: 3.0,
            field_stability: 1.5,
            ..FieldData::default()
        });
        assert_eq!(lift.validate().len(), 2);
    }

    #[test]
    fn test_validate_zero_hover_power() {
        let mut lift = LiftUnitData::new("basic");
        lift.minimum_power_per_second = 0.0;
        let errors = lift.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("minimum_power_per_second"));
    }
}
