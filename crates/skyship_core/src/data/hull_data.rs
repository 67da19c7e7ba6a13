//! Hull data: mass, drag and orientation.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Physical characteristics of a vehicle hull.
///
/// # Example RON
///
/// ```ron
/// HullData(
///     mass_tons: 30.0,
///     drag_coefficient: 0.5,
///     forward: (0.0, 0.0, 1.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullData {
    /// Vehicle weight in metric tons.
    #[serde(default = "default_mass_tons")]
    pub mass_tons: f64,

    /// Quadratic drag coefficient (N per (m/s)²).
    #[serde(default = "default_drag_coefficient")]
    pub drag_coefficient: f64,

    /// Longitudinal axis. Positive thrust points along it.
    #[serde(default = "default_forward")]
    pub forward: DVec3,
}

const fn default_mass_tons() -> f64 {
    100.0
}

const fn default_drag_coefficient() -> f64 {
    0.5
}

const fn default_forward() -> DVec3 {
    DVec3::Z
}

impl Default for HullData {
    fn default() -> Self {
        Self {
            mass_tons: default_mass_tons(),
            drag_coefficient: default_drag_coefficient(),
            forward: default_forward(),
        }
    }
}

impl HullData {
    /// Mass in kilograms.
    #[must_use]
    pub fn mass_kg(&self) -> f64 {
        crate::math::tons_to_kg(self.mass_tons)
    }

    /// Check the hull for inconsistent values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.mass_tons.is_finite() && self.mass_tons > 0.0) {
            errors.push(format!("Hull mass must be positive, got {}", self.mass_tons));
        }
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient >= 0.0) {
            errors.push(format!(
                "Hull drag coefficient must be non-negative, got {}",
                self.drag_coefficient
            ));
        }
        if !self.forward.is_finite() || self.forward.length_squared() == 0.0 {
            errors.push("Hull forward axis must be a non-zero vector".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(HullData::default().validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let hull = HullData {
            mass_tons: 0.0,
            drag_coefficient: -1.0,
            forward: DVec3::ZERO,
        };
        assert_eq!(hull.validate().len(), 3);
    }

    #[test]
    fn test_parse_with_defaults() {
        let hull: HullData = ron::from_str("(mass_tons: 30.0)").unwrap();
        assert_eq!(hull.mass_tons, 30.0);
        assert_eq!(hull.drag_coefficient, 0.5);
        assert_eq!(hull.forward, DVec3::Z);
        assert_eq!(hull.mass_kg(), 30_000.0);
    }
}
