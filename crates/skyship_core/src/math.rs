//! Unit conversions and small vector helpers.
//!
//! The simulation works in SI units internally (metres, seconds, kilograms,
//! Newtons). Knots only appear at the command/telemetry boundary and tons
//! only in vehicle data.

use glam::DVec3;

/// Metres per second in one knot.
pub const KNOTS_TO_MPS: f64 = 0.514_444;

/// Knots in one metre per second.
pub const MPS_TO_KNOTS: f64 = 1.943_84;

/// Kilograms per metric ton.
pub const KG_PER_TON: f64 = 1000.0;

/// Default gravitational acceleration used by the physics body (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Descent rate of an unpowered-but-engaged lift unit (m/s).
///
/// Distinct from [`STANDARD_GRAVITY`]: this is a velocity cap for
/// controlled descent, not an acceleration.
pub const GRAVITY_FALL_RATE: f64 = 9.82;

/// World up axis. Lift only ever moves the vehicle along this axis.
pub const UP: DVec3 = DVec3::Y;

/// Tolerance used when comparing telemetry values for change notifications.
pub const CHANGE_EPSILON: f64 = 1e-9;

/// Convert knots to metres per second.
#[must_use]
pub fn knots_to_mps(knots: f64) -> f64 {
    knots * KNOTS_TO_MPS
}

/// Convert metres per second to knots.
#[must_use]
pub fn mps_to_knots(mps: f64) -> f64 {
    mps * MPS_TO_KNOTS
}

/// Convert metric tons to kilograms.
#[must_use]
pub fn tons_to_kg(tons: f64) -> f64 {
    tons * KG_PER_TON
}

/// Clamp a value to `[0, 1]`.
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Signed magnitude of `v` along `axis`.
///
/// `axis` does not need to be normalized; a zero axis yields zero.
#[must_use]
pub fn project_onto_axis(v: DVec3, axis: DVec3) -> f64 {
    v.dot(axis.normalize_or_zero())
}

/// Sign of `value` with a dead band: values within `band` of zero map to 0.
#[must_use]
pub fn signum_with_band(value: f64, band: f64) -> f64 {
    if value > band {
        1.0
    } else if value < -band {
        -1.0
    } else {
        0.0
    }
}

/// Whether two telemetry values differ enough to notify listeners.
#[must_use]
pub fn changed(previous: f64, current: f64) -> bool {
    (previous - current).abs() > CHANGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knot_conversion_round_trip() {
        let mps = knots_to_mps(10.0);
        assert!((mps - 5.144_44).abs() < 1e-9);
        assert!((mps_to_knots(mps) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_project_onto_axis() {
        let v = DVec3::new(3.0, 4.0, -5.0);
        assert!((project_onto_axis(v, DVec3::Z) + 5.0).abs() < 1e-12);
        // Axis length does not matter
        assert!((project_onto_axis(v, DVec3::new(0.0, 0.0, 10.0)) + 5.0).abs() < 1e-12);
        assert_eq!(project_onto_axis(v, DVec3::ZERO), 0.0);
    }

    #[test]
    fn test_signum_with_band() {
        assert_eq!(signum_with_band(0.05, 0.1), 0.0);
        assert_eq!(signum_with_band(-0.05, 0.1), 0.0);
        assert_eq!(signum_with_band(0.2, 0.1), 1.0);
        assert_eq!(signum_with_band(-3.0, 0.1), -1.0);
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-1.0), 0.0);
        assert_eq!(clamp01(0.4), 0.4);
        assert_eq!(clamp01(7.0), 1.0);
    }
}
