//! Physical body contract and the in-crate point-mass implementation.
//!
//! Power plants and the hull push forces into a [`RigidBody`]; the lift
//! unit drives the vertical axis kinematically through
//! [`RigidBody::move_position`] and the gravity flag.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::ForceMode;
use crate::math::UP;

/// The narrow physics surface the flight model needs.
pub trait RigidBody {
    /// Mass in kilograms.
    fn mass(&self) -> f64;

    /// World position (m).
    fn position(&self) -> DVec3;

    /// Linear velocity (m/s).
    fn linear_velocity(&self) -> DVec3;

    /// Overwrite the linear velocity.
    fn set_linear_velocity(&mut self, velocity: DVec3);

    /// Apply a force. Continuous forces accumulate until the next
    /// [`integrate`](Self::integrate); impulses act immediately.
    fn add_force(&mut self, force: DVec3, mode: ForceMode);

    /// Request the body to be at `target` after the next integration step.
    fn move_position(&mut self, target: DVec3);

    /// Whether gravity acts on the body.
    fn use_gravity(&self) -> bool;

    /// Enable or disable gravity.
    fn set_use_gravity(&mut self, enabled: bool);

    /// Advance the body by `dt` seconds under `gravity` (m/s², magnitude).
    fn integrate(&mut self, dt: f64, gravity: f64);
}

/// Point mass with semi-implicit Euler integration.
///
/// A pending [`move_position`](RigidBody::move_position) target replaces the
/// position before the velocity step, so vertical kinematic motion driven by
/// the lift unit is exact while horizontal motion stays force-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointMassBody {
    mass_kg: f64,
    position: DVec3,
    velocity: DVec3,
    use_gravity: bool,
    /// Sum of continuous forces applied since the last integration.
    pending_force: DVec3,
    /// Kinematic target set by `move_position`.
    kinematic_target: Option<DVec3>,
    /// Stop downward motion at y = 0.
    ground_plane: bool,
}

impl PointMassBody {
    /// Create a body at rest with gravity enabled.
    #[must_use]
    pub fn new(mass_kg: f64, position: DVec3) -> Self {
        Self {
            mass_kg: mass_kg.max(f64::EPSILON),
            position,
            velocity: DVec3::ZERO,
            use_gravity: true,
            pending_force: DVec3::ZERO,
            kinematic_target: None,
            ground_plane: false,
        }
    }

    /// Enable a ground plane at y = 0.
    #[must_use]
    pub const fn with_ground_plane(mut self, enabled: bool) -> Self {
        self.ground_plane = enabled;
        self
    }

    /// Forces accumulated for the next integration step.
    #[must_use]
    pub const fn pending_force(&self) -> DVec3 {
        self.pending_force
    }

    /// Whether the body rests on the ground plane.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.ground_plane && self.position.y <= 0.0
    }
}

impl RigidBody for PointMassBody {
    fn mass(&self) -> f64 {
        self.mass_kg
    }

    fn position(&self) -> DVec3 {
        self.position
    }

    fn linear_velocity(&self) -> DVec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: DVec3, mode: ForceMode) {
        if !force.is_finite() {
            return;
        }
        match mode {
            ForceMode::Force => self.pending_force += force,
            ForceMode::Impulse => self.velocity += force / self.mass_kg,
        }
    }

    fn move_position(&mut self, target: DVec3) {
        if target.is_finite() {
            self.kinematic_target = Some(target);
        }
    }

    fn use_gravity(&self) -> bool {
        self.use_gravity
    }

    fn set_use_gravity(&mut self, enabled: bool) {
        self.use_gravity = enabled;
    }

    fn integrate(&mut self, dt: f64, gravity: f64) {
        if let Some(target) = self.kinematic_target.take() {
            self.position = target;
        }

        let mut acceleration = self.pending_force / self.mass_kg;
        if self.use_gravity {
            acceleration -= UP * gravity;
        }
        self.pending_force = DVec3::ZERO;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        if self.ground_plane && self.position.y < 0.0 {
            self.position.y = 0.0;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_fall_under_gravity() {
        let mut body = PointMassBody::new(1000.0, DVec3::new(0.0, 100.0, 0.0));
        body.integrate(1.0, 9.81);
        assert!((body.linear_velocity().y + 9.81).abs() < 1e-12);
        assert!((body.position().y - (100.0 - 9.81)).abs() < 1e-12);
    }

    #[test]
    fn test_force_accumulates_until_integration() {
        let mut body = PointMassBody::new(2.0, DVec3::ZERO);
        body.set_use_gravity(false);
        body.add_force(DVec3::X * 4.0, ForceMode::Force);
        body.add_force(DVec3::X * 2.0, ForceMode::Force);
        assert_eq!(body.linear_velocity(), DVec3::ZERO);

        body.integrate(0.5, 9.81);
        // a = 6 / 2 = 3, v = 1.5, x = 0.75
        assert!((body.linear_velocity().x - 1.5).abs() < 1e-12);
        assert!((body.position().x - 0.75).abs() < 1e-12);
        assert_eq!(body.pending_force(), DVec3::ZERO);
    }

    #[test]
    fn test_impulse_is_immediate() {
        let mut body = PointMassBody::new(10.0, DVec3::ZERO);
        body.add_force(DVec3::Z * 50.0, ForceMode::Impulse);
        assert!((body.linear_velocity().z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_kinematic_target_is_exact_without_gravity() {
        let mut body = PointMassBody::new(30_000.0, DVec3::new(0.0, 50.0, 0.0));
        body.set_use_gravity(false);
        for _ in 0..100 {
            let next = body.position() + UP * 0.5 * 0.02;
            body.move_position(next);
            body.integrate(0.02, 9.81);
        }
        assert!((body.position().y - 51.0).abs() < 1e-9);
        assert_eq!(body.linear_velocity().y, 0.0);
    }

    #[test]
    fn test_ground_plane_stops_descent() {
        let mut body = PointMassBody::new(100.0, DVec3::new(0.0, 0.1, 0.0)).with_ground_plane(true);
        for _ in 0..10 {
            body.integrate(0.1, 9.81);
        }
        assert_eq!(body.position().y, 0.0);
        assert_eq!(body.linear_velocity().y, 0.0);
        assert!(body.is_grounded());
    }

    #[test]
    fn test_non_finite_force_ignored() {
        let mut body = PointMassBody::new(1.0, DVec3::ZERO);
        body.add_force(DVec3::new(f64::NAN, 0.0, 0.0), ForceMode::Force);
        assert_eq!(body.pending_force(), DVec3::ZERO);
    }
}
