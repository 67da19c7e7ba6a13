//! Anti-gravity field model.
//!
//! Wraps the base lift computation with an efficiency multiplier on power
//! and a stability jitter on the resulting force. Field strength is the lift
//! force as a percentage of vehicle weight; above the safe limit the device
//! takes overload damage on top of wear.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::FieldState;
use crate::damage::DamageAccumulator;
use crate::data::FieldData;
use crate::lift::LiftModel;

/// Upper bound of field efficiency after boosts.
pub const MAX_FIELD_EFFICIENCY: f64 = 2.0;

/// Lower bound of field efficiency after stabilizing.
pub const MIN_FIELD_EFFICIENCY: f64 = 0.5;

/// Lower bound of field stability after boosts.
pub const MIN_BOOSTED_STABILITY: f64 = 0.5;

/// Maximum relative jitter at zero stability.
pub const JITTER_AMPLITUDE: f64 = 0.1;

/// Field state and multipliers of an anti-gravity device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLift {
    field_efficiency: f64,
    field_stability: f64,
    altitude_calibration: f64,
    current_altitude: f64,
    field: FieldState,
    /// Carry for overload damage, separate from wear.
    overload_damage: DamageAccumulator,
}

impl FieldLift {
    /// Build from data.
    #[must_use]
    pub fn new(data: &FieldData) -> Self {
        Self {
            field_efficiency: data.field_efficiency.clamp(f64::EPSILON, MAX_FIELD_EFFICIENCY),
            field_stability: data.field_stability.clamp(0.0, 1.0),
            altitude_calibration: data.altitude_calibration,
            current_altitude: 0.0,
            field: FieldState {
                field_strength_percent: 0.0,
                max_safe_field_strength: data.max_safe_field_strength,
            },
            overload_damage: DamageAccumulator::new(),
        }
    }

    /// Power multiplier.
    #[must_use]
    pub const fn efficiency(&self) -> f64 {
        self.field_efficiency
    }

    /// Stability in `[0, 1]`.
    #[must_use]
    pub const fn stability(&self) -> f64 {
        self.field_stability
    }

    /// Body height plus calibration, as of the last tick (m).
    #[must_use]
    pub const fn current_altitude(&self) -> f64 {
        self.current_altitude
    }

    /// Current field state.
    #[must_use]
    pub const fn state(&self) -> FieldState {
        self.field
    }

    /// Trade stability for efficiency.
    pub fn emergency_field_boost(&mut self) {
        self.field_efficiency = (self.field_efficiency * 1.5).min(MAX_FIELD_EFFICIENCY);
        self.field_stability = (self.field_stability * 0.7).max(MIN_BOOSTED_STABILITY);
    }

    /// Trade efficiency for stability.
    pub fn stabilize_field(&mut self) {
        self.field_efficiency = (self.field_efficiency * 0.8).max(MIN_FIELD_EFFICIENCY);
        self.field_stability = (self.field_stability * 1.2).min(1.0);
    }

    /// Overload damage per second for a unit with the given wear rate.
    #[must_use]
    pub fn overload_damage_per_second(&self, usage_damage_per_second: f64) -> f64 {
        self.field.excess_percent() / 100.0 * usage_damage_per_second
    }

    /// Multiplicative lift noise. Exactly 1 for a stable field, which then
    /// draws nothing from `rng`.
    pub fn jitter<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.field_stability >= 1.0 {
            return 1.0;
        }
        let noise: f64 = rng.gen_range(-1.0..=1.0);
        1.0 + noise * (1.0 - self.field_stability) * JITTER_AMPLITUDE
    }
}

impl LiftModel for FieldLift {
    fn efficiency(&self) -> f64 {
        self.field_efficiency
    }

    fn compute_lift<R: Rng>(&mut self, lift_force: f64, weight_newtons: f64, rng: &mut R) -> f64 {
        if lift_force <= 0.0 || weight_newtons <= 0.0 {
            self.field.field_strength_percent = 0.0;
            return lift_force.max(0.0);
        }

        let lift = lift_force * self.jitter(rng);
        self.field.field_strength_percent = lift / weight_newtons * 100.0;
        lift
    }

    fn stress_damage(&mut self, usage_damage_per_second: f64, dt: f64) -> u32 {
        let rate = self.overload_damage_per_second(usage_damage_per_second);
        self.overload_damage.accumulate(rate, dt)
    }

    fn observe_position(&mut self, position: DVec3) {
        self.current_altitude = position.y + self.altitude_calibration;
    }

    fn field(&self) -> Option<FieldState> {
        Some(self.field)
    }

    fn reset(&mut self) {
        self.field.field_strength_percent = 0.0;
    }
}
