//! Health sink for vehicle subsystems.
//!
//! Every power plant and lift unit owns one. Damage comes in whole points;
//! the fractional part is handled upstream by
//! [`DamageAccumulator`](crate::damage::DamageAccumulator).

use serde::{Deserialize, Serialize};

/// Outcome of a change to a [`Health`] sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthChange {
    /// Points actually removed (or added, for healing).
    pub amount: u32,
    /// True only on the call that took health to zero.
    pub died: bool,
}

/// Integer wound counter, destroyed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    current: u32,
    /// Maximum health points.
    max: u32,
    /// Latch so that death is reported exactly once.
    dead: bool,
}

impl Health {
    /// Create a new health sink at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            dead: max == 0,
        }
    }

    /// Current health points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Check if the sink has been destroyed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Health as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.current) / f64::from(self.max)
        }
    }

    /// Apply damage. Amounts of zero or less are ignored.
    ///
    /// Health saturates at zero and `died` is reported only on the
    /// transition to zero.
    pub fn take_damage(&mut self, amount: i64) -> HealthChange {
        if amount <= 0 || self.dead {
            return HealthChange::default();
        }

        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let actual = amount.min(self.current);
        self.current -= actual;

        HealthChange {
            amount: actual,
            died: self.mark_dead_if_empty(),
        }
    }

    /// Heal up to the maximum. A destroyed sink stays destroyed.
    pub fn heal(&mut self, amount: i64) -> HealthChange {
        if amount <= 0 || self.dead {
            return HealthChange::default();
        }

        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current += actual;

        HealthChange {
            amount: actual,
            died: false,
        }
    }

    /// Set health directly, clamped to `[0, max]`.
    ///
    /// Setting zero counts as the single death of this sink.
    pub fn set_health(&mut self, value: i64) -> HealthChange {
        if self.dead {
            return HealthChange::default();
        }

        let clamped = value.clamp(0, i64::from(self.max));
        let new_value = u32::try_from(clamped).unwrap_or(0);
        let amount = self.current.abs_diff(new_value);
        self.current = new_value;

        HealthChange {
            amount,
            died: self.mark_dead_if_empty(),
        }
    }

    fn mark_dead_if_empty(&mut self) -> bool {
        if self.current == 0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }
}
