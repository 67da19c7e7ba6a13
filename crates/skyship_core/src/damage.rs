//! Fractional damage carry.
//!
//! Subsystems take damage at a continuous rate, but a [`Health`](crate::health::Health)
//! sink only accepts whole points. Each damage source keeps its own carry so
//! that slow rates still add up over many ticks.

use serde::{Deserialize, Serialize};

/// Carry of not-yet-applied fractional damage for one damage source.
///
/// Invariant: `carry` is in `[0, 1)` after every [`accumulate`](Self::accumulate).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageAccumulator {
    carry: f64,
}

impl DamageAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { carry: 0.0 }
    }

    /// Fractional damage waiting to be applied.
    #[must_use]
    pub const fn carry(&self) -> f64 {
        self.carry
    }

    /// Add `rate_per_second × dt` to the carry and return the whole points
    /// ready to be applied. Negative rates and durations add nothing.
    pub fn accumulate(&mut self, rate_per_second: f64, dt: f64) -> u32 {
        let added = rate_per_second.max(0.0) * dt.max(0.0);
        if !added.is_finite() {
            return 0;
        }

        self.carry += added;
        let whole = self.carry.floor();
        self.carry -= whole;

        // Guard against `carry` landing on 1.0 through rounding
        if self.carry >= 1.0 {
            self.carry = 0.0;
            return whole as u32 + 1;
        }

        whole as u32
    }

    /// Drop any pending fractional damage.
    pub fn reset(&mut self) {
        self.carry = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fractional_damage_is_carried() {
        let mut acc = DamageAccumulator::new();
        // 1 damage/s at 50 Hz: nothing for 49 ticks, then one point
        let mut total = 0;
        for _ in 0..49 {
            total += acc.accumulate(1.0, 0.02);
        }
        assert_eq!(total, 0);
        total += acc.accumulate(1.0, 0.02);
        // Float summation may land just under 1.0; one more tick settles it
        total += acc.accumulate(1.0, 0.02);
        assert_eq!(total, 1);
    }

    #[test]
    fn test_large_rate_applies_whole_part() {
        let mut acc = DamageAccumulator::new();
        assert_eq!(acc.accumulate(250.0, 0.01), 2);
        assert!((acc.carry() - 0.5).abs() < 1e-9);
        assert_eq!(acc.accumulate(50.0, 0.01), 1);
        assert!(acc.carry() < 1e-9);
    }

    #[test]
    fn test_negative_rate_adds_nothing() {
        let mut acc = DamageAccumulator::new();
        assert_eq!(acc.accumulate(-5.0, 1.0), 0);
        assert_eq!(acc.carry(), 0.0);
    }

    #[test]
    fn test_long_run_total_matches_rate() {
        let mut acc = DamageAccumulator::new();
        let total: u32 = (0..1000).map(|_| acc.accumulate(0.75, 0.1)).sum();
        // 0.75 × 100 s = 75 points, give or take the final carry
        assert!((74..=75).contains(&total), "total was {total}");
        assert!(acc.carry() >= 0.0 && acc.carry() < 1.0);
    }

    proptest! {
        #[test]
        fn prop_carry_stays_fractional_and_total_tracks_rate(
            steps in prop::collection::vec((0.0f64..50.0, 0.0f64..0.5), 1..200),
        ) {
            let mut acc = DamageAccumulator::new();
            let mut applied = 0u64;
            let mut expected = 0.0;
            for (rate, dt) in steps {
                applied += u64::from(acc.accumulate(rate, dt));
                expected += rate * dt;
                prop_assert!(acc.carry() >= 0.0 && acc.carry() < 1.0);
            }
            prop_assert!((applied as f64 - expected.floor()).abs() <= 1.0);
        }
    }
}
