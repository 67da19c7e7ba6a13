//! Heat model for jet engines.
//!
//! Heat is updated before power output every tick. Running hot costs output
//! and, above the safe temperature, health:
//!
//! ```text
//! heat += generation × burn/100 × dt − dissipation × (1 + heat / (2 × max_safe)) × dt
//! penalty = clamp01((heat − max_safe) × penalty_per_degree)
//! output  = base × (1 − penalty)
//! ```
//!
//! Dissipation grows with temperature, so a plant held at a constant burn
//! settles at an equilibrium instead of heating without bound.

use serde::{Deserialize, Serialize};

use crate::components::HeatState;
use crate::damage::DamageAccumulator;
use crate::data::ThermalData;
use crate::math::clamp01;
use crate::power_plant::PowerModel;

/// Burn floor after an emergency heat dump (percent).
pub const HEAT_DUMP_MIN_BURN: f64 = 25.0;

/// Fraction of the current burn kept by an emergency heat dump.
pub const HEAT_DUMP_FACTOR: f64 = 0.3;

/// Heat accumulator of a thermal power plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalModel {
    heat_generation_rate: f64,
    heat_dissipation_rate: f64,
    heat_efficiency_penalty_per_degree: f64,
    overheat_damage_rate: f64,
    heat: HeatState,
    /// Carry for overheat damage, separate from wear.
    overheat_damage: DamageAccumulator,
}

impl ThermalModel {
    /// Build from data.
    #[must_use]
    pub fn new(data: &ThermalData) -> Self {
        Self {
            heat_generation_rate: data.heat_generation_rate,
            heat_dissipation_rate: data.heat_dissipation_rate,
            heat_efficiency_penalty_per_degree: data.heat_efficiency_penalty_per_degree,
            overheat_damage_rate: data.overheat_damage_rate,
            heat: HeatState {
                current_temperature: data.initial_temperature.max(0.0),
                max_safe_temperature: data.max_safe_temperature,
            },
            overheat_damage: DamageAccumulator::new(),
        }
    }

    /// Current heat state.
    #[must_use]
    pub const fn heat_state(&self) -> HeatState {
        self.heat
    }

    /// Fraction of output lost to heat.
    #[must_use]
    pub fn heat_penalty(&self) -> f64 {
        if !self.heat.is_overheating() {
            return 0.0;
        }
        clamp01(self.heat.excess() * self.heat_efficiency_penalty_per_degree)
    }

    /// Overheat damage per second at the current temperature.
    #[must_use]
    pub fn overheat_damage_per_second(&self) -> f64 {
        if !self.heat.is_overheating() || self.heat.max_safe_temperature <= 0.0 {
            return 0.0;
        }
        self.overheat_damage_rate * self.heat.excess() / self.heat.max_safe_temperature
    }

    /// Burn rate after an emergency heat dump from `burn_rate_percent`.
    ///
    /// Heat itself is untouched and decays at the normal rate afterwards.
    #[must_use]
    pub fn heat_dump_burn_rate(burn_rate_percent: f64) -> f64 {
        (burn_rate_percent * HEAT_DUMP_FACTOR).max(HEAT_DUMP_MIN_BURN)
    }

    fn update_heat(&mut self, burn_rate_percent: f64, dt: f64) {
        let heat = self.heat.current_temperature;
        let max_safe = self.heat.max_safe_temperature.max(f64::EPSILON);

        let generated = self.heat_generation_rate * (burn_rate_percent / 100.0) * dt;
        let dissipated = self.heat_dissipation_rate * (1.0 + heat / (2.0 * max_safe)) * dt;

        self.heat.current_temperature = (heat + generated - dissipated).max(0.0);
    }
}

impl PowerModel for ThermalModel {
    fn pre_update(&mut self, burn_rate_percent: f64, dt: f64) -> u32 {
        self.update_heat(burn_rate_percent, dt);
        let rate = self.overheat_damage_per_second();
        self.overheat_damage.accumulate(rate, dt)
    }

    fn compute_output(&self, base_output: f64) -> f64 {
        base_output * (1.0 - self.heat_penalty())
    }

    fn heat(&self) -> Option<HeatState> {
        Some(self.heat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot_model(initial: f64) -> ThermalModel {
        ThermalModel::new(&ThermalData {
            initial_temperature: initial,
            ..ThermalData::default()
        })
    }

    #[test]
    fn test_heat_rises_at_full_burn() {
        let mut model = hot_model(0.0);
        model.pre_update(100.0, 1.0);
        // 10 generated, 5 dissipated at zero heat
        assert!((model.heat_state().current_temperature - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_heat_floored_at_zero() {
        let mut model = hot_model(1.0);
        model.pre_update(0.0, 10.0);
        assert_eq!(model.heat_state().current_temperature, 0.0);
    }

    #[test]
    fn test_dissipation_accelerates_with_heat() {
        let mut cool = hot_model(20.0);
        let mut hot = hot_model(180.0);
        cool.pre_update(0.0, 0.1);
        hot.pre_update(0.0, 0.1);
        let cool_drop = 20.0 - cool.heat_state().current_temperature;
        let hot_drop = 180.0 - hot.heat_state().current_temperature;
        assert!(hot_drop > cool_drop);
    }

    #[test]
    fn test_penalty_only_above_safe_temperature() {
        let model = hot_model(100.0);
        assert_eq!(model.heat_penalty(), 0.0);
        assert_eq!(model.compute_output(100.0), 100.0);

        let model = hot_model(130.0);
        // 30 degrees over at 1% per degree
        assert!((model.heat_penalty() - 0.3).abs() < 1e-12);
        assert!((model.compute_output(100.0) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_clamped_to_full() {
        let model = hot_model(500.0);
        assert_eq!(model.heat_penalty(), 1.0);
        assert_eq!(model.compute_output(80.0), 0.0);
    }

    #[test]
    fn test_overheat_damage_rate() {
        let model = hot_model(150.0);
        // 5 × 50 / 100
        assert!((model.overheat_damage_per_second() - 2.5).abs() < 1e-12);
        assert_eq!(hot_model(90.0).overheat_damage_per_second(), 0.0);
    }

    #[test]
    fn test_overheat_damage_is_carried() {
        let mut model = hot_model(200.0);
        let total: u32 = (0..100).map(|_| model.pre_update(100.0, 0.02)).sum();
        // Roughly 5 damage/s for 2 s
        assert!((8..=10).contains(&total), "total was {total}");
    }

    #[test]
    fn test_heat_dump_burn_rate() {
        assert!((ThermalModel::heat_dump_burn_rate(200.0) - 60.0).abs() < 1e-12);
        assert_eq!(ThermalModel::heat_dump_burn_rate(50.0), 25.0);
        assert_eq!(ThermalModel::heat_dump_burn_rate(10.0), 25.0);
    }
}
