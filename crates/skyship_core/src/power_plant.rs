//! Power plants: output, thrust request, allocation and wear.
//!
//! A plant turns its burn rate into a power budget, works out how much of
//! that budget thrust needs to reach the commanded speed, arbitrates with
//! the lift unit and converts the thrust share into a signed force along
//! the hull's forward axis. The hull applies the summed force.
//!
//! Per-tick order (see [`PowerPlant::update`]):
//! 1. model pre-update (heat)
//! 2. power output
//! 3. thrust request
//! 4. allocation against the lift unit's *current* request
//! 5. force
//!
//! Damage is applied separately by [`PowerPlant::apply_damage`] once every
//! subsystem has moved.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::allocation::{allocate, Allocation, AllocationRequest};
use crate::components::{HeatState, PriorityMode, Subsystem, ThrustState};
use crate::damage::DamageAccumulator;
use crate::data::PowerPlantData;
use crate::events::{PowerPlantTelemetry, VehicleEvent};
use crate::health::Health;
use crate::lift::LiftUnit;
use crate::math::{changed, knots_to_mps, mps_to_knots, signum_with_band, tons_to_kg};
use crate::thermal::ThermalModel;

/// Maximum burn rate (percent).
pub const MAX_BURN_RATE: f64 = 300.0;

/// Velocity error below which the plant only compensates drag (m/s).
pub const SPEED_TOLERANCE_MPS: f64 = 0.1;

/// Proportional gain from velocity error to desired acceleration (1/s).
pub const ACCELERATION_GAIN: f64 = 2.0;

// ============================================================================
// Capability interface
// ============================================================================

/// Per-tick behaviour that differs between plant variants.
pub trait PowerModel {
    /// Advance internal state before output is computed.
    ///
    /// Returns whole damage points caused by the model itself, on top of
    /// ordinary wear.
    fn pre_update(&mut self, burn_rate_percent: f64, dt: f64) -> u32;

    /// Output after model-specific penalties.
    fn compute_output(&self, base_output: f64) -> f64;

    /// Heat state, for models that have one.
    fn heat(&self) -> Option<HeatState> {
        None
    }
}

/// Plain plant: output is exactly the base output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandardPower;

impl PowerModel for StandardPower {
    fn pre_update(&mut self, _burn_rate_percent: f64, _dt: f64) -> u32 {
        0
    }

    fn compute_output(&self, base_output: f64) -> f64 {
        base_output
    }
}

/// Plant variant, chosen at construction from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PowerModelKind {
    /// No heat model.
    Standard(StandardPower),
    /// Jet engine with a heat accumulator.
    Thermal(ThermalModel),
}

impl PowerModel for PowerModelKind {
    fn pre_update(&mut self, burn_rate_percent: f64, dt: f64) -> u32 {
        match self {
            Self::Standard(model) => model.pre_update(burn_rate_percent, dt),
            Self::Thermal(model) => model.pre_update(burn_rate_percent, dt),
        }
    }

    fn compute_output(&self, base_output: f64) -> f64 {
        match self {
            Self::Standard(model) => model.compute_output(base_output),
            Self::Thermal(model) => model.compute_output(base_output),
        }
    }

    fn heat(&self) -> Option<HeatState> {
        match self {
            Self::Standard(model) => model.heat(),
            Self::Thermal(model) => model.heat(),
        }
    }
}

// ============================================================================
// Power Plant
// ============================================================================

/// Vehicle quantities a plant reads from the hull each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleFrame {
    /// Vehicle mass (t).
    pub mass_tons: f64,
    /// Hull drag coefficient.
    pub drag_coefficient: f64,
    /// Velocity projected onto the forward axis (m/s).
    pub forward_speed_mps: f64,
}

/// A power source feeding thrust and, optionally, the lift unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlant {
    name: String,
    max_power_per_second: f64,
    force_per_unit_power: f64,
    power_per_ton_per_meter_per_second: f64,
    usage_damage_per_second: f64,
    model: PowerModelKind,

    burn_rate_percent: f64,
    power_reserved_percent: f64,
    knots_ahead: f64,
    knots_astern: f64,
    priority_mode: PriorityMode,

    current_power_output: f64,
    reserved_power: f64,
    thrust: ThrustState,
    allocated_lift_power: f64,
    damage_per_second: f64,
    /// Values last reported through change events.
    notified_output: f64,
    notified_force: f64,

    wear: DamageAccumulator,
    /// Damage from the model, collected in `update` and applied with wear.
    pending_model_damage: u32,
    health: Option<Health>,
    active: bool,
    enabled: bool,
    /// Set once a missing collaborator has been reported.
    warned: bool,
}

impl PowerPlant {
    /// Build a plant from data. Thermal data selects the jet engine model.
    #[must_use]
    pub fn new(data: &PowerPlantData) -> Self {
        let model = match &data.thermal {
            Some(thermal) => PowerModelKind::Thermal(ThermalModel::new(thermal)),
            None => PowerModelKind::Standard(StandardPower),
        };

        let mut plant = Self {
            name: data.name.clone(),
            max_power_per_second: data.max_power_per_second.max(0.0),
            force_per_unit_power: data.force_per_unit_power,
            power_per_ton_per_meter_per_second: data.power_per_ton_per_meter_per_second,
            usage_damage_per_second: data.usage_damage_per_second.max(0.0),
            model,
            burn_rate_percent: data.burn_rate_percent.clamp(0.0, MAX_BURN_RATE),
            power_reserved_percent: data.power_reserved_percent.clamp(0.0, 100.0),
            knots_ahead: 0.0,
            knots_astern: 0.0,
            priority_mode: data.priority_mode,
            current_power_output: 0.0,
            reserved_power: 0.0,
            thrust: ThrustState::default(),
            allocated_lift_power: 0.0,
            damage_per_second: 0.0,
            notified_output: 0.0,
            notified_force: 0.0,
            wear: DamageAccumulator::new(),
            pending_model_damage: 0,
            health: Some(Health::new(data.max_health)),
            active: true,
            enabled: true,
            warned: false,
        };
        plant.compute_power_output();
        plant.notified_output = plant.current_power_output;
        plant
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Set the throttle, clamped to [0, 300], and recompute output.
    pub fn set_burn_rate(&mut self, percent: f64) {
        let percent = if percent.is_finite() { percent } else { 0.0 };
        self.burn_rate_percent = percent.clamp(0.0, MAX_BURN_RATE);
        self.compute_power_output();
        debug!(plant = %self.name, burn = self.burn_rate_percent, "Burn rate set");
    }

    /// Hold back part of the output for other systems, clamped to [0, 100].
    pub fn set_power_reservation(&mut self, percent: f64) {
        let percent = if percent.is_finite() { percent } else { 0.0 };
        self.power_reserved_percent = percent.clamp(0.0, 100.0);
        self.compute_power_output();
    }

    /// Command a forward speed. Clears any astern command.
    pub fn set_knots_ahead(&mut self, knots: f64) {
        self.knots_ahead = knots.max(0.0);
        self.knots_astern = 0.0;
    }

    /// Command a reverse speed. Clears any ahead command.
    pub fn set_knots_astern(&mut self, knots: f64) {
        self.knots_astern = knots.max(0.0);
        self.knots_ahead = 0.0;
    }

    /// Zero both speed commands.
    pub fn all_stop(&mut self) {
        self.knots_ahead = 0.0;
        self.knots_astern = 0.0;
    }

    /// Change the arbitration policy.
    pub fn set_priority_mode(&mut self, mode: PriorityMode) {
        self.priority_mode = mode;
    }

    /// Include or exclude this plant from the hull's thrust sum.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drop the burn rate to cool a thermal plant down.
    ///
    /// Returns `false` if the plant has no heat model.
    pub fn emergency_heat_dump(&mut self) -> bool {
        if !matches!(self.model, PowerModelKind::Thermal(_)) {
            return false;
        }
        let burn = ThermalModel::heat_dump_burn_rate(self.burn_rate_percent);
        info!(plant = %self.name, from = self.burn_rate_percent, to = burn, "Emergency heat dump");
        self.set_burn_rate(burn);
        true
    }

    /// Detach the health sink. The plant produces nothing until reattached.
    pub fn detach_health(&mut self) -> Option<Health> {
        self.health.take()
    }

    /// Attach a health sink.
    pub fn attach_health(&mut self, health: Health) {
        self.health = Some(health);
        self.warned = false;
    }

    // ------------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------------

    /// Plant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output available for allocation this tick.
    #[must_use]
    pub const fn current_power_output(&self) -> f64 {
        self.current_power_output
    }

    /// Output held back for other systems.
    #[must_use]
    pub const fn reserved_power(&self) -> f64 {
        self.reserved_power
    }

    /// Current throttle.
    #[must_use]
    pub const fn burn_rate_percent(&self) -> f64 {
        self.burn_rate_percent
    }

    /// Current reservation.
    #[must_use]
    pub const fn power_reserved_percent(&self) -> f64 {
        self.power_reserved_percent
    }

    /// Commanded forward speed (kt).
    #[must_use]
    pub const fn knots_ahead(&self) -> f64 {
        self.knots_ahead
    }

    /// Commanded reverse speed (kt).
    #[must_use]
    pub const fn knots_astern(&self) -> f64 {
        self.knots_astern
    }

    /// Current arbitration policy.
    #[must_use]
    pub const fn priority_mode(&self) -> PriorityMode {
        self.priority_mode
    }

    /// Thrust side of the last tick.
    #[must_use]
    pub const fn thrust(&self) -> &ThrustState {
        &self.thrust
    }

    /// Power granted to thrust in the last tick.
    #[must_use]
    pub const fn allocated_thrust_power(&self) -> f64 {
        self.thrust.allocated_thrust_power
    }

    /// Signed force of the last tick (N).
    #[must_use]
    pub const fn actual_force_newtons(&self) -> f64 {
        self.thrust.actual_force_newtons
    }

    /// Power granted to the lift unit in the last tick.
    #[must_use]
    pub const fn allocated_lift_power(&self) -> f64 {
        self.allocated_lift_power
    }

    /// Wear damage per second at the current burn.
    #[must_use]
    pub const fn damage_per_second(&self) -> f64 {
        self.damage_per_second
    }

    /// Heat state of thermal plants.
    #[must_use]
    pub fn heat(&self) -> Option<HeatState> {
        self.model.heat()
    }

    /// Whether a thermal plant is above its safe temperature.
    #[must_use]
    pub fn is_overheating(&self) -> bool {
        self.heat().is_some_and(|h| h.is_overheating())
    }

    /// Whether this plant has a heat model.
    #[must_use]
    pub const fn is_thermal(&self) -> bool {
        matches!(self.model, PowerModelKind::Thermal(_))
    }

    /// Health sink, if attached.
    #[must_use]
    pub const fn health(&self) -> Option<&Health> {
        self.health.as_ref()
    }

    /// Not yet destroyed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Included in the hull's thrust sum.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Active and enabled.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        self.active && self.enabled
    }

    /// Snapshot for telemetry consumers.
    #[must_use]
    pub fn telemetry(&self) -> PowerPlantTelemetry {
        PowerPlantTelemetry {
            name: self.name.clone(),
            active: self.active,
            enabled: self.enabled,
            burn_rate_percent: self.burn_rate_percent,
            current_power_output: self.current_power_output,
            reserved_power: self.reserved_power,
            thrust: self.thrust,
            allocated_lift_power: self.allocated_lift_power,
            damage_per_second: self.damage_per_second,
            health: self.health.map_or(0, |h| h.current()),
            max_health: self.health.map_or(0, |h| h.max()),
            heat: self.heat(),
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Run steps 1-5 of the plant's tick.
    ///
    /// `frame` is `None` when the plant is detached from a hull; `lift` is
    /// the lift unit this plant arbitrates with, if any. The lift allocation
    /// is written back into the unit before returning.
    pub fn update(
        &mut self,
        index: usize,
        frame: Option<&VehicleFrame>,
        mut lift: Option<&mut LiftUnit>,
        dt: f64,
        events: &mut Vec<VehicleEvent>,
    ) {
        let frame = match (frame, self.health.is_some(), self.active) {
            (Some(frame), true, true) => {
                self.warned = false;
                frame
            }
            (frame, has_health, active) => {
                if active && !self.warned {
                    warn!(
                        plant = %self.name,
                        has_hull = frame.is_some(),
                        has_health,
                        "Power plant is missing a collaborator; producing no power"
                    );
                    self.warned = true;
                }
                self.shut_down(lift.as_deref_mut());
                self.push_change_events(index, events);
                return;
            }
        };

        // 1. Model pre-update
        let was_overheating = self.is_overheating();
        self.pending_model_damage = self
            .pending_model_damage
            .saturating_add(self.model.pre_update(self.burn_rate_percent, dt));
        let overheating = self.is_overheating();
        if overheating != was_overheating {
            if overheating {
                warn!(plant = %self.name, "Overheating");
                events.push(VehicleEvent::OverheatStarted { plant: index });
            } else {
                info!(plant = %self.name, "Temperature back to safe");
                events.push(VehicleEvent::OverheatEnded { plant: index });
            }
        }

        // 2. Output
        self.compute_power_output();

        // 3. Thrust request
        let (requested_thrust, direction) = self.compute_thrust_request(frame);
        self.thrust.requested_thrust_power = requested_thrust;
        self.thrust.current_speed_knots = mps_to_knots(frame.forward_speed_mps);

        // 4. Allocation against the lift unit's current request
        let (requested_lift, hover) = lift
            .as_deref()
            .map_or((0.0, 0.0), |l| (l.power_request(), l.minimum_hover_power()));

        let Allocation { thrust, lift: lift_share } = allocate(&AllocationRequest {
            requested_thrust,
            requested_lift,
            output: self.current_power_output,
            minimum_hover_power: hover,
            mode: self.priority_mode,
        });

        self.thrust.allocated_thrust_power = thrust;
        self.allocated_lift_power = lift_share;
        if let Some(lift) = lift {
            lift.set_power_allocation(lift_share);
        }

        // 5. Force
        self.thrust.actual_force_newtons = thrust * self.force_per_unit_power * direction;

        self.push_change_events(index, events);
    }

    /// Step 6: apply wear and model damage to the health sink.
    pub fn apply_damage(&mut self, index: usize, dt: f64, events: &mut Vec<VehicleEvent>) {
        if !self.active {
            return;
        }
        let Some(health) = self.health.as_mut() else {
            return;
        };

        let points = self
            .wear
            .accumulate(self.damage_per_second, dt)
            .saturating_add(std::mem::take(&mut self.pending_model_damage));
        if points == 0 {
            return;
        }

        let change = health.take_damage(i64::from(points));
        if change.amount > 0 {
            events.push(VehicleEvent::Damaged {
                subsystem: Subsystem::PowerPlant(index),
                amount: change.amount,
            });
        }
        if change.died {
            warn!(plant = %self.name, "Power plant destroyed");
            self.active = false;
            self.current_power_output = 0.0;
            self.reserved_power = 0.0;
            self.damage_per_second = 0.0;
            self.thrust.allocated_thrust_power = 0.0;
            self.thrust.actual_force_newtons = 0.0;
            events.push(VehicleEvent::PowerPlantFailure { plant: index });
        }
    }

    /// Output = max × burn/100 × (1 − reserved/100), after model penalties.
    fn compute_power_output(&mut self) {
        if !self.active {
            self.current_power_output = 0.0;
            self.reserved_power = 0.0;
            self.damage_per_second = 0.0;
            return;
        }

        let burn = self.burn_rate_percent / 100.0;
        let produced = self.model.compute_output(self.max_power_per_second * burn);
        self.reserved_power = produced * (self.power_reserved_percent / 100.0);
        self.current_power_output = (produced - self.reserved_power).max(0.0);
        self.damage_per_second = self.usage_damage_per_second * burn;
    }

    /// Power thrust needs this tick, and the sign of the resulting force.
    fn compute_thrust_request(&self, frame: &VehicleFrame) -> (f64, f64) {
        let desired = if self.knots_ahead > 0.0 {
            knots_to_mps(self.knots_ahead)
        } else if self.knots_astern > 0.0 {
            -knots_to_mps(self.knots_astern)
        } else {
            0.0
        };
        let current = frame.forward_speed_mps;
        let error = desired - current;

        if self.force_per_unit_power <= 0.0 {
            return (0.0, 0.0);
        }

        if error.abs() < SPEED_TOLERANCE_MPS {
            // Hold speed: push along current motion against drag
            let request = frame.drag_coefficient * current.abs() * frame.mass_tons * 100.0
                / self.force_per_unit_power;
            return (request, signum_with_band(current, 0.0));
        }

        let limit = (self.power_per_ton_per_meter_per_second * frame.mass_tons).abs();
        let acceleration = (error * ACCELERATION_GAIN).clamp(-limit, limit);
        let request = (tons_to_kg(frame.mass_tons) * acceleration).abs() / self.force_per_unit_power;

        let direction = if desired.abs() < SPEED_TOLERANCE_MPS {
            // Brake against current motion
            -signum_with_band(current, 0.0)
        } else {
            signum_with_band(error, 0.0)
        };

        (request, direction)
    }

    fn shut_down(&mut self, lift: Option<&mut LiftUnit>) {
        self.current_power_output = 0.0;
        self.reserved_power = 0.0;
        self.thrust.requested_thrust_power = 0.0;
        self.thrust.allocated_thrust_power = 0.0;
        self.thrust.actual_force_newtons = 0.0;
        self.allocated_lift_power = 0.0;
        if let Some(lift) = lift {
            lift.set_power_allocation(0.0);
        }
    }

    /// Report output and force changes since the last report. Mutators
    /// between ticks are picked up here too.
    fn push_change_events(&mut self, index: usize, events: &mut Vec<VehicleEvent>) {
        if changed(self.notified_output, self.current_power_output) {
            self.notified_output = self.current_power_output;
            events.push(VehicleEvent::PowerOutputChanged {
                plant: index,
                value: self.current_power_output,
            });
        }
        if changed(self.notified_force, self.thrust.actual_force_newtons) {
            self.notified_force = self.thrust.actual_force_newtons;
            events.push(VehicleEvent::ThrustOutputChanged {
                plant: index,
                value: self.thrust.actual_force_newtons,
            });
        }
    }
}
