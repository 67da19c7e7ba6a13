//! Lift units: kinematic vertical control from allocated power.
//!
//! Lift is not a force on the body. While powered the unit switches the
//! body's gravity off and moves it along the up axis at a velocity derived
//! from the power ratio, which keeps hover numerically exact:
//!
//! ```text
//! ratio = allocated × efficiency / minimum
//! ratio ≥ 1: v = (allocated × efficiency − minimum) / (mass_tons × power_per_ton)
//! ratio < 1: v = −9.82 × (1 − ratio)
//! ```
//!
//! Without power (or when switched off) the body is handed back to gravity.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::body::RigidBody;
use crate::components::{FieldState, LiftState, Subsystem};
use crate::damage::DamageAccumulator;
use crate::data::LiftUnitData;
use crate::events::{LiftTelemetry, VehicleEvent};
use crate::field::FieldLift;
use crate::health::Health;
use crate::math::{changed, tons_to_kg, GRAVITY_FALL_RATE, UP};
use crate::power_plant::VehicleFrame;

/// Vertical speed below which a powered unit counts as hovering (m/s).
pub const HOVER_TOLERANCE_MPS: f64 = 0.01;

// ============================================================================
// Capability interface
// ============================================================================

/// Per-tick behaviour that differs between lift variants.
pub trait LiftModel {
    /// Multiplier applied to allocated power before the base computation.
    fn efficiency(&self) -> f64 {
        1.0
    }

    /// Shape the base lift force (N) for a vehicle of `weight_newtons`.
    fn compute_lift<R: Rng>(&mut self, lift_force: f64, weight_newtons: f64, rng: &mut R) -> f64;

    /// Whole damage points caused by the model itself, on top of wear.
    fn stress_damage(&mut self, _usage_damage_per_second: f64, _dt: f64) -> u32 {
        0
    }

    /// Record the body position at the start of the tick.
    fn observe_position(&mut self, _position: DVec3) {}

    /// Field state, for models that have one.
    fn field(&self) -> Option<FieldState> {
        None
    }

    /// Clear per-tick state when the unit stops producing lift.
    fn reset(&mut self) {}
}

/// Plain lift unit: the force is exactly weight × power ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandardLift;

impl LiftModel for StandardLift {
    fn compute_lift<R: Rng>(&mut self, lift_force: f64, _weight_newtons: f64, _rng: &mut R) -> f64 {
        lift_force
    }
}

/// Lift variant, chosen at construction from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiftModelKind {
    /// No field model.
    Standard(StandardLift),
    /// Anti-gravity device.
    Field(FieldLift),
}

impl LiftModel for LiftModelKind {
    fn efficiency(&self) -> f64 {
        match self {
            Self::Standard(model) => model.efficiency(),
            Self::Field(model) => model.efficiency(),
        }
    }

    fn compute_lift<R: Rng>(&mut self, lift_force: f64, weight_newtons: f64, rng: &mut R) -> f64 {
        match self {
            Self::Standard(model) => model.compute_lift(lift_force, weight_newtons, rng),
            Self::Field(model) => model.compute_lift(lift_force, weight_newtons, rng),
        }
    }

    fn stress_damage(&mut self, usage_damage_per_second: f64, dt: f64) -> u32 {
        match self {
            Self::Standard(model) => model.stress_damage(usage_damage_per_second, dt),
            Self::Field(model) => model.stress_damage(usage_damage_per_second, dt),
        }
    }

    fn observe_position(&mut self, position: DVec3) {
        match self {
            Self::Standard(model) => model.observe_position(position),
            Self::Field(model) => model.observe_position(position),
        }
    }

    fn field(&self) -> Option<FieldState> {
        match self {
            Self::Standard(model) => model.field(),
            Self::Field(model) => model.field(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Standard(model) => model.reset(),
            Self::Field(model) => model.reset(),
        }
    }
}

// ============================================================================
// Lift Unit
// ============================================================================

/// The vehicle's lift unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftUnit {
    name: String,
    minimum_power_per_second: f64,
    power_per_ton_per_meter_per_second: f64,
    usage_damage_per_second: f64,
    model: LiftModelKind,

    /// Power the unit asks its source plant for.
    power_request: f64,
    state: LiftState,
    current_lift_force: f64,
    damage_per_second: f64,
    /// Values last reported through change events.
    notified_lift_force: f64,
    notified_overload: bool,

    wear: DamageAccumulator,
    health: Option<Health>,
    active: bool,
    /// Gravity was switched off by this unit and must be restored.
    holds_body: bool,
    warned: bool,
}

impl LiftUnit {
    /// Build a lift unit from data. Field data selects the anti-gravity model.
    ///
    /// The initial request is the hover power.
    #[must_use]
    pub fn new(data: &LiftUnitData) -> Self {
        let model = match &data.field {
            Some(field) => LiftModelKind::Field(FieldLift::new(field)),
            None => LiftModelKind::Standard(StandardLift),
        };

        let mut lift = Self {
            name: data.name.clone(),
            minimum_power_per_second: data.minimum_power_per_second.max(f64::EPSILON),
            power_per_ton_per_meter_per_second: data.power_per_ton_per_meter_per_second,
            usage_damage_per_second: data.usage_damage_per_second.max(0.0),
            model,
            power_request: 0.0,
            state: LiftState {
                minimum_power_per_second: data.minimum_power_per_second,
                ..LiftState::default()
            },
            current_lift_force: 0.0,
            damage_per_second: 0.0,
            notified_lift_force: 0.0,
            notified_overload: false,
            wear: DamageAccumulator::new(),
            health: Some(Health::new(data.max_health)),
            active: data.active,
            holds_body: false,
            warned: false,
        };
        lift.power_request = lift.minimum_hover_power();
        lift
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Set the power granted for the coming tick, floored at zero.
    pub fn set_power_allocation(&mut self, power: f64) {
        self.state.allocated_power_per_second = if power.is_finite() { power.max(0.0) } else { 0.0 };
    }

    /// Ask for a fixed amount of power.
    pub fn set_power_request(&mut self, power: f64) {
        self.power_request = if power.is_finite() { power.max(0.0) } else { 0.0 };
    }

    /// Ask for the power that yields `velocity_mps` for a vehicle of
    /// `mass_tons`.
    pub fn set_target_vertical_velocity(&mut self, velocity_mps: f64, mass_tons: f64) {
        let request = self.power_for_velocity(velocity_mps, mass_tons);
        debug!(lift = %self.name, velocity = velocity_mps, request, "Target vertical velocity");
        self.set_power_request(request);
    }

    /// Engage or disengage the unit. Disengaging zeroes lift immediately;
    /// gravity is restored at the next update.
    pub fn set_active(&mut self, active: bool) {
        if active && self.is_destroyed() {
            return;
        }
        self.active = active;
        if !active {
            self.zero_motion();
        }
        info!(lift = %self.name, active, "Lift unit toggled");
    }

    /// Boost a field device. Returns `false` for other variants.
    pub fn emergency_field_boost(&mut self) -> bool {
        match &mut self.model {
            LiftModelKind::Field(field) => {
                field.emergency_field_boost();
                info!(lift = %self.name, efficiency = field.efficiency(), stability = field.stability(), "Emergency field boost");
                true
            }
            LiftModelKind::Standard(_) => false,
        }
    }

    /// Stabilize a field device. Returns `false` for other variants.
    pub fn stabilize_field(&mut self) -> bool {
        match &mut self.model {
            LiftModelKind::Field(field) => {
                field.stabilize_field();
                info!(lift = %self.name, efficiency = field.efficiency(), stability = field.stability(), "Field stabilized");
                true
            }
            LiftModelKind::Standard(_) => false,
        }
    }

    /// Detach the health sink. The unit produces no lift until reattached.
    pub fn detach_health(&mut self) -> Option<Health> {
        self.health.take()
    }

    /// Attach a health sink.
    pub fn attach_health(&mut self, health: Health) {
        self.health = Some(health);
        self.warned = false;
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocated power needed to hold altitude.
    #[must_use]
    pub fn minimum_hover_power(&self) -> f64 {
        self.minimum_power_per_second / self.model.efficiency()
    }

    /// Power needed for a vertical velocity, floored at zero.
    #[must_use]
    pub fn power_for_velocity(&self, velocity_mps: f64, mass_tons: f64) -> f64 {
        let efficiency = self.model.efficiency();
        let power = if velocity_mps >= 0.0 {
            self.minimum_power_per_second
                + mass_tons * self.power_per_ton_per_meter_per_second * velocity_mps
        } else {
            self.minimum_power_per_second * (1.0 + velocity_mps / GRAVITY_FALL_RATE)
        };
        (power / efficiency).max(0.0)
    }

    /// What the source plant should try to grant this tick.
    #[must_use]
    pub fn power_request(&self) -> f64 {
        if self.active && self.health.is_some() {
            self.power_request
        } else {
            0.0
        }
    }

    /// Allocation and motion of the last tick.
    #[must_use]
    pub const fn state(&self) -> &LiftState {
        &self.state
    }

    /// Commanded vertical velocity (m/s).
    #[must_use]
    pub const fn vertical_velocity_mps(&self) -> f64 {
        self.state.vertical_velocity_mps
    }

    /// Whether the unit is holding altitude.
    #[must_use]
    pub const fn is_hovering(&self) -> bool {
        self.state.is_hovering
    }

    /// Lift force of the last tick (N).
    #[must_use]
    pub const fn current_lift_force(&self) -> f64 {
        self.current_lift_force
    }

    /// Wear damage per second.
    #[must_use]
    pub const fn damage_per_second(&self) -> f64 {
        self.damage_per_second
    }

    /// Field state of anti-gravity devices.
    #[must_use]
    pub fn field(&self) -> Option<FieldState> {
        self.model.field()
    }

    /// Whether the field is above its safe strength.
    #[must_use]
    pub fn is_field_overloaded(&self) -> bool {
        self.field().is_some_and(|f| f.is_overloaded())
    }

    /// The field model, for anti-gravity devices.
    #[must_use]
    pub const fn field_model(&self) -> Option<&FieldLift> {
        match &self.model {
            LiftModelKind::Field(field) => Some(field),
            LiftModelKind::Standard(_) => None,
        }
    }

    /// Health sink, if attached.
    #[must_use]
    pub const fn health(&self) -> Option<&Health> {
        self.health.as_ref()
    }

    /// Engaged and not destroyed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the health sink has reached zero.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.health.is_some_and(|h| h.is_dead())
    }

    /// Snapshot for telemetry consumers.
    #[must_use]
    pub fn telemetry(&self) -> LiftTelemetry {
        LiftTelemetry {
            name: self.name.clone(),
            active: self.active,
            state: self.state,
            power_request: self.power_request(),
            current_lift_force: self.current_lift_force,
            damage_per_second: self.damage_per_second,
            overload_damage_per_second: self
                .field_model()
                .map_or(0.0, |f| f.overload_damage_per_second(self.usage_damage_per_second)),
            health: self.health.map_or(0, |h| h.current()),
            max_health: self.health.map_or(0, |h| h.max()),
            field: self.field(),
            current_altitude: self.field_model().map(FieldLift::current_altitude),
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Turn the current allocation into vertical motion.
    pub fn update<B, R>(
        &mut self,
        frame: Option<&VehicleFrame>,
        gravity: f64,
        body: &mut B,
        rng: &mut R,
        dt: f64,
        events: &mut Vec<VehicleEvent>,
    ) where
        B: RigidBody + ?Sized,
        R: Rng,
    {
        self.model.observe_position(body.position());

        let frame = match (frame, self.health.is_some()) {
            (Some(frame), true) if self.active => {
                self.warned = false;
                Some(frame)
            }
            (frame, has_health) => {
                if self.active && !self.warned {
                    warn!(
                        lift = %self.name,
                        has_hull = frame.is_some(),
                        has_health,
                        "Lift unit is missing a collaborator; producing no lift"
                    );
                    self.warned = true;
                }
                None
            }
        };

        let effective_power = self.state.allocated_power_per_second * self.model.efficiency();

        match frame {
            Some(frame) if effective_power > 0.0 => {
                self.capture_body(body);

                let ratio = effective_power / self.minimum_power_per_second;
                let velocity = if ratio >= 1.0 {
                    let per_mps = frame.mass_tons * self.power_per_ton_per_meter_per_second;
                    if per_mps > 0.0 {
                        (effective_power - self.minimum_power_per_second) / per_mps
                    } else {
                        0.0
                    }
                } else {
                    -GRAVITY_FALL_RATE * (1.0 - ratio)
                };

                self.state.vertical_velocity_mps = velocity;
                self.state.is_hovering = ratio >= 1.0 && velocity.abs() < HOVER_TOLERANCE_MPS;
                body.move_position(body.position() + UP * velocity * dt);

                let weight = tons_to_kg(frame.mass_tons) * gravity;
                self.current_lift_force = self.model.compute_lift(weight * ratio, weight, rng);
                self.damage_per_second = self.usage_damage_per_second * ratio;
            }
            _ => {
                self.release_body(body);
                self.zero_motion();
                self.model.compute_lift(0.0, 0.0, rng);
            }
        }

        self.push_change_events(events);
    }

    /// Apply wear and model damage to the health sink.
    pub fn apply_damage(&mut self, dt: f64, events: &mut Vec<VehicleEvent>) {
        if !self.active {
            return;
        }
        let Some(health) = self.health.as_mut() else {
            return;
        };

        let points = self
            .wear
            .accumulate(self.damage_per_second, dt)
            .saturating_add(self.model.stress_damage(self.usage_damage_per_second, dt));
        if points == 0 {
            return;
        }

        let change = health.take_damage(i64::from(points));
        if change.amount > 0 {
            events.push(VehicleEvent::Damaged {
                subsystem: Subsystem::Lift,
                amount: change.amount,
            });
        }
        if change.died {
            warn!(lift = %self.name, "Lift unit failed");
            self.active = false;
            self.zero_motion();
            events.push(VehicleEvent::LiftFailure);
            self.push_change_events(events);
        }
    }

    /// Report lift force and overload changes since the last report.
    fn push_change_events(&mut self, events: &mut Vec<VehicleEvent>) {
        if changed(self.notified_lift_force, self.current_lift_force) {
            self.notified_lift_force = self.current_lift_force;
            events.push(VehicleEvent::LiftForceChanged {
                value: self.current_lift_force,
            });
        }
        let overloaded = self.is_field_overloaded();
        if overloaded != self.notified_overload {
            self.notified_overload = overloaded;
            if overloaded {
                warn!(lift = %self.name, "Field overload");
                events.push(VehicleEvent::FieldOverloadStarted);
            } else {
                events.push(VehicleEvent::FieldOverloadEnded);
            }
        }
    }

    fn capture_body<B: RigidBody + ?Sized>(&mut self, body: &mut B) {
        if body.use_gravity() {
            body.set_use_gravity(false);
            let velocity = body.linear_velocity();
            body.set_linear_velocity(velocity - UP * velocity.dot(UP));
            debug!(lift = %self.name, "Lift engaged, gravity off");
        }
        self.holds_body = true;
    }

    fn release_body<B: RigidBody + ?Sized>(&mut self, body: &mut B) {
        if self.holds_body {
            body.set_use_gravity(true);
            self.holds_body = false;
            debug!(lift = %self.name, "Lift released, gravity on");
        }
    }

    fn zero_motion(&mut self) {
        self.state.vertical_velocity_mps = 0.0;
        self.state.is_hovering = false;
        self.current_lift_force = 0.0;
        self.damage_per_second = 0.0;
        self.model.reset();
    }
}
