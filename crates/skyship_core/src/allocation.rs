//! Power allocation between thrust and lift.
//!
//! One power plant's output is the only contended resource of a vehicle.
//! When thrust and lift together ask for less than the output, both are
//! served in full; otherwise the [`PriorityMode`] decides who gives way.
//!
//! Guarantees for every mode:
//! - `thrust + lift <= output`
//! - neither consumer is granted more than it requested
//! - all grants are non-negative

use serde::{Deserialize, Serialize};

use crate::components::PriorityMode;

/// Inputs to one allocation decision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Power the thrust side wants.
    pub requested_thrust: f64,
    /// Power the lift unit wants.
    pub requested_lift: f64,
    /// Power available this tick.
    pub output: f64,
    /// Lift power needed to hold altitude (used by `Balanced`).
    pub minimum_hover_power: f64,
    /// Arbitration policy.
    pub mode: PriorityMode,
}

/// Result of one allocation decision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Allocation {
    /// Power granted to thrust.
    pub thrust: f64,
    /// Power granted to lift.
    pub lift: f64,
}

impl Allocation {
    /// Total power granted.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.thrust + self.lift
    }
}

/// Negative and non-finite inputs count as zero.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Split `output` between thrust and lift.
#[must_use]
pub fn allocate(request: &AllocationRequest) -> Allocation {
    let thrust = sanitize(request.requested_thrust);
    let lift = sanitize(request.requested_lift);
    let output = sanitize(request.output);
    let hover = sanitize(request.minimum_hover_power);

    if thrust + lift <= output {
        return Allocation { thrust, lift };
    }

    match request.mode {
        PriorityMode::LiftPriority => {
            let lift_grant = lift.min(output);
            Allocation {
                thrust: thrust.min(output - lift_grant).max(0.0),
                lift: lift_grant,
            }
        }
        PriorityMode::ThrustPriority => {
            let thrust_grant = thrust.min(output);
            Allocation {
                thrust: thrust_grant,
                lift: lift.min(output - thrust_grant).max(0.0),
            }
        }
        PriorityMode::Balanced => balanced(thrust, lift, output, hover),
    }
}

/// Hover power first, then the remainder split in proportion to the thrust
/// request and the lift request above hover.
fn balanced(thrust: f64, lift: f64, output: f64, hover: f64) -> Allocation {
    let guaranteed = lift.min(hover).min(output);
    let remaining = (output - guaranteed).max(0.0);
    let excess_lift = (lift - guaranteed).max(0.0);

    let demand = thrust + excess_lift;
    if demand <= 0.0 {
        return Allocation {
            thrust: 0.0,
            lift: guaranteed,
        };
    }

    let ratio = thrust / demand;
    Allocation {
        thrust: (remaining * ratio).min(thrust),
        lift: guaranteed + (remaining * (1.0 - ratio)).min(excess_lift),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn request(thrust: f64, lift: f64, output: f64, mode: PriorityMode) -> AllocationRequest {
        AllocationRequest {
            requested_thrust: thrust,
            requested_lift: lift,
            output,
            minimum_hover_power: 30.0,
            mode,
        }
    }

    #[test]
    fn test_under_budget_grants_both() {
        for mode in [
            PriorityMode::LiftPriority,
            PriorityMode::ThrustPriority,
            PriorityMode::Balanced,
        ] {
            let result = allocate(&request(40.0, 30.0, 100.0, mode));
            assert_eq!(result, Allocation { thrust: 40.0, lift: 30.0 });
        }
    }

    #[test]
    fn test_lift_priority_over_budget() {
        let result = allocate(&request(80.0, 60.0, 100.0, PriorityMode::LiftPriority));
        assert!((result.lift - 60.0).abs() < EPS);
        assert!((result.thrust - 40.0).abs() < EPS);
    }

    #[test]
    fn test_lift_priority_lift_exceeds_output() {
        let result = allocate(&request(10.0, 150.0, 100.0, PriorityMode::LiftPriority));
        assert!((result.lift - 100.0).abs() < EPS);
        assert_eq!(result.thrust, 0.0);
    }

    #[test]
    fn test_thrust_priority_over_budget() {
        let result = allocate(&request(80.0, 60.0, 100.0, PriorityMode::ThrustPriority));
        assert!((result.thrust - 80.0).abs() < EPS);
        assert!((result.lift - 20.0).abs() < EPS);
    }

    #[test]
    fn test_balanced_guarantees_hover_then_splits() {
        // hover 30, excess lift 30, thrust 90: remainder 70 split 3:1
        let result = allocate(&request(90.0, 60.0, 100.0, PriorityMode::Balanced));
        assert!((result.thrust - 52.5).abs() < EPS);
        assert!((result.lift - (30.0 + 17.5)).abs() < EPS);
    }

    #[test]
    fn test_balanced_hover_capped_at_output() {
        let result = allocate(&request(50.0, 60.0, 20.0, PriorityMode::Balanced));
        assert!((result.lift - 20.0).abs() < EPS);
        assert_eq!(result.thrust, 0.0);
    }

    #[test]
    fn test_balanced_lift_at_hover_gives_thrust_the_rest() {
        let result = allocate(&request(200.0, 30.0, 100.0, PriorityMode::Balanced));
        assert!((result.lift - 30.0).abs() < EPS);
        assert!((result.thrust - 70.0).abs() < EPS);
    }

    #[test]
    fn test_negative_inputs_are_zero() {
        let result = allocate(&request(-5.0, -1.0, 100.0, PriorityMode::Balanced));
        assert_eq!(result, Allocation::default());
        let result = allocate(&request(10.0, 10.0, -100.0, PriorityMode::LiftPriority));
        assert_eq!(result.total(), 0.0);
    }

    fn mode_strategy() -> impl Strategy<Value = PriorityMode> {
        prop_oneof![
            Just(PriorityMode::LiftPriority),
            Just(PriorityMode::ThrustPriority),
            Just(PriorityMode::Balanced),
        ]
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_output(
            thrust in 0.0f64..1000.0,
            lift in 0.0f64..1000.0,
            output in 0.0f64..1000.0,
            hover in 0.0f64..500.0,
            mode in mode_strategy(),
        ) {
            let result = allocate(&AllocationRequest {
                requested_thrust: thrust,
                requested_lift: lift,
                output,
                minimum_hover_power: hover,
                mode,
            });
            prop_assert!(result.total() <= output + EPS);
            prop_assert!(result.thrust >= 0.0 && result.lift >= 0.0);
            prop_assert!(result.thrust <= thrust + EPS);
            prop_assert!(result.lift <= lift + EPS);
        }

        #[test]
        fn prop_balanced_keeps_hover(
            thrust in 0.0f64..1000.0,
            extra_lift in 0.0f64..500.0,
            hover in 1.0f64..200.0,
            extra_output in 0.0f64..500.0,
        ) {
            let lift = hover + extra_lift;
            let output = hover + extra_output;
            let result = allocate(&AllocationRequest {
                requested_thrust: thrust,
                requested_lift: lift,
                output,
                minimum_hover_power: hover,
                mode: PriorityMode::Balanced,
            });
            prop_assert!(result.lift >= hover - EPS);
        }
    }
}
