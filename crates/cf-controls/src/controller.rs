//! Discrete PID controller with output saturation and anti-windup.
//!
//! The controller runs once per simulation step:
//! - **P**: `kp * e`
//! - **I**: `ki * ∫e dt`, accumulated by rectangle rule
//! - **D**: `kd * (e - e_prev) / dt`, unfiltered backward difference
//!
//! The raw sum is clamped to `[out_min, out_max]`. When the raw output sits at
//! or beyond either bound, the integration performed on that step is rolled
//! back so the accumulator does not wind up while the loop is saturated. Only
//! the integral is rolled back; the derivative memory always advances.

use crate::error::{ControlError, ControlResult};
use cf_core::ensure_finite;
use serde::{Deserialize, Serialize};

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (per second).
    pub ki: f64,
    /// Derivative gain (seconds).
    pub kd: f64,
    /// Minimum output value.
    pub out_min: f64,
    /// Maximum output value.
    pub out_max: f64,
}

impl PidController {
    /// Create a new PID controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `kd` - Derivative gain
    /// * `out_min` - Minimum output
    /// * `out_max` - Maximum output
    ///
    /// # Errors
    ///
    /// Returns an error if any argument is non-finite or if
    /// `out_min >= out_max`.
    pub fn new(kp: f64, ki: f64, kd: f64, out_min: f64, out_max: f64) -> ControlResult<Self> {
        ensure_finite(kp, "kp")?;
        ensure_finite(ki, "ki")?;
        ensure_finite(kd, "kd")?;
        ensure_finite(out_min, "out_min")?;
        ensure_finite(out_max, "out_max")?;
        if out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must be less than out_max",
            });
        }
        Ok(Self {
            kp,
            ki,
            kd,
            out_min,
            out_max,
        })
    }

    /// Compute the bounded command for one step.
    ///
    /// `dt` must be positive; callers validate it once up front.
    pub fn update(&self, state: &mut PidState, error: f64, dt: f64) -> f64 {
        self.step(state, error, dt).command
    }

    /// Same as [`PidController::update`], returning the individual terms.
    pub fn step(&self, state: &mut PidState, error: f64, dt: f64) -> PidOutput {
        // Proportional term
        let p = self.kp * error;

        // Integral term
        let increment = error * dt;
        state.integral += increment;
        let i = self.ki * state.integral;

        // Derivative term
        let d = self.kd * (error - state.prev_error) / dt;
        state.prev_error = error;

        let raw = p + i + d;
        let command = raw.clamp(self.out_min, self.out_max);

        // Anti-windup: a saturated step does not keep its integration
        let saturated = raw >= self.out_max || raw <= self.out_min;
        if saturated {
            state.integral -= increment;
        }

        PidOutput {
            command,
            raw,
            p,
            i,
            d,
            saturated,
        }
    }
}

/// Breakdown of one controller step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidOutput {
    /// Clamped command actually applied.
    pub command: f64,
    /// Unclamped `p + i + d`.
    pub raw: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
    /// True when the raw output reached or exceeded a bound.
    pub saturated: bool,
}

/// PID controller state.
///
/// `prev_error` starts at zero, so a nonzero first error produces a
/// derivative kick on the first step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    /// Integral accumulator (error-seconds).
    pub integral: f64,
    /// Error seen on the previous step.
    pub prev_error: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruise_pid() -> PidController {
        PidController::new(800.0, 40.0, 40.0, 0.0, 1.0).unwrap()
    }

    #[test]
    fn pid_controller_creation() {
        let pid = cruise_pid();
        assert_eq!(pid.kp, 800.0);
        assert_eq!(pid.ki, 40.0);
        assert_eq!(pid.kd, 40.0);
    }

    #[test]
    fn proportional_only_inside_bounds() {
        let pid = PidController::new(2.0, 0.0, 0.0, -10.0, 10.0).unwrap();
        let mut state = PidState::default();

        let out = pid.update(&mut state, 1.5, 0.1);
        assert!((out - 3.0).abs() < 1e-12);
    }

    #[test]
    fn integral_accumulates_when_unsaturated() {
        let pid = PidController::new(0.0, 1.0, 0.0, -10.0, 10.0).unwrap();
        let mut state = PidState::default();

        for _ in 0..10 {
            pid.update(&mut state, 1.0, 0.1);
        }

        assert!((state.integral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn first_step_derivative_kick_uses_zero_previous_error() {
        let pid = PidController::new(0.0, 0.0, 1.0, -100.0, 100.0).unwrap();
        let mut state = PidState::default();

        let out = pid.step(&mut state, 2.0, 0.1);
        assert!((out.d - 20.0).abs() < 1e-12);
        assert_eq!(state.prev_error, 2.0);

        // Same error again: no derivative
        let out = pid.step(&mut state, 2.0, 0.1);
        assert!(out.d.abs() < 1e-12);
    }

    #[test]
    fn output_clamped_and_integral_rolled_back() {
        let pid = cruise_pid();
        let mut state = PidState::default();

        let out = pid.step(&mut state, 29.0, 0.01);
        assert_eq!(out.command, 1.0);
        assert!(out.saturated);
        assert!(out.raw > 1.0);
        assert_eq!(state.integral, 0.0);
    }

    #[test]
    fn lower_bound_also_rolls_back() {
        let pid = cruise_pid();
        let mut state = PidState::default();

        let out = pid.step(&mut state, -5.0, 0.01);
        assert_eq!(out.command, 0.0);
        assert!(out.saturated);
        assert_eq!(state.integral, 0.0);
    }

    #[test]
    fn raw_exactly_at_bound_counts_as_saturated() {
        let pid = PidController::new(1.0, 0.0, 0.0, 0.0, 1.0).unwrap();
        let mut state = PidState {
            integral: 0.25,
            prev_error: 1.0,
        };

        let out = pid.step(&mut state, 1.0, 0.5);
        assert_eq!(out.raw, 1.0);
        assert!(out.saturated);
        assert_eq!(state.integral, 0.25);
    }

    #[test]
    fn invalid_controller_params() {
        assert!(PidController::new(1.0, 1.0, 1.0, 1.0, 0.0).is_err());
        assert!(PidController::new(1.0, 1.0, 1.0, 1.0, 1.0).is_err());
        assert!(PidController::new(f64::NAN, 1.0, 1.0, 0.0, 1.0).is_err());
        assert!(PidController::new(1.0, 1.0, 1.0, 0.0, f64::INFINITY).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn command_stays_within_bounds(
            kp in -2000.0_f64..2000.0,
            ki in -100.0_f64..100.0,
            kd in -100.0_f64..100.0,
            errors in prop::collection::vec(-50.0_f64..50.0, 1..200),
        ) {
            let pid = PidController::new(kp, ki, kd, -0.5, 1.0).unwrap();
            let mut state = PidState::default();
            for e in errors {
                let u = pid.update(&mut state, e, 0.01);
                prop_assert!((-0.5..=1.0).contains(&u));
            }
        }

        #[test]
        fn saturated_steps_never_grow_integral(
            ki in 0.1_f64..100.0,
            errors in prop::collection::vec(-50.0_f64..50.0, 1..200),
        ) {
            let pid = PidController::new(800.0, ki, 40.0, 0.0, 1.0).unwrap();
            let mut state = PidState::default();
            for e in errors {
                let before = state.integral;
                let out = pid.step(&mut state, e, 0.01);
                if out.saturated {
                    prop_assert!(state.integral.abs() <= before.abs() + 1e-12);
                }
            }
        }
    }
}
