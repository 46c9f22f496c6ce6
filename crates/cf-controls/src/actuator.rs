//! Engine actuator with first-order lag.
//!
//! The actuator turns a normalized command (throttle) into a drive force.
//! Dynamics: `dF/dt = (gain * cmd - F) / tau`, integrated with explicit Euler.
//! The discretization error grows with `dt / tau`; steps close to or above
//! `tau` overshoot the target and eventually oscillate.

use crate::error::{ControlError, ControlResult};
use cf_core::{ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

/// State of the actuator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorState {
    /// Force currently produced (N).
    pub force: f64,
}

/// First-order actuator mapping a command to a force.
///
/// # Example
///
/// ```
/// use cf_controls::{ActuatorState, FirstOrderActuator};
///
/// let engine = FirstOrderActuator::new(500.0, 0.5).unwrap();
/// let mut state = ActuatorState::default();
///
/// // Full throttle for five time constants
/// for _ in 0..250 {
///     engine.update(&mut state, 1.0, 0.01);
/// }
///
/// // Force should be within 1% of the 500 N target
/// assert!(state.force > 495.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderActuator {
    /// Steady-state force per unit command (N).
    pub gain: f64,
    /// Time constant (seconds), must be positive.
    pub tau: f64,
}

impl FirstOrderActuator {
    /// Create a new first-order actuator.
    ///
    /// # Errors
    ///
    /// Returns error if `gain` is non-finite or `tau` is not positive.
    pub fn new(gain: f64, tau: f64) -> ControlResult<Self> {
        ensure_finite(gain, "gain")?;
        ensure_positive(tau, "tau").map_err(|_| ControlError::InvalidArg {
            what: "tau must be positive",
        })?;
        Ok(Self { gain, tau })
    }

    /// Force derivative given current force and command.
    pub fn dfdt(&self, force: f64, command: f64) -> f64 {
        (self.gain * command - force) / self.tau
    }

    /// Advance the actuator by `dt` and return the new force.
    pub fn update(&self, state: &mut ActuatorState, command: f64, dt: f64) -> f64 {
        state.force += self.dfdt(state.force, command) * dt;
        state.force
    }
}
