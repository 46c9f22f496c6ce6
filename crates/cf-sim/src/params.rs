//! System parameters for one scenario.

use cf_controls::{FirstOrderActuator, PidController};
use cf_core::whole_steps;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::vehicle::VehiclePlant;

/// Largest time grid a run accepts. Every step is kept in memory.
pub const MAX_STEPS: usize = 50_000_000;

/// Complete, read-only configuration of the speed loop.
///
/// Built once per scenario and passed by reference into every run. Changing
/// a value means building a new struct; nothing in the engine mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemParameters {
    /// Vehicle mass (kg), > 0.
    pub mass: f64,
    /// Linear drag coefficient (N·s/m), >= 0.
    pub drag: f64,
    /// Engine force per unit command (N).
    pub engine_gain: f64,
    /// Engine time constant (s), > 0.
    pub engine_tau: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Lower command bound.
    pub u_min: f64,
    /// Upper command bound, > `u_min`.
    pub u_max: f64,
    /// Fixed time step (s), > 0 and <= `t_end`.
    pub dt: f64,
    /// Simulated duration (s), > 0.
    pub t_end: f64,
    /// Vehicle speed at t = 0 (m/s).
    #[serde(default)]
    pub initial_velocity: f64,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self::cruise_baseline()
    }
}

impl SystemParameters {
    /// Mid-size car at highway cruise, balanced tuning.
    pub fn cruise_baseline() -> Self {
        Self {
            mass: 1000.0,
            drag: 50.0,
            engine_gain: 500.0,
            engine_tau: 0.5,
            kp: 800.0,
            ki: 40.0,
            kd: 40.0,
            u_min: 0.0,
            u_max: 1.0,
            dt: 0.01,
            t_end: 100.0,
            initial_velocity: 0.0,
        }
    }

    /// Copy with different controller gains.
    pub fn with_gains(&self, kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            ..self.clone()
        }
    }

    /// Check every invariant. Nothing is simulated from unchecked parameters.
    pub fn validate(&self) -> SimResult<()> {
        let fields = [
            ("mass", self.mass),
            ("drag", self.drag),
            ("engine_gain", self.engine_gain),
            ("engine_tau", self.engine_tau),
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("u_min", self.u_min),
            ("u_max", self.u_max),
            ("dt", self.dt),
            ("t_end", self.t_end),
            ("initial_velocity", self.initial_velocity),
        ];
        if fields.iter().any(|(_, v)| !v.is_finite()) {
            return Err(SimError::Config {
                what: "all parameters must be finite",
            });
        }
        if self.mass <= 0.0 {
            return Err(SimError::Config {
                what: "mass must be positive",
            });
        }
        if self.drag < 0.0 {
            return Err(SimError::Config {
                what: "drag must be non-negative",
            });
        }
        if self.engine_tau <= 0.0 {
            return Err(SimError::Config {
                what: "engine_tau must be positive",
            });
        }
        if self.u_min >= self.u_max {
            return Err(SimError::Config {
                what: "u_min must be less than u_max",
            });
        }
        if self.dt <= 0.0 {
            return Err(SimError::Config {
                what: "dt must be positive",
            });
        }
        if self.t_end <= 0.0 {
            return Err(SimError::Config {
                what: "t_end must be positive",
            });
        }
        if self.dt > self.t_end {
            return Err(SimError::Config {
                what: "dt must not exceed t_end",
            });
        }
        self.step_count()?;
        Ok(())
    }

    /// Number of records a complete run produces: `floor(t_end / dt)`.
    ///
    /// Fails when the grid is larger than [`MAX_STEPS`].
    pub fn step_count(&self) -> SimResult<usize> {
        match whole_steps(self.t_end, self.dt) {
            Some(n) if n <= MAX_STEPS => Ok(n),
            _ => Err(SimError::Config {
                what: "t_end / dt exceeds the step limit",
            }),
        }
    }

    /// Time of step `i`.
    pub fn time_at(&self, i: usize) -> f64 {
        i as f64 * self.dt
    }

    pub fn controller(&self) -> SimResult<PidController> {
        Ok(PidController::new(
            self.kp, self.ki, self.kd, self.u_min, self.u_max,
        )?)
    }

    pub fn actuator(&self) -> SimResult<FirstOrderActuator> {
        Ok(FirstOrderActuator::new(self.engine_gain, self.engine_tau)?)
    }

    pub fn plant(&self) -> SimResult<VehiclePlant> {
        VehiclePlant::new(self.mass, self.drag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_valid() {
        let p = SystemParameters::cruise_baseline();
        p.validate().unwrap();
        assert_eq!(p.step_count().unwrap(), 10_000);
        assert_eq!(p, SystemParameters::default());
    }

    #[test]
    fn time_grid_is_multiplicative() {
        let p = SystemParameters::cruise_baseline();
        assert_eq!(p.time_at(0), 0.0);
        assert_eq!(p.time_at(3000), 3000.0 * 0.01);
    }

    #[test]
    fn rejects_each_broken_invariant() {
        let base = SystemParameters::cruise_baseline();
        let cases: Vec<(SystemParameters, &str)> = vec![
            (SystemParameters { mass: 0.0, ..base.clone() }, "mass"),
            (SystemParameters { mass: -5.0, ..base.clone() }, "mass"),
            (SystemParameters { drag: -1.0, ..base.clone() }, "drag"),
            (SystemParameters { engine_tau: 0.0, ..base.clone() }, "engine_tau"),
            (SystemParameters { u_min: 1.0, ..base.clone() }, "u_min"),
            (SystemParameters { dt: 0.0, ..base.clone() }, "dt"),
            (SystemParameters { t_end: -1.0, ..base.clone() }, "t_end"),
            (SystemParameters { dt: 2.0, t_end: 1.0, ..base.clone() }, "exceed"),
            (SystemParameters { kp: f64::NAN, ..base.clone() }, "finite"),
        ];
        for (params, needle) in cases {
            let err = params.validate().unwrap_err();
            assert!(
                matches!(err, SimError::Config { .. }),
                "expected config error, got {err:?}"
            );
            assert!(
                err.to_string().contains(needle),
                "{err} should mention {needle}"
            );
        }
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let base = SystemParameters::cruise_baseline();
        for (dt, t_end) in [(1.0, 1e30), (1e-10, 1e300), (1e-3, 1e5)] {
            let p = SystemParameters {
                dt,
                t_end,
                ..base.clone()
            };
            let err = p.validate().unwrap_err();
            assert!(err.to_string().contains("step limit"), "{err}");
            assert!(p.step_count().is_err());
        }

        let at_limit = SystemParameters {
            dt: 1.0,
            t_end: MAX_STEPS as f64,
            ..base
        };
        assert_eq!(at_limit.step_count().unwrap(), MAX_STEPS);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn zero_drag_is_allowed() {
        let p = SystemParameters {
            drag: 0.0,
            ..SystemParameters::cruise_baseline()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn with_gains_leaves_plant_untouched() {
        let base = SystemParameters::cruise_baseline();
        let tuned = base.with_gains(400.0, 20.0, 30.0);
        assert_eq!(tuned.kp, 400.0);
        assert_eq!(tuned.mass, base.mass);
        assert_eq!(tuned.dt, base.dt);
    }
}
