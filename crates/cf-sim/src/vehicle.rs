//! Vehicle plant: point mass with linear drag.

use cf_core::ensure_finite;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// State of the vehicle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Forward speed (m/s).
    pub velocity: f64,
}

/// `m dv/dt = F_drive - b v + F_dist`, integrated with explicit Euler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehiclePlant {
    /// Mass (kg), > 0.
    pub mass: f64,
    /// Drag coefficient (N·s/m), >= 0.
    pub drag: f64,
}

impl VehiclePlant {
    pub fn new(mass: f64, drag: f64) -> SimResult<Self> {
        ensure_finite(mass, "mass")?;
        ensure_finite(drag, "drag")?;
        if mass <= 0.0 {
            return Err(SimError::Config {
                what: "mass must be positive",
            });
        }
        if drag < 0.0 {
            return Err(SimError::Config {
                what: "drag must be non-negative",
            });
        }
        Ok(Self { mass, drag })
    }

    pub fn acceleration(&self, velocity: f64, drive: f64, disturbance: f64) -> f64 {
        (drive - self.drag * velocity + disturbance) / self.mass
    }

    /// Advance by `dt` and return the new speed.
    pub fn update(&self, state: &mut PlantState, drive: f64, disturbance: f64, dt: f64) -> f64 {
        state.velocity += self.acceleration(state.velocity, drive, disturbance) * dt;
        state.velocity
    }

    /// Speed at which drag balances a constant net force, if drag is nonzero.
    pub fn terminal_velocity(&self, force: f64) -> Option<f64> {
        (self.drag > 0.0).then(|| force / self.drag)
    }
}
