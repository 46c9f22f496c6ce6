//! Parallel execution of independent runs.
//!
//! Each run owns its controller, engine and vehicle state plus its output
//! buffer, so tunings can be evaluated concurrently on the rayon pool without
//! any shared mutable data. A failure in one run leaves the others untouched.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimResult;
use crate::params::SystemParameters;
use crate::profile::{DisturbanceSet, ReferenceProfile};
use crate::sim::run;
use crate::trace::Trace;

/// A named set of PID gains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub name: String,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Tuning {
    pub fn new(name: impl Into<String>, kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            name: name.into(),
            kp,
            ki,
            kd,
        }
    }

    /// `base` with these gains applied.
    pub fn apply(&self, base: &SystemParameters) -> SystemParameters {
        base.with_gains(self.kp, self.ki, self.kd)
    }
}

/// Result of one run in a sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub tuning: Tuning,
    pub params: SystemParameters,
    pub result: SimResult<Trace>,
}

/// Run `base` once per tuning, in parallel. Output order matches `tunings`.
pub fn run_sweep(
    base: &SystemParameters,
    tunings: &[Tuning],
    reference: &ReferenceProfile,
    disturbances: &DisturbanceSet,
) -> Vec<SweepOutcome> {
    debug!(runs = tunings.len(), "starting sweep");
    tunings
        .par_iter()
        .map(|tuning| {
            let params = tuning.apply(base);
            let result = run(&params, reference, disturbances);
            SweepOutcome {
                tuning: tuning.clone(),
                params,
                result,
            }
        })
        .collect()
}
