//! Per-step output of a simulation run.

use cf_core::{CfResult, ensure_finite};
use serde::{Deserialize, Serialize};

/// One logged row of the speed loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Simulation time (s).
    pub time: f64,
    /// Desired speed (m/s).
    pub reference: f64,
    /// Speed after this step's plant update (m/s).
    pub velocity: f64,
    /// `reference - velocity` as seen by the controller, before the update.
    pub error: f64,
    /// Saturated controller output.
    pub command: f64,
    /// Engine force after this step's actuator update (N).
    pub engine_force: f64,
    /// Sum of disturbance forces applied this step (N).
    pub disturbance_force: f64,
}

impl TraceRecord {
    /// Fails on the first non-finite field.
    pub fn check_finite(&self) -> CfResult<()> {
        ensure_finite(self.reference, "reference")?;
        ensure_finite(self.error, "error")?;
        ensure_finite(self.command, "command")?;
        ensure_finite(self.engine_force, "engine_force")?;
        ensure_finite(self.disturbance_force, "disturbance_force")?;
        ensure_finite(self.velocity, "velocity")?;
        Ok(())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every grid step was simulated.
    Completed,
    /// Cancelled by the caller before step `at_step` ran.
    Cancelled { at_step: usize },
}

/// Ordered records of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub records: Vec<TraceRecord>,
    pub status: RunStatus,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.last()
    }

    /// `(time, value)` pairs for one field, ready for metrics or plotting.
    pub fn series(&self, field: impl Fn(&TraceRecord) -> f64) -> Vec<(f64, f64)> {
        self.records.iter().map(|r| (r.time, field(r))).collect()
    }
}
