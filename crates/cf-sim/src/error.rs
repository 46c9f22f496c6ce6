//! Error types for simulation operations.

use std::fmt;

use thiserror::Error;

use crate::profile::ProfileError;
use crate::trace::TraceRecord;

/// Which input function failed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Reference,
    /// Position of the failing function within the disturbance set.
    Disturbance(usize),
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Reference => write!(f, "reference"),
            InputKind::Disturbance(idx) => write!(f, "disturbance #{}", idx),
        }
    }
}

/// Errors encountered during a simulation run.
///
/// Only `Config` is raised before any state exists. The per-step variants
/// carry the records produced before the failure; those records are valid.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    Config { what: &'static str },

    #[error("Non-finite {field} at step {step} (t = {time} s)")]
    NumericDegeneracy {
        step: usize,
        time: f64,
        field: &'static str,
        record: TraceRecord,
        partial: Vec<TraceRecord>,
    },

    #[error("Evaluation of {input} failed at step {step} (t = {time} s): {source}")]
    Evaluation {
        step: usize,
        time: f64,
        input: InputKind,
        #[source]
        source: ProfileError,
        partial: Vec<TraceRecord>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Records produced before the run failed. Empty for configuration errors.
    pub fn partial_records(&self) -> &[TraceRecord] {
        match self {
            SimError::Config { .. } => &[],
            SimError::NumericDegeneracy { partial, .. } | SimError::Evaluation { partial, .. } => {
                partial
            }
        }
    }

    /// Step index at which the run stopped, if it started at all.
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            SimError::Config { .. } => None,
            SimError::NumericDegeneracy { step, .. } | SimError::Evaluation { step, .. } => {
                Some(*step)
            }
        }
    }
}

impl From<cf_controls::ControlError> for SimError {
    fn from(e: cf_controls::ControlError) -> Self {
        match e {
            cf_controls::ControlError::InvalidArg { what }
            | cf_controls::ControlError::NonFinite { what, .. } => SimError::Config { what },
        }
    }
}

impl From<cf_core::CfError> for SimError {
    fn from(e: cf_core::CfError) -> Self {
        match e {
            cf_core::CfError::InvalidArg { what } | cf_core::CfError::NonFinite { what, .. } => {
                SimError::Config { what }
            }
        }
    }
}
