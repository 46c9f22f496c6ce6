//! Tuning comparison: one scenario, several gain sets, run in parallel.

use std::time::Instant;

use cf_project::schema::TuningDef;
use cf_sim::{Tuning, run_sweep};
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};
use crate::project_service::{ScenarioSource, resolve_scenario};
use crate::scenario_compile::compile_scenario;

#[derive(Debug, Clone)]
pub struct CompareRequest<'a> {
    pub source: ScenarioSource<'a>,
    /// Overrides the scenario's own tunings when set.
    pub tunings: Option<Vec<TuningDef>>,
    pub metrics: MetricsOptions,
}

/// Outcome of one tuning.
#[derive(Debug, Clone)]
pub struct TuningReport {
    pub tuning: Tuning,
    pub metrics: Option<LoopMetrics>,
    pub final_speed: Option<f64>,
    /// Failure message when the run did not complete.
    pub error: Option<String>,
    /// Records produced before a failure.
    pub partial_records: usize,
}

impl TuningReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CompareResponse {
    pub scenario_name: String,
    pub reports: Vec<TuningReport>,
    pub total_time_s: f64,
}

/// Run the scenario once per tuning. Reports keep the tuning order; a failing
/// tuning is reported, not propagated.
pub fn compare_tunings(request: &CompareRequest) -> AppResult<CompareResponse> {
    let started = Instant::now();
    let scenario = resolve_scenario(&request.source)?;
    let mut compiled = compile_scenario(&scenario)?;
    if let Some(tunings) = &request.tunings {
        compiled.tunings = tunings
            .iter()
            .map(|t| Tuning::new(t.name.clone(), t.kp, t.ki, t.kd))
            .collect();
    }

    debug!(scenario = %scenario.name, tunings = compiled.tunings.len(), "comparing tunings");
    let outcomes = run_sweep(
        &compiled.params,
        &compiled.tunings,
        &compiled.reference,
        &compiled.disturbances,
    );

    let reports = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(trace) => TuningReport {
                metrics: Some(compute_loop_metrics(
                    &trace,
                    outcome.params.u_max,
                    &request.metrics,
                )),
                final_speed: trace.last().map(|r| r.velocity),
                error: None,
                partial_records: 0,
                tuning: outcome.tuning,
            },
            Err(err) => {
                warn!(tuning = %outcome.tuning.name, error = %err, "tuning run failed");
                TuningReport {
                    metrics: None,
                    final_speed: None,
                    partial_records: err.partial_records().len(),
                    error: Some(err.to_string()),
                    tuning: outcome.tuning,
                }
            }
        })
        .collect();

    Ok(CompareResponse {
        scenario_name: scenario.name,
        reports,
        total_time_s: started.elapsed().as_secs_f64(),
    })
}
