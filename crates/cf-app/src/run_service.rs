//! Run execution service.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use cf_project::schema::ScenarioDef;
use cf_sim::{RunStatus, SimProgress, Simulation, SystemParameters, Trace};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};
use crate::progress::{RunProgressEvent, RunStage, SimulationProgress};
use crate::project_service::{ScenarioSource, resolve_scenario};
use crate::scenario_compile::compile_scenario;

/// Request to execute a run.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub source: ScenarioSource<'a>,
    pub metrics: MetricsOptions,
}

impl<'a> RunRequest<'a> {
    pub fn new(source: ScenarioSource<'a>) -> Self {
        Self {
            source,
            metrics: MetricsOptions::default(),
        }
    }
}

/// Concise timing summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub compile_time_s: f64,
    pub simulate_time_s: f64,
    pub metrics_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub scenario: ScenarioDef,
    pub params: SystemParameters,
    pub trace: Trace,
    pub metrics: LoopMetrics,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    simulation: Option<SimulationProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(
            RunProgressEvent::stage(stage, started.elapsed().as_secs_f64(), message)
                .with_simulation(simulation),
        );
    }
}

/// Load, compile and run a scenario, then compute its metrics.
pub fn run_scenario(request: &RunRequest) -> AppResult<RunResponse> {
    run_scenario_with_progress(request, None, None)
}

/// Same as [`run_scenario`], with cooperative cancellation and progress
/// events. A cancelled run still returns its partial trace and the metrics
/// computed from it.
pub fn run_scenario_with_progress(
    request: &RunRequest,
    cancel: Option<&AtomicBool>,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(&mut progress_cb, RunStage::LoadingScenario, started, None, None);
    let scenario = resolve_scenario(&request.source)?;
    timing.load_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::CompilingScenario,
        started,
        Some(scenario.name.clone()),
        None,
    );
    let compile_started = Instant::now();
    let compiled = compile_scenario(&scenario)?;
    let sim = Simulation::new(compiled.params.clone())?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    debug!(scenario = %scenario.name, steps = sim.step_count(), "running scenario");
    let t_end_s = compiled.params.t_end;
    let sim_started = Instant::now();
    let result = {
        let mut forward = |p: SimProgress| {
            emit_progress(
                &mut progress_cb,
                RunStage::Simulating,
                started,
                None,
                Some(SimulationProgress {
                    sim_time_s: p.sim_time_s,
                    t_end_s,
                    fraction_complete: p.fraction_complete,
                    step: p.step,
                    total_steps: p.total_steps,
                }),
            );
        };
        sim.run_with_progress(
            &compiled.reference,
            &compiled.disturbances,
            cancel,
            Some(&mut forward),
        )
    };
    timing.simulate_time_s = sim_started.elapsed().as_secs_f64();

    let trace = result.inspect_err(|e| {
        warn!(
            scenario = %scenario.name,
            partial = e.partial_records().len(),
            error = %e,
            "run failed"
        );
    })?;
    timing.steps = trace.len();

    emit_progress(&mut progress_cb, RunStage::ComputingMetrics, started, None, None);
    let metrics_started = Instant::now();
    let metrics = compute_loop_metrics(&trace, compiled.params.u_max, &request.metrics);
    timing.metrics_time_s = metrics_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    let final_stage = match trace.status {
        RunStatus::Completed => RunStage::Completed,
        RunStatus::Cancelled { .. } => RunStage::Cancelled,
    };
    emit_progress(&mut progress_cb, final_stage, started, None, None);

    info!(
        scenario = %scenario.name,
        steps = timing.steps,
        total_s = timing.total_time_s,
        "run finished"
    );

    Ok(RunResponse {
        scenario,
        params: compiled.params,
        trace,
        metrics,
        timing,
    })
}
