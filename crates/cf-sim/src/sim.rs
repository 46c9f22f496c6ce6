//! Simulation runner for the closed speed loop.
//!
//! One step at grid time `t_i = i * dt`:
//! reference → error → PID → engine → (+ disturbances) → vehicle → record.
//! Steps are strictly sequential; every block's state after step `i` is an
//! input to step `i + 1`.

use std::sync::atomic::{AtomicBool, Ordering};

use cf_controls::{ActuatorState, FirstOrderActuator, PidController, PidState};
use cf_core::CfError;
use tracing::{debug, warn};

use crate::error::{InputKind, SimError, SimResult};
use crate::params::SystemParameters;
use crate::profile::{DisturbanceSet, ReferenceProfile};
use crate::trace::{RunStatus, Trace, TraceRecord};
use crate::vehicle::{PlantState, VehiclePlant};

/// Progress snapshot handed to the caller's callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    /// Steps completed so far.
    pub step: usize,
    pub total_steps: usize,
    /// Time of the last completed step (s).
    pub sim_time_s: f64,
    pub fraction_complete: f64,
}

/// Mutable state of one run. Created fresh for every run and dropped at the end.
#[derive(Debug, Default)]
struct LoopState {
    pid: PidState,
    engine: ActuatorState,
    vehicle: PlantState,
}

/// Validated speed loop, ready to run any number of times.
///
/// Holds only immutable configuration; each run builds its own state, so a
/// `Simulation` can be shared between threads.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SystemParameters,
    controller: PidController,
    engine: FirstOrderActuator,
    vehicle: VehiclePlant,
    steps: usize,
}

impl Simulation {
    /// Validate `params` and build the blocks.
    pub fn new(params: SystemParameters) -> SimResult<Self> {
        params.validate()?;
        let controller = params.controller()?;
        let engine = params.actuator()?;
        let vehicle = params.plant()?;
        let steps = params.step_count()?;
        Ok(Self {
            params,
            controller,
            engine,
            vehicle,
            steps,
        })
    }

    pub fn params(&self) -> &SystemParameters {
        &self.params
    }

    /// Number of records a complete run produces.
    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// Run to completion.
    pub fn run(
        &self,
        reference: &ReferenceProfile,
        disturbances: &DisturbanceSet,
    ) -> SimResult<Trace> {
        self.run_with_progress(reference, disturbances, None, None)
    }

    /// Run with optional cooperative cancellation and progress reporting.
    ///
    /// `cancel` is polled before every step. Once it reads `true` the run
    /// stops and returns the records produced so far with
    /// [`RunStatus::Cancelled`].
    pub fn run_with_progress(
        &self,
        reference: &ReferenceProfile,
        disturbances: &DisturbanceSet,
        cancel: Option<&AtomicBool>,
        mut progress: Option<&mut dyn FnMut(SimProgress)>,
    ) -> SimResult<Trace> {
        let dt = self.params.dt;
        let total = self.steps;
        let report_every = (total / 100).max(1);

        debug!(
            steps = total,
            dt,
            reference = reference.name(),
            disturbances = disturbances.len(),
            "starting run"
        );

        let mut state = LoopState {
            vehicle: PlantState {
                velocity: self.params.initial_velocity,
            },
            ..LoopState::default()
        };
        let mut records = Vec::with_capacity(total);

        for i in 0..total {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                warn!(step = i, "run cancelled");
                return Ok(Trace {
                    records,
                    status: RunStatus::Cancelled { at_step: i },
                });
            }

            let t = self.params.time_at(i);
            let record = match self.step(&mut state, reference, disturbances, t, dt) {
                Ok(record) => record,
                Err((input, source)) => {
                    warn!(step = i, t, %input, error = %source, "input evaluation failed");
                    return Err(SimError::Evaluation {
                        step: i,
                        time: t,
                        input,
                        source,
                        partial: records,
                    });
                }
            };

            if let Err(CfError::NonFinite { what, .. } | CfError::InvalidArg { what }) =
                record.check_finite()
            {
                warn!(step = i, t, field = what, "numeric degeneracy");
                return Err(SimError::NumericDegeneracy {
                    step: i,
                    time: t,
                    field: what,
                    record,
                    partial: records,
                });
            }

            records.push(record);

            if let Some(cb) = progress.as_deref_mut()
                && ((i + 1) % report_every == 0 || i + 1 == total)
            {
                cb(SimProgress {
                    step: i + 1,
                    total_steps: total,
                    sim_time_s: t,
                    fraction_complete: (i + 1) as f64 / total as f64,
                });
            }
        }

        debug!(steps = records.len(), "run completed");
        Ok(Trace {
            records,
            status: RunStatus::Completed,
        })
    }

    fn step(
        &self,
        state: &mut LoopState,
        reference: &ReferenceProfile,
        disturbances: &DisturbanceSet,
        t: f64,
        dt: f64,
    ) -> Result<TraceRecord, (InputKind, crate::profile::ProfileError)> {
        let v_ref = reference
            .eval(t)
            .map_err(|e| (InputKind::Reference, e))?;
        let error = v_ref - state.vehicle.velocity;

        let command = self.controller.update(&mut state.pid, error, dt);
        let engine_force = self.engine.update(&mut state.engine, command, dt);

        let disturbance_force = disturbances
            .total(t)
            .map_err(|(idx, e)| (InputKind::Disturbance(idx), e))?;

        let velocity = self
            .vehicle
            .update(&mut state.vehicle, engine_force, disturbance_force, dt);

        Ok(TraceRecord {
            time: t,
            reference: v_ref,
            velocity,
            error,
            command,
            engine_force,
            disturbance_force,
        })
    }
}

/// Validate `params` and run once.
pub fn run(
    params: &SystemParameters,
    reference: &ReferenceProfile,
    disturbances: &DisturbanceSet,
) -> SimResult<Trace> {
    Simulation::new(params.clone())?.run(reference, disturbances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TimeFn;
    use crate::providers;

    fn short_params() -> SystemParameters {
        SystemParameters {
            t_end: 1.0,
            ..SystemParameters::cruise_baseline()
        }
    }

    #[test]
    fn record_count_matches_grid() {
        let trace = run(
            &short_params(),
            &providers::constant(29.0),
            &DisturbanceSet::new(),
        )
        .unwrap();
        assert_eq!(trace.len(), 100);
        assert!(trace.is_complete());
        assert_eq!(trace.records[0].time, 0.0);
        assert_eq!(trace.records[99].time, 99.0 * 0.01);
    }

    #[test]
    fn first_record_follows_block_equations() {
        let trace = run(
            &short_params(),
            &providers::constant(29.0),
            &DisturbanceSet::new(),
        )
        .unwrap();
        let r0 = trace.records[0];
        assert_eq!(r0.error, 29.0);
        assert_eq!(r0.command, 1.0);
        // Engine: 0 + (500 - 0) * 0.01 / 0.5
        assert!((r0.engine_force - 10.0).abs() < 1e-12);
        // Vehicle: 0 + 10 / 1000 * 0.01
        assert!((r0.velocity - 1e-4).abs() < 1e-15);
    }

    #[test]
    fn initial_velocity_seeds_the_plant() {
        let params = SystemParameters {
            initial_velocity: 29.0,
            ..short_params()
        };
        let trace = run(&params, &providers::constant(29.0), &DisturbanceSet::new()).unwrap();
        assert_eq!(trace.records[0].error, 0.0);
    }

    #[test]
    fn config_error_runs_nothing() {
        let params = SystemParameters {
            engine_tau: 0.0,
            ..short_params()
        };
        let err = run(&params, &providers::constant(29.0), &DisturbanceSet::new()).unwrap_err();
        assert!(matches!(err, SimError::Config { .. }));
        assert!(err.partial_records().is_empty());
        assert_eq!(err.failed_step(), None);
    }

    #[test]
    fn huge_grid_is_a_config_error_not_a_panic() {
        for (dt, t_end) in [(1.0, 1e30), (1e-10, 1e300)] {
            let params = SystemParameters {
                dt,
                t_end,
                ..SystemParameters::cruise_baseline()
            };
            let err =
                run(&params, &providers::constant(29.0), &DisturbanceSet::new()).unwrap_err();
            assert!(matches!(err, SimError::Config { .. }), "{err:?}");
            assert!(err.partial_records().is_empty());
        }
    }

    #[test]
    fn reference_failure_keeps_partial_records() {
        let reference = TimeFn::try_new("short table", |t| {
            if t < 0.5 {
                Ok(29.0)
            } else {
                Err("no data".to_string())
            }
        });
        let err = run(&short_params(), &reference, &DisturbanceSet::new()).unwrap_err();
        match &err {
            SimError::Evaluation {
                step,
                input,
                partial,
                ..
            } => {
                assert_eq!(*step, 50);
                assert_eq!(*input, InputKind::Reference);
                assert_eq!(partial.len(), 50);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.failed_step(), Some(50));
    }

    #[test]
    fn disturbance_failure_names_index() {
        let disturbances = DisturbanceSet::new()
            .with(providers::wind(5.0))
            .with(TimeFn::new("broken", |t| if t > 0.2 { f64::NAN } else { 0.0 }));
        let err = run(&short_params(), &providers::constant(29.0), &disturbances).unwrap_err();
        match err {
            SimError::Evaluation { input, partial, .. } => {
                assert_eq!(input, InputKind::Disturbance(1));
                assert_eq!(partial.len(), 21);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unstable_tuning_reports_degeneracy() {
        // Huge command range and gains with a coarse step: the loop diverges.
        let params = SystemParameters {
            kp: 1e6,
            ki: 0.0,
            kd: 0.0,
            u_min: -1e300,
            u_max: 1e300,
            dt: 0.4,
            t_end: 400.0,
            engine_gain: 1e6,
            engine_tau: 0.1,
            ..SystemParameters::cruise_baseline()
        };
        let err = run(&params, &providers::constant(29.0), &DisturbanceSet::new()).unwrap_err();
        match err {
            SimError::NumericDegeneracy {
                step,
                record,
                partial,
                ..
            } => {
                assert_eq!(partial.len(), step);
                assert!(record.check_finite().is_err());
                assert!(partial.iter().all(|r| r.check_finite().is_ok()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancellation_returns_partial_trace() {
        let sim = Simulation::new(short_params()).unwrap();
        let cancel = AtomicBool::new(false);
        let mut seen = 0usize;
        let mut on_progress = |p: SimProgress| {
            seen = p.step;
            if p.step >= 30 {
                cancel.store(true, Ordering::Relaxed);
            }
        };
        let trace = sim
            .run_with_progress(
                &providers::constant(29.0),
                &DisturbanceSet::new(),
                Some(&cancel),
                Some(&mut on_progress),
            )
            .unwrap();
        assert_eq!(trace.status, RunStatus::Cancelled { at_step: 30 });
        assert_eq!(trace.len(), 30);
        assert_eq!(seen, 30);
    }

    #[test]
    fn progress_reaches_completion() {
        let sim = Simulation::new(short_params()).unwrap();
        let mut last = None;
        let mut on_progress = |p: SimProgress| last = Some(p);
        sim.run_with_progress(
            &providers::constant(29.0),
            &DisturbanceSet::new(),
            None,
            Some(&mut on_progress),
        )
        .unwrap();
        let last = last.unwrap();
        assert_eq!(last.step, 100);
        assert_eq!(last.fraction_complete, 1.0);
    }
}
