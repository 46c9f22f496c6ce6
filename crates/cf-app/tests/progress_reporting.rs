//! Integration tests for shared run progress and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use cf_app::{
    RunProgressEvent, RunRequest, RunStage, ScenarioSource, run_scenario_with_progress,
};
use cf_sim::RunStatus;

#[test]
fn stages_are_reported_in_order() {
    let request = RunRequest::new(ScenarioSource::Preset("speed_change"));
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let response =
        run_scenario_with_progress(&request, None, Some(&mut |e| events.push(e))).unwrap();

    assert!(response.trace.is_complete());
    assert!(matches!(events.first().unwrap().stage, RunStage::LoadingScenario));
    assert!(matches!(events.last().unwrap().stage, RunStage::Completed));

    let sim_events: Vec<_> = events
        .iter()
        .filter_map(|e| e.simulation.as_ref())
        .collect();
    assert!(!sim_events.is_empty());
    assert!(
        sim_events
            .windows(2)
            .all(|w| w[0].fraction_complete <= w[1].fraction_complete)
    );
    let last = sim_events.last().unwrap();
    assert_eq!(last.step, last.total_steps);
    assert_eq!(last.t_end_s, 100.0);

    assert!(
        events
            .windows(2)
            .all(|w| w[0].elapsed_wall_s <= w[1].elapsed_wall_s)
    );
    assert!(response.timing.total_time_s >= response.timing.simulate_time_s);
}

#[test]
fn cancellation_keeps_partial_trace() {
    let request = RunRequest::new(ScenarioSource::Preset("baseline"));
    let cancel = AtomicBool::new(false);
    let mut stages = Vec::new();
    let mut on_event = |e: RunProgressEvent| {
        if let Some(sim) = &e.simulation
            && sim.fraction_complete >= 0.25
        {
            cancel.store(true, Ordering::Relaxed);
        }
        stages.push(e.stage);
    };

    let response = run_scenario_with_progress(&request, Some(&cancel), Some(&mut on_event)).unwrap();

    assert!(matches!(response.trace.status, RunStatus::Cancelled { .. }));
    assert_eq!(response.trace.len(), 2500);
    assert_eq!(stages.last(), Some(&RunStage::Cancelled));
    assert!(response.metrics.steady_state_error.is_some());
}
