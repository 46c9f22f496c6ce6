//! Integration tests for tuning comparison and CSV export.

use cf_app::{
    CSV_HEADER, CompareRequest, MetricsOptions, RunRequest, ScenarioSource, compare_tunings,
    run_scenario, trace_to_csv, write_csv,
};
use cf_project::presets;
use cf_project::schema::TuningDef;

fn short_baseline() -> cf_project::ScenarioDef {
    let mut def = presets::baseline();
    def.timing.t_end_s = 20.0;
    def
}

#[test]
fn stock_tunings_are_compared_in_order() {
    let request = CompareRequest {
        source: ScenarioSource::Inline(short_baseline()),
        tunings: None,
        metrics: MetricsOptions::default(),
    };
    let response = compare_tunings(&request).unwrap();

    let names: Vec<_> = response.reports.iter().map(|r| r.tuning.name.as_str()).collect();
    assert_eq!(names, ["conservative", "balanced", "aggressive"]);
    assert!(response.reports.iter().all(|r| r.succeeded()));

    // Saturated from the start, so every tuning drives the car identically.
    let speeds: Vec<f64> = response
        .reports
        .iter()
        .map(|r| r.final_speed.unwrap())
        .collect();
    assert!(speeds.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9));
}

#[test]
fn failing_tuning_is_reported_not_propagated() {
    let request = CompareRequest {
        source: ScenarioSource::Inline(short_baseline()),
        tunings: Some(vec![
            TuningDef {
                name: "balanced".to_string(),
                kp: 800.0,
                ki: 40.0,
                kd: 40.0,
            },
            TuningDef {
                name: "broken".to_string(),
                kp: f64::NAN,
                ki: 0.0,
                kd: 0.0,
            },
        ]),
        metrics: MetricsOptions::default(),
    };
    let response = compare_tunings(&request).unwrap();

    assert_eq!(response.reports.len(), 2);
    assert!(response.reports[0].succeeded());
    assert!(response.reports[0].metrics.is_some());
    let broken = &response.reports[1];
    assert!(!broken.succeeded());
    assert!(broken.metrics.is_none());
    assert_eq!(broken.partial_records, 0);
}

#[test]
fn csv_export_matches_trace() {
    let response = run_scenario(&RunRequest::new(ScenarioSource::Inline(short_baseline()))).unwrap();
    let csv = trace_to_csv(&response.trace.records);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(csv.lines().count(), response.trace.len() + 1);

    let first: Vec<f64> = lines
        .next()
        .unwrap()
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    let r0 = response.trace.records[0];
    assert_eq!(
        first,
        vec![
            r0.time,
            r0.reference,
            r0.velocity,
            r0.error,
            r0.command,
            r0.engine_force,
            r0.disturbance_force
        ]
    );

    let path = std::env::temp_dir().join("cf_app_export.csv");
    write_csv(&path, &response.trace.records).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);
}
