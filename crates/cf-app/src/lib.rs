//! Shared application service layer for cruiseflow.
//!
//! Centralizes scenario loading, compilation, run execution, tuning
//! comparison, metrics and export so frontends stay thin.

pub mod compare_service;
pub mod error;
pub mod export;
pub mod metrics;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod scenario_compile;

// Re-export key types for convenience
pub use compare_service::{CompareRequest, CompareResponse, TuningReport, compare_tunings};
pub use error::{AppError, AppResult};
pub use export::{CSV_HEADER, trace_to_csv, write_csv};
pub use metrics::{LoopMetrics, MetricsOptions, compute_loop_metrics};
pub use progress::{RunProgressEvent, RunStage, SimulationProgress};
pub use project_service::{
    PresetSummary, ScenarioSource, list_presets, load_scenario, resolve_scenario, save_scenario,
    validate_scenario,
};
pub use run_service::{
    RunRequest, RunResponse, RunTimingSummary, run_scenario, run_scenario_with_progress,
};
pub use scenario_compile::{CompiledScenario, compile_scenario};
