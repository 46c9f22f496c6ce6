//! Progress events emitted while a scenario runs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingScenario,
    CompilingScenario,
    Simulating,
    ComputingMetrics,
    Completed,
    Cancelled,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingScenario => "loading",
            RunStage::CompilingScenario => "compiling",
            RunStage::Simulating => "simulating",
            RunStage::ComputingMetrics => "metrics",
            RunStage::Completed => "done",
            RunStage::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub total_steps: usize,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            simulation: None,
        }
    }

    pub fn with_simulation(mut self, simulation: Option<SimulationProgress>) -> Self {
        self.simulation = simulation;
        self
    }
}
