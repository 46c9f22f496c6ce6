//! Error types for the cf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives the CLI one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Project(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown preset: {0}")]
    PresetNotFound(String),

    #[error("Simulation error: {0}")]
    Simulation(#[from] cf_sim::SimError),
}

impl AppError {
    /// Records a failed run produced before it stopped.
    pub fn partial_records(&self) -> &[cf_sim::TraceRecord] {
        match self {
            AppError::Simulation(err) => err.partial_records(),
            _ => &[],
        }
    }
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        match err {
            cf_project::ProjectError::UnknownPreset { name } => AppError::PresetNotFound(name),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<cf_project::ValidationError> for AppError {
    fn from(err: cf_project::ValidationError) -> Self {
        AppError::Project(err.to_string())
    }
}
