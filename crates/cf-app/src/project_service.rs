//! Scenario loading, saving, validation and preset listing.

use std::path::Path;

use cf_project::presets;
use cf_project::schema::ScenarioDef;

use crate::error::{AppError, AppResult};

/// Where a run's scenario comes from.
#[derive(Debug, Clone)]
pub enum ScenarioSource<'a> {
    Preset(&'a str),
    File(&'a Path),
    Inline(ScenarioDef),
}

/// Summary of a preset for listing.
#[derive(Debug, Clone)]
pub struct PresetSummary {
    pub name: String,
    pub description: String,
    pub mass_kg: f64,
    pub t_end_s: f64,
    pub disturbance_count: usize,
}

/// Load, migrate and validate a scenario from a YAML file.
pub fn load_scenario(path: &Path) -> AppResult<ScenarioDef> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(cf_project::from_yaml_str(&content)?)
}

/// Validate and save a scenario to a YAML file.
pub fn save_scenario(path: &Path, scenario: &ScenarioDef) -> AppResult<()> {
    let content = cf_project::to_yaml_string(scenario)?;
    std::fs::write(path, content).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

pub fn validate_scenario(scenario: &ScenarioDef) -> AppResult<()> {
    cf_project::validate_scenario(scenario)?;
    Ok(())
}

pub fn resolve_scenario(source: &ScenarioSource<'_>) -> AppResult<ScenarioDef> {
    match source {
        ScenarioSource::Preset(name) => Ok(cf_project::load_preset(name)?),
        ScenarioSource::File(path) => load_scenario(path),
        ScenarioSource::Inline(def) => {
            validate_scenario(def)?;
            Ok(def.clone())
        }
    }
}

/// All built-in presets in display order.
pub fn list_presets() -> Vec<PresetSummary> {
    presets::PRESET_NAMES
        .iter()
        .filter_map(|name| presets::preset(name))
        .map(|s| PresetSummary {
            description: s.description.clone().unwrap_or_default(),
            mass_kg: s.vehicle.mass_kg,
            t_end_s: s.timing.t_end_s,
            disturbance_count: s.disturbances.len(),
            name: s.name,
        })
        .collect()
}
