//! Scenario validation logic.

use crate::schema::{DisturbanceDef, ReferenceDef, ScenarioDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

pub fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    if scenario.version != crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }

    let vehicle = &scenario.vehicle;
    positive("vehicle.mass_kg", vehicle.mass_kg)?;
    finite("vehicle.drag_n_s_per_m", vehicle.drag_n_s_per_m)?;
    if vehicle.drag_n_s_per_m < 0.0 {
        return Err(invalid(
            "vehicle.drag_n_s_per_m",
            vehicle.drag_n_s_per_m,
            "must be non-negative",
        ));
    }
    finite("vehicle.initial_speed_mps", vehicle.initial_speed_mps)?;

    finite("engine.gain_n", scenario.engine.gain_n)?;
    positive("engine.tau_s", scenario.engine.tau_s)?;

    let ctrl = &scenario.controller;
    finite("controller.kp", ctrl.kp)?;
    finite("controller.ki", ctrl.ki)?;
    finite("controller.kd", ctrl.kd)?;
    finite("controller.u_min", ctrl.u_min)?;
    finite("controller.u_max", ctrl.u_max)?;
    if ctrl.u_min >= ctrl.u_max {
        return Err(invalid(
            "controller.u_min",
            ctrl.u_min,
            "must be less than controller.u_max",
        ));
    }

    let timing = &scenario.timing;
    positive("timing.dt_s", timing.dt_s)?;
    positive("timing.t_end_s", timing.t_end_s)?;
    if timing.dt_s > timing.t_end_s {
        return Err(invalid(
            "timing.dt_s",
            timing.dt_s,
            "must not exceed timing.t_end_s",
        ));
    }

    validate_reference(&scenario.reference)?;
    for (idx, dist) in scenario.disturbances.iter().enumerate() {
        validate_disturbance(idx, dist)?;
    }

    let mut tuning_names = HashSet::new();
    for tuning in &scenario.tunings {
        if !tuning_names.insert(&tuning.name) {
            return Err(ValidationError::DuplicateId {
                id: tuning.name.clone(),
                context: "tunings".to_string(),
            });
        }
        finite("tunings.kp", tuning.kp)?;
        finite("tunings.ki", tuning.ki)?;
        finite("tunings.kd", tuning.kd)?;
    }

    Ok(())
}

fn validate_reference(reference: &ReferenceDef) -> Result<(), ValidationError> {
    match reference {
        ReferenceDef::Constant { speed_mps } => finite("reference.speed_mps", *speed_mps),
        ReferenceDef::Step {
            initial_mps,
            final_mps,
            at_s,
        } => {
            finite("reference.initial_mps", *initial_mps)?;
            finite("reference.final_mps", *final_mps)?;
            finite("reference.at_s", *at_s)
        }
        ReferenceDef::Piecewise {
            initial_mps,
            segments,
        } => {
            finite("reference.initial_mps", *initial_mps)?;
            let mut starts = HashSet::new();
            for seg in segments {
                finite("reference.segments.from_s", seg.from_s)?;
                finite("reference.segments.speed_mps", seg.speed_mps)?;
                if !starts.insert(seg.from_s.to_bits()) {
                    return Err(ValidationError::DuplicateId {
                        id: seg.from_s.to_string(),
                        context: "reference segment start times".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn validate_disturbance(idx: usize, dist: &DisturbanceDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("disturbances[{}].{}", idx, name);
    match dist {
        DisturbanceDef::RoadGrade {
            grade_deg,
            start_s,
            end_s,
        } => {
            finite(&field("grade_deg"), *grade_deg)?;
            if grade_deg.abs() >= 90.0 {
                return Err(invalid(
                    &field("grade_deg"),
                    grade_deg,
                    "must be between -90 and 90 degrees",
                ));
            }
            finite(&field("start_s"), *start_s)?;
            if let Some(end) = end_s {
                finite(&field("end_s"), *end)?;
                if end <= start_s {
                    return Err(invalid(&field("end_s"), end, "must be after start_s"));
                }
            }
            Ok(())
        }
        DisturbanceDef::Wind { speed_mps } => finite(&field("speed_mps"), *speed_mps),
        DisturbanceDef::WindGust {
            base_mps,
            amplitude_mps,
            omega_rad_s,
        } => {
            finite(&field("base_mps"), *base_mps)?;
            finite(&field("amplitude_mps"), *amplitude_mps)?;
            finite(&field("omega_rad_s"), *omega_rad_s)
        }
    }
}
