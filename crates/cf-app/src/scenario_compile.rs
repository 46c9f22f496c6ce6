//! Scenario compilation: turn a scenario definition into engine inputs.

use cf_project::schema::{DisturbanceDef, ReferenceDef, ScenarioDef, TuningDef};
use cf_sim::{DisturbanceSet, ReferenceProfile, SystemParameters, TimeFn, Tuning, providers};

use crate::error::AppResult;

/// Everything one run needs, checked and ready to simulate.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub name: String,
    pub params: SystemParameters,
    pub reference: ReferenceProfile,
    pub disturbances: DisturbanceSet,
    /// Scenario tunings, or the stock sets if the scenario names none.
    pub tunings: Vec<Tuning>,
}

/// Compile a scenario definition.
///
/// Parameter invariants are checked here, so a compiled scenario never fails
/// with a configuration error once it is run.
pub fn compile_scenario(def: &ScenarioDef) -> AppResult<CompiledScenario> {
    let params = build_parameters(def);
    params.validate()?;

    let reference = build_reference(&def.reference);
    let disturbances = def
        .disturbances
        .iter()
        .map(|d| build_disturbance(d, params.mass))
        .collect::<DisturbanceSet>();

    let tunings = if def.tunings.is_empty() {
        cf_project::presets::stock_tunings()
    } else {
        def.tunings.clone()
    };

    tracing::debug!(
        scenario = %def.name,
        reference = reference.name(),
        disturbances = disturbances.len(),
        "compiled scenario"
    );

    Ok(CompiledScenario {
        name: def.name.clone(),
        params,
        reference,
        disturbances,
        tunings: tunings.iter().map(build_tuning).collect(),
    })
}

pub fn build_parameters(def: &ScenarioDef) -> SystemParameters {
    SystemParameters {
        mass: def.vehicle.mass_kg,
        drag: def.vehicle.drag_n_s_per_m,
        engine_gain: def.engine.gain_n,
        engine_tau: def.engine.tau_s,
        kp: def.controller.kp,
        ki: def.controller.ki,
        kd: def.controller.kd,
        u_min: def.controller.u_min,
        u_max: def.controller.u_max,
        dt: def.timing.dt_s,
        t_end: def.timing.t_end_s,
        initial_velocity: def.vehicle.initial_speed_mps,
    }
}

pub fn build_reference(def: &ReferenceDef) -> ReferenceProfile {
    match def {
        ReferenceDef::Constant { speed_mps } => providers::constant(*speed_mps),
        ReferenceDef::Step {
            initial_mps,
            final_mps,
            at_s,
        } => providers::step(*initial_mps, *final_mps, *at_s),
        ReferenceDef::Piecewise {
            initial_mps,
            segments,
        } => providers::piecewise(
            *initial_mps,
            segments.iter().map(|s| (s.from_s, s.speed_mps)).collect(),
        ),
    }
}

/// Grade forces scale with the scenario's vehicle mass.
pub fn build_disturbance(def: &DisturbanceDef, mass_kg: f64) -> TimeFn {
    match def {
        DisturbanceDef::RoadGrade {
            grade_deg,
            start_s,
            end_s,
        } => providers::road_grade(*grade_deg, mass_kg, *start_s, *end_s),
        DisturbanceDef::Wind { speed_mps } => providers::wind(*speed_mps),
        DisturbanceDef::WindGust {
            base_mps,
            amplitude_mps,
            omega_rad_s,
        } => providers::wind_gust(*base_mps, *amplitude_mps, *omega_rad_s),
    }
}

fn build_tuning(def: &TuningDef) -> Tuning {
    Tuning::new(def.name.clone(), def.kp, def.ki, def.kd)
}
