//! Built-in scenarios and gain sets.
//!
//! Speeds are in m/s; 29 m/s is roughly 65 mph.

use crate::LATEST_VERSION;
use crate::schema::*;

pub const PRESET_NAMES: &[&str] = &[
    "baseline",
    "hill",
    "speed_change",
    "light_car",
    "light_car_speed_up",
    "light_car_hill",
    "multi_disturbance",
    "highway_suv",
];

/// Look up a preset by name.
pub fn preset(name: &str) -> Option<ScenarioDef> {
    let scenario = match name {
        "baseline" => baseline(),
        "hill" => hill(),
        "speed_change" => speed_change(),
        "light_car" => light_car(),
        "light_car_speed_up" => light_car_speed_up(),
        "light_car_hill" => light_car_hill(),
        "multi_disturbance" => multi_disturbance(),
        "highway_suv" => highway_suv(),
        _ => return None,
    };
    Some(scenario)
}

/// Conservative, balanced and aggressive gains for the mid-size car.
pub fn stock_tunings() -> Vec<TuningDef> {
    vec![
        tuning("conservative", 400.0, 20.0, 30.0),
        tuning("balanced", 800.0, 40.0, 40.0),
        tuning("aggressive", 1200.0, 60.0, 80.0),
    ]
}

fn tuning(name: &str, kp: f64, ki: f64, kd: f64) -> TuningDef {
    TuningDef {
        name: name.to_string(),
        kp,
        ki,
        kd,
    }
}

/// Mid-size car holding 29 m/s on a flat road.
pub fn baseline() -> ScenarioDef {
    ScenarioDef {
        version: LATEST_VERSION,
        name: "baseline".to_string(),
        description: Some("Mid-size car, constant 29 m/s, flat road".to_string()),
        vehicle: VehicleDef {
            mass_kg: 1000.0,
            drag_n_s_per_m: 50.0,
            initial_speed_mps: 0.0,
        },
        engine: EngineDef {
            gain_n: 500.0,
            tau_s: 0.5,
        },
        controller: ControllerDef {
            kp: 800.0,
            ki: 40.0,
            kd: 40.0,
            u_min: 0.0,
            u_max: 1.0,
        },
        timing: TimingDef {
            dt_s: 0.01,
            t_end_s: 100.0,
        },
        reference: ReferenceDef::Constant { speed_mps: 29.0 },
        disturbances: Vec::new(),
        tunings: Vec::new(),
    }
}

/// Baseline with a 5 degree climb from t = 50 s.
pub fn hill() -> ScenarioDef {
    ScenarioDef {
        name: "hill".to_string(),
        description: Some("Baseline with a 5 deg climb from 50 s".to_string()),
        disturbances: vec![DisturbanceDef::RoadGrade {
            grade_deg: 5.0,
            start_s: 50.0,
            end_s: None,
        }],
        ..baseline()
    }
}

/// Set-point change from 20 to 30 m/s at t = 30 s.
pub fn speed_change() -> ScenarioDef {
    ScenarioDef {
        name: "speed_change".to_string(),
        description: Some("Step from 20 to 30 m/s at 30 s".to_string()),
        reference: ReferenceDef::Step {
            initial_mps: 20.0,
            final_mps: 30.0,
            at_s: 30.0,
        },
        ..baseline()
    }
}

/// Lighter compact car with firmer gains.
pub fn light_car() -> ScenarioDef {
    let base = baseline();
    ScenarioDef {
        name: "light_car".to_string(),
        description: Some("Compact car, constant 24.6 m/s".to_string()),
        vehicle: VehicleDef {
            mass_kg: 800.0,
            ..base.vehicle
        },
        controller: ControllerDef {
            kp: 1000.0,
            ki: 50.0,
            kd: 60.0,
            ..base.controller
        },
        timing: TimingDef {
            t_end_s: 150.0,
            ..base.timing
        },
        reference: ReferenceDef::Constant { speed_mps: 24.6 },
        ..base
    }
}

pub fn light_car_speed_up() -> ScenarioDef {
    ScenarioDef {
        name: "light_car_speed_up".to_string(),
        description: Some("Compact car, 24.6 to 31.3 m/s at 60 s".to_string()),
        reference: ReferenceDef::Step {
            initial_mps: 24.6,
            final_mps: 31.3,
            at_s: 60.0,
        },
        ..light_car()
    }
}

pub fn light_car_hill() -> ScenarioDef {
    ScenarioDef {
        name: "light_car_hill".to_string(),
        description: Some("Compact car, 8 deg climb from 40 s".to_string()),
        disturbances: vec![DisturbanceDef::RoadGrade {
            grade_deg: 8.0,
            start_s: 40.0,
            end_s: None,
        }],
        ..light_car()
    }
}

/// Compact car facing a climb and a steady headwind together.
pub fn multi_disturbance() -> ScenarioDef {
    ScenarioDef {
        name: "multi_disturbance".to_string(),
        description: Some("Compact car, 3 deg climb from 30 s plus 10 m/s headwind".to_string()),
        disturbances: vec![
            DisturbanceDef::RoadGrade {
                grade_deg: 3.0,
                start_s: 30.0,
                end_s: None,
            },
            DisturbanceDef::Wind { speed_mps: 10.0 },
        ],
        ..light_car()
    }
}

/// Heavy SUV on a varied highway drive: rolling hills, gusting wind and a
/// changing speed schedule.
pub fn highway_suv() -> ScenarioDef {
    ScenarioDef {
        version: LATEST_VERSION,
        name: "highway_suv".to_string(),
        description: Some("SUV on rolling highway with gusts and speed changes".to_string()),
        vehicle: VehicleDef {
            mass_kg: 2000.0,
            drag_n_s_per_m: 80.0,
            initial_speed_mps: 0.0,
        },
        engine: EngineDef {
            gain_n: 500.0,
            tau_s: 0.5,
        },
        controller: ControllerDef {
            kp: 600.0,
            ki: 30.0,
            kd: 50.0,
            u_min: 0.0,
            u_max: 1.0,
        },
        timing: TimingDef {
            dt_s: 0.01,
            t_end_s: 200.0,
        },
        reference: ReferenceDef::Piecewise {
            initial_mps: 31.3,
            segments: vec![
                SegmentDef {
                    from_s: 40.0,
                    speed_mps: 26.8,
                },
                SegmentDef {
                    from_s: 60.0,
                    speed_mps: 31.3,
                },
                SegmentDef {
                    from_s: 140.0,
                    speed_mps: 35.8,
                },
            ],
        },
        disturbances: vec![
            DisturbanceDef::RoadGrade {
                grade_deg: 2.0,
                start_s: 50.0,
                end_s: Some(80.0),
            },
            DisturbanceDef::RoadGrade {
                grade_deg: -3.0,
                start_s: 80.0,
                end_s: Some(100.0),
            },
            DisturbanceDef::RoadGrade {
                grade_deg: 4.0,
                start_s: 120.0,
                end_s: Some(150.0),
            },
            DisturbanceDef::WindGust {
                base_mps: 5.0,
                amplitude_mps: 3.0,
                omega_rad_s: 0.1,
            },
        ],
        tunings: Vec::new(),
    }
}
