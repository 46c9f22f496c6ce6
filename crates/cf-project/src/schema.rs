//! Scenario schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    /// Missing in files written before versioning; read as 0 and migrated.
    #[serde(default)]
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub vehicle: VehicleDef,
    pub engine: EngineDef,
    pub controller: ControllerDef,
    pub timing: TimingDef,
    pub reference: ReferenceDef,
    #[serde(default)]
    pub disturbances: Vec<DisturbanceDef>,
    /// Gain sets for tuning comparisons. Empty means the stock sets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tunings: Vec<TuningDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleDef {
    pub mass_kg: f64,
    pub drag_n_s_per_m: f64,
    #[serde(default)]
    pub initial_speed_mps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineDef {
    /// Force at full command.
    pub gain_n: f64,
    pub tau_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerDef {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    #[serde(default)]
    pub u_min: f64,
    #[serde(default = "default_u_max")]
    pub u_max: f64,
}

fn default_u_max() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingDef {
    pub dt_s: f64,
    pub t_end_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ReferenceDef {
    Constant {
        speed_mps: f64,
    },
    Step {
        initial_mps: f64,
        final_mps: f64,
        at_s: f64,
    },
    Piecewise {
        initial_mps: f64,
        #[serde(default)]
        segments: Vec<SegmentDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub from_s: f64,
    pub speed_mps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DisturbanceDef {
    /// Slope angle in degrees; positive is uphill.
    RoadGrade {
        grade_deg: f64,
        #[serde(default)]
        start_s: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_s: Option<f64>,
    },
    Wind {
        speed_mps: f64,
    },
    WindGust {
        base_mps: f64,
        amplitude_mps: f64,
        omega_rad_s: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TuningDef {
    pub name: String,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}
