//! Stock reference profiles and disturbance forces.
//!
//! All providers are stateless closures over their parameters. Sign
//! convention for forces: positive pushes the vehicle forward.

use cf_core::constants::G0_MPS2;
use cf_core::sin_deg;

use crate::profile::TimeFn;

/// Lumped `0.5 * rho * Cd * A` used for headwind drag (kg/m).
pub const WIND_DRAG_COEFF: f64 = 0.6;

/// Same speed at every time.
pub fn constant(speed: f64) -> TimeFn {
    TimeFn::constant(speed)
}

/// `initial` before `at`, `final_speed` from `at` onwards.
pub fn step(initial: f64, final_speed: f64, at: f64) -> TimeFn {
    TimeFn::new(
        format!("step({} -> {} at {} s)", initial, final_speed, at),
        move |t| if t >= at { final_speed } else { initial },
    )
}

/// Speed schedule: `initial` until the first breakpoint, then the value of
/// the latest breakpoint whose start time has been reached.
///
/// Breakpoints are `(from_time, speed)` and need not be sorted.
pub fn piecewise(initial: f64, breakpoints: Vec<(f64, f64)>) -> TimeFn {
    let mut points = breakpoints;
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let name = format!("piecewise({} segments)", points.len() + 1);
    TimeFn::new(name, move |t| {
        points
            .iter()
            .rev()
            .find(|(from, _)| t >= *from)
            .map(|(_, v)| *v)
            .unwrap_or(initial)
    })
}

/// Gravity component along a slope of `grade_deg` degrees, active in
/// `[start, end)`. Positive grades are uphill and produce a retarding force.
pub fn road_grade(grade_deg: f64, mass: f64, start: f64, end: Option<f64>) -> TimeFn {
    let force = -mass * G0_MPS2 * sin_deg(grade_deg);
    let name = match end {
        Some(end) => format!("grade({} deg, {}..{} s)", grade_deg, start, end),
        None => format!("grade({} deg from {} s)", grade_deg, start),
    };
    TimeFn::new(name, move |t| {
        let active = t >= start && end.is_none_or(|end| t < end);
        if active { force } else { 0.0 }
    })
}

/// Steady headwind of `speed` m/s.
pub fn wind(speed: f64) -> TimeFn {
    let force = -WIND_DRAG_COEFF * speed * speed;
    TimeFn::new(format!("wind({} m/s)", speed), move |_| force)
}

/// Headwind oscillating as `base + amplitude * sin(omega * t)`.
pub fn wind_gust(base: f64, amplitude: f64, omega: f64) -> TimeFn {
    TimeFn::new(
        format!("gust({} ± {} m/s)", base, amplitude),
        move |t| {
            let w = base + amplitude * (omega * t).sin();
            -WIND_DRAG_COEFF * w * w
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_switches_at_boundary() {
        let r = step(20.0, 30.0, 30.0);
        assert_eq!(r.eval(29.99).unwrap(), 20.0);
        assert_eq!(r.eval(30.0).unwrap(), 30.0);
        assert_eq!(r.eval(90.0).unwrap(), 30.0);
    }

    #[test]
    fn piecewise_highway_schedule() {
        let r = piecewise(31.3, vec![(140.0, 35.8), (40.0, 26.8), (60.0, 31.3)]);
        assert_eq!(r.eval(0.0).unwrap(), 31.3);
        assert_eq!(r.eval(40.0).unwrap(), 26.8);
        assert_eq!(r.eval(59.9).unwrap(), 26.8);
        assert_eq!(r.eval(60.0).unwrap(), 31.3);
        assert_eq!(r.eval(150.0).unwrap(), 35.8);
    }

    #[test]
    fn grade_only_inside_window() {
        let g = road_grade(5.0, 1000.0, 50.0, None);
        assert_eq!(g.eval(49.0).unwrap(), 0.0);
        let f = g.eval(50.0).unwrap();
        let expected = -1000.0 * G0_MPS2 * (5.0_f64.to_radians()).sin();
        assert!((f - expected).abs() < 1e-9);
        assert!(f < 0.0);

        let windowed = road_grade(-3.0, 2000.0, 80.0, Some(100.0));
        assert!(windowed.eval(90.0).unwrap() > 0.0);
        assert_eq!(windowed.eval(100.0).unwrap(), 0.0);
    }

    #[test]
    fn headwind_drag() {
        let w = wind(10.0);
        assert!((w.eval(0.0).unwrap() + 60.0).abs() < 1e-12);
        assert_eq!(w.eval(0.0).unwrap(), w.eval(500.0).unwrap());
    }

    #[test]
    fn gust_reduces_to_wind_without_amplitude() {
        let g = wind_gust(5.0, 0.0, 0.1);
        assert!((g.eval(12.3).unwrap() - wind(5.0).eval(0.0).unwrap()).abs() < 1e-12);

        let g = wind_gust(5.0, 3.0, 0.1);
        let peak = g.eval(std::f64::consts::PI / 2.0 / 0.1).unwrap();
        assert!((peak + 0.6 * 64.0).abs() < 1e-9);
    }
}
