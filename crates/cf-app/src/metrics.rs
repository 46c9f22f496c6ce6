//! Control loop performance metrics.
//!
//! Computes rise time, settling time, overshoot and steady-state error from a
//! speed trace. Targets are taken from the final reference value, so a step
//! scenario is judged against the speed it ends at.

use cf_sim::{Trace, TraceRecord};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for [`compute_loop_metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsOptions {
    /// Half-width of the settling band around the final reference (m/s).
    pub settle_band_mps: f64,
    /// Length of the trailing window averaged for the final speed (s).
    pub final_window_s: f64,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            settle_band_mps: 0.5,
            final_window_s: 10.0,
        }
    }
}

/// Standard control loop performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoopMetrics {
    /// Time for speed to cover 10% of the way to the final reference (s)
    pub rise_time_10_s: Option<f64>,
    /// Time for speed to cover 90% of the way to the final reference (s)
    pub rise_time_90_s: Option<f64>,
    /// Time after which speed stays inside the settling band (s)
    pub settling_time_s: Option<f64>,
    /// Peak overshoot in percent of the final reference
    pub overshoot_pct: Option<f64>,
    /// Final reference minus final speed (m/s)
    pub steady_state_error: Option<f64>,
    /// Mean speed over the trailing window (m/s)
    pub final_mean_speed: Option<f64>,
    /// Largest command issued
    pub max_command: Option<f64>,
    /// Percent of steps with the command at its upper bound
    pub saturation_pct_upper: Option<f64>,
}

impl LoopMetrics {
    /// Returns true if at least some metrics were computed
    pub fn has_data(&self) -> bool {
        self.rise_time_10_s.is_some()
            || self.rise_time_90_s.is_some()
            || self.settling_time_s.is_some()
            || self.overshoot_pct.is_some()
            || self.steady_state_error.is_some()
    }
}

/// Compute metrics for one run.
///
/// `u_max` is the controller's upper command bound, used for the saturation
/// percentage. An empty trace yields all-`None` metrics.
pub fn compute_loop_metrics(trace: &Trace, u_max: f64, options: &MetricsOptions) -> LoopMetrics {
    let (Some(first), Some(last)) = (trace.records.first(), trace.records.last()) else {
        return LoopMetrics::default();
    };

    let speed = trace.series(|r| r.velocity);
    let final_reference = last.reference;
    // Speed before the first plant update.
    let initial_speed = first.reference - first.error;

    let mut metrics = LoopMetrics {
        steady_state_error: Some(final_reference - last.velocity),
        final_mean_speed: final_window_mean(&trace.records, options.final_window_s),
        ..LoopMetrics::default()
    };

    if (final_reference - initial_speed).abs() > 1e-6 {
        metrics.rise_time_10_s =
            compute_time_to_percentage(&speed, initial_speed, final_reference, 0.1);
        metrics.rise_time_90_s =
            compute_time_to_percentage(&speed, initial_speed, final_reference, 0.9);
    }

    if final_reference.abs() > 1e-6 {
        let peak = speed
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        let overshoot = (peak - final_reference) / final_reference.abs() * 100.0;
        if overshoot > 0.0 {
            metrics.overshoot_pct = Some(overshoot);
        }
    }

    metrics.settling_time_s =
        compute_settling_time(&speed, final_reference, options.settle_band_mps);

    metrics.max_command = trace
        .records
        .iter()
        .map(|r| r.command)
        .max_by(|a, b| a.total_cmp(b));
    metrics.saturation_pct_upper = Some(compute_saturation_pct(&trace.records, u_max));

    metrics
}

/// Compute time at which output reaches a percentage of the way from
/// `initial` to `final_val`. Percentage is 0.0..1.0 (e.g., 0.1 = 10%).
fn compute_time_to_percentage(
    series: &[(f64, f64)],
    initial: f64,
    final_val: f64,
    pct: f64,
) -> Option<f64> {
    let change = final_val - initial;
    if change.abs() < 1e-9 {
        return None;
    }

    let target = initial + pct * change;
    let looking_above = change > 0.0;

    for (i, (time, val)) in series.iter().enumerate() {
        let reached = if looking_above {
            *val >= target
        } else {
            *val <= target
        };

        if reached {
            if i == 0 {
                return Some(*time);
            }
            // Linear interpolation between last two points
            let (prev_time, prev_val) = series[i - 1];
            let delta_v = val - prev_val;
            if delta_v.abs() > 1e-9 {
                let frac = (target - prev_val) / delta_v;
                return Some(prev_time + frac * (time - prev_time));
            }
            return Some(*time);
        }
    }

    None
}

/// Time at which output enters the band `target ± band` for the last time
/// and stays there until the end of the series. Band edges count as outside.
fn compute_settling_time(series: &[(f64, f64)], target: f64, band: f64) -> Option<f64> {
    let mut entry: Option<f64> = None;

    for (time, val) in series {
        let in_band = (val - target).abs() < band;
        match (in_band, entry) {
            (true, None) => entry = Some(*time),
            (false, Some(_)) => entry = None,
            _ => {}
        }
    }

    entry
}

/// Mean speed over records with `time >= last_time - window`.
fn final_window_mean(records: &[TraceRecord], window: f64) -> Option<f64> {
    let last_time = records.last()?.time;
    let start = last_time - window;
    let (sum, count) = records
        .iter()
        .rev()
        .take_while(|r| r.time >= start)
        .fold((0.0, 0usize), |(sum, n), r| (sum + r.velocity, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Percent of steps whose command sits at `u_max`.
///
/// Commands are held for a whole step, so counting steps is exact on the
/// fixed grid.
fn compute_saturation_pct(records: &[TraceRecord], u_max: f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let threshold = u_max - 1e-9 * u_max.abs().max(1.0);
    let saturated = records.iter().filter(|r| r.command >= threshold).count();
    saturated as f64 / records.len() as f64 * 100.0
}
