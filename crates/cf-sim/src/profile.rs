//! Function-of-time inputs: reference speed and disturbance forces.
//!
//! Every input is a [`TimeFn`]. A constant is just a function that ignores
//! its argument, so the engine never branches on "number or function".

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Failure while evaluating an input function.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("{name} returned non-finite value {value} at t = {t} s")]
    NonFinite { name: String, t: f64, value: f64 },

    #[error("{name} is undefined at t = {t} s: {message}")]
    Undefined {
        name: String,
        t: f64,
        message: String,
    },
}

type EvalFn = dyn Fn(f64) -> Result<f64, String> + Send + Sync;

/// A named scalar function of simulation time.
///
/// Cheap to clone (shared `Arc`) and `Send + Sync`, so one profile can feed
/// many runs on different threads.
#[derive(Clone)]
pub struct TimeFn {
    name: Arc<str>,
    f: Arc<EvalFn>,
}

/// Desired speed (m/s) as a function of time.
pub type ReferenceProfile = TimeFn;

impl TimeFn {
    /// Wrap a total function.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::try_new(name, move |t| Ok(f(t)))
    }

    /// Wrap a function that may refuse some times.
    pub fn try_new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(f64) -> Result<f64, String> + Send + Sync + 'static,
    {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            f: Arc::new(f),
        }
    }

    /// Function that returns `value` at every time.
    pub fn constant(value: f64) -> Self {
        Self::new(format!("constant({})", value), move |_| value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate at `t`. Errors and non-finite results both fail.
    pub fn eval(&self, t: f64) -> Result<f64, ProfileError> {
        let value = (self.f)(t).map_err(|message| ProfileError::Undefined {
            name: self.name.to_string(),
            t,
            message,
        })?;
        if !value.is_finite() {
            return Err(ProfileError::NonFinite {
                name: self.name.to_string(),
                t,
                value,
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for TimeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimeFn").field(&self.name).finish()
    }
}

impl From<f64> for TimeFn {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

/// Ordered collection of disturbance forces; the effective force is the sum.
#[derive(Clone, Debug, Default)]
pub struct DisturbanceSet {
    items: Vec<TimeFn>,
}

impl DisturbanceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, f: TimeFn) {
        self.items.push(f);
    }

    /// Builder-style push.
    pub fn with(mut self, f: TimeFn) -> Self {
        self.push(f);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeFn> {
        self.items.iter()
    }

    /// Sum of all forces at `t` (0 for an empty set).
    ///
    /// On failure returns the index of the offending function.
    pub fn total(&self, t: f64) -> Result<f64, (usize, ProfileError)> {
        let mut sum = 0.0;
        for (idx, f) in self.items.iter().enumerate() {
            sum += f.eval(t).map_err(|e| (idx, e))?;
        }
        Ok(sum)
    }

    /// Per-function forces at `t`, in set order.
    pub fn contributions(&self, t: f64) -> Result<Vec<f64>, (usize, ProfileError)> {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, f)| f.eval(t).map_err(|e| (idx, e)))
            .collect()
    }
}

impl From<Vec<TimeFn>> for DisturbanceSet {
    fn from(items: Vec<TimeFn>) -> Self {
        Self { items }
    }
}

impl FromIterator<TimeFn> for DisturbanceSet {
    fn from_iter<I: IntoIterator<Item = TimeFn>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_ignores_time() {
        let f = TimeFn::constant(29.0);
        assert_eq!(f.eval(0.0).unwrap(), 29.0);
        assert_eq!(f.eval(1e6).unwrap(), 29.0);
        let g: TimeFn = 3.5_f64.into();
        assert_eq!(g.eval(7.0).unwrap(), 3.5);
    }

    #[test]
    fn non_finite_output_is_an_error() {
        let f = TimeFn::new("blowup", |t| 1.0 / t);
        let err = f.eval(0.0).unwrap_err();
        assert!(matches!(err, ProfileError::NonFinite { .. }));
        assert!(err.to_string().contains("blowup"));
    }

    #[test]
    fn fallible_function_reports_message() {
        let f = TimeFn::try_new("table", |t| {
            if t < 10.0 {
                Ok(1.0)
            } else {
                Err("past end of table".to_string())
            }
        });
        assert!(f.eval(5.0).is_ok());
        match f.eval(12.0) {
            Err(ProfileError::Undefined { name, t, message }) => {
                assert_eq!(name, "table");
                assert_eq!(t, 12.0);
                assert_eq!(message, "past end of table");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_set_sums_to_zero() {
        let set = DisturbanceSet::new();
        assert!(set.is_empty());
        assert_eq!(set.total(3.0).unwrap(), 0.0);
    }

    #[test]
    fn set_sums_in_order_and_reports_failing_index() {
        let set: DisturbanceSet = vec![
            TimeFn::constant(-100.0),
            TimeFn::new("ramp", |t| -10.0 * t),
            TimeFn::new("bad", |t| if t > 1.0 { f64::NAN } else { 0.0 }),
        ]
        .into();
        assert_eq!(set.len(), 3);
        assert_eq!(set.total(1.0).unwrap(), -110.0);
        assert_eq!(set.contributions(1.0).unwrap(), vec![-100.0, -10.0, 0.0]);

        let (idx, _) = set.total(2.0).unwrap_err();
        assert_eq!(idx, 2);
    }

    #[test]
    fn debug_shows_name() {
        let f = TimeFn::new("wind", |_| -60.0);
        assert_eq!(format!("{f:?}"), "TimeFn(\"wind\")");
    }
}
