use crate::CfError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CfError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CfError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CfError::InvalidArg { what })
    }
}

/// Number of whole steps of size `dt` that fit in `span`.
///
/// A quotient within tolerance of an integer counts as that integer, so
/// `0.3 / 0.1` yields 3 rather than 2. Returns `None` when the quotient is
/// not finite, negative, or too large for `usize`.
pub fn whole_steps(span: Real, dt: Real) -> Option<usize> {
    let ratio = span / dt;
    if !ratio.is_finite() || ratio < 0.0 {
        return None;
    }
    let rounded = ratio.round();
    let tol = Tolerances {
        abs: 1e-9,
        rel: 1e-12,
    };
    let steps = if nearly_equal(ratio, rounded, tol) {
        rounded
    } else {
        ratio.floor()
    };
    // usize::MAX as f64 rounds up to 2^64, which does not fit.
    if steps >= usize::MAX as Real {
        return None;
    }
    Some(steps as usize)
}
