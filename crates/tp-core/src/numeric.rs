use crate::TpError;

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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, TpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TpError::NonFinite { what, value: v })
    }
}

/// Clamp `v` into `[min, max]`.
///
/// Unlike `f64::clamp`, NaN does not propagate: it maps to `min`.
#[inline]
pub fn constrain(v: Real, min: Real, max: Real) -> Real {
    if v.is_nan() || v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn constrain_bounds() {
        assert_eq!(constrain(5.0, 1.0, 25.0), 5.0);
        assert_eq!(constrain(0.0, 1.0, 25.0), 1.0);
        assert_eq!(constrain(30.0, 1.0, 25.0), 25.0);
        assert_eq!(constrain(Real::INFINITY, 1.0, 25.0), 25.0);
        assert_eq!(constrain(Real::NEG_INFINITY, 1.0, 25.0), 1.0);
    }

    #[test]
    fn constrain_nan_maps_to_min() {
        assert_eq!(constrain(Real::NAN, 15.0, 250.0), 15.0);
    }
}
