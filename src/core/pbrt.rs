//! Type definition of Float, otherwise constants and functions which
//! can be used almost everywhere else in the code.

// std
use std;
use std::ops::Sub;

pub type Float = f32;

pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// Bound on the relative error of *n* floating point operations.
pub fn gamma(n: i32) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    let r: T;
    if val < low {
        r = low;
    } else if val > high {
        r = high;
    } else {
        r = val;
    }
    r
}

/// Compute an integer base-2 logarithm function.
pub fn log_2_int_u32(v: u32) -> i32 {
    // undefined for zero, callers clamp to at least one
    31_i32 - v.leading_zeros() as i32
}

/// Find solution(s) of the quadratic equation at<sup>2</sup> + bt + c = 0.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    // find quadratic discriminant
    let discrim: f64 = (b as f64) * (b as f64) - 4.0 * (a as f64) * (c as f64);
    if discrim < 0.0 {
        return None;
    }
    let root_discrim: f64 = discrim.sqrt();
    // compute quadratic _t_ values
    let q: f64 = if b < 0.0 {
        -0.5 * (b as f64 - root_discrim)
    } else {
        -0.5 * (b as f64 + root_discrim)
    };
    let mut t0: Float = q as Float / a;
    let mut t1: Float = c / q as Float;
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

/// Difference of two values, saturating at zero. Used for box
/// extents that may be inverted (the empty box).
pub fn extent<T>(lo: T, hi: T) -> T
where
    T: Sub<T, Output = T> + PartialOrd + Default,
{
    if hi > lo {
        hi - lo
    } else {
        T::default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quadratic_sorted_roots() {
        // (t - 1) * (t - 3)
        let (t0, t1) = quadratic(1.0, -4.0, 3.0).unwrap();
        assert!((t0 - 1.0).abs() < 1e-6);
        assert!((t1 - 3.0).abs() < 1e-6);
        assert!(quadratic(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn log_2_of_powers() {
        assert_eq!(log_2_int_u32(1), 0);
        assert_eq!(log_2_int_u32(1000), 9);
        assert_eq!(log_2_int_u32(1024), 10);
    }

    #[test]
    fn clamp_and_extent() {
        assert_eq!(clamp_t(5.0 as Float, 0.0, 1.0), 1.0);
        assert_eq!(clamp_t(-5, 0, 1), 0);
        assert_eq!(extent(3.0 as Float, 1.0), 0.0);
    }

    #[test]
    fn gamma_grows_with_operations() {
        assert!(gamma(1) > MACHINE_EPSILON);
        assert!(gamma(3) > gamma(2));
        assert!(gamma(5) < 1e-6);
    }
}
