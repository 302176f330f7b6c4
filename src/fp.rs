//! Floating-point helpers: the clip-and-bound sanitizer and angular differences.

use std::f64::consts::{PI, TAU};

/// Replace non-finite values with `center`, otherwise clamp into `[low, high]`.
///
/// Keeps NaN and infinities out of downstream normalization layers.
///
/// ```
/// use sv_features::clip_and_bound;
///
/// assert_eq!(clip_and_bound(f64::NAN, 0.0, -1.0, 800.0), 0.0);
/// assert_eq!(clip_and_bound(f64::INFINITY, 0.0, -1.0, 800.0), 0.0);
/// assert_eq!(clip_and_bound(1e6, 0.0, -1.0, 800.0), 800.0);
/// assert_eq!(clip_and_bound(3.5, 0.0, -1.0, 800.0), 3.5);
/// ```
#[inline]
pub fn clip_and_bound(x: f64, center: f64, low: f64, high: f64) -> f64 {
    debug_assert!(low <= high);
    if !x.is_finite() {
        return center;
    }
    x.clamp(low, high)
}

/// A named clip-and-bound policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipBounds {
    /// Replacement for NaN and infinities.
    pub center: f64,
    pub low: f64,
    pub high: f64,
}

impl ClipBounds {
    #[inline]
    pub const fn new(center: f64, low: f64, high: f64) -> Self {
        Self { center, low, high }
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        clip_and_bound(x, self.center, self.low, self.high)
    }
}

/// Policy for `sv_deltaR`, applied to `|dR| - 0.5`.
pub const DELTA_R_BOUNDS: ClipBounds = ClipBounds::new(0.0, -2.0, 0.0);

/// Offset subtracted from `|dR|` before clipping `sv_deltaR`.
pub const DELTA_R_OFFSET: f64 = 0.5;

/// Policy for `sv_normchi2`. Undefined fits (zero ndf) land at the top of the range.
pub const NORM_CHI2_BOUNDS: ClipBounds = ClipBounds::new(1000.0, -1000.0, 1000.0);

/// Policy for `sv_dxysig` and `sv_d3dsig`.
pub const SIGNIFICANCE_BOUNDS: ClipBounds = ClipBounds::new(0.0, -1.0, 800.0);

/// Azimuthal difference `a - b` wrapped into `(-pi, pi]`.
///
/// Non-finite inputs yield NaN.
#[inline]
pub fn delta_phi(a: f64, b: f64) -> f64 {
    let d = a - b;
    let wrapped = PI - (PI - d).rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs.
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Angular separation `sqrt(deta^2 + dphi^2)`.
#[inline]
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    deta.hypot(dphi)
}

/// Hemisphere sign used to mirror eta differences: `+1` for `eta > 0`, `-1` otherwise.
///
/// Multiplying `sv.eta - jet.eta` by this makes the feature point "outward"
/// in both detector hemispheres. A jet at exactly `eta == 0` maps to `-1`.
#[inline]
pub fn eta_sign(eta: f64) -> f64 {
    if eta > 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_and_bound_non_finite() {
        assert_eq!(clip_and_bound(f64::NAN, 7.0, -1.0, 1.0), 7.0);
        assert_eq!(clip_and_bound(f64::INFINITY, 7.0, -1.0, 1.0), 7.0);
        assert_eq!(clip_and_bound(f64::NEG_INFINITY, 7.0, -1.0, 1.0), 7.0);
    }

    #[test]
    fn test_clip_and_bound_range() {
        assert_eq!(clip_and_bound(-5.0, 0.0, -1.0, 800.0), -1.0);
        assert_eq!(clip_and_bound(900.0, 0.0, -1.0, 800.0), 800.0);
        assert_eq!(clip_and_bound(-1.0, 0.0, -1.0, 800.0), -1.0);
        assert_eq!(clip_and_bound(800.0, 0.0, -1.0, 800.0), 800.0);
        assert_eq!(clip_and_bound(12.25, 0.0, -1.0, 800.0), 12.25);
    }

    #[test]
    fn test_named_bounds() {
        assert_eq!(NORM_CHI2_BOUNDS.apply(f64::INFINITY), 1000.0);
        assert_eq!(NORM_CHI2_BOUNDS.apply(-5000.0), -1000.0);
        assert_eq!(SIGNIFICANCE_BOUNDS.apply(f64::NAN), 0.0);
        assert_eq!(DELTA_R_BOUNDS.apply(0.3), 0.0);
        assert_eq!(DELTA_R_BOUNDS.apply(-0.5), -0.5);
    }

    #[test]
    fn test_delta_phi_wraps() {
        let eps = 1e-12;
        assert!((delta_phi(0.1, -0.1) - 0.2).abs() < eps);
        assert!((delta_phi(3.0, -3.0) - (6.0 - TAU)).abs() < eps);
        assert!((delta_phi(-3.0, 3.0) - (TAU - 6.0)).abs() < eps);
        assert_eq!(delta_phi(PI, 0.0), PI);
        assert_eq!(delta_phi(-PI, 0.0), PI);
        assert_eq!(delta_phi(PI + 4e-16, 0.0), PI);
        assert!(delta_phi(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn test_delta_phi_range() {
        for i in -100..=100 {
            let d = delta_phi(i as f64 * 0.37, 0.0);
            assert!(d > -PI && d <= PI, "delta_phi out of range: {}", d);
        }
    }

    #[test]
    fn test_delta_r_across_phi_boundary() {
        let dr = delta_r(0.3, PI - 0.1, 0.0, -PI + 0.1);
        assert!((dr - (0.09f64 + 0.04).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_eta_sign() {
        assert_eq!(eta_sign(1.2), 1.0);
        assert_eq!(eta_sign(-0.4), -1.0);
        assert_eq!(eta_sign(0.0), -1.0);
    }
}
