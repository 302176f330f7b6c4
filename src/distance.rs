//! Vertex-to-vertex distances with propagated uncertainties.
//!
//! Both vertices contribute their positional covariance. For a displacement
//! `d` with combined covariance `C`, the distance is `|d|` and its error is the
//! projection of `C` onto the displacement direction:
//!
//! ```text
//! error = sqrt(d^T C d) / |d|
//! ```
//!
//! A zero displacement has no direction, so its error (and significance) is NaN.

use crate::types::{Covariance3, Measurement1D, PrimaryVertex, SecondaryVertex};
use glam::DVec3;

/// Strategy for measuring the distance between a secondary and a primary vertex.
///
/// [`crate::SvFiller`] is generic over one strategy for ranking and the
/// transverse features and another for the spatial features.
pub trait VertexDistance: Send + Sync {
    fn distance(&self, sv: &SecondaryVertex, pv: &PrimaryVertex) -> Measurement1D;
}

/// Distance in the transverse (x, y) plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceXY;

/// Full 3D distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance3D;

impl VertexDistance for DistanceXY {
    #[inline]
    fn distance(&self, sv: &SecondaryVertex, pv: &PrimaryVertex) -> Measurement1D {
        let d = sv.position - pv.position;
        let d = DVec3::new(d.x, d.y, 0.0);
        projected(d, (sv.covariance + pv.covariance).transverse())
    }
}

impl VertexDistance for Distance3D {
    #[inline]
    fn distance(&self, sv: &SecondaryVertex, pv: &PrimaryVertex) -> Measurement1D {
        let d = sv.position - pv.position;
        projected(d, sv.covariance + pv.covariance)
    }
}

#[inline]
fn projected(d: DVec3, cov: Covariance3) -> Measurement1D {
    let value = d.length();
    let error = cov.similarity(d).sqrt() / value;
    Measurement1D::new(value, error)
}

/// Transverse distance between `sv` and `pv`.
#[inline]
pub fn distance_xy(sv: &SecondaryVertex, pv: &PrimaryVertex) -> Measurement1D {
    DistanceXY.distance(sv, pv)
}

/// 3D distance between `sv` and `pv`.
#[inline]
pub fn distance_3d(sv: &SecondaryVertex, pv: &PrimaryVertex) -> Measurement1D {
    Distance3D.distance(sv, pv)
}

/// Cosine of the angle between the vertex momentum and its flight direction from the PV.
///
/// Not sanitized: a vertex sitting exactly on the PV, or with zero momentum, yields NaN.
#[inline]
pub fn cos_theta_sv_pv(sv: &SecondaryVertex, pv: &PrimaryVertex) -> f64 {
    let flight = sv.position - pv.position;
    sv.momentum.normalize().dot(flight.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pv(sigma: f64) -> PrimaryVertex {
        PrimaryVertex::new(DVec3::ZERO, Covariance3::isotropic(sigma))
    }

    fn sv_at(position: DVec3, sigma: f64) -> SecondaryVertex {
        SecondaryVertex::new(
            position,
            Covariance3::isotropic(sigma),
            DVec3::new(1.0, 0.0, 0.0),
            2.0,
        )
    }

    #[test]
    fn test_distance_xy_ignores_z() {
        let sv = sv_at(DVec3::new(0.3, 0.4, 10.0), 0.01);
        let m = distance_xy(&sv, &pv(0.0));
        assert!((m.value - 0.5).abs() < 1e-12);
        assert!((m.error - 0.01).abs() < 1e-12);
        assert!((m.significance() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_3d_combines_covariances() {
        let sv = sv_at(DVec3::new(0.0, 0.0, 0.2), 0.03);
        let m = distance_3d(&sv, &pv(0.04));
        assert!((m.value - 0.2).abs() < 1e-12);
        // sqrt(0.03^2 + 0.04^2)
        assert!((m.error - 0.05).abs() < 1e-12);
        assert!((m.significance() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_projects_along_displacement() {
        // Large y uncertainty must not affect a displacement along x.
        let sv = SecondaryVertex::new(
            DVec3::new(1.0, 0.0, 0.0),
            Covariance3::diagonal(0.01, 100.0, 100.0),
            DVec3::X,
            2.0,
        );
        let pv = PrimaryVertex::new(DVec3::ZERO, Covariance3::ZERO);
        let m = distance_3d(&sv, &pv);
        assert!((m.error - 0.1).abs() < 1e-12);
        let m = distance_xy(&sv, &pv);
        assert!((m.error - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_displacement_is_nan() {
        let sv = sv_at(DVec3::ZERO, 0.01);
        let m = distance_3d(&sv, &pv(0.01));
        assert_eq!(m.value, 0.0);
        assert!(m.error.is_nan());
        assert!(m.significance().is_nan());
    }

    #[test]
    fn test_zero_covariance_gives_infinite_significance() {
        let sv = sv_at(DVec3::new(0.1, 0.0, 0.0), 0.0);
        let m = distance_xy(&sv, &pv(0.0));
        assert_eq!(m.error, 0.0);
        assert_eq!(m.significance(), f64::INFINITY);
    }

    #[test]
    fn test_cos_theta() {
        let pv = pv(0.01);
        let along = SecondaryVertex::new(
            DVec3::new(0.5, 0.0, 0.0),
            Covariance3::ZERO,
            DVec3::new(10.0, 0.0, 0.0),
            12.0,
        );
        assert!((cos_theta_sv_pv(&along, &pv) - 1.0).abs() < 1e-12);

        let perpendicular = SecondaryVertex {
            momentum: DVec3::new(0.0, 3.0, 0.0),
            ..along.clone()
        };
        assert!(cos_theta_sv_pv(&perpendicular, &pv).abs() < 1e-12);

        let backwards = SecondaryVertex {
            momentum: DVec3::new(-1.0, 0.0, 0.0),
            ..along
        };
        assert!((cos_theta_sv_pv(&backwards, &pv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cos_theta_on_pv_is_nan() {
        let sv = sv_at(DVec3::ZERO, 0.01);
        assert!(cos_theta_sv_pv(&sv, &pv(0.01)).is_nan());
    }
}
