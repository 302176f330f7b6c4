//! Core types: jets, vertices, covariances and 1D measurements.

use crate::fp;
use glam::{DMat3, DVec3};

/// A value with its one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement1D {
    pub value: f64,
    pub error: f64,
}

impl Measurement1D {
    #[inline]
    pub const fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }

    /// `value / error`. Not guarded: a zero error yields an infinity or NaN.
    #[inline]
    pub fn significance(&self) -> f64 {
        self.value / self.error
    }
}

/// Symmetric 3x3 positional covariance matrix (cm^2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance3(pub DMat3);

impl Covariance3 {
    pub const ZERO: Self = Self(DMat3::ZERO);

    /// Diagonal covariance from per-axis variances.
    #[inline]
    pub fn diagonal(xx: f64, yy: f64, zz: f64) -> Self {
        Self(DMat3::from_diagonal(DVec3::new(xx, yy, zz)))
    }

    /// Isotropic covariance with the same one-sigma resolution on every axis.
    #[inline]
    pub fn isotropic(sigma: f64) -> Self {
        let s2 = sigma * sigma;
        Self::diagonal(s2, s2, s2)
    }

    /// Build from the upper triangle `[xx, xy, xz, yy, yz, zz]`.
    pub fn from_upper(upper: [f64; 6]) -> Self {
        let [xx, xy, xz, yy, yz, zz] = upper;
        Self(DMat3::from_cols(
            DVec3::new(xx, xy, xz),
            DVec3::new(xy, yy, yz),
            DVec3::new(xz, yz, zz),
        ))
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0.col(col)[row]
    }

    /// Quadratic form `v^T C v`.
    #[inline]
    pub fn similarity(&self, v: DVec3) -> f64 {
        v.dot(self.0 * v)
    }

    /// Restrict to the transverse (x, y) block, zeroing every z term.
    pub fn transverse(&self) -> Self {
        let m = self.0;
        Self(DMat3::from_cols(
            DVec3::new(m.x_axis.x, m.x_axis.y, 0.0),
            DVec3::new(m.y_axis.x, m.y_axis.y, 0.0),
            DVec3::ZERO,
        ))
    }
}

impl std::ops::Add for Covariance3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

/// Trait for objects with a direction in (eta, phi) and transverse momentum.
///
/// Lets angular helpers accept jets and vertices interchangeably.
pub trait Kinematics {
    fn pt(&self) -> f64;
    fn eta(&self) -> f64;
    fn phi(&self) -> f64;

    /// `self.phi - other.phi`, wrapped into `(-pi, pi]`.
    #[inline]
    fn delta_phi_to<K: Kinematics + ?Sized>(&self, other: &K) -> f64 {
        fp::delta_phi(self.phi(), other.phi())
    }

    /// Angular separation in (eta, phi).
    #[inline]
    fn delta_r_to<K: Kinematics + ?Sized>(&self, other: &K) -> f64 {
        fp::delta_r(self.eta(), self.phi(), other.eta(), other.phi())
    }
}

/// Pseudorapidity of a 3-momentum. Zero transverse momentum gives +/-inf (or NaN for p = 0).
#[inline]
pub(crate) fn momentum_eta(p: DVec3) -> f64 {
    let pt = p.x.hypot(p.y);
    (p.z / pt).asinh()
}

/// A reconstructed jet.
#[derive(Debug, Clone, PartialEq)]
pub struct Jet {
    /// Position in the per-event jet collection.
    pub index: usize,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    pub momentum: DVec3,
}

impl Jet {
    /// Create a jet from collider coordinates; the 3-momentum is derived.
    pub fn from_pt_eta_phi_e(index: usize, pt: f64, eta: f64, phi: f64, energy: f64) -> Self {
        let momentum = DVec3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh());
        Self {
            index,
            pt,
            eta,
            phi,
            energy,
            momentum,
        }
    }
}

impl Kinematics for Jet {
    #[inline]
    fn pt(&self) -> f64 {
        self.pt
    }
    #[inline]
    fn eta(&self) -> f64 {
        self.eta
    }
    #[inline]
    fn phi(&self) -> f64 {
        self.phi
    }
}

/// A reconstructed primary vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryVertex {
    pub position: DVec3,
    pub covariance: Covariance3,
}

impl PrimaryVertex {
    #[inline]
    pub fn new(position: DVec3, covariance: Covariance3) -> Self {
        Self {
            position,
            covariance,
        }
    }
}

/// A fitted secondary-vertex candidate.
///
/// Kinematics derive from the four-momentum `(momentum, energy)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryVertex {
    pub position: DVec3,
    pub covariance: Covariance3,
    pub momentum: DVec3,
    pub energy: f64,
    /// Number of daughter tracks.
    pub num_tracks: u32,
    pub chi2: f64,
    pub ndof: f64,
}

impl SecondaryVertex {
    /// Create a vertex with an empty fit (zero tracks, zero chi2 and ndof).
    pub fn new(position: DVec3, covariance: Covariance3, momentum: DVec3, energy: f64) -> Self {
        Self {
            position,
            covariance,
            momentum,
            energy,
            num_tracks: 0,
            chi2: 0.0,
            ndof: 0.0,
        }
    }

    /// Attach fit-quality statistics.
    pub fn with_fit(mut self, num_tracks: u32, chi2: f64, ndof: f64) -> Self {
        self.num_tracks = num_tracks;
        self.chi2 = chi2;
        self.ndof = ndof;
        self
    }

    /// Invariant mass. A spacelike four-momentum returns `-sqrt(-m^2)`.
    pub fn mass(&self) -> f64 {
        let m2 = self.energy * self.energy - self.momentum.length_squared();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// `chi2 / ndof`, unguarded.
    #[inline]
    pub fn normalized_chi2(&self) -> f64 {
        self.chi2 / self.ndof
    }
}

impl Kinematics for SecondaryVertex {
    #[inline]
    fn pt(&self) -> f64 {
        self.momentum.x.hypot(self.momentum.y)
    }
    #[inline]
    fn eta(&self) -> f64 {
        momentum_eta(self.momentum)
    }
    #[inline]
    fn phi(&self) -> f64 {
        self.momentum.y.atan2(self.momentum.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_significance() {
        let m = Measurement1D::new(0.3, 0.01);
        assert!((m.significance() - 30.0).abs() < 1e-9);
        assert!(Measurement1D::new(0.0, 0.0).significance().is_nan());
        assert_eq!(Measurement1D::new(1.0, 0.0).significance(), f64::INFINITY);
    }

    #[test]
    fn test_covariance_from_upper_is_symmetric() {
        let c = Covariance3::from_upper([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        for r in 0..3 {
            for col in 0..3 {
                assert_eq!(c.get(r, col), c.get(col, r));
            }
        }
        assert_eq!(c.get(0, 1), 2.0);
        assert_eq!(c.get(1, 2), 5.0);
        assert_eq!(c.get(2, 2), 6.0);
    }

    #[test]
    fn test_covariance_transverse_block() {
        let c = Covariance3::from_upper([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).transverse();
        assert_eq!(c.get(0, 1), 2.0);
        assert_eq!(c.get(0, 2), 0.0);
        assert_eq!(c.get(2, 2), 0.0);
        assert_eq!(c.similarity(DVec3::new(0.0, 0.0, 1.0)), 0.0);
    }

    #[test]
    fn test_jet_momentum_matches_coordinates() {
        let jet = Jet::from_pt_eta_phi_e(0, 100.0, 1.0, 0.5, 200.0);
        assert!((jet.momentum.x.hypot(jet.momentum.y) - 100.0).abs() < 1e-9);
        assert!((momentum_eta(jet.momentum) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sv_kinematics() {
        let sv = SecondaryVertex::new(
            DVec3::ZERO,
            Covariance3::ZERO,
            DVec3::new(3.0, 4.0, 0.0),
            13.0,
        );
        assert_eq!(sv.pt(), 5.0);
        assert_eq!(sv.eta(), 0.0);
        assert!((sv.mass() - 12.0).abs() < 1e-12);
        assert!((sv.phi() - 4.0f64.atan2(3.0)).abs() < 1e-15);
    }

    #[test]
    fn test_sv_spacelike_mass_is_negative() {
        let sv = SecondaryVertex::new(
            DVec3::ZERO,
            Covariance3::ZERO,
            DVec3::new(5.0, 0.0, 0.0),
            3.0,
        );
        assert!((sv.mass() + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_chi2_zero_ndof() {
        let sv = SecondaryVertex::new(DVec3::ZERO, Covariance3::ZERO, DVec3::X, 2.0)
            .with_fit(3, 4.0, 0.0);
        assert_eq!(sv.normalized_chi2(), f64::INFINITY);
        assert_eq!(sv.num_tracks, 3);
    }
}
