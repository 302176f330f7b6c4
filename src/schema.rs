//! The fixed output schema for secondary-vertex features.
//!
//! Downstream training code depends on these names, arities and types. The
//! tables here drive both declaration ([`declare`]) and emission
//! ([`crate::SvFeatureRecord::write_to`]), so every multi-valued feature is
//! written from the same per-vertex record.

use crate::buffer::FeatureSink;
use crate::error::SvFeatureError;
use crate::filler::SvFeatures;

/// Storage type of a scalar feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Float,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
        }
    }
}

/// A scalar feature value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Int(i32),
    Float(f32),
}

impl ScalarValue {
    #[inline]
    pub fn ty(self) -> ScalarType {
        match self {
            ScalarValue::Int(_) => ScalarType::Int,
            ScalarValue::Float(_) => ScalarType::Float,
        }
    }

    /// Numeric value widened to f64.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            ScalarValue::Int(v) => v as f64,
            ScalarValue::Float(v) => v as f64,
        }
    }
}

/// One scalar slot per jet.
#[derive(Debug, Clone, Copy)]
pub struct ScalarFeature {
    pub name: &'static str,
    pub ty: ScalarType,
    pub default: ScalarValue,
}

/// One float per selected vertex per jet, read from a [`SvFeatures`] record.
#[derive(Clone, Copy)]
pub struct MultiFeature {
    pub name: &'static str,
    pub get: fn(&SvFeatures) -> f32,
}

impl std::fmt::Debug for MultiFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiFeature")
            .field("name", &self.name)
            .finish()
    }
}

pub const N_SV: &str = "n_sv";
pub const NSV: &str = "nsv";

pub const SV_PTREL: &str = "sv_ptrel";
pub const SV_EREL: &str = "sv_erel";
pub const SV_PHIREL: &str = "sv_phirel";
pub const SV_ETAREL: &str = "sv_etarel";
pub const SV_DELTA_R: &str = "sv_deltaR";
pub const SV_PT: &str = "sv_pt";
pub const SV_MASS: &str = "sv_mass";
pub const SV_NTRACKS: &str = "sv_ntracks";
pub const SV_CHI2: &str = "sv_chi2";
pub const SV_NDF: &str = "sv_ndf";
pub const SV_NORMCHI2: &str = "sv_normchi2";
pub const SV_DXY: &str = "sv_dxy";
pub const SV_DXYERR: &str = "sv_dxyerr";
pub const SV_DXYSIG: &str = "sv_dxysig";
pub const SV_D3D: &str = "sv_d3d";
pub const SV_D3DERR: &str = "sv_d3derr";
pub const SV_D3DSIG: &str = "sv_d3dsig";
pub const SV_COSTHETASVPV: &str = "sv_costhetasvpv";

/// Per-jet scalars. `nsv` duplicates `n_sv` as a float for downstream convenience.
pub const SCALAR_FEATURES: [ScalarFeature; 2] = [
    ScalarFeature {
        name: N_SV,
        ty: ScalarType::Int,
        default: ScalarValue::Int(0),
    },
    ScalarFeature {
        name: NSV,
        ty: ScalarType::Float,
        default: ScalarValue::Float(0.0),
    },
];

/// Per-vertex features in declaration order.
pub const MULTI_FEATURES: [MultiFeature; 18] = [
    // basic kinematics
    MultiFeature { name: SV_PTREL, get: |f| f.ptrel },
    MultiFeature { name: SV_EREL, get: |f| f.erel },
    MultiFeature { name: SV_PHIREL, get: |f| f.phirel },
    MultiFeature { name: SV_ETAREL, get: |f| f.etarel },
    MultiFeature { name: SV_DELTA_R, get: |f| f.delta_r },
    MultiFeature { name: SV_PT, get: |f| f.pt },
    MultiFeature { name: SV_MASS, get: |f| f.mass },
    // vertex properties
    MultiFeature { name: SV_NTRACKS, get: |f| f.ntracks },
    MultiFeature { name: SV_CHI2, get: |f| f.chi2 },
    MultiFeature { name: SV_NDF, get: |f| f.ndf },
    MultiFeature { name: SV_NORMCHI2, get: |f| f.normchi2 },
    MultiFeature { name: SV_DXY, get: |f| f.dxy },
    MultiFeature { name: SV_DXYERR, get: |f| f.dxyerr },
    MultiFeature { name: SV_DXYSIG, get: |f| f.dxysig },
    MultiFeature { name: SV_D3D, get: |f| f.d3d },
    MultiFeature { name: SV_D3DERR, get: |f| f.d3derr },
    MultiFeature { name: SV_D3DSIG, get: |f| f.d3dsig },
    MultiFeature { name: SV_COSTHETASVPV, get: |f| f.costhetasvpv },
];

/// Declare every scalar and multi-valued feature on `sink`, in schema order.
pub fn declare<S: FeatureSink + ?Sized>(sink: &mut S) -> Result<(), SvFeatureError> {
    for f in &SCALAR_FEATURES {
        sink.declare_scalar(f.name, f.ty, f.default)?;
    }
    for f in &MULTI_FEATURES {
        sink.declare_multi(f.name)?;
    }
    Ok(())
}

/// Look up a multi-valued feature by name.
pub fn multi_feature(name: &str) -> Option<&'static MultiFeature> {
    MULTI_FEATURES.iter().find(|f| f.name == name)
}
