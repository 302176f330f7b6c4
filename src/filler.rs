//! Secondary-vertex selection, ranking and feature derivation for one jet.

use crate::buffer::FeatureSink;
use crate::distance::{cos_theta_sv_pv, Distance3D, DistanceXY, VertexDistance};
use crate::error::SvFeatureError;
use crate::event::SvEvent;
use crate::fp::{eta_sign, DELTA_R_BOUNDS, DELTA_R_OFFSET, NORM_CHI2_BOUNDS, SIGNIFICANCE_BOUNDS};
use crate::schema::{self, ScalarValue, MULTI_FEATURES, N_SV, NSV};
use crate::types::{Jet, Kinematics, Measurement1D, PrimaryVertex, SecondaryVertex};
use crate::SvFillerConfig;
use std::cmp::Ordering;

/// Features of one selected secondary vertex, relative to its jet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SvFeatures {
    pub ptrel: f32,
    pub erel: f32,
    pub phirel: f32,
    pub etarel: f32,
    pub delta_r: f32,
    pub pt: f32,
    pub mass: f32,
    pub ntracks: f32,
    pub chi2: f32,
    pub ndf: f32,
    pub normchi2: f32,
    pub dxy: f32,
    pub dxyerr: f32,
    pub dxysig: f32,
    pub d3d: f32,
    pub d3derr: f32,
    pub d3dsig: f32,
    pub costhetasvpv: f32,
}

/// A selected vertex: its position in the event collection plus the cached
/// transverse distance used for ranking.
#[derive(Debug, Clone, Copy)]
pub struct RankedVertex<'a> {
    pub index: usize,
    pub vertex: &'a SecondaryVertex,
    pub dxy: Measurement1D,
}

/// Complete feature output for one jet, vertices in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct SvFeatureRecord {
    pub jet_index: usize,
    /// Event-collection indices of the selected vertices, parallel to `vertices`.
    pub source_indices: Vec<usize>,
    pub vertices: Vec<SvFeatures>,
}

impl SvFeatureRecord {
    /// Number of selected vertices.
    #[inline]
    pub fn n_sv(&self) -> usize {
        self.vertices.len()
    }

    /// Write the scalars and every per-vertex entry to `sink`.
    pub fn write_to<S: FeatureSink + ?Sized>(&self, sink: &mut S) -> Result<(), SvFeatureError> {
        let n = self.n_sv();
        sink.set_scalar(N_SV, ScalarValue::Int(i32::try_from(n).unwrap_or(i32::MAX)))?;
        sink.set_scalar(NSV, ScalarValue::Float(n as f32))?;
        for sv in &self.vertices {
            for f in &MULTI_FEATURES {
                sink.append_multi(f.name, (f.get)(sv))?;
            }
        }
        Ok(())
    }
}

/// Descending by significance; NaN ranks after everything else.
#[inline]
fn rank_order(a: &Measurement1D, b: &Measurement1D) -> Ordering {
    let key = |m: &Measurement1D| {
        let s = m.significance();
        if s.is_nan() {
            f64::NEG_INFINITY
        } else {
            s
        }
    };
    key(b).total_cmp(&key(a))
}

/// Selects the secondary vertices inside a jet's cone and derives their features.
///
/// `T` measures the transverse distance used for ranking and the `dxy`
/// features; `S` measures the spatial distance behind the `d3d` features.
#[derive(Debug, Clone)]
pub struct SvFiller<T = DistanceXY, S = Distance3D> {
    config: SvFillerConfig,
    transverse: T,
    spatial: S,
}

impl SvFiller {
    /// Create a filler, rejecting an unusable configuration.
    pub fn new(config: SvFillerConfig) -> Result<Self, SvFeatureError> {
        Self::with_distances(config, DistanceXY, Distance3D)
    }
}

impl<T: VertexDistance, S: VertexDistance> SvFiller<T, S> {
    /// Create a filler with custom distance measurements.
    pub fn with_distances(
        config: SvFillerConfig,
        transverse: T,
        spatial: S,
    ) -> Result<Self, SvFeatureError> {
        config.validate()?;
        Ok(Self {
            config,
            transverse,
            spatial,
        })
    }

    #[inline]
    pub fn jet_radius(&self) -> f64 {
        self.config.jet_radius
    }

    /// Declare the output schema on `sink`.
    pub fn book<K: FeatureSink + ?Sized>(&self, sink: &mut K) -> Result<(), SvFeatureError> {
        schema::declare(sink)
    }

    /// Whether `sv` lies strictly inside the jet cone.
    #[inline]
    pub fn is_associated(&self, sv: &SecondaryVertex, jet: &Jet) -> bool {
        sv.delta_r_to(jet) < self.config.jet_radius
    }

    /// Vertices within the jet cone, sorted by descending transverse significance.
    ///
    /// The sort is stable, so tied vertices keep their event-collection order.
    pub fn select_and_rank<'a>(
        &self,
        jet: &Jet,
        event: &SvEvent<'a>,
    ) -> Result<Vec<RankedVertex<'a>>, SvFeatureError> {
        let pv = event.primary_vertex()?;

        let mut ranked: Vec<RankedVertex<'a>> = event
            .secondary_vertices
            .iter()
            .enumerate()
            .filter(|(_, sv)| self.is_associated(sv, jet))
            .map(|(index, vertex)| RankedVertex {
                index,
                vertex,
                dxy: self.transverse.distance(vertex, pv),
            })
            .collect();

        ranked.sort_by(|a, b| rank_order(&a.dxy, &b.dxy));
        Ok(ranked)
    }

    /// Derive per-vertex features for already ranked vertices.
    pub fn extract_features(
        &self,
        jet: &Jet,
        ranked: &[RankedVertex<'_>],
        pv: &PrimaryVertex,
    ) -> SvFeatureRecord {
        let etasign = eta_sign(jet.eta);

        let vertices = ranked
            .iter()
            .map(|r| {
                let sv = r.vertex;
                let dxy = r.dxy;
                let d3d = self.spatial.distance(sv, pv);
                SvFeatures {
                    ptrel: (sv.pt() / jet.pt) as f32,
                    erel: (sv.energy / jet.energy) as f32,
                    phirel: sv.delta_phi_to(jet) as f32,
                    etarel: (etasign * (sv.eta() - jet.eta)) as f32,
                    delta_r: DELTA_R_BOUNDS.apply(sv.delta_r_to(jet).abs() - DELTA_R_OFFSET)
                        as f32,
                    pt: sv.pt() as f32,
                    mass: sv.mass() as f32,
                    ntracks: sv.num_tracks as f32,
                    chi2: sv.chi2 as f32,
                    ndf: sv.ndof as f32,
                    normchi2: NORM_CHI2_BOUNDS.apply(sv.normalized_chi2()) as f32,
                    dxy: dxy.value as f32,
                    dxyerr: dxy.error as f32,
                    dxysig: SIGNIFICANCE_BOUNDS.apply(dxy.significance()) as f32,
                    d3d: d3d.value as f32,
                    d3derr: d3d.error as f32,
                    d3dsig: SIGNIFICANCE_BOUNDS.apply(d3d.significance()) as f32,
                    costhetasvpv: cos_theta_sv_pv(sv, pv) as f32,
                }
            })
            .collect();

        SvFeatureRecord {
            jet_index: jet.index,
            source_indices: ranked.iter().map(|r| r.index).collect(),
            vertices,
        }
    }

    /// Select, rank and derive features for one jet without writing anything.
    pub fn compute(&self, jet: &Jet, event: &SvEvent<'_>) -> Result<SvFeatureRecord, SvFeatureError> {
        let pv = event.primary_vertex()?;
        let ranked = self.select_and_rank(jet, event)?;
        tracing::trace!(
            jet = jet.index,
            candidates = event.secondary_vertices.len(),
            selected = ranked.len(),
            "ranked secondary vertices"
        );
        Ok(self.extract_features(jet, &ranked, pv))
    }

    /// Compute and write one jet's features. Returns the selected-vertex count.
    ///
    /// Nothing is written when selection fails. A write rejected by the sink
    /// discards the partially written jet before the error is returned.
    pub fn fill<K: FeatureSink + ?Sized>(
        &self,
        jet: &Jet,
        event: &SvEvent<'_>,
        sink: &mut K,
    ) -> Result<usize, SvFeatureError> {
        let record = self.compute(jet, event)?;
        if let Err(err) = record.write_to(sink) {
            sink.discard_jet();
            return Err(err);
        }
        Ok(record.n_sv())
    }
}
