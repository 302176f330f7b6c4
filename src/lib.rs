//! Per-jet secondary-vertex features for jet-tagging datasets.
//!
//! For each jet, this crate selects the secondary vertices inside the jet
//! cone, ranks them by transverse displacement significance relative to the
//! leading primary vertex, and derives a fixed schema of kinematic and
//! vertex-quality features. Degenerate ratios are passed through
//! [`clip_and_bound`] so downstream consumers never see NaN or extreme values
//! in the sanitized features.
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use sv_features::{
//!     fill_event, Covariance3, FeatureBuffer, Jet, PrimaryVertex, SecondaryVertex, SvEvent,
//!     SvFiller, SvFillerConfig,
//! };
//!
//! let pvs = vec![PrimaryVertex::new(DVec3::ZERO, Covariance3::isotropic(0.001))];
//! let svs = vec![SecondaryVertex::new(
//!     DVec3::new(0.4, 0.0, 0.0),
//!     Covariance3::isotropic(0.01),
//!     DVec3::new(25.0, 0.0, 0.0),
//!     26.0,
//! )
//! .with_fit(3, 1.2, 1.0)];
//! let jets = vec![Jet::from_pt_eta_phi_e(0, 500.0, 0.0, 0.0, 520.0)];
//!
//! let filler = SvFiller::new(SvFillerConfig::default()).expect("valid config");
//! let mut buffer = FeatureBuffer::new();
//! filler.book(&mut buffer).expect("fresh buffer");
//!
//! let summary = fill_event(&filler, &jets, &SvEvent::new(&pvs, &svs), &mut buffer)
//!     .expect("event has a primary vertex");
//! assert_eq!(summary.jets_filled, 1);
//! assert_eq!(buffer.multi("sv_dxy", 0).map(|v| v.len()), Some(1));
//! ```

mod buffer;
mod distance;
mod error;
mod event;
mod filler;
mod fp;
pub mod schema;
mod types;
pub mod validation;

pub use buffer::{FeatureBuffer, FeatureSink};
pub use distance::{
    cos_theta_sv_pv, distance_3d, distance_xy, Distance3D, DistanceXY, VertexDistance,
};
pub use error::SvFeatureError;
pub use event::SvEvent;
pub use filler::{RankedVertex, SvFeatureRecord, SvFeatures, SvFiller};
pub use fp::{clip_and_bound, delta_phi, delta_r, eta_sign, ClipBounds};
pub use schema::{ScalarType, ScalarValue};
pub use types::{Covariance3, Jet, Kinematics, Measurement1D, PrimaryVertex, SecondaryVertex};

use serde::Deserialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

/// Cone size of AK8 jets.
pub const DEFAULT_JET_RADIUS: f64 = 0.8;

/// Configuration for secondary-vertex feature extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SvFillerConfig {
    /// Association cone half-angle in (eta, phi). A vertex belongs to a jet
    /// when its angular separation is strictly below this value.
    pub jet_radius: f64,
}

impl Default for SvFillerConfig {
    fn default() -> Self {
        Self {
            jet_radius: DEFAULT_JET_RADIUS,
        }
    }
}

impl SvFillerConfig {
    /// Check that the configuration can be used.
    pub fn validate(&self) -> Result<(), SvFeatureError> {
        if !self.jet_radius.is_finite() || self.jet_radius <= 0.0 {
            return Err(SvFeatureError::InvalidConfig(format!(
                "jet_radius must be finite and positive, got {}",
                self.jet_radius
            )));
        }
        Ok(())
    }
}

/// Outcome of filling one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Jets committed to the buffer.
    pub jets_filled: usize,
    /// Jets skipped because their record could not be computed.
    pub jets_skipped: usize,
    /// Total selected vertices across filled jets.
    pub vertices_written: usize,
}

/// Compute and commit features for every jet of one event.
///
/// Records are computed independently per jet (in parallel with the
/// `parallel` feature) and committed to `buffer` in jet order, so the output
/// does not depend on scheduling. An event without a primary vertex is
/// rejected before anything is written.
pub fn fill_event<T: VertexDistance, S: VertexDistance>(
    filler: &SvFiller<T, S>,
    jets: &[Jet],
    event: &SvEvent<'_>,
    buffer: &mut FeatureBuffer,
) -> Result<FillSummary, SvFeatureError> {
    if let Err(err) = event.primary_vertex() {
        tracing::warn!(jets = jets.len(), "skipping event: {}", err);
        return Err(err);
    }

    let records: Vec<Result<SvFeatureRecord, SvFeatureError>> = maybe_par_iter!(jets)
        .map(|jet| filler.compute(jet, event))
        .collect();

    let mut summary = FillSummary::default();
    for (jet, record) in jets.iter().zip(records) {
        match record {
            Ok(record) => {
                if let Err(err) = record.write_to(buffer) {
                    buffer.discard_jet();
                    return Err(err);
                }
                buffer.commit_jet()?;
                summary.jets_filled += 1;
                summary.vertices_written += record.n_sv();
            }
            Err(err) => {
                tracing::warn!(jet = jet.index, "skipping jet: {}", err);
                summary.jets_skipped += 1;
            }
        }
    }

    tracing::debug!(
        filled = summary.jets_filled,
        skipped = summary.jets_skipped,
        vertices = summary.vertices_written,
        "filled event"
    );
    Ok(summary)
}
