//! Consistency validation for filled feature buffers.
//!
//! Checks the output contract downstream consumers rely on: scalar counts
//! agree, per-vertex arrays are aligned, vertices are ranked, and sanitized
//! features are finite and inside their bounds. Useful for debugging, testing,
//! and catching numerical issues.

use crate::buffer::FeatureBuffer;
use crate::fp::{ClipBounds, DELTA_R_BOUNDS, NORM_CHI2_BOUNDS, SIGNIFICANCE_BOUNDS};
use crate::schema::{
    MULTI_FEATURES, NSV, N_SV, SCALAR_FEATURES, SV_D3DSIG, SV_DELTA_R, SV_DXYSIG, SV_NORMCHI2,
};

const SANITIZED: [(&str, ClipBounds); 4] = [
    (SV_DELTA_R, DELTA_R_BOUNDS),
    (SV_NORMCHI2, NORM_CHI2_BOUNDS),
    (SV_DXYSIG, SIGNIFICANCE_BOUNDS),
    (SV_D3DSIG, SIGNIFICANCE_BOUNDS),
];

/// Detailed validation report for a filled [`FeatureBuffer`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Number of committed jets.
    pub num_jets: usize,
    /// Sum of `n_sv` over all jets.
    pub total_vertices: usize,

    /// Schema features the buffer never declared.
    pub missing_features: Vec<&'static str>,
    /// Jets where `n_sv` and `nsv` disagree.
    pub count_mismatches: usize,
    /// Jets where some multi-valued feature does not have `n_sv` entries.
    pub misaligned_jets: usize,
    /// Jets whose `sv_dxysig` is not non-increasing.
    pub unranked_jets: usize,
    /// Sanitized entries that are non-finite or outside their clip range.
    pub out_of_bounds_values: usize,
}

impl ValidationReport {
    /// True if every check passed.
    pub fn is_valid(&self) -> bool {
        self.missing_features.is_empty()
            && self.count_mismatches == 0
            && self.misaligned_jets == 0
            && self.unranked_jets == 0
            && self.out_of_bounds_values == 0
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            return "Valid".to_string();
        }

        let mut issues = Vec::new();
        if !self.missing_features.is_empty() {
            issues.push(format!(
                "missing features: {}",
                self.missing_features.join(", ")
            ));
        }
        if self.count_mismatches > 0 {
            issues.push(format!("{} jets with n_sv != nsv", self.count_mismatches));
        }
        if self.misaligned_jets > 0 {
            issues.push(format!(
                "{} jets with misaligned per-vertex arrays",
                self.misaligned_jets
            ));
        }
        if self.unranked_jets > 0 {
            issues.push(format!("{} jets not ranked by sv_dxysig", self.unranked_jets));
        }
        if self.out_of_bounds_values > 0 {
            issues.push(format!(
                "{} sanitized values out of bounds",
                self.out_of_bounds_values
            ));
        }
        issues.join(", ")
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ValidationReport {{ jets={}, vertices={}, {} }}",
            self.num_jets,
            self.total_vertices,
            self.summary()
        )
    }
}

#[inline]
fn within(bounds: &ClipBounds, v: f32) -> bool {
    let v = v as f64;
    v.is_finite() && v >= bounds.low && v <= bounds.high
}

/// Validate a buffer filled through [`crate::SvFiller`].
pub fn validate(buffer: &FeatureBuffer) -> ValidationReport {
    let mut report = ValidationReport {
        num_jets: buffer.num_jets(),
        ..ValidationReport::default()
    };

    let declared = buffer.feature_names();
    report.missing_features = SCALAR_FEATURES
        .iter()
        .map(|f| f.name)
        .chain(MULTI_FEATURES.iter().map(|f| f.name))
        .filter(|name| !declared.contains(name))
        .collect();
    if !report.missing_features.is_empty() {
        return report;
    }

    for jet in 0..buffer.num_jets() {
        let n_sv = buffer.scalar(N_SV, jet).map(|v| v.as_f64());
        let nsv = buffer.scalar(NSV, jet).map(|v| v.as_f64());
        if n_sv != nsv {
            report.count_mismatches += 1;
        }
        let n = n_sv.unwrap_or(0.0) as usize;
        report.total_vertices += n;

        let aligned = MULTI_FEATURES
            .iter()
            .all(|f| buffer.multi(f.name, jet).map(<[f32]>::len) == Some(n));
        if !aligned {
            report.misaligned_jets += 1;
        }

        if let Some(sig) = buffer.multi(SV_DXYSIG, jet) {
            if sig.windows(2).any(|w| w[0] < w[1]) {
                report.unranked_jets += 1;
            }
        }

        for (name, bounds) in &SANITIZED {
            if let Some(values) = buffer.multi(name, jet) {
                report.out_of_bounds_values +=
                    values.iter().filter(|&&v| !within(bounds, v)).count();
            }
        }
    }

    report
}
