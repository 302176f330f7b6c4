//! Output feature storage.
//!
//! [`FeatureSink`] is the contract the filler writes through. [`FeatureBuffer`]
//! is an in-memory columnar implementation: one row per committed jet, with
//! multi-valued columns stored flat plus per-jet offsets.

use crate::error::SvFeatureError;
use crate::schema::{ScalarType, ScalarValue, N_SV};
use rustc_hash::FxHashMap;

/// A named, typed, append-only feature store with scalar and multi-valued slots.
pub trait FeatureSink {
    /// Declare a scalar feature; jets that never set it receive `default`.
    fn declare_scalar(
        &mut self,
        name: &'static str,
        ty: ScalarType,
        default: ScalarValue,
    ) -> Result<(), SvFeatureError>;

    /// Declare a multi-valued float feature.
    fn declare_multi(&mut self, name: &'static str) -> Result<(), SvFeatureError>;

    /// Set a scalar for the current jet.
    fn set_scalar(&mut self, name: &str, value: ScalarValue) -> Result<(), SvFeatureError>;

    /// Append one entry to a multi-valued feature for the current jet.
    fn append_multi(&mut self, name: &str, value: f32) -> Result<(), SvFeatureError>;

    /// Drop everything written for the current jet. Called after a failed write.
    fn discard_jet(&mut self) {}
}

#[derive(Debug, Clone)]
enum Column {
    Scalar {
        ty: ScalarType,
        default: ScalarValue,
        values: Vec<ScalarValue>,
        pending: Option<ScalarValue>,
    },
    Multi {
        values: Vec<f32>,
        /// `offsets[j]..offsets[j + 1]` are jet `j`'s entries; entries past the
        /// last offset belong to the pending jet.
        offsets: Vec<usize>,
    },
}

impl Column {
    fn kind(&self) -> &'static str {
        match self {
            Column::Scalar { ty, .. } => ty.name(),
            Column::Multi { .. } => "multi",
        }
    }
}

/// In-memory columnar [`FeatureSink`].
///
/// Writes go to a pending jet. [`commit_jet`](Self::commit_jet) checks that
/// every multi-valued column received the same number of entries, then makes
/// the jet visible to readers.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuffer {
    names: Vec<&'static str>,
    columns: Vec<Column>,
    index: FxHashMap<&'static str, usize>,
    num_jets: usize,
}

impl FeatureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed jets.
    #[inline]
    pub fn num_jets(&self) -> usize {
        self.num_jets
    }

    /// Declared feature names, in declaration order.
    pub fn feature_names(&self) -> &[&'static str] {
        &self.names
    }

    /// Scalar value of a committed jet.
    pub fn scalar(&self, name: &str, jet: usize) -> Option<ScalarValue> {
        match self.column(name)? {
            Column::Scalar { values, .. } => values.get(jet).copied(),
            Column::Multi { .. } => None,
        }
    }

    /// Entries of a multi-valued feature for a committed jet.
    pub fn multi(&self, name: &str, jet: usize) -> Option<&[f32]> {
        if jet >= self.num_jets {
            return None;
        }
        match self.column(name)? {
            Column::Multi { values, offsets } => Some(&values[offsets[jet]..offsets[jet + 1]]),
            Column::Scalar { .. } => None,
        }
    }

    /// All committed entries of a multi-valued feature as native-endian f32 bytes.
    pub fn multi_column_bytes(&self, name: &str) -> Option<&[u8]> {
        match self.column(name)? {
            Column::Multi { values, offsets } => {
                let end = offsets[self.num_jets];
                Some(bytemuck::cast_slice(&values[..end]))
            }
            Column::Scalar { .. } => None,
        }
    }

    /// Per-jet offsets into a multi-valued column (length `num_jets + 1`).
    pub fn multi_offsets(&self, name: &str) -> Option<&[usize]> {
        match self.column(name)? {
            Column::Multi { offsets, .. } => Some(offsets),
            Column::Scalar { .. } => None,
        }
    }

    /// Finalize the pending jet.
    ///
    /// Fails with [`SvFeatureError::SchemaMismatch`] when multi-valued columns
    /// disagree on the entry count, or when a declared `n_sv` scalar disagrees
    /// with it; the pending jet is discarded in that case.
    pub fn commit_jet(&mut self) -> Result<(), SvFeatureError> {
        if let Some(err) = self.pending_mismatch() {
            self.discard_jet();
            return Err(err);
        }

        for col in &mut self.columns {
            match col {
                Column::Scalar {
                    default,
                    values,
                    pending,
                    ..
                } => values.push(pending.take().unwrap_or(*default)),
                Column::Multi { values, offsets } => offsets.push(values.len()),
            }
        }
        self.num_jets += 1;
        Ok(())
    }

    fn pending_mismatch(&self) -> Option<SvFeatureError> {
        let mut expected: Option<(usize, &'static str)> = None;
        for (&name, col) in self.names.iter().zip(&self.columns) {
            let Column::Multi { values, offsets } = col else {
                continue;
            };
            let got = values.len() - offsets[self.num_jets];
            match expected {
                None => expected = Some((got, name)),
                Some((n, reference)) if n != got => {
                    tracing::error!(
                        feature = name,
                        reference,
                        expected = n,
                        got,
                        "multi-valued features out of alignment"
                    );
                    return Some(SvFeatureError::SchemaMismatch {
                        name: name.to_string(),
                        expected: n,
                        got,
                    });
                }
                Some(_) => {}
            }
        }

        let (got, reference) = expected?;
        let n_sv = match self.column(N_SV)? {
            Column::Scalar {
                default, pending, ..
            } => (*pending).unwrap_or(*default).as_f64(),
            Column::Multi { .. } => return None,
        };
        if n_sv == got as f64 {
            return None;
        }
        tracing::error!(
            feature = reference,
            n_sv,
            got,
            "per-vertex entries disagree with n_sv"
        );
        Some(SvFeatureError::SchemaMismatch {
            name: reference.to_string(),
            expected: n_sv.max(0.0) as usize,
            got,
        })
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut Column, SvFeatureError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.columns[i]),
            None => Err(SvFeatureError::UnknownFeature(name.to_string())),
        }
    }

    fn insert(&mut self, name: &'static str, column: Column) -> Result<(), SvFeatureError> {
        if self.index.contains_key(name) {
            return Err(SvFeatureError::DuplicateFeature(name.to_string()));
        }
        // Late declarations backfill already committed jets.
        let column = match column {
            Column::Scalar {
                ty,
                default,
                mut values,
                pending,
            } => {
                values.resize(self.num_jets, default);
                Column::Scalar {
                    ty,
                    default,
                    values,
                    pending,
                }
            }
            Column::Multi { values, mut offsets } => {
                offsets.resize(self.num_jets + 1, 0);
                Column::Multi { values, offsets }
            }
        };
        self.index.insert(name, self.columns.len());
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }
}

impl FeatureSink for FeatureBuffer {
    fn declare_scalar(
        &mut self,
        name: &'static str,
        ty: ScalarType,
        default: ScalarValue,
    ) -> Result<(), SvFeatureError> {
        if default.ty() != ty {
            return Err(SvFeatureError::TypeMismatch {
                name: name.to_string(),
                expected: ty.name(),
                actual: default.ty().name(),
            });
        }
        self.insert(
            name,
            Column::Scalar {
                ty,
                default,
                values: Vec::new(),
                pending: None,
            },
        )
    }

    fn declare_multi(&mut self, name: &'static str) -> Result<(), SvFeatureError> {
        self.insert(
            name,
            Column::Multi {
                values: Vec::new(),
                offsets: vec![0],
            },
        )
    }

    fn set_scalar(&mut self, name: &str, value: ScalarValue) -> Result<(), SvFeatureError> {
        match self.column_mut(name)? {
            Column::Scalar { ty, pending, .. } if *ty == value.ty() => {
                *pending = Some(value);
                Ok(())
            }
            col => Err(SvFeatureError::TypeMismatch {
                name: name.to_string(),
                expected: col.kind(),
                actual: value.ty().name(),
            }),
        }
    }

    fn append_multi(&mut self, name: &str, value: f32) -> Result<(), SvFeatureError> {
        match self.column_mut(name)? {
            Column::Multi { values, .. } => {
                values.push(value);
                Ok(())
            }
            col => Err(SvFeatureError::TypeMismatch {
                name: name.to_string(),
                expected: col.kind(),
                actual: "multi",
            }),
        }
    }

    fn discard_jet(&mut self) {
        let committed = self.num_jets;
        for col in &mut self.columns {
            match col {
                Column::Scalar { pending, .. } => *pending = None,
                Column::Multi { values, offsets } => values.truncate(offsets[committed]),
            }
        }
    }
}
