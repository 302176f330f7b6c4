//! Error types for secondary-vertex feature extraction.

use thiserror::Error;

/// Errors that can occur while selecting vertices or writing features.
///
/// Numeric degeneracies (NaN, infinities, zero divisions) are never errors:
/// they are absorbed by [`crate::clip_and_bound`] or passed through raw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SvFeatureError {
    /// The event's primary-vertex collection is empty, so there is no
    /// reference point for displacement features.
    #[error("primary-vertex collection is empty")]
    NoPrimaryVertex,

    /// The filler configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A feature name was written that was never declared.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// A feature name was declared twice.
    #[error("feature declared twice: {0}")]
    DuplicateFeature(String),

    /// A value of the wrong arity or scalar type was written to a feature.
    #[error("type mismatch for {name}: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Multi-valued features received different entry counts for one jet.
    /// Downstream consumers index all per-vertex arrays in lockstep, so this
    /// indicates an internal bug rather than bad input.
    #[error("schema mismatch: {name} has {got} entries, expected {expected}")]
    SchemaMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}
