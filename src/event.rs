//! Per-event vertex collections.

use crate::error::SvFeatureError;
use crate::types::{PrimaryVertex, SecondaryVertex};

/// Borrowed view of the vertex collections of one event.
#[derive(Debug, Clone, Copy)]
pub struct SvEvent<'a> {
    /// Reconstructed primary vertices, leading vertex first.
    pub primary_vertices: &'a [PrimaryVertex],
    /// Secondary-vertex candidates, in no particular order.
    pub secondary_vertices: &'a [SecondaryVertex],
}

impl<'a> SvEvent<'a> {
    #[inline]
    pub fn new(
        primary_vertices: &'a [PrimaryVertex],
        secondary_vertices: &'a [SecondaryVertex],
    ) -> Self {
        Self {
            primary_vertices,
            secondary_vertices,
        }
    }

    /// The leading primary vertex (first in the collection).
    #[inline]
    pub fn primary_vertex(&self) -> Result<&'a PrimaryVertex, SvFeatureError> {
        self.primary_vertices
            .first()
            .ok_or(SvFeatureError::NoPrimaryVertex)
    }
}
