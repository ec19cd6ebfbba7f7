//! Error types for graph construction and homomorphism search.
//!
//! Every error is raised while validating arguments, before any search state
//! is built. Running out of candidates, reaching the result limit and a hook
//! asking to stop are ordinary outcomes reported through
//! [`SearchReport`](crate::SearchReport).

use homos_bitarray::BitArrayError;
use thiserror::Error;

/// Errors returned by the graph API and the search entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomosError {
    /// A vertex index is not below the vertex count of its graph.
    #[error("{role} vertex {vertex} is out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange {
        /// Which argument held the vertex.
        role: &'static str,
        /// The offending vertex.
        vertex: usize,
        /// Number of vertices in the graph it was checked against.
        vertex_count: usize,
    },

    /// The caller's working buffer cannot hold one entry per domain vertex.
    #[error("map buffer holds {len} entries but the domain has {required} vertices")]
    MapBufferTooShort {
        /// Length of the buffer passed in.
        len: usize,
        /// Number of domain vertices.
        required: usize,
    },

    /// The partial image does not have one entry per domain vertex.
    #[error("partial image has {len} entries but the domain has {expected} vertices")]
    ImageLengthMismatch {
        /// Length of the partial image.
        len: usize,
        /// Number of domain vertices.
        expected: usize,
    },

    /// `HintMode::UseImage` was requested without a partial image.
    #[error("the image hint is enabled but no partial image was supplied")]
    MissingImage,

    /// Two fixed entries of the partial image violate an edge of the domain.
    #[error("partial image sends edge {from} -> {to} to the non-edge {image_from} -> {image_to}")]
    InconsistentImage {
        /// Tail of the domain edge.
        from: usize,
        /// Head of the domain edge.
        to: usize,
        /// Image of the tail.
        image_from: usize,
        /// Image of the head.
        image_to: usize,
    },

    /// A bit array operation failed its precondition.
    #[error("bit array operation failed: {0}")]
    BitArray(#[from] BitArrayError),
}

impl HomosError {
    /// Create a vertex out of range error.
    pub const fn vertex_out_of_range(
        role: &'static str,
        vertex: usize,
        vertex_count: usize,
    ) -> Self {
        Self::VertexOutOfRange {
            role,
            vertex,
            vertex_count,
        }
    }

    /// Checks `vertex < vertex_count`.
    ///
    /// # Errors
    ///
    /// [`HomosError::VertexOutOfRange`] when the check fails.
    pub const fn check_vertex(
        role: &'static str,
        vertex: usize,
        vertex_count: usize,
    ) -> Result<(), Self> {
        if vertex < vertex_count {
            Ok(())
        } else {
            Err(Self::vertex_out_of_range(role, vertex, vertex_count))
        }
    }
}
