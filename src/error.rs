//! Error types for weft.
//!
//! The topology core itself treats contract violations (self-edges, stale
//! handles, cycle corruption) as panics; the error type below covers the
//! fallible construction surface, which validates untrusted face-vertex
//! input before it reaches the core.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building a mesh from face-vertex input.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A polygon references a vertex index outside the vertex list.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A polygon has fewer than two corners.
    #[error("face {face} has {count} vertices, at least 2 are required")]
    FaceTooSmall {
        /// The face index.
        face: usize,
        /// The number of corners the polygon has.
        count: usize,
    },

    /// A polygon repeats the same vertex on consecutive corners, which
    /// would require an edge from a vertex to itself.
    #[error("face {face} repeats vertex {vertex} on consecutive corners")]
    RepeatedVertex {
        /// The face index.
        face: usize,
        /// The repeated vertex index.
        vertex: usize,
    },
}
