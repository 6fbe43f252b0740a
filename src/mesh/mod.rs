//! Core mesh data structures.
//!
//! This module provides the non-manifold boundary representation and
//! related types for building and editing polygonal meshes.
//!
//! # Overview
//!
//! The primary type is [`PolyMesh`], which stores vertices, edges, loops
//! (face corners) and faces, connected through circular doubly-linked
//! cycles: the disk cycle of edges around each vertex, the radial cycle of
//! loops around each edge, and the face cycle of loops around each face.
//!
//! # Handle Types
//!
//! Mesh entities are identified by typed generational handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an edge
//! - [`LoopId`] - Identifies a loop
//! - [`FaceId`] - Identifies a face
//!
//! A handle stays valid until its entity is removed; afterwards it is
//! observably stale and accesses through it panic.
//!
//! # Construction
//!
//! Meshes are built either incrementally through [`PolyMesh::add_vertex`],
//! [`PolyMesh::add_edge`] and [`PolyMesh::add_face`], or in one shot from
//! face-vertex lists:
//!
//! ```
//! use weft::mesh::build_from_polygons;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let polygons = vec![vec![0, 1, 2]];
//!
//! let mesh = build_from_polygons(&vertices, &polygons).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod handle;
mod polymesh;

pub use builder::{build_from_polygons, to_face_vertex};
pub use handle::{EdgeId, FaceId, LoopId, VertexId};
pub use polymesh::{
    DiskLink, Edge, Face, FaceLoopIter, Loop, PolyMesh, RadialLoopIter, Vertex, VertexEdgeIter,
};
