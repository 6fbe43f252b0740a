//! # Weft
//!
//! A non-manifold boundary representation (B-rep) for polygonal meshes,
//! built for procedural construction and arbitrary in-place editing rather
//! than rendering.
//!
//! Weft stores topology as circular doubly-linked cycles threaded through
//! four entity kinds: vertices anchor disk cycles of incident edges, edges
//! head radial cycles of face corners, and faces own ordered cycles of
//! corners (loops). Nothing enforces manifoldness: an edge may be shared by
//! any number of faces, vertices may coincide in space, and two-corner
//! faces are valid.
//!
//! ## Features
//!
//! - **Full adjacency**: disk, radial and face cycles give constant-time
//!   neighborhood access in every direction
//! - **Cascading removal**: removing a vertex removes its edges, which
//!   removes their faces, with every surviving cycle kept consistent
//! - **Typed attributes**: named int/float array attributes on any entity
//!   kind, with registry-driven defaults back-filled onto existing entities
//! - **Generational handles**: entity references become observably stale
//!   after removal instead of dangling
//!
//! ## Quick Start
//!
//! ```
//! use weft::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = PolyMesh::new();
//! let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let v2 = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0));
//! let face = mesh.add_face(&[v0, v1, v2]).unwrap();
//!
//! assert_eq!(mesh.num_edges(), 3);
//! assert_eq!(mesh.face_vertices(face).count(), 3);
//!
//! // Removing the shared structure cascades.
//! mesh.remove_vertex(v0);
//! assert_eq!(mesh.num_faces(), 0);
//! assert_eq!(mesh.num_edges(), 1);
//! ```
//!
//! ## Attributes
//!
//! ```
//! use weft::prelude::*;
//!
//! let mut mesh = PolyMesh::new();
//! mesh.add_vertex_attribute(
//!     AttributeDefinition::new("weight", AttributeBaseType::Float, 1)
//!         .with_default(AttributeValue::Float(vec![1.0])),
//! );
//!
//! let v = mesh.add_vertex_at(0.0, 0.0, 0.0);
//! assert_eq!(
//!     mesh.vertex(v).attributes["weight"],
//!     AttributeValue::Float(vec![1.0]),
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attr;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use weft::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attr::{
        AttributeBaseType, AttributeDefinition, AttributeRegistry, AttributeValue,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, to_face_vertex, Edge, EdgeId, Face, FaceId, Loop, LoopId, PolyMesh,
        Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let polygons = vec![
            vec![0, 2, 1], // bottom
            vec![0, 1, 3], // front
            vec![1, 2, 3], // right
            vec![2, 0, 3], // left
        ];

        let mesh = build_from_polygons(&vertices, &polygons).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_loops(), 12);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_valid());

        // Closed surface: every edge carries exactly two face corners.
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            assert_eq!(mesh.edge_loops(e).count(), 2);
        }
        // Every vertex touches three faces.
        for v in mesh.vertex_ids().collect::<Vec<_>>() {
            assert_eq!(mesh.vertex_faces(v).len(), 3);
        }
    }
}
