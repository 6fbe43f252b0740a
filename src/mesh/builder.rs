//! Mesh construction utilities.
//!
//! This module provides conversion between the linked topology structure
//! and plain face-vertex lists, the form polygon soup usually arrives in.
//! Input is validated up front so the topology core, which treats bad
//! input as a contract violation, only ever sees well-formed polygons.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::error::{MeshError, Result};

use super::handle::VertexId;
use super::polymesh::PolyMesh;

/// Build a mesh from vertex positions and polygon index lists.
///
/// Polygons may have any number of corners from two upward and may share
/// edges with any number of other polygons; shared edges are created once
/// and reused. Vertices referenced by no polygon stay isolated.
///
/// # Errors
/// * [`MeshError::InvalidVertexIndex`] if a polygon indexes past the
///   vertex list.
/// * [`MeshError::FaceTooSmall`] if a polygon has fewer than two corners.
/// * [`MeshError::RepeatedVertex`] if a polygon repeats a vertex on
///   consecutive corners (which would need an edge from a vertex to
///   itself).
///
/// # Example
/// ```
/// use weft::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let polygons = vec![vec![0, 1, 2, 3]];
///
/// let mesh = build_from_polygons(&vertices, &polygons).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_edges(), 4);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_polygons(
    vertices: &[Point3<f32>],
    polygons: &[Vec<usize>],
) -> Result<PolyMesh> {
    for (fi, polygon) in polygons.iter().enumerate() {
        if polygon.len() < 2 {
            return Err(MeshError::FaceTooSmall {
                face: fi,
                count: polygon.len(),
            });
        }
        for &vi in polygon {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: vi,
                });
            }
        }
        for i in 0..polygon.len() {
            if polygon[i] == polygon[(i + 1) % polygon.len()] {
                return Err(MeshError::RepeatedVertex {
                    face: fi,
                    vertex: polygon[i],
                });
            }
        }
    }

    let mut mesh = PolyMesh::new();
    let ids: Vec<VertexId> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    let mut corners = Vec::new();
    for polygon in polygons {
        corners.clear();
        corners.extend(polygon.iter().map(|&vi| ids[vi]));
        let _ = mesh.add_face(&corners);
    }

    Ok(mesh)
}

/// Snapshot a mesh back into vertex positions and polygon index lists.
///
/// The inverse of [`build_from_polygons`] up to vertex numbering: isolated
/// vertices survive the round trip as unreferenced positions, wireframe
/// edges are dropped.
pub fn to_face_vertex(mesh: &PolyMesh) -> (Vec<Point3<f32>>, Vec<Vec<usize>>) {
    let mut positions = Vec::with_capacity(mesh.num_vertices());
    let mut index_of = HashMap::with_capacity(mesh.num_vertices());
    for (vid, vertex) in mesh.vertices() {
        index_of.insert(vid, positions.len());
        positions.push(vertex.position);
    }

    let mut polygons = Vec::with_capacity(mesh.num_faces());
    for (fid, _) in mesh.faces() {
        polygons.push(mesh.face_vertices(fid).map(|v| index_of[&v]).collect());
    }

    (positions, polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Vec<Point3<f32>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_build_mixed_polygons() {
        let mut vertices = unit_quad();
        vertices.push(Point3::new(0.5, 0.5, 1.0));
        let polygons = vec![vec![0, 1, 2, 3], vec![0, 1, 4], vec![1, 2, 4]];

        let mesh = build_from_polygons(&vertices, &polygons).unwrap();

        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 3);
        // 4 rim edges + 3 edges to the apex, with 0-1 and 1-2 shared.
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_loops(), 10);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_build_leaves_unreferenced_vertices_isolated() {
        let vertices = unit_quad();
        let polygons = vec![vec![0, 1, 2]];

        let mesh = build_from_polygons(&vertices, &polygons).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        let isolated = mesh
            .vertices()
            .filter(|(_, v)| v.edge.is_none())
            .count();
        assert_eq!(isolated, 1);
    }

    #[test]
    fn test_build_rejects_bad_index() {
        let err = build_from_polygons(&unit_quad(), &[vec![0, 1, 9]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidVertexIndex { face: 0, vertex: 9 }
        ));
    }

    #[test]
    fn test_build_rejects_tiny_face() {
        let err = build_from_polygons(&unit_quad(), &[vec![2]]).unwrap_err();
        assert!(matches!(err, MeshError::FaceTooSmall { face: 0, count: 1 }));
    }

    #[test]
    fn test_build_rejects_consecutive_repeat() {
        let err = build_from_polygons(&unit_quad(), &[vec![0, 1, 1, 2]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::RepeatedVertex { face: 0, vertex: 1 }
        ));
    }

    #[test]
    fn test_round_trip() {
        let vertices = unit_quad();
        let polygons = vec![vec![0, 1, 2, 3]];
        let mesh = build_from_polygons(&vertices, &polygons).unwrap();

        let (positions, polys) = to_face_vertex(&mesh);
        assert_eq!(positions.len(), 4);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);

        let rebuilt = build_from_polygons(&positions, &polys).unwrap();
        assert_eq!(rebuilt.num_vertices(), mesh.num_vertices());
        assert_eq!(rebuilt.num_edges(), mesh.num_edges());
        assert_eq!(rebuilt.num_faces(), mesh.num_faces());
        assert!(rebuilt.is_valid());
    }
}
