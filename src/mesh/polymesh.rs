//! Non-manifold polygonal mesh data structure.
//!
//! This module provides a boundary representation built from four entity
//! kinds: vertices, edges, loops (face corners) and faces. Connectivity is
//! stored as three kinds of circular doubly-linked lists threaded through
//! the entities:
//!
//! - the **disk cycle** of a vertex links every edge incident to it,
//! - the **radial cycle** of an edge links every loop (face usage) of it,
//! - the **face cycle** of a face links its corners in polygon order.
//!
//! Every cycle is non-empty and circular; a single element is its own
//! successor and predecessor. An edge participates in two disk cycles at
//! once, one per endpoint, through a separate [`DiskLink`] record per
//! endpoint. Disk walks select the record by endpoint identity, never by
//! slot position.
//!
//! # Non-manifold by design
//!
//! Nothing restricts how many faces share an edge, how many disconnected
//! fans share a vertex, or whether two vertices occupy the same position.
//! Two-corner faces are valid. The structure targets procedural
//! construction and in-place editing, not rendering.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::attr::{AttributeDefinition, AttributeRegistry, AttributeValue};

use super::handle::{Arena, EdgeId, FaceId, LoopId, VertexId};

/// A vertex: a point in 3-space anchoring a disk cycle of incident edges.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f32>,

    /// One incident edge, the entry point into the disk cycle.
    /// `None` while the vertex is isolated.
    pub edge: Option<EdgeId>,

    /// User scratch space. The core never reads or maintains it.
    pub id: i32,

    /// Per-entity attribute values, registered and ad hoc.
    pub attributes: HashMap<String, AttributeValue>,
}

impl Vertex {
    /// Create a detached vertex at the given position.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            edge: None,
            id: 0,
            attributes: HashMap::new(),
        }
    }

    /// Create a detached vertex from coordinates.
    pub fn from_coords(x: f32, y: f32, z: f32) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// One endpoint record of an edge: which vertex this slot binds to, and the
/// edge's successor and predecessor in that vertex's disk cycle.
#[derive(Debug, Clone, Copy)]
pub struct DiskLink {
    /// The endpoint this record belongs to.
    pub vertex: VertexId,

    /// Successor edge in the endpoint's disk cycle.
    pub next: EdgeId,

    /// Predecessor edge in the endpoint's disk cycle.
    pub prev: EdgeId,
}

/// An edge: an unordered pair of distinct vertices, a node in two disk
/// cycles and the head of a radial cycle of loops.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The two endpoint records. Which endpoint lands in which slot is an
    /// accident of construction and carries no meaning, so the array is
    /// private; access goes through the by-vertex accessors.
    links: [DiskLink; 2],

    /// One loop of the radial cycle, or `None` for a wireframe edge that
    /// no face uses.
    pub radial: Option<LoopId>,

    /// User scratch space. The core never reads or maintains it.
    pub id: i32,

    /// Per-entity attribute values, registered and ad hoc.
    pub attributes: HashMap<String, AttributeValue>,
}

impl Edge {
    /// The two endpoints, in construction order.
    #[inline]
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.links[0].vertex, self.links[1].vertex)
    }

    /// Whether `v` is one of this edge's endpoints.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.links[0].vertex == v || self.links[1].vertex == v
    }

    /// The endpoint opposite to `v`.
    ///
    /// Panics if `v` is not an endpoint of this edge.
    pub fn other_vertex(&self, v: VertexId) -> VertexId {
        let (a, b) = self.endpoints();
        if v == a {
            b
        } else if v == b {
            a
        } else {
            panic!("vertex {:?} is not an endpoint of this edge", v);
        }
    }

    fn link_index(&self, v: VertexId) -> usize {
        if self.links[0].vertex == v {
            0
        } else if self.links[1].vertex == v {
            1
        } else {
            panic!("vertex {:?} is not an endpoint of this edge", v);
        }
    }

    /// The disk record for endpoint `v`.
    ///
    /// Panics if `v` is not an endpoint of this edge.
    pub fn disk_link(&self, v: VertexId) -> &DiskLink {
        &self.links[self.link_index(v)]
    }

    pub(crate) fn disk_link_mut(&mut self, v: VertexId) -> &mut DiskLink {
        let index = self.link_index(v);
        &mut self.links[index]
    }

    /// Successor of this edge in `v`'s disk cycle.
    #[inline]
    pub fn disk_next(&self, v: VertexId) -> EdgeId {
        self.disk_link(v).next
    }

    /// Predecessor of this edge in `v`'s disk cycle.
    #[inline]
    pub fn disk_prev(&self, v: VertexId) -> EdgeId {
        self.disk_link(v).prev
    }
}

/// A loop, or face corner: the atom that ties one vertex, one edge and one
/// face together. Carries per-corner data such as UVs that differ between
/// the faces meeting at a vertex.
#[derive(Debug, Clone)]
pub struct Loop {
    /// The corner's vertex.
    pub vert: VertexId,

    /// The edge leaving the corner toward the next corner in the face cycle.
    pub edge: EdgeId,

    /// The face this corner belongs to.
    pub face: FaceId,

    /// Successor in the face cycle, in polygon order.
    pub next: LoopId,

    /// Predecessor in the face cycle.
    pub prev: LoopId,

    /// Successor in the edge's radial cycle.
    pub radial_next: LoopId,

    /// Predecessor in the edge's radial cycle.
    pub radial_prev: LoopId,

    /// Per-entity attribute values, registered and ad hoc.
    pub attributes: HashMap<String, AttributeValue>,
}

/// A face: a polygon represented by its cycle of loops.
#[derive(Debug, Clone)]
pub struct Face {
    /// One loop of the face cycle. `None` only transiently during
    /// construction; a live face always has a loop cycle.
    pub first_loop: Option<LoopId>,

    /// Corner count, cached at construction and never re-derived. The core
    /// offers no way to restructure a live face cycle; operators rebuild
    /// faces instead of editing them.
    pub vert_count: usize,

    /// User scratch space. The core never reads or maintains it.
    pub id: i32,

    /// Per-entity attribute values, registered and ad hoc.
    pub attributes: HashMap<String, AttributeValue>,
}

/// A non-manifold polygonal mesh.
///
/// The mesh exclusively owns all entities in four generational arenas, plus
/// one attribute registry per entity kind. Mutation goes through `&mut
/// PolyMesh`, queries through `&PolyMesh`; there is no interior mutability
/// and no concurrent access story beyond that exclusive-handle discipline.
///
/// Handles returned by the `add_*` methods stay valid until the entity is
/// removed (directly or by cascade); after that they are observably stale
/// and any access through them panics.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    pub(crate) vertices: Arena<VertexId, Vertex>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) loops: Arena<LoopId, Loop>,
    pub(crate) faces: Arena<FaceId, Face>,

    vertex_attributes: AttributeRegistry,
    edge_attributes: AttributeRegistry,
    loop_attributes: AttributeRegistry,
    face_attributes: AttributeRegistry,
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Arena::new(),
            edges: Arena::new(),
            loops: Arena::new(),
            faces: Arena::new(),
            vertex_attributes: AttributeRegistry::new("vertex"),
            edge_attributes: AttributeRegistry::new("edge"),
            loop_attributes: AttributeRegistry::new("loop"),
            face_attributes: AttributeRegistry::new("face"),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of loops.
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID. Panics on a stale handle.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Get a mutable vertex by ID. Panics on a stale handle.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id]
    }

    /// Get an edge by ID. Panics on a stale handle.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Get a mutable edge by ID. Panics on a stale handle.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// Get a loop by ID. Panics on a stale handle.
    #[inline]
    pub fn loop_at(&self, id: LoopId) -> &Loop {
        &self.loops[id]
    }

    /// Get a mutable loop by ID. Panics on a stale handle.
    #[inline]
    pub fn loop_at_mut(&mut self, id: LoopId) -> &mut Loop {
        &mut self.loops[id]
    }

    /// Get a face by ID. Panics on a stale handle.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    /// Get a mutable face by ID. Panics on a stale handle.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id]
    }

    /// Whether the handle refers to a live vertex of this mesh.
    #[inline]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains(id)
    }

    /// Whether the handle refers to a live edge of this mesh.
    #[inline]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(id)
    }

    /// Whether the handle refers to a live loop of this mesh.
    #[inline]
    pub fn contains_loop(&self, id: LoopId) -> bool {
        self.loops.contains(id)
    }

    /// Whether the handle refers to a live face of this mesh.
    #[inline]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains(id)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    /// Iterate over all loops with their IDs.
    pub fn loops(&self) -> impl Iterator<Item = (LoopId, &Loop)> + '_ {
        self.loops.iter()
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter()
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.handles()
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.handles()
    }

    /// Iterate over all loop IDs.
    pub fn loop_ids(&self) -> impl Iterator<Item = LoopId> + '_ {
        self.loops.handles()
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.handles()
    }

    // ==================== Attribute Registration ====================

    /// Whether a vertex attribute with the given name is registered.
    pub fn has_vertex_attribute(&self, name: &str) -> bool {
        self.vertex_attributes.has(name)
    }

    /// Register a vertex attribute and back-fill a deep-copied default onto
    /// every existing vertex. Returns a mutable borrow of the registered
    /// definition; editing its `default` changes what subsequent vertices
    /// receive without touching values already installed.
    ///
    /// If the name is already registered, the registry and the existing
    /// vertices are left unchanged.
    pub fn add_vertex_attribute(
        &mut self,
        definition: AttributeDefinition,
    ) -> &mut AttributeDefinition {
        if !self.vertex_attributes.has(definition.name()) {
            let name = definition.name().to_owned();
            let default = definition.default.clone();
            for (_, vertex) in self.vertices.iter_mut() {
                vertex.attributes.insert(name.clone(), default.clone());
            }
        }
        self.vertex_attributes.register(definition)
    }

    /// Whether an edge attribute with the given name is registered.
    pub fn has_edge_attribute(&self, name: &str) -> bool {
        self.edge_attributes.has(name)
    }

    /// Register an edge attribute. See [`PolyMesh::add_vertex_attribute`].
    pub fn add_edge_attribute(
        &mut self,
        definition: AttributeDefinition,
    ) -> &mut AttributeDefinition {
        if !self.edge_attributes.has(definition.name()) {
            let name = definition.name().to_owned();
            let default = definition.default.clone();
            for (_, edge) in self.edges.iter_mut() {
                edge.attributes.insert(name.clone(), default.clone());
            }
        }
        self.edge_attributes.register(definition)
    }

    /// Whether a loop attribute with the given name is registered.
    pub fn has_loop_attribute(&self, name: &str) -> bool {
        self.loop_attributes.has(name)
    }

    /// Register a loop attribute. See [`PolyMesh::add_vertex_attribute`].
    pub fn add_loop_attribute(
        &mut self,
        definition: AttributeDefinition,
    ) -> &mut AttributeDefinition {
        if !self.loop_attributes.has(definition.name()) {
            let name = definition.name().to_owned();
            let default = definition.default.clone();
            for (_, l) in self.loops.iter_mut() {
                l.attributes.insert(name.clone(), default.clone());
            }
        }
        self.loop_attributes.register(definition)
    }

    /// Whether a face attribute with the given name is registered.
    pub fn has_face_attribute(&self, name: &str) -> bool {
        self.face_attributes.has(name)
    }

    /// Register a face attribute. See [`PolyMesh::add_vertex_attribute`].
    pub fn add_face_attribute(
        &mut self,
        definition: AttributeDefinition,
    ) -> &mut AttributeDefinition {
        if !self.face_attributes.has(definition.name()) {
            let name = definition.name().to_owned();
            let default = definition.default.clone();
            for (_, face) in self.faces.iter_mut() {
                face.attributes.insert(name.clone(), default.clone());
            }
        }
        self.face_attributes.register(definition)
    }

    /// The vertex attribute registry.
    pub fn vertex_attributes(&self) -> &AttributeRegistry {
        &self.vertex_attributes
    }

    /// The edge attribute registry.
    pub fn edge_attributes(&self) -> &AttributeRegistry {
        &self.edge_attributes
    }

    /// The loop attribute registry.
    pub fn loop_attributes(&self) -> &AttributeRegistry {
        &self.loop_attributes
    }

    /// The face attribute registry.
    pub fn face_attributes(&self) -> &AttributeRegistry {
        &self.face_attributes
    }

    // ==================== Topology Construction ====================

    /// Add a new isolated vertex at the given position.
    pub fn add_vertex(&mut self, position: Point3<f32>) -> VertexId {
        self.insert_vertex(Vertex::new(position))
    }

    /// Add a new isolated vertex from coordinates.
    pub fn add_vertex_at(&mut self, x: f32, y: f32, z: f32) -> VertexId {
        self.add_vertex(Point3::new(x, y, z))
    }

    /// Add a pre-built vertex. The vertex must be detached (`edge` unset);
    /// its attribute map is brought up to date with the registry, which
    /// resets any pre-set value of the wrong type or dimension.
    pub fn insert_vertex(&mut self, mut vertex: Vertex) -> VertexId {
        self.vertex_attributes.ensure(&mut vertex.attributes);
        self.vertices.insert(vertex)
    }

    /// Get or create the edge between two distinct vertices.
    ///
    /// If an edge already connects the pair it is returned as-is, so calling
    /// this twice with the same arguments (in either order) yields the same
    /// handle. A new edge is spliced into both endpoints' disk cycles.
    ///
    /// Panics if `a == b`.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        assert_ne!(a, b, "edge endpoints must be distinct");
        if let Some(existing) = self.find_edge(a, b) {
            return existing;
        }

        let mut attributes = HashMap::new();
        self.edge_attributes.ensure(&mut attributes);

        // New edges start as singleton cycles on both sides; the splice
        // below rewires them into any existing cycle.
        let e = self.edges.insert_with(|id| Edge {
            links: [
                DiskLink {
                    vertex: a,
                    next: id,
                    prev: id,
                },
                DiskLink {
                    vertex: b,
                    next: id,
                    prev: id,
                },
            ],
            radial: None,
            id: 0,
            attributes,
        });

        self.disk_splice(e, a);
        self.disk_splice(e, b);
        e
    }

    /// Add a face over the given vertices, in polygon order.
    ///
    /// Edges are created on demand: edge `k` connects `verts[k]` to
    /// `verts[(k + 1) % n]`, reusing existing edges where present. Faces
    /// with two corners are valid; both corners then share a single edge.
    /// Returns `None` for empty input.
    pub fn add_face(&mut self, verts: &[VertexId]) -> Option<FaceId> {
        if verts.is_empty() {
            return None;
        }
        let n = verts.len();

        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(verts[i], verts[(i + 1) % n]));
        }

        let mut attributes = HashMap::new();
        self.face_attributes.ensure(&mut attributes);
        let f = self.faces.insert(Face {
            first_loop: None,
            vert_count: n,
            id: 0,
            attributes,
        });

        for i in 0..n {
            let mut attributes = HashMap::new();
            self.loop_attributes.ensure(&mut attributes);
            let l = self.loops.insert_with(|id| Loop {
                vert: verts[i],
                edge: edges[i],
                face: f,
                next: id,
                prev: id,
                radial_next: id,
                radial_prev: id,
                attributes,
            });
            self.face_splice(f, l);
            self.radial_splice(edges[i], l);
        }

        Some(f)
    }

    /// Splice `e` into `v`'s disk cycle. A new element goes immediately
    /// after the current entry edge; `v.edge` itself is not reassigned
    /// unless the cycle was empty.
    fn disk_splice(&mut self, e: EdgeId, v: VertexId) {
        match self.vertices[v].edge {
            None => {
                // The edge was constructed self-linked, already a singleton.
                self.vertices[v].edge = Some(e);
            }
            Some(head) => {
                let head_next = self.edges[head].disk_next(v);
                {
                    let link = self.edges[e].disk_link_mut(v);
                    link.prev = head;
                    link.next = head_next;
                }
                self.edges[head].disk_link_mut(v).next = e;
                self.edges[head_next].disk_link_mut(v).prev = e;
            }
        }
    }

    /// Splice `l` into `f`'s face cycle, immediately after the current
    /// entry loop, and make it the new entry.
    fn face_splice(&mut self, f: FaceId, l: LoopId) {
        if let Some(head) = self.faces[f].first_loop {
            let head_next = self.loops[head].next;
            {
                let node = &mut self.loops[l];
                node.prev = head;
                node.next = head_next;
            }
            self.loops[head].next = l;
            self.loops[head_next].prev = l;
        }
        self.faces[f].first_loop = Some(l);
    }

    /// Splice `l` into `e`'s radial cycle, immediately after the current
    /// entry loop, and make it the new entry.
    fn radial_splice(&mut self, e: EdgeId, l: LoopId) {
        if let Some(head) = self.edges[e].radial {
            let head_next = self.loops[head].radial_next;
            {
                let node = &mut self.loops[l];
                node.radial_prev = head;
                node.radial_next = head_next;
            }
            self.loops[head].radial_next = l;
            self.loops[head_next].radial_prev = l;
        }
        self.edges[e].radial = Some(l);
    }

    // ==================== Topology Removal ====================

    /// Remove a face and all of its loops.
    ///
    /// Each loop is unlinked from its edge's radial cycle; the edges and
    /// vertices themselves survive.
    pub fn remove_face(&mut self, f: FaceId) {
        let start = self.faces[f].first_loop.expect("face has no loop cycle");
        let mut l = start;
        loop {
            // Grab the successor before the node is freed.
            let next = self.loops[l].next;
            self.radial_unlink(l);
            self.loops.remove(l);
            if next == start {
                break;
            }
            l = next;
        }
        self.faces.remove(f);
    }

    /// Remove an edge. Every face using the edge is removed first, then the
    /// edge is unspliced from both endpoints' disk cycles. Endpoints whose
    /// entry edge this was are repointed, or become isolated if this was
    /// their last edge.
    pub fn remove_edge(&mut self, e: EdgeId) {
        while let Some(l) = self.edges[e].radial {
            let f = self.loops[l].face;
            self.remove_face(f);
        }
        let (a, b) = self.edges[e].endpoints();
        self.disk_unlink(e, a);
        self.disk_unlink(e, b);
        self.edges.remove(e);
    }

    /// Remove a vertex, cascading over its disk cycle: every incident edge
    /// goes, which in turn removes every face using any of those edges.
    pub fn remove_vertex(&mut self, v: VertexId) {
        while let Some(e) = self.vertices[v].edge {
            self.remove_edge(e);
        }
        self.vertices.remove(v);
    }

    /// Unsplice `e` from `v`'s disk cycle, repointing `v.edge` if it was
    /// the entry.
    fn disk_unlink(&mut self, e: EdgeId, v: VertexId) {
        let (next, prev) = {
            let link = self.edges[e].disk_link(v);
            (link.next, link.prev)
        };
        if self.vertices[v].edge == Some(e) {
            self.vertices[v].edge = if next != e { Some(next) } else { None };
        }
        self.edges[prev].disk_link_mut(v).next = next;
        self.edges[next].disk_link_mut(v).prev = prev;
    }

    /// Unsplice `l` from its edge's radial cycle. The face side must
    /// already have been handled; only [`PolyMesh::remove_face`] calls this.
    fn radial_unlink(&mut self, l: LoopId) {
        let (e, radial_next, radial_prev) = {
            let node = &self.loops[l];
            (node.edge, node.radial_next, node.radial_prev)
        };
        if radial_next == l {
            self.edges[e].radial = None;
        } else {
            self.loops[radial_prev].radial_next = radial_next;
            self.loops[radial_next].radial_prev = radial_prev;
            if self.edges[e].radial == Some(l) {
                self.edges[e].radial = Some(radial_next);
            }
        }
    }

    // ==================== Topology Queries ====================

    /// Find the edge connecting two distinct vertices, if any.
    ///
    /// Walks both disk cycles in lockstep and stops as soon as either walk
    /// wraps around, bounding the work by twice the smaller vertex degree.
    /// If several edges connect the pair (which `add_edge` never produces),
    /// whichever the walk reaches first is returned.
    ///
    /// Panics if `a == b`.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        assert_ne!(a, b, "find_edge endpoints must be distinct");
        let start_a = self.vertices[a].edge?;
        let start_b = self.vertices[b].edge?;

        let mut ea = start_a;
        let mut eb = start_b;
        loop {
            if self.edges[ea].contains_vertex(b) {
                return Some(ea);
            }
            if self.edges[eb].contains_vertex(a) {
                return Some(eb);
            }
            ea = self.edges[ea].disk_next(a);
            eb = self.edges[eb].disk_next(b);
            if ea == start_a || eb == start_b {
                return None;
            }
        }
    }

    /// Find the loop of face `f` cornered at vertex `v`, if any.
    pub fn find_loop(&self, f: FaceId, v: VertexId) -> Option<LoopId> {
        self.face_loops(f).find(|&l| self.loops[l].vert == v)
    }

    /// Iterate over the edges incident to a vertex, in disk-cycle order.
    /// Empty for an isolated vertex.
    pub fn vertex_edges(&self, v: VertexId) -> VertexEdgeIter<'_> {
        VertexEdgeIter::new(self, v)
    }

    /// The faces incident to a vertex, deduplicated, in first-seen order.
    pub fn vertex_faces(&self, v: VertexId) -> Vec<FaceId> {
        let mut faces = Vec::new();
        for e in self.vertex_edges(v) {
            for l in self.edge_loops(e) {
                let f = self.loops[l].face;
                if !faces.contains(&f) {
                    faces.push(f);
                }
            }
        }
        faces
    }

    /// Iterate over the loops in an edge's radial cycle, one per face usage
    /// of the edge. Empty for a wireframe edge.
    pub fn edge_loops(&self, e: EdgeId) -> RadialLoopIter<'_> {
        RadialLoopIter::new(self, e)
    }

    /// Iterate over the faces using an edge. A face appears once per usage,
    /// which for ordinary faces means once.
    pub fn edge_faces(&self, e: EdgeId) -> impl Iterator<Item = FaceId> + '_ {
        self.edge_loops(e).map(move |l| self.loops[l].face)
    }

    /// Iterate over a face's loops in face-cycle order, starting at the
    /// entry loop.
    pub fn face_loops(&self, f: FaceId) -> FaceLoopIter<'_> {
        FaceLoopIter::new(self, f)
    }

    /// Iterate over a face's vertices in face-cycle order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_loops(f).map(move |l| self.loops[l].vert)
    }

    /// Iterate over a face's edges in face-cycle order. Index-aligned with
    /// [`PolyMesh::face_vertices`]: the edge at position `i` connects the
    /// vertex at position `i` to the vertex at position `i + 1`.
    pub fn face_edges(&self, f: FaceId) -> impl Iterator<Item = EdgeId> + '_ {
        self.face_loops(f).map(move |l| self.loops[l].edge)
    }

    // ==================== Geometry ====================

    /// Compute the midpoint of an edge.
    pub fn edge_center(&self, e: EdgeId) -> Point3<f32> {
        let (a, b) = self.edges[e].endpoints();
        let pa = self.vertices[a].position;
        let pb = self.vertices[b].position;
        Point3::from((pa.coords + pb.coords) * 0.5)
    }

    /// Compute the vector from an edge's first endpoint to its second.
    pub fn edge_vector(&self, e: EdgeId) -> Vector3<f32> {
        let (a, b) = self.edges[e].endpoints();
        self.vertices[b].position - self.vertices[a].position
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f32 {
        self.edge_vector(e).norm()
    }

    /// Compute the arithmetic mean of a face's vertex positions.
    pub fn face_center(&self, f: FaceId) -> Point3<f32> {
        let mut sum = Vector3::zeros();
        let mut count = 0;
        for v in self.face_vertices(f) {
            sum += self.vertices[v].position.coords;
            count += 1;
        }
        Point3::from(sum / count as f32)
    }

    /// Compute the unit normal of a face by Newell's method, which is well
    /// defined for non-planar polygons. Degenerate faces (for example
    /// two-corner faces) yield the zero vector.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f32> {
        let positions: Vec<Point3<f32>> = self
            .face_vertices(f)
            .map(|v| self.vertices[v].position)
            .collect();

        let mut normal = Vector3::zeros();
        for i in 0..positions.len() {
            let p = positions[i];
            let q = positions[(i + 1) % positions.len()];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.try_normalize(1.0e-12).unwrap_or_else(Vector3::zeros)
    }

    /// Compute the bounding box of the mesh, or `None` if it has no
    /// vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut iter = self.vertices.iter();
        let (_, first) = iter.next()?;
        let mut min = first.position;
        let mut max = first.position;

        for (_, vertex) in iter {
            for i in 0..3 {
                min[i] = min[i].min(vertex.position[i]);
                max[i] = max[i].max(vertex.position[i]);
            }
        }
        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent: every cycle closes in
    /// exactly as many steps as it has members, successor and predecessor
    /// pointers are mutual inverses, no edge is a self-edge, and every
    /// cross-reference points at a live entity.
    ///
    /// Linear scans per entity make this quadratic; it is a debugging and
    /// test aid, not a hot-path operation.
    pub fn is_valid(&self) -> bool {
        // Vertex entry edges and disk closure.
        for (vid, vertex) in self.vertices.iter() {
            let degree = self
                .edges
                .iter()
                .filter(|(_, e)| e.contains_vertex(vid))
                .count();
            match vertex.edge {
                None => {
                    if degree != 0 {
                        return false;
                    }
                }
                Some(start) => {
                    let mut e = start;
                    let mut steps = 0;
                    loop {
                        steps += 1;
                        if steps > degree {
                            return false;
                        }
                        let edge = match self.edges.get(e) {
                            Some(edge) if edge.contains_vertex(vid) => edge,
                            _ => return false,
                        };
                        e = edge.disk_next(vid);
                        if e == start {
                            break;
                        }
                    }
                    if steps != degree {
                        return false;
                    }
                }
            }
        }

        // Edge endpoints, disk pointer inverses and radial closure.
        for (eid, edge) in self.edges.iter() {
            let (a, b) = edge.endpoints();
            if a == b {
                return false;
            }
            for v in [a, b] {
                match self.vertices.get(v) {
                    Some(vertex) if vertex.edge.is_some() => {}
                    _ => return false,
                }
                let next = edge.disk_next(v);
                let prev = edge.disk_prev(v);
                match (self.edges.get(next), self.edges.get(prev)) {
                    (Some(n), Some(p)) => {
                        if !n.contains_vertex(v) || !p.contains_vertex(v) {
                            return false;
                        }
                        if n.disk_prev(v) != eid || p.disk_next(v) != eid {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }

            let uses = self.loops.iter().filter(|(_, l)| l.edge == eid).count();
            match edge.radial {
                None => {
                    if uses != 0 {
                        return false;
                    }
                }
                Some(start) => {
                    let mut l = start;
                    let mut steps = 0;
                    loop {
                        steps += 1;
                        if steps > uses {
                            return false;
                        }
                        let node = match self.loops.get(l) {
                            Some(node) if node.edge == eid => node,
                            _ => return false,
                        };
                        l = node.radial_next;
                        if l == start {
                            break;
                        }
                    }
                    if steps != uses {
                        return false;
                    }
                }
            }
        }

        // Loop coherence and pointer inverses.
        for (lid, node) in self.loops.iter() {
            let edge = match self.edges.get(node.edge) {
                Some(edge) => edge,
                None => return false,
            };
            if !self.vertices.contains(node.vert) || !edge.contains_vertex(node.vert) {
                return false;
            }
            if !self.faces.contains(node.face) {
                return false;
            }

            let inverses_hold = (|| {
                Some(
                    self.loops.get(node.next)?.prev == lid
                        && self.loops.get(node.prev)?.next == lid
                        && self.loops.get(node.radial_next)?.radial_prev == lid
                        && self.loops.get(node.radial_prev)?.radial_next == lid,
                )
            })();
            if inverses_hold != Some(true) {
                return false;
            }

            // Consecutive corners share exactly the edge between them.
            let successor = &self.loops[node.next];
            if successor.face != node.face || successor.vert != edge.other_vertex(node.vert) {
                return false;
            }
        }

        // Face cycles close in exactly vert_count steps.
        for (fid, face) in self.faces.iter() {
            let start = match face.first_loop {
                Some(start) => start,
                None => return false,
            };
            let mut l = start;
            let mut steps = 0;
            loop {
                steps += 1;
                if steps > face.vert_count {
                    return false;
                }
                let node = match self.loops.get(l) {
                    Some(node) if node.face == fid => node,
                    _ => return false,
                };
                l = node.next;
                if l == start {
                    break;
                }
            }
            if steps != face.vert_count {
                return false;
            }
        }

        true
    }
}

/// Iterator over the edges in a vertex's disk cycle.
pub struct VertexEdgeIter<'a> {
    mesh: &'a PolyMesh,
    vertex: VertexId,
    state: Option<(EdgeId, EdgeId)>,
}

impl<'a> VertexEdgeIter<'a> {
    fn new(mesh: &'a PolyMesh, vertex: VertexId) -> Self {
        let state = mesh.vertices[vertex].edge.map(|start| (start, start));
        Self {
            mesh,
            vertex,
            state,
        }
    }
}

impl<'a> Iterator for VertexEdgeIter<'a> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        let (start, current) = self.state?;
        let advanced = self.mesh.edges[current].disk_next(self.vertex);
        self.state = if advanced == start {
            None
        } else {
            Some((start, advanced))
        };
        Some(current)
    }
}

/// Iterator over the loops in an edge's radial cycle.
pub struct RadialLoopIter<'a> {
    mesh: &'a PolyMesh,
    state: Option<(LoopId, LoopId)>,
}

impl<'a> RadialLoopIter<'a> {
    fn new(mesh: &'a PolyMesh, edge: EdgeId) -> Self {
        let state = mesh.edges[edge].radial.map(|start| (start, start));
        Self { mesh, state }
    }
}

impl<'a> Iterator for RadialLoopIter<'a> {
    type Item = LoopId;

    fn next(&mut self) -> Option<LoopId> {
        let (start, current) = self.state?;
        let advanced = self.mesh.loops[current].radial_next;
        self.state = if advanced == start {
            None
        } else {
            Some((start, advanced))
        };
        Some(current)
    }
}

/// Iterator over the loops in a face's cycle, in polygon order.
pub struct FaceLoopIter<'a> {
    mesh: &'a PolyMesh,
    state: Option<(LoopId, LoopId)>,
}

impl<'a> FaceLoopIter<'a> {
    fn new(mesh: &'a PolyMesh, face: FaceId) -> Self {
        let start = mesh.faces[face]
            .first_loop
            .expect("face has no loop cycle");
        Self {
            mesh,
            state: Some((start, start)),
        }
    }
}

impl<'a> Iterator for FaceLoopIter<'a> {
    type Item = LoopId;

    fn next(&mut self) -> Option<LoopId> {
        let (start, current) = self.state?;
        let advanced = self.mesh.loops[current].next;
        self.state = if advanced == start {
            None
        } else {
            Some((start, advanced))
        };
        Some(current)
    }
}
