//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`Mesh`] - Interleaved [`Vertex3D`] data with optional `u32` indices
//! - [`MeshError`] - Structural validation failures

use std::collections::{HashMap, HashSet};

use crate::color::Color;

use super::vertex::Vertex3D;

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PrimitiveTopology {
    /// Every three vertices form a triangle.
    #[default]
    Triangles,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Triangles share the first vertex.
    TriangleFan,
    /// Every two vertices form a line.
    Lines,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// A line strip closed back to its first vertex.
    LineLoop,
    /// Each vertex is a separate point.
    Points,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive (for list topologies).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::Points => Some(1),
            Self::Lines => Some(2),
            Self::Triangles => Some(3),
            Self::TriangleStrip | Self::TriangleFan | Self::LineStrip | Self::LineLoop => None,
        }
    }

    /// Whether consecutive runs of this topology can be concatenated.
    pub fn is_list(&self) -> bool {
        self.vertices_per_primitive().is_some()
    }

    /// Whether the topology assembles triangles.
    pub fn is_triangles(&self) -> bool {
        matches!(
            self,
            Self::Triangles | Self::TriangleStrip | Self::TriangleFan
        )
    }

    /// Whether the topology assembles line segments.
    pub fn is_lines(&self) -> bool {
        matches!(self, Self::Lines | Self::LineStrip | Self::LineLoop)
    }

    /// List topology equivalent to this one.
    pub fn list_equivalent(&self) -> PrimitiveTopology {
        if self.is_triangles() {
            Self::Triangles
        } else if self.is_lines() {
            Self::Lines
        } else {
            Self::Points
        }
    }

    /// Whether `count` elements form a well-shaped primitive stream.
    pub fn accepts_count(&self, count: usize) -> bool {
        match self {
            Self::Points => true,
            Self::Lines => count % 2 == 0,
            Self::Triangles => count % 3 == 0,
            Self::TriangleStrip | Self::TriangleFan => count == 0 || count >= 3,
            Self::LineStrip | Self::LineLoop => count == 0 || count >= 2,
        }
    }
}

/// Structural mesh errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertex_count: usize,
    },
    #[error("{count} elements do not form whole {topology:?} primitives")]
    BadElementCount {
        topology: PrimitiveTopology,
        count: usize,
    },
    #[error("cannot combine {found:?} mesh into {expected:?} mesh")]
    TopologyMismatch {
        expected: PrimitiveTopology,
        found: PrimitiveTopology,
    },
}

/// A CPU-side mesh.
///
/// Vertices are interleaved, so normals and UVs exist for every vertex. The
/// `has_*` flags record which streams carry real data; they decide which
/// properties are written by the PLY exporter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    topology: PrimitiveTopology,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    has_normals: bool,
    has_uvs: bool,
    has_colors: bool,
}

impl Mesh {
    /// Create an empty mesh with the given topology.
    pub fn new(topology: PrimitiveTopology) -> Self {
        Self {
            topology,
            ..Default::default()
        }
    }

    /// Set the vertex data.
    pub fn with_vertices(mut self, vertices: Vec<Vertex3D>) -> Self {
        self.vertices = vertices;
        self
    }

    /// Set the index data.
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = indices;
        self
    }

    /// Set the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Declare which optional streams hold meaningful data.
    pub fn with_streams(mut self, normals: bool, uvs: bool, colors: bool) -> Self {
        self.has_normals = normals;
        self.has_uvs = uvs;
        self.has_colors = colors;
        self
    }

    /// Paint every vertex with `color`.
    pub fn with_color(mut self, color: Color) -> Self {
        for v in &mut self.vertices {
            v.color = color.to_array();
        }
        self.has_colors = true;
        self
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex3D] {
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        self.has_normals
    }

    pub fn has_uvs(&self) -> bool {
        self.has_uvs
    }

    pub fn has_colors(&self) -> bool {
        self.has_colors
    }

    /// Append a vertex, returning its index.
    pub fn add_vertex(&mut self, vertex: Vertex3D) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_index(&mut self, index: u32) {
        self.indices.push(index);
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Remove all vertices and indices, keeping topology and stream flags.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Number of elements that drive primitive assembly.
    pub fn element_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len()
        } else {
            self.vertices.len()
        }
    }

    /// Number of triangles the mesh assembles (0 for line and point meshes).
    pub fn triangle_count(&self) -> usize {
        let n = self.element_count();
        match self.topology {
            PrimitiveTopology::Triangles => n / 3,
            PrimitiveTopology::TriangleStrip | PrimitiveTopology::TriangleFan => {
                n.saturating_sub(2)
            }
            _ => 0,
        }
    }

    /// Check index bounds and primitive counts.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertices.len();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                position,
                vertex_count,
            });
        }
        let count = self.element_count();
        if !self.topology.accepts_count(count) {
            return Err(MeshError::BadElementCount {
                topology: self.topology,
                count,
            });
        }
        Ok(())
    }

    /// Replace the indices with the identity range `0..vertex_count`.
    pub fn set_indices_auto(&mut self) {
        self.indices = (0..self.vertices.len() as u32).collect();
    }

    /// Append another mesh of the same topology, rebasing its indices.
    ///
    /// If exactly one side is indexed the other side is promoted with an
    /// identity index range first.
    pub fn append(&mut self, other: &Mesh) -> Result<(), MeshError> {
        // an empty mesh adopts the incoming topology
        if self.vertices.is_empty() && self.indices.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.topology != other.topology {
            return Err(MeshError::TopologyMismatch {
                expected: self.topology,
                found: other.topology,
            });
        }
        let base = self.vertices.len() as u32;
        match (self.is_indexed(), other.is_indexed()) {
            (false, false) => {}
            (true, false) => {
                self.indices
                    .extend((0..other.vertices.len() as u32).map(|i| base + i));
            }
            (false, true) => {
                self.set_indices_auto();
                self.indices.extend(other.indices.iter().map(|i| base + i));
            }
            (true, true) => {
                self.indices.extend(other.indices.iter().map(|i| base + i));
            }
        }
        self.vertices.extend_from_slice(&other.vertices);
        self.has_normals |= other.has_normals;
        self.has_uvs |= other.has_uvs;
        self.has_colors |= other.has_colors;
        Ok(())
    }

    /// Triangles of the mesh as index triples, whatever the triangle topology.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let elements: Vec<u32> = if self.is_indexed() {
            self.indices.clone()
        } else {
            (0..self.vertices.len() as u32).collect()
        };
        match self.topology {
            PrimitiveTopology::Triangles => elements
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            PrimitiveTopology::TriangleStrip => elements
                .windows(3)
                .enumerate()
                .map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    }
                })
                .collect(),
            PrimitiveTopology::TriangleFan => {
                if elements.len() < 3 {
                    return Vec::new();
                }
                elements[1..]
                    .windows(2)
                    .map(|w| [elements[0], w[0], w[1]])
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Indices in the list topology equivalent to this mesh's topology.
    ///
    /// Strips, fans and loops are expanded so that the result can be
    /// concatenated with other list draws.
    pub fn to_list_indices(&self) -> (PrimitiveTopology, Vec<u32>) {
        let list = self.topology.list_equivalent();
        let elements = || -> Vec<u32> {
            if self.is_indexed() {
                self.indices.clone()
            } else {
                (0..self.vertices.len() as u32).collect()
            }
        };
        let indices = match self.topology {
            PrimitiveTopology::Triangles | PrimitiveTopology::Lines | PrimitiveTopology::Points => {
                elements()
            }
            PrimitiveTopology::TriangleStrip | PrimitiveTopology::TriangleFan => {
                self.triangles().into_iter().flatten().collect()
            }
            PrimitiveTopology::LineStrip | PrimitiveTopology::LineLoop => {
                let e = elements();
                let mut out = Vec::with_capacity(e.len() * 2);
                for w in e.windows(2) {
                    out.extend_from_slice(&[w[0], w[1]]);
                }
                if self.topology == PrimitiveTopology::LineLoop && e.len() > 2 {
                    out.extend_from_slice(&[e[e.len() - 1], e[0]]);
                }
                out
            }
        };
        (list, indices)
    }

    /// Unique edges as a line list, for wireframe rendering.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        if self.topology.is_lines() {
            return self.to_list_indices().1;
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for [a, b, c] in self.triangles() {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                if seen.insert((p.min(q), p.max(q))) {
                    out.extend_from_slice(&[p, q]);
                }
            }
        }
        out
    }

    /// Recompute per-vertex normals by area-weighted face accumulation.
    ///
    /// Only meaningful for triangle topologies; other meshes are left untouched.
    pub fn smooth_normals(&mut self) {
        if !self.topology.is_triangles() {
            return;
        }
        let mut accum = vec![[0.0f32; 3]; self.vertices.len()];
        for [a, b, c] in self.triangles() {
            let n = face_cross(
                self.vertices[a as usize].position,
                self.vertices[b as usize].position,
                self.vertices[c as usize].position,
            );
            for i in [a, b, c] {
                let acc = &mut accum[i as usize];
                acc[0] += n[0];
                acc[1] += n[1];
                acc[2] += n[2];
            }
        }
        for (v, n) in self.vertices.iter_mut().zip(accum) {
            v.normal = normalize_or(n, v.normal);
        }
        self.has_normals = true;
    }

    /// Give every triangle its own vertices with the face normal.
    ///
    /// The result is a non-indexed triangle list.
    pub fn flat_normals(&mut self) {
        if !self.topology.is_triangles() {
            return;
        }
        let triangles = self.triangles();
        let mut vertices = Vec::with_capacity(triangles.len() * 3);
        for [a, b, c] in triangles {
            let (va, vb, vc) = (
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            );
            let n = normalize_or(
                face_cross(va.position, vb.position, vc.position),
                [0.0, 0.0, 1.0],
            );
            for mut v in [va, vb, vc] {
                v.normal = n;
                vertices.push(v);
            }
        }
        self.vertices = vertices;
        self.indices.clear();
        self.topology = PrimitiveTopology::Triangles;
        self.has_normals = true;
    }

    /// Weld vertices whose attributes agree within `epsilon`.
    ///
    /// The mesh becomes indexed. Returns the number of vertices removed.
    pub fn merge_duplicate_vertices(&mut self, epsilon: f32) -> usize {
        let eps = epsilon.max(f32::EPSILON);
        let key = |v: &Vertex3D| -> [i64; 12] {
            let q = |x: f32| (x / eps).round() as i64;
            [
                q(v.position[0]),
                q(v.position[1]),
                q(v.position[2]),
                q(v.normal[0]),
                q(v.normal[1]),
                q(v.normal[2]),
                q(v.uv[0]),
                q(v.uv[1]),
                q(v.color[0]),
                q(v.color[1]),
                q(v.color[2]),
                q(v.color[3]),
            ]
        };

        let mut lookup: HashMap<[i64; 12], u32> = HashMap::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut unique = Vec::new();
        for v in &self.vertices {
            let id = *lookup.entry(key(v)).or_insert_with(|| {
                unique.push(*v);
                (unique.len() - 1) as u32
            });
            remap.push(id);
        }

        let removed = self.vertices.len() - unique.len();
        self.indices = if self.is_indexed() {
            self.indices.iter().map(|&i| remap[i as usize]).collect()
        } else {
            remap
        };
        self.vertices = unique;
        removed
    }
}

fn face_cross(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn normalize_or(n: [f32; 3], fallback: [f32; 3]) -> [f32; 3] {
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len <= f32::EPSILON {
        fallback
    } else {
        [n[0] / len, n[1] / len, n[2] / len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(PrimitiveTopology::Triangles)
            .with_vertices(vec![
                Vertex3D::new([0.0, 0.0, 0.0]),
                Vertex3D::new([1.0, 0.0, 0.0]),
                Vertex3D::new([1.0, 1.0, 0.0]),
                Vertex3D::new([0.0, 1.0, 0.0]),
            ])
            .with_indices(vec![0, 1, 2, 2, 3, 0])
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(quad().validate(), Ok(()));
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mesh = quad().with_indices(vec![0, 1, 4]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                index: 4,
                position: 2,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_validate_bad_triangle_count() {
        let mesh = quad().with_indices(vec![0, 1, 2, 3]);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::BadElementCount { count: 4, .. })
        ));
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut mesh = quad();
        mesh.append(&quad()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(&mesh.indices()[6..], &[4, 5, 6, 6, 7, 4]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_append_promotes_non_indexed() {
        let mut soup = Mesh::new(PrimitiveTopology::Triangles).with_vertices(vec![
            Vertex3D::new([0.0; 3]),
            Vertex3D::new([1.0, 0.0, 0.0]),
            Vertex3D::new([0.0, 1.0, 0.0]),
        ]);
        soup.append(&quad()).unwrap();
        assert_eq!(soup.indices(), &[0, 1, 2, 3, 4, 5, 5, 6, 3]);
    }

    #[test]
    fn test_append_topology_mismatch() {
        let mut lines = Mesh::new(PrimitiveTopology::Lines)
            .with_vertices(vec![Vertex3D::new([0.0; 3]), Vertex3D::new([1.0; 3])]);
        assert!(matches!(
            lines.append(&quad()),
            Err(MeshError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn test_fan_to_list() {
        let fan = Mesh::new(PrimitiveTopology::TriangleFan).with_vertices(vec![
            Vertex3D::new([0.0; 3]),
            Vertex3D::new([1.0, 0.0, 0.0]),
            Vertex3D::new([1.0, 1.0, 0.0]),
            Vertex3D::new([0.0, 1.0, 0.0]),
        ]);
        let (topology, indices) = fan.to_list_indices();
        assert_eq!(topology, PrimitiveTopology::Triangles);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_line_loop_to_list() {
        let lp = Mesh::new(PrimitiveTopology::LineLoop).with_vertices(vec![
            Vertex3D::new([0.0; 3]),
            Vertex3D::new([1.0, 0.0, 0.0]),
            Vertex3D::new([1.0, 1.0, 0.0]),
        ]);
        let (topology, indices) = lp.to_list_indices();
        assert_eq!(topology, PrimitiveTopology::Lines);
        assert_eq!(indices, vec![0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_wireframe_dedupes_shared_edge() {
        // two triangles sharing the diagonal: 5 unique edges
        assert_eq!(quad().wireframe_indices().len(), 10);
    }

    #[test]
    fn test_smooth_normals_planar() {
        let mut mesh = quad();
        mesh.smooth_normals();
        for v in mesh.vertices() {
            assert!((v.normal[2] - 1.0).abs() < 1e-6);
        }
        assert!(mesh.has_normals());
    }

    #[test]
    fn test_flat_normals_deindexes() {
        let mut mesh = quad();
        mesh.flat_normals();
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_merge_duplicate_vertices() {
        let mut mesh = quad();
        mesh.flat_normals();
        let removed = mesh.merge_duplicate_vertices(1e-5);
        assert_eq!(removed, 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_triangle_count() {
        assert_eq!(quad().triangle_count(), 2);
        let strip = Mesh::new(PrimitiveTopology::TriangleStrip)
            .with_vertices(vec![Vertex3D::default(); 5]);
        assert_eq!(strip.triangle_count(), 3);
    }
}
