//! 3D meshes and primitives.

use std::rc::Rc;

use oflike_core::mesh::{Mesh, MeshError, Primitive, PrimitiveTopology, Vertex3D};
use oflike_graphics::Misuse;

use crate::context::Graphics;
use crate::state::FillMode;

/// Recently drawn primitive meshes, most recent last.
///
/// Regenerating a primitive is deterministic, so a cached mesh is always
/// identical to a fresh one.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveCache {
    entries: Vec<(Primitive, Rc<Mesh>)>,
    capacity: usize,
}

impl PrimitiveCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get_or_generate(&mut self, primitive: &Primitive) -> Rc<Mesh> {
        if let Some(i) = self.entries.iter().position(|(p, _)| p == primitive) {
            let entry = self.entries.remove(i);
            let mesh = entry.1.clone();
            self.entries.push(entry);
            return mesh;
        }
        log::trace!("generating {} mesh", primitive.kind());
        let mesh = Rc::new(primitive.regenerate());
        if self.capacity == 0 {
            return mesh;
        }
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((*primitive, mesh.clone()));
        mesh
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Graphics {
    // ========================================================================
    // Meshes
    // ========================================================================

    /// Check a mesh before recording it. Broken meshes are reported once and
    /// skipped.
    fn accept_mesh(&mut self, mesh: &Mesh) -> bool {
        match mesh.validate() {
            Ok(()) => !mesh.is_empty(),
            Err(e @ MeshError::IndexOutOfRange { .. }) => {
                self.report(Misuse::INDEX_OUT_OF_RANGE, format!("mesh not drawn: {e}"));
                false
            }
            Err(e) => {
                self.report(Misuse::INVALID_COMMAND, format!("mesh not drawn: {e}"));
                false
            }
        }
    }

    /// Vertices of `mesh`, painted with the current color when the mesh has
    /// no colors of its own.
    fn mesh_vertices<'m>(&self, mesh: &'m Mesh) -> std::borrow::Cow<'m, [Vertex3D]> {
        if mesh.has_colors() {
            return std::borrow::Cow::Borrowed(mesh.vertices());
        }
        let color = self.state.color;
        std::borrow::Cow::Owned(mesh.vertices().iter().map(|v| v.with_color(color)).collect())
    }

    /// Draw a mesh with the current model matrix, material, texture and
    /// lights. Strips, fans and loops are converted to lists.
    pub fn draw_mesh(&mut self, mesh: &Mesh) {
        if !self.accept_mesh(mesh) {
            return;
        }
        let (topology, indices) = mesh.to_list_indices();
        let vertices = self.mesh_vertices(mesh);
        self.emit_3d(&vertices, &indices, topology);
    }

    /// Draw the unique edges of a mesh as lines. Wireframes are never lit.
    pub fn draw_mesh_wireframe(&mut self, mesh: &Mesh) {
        if !self.accept_mesh(mesh) {
            return;
        }
        let indices = mesh.wireframe_indices();
        let vertices = self.mesh_vertices(mesh);
        self.emit_3d(&vertices, &indices, PrimitiveTopology::Lines);
    }

    /// Draw a primitive, filled or as a wireframe per the fill mode.
    pub fn draw_primitive(&mut self, primitive: &Primitive) {
        let mesh = self.primitive_mesh(primitive);
        match self.state.fill {
            FillMode::Fill => self.draw_mesh(&mesh),
            FillMode::Outline => self.draw_mesh_wireframe(&mesh),
        }
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Box centered on the origin of the current model matrix.
    pub fn draw_box(&mut self, width: f32, height: f32, depth: f32) {
        self.draw_primitive(&Primitive::Box {
            width,
            height,
            depth,
            resolution: [1, 1, 1],
        });
    }

    /// UV sphere using the current sphere resolution.
    pub fn draw_sphere(&mut self, radius: f32) {
        let resolution = self.state.sphere_resolution();
        self.draw_primitive(&Primitive::sphere(radius, resolution));
    }

    pub fn draw_ico_sphere(&mut self, radius: f32, subdivisions: u32) {
        self.draw_primitive(&Primitive::ico_sphere(radius, subdivisions));
    }

    /// Capped cylinder along Y, radial resolution from the sphere resolution.
    pub fn draw_cylinder(&mut self, radius: f32, height: f32) {
        let radial = self.state.sphere_resolution();
        self.draw_primitive(&Primitive::cylinder(radius, height, radial));
    }

    /// Capped cone along Y with its apex at `+height / 2`.
    pub fn draw_cone(&mut self, radius: f32, height: f32) {
        let radial = self.state.sphere_resolution();
        self.draw_primitive(&Primitive::cone(radius, height, radial));
    }

    /// Plane in XZ facing +Y.
    pub fn draw_plane(&mut self, width: f32, height: f32) {
        self.draw_primitive(&Primitive::plane(width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_core::Color;
    use oflike_core::math::mat4_translation;
    use oflike_graphics::DrawCommand;

    fn frame() -> Graphics {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g
    }

    fn draws_3d(g: &Graphics) -> Vec<oflike_graphics::Draw3D> {
        g.list()
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Draw3D(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cache_reuses_meshes() {
        let mut cache = PrimitiveCache::new(2);
        let a = cache.get_or_generate(&Primitive::cube(1.0));
        let b = cache.get_or_generate(&Primitive::cube(1.0));
        assert!(Rc::ptr_eq(&a, &b));
        cache.get_or_generate(&Primitive::cube(2.0));
        cache.get_or_generate(&Primitive::cube(3.0));
        assert_eq!(cache.len(), 2);
        let c = cache.get_or_generate(&Primitive::cube(1.0));
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }

    #[test]
    fn test_draw_mesh_records_model_and_color() {
        let mut g = frame();
        g.set_color(255, 0, 0);
        g.translate_3d(1.0, 2.0, 3.0);
        g.draw_box(1.0, 1.0, 1.0);
        let draws = draws_3d(&g);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].model, mat4_translation(1.0, 2.0, 3.0));
        assert_eq!(draws[0].range.index_count, 36);
        assert!(g
            .list()
            .vertices_3d()
            .iter()
            .all(|v| v.color == Color::RED.to_array()));
    }

    #[test]
    fn test_invalid_mesh_is_skipped() {
        let mut g = frame();
        let mesh = Mesh::new(PrimitiveTopology::Triangles)
            .with_vertices(vec![Vertex3D::new([0.0; 3]); 3])
            .with_indices(vec![0, 1, 7]);
        g.draw_mesh(&mesh);
        assert!(g.list().is_empty());
        assert!(g.misuse().has_reported(Misuse::INDEX_OUT_OF_RANGE));
    }

    #[test]
    fn test_no_fill_draws_wireframe() {
        let mut g = frame();
        g.no_fill();
        g.draw_box(1.0, 1.0, 1.0);
        let draws = draws_3d(&g);
        assert_eq!(draws[0].topology, PrimitiveTopology::Lines);
        assert!(!draws[0].light_set.is_lit());
    }

    #[test]
    fn test_strip_mesh_becomes_list() {
        let mut g = frame();
        let mesh = Mesh::new(PrimitiveTopology::TriangleStrip).with_vertices(vec![
            Vertex3D::new([0.0, 0.0, 0.0]),
            Vertex3D::new([1.0, 0.0, 0.0]),
            Vertex3D::new([0.0, 1.0, 0.0]),
            Vertex3D::new([1.0, 1.0, 0.0]),
        ]);
        g.draw_mesh(&mesh);
        let draws = draws_3d(&g);
        assert_eq!(draws[0].topology, PrimitiveTopology::Triangles);
        assert_eq!(draws[0].range.index_count, 6);
    }

    #[test]
    fn test_enabled_lights_captured() {
        let mut g = frame();
        let slot = g
            .register_light(oflike_core::Light::point(oflike_core::math::Vec3::new(0.0, 5.0, 0.0)))
            .unwrap();
        g.enable_light(slot);
        g.draw_sphere(1.0);
        g.disable_light(slot);
        g.draw_sphere(1.0);
        let draws = draws_3d(&g);
        assert_eq!(draws[0].light_set.mask, 1);
        assert!(!draws[1].light_set.is_lit());
    }
}
