//! Shared helpers for the graphics integration tests.

#![allow(dead_code)]

use oflike_core::math::{Affine2, Mat4};
use oflike_core::mesh::{Mesh, PrimitiveTopology, Vertex2D};
use oflike_core::{Color, Material};
use oflike_graphics::{
    BlendMode, Draw2D, Draw3D, DrawCommand, DrawList, DrawRange, DummyBackend, GpuBackend,
    LightSet, TextureHandle,
};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Backends the tests can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Records calls, always available.
    Dummy,
    /// Headless wgpu, needs the `wgpu-backend` feature and an adapter.
    Wgpu,
}

impl Backend {
    /// Create the backend, or `None` when it is unavailable here.
    pub fn create(self, width: u32, height: u32) -> Option<Box<dyn GpuBackend>> {
        match self {
            Backend::Dummy => Some(Box::new(DummyBackend::new())),
            #[cfg(feature = "wgpu-backend")]
            Backend::Wgpu => match oflike_graphics::WgpuBackend::new(width, height) {
                Ok(backend) => Some(Box::new(backend)),
                Err(e) => {
                    eprintln!("wgpu backend not available: {e}");
                    None
                }
            },
            #[cfg(not(feature = "wgpu-backend"))]
            Backend::Wgpu => {
                let _ = (width, height);
                None
            }
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

/// Record an axis-aligned rectangle as two triangles.
pub fn record_rect(list: &mut DrawList, x: f32, y: f32, w: f32, h: f32, color: Color) -> DrawCommand {
    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y), (x + w, y + h), (x, y + h)];
    let vertices: Vec<Vertex2D> = corners
        .iter()
        .map(|&(px, py)| Vertex2D::new(px, py, color))
        .collect();
    let first = list.extend_vertices_2d(&vertices);
    let command = DrawCommand::Draw2D(Draw2D {
        range: DrawRange::vertices(first, 6),
        topology: PrimitiveTopology::Triangles,
        blend: BlendMode::Alpha,
        texture: None,
        transform: Affine2::IDENTITY,
    });
    list.add_command(command).expect("rect is valid");
    command
}

/// Record an indexed mesh with the given material and texture.
pub fn record_mesh(
    list: &mut DrawList,
    mesh: &Mesh,
    material: Material,
    texture: Option<TextureHandle>,
) -> DrawCommand {
    let (topology, local) = mesh.to_list_indices();
    let first = list.extend_vertices_3d(mesh.vertices());
    let index = list.extend_indices(&local, first);
    let material = list.intern_material(material);
    let command = DrawCommand::Draw3D(Draw3D {
        range: DrawRange::indexed(first, mesh.vertex_count() as u32, index, local.len() as u32),
        topology,
        blend: BlendMode::Opaque,
        texture,
        material,
        light_set: LightSet::NONE,
        model: Mat4::identity(),
        depth_test: true,
    });
    list.add_command(command).expect("mesh is valid");
    command
}

/// Check that every command's ranges lie inside the arenas.
pub fn assert_ranges_in_bounds(list: &DrawList) {
    for (i, command) in list.commands().iter().enumerate() {
        let (Some(range), Some(dimension)) = (command.range(), command.dimension()) else {
            continue;
        };
        let len = match dimension {
            oflike_graphics::Dimension::D2 => list.vertices_2d().len(),
            oflike_graphics::Dimension::D3 => list.vertices_3d().len(),
        };
        assert!(range.vertex_end() as usize <= len, "command {i} vertices out of bounds");
        if range.is_indexed() {
            let end = (range.index_offset + range.index_count) as usize;
            assert!(end <= list.indices().len(), "command {i} indices out of bounds");
            for &index in &list.indices()[range.index_offset as usize..end] {
                assert!(
                    (range.vertex_offset..range.vertex_end()).contains(&index),
                    "command {i} index {index} outside its vertex range"
                );
            }
        }
    }
}
