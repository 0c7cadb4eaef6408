//! Interleaved vertex formats shared by the recorder and the GPU backends.

use crate::color::Color;

/// A 2D vertex: position, texture coordinate and per-vertex color.
///
/// 2D geometry is transformed on the CPU, so positions are final screen-space
/// points when they reach the draw list.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2D {
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            uv: [0.0, 0.0],
            color: color.to_array(),
        }
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.uv = [u, v];
        self
    }
}

impl Default for Vertex2D {
    fn default() -> Self {
        Self::new(0.0, 0.0, Color::WHITE)
    }
}

/// A 3D vertex: position, normal, texture coordinate and color.
///
/// Streams a mesh does not provide are stored as defaults: normal `(0,0,1)`,
/// UV zero and white.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex3D {
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color.to_array();
        self
    }
}

impl Default for Vertex3D {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0; 2],
            color: [1.0; 4],
        }
    }
}
