//! GPU backend abstraction layer.
//!
//! The [`Renderer`](crate::Renderer) walks a draw list and talks to the GPU
//! only through the [`GpuBackend`] trait. Calls are immediate: the backend
//! records or executes them in the order received.
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: records every call for inspection in tests
//! - `WgpuBackend` (`wgpu-backend` feature): headless wgpu renderer

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub mod dummy;
mod error;

pub use dummy::{DummyBackend, FailurePoint, GpuCall};
pub use error::BackendError;

use oflike_core::mesh::PrimitiveTopology;

use crate::types::{BlendMode, ClearColor, DeviceId, Rect, TextureHandle};

/// Handle to a buffer uploaded for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// What an uploaded buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// [`Vertex2D`](oflike_core::mesh::Vertex2D) array.
    Vertices2D,
    /// [`Vertex3D`](oflike_core::mesh::Vertex3D) array.
    Vertices3D,
    /// `u32` indices.
    Indices,
}

/// Dimension of a pipeline's vertex format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    D2,
    D3,
}

/// Uniform block slots shared by the 2D and 3D shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    /// View and projection matrices.
    Camera = 0,
    /// Model matrix.
    Object = 1,
    /// Phong material (3D lit only).
    Material = 2,
    /// Light array (3D lit only).
    Lighting = 3,
}

impl UniformSlot {
    pub const COUNT: usize = 4;

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Pipeline state selected per draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineVariant {
    pub dimension: Dimension,
    pub textured: bool,
    pub lit: bool,
    pub blend: BlendMode,
    pub depth_test: bool,
}

impl PipelineVariant {
    pub fn flat_2d(blend: BlendMode) -> Self {
        Self {
            dimension: Dimension::D2,
            textured: false,
            lit: false,
            blend,
            depth_test: false,
        }
    }
}

/// GPU backend trait.
///
/// Resource failures are reported through `Result`; state-setting calls are
/// infallible and only valid between [`begin_pass`](Self::begin_pass) and
/// [`end_pass`](Self::end_pass).
pub trait GpuBackend {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Device that owns this backend's resources.
    fn device_id(&self) -> DeviceId;

    /// Create an RGBA8 texture.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, BackendError>;

    /// Upload frame data. Buffers live until [`present`](Self::present).
    fn upload_buffer(&mut self, kind: BufferKind, bytes: &[u8])
        -> Result<BufferHandle, BackendError>;

    fn begin_pass(&mut self, clear: ClearColor) -> Result<(), BackendError>;

    fn set_viewport(&mut self, rect: Rect);

    /// `None` disables scissoring.
    fn set_scissor(&mut self, rect: Option<Rect>);

    fn bind_pipeline(&mut self, variant: PipelineVariant);

    fn bind_vertices(&mut self, buffer: BufferHandle, offset: u64);

    fn bind_indices(&mut self, buffer: BufferHandle, offset: u64);

    fn bind_uniforms(&mut self, slot: UniformSlot, bytes: &[u8]);

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle);

    /// Draw `count` vertices starting at `first`.
    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Draw `count` indices starting at `first`. Indices address the bound
    /// vertex buffer directly.
    fn draw_indexed(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    fn end_pass(&mut self) -> Result<(), BackendError>;

    fn present(&mut self) -> Result<(), BackendError>;
}
