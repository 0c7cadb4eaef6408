//! # oflike Graphics
//!
//! Retained draw lists for an immediate-mode drawing API.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`DrawList`] - Frame-local command list over shared vertex and index arenas
//! - [`DrawList::optimize`] / [`DrawList::sort_commands`] - Batching of compatible draws
//! - [`LightRegistry`] and the uniform blocks for lit 3D draws
//! - [`Renderer`] - Walks a list and drives a [`GpuBackend`]
//! - Backends: [`DummyBackend`] for tests, `WgpuBackend` behind `wgpu-backend`
//!
//! ## Example
//!
//! ```ignore
//! use oflike_graphics::{DrawList, DummyBackend, Renderer};
//!
//! let mut list = DrawList::new();
//! // record commands...
//! list.optimize();
//! let stats = Renderer::default().render(&mut list, &mut DummyBackend::new())?;
//! ```

pub mod backend;
pub mod draw_list;
pub mod error;
pub mod lighting;
pub mod misuse;
pub mod optimize;
pub mod profiling;
pub mod renderer;
pub mod shader;
pub mod types;

pub use backend::{
    BackendError, BufferHandle, BufferKind, Dimension, DummyBackend, FailurePoint, GpuBackend,
    GpuCall, PipelineVariant, UniformSlot,
};
#[cfg(feature = "wgpu-backend")]
pub use backend::wgpu_backend::WgpuBackend;
pub use draw_list::{Draw2D, Draw3D, DrawCommand, DrawList, DrawListError, DrawRange};
pub use error::GraphicsError;
pub use lighting::{
    LightRegistry, LightSlot, LightSnapshot, LightingUniforms, MAX_LIGHTS, MaterialUniforms,
};
pub use misuse::{Misuse, MisuseLog};
pub use optimize::can_merge;
pub use renderer::{FrameStats, Renderer, RendererConfig};
pub use shader::{CameraUniforms, ObjectUniforms, ShaderComposer, ShaderLibrary};
pub use types::{BlendMode, ClearColor, DeviceId, LightSet, MaterialId, Rect, TextureHandle};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
pub fn init() {
    log::info!("oflike graphics v{} initialized", VERSION);
}
