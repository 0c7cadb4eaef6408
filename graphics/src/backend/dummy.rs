//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It records every
//! call as a [`GpuCall`] so tests can assert on exactly what the renderer
//! issued, and it can be told to fail at a chosen point to exercise the
//! dropped-frame path.

use oflike_core::mesh::PrimitiveTopology;

use super::{
    BackendError, BufferHandle, BufferKind, GpuBackend, PipelineVariant, UniformSlot,
};
use crate::types::{ClearColor, DeviceId, Rect, TextureHandle};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
    },
    UploadBuffer {
        buffer: BufferHandle,
        kind: BufferKind,
        size: usize,
    },
    BeginPass(ClearColor),
    SetViewport(Rect),
    SetScissor(Option<Rect>),
    BindPipeline(PipelineVariant),
    BindVertices(BufferHandle, u64),
    BindIndices(BufferHandle, u64),
    BindUniforms { slot: UniformSlot, size: usize },
    BindTexture { slot: u32, texture: TextureHandle },
    Draw {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    },
    DrawIndexed {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    },
    EndPass,
    Present,
}

impl GpuCall {
    pub fn is_draw(&self) -> bool {
        matches!(self, GpuCall::Draw { .. } | GpuCall::DrawIndexed { .. })
    }
}

/// Operation that should fail next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Upload,
    BeginPass,
    Present,
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    device: DeviceId,
    calls: Vec<GpuCall>,
    next_buffer: u32,
    next_texture: u32,
    in_pass: bool,
    failure: Option<FailurePoint>,
}

impl DummyBackend {
    /// Create a new dummy backend on device 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dummy backend that reports the given device.
    pub fn with_device(device: DeviceId) -> Self {
        Self {
            device,
            ..Default::default()
        }
    }

    /// Make the next call at `point` fail with [`BackendError::OutOfMemory`].
    pub fn inject_failure(&mut self, point: FailurePoint) {
        self.failure = Some(point);
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = &GpuCall> {
        self.calls.iter().filter(|c| c.is_draw())
    }

    pub fn in_pass(&self) -> bool {
        self.in_pass
    }

    fn check_failure(&mut self, point: FailurePoint) -> Result<(), BackendError> {
        if self.failure == Some(point) {
            self.failure = None;
            log::trace!("DummyBackend: injected failure at {:?}", point);
            return Err(BackendError::OutOfMemory);
        }
        Ok(())
    }

    fn record(&mut self, call: GpuCall) {
        if !self.in_pass {
            log::warn!("DummyBackend: {:?} issued outside of a pass", call);
        }
        log::trace!("DummyBackend: {:?}", call);
        self.calls.push(call);
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn device_id(&self) -> DeviceId {
        self.device
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, BackendError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(BackendError::ResourceCreationFailed(format!(
                "texture {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        let texture = TextureHandle::new(self.next_texture, self.device);
        self.next_texture += 1;
        self.calls.push(GpuCall::CreateTexture {
            texture,
            width,
            height,
        });
        Ok(texture)
    }

    fn upload_buffer(
        &mut self,
        kind: BufferKind,
        bytes: &[u8],
    ) -> Result<BufferHandle, BackendError> {
        self.check_failure(FailurePoint::Upload)?;
        let buffer = BufferHandle(self.next_buffer);
        self.next_buffer += 1;
        log::trace!(
            "DummyBackend: upload {:?} buffer {:?} ({} bytes)",
            kind,
            buffer,
            bytes.len()
        );
        self.calls.push(GpuCall::UploadBuffer {
            buffer,
            kind,
            size: bytes.len(),
        });
        Ok(buffer)
    }

    fn begin_pass(&mut self, clear: ClearColor) -> Result<(), BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("pass already open"));
        }
        self.check_failure(FailurePoint::BeginPass)?;
        self.in_pass = true;
        self.calls.push(GpuCall::BeginPass(clear));
        Ok(())
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.record(GpuCall::SetViewport(rect));
    }

    fn set_scissor(&mut self, rect: Option<Rect>) {
        self.record(GpuCall::SetScissor(rect));
    }

    fn bind_pipeline(&mut self, variant: PipelineVariant) {
        self.record(GpuCall::BindPipeline(variant));
    }

    fn bind_vertices(&mut self, buffer: BufferHandle, offset: u64) {
        self.record(GpuCall::BindVertices(buffer, offset));
    }

    fn bind_indices(&mut self, buffer: BufferHandle, offset: u64) {
        self.record(GpuCall::BindIndices(buffer, offset));
    }

    fn bind_uniforms(&mut self, slot: UniformSlot, bytes: &[u8]) {
        self.record(GpuCall::BindUniforms {
            slot,
            size: bytes.len(),
        });
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) {
        self.record(GpuCall::BindTexture { slot, texture });
    }

    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.record(GpuCall::Draw {
            topology,
            first,
            count,
        });
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.record(GpuCall::DrawIndexed {
            topology,
            first,
            count,
        });
    }

    fn end_pass(&mut self) -> Result<(), BackendError> {
        if !self.in_pass {
            return Err(BackendError::InvalidState("no pass open"));
        }
        self.in_pass = false;
        self.calls.push(GpuCall::EndPass);
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("present inside a pass"));
        }
        self.check_failure(FailurePoint::Present)?;
        self.next_buffer = 0;
        self.calls.push(GpuCall::Present);
        Ok(())
    }
}
