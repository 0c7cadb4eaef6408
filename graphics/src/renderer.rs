//! Walks a [`DrawList`] and drives a [`GpuBackend`].
//!
//! One call to [`Renderer::render`] is one frame: the arenas are uploaded,
//! a pass is opened, every command is translated into backend calls and the
//! frame is presented. Bindings are cached across commands so unchanged
//! pipeline, buffer, texture and uniform state is never re-issued.

use oflike_core::Color;
use oflike_core::math::{Mat4, screen_perspective, screen_projection};
use oflike_core::mesh::PrimitiveTopology;

use crate::backend::{
    BackendError, BufferHandle, BufferKind, Dimension, GpuBackend, PipelineVariant, UniformSlot,
};
use crate::draw_list::{Draw2D, Draw3D, DrawCommand, DrawList, DrawRange};
use crate::error::GraphicsError;
use crate::lighting::{LightingUniforms, MaterialUniforms};
use crate::misuse::{Misuse, MisuseLog};
use crate::profiling::{profile_function, profile_plot, profile_scope};
use crate::shader::{CameraUniforms, ObjectUniforms};
use crate::types::{ClearColor, DeviceId, Rect, TextureHandle};

/// Texture unit used for the color texture.
const COLOR_TEXTURE_SLOT: u32 = 0;

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Window width in points.
    pub width: u32,
    /// Window height in points.
    pub height: u32,
    /// Pixels per point.
    pub content_scale: f32,
    /// Ambient term added to every lit draw.
    pub global_ambient: Color,
    /// Vertical field of view of the default 3D camera, in degrees.
    pub default_fov: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            content_scale: 1.0,
            global_ambient: Color::gray(51),
            default_fov: 60.0,
        }
    }
}

impl RendererConfig {
    /// Framebuffer size in pixels.
    pub fn framebuffer_rect(&self) -> Rect {
        let scale = self.content_scale.max(f32::EPSILON);
        Rect::new(
            0.0,
            0.0,
            (self.width as f32 * scale).round(),
            (self.height as f32 * scale).round(),
        )
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub pipeline_binds: u32,
    pub texture_binds: u32,
    pub uniform_binds: u32,
    pub buffer_uploads: u32,
    /// Commands dropped because of misuse.
    pub skipped_commands: u32,
}

/// Per-frame arena buffers.
#[derive(Debug, Default)]
struct FrameBuffers {
    vertices_2d: Option<BufferHandle>,
    vertices_3d: Option<BufferHandle>,
    indices: Option<BufferHandle>,
}

/// Last state issued to the backend.
#[derive(Debug, Default)]
struct BindingCache {
    pipeline: Option<PipelineVariant>,
    vertices: Option<Dimension>,
    indices: bool,
    texture: Option<TextureHandle>,
    uniforms: [Option<Vec<u8>>; UniformSlot::COUNT],
}

impl BindingCache {
    fn bind_pipeline(
        &mut self,
        backend: &mut dyn GpuBackend,
        variant: PipelineVariant,
        stats: &mut FrameStats,
    ) {
        if self.pipeline != Some(variant) {
            backend.bind_pipeline(variant);
            self.pipeline = Some(variant);
            stats.pipeline_binds += 1;
        }
    }

    fn bind_texture(
        &mut self,
        backend: &mut dyn GpuBackend,
        texture: TextureHandle,
        stats: &mut FrameStats,
    ) {
        if self.texture != Some(texture) {
            backend.bind_texture(COLOR_TEXTURE_SLOT, texture);
            self.texture = Some(texture);
            stats.texture_binds += 1;
        }
    }

    fn bind_uniforms(
        &mut self,
        backend: &mut dyn GpuBackend,
        slot: UniformSlot,
        bytes: &[u8],
        stats: &mut FrameStats,
    ) {
        let cached = &mut self.uniforms[slot.index()];
        if cached.as_deref() != Some(bytes) {
            backend.bind_uniforms(slot, bytes);
            *cached = Some(bytes.to_vec());
            stats.uniform_binds += 1;
        }
    }
}

/// Translates draw lists into backend calls.
pub struct Renderer {
    config: RendererConfig,
    misuse: MisuseLog,
    frame_index: u64,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            misuse: MisuseLog::new(),
            frame_index: 0,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Apply a new window size and content scale.
    pub fn resize(&mut self, width: u32, height: u32, content_scale: f32) {
        self.config.width = width;
        self.config.height = height;
        self.config.content_scale = content_scale;
        log::debug!("renderer resized to {}x{} @{}", width, height, content_scale);
    }

    /// Misuse reported by this renderer so far.
    pub fn misuse(&self) -> &MisuseLog {
        &self.misuse
    }

    /// Number of frames presented.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Render and present one frame.
    ///
    /// On backend failure the frame is dropped: `list` is reset and the
    /// error returned. If the failure happened before the pass opened, no
    /// command reached the backend.
    pub fn render(
        &mut self,
        list: &mut DrawList,
        backend: &mut dyn GpuBackend,
    ) -> Result<FrameStats, GraphicsError> {
        profile_function!();

        match self.render_frame(list, backend) {
            Ok(stats) => {
                self.frame_index += 1;
                profile_plot!("draw_calls", stats.draw_calls);
                log::debug!(
                    "frame {}: {} draw calls, {} pipeline binds, {} skipped",
                    self.frame_index,
                    stats.draw_calls,
                    stats.pipeline_binds,
                    stats.skipped_commands
                );
                Ok(stats)
            }
            Err(err) => {
                log::error!("dropping frame {}: {}", self.frame_index + 1, err);
                list.reset();
                Err(err.into())
            }
        }
    }

    fn render_frame(
        &mut self,
        list: &DrawList,
        backend: &mut dyn GpuBackend,
    ) -> Result<FrameStats, BackendError> {
        let mut stats = FrameStats::default();
        let buffers = upload_arenas(list, backend, &mut stats)?;

        let clear = match list.commands().first() {
            Some(DrawCommand::SetClear { color }) => ClearColor::Color(*color),
            _ => ClearColor::Load,
        };
        backend.begin_pass(clear)?;

        let viewport = self.config.framebuffer_rect();
        backend.set_viewport(viewport);
        backend.set_scissor(None);

        let width = self.config.width as f32;
        let height = self.config.height as f32;
        let mut walk = FrameWalk {
            list,
            buffers,
            cache: BindingCache::default(),
            camera_2d: CameraUniforms::new(&Mat4::identity(), &screen_projection(width, height)),
            camera_3d: screen_perspective(width, height, self.config.default_fov),
            global_ambient: self.config.global_ambient,
            content_scale: self.config.content_scale.max(f32::EPSILON),
            device: backend.device_id(),
            misuse: &mut self.misuse,
            stats,
        };

        {
            profile_scope!("walk_commands");
            for command in list.commands() {
                walk.execute(backend, command, viewport);
            }
        }

        let stats = walk.stats;
        backend.end_pass()?;
        backend.present()?;
        Ok(stats)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

fn upload_arenas(
    list: &DrawList,
    backend: &mut dyn GpuBackend,
    stats: &mut FrameStats,
) -> Result<FrameBuffers, BackendError> {
    profile_scope!("upload_arenas");

    let mut upload = |kind: BufferKind, bytes: &[u8]| -> Result<Option<BufferHandle>, BackendError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        stats.buffer_uploads += 1;
        backend.upload_buffer(kind, bytes).map(Some)
    };

    Ok(FrameBuffers {
        vertices_2d: upload(BufferKind::Vertices2D, bytemuck::cast_slice(list.vertices_2d()))?,
        vertices_3d: upload(BufferKind::Vertices3D, bytemuck::cast_slice(list.vertices_3d()))?,
        indices: upload(BufferKind::Indices, bytemuck::cast_slice(list.indices()))?,
    })
}

/// State of one command walk.
struct FrameWalk<'a> {
    list: &'a DrawList,
    buffers: FrameBuffers,
    cache: BindingCache,
    camera_2d: CameraUniforms,
    camera_3d: (Mat4, Mat4),
    global_ambient: Color,
    /// Pixels per point for viewport and scissor rects.
    content_scale: f32,
    device: DeviceId,
    misuse: &'a mut MisuseLog,
    stats: FrameStats,
}

impl FrameWalk<'_> {
    fn execute(&mut self, backend: &mut dyn GpuBackend, command: &DrawCommand, viewport: Rect) {
        log::trace!("{:?}", command);
        match command {
            DrawCommand::SetClear { .. } => {}
            DrawCommand::SetViewport { rect } => {
                backend.set_viewport(rect.scaled(self.content_scale).intersect(&viewport))
            }
            DrawCommand::SetScissor { rect } => backend
                .set_scissor(rect.map(|r| r.scaled(self.content_scale).intersect(&viewport))),
            DrawCommand::SetCamera { view, projection } => self.camera_3d = (*view, *projection),
            DrawCommand::Draw2D(draw) => {
                if self.accepts(draw.texture, draw.topology) {
                    self.draw_2d(backend, draw);
                }
            }
            DrawCommand::Draw3D(draw) => {
                if self.accepts(draw.texture, draw.topology) {
                    self.draw_3d(backend, draw);
                }
            }
        }
    }

    /// Misuse checks shared by both dimensions.
    fn accepts(&mut self, texture: Option<TextureHandle>, topology: PrimitiveTopology) -> bool {
        if let Some(texture) = texture.filter(|t| t.device != self.device) {
            self.misuse.report(
                Misuse::WRONG_DEVICE_TEXTURE,
                format_args!(
                    "texture {} belongs to device {}, not {}; skipping draw",
                    texture.id, texture.device.0, self.device.0
                ),
            );
            self.stats.skipped_commands += 1;
            return false;
        }
        if matches!(topology, PrimitiveTopology::TriangleFan | PrimitiveTopology::LineLoop) {
            self.misuse.report(
                Misuse::INVALID_COMMAND,
                format_args!("{topology:?} must be converted to a list before rendering; skipping draw"),
            );
            self.stats.skipped_commands += 1;
            return false;
        }
        true
    }

    fn draw_2d(&mut self, backend: &mut dyn GpuBackend, draw: &Draw2D) {
        let variant = PipelineVariant {
            textured: draw.texture.is_some(),
            ..PipelineVariant::flat_2d(draw.blend)
        };
        self.cache.bind_pipeline(backend, variant, &mut self.stats);
        self.cache.bind_uniforms(
            backend,
            UniformSlot::Camera,
            bytemuck::bytes_of(&self.camera_2d),
            &mut self.stats,
        );
        let object = ObjectUniforms::new(&draw.transform.to_mat4());
        self.cache
            .bind_uniforms(backend, UniformSlot::Object, bytemuck::bytes_of(&object), &mut self.stats);
        if let Some(texture) = draw.texture {
            self.cache.bind_texture(backend, texture, &mut self.stats);
        }
        self.submit(backend, Dimension::D2, &draw.range, draw.topology);
    }

    fn draw_3d(&mut self, backend: &mut dyn GpuBackend, draw: &Draw3D) {
        let Some(material) = self.list.material(draw.material) else {
            self.misuse.report(
                Misuse::INVALID_COMMAND,
                format_args!("unknown material {:?}; skipping draw", draw.material),
            );
            self.stats.skipped_commands += 1;
            return;
        };
        let lights = if draw.light_set.is_lit() {
            let Some(snapshot) = self.list.light_snapshot(draw.light_set.snapshot) else {
                self.misuse.report(
                    Misuse::INVALID_COMMAND,
                    format_args!("unknown light snapshot {}; skipping draw", draw.light_set.snapshot),
                );
                self.stats.skipped_commands += 1;
                return;
            };
            Some(snapshot)
        } else {
            None
        };

        let variant = PipelineVariant {
            dimension: Dimension::D3,
            textured: draw.texture.is_some(),
            lit: lights.is_some(),
            blend: draw.blend,
            depth_test: draw.depth_test,
        };
        self.cache.bind_pipeline(backend, variant, &mut self.stats);

        let (view, projection) = self.camera_3d;
        let camera = CameraUniforms::new(&view, &projection);
        self.cache
            .bind_uniforms(backend, UniformSlot::Camera, bytemuck::bytes_of(&camera), &mut self.stats);
        let object = ObjectUniforms::new(&draw.model);
        self.cache
            .bind_uniforms(backend, UniformSlot::Object, bytemuck::bytes_of(&object), &mut self.stats);

        if let Some(snapshot) = lights {
            let material = MaterialUniforms::from(material);
            self.cache.bind_uniforms(
                backend,
                UniformSlot::Material,
                bytemuck::bytes_of(&material),
                &mut self.stats,
            );
            let lighting = LightingUniforms::pack(snapshot, &view, self.global_ambient);
            self.cache.bind_uniforms(
                backend,
                UniformSlot::Lighting,
                bytemuck::bytes_of(&lighting),
                &mut self.stats,
            );
        }
        if let Some(texture) = draw.texture {
            self.cache.bind_texture(backend, texture, &mut self.stats);
        }
        self.submit(backend, Dimension::D3, &draw.range, draw.topology);
    }

    fn submit(
        &mut self,
        backend: &mut dyn GpuBackend,
        dimension: Dimension,
        range: &DrawRange,
        topology: PrimitiveTopology,
    ) {
        let buffer = match dimension {
            Dimension::D2 => self.buffers.vertices_2d,
            Dimension::D3 => self.buffers.vertices_3d,
        };
        // add_command only accepts ranges inside the arenas, so a non-empty
        // draw always has its buffer.
        let Some(buffer) = buffer else {
            self.stats.skipped_commands += 1;
            return;
        };
        if self.cache.vertices != Some(dimension) {
            backend.bind_vertices(buffer, 0);
            self.cache.vertices = Some(dimension);
        }

        if range.is_indexed() {
            let Some(indices) = self.buffers.indices else {
                self.stats.skipped_commands += 1;
                return;
            };
            if !self.cache.indices {
                backend.bind_indices(indices, 0);
                self.cache.indices = true;
            }
            backend.draw_indexed(topology, range.index_offset, range.index_count);
        } else {
            backend.draw(topology, range.vertex_offset, range.vertex_count);
        }
        self.stats.draw_calls += 1;
    }
}
