//! wgpu GPU backend implementation.
//!
//! Renders headlessly into an RGBA8 target with a depth buffer. Pass calls
//! are recorded as they arrive and replayed into a single wgpu render pass at
//! [`end_pass`](GpuBackend::end_pass), once all uniform data for the pass is
//! known and can be uploaded as one buffer addressed with dynamic offsets.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU32, Ordering};

use oflike_core::mesh::PrimitiveTopology;
use wgpu::util::DeviceExt;

use super::{
    BackendError, BufferHandle, BufferKind, Dimension, GpuBackend, PipelineVariant, UniformSlot,
};
use crate::lighting::{LightingUniforms, MaterialUniforms};
use crate::shader::{CameraUniforms, ObjectUniforms, SHADER_2D_SOURCE, SHADER_3D_SOURCE, ShaderComposer};
use crate::types::{BlendMode, ClearColor, DeviceId, Rect, TextureHandle};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Size of the zeroed block at the start of every uniform buffer. Slots that
/// were never bound point at it.
const DEFAULT_UNIFORM_BLOCK: usize = 1024;

const ATTRIBUTES_2D: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
const ATTRIBUTES_3D: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32x4];

/// Device ids handed out to wgpu backends. Zero belongs to the dummy backend.
static NEXT_DEVICE_ID: AtomicU32 = AtomicU32::new(1);

/// Byte size of each uniform block, by slot.
const UNIFORM_SIZES: [usize; UniformSlot::COUNT] = [
    std::mem::size_of::<CameraUniforms>(),
    std::mem::size_of::<ObjectUniforms>(),
    std::mem::size_of::<MaterialUniforms>(),
    std::mem::size_of::<LightingUniforms>(),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    variant: PipelineVariant,
    topology: wgpu::PrimitiveTopology,
}

/// A pass call waiting for replay.
#[derive(Debug, Clone, Copy)]
enum PassOp {
    Viewport(Rect),
    Scissor(Option<Rect>),
    Pipeline(PipelineKey),
    Vertices(BufferHandle, u64),
    Indices(BufferHandle, u64),
    Texture(u32),
    Draw {
        first: u32,
        count: u32,
        offsets: [u32; UniformSlot::COUNT],
    },
    DrawIndexed {
        first: u32,
        count: u32,
        offsets: [u32; UniformSlot::COUNT],
    },
}

struct TextureEntry {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct RenderTarget {
    width: u32,
    height: u32,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    _depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("oflike color target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("oflike depth target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            width: size.width,
            height: size.height,
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            _depth: depth,
        }
    }
}

/// wgpu-based GPU backend.
pub struct WgpuBackend {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    device_id: DeviceId,
    target: RenderTarget,

    module_2d: wgpu::ShaderModule,
    module_3d: wgpu::ShaderModule,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    white_texture: TextureEntry,
    textures: Vec<TextureEntry>,
    uniform_alignment: usize,

    // Per-frame state
    buffers: Vec<wgpu::Buffer>,
    clear: ClearColor,
    in_pass: bool,
    ops: Vec<PassOp>,
    uniform_data: Vec<u8>,
    uniform_offsets: [u32; UniformSlot::COUNT],
    variant: Option<PipelineVariant>,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("adapter", &self.adapter.get_info().name)
            .field("device_id", &self.device_id)
            .field("size", &(self.target.width, self.target.height))
            .finish()
    }
}

impl WgpuBackend {
    /// Create a headless backend rendering into a `width` x `height` target.
    pub fn new(width: u32, height: u32) -> Result<Self, BackendError> {
        let instance = wgpu::Instance::default();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| BackendError::InitializationFailed("no compatible GPU adapter".into()))?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("oflike device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| BackendError::InitializationFailed(format!("device creation failed: {e}")))?;

        let composer = ShaderComposer::with_standard_library();
        let create_module = |name: &'static str, source: &str| {
            let wgsl = composer
                .resolve(name, source)
                .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;
            Ok::<_, BackendError>(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(wgsl.into()),
            }))
        };
        let module_2d = create_module("draw_2d", SHADER_2D_SOURCE)?;
        let module_3d = create_module("draw_3d", SHADER_3D_SOURCE)?;

        let uniform_entries: Vec<wgpu::BindGroupLayoutEntry> = UNIFORM_SIZES
            .iter()
            .enumerate()
            .map(|(binding, &size)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(size as u64),
                },
                count: None,
            })
            .collect();
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("oflike uniforms"),
            entries: &uniform_entries,
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("oflike texture"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("oflike pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("oflike sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture =
            create_texture_entry(&device, &queue, &texture_layout, &sampler, 1, 1, &[255; 4]);
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as usize;
        let target = RenderTarget::new(&device, width, height);
        let device_id = DeviceId(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed));

        log::debug!("wgpu backend ready as device {}", device_id.0);

        Ok(Self {
            adapter,
            device,
            queue,
            device_id,
            target,
            module_2d,
            module_3d,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            pipelines: HashMap::new(),
            white_texture,
            textures: Vec::new(),
            uniform_alignment: uniform_alignment.max(1),
            buffers: Vec::new(),
            clear: ClearColor::Load,
            in_pass: false,
            ops: Vec::new(),
            uniform_data: Vec::new(),
            uniform_offsets: [0; UniformSlot::COUNT],
            variant: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn size(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }

    /// Recreate the render target. Only valid between frames.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("resize during a pass"));
        }
        self.target = RenderTarget::new(&self.device, width, height);
        Ok(())
    }

    /// Read the color target back as tightly packed RGBA8 rows.
    pub fn read_pixels(&self) -> Result<Vec<u8>, BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("read_pixels during a pass"));
        }
        let (width, height) = (self.target.width, self.target.height);
        let row_bytes = width * 4;
        let padded_row_bytes = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("oflike readback"),
            size: padded_row_bytes as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("oflike readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| BackendError::DeviceLost)?
            .map_err(|e| BackendError::Internal(format!("readback failed: {e}")))?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((row_bytes * height) as usize);
        for row in data.chunks(padded_row_bytes as usize) {
            pixels.extend_from_slice(&row[..row_bytes as usize]);
        }
        drop(data);
        buffer.unmap();
        Ok(pixels)
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let variant = key.variant;
        let (module, attributes, stride, fragment_entry): (_, &[wgpu::VertexAttribute], u64, _) =
            match variant.dimension {
                Dimension::D2 => (
                    &self.module_2d,
                    &ATTRIBUTES_2D,
                    std::mem::size_of::<oflike_core::mesh::Vertex2D>() as u64,
                    if variant.textured { "fs_textured" } else { "fs_flat" },
                ),
                Dimension::D3 => (
                    &self.module_3d,
                    &ATTRIBUTES_3D,
                    std::mem::size_of::<oflike_core::mesh::Vertex3D>() as u64,
                    match (variant.lit, variant.textured) {
                        (false, false) => "fs_unlit",
                        (false, true) => "fs_unlit_textured",
                        (true, false) => "fs_lit",
                        (true, true) => "fs_lit_textured",
                    },
                ),
            };

        let strip_index_format = matches!(
            key.topology,
            wgpu::PrimitiveTopology::TriangleStrip | wgpu::PrimitiveTopology::LineStrip
        )
        .then_some(wgpu::IndexFormat::Uint32);

        log::debug!("creating pipeline {:?} / {:?}", variant, key.topology);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("oflike pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: convert_blend_mode(variant.blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: key.topology,
                    strip_index_format,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: variant.depth_test,
                    depth_compare: if variant.depth_test {
                        wgpu::CompareFunction::LessEqual
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        self.pipelines.insert(key, pipeline);
    }

    /// Record a draw against the bound pipeline, creating it for `topology`
    /// if needed.
    fn record_draw(&mut self, topology: PrimitiveTopology, indexed: bool, first: u32, count: u32) {
        if !self.in_pass {
            log::warn!("wgpu: draw outside of a pass ignored");
            return;
        }
        let Some(variant) = self.variant else {
            log::warn!("wgpu: draw without a pipeline ignored");
            return;
        };
        let Some(topology) = convert_topology(topology) else {
            log::warn!("wgpu: {:?} is not drawable, convert it to a list first", topology);
            return;
        };
        let key = PipelineKey { variant, topology };
        self.ensure_pipeline(key);
        self.ops.push(PassOp::Pipeline(key));
        let offsets = self.uniform_offsets;
        self.ops.push(if indexed {
            PassOp::DrawIndexed { first, count, offsets }
        } else {
            PassOp::Draw { first, count, offsets }
        });
    }

    fn clamp_rect(&self, rect: Rect) -> (f32, f32, f32, f32) {
        let full = Rect::from_dimensions(self.target.width, self.target.height);
        let r = rect.intersect(&full);
        (r.x, r.y, r.width, r.height)
    }

    /// Build the frame's uniform bind group and replay the recorded ops.
    fn submit_pass(&mut self) -> Result<(), BackendError> {
        let ops = std::mem::take(&mut self.ops);

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("oflike frame uniforms"),
                contents: &self.uniform_data,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let uniform_entries: Vec<wgpu::BindGroupEntry> = UNIFORM_SIZES
            .iter()
            .enumerate()
            .map(|(binding, &size)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(size as u64),
                }),
            })
            .collect();
        let uniform_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("oflike frame uniforms"),
            layout: &self.uniform_layout,
            entries: &uniform_entries,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("oflike frame encoder"),
            });
        {
            let load = match self.clear {
                ClearColor::Load => wgpu::LoadOp::Load,
                ClearColor::Color(c) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: c.r as f64,
                    g: c.g as f64,
                    b: c.b as f64,
                    a: c.a as f64,
                }),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("oflike frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(1, &self.white_texture.bind_group, &[]);

            let mut bound_offsets = None;
            for op in &ops {
                match *op {
                    PassOp::Viewport(rect) => {
                        let (x, y, w, h) = self.clamp_rect(rect);
                        if w > 0.0 && h > 0.0 {
                            pass.set_viewport(x, y, w, h, 0.0, 1.0);
                        }
                    }
                    PassOp::Scissor(rect) => {
                        let (x, y, w, h) = self.clamp_rect(rect.unwrap_or(Rect::from_dimensions(
                            self.target.width,
                            self.target.height,
                        )));
                        pass.set_scissor_rect(x as u32, y as u32, w as u32, h as u32);
                    }
                    PassOp::Pipeline(key) => {
                        if let Some(pipeline) = self.pipelines.get(&key) {
                            pass.set_pipeline(pipeline);
                        }
                    }
                    PassOp::Vertices(buffer, offset) | PassOp::Indices(buffer, offset) => {
                        let Some(buffer_ref) = self.buffers.get(buffer.0 as usize) else {
                            log::warn!("wgpu: unknown buffer {:?}", buffer);
                            continue;
                        };
                        if matches!(op, PassOp::Vertices(..)) {
                            pass.set_vertex_buffer(0, buffer_ref.slice(offset..));
                        } else {
                            pass.set_index_buffer(buffer_ref.slice(offset..), wgpu::IndexFormat::Uint32);
                        }
                    }
                    PassOp::Texture(id) => {
                        let entry = self.textures.get(id as usize).unwrap_or(&self.white_texture);
                        pass.set_bind_group(1, &entry.bind_group, &[]);
                    }
                    PassOp::Draw { first, count, offsets } => {
                        if bound_offsets != Some(offsets) {
                            pass.set_bind_group(0, &uniform_group, &offsets);
                            bound_offsets = Some(offsets);
                        }
                        pass.draw(first..first + count, 0..1);
                    }
                    PassOp::DrawIndexed { first, count, offsets } => {
                        if bound_offsets != Some(offsets) {
                            pass.set_bind_group(0, &uniform_group, &offsets);
                            bound_offsets = Some(offsets);
                        }
                        pass.draw_indexed(first..first + count, 0, 0..1);
                    }
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(wgpu::Error::OutOfMemory { .. }) => Err(BackendError::OutOfMemory),
            Some(e) => Err(BackendError::Internal(e.to_string())),
            None => Ok(()),
        }
    }
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn device_id(&self) -> DeviceId {
        self.device_id
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, BackendError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(BackendError::ResourceCreationFailed(format!(
                "texture {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let entry = create_texture_entry(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            width,
            height,
            rgba,
        );
        if pollster::block_on(self.device.pop_error_scope()).is_some() {
            return Err(BackendError::OutOfMemory);
        }
        self.textures.push(entry);
        Ok(TextureHandle::new(self.textures.len() as u32 - 1, self.device_id))
    }

    fn upload_buffer(
        &mut self,
        kind: BufferKind,
        bytes: &[u8],
    ) -> Result<BufferHandle, BackendError> {
        let usage = match kind {
            BufferKind::Vertices2D | BufferKind::Vertices3D => wgpu::BufferUsages::VERTEX,
            BufferKind::Indices => wgpu::BufferUsages::INDEX,
        };
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("oflike frame buffer"),
                contents: bytes,
                usage,
            });
        if pollster::block_on(self.device.pop_error_scope()).is_some() {
            return Err(BackendError::OutOfMemory);
        }
        self.buffers.push(buffer);
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn begin_pass(&mut self, clear: ClearColor) -> Result<(), BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("pass already open"));
        }
        self.in_pass = true;
        self.clear = clear;
        self.ops.clear();
        self.variant = None;
        self.uniform_data.clear();
        self.uniform_data.resize(DEFAULT_UNIFORM_BLOCK, 0);
        self.uniform_offsets = [0; UniformSlot::COUNT];
        Ok(())
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.ops.push(PassOp::Viewport(rect));
    }

    fn set_scissor(&mut self, rect: Option<Rect>) {
        self.ops.push(PassOp::Scissor(rect));
    }

    fn bind_pipeline(&mut self, variant: PipelineVariant) {
        self.variant = Some(variant);
    }

    fn bind_vertices(&mut self, buffer: BufferHandle, offset: u64) {
        self.ops.push(PassOp::Vertices(buffer, offset));
    }

    fn bind_indices(&mut self, buffer: BufferHandle, offset: u64) {
        self.ops.push(PassOp::Indices(buffer, offset));
    }

    fn bind_uniforms(&mut self, slot: UniformSlot, bytes: &[u8]) {
        let expected = UNIFORM_SIZES[slot.index()];
        if bytes.len() != expected {
            log::warn!(
                "wgpu: {:?} uniforms must be {} bytes, got {}",
                slot,
                expected,
                bytes.len()
            );
            return;
        }
        let offset = self.uniform_data.len().next_multiple_of(self.uniform_alignment);
        self.uniform_data.resize(offset, 0);
        self.uniform_data.extend_from_slice(bytes);
        self.uniform_offsets[slot.index()] = offset as u32;
    }

    fn bind_texture(&mut self, _slot: u32, texture: TextureHandle) {
        if texture.device != self.device_id {
            log::warn!("wgpu: texture from device {} ignored", texture.device.0);
            return;
        }
        self.ops.push(PassOp::Texture(texture.id));
    }

    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.record_draw(topology, false, first, count);
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.record_draw(topology, true, first, count);
    }

    fn end_pass(&mut self) -> Result<(), BackendError> {
        if !self.in_pass {
            return Err(BackendError::InvalidState("no pass open"));
        }
        self.in_pass = false;
        self.submit_pass()
    }

    fn present(&mut self) -> Result<(), BackendError> {
        if self.in_pass {
            return Err(BackendError::InvalidState("present inside a pass"));
        }
        self.buffers.clear();
        let _ = self.device.poll(wgpu::Maintain::Poll);
        Ok(())
    }
}

fn create_texture_entry(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> TextureEntry {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("oflike texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("oflike texture"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    TextureEntry {
        _texture: texture,
        bind_group,
    }
}

fn convert_topology(topology: PrimitiveTopology) -> Option<wgpu::PrimitiveTopology> {
    match topology {
        PrimitiveTopology::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
        PrimitiveTopology::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        PrimitiveTopology::Lines => Some(wgpu::PrimitiveTopology::LineList),
        PrimitiveTopology::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        PrimitiveTopology::Points => Some(wgpu::PrimitiveTopology::PointList),
        PrimitiveTopology::TriangleFan | PrimitiveTopology::LineLoop => None,
    }
}

fn convert_blend_mode(blend: BlendMode) -> Option<wgpu::BlendState> {
    use wgpu::{BlendComponent, BlendFactor, BlendOperation};

    let component = |src_factor, dst_factor, operation| BlendComponent {
        src_factor,
        dst_factor,
        operation,
    };
    let additive_alpha = component(BlendFactor::One, BlendFactor::One, BlendOperation::Add);

    match blend {
        BlendMode::Opaque => None,
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
        BlendMode::Add => Some(wgpu::BlendState {
            color: component(BlendFactor::SrcAlpha, BlendFactor::One, BlendOperation::Add),
            alpha: additive_alpha,
        }),
        BlendMode::Subtract => Some(wgpu::BlendState {
            color: component(
                BlendFactor::SrcAlpha,
                BlendFactor::One,
                BlendOperation::ReverseSubtract,
            ),
            alpha: additive_alpha,
        }),
        BlendMode::Multiply => Some(wgpu::BlendState {
            color: component(BlendFactor::Dst, BlendFactor::OneMinusSrcAlpha, BlendOperation::Add),
            alpha: additive_alpha,
        }),
        BlendMode::Screen => Some(wgpu::BlendState {
            color: component(BlendFactor::OneMinusDst, BlendFactor::One, BlendOperation::Add),
            alpha: additive_alpha,
        }),
    }
}
