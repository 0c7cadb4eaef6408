//! The [`Graphics`] context: all drawing state for one window.

use std::rc::Rc;

use oflike_core::math::{Affine2, Mat4, Vec3, screen_perspective};
use oflike_core::mesh::{Mesh, Primitive, PrimitiveTopology, Vertex2D, Vertex3D};
use oflike_core::{Color, Light, Material};
use oflike_graphics::{
    BlendMode, Draw2D, Draw3D, DrawCommand, DrawList, DrawRange, LightRegistry, LightSet,
    LightSlot, Misuse, MisuseLog, Rect, TextureHandle,
};

use crate::camera::Camera;
use crate::primitives::PrimitiveCache;
use crate::shape::ShapeBuilder;
use crate::state::{FillMode, RenderState};
use crate::transform::{TransformStack2D, TransformStack3D};

/// Context configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsConfig {
    /// Window width in points.
    pub width: u32,
    /// Window height in points.
    pub height: u32,
    /// Pixels per point, supplied by the host.
    pub content_scale: f32,
    /// Vertical field of view of the default 3D camera, in degrees.
    pub default_fov: f32,
    /// Distinct primitive meshes kept between draws.
    pub primitive_cache_size: usize,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            content_scale: 1.0,
            default_fov: 60.0,
            primitive_cache_size: 32,
        }
    }
}

/// State restored when a frame is dropped.
#[derive(Debug, Clone)]
struct FrameSnapshot {
    state: RenderState,
    styles: Vec<RenderState>,
    material: Material,
    lights: LightRegistry,
}

/// Immediate-mode drawing context.
///
/// Every draw call is recorded into the context's [`DrawList`] with the
/// transform, style, material and lights current at the time of the call.
/// Nothing reaches the GPU until the list is handed to a renderer.
///
/// ```ignore
/// let mut g = Graphics::new(GraphicsConfig::default());
/// g.begin_frame();
/// g.set_color(255, 0, 0);
/// g.push_matrix();
/// g.translate(100.0, 0.0);
/// g.draw_rectangle(0.0, 0.0, 10.0, 10.0);
/// g.pop_matrix();
/// g.end_frame();
/// g.list_mut().optimize();
/// ```
pub struct Graphics {
    config: GraphicsConfig,
    list: DrawList,
    pub(crate) matrix_2d: TransformStack2D,
    pub(crate) matrix_3d: TransformStack3D,
    pub(crate) state: RenderState,
    styles: Vec<RenderState>,
    pub(crate) material: Material,
    lights: LightRegistry,
    pub(crate) camera: Option<Camera>,
    pub(crate) shape: ShapeBuilder,
    pub(crate) primitives: PrimitiveCache,
    misuse: MisuseLog,
    clear_pending: bool,
    snapshot: Option<FrameSnapshot>,
}

impl Graphics {
    pub fn new(config: GraphicsConfig) -> Self {
        let primitives = PrimitiveCache::new(config.primitive_cache_size);
        Self {
            config,
            list: DrawList::new(),
            matrix_2d: TransformStack2D::new(),
            matrix_3d: TransformStack3D::new(),
            state: RenderState::default(),
            styles: Vec::new(),
            material: Material::default(),
            lights: LightRegistry::new(),
            camera: None,
            shape: ShapeBuilder::default(),
            primitives,
            misuse: MisuseLog::new(),
            clear_pending: false,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.config.width as f32
    }

    pub fn height(&self) -> f32 {
        self.config.height as f32
    }

    pub fn content_scale(&self) -> f32 {
        self.config.content_scale
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
    }

    pub fn set_content_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.config.content_scale = scale;
        }
    }

    // ========================================================================
    // Frame lifecycle
    // ========================================================================

    /// Start recording a frame.
    ///
    /// Clears the draw list, resets the matrix stacks and remembers the
    /// style, material and light state so [`rewind`](Self::rewind) can undo
    /// the frame.
    pub fn begin_frame(&mut self) {
        self.list.reset();
        self.matrix_2d.reset();
        self.matrix_3d.reset();
        self.shape.reset();
        self.camera = None;
        self.clear_pending = self.state.background_auto;
        self.snapshot = Some(FrameSnapshot {
            state: self.state.clone(),
            styles: self.styles.clone(),
            material: self.material,
            lights: self.lights.clone(),
        });
    }

    /// Finish recording. An empty frame still records its clear.
    pub fn end_frame(&mut self) {
        if self.shape.is_active() {
            self.report(Misuse::END_WITHOUT_BEGIN, "frame ended inside begin_shape(); shape dropped");
            self.shape.reset();
        }
        self.flush_clear();
        log::debug!(
            "recorded {} commands ({} draws)",
            self.list.command_count(),
            self.list.draw_count()
        );
    }

    /// Drop the current frame and restore the state it started with.
    pub fn rewind(&mut self) {
        self.list.reset();
        self.matrix_2d.reset();
        self.matrix_3d.reset();
        self.shape.reset();
        self.camera = None;
        if let Some(snapshot) = self.snapshot.clone() {
            self.state = snapshot.state;
            self.styles = snapshot.styles;
            self.material = snapshot.material;
            self.lights = snapshot.lights;
        }
    }

    pub fn list(&self) -> &DrawList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut DrawList {
        &mut self.list
    }

    pub fn misuse(&self) -> &MisuseLog {
        &self.misuse
    }

    pub(crate) fn report(&mut self, kind: Misuse, message: impl std::fmt::Display) {
        self.misuse.report(kind, message);
    }

    // ========================================================================
    // Background
    // ========================================================================

    /// Clear the frame to an opaque color.
    pub fn background(&mut self, r: u8, g: u8, b: u8) {
        self.set_background_color(Color::from_rgba8(r, g, b, 255));
    }

    pub fn background_gray(&mut self, level: u8) {
        self.set_background_color(Color::gray(level));
    }

    /// Set the clear color. Only the start of a frame can be cleared; once
    /// something was drawn the new color applies from the next frame.
    pub fn set_background_color(&mut self, color: Color) {
        self.state.background = color;
        if self.list.is_empty() {
            self.clear_pending = true;
        } else {
            self.report(
                Misuse::MISPLACED_CLEAR,
                "background() after drawing started; it takes effect next frame",
            );
        }
    }

    pub fn background_color(&self) -> Color {
        self.state.background
    }

    /// Whether every frame starts cleared to the background color.
    pub fn set_background_auto(&mut self, auto: bool) {
        self.state.background_auto = auto;
    }

    /// Clear to `color` now without changing the background color. Like
    /// [`background`](Self::background) it only works before the first draw.
    pub fn clear(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.clear_color(Color::from_rgba8(r, g, b, a));
    }

    pub fn clear_color(&mut self, color: Color) {
        if !self.list.is_empty() {
            self.report(
                Misuse::MISPLACED_CLEAR,
                "clear() after drawing started; ignored",
            );
            return;
        }
        self.clear_pending = false;
        self.push_command(DrawCommand::SetClear { color });
    }

    /// Clear to the background color made fully opaque.
    pub fn clear_alpha(&mut self) {
        self.clear_color(self.state.background.with_alpha(1.0));
    }

    fn flush_clear(&mut self) {
        if !self.clear_pending {
            return;
        }
        self.clear_pending = false;
        let color = self.state.background;
        self.push_command(DrawCommand::SetClear { color });
    }

    // ========================================================================
    // Style
    // ========================================================================

    pub fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.state.color = Color::from_rgba8(r, g, b, 255);
    }

    pub fn set_color_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.state.color = Color::from_rgba8(r, g, b, a);
    }

    pub fn set_color_f(&mut self, color: Color) {
        self.state.color = color;
    }

    pub fn set_gray(&mut self, level: u8) {
        self.state.color = Color::gray(level);
    }

    /// Color from `0xRRGGBB`, fully opaque.
    pub fn set_hex_color(&mut self, hex: u32) {
        self.state.color = Color::from_hex(hex, 255);
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.state.set_line_width(width);
    }

    /// Effective line width in points.
    pub fn line_width(&self) -> f32 {
        self.state.line_width(self.config.content_scale)
    }

    pub fn fill(&mut self) {
        self.state.fill = FillMode::Fill;
    }

    pub fn no_fill(&mut self) {
        self.state.fill = FillMode::Outline;
    }

    pub fn is_fill(&self) -> bool {
        self.state.fill == FillMode::Fill
    }

    pub fn set_circle_resolution(&mut self, segments: u32) {
        self.state.set_circle_resolution(segments);
    }

    pub fn set_circle_resolution_auto(&mut self) {
        self.state.set_circle_resolution_auto();
    }

    pub fn set_sphere_resolution(&mut self, resolution: u32) {
        self.state.set_sphere_resolution(resolution);
    }

    pub fn set_curve_resolution(&mut self, resolution: u32) {
        self.state.set_curve_resolution(resolution);
    }

    pub fn enable_depth_test(&mut self) {
        self.state.depth_test = true;
    }

    pub fn disable_depth_test(&mut self) {
        self.state.depth_test = false;
    }

    pub fn enable_alpha_blending(&mut self) {
        self.state.blend = BlendMode::Alpha;
    }

    pub fn disable_alpha_blending(&mut self) {
        self.state.blend = BlendMode::Opaque;
    }

    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Texture used by following mesh and primitive draws.
    pub fn bind_texture(&mut self, texture: TextureHandle) {
        self.state.texture = Some(texture);
    }

    pub fn unbind_texture(&mut self) {
        self.state.texture = None;
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn push_style(&mut self) {
        self.styles.push(self.state.clone());
    }

    pub fn pop_style(&mut self) {
        match self.styles.pop() {
            Some(state) => self.state = state,
            None => self.report(Misuse::POP_EMPTY_STACK, "pop_style() without push_style()"),
        }
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub fn push_matrix(&mut self) {
        self.matrix_2d.push();
        self.matrix_3d.push();
    }

    pub fn pop_matrix(&mut self) {
        let popped_2d = self.matrix_2d.pop();
        let popped_3d = self.matrix_3d.pop();
        if !(popped_2d && popped_3d) {
            self.report(Misuse::POP_EMPTY_STACK, "pop_matrix() without push_matrix()");
        }
    }

    /// Back to identity. Saved matrices are kept.
    pub fn reset_matrix(&mut self) {
        self.matrix_2d.load(Affine2::IDENTITY);
        self.matrix_3d.load(Mat4::identity());
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.matrix_2d.translate(dx, dy);
        self.matrix_3d.translate(dx, dy, 0.0);
    }

    /// Rotate about the Z axis.
    pub fn rotate(&mut self, degrees: f32) {
        self.matrix_2d.rotate(degrees);
        self.matrix_3d.rotate(degrees, Vec3::z());
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.matrix_2d.scale(sx, sy);
        self.matrix_3d.scale(sx, sy, 1.0);
    }

    /// Translate the 3D matrix. 2D drawing is unaffected.
    pub fn translate_3d(&mut self, dx: f32, dy: f32, dz: f32) {
        self.matrix_3d.translate(dx, dy, dz);
    }

    /// Rotate the 3D matrix about `axis`. 2D drawing is unaffected.
    pub fn rotate_3d(&mut self, degrees: f32, axis: Vec3) {
        self.matrix_3d.rotate(degrees, axis);
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.rotate_3d(degrees, Vec3::x());
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.rotate_3d(degrees, Vec3::y());
    }

    /// Same as [`rotate`](Self::rotate).
    pub fn rotate_z(&mut self, degrees: f32) {
        self.rotate(degrees);
    }

    pub fn scale_3d(&mut self, sx: f32, sy: f32, sz: f32) {
        self.matrix_3d.scale(sx, sy, sz);
    }

    /// Replace the current matrix. The 2D stack keeps its XY part.
    pub fn load_matrix(&mut self, matrix: Mat4) {
        self.matrix_2d.load(Affine2::from_mat4(&matrix));
        self.matrix_3d.load(matrix);
    }

    /// Compose `matrix` onto the current matrix in the local frame.
    pub fn mult_matrix(&mut self, matrix: Mat4) {
        self.matrix_2d.multiply(&Affine2::from_mat4(&matrix));
        self.matrix_3d.multiply(&matrix);
    }

    /// Number of saved matrices.
    pub fn matrix_stack_depth(&self) -> usize {
        self.matrix_3d.depth()
    }

    pub fn matrix_2d(&self) -> &Affine2 {
        self.matrix_2d.top()
    }

    pub fn model_matrix(&self) -> &Mat4 {
        self.matrix_3d.top()
    }

    // ========================================================================
    // Viewport and scissor
    // ========================================================================

    /// Restrict drawing to a region of the window, in points.
    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push_command(DrawCommand::SetViewport {
            rect: Rect::new(x, y, width, height),
        });
    }

    /// Back to the whole window.
    pub fn reset_viewport(&mut self) {
        self.set_viewport(0.0, 0.0, self.width(), self.height());
    }

    /// Discard pixels outside a region of the window, in points.
    pub fn set_scissor(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push_command(DrawCommand::SetScissor {
            rect: Some(Rect::new(x, y, width, height)),
        });
    }

    pub fn clear_scissor(&mut self) {
        self.push_command(DrawCommand::SetScissor { rect: None });
    }

    // ========================================================================
    // Lights
    // ========================================================================

    /// Register a light. Returns `None` when all slots are taken.
    pub fn register_light(&mut self, light: Light) -> Option<LightSlot> {
        let slot = self.lights.register(light);
        if slot.is_none() {
            self.report(Misuse::NO_FREE_LIGHT, "all light slots are in use; light ignored");
        }
        slot
    }

    pub fn unregister_light(&mut self, slot: LightSlot) -> Option<Light> {
        let light = self.lights.unregister(slot);
        if light.is_none() {
            self.report(Misuse::UNKNOWN_LIGHT, format!("no light in slot {}", slot.index()));
        }
        light
    }

    /// Enable a light for the draws that follow.
    pub fn enable_light(&mut self, slot: LightSlot) {
        if !self.lights.enable(slot) {
            self.report(Misuse::UNKNOWN_LIGHT, format!("no light in slot {}", slot.index()));
        }
    }

    pub fn disable_light(&mut self, slot: LightSlot) {
        if !self.lights.disable(slot) {
            self.report(Misuse::UNKNOWN_LIGHT, format!("no light in slot {}", slot.index()));
        }
    }

    /// Edit a light. Already recorded draws keep the old parameters.
    pub fn light_mut(&mut self, slot: LightSlot) -> Option<&mut Light> {
        self.lights.get_mut(slot)
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record a command, putting the pending clear in front of it.
    pub(crate) fn push_command(&mut self, command: DrawCommand) {
        if self.clear_pending && !matches!(command, DrawCommand::SetClear { .. }) {
            self.flush_clear();
        }
        if let Err(e) = self.list.add_command(command) {
            self.report(Misuse::INVALID_COMMAND, format!("dropped draw command: {e}"));
        }
    }

    /// A vertex at local `(x, y)` in the current color, mapped to screen space.
    pub(crate) fn screen_vertex(&self, x: f32, y: f32) -> Vertex2D {
        let [sx, sy] = self.matrix_2d.apply(x, y);
        Vertex2D::new(sx, sy, self.state.color)
    }

    /// Record screen-space triangles. Empty input records nothing.
    pub(crate) fn emit_triangles_2d(&mut self, vertices: &[Vertex2D], texture: Option<TextureHandle>) {
        if vertices.is_empty() {
            return;
        }
        let first = self.list.extend_vertices_2d(vertices);
        self.push_command(DrawCommand::Draw2D(Draw2D {
            range: DrawRange::vertices(first, vertices.len() as u32),
            topology: PrimitiveTopology::Triangles,
            blend: self.state.blend,
            texture,
            transform: Affine2::IDENTITY,
        }));
    }

    /// Record an indexed 3D draw with the current model matrix, material,
    /// texture and, for triangles, the enabled lights.
    pub(crate) fn emit_3d(&mut self, vertices: &[Vertex3D], indices: &[u32], topology: PrimitiveTopology) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        let first = self.list.extend_vertices_3d(vertices);
        let index = self.list.extend_indices(indices, first);
        let material = self.list.intern_material(self.material);
        let light_set = if topology.is_triangles() {
            self.list.intern_lights(self.lights.snapshot())
        } else {
            LightSet::NONE
        };
        self.push_command(DrawCommand::Draw3D(Draw3D {
            range: DrawRange::indexed(first, vertices.len() as u32, index, indices.len() as u32),
            topology,
            blend: self.state.blend,
            texture: self.state.texture,
            material,
            light_set,
            model: *self.matrix_3d.top(),
            depth_test: self.state.depth_test,
        }));
    }

    /// View and projection of `camera`, or of the default screen camera.
    pub(crate) fn camera_matrices(&self, camera: Option<&Camera>) -> (Mat4, Mat4) {
        match camera {
            Some(camera) => (camera.view(), camera.projection(self.width() / self.height().max(1.0))),
            None => screen_perspective(self.width(), self.height(), self.config.default_fov),
        }
    }

    pub(crate) fn primitive_mesh(&mut self, primitive: &Primitive) -> Rc<Mesh> {
        self.primitives.get_or_generate(primitive)
    }
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new(GraphicsConfig::default())
    }
}

impl std::fmt::Debug for Graphics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graphics")
            .field("config", &self.config)
            .field("commands", &self.list.command_count())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_core::math::{mat4_scaling, mat4_translation};
    use oflike_graphics::DrawCommand;

    #[test]
    fn test_begin_frame_records_clear_first() {
        let mut g = Graphics::default();
        g.begin_frame();
        g.background(10, 20, 30);
        g.draw_rectangle(0.0, 0.0, 4.0, 4.0);
        g.end_frame();
        let commands = g.list().commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0],
            DrawCommand::SetClear {
                color: Color::from_rgba8(10, 20, 30, 255)
            }
        );
    }

    #[test]
    fn test_empty_frame_still_clears() {
        let mut g = Graphics::default();
        g.begin_frame();
        g.end_frame();
        assert!(matches!(g.list().commands(), [DrawCommand::SetClear { .. }]));
    }

    #[test]
    fn test_no_auto_background() {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g.end_frame();
        assert!(g.list().is_empty());
    }

    #[test]
    fn test_late_background_is_misuse() {
        let mut g = Graphics::default();
        g.begin_frame();
        g.draw_rectangle(0.0, 0.0, 4.0, 4.0);
        g.background(9, 9, 9);
        g.end_frame();
        assert!(g.misuse().has_reported(Misuse::MISPLACED_CLEAR));
        assert_eq!(g.list().command_count(), 2);
        // applies next frame
        g.begin_frame();
        g.end_frame();
        assert_eq!(
            g.list().commands()[0],
            DrawCommand::SetClear {
                color: Color::from_rgba8(9, 9, 9, 255)
            }
        );
    }

    #[test]
    fn test_default_background_is_black() {
        let mut g = Graphics::default();
        assert_eq!(g.background_color(), Color::BLACK);
        g.begin_frame();
        g.draw_rectangle(0.0, 0.0, 4.0, 4.0);
        g.end_frame();
        assert_eq!(
            g.list().commands()[0],
            DrawCommand::SetClear { color: Color::BLACK }
        );
    }

    #[test]
    fn test_clear_keeps_background() {
        let mut g = Graphics::default();
        g.begin_frame();
        g.clear(0, 0, 255, 0);
        g.draw_rectangle(0.0, 0.0, 4.0, 4.0);
        g.clear(255, 0, 0, 255);
        g.end_frame();
        let commands = g.list().commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], DrawCommand::SetClear {
                color: Color::from_rgba8(0, 0, 255, 0)
            });
        assert_eq!(g.background_color(), Color::BLACK);
        assert!(g.misuse().has_reported(Misuse::MISPLACED_CLEAR));
    }

    #[test]
    fn test_clear_alpha_is_opaque_background() {
        let mut g = Graphics::default();
        g.set_background_color(Color::new(0.2, 0.4, 0.6, 0.5));
        g.begin_frame();
        g.clear_alpha();
        g.end_frame();
        assert_eq!(
            g.list().commands(),
            [DrawCommand::SetClear {
                color: Color::new(0.2, 0.4, 0.6, 1.0)
            }]
        );
    }

    #[test]
    fn test_viewport_and_scissor_recorded() {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g.set_viewport(10.0, 20.0, 100.0, 50.0);
        g.set_scissor(0.0, 0.0, 8.0, 8.0);
        g.clear_scissor();
        g.reset_viewport();
        g.end_frame();
        assert_eq!(
            g.list().commands(),
            [
                DrawCommand::SetViewport {
                    rect: Rect::new(10.0, 20.0, 100.0, 50.0)
                },
                DrawCommand::SetScissor {
                    rect: Some(Rect::new(0.0, 0.0, 8.0, 8.0))
                },
                DrawCommand::SetScissor { rect: None },
                DrawCommand::SetViewport {
                    rect: Rect::new(0.0, 0.0, 1024.0, 768.0)
                },
            ]
        );
    }

    #[test]
    fn test_scissor_splits_batches() {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g.draw_rectangle(0.0, 0.0, 4.0, 4.0);
        g.set_scissor(0.0, 0.0, 2.0, 2.0);
        g.draw_rectangle(1.0, 0.0, 4.0, 4.0);
        g.clear_scissor();
        g.draw_rectangle(2.0, 0.0, 4.0, 4.0);
        g.end_frame();
        g.list_mut().optimize();
        g.list_mut().sort_commands();
        let commands = g.list().commands();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[1], DrawCommand::SetScissor { rect: Some(_) }));
        assert!(matches!(commands[3], DrawCommand::SetScissor { rect: None }));
        assert_eq!(g.list().draw_count(), 3);
    }

    #[test]
    fn test_load_and_mult_matrix() {
        let mut g = Graphics::default();
        g.push_matrix();
        g.load_matrix(mat4_translation(5.0, 6.0, 7.0));
        g.mult_matrix(mat4_scaling(2.0, 2.0, 2.0));
        assert_eq!(g.matrix_2d().apply(1.0, 1.0), [7.0, 8.0]);
        assert_eq!(g.model_matrix()[(2, 3)], 7.0);
        assert_eq!(g.matrix_stack_depth(), 1);
        g.pop_matrix();
        assert_eq!(g.matrix_stack_depth(), 0);
        assert!(g.matrix_2d().is_identity());
    }

    #[test]
    fn test_pop_matrix_on_empty_stack_reported() {
        let mut g = Graphics::default();
        g.translate(5.0, 0.0);
        let before = *g.matrix_2d();
        g.pop_matrix();
        assert_eq!(*g.matrix_2d(), before);
        assert!(g.misuse().has_reported(Misuse::POP_EMPTY_STACK));
    }

    #[test]
    fn test_style_stack() {
        let mut g = Graphics::default();
        g.set_color(255, 0, 0);
        g.push_style();
        g.set_color(0, 0, 255);
        g.no_fill();
        g.pop_style();
        assert_eq!(g.color(), Color::RED);
        assert!(g.is_fill());
        g.pop_style();
        assert!(g.misuse().has_reported(Misuse::POP_EMPTY_STACK));
    }

    #[test]
    fn test_rewind_restores_frame_start() {
        let mut g = Graphics::default();
        g.set_color(255, 0, 0);
        g.begin_frame();
        g.set_color(0, 255, 0);
        g.set_line_width(4.0);
        let slot = g.register_light(Light::default());
        g.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        g.rewind();
        assert_eq!(g.color(), Color::RED);
        assert_eq!(g.line_width(), 1.0);
        assert!(slot.is_some());
        assert_eq!(g.lights().active_count(), 0);
        assert!(g.lights().get(slot.unwrap()).is_none());
        assert!(g.list().is_empty());
    }

    #[test]
    fn test_light_registry_full() {
        let mut g = Graphics::default();
        for _ in 0..oflike_graphics::MAX_LIGHTS {
            assert!(g.register_light(Light::default()).is_some());
        }
        assert!(g.register_light(Light::default()).is_none());
        assert!(g.misuse().has_reported(Misuse::NO_FREE_LIGHT));
    }

    #[test]
    fn test_content_scale_rejects_invalid() {
        let mut g = Graphics::default();
        g.set_content_scale(2.0);
        g.set_content_scale(0.0);
        g.set_content_scale(f32::NAN);
        assert_eq!(g.content_scale(), 2.0);
    }
}
