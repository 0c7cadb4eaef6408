//! Style state consulted when geometry is recorded.

use oflike_core::Color;
use oflike_graphics::{BlendMode, TextureHandle};

/// Pixels a circle edge should span when the resolution is automatic.
pub const TARGET_PIXEL_SPAN: f32 = 4.0;
/// Fewest segments an automatic circle gets.
pub const MIN_AUTO_CIRCLE_SEGMENTS: u32 = 6;
/// Fewest sub-segments per curve span.
pub const MIN_CURVE_RESOLUTION: u32 = 8;

pub const DEFAULT_CIRCLE_RESOLUTION: u32 = 32;
pub const DEFAULT_SPHERE_RESOLUTION: u32 = 20;
pub const DEFAULT_CURVE_RESOLUTION: u32 = 20;

/// Whether closed shapes are filled or outlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Fill,
    Outline,
}

/// Current drawing style.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub color: Color,
    /// Line width in points. Read through [`RenderState::line_width`].
    line_width: f32,
    pub fill: FillMode,
    /// `None` picks a resolution from the on-screen radius. Opt-in through
    /// [`RenderState::set_circle_resolution_auto`].
    circle_resolution: Option<u32>,
    sphere_resolution: u32,
    curve_resolution: u32,
    pub blend: BlendMode,
    pub depth_test: bool,
    pub background: Color,
    /// Clear to `background` at the start of each frame.
    pub background_auto: bool,
    /// Texture applied to meshes and primitives.
    pub texture: Option<TextureHandle>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            line_width: 1.0,
            fill: FillMode::Fill,
            circle_resolution: Some(DEFAULT_CIRCLE_RESOLUTION),
            sphere_resolution: DEFAULT_SPHERE_RESOLUTION,
            curve_resolution: DEFAULT_CURVE_RESOLUTION,
            blend: BlendMode::Alpha,
            depth_test: false,
            background: Color::BLACK,
            background_auto: true,
            texture: None,
        }
    }
}

impl RenderState {
    /// Line width clamped to at least one device pixel.
    pub fn line_width(&self, content_scale: f32) -> f32 {
        self.line_width.max(1.0 / content_scale.max(f32::EPSILON))
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = if width.is_finite() { width } else { 1.0 };
    }

    pub fn set_circle_resolution(&mut self, segments: u32) {
        self.circle_resolution = Some(segments.max(3));
    }

    /// Return to the radius-driven circle resolution.
    pub fn set_circle_resolution_auto(&mut self) {
        self.circle_resolution = None;
    }

    pub fn circle_resolution(&self) -> Option<u32> {
        self.circle_resolution
    }

    /// Segments for a circle of `radius` points drawn with `scale` from the
    /// current transform.
    pub fn circle_segments(&self, radius: f32, content_scale: f32, scale: f32) -> u32 {
        if let Some(explicit) = self.circle_resolution {
            return explicit;
        }
        let pixels = std::f32::consts::TAU * radius.abs() * scale.abs() * content_scale;
        let segments = (pixels / TARGET_PIXEL_SPAN).ceil();
        if segments.is_finite() {
            (segments as u32).max(MIN_AUTO_CIRCLE_SEGMENTS)
        } else {
            MIN_AUTO_CIRCLE_SEGMENTS
        }
    }

    pub fn set_sphere_resolution(&mut self, resolution: u32) {
        self.sphere_resolution = resolution.max(2);
    }

    pub fn sphere_resolution(&self) -> u32 {
        self.sphere_resolution
    }

    pub fn set_curve_resolution(&mut self, resolution: u32) {
        self.curve_resolution = resolution.max(MIN_CURVE_RESOLUTION);
    }

    pub fn curve_resolution(&self) -> u32 {
        self.curve_resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = RenderState::default();
        assert_eq!(state.color, Color::WHITE);
        assert_eq!(state.blend, BlendMode::Alpha);
        assert_eq!(state.fill, FillMode::Fill);
        assert_eq!(state.circle_resolution(), Some(32));
        assert_eq!(state.circle_segments(10.0, 1.0, 1.0), 32);
        assert_eq!(state.circle_segments(500.0, 2.0, 1.0), 32);
        assert_eq!(state.background, Color::BLACK);
        assert!(state.background_auto);
        assert_eq!(state.sphere_resolution(), 20);
        assert_eq!(state.curve_resolution(), 20);
        assert!(!state.depth_test);
    }

    #[test]
    fn test_line_width_at_least_one_pixel() {
        let mut state = RenderState::default();
        state.set_line_width(0.1);
        assert_eq!(state.line_width(2.0), 0.5);
        assert_eq!(state.line_width(1.0), 1.0);
        state.set_line_width(3.0);
        assert_eq!(state.line_width(2.0), 3.0);
    }

    #[test]
    fn test_auto_circle_segments() {
        let mut state = RenderState::default();
        state.set_circle_resolution_auto();
        assert_eq!(state.circle_segments(0.5, 1.0, 1.0), 6);
        // 2 * pi * 100 / 4 = 157.08
        assert_eq!(state.circle_segments(100.0, 1.0, 1.0), 158);
        assert_eq!(state.circle_segments(100.0, 2.0, 1.0), 315);
    }

    #[test]
    fn test_explicit_circle_resolution_wins() {
        let mut state = RenderState::default();
        state.set_circle_resolution(16);
        assert_eq!(state.circle_segments(1000.0, 2.0, 1.0), 16);
        state.set_circle_resolution(1);
        assert_eq!(state.circle_segments(10.0, 1.0, 1.0), 3);
        state.set_circle_resolution_auto();
        assert_eq!(state.circle_resolution(), None);
    }

    #[test]
    fn test_curve_resolution_clamped() {
        let mut state = RenderState::default();
        state.set_curve_resolution(2);
        assert_eq!(state.curve_resolution(), 8);
    }
}
