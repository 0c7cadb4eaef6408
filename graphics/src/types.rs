//! Common value types shared by draw commands and backends.

use oflike_core::Color;

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle in framebuffer pixels, origin at the top-left.
///
/// Used for viewports and scissor rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle from dimensions with origin at (0, 0).
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Every edge multiplied by `factor`, e.g. points to pixels.
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Intersection with `other`, or an empty rect at the origin of `self`.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            Rect::new(self.x, self.y, 0.0, 0.0)
        } else {
            Rect::new(x0, y0, x1 - x0, y1 - y0)
        }
    }
}

// ============================================================================
// Blending
// ============================================================================

/// Color blend mode. Alpha is non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BlendMode {
    /// Blending disabled, source replaces destination.
    Opaque,
    /// `src * a + dst * (1 - a)`.
    #[default]
    Alpha,
    /// `src * a + dst`.
    Add,
    /// `dst - src * a`.
    Subtract,
    /// `src * dst`.
    Multiply,
    /// `src + dst * (1 - src)`.
    Screen,
}

impl BlendMode {
    pub fn is_opaque(&self) -> bool {
        matches!(self, BlendMode::Opaque)
    }
}

// ============================================================================
// Resource identity
// ============================================================================

/// Identity of the GPU device that owns a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceId(pub u32);

/// Texture created on a specific device.
///
/// Binding a texture on a backend with a different [`DeviceId`] is misuse;
/// the renderer skips such commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle {
    pub id: u32,
    pub device: DeviceId,
}

impl TextureHandle {
    pub fn new(id: u32, device: DeviceId) -> Self {
        Self { id, device }
    }
}

/// Index of a material snapshot in a draw list's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MaterialId(pub u32);

/// Lights that affect a 3D draw.
///
/// `mask` has one bit per registry slot; `snapshot` indexes the light
/// parameters captured in the draw list when the command was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LightSet {
    pub mask: u8,
    pub snapshot: u32,
}

impl LightSet {
    /// No lights: the draw is unlit.
    pub const NONE: Self = Self { mask: 0, snapshot: 0 };

    pub fn is_lit(&self) -> bool {
        self.mask != 0
    }
}

/// Color the render target is cleared to at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClearColor {
    /// Keep previous contents.
    #[default]
    Load,
    Color(Color),
}
