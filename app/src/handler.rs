//! Application handler trait.

use oflike_draw::Graphics;
use oflike_graphics::GraphicsError;

use crate::context::AppContext;

/// Trait for application logic driven by a [`FrameRunner`](crate::FrameRunner).
///
/// # Lifecycle
///
/// 1. `setup` - Called once before the first frame
/// 2. `update` - Called every frame before drawing
/// 3. `draw` - Called every frame to record drawing commands
/// 4. `frame_dropped` - Called when the renderer could not complete a frame
/// 5. `exit` - Called once when the runner stops
///
/// Optimizing, rendering and presenting happen between frames and are not
/// visible to the handler.
///
/// # Example
///
/// ```ignore
/// use oflike_app::{AppContext, AppHandler};
/// use oflike_draw::Graphics;
///
/// struct Spinner {
///     angle: f32,
/// }
///
/// impl AppHandler for Spinner {
///     fn update(&mut self, ctx: &AppContext) -> bool {
///         self.angle += 90.0 * ctx.delta_time();
///         true
///     }
///
///     fn draw(&mut self, g: &mut Graphics, ctx: &AppContext) {
///         g.translate(ctx.width() as f32 / 2.0, ctx.height() as f32 / 2.0);
///         g.rotate(self.angle);
///         g.draw_rectangle(-50.0, -50.0, 100.0, 100.0);
///     }
/// }
/// ```
pub trait AppHandler {
    /// Called once before the first frame, with the context ready for state
    /// changes such as background color or lights.
    fn setup(&mut self, _g: &mut Graphics, _ctx: &AppContext) {}

    /// Called every frame before drawing.
    ///
    /// Returns `true` to continue running, `false` to stop.
    fn update(&mut self, _ctx: &AppContext) -> bool {
        true
    }

    /// Record the frame.
    fn draw(&mut self, g: &mut Graphics, ctx: &AppContext);

    /// Called after a frame was dropped. The drawing state has already been
    /// rewound to the start of that frame.
    fn frame_dropped(&mut self, _ctx: &AppContext, _error: &GraphicsError) {}

    /// Called once when the runner stops.
    fn exit(&mut self, _ctx: &AppContext) {}
}
