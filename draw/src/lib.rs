//! # oflike Draw
//!
//! Immediate-mode drawing in the openFrameworks style, recorded into an
//! [`oflike_graphics::DrawList`].
//!
//! # Architecture
//!
//! - [`Graphics`] - The drawing context: matrix stacks, style, material, lights
//! - [`CameraScope`] / [`MaterialScope`] - Guards returned by `begin_camera` and
//!   `begin_material` that restore the previous state when dropped
//! - [`PrimitiveCache`] - Generated primitive meshes reused across draws
//! - [`Polyline`] - Editable 2D outline drawn with `draw_polyline`
//! - [`Node`] / [`OrbitCamera`] - Scene placement and a camera circling a target
//!
//! # Usage
//!
//! ```ignore
//! let mut g = Graphics::new(GraphicsConfig::default());
//!
//! // Each frame:
//! g.begin_frame();
//! g.background(30, 30, 30);
//! g.set_color(255, 0, 0);
//! g.draw_circle(100.0, 100.0, 40.0);
//! {
//!     let mut cam = g.begin_camera(&Camera::default());
//!     cam.enable_depth_test();
//!     cam.draw_box(50.0, 50.0, 50.0);
//! }
//! g.end_frame();
//!
//! // At render time:
//! g.list_mut().optimize();
//! renderer.render(g.list_mut(), &mut backend)?;
//! ```

mod camera;
mod context;
mod material;
mod node;
mod polyline;
mod primitives;
mod shape;
mod shapes2d;
mod shapes3d;
mod state;
mod transform;

pub use camera::{Camera, CameraScope};
pub use context::{Graphics, GraphicsConfig};
pub use material::MaterialScope;
pub use node::{Node, OrbitCamera};
pub use polyline::Polyline;
pub use primitives::PrimitiveCache;
pub use shape::{ShapeBuilder, catmull_rom, cubic_bezier};
pub use state::{DEFAULT_CIRCLE_RESOLUTION, FillMode, RenderState};
pub use transform::{Transform, TransformStack, TransformStack2D, TransformStack3D};
