//! # oflike App
//!
//! Headless application hosting for oflike drawing code.
//!
//! ## Overview
//!
//! - [`AppHandler`] - Trait for per-frame application logic
//! - [`AppArgs`] - Trait for reading runner configuration, with a clap-based
//!   [`DefaultAppArgs`]
//! - [`FrameRunner`] - Records, optimizes and renders frames on a backend
//! - [`App`] - Entry point wiring logging, arguments and backend selection
//!
//! ## Example
//!
//! ```ignore
//! use oflike_app::{App, AppArgs, AppContext, AppHandler, DefaultAppArgs};
//! use oflike_draw::Graphics;
//!
//! struct MyApp;
//!
//! impl AppHandler for MyApp {
//!     fn draw(&mut self, g: &mut Graphics, ctx: &AppContext) {
//!         g.background(20, 20, 20);
//!         g.draw_circle(ctx.width() as f32 / 2.0, ctx.height() as f32 / 2.0, 100.0);
//!     }
//! }
//!
//! fn main() -> Result<(), oflike_graphics::GraphicsError> {
//!     App::run(MyApp, DefaultAppArgs::parse())?;
//!     Ok(())
//! }
//! ```

mod app;
mod args;
mod context;
mod handler;
mod runner;

pub use app::{App, graphics_config, runner_options};
pub use args::{AppArgs, BackendKind, DefaultAppArgs};
pub use context::AppContext;
pub use handler::AppHandler;
pub use runner::{FrameRunner, RunSummary, RunnerOptions};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
pub fn init() {
    log::info!("oflike app v{} initialized", VERSION);
}
