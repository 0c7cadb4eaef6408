//! Application entry point.

use oflike_draw::GraphicsConfig;
use oflike_graphics::{DummyBackend, GpuBackend, GraphicsError};

use crate::args::{AppArgs, BackendKind};
use crate::handler::AppHandler;
use crate::runner::{FrameRunner, RunSummary, RunnerOptions};

/// Sets up logging, picks a backend from the arguments and runs a
/// [`FrameRunner`] to completion.
///
/// # Example
///
/// ```ignore
/// use oflike_app::{App, AppArgs, AppContext, AppHandler, DefaultAppArgs};
/// use oflike_draw::Graphics;
///
/// struct MyApp;
///
/// impl AppHandler for MyApp {
///     fn draw(&mut self, g: &mut Graphics, _ctx: &AppContext) {
///         g.draw_circle(100.0, 100.0, 50.0);
///     }
/// }
///
/// fn main() -> Result<(), oflike_graphics::GraphicsError> {
///     App::run(MyApp, DefaultAppArgs::parse())?;
///     Ok(())
/// }
/// ```
pub struct App;

impl App {
    /// Run `handler` with the configuration in `args`.
    ///
    /// Fails only when the requested backend cannot be created.
    pub fn run<H, A>(handler: H, args: A) -> Result<RunSummary, GraphicsError>
    where
        H: AppHandler,
        A: AppArgs,
    {
        // RUST_LOG takes precedence over --log-level.
        let _ = env_logger::Builder::new()
            .filter_level(args.log_level())
            .parse_default_env()
            .try_init();

        oflike_core::init();
        oflike_graphics::init();
        crate::init();

        let mut backend = create_backend(&args)?;
        let mut runner = FrameRunner::new(handler, graphics_config(&args), runner_options(&args));
        Ok(runner.run(backend.as_mut()))
    }
}

/// Context configuration for `args`.
pub fn graphics_config(args: &impl AppArgs) -> GraphicsConfig {
    GraphicsConfig {
        width: args.width(),
        height: args.height(),
        content_scale: args.content_scale(),
        ..GraphicsConfig::default()
    }
}

/// Runner options for `args`.
pub fn runner_options(args: &impl AppArgs) -> RunnerOptions {
    RunnerOptions {
        optimize: args.optimize(),
        sort: args.sort(),
        max_frames: args.max_frames(),
    }
}

fn create_backend(args: &impl AppArgs) -> Result<Box<dyn GpuBackend>, GraphicsError> {
    match args.backend() {
        BackendKind::Dummy => Ok(Box::new(DummyBackend::new())),
        #[cfg(feature = "wgpu-backend")]
        BackendKind::Wgpu => {
            let scale = args.content_scale();
            let width = (args.width() as f32 * scale).round().max(1.0) as u32;
            let height = (args.height() as f32 * scale).round().max(1.0) as u32;
            Ok(Box::new(oflike_graphics::WgpuBackend::new(width, height)?))
        }
        #[cfg(not(feature = "wgpu-backend"))]
        BackendKind::Wgpu => {
            log::warn!("built without the wgpu-backend feature, using the dummy backend");
            Ok(Box::new(DummyBackend::new()))
        }
    }
}
