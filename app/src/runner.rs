//! Headless frame loop.

use std::time::Instant;

use oflike_core::profiling::{frame_mark, profile_function, profile_scope};
use oflike_draw::{Graphics, GraphicsConfig};
use oflike_graphics::{FrameStats, GpuBackend, GraphicsError, Renderer, RendererConfig};

use crate::context::AppContext;
use crate::handler::AppHandler;

/// What happens to a recorded list between `draw` and the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Merge compatible draws.
    pub optimize: bool,
    /// Reorder opaque draws by state, then merge again. Ignored without
    /// `optimize`.
    pub sort: bool,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            sort: false,
            max_frames: None,
        }
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub dropped_frames: u64,
    pub draw_calls: u64,
}

/// Drives an [`AppHandler`] through the per-frame lifecycle:
///
/// 1. reset the drawing context
/// 2. `update`
/// 3. `draw`
/// 4. optimize, optionally sort and optimize again
/// 5. render and present
///
/// A frame the backend rejects is dropped and the context is rewound to its
/// state before the frame.
pub struct FrameRunner<H: AppHandler> {
    handler: H,
    graphics: Graphics,
    renderer: Renderer,
    context: AppContext,
    options: RunnerOptions,
    start_time: Instant,
    last_frame_time: Instant,
    initialized: bool,
    running: bool,
}

impl<H: AppHandler> FrameRunner<H> {
    pub fn new(handler: H, config: GraphicsConfig, options: RunnerOptions) -> Self {
        let renderer = Renderer::new(RendererConfig {
            width: config.width,
            height: config.height,
            content_scale: config.content_scale,
            default_fov: config.default_fov,
            ..RendererConfig::default()
        });
        let context = AppContext::new(config.width, config.height, config.content_scale);
        let now = Instant::now();
        Self {
            handler,
            graphics: Graphics::new(config),
            renderer,
            context,
            options,
            start_time: now,
            last_frame_time: now,
            initialized: false,
            running: true,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// `false` once the handler asked to stop or the frame limit was hit.
    pub fn is_running(&self) -> bool {
        self.running
            && self
                .options
                .max_frames
                .map_or(true, |max| self.context.frame_number < max)
    }

    /// Change the window size between frames.
    pub fn resize(&mut self, width: u32, height: u32, content_scale: f32) {
        self.graphics.resize(width, height);
        self.graphics.set_content_scale(content_scale);
        // The context ignores invalid scales; keep the renderer in step with it.
        let content_scale = self.graphics.content_scale();
        self.renderer.resize(width, height, content_scale);
        self.context.width = width;
        self.context.height = height;
        self.context.content_scale = content_scale;
        log::info!("resized to {}x{} @{}", width, height, content_scale);
    }

    /// Record, optimize and render one frame.
    pub fn run_frame(&mut self, backend: &mut dyn GpuBackend) -> Result<FrameStats, GraphicsError> {
        profile_function!();

        if !self.initialized {
            self.handler.setup(&mut self.graphics, &self.context);
            self.initialized = true;
        }

        let now = Instant::now();
        self.context.delta_time = now - self.last_frame_time;
        self.context.elapsed_time = now - self.start_time;
        self.last_frame_time = now;

        self.graphics.begin_frame();
        if !self.handler.update(&self.context) {
            self.running = false;
        }
        {
            profile_scope!("draw");
            self.handler.draw(&mut self.graphics, &self.context);
        }
        self.graphics.end_frame();

        if self.options.optimize {
            let list = self.graphics.list_mut();
            let recorded = list.command_count();
            list.optimize();
            if self.options.sort {
                list.sort_commands();
                list.optimize();
            }
            log::trace!("optimized {} commands into {}", recorded, list.command_count());
        }

        let result = self.renderer.render(self.graphics.list_mut(), backend);
        self.context.frame_number += 1;
        frame_mark!();

        match result {
            Ok(stats) => Ok(stats),
            Err(err) => {
                self.graphics.rewind();
                self.context.dropped_frames += 1;
                self.handler.frame_dropped(&self.context, &err);
                Err(err)
            }
        }
    }

    /// Run frames until the handler stops or the frame limit is reached,
    /// then call `exit`.
    pub fn run(&mut self, backend: &mut dyn GpuBackend) -> RunSummary {
        log::info!("running on {} backend", backend.name());
        let mut summary = RunSummary::default();

        while self.is_running() {
            match self.run_frame(backend) {
                Ok(stats) => summary.draw_calls += u64::from(stats.draw_calls),
                Err(err) => log::warn!("frame {} dropped: {}", self.context.frame_number, err),
            }
        }

        summary.frames = self.context.frame_number;
        summary.dropped_frames = self.context.dropped_frames;
        self.handler.exit(&self.context);
        log::info!(
            "stopped after {} frames ({} dropped, {} draw calls)",
            summary.frames,
            summary.dropped_frames,
            summary.draw_calls
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_core::Color;
    use oflike_graphics::{DrawCommand, DummyBackend, FailurePoint, GpuCall};
    use rstest::rstest;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_after: Option<u64>,
        background: Option<Color>,
    }

    impl AppHandler for Recorder {
        fn setup(&mut self, g: &mut Graphics, _ctx: &AppContext) {
            if let Some(color) = self.background {
                g.set_background_color(color);
            }
            self.events.push("setup".into());
        }

        fn update(&mut self, ctx: &AppContext) -> bool {
            self.events.push(format!("update {}", ctx.frame_number()));
            self.stop_after.map_or(true, |n| ctx.frame_number() + 1 < n)
        }

        fn draw(&mut self, g: &mut Graphics, ctx: &AppContext) {
            self.events.push(format!("draw {}", ctx.frame_number()));
            for i in 0..10 {
                g.draw_rectangle(i as f32 * 20.0, 0.0, 10.0, 10.0);
            }
        }

        fn frame_dropped(&mut self, ctx: &AppContext, _error: &GraphicsError) {
            self.events.push(format!("dropped {}", ctx.frame_number()));
        }

        fn exit(&mut self, ctx: &AppContext) {
            self.events.push(format!("exit {}", ctx.frame_number()));
        }
    }

    fn runner(options: RunnerOptions) -> FrameRunner<Recorder> {
        let _ = env_logger::builder().is_test(true).try_init();
        FrameRunner::new(Recorder::default(), GraphicsConfig::default(), options)
    }

    #[test]
    fn test_lifecycle_order() {
        let mut runner = runner(RunnerOptions {
            max_frames: Some(2),
            ..Default::default()
        });
        let summary = runner.run(&mut DummyBackend::new());

        assert_eq!(
            runner.handler().events,
            ["setup", "update 0", "draw 0", "update 1", "draw 1", "exit 2"]
        );
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.dropped_frames, 0);
        assert_eq!(summary.draw_calls, 2);
    }

    #[test]
    fn test_update_false_stops_after_frame() {
        let mut runner = runner(RunnerOptions::default());
        runner.handler_mut().stop_after = Some(3);
        let summary = runner.run(&mut DummyBackend::new());
        assert_eq!(summary.frames, 3);
        assert!(!runner.is_running());
    }

    #[test]
    fn test_setup_state_survives_frames() {
        let gray = Color::gray(200);
        let mut runner = runner(RunnerOptions::default());
        runner.handler_mut().background = Some(gray);
        let mut backend = DummyBackend::new();
        runner.run_frame(&mut backend).unwrap();
        runner.run_frame(&mut backend).unwrap();
        let clears: Vec<_> = backend
            .take_calls()
            .into_iter()
            .filter_map(|c| match c {
                GpuCall::BeginPass(clear) => Some(clear),
                _ => None,
            })
            .collect();
        assert_eq!(clears.len(), 2);
        assert_eq!(
            runner.graphics().list().commands().first(),
            Some(&DrawCommand::SetClear { color: gray })
        );
    }

    #[test]
    fn test_unset_background_clears_to_black() {
        let mut runner = runner(RunnerOptions::default());
        runner.run_frame(&mut DummyBackend::new()).unwrap();
        assert_eq!(
            runner.graphics().list().commands().first(),
            Some(&DrawCommand::SetClear {
                color: Color::BLACK
            })
        );
    }

    #[test]
    fn test_dropped_frame_is_reported_and_rewound() {
        let mut runner = runner(RunnerOptions::default());
        let mut backend = DummyBackend::new();
        backend.inject_failure(FailurePoint::Upload);

        assert!(runner.run_frame(&mut backend).is_err());
        assert_eq!(runner.context().dropped_frames(), 1);
        assert!(runner.graphics().list().is_empty());
        assert_eq!(runner.handler().events.last().map(String::as_str), Some("dropped 1"));

        let stats = runner.run_frame(&mut backend).unwrap();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(runner.context().frame_number(), 2);
    }

    #[rstest]
    #[case::raw(false, false, 10)]
    #[case::optimized(true, false, 1)]
    #[case::sorted(true, true, 1)]
    fn test_optimize_options(#[case] optimize: bool, #[case] sort: bool, #[case] draws: u32) {
        let mut runner = runner(RunnerOptions {
            optimize,
            sort,
            max_frames: None,
        });
        let stats = runner.run_frame(&mut DummyBackend::new()).unwrap();
        assert_eq!(stats.draw_calls, draws);
    }

    #[test]
    fn test_resize_reaches_context() {
        let mut runner = runner(RunnerOptions::default());
        runner.resize(320, 240, 0.0);
        assert_eq!(runner.context().width(), 320);
        assert_eq!(runner.context().content_scale(), 1.0);
        assert_eq!(runner.graphics().width(), 320.0);
    }
}
