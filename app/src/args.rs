//! Command line arguments trait and default implementation.
//!
//! Uses clap for CLI parsing with:
//! - Help text (`--help`)
//! - Validation and clear error messages
//! - A warning when a backend is requested that this build lacks

use log::LevelFilter;

/// GPU backend the runner drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    /// Records backend calls without a GPU. Always available.
    #[default]
    Dummy,
    /// Headless wgpu rendering. Needs the `wgpu-backend` feature.
    Wgpu,
}

/// Trait for reading runner configuration.
///
/// Every method has a default, so a custom implementation only overrides
/// the options it cares about.
///
/// # Example
///
/// ```ignore
/// use oflike_app::AppArgs;
///
/// struct FixedArgs;
///
/// impl AppArgs for FixedArgs {
///     fn parse() -> Self {
///         FixedArgs
///     }
///
///     fn max_frames(&self) -> Option<u64> {
///         Some(10)
///     }
/// }
/// ```
pub trait AppArgs: Sized {
    /// Parse command line arguments.
    fn parse() -> Self;

    /// Default: [`BackendKind::Dummy`]
    fn backend(&self) -> BackendKind {
        BackendKind::Dummy
    }

    /// Window width in points. Default: 1024
    fn width(&self) -> u32 {
        1024
    }

    /// Window height in points. Default: 768
    fn height(&self) -> u32 {
        768
    }

    /// Pixels per point. Default: 1.0
    fn content_scale(&self) -> f32 {
        1.0
    }

    /// Stop after this many frames. Default: `None` (until the handler stops)
    fn max_frames(&self) -> Option<u64> {
        None
    }

    /// Merge compatible draws before rendering. Default: true
    fn optimize(&self) -> bool {
        true
    }

    /// Reorder opaque draws by state before the final merge. Default: false
    fn sort(&self) -> bool {
        false
    }

    /// Default: [`LevelFilter::Info`]
    fn log_level(&self) -> LevelFilter {
        LevelFilter::Info
    }
}

// ============================================================================
// Default App Args
// ============================================================================

/// Default command line arguments.
///
/// ```bash
/// # Show help
/// ./oflike-headless --help
///
/// # Render 10 frames at 2x content scale with sorting
/// ./oflike-headless --frames 10 --content-scale 2 --sort
///
/// # Render through wgpu with debug logging
/// ./oflike-headless --backend wgpu --frames 1 --log-level debug
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppArgs {
    backend: BackendKind,
    width: u32,
    height: u32,
    content_scale: f32,
    max_frames: Option<u64>,
    optimize: bool,
    sort: bool,
    log_level: LevelFilter,
}

impl Default for DefaultAppArgs {
    fn default() -> Self {
        Self {
            backend: BackendKind::Dummy,
            width: 1024,
            height: 768,
            content_scale: 1.0,
            max_frames: None,
            optimize: true,
            sort: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl DefaultAppArgs {
    /// Set the window size in points.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Parse from an explicit argument list, first item being the program
    /// name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::Parser;
        native::ClapArgs::try_parse_from(args).map(Into::into)
    }
}

mod native {
    use super::*;
    use clap::Parser;

    /// oflike headless runner arguments.
    #[derive(Parser, Debug)]
    #[command(
        name = "oflike",
        about = "Run an oflike app headless",
        long_about = "Runs an oflike app without a window: every frame is recorded, \
            optimized and rendered through the selected backend.\n\n\
            EXAMPLES:\n\
              # Ten frames on the recording backend\n\
              ./oflike-headless --frames 10\n\
            \n\
              # Compare batching with and without sorting\n\
              ./oflike-headless --frames 1 --sort --log-level debug",
        version
    )]
    pub(super) struct ClapArgs {
        /// GPU backend to drive.
        #[arg(long, default_value = "dummy", value_enum)]
        pub backend: BackendKind,

        /// Window width in points.
        #[arg(long, default_value = "1024")]
        pub width: u32,

        /// Window height in points.
        #[arg(long, default_value = "768")]
        pub height: u32,

        /// Pixels per point (2.0 for HiDPI).
        #[arg(long, default_value = "1.0")]
        pub content_scale: f32,

        /// Exit after N frames.
        #[arg(long)]
        pub frames: Option<u64>,

        /// Sort opaque draws by state before merging.
        #[arg(long)]
        pub sort: bool,

        /// Submit commands exactly as recorded.
        #[arg(long)]
        pub no_optimize: bool,

        /// Log level (off, error, warn, info, debug, trace). RUST_LOG overrides it.
        #[arg(long, default_value = "info")]
        pub log_level: LevelFilter,
    }

    impl From<ClapArgs> for DefaultAppArgs {
        fn from(args: ClapArgs) -> Self {
            if args.sort && args.no_optimize {
                log::warn!("--sort has no effect together with --no-optimize");
            }
            let content_scale = if args.content_scale.is_finite() && args.content_scale > 0.0 {
                args.content_scale
            } else {
                log::warn!(
                    "invalid --content-scale {}, using 1.0",
                    args.content_scale
                );
                1.0
            };
            Self {
                backend: args.backend,
                width: args.width.max(1),
                height: args.height.max(1),
                content_scale,
                max_frames: args.frames,
                optimize: !args.no_optimize,
                sort: args.sort,
                log_level: args.log_level,
            }
        }
    }
}

impl AppArgs for DefaultAppArgs {
    fn parse() -> Self {
        use clap::Parser;
        native::ClapArgs::parse().into()
    }

    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn content_scale(&self) -> f32 {
        self.content_scale
    }

    fn max_frames(&self) -> Option<u64> {
        self.max_frames
    }

    fn optimize(&self) -> bool {
        self.optimize
    }

    fn sort(&self) -> bool {
        self.sort && self.optimize
    }

    fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}
