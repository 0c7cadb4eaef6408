//! Profiling support via Tracy.
//!
//! Re-exports the CPU macros from [`oflike_core::profiling`]. Enable with the
//! `profiling` feature:
//!
//! ```bash
//! cargo run -p oflike-app --features profiling
//! ```

pub use oflike_core::profiling::*;
