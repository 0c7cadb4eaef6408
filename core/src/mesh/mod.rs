//! CPU-side mesh types, generators and file I/O.
//!
//! - [`Vertex2D`] / [`Vertex3D`] - Interleaved vertex formats
//! - [`Mesh`] - Vertex and index data with a [`PrimitiveTopology`]
//! - [`generators`] - Procedural box, spheres, cylinder, cone and plane
//! - [`Primitive`] - Parametric primitive that regenerates its mesh
//! - [`ply`] - PLY import and export

mod data;
pub mod generators;
pub mod ply;
mod primitive;
mod vertex;

pub use data::{Mesh, MeshError, PrimitiveTopology};
pub use primitive::Primitive;
pub use vertex::{Vertex2D, Vertex3D};
