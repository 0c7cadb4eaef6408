//! Parametric 3D primitives.

use super::data::Mesh;
use super::generators;

/// Parameters of a procedural primitive.
///
/// [`regenerate`](Self::regenerate) always rebuilds the mesh from scratch, so
/// equal parameters produce identical meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Box {
        width: f32,
        height: f32,
        depth: f32,
        resolution: [u32; 3],
    },
    Sphere {
        radius: f32,
        lat_segments: u32,
        lon_segments: u32,
    },
    IcoSphere {
        radius: f32,
        subdivisions: u32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        cap_segments: u32,
        capped: bool,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        cap_segments: u32,
        capped: bool,
    },
    Plane {
        width: f32,
        height: f32,
        columns: u32,
        rows: u32,
    },
}

impl Primitive {
    /// Unit cube with one quad per face.
    pub fn cube(size: f32) -> Self {
        Primitive::Box {
            width: size,
            height: size,
            depth: size,
            resolution: [1, 1, 1],
        }
    }

    /// UV sphere with `resolution` latitude bands and twice as many slices.
    pub fn sphere(radius: f32, resolution: u32) -> Self {
        Primitive::Sphere {
            radius,
            lat_segments: resolution,
            lon_segments: resolution * 2,
        }
    }

    pub fn ico_sphere(radius: f32, subdivisions: u32) -> Self {
        Primitive::IcoSphere {
            radius,
            subdivisions,
        }
    }

    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        Primitive::Cylinder {
            radius,
            height,
            radial_segments,
            height_segments: 1,
            cap_segments: 1,
            capped: true,
        }
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Primitive::Cone {
            radius,
            height,
            radial_segments,
            height_segments: 1,
            cap_segments: 1,
            capped: true,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Primitive::Plane {
            width,
            height,
            columns: 1,
            rows: 1,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "box",
            Primitive::Sphere { .. } => "sphere",
            Primitive::IcoSphere { .. } => "icosphere",
            Primitive::Cylinder { .. } => "cylinder",
            Primitive::Cone { .. } => "cone",
            Primitive::Plane { .. } => "plane",
        }
    }

    /// Build the mesh for the current parameters.
    pub fn regenerate(&self) -> Mesh {
        match *self {
            Primitive::Box {
                width,
                height,
                depth,
                resolution,
            } => generators::generate_box(width, height, depth, resolution),
            Primitive::Sphere {
                radius,
                lat_segments,
                lon_segments,
            } => generators::generate_sphere(radius, lat_segments, lon_segments),
            Primitive::IcoSphere {
                radius,
                subdivisions,
            } => generators::generate_icosphere(radius, subdivisions),
            Primitive::Cylinder {
                radius,
                height,
                radial_segments,
                height_segments,
                cap_segments,
                capped,
            } => generators::generate_cylinder(
                radius,
                height,
                radial_segments,
                height_segments,
                cap_segments,
                capped,
            ),
            Primitive::Cone {
                radius,
                height,
                radial_segments,
                height_segments,
                cap_segments,
                capped,
            } => generators::generate_cone(
                radius,
                height,
                radial_segments,
                height_segments,
                cap_segments,
                capped,
            ),
            Primitive::Plane {
                width,
                height,
                columns,
                rows,
            } => generators::generate_plane(width, height, columns, rows),
        }
    }
}
