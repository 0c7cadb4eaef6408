//! Mesh generators for the 3D primitives.
//!
//! Every generator produces an indexed [`Mesh`] with the `Triangles`
//! topology, positions, normals and UVs. Resolutions below the minimum are
//! clamped silently: radial counts to 3, grid counts to 1, sphere latitude
//! bands to 2.

use std::collections::HashMap;
use std::f32::consts::PI;

use super::data::{Mesh, PrimitiveTopology};
use super::vertex::Vertex3D;

/// Lowest radial resolution accepted by the generators.
pub const MIN_RADIAL_SEGMENTS: u32 = 3;

/// Lowest grid resolution accepted by the generators.
pub const MIN_GRID_SEGMENTS: u32 = 1;

/// Highest icosphere subdivision level.
pub const MAX_ICOSPHERE_SUBDIVISIONS: u32 = 7;

fn clamp_radial(n: u32) -> u32 {
    n.max(MIN_RADIAL_SEGMENTS)
}

fn clamp_grid(n: u32) -> u32 {
    n.max(MIN_GRID_SEGMENTS)
}

fn triangle_mesh(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Mesh {
    Mesh::new(PrimitiveTopology::Triangles)
        .with_vertices(vertices)
        .with_indices(indices)
        .with_streams(true, true, false)
}

fn vertex(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex3D {
    Vertex3D::new(position).with_normal(normal).with_uv(uv)
}

/// One face of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxFace {
    Front,
    Right,
    Left,
    Back,
    Top,
    Bottom,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Front,
        BoxFace::Right,
        BoxFace::Left,
        BoxFace::Back,
        BoxFace::Top,
        BoxFace::Bottom,
    ];

    /// Outward normal of the face.
    pub fn normal(&self) -> [f32; 3] {
        match self {
            BoxFace::Front => [0.0, 0.0, 1.0],
            BoxFace::Right => [1.0, 0.0, 0.0],
            BoxFace::Left => [-1.0, 0.0, 0.0],
            BoxFace::Back => [0.0, 0.0, -1.0],
            BoxFace::Top => [0.0, 1.0, 0.0],
            BoxFace::Bottom => [0.0, -1.0, 0.0],
        }
    }

    /// Face frame `(origin, right, up, resolution_u, resolution_v)`; right x up
    /// points along the outward normal so the grid winds counter-clockwise.
    #[allow(clippy::type_complexity)]
    fn frame(
        &self,
        size: [f32; 3],
        res: [u32; 3],
    ) -> ([f32; 3], [f32; 3], [f32; 3], u32, u32) {
        let [w, h, d] = size;
        let (hw, hh, hd) = (w * 0.5, h * 0.5, d * 0.5);
        let [rw, rh, rd] = res;
        match self {
            BoxFace::Front => ([-hw, -hh, hd], [w, 0.0, 0.0], [0.0, h, 0.0], rw, rh),
            BoxFace::Right => ([hw, -hh, hd], [0.0, 0.0, -d], [0.0, h, 0.0], rd, rh),
            BoxFace::Left => ([-hw, -hh, -hd], [0.0, 0.0, d], [0.0, h, 0.0], rd, rh),
            BoxFace::Back => ([hw, -hh, -hd], [-w, 0.0, 0.0], [0.0, h, 0.0], rw, rh),
            BoxFace::Top => ([-hw, hh, hd], [w, 0.0, 0.0], [0.0, 0.0, -d], rw, rd),
            BoxFace::Bottom => ([-hw, -hh, -hd], [w, 0.0, 0.0], [0.0, 0.0, d], rw, rd),
        }
    }
}

fn push_grid_face(
    vertices: &mut Vec<Vertex3D>,
    indices: &mut Vec<u32>,
    face: BoxFace,
    size: [f32; 3],
    res: [u32; 3],
) {
    let (origin, right, up, res_u, res_v) = face.frame(size, res);
    let normal = face.normal();
    let start = vertices.len() as u32;

    for v in 0..=res_v {
        for u in 0..=res_u {
            let uf = u as f32 / res_u as f32;
            let vf = v as f32 / res_v as f32;
            let p = [
                origin[0] + right[0] * uf + up[0] * vf,
                origin[1] + right[1] * uf + up[1] * vf,
                origin[2] + right[2] * uf + up[2] * vf,
            ];
            vertices.push(vertex(p, normal, [uf, vf]));
        }
    }

    for v in 0..res_v {
        for u in 0..res_u {
            let i0 = start + v * (res_u + 1) + u;
            let i1 = i0 + 1;
            let i2 = i0 + res_u + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
        }
    }
}

/// Generate a box centered at the origin.
///
/// Each face is a `(resU + 1) x (resV + 1)` vertex grid where the face's two
/// axes take their resolution from `resolution = [width, height, depth]`.
pub fn generate_box(width: f32, height: f32, depth: f32, resolution: [u32; 3]) -> Mesh {
    let res = resolution.map(clamp_grid);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for face in BoxFace::ALL {
        push_grid_face(&mut vertices, &mut indices, face, [width, height, depth], res);
    }
    triangle_mesh(vertices, indices)
}

/// Generate a single face of the box produced by [`generate_box`].
pub fn generate_box_face(
    face: BoxFace,
    width: f32,
    height: f32,
    depth: f32,
    resolution: [u32; 3],
) -> Mesh {
    let res = resolution.map(clamp_grid);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    push_grid_face(&mut vertices, &mut indices, face, [width, height, depth], res);
    triangle_mesh(vertices, indices)
}

/// Generate a UV sphere.
///
/// `lat_segments` bands run pole to pole (theta in [0, pi]) and
/// `lon_segments` slices run around the Y axis. The result has
/// `(lat + 1) * (lon + 1)` vertices and `2 * lat * lon` triangles; at the
/// poles one triangle of each quad is zero-area.
pub fn generate_sphere(radius: f32, lat_segments: u32, lon_segments: u32) -> Mesh {
    let lat = lat_segments.max(2);
    let lon = clamp_radial(lon_segments);
    let mut vertices = Vec::with_capacity(((lat + 1) * (lon + 1)) as usize);
    let mut indices = Vec::with_capacity((lat * lon * 6) as usize);

    for ring in 0..=lat {
        let theta = ring as f32 * PI / lat as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for segment in 0..=lon {
            let phi = segment as f32 * 2.0 * PI / lon as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let n = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            vertices.push(vertex(
                [n[0] * radius, n[1] * radius, n[2] * radius],
                n,
                [segment as f32 / lon as f32, ring as f32 / lat as f32],
            ));
        }
    }

    for ring in 0..lat {
        for segment in 0..lon {
            let first = ring * (lon + 1) + segment;
            let second = first + lon + 1;
            indices.extend_from_slice(&[first, first + 1, second]);
            indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    triangle_mesh(vertices, indices)
}

/// Generate an icosphere by recursive midpoint subdivision of an icosahedron.
///
/// `subdivisions = k` yields `10 * 4^k + 2` vertices and `20 * 4^k`
/// triangles. `k` is clamped to [`MAX_ICOSPHERE_SUBDIVISIONS`].
pub fn generate_icosphere(radius: f32, subdivisions: u32) -> Mesh {
    let k = subdivisions.min(MAX_ICOSPHERE_SUBDIVISIONS);
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;

    let base: [[f32; 3]; 12] = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut points: Vec<[f32; 3]> = base.iter().map(|p| unit(*p)).collect();

    #[rustfmt::skip]
    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..k {
        let mut cache: HashMap<u64, u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, points: &mut Vec<[f32; 3]>| -> u32 {
            let key = ((a.min(b) as u64) << 32) | a.max(b) as u64;
            *cache.entry(key).or_insert_with(|| {
                let pa = points[a as usize];
                let pb = points[b as usize];
                points.push(unit([
                    (pa[0] + pb[0]) * 0.5,
                    (pa[1] + pb[1]) * 0.5,
                    (pa[2] + pb[2]) * 0.5,
                ]));
                (points.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [v1, v2, v3] in faces {
            let a = midpoint(v1, v2, &mut points);
            let b = midpoint(v2, v3, &mut points);
            let c = midpoint(v3, v1, &mut points);
            next.push([v1, a, c]);
            next.push([v2, b, a]);
            next.push([v3, c, b]);
            next.push([a, b, c]);
        }
        faces = next;
    }

    let vertices = points
        .iter()
        .map(|&n| {
            let u = 0.5 + n[2].atan2(n[0]) / (2.0 * PI);
            let v = 0.5 - n[1].clamp(-1.0, 1.0).asin() / PI;
            vertex([n[0] * radius, n[1] * radius, n[2] * radius], n, [u, v])
        })
        .collect();
    let indices = faces.into_iter().flatten().collect();
    triangle_mesh(vertices, indices)
}

fn unit(p: [f32; 3]) -> [f32; 3] {
    let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    [p[0] / len, p[1] / len, p[2] / len]
}

/// Radius profile of a lathe: the cylinder keeps `radius`, the cone
/// collapses to the apex.
#[derive(Clone, Copy)]
enum Profile {
    Cylinder,
    Cone,
}

#[allow(clippy::too_many_arguments)]
fn generate_lathe(
    profile: Profile,
    radius: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    cap_segments: u32,
    capped: bool,
) -> Mesh {
    let radial = clamp_radial(radial_segments);
    let rows = clamp_grid(height_segments);
    let rings = clamp_grid(cap_segments);
    let half = height * 0.5;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // side wall, bottom row first
    for row in 0..=rows {
        let t = row as f32 / rows as f32;
        let y = -half + t * height;
        let r = match profile {
            Profile::Cylinder => radius,
            Profile::Cone => radius * (1.0 - t),
        };
        for s in 0..=radial {
            let angle = s as f32 * 2.0 * PI / radial as f32;
            let (sin, cos) = angle.sin_cos();
            let normal = match profile {
                Profile::Cylinder => [cos, 0.0, sin],
                // (cos, r/h, sin) scaled by h, which stays finite for flat cones
                Profile::Cone => {
                    let n = [cos * height, radius, sin * height];
                    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
                    if len <= f32::EPSILON {
                        [0.0, 1.0, 0.0]
                    } else {
                        [n[0] / len, n[1] / len, n[2] / len]
                    }
                }
            };
            vertices.push(vertex(
                [r * cos, y, r * sin],
                normal,
                [s as f32 / radial as f32, 1.0 - t],
            ));
        }
    }
    for row in 0..rows {
        for s in 0..radial {
            let i0 = row * (radial + 1) + s;
            let i1 = i0 + 1;
            let i2 = i0 + radial + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    if capped {
        push_cap(&mut vertices, &mut indices, radius, -half, radial, rings, false);
        if matches!(profile, Profile::Cylinder) {
            push_cap(&mut vertices, &mut indices, radius, half, radial, rings, true);
        }
    }

    triangle_mesh(vertices, indices)
}

/// Disc cap made of a center fan and `rings - 1` quad rings.
fn push_cap(
    vertices: &mut Vec<Vertex3D>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    radial: u32,
    rings: u32,
    top: bool,
) {
    let normal = if top { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = vertices.len() as u32;
    vertices.push(vertex([0.0, y, 0.0], normal, [0.5, 0.5]));

    let ring_start = center + 1;
    for ring in 1..=rings {
        let t = ring as f32 / rings as f32;
        for s in 0..=radial {
            let angle = s as f32 * 2.0 * PI / radial as f32;
            let (sin, cos) = angle.sin_cos();
            vertices.push(vertex(
                [radius * t * cos, y, radius * t * sin],
                normal,
                [0.5 + 0.5 * t * cos, 0.5 + 0.5 * t * sin],
            ));
        }
    }

    let at = |ring: u32, s: u32| ring_start + (ring - 1) * (radial + 1) + s;
    for s in 0..radial {
        if top {
            indices.extend_from_slice(&[center, at(1, s + 1), at(1, s)]);
        } else {
            indices.extend_from_slice(&[center, at(1, s), at(1, s + 1)]);
        }
    }
    for ring in 1..rings {
        for s in 0..radial {
            let (a, b) = (at(ring, s), at(ring, s + 1));
            let (c, d) = (at(ring + 1, s), at(ring + 1, s + 1));
            if top {
                indices.extend_from_slice(&[a, d, c, a, b, d]);
            } else {
                indices.extend_from_slice(&[a, c, d, a, d, b]);
            }
        }
    }
}

/// Generate a Y-aligned cylinder centered at the origin.
pub fn generate_cylinder(
    radius: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    cap_segments: u32,
    capped: bool,
) -> Mesh {
    generate_lathe(
        Profile::Cylinder,
        radius,
        height,
        radial_segments,
        height_segments,
        cap_segments,
        capped,
    )
}

/// Generate a Y-aligned cone with its apex at `+height / 2`.
///
/// Side normals lean outward by the cone's half-angle.
pub fn generate_cone(
    radius: f32,
    height: f32,
    radial_segments: u32,
    height_segments: u32,
    cap_segments: u32,
    capped: bool,
) -> Mesh {
    generate_lathe(
        Profile::Cone,
        radius,
        height,
        radial_segments,
        height_segments,
        cap_segments,
        capped,
    )
}

/// Generate a grid in the XZ plane facing +Y.
pub fn generate_plane(width: f32, height: f32, columns: u32, rows: u32) -> Mesh {
    let columns = clamp_grid(columns);
    let rows = clamp_grid(rows);
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut vertices = Vec::with_capacity(((columns + 1) * (rows + 1)) as usize);
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);

    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        for col in 0..=columns {
            let u = col as f32 / columns as f32;
            vertices.push(vertex(
                [-hw + u * width, 0.0, -hh + v * height],
                [0.0, 1.0, 0.0],
                [u, v],
            ));
        }
    }
    for row in 0..rows {
        for col in 0..columns {
            let i0 = row * (columns + 1) + col;
            let i1 = i0 + 1;
            let i2 = i0 + columns + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    triangle_mesh(vertices, indices)
}
