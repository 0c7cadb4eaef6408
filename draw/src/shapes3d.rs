//! Simple 3D shapes drawn in model space.
//!
//! Unlike 2D shapes these stay in model space and are transformed on the
//! GPU with the current model matrix and camera. Lines use the native line
//! topology and are never lit.

use std::f32::consts::TAU;

use oflike_core::Color;
use oflike_core::math::Vec3;
use oflike_core::mesh::{PrimitiveTopology, Vertex3D};

use crate::context::Graphics;
use crate::state::FillMode;

fn vertex(p: Vec3, color: Color) -> Vertex3D {
    Vertex3D::new([p.x, p.y, p.z]).with_color(color)
}

impl Graphics {
    fn emit_lines_3d(&mut self, points: &[(Vec3, Color)]) {
        let vertices: Vec<Vertex3D> = points.iter().map(|&(p, c)| vertex(p, c)).collect();
        let count = (vertices.len() / 2 * 2) as u32;
        let indices: Vec<u32> = (0..count).collect();
        self.emit_3d(&vertices, &indices, PrimitiveTopology::Lines);
    }

    pub fn draw_line_3d(&mut self, from: Vec3, to: Vec3) {
        let color = self.state.color;
        self.emit_lines_3d(&[(from, color), (to, color)]);
    }

    /// Filled triangle facing the side from which `a b c` is counter-clockwise,
    /// or its outline with no fill.
    pub fn draw_triangle_3d(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let color = self.state.color;
        match self.state.fill {
            FillMode::Fill => {
                let normal = (b - a)
                    .cross(&(c - a))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or(Vec3::z());
                let normal = [normal.x, normal.y, normal.z];
                let vertices = [a, b, c].map(|p| vertex(p, color).with_normal(normal));
                self.emit_3d(&vertices, &[0, 1, 2], PrimitiveTopology::Triangles);
            }
            FillMode::Outline => {
                let vertices = [a, b, c].map(|p| vertex(p, color));
                self.emit_3d(&vertices, &[0, 1, 1, 2, 2, 0], PrimitiveTopology::Lines);
            }
        }
    }

    /// Circle in the XY plane through `center`, facing +Z.
    pub fn draw_circle_3d(&mut self, center: Vec3, radius: f32) {
        let segments = self
            .state
            .circle_segments(radius, self.content_scale(), 1.0)
            .max(3);
        let color = self.state.color;
        let ring = (0..segments).map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            center + Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        });
        match self.state.fill {
            FillMode::Fill => {
                let normal = [0.0, 0.0, 1.0];
                let vertices: Vec<Vertex3D> = std::iter::once(center)
                    .chain(ring)
                    .map(|p| vertex(p, color).with_normal(normal))
                    .collect();
                let indices: Vec<u32> = (0..segments)
                    .flat_map(|i| [0, 1 + i, 1 + (i + 1) % segments])
                    .collect();
                self.emit_3d(&vertices, &indices, PrimitiveTopology::Triangles);
            }
            FillMode::Outline => {
                let vertices: Vec<Vertex3D> = ring.map(|p| vertex(p, color)).collect();
                let indices: Vec<u32> = (0..segments).flat_map(|i| [i, (i + 1) % segments]).collect();
                self.emit_3d(&vertices, &indices, PrimitiveTopology::Lines);
            }
        }
    }

    /// Red, green and blue lines of length `size` along +X, +Y and +Z.
    pub fn draw_axis(&mut self, size: f32) {
        let origin = Vec3::zeros();
        self.emit_lines_3d(&[
            (origin, Color::RED),
            (Vec3::x() * size, Color::RED),
            (origin, Color::GREEN),
            (Vec3::y() * size, Color::GREEN),
            (origin, Color::BLUE),
            (Vec3::z() * size, Color::BLUE),
        ]);
    }

    /// Square grid in the XZ plane centered on the origin, with `count`
    /// cells of `step` on each side of each axis.
    pub fn draw_grid(&mut self, step: f32, count: u32) {
        if count == 0 || step <= 0.0 {
            return;
        }
        let color = self.state.color;
        let extent = step * count as f32;
        let n = count as i32;
        let mut points = Vec::with_capacity(4 * (2 * count as usize + 1));
        for i in -n..=n {
            let offset = i as f32 * step;
            points.push((Vec3::new(offset, 0.0, -extent), color));
            points.push((Vec3::new(offset, 0.0, extent), color));
            points.push((Vec3::new(-extent, 0.0, offset), color));
            points.push((Vec3::new(extent, 0.0, offset), color));
        }
        self.emit_lines_3d(&points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oflike_graphics::{Draw3D, DrawCommand};

    fn frame() -> Graphics {
        let mut g = Graphics::default();
        g.set_background_auto(false);
        g.begin_frame();
        g
    }

    fn draws_3d(g: &Graphics) -> Vec<Draw3D> {
        g.list()
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Draw3D(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_line_3d_keeps_model_space() {
        let mut g = frame();
        g.translate_3d(0.0, 0.0, 5.0);
        g.draw_line_3d(Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0));
        let draws = draws_3d(&g);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].topology, PrimitiveTopology::Lines);
        assert_eq!(draws[0].model[(2, 3)], 5.0);
        assert_eq!(g.list().vertices_3d()[1].position, [1.0, 2.0, 3.0]);
        assert!(g.list().vertices_2d().is_empty());
    }

    #[test]
    fn test_triangle_3d_normal_and_outline() {
        let mut g = frame();
        g.draw_triangle_3d(Vec3::zeros(), Vec3::x(), Vec3::y());
        assert_eq!(g.list().vertices_3d()[0].normal, [0.0, 0.0, 1.0]);
        g.no_fill();
        g.draw_triangle_3d(Vec3::zeros(), Vec3::x(), Vec3::y());
        let draws = draws_3d(&g);
        assert_eq!(draws[0].topology, PrimitiveTopology::Triangles);
        assert_eq!(draws[1].topology, PrimitiveTopology::Lines);
        assert_eq!(draws[1].range.index_count, 6);
    }

    #[test]
    fn test_circle_3d_uses_circle_resolution() {
        let mut g = frame();
        g.set_circle_resolution(8);
        g.draw_circle_3d(Vec3::new(0.0, 0.0, 2.0), 1.0);
        let draws = draws_3d(&g);
        assert_eq!(draws[0].range.vertex_count, 9);
        assert_eq!(draws[0].range.index_count, 24);
        assert!(g.list().vertices_3d().iter().all(|v| v.position[2] == 2.0));
    }

    #[test]
    fn test_axis_colors() {
        let mut g = frame();
        g.draw_axis(10.0);
        let colors: Vec<_> = g.list().vertices_3d().iter().map(|v| v.color).collect();
        assert_eq!(colors[1], Color::RED.to_array());
        assert_eq!(colors[3], Color::GREEN.to_array());
        assert_eq!(colors[5], Color::BLUE.to_array());
        assert_eq!(g.list().vertices_3d()[5].position, [0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_grid_line_count() {
        let mut g = frame();
        g.draw_grid(1.0, 2);
        // five lines along each axis
        assert_eq!(draws_3d(&g)[0].range.index_count, 2 * 2 * 5);
        g.draw_grid(1.0, 0);
        assert_eq!(g.list().command_count(), 1);
    }
}
