//! Benchmarks for draw list batching and the renderer walk.
//!
//! Run with: cargo bench -p oflike-graphics

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use oflike_core::math::{Affine2, Mat4};
use oflike_core::mesh::generators::{generate_box, generate_icosphere};
use oflike_core::mesh::{Mesh, PrimitiveTopology, Vertex2D};
use oflike_core::{Color, Material};
use oflike_graphics::{
    BlendMode, Draw2D, Draw3D, DrawCommand, DrawList, DrawRange, DummyBackend, LightSet, Renderer,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn push_rect(list: &mut DrawList, x: f32, y: f32, color: Color) {
    let corners = [(x, y), (x + 4.0, y), (x + 4.0, y + 4.0), (x, y), (x + 4.0, y + 4.0), (x, y + 4.0)];
    let vertices: Vec<Vertex2D> = corners
        .iter()
        .map(|&(px, py)| Vertex2D::new(px, py, color))
        .collect();
    let first = list.extend_vertices_2d(&vertices);
    list.add_command(DrawCommand::Draw2D(Draw2D {
        range: DrawRange::vertices(first, 6),
        topology: PrimitiveTopology::Triangles,
        blend: BlendMode::Alpha,
        texture: None,
        transform: Affine2::IDENTITY,
    }))
    .unwrap();
}

fn push_mesh(list: &mut DrawList, mesh: &Mesh, material: Material) {
    let (topology, local) = mesh.to_list_indices();
    let first = list.extend_vertices_3d(mesh.vertices());
    let index = list.extend_indices(&local, first);
    let material = list.intern_material(material);
    list.add_command(DrawCommand::Draw3D(Draw3D {
        range: DrawRange::indexed(first, mesh.vertex_count() as u32, index, local.len() as u32),
        topology,
        blend: BlendMode::Opaque,
        texture: None,
        material,
        light_set: LightSet::NONE,
        model: Mat4::identity(),
        depth_test: true,
    }))
    .unwrap();
}

fn rect_list(count: usize) -> DrawList {
    let mut list = DrawList::new();
    for i in 0..count {
        push_rect(&mut list, (i % 100) as f32 * 5.0, (i / 100) as f32 * 5.0, Color::WHITE);
    }
    list
}

/// Meshes alternating between a handful of materials so sorting has work to do.
fn mixed_mesh_list(count: usize) -> DrawList {
    let cube = generate_box(1.0, 1.0, 1.0, [1, 1, 1]);
    let sphere = generate_icosphere(0.5, 1);
    let materials = [
        Material::default(),
        Material::default().with_shininess(8.0),
        Material::default().with_shininess(32.0),
    ];
    let mut list = DrawList::new();
    for i in 0..count {
        let mesh = if i % 2 == 0 { &cube } else { &sphere };
        push_mesh(&mut list, mesh, materials[i % materials.len()]);
    }
    list
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

fn bench_optimize_rects(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize_rects");
    for count in [100usize, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_with_setup(
                || rect_list(count),
                |mut list| {
                    list.optimize();
                    black_box(list.command_count())
                },
            );
        });
    }
    group.finish();
}

fn bench_sort_and_optimize_meshes(c: &mut Criterion) {
    c.bench_function("sort_optimize_meshes_300", |b| {
        b.iter_with_setup(
            || mixed_mesh_list(300),
            |mut list| {
                list.sort_commands();
                list.optimize();
                black_box(list.command_count())
            },
        );
    });
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

fn bench_render_dummy(c: &mut Criterion) {
    let mut renderer = Renderer::default();
    let mut backend = DummyBackend::new();

    c.bench_function("render_dummy_1000_rects_unoptimized", |b| {
        b.iter_with_setup(
            || rect_list(1000),
            |mut list| {
                let stats = renderer.render(&mut list, &mut backend).unwrap();
                backend.take_calls();
                black_box(stats)
            },
        );
    });

    c.bench_function("render_dummy_300_meshes_sorted", |b| {
        b.iter_with_setup(
            || {
                let mut list = mixed_mesh_list(300);
                list.sort_commands();
                list.optimize();
                list
            },
            |mut list| {
                let stats = renderer.render(&mut list, &mut backend).unwrap();
                backend.take_calls();
                black_box(stats)
            },
        );
    });
}

criterion_group!(
    benches,
    bench_optimize_rects,
    bench_sort_and_optimize_meshes,
    bench_render_dummy,
);
criterion_main!(benches);
