use criterion::{Criterion, black_box, criterion_group, criterion_main};

use oflike_core::mesh::generators::{generate_box, generate_icosphere, generate_sphere};
use oflike_core::mesh::ply::{load_ply, save_ply};

// ---------------------------------------------------------------------------
// Mesh generation
// ---------------------------------------------------------------------------

fn bench_generate_sphere_low(c: &mut Criterion) {
    c.bench_function("generate_sphere_8x16", |b| {
        b.iter(|| generate_sphere(black_box(1.0), black_box(8), black_box(16)));
    });
}

fn bench_generate_sphere_high(c: &mut Criterion) {
    c.bench_function("generate_sphere_64x128", |b| {
        b.iter(|| generate_sphere(black_box(1.0), black_box(64), black_box(128)));
    });
}

fn bench_generate_icosphere(c: &mut Criterion) {
    c.bench_function("generate_icosphere_4", |b| {
        b.iter(|| generate_icosphere(black_box(1.0), black_box(4)));
    });
}

fn bench_generate_box(c: &mut Criterion) {
    c.bench_function("generate_box_10x10x10", |b| {
        b.iter(|| generate_box(black_box(1.0), 1.0, 1.0, black_box([10, 10, 10])));
    });
}

// ---------------------------------------------------------------------------
// Mesh processing
// ---------------------------------------------------------------------------

fn bench_smooth_normals(c: &mut Criterion) {
    let mesh = generate_icosphere(1.0, 3);
    c.bench_function("smooth_normals_icosphere_3", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            m.smooth_normals();
            black_box(m)
        });
    });
}

fn bench_ply_round_trip(c: &mut Criterion) {
    let mesh = generate_sphere(1.0, 32, 64);
    c.bench_function("ply_round_trip_sphere_32x64", |b| {
        b.iter(|| {
            let mut bytes = Vec::new();
            save_ply(black_box(&mesh), &mut bytes).ok();
            black_box(load_ply(bytes.as_slice()).ok())
        });
    });
}

criterion_group!(
    generators,
    bench_generate_sphere_low,
    bench_generate_sphere_high,
    bench_generate_icosphere,
    bench_generate_box,
);

criterion_group!(processing, bench_smooth_normals, bench_ply_round_trip);

criterion_main!(generators, processing);
