use criterion::{black_box, criterion_group, Criterion};
use polar_shadows::lighting::occlusion::{render_world, OcclusionMap};

fn bench_rasterize(c: &mut Criterion) {
    let (scene, config) = super::demo();
    c.bench_function("rasterize_occlusion", |b| {
        b.iter(|| OcclusionMap::rasterize(black_box(&scene), black_box(&config)))
    });
}

fn bench_render_world(c: &mut Criterion) {
    let (scene, config) = super::demo();
    c.bench_function("render_world", |b| {
        b.iter(|| render_world(black_box(&scene), black_box(&config)))
    });
}

criterion_group!(benches, bench_rasterize, bench_render_world);
