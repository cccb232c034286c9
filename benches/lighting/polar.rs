use criterion::{black_box, criterion_group, Criterion};
use polar_shadows::lighting::occlusion::OcclusionMap;
use polar_shadows::lighting::polar::PolarTransform;

fn bench_polar_transform(c: &mut Criterion) {
    let (scene, config) = super::demo();
    let occlusion = OcclusionMap::rasterize(&scene, &config);
    let transform = PolarTransform::new(&config).unwrap();
    c.bench_function("polar_transform", |b| {
        b.iter(|| transform.build(black_box(&occlusion)))
    });
}

criterion_group!(benches, bench_polar_transform);
