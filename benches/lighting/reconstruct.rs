use criterion::{black_box, criterion_group, Criterion};
use polar_shadows::lighting::occlusion::OcclusionMap;
use polar_shadows::lighting::polar::PolarTransform;
use polar_shadows::lighting::reconstruct::ShadowReconstructor;

fn bench_reconstruct(c: &mut Criterion) {
    let (scene, config) = super::demo();
    let occlusion = OcclusionMap::rasterize(&scene, &config);
    let polar = PolarTransform::new(&config).unwrap().build(&occlusion);
    let reconstructor = ShadowReconstructor::new(&config).unwrap();
    c.bench_function("reconstruct_shadows", |b| {
        b.iter(|| reconstructor.render(black_box(&polar), config.canvas_size))
    });
}

criterion_group!(benches, bench_reconstruct);
