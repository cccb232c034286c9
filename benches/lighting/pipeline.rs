use criterion::{black_box, criterion_group, Criterion};
use polar_shadows::lighting::pipeline::ShadowPipeline;

fn bench_render_frame(c: &mut Criterion) {
    let (scene, config) = super::demo();
    let pipeline = ShadowPipeline::new(config).unwrap();
    c.bench_function("render_frame", |b| {
        b.iter(|| pipeline.render_frame(black_box(&scene)))
    });
}

criterion_group!(benches, bench_render_frame);
