mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec3, Vec3};
use vol_march::prelude::*;

const FRAME_SIZES: [usize; 3] = [32, 64, 128];
const STEP_COUNTS: [u32; 3] = [32, 64, 128];

fn sphere_renderer(options: RenderOptions) -> VolumeRenderer {
    VolumeRenderer::builder()
        .options(options)
        .with_procedural(ProceduralSampler::new(|p: Vec3, _| {
            (1.0 - p.length() * 2.0).max(0.0)
        }))
        .with_palette(ColorRamp::atmosphere())
        .build()
        .expect("renderer builds")
}

fn camera() -> CameraFrame {
    CameraFrame::look_at(
        DVec3::new(0.0, 0.0, 3.0),
        DVec3::ZERO,
        DVec3::Y,
        60f64.to_radians(),
        1.0,
        0.1,
        100.0,
    )
}

fn sphere_frame() -> FrameParams {
    FrameParams {
        volume_origin: Vec3::splat(-1.0),
        volume_size: Vec3::splat(2.0),
        min_cutoff_value: 0.05,
        max_cutoff_value: 1.0,
        ..FrameParams::default()
    }
}

fn march_frame_benches(c: &mut Criterion) {
    let renderer = sphere_renderer(RenderOptions::default());
    let camera = camera();
    let frame = sphere_frame();

    let mut group = c.benchmark_group("march/frame");
    for &size in &FRAME_SIZES {
        group.throughput(common::elements_throughput(size * size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut target = RenderTarget::new(size, size);
            b.iter(|| {
                target.clear(glam::Vec4::ZERO);
                let stats = renderer.render(&camera, &frame, None, &mut target);
                black_box(stats.shaded);
            });
        });
    }
    group.finish();
}

fn march_step_count_benches(c: &mut Criterion) {
    let camera = camera();
    let frame = sphere_frame();

    let mut group = c.benchmark_group("march/steps");
    for &steps in &STEP_COUNTS {
        let renderer = sphere_renderer(RenderOptions::default().with_ray_steps(steps));
        group.throughput(common::elements_throughput(64 * 64));
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            let mut target = RenderTarget::new(64, 64);
            b.iter(|| {
                target.clear(glam::Vec4::ZERO);
                let stats = renderer.render(&camera, &frame, None, &mut target);
                black_box(stats.shaded);
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = march_frame_benches, march_step_count_benches
}
criterion_main!(benches);
