use glam::{DVec3, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vol_march::prelude::*;
use vol_march_examples::{checkerboard_backdrop, init_tracing, save_target_png};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let renderer = VolumeRenderer::builder()
        .options(RenderOptions::default())
        .with_procedural(ProceduralSampler::new(|p: Vec3, _| {
            // Soft falloff toward the edge of a fuzzy ball.
            (1.0 - p.length() * 1.6).max(0.0)
        }))
        .with_palette(ColorRamp::atmosphere())
        .build()?;

    let camera = CameraFrame::look_at(
        DVec3::new(1.6, 1.2, 2.4),
        DVec3::ZERO,
        DVec3::Y,
        55f64.to_radians(),
        1.0,
        0.1,
        100.0,
    );

    let mut frame = FrameParams {
        volume_origin: Vec3::splat(-1.0),
        volume_size: Vec3::splat(2.0),
        min_cutoff_value: 0.02,
        max_cutoff_value: 1.2,
        cutoff_fade_range: 0.05,
        extinction_coefficient: 3.0,
        ..FrameParams::default()
    };
    let mut rng = StdRng::seed_from_u64(42);
    frame.advance(0.0, &mut rng);

    let mut target = RenderTarget::new(512, 512);
    checkerboard_backdrop(&mut target, 32);
    let stats = renderer.render(&camera, &frame, None, &mut target);
    println!("{} of {} rays hit the volume", stats.shaded, stats.rays);

    save_target_png(&target, "sphere-blend-basic.png")
}
