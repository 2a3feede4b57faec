use glam::{DVec3, Vec3};
use vol_march::prelude::*;
use vol_march_examples::{checkerboard_backdrop, init_tracing, save_target_png};

const HALF: usize = 320;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let field = |p: Vec3, _: f32| {
        // Two overlapping lobes with different peak values.
        let a = (1.0 - (p - Vec3::new(-0.3, 0.0, 0.0)).length() * 2.2).max(0.0);
        let b = (1.0 - (p - Vec3::new(0.35, 0.1, 0.2)).length() * 2.8).max(0.0) * 0.6;
        a + b
    };

    let blend = VolumeRenderer::builder()
        .options(RenderOptions::default().with_random_start(false))
        .with_procedural(ProceduralSampler::new(field))
        .with_palette(ColorRamp::viridis())
        .build()?;
    let mean = VolumeRenderer::builder()
        .options(
            RenderOptions::default()
                .with_random_start(false)
                .with_mean_value(true),
        )
        .with_procedural(ProceduralSampler::new(field))
        .with_palette(ColorRamp::viridis())
        .build()?;

    let camera = CameraFrame::look_at(
        DVec3::new(0.0, 0.6, 2.8),
        DVec3::ZERO,
        DVec3::Y,
        50f64.to_radians(),
        1.0,
        0.1,
        100.0,
    );
    let frame = FrameParams {
        volume_origin: Vec3::splat(-1.0),
        volume_size: Vec3::splat(2.0),
        min_cutoff_value: 0.02,
        max_cutoff_value: 2.0,
        cutoff_fade_range: 0.05,
        extinction_coefficient: 3.0,
        ..FrameParams::default()
    };

    // Same scene through both accumulation modes, side by side.
    let mut combined = RenderTarget::new(HALF * 2, HALF);
    checkerboard_backdrop(&mut combined, 20);

    for (renderer, offset) in [(&blend, 0), (&mean, HALF)] {
        let mut half = RenderTarget::new(HALF, HALF);
        checkerboard_backdrop(&mut half, 20);
        renderer.render(&camera, &frame, None, &mut half);
        for y in 0..HALF {
            for x in 0..HALF {
                let i = y * HALF * 2 + offset + x;
                combined.pixels_mut()[i] = half.pixel(x, y);
            }
        }
    }

    save_target_png(&combined, "mean-vs-blend.png")
}
