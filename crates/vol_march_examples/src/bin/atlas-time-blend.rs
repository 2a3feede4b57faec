use glam::{DVec3, UVec3, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vol_march::prelude::*;
use vol_march_examples::{checkerboard_backdrop, init_tracing, save_target_png};

const RESOLUTION: u32 = 33;
const TIME_COUNT: u32 = 8;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A ball that drifts along X over the time series; reads between
    // blocks interpolate the motion.
    let mut atlas = FieldAtlas::pack(
        UVec3::splat(RESOLUTION),
        Vec3::splat(-1.0),
        Vec3::splat(2.0 / (RESOLUTION - 1) as f32),
        TIME_COUNT,
    )?;
    let range = atlas.resample(
        &|_: mint::Vector3<u32>, p: mint::Vector3<f32>, t: u32| {
            let phase = t as f32 / TIME_COUNT as f32 * std::f32::consts::TAU;
            let center = Vec3::new(phase.cos() * 0.4, 0.0, phase.sin() * 0.4);
            (1.0 - (Vec3::from(p) - center).length() * 2.5).max(0.0)
        },
        0,
        None,
    )?;
    println!("atlas values span [{:.3}, {:.3}]", range.min, range.max);

    let renderer = VolumeRenderer::builder()
        .options(RenderOptions::default())
        .with_atlas(atlas)
        .with_palette(ColorRamp::viridis())
        .build()?;

    let camera = CameraFrame::look_at(
        DVec3::new(0.0, 1.8, 2.6),
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
        extinction_coefficient: 4.0,
        ..FrameParams::default()
    };

    let mut rng = StdRng::seed_from_u64(7);
    for i in 0..3 {
        frame.advance(if i == 0 { 0.0 } else { TIME_COUNT as f32 / 3.0 }, &mut rng);
        let mut target = RenderTarget::new(384, 384);
        checkerboard_backdrop(&mut target, 24);
        renderer.render(&camera, &frame, None, &mut target);
        save_target_png(&target, &format!("atlas-time-blend-{i}.png"))?;
    }

    Ok(())
}
