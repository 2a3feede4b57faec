use glam::{DVec3, Vec3};
use vol_march::prelude::*;
use vol_march_examples::{init_tracing, save_target_png};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A bumpy ball; the normal view makes the surface detail readable
    // without any lighting setup.
    let renderer = VolumeRenderer::builder()
        .options(
            RenderOptions::default()
                .with_random_start(false)
                .with_normal_output(true),
        )
        .with_procedural(ProceduralSampler::new(|p: Vec3, _| {
            let ripple = (p.x * 9.0).sin() * (p.y * 9.0).sin() * (p.z * 9.0).sin() * 0.06;
            if p.length() + ripple < 0.55 {
                1.0
            } else {
                0.0
            }
        }))
        .build()?;

    let camera = CameraFrame::look_at(
        DVec3::new(1.4, 1.0, 2.2),
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
        min_cutoff_value: 0.5,
        max_cutoff_value: 1.0,
        normal_epsilon: 0.02,
        ..FrameParams::default()
    };

    let mut target = RenderTarget::new(512, 512);
    renderer.render(&camera, &frame, None, &mut target);
    save_target_png(&target, "normals-debug.png")
}
