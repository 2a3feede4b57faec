//! Shared output helpers for the example binaries.
use glam::Vec4;
use image::{ImageBuffer, Rgba};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vol_march::prelude::RenderTarget;

/// Installs a formatted tracing subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Fills a target with a dark checkerboard so transparency stays visible.
pub fn checkerboard_backdrop(target: &mut RenderTarget, cell: usize) {
    let width = target.width();
    for (i, pixel) in target.pixels_mut().iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        let dark = ((x / cell) + (y / cell)) % 2 == 0;
        let shade = if dark { 0.08 } else { 0.14 };
        *pixel = Vec4::new(shade, shade, shade, 1.0);
    }
}

/// Writes a render target as an 8-bit PNG.
pub fn save_target_png(target: &RenderTarget, path: &str) -> anyhow::Result<()> {
    let rgba = target.to_rgba8();
    let image: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(target.width() as u32, target.height() as u32, rgba)
            .ok_or_else(|| anyhow::anyhow!("render target did not fill an image buffer"))?;
    image.save(path)?;
    println!("wrote {path}");
    Ok(())
}
