//! Atlas-backed field sampling with time interpolation.
use glam::Vec3;
use mint::Vector3;

use crate::atlas::FieldAtlas;
use crate::field::FieldSampler;

/// Trilinear atlas lookup blended between the two nearest time blocks.
///
/// The fractional `time` selects blocks `floor(time) % time_count` and the
/// following one (wrapping), blended by `fract(time)`; the wrap happens here,
/// at read time, so any time value addresses a valid block.
pub struct AtlasSampler<'a> {
    atlas: &'a FieldAtlas,
}

impl<'a> AtlasSampler<'a> {
    pub fn new(atlas: &'a FieldAtlas) -> Self {
        Self { atlas }
    }
}

impl FieldSampler for AtlasSampler<'_> {
    fn sample(&self, position: Vector3<f32>, time: f32) -> f32 {
        let p = Vec3::from(position);
        let time_count = self.atlas.layout().time_count();

        let whole = time.floor();
        let blend = time - whole;
        let index0 = (whole as i64).rem_euclid(time_count as i64) as u32;
        let index1 = (index0 + 1) % time_count;

        let voxel_pos = (p - self.atlas.origin()) / self.atlas.voxel_size();
        let v0 = self.atlas.sample_block(index0, voxel_pos);
        if blend <= 0.0 || index1 == index0 {
            return v0;
        }
        let v1 = self.atlas.sample_block(index1, voxel_pos);
        v0 + (v1 - v0) * blend
    }
}
