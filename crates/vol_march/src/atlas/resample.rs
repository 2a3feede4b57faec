//! Bulk resampling of atlas contents from a host-provided voxel source.
//!
//! The whole requested time range is staged before anything is written, so a
//! failing source never leaves a half-written atlas behind.
use glam::UVec3;
use half::f16;
use mint::Vector3;
use tracing::info;

use crate::atlas::FieldAtlas;
use crate::error::{Error, Result};

/// Host callback producing one scalar per voxel during [`FieldAtlas::resample`].
///
/// Implementors receive the voxel indices inside the volume, the grid point's
/// local-space position, and the time index of the volume being filled.
pub trait VoxelSource: Send + Sync {
    fn sample(&self, voxel: Vector3<u32>, position: Vector3<f32>, time_index: u32) -> f32;
}

impl<F> VoxelSource for F
where
    F: Fn(Vector3<u32>, Vector3<f32>, u32) -> f32 + Send + Sync,
{
    fn sample(&self, voxel: Vector3<u32>, position: Vector3<f32>, time_index: u32) -> f32 {
        self(voxel, position, time_index)
    }
}

/// Observed value bounds of a resample pass, after half-precision rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Empty range; any observed value replaces both bounds.
    pub fn empty() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    /// Widens the range to include `value`.
    #[inline]
    pub fn observe(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl FieldAtlas {
    /// Fills volumes `[time_offset, time_offset + time_count)` from `source`
    /// and returns the observed value bounds of the stored (half-precision)
    /// texels. `time_count = None` fills every volume from `time_offset` on.
    ///
    /// A non-finite source value aborts the call with an error before any
    /// texel is written; the atlas keeps its previous contents.
    pub fn resample(
        &mut self,
        source: &dyn VoxelSource,
        time_offset: u32,
        time_count: Option<u32>,
    ) -> Result<ValueRange> {
        let total = self.layout().time_count();
        let count = time_count.unwrap_or(total.saturating_sub(time_offset));
        let end = time_offset.saturating_add(count);
        if end > total {
            return Err(Error::AtlasCapacity {
                capacity: total,
                requested: end,
            });
        }

        let res = self.layout().per_volume();
        let per_block = res.x as usize * res.y as usize * res.z as usize;
        let mut staged: Vec<f16> = Vec::with_capacity(per_block * count as usize);
        let mut range = ValueRange::empty();

        for t in time_offset..end {
            for z in 0..res.z {
                for y in 0..res.y {
                    for x in 0..res.x {
                        let voxel = UVec3::new(x, y, z);
                        let position = self.voxel_position(voxel);
                        let value = source.sample(voxel.into(), position.into(), t);
                        if !value.is_finite() {
                            return Err(Error::Resample(format!(
                                "source produced non-finite value {value} at voxel \
                                 ({x}, {y}, {z}), time index {t}"
                            )));
                        }
                        let texel = f16::from_f32(value);
                        range.observe(texel.to_f32());
                        staged.push(texel);
                    }
                }
            }
        }

        let mut cursor = staged.into_iter();
        for t in time_offset..end {
            let base = self.layout().block_texel_origin(t);
            for z in 0..res.z {
                for y in 0..res.y {
                    for x in 0..res.x {
                        if let Some(texel) = cursor.next() {
                            self.set(base + UVec3::new(x, y, z), texel);
                        }
                    }
                }
            }
        }

        info!(
            "Resampled {} volume(s) at offset {} ({} texels).",
            count,
            time_offset,
            per_block * count as usize
        );
        Ok(range)
    }
}
