//! Owned texel storage for a packed volume atlas.
//!
//! The renderer exclusively owns the flat half-precision buffer; it is
//! mutated only through the bulk resample path and replaced wholesale when
//! the resolution or time count changes.
use glam::{UVec3, Vec3};
use half::f16;

use crate::atlas::AtlasLayout;
use crate::error::{Error, Result};

/// Block-packed half-precision scalar field, `time_count` volumes in one grid.
#[derive(Clone, Debug)]
pub struct FieldAtlas {
    layout: AtlasLayout,
    origin: Vec3,
    voxel_size: Vec3,
    data: Vec<f16>,
}

impl FieldAtlas {
    /// Allocates an atlas for `time_count` volumes of `per_volume` voxels,
    /// zero-filled. `origin` and `voxel_size` place voxel `(0,0,0)` of every
    /// volume at `origin` in local space, grid-point aligned.
    pub fn pack(
        per_volume: UVec3,
        origin: Vec3,
        voxel_size: Vec3,
        time_count: u32,
    ) -> Result<Self> {
        if voxel_size.x <= 0.0 || voxel_size.y <= 0.0 || voxel_size.z <= 0.0 {
            return Err(Error::InvalidConfig(
                "voxel_size must be > 0 in every axis".into(),
            ));
        }

        let layout = AtlasLayout::new(per_volume, time_count)?;
        let data = vec![f16::ZERO; layout.texel_count()];
        Ok(Self {
            layout,
            origin,
            voxel_size,
            data,
        })
    }

    /// Packing layout of this atlas.
    #[inline]
    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    /// Local-space position of voxel `(0,0,0)`.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Local-space spacing between voxel grid points.
    #[inline]
    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    /// Local-space extent spanned by one volume's voxel grid. Zero in an
    /// axis with a single grid point.
    pub fn volume_size(&self) -> Vec3 {
        (self.layout.per_volume() - UVec3::ONE).as_vec3() * self.voxel_size
    }

    /// Local-space position of a voxel grid point.
    #[inline]
    pub fn voxel_position(&self, voxel: UVec3) -> Vec3 {
        self.origin + voxel.as_vec3() * self.voxel_size
    }

    /// Value at a texel, or `0.0` outside the atlas.
    pub fn get(&self, texel: UVec3) -> f32 {
        let dims = self.layout.texel_dims();
        if texel.x >= dims.x || texel.y >= dims.y || texel.z >= dims.z {
            return 0.0;
        }
        self.data[self.layout.texel_index(texel)].to_f32()
    }

    pub(crate) fn set(&mut self, texel: UVec3, value: f16) {
        let index = self.layout.texel_index(texel);
        self.data[index] = value;
    }

    pub(crate) fn texels(&self) -> &[f16] {
        &self.data
    }

    /// Trilinear lookup inside the block of time index `t`.
    ///
    /// `voxel_pos` is in voxel units relative to the block's own grid; it is
    /// clamped to the block interior so neighboring blocks never bleed in.
    pub fn sample_block(&self, t: u32, voxel_pos: Vec3) -> f32 {
        let res = self.layout.per_volume();
        let max = (res - UVec3::ONE).as_vec3();
        let p = voxel_pos.clamp(Vec3::ZERO, max);

        let c0 = p.floor();
        let frac = p - c0;
        let c0 = c0.as_uvec3();
        let c1 = (c0 + UVec3::ONE).min(res - UVec3::ONE);

        let base = self.layout.block_texel_origin(t);
        let fetch = |x: u32, y: u32, z: u32| -> f32 {
            self.data[self.layout.texel_index(base + UVec3::new(x, y, z))].to_f32()
        };

        let v000 = fetch(c0.x, c0.y, c0.z);
        let v100 = fetch(c1.x, c0.y, c0.z);
        let v010 = fetch(c0.x, c1.y, c0.z);
        let v110 = fetch(c1.x, c1.y, c0.z);
        let v001 = fetch(c0.x, c0.y, c1.z);
        let v101 = fetch(c1.x, c0.y, c1.z);
        let v011 = fetch(c0.x, c1.y, c1.z);
        let v111 = fetch(c1.x, c1.y, c1.z);

        let v00 = v000 + (v100 - v000) * frac.x;
        let v10 = v010 + (v110 - v010) * frac.x;
        let v01 = v001 + (v101 - v001) * frac.x;
        let v11 = v011 + (v111 - v011) * frac.x;
        let v0 = v00 + (v10 - v00) * frac.y;
        let v1 = v01 + (v11 - v01) * frac.y;
        v0 + (v1 - v0) * frac.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(per_volume: UVec3, time_count: u32, f: impl Fn(UVec3, u32) -> f32) -> FieldAtlas {
        let mut atlas =
            FieldAtlas::pack(per_volume, Vec3::ZERO, Vec3::ONE, time_count).unwrap();
        for t in 0..time_count {
            let base = atlas.layout().block_texel_origin(t);
            for z in 0..per_volume.z {
                for y in 0..per_volume.y {
                    for x in 0..per_volume.x {
                        let local = UVec3::new(x, y, z);
                        atlas.set(base + local, f16::from_f32(f(local, t)));
                    }
                }
            }
        }
        atlas
    }

    #[test]
    fn pack_zero_fills_full_grid() {
        let atlas = FieldAtlas::pack(UVec3::new(4, 4, 4), Vec3::ZERO, Vec3::ONE, 9).unwrap();
        // 9 volumes need a 3x3x1 block grid.
        assert_eq!(atlas.layout().texel_dims(), UVec3::new(12, 12, 4));
        assert_eq!(atlas.texels().len(), 12 * 12 * 4);
        assert!(atlas.texels().iter().all(|v| v.to_f32() == 0.0));
    }

    #[test]
    fn pack_rejects_non_positive_voxel_size() {
        assert!(FieldAtlas::pack(UVec3::ONE, Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), 1).is_err());
    }

    #[test]
    fn get_returns_zero_outside_atlas() {
        let atlas = FieldAtlas::pack(UVec3::new(2, 2, 2), Vec3::ZERO, Vec3::ONE, 1).unwrap();
        assert_eq!(atlas.get(UVec3::new(5, 0, 0)), 0.0);
    }

    #[test]
    fn sample_block_interpolates_between_grid_points() {
        let atlas = filled(UVec3::new(2, 1, 1), 1, |v, _| v.x as f32);
        let mid = atlas.sample_block(0, Vec3::new(0.5, 0.0, 0.0));
        assert!((mid - 0.5).abs() < 1e-3);
    }

    #[test]
    fn sample_block_clamps_to_block_interior() {
        // Two blocks along X with very different contents; sampling past the
        // edge of block 0 must not read block 1.
        let atlas = filled(UVec3::new(2, 1, 1), 2, |_, t| if t == 0 { 1.0 } else { 9.0 });
        let past_edge = atlas.sample_block(0, Vec3::new(10.0, 0.0, 0.0));
        assert!((past_edge - 1.0).abs() < 1e-3);
    }

    #[test]
    fn voxel_position_is_grid_point_aligned() {
        let atlas =
            FieldAtlas::pack(UVec3::new(3, 3, 3), Vec3::splat(-1.0), Vec3::splat(0.5), 1).unwrap();
        assert_eq!(atlas.voxel_position(UVec3::ZERO), Vec3::splat(-1.0));
        assert_eq!(atlas.voxel_position(UVec3::new(2, 0, 0)), Vec3::new(0.0, -1.0, -1.0));
    }
}
