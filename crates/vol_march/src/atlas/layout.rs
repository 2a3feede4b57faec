//! Grid arithmetic for block-packed volume atlases.
//!
//! An atlas stores `time_count` volumes of identical resolution as sub-blocks
//! of one 3D grid. The block grid is chosen close to a cube so the packed
//! texture stays compact in every axis.
use glam::UVec3;

use crate::error::{Error, Result};

/// Describes how `time_count` volumes of resolution `per_volume` are packed
/// into one 3D grid of blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    per_volume: UVec3,
    grid: UVec3,
    time_count: u32,
}

impl AtlasLayout {
    /// Creates a layout for `time_count` volumes of `per_volume` voxels each.
    ///
    /// The block grid satisfies `grid.x * grid.y * grid.z >= time_count`,
    /// with `grid.x == grid.y == ceil(time_count^(1/3))` and the Z dimension
    /// trimmed to the minimum number of layers actually needed.
    pub fn new(per_volume: UVec3, time_count: u32) -> Result<Self> {
        if per_volume.x == 0 || per_volume.y == 0 || per_volume.z == 0 {
            return Err(Error::InvalidConfig(
                "per-volume resolution must be at least 1 in every axis".into(),
            ));
        }
        if time_count == 0 {
            return Err(Error::InvalidConfig("time_count must be at least 1".into()));
        }

        let grid = grid_for_time_count(time_count);
        Ok(Self {
            per_volume,
            grid,
            time_count,
        })
    }

    /// Resolution of one packed volume in voxels.
    #[inline]
    pub fn per_volume(&self) -> UVec3 {
        self.per_volume
    }

    /// Block-grid dimensions `(nx, ny, nz)`.
    #[inline]
    pub fn grid(&self) -> UVec3 {
        self.grid
    }

    /// Number of logical volumes stored in the atlas.
    #[inline]
    pub fn time_count(&self) -> u32 {
        self.time_count
    }

    /// Number of blocks the grid can hold. Always `>= time_count`.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.grid.x * self.grid.y * self.grid.z
    }

    /// Full atlas dimensions in texels.
    #[inline]
    pub fn texel_dims(&self) -> UVec3 {
        self.per_volume * self.grid
    }

    /// Total texel count of the atlas buffer.
    pub fn texel_count(&self) -> usize {
        let d = self.texel_dims();
        d.x as usize * d.y as usize * d.z as usize
    }

    /// Block coordinates for time index `t`, wrapped modulo `time_count` so
    /// an out-of-range index can never address a block outside the grid.
    pub fn block_coords(&self, t: u32) -> UVec3 {
        let t = t % self.time_count;
        UVec3::new(
            t % self.grid.x,
            (t / self.grid.x) % self.grid.y,
            t / (self.grid.x * self.grid.y),
        )
    }

    /// Texel origin of the block holding time index `t`.
    #[inline]
    pub fn block_texel_origin(&self, t: u32) -> UVec3 {
        self.block_coords(t) * self.per_volume
    }

    /// Flat buffer index of a texel, X fastest.
    #[inline]
    pub fn texel_index(&self, texel: UVec3) -> usize {
        let d = self.texel_dims();
        (texel.z as usize * d.y as usize + texel.y as usize) * d.x as usize + texel.x as usize
    }
}

/// Smallest near-cubic block grid holding `time_count` blocks:
/// `nx = ny = ceil(time_count^(1/3))`, `nz = ceil(time_count / (nx * ny))`.
fn grid_for_time_count(time_count: u32) -> UVec3 {
    // Integer search avoids cbrt() rounding surprises at perfect cubes.
    let mut n = 1u32;
    while (n as u64).pow(3) < time_count as u64 {
        n += 1;
    }
    let nz = time_count.div_ceil(n * n);
    UVec3::new(n, n, nz)
}
