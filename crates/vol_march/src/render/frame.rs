//! Per-frame numeric state mutated by the host between frames.
//!
//! Everything in here may change every frame without rebuilding the active
//! permutation. The fields are plain and documented; an external property
//! editor can write them directly.
use glam::{Mat4, Quat, Vec3};
use rand::rand_core::RngCore;

use crate::render::rand01;

/// Placement of the volume's local cuboid in world space.
#[derive(Clone, Copy, Debug)]
pub struct VolumeTransform {
    /// Local-to-world model matrix.
    pub matrix: Mat4,
    /// World-to-local inverse, kept alongside so rays transform without a
    /// per-frame inversion.
    pub inverse: Mat4,
}

impl VolumeTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        }
    }

    /// Recomputes the transform from an entity pose.
    pub fn from_pose(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let matrix = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }
}

impl Default for VolumeTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Numeric render state for one frame.
#[derive(Clone, Debug)]
pub struct FrameParams {
    /// Scale applied to raw field samples.
    pub value_multiplier: f32,
    /// Offset applied to raw field samples after scaling.
    pub value_added: f32,
    /// Lower bound of the visible value band.
    pub min_cutoff_value: f32,
    /// Upper bound of the visible value band.
    pub max_cutoff_value: f32,
    /// Width of the smooth fade at each cutoff boundary; zero disables it.
    pub cutoff_fade_range: f32,
    /// Value mapped to the low end of the palette.
    pub min_palette_value: f32,
    /// Value mapped to the high end of the palette.
    pub max_palette_value: f32,
    /// Scale applied to every per-step alpha.
    pub alpha_multiplier: f32,
    /// Fixed extinction coefficient.
    pub extinction_coefficient: f32,
    /// Scale applied to whichever extinction coefficient is active.
    pub extinction_multiplier: f32,
    /// Finite-difference step for gradient normal estimation, in local
    /// units.
    pub normal_epsilon: f32,
    /// Field time; fractional values blend neighboring atlas blocks.
    pub time: f32,
    /// Per-frame random in `[0, 1)` seeding the ray start jitter.
    pub random: f32,
    /// Lower clip corner in local space, intersected with the volume
    /// extent.
    pub clip_min: Vec3,
    /// Upper clip corner in local space.
    pub clip_max: Vec3,
    /// Lower corner of the volume cuboid in local space.
    pub volume_origin: Vec3,
    /// Edge lengths of the volume cuboid.
    pub volume_size: Vec3,
    /// Placement of the cuboid in world space.
    pub transform: VolumeTransform,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            value_multiplier: 1.0,
            value_added: 0.0,
            min_cutoff_value: 0.0,
            max_cutoff_value: 1.0,
            cutoff_fade_range: 0.0,
            min_palette_value: 0.0,
            max_palette_value: 1.0,
            alpha_multiplier: 1.0,
            extinction_coefficient: 1.0,
            extinction_multiplier: 1.0,
            normal_epsilon: 0.01,
            time: 0.0,
            random: 0.0,
            clip_min: Vec3::splat(f32::NEG_INFINITY),
            clip_max: Vec3::splat(f32::INFINITY),
            volume_origin: Vec3::splat(-0.5),
            volume_size: Vec3::ONE,
            transform: VolumeTransform::identity(),
        }
    }
}

impl FrameParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances field time and redraws the per-frame random, which keeps the
    /// start jitter changing every frame.
    pub fn advance(&mut self, dt: f32, rng: &mut dyn RngCore) {
        self.time += dt;
        self.random = rand01(rng);
    }
}
