//! Per-frame camera feed: far-plane ray reconstruction and depth
//! linearization.
//!
//! The host computes projection itself and hands over the four far-plane
//! world corners in double precision; rays are reconstructed here by
//! bilinear interpolation, which sidesteps the precision loss of inverting
//! a projection matrix at far-plane distances.
use glam::{DVec3, Mat4, Vec3};

/// Camera state for one frame, supplied by the host.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    /// World-space eye position.
    pub eye: DVec3,
    /// Far-plane world corners: bottom-left, bottom-right, top-left,
    /// top-right.
    pub far_corners: [DVec3; 4],
    /// Near clip distance, used for depth linearization.
    pub near: f32,
    /// Far clip distance, used for depth linearization.
    pub far: f32,
    /// World-to-view matrix, used for normal and light transforms.
    pub view: Mat4,
}

impl CameraFrame {
    /// Builds a frame for a perspective camera looking at `target`.
    ///
    /// `fov_y` is the vertical field of view in radians. This is a
    /// convenience for hosts (and tests) without their own projection code;
    /// engines that already track frusta should fill the struct directly.
    pub fn look_at(
        eye: DVec3,
        target: DVec3,
        up: DVec3,
        fov_y: f64,
        aspect: f64,
        near: f32,
        far: f32,
    ) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let true_up = right.cross(forward);

        let half_h = (fov_y * 0.5).tan() * far as f64;
        let half_w = half_h * aspect;
        let center = eye + forward * far as f64;

        Self {
            eye,
            far_corners: [
                center - right * half_w - true_up * half_h,
                center + right * half_w - true_up * half_h,
                center - right * half_w + true_up * half_h,
                center + right * half_w + true_up * half_h,
            ],
            near,
            far,
            view: Mat4::look_at_rh(eye.as_vec3(), target.as_vec3(), up.as_vec3()),
        }
    }

    /// World-space ray direction through the viewport point `(u, v)`,
    /// `u` left to right and `v` bottom to top, both in `[0, 1]`.
    ///
    /// Interpolation runs in double precision; only the normalized
    /// direction is narrowed to `f32`.
    pub fn ray_direction(&self, u: f32, v: f32) -> Vec3 {
        let u = u as f64;
        let v = v as f64;
        let bottom = self.far_corners[0].lerp(self.far_corners[1], u);
        let top = self.far_corners[2].lerp(self.far_corners[3], u);
        let far_point = bottom.lerp(top, v);
        (far_point - self.eye).normalize().as_vec3()
    }
}

/// Borrowed external depth buffer, one normalized device depth per pixel.
#[derive(Clone, Copy, Debug)]
pub struct DepthAttachment<'a> {
    pub samples: &'a [f32],
    pub width: usize,
    pub height: usize,
}

impl DepthAttachment<'_> {
    /// Depth at a pixel; out-of-bounds reads return the far plane (`1.0`).
    pub fn at(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 1.0;
        }
        self.samples[y * self.width + x]
    }
}

/// Eye-space distance for a normalized device depth value in `[0, 1]`.
#[inline]
pub fn linearize_depth(z: f32, near: f32, far: f32) -> f32 {
    -(near * far) / ((far - near) * z - far)
}
