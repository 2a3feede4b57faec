//! Light sources shading blend-mode samples.
//!
//! Lights are specified in view space; the integrator brings gradient
//! normals and sample positions into view space before calling in here.
use glam::Vec3;

use crate::render::{smoothstep01, MIN_DENOMINATOR};

/// Point light with inverse-square falloff and a smooth range cutoff.
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    /// View-space position.
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Distance beyond which the light contributes nothing; the fade to
    /// zero starts at three quarters of it.
    pub range: f32,
}

impl PointLight {
    /// Diffuse contribution at a view-space point with a view-space normal.
    pub fn contribution(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let to_light = self.position - point;
        let distance = to_light.length().max(MIN_DENOMINATOR);
        let direction = to_light / distance;

        let diffuse = normal.dot(direction).max(0.0);
        let attenuation = self.intensity / (distance * distance).max(MIN_DENOMINATOR);
        let window = 1.0 - smoothstep01(self.range * 0.75, self.range, distance);
        self.color * (diffuse * attenuation * window)
    }
}

/// Light with a constant direction, no falloff.
#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    /// View-space direction the light travels, from the light toward the
    /// scene.
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Diffuse contribution for a view-space normal.
    pub fn contribution(&self, normal: Vec3) -> Vec3 {
        let toward_light = -self.direction.normalize_or_zero();
        let diffuse = normal.dot(toward_light).max(0.0);
        self.color * (diffuse * self.intensity)
    }
}

/// The set of lights attached to a renderer.
#[derive(Clone, Debug, Default)]
pub struct LightRig {
    pub points: Vec<PointLight>,
    pub directionals: Vec<DirectionalLight>,
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point(mut self, light: PointLight) -> Self {
        self.points.push(light);
        self
    }

    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.directionals.push(light);
        self
    }

    /// Summed diffuse contribution of the enabled light kinds.
    pub fn shade(&self, point: Vec3, normal: Vec3, points: bool, directionals: bool) -> Vec3 {
        let mut total = Vec3::ZERO;
        if points {
            for light in &self.points {
                total += light.contribution(point, normal);
            }
        }
        if directionals {
            for light in &self.directionals {
                total += light.contribution(normal);
            }
        }
        total
    }
}
