//! Formula-backed field sampling, no voxel storage involved.
use glam::Vec3;
use mint::Vector3;

use crate::field::FieldSampler;

/// Wraps a scalar formula over `(position, time)` as a [`FieldSampler`].
///
/// Positions are in the volume's local space, the same space the atlas
/// strategy reads, so the two stay interchangeable.
pub struct ProceduralSampler<F> {
    formula: F,
}

impl<F> ProceduralSampler<F>
where
    F: Fn(Vec3, f32) -> f32 + Send + Sync,
{
    pub fn new(formula: F) -> Self {
        Self { formula }
    }
}

impl<F> FieldSampler for ProceduralSampler<F>
where
    F: Fn(Vec3, f32) -> f32 + Send + Sync,
{
    fn sample(&self, position: Vector3<f32>, time: f32) -> f32 {
        (self.formula)(position.into(), time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_receives_position_and_time() {
        let sampler = ProceduralSampler::new(|p: Vec3, t: f32| p.x + p.y * 10.0 + t * 100.0);
        let v = sampler.sample(Vec3::new(1.0, 2.0, 0.0).into(), 3.0);
        assert_eq!(v, 321.0);
    }
}
