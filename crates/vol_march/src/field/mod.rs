//! Scalar-field sampler strategies.
//!
//! The ray integrator reads the medium through one trait, [`FieldSampler`];
//! the two strategies behind it are atlas interpolation ([`AtlasSampler`])
//! and an injected formula ([`ProceduralSampler`]). The strategy is chosen
//! once per renderer build and never changes the integrator's call contract.
use mint::Vector3;

pub mod atlas_sampler;
pub mod procedural;

pub use atlas_sampler::AtlasSampler;
pub use procedural::ProceduralSampler;

/// A scalar field over local-space position and time.
pub trait FieldSampler: Send + Sync {
    fn sample(&self, position: Vector3<f32>, time: f32) -> f32;
}

impl<S: FieldSampler + ?Sized> FieldSampler for Box<S> {
    fn sample(&self, position: Vector3<f32>, time: f32) -> f32 {
        (**self).sample(position, time)
    }
}
