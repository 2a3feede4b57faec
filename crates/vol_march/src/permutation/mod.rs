//! Feature-flag permutations of the renderer.
//!
//! A [`RenderOptions`] record of boolean flags plus a step count selects one
//! permutation of the ray integrator. Building a [`Permutation`] validates
//! the flags, derives the enabled code paths, and derives the set of state
//! variables the permutation binds ([`StateKey`]); numeric per-frame state is
//! deliberately not part of the permutation and never forces a rebuild.
pub mod builder;
pub mod cache;
pub mod options;

pub use builder::{Bindings, Permutation, PermutationBuilder, SamplerKind, StateKey};
pub use cache::PermutationCache;
pub use options::{AccumulationMode, ExtinctionModel, LightingKind, OutputMode, RenderOptions};
