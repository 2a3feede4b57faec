#![forbid(unsafe_code)]
//! vol_march: volumetric ray marching of time-varying scalar fields.
//!
//! Modules:
//! - atlas: block-packed half-precision voxel storage for volume time series
//! - field: pluggable scalar-field samplers (atlas interpolation or procedural)
//! - permutation: feature-flag permutations and required-state derivation
//! - render: per-pixel ray integration, palettes, lights, and the camera feed
//!
//! The library renders one frame at a time: build a [`render::VolumeRenderer`]
//! once per feature-flag combination, then call `render` with the per-frame
//! camera feed and numeric state.
pub mod atlas;
pub mod error;
pub mod field;
pub mod permutation;
pub mod render;

/// Convenient re-exports for common types. Import with `use vol_march::prelude::*;`.
pub mod prelude {
    pub use crate::atlas::{AtlasLayout, FieldAtlas, ValueRange, VoxelSource};
    pub use crate::error::{Error, Result};
    pub use crate::field::{AtlasSampler, FieldSampler, ProceduralSampler};
    pub use crate::permutation::{
        AccumulationMode, ExtinctionModel, LightingKind, OutputMode, Permutation,
        PermutationBuilder, RenderOptions, SamplerKind, StateKey,
    };
    pub use crate::render::camera::{linearize_depth, CameraFrame, DepthAttachment};
    pub use crate::render::frame::{FrameParams, VolumeTransform};
    pub use crate::render::lights::{DirectionalLight, LightRig, PointLight};
    pub use crate::render::palette::{ColorRamp, Palette};
    pub use crate::render::renderer::{RenderStats, VolumeRenderer, VolumeRendererBuilder};
    pub use crate::render::target::RenderTarget;
}
