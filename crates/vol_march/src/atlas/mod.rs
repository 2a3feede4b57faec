//! Atlas-packed storage for time-indexed 3D scalar fields.
//!
//! A single flat texel buffer holds `time_count` logical volumes as row-major
//! sub-blocks of one larger grid. This module groups the grid arithmetic
//! ([`AtlasLayout`]), the owned texel storage ([`FieldAtlas`]), and the bulk
//! resample path ([`VoxelSource`]).
pub mod layout;
pub mod resample;
pub mod storage;

pub use layout::AtlasLayout;
pub use resample::{ValueRange, VoxelSource};
pub use storage::FieldAtlas;
