//! Renderer configuration record.
//!
//! Boolean flags and the step count are fixed per permutation; everything
//! numeric lives in [`crate::render::frame::FrameParams`] and may change
//! every frame without a rebuild.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What the integrator writes per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Palette color accumulated along the ray.
    Color,
    /// First in-range gradient normal, remapped for display. Debug mode.
    Normal,
}

/// How in-range samples combine along the ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccumulationMode {
    /// Front-to-back alpha compositing.
    Blend,
    /// Path-length-weighted mean value, resolved to one color at the end.
    Mean,
}

/// Per-step opacity model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtinctionModel {
    /// Constant per-step alpha.
    None,
    /// `1 - exp(-k * step)` with a fixed coefficient `k`.
    Fixed,
    /// `1 - exp(-v * step)` with the scaled sample value as coefficient.
    ValueCoefficient,
}

/// Which light kinds contribute to shading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightingKind {
    None,
    Point,
    Directional,
    Both,
}

/// Feature flags selecting one renderer permutation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Mask samples behind an external depth buffer.
    pub use_volumetric_depth_test: bool,
    /// Derive per-step alpha from a fixed extinction coefficient.
    pub use_extinction_coefficient: bool,
    /// Use the scaled sample value itself as the extinction coefficient.
    /// Takes precedence over the fixed coefficient.
    pub use_value_as_extinction_coefficient: bool,
    /// Shade blend-mode samples with point lights.
    pub use_point_lights: bool,
    /// Shade blend-mode samples with directional lights.
    pub use_directional_lights: bool,
    /// Jitter each ray's start by a per-pixel fraction of one step.
    pub use_random_start: bool,
    /// Accumulate a path-length-weighted mean instead of alpha blending.
    pub render_mean_value: bool,
    /// Flip estimated gradient normals.
    pub invert_normals: bool,
    /// Output the first in-range normal instead of color. Debug mode.
    pub render_normals: bool,
    /// Fixed number of steps marched per ray.
    pub ray_steps: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            use_volumetric_depth_test: false,
            use_extinction_coefficient: true,
            use_value_as_extinction_coefficient: false,
            use_point_lights: false,
            use_directional_lights: false,
            use_random_start: true,
            render_mean_value: false,
            invert_normals: false,
            render_normals: false,
            ray_steps: 64,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volumetric_depth_test(mut self, enabled: bool) -> Self {
        self.use_volumetric_depth_test = enabled;
        self
    }

    pub fn with_extinction_coefficient(mut self, enabled: bool) -> Self {
        self.use_extinction_coefficient = enabled;
        self
    }

    pub fn with_value_as_extinction_coefficient(mut self, enabled: bool) -> Self {
        self.use_value_as_extinction_coefficient = enabled;
        self
    }

    pub fn with_point_lights(mut self, enabled: bool) -> Self {
        self.use_point_lights = enabled;
        self
    }

    pub fn with_directional_lights(mut self, enabled: bool) -> Self {
        self.use_directional_lights = enabled;
        self
    }

    pub fn with_random_start(mut self, enabled: bool) -> Self {
        self.use_random_start = enabled;
        self
    }

    pub fn with_mean_value(mut self, enabled: bool) -> Self {
        self.render_mean_value = enabled;
        self
    }

    pub fn with_inverted_normals(mut self, enabled: bool) -> Self {
        self.invert_normals = enabled;
        self
    }

    pub fn with_normal_output(mut self, enabled: bool) -> Self {
        self.render_normals = enabled;
        self
    }

    pub fn with_ray_steps(mut self, steps: u32) -> Self {
        self.ray_steps = steps;
        self
    }

    /// Validates the flag record, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ray_steps == 0 {
            return Err(Error::InvalidConfig("ray_steps must be > 0".into()));
        }
        if self.render_mean_value && self.render_normals {
            return Err(Error::InvalidConfig(
                "render_mean_value and render_normals are mutually exclusive output modes".into(),
            ));
        }
        Ok(())
    }

    /// Output mode implied by the flags.
    pub fn output_mode(&self) -> OutputMode {
        if self.render_normals {
            OutputMode::Normal
        } else {
            OutputMode::Color
        }
    }

    /// Accumulation mode implied by the flags.
    pub fn accumulation_mode(&self) -> AccumulationMode {
        if self.render_mean_value {
            AccumulationMode::Mean
        } else {
            AccumulationMode::Blend
        }
    }

    /// Extinction model implied by the flags.
    pub fn extinction_model(&self) -> ExtinctionModel {
        if self.use_value_as_extinction_coefficient {
            ExtinctionModel::ValueCoefficient
        } else if self.use_extinction_coefficient {
            ExtinctionModel::Fixed
        } else {
            ExtinctionModel::None
        }
    }

    /// Lighting kind implied by the flags.
    pub fn lighting(&self) -> LightingKind {
        match (self.use_point_lights, self.use_directional_lights) {
            (false, false) => LightingKind::None,
            (true, false) => LightingKind::Point,
            (false, true) => LightingKind::Directional,
            (true, true) => LightingKind::Both,
        }
    }
}
