//! Derivation of one renderer permutation from a flag record.
//!
//! Building a permutation validates the flags and computes which state
//! variables the permutation binds: a variable is required exactly when some
//! enabled flag depends on it. Binding is validated against the resources
//! the host actually supplied before the first frame renders.
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::permutation::options::{
    AccumulationMode, ExtinctionModel, LightingKind, OutputMode, RenderOptions,
};

/// Which field-sampler strategy a permutation is built against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    /// Trilinear atlas interpolation; binds atlas geometry and time state.
    Atlas,
    /// Injected formula; no storage-related state.
    Procedural,
}

/// A state variable group the integrator may bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    /// `value_multiplier` / `value_added` remap of raw samples.
    ValueRemap,
    /// Cutoff band and edge-fade width.
    CutoffRange,
    /// Palette normalization bounds.
    PaletteRange,
    /// Per-step alpha scale.
    AlphaMultiplier,
    /// Extinction coefficient and multiplier.
    Extinction,
    /// Point/directional light structs.
    Lights,
    /// Camera near/far range and the depth attachment.
    DepthRange,
    /// Finite-difference epsilon for gradient normals.
    NormalEpsilon,
    /// Atlas resolution, voxel size, and block grid.
    AtlasGeometry,
    /// Wrapped two-block time interpolation state.
    TimeBlend,
    /// Per-frame random used to seed the start jitter.
    FrameRandom,
}

/// Resources the host has attached, checked against a permutation's
/// required state at build/bind time.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bindings {
    pub palette: bool,
    pub atlas: bool,
    pub point_lights: bool,
    pub directional_lights: bool,
}

/// One validated renderer permutation: the flag record plus the derived
/// enabled paths and required state set.
#[derive(Clone, Debug)]
pub struct Permutation {
    options: RenderOptions,
    sampler: SamplerKind,
    required: BTreeSet<StateKey>,
    fingerprint: u64,
}

impl Permutation {
    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[inline]
    pub fn sampler_kind(&self) -> SamplerKind {
        self.sampler
    }

    /// State variable groups this permutation binds.
    pub fn required(&self) -> &BTreeSet<StateKey> {
        &self.required
    }

    #[inline]
    pub fn requires(&self, key: StateKey) -> bool {
        self.required.contains(&key)
    }

    /// Fingerprint of the flag record and sampler kind. Numeric per-frame
    /// state does not participate, so it can never force a rebuild.
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Lighting applies only to color output in blend mode.
    #[inline]
    pub fn applies_lighting(&self) -> bool {
        applies_lighting(&self.options)
    }

    /// Gradient normals are estimated for lighting and for normal output.
    #[inline]
    pub fn estimates_normals(&self) -> bool {
        estimates_normals(&self.options)
    }

    /// Checks that every required resource is attached.
    pub fn validate_bindings(&self, bindings: &Bindings) -> Result<()> {
        if self.requires(StateKey::PaletteRange) && !bindings.palette {
            return Err(Error::MissingResource("palette".into()));
        }
        if self.requires(StateKey::AtlasGeometry) && !bindings.atlas {
            return Err(Error::MissingResource("field atlas".into()));
        }
        if self.requires(StateKey::Lights) {
            if self.options.use_point_lights && !bindings.point_lights {
                return Err(Error::MissingResource("point lights".into()));
            }
            if self.options.use_directional_lights && !bindings.directional_lights {
                return Err(Error::MissingResource("directional lights".into()));
            }
        }
        Ok(())
    }
}

/// Builds [`Permutation`]s from flag records.
pub struct PermutationBuilder;

impl PermutationBuilder {
    /// Validates `options` and derives the permutation for `sampler`.
    pub fn build(options: &RenderOptions, sampler: SamplerKind) -> Result<Permutation> {
        options.validate()?;

        let mut required = BTreeSet::new();
        required.insert(StateKey::ValueRemap);
        required.insert(StateKey::CutoffRange);

        if options.output_mode() == OutputMode::Color {
            required.insert(StateKey::PaletteRange);
            required.insert(StateKey::AlphaMultiplier);
        }
        if applies_lighting(options) {
            required.insert(StateKey::Lights);
        }
        if options.use_volumetric_depth_test {
            required.insert(StateKey::DepthRange);
        }
        if options.output_mode() == OutputMode::Color
            && options.accumulation_mode() == AccumulationMode::Blend
            && options.extinction_model() != ExtinctionModel::None
        {
            required.insert(StateKey::Extinction);
        }
        if estimates_normals(options) {
            required.insert(StateKey::NormalEpsilon);
        }
        if sampler == SamplerKind::Atlas {
            required.insert(StateKey::AtlasGeometry);
            required.insert(StateKey::TimeBlend);
        }
        if options.use_random_start {
            required.insert(StateKey::FrameRandom);
        }

        Ok(Permutation {
            options: options.clone(),
            sampler,
            required,
            fingerprint: fingerprint(options, sampler),
        })
    }
}

fn applies_lighting(options: &RenderOptions) -> bool {
    options.output_mode() == OutputMode::Color
        && options.accumulation_mode() == AccumulationMode::Blend
        && options.lighting() != LightingKind::None
}

fn estimates_normals(options: &RenderOptions) -> bool {
    options.output_mode() == OutputMode::Normal || applies_lighting(options)
}

/// Fingerprint over the flag record and sampler kind only.
pub(crate) fn fingerprint(options: &RenderOptions, sampler: SamplerKind) -> u64 {
    let mut hasher = DefaultHasher::new();
    options.use_volumetric_depth_test.hash(&mut hasher);
    options.use_extinction_coefficient.hash(&mut hasher);
    options.use_value_as_extinction_coefficient.hash(&mut hasher);
    options.use_point_lights.hash(&mut hasher);
    options.use_directional_lights.hash(&mut hasher);
    options.use_random_start.hash(&mut hasher);
    options.render_mean_value.hash(&mut hasher);
    options.invert_normals.hash(&mut hasher);
    options.render_normals.hash(&mut hasher);
    options.ray_steps.hash(&mut hasher);
    sampler.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color_permutation_binds_palette_state() {
        let permutation =
            PermutationBuilder::build(&RenderOptions::default(), SamplerKind::Procedural).unwrap();
        assert!(permutation.requires(StateKey::PaletteRange));
        assert!(permutation.requires(StateKey::AlphaMultiplier));
        assert!(permutation.requires(StateKey::Extinction));
        assert!(permutation.requires(StateKey::FrameRandom));
        assert!(!permutation.requires(StateKey::Lights));
        assert!(!permutation.requires(StateKey::DepthRange));
        assert!(!permutation.requires(StateKey::AtlasGeometry));
    }

    #[test]
    fn normal_output_drops_palette_state() {
        let options = RenderOptions::default().with_normal_output(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        assert!(!permutation.requires(StateKey::PaletteRange));
        assert!(!permutation.requires(StateKey::AlphaMultiplier));
        assert!(permutation.requires(StateKey::NormalEpsilon));
        assert!(permutation.estimates_normals());
    }

    #[test]
    fn mean_mode_ignores_lights() {
        let options = RenderOptions::default()
            .with_mean_value(true)
            .with_point_lights(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        assert!(!permutation.requires(StateKey::Lights));
        assert!(!permutation.applies_lighting());
        assert!(!permutation.estimates_normals());
    }

    #[test]
    fn lighting_in_blend_mode_binds_lights_and_epsilon() {
        let options = RenderOptions::default().with_directional_lights(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        assert!(permutation.requires(StateKey::Lights));
        assert!(permutation.requires(StateKey::NormalEpsilon));
    }

    #[test]
    fn atlas_sampler_binds_atlas_geometry() {
        let permutation =
            PermutationBuilder::build(&RenderOptions::default(), SamplerKind::Atlas).unwrap();
        assert!(permutation.requires(StateKey::AtlasGeometry));
        assert!(permutation.requires(StateKey::TimeBlend));
    }

    #[test]
    fn depth_test_binds_depth_range() {
        let options = RenderOptions::default().with_volumetric_depth_test(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        assert!(permutation.requires(StateKey::DepthRange));
    }

    #[test]
    fn fingerprint_tracks_flags_not_numerics() {
        let a = fingerprint(&RenderOptions::default(), SamplerKind::Procedural);
        let b = fingerprint(&RenderOptions::default(), SamplerKind::Procedural);
        assert_eq!(a, b);

        let c = fingerprint(
            &RenderOptions::default().with_normal_output(true),
            SamplerKind::Procedural,
        );
        assert_ne!(a, c);

        let d = fingerprint(&RenderOptions::default(), SamplerKind::Atlas);
        assert_ne!(a, d);
    }

    #[test]
    fn missing_palette_fails_binding_validation() {
        let permutation =
            PermutationBuilder::build(&RenderOptions::default(), SamplerKind::Procedural).unwrap();
        let err = permutation.validate_bindings(&Bindings {
            palette: false,
            ..Bindings::default()
        });
        assert!(matches!(err, Err(Error::MissingResource(_))));
    }

    #[test]
    fn normal_output_needs_no_palette_binding() {
        let options = RenderOptions::default().with_normal_output(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        assert!(permutation.validate_bindings(&Bindings::default()).is_ok());
    }

    #[test]
    fn enabled_point_lights_need_a_non_empty_rig() {
        let options = RenderOptions::default().with_point_lights(true);
        let permutation = PermutationBuilder::build(&options, SamplerKind::Procedural).unwrap();
        let err = permutation.validate_bindings(&Bindings {
            palette: true,
            ..Bindings::default()
        });
        assert!(matches!(err, Err(Error::MissingResource(_))));
    }
}
