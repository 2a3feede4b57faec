//! Frame renderer: owns the sampler strategy, palette, lights, and the
//! active permutation, and runs the per-pixel kernel over a target.
use glam::{Mat3, Vec4};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::atlas::FieldAtlas;
use crate::error::{Error, Result};
use crate::field::{AtlasSampler, FieldSampler};
use crate::permutation::{
    Bindings, Permutation, PermutationCache, RenderOptions, SamplerKind, StateKey,
};
use crate::render::camera::{linearize_depth, CameraFrame, DepthAttachment};
use crate::render::frame::FrameParams;
use crate::render::integrator::{integrate_ray, RayContext};
use crate::render::lights::LightRig;
use crate::render::palette::Palette;
use crate::render::target::RenderTarget;

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Rays cast, one per pixel.
    pub rays: usize,
    /// Rays that intersected the clipped volume box.
    pub shaded: usize,
    /// Rays discarded before sampling.
    pub missed: usize,
}

impl RenderStats {
    fn merge(self, other: Self) -> Self {
        Self {
            rays: self.rays + other.rays,
            shaded: self.shaded + other.shaded,
            missed: self.missed + other.missed,
        }
    }
}

enum Strategy {
    Atlas(FieldAtlas),
    Procedural(Box<dyn FieldSampler>),
}

impl Strategy {
    fn kind(&self) -> SamplerKind {
        match self {
            Strategy::Atlas(_) => SamplerKind::Atlas,
            Strategy::Procedural(_) => SamplerKind::Procedural,
        }
    }
}

/// Builder collecting the renderer's resources before validation.
pub struct VolumeRendererBuilder {
    options: RenderOptions,
    atlas: Option<FieldAtlas>,
    procedural: Option<Box<dyn FieldSampler>>,
    palette: Option<Box<dyn Palette>>,
    lights: LightRig,
}

impl VolumeRendererBuilder {
    fn new() -> Self {
        Self {
            options: RenderOptions::default(),
            atlas: None,
            procedural: None,
            palette: None,
            lights: LightRig::new(),
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads the field from a packed atlas.
    pub fn with_atlas(mut self, atlas: FieldAtlas) -> Self {
        self.atlas = Some(atlas);
        self
    }

    /// Reads the field from an injected formula.
    pub fn with_procedural(mut self, sampler: impl FieldSampler + 'static) -> Self {
        self.procedural = Some(Box::new(sampler));
        self
    }

    pub fn with_palette(mut self, palette: impl Palette + 'static) -> Self {
        self.palette = Some(Box::new(palette));
        self
    }

    pub fn with_lights(mut self, lights: LightRig) -> Self {
        self.lights = lights;
        self
    }

    /// Validates the configuration and builds the renderer. No partial
    /// construction: any error here leaves nothing behind.
    pub fn build(self) -> Result<VolumeRenderer> {
        let strategy = match (self.atlas, self.procedural) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidConfig(
                    "conflicting sampler strategies: both an atlas and a procedural \
                     sampler were supplied"
                        .into(),
                ));
            }
            (Some(atlas), None) => Strategy::Atlas(atlas),
            (None, Some(sampler)) => Strategy::Procedural(sampler),
            (None, None) => {
                return Err(Error::InvalidConfig(
                    "a field sampler is required: supply an atlas or a procedural sampler".into(),
                ));
            }
        };

        let mut cache = PermutationCache::new();
        let permutation = cache.get_or_build(&self.options, strategy.kind())?.clone();

        let bindings = Bindings {
            palette: self.palette.is_some(),
            atlas: matches!(strategy, Strategy::Atlas(_)),
            point_lights: !self.lights.points.is_empty(),
            directional_lights: !self.lights.directionals.is_empty(),
        };
        permutation.validate_bindings(&bindings)?;

        Ok(VolumeRenderer {
            options: self.options,
            cache,
            permutation,
            strategy,
            palette: self.palette,
            lights: self.lights,
        })
    }
}

/// Renders a volume once per frame with the active permutation.
pub struct VolumeRenderer {
    options: RenderOptions,
    cache: PermutationCache,
    permutation: Permutation,
    strategy: Strategy,
    palette: Option<Box<dyn Palette>>,
    lights: LightRig,
}

impl VolumeRenderer {
    pub fn builder() -> VolumeRendererBuilder {
        VolumeRendererBuilder::new()
    }

    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[inline]
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// The packed atlas, when the atlas strategy is active.
    pub fn atlas(&self) -> Option<&FieldAtlas> {
        match &self.strategy {
            Strategy::Atlas(atlas) => Some(atlas),
            Strategy::Procedural(_) => None,
        }
    }

    /// Exclusive access for resampling. Holding this borrow makes rendering
    /// from the atlas impossible, which is exactly the required exclusion.
    pub fn atlas_mut(&mut self) -> Option<&mut FieldAtlas> {
        match &mut self.strategy {
            Strategy::Atlas(atlas) => Some(atlas),
            Strategy::Procedural(_) => None,
        }
    }

    /// Swaps the flag record, rebuilding the permutation only when the flag
    /// fingerprint changed; the previous permutation is released first.
    /// Numeric state lives in [`FrameParams`] and never passes through here.
    pub fn set_options(&mut self, options: RenderOptions) -> Result<()> {
        let kind = self.strategy.kind();
        let permutation = self.cache.get_or_build(&options, kind)?.clone();

        let bindings = Bindings {
            palette: self.palette.is_some(),
            atlas: matches!(self.strategy, Strategy::Atlas(_)),
            point_lights: !self.lights.points.is_empty(),
            directional_lights: !self.lights.directionals.is_empty(),
        };
        permutation.validate_bindings(&bindings)?;

        self.options = options;
        self.permutation = permutation;
        Ok(())
    }

    /// Renders one frame into `target`, compositing over its contents.
    ///
    /// Pixels are independent; rows run in parallel. `depth` is consulted
    /// only when the permutation binds the depth range.
    pub fn render(
        &self,
        camera: &CameraFrame,
        frame: &FrameParams,
        depth: Option<&DepthAttachment<'_>>,
        target: &mut RenderTarget,
    ) -> RenderStats {
        let width = target.width();
        let height = target.height();
        if width == 0 || height == 0 {
            return RenderStats::default();
        }

        let depth_enabled = self.permutation.requires(StateKey::DepthRange);
        if depth_enabled && depth.is_none() {
            warn!("Depth test is enabled but no depth attachment was supplied; skipping it.");
        }
        let depth = if depth_enabled { depth } else { None };

        let atlas_sampler;
        let sampler: &dyn FieldSampler = match &self.strategy {
            Strategy::Atlas(atlas) => {
                atlas_sampler = AtlasSampler::new(atlas);
                &atlas_sampler
            }
            Strategy::Procedural(boxed) => boxed.as_ref(),
        };

        let ctx = RayContext {
            permutation: &self.permutation,
            frame,
            sampler,
            palette: self.palette.as_deref(),
            lights: &self.lights,
            view_model: camera.view * frame.transform.matrix,
            normal_to_view: Mat3::from_mat4(camera.view)
                * Mat3::from_mat4(frame.transform.inverse).transpose(),
        };
        let eye = camera.eye.as_vec3();

        let stats = target
            .pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .map(|(y, row)| {
                let mut stats = RenderStats::default();
                let v = 1.0 - (y as f32 + 0.5) / height as f32;

                for (x, pixel) in row.iter_mut().enumerate() {
                    let u = (x as f32 + 0.5) / width as f32;
                    let direction = camera.ray_direction(u, v);
                    let depth_limit = depth
                        .map(|d| linearize_depth(d.at(x, y), camera.near, camera.far));

                    stats.rays += 1;
                    match integrate_ray(&ctx, eye, direction, depth_limit) {
                        Some(result) => {
                            stats.shaded += 1;
                            let a = result.w;
                            let dst = *pixel;
                            *pixel = Vec4::new(
                                result.x + dst.x * (1.0 - a),
                                result.y + dst.y * (1.0 - a),
                                result.z + dst.z * (1.0 - a),
                                a + dst.w * (1.0 - a),
                            );
                        }
                        None => stats.missed += 1,
                    }
                }
                stats
            })
            .reduce(RenderStats::default, RenderStats::merge);

        debug!(
            "Frame {}x{}: {} shaded, {} missed.",
            width, height, stats.shaded, stats.missed
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use glam::{DVec3, UVec3, Vec3};
    use mint::Vector3;

    use super::*;
    use crate::field::ProceduralSampler;
    use crate::render::lights::DirectionalLight;
    use crate::render::palette::ColorRamp;

    const SIZE: usize = 9;
    const CENTER: usize = SIZE / 2;

    fn sphere_field() -> ProceduralSampler<impl Fn(Vec3, f32) -> f32 + Send + Sync> {
        ProceduralSampler::new(|p: Vec3, _| if p.length() < 0.5 { 1.0 } else { 0.0 })
    }

    fn sphere_renderer(options: RenderOptions) -> VolumeRenderer {
        VolumeRenderer::builder()
            .options(options)
            .with_procedural(sphere_field())
            .with_palette(ColorRamp::grayscale())
            .build()
            .unwrap()
    }

    fn camera() -> CameraFrame {
        CameraFrame::look_at(
            DVec3::new(0.0, 0.0, 3.0),
            DVec3::ZERO,
            DVec3::Y,
            60f64.to_radians(),
            1.0,
            0.1,
            100.0,
        )
    }

    fn sphere_frame() -> FrameParams {
        FrameParams {
            volume_origin: Vec3::splat(-1.0),
            volume_size: Vec3::splat(2.0),
            min_cutoff_value: 0.5,
            max_cutoff_value: 1.0,
            ..FrameParams::default()
        }
    }

    fn steady_options() -> RenderOptions {
        RenderOptions::default().with_random_start(false)
    }

    fn center_alpha(renderer: &VolumeRenderer, frame: &FrameParams) -> f32 {
        let mut target = RenderTarget::new(SIZE, SIZE);
        renderer.render(&camera(), frame, None, &mut target);
        target.pixel(CENTER, CENTER).w
    }

    #[test]
    fn rays_missing_the_box_are_discarded() {
        let renderer = sphere_renderer(steady_options());
        // Looking directly away from the volume.
        let away = CameraFrame::look_at(
            DVec3::new(0.0, 0.0, 3.0),
            DVec3::new(0.0, 0.0, 6.0),
            DVec3::Y,
            60f64.to_radians(),
            1.0,
            0.1,
            100.0,
        );
        let mut target = RenderTarget::new(SIZE, SIZE);
        let stats = renderer.render(&away, &sphere_frame(), None, &mut target);

        assert_eq!(stats.missed, SIZE * SIZE);
        assert_eq!(stats.shaded, 0);
        assert!(target.pixels().iter().all(|p| *p == Vec4::ZERO));
    }

    #[test]
    fn alpha_stays_in_unit_range_and_colors_are_non_negative() {
        let configs = [
            steady_options(),
            steady_options().with_extinction_coefficient(false),
            steady_options().with_value_as_extinction_coefficient(true),
            steady_options().with_mean_value(true),
            RenderOptions::default(),
        ];
        for options in configs {
            let lit = VolumeRenderer::builder()
                .options(options.clone().with_directional_lights(true))
                .with_procedural(sphere_field())
                .with_palette(ColorRamp::viridis())
                .with_lights(LightRig::new().with_directional(DirectionalLight {
                    direction: Vec3::NEG_Z,
                    color: Vec3::ONE,
                    intensity: 1.5,
                }))
                .build()
                .unwrap();

            let mut frame = sphere_frame();
            frame.alpha_multiplier = 0.8;
            frame.extinction_coefficient = 4.0;
            let mut target = RenderTarget::new(SIZE, SIZE);
            lit.render(&camera(), &frame, None, &mut target);

            for p in target.pixels() {
                assert!((0.0..=1.0).contains(&p.w), "alpha out of range: {}", p.w);
                assert!(p.x >= 0.0 && p.y >= 0.0 && p.z >= 0.0);
            }
        }
    }

    #[test]
    fn alpha_accumulates_monotonically_through_the_sphere() {
        let renderer = sphere_renderer(steady_options());
        let mut last = 0.0f32;
        // Pull the near-side clip plane deeper through the sphere; each
        // sweep exposes a longer prefix of the same ray, so the center
        // pixel sees the accumulation state at increasing depths.
        for i in 0..=10 {
            let mut frame = sphere_frame();
            frame.clip_min.z = 0.5 - i as f32 * 0.1;
            let alpha = center_alpha(&renderer, &frame);
            assert!(
                alpha >= last - 1e-6,
                "alpha decreased from {last} to {alpha} at sweep {i}"
            );
            last = alpha;
        }
        assert!(last > 0.0);
        assert!(last <= 1.0);
    }

    #[test]
    fn depth_buffer_nearer_than_entry_makes_the_pixel_transparent() {
        let renderer = sphere_renderer(steady_options().with_volumetric_depth_test(true));
        let frame = sphere_frame();

        // Entirely in front of the volume: linearized depth is near 0.1
        // while the box entry sits two units out.
        let samples = vec![0.001f32; SIZE * SIZE];
        let depth = DepthAttachment {
            samples: &samples,
            width: SIZE,
            height: SIZE,
        };
        let mut target = RenderTarget::new(SIZE, SIZE);
        renderer.render(&camera(), &frame, Some(&depth), &mut target);
        assert!(target.pixels().iter().all(|p| p.w == 0.0));

        // The same scene without the occluder is visibly there.
        let far_samples = vec![1.0f32; SIZE * SIZE];
        let far_depth = DepthAttachment {
            samples: &far_samples,
            width: SIZE,
            height: SIZE,
        };
        let mut open = RenderTarget::new(SIZE, SIZE);
        renderer.render(&camera(), &frame, Some(&far_depth), &mut open);
        assert!(open.pixel(CENTER, CENTER).w > 0.0);
    }

    #[test]
    fn mean_and_blend_agree_on_which_rays_are_in_range() {
        let blend = sphere_renderer(steady_options());
        let mean = sphere_renderer(steady_options().with_mean_value(true));

        let frame = sphere_frame();
        let mut blend_target = RenderTarget::new(SIZE, SIZE);
        let mut mean_target = RenderTarget::new(SIZE, SIZE);
        blend.render(&camera(), &frame, None, &mut blend_target);
        mean.render(&camera(), &frame, None, &mut mean_target);

        for (b, m) in blend_target.pixels().iter().zip(mean_target.pixels()) {
            assert_eq!(b.w > 0.0, m.w > 0.0);
        }

        // A band the field never reaches blanks both modes.
        let mut empty = sphere_frame();
        empty.min_cutoff_value = 2.0;
        empty.max_cutoff_value = 3.0;
        assert_eq!(center_alpha(&blend, &empty), 0.0);
        assert_eq!(center_alpha(&mean, &empty), 0.0);
    }

    #[test]
    fn normal_mode_outputs_a_remapped_first_hit_normal() {
        let renderer = sphere_renderer(steady_options().with_normal_output(true));
        let mut frame = sphere_frame();
        // Wider than one step, so the finite difference straddles the
        // sphere boundary at the first in-range sample.
        frame.normal_epsilon = 0.05;
        let mut target = RenderTarget::new(SIZE, SIZE);
        renderer.render(&camera(), &frame, None, &mut target);

        let center = target.pixel(CENTER, CENTER);
        assert_eq!(center.w, 1.0);
        for channel in [center.x, center.y, center.z] {
            assert!((0.0..=1.0).contains(&channel));
        }
        // Front of the sphere faces the camera: the view-space normal points
        // at the eye, which remaps to a dominant blue channel.
        assert!(center.z > 0.9, "expected camera-facing normal, got {center}");
    }

    #[test]
    fn atlas_strategy_renders_the_packed_field() {
        let mut atlas = FieldAtlas::pack(
            UVec3::splat(17),
            Vec3::splat(-1.0),
            Vec3::splat(2.0 / 16.0),
            1,
        )
        .unwrap();
        atlas
            .resample(
                &|_: Vector3<u32>, p: Vector3<f32>, _| {
                    if Vec3::from(p).length() < 0.5 {
                        1.0
                    } else {
                        0.0
                    }
                },
                0,
                None,
            )
            .unwrap();

        let renderer = VolumeRenderer::builder()
            .options(steady_options())
            .with_atlas(atlas)
            .with_palette(ColorRamp::grayscale())
            .build()
            .unwrap();

        let frame = sphere_frame();
        assert!(center_alpha(&renderer, &frame) > 0.0);
    }

    #[test]
    fn builder_rejects_conflicting_sampler_strategies() {
        let atlas = FieldAtlas::pack(UVec3::splat(2), Vec3::ZERO, Vec3::ONE, 1).unwrap();
        let err = VolumeRenderer::builder()
            .with_atlas(atlas)
            .with_procedural(sphere_field())
            .with_palette(ColorRamp::grayscale())
            .build();
        assert!(matches!(err, Err(Error::InvalidConfig(_))));

        let none = VolumeRenderer::builder()
            .with_palette(ColorRamp::grayscale())
            .build();
        assert!(matches!(none, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn builder_requires_palette_for_color_output() {
        let err = VolumeRenderer::builder()
            .with_procedural(sphere_field())
            .build();
        assert!(matches!(err, Err(Error::MissingResource(_))));

        // Normal output renders without one.
        assert!(VolumeRenderer::builder()
            .options(RenderOptions::default().with_normal_output(true))
            .with_procedural(sphere_field())
            .build()
            .is_ok());
    }

    #[test]
    fn enabled_lights_require_a_rig() {
        let err = VolumeRenderer::builder()
            .options(RenderOptions::default().with_point_lights(true))
            .with_procedural(sphere_field())
            .with_palette(ColorRamp::grayscale())
            .build();
        assert!(matches!(err, Err(Error::MissingResource(_))));
    }

    #[test]
    fn set_options_rebuilds_only_on_flag_changes() {
        let mut renderer = sphere_renderer(steady_options());
        let fp = renderer.permutation().fingerprint();

        renderer.set_options(steady_options()).unwrap();
        assert_eq!(renderer.permutation().fingerprint(), fp);

        renderer
            .set_options(steady_options().with_normal_output(true))
            .unwrap();
        assert_ne!(renderer.permutation().fingerprint(), fp);
    }
}
