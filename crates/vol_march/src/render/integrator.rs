//! The per-pixel ray integration kernel.
//!
//! Each ray is clipped against the volume box, then marched with a fixed
//! number of steps. Steps past the exit are masked to zero contribution
//! instead of skipped, so every ray costs the same number of iterations.
//! Normal output is the one exception: it stops at the first in-range
//! sample, which is first-hit semantics rather than integration.
use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::field::FieldSampler;
use crate::permutation::{AccumulationMode, ExtinctionModel, OutputMode, Permutation};
use crate::render::frame::FrameParams;
use crate::render::lights::LightRig;
use crate::render::palette::Palette;
use crate::render::{smoothstep01, MIN_DENOMINATOR};

/// Everything one ray needs, assembled once per frame by the renderer.
pub(crate) struct RayContext<'a> {
    pub permutation: &'a Permutation,
    pub frame: &'a FrameParams,
    pub sampler: &'a dyn FieldSampler,
    pub palette: Option<&'a dyn Palette>,
    pub lights: &'a LightRig,
    /// Local-to-view transform for depth tests and point lights.
    pub view_model: Mat4,
    /// Takes local-space gradient normals into view space.
    pub normal_to_view: Mat3,
}

/// Integrates one world-space ray. Returns the premultiplied RGBA result,
/// or `None` when the ray misses the clipped volume box entirely.
pub(crate) fn integrate_ray(
    ctx: &RayContext<'_>,
    eye: Vec3,
    direction: Vec3,
    depth_limit: Option<f32>,
) -> Option<Vec4> {
    let frame = ctx.frame;
    let options = ctx.permutation.options();

    // March in local space, but keep `direction` unnormalized after the
    // transform so ray parameters stay in world-metric units.
    let origin_local = frame.transform.inverse.transform_point3(eye);
    let dir_local = frame.transform.inverse.transform_vector3(direction);

    let box_min = frame.volume_origin.max(frame.clip_min);
    let box_max = (frame.volume_origin + frame.volume_size).min(frame.clip_max);
    if box_min.cmpge(box_max).any() {
        return None;
    }

    let (t_near, t_far) = slab_clip(origin_local, dir_local, box_min, box_max)?;
    if t_far < 0.0 {
        return None;
    }
    let t_entry = t_near.max(0.0);
    let span = t_far - t_entry;
    if span <= 0.0 {
        // Grazing contact; nothing to accumulate.
        return None;
    }

    let steps = options.ray_steps;
    let step = span / steps as f32;
    let jitter = if options.use_random_start {
        jitter01(frame.random, direction)
    } else {
        0.0
    };
    let start = t_entry + jitter * step;

    let mode = options.output_mode();
    let accumulation = options.accumulation_mode();
    let extinction = options.extinction_model();
    let lighting = ctx.permutation.applies_lighting();

    let mut accum_color = Vec3::ZERO;
    let mut accum_alpha = 0.0f32;
    let mut mean_sum = 0.0f32;
    let mut mean_weight = 0.0f32;

    for i in 0..steps {
        let t = start + i as f32 * step;
        // Past the exit the step stays in the loop but contributes nothing.
        let segment = if t <= t_far { 1.0 } else { 0.0 };

        let position = origin_local + dir_local * t;
        let raw = ctx.sampler.sample(position.into(), frame.time);
        let value = raw * frame.value_multiplier + frame.value_added;

        let mut fade = segment
            * cutoff_factor(
                value,
                frame.min_cutoff_value,
                frame.max_cutoff_value,
                frame.cutoff_fade_range,
            );
        if let Some(limit) = depth_limit {
            let view_depth = -ctx.view_model.transform_point3(position).z;
            if view_depth > limit {
                fade = 0.0;
            }
        }

        match mode {
            OutputMode::Normal => {
                if fade > 0.0 {
                    let normal = view_normal(ctx, position);
                    let visual = normal * 0.5 + Vec3::splat(0.5);
                    return Some(Vec4::new(visual.x, visual.y, visual.z, 1.0));
                }
            }
            OutputMode::Color => match accumulation {
                AccumulationMode::Blend => {
                    let base = base_alpha(extinction, value, step, frame);
                    let alpha = (frame.alpha_multiplier * base * fade).clamp(0.0, 1.0);
                    if alpha > 0.0 {
                        let mut color = palette_color(ctx, value);
                        if lighting {
                            let normal = view_normal(ctx, position);
                            let point = ctx.view_model.transform_point3(position);
                            color *= ctx.lights.shade(
                                point,
                                normal,
                                options.use_point_lights,
                                options.use_directional_lights,
                            );
                        }
                        accum_color += color * (alpha * (1.0 - accum_alpha));
                        accum_alpha += (1.0 - accum_alpha) * alpha;
                    }
                }
                AccumulationMode::Mean => {
                    mean_sum += value * step * fade;
                    mean_weight += step * fade;
                }
            },
        }
    }

    match (mode, accumulation) {
        (OutputMode::Normal, _) => None,
        (OutputMode::Color, AccumulationMode::Blend) => Some(Vec4::new(
            accum_color.x,
            accum_color.y,
            accum_color.z,
            accum_alpha.clamp(0.0, 1.0),
        )),
        (OutputMode::Color, AccumulationMode::Mean) => {
            if mean_weight <= MIN_DENOMINATOR {
                return Some(Vec4::ZERO);
            }
            let mean = mean_sum / mean_weight.max(MIN_DENOMINATOR);
            let color = palette_color(ctx, mean);
            let alpha = (frame.alpha_multiplier * mean_weight.clamp(0.0, 1.0)).clamp(0.0, 1.0);
            Some(Vec4::new(
                color.x * alpha,
                color.y * alpha,
                color.z * alpha,
                alpha,
            ))
        }
    }
}

/// Slab intersection of a ray with an axis-aligned box. Returns the
/// parametric entry and exit, or `None` when the ray misses.
pub(crate) fn slab_clip(
    origin: Vec3,
    direction: Vec3,
    box_min: Vec3,
    box_max: Vec3,
) -> Option<(f32, f32)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let lo = box_min[axis];
        let hi = box_max[axis];

        if d.abs() <= f32::EPSILON {
            // Parallel to the slab; either always inside it or never.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t0, t1) = if inv >= 0.0 {
            ((lo - o) * inv, (hi - o) * inv)
        } else {
            ((hi - o) * inv, (lo - o) * inv)
        };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    Some((t_near, t_far))
}

/// In-range factor for a scaled sample value: zero outside the cutoff band,
/// smoothly rising over `fade` inside each boundary.
pub(crate) fn cutoff_factor(value: f32, min_cutoff: f32, max_cutoff: f32, fade: f32) -> f32 {
    if value < min_cutoff || value > max_cutoff {
        return 0.0;
    }
    if fade <= 0.0 {
        return 1.0;
    }
    smoothstep01(min_cutoff, min_cutoff + fade, value)
        * (1.0 - smoothstep01(max_cutoff - fade, max_cutoff, value))
}

/// Per-step opacity before the alpha multiplier and masks.
#[inline]
fn base_alpha(model: ExtinctionModel, value: f32, step: f32, frame: &FrameParams) -> f32 {
    let k = match model {
        ExtinctionModel::None => return 1.0,
        ExtinctionModel::Fixed => frame.extinction_coefficient,
        ExtinctionModel::ValueCoefficient => value,
    };
    (1.0 - (-k * frame.extinction_multiplier * step).exp()).clamp(0.0, 1.0)
}

/// Palette lookup at `value` normalized into the palette range.
fn palette_color(ctx: &RayContext<'_>, value: f32) -> Vec3 {
    let frame = ctx.frame;
    let denom = frame.max_palette_value - frame.min_palette_value;
    let t = if denom.abs() <= f32::EPSILON {
        if value >= frame.max_palette_value {
            1.0
        } else {
            0.0
        }
    } else {
        (value - frame.min_palette_value) / denom
    };
    match ctx.palette {
        Some(palette) => palette.sample(t),
        None => Vec3::ONE,
    }
}

/// Finite-difference gradient normal at a local position, in view space.
fn view_normal(ctx: &RayContext<'_>, position: Vec3) -> Vec3 {
    let frame = ctx.frame;
    let e = frame.normal_epsilon.max(MIN_DENOMINATOR);
    let s = |p: Vec3| ctx.sampler.sample(p.into(), frame.time);

    let gradient = Vec3::new(
        s(position + Vec3::X * e) - s(position - Vec3::X * e),
        s(position + Vec3::Y * e) - s(position - Vec3::Y * e),
        s(position + Vec3::Z * e) - s(position - Vec3::Z * e),
    ) / (2.0 * e);

    // Density decreases outward, so the surface normal opposes the gradient.
    let mut normal = -gradient;
    if ctx.permutation.options().invert_normals {
        normal = -normal;
    }
    (ctx.normal_to_view * normal).normalize_or_zero()
}

/// Per-pixel start jitter in `[0, 1)`, derived from the frame random and
/// the ray direction so it is stable within a frame but changes across
/// frames.
#[inline]
pub(crate) fn jitter01(random: f32, direction: Vec3) -> f32 {
    let mixed = (random.to_bits() as u64).wrapping_mul(0x9E3779B97F4A7C15)
        ^ (direction.x.to_bits() as u64).wrapping_mul(0xBF58476D1CE4E5B9)
        ^ (direction.y.to_bits() as u64).wrapping_mul(0x94D049BB133111EB)
        ^ ((direction.z.to_bits() as u64) << 17);
    let h = mix_u64(mixed);
    (h >> 40) as f32 / (1u64 << 24) as f32
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
