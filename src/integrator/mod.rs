use cgmath::InnerSpace;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fmt::Debug;

use crate::{abs_dot, Bounds2i, Float, Ray, SurfaceInteraction};
use crate::error::RenderError;
use crate::imageio::Bitmap;
use crate::interaction::SurfaceHit;
use crate::reflection::Bsdf;
use crate::sampler::{tile_seed, Sampler};
use crate::sampling::power_heuristic;
use crate::scene::Scene;
use crate::spectrum::Spectrum;

pub mod path;
pub mod direct_lighting;

pub use direct_lighting::DirectLightingIntegrator;
pub use path::PathIntegrator;

/// Upper bound on consecutive index-matched boundaries a ray passes through before it is
/// treated as lost.
const MAX_NULL_CROSSINGS: u32 = 64;

/// Radiance arriving along a camera ray, and the coverage it contributes to the alpha channel.
#[derive(Clone, Copy, Debug)]
pub struct RadianceSample {
    pub radiance: Spectrum,
    pub alpha: Float,
}

pub trait Integrator: Send + Sync + Debug {
    fn incident_radiance(&self, ray: Ray, scene: &Scene, sampler: &mut dyn Sampler) -> RadianceSample;
}

/// Chooses one next-event light uniformly and estimates its direct contribution at `si`,
/// weighted against BSDF sampling with the power heuristic.
pub fn uniform_sample_one_light(
    si: &SurfaceInteraction,
    bsdf: &Bsdf,
    scene: &Scene,
    sampler: &mut dyn Sampler,
) -> Spectrum {
    let n_lights = scene.nee_lights.len();
    let u_pick = sampler.get_1d();
    let u_light = sampler.get_2d();
    if n_lights == 0 {
        return Spectrum::uniform(0.0);
    }
    let light_idx = ((u_pick * n_lights as Float) as usize).min(n_lights - 1);
    let light = &scene.nee_lights[light_idx];
    let light_pick_pdf = 1.0 / n_lights as Float;

    let sample = match light.sample_incident_radiance(&si.hit, u_light) {
        Some(sample) if sample.pdf > 0.0 && !sample.radiance.is_black() => sample,
        _ => return Spectrum::uniform(0.0),
    };

    let f = bsdf.f(si.wo, sample.wi) * abs_dot(sample.wi, si.shading_n.0);
    if f.is_black() || !sample.vis.unoccluded(scene) {
        return Spectrum::uniform(0.0);
    }

    let light_pdf = sample.pdf * light_pick_pdf;
    if light.flags().is_delta_light() {
        f * sample.radiance / light_pdf
    } else {
        let scattering_pdf = bsdf.pdf(si.wo, sample.wi);
        let weight = power_heuristic(1, light_pdf, 1, scattering_pdf);
        f * sample.radiance * weight / light_pdf
    }
}

/// MIS weight for emission found by following a BSDF sample from `prev` to the area light
/// at `si`.
pub fn bsdf_sampled_emission_weight(
    scene: &Scene,
    prev: &SurfaceHit,
    scattering_pdf: Float,
    si: &SurfaceInteraction,
) -> Float {
    let light = match si.primitive.and_then(|prim| prim.area_light.as_ref()) {
        Some(light) => light,
        None => return 1.0,
    };
    let n_lights = scene.nee_lights.len();
    if n_lights == 0 {
        return 1.0;
    }
    let light_pdf = light.pdf_at(prev, &si.hit) / n_lights as Float;
    power_heuristic(1, scattering_pdf, 1, light_pdf)
}

/// Passes `ray` through surfaces without a BSDF and returns the first scattering or emitting
/// hit, if any.
pub(crate) fn intersect_skipping_null<'s>(scene: &'s Scene, ray: &mut Ray) -> Option<SurfaceInteraction<'s>> {
    for _ in 0..MAX_NULL_CROSSINGS {
        let si = scene.intersect(ray)?;
        let has_bsdf = si.primitive.map_or(false, |prim| prim.bsdf.is_some());
        if has_bsdf || si.is_emitter() {
            return Some(si);
        }
        *ray = si.spawn_ray(ray.dir.normalize());
    }
    None
}

/// Renders every tile of the film in parallel on the current rayon pool and develops the
/// merged result. Each tile draws from its own seeded sampler and tiles are merged in index
/// order, so the output only depends on the scene and its seed.
pub fn render_film(scene: &Scene, tile_size: i32, progress: &ProgressBar) -> Result<Bitmap, RenderError> {
    let film = &scene.film;
    let sample_bounds = film.pixel_bounds();
    let tiles: Vec<Bounds2i> = sample_bounds.iter_tiles(tile_size.max(1)).collect();
    progress.set_length(tiles.len() as u64);

    let seed = scene.sampler.seed();
    let film_tiles = tiles.par_iter().enumerate().map(|(tile_idx, &tile)| {
        let mut tile_sampler = scene.sampler.clone_with_seed(tile_seed(seed, tile_idx as u64));
        let mut film_tile = film.get_film_tile(tile);

        for pixel in tile.iter_points() {
            tile_sampler.start_pixel(pixel);

            while tile_sampler.start_next_sample() {
                let camera_sample = tile_sampler.get_camera_sample(pixel);
                let (ray_weight, ray) = scene.camera.generate_ray(camera_sample);

                let sample = if ray_weight > 0.0 {
                    scene.integrator.incident_radiance(ray, scene, tile_sampler.as_mut())
                } else {
                    RadianceSample { radiance: Spectrum::uniform(0.0), alpha: 0.0 }
                };

                if !sample.radiance.is_finite() {
                    return Err(RenderError::NonFiniteRadiance { x: pixel.x, y: pixel.y });
                }

                film_tile.add_sample(camera_sample.p_film, sample.radiance * ray_weight, sample.alpha, 1.0);
            }
        }
        progress.inc(1);
        Ok(film_tile)
    }).collect::<Result<Vec<_>, RenderError>>()?;

    let mut acc = film.new_accumulator();
    for tile in &film_tiles {
        acc.merge_film_tile(tile);
    }
    Ok(film.develop(&acc))
}
