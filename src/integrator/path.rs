use crate::integrator::{bsdf_sampled_emission_weight, uniform_sample_one_light, Integrator, RadianceSample};
use crate::interaction::SurfaceHit;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Float, Ray, abs_dot};

/// Unidirectional path tracer with next event estimation and multiple importance sampling.
#[derive(Debug, Clone)]
pub struct PathIntegrator {
    /// Longest path, counted in scattering events plus one. `None` is unbounded.
    max_depth: Option<u32>,

    /// Depth from which Russian roulette may terminate paths.
    rr_depth: u32,

    /// Leave emitters seen directly by the camera out of the image.
    hide_emitters: bool,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self { max_depth: None, rr_depth: 5, hide_emitters: false }
    }
}

impl PathIntegrator {
    pub fn new(max_depth: Option<u32>, rr_depth: u32, hide_emitters: bool) -> Self {
        PathIntegrator { max_depth, rr_depth, hide_emitters }
    }

    fn continues_after(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth + 1 < max)
    }
}

impl Integrator for PathIntegrator {
    fn incident_radiance(&self, ray: Ray, scene: &Scene, sampler: &mut dyn Sampler) -> RadianceSample {
        let mut path_radiance = Spectrum::uniform(0.0);
        let mut throughput = Spectrum::uniform(1.0);
        let mut depth = 0u32;
        let mut ray = ray;
        let mut alpha: Float = if scene.has_environment() && !self.hide_emitters { 1.0 } else { 0.0 };

        // state of the previous scattering event, for weighting emission found by BSDF sampling
        let mut specular_bounce = false;
        let mut prev_hit: Option<SurfaceHit> = None;
        let mut prev_pdf: Float = 0.0;
        let mut null_crossings = 0;

        if self.max_depth == Some(0) {
            return RadianceSample { radiance: path_radiance, alpha };
        }

        loop {
            let si = match scene.intersect(&mut ray) {
                Some(si) => si,
                None => {
                    if depth > 0 || !self.hide_emitters {
                        path_radiance += throughput * scene.environment_emitted_radiance(&ray);
                    }
                    break;
                }
            };
            if depth == 0 {
                alpha = 1.0;
            }

            // emission at the hit
            if si.is_emitter() && (depth > 0 || !self.hide_emitters) {
                let le = si.emitted_radiance(si.wo);
                let weight = match prev_hit {
                    Some(prev) if !specular_bounce => bsdf_sampled_emission_weight(scene, &prev, prev_pdf, &si),
                    _ => 1.0,
                };
                path_radiance += throughput * le * weight;
            }

            let bsdf = match si.bsdf() {
                Some(bsdf) => bsdf,
                None => {
                    // index-matched boundary, carry on without counting a bounce
                    null_crossings += 1;
                    if null_crossings > super::MAX_NULL_CROSSINGS {
                        break;
                    }
                    ray = si.spawn_ray(ray.dir);
                    continue;
                }
            };
            null_crossings = 0;

            if !self.continues_after(depth) {
                break;
            }

            // Sample illumination from lights to find path contribution
            // But skip for perfectly specular BSDFs
            if !bsdf.is_specular() {
                path_radiance += throughput * uniform_sample_one_light(&si, &bsdf, scene, sampler);
            }

            // Sample BSDF to get new path direction
            let scatter = match bsdf.sample_f(si.wo, sampler.get_2d()) {
                Some(scatter) => scatter,
                None => break,
            };
            throughput *= scatter.f * abs_dot(scatter.wi, si.shading_n.0) / scatter.pdf;
            specular_bounce = scatter.is_specular();
            prev_pdf = scatter.pdf;
            prev_hit = Some(si.hit);
            ray = si.spawn_ray(scatter.wi);
            depth += 1;

            if throughput.is_black() {
                break;
            }

            // Possibly terminate the path with Russian roulette
            if depth >= self.rr_depth {
                let q = Float::max(0.05, 1.0 - throughput.max_component_value());
                if sampler.get_1d() < q {
                    break;
                }
                throughput /= 1.0 - q;
            }
        }

        RadianceSample { radiance: path_radiance, alpha }
    }
}
