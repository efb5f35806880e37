use crate::integrator::{bsdf_sampled_emission_weight, intersect_skipping_null, uniform_sample_one_light, Integrator, RadianceSample};
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Float, Ray, abs_dot};

/// Direct illumination only: one emitter sample and one BSDF sample per camera ray,
/// combined with multiple importance sampling.
#[derive(Debug, Clone, Default)]
pub struct DirectLightingIntegrator {
    hide_emitters: bool,
}

impl DirectLightingIntegrator {
    pub fn new(hide_emitters: bool) -> Self {
        Self { hide_emitters }
    }
}

impl Integrator for DirectLightingIntegrator {
    fn incident_radiance(&self, ray: Ray, scene: &Scene, sampler: &mut dyn Sampler) -> RadianceSample {
        let mut ray = ray;
        let env_alpha: Float = if scene.has_environment() && !self.hide_emitters { 1.0 } else { 0.0 };

        let si = match intersect_skipping_null(scene, &mut ray) {
            Some(si) => si,
            None => {
                let radiance = if self.hide_emitters {
                    Spectrum::uniform(0.0)
                } else {
                    scene.environment_emitted_radiance(&ray)
                };
                return RadianceSample { radiance, alpha: env_alpha };
            }
        };

        let mut radiance = Spectrum::uniform(0.0);

        // Add emitted light if ray hit an area light source.
        if !self.hide_emitters {
            radiance += si.emitted_radiance(si.wo);
        }

        let bsdf = match si.bsdf() {
            Some(bsdf) => bsdf,
            None => return RadianceSample { radiance, alpha: 1.0 },
        };

        if !bsdf.is_specular() {
            radiance += uniform_sample_one_light(&si, &bsdf, scene, sampler);
        }

        if let Some(scatter) = bsdf.sample_f(si.wo, sampler.get_2d()) {
            let weight = scatter.f * abs_dot(scatter.wi, si.shading_n.0) / scatter.pdf;
            let mut bounce = si.spawn_ray(scatter.wi);
            match intersect_skipping_null(scene, &mut bounce) {
                Some(light_si) if light_si.is_emitter() => {
                    let mis = if scatter.is_specular() {
                        1.0
                    } else {
                        bsdf_sampled_emission_weight(scene, &si.hit, scatter.pdf, &light_si)
                    };
                    radiance += weight * light_si.emitted_radiance(light_si.wo) * mis;
                }
                Some(_) => {}
                None => {
                    radiance += weight * scene.environment_emitted_radiance(&bounce);
                }
            }
        }

        RadianceSample { radiance, alpha: 1.0 }
    }
}
