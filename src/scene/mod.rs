use crate::bvh::{BVH, SplitMethod};
use crate::{SurfaceInteraction, Ray, Bounds3f};
use crate::camera::Camera;
use crate::film::Film;
use crate::integrator::Integrator;
use crate::light::Light;
use crate::primitive::Primitive;
use crate::sampler::Sampler;
use crate::spectrum::Spectrum;
use crate::variant::Variant;
use std::sync::Arc;

/// A fully built scene: geometry, emitters and the sensor setup used to render it.
pub struct Scene {
    primitives_aggregate: BVH,

    /// Every emitter in the scene.
    pub lights: Vec<Arc<dyn Light>>,

    /// Emitters sampled by next event estimation: area and delta lights.
    pub nee_lights: Vec<Arc<dyn Light>>,

    /// Emitters reached only by escaping rays.
    pub infinite_lights: Vec<Arc<dyn Light>>,

    pub camera: Box<dyn Camera>,
    pub film: Film,
    pub sampler: Box<dyn Sampler>,
    pub integrator: Box<dyn Integrator>,

    /// The execution variant this scene was loaded for.
    pub variant: Variant,
}

impl Scene {
    pub fn new(
        primitives: Vec<Primitive>,
        lights: Vec<Arc<dyn Light>>,
        camera: Box<dyn Camera>,
        film: Film,
        sampler: Box<dyn Sampler>,
        integrator: Box<dyn Integrator>,
        variant: Variant,
    ) -> Self {
        let primitives_aggregate = BVH::build(primitives, SplitMethod::SAH);

        let (infinite_lights, nee_lights): (Vec<_>, Vec<_>) = lights.iter()
            .cloned()
            .partition(|light| light.flags() == crate::light::LightFlags::Infinite);

        Self {
            primitives_aggregate,
            lights,
            nee_lights,
            infinite_lights,
            camera,
            film,
            sampler,
            integrator,
            variant,
        }
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'_>> {
        self.primitives_aggregate.intersect(ray)
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        self.primitives_aggregate.intersect_test(ray)
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.primitives_aggregate.world_bound()
    }

    pub fn primitives(&self) -> &[Primitive] {
        self.primitives_aggregate.primitives()
    }

    pub fn has_environment(&self) -> bool {
        !self.infinite_lights.is_empty()
    }

    /// Radiance reaching an escaped ray from every environment emitter.
    pub fn environment_emitted_radiance(&self, ray: &Ray) -> Spectrum {
        self.infinite_lights.iter()
            .map(|light| light.environment_emitted_radiance(ray))
            .sum()
    }
}
