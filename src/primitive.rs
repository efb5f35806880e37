use crate::{Bounds3f, Ray, SurfaceInteraction};
use crate::light::diffuse::DiffuseAreaLight;
use crate::reflection::BxDF;
use crate::shapes::Shape;
use std::sync::Arc;

/// A shape bound to its material and, for emitters, its area light.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub shape: Arc<dyn Shape>,
    /// `None` marks an index-matched boundary with no scattering.
    pub bsdf: Option<Arc<dyn BxDF>>,
    pub area_light: Option<Arc<DiffuseAreaLight>>,
}

impl Primitive {
    pub fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    /// Intersects the shape, shortening `ray.t_max` to the hit distance on success.
    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'_>> {
        let (t_hit, mut isect) = self.shape.intersect(ray)?;
        ray.t_max = t_hit;
        isect.primitive = Some(self);
        Some(isect)
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        self.shape.intersect_test(ray)
    }
}
