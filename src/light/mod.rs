use crate::{Point2f, Point3f, Ray, Vec3f, Float};
use crate::interaction::SurfaceHit;
use crate::spectrum::Spectrum;
use crate::scene::Scene;
use std::fmt::Debug;

pub mod point;
pub mod distant;
pub mod infinite;
pub mod diffuse;

pub use diffuse::DiffuseAreaLight;
pub use distant::DistantLight;
pub use infinite::ConstantLight;
pub use point::PointLight;

pub trait Light: Sync + Send + Debug {
    fn flags(&self) -> LightFlags;

    /// Samples a direction towards the light from `reference`. Returns `None` when the
    /// light cannot contribute there.
    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> Option<LiSample>;

    /// The probability density with respect to solid angle for the light's
    /// `sample_incident_radiance` method to sample the direction `wi` from the reference
    /// point `reference`. Zero for delta lights.
    fn pdf_incident_radiance(&self, reference: &SurfaceHit, wi: Vec3f) -> Float;

    /// Radiance carried by a ray that escapes the scene.
    fn environment_emitted_radiance(&self, _ray: &Ray) -> Spectrum { Spectrum::uniform(0.0) }
}

#[derive(Debug, Clone, Copy)]
pub struct LiSample {
    pub radiance: Spectrum,

    /// The direction *towards* the illumination
    pub wi: Vec3f,

    pub pdf: Float,

    pub vis: VisibilityTester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightFlags {
    DeltaPosition, DeltaDirection, Area, Infinite
}

impl LightFlags {
    pub fn is_delta_light(&self) -> bool {
        matches!(self, LightFlags::DeltaDirection | LightFlags::DeltaPosition)
    }
}

/// The shadow ray that must be unobstructed for a light sample to contribute.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityTester {
    ray: Ray,
}

impl VisibilityTester {
    /// Between two surface points.
    pub fn between(p0: &SurfaceHit, p1: SurfaceHit) -> Self {
        Self { ray: p0.spawn_ray_to_hit(p1) }
    }

    /// Towards a point that lies on no surface.
    pub fn to_point(p0: &SurfaceHit, p: Point3f) -> Self {
        Self { ray: p0.spawn_ray_to_point(p) }
    }

    /// Towards infinity along `dir`.
    pub fn towards(p0: &SurfaceHit, dir: Vec3f) -> Self {
        Self { ray: p0.spawn_ray(dir) }
    }

    pub fn unoccluded(&self, scene: &Scene) -> bool {
        !scene.intersect_test(&self.ray)
    }
}
