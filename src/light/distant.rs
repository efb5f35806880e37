use crate::spectrum::Spectrum;
use crate::{Vec3f, Float, Point2f};
use crate::light::{Light, LightFlags, LiSample, VisibilityTester};
use crate::interaction::SurfaceHit;
use cgmath::InnerSpace;

/// Light arriving from infinitely far away along a single direction, like the sun.
#[derive(Debug, Clone)]
pub struct DistantLight {
    irradiance: Spectrum,
    /// direction the light travels in
    dir: Vec3f,
}

impl DistantLight {
    pub fn new(irradiance: Spectrum, dir: Vec3f) -> Self {
        Self { irradiance, dir: dir.normalize() }
    }
}

impl Light for DistantLight {
    fn flags(&self) -> LightFlags {
        LightFlags::DeltaDirection
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, _u: Point2f) -> Option<LiSample> {
        let wi = -self.dir;
        Some(LiSample {
            radiance: self.irradiance,
            wi,
            pdf: 1.0,
            vis: VisibilityTester::towards(reference, wi),
        })
    }

    fn pdf_incident_radiance(&self, _reference: &SurfaceHit, _wi: Vec3f) -> Float {
        0.0
    }
}
