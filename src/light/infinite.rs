use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Ray, Vec3f};
use crate::light::{Light, LiSample, LightFlags, VisibilityTester};
use crate::interaction::SurfaceHit;
use crate::sampling::{uniform_sample_sphere, uniform_sphere_pdf};

/// Environment emitter of constant radiance in every direction.
#[derive(Debug, Clone)]
pub struct ConstantLight {
    radiance: Spectrum,
}

impl ConstantLight {
    pub fn new(radiance: Spectrum) -> Self {
        Self { radiance }
    }
}

impl Light for ConstantLight {
    fn flags(&self) -> LightFlags {
        LightFlags::Infinite
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> Option<LiSample> {
        let wi = uniform_sample_sphere(u);
        Some(LiSample {
            radiance: self.radiance,
            wi,
            pdf: uniform_sphere_pdf(),
            vis: VisibilityTester::towards(reference, wi),
        })
    }

    fn pdf_incident_radiance(&self, _reference: &SurfaceHit, _wi: Vec3f) -> Float {
        uniform_sphere_pdf()
    }

    fn environment_emitted_radiance(&self, _ray: &Ray) -> Spectrum {
        self.radiance
    }
}
