use crate::{Point3f, Float, Point2f, Vec3f};
use crate::spectrum::Spectrum;
use crate::light::{Light, LightFlags, LiSample, VisibilityTester};
use crate::interaction::SurfaceHit;
use cgmath::InnerSpace;

/// Isotropic point source given by its radiant intensity.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Point3f,
    intensity: Spectrum,
}

impl PointLight {
    pub fn new(position: Point3f, intensity: Spectrum) -> Self {
        Self { position, intensity }
    }
}

impl Light for PointLight {
    fn flags(&self) -> LightFlags {
        LightFlags::DeltaPosition
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, _u: Point2f) -> Option<LiSample> {
        let d = self.position - reference.p;
        let dist2 = d.magnitude2();
        if dist2 == 0.0 {
            return None;
        }
        Some(LiSample {
            radiance: self.intensity / dist2,
            wi: d.normalize(),
            pdf: 1.0,
            vis: VisibilityTester::to_point(reference, self.position),
        })
    }

    fn pdf_incident_radiance(&self, _reference: &SurfaceHit, _wi: Vec3f) -> Float {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Normal3;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_square_falloff() {
        let light = PointLight::new(Point3f::new(0.0, 0.0, 2.0), Spectrum::uniform(8.0));
        let reference = SurfaceHit::new(Point3f::new(0.0, 0.0, 0.0), Normal3::new(0.0, 0.0, 1.0));
        let s = light.sample_incident_radiance(&reference, Point2f::new(0.5, 0.5)).expect("sample");
        assert_relative_eq!(s.radiance[0], 2.0);
        assert_relative_eq!(s.wi.z, 1.0);
        assert!(light.flags().is_delta_light());
    }
}
