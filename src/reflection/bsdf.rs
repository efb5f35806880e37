use crate::{Float, Normal3, Vec3f, Point2f};
use crate::reflection::{BxDF, BxDFType, ScatterSample};
use crate::interaction::SurfaceInteraction;
use cgmath::InnerSpace;
use crate::spectrum::Spectrum;

/// A BxDF placed at a surface point: converts between world space and the local
/// shading frame and rejects light leaking through the geometric surface.
#[derive(Debug, Clone, Copy)]
pub struct Bsdf<'a> {

    /// Shading normal
    ns: Normal3,

    /// Geometry normal
    ng: Normal3,

    /// s orthonormal basis vector with the shading normal
    ss: Vec3f,

    /// t orthonormal basis vector with the shading normal
    ts: Vec3f,

    bxdf: &'a dyn BxDF,
}

impl<'a> Bsdf<'a> {

    pub fn new(si: &SurfaceInteraction, bxdf: &'a dyn BxDF) -> Self {
        let ns = si.shading_n;
        let ng = si.hit.n;
        let ss = si.tangent();
        let ts = ns.cross(ss);

        Self { ns, ng, ss, ts, bxdf }
    }

    pub fn flags(&self) -> BxDFType {
        self.bxdf.get_type()
    }

    pub fn is_specular(&self) -> bool {
        self.flags().contains(BxDFType::SPECULAR)
    }

    pub fn world_to_local(&self, v: Vec3f) -> Vec3f {
        Vec3f::new(v.dot(self.ss), v.dot(self.ts), v.dot(self.ns.0))
    }

    pub fn local_to_world(&self, v: Vec3f) -> Vec3f {
        let x = self.ss.x * v.x + self.ts.x * v.y + self.ns.x * v.z;
        let y = self.ss.y * v.x + self.ts.y * v.y + self.ns.y * v.z;
        let z = self.ss.z * v.x + self.ts.z * v.y + self.ns.z * v.z;
        Vec3f::new(x, y, z)
    }

    fn accepts(&self, wo_world: Vec3f, wi_world: Vec3f) -> bool {
        let reflect = wi_world.dot(self.ng.0) * wo_world.dot(self.ng.0) > 0.0;
        let ty = self.flags();
        (reflect && ty.contains(BxDFType::REFLECTION)) || (!reflect && ty.contains(BxDFType::TRANSMISSION))
    }

    pub fn f(&self, wo_world: Vec3f, wi_world: Vec3f) -> Spectrum {
        let wi = self.world_to_local(wi_world);
        let wo = self.world_to_local(wo_world);
        if wo.z == 0.0 || !self.accepts(wo_world, wi_world) {
            return Spectrum::uniform(0.0)
        }
        self.bxdf.f(wo, wi)
    }

    /// Samples an incident direction, returned in world space.
    pub fn sample_f(&self, wo_world: Vec3f, u: Point2f) -> Option<ScatterSample> {
        let wo = self.world_to_local(wo_world);
        if wo.z == 0.0 {
            return None;
        }
        let sample = self.bxdf.sample_f(wo, u)?;
        if sample.pdf == 0.0 || sample.f.is_black() {
            return None;
        }
        let wi_world = self.local_to_world(sample.wi);
        if !sample.is_specular() && !self.accepts(wo_world, wi_world) {
            return None;
        }
        Some(ScatterSample { wi: wi_world, ..sample })
    }

    pub fn pdf(&self, wo_world: Vec3f, wi_world: Vec3f) -> Float {
        let wi = self.world_to_local(wi_world);
        let wo = self.world_to_local(wo_world);
        if wo.z == 0.0 {
            return 0.0;
        }
        self.bxdf.pdf(wo, wi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::LambertianReflection;
    use crate::{Point3f, Normal3};
    use cgmath::assert_abs_diff_eq;

    fn tilted_interaction() -> SurfaceInteraction<'static> {
        let n = Normal3::new(0.0, 1.0, 1.0).normalize();
        SurfaceInteraction::new(
            Point3f::new(0.0, 0.0, 0.0),
            Point2f::new(0.0, 0.0),
            Vec3f::new(0.0, 0.0, 1.0),
            n,
            Vec3f::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_frame_round_trip() {
        let si = tilted_interaction();
        let lambert = LambertianReflection::new(Spectrum::uniform(0.5));
        let bsdf = Bsdf::new(&si, &lambert);

        let v = Vec3f::new(0.3, -0.2, 0.9);
        assert_abs_diff_eq!(bsdf.local_to_world(bsdf.world_to_local(v)), v, epsilon = 1e-5);
        assert_abs_diff_eq!(bsdf.world_to_local(si.shading_n.0), Vec3f::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_reflection_only_lobe_rejects_transmission() {
        let si = tilted_interaction();
        let lambert = LambertianReflection::new(Spectrum::uniform(0.5));
        let bsdf = Bsdf::new(&si, &lambert);

        let wo = Vec3f::new(0.0, 0.0, 1.0);
        assert!(!bsdf.f(wo, Vec3f::new(0.0, 1.0, 0.0)).is_black());
        assert!(bsdf.f(wo, Vec3f::new(0.0, -1.0, -0.5).normalize()).is_black());

        let s = bsdf.sample_f(wo, Point2f::new(0.4, 0.4)).expect("sample");
        assert!(s.wi.dot(si.hit.n.0) > 0.0);
        assert_abs_diff_eq!(s.pdf, bsdf.pdf(wo, s.wi), epsilon = 1e-5);
    }
}
