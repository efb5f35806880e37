use bitflags::bitflags;
use crate::{Vec3f, Point2f, Float, Normal3};
use crate::spectrum::Spectrum;
use crate::fresnel::{Fresnel, fresnel_dielectric};
use crate::reflection::microfacet::MicrofacetDistribution;
use crate::sampling::{cosine_sample_hemisphere, cosine_hemisphere_pdf};
use cgmath::InnerSpace;
use std::fmt::Debug;
use std::sync::Arc;

pub mod bsdf;
pub mod disney;
pub mod microfacet;

pub use bsdf::Bsdf;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BxDFType: u8 {
        const REFLECTION = 1;
        const TRANSMISSION = 1 << 1;
        const DIFFUSE = 1 << 2;
        const GLOSSY = 1 << 3;
        const SPECULAR = 1 << 4;
    }
}

pub(crate) fn cos_theta(w: Vec3f) -> Float { w.z }
pub(crate) fn cos2_theta(w: Vec3f) -> Float { w.z * w.z }
pub(crate) fn abs_cos_theta(w: Vec3f) -> Float { w.z.abs() }

pub(crate) fn sin2_theta(w: Vec3f) -> Float {
    Float::max(0.0, 1.0 - cos2_theta(w))
}

pub(crate) fn sin_theta(w: Vec3f) -> Float {
    sin2_theta(w).sqrt()
}

pub(crate) fn tan_theta(w: Vec3f) -> Float {
    sin_theta(w) / cos_theta(w)
}

pub(crate) fn tan2_theta(w: Vec3f) -> Float {
    sin2_theta(w) / cos2_theta(w)
}

pub(crate) fn cos_phi(w: Vec3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        1.0
    } else {
        (w.x / sin_theta).clamp(-1.0, 1.0)
    }
}

pub(crate) fn sin_phi(w: Vec3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        (w.y / sin_theta).clamp(-1.0, 1.0)
    }
}

pub(crate) fn cos2_phi(w: Vec3f) -> Float {
    cos_phi(w) * cos_phi(w)
}

pub(crate) fn sin2_phi(w: Vec3f) -> Float {
    sin_phi(w) * sin_phi(w)
}

/// Refracts `wi` (pointing away from the surface) through the interface with normal `n`,
/// where `eta` is the ratio of the incident to the transmitted index of refraction.
pub fn refract(wi: Vec3f, n: Normal3, eta: Float) -> Option<Vec3f> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = Float::max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 { return None }
    let cos_theta_t = Float::sqrt(1.0 - sin2_theta_t);
    let wt = eta * -wi + (eta * cos_theta_i - cos_theta_t) * n.0;
    Some(wt)
}

pub fn reflect(wo: Vec3f, n: Vec3f) -> Vec3f {
    -wo + 2.0 * wo.dot(n) * n
}

pub fn same_hemisphere(v1: Vec3f, v2: Vec3f) -> bool {
    v1.z * v2.z > 0.0
}

fn flip_z(w: Vec3f) -> Vec3f {
    Vec3f::new(w.x, w.y, -w.z)
}

#[derive(Clone, Copy, Debug)]
pub struct ScatterSample {
    pub f: Spectrum,
    pub wi: Vec3f,
    pub pdf: Float,
    pub sampled_type: BxDFType
}

impl ScatterSample {
    pub fn is_specular(&self) -> bool {
        self.sampled_type.contains(BxDFType::SPECULAR)
    }
}

/// A scattering function expressed in the local shading frame, where the normal is +z.
/// Lobes are one-sided unless stated otherwise: they only scatter light when both
/// directions lie above the surface.
pub trait BxDF: Send + Sync + Debug {

    fn matches_flags(&self, t: BxDFType) -> bool {
        t.contains(self.get_type())
    }

    fn get_type(&self) -> BxDFType;

    /// Returns the value of the distribution function for the given pair of directions.
    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum;

    /// Samples an incident direction for the outgoing direction `wo`. Specular lobes report
    /// the discrete probability of the chosen event as the pdf.
    fn sample_f(&self, wo: Vec3f, sample: Point2f) -> Option<ScatterSample>;

    fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float;

}

/// Lobes that are importance sampled with a cosine-weighted hemisphere.
pub trait DefaultSampleF: Send + Sync + Debug {
    fn get_type(&self) -> BxDFType;

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum;
}

impl<T> BxDF for T where T: DefaultSampleF {
    fn get_type(&self) -> BxDFType {
        <Self as DefaultSampleF>::get_type(self)
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        <Self as DefaultSampleF>::f(self, wo, wi)
    }

    fn sample_f(&self, wo: Vec3f, sample: Point2f) -> Option<ScatterSample> {
        if cos_theta(wo) <= 0.0 {
            return None;
        }
        let wi = cosine_sample_hemisphere(sample);
        let pdf = BxDF::pdf(self, wo, wi);
        if pdf == 0.0 {
            return None;
        }
        let f = BxDF::f(self, wo, wi);
        Some(ScatterSample { f, wi, pdf, sampled_type: BxDF::get_type(self) })
    }

    fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        if cos_theta(wo) > 0.0 && cos_theta(wi) > 0.0 {
            cosine_hemisphere_pdf(cos_theta(wi))
        } else {
            0.0
        }
    }
}

#[derive(Debug)]
pub struct LambertianReflection {
    pub r: Spectrum,
}

impl LambertianReflection {
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }
}

impl DefaultSampleF for LambertianReflection {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::DIFFUSE
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return Spectrum::uniform(0.0);
        }
        self.r * crate::consts::INV_PI
    }
}

/// Perfect mirror reflection, scaled by a Fresnel term.
#[derive(Debug)]
pub struct SpecularReflection<F: Fresnel> {
    r: Spectrum,
    fresnel: F
}

impl<F: Fresnel> SpecularReflection<F> {
    pub fn new(r: Spectrum, fresnel: F) -> Self {
        Self {r, fresnel}
    }
}

impl<F: Fresnel> BxDF for SpecularReflection<F> {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::SPECULAR
    }

    fn f(&self, _wo: Vec3f, _wi: Vec3f) -> Spectrum {
        Spectrum::uniform(0.0)
    }

    fn sample_f(&self, wo: Vec3f, _sample: Point2f) -> Option<ScatterSample> {
        if cos_theta(wo) <= 0.0 {
            return None;
        }
        let wi = Vec3f::new(-wo.x, -wo.y, wo.z);
        let reflected = self.fresnel.evaluate(cos_theta(wi)) * self.r / abs_cos_theta(wi);
        Some(ScatterSample { f: reflected, wi, pdf: 1.0, sampled_type: self.get_type() })
    }

    fn pdf(&self, _wo: Vec3f, _wi: Vec3f) -> Float {
        0.0
    }
}

/// Smooth dielectric interface that picks between specular reflection and refraction in
/// proportion to the Fresnel reflectance. Both sides of the surface scatter.
#[derive(Debug)]
pub struct FresnelSpecular {
    r: Spectrum,
    t: Spectrum,
    /// index of refraction on the side the normal points to
    eta_a: Float,
    /// index of refraction behind the surface
    eta_b: Float,
}

impl FresnelSpecular {
    pub fn new(r: Spectrum, t: Spectrum, eta_a: Float, eta_b: Float) -> Self {
        Self { r, t, eta_a, eta_b }
    }
}

impl BxDF for FresnelSpecular {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::TRANSMISSION | BxDFType::SPECULAR
    }

    fn f(&self, _wo: Vec3f, _wi: Vec3f) -> Spectrum {
        Spectrum::uniform(0.0)
    }

    fn sample_f(&self, wo: Vec3f, sample: Point2f) -> Option<ScatterSample> {
        let fr = fresnel_dielectric(cos_theta(wo), self.eta_a, self.eta_b);
        if sample[0] < fr {
            let wi = Vec3f::new(-wo.x, -wo.y, wo.z);
            Some(ScatterSample {
                f: fr * self.r / abs_cos_theta(wi),
                wi,
                pdf: fr,
                sampled_type: BxDFType::REFLECTION | BxDFType::SPECULAR,
            })
        } else {
            let entering = cos_theta(wo) > 0.0;
            let (eta_i, eta_t) = if entering { (self.eta_a, self.eta_b) } else { (self.eta_b, self.eta_a) };
            let wi = refract(wo, Normal3::new(0.0, 0.0, 1.0).faceforward(wo), eta_i / eta_t)?;

            // radiance is compressed into the smaller solid angle on the denser side
            let ft = self.t * (1.0 - fr) * sq!(eta_i / eta_t);
            Some(ScatterSample {
                f: ft / abs_cos_theta(wi),
                wi,
                pdf: 1.0 - fr,
                sampled_type: BxDFType::TRANSMISSION | BxDFType::SPECULAR,
            })
        }
    }

    fn pdf(&self, _wo: Vec3f, _wi: Vec3f) -> Float {
        0.0
    }
}

/// Makes a one-sided lobe scatter identically from both sides of the surface.
#[derive(Debug)]
pub struct TwoSided {
    inner: Arc<dyn BxDF>,
}

impl TwoSided {
    pub fn new(inner: Arc<dyn BxDF>) -> Self {
        Self { inner }
    }
}

impl BxDF for TwoSided {
    fn get_type(&self) -> BxDFType {
        self.inner.get_type()
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        if cos_theta(wo) < 0.0 {
            self.inner.f(flip_z(wo), flip_z(wi))
        } else {
            self.inner.f(wo, wi)
        }
    }

    fn sample_f(&self, wo: Vec3f, sample: Point2f) -> Option<ScatterSample> {
        if cos_theta(wo) < 0.0 {
            let mut s = self.inner.sample_f(flip_z(wo), sample)?;
            s.wi = flip_z(s.wi);
            Some(s)
        } else {
            self.inner.sample_f(wo, sample)
        }
    }

    fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        if cos_theta(wo) < 0.0 {
            self.inner.pdf(flip_z(wo), flip_z(wi))
        } else {
            self.inner.pdf(wo, wi)
        }
    }
}

/// A general microfacet-based BRDF using the Torrance-Sparrow model.
#[derive(Debug)]
pub struct MicrofacetReflection<D: MicrofacetDistribution, F: Fresnel> {
    pub r: Spectrum,
    pub distribution: D,
    pub fresnel: F,
}

impl<D: MicrofacetDistribution, F: Fresnel> MicrofacetReflection<D, F> {
    pub fn new(r: Spectrum, distribution: D, fresnel: F) -> Self {
        MicrofacetReflection { r, distribution, fresnel }
    }
}

impl<D: MicrofacetDistribution, F: Fresnel> BxDF for MicrofacetReflection<D, F> {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::GLOSSY
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        let cos_theta_o = cos_theta(wo);
        let cos_theta_i = cos_theta(wi);
        if cos_theta_i <= 0.0 || cos_theta_o <= 0.0 {
            return Spectrum::uniform(0.0)
        }
        let wh = wi + wo;
        if wh == Vec3f::new(0.0, 0.0, 0.0) {
            return Spectrum::uniform(0.0)
        }
        let wh = wh.normalize();

        let f = self.fresnel.evaluate(wi.dot(wh));

        self.r * self.distribution.d(wh) * self.distribution.g(wo, wi) * f
            / (4.0 * cos_theta_i * cos_theta_o)
    }

    fn sample_f(&self, wo: Vec3f, sample: Point2f) -> Option<ScatterSample> {
        if cos_theta(wo) <= 0.0 {
            return None;
        }
        let wh = self.distribution.sample_wh(wo, sample);
        let wi = reflect(wo, wh);
        if cos_theta(wi) <= 0.0 {
            return None;
        }

        let pdf = self.distribution.pdf(wo, wh) / (4.0 * wo.dot(wh).abs());
        if pdf == 0.0 || !pdf.is_finite() {
            return None;
        }
        Some(ScatterSample {
            f: self.f(wo, wi),
            wi,
            pdf,
            sampled_type: self.get_type()
        })
    }

    fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return 0.0
        }
        let wh = (wo + wi).normalize();
        self.distribution.pdf(wo, wh) / (4.0 * wo.dot(wh).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fresnel::{FresnelConductor, FresnelNoOp};
    use crate::reflection::microfacet::{BeckmannDistribution, TrowbridgeReitzDistribution};
    use approx::assert_relative_eq;

    fn assert_spectrum_eq(a: Spectrum, b: Spectrum) {
        for c in 0..3 {
            assert_relative_eq!(a[c], b[c], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_lambertian_sample_weight_is_albedo() {
        let albedo = Spectrum::rgb(0.2, 0.4, 0.8);
        let bxdf = LambertianReflection::new(albedo);
        let wo = Vec3f::new(0.3, 0.1, 0.9).normalize();
        for &(u, v) in &[(0.1, 0.2), (0.5, 0.5), (0.9, 0.7), (0.33, 0.01)] {
            let s = bxdf.sample_f(wo, Point2f::new(u, v)).expect("sample");
            assert_relative_eq!(s.pdf, bxdf.pdf(wo, s.wi), epsilon = 1e-6);
            assert_spectrum_eq(s.f * abs_cos_theta(s.wi) / s.pdf, albedo);
        }
    }

    #[test]
    fn test_lambertian_is_one_sided() {
        let bxdf = LambertianReflection::new(Spectrum::uniform(0.5));
        let up = Vec3f::new(0.0, 0.0, 1.0);
        let down = Vec3f::new(0.0, 0.0, -1.0);
        assert!(BxDF::f(&bxdf, down, up).is_black());
        assert!(BxDF::f(&bxdf, up, down).is_black());
        assert!(bxdf.sample_f(down, Point2f::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_two_sided_mirrors_the_back_face() {
        let bxdf = TwoSided::new(Arc::new(LambertianReflection::new(Spectrum::uniform(0.5))));
        let wo = Vec3f::new(0.0, 0.6, -0.8);
        let wi = Vec3f::new(0.6, 0.0, -0.8);
        assert_spectrum_eq(bxdf.f(wo, wi), Spectrum::uniform(0.5 * crate::consts::INV_PI));

        let s = bxdf.sample_f(wo, Point2f::new(0.25, 0.75)).expect("sample");
        assert!(s.wi.z < 0.0);
    }

    #[test]
    fn test_perfect_mirror() {
        let bxdf = SpecularReflection::new(Spectrum::uniform(1.0), FresnelNoOp);
        let wo = Vec3f::new(0.6, 0.0, 0.8);
        let s = bxdf.sample_f(wo, Point2f::new(0.5, 0.5)).expect("sample");
        assert!(s.is_specular());
        assert_relative_eq!(s.wi.x, -0.6);
        assert_relative_eq!(s.wi.z, 0.8);
        assert_spectrum_eq(s.f * abs_cos_theta(s.wi) / s.pdf, Spectrum::uniform(1.0));
    }

    #[test]
    fn test_gold_reflects_more_red_than_blue() {
        let gold = FresnelConductor::new(
            Spectrum::uniform(1.0),
            Spectrum::rgb(0.143, 0.374, 1.442),
            Spectrum::rgb(3.983, 2.385, 1.603),
        );
        let bxdf = SpecularReflection::new(Spectrum::uniform(1.0), gold);
        let s = bxdf.sample_f(Vec3f::new(0.0, 0.0, 1.0), Point2f::new(0.5, 0.5)).expect("sample");
        assert!(s.f[0] > s.f[2]);
    }

    #[test]
    fn test_dielectric_refracts_at_normal_incidence() {
        let bxdf = FresnelSpecular::new(Spectrum::uniform(1.0), Spectrum::uniform(1.0), 1.0, 1.5);
        let wo = Vec3f::new(0.0, 0.0, 1.0);

        let reflected = bxdf.sample_f(wo, Point2f::new(0.01, 0.5)).expect("reflection");
        assert_relative_eq!(reflected.pdf, 0.04, epsilon = 1e-5);
        assert_relative_eq!(reflected.wi.z, 1.0);

        let refracted = bxdf.sample_f(wo, Point2f::new(0.5, 0.5)).expect("refraction");
        assert!(refracted.sampled_type.contains(BxDFType::TRANSMISSION));
        assert_relative_eq!(refracted.wi.z, -1.0, epsilon = 1e-6);
        // entering the denser medium scales radiance by (1 / 1.5)^2
        let weight = refracted.f[0] * abs_cos_theta(refracted.wi) / refracted.pdf;
        assert_relative_eq!(weight, 1.0 / 2.25, epsilon = 1e-5);
    }

    #[test]
    fn test_microfacet_sample_pdf_matches_pdf() {
        let lobes: Vec<Box<dyn BxDF>> = vec![
            Box::new(MicrofacetReflection::new(Spectrum::uniform(1.0), TrowbridgeReitzDistribution::new(0.3, 0.3), FresnelNoOp)),
            Box::new(MicrofacetReflection::new(Spectrum::uniform(1.0), TrowbridgeReitzDistribution::new(0.1, 0.4), FresnelNoOp)),
            Box::new(MicrofacetReflection::new(Spectrum::uniform(1.0), BeckmannDistribution::new(0.2, 0.2), FresnelNoOp)),
        ];
        let wo = Vec3f::new(0.2, -0.3, 0.9).normalize();
        for bxdf in &lobes {
            for &(u, v) in &[(0.2, 0.3), (0.6, 0.9), (0.45, 0.1)] {
                if let Some(s) = bxdf.sample_f(wo, Point2f::new(u, v)) {
                    assert!(s.wi.z > 0.0);
                    assert_relative_eq!(s.pdf, bxdf.pdf(wo, s.wi), max_relative = 1e-3);
                    assert_spectrum_eq(s.f, bxdf.f(wo, s.wi));
                }
            }
        }
    }
}
