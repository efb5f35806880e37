//! Individual lobes of the Disney principled BRDF, each usable as a material on its own.

use crate::{Float, Vec3f};
use crate::spectrum::Spectrum;
use crate::fresnel::FresnelSchlick;
use crate::reflection::{cos_theta, BxDFType, DefaultSampleF, MicrofacetReflection};
use crate::reflection::microfacet::TrowbridgeReitzDistribution;
use cgmath::InnerSpace;

fn schlick_weight(cos: Float) -> Float {
    let m = (1.0 - cos).clamp(0.0, 1.0);
    (m * m) * (m * m) * m
}

/// Burley's diffuse term with grazing retro-reflection controlled by `roughness`.
#[derive(Debug)]
pub struct DisneyDiffuse {
    base_color: Spectrum,
    roughness: Float,
}

impl DisneyDiffuse {
    pub fn new(base_color: Spectrum, roughness: Float) -> Self {
        Self { base_color, roughness }
    }
}

impl DefaultSampleF for DisneyDiffuse {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::DIFFUSE
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        let (cos_o, cos_i) = (cos_theta(wo), cos_theta(wi));
        if cos_o <= 0.0 || cos_i <= 0.0 {
            return Spectrum::uniform(0.0);
        }
        let wh = (wi + wo).normalize();
        let cos_d = wi.dot(wh);
        let fd90 = 0.5 + 2.0 * self.roughness * cos_d * cos_d;
        let fl = 1.0 + (fd90 - 1.0) * schlick_weight(cos_i);
        let fv = 1.0 + (fd90 - 1.0) * schlick_weight(cos_o);
        self.base_color * crate::consts::INV_PI * fl * fv
    }
}

/// Grazing-angle sheen, tinted towards the hue of the base colour by `tint`.
#[derive(Debug)]
pub struct DisneySheen {
    sheen_color: Spectrum,
}

impl DisneySheen {
    pub fn new(base_color: Spectrum, tint: Float) -> Self {
        let lum = base_color.luminance();
        let c_tint = if lum > 0.0 { base_color / lum } else { Spectrum::uniform(1.0) };
        Self { sheen_color: Spectrum::lerp(tint, Spectrum::uniform(1.0), c_tint) }
    }
}

impl DefaultSampleF for DisneySheen {
    fn get_type(&self) -> BxDFType {
        BxDFType::REFLECTION | BxDFType::DIFFUSE
    }

    fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return Spectrum::uniform(0.0);
        }
        let wh = (wi + wo).normalize();
        self.sheen_color * schlick_weight(wi.dot(wh).abs())
    }
}

pub type DisneyMetallic = MicrofacetReflection<TrowbridgeReitzDistribution, FresnelSchlick>;

/// Anisotropic GGX reflection whose Fresnel term is tinted by `base_color`.
pub fn disney_metallic(base_color: Spectrum, roughness: Float, anisotropic: Float) -> DisneyMetallic {
    let aspect = Float::sqrt(1.0 - 0.9 * anisotropic.clamp(0.0, 1.0));
    let r2 = roughness * roughness;
    let alpha_x = Float::max(1.0e-4, r2 / aspect);
    let alpha_y = Float::max(1.0e-4, r2 * aspect);
    MicrofacetReflection::new(
        Spectrum::uniform(1.0),
        TrowbridgeReitzDistribution::new(alpha_x, alpha_y),
        FresnelSchlick::new(base_color),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::BxDF;
    use crate::Point2f;
    use approx::assert_relative_eq;

    #[test]
    fn test_diffuse_at_normal_incidence() {
        // with both directions along the normal the Fresnel factors vanish
        let bxdf = DisneyDiffuse::new(Spectrum::uniform(1.0), 0.25);
        let n = Vec3f::new(0.0, 0.0, 1.0);
        assert_relative_eq!(BxDF::f(&bxdf, n, n)[0], crate::consts::INV_PI, epsilon = 1e-6);
    }

    #[test]
    fn test_diffuse_retro_reflection_grows_with_roughness() {
        let wo = Vec3f::new(0.95, 0.0, 0.3122).normalize();
        let smooth = DisneyDiffuse::new(Spectrum::uniform(1.0), 0.0);
        let rough = DisneyDiffuse::new(Spectrum::uniform(1.0), 1.0);
        assert!(BxDF::f(&rough, wo, wo)[0] > BxDF::f(&smooth, wo, wo)[0]);
    }

    #[test]
    fn test_sheen_vanishes_head_on() {
        let bxdf = DisneySheen::new(Spectrum::rgb(0.8, 0.2, 0.2), 0.5);
        let n = Vec3f::new(0.0, 0.0, 1.0);
        assert!(BxDF::f(&bxdf, n, n).is_black());

        let wo = Vec3f::new(0.0, 0.99, 0.141).normalize();
        let wi = Vec3f::new(0.0, -0.99, 0.141).normalize();
        let grazing = BxDF::f(&bxdf, wo, wi);
        // tinted towards red
        assert!(grazing[0] > grazing[1]);
    }

    #[test]
    fn test_metallic_alpha_respects_anisotropy() {
        let iso = disney_metallic(Spectrum::uniform(0.9), 0.5, 0.0);
        assert_eq!(iso.distribution.alpha(), (0.25, 0.25));

        let aniso = disney_metallic(Spectrum::uniform(0.9), 0.5, 0.8);
        let (ax, ay) = aniso.distribution.alpha();
        assert!(ax > ay);

        let sharp = disney_metallic(Spectrum::uniform(0.9), 0.0, 0.0);
        assert_eq!(sharp.distribution.alpha(), (1.0e-4, 1.0e-4));

        let wo = Vec3f::new(0.0, 0.3, 0.95).normalize();
        let s = aniso.sample_f(wo, Point2f::new(0.3, 0.6)).expect("sample");
        assert!(s.wi.z > 0.0);
    }
}
