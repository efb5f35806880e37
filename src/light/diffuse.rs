use crate::{Float, Point2f, Ray, Vec3f};
use crate::spectrum::Spectrum;
use crate::shapes::Shape;
use crate::light::{Light, LiSample, LightFlags, VisibilityTester};
use crate::interaction::SurfaceHit;
use crate::sampling::Distribution1D;
use cgmath::InnerSpace;
use std::sync::Arc;

/// Uniform emitter attached to one or more shapes, radiating from the side their normals
/// point to. Points are sampled uniformly by area over all shapes.
#[derive(Debug)]
pub struct DiffuseAreaLight {
    emit: Spectrum,
    shapes: Vec<Arc<dyn Shape>>,
    distrib: Distribution1D,
    total_area: Float,
}

impl DiffuseAreaLight {
    pub fn new(emit: Spectrum, shapes: Vec<Arc<dyn Shape>>) -> Self {
        let areas: Vec<Float> = shapes.iter().map(|s| s.area()).collect();
        let total_area = areas.iter().sum();
        Self {
            emit,
            shapes,
            distrib: Distribution1D::new(areas),
            total_area,
        }
    }

    pub fn radiance(&self) -> Spectrum {
        self.emit
    }

    pub fn area(&self) -> Float {
        self.total_area
    }

    /// Given a point on the area light's surface represented by `hit`, evaluate the area light's
    /// emitted radiance `L` in the given outgoing direction `w`.
    pub fn emitted_radiance(&self, hit: &SurfaceHit, w: Vec3f) -> Spectrum {
        if hit.n.dot(w) > 0.0 {
            self.emit
        } else {
            Spectrum::uniform(0.0)
        }
    }

    /// Solid angle density of sampling `light_hit` from `reference`.
    pub fn pdf_at(&self, reference: &SurfaceHit, light_hit: &SurfaceHit) -> Float {
        let d = light_hit.p - reference.p;
        let dist2 = d.magnitude2();
        if dist2 == 0.0 {
            return 0.0;
        }
        let cos = light_hit.n.dot(-d.normalize()).abs();
        if cos == 0.0 {
            return 0.0;
        }
        dist2 / (cos * self.total_area)
    }
}

impl Light for DiffuseAreaLight {
    fn flags(&self) -> LightFlags {
        LightFlags::Area
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> Option<LiSample> {
        if self.shapes.is_empty() || self.total_area <= 0.0 {
            return None;
        }
        let (idx, _, u_remapped) = self.distrib.sample_discrete(u[0]);
        let p_shape = self.shapes[idx].sample(Point2f::new(u_remapped, u[1]));

        let pdf = self.pdf_at(reference, &p_shape);
        if pdf == 0.0 || !pdf.is_finite() {
            return None;
        }
        let wi = (p_shape.p - reference.p).normalize();
        let radiance = self.emitted_radiance(&p_shape, -wi);
        if radiance.is_black() {
            return None;
        }
        Some(LiSample {
            radiance,
            wi,
            pdf,
            vis: VisibilityTester::between(reference, p_shape),
        })
    }

    fn pdf_incident_radiance(&self, reference: &SurfaceHit, wi: Vec3f) -> Float {
        let mut ray: Ray = reference.spawn_ray(wi);
        let mut closest = None;
        for shape in &self.shapes {
            if let Some((t, isect)) = shape.intersect(&ray) {
                ray.t_max = t;
                closest = Some(isect.hit);
            }
        }
        closest.map_or(0.0, |hit| self.pdf_at(reference, &hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{rectangle_mesh, TriangleMesh};
    use crate::{Normal3, Point3f, Transform};
    use approx::assert_relative_eq;

    fn ceiling_light() -> DiffuseAreaLight {
        // 2x2 square at z = 1 facing down
        let to_world = Transform::translate(vec3f!(0, 0, 1));
        let mesh = rectangle_mesh(&to_world, true);
        let shapes: Vec<Arc<dyn Shape>> = TriangleMesh::iter_triangles(&mesh)
            .map(|t| Arc::new(t) as Arc<dyn Shape>)
            .collect();
        DiffuseAreaLight::new(Spectrum::uniform(2.0), shapes)
    }

    #[test]
    fn test_sample_pdf_matches_pdf_incident_radiance() {
        let light = ceiling_light();
        assert_relative_eq!(light.area(), 4.0, epsilon = 1e-5);

        let reference = SurfaceHit::new(Point3f::new(0.1, 0.2, 0.0), Normal3::new(0.0, 0.0, 1.0));
        for &(u, v) in &[(0.1, 0.2), (0.7, 0.4), (0.45, 0.95)] {
            let s = light.sample_incident_radiance(&reference, Point2f::new(u, v)).expect("sample");
            assert_eq!(s.radiance, Spectrum::uniform(2.0));
            assert!(s.wi.z > 0.0);
            assert_relative_eq!(s.pdf, light.pdf_incident_radiance(&reference, s.wi), max_relative = 1e-3);
        }
    }

    #[test]
    fn test_emits_from_front_only() {
        let light = ceiling_light();
        let above = SurfaceHit::new(Point3f::new(0.0, 0.0, 2.0), Normal3::new(0.0, 0.0, -1.0));
        assert!(light.sample_incident_radiance(&above, Point2f::new(0.5, 0.5)).is_none());

        let hit = SurfaceHit::new(Point3f::new(0.0, 0.0, 1.0), Normal3::new(0.0, 0.0, -1.0));
        assert!(light.emitted_radiance(&hit, vec3f!(0, 0, 1)).is_black());
        assert!(!light.emitted_radiance(&hit, vec3f!(0, 0, -1)).is_black());
    }
}
