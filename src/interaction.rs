use crate::{Float, Point2f, Point3f, Ray, Vec3f, offset_ray_origin};
use crate::geometry::Normal3;
use crate::primitive::Primitive;
use crate::reflection::Bsdf;
use crate::spectrum::Spectrum;
use cgmath::InnerSpace;

/// Fraction of a shadow ray's length left unchecked at its far end so that the ray does
/// not hit the surface it is aimed at.
const SHADOW_EPSILON: Float = 1.0e-4;

/// A point on a surface together with its geometric normal.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub p: Point3f,
    pub n: Normal3,
}

impl SurfaceHit {
    pub fn new(p: Point3f, n: Normal3) -> Self {
        Self { p, n }
    }

    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        let origin = offset_ray_origin(self.p, self.n, dir);
        Ray::new(origin, dir)
    }

    /// Ray towards another surface point, stopping just short of it.
    pub fn spawn_ray_to_hit(&self, other: SurfaceHit) -> Ray {
        let origin = offset_ray_origin(self.p, self.n, other.p - self.p);
        let target = offset_ray_origin(other.p, other.n, origin - other.p);
        Ray { origin, dir: target - origin, t_max: 1.0 - SHADOW_EPSILON }
    }

    /// Ray towards a point that does not lie on a surface, like a point light.
    pub fn spawn_ray_to_point(&self, p: Point3f) -> Ray {
        let origin = offset_ray_origin(self.p, self.n, p - self.p);
        Ray { origin, dir: p - origin, t_max: 1.0 - SHADOW_EPSILON }
    }
}

pub struct SurfaceInteraction<'p> {
    pub hit: SurfaceHit,

    /// (u, v) coordinates from the parametrization of the surface
    pub uv: Point2f,

    pub wo: Vec3f,

    pub dpdu: Vec3f,

    pub shading_n: Normal3,

    pub primitive: Option<&'p Primitive>,
}

impl<'p> SurfaceInteraction<'p> {
    pub fn new(p: Point3f, uv: Point2f, wo: Vec3f, n: Normal3, dpdu: Vec3f) -> Self {
        Self {
            hit: SurfaceHit { p, n },
            uv,
            wo,
            dpdu,
            shading_n: n,
            primitive: None,
        }
    }

    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        self.hit.spawn_ray(dir)
    }

    /// Flips both normals, for shapes whose orientation was reversed.
    pub fn flip_normals(&mut self) {
        self.hit.n = -self.hit.n;
        self.shading_n = -self.shading_n;
    }

    /// Radiance emitted towards `w` if the hit primitive is an area emitter.
    pub fn emitted_radiance(&self, w: Vec3f) -> Spectrum {
        self.primitive
            .and_then(|prim| prim.area_light.as_ref())
            .map_or_else(
                || Spectrum::uniform(0.0),
                |light| light.emitted_radiance(&self.hit, w),
            )
    }

    /// The scattering function at the hit, or `None` for surfaces that only mark a boundary.
    pub fn bsdf(&self) -> Option<Bsdf<'p>> {
        let bxdf = self.primitive?.bsdf.as_deref()?;
        Some(Bsdf::new(self, bxdf))
    }

    /// Geometric normal facing the side `wo` arrives from.
    pub fn facing_normal(&self) -> Normal3 {
        self.hit.n.faceforward(self.wo)
    }

    pub fn is_emitter(&self) -> bool {
        self.primitive.map_or(false, |prim| prim.area_light.is_some())
    }

    pub fn tangent(&self) -> Vec3f {
        let n = self.shading_n.0;
        let t = self.dpdu - n * n.dot(self.dpdu);
        if t.magnitude2() > 1.0e-12 {
            t.normalize()
        } else {
            crate::math::coordinate_system(n).0
        }
    }
}
