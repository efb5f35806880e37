use crate::{Bounds3f, Float, Point2f, Point3f, Ray, SurfaceInteraction, Transform, Transformable, Vec3f};
use crate::geometry::Normal3;
use crate::interaction::SurfaceHit;
use crate::math::consts::PI;
use crate::math::quadratic;
use crate::sampling::uniform_sample_sphere;
use crate::shapes::{transform_hit, Shape};
use cgmath::{EuclideanSpace, InnerSpace};

/// Sphere of radius `radius` centered at the object space origin.
#[derive(Debug, Clone)]
pub struct Sphere {
    object_to_world: Transform,
    world_to_object: Transform,
    flip_normals: bool,
    radius: Float,
}

impl Sphere {
    pub fn new(object_to_world: Transform, radius: Float, flip_normals: bool) -> Self {
        Self {
            object_to_world,
            world_to_object: object_to_world.inverse(),
            flip_normals,
            radius,
        }
    }

    /// Uniform scale applied by the object to world transform.
    fn world_scale(&self) -> Float {
        self.object_to_world.transform(vec3f!(1, 0, 0)).magnitude()
    }

    fn world_radius(&self) -> Float {
        self.radius * self.world_scale()
    }
}

impl Shape for Sphere {
    fn world_bound(&self) -> Bounds3f {
        let r = self.radius;
        self.object_to_world.transform(bounds3f!((-r, -r, -r), (r, r, r)))
    }

    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction<'_>)> {
        let ray = self.world_to_object.transform(*ray);
        let o = ray.origin.to_vec();

        let a = ray.dir.magnitude2();
        let b = 2.0 * ray.dir.dot(o);
        let c = o.magnitude2() - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;

        if t0 > ray.t_max || t1 <= 0.0 {
            return None;
        }

        // find the closest valid intersection t value
        let t_shape_hit = if t0 > 0.0 { t0 } else { t1 };
        if t_shape_hit > ray.t_max {
            return None;
        }

        let mut p_hit = ray.at(t_shape_hit);
        // refine the hit point onto the surface
        p_hit *= self.radius / p_hit.to_vec().magnitude();
        if p_hit.x == 0.0 && p_hit.y == 0.0 { p_hit.x = 1.0e-5 * self.radius }

        let mut phi = Float::atan2(p_hit.y, p_hit.x);
        if phi < 0.0 { phi += 2.0 * PI }
        let theta = Float::acos((p_hit.z / self.radius).clamp(-1.0, 1.0));
        let uv = Point2f::new(phi / (2.0 * PI), theta / PI);
        let dpdu = vec3f!(-2.0 * PI * p_hit.y, 2.0 * PI * p_hit.x, 0.0);

        let n = Normal3(p_hit.to_vec() / self.radius);
        let mut isect = SurfaceInteraction::new(
            p_hit.transform(self.object_to_world),
            uv,
            -ray.dir.transform(self.object_to_world).normalize(),
            n.transform(self.object_to_world).normalize(),
            dpdu.transform(self.object_to_world),
        );
        if self.flip_normals {
            isect.flip_normals();
        }
        Some((t_shape_hit, isect))
    }

    fn intersect_test(&self, ray: &Ray) -> bool {
        let ray = self.world_to_object.transform(*ray);
        let o = ray.origin.to_vec();
        let a = ray.dir.magnitude2();
        let b = 2.0 * ray.dir.dot(o);
        let c = o.magnitude2() - self.radius * self.radius;
        match quadratic(a, b, c) {
            Some((t0, t1)) => {
                let t = if t0 > 0.0 { t0 } else { t1 };
                t > 0.0 && t <= ray.t_max
            }
            None => false,
        }
    }

    fn area(&self) -> Float {
        let r = self.world_radius();
        4.0 * PI * r * r
    }

    fn sample(&self, u: Point2f) -> SurfaceHit {
        let d: Vec3f = uniform_sample_sphere(u);
        let p = Point3f::from_vec(d * self.radius);
        let n = if self.flip_normals { Normal3(-d) } else { Normal3(d) };
        transform_hit(SurfaceHit::new(p, n), &self.object_to_world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_hit_from_outside_and_inside() {
        let sphere = Sphere::new(Transform::translate(vec3f!(0, 0, -5)), 1.0, false);

        let ray = Ray::new(point3f!(0, 0, 0), vec3f!(0, 0, -1));
        let (t, si) = sphere.intersect(&ray).unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(si.hit.n.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(si.wo.z, 1.0, epsilon = 1e-5);
        assert!(sphere.intersect_test(&ray));

        let ray = Ray::new(point3f!(0, 0, -5), vec3f!(0, 1, 0));
        let (t, si) = sphere.intersect(&ray).unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-5);
        assert_relative_eq!(si.hit.n.y, 1.0, epsilon = 1e-5);

        let miss = Ray::new(point3f!(0, 2, 0), vec3f!(0, 0, -1));
        assert!(sphere.intersect(&miss).is_none());
        assert!(!sphere.intersect_test(&miss));
    }

    #[test]
    fn test_flipped_normals_point_inward() {
        let sphere = Sphere::new(Transform::IDENTITY, 2.0, true);
        let ray = Ray::new(point3f!(0, 0, 5), vec3f!(0, 0, -1));
        let (_, si) = sphere.intersect(&ray).unwrap();
        assert_relative_eq!(si.hit.n.z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(sphere.area(), 16.0 * PI, epsilon = 1e-3);

        let hit = sphere.sample(Point2f::new(0.3, 0.6));
        assert!(hit.n.dot(hit.p.to_vec()) < 0.0);
    }
}
