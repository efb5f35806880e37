use crate::{Bounds3f, Float, Point2f, Point3f, Ray, SurfaceInteraction, Transform, Transformable, Vec3f};
use crate::geometry::Normal3;
use crate::interaction::SurfaceHit;
use std::sync::Arc;

pub mod sphere;
pub mod triangle;

pub use sphere::Sphere;
pub use triangle::{Triangle, TriangleMesh};

pub trait Shape: Send + Sync + std::fmt::Debug {
    fn world_bound(&self) -> Bounds3f;

    /// Finds the closest intersection with `ray` in `(0, ray.t_max)`, returning its
    /// parametric distance and the interaction at the hit.
    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction<'_>)>;

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    fn area(&self) -> Float;

    /// Samples a point uniformly by area on the surface.
    fn sample(&self, u: Point2f) -> SurfaceHit;

    fn pdf_area(&self) -> Float {
        1.0 / self.area()
    }
}

/// Two triangle unit square `[-1, 1]^2` in the `z = 0` plane, facing `+z`.
pub fn rectangle_mesh(to_world: &Transform, flip_normals: bool) -> Arc<TriangleMesh> {
    let vertices = vec![
        point3f!(-1, -1, 0),
        point3f!(1, -1, 0),
        point3f!(1, 1, 0),
        point3f!(-1, 1, 0),
    ];
    let uvs = vec![
        Point2f::new(0.0, 0.0),
        Point2f::new(1.0, 0.0),
        Point2f::new(1.0, 1.0),
        Point2f::new(0.0, 1.0),
    ];
    let normals = vec![Normal3::new(0.0, 0.0, 1.0); 4];
    Arc::new(TriangleMesh::new(
        to_world,
        vec![0, 1, 2, 2, 3, 0],
        vertices,
        Some(normals),
        Some(uvs),
        flip_normals,
    ))
}

/// Axis aligned cube `[-1, 1]^3` with outward facing normals.
pub fn cube_mesh(to_world: &Transform, flip_normals: bool) -> Arc<TriangleMesh> {
    let x = vec3f!(1, 0, 0);
    let y = vec3f!(0, 1, 0);
    let z = vec3f!(0, 0, 1);
    // (normal, u, v) with u x v == normal
    let faces: [(Vec3f, Vec3f, Vec3f); 6] = [
        (x, y, z),
        (-x, z, y),
        (y, z, x),
        (-y, x, z),
        (z, x, y),
        (-z, y, x),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for &(n, u, v) in faces.iter() {
        let base = vertices.len() as u32;
        for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            vertices.push(Point3f::new(0.0, 0.0, 0.0) + n + u * s + v * t);
            normals.push(Normal3(n));
            uvs.push(Point2f::new((s + 1.0) * 0.5, (t + 1.0) * 0.5));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Arc::new(TriangleMesh::new(to_world, indices, vertices, Some(normals), Some(uvs), flip_normals))
}

pub(crate) fn transform_hit(hit: SurfaceHit, t: &Transform) -> SurfaceHit {
    SurfaceHit {
        p: hit.p.transform(*t),
        n: hit.n.transform(*t).normalize(),
    }
}
