use crate::{Bounds3f, Float, Point2f, Point3f, Ray, SurfaceInteraction, Transform, Transformable, Vec3f};
use crate::geometry::Normal3;
use crate::interaction::SurfaceHit;
use crate::math::{max_dimension, permute_vec};
use crate::sampling::uniform_sample_triangle;
use crate::shapes::Shape;
use cgmath::{EuclideanSpace, InnerSpace};
use std::sync::Arc;

/// Triangle mesh with its vertex data already transformed to world space.
#[derive(Debug)]
pub struct TriangleMesh {
    vertex_indices: Vec<u32>,
    vertices: Vec<Point3f>,
    normals: Option<Vec<Normal3>>,
    tex_coords: Option<Vec<Point2f>>,
    flip_normals: bool,
}

impl TriangleMesh {
    /// # Panics
    /// If the index count is not a multiple of three or the per-vertex attribute arrays do
    /// not match the vertex count.
    pub fn new(
        object_to_world: &Transform,
        vertex_indices: Vec<u32>,
        mut vertices: Vec<Point3f>,
        mut normals: Option<Vec<Normal3>>,
        tex_coords: Option<Vec<Point2f>>,
        flip_normals: bool,
    ) -> Self {
        assert_eq!(vertex_indices.len() % 3, 0);
        let n_vertices = vertices.len();

        for v in &mut vertices {
            *v = object_to_world.transform(*v);
        }

        if let Some(ref mut normals) = normals {
            assert_eq!(normals.len(), n_vertices);
            for n in normals {
                *n = object_to_world.transform(*n).normalize();
            }
        }

        if let Some(ref tex_coords) = tex_coords {
            assert_eq!(tex_coords.len(), n_vertices);
        }

        Self {
            vertex_indices,
            vertices,
            normals,
            tex_coords,
            flip_normals,
        }
    }

    pub fn n_triangles(&self) -> usize {
        self.vertex_indices.len() / 3
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn iter_triangles(mesh: &Arc<Self>) -> impl Iterator<Item = Triangle> {
        let mesh = Arc::clone(mesh);
        (0..mesh.n_triangles() as u32).map(move |i| Triangle::new(Arc::clone(&mesh), i))
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    mesh: Arc<TriangleMesh>,
    tri_id: u32,
}

impl Triangle {
    pub fn new(mesh: Arc<TriangleMesh>, tri_id: u32) -> Self {
        Self { mesh, tri_id }
    }

    fn indices(&self) -> [usize; 3] {
        let i = 3 * self.tri_id as usize;
        let v = &self.mesh.vertex_indices;
        [v[i] as usize, v[i + 1] as usize, v[i + 2] as usize]
    }

    fn positions(&self) -> [Point3f; 3] {
        let v = self.indices();
        [self.mesh.vertices[v[0]], self.mesh.vertices[v[1]], self.mesh.vertices[v[2]]]
    }

    fn get_uvs(&self) -> [Point2f; 3] {
        self.mesh.tex_coords.as_ref().map_or_else(
            || [(0.0, 0.0).into(), (1.0, 0.0).into(), (1.0, 1.0).into()],
            |uvs| {
                let v = self.indices();
                [uvs[v[0]], uvs[v[1]], uvs[v[2]]]
            }
        )
    }

    /// Geometric and shading normal at barycentric coordinates `(b0, b1, b2)`. The geometric
    /// normal is flipped to lie in the same hemisphere as the interpolated vertex normal.
    fn normals_at(&self, b: [Float; 3]) -> (Normal3, Normal3) {
        let [p0, p1, p2] = self.positions();
        let mut n = Normal3((p1 - p0).cross(p2 - p0).normalize());
        let mut ns = n;
        if let Some(normals) = &self.mesh.normals {
            let v = self.indices();
            let interp = normals[v[0]].0 * b[0] + normals[v[1]].0 * b[1] + normals[v[2]].0 * b[2];
            if interp.magnitude2() > 0.0 {
                ns = Normal3(interp.normalize());
                n = n.faceforward(ns.0);
            }
        }
        if self.mesh.flip_normals {
            n = -n;
            ns = -ns;
        }
        (n, ns)
    }
}

impl Shape for Triangle {
    fn world_bound(&self) -> Bounds3f {
        let [p0, p1, p2] = self.positions();
        Bounds3f::with_bounds(p0, p1).join_point(p2)
    }

    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction<'_>)> {
        let [p0, p1, p2] = self.positions();

        // First compute an affine transformation that transforms the ray such that its origin is at
        // (0, 0, 0) and points along the +z axis.

        // translate vertices based on ray origin.
        let mut p0t = p0 - ray.origin;
        let mut p1t = p1 - ray.origin;
        let mut p2t = p2 - ray.origin;

        // permute components of triangle vertices and ray dir
        let abs_dir = Vec3f::new(ray.dir.x.abs(), ray.dir.y.abs(), ray.dir.z.abs());
        let kz = max_dimension(abs_dir);
        let kx = (kz + 1) % 3;
        let ky = (kx + 1) % 3;
        let dir = permute_vec(ray.dir, kx, ky, kz);
        p0t = permute_vec(p0t, kx, ky, kz);
        p1t = permute_vec(p1t, kx, ky, kz);
        p2t = permute_vec(p2t, kx, ky, kz);

        // Apply a shear transformation to align the ray with the +z axis.
        // Only shear the x and y dimensions of the vertices at first, wait to apply the z shear
        // if the ray actually intersects the triangle.
        let shear_x = -dir.x / dir.z;
        let shear_y = -dir.y / dir.z;
        let shear_z = 1.0 / dir.z;
        p0t.x += shear_x * p0t.z;
        p0t.y += shear_y * p0t.z;
        p1t.x += shear_x * p1t.z;
        p1t.y += shear_y * p1t.z;
        p2t.x += shear_x * p2t.z;
        p2t.y += shear_y * p2t.z;

        // compute edge function coefficients
        let mut e0 = p1t.x * p2t.y - p1t.y * p2t.x; // p1 to p2
        let mut e1 = p2t.x * p0t.y - p2t.y * p0t.x; // p2 to p0
        let mut e2 = p0t.x * p1t.y - p0t.y * p1t.x; // p0 to p1

        // fall back on double precision on edges
        if e0 == 0.0 || e1 == 0.0 || e2 == 0.0 {
            e0 = (p1t.x as f64 * p2t.y as f64 - p1t.y as f64 * p2t.x as f64) as Float;
            e1 = (p2t.x as f64 * p0t.y as f64 - p2t.y as f64 * p0t.x as f64) as Float;
            e2 = (p0t.x as f64 * p1t.y as f64 - p0t.y as f64 * p1t.x as f64) as Float;
        }

        // if the edge function signs differ, then the point (0, 0) is not on the same side
        // of all three edges so therefore is outside the triangle.
        if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
            return None;
        }

        let det = e0 + e1 + e2;
        if det == 0.0 { return None; }

        // Compute scaled hit distance to triangle and test against ray t range
        p0t.z *= shear_z;
        p1t.z *= shear_z;
        p2t.z *= shear_z;
        let t_scaled = e0 * p0t.z + e1 * p1t.z + e2 * p2t.z;
        if det < 0.0 && (t_scaled >= 0.0 || t_scaled < ray.t_max * det) {
            return None;
        } else if det > 0.0 && (t_scaled <= 0.0 || t_scaled > ray.t_max * det) {
            return None;
        }

        // now we know there is a valid intersection.
        // compute barycentric coordinates and actual t value.
        let inv_det = 1.0 / det;
        let b0 = e0 * inv_det;
        let b1 = e1 * inv_det;
        let b2 = e2 * inv_det;
        let t = t_scaled * inv_det;

        // compute triangle partial derivatives.
        let uv = self.get_uvs();
        let duv02 = uv[0] - uv[2];
        let duv12 = uv[1] - uv[2];
        let dp02 = p0 - p2;
        let dp12 = p1 - p2;

        let determinant = duv02[0] * duv12[1] - duv02[1] * duv12[0];
        let dpdu = if determinant.abs() < 1.0e-12 {
            crate::math::coordinate_system(dp02.cross(dp12).normalize()).0
        } else {
            (duv12[1] * dp02 - duv02[1] * dp12) / determinant
        };

        // interpolate uv coordinates and hit point using barycentric coordinates
        let p_hit = Point3f::from_vec(b0 * p0.to_vec() + b1 * p1.to_vec() + b2 * p2.to_vec());
        let uv_hit = Point2f::from_vec(b0 * uv[0].to_vec() + b1 * uv[1].to_vec() + b2 * uv[2].to_vec());

        let (n, ns) = self.normals_at([b0, b1, b2]);
        let mut isect = SurfaceInteraction::new(p_hit, uv_hit, -ray.dir, n, dpdu);
        isect.shading_n = ns;
        Some((t, isect))
    }

    fn area(&self) -> Float {
        let [p0, p1, p2] = self.positions();
        0.5 * (p1 - p0).cross(p2 - p0).magnitude()
    }

    fn sample(&self, u: Point2f) -> SurfaceHit {
        let (b0, b1) = uniform_sample_triangle(u);
        let b2 = 1.0 - b0 - b1;
        let [p0, p1, p2] = self.positions();
        let p = Point3f::from_vec(b0 * p0.to_vec() + b1 * p1.to_vec() + b2 * p2.to_vec());
        let (n, _) = self.normals_at([b0, b1, b2]);
        SurfaceHit { p, n }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_triangle() -> Triangle {
        let mesh = TriangleMesh::new(
            &Transform::IDENTITY,
            vec![0, 1, 2],
            vec![point3f!(0, 0, 0), point3f!(1, 0, 0), point3f!(0, 1, 0)],
            None,
            None,
            false,
        );
        Triangle::new(Arc::new(mesh), 0)
    }

    #[test]
    fn test_hit_inside_and_miss_outside() {
        let tri = single_triangle();
        let ray = Ray::new(point3f!(0.25, 0.25, 1), vec3f!(0, 0, -1));
        let (t, si) = tri.intersect(&ray).unwrap();
        assert_relative_eq!(t, 1.0);
        assert_relative_eq!(si.hit.n.z, 1.0);

        // from behind still hits, the normal is not flipped towards the ray
        let ray = Ray::new(point3f!(0.25, 0.25, -1), vec3f!(0, 0, 1));
        let (_, si) = tri.intersect(&ray).unwrap();
        assert_relative_eq!(si.hit.n.z, 1.0);

        let ray = Ray::new(point3f!(0.75, 0.75, 1), vec3f!(0, 0, -1));
        assert!(tri.intersect(&ray).is_none());

        let mut short = Ray::new(point3f!(0.25, 0.25, 1), vec3f!(0, 0, -1));
        short.t_max = 0.5;
        assert!(tri.intersect(&short).is_none());
    }

    #[test]
    fn test_samples_lie_on_triangle() {
        let tri = single_triangle();
        assert_relative_eq!(tri.area(), 0.5);
        for i in 0..10 {
            let u = Point2f::new(i as Float / 10.0, 1.0 - i as Float / 10.0);
            let hit = tri.sample(u);
            assert_relative_eq!(hit.p.z, 0.0);
            assert!(hit.p.x >= 0.0 && hit.p.y >= 0.0 && hit.p.x + hit.p.y <= 1.0 + 1e-6);
        }
    }
}
