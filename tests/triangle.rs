/*!
Shoots rays from inside closed triangle meshes through the BVH. Every ray has to hit something,
including the ones aimed straight at shared edges and vertices, which checks that the triangle
intersection is watertight.
*/

use cgmath::{EuclideanSpace, InnerSpace};
use rand::SeedableRng;
use rand::Rng;
use rand_xoshiro::Xoshiro256Plus;
use render_export::bvh::{SplitMethod, BVH};
use render_export::primitive::Primitive;
use render_export::sampling::uniform_sample_sphere;
use render_export::shapes::{cube_mesh, Shape, TriangleMesh};
use render_export::{Float, Point2f, Point3f, Ray, Transform, Vec3f};
use std::sync::Arc;

fn build_bvh(mesh: &Arc<TriangleMesh>) -> BVH {
    let prims = TriangleMesh::iter_triangles(mesh)
        .map(|tri| Primitive {
            shape: Arc::new(tri) as Arc<dyn Shape>,
            bsdf: None,
            area_light: None,
        })
        .collect();
    BVH::build(prims, SplitMethod::SAH)
}

fn assert_hit(bvh: &BVH, origin: Point3f, dir: Vec3f) {
    let mut ray = Ray::new(origin, dir);
    assert!(bvh.intersect_test(&ray), "occlusion test missed along {:?}", dir);
    assert!(bvh.intersect(&mut ray).is_some(), "intersection missed along {:?}", dir);
}

#[test]
fn test_cube_random_directions() {
    let tf = Transform::rotate(Vec3f::new(1.0, 2.0, 3.0), 37.0).unwrap()
        .then(Transform::scale(1.5, 0.7, 2.0).unwrap());
    let bvh = build_bvh(&cube_mesh(&tf, false));

    let mut rng = Xoshiro256Plus::seed_from_u64(3);
    for _ in 0..100_000 {
        let u = Point2f::new(rng.gen::<Float>(), rng.gen::<Float>());
        assert_hit(&bvh, Point3f::origin(), uniform_sample_sphere(u));
    }
}

#[test]
fn test_cube_edges_and_corners() {
    let bvh = build_bvh(&cube_mesh(&Transform::IDENTITY, false));

    let mut targets = Vec::new();
    for x in [-1.0, 0.0, 1.0] {
        for y in [-1.0, 0.0, 1.0] {
            for z in [-1.0, 0.0, 1.0] {
                let v = Vec3f::new(x, y, z);
                if v.magnitude2() > 0.0 {
                    targets.push(v.normalize());
                }
            }
        }
    }
    // face diagonals, shared by the two triangles of each face
    targets.push(Vec3f::new(0.3, 0.3, 1.0).normalize());
    targets.push(Vec3f::new(-0.7, 1.0, -0.7).normalize());

    for dir in targets {
        assert_hit(&bvh, Point3f::origin(), dir);
        assert_hit(&bvh, Point3f::new(0.01, -0.02, 0.03), dir);
    }
}

#[test]
fn test_bvh_hit_is_closest() {
    // two nested cubes: from the origin the inner one is always hit first
    let outer = cube_mesh(&Transform::scale(2.0, 2.0, 2.0).unwrap(), false);
    let inner = cube_mesh(&Transform::IDENTITY, false);
    let prims: Vec<Primitive> = [outer, inner].iter()
        .flat_map(|m| TriangleMesh::iter_triangles(m))
        .map(|tri| Primitive { shape: Arc::new(tri) as Arc<dyn Shape>, bsdf: None, area_light: None })
        .collect();
    let bvh = BVH::build(prims, SplitMethod::SAH);

    let mut rng = Xoshiro256Plus::seed_from_u64(11);
    for _ in 0..1000 {
        let dir = uniform_sample_sphere(Point2f::new(rng.gen(), rng.gen()));
        let mut ray = Ray::new(Point3f::origin(), dir);
        let isect = bvh.intersect(&mut ray).expect("inner cube hit");
        let p = isect.hit.p;
        assert!(p.x.abs().max(p.y.abs()).max(p.z.abs()) < 1.0 + 1e-3);
    }
}
