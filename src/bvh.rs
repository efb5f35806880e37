use crate::{Bounds3f, Ray, SurfaceInteraction, Vec3f};
use crate::primitive::Primitive;
use partition::partition;

const MAX_PRIMS_IN_NODE: usize = 4;
const N_BUCKETS: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitMethod {
    Middle,
    EqualCounts,
    SAH,
}

/// Bounding volume hierarchy over the scene primitives, flattened into depth-first order.
#[derive(Debug)]
pub struct BVH {
    prims: Vec<Primitive>,
    nodes: Vec<LinearBVHNode>,
}

#[derive(Debug, Clone, Copy)]
enum LinearBVHNode {
    Leaf {
        bounds: Bounds3f,
        primitives_offset: u32,
        n_primitives: u16,
    },
    Interior {
        bounds: Bounds3f,
        second_child_offset: u32,
        split_axis: u8,
    },
}

impl LinearBVHNode {
    fn bounds(&self) -> &Bounds3f {
        match self {
            LinearBVHNode::Leaf { bounds, .. } => bounds,
            LinearBVHNode::Interior { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BVHPrimInfo {
    prim_id: usize,
    bounds: Bounds3f,
    centroid: crate::Point3f,
}

impl BVHPrimInfo {
    fn new(prim_id: usize, bounds: Bounds3f) -> Self {
        Self { prim_id, bounds, centroid: bounds.centroid() }
    }
}

enum BVHBuildNode {
    Leaf {
        bounds: Bounds3f,
        first_prim_idx: usize,
        n_prims: usize,
    },
    Interior {
        bounds: Bounds3f,
        children: Box<[BVHBuildNode; 2]>,
        split_axis: usize,
    },
}

impl BVHBuildNode {
    fn new_interior(children: [BVHBuildNode; 2], split_axis: usize) -> Self {
        let bounds = children[0].bounds().join(children[1].bounds());
        BVHBuildNode::Interior { bounds, children: Box::new(children), split_axis }
    }

    fn bounds(&self) -> &Bounds3f {
        match self {
            BVHBuildNode::Leaf { bounds, .. } => bounds,
            BVHBuildNode::Interior { bounds, .. } => bounds,
        }
    }
}

impl BVH {
    pub fn build(prims: Vec<Primitive>, split_method: SplitMethod) -> BVH {
        if prims.is_empty() {
            return BVH { prims, nodes: Vec::new() };
        }

        let mut prim_info: Vec<BVHPrimInfo> = prims.iter().enumerate()
            .map(|(i, p)| BVHPrimInfo::new(i, p.world_bound()))
            .collect();

        let mut prim_ordering: Vec<isize> = Vec::with_capacity(prims.len());
        let mut total_nodes = 0;
        let root = Self::recursive_build(&mut prim_info, &mut prim_ordering, split_method, &mut total_nodes);

        // reorder the primitives so that leaves reference contiguous ranges
        let mut ordered = prims;
        apply_permutation(&mut ordered, &mut prim_ordering);

        let mut nodes = Vec::with_capacity(total_nodes);
        Self::flatten(&root, &mut nodes);

        tracing::debug!(primitives = ordered.len(), nodes = nodes.len(), "built bvh");
        BVH { prims: ordered, nodes }
    }

    fn recursive_build(
        prim_info: &mut [BVHPrimInfo],
        prim_ordering: &mut Vec<isize>,
        split_method: SplitMethod,
        total_nodes: &mut usize,
    ) -> BVHBuildNode {
        *total_nodes += 1;

        // Find the union of the bounding boxes of all primitives in this node,
        // and the bounding box of all centroids
        let (node_bounds, centroid_bounds) = prim_info.iter()
            .fold((Bounds3f::empty(), Bounds3f::empty()), |(node_bb, centr_bb), prim| {
                (node_bb.join(&prim.bounds), centr_bb.join_point(prim.centroid))
            });

        let n_prims = prim_info.len();
        let ax = centroid_bounds.maximum_extent();

        // If there is only one primitive or all the centroids lie on the same point
        // (and therefore can't be partitioned), create a leaf node.
        if n_prims == 1 || centroid_bounds.max[ax] == centroid_bounds.min[ax] {
            return Self::make_leaf(prim_info, prim_ordering, node_bounds);
        }

        let mid = match split_method {
            SplitMethod::Middle => {
                let midpoint = (centroid_bounds.min[ax] + centroid_bounds.max[ax]) / 2.0;
                let (part1, _) = partition(prim_info, |prim| prim.centroid[ax] < midpoint);
                let mid = part1.len();
                if mid == 0 || mid == n_prims { n_prims / 2 } else { mid }
            }
            SplitMethod::EqualCounts => {
                Self::equal_counts_split(prim_info, ax)
            }
            SplitMethod::SAH => {
                if n_prims <= 2 {
                    Self::equal_counts_split(prim_info, ax)
                } else {
                    match Self::sah_split(prim_info, ax, &node_bounds, &centroid_bounds) {
                        Some(mid) => mid,
                        None => return Self::make_leaf(prim_info, prim_ordering, node_bounds),
                    }
                }
            }
        };

        let (left, right) = prim_info.split_at_mut(mid);
        let child1 = Self::recursive_build(left, prim_ordering, split_method, total_nodes);
        let child2 = Self::recursive_build(right, prim_ordering, split_method, total_nodes);

        BVHBuildNode::new_interior([child1, child2], ax)
    }

    fn make_leaf(prim_info: &[BVHPrimInfo], prim_ordering: &mut Vec<isize>, bounds: Bounds3f) -> BVHBuildNode {
        let first_prim_idx = prim_ordering.len();
        for prim in prim_info {
            prim_ordering.push(prim.prim_id as isize)
        }
        BVHBuildNode::Leaf { first_prim_idx, n_prims: prim_info.len(), bounds }
    }

    fn equal_counts_split(prim_info: &mut [BVHPrimInfo], ax: usize) -> usize {
        let mid = prim_info.len() / 2;
        prim_info.select_nth_unstable_by(mid, |a, b| {
            a.centroid[ax].partial_cmp(&b.centroid[ax]).unwrap_or(std::cmp::Ordering::Equal)
        });
        mid
    }

    /// Bucketed surface area heuristic. Returns `None` when a leaf is cheaper than any split.
    fn sah_split(
        prim_info: &mut [BVHPrimInfo],
        ax: usize,
        node_bounds: &Bounds3f,
        centroid_bounds: &Bounds3f,
    ) -> Option<usize> {
        let bucket_of = |prim: &BVHPrimInfo| {
            let b = (N_BUCKETS as crate::Float * centroid_bounds.offset(prim.centroid)[ax]) as usize;
            b.min(N_BUCKETS - 1)
        };

        let mut counts = [0usize; N_BUCKETS];
        let mut bounds = [Bounds3f::empty(); N_BUCKETS];
        for prim in prim_info.iter() {
            let b = bucket_of(prim);
            counts[b] += 1;
            bounds[b] = bounds[b].join(&prim.bounds);
        }

        let cost = |split: usize| {
            let (mut b0, mut c0) = (Bounds3f::empty(), 0);
            let (mut b1, mut c1) = (Bounds3f::empty(), 0);
            for i in 0..=split {
                b0 = b0.join(&bounds[i]);
                c0 += counts[i];
            }
            for i in split + 1..N_BUCKETS {
                b1 = b1.join(&bounds[i]);
                c1 += counts[i];
            }
            let area = |b: &Bounds3f, c: usize| if c == 0 { 0.0 } else { c as crate::Float * b.surface_area() };
            0.125 + (area(&b0, c0) + area(&b1, c1)) / node_bounds.surface_area()
        };

        let (min_bucket, min_cost) = (0..N_BUCKETS - 1)
            .map(|i| (i, cost(i)))
            .fold((0, crate::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });

        let leaf_cost = prim_info.len() as crate::Float;
        if prim_info.len() <= MAX_PRIMS_IN_NODE && min_cost >= leaf_cost {
            return None;
        }

        let (part1, _) = partition(prim_info, |prim| bucket_of(prim) <= min_bucket);
        let mid = part1.len();
        if mid == 0 || mid == prim_info.len() {
            Some(Self::equal_counts_split(prim_info, ax))
        } else {
            Some(mid)
        }
    }

    fn flatten(node: &BVHBuildNode, nodes: &mut Vec<LinearBVHNode>) -> usize {
        let offset = nodes.len();
        match node {
            BVHBuildNode::Leaf { bounds, first_prim_idx, n_prims } => {
                nodes.push(LinearBVHNode::Leaf {
                    bounds: *bounds,
                    primitives_offset: *first_prim_idx as u32,
                    n_primitives: *n_prims as u16,
                });
            }
            BVHBuildNode::Interior { bounds, children, split_axis } => {
                nodes.push(LinearBVHNode::Interior {
                    bounds: *bounds,
                    second_child_offset: 0,
                    split_axis: *split_axis as u8,
                });
                Self::flatten(&children[0], nodes);
                let second = Self::flatten(&children[1], nodes);
                if let LinearBVHNode::Interior { second_child_offset, .. } = &mut nodes[offset] {
                    *second_child_offset = second as u32;
                }
            }
        }
        offset
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.prims
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.nodes.first().map_or_else(Bounds3f::empty, |n| *n.bounds())
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'_>> {
        if self.nodes.is_empty() {
            return None;
        }
        let inv_dir = Vec3f::new(1.0 / ray.dir.x, 1.0 / ray.dir.y, 1.0 / ray.dir.z);
        let dir_is_neg = [inv_dir.x < 0.0, inv_dir.y < 0.0, inv_dir.z < 0.0];

        let mut closest = None;
        let mut to_visit: smallvec::SmallVec<[usize; 64]> = smallvec::SmallVec::new();
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            if node.bounds().intersect_p(ray, inv_dir) {
                match *node {
                    LinearBVHNode::Leaf { primitives_offset, n_primitives, .. } => {
                        let start = primitives_offset as usize;
                        for prim in &self.prims[start..start + n_primitives as usize] {
                            if let Some(isect) = prim.intersect(ray) {
                                closest = Some(isect);
                            }
                        }
                        match to_visit.pop() {
                            Some(next) => current = next,
                            None => break,
                        }
                    }
                    LinearBVHNode::Interior { second_child_offset, split_axis, .. } => {
                        // visit the near child first
                        if dir_is_neg[split_axis as usize] {
                            to_visit.push(current + 1);
                            current = second_child_offset as usize;
                        } else {
                            to_visit.push(second_child_offset as usize);
                            current += 1;
                        }
                    }
                }
            } else {
                match to_visit.pop() {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        closest
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let inv_dir = Vec3f::new(1.0 / ray.dir.x, 1.0 / ray.dir.y, 1.0 / ray.dir.z);
        let dir_is_neg = [inv_dir.x < 0.0, inv_dir.y < 0.0, inv_dir.z < 0.0];

        let mut to_visit: smallvec::SmallVec<[usize; 64]> = smallvec::SmallVec::new();
        let mut current = 0;
        loop {
            let node = &self.nodes[current];
            if node.bounds().intersect_p(ray, inv_dir) {
                match *node {
                    LinearBVHNode::Leaf { primitives_offset, n_primitives, .. } => {
                        let start = primitives_offset as usize;
                        if self.prims[start..start + n_primitives as usize].iter().any(|p| p.intersect_test(ray)) {
                            return true;
                        }
                        match to_visit.pop() {
                            Some(next) => current = next,
                            None => return false,
                        }
                    }
                    LinearBVHNode::Interior { second_child_offset, split_axis, .. } => {
                        if dir_is_neg[split_axis as usize] {
                            to_visit.push(current + 1);
                            current = second_child_offset as usize;
                        } else {
                            to_visit.push(second_child_offset as usize);
                            current += 1;
                        }
                    }
                }
            } else {
                match to_visit.pop() {
                    Some(next) => current = next,
                    None => return false,
                }
            }
        }
    }
}

/// Reorders `items` in place so that position `i` ends up holding the item that was at
/// `indices[i]`.
fn apply_permutation<T>(items: &mut [T], indices: &mut [isize]) {
    assert_eq!(items.len(), indices.len());

    for i in 0..items.len() {
        if indices[i] < 0 { continue; }

        let mut pos = i;

        while indices[pos] != i as isize {
            let target = indices[pos] as usize;
            items.swap(pos, target);
            indices[pos] = -1 - indices[pos];

            pos = target;
        }

        indices[pos] = -1 - indices[pos];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::uniform_sample_sphere;
    use crate::shapes::{cube_mesh, rectangle_mesh, Shape, Sphere, TriangleMesh};
    use crate::{Point2f, Transform};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256Plus;
    use std::sync::Arc;

    #[test]
    fn test_permutation() {
        let mut items = vec!["a", "b", "c", "d", "e"];
        let mut perm = vec![2, 3, 0, 1, 4];

        apply_permutation(&mut items, &mut perm);

        assert_eq!(items, vec!["c", "d", "a", "b", "e"])
    }

    #[test]
    fn test_permutation_gathers_cycles() {
        let mut items = vec!["a", "b", "c"];
        let mut perm = vec![1, 2, 0];

        apply_permutation(&mut items, &mut perm);

        assert_eq!(items, vec!["b", "c", "a"]);

        let mut items: Vec<usize> = (0..7).collect();
        let mut perm = vec![3, 6, 0, 5, 1, 4, 2];
        let expected: Vec<usize> = perm.iter().map(|&i| i as usize).collect();

        apply_permutation(&mut items, &mut perm);

        assert_eq!(items, expected);
    }

    fn mesh_prims(mesh: &Arc<TriangleMesh>) -> impl Iterator<Item = Primitive> + '_ {
        TriangleMesh::iter_triangles(mesh).map(|tri| Primitive {
            shape: Arc::new(tri) as Arc<dyn Shape>,
            bsdf: None,
            area_light: None,
        })
    }

    // closed room with a few boards and boxes inside, like a cornell box
    fn room_prims() -> Vec<Primitive> {
        let mut prims: Vec<Primitive> = mesh_prims(&cube_mesh(&Transform::IDENTITY, true)).collect();
        let boards = [
            Transform::scale(0.3, 0.3, 1.0).unwrap().then(Transform::translate(vec3f!(0.4, -0.2, 0.5))),
            Transform::rotate(vec3f!(1, 0, 0), 90.0).unwrap()
                .then(Transform::scale(0.5, 1.0, 0.2).unwrap())
                .then(Transform::translate(vec3f!(-0.3, 0.6, -0.1))),
        ];
        for tf in boards.iter() {
            prims.extend(mesh_prims(&rectangle_mesh(tf, false)));
        }
        let boxes = [
            Transform::scale(0.2, 0.4, 0.2).unwrap().then(Transform::translate(vec3f!(-0.5, -0.5, 0.3))),
            Transform::rotate(vec3f!(0, 1, 0), 30.0).unwrap()
                .then(Transform::scale(0.15, 0.15, 0.15).unwrap())
                .then(Transform::translate(vec3f!(0.5, 0.5, -0.5))),
        ];
        for tf in boxes.iter() {
            prims.extend(mesh_prims(&cube_mesh(tf, false)));
        }
        prims
    }

    #[test]
    fn test_mesh_scene_matches_brute_force() {
        let origins = [point3f!(0, 0, 0), point3f!(0.1, -0.7, 0.8), point3f!(-0.8, 0.2, -0.6)];
        for method in [SplitMethod::Middle, SplitMethod::EqualCounts, SplitMethod::SAH] {
            let bvh = BVH::build(room_prims(), method);
            let mut rng = Xoshiro256Plus::seed_from_u64(11);

            for _ in 0..2000 {
                let origin = origins[rng.gen_range(0..origins.len())];
                let dir = uniform_sample_sphere(Point2f::new(rng.gen(), rng.gen()));

                let mut brute_ray = Ray::new(origin, dir);
                let brute_hit = bvh.primitives().iter()
                    .filter(|p| p.intersect(&mut brute_ray).is_some())
                    .count() > 0;

                let mut ray = Ray::new(origin, dir);
                let hit = bvh.intersect(&mut ray).is_some();
                assert!(brute_hit, "ray from inside the room escaped");
                assert_eq!(hit, brute_hit, "{:?} along {:?}", method, dir);
                assert!((ray.t_max - brute_ray.t_max).abs() < 1e-4,
                        "{:?}: bvh t {} brute force t {}", method, ray.t_max, brute_ray.t_max);
                assert!(bvh.intersect_test(&Ray::new(origin, dir)));
            }
        }
    }

    fn spheres_along_x(n: usize) -> Vec<Primitive> {
        (0..n).map(|i| Primitive {
            shape: Arc::new(Sphere::new(Transform::translate(vec3f!(3 * i, 0, 0)), 1.0, false)),
            bsdf: None,
            area_light: None,
        }).collect()
    }

    #[test]
    fn test_closest_hit_for_every_split_method() {
        for method in [SplitMethod::Middle, SplitMethod::EqualCounts, SplitMethod::SAH] {
            let bvh = BVH::build(spheres_along_x(20), method);
            assert_eq!(bvh.primitives().len(), 20);

            // looking down -x from past the last sphere hits the last sphere first
            let mut ray = Ray::new(point3f!(100, 0, 0), vec3f!(-1, 0, 0));
            let isect = bvh.intersect(&mut ray).expect("hit");
            assert!((isect.hit.p.x - 58.0).abs() < 1e-3, "{:?} {}", method, isect.hit.p.x);
            assert!((ray.t_max - 42.0).abs() < 1e-3);

            let ray = Ray::new(point3f!(6, 0, 5), vec3f!(0, 0, -1));
            assert!(bvh.intersect_test(&ray));
            let ray = Ray::new(point3f!(7.5, 0, 5), vec3f!(0, 0, -1));
            assert!(!bvh.intersect_test(&ray));
        }
    }

    #[test]
    fn test_empty_bvh_misses() {
        let bvh = BVH::build(Vec::new(), SplitMethod::SAH);
        let mut ray = Ray::new(point3f!(0, 0, 0), vec3f!(0, 0, 1));
        assert!(bvh.intersect(&mut ray).is_none());
        assert!(!bvh.intersect_test(&ray));
    }
}
