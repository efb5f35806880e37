use crate::{Float, Point3f, Vec3f, INFINITY, RAY_EPSILON};
use cgmath::prelude::*;
use std::ops::{Deref, Neg};

pub mod bounds;
pub mod transform;

pub use bounds::*;
pub use transform::*;
pub use transform::Transform;

pub fn distance(p1: Point3f, p2: Point3f) -> Float {
    (p1 - p2).magnitude()
}

pub fn distance2(p1: Point3f, p2: Point3f) -> Float {
    (p1 - p2).magnitude2()
}

/// Moves a ray origin off the surface at `p` along the geometric normal so that the
/// spawned ray does not re-intersect the surface it starts on.
pub fn offset_ray_origin(p: Point3f, n: Normal3, dir: Vec3f) -> Point3f {
    let scale = RAY_EPSILON * (1.0 + p.x.abs().max(p.y.abs()).max(p.z.abs()));
    let mut offset = scale * n.0;
    if dir.dot(n.0) < 0.0 {
        offset = -offset;
    }
    p + offset
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3f,
    pub dir: Vec3f,
    pub t_max: Float,
}

impl Ray {
    pub fn new(origin: Point3f, dir: Vec3f) -> Self {
        Self {
            origin, dir, t_max: INFINITY
        }
    }

    pub fn at(&self, t: Float) -> Point3f {
        self.origin + (self.dir * t)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normal3(pub Vec3f);

impl Normal3 {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self(Vec3f::new(x, y, z))
    }

    pub fn faceforward(self, v: Vec3f) -> Self {
        if self.dot(v) < 0.0 {
            Self(-self.0)
        } else {
            self
        }
    }

    pub fn normalize(self) -> Self {
        Self(self.0.normalize())
    }
}

impl Deref for Normal3 {
    type Target = Vec3f;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Neg for Normal3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl From<Vec3f> for Normal3 {
    fn from(v: Vec3f) -> Self {
        Self(v)
    }
}

impl From<Normal3> for Vec3f {
    fn from(n: Normal3) -> Self {
        n.0
    }
}
