use cgmath::Point2;
use crate::{Float, Point2i, Point3f, Ray, Scalar, Vec3f};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2<S: Scalar> {
    pub min: Point2<S>,
    pub max: Point2<S>
}

pub type Bounds2i = Bounds2<i32>;
pub type Bounds2f = Bounds2<Float>;

impl<S: Scalar> Bounds2<S> {

    pub fn empty() -> Self {
        Self {
            min: Point2::new(S::max_value(), S::max_value()),
            max: Point2::new(S::min_value(), S::min_value())
        }
    }

    pub fn with_bounds(min: Point2<S>, max: Point2<S>) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> S {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> S {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> S {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        }
    }
}

impl Bounds2i {
    /// Iterates over the points in the half open range `[min, max)`, row by row.
    pub fn iter_points(self) -> impl Iterator<Item = Point2i> {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| Point2i::new(x, y)))
    }

    /// Splits the bounds into square tiles with side length `tile_size`. Tiles at the right
    /// and bottom edges are clipped to the bounds.
    pub fn iter_tiles(self, tile_size: i32) -> impl Iterator<Item = Bounds2i> {
        let n_x = (self.width() + tile_size - 1) / tile_size;
        let n_y = (self.height() + tile_size - 1) / tile_size;
        (0..n_y).flat_map(move |ty| (0..n_x).map(move |tx| {
            let min = Point2i::new(self.min.x + tx * tile_size, self.min.y + ty * tile_size);
            let max = Point2i::new(
                Ord::min(min.x + tile_size, self.max.x),
                Ord::min(min.y + tile_size, self.max.y)
            );
            Bounds2i::with_bounds(min, max)
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3f {
    pub min: Point3f,
    pub max: Point3f,
}

impl Bounds3f {
    pub fn empty() -> Self {
        let inf = crate::INFINITY;
        Self {
            min: Point3f::new(inf, inf, inf),
            max: Point3f::new(-inf, -inf, -inf),
        }
    }

    pub fn with_bounds(p1: Point3f, p2: Point3f) -> Self {
        Self {
            min: Point3f::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            max: Point3f::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }

    pub fn join(&self, other: &Self) -> Self {
        Self {
            min: Point3f::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y), self.min.z.min(other.min.z)),
            max: Point3f::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y), self.max.z.max(other.max.z)),
        }
    }

    pub fn join_point(&self, p: Point3f) -> Self {
        Self {
            min: Point3f::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3f::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn diagonal(&self) -> Vec3f {
        self.max - self.min
    }

    pub fn centroid(&self) -> Point3f {
        Point3f::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    pub fn surface_area(&self) -> Float {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn maximum_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Position of `p` relative to the corners, 0 at `min` and 1 at `max` along each axis.
    pub fn offset(&self, p: Point3f) -> Vec3f {
        let mut o = p - self.min;
        for axis in 0..3 {
            if self.max[axis] > self.min[axis] {
                o[axis] /= self.max[axis] - self.min[axis];
            }
        }
        o
    }

    pub fn iter_corners(&self) -> impl Iterator<Item = Point3f> + '_ {
        (0..8).map(move |i| Point3f::new(
            if i & 1 == 0 { self.min.x } else { self.max.x },
            if i & 2 == 0 { self.min.y } else { self.max.y },
            if i & 4 == 0 { self.min.z } else { self.max.z },
        ))
    }

    /// Slab test against the ray, using precomputed reciprocal direction components.
    pub fn intersect_p(&self, ray: &Ray, inv_dir: Vec3f) -> bool {
        let mut t0: Float = 0.0;
        let mut t1 = ray.t_max;
        for axis in 0..3 {
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_dir[axis];
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_dir[axis];
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            // guard against NaN from 0 * inf on axis aligned rays
            t_far *= 1.0 + 2.0 * crate::math::gamma(3);
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}
