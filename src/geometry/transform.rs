use crate::{Float, Point3f, Vec3f, Normal3, Bounds3f, Ray};
use cgmath::{Deg, InnerSpace, Matrix, Matrix4, SquareMatrix, Transform as cgTransform};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub t: Matrix4<Float>,
    pub invt: Matrix4<Float>
}

const IDENTITY_MAT4: Matrix4<Float> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0
);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {

    pub const IDENTITY: Self = Transform::new(IDENTITY_MAT4, IDENTITY_MAT4);

    /// Returns `None` if the matrix is singular.
    pub fn from_mat(mat: Matrix4<Float>) -> Option<Self> {
        let m_inv = mat.invert()?;
        Some(Self::new(mat, m_inv))
    }

    /// Builds a transform from 16 values given in row-major order.
    pub fn from_row_major(v: &[Float; 16]) -> Option<Self> {
        let mat = Matrix4::new(
            v[0], v[4], v[8], v[12],
            v[1], v[5], v[9], v[13],
            v[2], v[6], v[10], v[14],
            v[3], v[7], v[11], v[15],
        );
        Self::from_mat(mat)
    }

    pub const fn new(mat: Matrix4<Float>, mat_inv: Matrix4<Float>) -> Self {
        let t = mat;
        let invt = mat_inv;
        Self { t, invt }
    }

    /// Object-to-world transform of a frame placed at `pos` whose +z axis faces `look_at`.
    /// The local +x axis is `up × dir`, i.e. it points to the left of the viewing direction.
    pub fn look_at(pos: Point3f, look_at: Point3f, up: Vec3f) -> Option<Self> {
        let dir = (look_at - pos).normalize();
        let left = up.normalize().cross(dir);
        if left.magnitude2() == 0.0 || !left.x.is_finite() {
            return None;
        }
        let left = left.normalize();
        let new_up = dir.cross(left);

        let mat = Matrix4::from_cols(
            left.extend(0.0),
            new_up.extend(0.0),
            dir.extend(0.0),
            pos.to_homogeneous()
        );
        Self::from_mat(mat)
    }

    pub fn translate(delta: Vec3f) -> Self {
        let m = Matrix4::from_translation(delta);
        let m_inv = Matrix4::from_translation(-delta);
        Self::new(m, m_inv)
    }

    /// Returns `None` if any scale factor is zero.
    pub fn scale(sx: Float, sy: Float, sz: Float) -> Option<Self> {
        if sx == 0.0 || sy == 0.0 || sz == 0.0 {
            return None;
        }
        let m = Matrix4::from_nonuniform_scale(sx, sy, sz);
        let m_inv = Matrix4::from_nonuniform_scale(1.0 / sx, 1.0 / sy, 1.0 / sz);
        Some(Self::new(m, m_inv))
    }

    /// Rotation by `angle` degrees around `axis`, counter-clockwise when looking down the axis.
    pub fn rotate(axis: Vec3f, angle: Float) -> Option<Self> {
        if axis.magnitude2() == 0.0 {
            return None;
        }
        let m = Matrix4::from_axis_angle(axis.normalize(), Deg(angle));
        // rotations are orthonormal
        let m_inv = m.transpose();
        Some(Self::new(m, m_inv))
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.invt, self.t)
    }

    pub fn swaps_handedness(&self) -> bool {
        self.t.determinant() < 0.0
    }

    /// Compose so that `self` is applied first and `next` afterwards.
    pub fn then(self, next: Self) -> Self {
        next * self
    }

    pub fn transform_normal(&self, n: &Normal3) -> Normal3 {
        // transform by the transpose of the inverse
        let x = self.invt[0][0]*n.x + self.invt[0][1]*n.y + self.invt[0][2]*n.z;
        let y = self.invt[1][0]*n.x + self.invt[1][1]*n.y + self.invt[1][2]*n.z;
        let z = self.invt[2][0]*n.x + self.invt[2][1]*n.y + self.invt[2][2]*n.z;
        Normal3(vec3f!(x, y, z))
    }

    pub fn transform<T: Transformable>(&self, obj: T) -> T {
        obj.transform(*self)
    }
}

impl std::ops::Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.t * rhs.t, rhs.invt * self.invt)
    }
}

pub trait Transformable: Sized {
    fn transform(&self, t: Transform) -> Self;
}

impl Transformable for Vec3f {
    fn transform(&self, t: Transform) -> Self {
        t.t.transform_vector(*self)
    }
}

impl Transformable for Point3f {
    fn transform(&self, t: Transform) -> Self { t.t.transform_point(*self) }
}

impl Transformable for Normal3 {
    fn transform(&self, t: Transform) -> Self {
        t.transform_normal(self)
    }
}

impl Transformable for Bounds3f {
    fn transform(&self, t: Transform) -> Self {
        self.iter_corners().fold(Bounds3f::empty(), |b, p| {
            let pt = t.transform(p);
            b.join_point(pt)
        })
    }
}

impl Transformable for Ray {
    fn transform(&self, t: Transform) -> Ray {
        Ray { origin: self.origin.transform(t), dir: self.dir.transform(t), t_max: self.t_max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec3;
    use cgmath::assert_abs_diff_eq;

    #[test]
    fn test_look_at() {
        let pos = Point3f::new(0.0, 0.0, -1.0);
        let tf = Transform::look_at(
            pos,
            (0.0, 0.0, 0.0).into(),
            (0.0, 1.0, 0.0).into(),
        ).unwrap();
        let dir = Vec3f::new(0.0, 0.0, 1.0); // positive z-axis
        let expected = Vec3f::new(0.0, 0.0, 1.0);

        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), dir);

        let world_ray = ray.transform(tf);

        assert_abs_diff_eq!(world_ray.dir, expected, epsilon = 0.00001);
        assert_abs_diff_eq!(world_ray.origin, pos, epsilon = 0.00001);

        // local +x is to the left of the viewer
        let left = tf.transform(Vec3f::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(left, Vec3f::new(1.0, 0.0, 0.0), epsilon = 0.00001);
    }

    #[test]
    fn test_point_transform() {
        // translate, then scale
        let tf = Transform::translate(vec3(1.0, 1.0, 1.0))
            .then(Transform::scale(2.0, 2.0, 2.0).unwrap());

        let p = Point3f::new(1.0, 1.0, 1.0);
        let pt = tf.transform(p);

        assert_abs_diff_eq!(Point3f::new(4.0, 4.0, 4.0), pt, epsilon = 0.00001);
        assert_abs_diff_eq!(tf.inverse().transform(pt), p, epsilon = 0.00001);
    }

    #[test]
    fn test_vec_transform() {
        // translate, then scale. Translate should do nothing as opposed to point.
        let tf = Transform::scale(2.0, 2.0, 2.0).unwrap() *
            Transform::translate(vec3(1.0, 1.0, 1.0));

        let v = Vec3f::new(1.0, 1.0, 1.0);
        let vt = tf.transform(v);

        assert_abs_diff_eq!(Vec3f::new(2.0, 2.0, 2.0), vt, epsilon = 0.00001);
    }

    #[test]
    fn test_normal_stays_perpendicular() {
        let tf = Transform::scale(1.0, 4.0, 1.0).unwrap();
        let n = Normal3::new(1.0, 1.0, 0.0).normalize();
        let tangent = Vec3f::new(1.0, -1.0, 0.0);

        let nt = tf.transform(n);
        let tt = tf.transform(tangent);
        assert_abs_diff_eq!(nt.dot(tt), 0.0, epsilon = 0.00001);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let tf = Transform::rotate(vec3(0.0, 0.0, 1.0), 90.0).unwrap();
        let v = tf.transform(Vec3f::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v, Vec3f::new(0.0, 1.0, 0.0), epsilon = 0.00001);
    }

    #[test]
    fn test_identity() {
        let tf = Transform::IDENTITY;
        let p = Point3f::new(0.0, 0.0, 0.0);

        let pt = tf.transform(p);
        assert_abs_diff_eq!(Point3f::new(0.0, 0.0, 0.0), pt, epsilon = 0.000001);
        assert!(Transform::scale(0.0, 1.0, 1.0).is_none());
    }
}
