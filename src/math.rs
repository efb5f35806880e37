use crate::{Float, Vec3f};
use cgmath::InnerSpace;

pub mod consts {
    pub use std::f32::consts::*;
    pub const INV_PI: f32 = FRAC_1_PI;
    pub const INV_2PI: f32 = 0.5 * FRAC_1_PI;
    pub const INV_4PI: f32 = 0.25 * FRAC_1_PI;
}

pub const INFINITY: Float = std::f32::INFINITY;

/// Offset used when spawning rays off a surface, scaled by the magnitude of the hit point.
pub const RAY_EPSILON: Float = 1.0e-4;

pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// Bound on the relative rounding error of `n` successive floating point operations.
pub fn gamma(n: i32) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

pub fn lerp(t: Float, v1: Float, v2: Float) -> Float {
    (1.0 - t) * v1 + t * v2
}

pub fn abs_dot(v1: Vec3f, v2: Vec3f) -> Float {
    v1.dot(v2).abs()
}

pub fn safe_sqrt(x: Float) -> Float {
    x.max(0.0).sqrt()
}

/// Solves `a t^2 + b t + c = 0`, returning the roots in increasing order.
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    let (a, b, c) = (a as f64, b as f64, c as f64);
    let discrim = b * b - 4.0 * a * c;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim = discrim.sqrt();

    let q = if b < 0.0 {
        -0.5 * (b - root_discrim)
    } else {
        -0.5 * (b + root_discrim)
    };
    let t0 = (q / a) as Float;
    let t1 = (c / q) as Float;

    if t0 > t1 { Some((t1, t0)) } else { Some((t0, t1)) }
}

pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vec3f {
    Vec3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Builds an orthonormal basis around `v1`, which must be normalized.
pub fn coordinate_system(v1: Vec3f) -> (Vec3f, Vec3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vec3f::new(-v1.z, 0.0, v1.x) / Float::sqrt(v1.x * v1.x + v1.z * v1.z)
    } else {
        Vec3f::new(0.0, v1.z, -v1.y) / Float::sqrt(v1.y * v1.y + v1.z * v1.z)
    };
    let v3 = v1.cross(v2);
    (v2, v3)
}

pub fn max_dimension(v: Vec3f) -> usize {
    if v.x > v.y {
        if v.x > v.z { 0 } else { 2 }
    } else if v.y > v.z {
        1
    } else {
        2
    }
}

pub fn permute_vec(v: Vec3f, x: usize, y: usize, z: usize) -> Vec3f {
    Vec3f::new(v[x], v[y], v[z])
}

/// Relative luminance of a linear Rec.709 triple.
pub fn luminance(rgb: [Float; 3]) -> Float {
    0.212671 * rgb[0] + 0.715160 * rgb[1] + 0.072169 * rgb[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_roots_are_ordered() {
        let (t0, t1) = quadratic(1.0, -3.0, 2.0).unwrap();
        assert_relative_eq!(t0, 1.0);
        assert_relative_eq!(t1, 2.0);

        assert!(quadratic(1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_coordinate_system_is_orthonormal() {
        let v1 = Vec3f::new(0.3, -0.5, 0.8).normalize();
        let (v2, v3) = coordinate_system(v1);
        assert_relative_eq!(v1.dot(v2), 0.0, epsilon = 1e-6);
        assert_relative_eq!(v1.dot(v3), 0.0, epsilon = 1e-6);
        assert_relative_eq!(v2.dot(v3), 0.0, epsilon = 1e-6);
        assert_relative_eq!(v2.magnitude(), 1.0, epsilon = 1e-6);
    }
}
