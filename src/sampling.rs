use crate::{Float, Point2f, Vec2f, Vec3f};
use crate::math::consts::{FRAC_PI_2, FRAC_PI_4, INV_2PI, INV_4PI, INV_PI, PI};

pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    // map sample from [0, 1] to [-1, 1]
    let u_offset = 2.0 * u - Vec2f::new(1.0, 1.0);
    if u_offset == Point2f::new(0.0, 0.0) {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, FRAC_PI_2 - FRAC_PI_4 * (u_offset.x / u_offset.y))
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

pub fn cosine_sample_hemisphere(u: Point2f) -> Vec3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    Vec3f::new(d.x, d.y, z)
}

pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

pub fn uniform_sample_sphere(u: Point2f) -> Vec3f {
    let z = 1.0 - 2.0 * u[0];
    let r = Float::max(0.0, 1.0 - z * z).sqrt();
    let phi = 2.0 * PI * u[1];
    Vec3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_sphere_pdf() -> Float {
    INV_4PI
}

pub fn uniform_hemisphere_pdf() -> Float {
    INV_2PI
}

/// Returns barycentric coordinates `(b0, b1)` uniformly distributed over a triangle.
pub fn uniform_sample_triangle(u: Point2f) -> (Float, Float) {
    let su0 = u[0].sqrt();
    (1.0 - su0, u[1] * su0)
}

pub fn power_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f.is_infinite() {
        return 1.0;
    }
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

/// Piecewise-constant distribution over `n` buckets, sampled by inverting its CDF.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    func: Vec<Float>,
    cdf: Vec<Float>,
    func_int: Float,
}

impl Distribution1D {
    pub fn new(func: Vec<Float>) -> Self {
        let n = func.len();
        let mut cdf = vec![0.0; n + 1];
        for i in 1..=n {
            cdf[i] = cdf[i - 1] + func[i - 1] / n as Float;
        }
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, c) in cdf.iter_mut().enumerate().skip(1) {
                *c = i as Float / n as Float;
            }
        } else {
            for c in cdf.iter_mut().skip(1) {
                *c /= func_int;
            }
        }
        Self { func, cdf, func_int }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn func_int(&self) -> Float {
        self.func_int
    }

    /// Picks a bucket, returning its index, its probability and `u` remapped into `[0, 1)`
    /// within the bucket.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float, Float) {
        let n = self.count();
        // last index whose cdf value is <= u
        let offset = self.cdf
            .partition_point(|&c| c <= u)
            .saturating_sub(1)
            .min(n - 1);
        let pdf = self.discrete_pdf(offset);
        let width = self.cdf[offset + 1] - self.cdf[offset];
        let u_remapped = if width > 0.0 {
            ((u - self.cdf[offset]) / width).min(1.0 - Float::EPSILON)
        } else {
            0.0
        };
        (offset, pdf, u_remapped)
    }

    pub fn discrete_pdf(&self, index: usize) -> Float {
        if self.func_int == 0.0 {
            return 1.0 / self.count() as Float;
        }
        self.func[index] / (self.func_int * self.count() as Float)
    }
}
