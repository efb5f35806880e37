use crate::Float;

/// Separable pixel reconstruction filter.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Evaluates the filter at offset `(x, y)` from the pixel center.
    fn evaluate(&self, x: Float, y: Float) -> Float;

    fn radius(&self) -> Float;
}

#[derive(Clone, Copy, Debug)]
pub struct BoxFilter {
    pub radius: Float,
}

impl Default for BoxFilter {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

impl Filter for BoxFilter {
    fn evaluate(&self, x: Float, y: Float) -> Float {
        if x.abs() <= self.radius && y.abs() <= self.radius { 1.0 } else { 0.0 }
    }

    fn radius(&self) -> Float {
        self.radius
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TentFilter {
    pub radius: Float,
}

impl Default for TentFilter {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl Filter for TentFilter {
    fn evaluate(&self, x: Float, y: Float) -> Float {
        let tent = |v: Float| (1.0 - v.abs() / self.radius).max(0.0);
        tent(x) * tent(y)
    }

    fn radius(&self) -> Float {
        self.radius
    }
}

/// Gaussian truncated at four standard deviations, shifted to reach zero at the radius.
#[derive(Clone, Copy, Debug)]
pub struct GaussianFilter {
    stddev: Float,
    radius: Float,
    exp_radius: Float,
}

impl GaussianFilter {
    pub fn new(stddev: Float) -> Self {
        let radius = 4.0 * stddev;
        Self {
            stddev,
            radius,
            exp_radius: Self::gaussian(radius, stddev),
        }
    }

    fn gaussian(d: Float, stddev: Float) -> Float {
        (-d * d / (2.0 * stddev * stddev)).exp()
    }

    pub fn stddev(&self) -> Float {
        self.stddev
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Filter for GaussianFilter {
    fn evaluate(&self, x: Float, y: Float) -> Float {
        let g = |v: Float| (Self::gaussian(v, self.stddev) - self.exp_radius).max(0.0);
        g(x) * g(y)
    }

    fn radius(&self) -> Float {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_vanish_outside_radius() {
        let filters: Vec<Box<dyn Filter>> = vec![
            Box::new(BoxFilter::default()),
            Box::new(TentFilter::default()),
            Box::new(GaussianFilter::default()),
        ];
        for f in &filters {
            let r = f.radius();
            assert!(f.evaluate(0.0, 0.0) > 0.0, "{:?}", f);
            assert_eq!(f.evaluate(r + 0.01, 0.0), 0.0, "{:?}", f);
            assert_eq!(f.evaluate(0.0, -r - 0.01), 0.0, "{:?}", f);
        }
        assert_eq!(GaussianFilter::default().radius(), 2.0);
    }
}
