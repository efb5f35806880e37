//! Execution variants: which backend runs the renderer and how colour is represented.

use crate::error::VariantParseError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Scalar,
    Llvm,
    Cuda,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorMode {
    Mono,
    Rgb,
    Spectral,
}

/// A rendering mode such as `scalar_rgb` or `llvm_ad_spectral_polarized`.
///
/// The vectorized backends always carry the `_ad` infix, the scalar backend never does.
///
/// ```
/// use render_export::Variant;
/// let v: Variant = "cuda_ad_rgb".parse().unwrap();
/// assert_eq!(v.to_string(), "cuda_ad_rgb");
/// assert_eq!(Variant::default().to_string(), "scalar_rgb");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variant {
    pub backend: Backend,
    pub color: ColorMode,
    pub polarized: bool,
}

impl Variant {
    pub const SCALAR_RGB: Variant = Variant { backend: Backend::Scalar, color: ColorMode::Rgb, polarized: false };

    pub fn new(backend: Backend, color: ColorMode, polarized: bool) -> Self {
        Self { backend, color, polarized }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::SCALAR_RGB
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            Backend::Scalar => "scalar",
            Backend::Llvm => "llvm_ad",
            Backend::Cuda => "cuda_ad",
        };
        let color = match self.color {
            ColorMode::Mono => "mono",
            ColorMode::Rgb => "rgb",
            ColorMode::Spectral => "spectral",
        };
        write!(f, "{}_{}", backend, color)?;
        if self.polarized {
            f.write_str("_polarized")?;
        }
        Ok(())
    }
}

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VariantParseError(s.to_string());

        let (rest, polarized) = match s.strip_suffix("_polarized") {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let (backend, color) = if let Some(color) = rest.strip_prefix("scalar_") {
            (Backend::Scalar, color)
        } else if let Some(color) = rest.strip_prefix("llvm_ad_") {
            (Backend::Llvm, color)
        } else if let Some(color) = rest.strip_prefix("cuda_ad_") {
            (Backend::Cuda, color)
        } else {
            return Err(err());
        };
        let color = match color {
            "mono" => ColorMode::Mono,
            "rgb" => ColorMode::Rgb,
            "spectral" => ColorMode::Spectral,
            _ => return Err(err()),
        };
        Ok(Variant { backend, color, polarized })
    }
}
