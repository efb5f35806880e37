#[macro_use] pub mod macros; // must stay at the top
pub mod math;
pub mod geometry;
pub mod spectrum;
pub mod sampling;
pub mod sampler;
pub mod camera;
pub mod filter;
pub mod film;
pub mod interaction;
pub mod shapes;
pub mod primitive;
pub mod bvh;
pub mod fresnel;
pub mod reflection;
pub mod light;
pub mod scene;
pub mod integrator;
pub mod loaders;
pub mod imageio;
pub mod variant;
pub mod error;
pub mod engine;
pub mod renderer;
pub mod pipeline;

pub use geometry::*;
pub use math::*;
pub use interaction::SurfaceInteraction;

pub use engine::RenderEngine;
pub use error::{ExportError, PipelineError, RenderError, SceneLoadError};
pub use imageio::{Bitmap, ComponentFormat, FileFormat, PixelFormat};
pub use pipeline::{render_and_export, ExportArtifacts, ExportOptions, ExportTarget};
pub use renderer::{CpuRenderer, RenderOptions};
pub use variant::Variant;

use cgmath::{Point2, Point3, Vector2, Vector3};
use num::{Bounded, Num};
use num::traits::NumAssignOps;
use std::fmt::Debug;

pub type Float = f32;

pub type Point2f = Point2<Float>;
pub type Point2i = Point2<i32>;
pub type Point3f = Point3<Float>;
pub type Vec2f = Vector2<Float>;
pub type Vec2i = Vector2<i32>;
pub type Vec3f = Vector3<Float>;

pub trait Scalar: Num + NumAssignOps + PartialOrd + Bounded + Copy + Debug {
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

impl Scalar for f32 {
    fn min(self, other: Self) -> Self {
        self.min(other)
    }

    fn max(self, other: Self) -> Self {
        self.max(other)
    }
}

impl Scalar for i32 {
    fn min(self, other: Self) -> Self {
        Ord::min(self, other)
    }

    fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }
}
