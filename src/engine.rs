use crate::error::{RenderError, SceneLoadError};
use crate::imageio::Bitmap;
use crate::variant::Variant;
use std::path::Path;

/// A renderer the export pipeline can drive.
///
/// The variant is fixed when a scene is loaded and travels with the returned scene handle,
/// so an engine never holds a global rendering mode.
pub trait RenderEngine {
    type Scene;

    fn name(&self) -> &str;

    fn supports_variant(&self, variant: Variant) -> bool;

    fn load_scene(&self, path: &Path, variant: Variant) -> Result<Self::Scene, SceneLoadError>;

    /// Renders synchronously, returning a linear floating point image.
    fn render(&self, scene: &Self::Scene) -> Result<Bitmap, RenderError>;
}
