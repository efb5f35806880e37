//! Render a scene once and export the image as an 8-bit PNG preview and a lossless
//! OpenEXR capture.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::engine::RenderEngine;
use crate::error::{ExportError, PipelineError};
use crate::imageio::{Bitmap, ComponentFormat, FileFormat, PixelFormat};
use crate::variant::Variant;
use crate::Float;

/// The scene file read and the two files written for one base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub scene: PathBuf,
    pub preview: PathBuf,
    pub capture: PathBuf,
}

fn with_appended_extension(base: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

impl ExportTarget {
    /// Extensions are appended to `basename`, never substituted: `a.b` reads `a.b.xml`.
    /// With an `output_dir` the outputs are written there under the base name's final
    /// component.
    ///
    /// ```
    /// use render_export::ExportTarget;
    /// use std::path::{Path, PathBuf};
    ///
    /// let t = ExportTarget::from_basename("scenes/cbox", Some(Path::new("out")));
    /// assert_eq!(t.scene, PathBuf::from("scenes/cbox.xml"));
    /// assert_eq!(t.preview, PathBuf::from("out/cbox.png"));
    /// assert_eq!(t.capture, PathBuf::from("out/cbox.exr"));
    /// ```
    pub fn from_basename(basename: impl AsRef<Path>, output_dir: Option<&Path>) -> Self {
        let basename = basename.as_ref();
        let scene = with_appended_extension(basename, "xml");
        let out_base = match (output_dir, basename.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => basename.to_path_buf(),
        };
        Self {
            scene,
            preview: with_appended_extension(&out_base, "png"),
            capture: with_appended_extension(&out_base, "exr"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Selected before the scene is loaded.
    pub variant: Variant,
    /// Encode the preview with the sRGB transfer curve instead of a linear clamp.
    pub srgb_gamma: bool,
    /// Exposure adjustment of the preview, in stops. The capture is never scaled.
    pub exposure: Float,
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            srgb_gamma: true,
            exposure: 0.0,
            output_dir: None,
        }
    }
}

/// What a successful export produced.
#[derive(Debug, Clone)]
pub struct ExportArtifacts {
    pub preview: PathBuf,
    pub capture: PathBuf,
    pub width: u32,
    pub height: u32,
    pub render_time: Duration,
}

/// Loads `<basename>.xml`, renders it once and writes `<basename>.png` and
/// `<basename>.exr` from the same image.
///
/// Every failure aborts the remaining steps. Nothing is written unless the render
/// succeeds.
pub fn render_and_export<E: RenderEngine>(
    engine: &E,
    basename: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<ExportArtifacts, PipelineError> {
    let target = ExportTarget::from_basename(basename, options.output_dir.as_deref());
    let _span = tracing::info_span!("export", scene = %target.scene.display()).entered();

    if !engine.supports_variant(options.variant) {
        return Err(PipelineError::UnsupportedVariant {
            engine: engine.name().to_string(),
            variant: options.variant,
        });
    }
    tracing::info!(engine = engine.name(), variant = %options.variant, "variant selected");

    let scene = engine.load_scene(&target.scene, options.variant)?;
    tracing::info!("scene loaded");

    let start = Instant::now();
    let image = engine.render(&scene)?;
    let render_time = start.elapsed();
    tracing::info!(width = image.width(), height = image.height(), elapsed = ?render_time, "rendered");

    export_bitmap(&image, &target, options)?;

    Ok(ExportArtifacts {
        preview: target.preview,
        capture: target.capture,
        width: image.width(),
        height: image.height(),
        render_time,
    })
}

/// Writes the preview and the capture of an already rendered image and checks that both
/// files are non-empty.
pub fn export_bitmap(bitmap: &Bitmap, target: &ExportTarget, options: &ExportOptions) -> Result<(), ExportError> {
    let preview = if options.exposure != 0.0 {
        bitmap.with_exposure(options.exposure)
    } else {
        bitmap.clone()
    };
    let preview = preview.convert(PixelFormat::Rgb, ComponentFormat::UInt8, options.srgb_gamma);
    preview.write_with_format(&target.preview, FileFormat::Png)?;
    ensure_non_empty(&target.preview)?;
    tracing::info!(path = %target.preview.display(), "wrote preview");

    bitmap.write_with_format(&target.capture, FileFormat::OpenExr)?;
    ensure_non_empty(&target.capture)?;
    tracing::info!(path = %target.capture.display(), "wrote capture");
    Ok(())
}

fn ensure_non_empty(path: &Path) -> Result<(), ExportError> {
    let len = std::fs::metadata(path)
        .map_err(|e| ExportError::io(path, e))?
        .len();
    if len == 0 {
        return Err(ExportError::EmptyOutput(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extension_is_appended() {
        let t = ExportTarget::from_basename("a.b", None);
        assert_eq!(t.scene, PathBuf::from("a.b.xml"));
        assert_eq!(t.preview, PathBuf::from("a.b.png"));
        assert_eq!(t.capture, PathBuf::from("a.b.exr"));
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert!(options.srgb_gamma);
        assert_eq!(options.variant, Variant::default());
        assert_eq!(options.exposure, 0.0);
    }

    #[test]
    fn test_export_bitmap_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = ExportTarget::from_basename(dir.path().join("img"), None);
        let bitmap = Bitmap::from_rgb_f32(2, 1, vec![0.0, 0.5, 1.0, 2.0, 0.25, 0.125]);
        export_bitmap(&bitmap, &target, &ExportOptions::default()).unwrap();

        let capture = Bitmap::read(&target.capture).unwrap();
        assert_eq!(capture.as_f32(), bitmap.as_f32());
        let preview = Bitmap::read(&target.preview).unwrap();
        assert_eq!(preview.size(), (2, 1));
        assert_eq!(preview.component_format(), ComponentFormat::UInt8);
    }
}
