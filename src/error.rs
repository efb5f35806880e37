use crate::variant::Variant;
use std::path::PathBuf;

/// Failure to read or interpret a scene description.
#[derive(thiserror::Error, Debug)]
pub enum SceneLoadError {
    #[error("failed to read scene file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("unresolved reference to id '{0}'")]
    UnresolvedReference(String),

    #[error("missing asset {path}: {message}")]
    MissingAsset { path: PathBuf, message: String },

    #[error("unsupported {kind} plugin '{name}'")]
    UnsupportedPlugin { kind: String, name: String },

    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("variant '{0}' is not supported by this scene loader")]
    UnsupportedVariant(Variant),
}

impl SceneLoadError {
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    pub fn unsupported(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnsupportedPlugin { kind: kind.into(), name: name.into() }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("non-finite radiance at pixel ({x}, {y})")]
    NonFiniteRadiance { x: i32, y: i32 },

    #[error("failed to build render thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("render engine error: {0}")]
    Engine(String),
}

impl RenderError {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}

/// Failure to write (or read back) an output image.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image encoding error")]
    Image(#[from] image::ImageError),

    #[error("openexr error")]
    Exr(#[from] exr::error::Error),

    #[error("unsupported image format for {0}")]
    UnsupportedFormat(PathBuf),

    #[error("output file {0} is empty")]
    EmptyOutput(PathBuf),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("engine '{engine}' does not support variant '{variant}'")]
    UnsupportedVariant { engine: String, variant: Variant },

    #[error("scene load failed")]
    SceneLoad(#[from] SceneLoadError),

    #[error("render failed")]
    Render(#[from] RenderError),

    #[error("export failed")]
    Export(#[from] ExportError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown variant '{0}'")]
pub struct VariantParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_messages_are_stable() {
        assert!(SceneLoadError::parameter("x").to_string().contains("invalid parameter:"));
        assert!(SceneLoadError::unsupported("bsdf", "plastic").to_string().contains("bsdf plugin 'plastic'"));
        assert!(RenderError::engine("x").to_string().contains("render engine error:"));
        assert_eq!(VariantParseError("foo".into()).to_string(), "unknown variant 'foo'");
    }

    #[test]
    fn pipeline_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::from(ExportError::io("out.png", io));
        let source = err.source().expect("export error source");
        assert!(source.to_string().contains("out.png"));
    }
}
