//! Scene loading: the Mitsuba XML document model, typed plugin properties and the plugin
//! constructors that turn them into scene objects.

use std::collections::HashMap;
use std::convert::{TryFrom, TryInto};
use std::path::{Path, PathBuf};
use crate::{Point3f, Vec3f, Float, Transform};
use crate::error::SceneLoadError;
use crate::spectrum::Spectrum;

pub mod xml;
pub mod constructors;
pub mod mitsuba;

pub use mitsuba::{load_mitsuba_scene, LoadOptions};

/// A property value after `$name` substitution and parsing.
#[derive(Debug, Clone)]
pub enum PropVal {
    Int(i64),
    Float(Float),
    Bool(bool),
    String(String),
    Spectrum(Spectrum),
    Point(Point3f),
    Vector(Vec3f),
    Transform(Transform),
}

impl PropVal {
    fn type_name(&self) -> &'static str {
        match self {
            PropVal::Int(_) => "integer",
            PropVal::Float(_) => "float",
            PropVal::Bool(_) => "boolean",
            PropVal::String(_) => "string",
            PropVal::Spectrum(_) => "rgb",
            PropVal::Point(_) => "point",
            PropVal::Vector(_) => "vector",
            PropVal::Transform(_) => "transform",
        }
    }
}

#[derive(Debug)]
pub struct TryFromParamErr(&'static str);

macro_rules! impl_basic_conversions {
    ($param_variant:ident, $into_ty:ty, $ty_name:expr) => {
        impl TryFrom<PropVal> for $into_ty {
            type Error = TryFromParamErr;

            fn try_from(value: PropVal) -> Result<Self, Self::Error> {
                match value {
                    PropVal::$param_variant(v) => Ok(v),
                    _ => Err(TryFromParamErr($ty_name))
                }
            }
        }

        impl From<$into_ty> for PropVal {
            fn from(value: $into_ty) -> PropVal {
                PropVal::$param_variant(value)
            }
        }
    };
}

impl_basic_conversions!(Int, i64, "integer");
impl_basic_conversions!(Bool, bool, "boolean");
impl_basic_conversions!(String, String, "string");
impl_basic_conversions!(Point, Point3f, "point");
impl_basic_conversions!(Transform, Transform, "transform");

impl From<Float> for PropVal {
    fn from(value: Float) -> PropVal {
        PropVal::Float(value)
    }
}

impl From<Spectrum> for PropVal {
    fn from(value: Spectrum) -> PropVal {
        PropVal::Spectrum(value)
    }
}

impl From<Vec3f> for PropVal {
    fn from(value: Vec3f) -> PropVal {
        PropVal::Vector(value)
    }
}

// integers are accepted where floats are expected
impl TryFrom<PropVal> for Float {
    type Error = TryFromParamErr;

    fn try_from(value: PropVal) -> Result<Self, Self::Error> {
        match value {
            PropVal::Float(v) => Ok(v),
            PropVal::Int(v) => Ok(v as Float),
            _ => Err(TryFromParamErr("float")),
        }
    }
}

// a plain number stands for a uniform spectrum
impl TryFrom<PropVal> for Spectrum {
    type Error = TryFromParamErr;

    fn try_from(value: PropVal) -> Result<Self, Self::Error> {
        match value {
            PropVal::Spectrum(s) => Ok(s),
            PropVal::Float(v) => Ok(Spectrum::uniform(v)),
            PropVal::Int(v) => Ok(Spectrum::uniform(v as Float)),
            _ => Err(TryFromParamErr("rgb")),
        }
    }
}

// points and vectors are written the same way
impl TryFrom<PropVal> for Vec3f {
    type Error = TryFromParamErr;

    fn try_from(value: PropVal) -> Result<Self, Self::Error> {
        match value {
            PropVal::Vector(v) => Ok(v),
            PropVal::Point(p) => Ok(Vec3f::new(p.x, p.y, p.z)),
            _ => Err(TryFromParamErr("vector")),
        }
    }
}

/// Properties of one plugin instance, consumed by its constructor.
#[derive(Debug, Clone)]
pub struct PropertyList {
    plugin: String,
    params: HashMap<String, PropVal>,
}

impl PropertyList {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self { plugin: plugin.into(), params: HashMap::new() }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropVal>) {
        let name = name.into();
        if self.params.insert(name.clone(), value.into()).is_some() {
            tracing::warn!(plugin = %self.plugin, property = %name, "property specified more than once, keeping the last value");
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Removes the property without converting it.
    pub fn take_raw(&mut self, name: &str) -> Option<PropVal> {
        self.params.remove(name)
    }

    /// Removes and returns the property, `None` if it is absent. A property of the wrong
    /// type is an error.
    pub fn get<T>(&mut self, name: &str) -> Result<Option<T>, SceneLoadError>
        where T: TryFrom<PropVal, Error=TryFromParamErr>
    {
        match self.params.remove(name) {
            None => Ok(None),
            Some(val) => {
                let found = val.type_name();
                val.try_into()
                    .map(Some)
                    .map_err(|e: TryFromParamErr| SceneLoadError::parameter(format!(
                        "{}: property '{}' should be {} but is {}", self.plugin, name, e.0, found
                    )))
            }
        }
    }

    pub fn get_or<T>(&mut self, name: &str, default: T) -> Result<T, SceneLoadError>
        where T: TryFrom<PropVal, Error=TryFromParamErr>
    {
        Ok(self.get(name)?.unwrap_or(default))
    }

    pub fn get_required<T>(&mut self, name: &str) -> Result<T, SceneLoadError>
        where T: TryFrom<PropVal, Error=TryFromParamErr>
    {
        self.get(name)?.ok_or_else(|| SceneLoadError::parameter(format!(
            "{}: missing required property '{}'", self.plugin, name
        )))
    }

    pub fn to_world(&mut self) -> Result<Transform, SceneLoadError> {
        self.get_or("to_world", Transform::IDENTITY)
    }

    /// Warns about every property no constructor asked for.
    pub fn finish(self) {
        let mut unused: Vec<&String> = self.params.keys().collect();
        unused.sort();
        for name in unused {
            tracing::warn!(plugin = %self.plugin, property = %name, "unused property");
        }
    }
}

/// Where relative asset paths in a scene are resolved from.
#[derive(Debug, Clone)]
pub struct Context {
    base_dir: PathBuf,
}

impl Context {
    pub fn new(scene_path: &Path) -> Self {
        let base_dir = scene_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { base_dir }
    }

    pub fn resolve(&self, filename: impl AsRef<Path>) -> PathBuf {
        let p = filename.as_ref();
        if p.is_absolute() { p.to_path_buf() } else { self.base_dir.join(p) }
    }
}
