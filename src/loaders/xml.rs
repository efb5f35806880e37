//! Document model for the Mitsuba 3 XML dialect and the parsing of its attribute values.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::{Float, Point3f, Transform, Vec3f};
use crate::error::SceneLoadError;
use crate::loaders::{PropVal, PropertyList};
use crate::spectrum::Spectrum;

#[derive(Debug, Deserialize)]
pub struct SceneDoc {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "$value", default)]
    pub children: Vec<Node>,
}

/// Any element that may appear inside `<scene>` or inside an object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Default(NamedValue),
    Integer(NamedValue),
    Float(NamedValue),
    Boolean(NamedValue),
    String(NamedValue),
    Rgb(NamedValue),
    Spectrum(NamedValue),
    Point(VectorNode),
    Vector(VectorNode),
    Transform(TransformNode),
    Ref(RefNode),

    Integrator(ObjectNode),
    Sensor(ObjectNode),
    Film(ObjectNode),
    Sampler(ObjectNode),
    Rfilter(ObjectNode),
    Bsdf(ObjectNode),
    Shape(ObjectNode),
    Emitter(ObjectNode),
    Texture(ObjectNode),
    Medium(ObjectNode),
}

#[derive(Debug, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct VectorNode {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub z: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "$value", default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Deserialize)]
pub struct TransformNode {
    pub name: String,
    #[serde(rename = "$value", default)]
    pub ops: Vec<TransformOp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformOp {
    Translate(Xyz),
    Scale(Xyz),
    Rotate(RotateOp),
    Lookat(LookAtOp),
    Matrix(MatrixOp),
}

#[derive(Debug, Deserialize)]
pub struct Xyz {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub z: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RotateOp {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
    #[serde(default)]
    pub z: Option<String>,
    pub angle: String,
}

#[derive(Debug, Deserialize)]
pub struct LookAtOp {
    pub origin: String,
    pub target: String,
    #[serde(default)]
    pub up: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixOp {
    pub value: String,
}

pub fn parse_document(path: &Path, text: &str) -> Result<SceneDoc, SceneLoadError> {
    serde_xml_rs::from_str(text).map_err(|e| SceneLoadError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Substitutes `$name` parameters and parses attribute values, reporting failures against
/// the scene file.
#[derive(Debug, Clone)]
pub struct Resolver {
    path: PathBuf,
    params: HashMap<String, String>,
}

impl Resolver {
    /// Collects the `<default>` declarations of the document. Entries in `overrides` win
    /// over the declared defaults.
    pub fn new(path: &Path, doc: &SceneDoc, overrides: &[(String, String)]) -> Self {
        let mut params: HashMap<String, String> = doc.children.iter()
            .filter_map(|node| match node {
                Node::Default(nv) => Some((nv.name.clone(), nv.value.clone())),
                _ => None,
            })
            .collect();
        for (name, value) in overrides {
            params.insert(name.clone(), value.clone());
        }
        Self { path: path.to_path_buf(), params }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn malformed(&self, message: impl Into<String>) -> SceneLoadError {
        SceneLoadError::Malformed { path: self.path.clone(), message: message.into() }
    }

    /// Replaces every `$name` with the value of the parameter `name`.
    pub fn subst(&self, s: &str) -> Result<String, SceneLoadError> {
        if !s.contains('$') {
            return Ok(s.to_string());
        }
        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(after.len());
            let name = &after[..len];
            if name.is_empty() {
                out.push('$');
            } else {
                let value = self.params.get(name)
                    .ok_or_else(|| SceneLoadError::parameter(format!("undefined parameter '${}'", name)))?;
                out.push_str(value);
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        Ok(out)
    }

    pub fn float(&self, s: &str) -> Result<Float, SceneLoadError> {
        let s = self.subst(s)?;
        s.trim().parse::<Float>().map_err(|_| self.malformed(format!("expected a number, found '{}'", s)))
    }

    pub fn int(&self, s: &str) -> Result<i64, SceneLoadError> {
        let s = self.subst(s)?;
        s.trim().parse::<i64>().map_err(|_| self.malformed(format!("expected an integer, found '{}'", s)))
    }

    pub fn boolean(&self, s: &str) -> Result<bool, SceneLoadError> {
        let s = self.subst(s)?;
        match s.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.malformed(format!("expected true or false, found '{}'", other))),
        }
    }

    /// Numbers separated by commas and/or whitespace.
    pub fn floats(&self, s: &str) -> Result<Vec<Float>, SceneLoadError> {
        let s = self.subst(s)?;
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<Float>().map_err(|_| self.malformed(format!("expected a number, found '{}'", t))))
            .collect()
    }

    pub fn vec3(&self, s: &str) -> Result<Vec3f, SceneLoadError> {
        match self.floats(s)?.as_slice() {
            &[x, y, z] => Ok(Vec3f::new(x, y, z)),
            _ => Err(self.malformed(format!("expected three components, found '{}'", s))),
        }
    }

    /// `value="r, g, b"`, a single grey value, or a `#rrggbb` hex colour.
    pub fn rgb(&self, s: &str) -> Result<Spectrum, SceneLoadError> {
        let s = self.subst(s)?;
        let t = s.trim();
        if let Some(hex) = t.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(crate::spectrum::spectrum_from_rgb8([r, g, b]));
                }
            }
            return Err(self.malformed(format!("invalid hex colour '{}'", t)));
        }
        match self.floats(t)?.as_slice() {
            &[v] => Ok(Spectrum::uniform(v)),
            &[r, g, b] => Ok(Spectrum::rgb(r, g, b)),
            _ => Err(self.malformed(format!("expected one or three colour components, found '{}'", t))),
        }
    }

    /// Only uniform spectra are representable; wavelength-value lists are rejected.
    pub fn spectrum(&self, s: &str) -> Result<Spectrum, SceneLoadError> {
        let s = self.subst(s)?;
        if s.contains(':') {
            return Err(SceneLoadError::parameter(format!("sampled spectrum '{}' is not supported, use rgb", s)));
        }
        Ok(Spectrum::uniform(self.float(&s)?))
    }

    /// Components from either `value` or the `x`/`y`/`z` attributes, each defaulting to
    /// `default`. A single `value` applies to all three components.
    fn components(
        &self,
        value: &Option<String>,
        x: &Option<String>,
        y: &Option<String>,
        z: &Option<String>,
        default: Float,
    ) -> Result<Vec3f, SceneLoadError> {
        if let Some(value) = value {
            return match self.floats(value)?.as_slice() {
                &[v] => Ok(Vec3f::new(v, v, v)),
                &[x, y, z] => Ok(Vec3f::new(x, y, z)),
                _ => Err(self.malformed(format!("expected one or three components, found '{}'", value))),
            };
        }
        let c = |s: &Option<String>| s.as_deref().map_or(Ok(default), |s| self.float(s));
        Ok(Vec3f::new(c(x)?, c(y)?, c(z)?))
    }

    pub fn vector_node(&self, node: &VectorNode) -> Result<Vec3f, SceneLoadError> {
        self.components(&node.value, &node.x, &node.y, &node.z, 0.0)
    }

    /// Composes the operations in document order, each applied after the previous ones.
    pub fn transform(&self, node: &TransformNode) -> Result<Transform, SceneLoadError> {
        let mut tf = Transform::IDENTITY;
        for op in &node.ops {
            let next = match op {
                TransformOp::Translate(t) => {
                    Transform::translate(self.components(&t.value, &t.x, &t.y, &t.z, 0.0)?)
                }
                TransformOp::Scale(s) => {
                    let v = self.components(&s.value, &s.x, &s.y, &s.z, 1.0)?;
                    Transform::scale(v.x, v.y, v.z)
                        .ok_or_else(|| self.malformed("scale by zero"))?
                }
                TransformOp::Rotate(r) => {
                    let axis = self.components(&r.value, &r.x, &r.y, &r.z, 0.0)?;
                    let angle = self.float(&r.angle)?;
                    Transform::rotate(axis, angle)
                        .ok_or_else(|| self.malformed("rotation about a zero axis"))?
                }
                TransformOp::Lookat(l) => {
                    let origin = self.vec3(&l.origin)?;
                    let target = self.vec3(&l.target)?;
                    let up = match &l.up {
                        Some(up) => self.vec3(up)?,
                        None => Vec3f::new(0.0, 1.0, 0.0),
                    };
                    Transform::look_at(
                        Point3f::new(origin.x, origin.y, origin.z),
                        Point3f::new(target.x, target.y, target.z),
                        up,
                    ).ok_or_else(|| self.malformed("degenerate lookat: up is parallel to the view direction"))?
                }
                TransformOp::Matrix(m) => {
                    let v = self.floats(&m.value)?;
                    let values: [Float; 16] = v.as_slice().try_into()
                        .map_err(|_| self.malformed(format!("matrix needs 16 values, found {}", v.len())))?;
                    Transform::from_row_major(&values)
                        .ok_or_else(|| self.malformed("singular matrix"))?
                }
            };
            tf = tf.then(next);
        }
        Ok(tf)
    }

    /// Gathers the property elements among `children` into a property list. Nested objects
    /// are left to the caller.
    pub fn properties(&self, plugin: &str, children: &[Node]) -> Result<PropertyList, SceneLoadError> {
        let mut props = PropertyList::new(plugin);
        for child in children {
            let (name, value): (&str, PropVal) = match child {
                Node::Integer(nv) => (nv.name.as_str(), PropVal::Int(self.int(&nv.value)?)),
                Node::Float(nv) => (nv.name.as_str(), PropVal::Float(self.float(&nv.value)?)),
                Node::Boolean(nv) => (nv.name.as_str(), PropVal::Bool(self.boolean(&nv.value)?)),
                Node::String(nv) => (nv.name.as_str(), PropVal::String(self.subst(&nv.value)?)),
                Node::Rgb(nv) => (nv.name.as_str(), PropVal::Spectrum(self.rgb(&nv.value)?)),
                Node::Spectrum(nv) => (nv.name.as_str(), PropVal::Spectrum(self.spectrum(&nv.value)?)),
                Node::Point(v) => {
                    let p = self.vector_node(v)?;
                    (v.name.as_str(), PropVal::Point(Point3f::new(p.x, p.y, p.z)))
                }
                Node::Vector(v) => (v.name.as_str(), PropVal::Vector(self.vector_node(v)?)),
                Node::Transform(t) => (t.name.as_str(), PropVal::Transform(self.transform(t)?)),
                _ => continue,
            };
            props.insert(name, value);
        }
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transformable;
    use cgmath::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    const SCENE: &str = r#"
        <scene version="3.0.0">
            <default name="spp" value="16"/>
            <default name="res" value="32"/>
            <integrator type="path">
                <integer name="max_depth" value="4"/>
            </integrator>
            <sensor type="perspective">
                <float name="fov" value="40"/>
                <transform name="to_world">
                    <lookat origin="0, 0, 4" target="0, 0, 0" up="0, 1, 0"/>
                </transform>
                <sampler type="independent">
                    <integer name="sample_count" value="$spp"/>
                </sampler>
                <film type="hdrfilm">
                    <integer name="width" value="$res"/>
                    <integer name="height" value="$res"/>
                    <rfilter type="box"/>
                </film>
            </sensor>
            <bsdf type="diffuse" id="white">
                <rgb name="reflectance" value="0.8, 0.8, 0.8"/>
            </bsdf>
            <shape type="sphere">
                <point name="center" x="1" y="2" z="3"/>
                <ref id="white"/>
            </shape>
        </scene>
    "#;

    #[test]
    fn test_parse_document_structure() {
        let doc = parse_document(Path::new("test.xml"), SCENE).unwrap();
        assert_eq!(doc.version.as_deref(), Some("3.0.0"));
        let kinds: Vec<&str> = doc.children.iter().map(|n| match n {
            Node::Default(_) => "default",
            Node::Integrator(_) => "integrator",
            Node::Sensor(_) => "sensor",
            Node::Bsdf(_) => "bsdf",
            Node::Shape(_) => "shape",
            _ => "other",
        }).collect();
        assert_eq!(kinds, vec!["default", "default", "integrator", "sensor", "bsdf", "shape"]);

        if let Node::Shape(shape) = &doc.children[5] {
            assert_eq!(shape.kind, "sphere");
            assert!(matches!(&shape.children[1], Node::Ref(r) if r.id == "white"));
        } else {
            panic!("expected a shape");
        }
    }

    #[test]
    fn test_defaults_and_overrides() {
        let doc = parse_document(Path::new("test.xml"), SCENE).unwrap();
        let resolver = Resolver::new(Path::new("test.xml"), &doc, &[("spp".into(), "64".into())]);
        assert_eq!(resolver.int("$spp").unwrap(), 64);
        assert_eq!(resolver.int("$res").unwrap(), 32);
        assert_eq!(resolver.subst("a_$res.exr").unwrap(), "a_32.exr");
        assert!(matches!(resolver.subst("$nope"), Err(SceneLoadError::Parameter(_))));
    }

    #[test]
    fn test_malformed_xml_is_reported() {
        let err = parse_document(Path::new("bad.xml"), "<scene><shape type=").unwrap_err();
        assert!(matches!(err, SceneLoadError::Malformed { .. }));
    }

    #[test]
    fn test_value_parsing() {
        let doc = parse_document(Path::new("t.xml"), "<scene/>").unwrap();
        let r = Resolver::new(Path::new("t.xml"), &doc, &[]);
        assert_eq!(r.rgb("0.5").unwrap(), Spectrum::uniform(0.5));
        assert_eq!(r.rgb("0.1 0.2, 0.3").unwrap(), Spectrum::rgb(0.1, 0.2, 0.3));
        assert_eq!(r.rgb("#ff0000").unwrap(), Spectrum::rgb(1.0, 0.0, 0.0));
        assert!(r.rgb("1, 2").is_err());
        assert!(r.spectrum("400:0.1, 700:0.5").is_err());
        assert!(r.boolean("yes").is_err());
    }

    #[test]
    fn test_transform_ops_apply_in_document_order() {
        let xml = r#"<scene><shape type="sphere"><transform name="to_world">
            <scale value="2"/>
            <translate x="1"/>
        </transform></shape></scene>"#;
        let doc = parse_document(Path::new("t.xml"), xml).unwrap();
        let r = Resolver::new(Path::new("t.xml"), &doc, &[]);
        let Node::Shape(shape) = &doc.children[0] else { panic!("expected a shape") };
        let Node::Transform(t) = &shape.children[0] else { panic!("expected a transform") };
        let tf = r.transform(t).unwrap();
        // scaled first, then translated
        assert_abs_diff_eq!(Point3f::new(1.0, 0.0, 0.0).transform(tf), Point3f::new(3.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_properties_collects_typed_values() {
        let doc = parse_document(Path::new("test.xml"), SCENE).unwrap();
        let r = Resolver::new(Path::new("test.xml"), &doc, &[]);
        let Node::Shape(shape) = &doc.children[5] else { panic!("expected a shape") };
        let mut props = r.properties("sphere", &shape.children).unwrap();
        let center: Point3f = props.get_required("center").unwrap();
        assert_eq!(center, Point3f::new(1.0, 2.0, 3.0));
    }
}
