//! Builds a `Scene` from a Mitsuba 3 XML file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use crate::camera::{FovAxis, PerspectiveCamera};
use crate::error::SceneLoadError;
use crate::film::Film;
use crate::filter::Filter;
use crate::integrator::{Integrator, PathIntegrator};
use crate::light::{DiffuseAreaLight, Light};
use crate::loaders::constructors::*;
use crate::loaders::xml::{self, Node, ObjectNode, Resolver, SceneDoc};
use crate::loaders::{Context, PropertyList};
use crate::primitive::Primitive;
use crate::reflection::{BxDF, LambertianReflection};
use crate::sampler::IndependentSampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::variant::Variant;
use crate::Transform;

/// Overrides applied on top of what the scene file declares.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Replaces the sampler's `sample_count`.
    pub spp: Option<u32>,
    /// Replaces the sampler's `seed`.
    pub seed: Option<u64>,
    /// `(name, value)` pairs taking precedence over the file's `<default>` parameters.
    pub defaults: Vec<(String, String)>,
}

pub fn load_mitsuba_scene(path: &Path, variant: Variant, options: &LoadOptions) -> Result<Scene, SceneLoadError> {
    let _span = tracing::debug_span!("load_scene", path = %path.display()).entered();

    let text = std::fs::read_to_string(path)
        .map_err(|source| SceneLoadError::Io { path: path.to_path_buf(), source })?;
    let doc = xml::parse_document(path, &text)?;
    if let Some(version) = &doc.version {
        tracing::debug!(%version, "scene format version");
    }

    let resolver = Resolver::new(path, &doc, &options.defaults);
    let ctx = Context::new(path);
    let builder = SceneBuilder {
        resolver: &resolver,
        ctx: &ctx,
        options,
        named_bsdfs: HashMap::new(),
    };
    builder.build(&doc, variant)
}

struct SensorParts {
    camera: PerspectiveCamera,
    film: Film,
    sampler: IndependentSampler,
}

struct SceneBuilder<'a> {
    resolver: &'a Resolver,
    ctx: &'a Context,
    options: &'a LoadOptions,
    named_bsdfs: HashMap<String, MaterialRef>,
}

impl<'a> SceneBuilder<'a> {
    fn build(mut self, doc: &SceneDoc, variant: Variant) -> Result<Scene, SceneLoadError> {
        // Top level bsdfs first, so shapes can refer to them regardless of order.
        for node in &doc.children {
            if let Node::Bsdf(obj) = node {
                let bsdf = self.build_bsdf(obj)?;
                match &obj.id {
                    Some(id) => {
                        if self.named_bsdfs.insert(id.clone(), bsdf).is_some() {
                            return Err(self.resolver.malformed(format!("duplicate id '{}'", id)));
                        }
                    }
                    None => tracing::warn!(bsdf = %obj.kind, "top level bsdf without an id is never used"),
                }
            }
        }

        let mut primitives = Vec::new();
        let mut lights: Vec<Arc<dyn Light>> = Vec::new();
        let mut integrator: Option<Box<dyn Integrator>> = None;
        let mut sensor: Option<SensorParts> = None;

        for node in &doc.children {
            match node {
                Node::Default(_) | Node::Bsdf(_) => {}
                Node::Shape(obj) => self.build_shape(obj, &mut primitives, &mut lights)?,
                Node::Emitter(obj) => {
                    let props = self.properties(obj)?;
                    lights.push(make_light(props)?);
                }
                Node::Integrator(obj) => {
                    if integrator.is_some() {
                        tracing::warn!("more than one integrator, keeping the last");
                    }
                    integrator = Some(make_integrator(self.properties(obj)?)?);
                }
                Node::Sensor(obj) => {
                    if sensor.is_some() {
                        tracing::warn!("more than one sensor, keeping the last");
                    }
                    sensor = Some(self.build_sensor(obj)?);
                }
                Node::Texture(obj) => return Err(SceneLoadError::unsupported("texture", &obj.kind)),
                Node::Medium(obj) => return Err(SceneLoadError::unsupported("medium", &obj.kind)),
                Node::Film(_) | Node::Sampler(_) | Node::Rfilter(_) => {
                    return Err(self.resolver.malformed("film, sampler and rfilter must be nested in a sensor"));
                }
                other => tracing::warn!(element = ?other, "ignoring top level property"),
            }
        }

        let integrator = integrator.unwrap_or_else(|| {
            tracing::debug!("no integrator, using path");
            Box::new(PathIntegrator::default())
        });
        let sensor = match sensor {
            Some(sensor) => sensor,
            None => {
                tracing::debug!("no sensor, using the default perspective camera");
                self.default_sensor()?
            }
        };

        tracing::debug!(
            primitives = primitives.len(),
            lights = lights.len(),
            width = sensor.film.resolution.x,
            height = sensor.film.resolution.y,
            "scene assembled"
        );

        Ok(Scene::new(
            primitives,
            lights,
            Box::new(sensor.camera),
            sensor.film,
            Box::new(sensor.sampler),
            integrator,
            variant,
        ))
    }

    fn properties(&self, obj: &ObjectNode) -> Result<PropertyList, SceneLoadError> {
        self.resolver.properties(&obj.kind, &obj.children)
    }

    fn lookup_bsdf(&self, id: &str) -> Result<MaterialRef, SceneLoadError> {
        let id = self.resolver.subst(id)?;
        self.named_bsdfs.get(&id)
            .cloned()
            .ok_or(SceneLoadError::UnresolvedReference(id))
    }

    fn build_bsdf(&self, obj: &ObjectNode) -> Result<MaterialRef, SceneLoadError> {
        let props = self.properties(obj)?;
        let mut nested = None;
        for child in &obj.children {
            let inner = match child {
                Node::Bsdf(inner) => self.build_bsdf(inner)?,
                Node::Ref(r) => self.lookup_bsdf(&r.id)?,
                Node::Texture(tex) => return Err(SceneLoadError::unsupported("texture", &tex.kind)),
                _ => continue,
            };
            if nested.is_some() {
                return Err(SceneLoadError::parameter(format!("{}: more than one nested bsdf", obj.kind)));
            }
            nested = Some(inner);
        }
        make_bsdf(props, nested)
    }

    fn build_shape(
        &self,
        obj: &ObjectNode,
        primitives: &mut Vec<Primitive>,
        lights: &mut Vec<Arc<dyn Light>>,
    ) -> Result<(), SceneLoadError> {
        let _span = tracing::debug_span!("shape", kind = %obj.kind).entered();
        let props = self.properties(obj)?;

        let mut bsdf: Option<MaterialRef> = None;
        let mut emitter: Option<PropertyList> = None;
        for child in &obj.children {
            match child {
                Node::Bsdf(b) => bsdf = Some(self.build_bsdf(b)?),
                Node::Ref(r) => bsdf = Some(self.lookup_bsdf(&r.id)?),
                Node::Emitter(e) => emitter = Some(self.properties(e)?),
                Node::Medium(m) => return Err(SceneLoadError::unsupported("medium", &m.kind)),
                Node::Texture(t) => return Err(SceneLoadError::unsupported("texture", &t.kind)),
                _ => {}
            }
        }
        let bsdf: MaterialRef = match bsdf {
            Some(bsdf) => bsdf,
            None => Some(Arc::new(LambertianReflection::new(Spectrum::uniform(0.5))) as Arc<dyn BxDF>),
        };

        let shapes = make_shape(props, self.ctx)?;
        let area_light: Option<Arc<DiffuseAreaLight>> = match emitter {
            Some(props) => Some(make_area_light(props, &shapes)?),
            None => None,
        };
        if let Some(light) = &area_light {
            lights.push(light.clone());
        }
        primitives.extend(shapes.into_iter().map(|shape| Primitive {
            shape,
            bsdf: bsdf.clone(),
            area_light: area_light.clone(),
        }));
        Ok(())
    }

    fn build_sensor(&self, obj: &ObjectNode) -> Result<SensorParts, SceneLoadError> {
        let props = self.properties(obj)?;
        let mut film = None;
        let mut sampler = None;
        for child in &obj.children {
            match child {
                Node::Film(f) => film = Some(self.build_film(f)?),
                Node::Sampler(s) => {
                    sampler = Some(make_sampler(self.properties(s)?, self.options.spp, self.options.seed)?);
                }
                _ => {}
            }
        }
        let film = match film {
            Some(film) => film,
            None => make_film(PropertyList::new("hdrfilm"), None)?,
        };
        let sampler = match sampler {
            Some(sampler) => sampler,
            None => make_sampler(PropertyList::new("independent"), self.options.spp, self.options.seed)?,
        };
        let camera = make_camera(props, film.resolution)?;
        Ok(SensorParts { camera, film, sampler })
    }

    fn build_film(&self, obj: &ObjectNode) -> Result<Film, SceneLoadError> {
        let props = self.properties(obj)?;
        let mut filter: Option<Arc<dyn Filter>> = None;
        for child in &obj.children {
            if let Node::Rfilter(f) = child {
                filter = Some(make_filter(self.properties(f)?)?);
            }
        }
        make_film(props, filter)
    }

    fn default_sensor(&self) -> Result<SensorParts, SceneLoadError> {
        let film = make_film(PropertyList::new("hdrfilm"), None)?;
        let sampler = make_sampler(PropertyList::new("independent"), self.options.spp, self.options.seed)?;
        let camera = PerspectiveCamera::new(Transform::IDENTITY, film.resolution, 39.597755, FovAxis::X, 0.01, 10000.0);
        Ok(SensorParts { camera, film, sampler })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Sampler;
    use crate::Point2i;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_scene(xml: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.xml");
        std::fs::write(&path, xml).unwrap();
        (dir, path)
    }

    const CBOX_LIKE: &str = r#"
        <scene version="3.0.0">
            <default name="spp" value="8"/>
            <default name="res" value="24"/>
            <integrator type="path">
                <integer name="max_depth" value="6"/>
            </integrator>
            <sensor type="perspective">
                <float name="fov" value="39.3"/>
                <transform name="to_world">
                    <lookat origin="0, 0, 3.9" target="0, 0, 0" up="0, 1, 0"/>
                </transform>
                <sampler type="independent">
                    <integer name="sample_count" value="$spp"/>
                </sampler>
                <film type="hdrfilm">
                    <integer name="width" value="$res"/>
                    <integer name="height" value="$res"/>
                    <string name="pixel_format" value="rgba"/>
                    <rfilter type="tent"/>
                </film>
            </sensor>
            <shape type="rectangle">
                <ref id="gray"/>
            </shape>
            <bsdf type="diffuse" id="gray">
                <rgb name="reflectance" value="0.5"/>
            </bsdf>
            <shape type="rectangle">
                <transform name="to_world">
                    <scale value="0.2"/>
                    <translate y="0.99"/>
                </transform>
                <emitter type="area">
                    <rgb name="radiance" value="18.4, 15.6, 8.0"/>
                </emitter>
            </shape>
            <shape type="sphere">
                <float name="radius" value="0.3"/>
                <bsdf type="twosided">
                    <bsdf type="disney_metallic">
                        <rgb name="albedo" value="0.9, 0.6, 0.3"/>
                        <float name="roughness" value="0.3"/>
                        <float name="anisotropic" value="0.0"/>
                    </bsdf>
                </bsdf>
            </shape>
        </scene>
    "#;

    #[test]
    fn test_load_scene_with_forward_reference() {
        let (_dir, path) = write_scene(CBOX_LIKE);
        let scene = load_mitsuba_scene(&path, Variant::default(), &LoadOptions::default()).unwrap();
        // two rectangles of two triangles each, plus the sphere
        assert_eq!(scene.primitives().len(), 5);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.nee_lights.len(), 1);
        assert_eq!(scene.film.resolution, Point2i::new(24, 24));
        assert_eq!(scene.sampler.samples_per_pixel(), 8);
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let (_dir, path) = write_scene(CBOX_LIKE);
        let options = LoadOptions {
            spp: Some(2),
            seed: Some(9),
            defaults: vec![(String::from("res"), String::from("10"))],
        };
        let scene = load_mitsuba_scene(&path, Variant::default(), &options).unwrap();
        assert_eq!(scene.film.resolution, Point2i::new(10, 10));
        assert_eq!(scene.sampler.samples_per_pixel(), 2);
        assert_eq!(scene.sampler.seed(), 9);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_mitsuba_scene(&dir.path().join("none.xml"), Variant::default(), &LoadOptions::default());
        assert!(matches!(err, Err(SceneLoadError::Io { .. })));
    }

    #[test]
    fn test_unresolved_reference() {
        let (_dir, path) = write_scene(r#"<scene version="3.0.0"><shape type="cube"><ref id="nope"/></shape></scene>"#);
        let err = load_mitsuba_scene(&path, Variant::default(), &LoadOptions::default());
        assert!(matches!(err, Err(SceneLoadError::UnresolvedReference(id)) if id == "nope"));
    }

    #[test]
    fn test_unknown_plugin() {
        let (_dir, path) = write_scene(r#"<scene version="3.0.0"><shape type="teapot"/></scene>"#);
        let err = load_mitsuba_scene(&path, Variant::default(), &LoadOptions::default());
        assert!(matches!(err, Err(SceneLoadError::UnsupportedPlugin { .. })));
    }

    #[test]
    fn test_empty_scene_gets_defaults() {
        let (_dir, path) = write_scene(r#"<scene version="3.0.0"></scene>"#);
        let scene = load_mitsuba_scene(&path, Variant::default(), &LoadOptions::default()).unwrap();
        assert!(scene.primitives().is_empty());
        assert_eq!(scene.film.resolution, Point2i::new(768, 576));
        assert_eq!(scene.sampler.samples_per_pixel(), 4);
    }
}
