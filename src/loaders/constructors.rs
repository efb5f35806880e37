//! Plugin constructors: one function per object kind, each consuming a `PropertyList`.

use crate::camera::{FovAxis, PerspectiveCamera};
use crate::error::SceneLoadError;
use crate::film::Film;
use crate::filter::{BoxFilter, Filter, GaussianFilter, TentFilter};
use crate::fresnel::{FresnelConductor, FresnelNoOp};
use crate::geometry::Normal3;
use crate::imageio::PixelFormat;
use crate::integrator::{DirectLightingIntegrator, Integrator, PathIntegrator};
use crate::light::{ConstantLight, DiffuseAreaLight, DistantLight, Light, PointLight};
use crate::loaders::{Context, PropVal, PropertyList};
use crate::reflection::disney::{disney_metallic, DisneyDiffuse, DisneySheen};
use crate::reflection::microfacet::{BeckmannDistribution, MicrofacetDistribution, TrowbridgeReitzDistribution};
use crate::reflection::{BxDF, FresnelSpecular, LambertianReflection, MicrofacetReflection, SpecularReflection, TwoSided};
use crate::sampler::IndependentSampler;
use crate::shapes::{cube_mesh, rectangle_mesh, Shape, Sphere, TriangleMesh};
use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Point2i, Point3f, Transform, Transformable, Vec3f};
use cgmath::{EuclideanSpace, InnerSpace};
use std::sync::Arc;

type ParamResult<T> = Result<T, SceneLoadError>;

/// A surface's scattering model. `None` is the null BSDF: rays pass straight through.
pub type MaterialRef = Option<Arc<dyn BxDF>>;

/// Index of refraction of the named materials accepted by `int_ior` / `ext_ior`.
pub fn lookup_ior(name: &str) -> Option<Float> {
    let ior = match name {
        "vacuum" => 1.0,
        "helium" => 1.000036,
        "hydrogen" => 1.000132,
        "air" => 1.000277,
        "carbon dioxide" => 1.00045,
        "water" => 1.3330,
        "acetone" => 1.36,
        "ethanol" => 1.361,
        "water ice" => 1.31,
        "fused quartz" => 1.458,
        "pyrex" => 1.470,
        "acrylic glass" => 1.49,
        "polypropylene" => 1.49,
        "bk7" => 1.5046,
        "sodium chloride" => 1.544,
        "amber" => 1.55,
        "pet" => 1.5750,
        "diamond" => 2.419,
        _ => return None,
    };
    Some(ior)
}

/// Complex index of refraction `(eta, k)` of the conductor presets, as linear RGB.
pub fn lookup_conductor(name: &str) -> Option<(Spectrum, Spectrum)> {
    let (eta, k): ([Float; 3], [Float; 3]) = match name {
        "Au" => ([0.143119, 0.374957, 1.44248], [3.98316, 2.38572, 1.60322]),
        "Ag" => ([0.155265, 0.116723, 0.138342], [4.82835, 3.12225, 2.14696]),
        "Cu" => ([0.200438, 0.924033, 1.10221], [3.91295, 2.45285, 2.14219]),
        "Al" => ([1.65746, 0.880369, 0.521229], [9.22387, 6.26952, 4.837]),
        _ => return None,
    };
    Some((Spectrum::from(eta), Spectrum::from(k)))
}

fn ior_property(props: &mut PropertyList, name: &str, default: Float) -> ParamResult<Float> {
    match props.take_raw(name) {
        None => Ok(default),
        Some(PropVal::Float(v)) => Ok(v),
        Some(PropVal::Int(v)) => Ok(v as Float),
        Some(PropVal::String(s)) => lookup_ior(&s)
            .ok_or_else(|| SceneLoadError::parameter(format!("{}: unknown material '{}' for {}", props.plugin(), s, name))),
        Some(_) => Err(SceneLoadError::parameter(format!("{}: {} must be a number or a material name", props.plugin(), name))),
    }
}

/// Fresnel term of the `conductor` family; `None` for the perfect mirror (`material="none"`).
fn conductor_fresnel(props: &mut PropertyList) -> ParamResult<Option<FresnelConductor>> {
    let eta = props.get::<Spectrum>("eta")?;
    let k = props.get::<Spectrum>("k")?;
    let material = props.get::<String>("material")?;
    let ext_eta = Spectrum::uniform(ior_property(props, "ext_eta", 1.0)?);

    let (eta, k) = match (eta, k, material.as_deref()) {
        (Some(eta), Some(k), _) => (eta, k),
        (None, None, None) | (None, None, Some("none")) => return Ok(None),
        (None, None, Some(name)) => lookup_conductor(name)
            .ok_or_else(|| SceneLoadError::parameter(format!("{}: unknown conductor material '{}'", props.plugin(), name)))?,
        _ => return Err(SceneLoadError::parameter(format!("{}: eta and k must be given together", props.plugin()))),
    };
    Ok(Some(FresnelConductor::new(ext_eta, eta, k)))
}

fn rough_conductor<D>(r: Spectrum, distribution: D, fresnel: Option<FresnelConductor>) -> Arc<dyn BxDF>
    where D: MicrofacetDistribution + 'static
{
    match fresnel {
        Some(fresnel) => Arc::new(MicrofacetReflection::new(r, distribution, fresnel)),
        None => Arc::new(MicrofacetReflection::new(r, distribution, FresnelNoOp)),
    }
}

/// Builds a BSDF. `nested` holds the already built child of wrapper plugins.
pub fn make_bsdf(mut props: PropertyList, nested: Option<MaterialRef>) -> ParamResult<MaterialRef> {
    let kind = props.plugin().to_string();
    let bsdf: Arc<dyn BxDF> = match kind.as_str() {
        "null" => {
            props.finish();
            return Ok(None);
        }
        "twosided" => {
            let inner = nested
                .ok_or_else(|| SceneLoadError::parameter("twosided: expected a nested bsdf"))?
                .ok_or_else(|| SceneLoadError::parameter("twosided: the nested bsdf cannot be null"))?;
            Arc::new(TwoSided::new(inner))
        }
        "diffuse" => {
            let r = props.get_or("reflectance", Spectrum::uniform(0.5))?;
            Arc::new(LambertianReflection::new(r))
        }
        "conductor" => {
            let r = props.get_or("specular_reflectance", Spectrum::uniform(1.0))?;
            match conductor_fresnel(&mut props)? {
                Some(fresnel) => Arc::new(SpecularReflection::new(r, fresnel)),
                None => Arc::new(SpecularReflection::new(r, FresnelNoOp)),
            }
        }
        "roughconductor" => {
            let r = props.get_or("specular_reflectance", Spectrum::uniform(1.0))?;
            let alpha: Float = props.get_or("alpha", 0.1)?;
            let alpha_u = props.get_or("alpha_u", alpha)?;
            let alpha_v = props.get_or("alpha_v", alpha)?;
            let fresnel = conductor_fresnel(&mut props)?;
            let distribution: String = props.get_or("distribution", String::from("beckmann"))?;
            match distribution.as_str() {
                "beckmann" => rough_conductor(r, BeckmannDistribution::new(alpha_u, alpha_v), fresnel),
                "ggx" => rough_conductor(r, TrowbridgeReitzDistribution::new(alpha_u, alpha_v), fresnel),
                other => return Err(SceneLoadError::parameter(format!(
                    "roughconductor: unknown distribution '{}'", other
                ))),
            }
        }
        "dielectric" => {
            let int_ior = ior_property(&mut props, "int_ior", 1.5046)?;
            let ext_ior = ior_property(&mut props, "ext_ior", 1.000277)?;
            let r = props.get_or("specular_reflectance", Spectrum::uniform(1.0))?;
            let t = props.get_or("specular_transmittance", Spectrum::uniform(1.0))?;
            Arc::new(FresnelSpecular::new(r, t, ext_ior, int_ior))
        }
        "disney_diffuse" => {
            let albedo = props.get_or("albedo", Spectrum::uniform(0.5))?;
            let alpha = props.get_or("alpha", 0.1)?;
            Arc::new(DisneyDiffuse::new(albedo, alpha))
        }
        "disney_metallic" => {
            let albedo = props.get_or("albedo", Spectrum::uniform(0.5))?;
            let roughness = props.get_or("roughness", 0.5)?;
            let anisotropic = props.get_or("anisotropic", 0.0)?;
            Arc::new(disney_metallic(albedo, roughness, anisotropic))
        }
        "disney_sheen" => {
            let albedo = props.get_or("albedo", Spectrum::uniform(0.5))?;
            let sheen = props.get_or("sheen", 0.01)?;
            Arc::new(DisneySheen::new(albedo, sheen))
        }
        other => return Err(SceneLoadError::unsupported("bsdf", other)),
    };
    props.finish();
    Ok(Some(bsdf))
}

fn load_obj(props: &mut PropertyList, ctx: &Context, to_world: &Transform, flip_normals: bool) -> ParamResult<Vec<Arc<dyn Shape>>> {
    let filename: String = props.get_required("filename")?;
    let face_normals = props.get_or("face_normals", false)?;
    let path = ctx.resolve(&filename);
    let (models, _materials) = tobj::load_obj(&path, &tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }).map_err(|e| SceneLoadError::MissingAsset { path: path.clone(), message: e.to_string() })?;

    let mut shapes: Vec<Arc<dyn Shape>> = Vec::new();
    for model in models {
        let mesh = model.mesh;
        if mesh.indices.is_empty() {
            continue;
        }
        let vertices: Vec<Point3f> = mesh.positions.chunks_exact(3)
            .map(|p| Point3f::new(p[0], p[1], p[2]))
            .collect();
        let normals = (!face_normals && mesh.normals.len() == mesh.positions.len()).then(|| {
            mesh.normals.chunks_exact(3)
                .map(|n| Normal3::new(n[0], n[1], n[2]))
                .collect::<Vec<_>>()
        });
        let n_vertices = vertices.len();
        let uvs = (mesh.texcoords.len() == 2 * n_vertices).then(|| {
            mesh.texcoords.chunks_exact(2)
                .map(|t| Point2f::new(t[0], t[1]))
                .collect::<Vec<_>>()
        });
        if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= n_vertices) {
            return Err(SceneLoadError::MissingAsset {
                path: path.clone(),
                message: format!("vertex index {} out of range in object '{}'", bad, model.name),
            });
        }
        tracing::debug!(object = %model.name, triangles = mesh.indices.len() / 3, "loaded obj mesh");
        let mesh = Arc::new(TriangleMesh::new(to_world, mesh.indices, vertices, normals, uvs, flip_normals));
        shapes.extend(TriangleMesh::iter_triangles(&mesh).map(|t| Arc::new(t) as Arc<dyn Shape>));
    }
    if shapes.is_empty() {
        return Err(SceneLoadError::MissingAsset { path, message: String::from("no triangles") });
    }
    Ok(shapes)
}

/// Builds the pieces of a shape. Meshes expand into one shape per triangle.
pub fn make_shape(mut props: PropertyList, ctx: &Context) -> ParamResult<Vec<Arc<dyn Shape>>> {
    let to_world = props.to_world()?;
    let flip_normals = props.get_or("flip_normals", false)?;
    let kind = props.plugin().to_string();
    let shapes: Vec<Arc<dyn Shape>> = match kind.as_str() {
        "sphere" => {
            let center: Point3f = props.get_or("center", Point3f::origin())?;
            let radius: Float = props.get_or("radius", 1.0)?;
            if radius <= 0.0 {
                return Err(SceneLoadError::parameter("sphere: radius must be positive"));
            }
            let o2w = Transform::translate(center.to_vec()).then(to_world);
            vec![Arc::new(Sphere::new(o2w, radius, flip_normals))]
        }
        "rectangle" => {
            let mesh = rectangle_mesh(&to_world, flip_normals);
            TriangleMesh::iter_triangles(&mesh).map(|t| Arc::new(t) as Arc<dyn Shape>).collect()
        }
        "cube" => {
            let mesh = cube_mesh(&to_world, flip_normals);
            TriangleMesh::iter_triangles(&mesh).map(|t| Arc::new(t) as Arc<dyn Shape>).collect()
        }
        "obj" => load_obj(&mut props, ctx, &to_world, flip_normals)?,
        other => return Err(SceneLoadError::unsupported("shape", other)),
    };
    props.finish();
    Ok(shapes)
}

/// Area emitter attached to the given shape pieces.
pub fn make_area_light(mut props: PropertyList, shapes: &[Arc<dyn Shape>]) -> ParamResult<Arc<DiffuseAreaLight>> {
    if props.plugin() != "area" {
        return Err(SceneLoadError::parameter(format!(
            "emitter '{}' cannot be attached to a shape", props.plugin()
        )));
    }
    let radiance = props.get_required("radiance")?;
    props.finish();
    Ok(Arc::new(DiffuseAreaLight::new(radiance, shapes.to_vec())))
}

/// Emitters declared on their own at the scene level.
pub fn make_light(mut props: PropertyList) -> ParamResult<Arc<dyn Light>> {
    let kind = props.plugin().to_string();
    let light: Arc<dyn Light> = match kind.as_str() {
        "point" => {
            let to_world = props.to_world()?;
            let position = match props.get::<Point3f>("position")? {
                Some(p) => p,
                None => to_world.transform(Point3f::origin()),
            };
            let intensity = props.get_or("intensity", Spectrum::uniform(1.0))?;
            Arc::new(PointLight::new(position, intensity))
        }
        "directional" => {
            let to_world = props.to_world()?;
            let direction = match props.get::<Vec3f>("direction")? {
                Some(d) => d,
                None => to_world.transform(Vec3f::unit_z()),
            };
            if direction.magnitude2() == 0.0 {
                return Err(SceneLoadError::parameter("directional: direction must be non-zero"));
            }
            let irradiance = props.get_or("irradiance", Spectrum::uniform(1.0))?;
            Arc::new(DistantLight::new(irradiance, direction.normalize()))
        }
        "constant" => {
            let radiance = props.get_or("radiance", Spectrum::uniform(1.0))?;
            Arc::new(ConstantLight::new(radiance))
        }
        "area" => return Err(SceneLoadError::parameter("area emitters must be nested in a shape")),
        other => return Err(SceneLoadError::unsupported("emitter", other)),
    };
    props.finish();
    Ok(light)
}

pub fn make_integrator(mut props: PropertyList) -> ParamResult<Box<dyn Integrator>> {
    let mut kind = props.plugin().to_string();
    if kind == "volpath" {
        tracing::warn!("volpath has no participating media to trace here, using path");
        kind = String::from("path");
    }
    let hide_emitters = props.get_or("hide_emitters", false)?;
    let integrator: Box<dyn Integrator> = match kind.as_str() {
        "path" => {
            let max_depth = match props.get_or("max_depth", -1i64)? {
                -1 => None,
                d if d >= 0 => Some(d as u32),
                d => return Err(SceneLoadError::parameter(format!("path: invalid max_depth {}", d))),
            };
            let rr_depth = props.get_or("rr_depth", 5i64)?;
            if rr_depth <= 0 {
                return Err(SceneLoadError::parameter("path: rr_depth must be positive"));
            }
            Box::new(PathIntegrator::new(max_depth, rr_depth as u32, hide_emitters))
        }
        "direct" => Box::new(DirectLightingIntegrator::new(hide_emitters)),
        other => return Err(SceneLoadError::unsupported("integrator", other)),
    };
    props.finish();
    Ok(integrator)
}

pub fn make_camera(mut props: PropertyList, resolution: Point2i) -> ParamResult<PerspectiveCamera> {
    if props.plugin() != "perspective" {
        return Err(SceneLoadError::unsupported("sensor", props.plugin()));
    }
    let to_world = props.to_world()?;
    // 50mm focal length on a 35mm film back
    let fov: Float = props.get_or("fov", 39.597755)?;
    let fov_axis: String = props.get_or("fov_axis", String::from("x"))?;
    let fov_axis: FovAxis = fov_axis.parse().map_err(SceneLoadError::Parameter)?;
    let near_clip: Float = props.get_or("near_clip", 0.01)?;
    let far_clip: Float = props.get_or("far_clip", 10000.0)?;
    if !(fov > 0.0 && fov < 180.0) {
        return Err(SceneLoadError::parameter(format!("perspective: fov {} is out of range", fov)));
    }
    if !(near_clip > 0.0 && far_clip > near_clip) {
        return Err(SceneLoadError::parameter("perspective: need 0 < near_clip < far_clip"));
    }
    props.finish();
    Ok(PerspectiveCamera::new(to_world, resolution, fov, fov_axis, near_clip, far_clip))
}

pub fn make_filter(mut props: PropertyList) -> ParamResult<Arc<dyn Filter>> {
    let kind = props.plugin().to_string();
    let filter: Arc<dyn Filter> = match kind.as_str() {
        "box" => Arc::new(BoxFilter { radius: props.get_or("radius", 0.5)? }),
        "tent" => Arc::new(TentFilter { radius: props.get_or("radius", 1.0)? }),
        "gaussian" => Arc::new(GaussianFilter::new(props.get_or("stddev", 0.5)?)),
        other => return Err(SceneLoadError::unsupported("rfilter", other)),
    };
    props.finish();
    Ok(filter)
}

pub fn make_film(mut props: PropertyList, filter: Option<Arc<dyn Filter>>) -> ParamResult<Film> {
    if props.plugin() != "hdrfilm" {
        return Err(SceneLoadError::unsupported("film", props.plugin()));
    }
    let width = props.get_or("width", 768i64)?;
    let height = props.get_or("height", 576i64)?;
    if width <= 0 || height <= 0 || width > i32::MAX as i64 || height > i32::MAX as i64 {
        return Err(SceneLoadError::parameter(format!("hdrfilm: invalid resolution {}x{}", width, height)));
    }
    let fits_in_memory = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4 * std::mem::size_of::<f32>()))
        .is_some();
    if !fits_in_memory {
        return Err(SceneLoadError::parameter(format!("hdrfilm: resolution {}x{} is too large", width, height)));
    }
    let pixel_format = match props.get_or("pixel_format", String::from("rgb"))?.as_str() {
        "rgb" => PixelFormat::Rgb,
        "rgba" => PixelFormat::Rgba,
        "luminance" => PixelFormat::Y,
        "luminance_alpha" => PixelFormat::YA,
        other => return Err(SceneLoadError::parameter(format!("hdrfilm: unsupported pixel_format '{}'", other))),
    };
    if let Some(format) = props.get::<String>("file_format")? {
        if format != "openexr" {
            tracing::warn!(%format, "hdrfilm: file_format is ignored, captures are always OpenEXR");
        }
    }
    let filter = filter.unwrap_or_else(|| Arc::new(GaussianFilter::default()));
    props.finish();
    Ok(Film::new(Point2i::new(width as i32, height as i32), pixel_format, filter))
}

pub fn make_sampler(mut props: PropertyList, spp_override: Option<u32>, seed_override: Option<u64>) -> ParamResult<IndependentSampler> {
    if props.plugin() != "independent" {
        tracing::warn!(sampler = %props.plugin(), "unsupported sampler, using independent");
    }
    let sample_count = props.get_or("sample_count", 4i64)?;
    let seed = props.get_or("seed", 0i64)?;
    if sample_count <= 0 {
        return Err(SceneLoadError::parameter("sampler: sample_count must be positive"));
    }
    props.finish();
    let sample_count = u32::try_from(sample_count).map_err(|_| SceneLoadError::parameter(format!(
        "sampler: sample_count {} is too large", sample_count
    )))?;
    let spp = spp_override.unwrap_or(sample_count);
    let seed = seed_override.unwrap_or(seed as u64);
    Ok(IndependentSampler::new(spp, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Sampler;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn props(plugin: &str) -> PropertyList {
        PropertyList::new(plugin)
    }

    #[test]
    fn test_ior_names_and_numbers() {
        let mut p = props("dielectric");
        p.insert("int_ior", String::from("water"));
        p.insert("ext_ior", 1.2 as Float);
        assert_relative_eq!(ior_property(&mut p, "int_ior", 1.5).unwrap(), 1.3330);
        assert_relative_eq!(ior_property(&mut p, "ext_ior", 1.0).unwrap(), 1.2);
        assert_relative_eq!(ior_property(&mut p, "missing", 1.5).unwrap(), 1.5);

        p.insert("int_ior", String::from("unobtainium"));
        assert!(ior_property(&mut p, "int_ior", 1.5).is_err());
    }

    #[test]
    fn test_null_bsdf_is_none() {
        assert!(make_bsdf(props("null"), None).unwrap().is_none());
        assert!(make_bsdf(props("diffuse"), None).unwrap().is_some());
    }

    #[test]
    fn test_twosided_needs_child() {
        assert!(make_bsdf(props("twosided"), None).is_err());
        let inner = make_bsdf(props("diffuse"), None).unwrap();
        assert!(make_bsdf(props("twosided"), Some(inner)).unwrap().is_some());
    }

    #[test]
    fn test_unknown_bsdf_and_conductor() {
        assert!(matches!(make_bsdf(props("plastic"), None), Err(SceneLoadError::UnsupportedPlugin { .. })));

        let mut p = props("conductor");
        p.insert("material", String::from("Xx"));
        assert!(matches!(make_bsdf(p, None), Err(SceneLoadError::Parameter(_))));

        let mut p = props("roughconductor");
        p.insert("material", String::from("Au"));
        p.insert("distribution", String::from("ggx"));
        assert!(make_bsdf(p, None).is_ok());
    }

    #[test]
    fn test_cube_has_twelve_triangles() {
        let shapes = make_shape(props("cube"), &Context::new(std::path::Path::new("scene.xml"))).unwrap();
        assert_eq!(shapes.len(), 12);
        let area: Float = shapes.iter().map(|s| s.area()).sum();
        assert_relative_eq!(area, 24.0, epsilon = 1e-4);
    }

    #[test]
    fn test_obj_missing_file_is_missing_asset() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(&dir.path().join("scene.xml"));
        let mut p = props("obj");
        p.insert("filename", String::from("nope.obj"));
        assert!(matches!(make_shape(p, &ctx), Err(SceneLoadError::MissingAsset { .. })));
    }

    #[test]
    fn test_obj_loads_triangles() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        let ctx = Context::new(&dir.path().join("scene.xml"));
        let mut p = props("obj");
        p.insert("filename", String::from("quad.obj"));
        let shapes = make_shape(p, &ctx).unwrap();
        assert_eq!(shapes.len(), 2);
        let area: Float = shapes.iter().map(|s| s.area()).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_integrator_depths() {
        let mut p = props("path");
        p.insert("max_depth", -2i64);
        assert!(make_integrator(p).is_err());
        assert!(make_integrator(props("volpath")).is_ok());
        assert!(matches!(make_integrator(props("bdpt")), Err(SceneLoadError::UnsupportedPlugin { .. })));
    }

    #[test]
    fn test_film_defaults_and_sampler_overrides() {
        let film = make_film(props("hdrfilm"), None).unwrap();
        assert_eq!(film.resolution, Point2i::new(768, 576));
        assert_eq!(film.pixel_format, PixelFormat::Rgb);

        let mut p = props("hdrfilm");
        p.insert("pixel_format", String::from("xyz"));
        assert!(make_film(p, None).is_err());

        let mut p = props("independent");
        p.insert("sample_count", 8i64);
        let sampler = make_sampler(p, Some(2), None).unwrap();
        assert_eq!(sampler.samples_per_pixel(), 2);
        assert_eq!(sampler.seed(), 0);
    }

    #[test]
    fn test_large_film_is_accepted() {
        let mut p = props("hdrfilm");
        p.insert("width", 50_000i64);
        p.insert("height", 50_000i64);
        let film = make_film(p, None).unwrap();
        assert_eq!(film.resolution, Point2i::new(50_000, 50_000));

        let mut p = props("hdrfilm");
        p.insert("width", i32::MAX as i64 + 1);
        assert!(matches!(make_film(p, None), Err(SceneLoadError::Parameter(_))));
    }

    #[test]
    fn test_sample_count_beyond_u32_is_rejected() {
        let mut p = props("independent");
        p.insert("sample_count", u32::MAX as i64 + 1);
        let err = make_sampler(p, None, None).unwrap_err();
        assert!(matches!(err, SceneLoadError::Parameter(_)));
        assert!(err.to_string().contains("sample_count"));

        let mut p = props("independent");
        p.insert("sample_count", u32::MAX as i64);
        assert_eq!(make_sampler(p, None, None).unwrap().samples_per_pixel(), u32::MAX);
    }
}
