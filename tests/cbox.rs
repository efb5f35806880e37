//! End to end renders of small Cornell box scenes through the CPU engine.

use pretty_assertions::assert_eq;
use render_export::{
    render_and_export, Bitmap, CpuRenderer, ExportOptions, PixelFormat, RenderEngine, RenderOptions, Variant,
};
use std::path::{Path, PathBuf};

fn manifest_path(rel: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn quiet_engine(threads: usize) -> CpuRenderer {
    CpuRenderer::new(RenderOptions {
        threads: Some(threads),
        progress: false,
        ..Default::default()
    })
}

#[test]
fn renders_small_box_with_alpha() -> anyhow::Result<()> {
    let engine = quiet_engine(2);
    let scene = engine.load_scene(&manifest_path("testscenes/cbox_small.xml"), Variant::default())?;
    let img = engine.render(&scene)?;

    assert_eq!(img.size(), (24, 24));
    assert_eq!(img.pixel_format(), PixelFormat::Rgba);
    let data = img.as_f32().unwrap();
    assert!(data.iter().all(|v| v.is_finite() && *v >= 0.0));
    // camera inside a closed box: every pixel is covered and something is lit
    assert!(data.chunks_exact(4).all(|px| (px[3] - 1.0).abs() < 1e-5));
    assert!(data.chunks_exact(4).any(|px| px[0] > 0.0));
    Ok(())
}

#[test]
fn same_seed_renders_identically_across_thread_counts() -> anyhow::Result<()> {
    let path = manifest_path("testscenes/cbox_small.xml");
    let a = {
        let engine = quiet_engine(1);
        engine.render(&engine.load_scene(&path, Variant::default())?)?
    };
    let b = {
        let engine = quiet_engine(4);
        engine.render(&engine.load_scene(&path, Variant::default())?)?
    };
    assert!(a == b, "renders with the same seed differ");

    let c = {
        let engine = CpuRenderer::new(RenderOptions { seed: Some(8), progress: false, ..Default::default() });
        engine.render(&engine.load_scene(&path, Variant::default())?)?
    };
    assert!(a != c, "a different seed should change the noise");
    Ok(())
}

#[test]
fn exports_disney_metallic_box() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let engine = CpuRenderer::new(RenderOptions {
        spp: Some(2),
        progress: false,
        defaults: vec![(String::from("res"), String::from("20")), (String::from("max_depth"), String::from("3"))],
        ..Default::default()
    });
    let options = ExportOptions {
        output_dir: Some(out.path().to_path_buf()),
        ..Default::default()
    };
    let artifacts = render_and_export(&engine, manifest_path("scenes/cbox_disney_metallic_mitsuba"), &options)?;

    assert_eq!(artifacts.preview, out.path().join("cbox_disney_metallic_mitsuba.png"));
    assert_eq!((artifacts.width, artifacts.height), (20, 20));
    let capture = Bitmap::read(&artifacts.capture)?;
    let preview = Bitmap::read(&artifacts.preview)?;
    assert_eq!(capture.size(), (20, 20));
    assert_eq!(preview.size(), (20, 20));
    Ok(())
}
