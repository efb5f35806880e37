use anyhow::Context;
use clap::Parser;
use render_export::{render_and_export, CpuRenderer, ExportOptions, RenderOptions, Variant};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Render `<BASENAME>.xml` and write `<BASENAME>.png` and `<BASENAME>.exr`.
#[derive(Parser, Debug)]
#[command(name = "render", version)]
struct Args {
    /// Scene path without the `.xml` extension; also the stem of the outputs.
    basename: PathBuf,

    #[arg(long, default_value = "scalar_rgb")]
    variant: Variant,

    /// Write the preview with a linear clamp instead of the sRGB curve.
    #[arg(long)]
    no_srgb: bool,

    /// Preview exposure adjustment in stops.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    exposure: f32,

    /// Samples per pixel, overriding the scene's sampler.
    #[arg(long)]
    spp: Option<u32>,

    /// Worker threads; all cores by default.
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override a scene `<default>` parameter.
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define)]
    define: Vec<(String, String)>,

    /// No progress bar.
    #[arg(long, short)]
    quiet: bool,
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    let (name, value) = s.split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{}'", s))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(HierarchicalLayer::new(2))
        .init();

    let args = Args::parse();

    let engine = CpuRenderer::new(RenderOptions {
        threads: args.threads,
        spp: args.spp,
        seed: args.seed,
        progress: !args.quiet,
        defaults: args.define,
        ..Default::default()
    });
    let options = ExportOptions {
        variant: args.variant,
        srgb_gamma: !args.no_srgb,
        exposure: args.exposure,
        output_dir: args.output_dir,
    };

    let artifacts = render_and_export(&engine, &args.basename, &options)
        .with_context(|| format!("failed to render {}", args.basename.display()))?;

    tracing::info!(
        preview = %artifacts.preview.display(),
        capture = %artifacts.capture.display(),
        width = artifacts.width,
        height = artifacts.height,
        elapsed = ?artifacts.render_time,
        "done"
    );
    Ok(())
}
