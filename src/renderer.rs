//! The CPU path tracing engine behind the `RenderEngine` interface.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use std::path::Path;
use std::time::Instant;

use crate::engine::RenderEngine;
use crate::error::{RenderError, SceneLoadError};
use crate::imageio::Bitmap;
use crate::integrator::render_film;
use crate::loaders::{load_mitsuba_scene, LoadOptions};
use crate::scene::Scene;
use crate::variant::Variant;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Worker threads, `None` for one per core.
    pub threads: Option<usize>,
    /// Overrides the scene's samples per pixel.
    pub spp: Option<u32>,
    /// Overrides the scene's sampler seed.
    pub seed: Option<u64>,
    pub progress: bool,
    /// Side length of the square image tiles rendered as units of work.
    pub tile_size: i32,
    /// `(name, value)` overrides for the scene's `<default>` parameters.
    pub defaults: Vec<(String, String)>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            threads: None,
            spp: None,
            seed: None,
            progress: true,
            tile_size: 16,
            defaults: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CpuRenderer {
    options: RenderOptions,
}

impl CpuRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles (eta: {eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

impl RenderEngine for CpuRenderer {
    type Scene = Scene;

    fn name(&self) -> &str {
        "cpu"
    }

    fn supports_variant(&self, variant: Variant) -> bool {
        variant == Variant::SCALAR_RGB
    }

    fn load_scene(&self, path: &Path, variant: Variant) -> Result<Scene, SceneLoadError> {
        if !self.supports_variant(variant) {
            return Err(SceneLoadError::UnsupportedVariant(variant));
        }
        let options = LoadOptions {
            spp: self.options.spp,
            seed: self.options.seed,
            defaults: self.options.defaults.clone(),
        };
        load_mitsuba_scene(path, variant, &options)
    }

    fn render(&self, scene: &Scene) -> Result<Bitmap, RenderError> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(threads) = self.options.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let res = scene.film.resolution;
        let _span = tracing::info_span!("render", width = res.x, height = res.y, spp = scene.sampler.samples_per_pixel()).entered();
        tracing::info!(threads = pool.current_num_threads(), variant = %scene.variant, "rendering");

        let progress = self.progress_bar();
        let start = Instant::now();
        let image = pool.install(|| render_film(scene, self.options.tile_size, &progress));
        progress.finish_and_clear();
        let image = image?;

        tracing::info!(elapsed = ?start.elapsed(), "render finished");
        Ok(image)
    }
}
