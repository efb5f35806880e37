use crate::{Float, Point2f, Point2i};
use crate::camera::CameraSample;
use cgmath::EuclideanSpace;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::SplitMix64;

mod independent;

pub use independent::IndependentSampler;

pub trait Sampler: Send + Sync {
    fn start_pixel(&mut self, pixel: Point2i);

    /// Advances to the next sample of the current pixel, returning false once every sample
    /// of the pixel has been taken.
    fn start_next_sample(&mut self) -> bool;

    fn get_1d(&mut self) -> Float;

    fn get_2d(&mut self) -> Point2f;

    fn samples_per_pixel(&self) -> u32;

    /// Seed of the random stream this sampler was created with.
    fn seed(&self) -> u64;

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler>;

    fn get_camera_sample(&mut self, p_raster: Point2i) -> CameraSample {
        let p_film = p_raster.cast::<Float>().unwrap_or_else(Point2f::origin) + self.get_2d().to_vec();
        CameraSample { p_film }
    }
}

/// Mixes the scene seed with a tile index so that every tile owns a distinct, reproducible
/// random stream regardless of the order tiles are scheduled in.
pub fn tile_seed(seed: u64, tile_index: u64) -> u64 {
    let base = SplitMix64::seed_from_u64(seed).next_u64();
    // the first output is a bijection of the state, so distinct tiles never share a seed
    SplitMix64::seed_from_u64(base ^ tile_index).next_u64()
}
